//! HTTP surface over a [`Store`].

use crate::analyzer::AnalyzedRecord;
use crate::filter::{self, FilterParams};
use crate::lir::{self, Predicate};
use crate::store::{Store, StoreError};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header::InvalidHeaderValue, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub type SharedStore = Arc<dyn Store>;

const VALUE_REQUIRED: &str = r#""value" field is required"#;
const VALUE_NOT_STRING: &str = r#""value" must be a string"#;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error(transparent)]
    Parse(#[from] lir::Error),
    #[error(transparent)]
    Filter(#[from] filter::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Filter(_) => StatusCode::BAD_REQUEST,
            Self::Unprocessable(_) | Self::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(StoreError::Conflict) => StatusCode::CONFLICT,
            Self::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Backend(_) | StoreError::Corrupt(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::warn!("request failed: {self}");
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    pub data: Vec<AnalyzedRecord>,
    pub count: usize,
    pub filters_applied: FilterParams,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterpretedQuery {
    pub original: String,
    pub parsed_filters: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NaturalLanguageResponse {
    pub data: Vec<AnalyzedRecord>,
    pub count: usize,
    pub interpreted_query: InterpretedQuery,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NaturalLanguageQuery {
    pub query: String,
}

/// CORS for the given origins. Without any, every origin is allowed.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, InvalidHeaderValue> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

pub fn router(store: SharedStore, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/strings", get(list_strings).post(create_string))
        .route(
            "/strings/filter-by-natural-language",
            get(filter_by_natural_language),
        )
        .route("/strings/:value", get(get_string).delete(delete_string))
        .layer(cors)
        .with_state(store)
}

pub async fn serve(
    listener: TcpListener,
    store: SharedStore,
    cors: CorsLayer,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("Serving on http://{addr}/strings");
    }
    axum::serve(listener, router(store, cors)).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn create_string(
    State(store): State<SharedStore>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<AnalyzedRecord>), ApiError> {
    let Json(body) = body.map_err(|err| ApiError::BadRequest(err.body_text()))?;

    let value = match body.get("value") {
        None | Some(Value::Null) => return Err(ApiError::BadRequest(VALUE_REQUIRED.into())),
        Some(Value::String(value)) => value.clone(),
        Some(_) => return Err(ApiError::Unprocessable(VALUE_NOT_STRING.into())),
    };

    let record = match store.insert(AnalyzedRecord::new(value)).await {
        Ok(record) => record,
        Err(StoreError::Conflict) => {
            log::warn!("duplicate string rejected");
            return Err(StoreError::Conflict.into());
        }
        Err(err) => return Err(err.into()),
    };
    log::info!("created string {}", record.identifier);

    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_string(
    State(store): State<SharedStore>,
    Path(value): Path<String>,
) -> Result<Json<AnalyzedRecord>, ApiError> {
    store
        .get(&value)
        .await?
        .map(Json)
        .ok_or(ApiError::Store(StoreError::NotFound))
}

async fn list_strings(
    State(store): State<SharedStore>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
    let Query(params) = params.map_err(|err| ApiError::BadRequest(err.body_text()))?;
    let predicate = params.to_predicate()?;
    log::debug!("structured filter: {predicate:?}");

    let data = store.find(&predicate).await?;

    Ok(Json(ListResponse {
        count: data.len(),
        data,
        filters_applied: params,
    }))
}

async fn filter_by_natural_language(
    State(store): State<SharedStore>,
    params: Result<Query<NaturalLanguageQuery>, QueryRejection>,
) -> Result<Json<NaturalLanguageResponse>, ApiError> {
    let Query(NaturalLanguageQuery { query }) =
        params.map_err(|err| ApiError::BadRequest(err.body_text()))?;
    let predicate = Predicate::parse(&query)?;
    log::debug!("natural language filter '{query}': {predicate:?}");

    let data = store.find(&predicate).await?;

    Ok(Json(NaturalLanguageResponse {
        count: data.len(),
        data,
        interpreted_query: InterpretedQuery {
            original: query,
            parsed_filters: filter::describe(&predicate),
        },
    }))
}

async fn delete_string(
    State(store): State<SharedStore>,
    Path(value): Path<String>,
) -> Result<StatusCode, ApiError> {
    store.delete(&value).await?;
    log::info!("deleted string {}", crate::analyzer::identifier(&value));

    Ok(StatusCode::NO_CONTENT)
}
