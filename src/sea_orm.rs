//! A [`Store`] backed by a SQL database through SeaORM.
//!
//! Numeric and boolean constraints are pushed down into the `WHERE` clause, character containment
//! is checked on the fetched records.

use crate::analyzer::{AnalyzedRecord, PropertySet};
use crate::filter;
use crate::lir::{Constraint, Ordered, Predicate};
use crate::store::{Store, StoreError};
use ::sea_orm::{
    sea_query::IntoCondition, ActiveModelTrait, ColumnTrait, Condition, ConnectOptions,
    ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Schema, Set, SqlErr, TransactionTrait, Value,
};
use async_trait::async_trait;
use std::collections::BTreeMap;

pub mod entity {
    use ::sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "analyzed_string")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        #[sea_orm(unique)]
        pub value: String,
        pub length: i64,
        pub is_palindrome: bool,
        pub unique_characters: i64,
        pub word_count: i64,
        pub sha256_hash: String,
        pub character_frequency_map: Json,
        pub created_at: TimeDateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

use entity::{ActiveModel, Column, Entity, Model};

/// Translate a predicate into a condition.
///
/// Constraints without a column counterpart are left out, so the condition may select more rows
/// than the predicate matches.
pub fn translate_predicate(predicate: &Predicate) -> Condition {
    let mut result = Condition::all();
    for constraint in predicate.constraints() {
        if let Some(condition) = translate_constraint(constraint) {
            result = result.add(condition);
        }
    }
    result
}

pub fn translate_constraint(constraint: &Constraint) -> Option<Condition> {
    Some(match constraint {
        Constraint::Palindrome(value) => Column::IsPalindrome.eq(*value).into_condition(),
        Constraint::Length(o) => translate_ordered(Column::Length, o.map(to_i64)),
        Constraint::WordCount(o) => translate_ordered(Column::WordCount, o.map(to_i64)),
        Constraint::UniqueCharacters(o) => {
            translate_ordered(Column::UniqueCharacters, o.map(to_i64))
        }
        Constraint::ContainsCharacter(_) => return None,
    })
}

/// translate an `Ordered` value into a SeaORM condition.
pub fn translate_ordered<C, T>(column: C, value: Ordered<T>) -> Condition
where
    C: ColumnTrait,
    T: Ord + Into<Value>,
{
    match value {
        Ordered::Equal(value) => column.eq(value).into_condition(),
        Ordered::GreaterEqual(value) => column.gte(value).into_condition(),
        Ordered::LessEqual(value) => column.lte(value).into_condition(),
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn to_usize(value: i64, name: &str) -> Result<usize, StoreError> {
    usize::try_from(value).map_err(|_| StoreError::Corrupt(format!("negative {name}: {value}")))
}

impl From<&AnalyzedRecord> for ActiveModel {
    fn from(record: &AnalyzedRecord) -> Self {
        let props = &record.properties;
        let frequency = props
            .character_frequency
            .iter()
            .map(|(c, n)| (c.to_string(), serde_json::Value::from(*n)))
            .collect::<serde_json::Map<_, _>>();

        Self {
            id: Set(record.identifier.clone()),
            value: Set(record.value.clone()),
            length: Set(to_i64(props.length)),
            is_palindrome: Set(props.is_palindrome),
            unique_characters: Set(to_i64(props.unique_characters)),
            word_count: Set(to_i64(props.word_count)),
            sha256_hash: Set(props.hash.clone()),
            character_frequency_map: Set(serde_json::Value::Object(frequency)),
            created_at: Set(record.created_at),
        }
    }
}

impl TryFrom<Model> for AnalyzedRecord {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let character_frequency: BTreeMap<char, usize> =
            serde_json::from_value(model.character_frequency_map)
                .map_err(|err| StoreError::Corrupt(err.to_string()))?;

        Ok(Self {
            identifier: model.id,
            value: model.value,
            properties: PropertySet {
                length: to_usize(model.length, "length")?,
                is_palindrome: model.is_palindrome,
                unique_characters: to_usize(model.unique_characters, "unique_characters")?,
                word_count: to_usize(model.word_count, "word_count")?,
                hash: model.sha256_hash,
                character_frequency,
            },
            created_at: model.created_at,
        })
    }
}

fn backend(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Conflict,
        _ => StoreError::Backend(err.to_string()),
    }
}

pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    /// Connect and create the table, if it doesn't exist yet.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let mut options = ConnectOptions::new(url.to_string());
        if url.contains(":memory:") {
            // every pooled connection would get its own database otherwise
            options.max_connections(1).min_connections(1);
        }
        options.sqlx_logging(false);

        let db = Database::connect(options).await.map_err(backend)?;
        Self::new(db).await
    }

    pub async fn new(db: DatabaseConnection) -> Result<Self, StoreError> {
        let builder = db.get_database_backend();
        let schema = Schema::new(builder);
        let mut table = schema.create_table_from_entity(Entity);
        table.if_not_exists();
        db.execute(builder.build(&table)).await.map_err(backend)?;

        Ok(Self { db })
    }
}

#[async_trait]
impl Store for SeaOrmStore {
    async fn insert(&self, record: AnalyzedRecord) -> Result<AnalyzedRecord, StoreError> {
        let tx = self.db.begin().await.map_err(backend)?;

        if Entity::find_by_id(record.identifier.clone())
            .one(&tx)
            .await
            .map_err(backend)?
            .is_some()
        {
            return Err(StoreError::Conflict);
        }

        // the unique constraints still catch a concurrent insert
        ActiveModel::from(&record)
            .insert(&tx)
            .await
            .map_err(backend)?;
        tx.commit().await.map_err(backend)?;

        Ok(record)
    }

    async fn get(&self, value: &str) -> Result<Option<AnalyzedRecord>, StoreError> {
        Entity::find()
            .filter(Column::Value.eq(value))
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(AnalyzedRecord::try_from)
            .transpose()
    }

    async fn delete(&self, value: &str) -> Result<(), StoreError> {
        let result = Entity::delete_many()
            .filter(Column::Value.eq(value))
            .exec(&self.db)
            .await
            .map_err(backend)?;

        match result.rows_affected {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    async fn list(&self) -> Result<Vec<AnalyzedRecord>, StoreError> {
        self.find(&Predicate::new()).await
    }

    async fn find(&self, predicate: &Predicate) -> Result<Vec<AnalyzedRecord>, StoreError> {
        let models = Entity::find()
            .filter(translate_predicate(predicate))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(backend)?;

        let records = models
            .into_iter()
            .map(AnalyzedRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(filter::evaluate(predicate, records))
    }
}
