use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use stringlens::config::Config;
use stringlens::server::{self, SharedStore};
use stringlens::store::MemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = config.log_level() {
        builder.filter_level(level);
    }
    builder.target(env_logger::Target::Stderr).init();

    let store = open_store(&config).await?;
    let cors = server::cors_layer(&config.cors_origins).context("Invalid CORS origin")?;

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    server::serve(listener, store, cors).await?;

    Ok(())
}

#[cfg(feature = "sea-orm")]
async fn open_store(config: &Config) -> Result<SharedStore> {
    match &config.database_url {
        Some(url) => {
            log::info!("Using database store");
            let store = stringlens::sea_orm::SeaOrmStore::connect(url)
                .await
                .context("Failed to open database")?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

#[cfg(not(feature = "sea-orm"))]
async fn open_store(config: &Config) -> Result<SharedStore> {
    if config.database_url.is_some() {
        anyhow::bail!("A database URL was provided, but this build lacks the 'sea-orm' feature");
    }
    log::info!("Using in-memory store");
    Ok(Arc::new(MemoryStore::new()))
}
