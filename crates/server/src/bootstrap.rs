use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tastemap_core::config::AppConfig;
use tastemap_db::{connect_with_settings, migrations, DbPool, SqlRestaurantStore};

use crate::cache::ScoreCache;
use crate::state::AppState;

pub struct App {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<App> {
    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .with_context(|| format!("failed to connect to database at {}", config.database.url))?;

    migrations::run_pending(&db_pool).await.context("failed to run pending migrations")?;

    let store = Arc::new(SqlRestaurantStore::new(
        db_pool.clone(),
        config.engine.store_timeout_secs,
    ));
    let cache = Arc::new(ScoreCache::new(Duration::from_secs(config.engine.cache_ttl_secs)));

    tracing::info!(
        event_name = "system.bootstrap.ready",
        database_url = %config.database.url,
        cache_ttl_secs = config.engine.cache_ttl_secs,
        "record store and score cache initialized"
    );

    Ok(App { state: AppState { store, cache }, config, db_pool })
}
