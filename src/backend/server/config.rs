/**
 * Store Configuration
 *
 * Picks the persistence backend at startup:
 *
 * - `DATABASE_URL` set and reachable: Postgres, with migrations applied
 * - otherwise: the in-memory store
 *
 * Connection and migration failures are logged and fall back to memory so
 * the server still starts for local development.
 */

#[cfg(feature = "ssr")]
use sqlx::PgPool;

#[cfg(feature = "ssr")]
use crate::backend::store::{PgStore, Store};
#[cfg(feature = "ssr")]
use crate::shared::AppConfig;

/// Build the store described by `config`
#[cfg(feature = "ssr")]
pub async fn load_store(config: &AppConfig) -> Store {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Using the in-memory store.");
        return Store::memory();
    };

    tracing::info!("Connecting to database...");
    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to the in-memory store.");
            return Store::memory();
        }
    };
    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    if let Err(e) = PgStore::new(pool.clone()).migrate().await {
        tracing::error!("Failed to run database migrations: {}", e);
        tracing::warn!("Falling back to the in-memory store.");
        return Store::memory();
    }
    tracing::info!("Database migrations completed successfully");

    Store::postgres(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_without_database_url_uses_memory() {
        let config = AppConfig::builder().jwt_secret("secret").build().unwrap();
        let store = load_store(&config).await;
        assert_eq!(store.users.count().await.unwrap(), 0);
    }
}
