use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

use crate::app_config::DatabaseConfig;

/// Connection pools for the application role and the service role. The
/// service pool exists for exactly one purpose: reading back access tokens
/// that row-level policies hide from the request-scoped role.
#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
    pub service_pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.url)
            .await?;

        let service_pool = match &config.service_url {
            Some(url) => {
                PgPoolOptions::new()
                    .max_connections(2)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(url)
                    .await?
            }
            None => pool.clone(),
        };

        Ok(Self { pool, service_pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}
