use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Builds the shared pool. Connections are opened on first use, so the server
/// comes up even when the database is unreachable and `/test-db` can report it.
pub fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let options = PgConnectOptions::from_str(&cfg.url)
        .context("parse DATABASE_URL")?
        .ssl_mode(cfg.ssl_mode);

    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect_lazy_with(options);

    info!(ssl_mode = ?cfg.ssl_mode, max_connections = cfg.max_connections, "database pool ready");
    Ok(pool)
}

pub async fn migrate(db: &PgPool) {
    if let Err(e) = sqlx::migrate!("./migrations").run(db).await {
        warn!(error = %e, "migration failed; continuing");
    }
}

/// Store reachability check backing `GET /test-db`.
#[async_trait]
pub trait ServerClock: Send + Sync {
    async fn server_time(&self) -> anyhow::Result<OffsetDateTime>;
}

#[async_trait]
impl ServerClock for PgPool {
    async fn server_time(&self) -> anyhow::Result<OffsetDateTime> {
        let now = sqlx::query_scalar::<_, OffsetDateTime>("SELECT NOW()")
            .fetch_one(self)
            .await?;
        Ok(now)
    }
}
