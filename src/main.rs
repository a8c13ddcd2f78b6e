use tracing::info;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod extract;
mod routes;
mod state;
mod users;

#[cfg(test)]
mod test_support;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "loginapi=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let db = db::connect(&config.database)?;
    db::migrate(&db).await;

    let app = app::build_app(AppState::from_pool(db.clone()));
    app::serve(app, &config).await?;

    // In-flight requests are done; wait for pooled connections to be returned.
    info!("closing database pool");
    db.close().await;
    info!("shutdown complete");
    Ok(())
}
