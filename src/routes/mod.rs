use axum::{routing::get, Router};

use crate::{error::ApiError, state::AppState};

pub mod db_check;
pub mod index;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index::index))
        .route("/test-db", get(db_check::test_db))
}

/// Catch-all for anything no route matched.
pub async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
