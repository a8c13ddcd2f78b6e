use axum::{extract::State, Json};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct DbCheckResponse {
    pub success: bool,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
}

/// Runs a trivial query; failure details are returned to the caller.
#[instrument(skip(state))]
pub async fn test_db(State(state): State<AppState>) -> Result<Json<DbCheckResponse>, ApiError> {
    let time = state
        .clock
        .server_time()
        .await
        .map_err(|e| ApiError::internal_with_detail(e, "Database connection failed"))?;

    Ok(Json(DbCheckResponse {
        success: true,
        message: "Database connection OK".into(),
        time,
    }))
}
