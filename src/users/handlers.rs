use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{debug, info, instrument};

use crate::{
    error::ApiError,
    extract::JsonBody,
    state::AppState,
    users::dto::{CreateUserRequest, UserListResponse, UserResponse},
};

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserListResponse>, ApiError> {
    let users = state
        .users
        .list_users()
        .await
        .map_err(|e| ApiError::internal(e, "Error fetching users"))?;
    debug!(count = users.len(), "listed users");
    Ok(Json(UserListResponse {
        success: true,
        users,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .users
        .create_user(payload.name.as_deref(), payload.email.as_deref())
        .await
        .map_err(|e| ApiError::internal(e, "Error creating user"))?;

    info!(user_id = user.id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            success: true,
            user,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    // An undecodable or non-integer id can't match any row.
    let Some(id) = id.ok().and_then(|Path(raw)| raw.parse::<i32>().ok()) else {
        return Err(ApiError::not_found("User not found"));
    };

    let user = state
        .users
        .find_user(id)
        .await
        .map_err(|e| ApiError::internal(e, "Error fetching user"))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}
