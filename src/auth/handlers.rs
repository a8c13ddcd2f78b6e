use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AccountResponse, ChangePasswordRequest, ChangePasswordResponse, LoginRequest,
            ProfileResponse, RegisterRequest, ResetPasswordRequest, ResetPasswordResponse,
        },
        repo_types::NewAccount,
        services::{check_new_password, parse_user_id, password_matches, present},
    },
    error::{ApiError, INTERNAL_MESSAGE},
    extract::JsonBody,
    state::AppState,
};

const BAD_CREDENTIALS: &str = "Incorrect username or password";
const DEACTIVATED: &str = "User is deactivated. Contact the administrator";
const USER_NOT_FOUND: &str = "User not found";
const PASSWORD_FIELDS_REQUIRED: &str = "User ID and new password are required";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/profile/:username", get(profile))
}

pub fn password_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/change-password", put(change_password))
        .route("/auth/reset-password", put(reset_password))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let (Some(username), Some(password)) = (present(payload.username), present(payload.password))
    else {
        warn!("login without username or password");
        return Err(ApiError::bad_request("Username and password are required"));
    };

    let account = state
        .accounts
        .find_by_username(&username)
        .await
        .map_err(|e| ApiError::internal(e, INTERNAL_MESSAGE))?;

    // Unknown user and wrong password share one message.
    let Some(account) = account else {
        warn!(%username, "login unknown username");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    };

    if !account.is_active {
        warn!(user_id = account.id, "login on deactivated account");
        return Err(ApiError::unauthorized(DEACTIVATED));
    }

    if !password_matches(&account.password, &password) {
        warn!(user_id = account.id, "login invalid password");
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    state
        .accounts
        .record_login(account.id)
        .await
        .map_err(|e| ApiError::internal(e, INTERNAL_MESSAGE))?;

    info!(user_id = account.id, %username, "user logged in");
    Ok(Json(AccountResponse {
        success: true,
        message: "Login successful".into(),
        user: account.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let (Some(username), Some(password), Some(name)) = (
        present(payload.username),
        present(payload.password),
        present(payload.name),
    ) else {
        warn!("register without required fields");
        return Err(ApiError::bad_request(
            "Username, password and name are required",
        ));
    };
    let email = present(payload.email);

    let taken = state
        .accounts
        .username_or_email_taken(&username, email.as_deref())
        .await
        .map_err(|e| ApiError::internal(e, "Error creating user"))?;
    if taken {
        warn!(%username, "username or email already registered");
        return Err(ApiError::conflict("Username or email already exists"));
    }

    let created = state
        .accounts
        .create_account(NewAccount {
            username: &username,
            password: &password,
            name: &name,
            email: email.as_deref(),
        })
        .await
        .map_err(|e| ApiError::internal(e, "Error creating user"))?;

    // The pre-check can lose a race with a concurrent registration.
    let Some(user) = created else {
        warn!(%username, "registration lost unique-constraint race");
        return Err(ApiError::conflict("Username or email already exists"));
    };

    info!(user_id = user.id, %username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            success: true,
            message: "User registered successfully".into(),
            user,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    username: Result<Path<String>, PathRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    // A username that doesn't decode to UTF-8 can't belong to any account.
    let Ok(Path(username)) = username else {
        return Err(ApiError::not_found(USER_NOT_FOUND));
    };

    let profile = state
        .accounts
        .active_profile(&username)
        .await
        .map_err(|e| ApiError::internal(e, "Error fetching user profile"))?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    Ok(Json(ProfileResponse {
        success: true,
        user: profile,
    }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ChangePasswordRequest>,
) -> Result<Json<ChangePasswordResponse>, ApiError> {
    let user_id = parse_user_id(payload.user_id.as_ref())?;
    let (Some(user_id), Some(new_password)) = (user_id, present(payload.new_password)) else {
        return Err(ApiError::bad_request(PASSWORD_FIELDS_REQUIRED));
    };
    check_new_password(&new_password)?;

    let account = state
        .accounts
        .find_by_id(user_id)
        .await
        .map_err(|e| ApiError::internal(e, INTERNAL_MESSAGE))?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    if !account.is_active {
        warn!(user_id, "password change on deactivated account");
        return Err(ApiError::unauthorized(DEACTIVATED));
    }

    if let Some(current) = present(payload.current_password) {
        if !password_matches(&account.password, &current) {
            warn!(user_id, "password change with wrong current password");
            return Err(ApiError::unauthorized("Current password is incorrect"));
        }
    }

    let username = state
        .accounts
        .update_password(user_id, &new_password)
        .await
        .map_err(|e| ApiError::internal(e, INTERNAL_MESSAGE))?
        .ok_or_else(|| {
            ApiError::internal(
                anyhow::anyhow!("update matched no rows for id {user_id}"),
                "Error updating password",
            )
        })?;

    info!(user_id, %username, "password changed");
    Ok(Json(ChangePasswordResponse {
        success: true,
        message: "Password updated successfully".into(),
        username,
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>, ApiError> {
    let user_id = parse_user_id(payload.user_id.as_ref())?;
    let (Some(user_id), Some(new_password)) = (user_id, present(payload.new_password)) else {
        return Err(ApiError::bad_request(PASSWORD_FIELDS_REQUIRED));
    };
    check_new_password(&new_password)?;

    let user = state
        .accounts
        .reset_active_password(user_id, &new_password)
        .await
        .map_err(|e| ApiError::internal(e, INTERNAL_MESSAGE))?
        .ok_or_else(|| ApiError::not_found("User not found or deactivated"))?;

    info!(user_id, username = %user.username, "password reset");
    Ok(Json(ResetPasswordResponse {
        success: true,
        message: "Password reset successfully".into(),
        user,
    }))
}
