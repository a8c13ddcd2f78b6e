use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Error returned by every handler. Rendered as `{ "success": false, "message": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{message}")]
    Internal {
        message: String,
        detail: Option<String>,
    },
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Logs the underlying store error and hides it behind `message`.
    pub fn internal(err: anyhow::Error, message: impl Into<String>) -> Self {
        let message = message.into();
        error!(error = %err, %message, "request failed");
        Self::Internal {
            message,
            detail: None,
        }
    }

    /// Same as [`ApiError::internal`] but also exposes the error text to the client.
    pub fn internal_with_detail(err: anyhow::Error, message: impl Into<String>) -> Self {
        let message = message.into();
        error!(error = %err, %message, "request failed");
        Self::Internal {
            message,
            detail: Some(format!("{err:#}")),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let error = match self {
            Self::Internal { detail, .. } => detail,
            _ => None,
        };
        (
            status,
            Json(ErrorEnvelope {
                success: false,
                message,
                error,
            }),
        )
            .into_response()
    }
}
