use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub success: bool,
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: &'static [&'static str],
}

const ENDPOINTS: &[&str] = &[
    "GET /",
    "GET /test-db",
    "POST /auth/login",
    "POST /auth/register",
    "GET /auth/profile/:username",
    "PUT /auth/change-password",
    "PUT /auth/reset-password",
    "GET /users",
    "POST /users",
    "GET /users/:id",
];

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        success: true,
        message: "Server is running",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS,
    })
}
