use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::info;

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "code": 404, "message": "Not found" })),
    )
}

pub async fn health_check() -> impl IntoResponse {
    info!("worker router: health_check handler invoked");
    (StatusCode::OK, "OK").into_response()
}
