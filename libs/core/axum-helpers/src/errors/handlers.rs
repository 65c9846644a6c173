use axum::response::{IntoResponse, Response};

use super::{AppError, ErrorCode};

/// Router fallback producing the standard 404 body.
pub async fn not_found() -> Response {
    AppError::NotFound(ErrorCode::NotFound.default_message().to_string()).into_response()
}
