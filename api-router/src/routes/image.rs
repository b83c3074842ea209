use axum::{http::StatusCode, response::IntoResponse, Json};

/// Image uploads are not supported; kept so clients get a stable answer.
pub async fn upload_image() -> impl IntoResponse {
    (StatusCode::OK, Json("not implemented"))
}
