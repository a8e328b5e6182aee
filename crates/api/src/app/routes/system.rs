use axum::{extract::Extension, http::StatusCode, Json};

use consign_auth::Session;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(session): Extension<Session>) -> Json<Session> {
    Json(session)
}
