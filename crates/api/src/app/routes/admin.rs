//! Admin routes: aggregate stats, user administration and sales history.
//!
//! Every handler here requires a privileged session; non-admins get 403.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use consign_auth::{authorize, Action, PrincipalId, Session};

use crate::app::{errors, routes::parse_id, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/stats", get(stats))
        .route("/users", get(list_users))
        .route("/users/:id/toggle-admin", post(toggle_admin))
        .route("/history", get(history))
}

/// GET /admin/stats
pub async fn stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
) -> axum::response::Response {
    match services.inventory.stats(&session).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /admin/users
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
) -> axum::response::Response {
    match services.inventory.users(&session).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// POST /admin/users/:id/toggle-admin
pub async fn toggle_admin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id: PrincipalId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.inventory.toggle_privileged(&session, user_id).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// GET /admin/history
pub async fn history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
) -> axum::response::Response {
    if let Err(e) = authorize(&session, Action::ViewStats) {
        return errors::service_error_to_response(e.into());
    }

    match services.inventory.history(&session).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
