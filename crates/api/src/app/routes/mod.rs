use std::str::FromStr;

use axum::{routing::get, Router};

use consign_core::DomainError;

use crate::app::errors;

pub mod admin;
pub mod images;
pub mod inventory;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        // QR code target: the detail view of one item.
        .route("/item/:id", get(inventory::get_item))
        .nest("/inventory", inventory::router())
        .nest("/admin", admin::router())
}

/// Parse a path id, turning failure into a 400 response.
pub(crate) fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse().map_err(errors::domain_error_to_response)
}
