//! Public image serving. Uploaded image URLs point here.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
};

use consign_core::ItemId;

use crate::app::{errors, routes::parse_id, services::AppServices};

pub async fn serve_image(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, filename)): Path<(String, String)>,
) -> axum::response::Response {
    let id: ItemId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.inventory.image(id, &filename).await {
        Ok(obj) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, obj.content_type)],
            obj.bytes,
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
