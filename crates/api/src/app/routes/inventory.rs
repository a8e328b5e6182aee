use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use consign_auth::Session;
use consign_core::ItemId;
use consign_inventory::NewItem;

use crate::app::{dto, errors, routes::parse_id, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/:id",
            get(get_item).patch(edit_item).delete(delete_item),
        )
        .route("/items/:id/status", post(change_status))
        .route("/items/:id/image", put(upload_image))
        .route("/history", get(list_history))
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Query(query): Query<dto::ListItemsQuery>,
) -> axum::response::Response {
    let (search, sort) = match query.directives() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let listed = services.inventory.list(&session, &search, sort).await;
    match listed {
        Ok(items) => Json(dto::ItemListResponse {
            items,
            search,
            sort,
            headers: dto::sort_headers(sort),
        })
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    body: Result<Json<NewItem>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.inventory.add(&session, body).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ItemId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.inventory.get(&session, id).await {
        Ok(item) => Json(dto::ItemDetailResponse::new(
            item,
            dto::Capabilities::full(),
            &services.public_base_url,
        ))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn edit_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    body: Result<Json<dto::EditItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: ItemId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patch = match body {
        Ok(Json(req)) => match req.into_patch() {
            Ok(patch) => patch,
            Err(e) => return errors::domain_error_to_response(e),
        },
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.inventory.edit(&session, id, patch).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ItemId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.inventory.delete(&session, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn change_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    body: Result<Json<dto::ChangeStatusRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: ItemId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.inventory.change_status(&session, id, &body.status).await {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Raw request body is the image; `?filename=` names it.
pub async fn upload_image(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Query(query): Query<dto::ImageUploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let id: ItemId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    match services
        .inventory
        .upload_image(&session, id, &query.filename, content_type, body.to_vec())
        .await
    {
        Ok(item) => Json(item).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
) -> axum::response::Response {
    match services.inventory.history(&session).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
