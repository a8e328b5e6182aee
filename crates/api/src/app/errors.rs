use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use consign_core::DomainError;
use consign_infra::{GatewayError, ServiceError};

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Forbidden(e) => json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()),
        ServiceError::Gateway(e) => gateway_error_to_response(e),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InvalidState(_) => json_error(StatusCode::BAD_REQUEST, "invalid_state", message),
        DomainError::MalformedField { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "malformed_field", message)
        }
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
    }
}

fn gateway_error_to_response(err: GatewayError) -> axum::response::Response {
    match err {
        GatewayError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        GatewayError::PermissionDenied(msg) => {
            json_error(StatusCode::FORBIDDEN, "permission_denied", msg)
        }
        GatewayError::Rejected(msg) => json_error(StatusCode::BAD_REQUEST, "rejected", msg),
        GatewayError::Transport(msg) => json_error(StatusCode::BAD_GATEWAY, "gateway_error", msg),
    }
}

/// Unreadable request bodies. A missing JSON content type keeps its 415.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    let status = match rejection {
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::BAD_REQUEST,
    };
    json_error(status, "invalid_body", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
