use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use catalog_core::{Envelope, ResponseStatus};

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn http_status(status: ResponseStatus) -> StatusCode {
    match status {
        ResponseStatus::Ok => StatusCode::OK,
        ResponseStatus::BadRequest => StatusCode::BAD_REQUEST,
        ResponseStatus::NotFound => StatusCode::NOT_FOUND,
        ResponseStatus::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Serialize an envelope with the transport status mirroring its own status.
pub fn envelope_response<T: Serialize>(envelope: Envelope<T>) -> Response {
    envelope_response_with(http_status(envelope.status_code()), envelope)
}

pub fn envelope_response_with<T: Serialize>(status: StatusCode, envelope: Envelope<T>) -> Response {
    (status, Json(envelope)).into_response()
}
