use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::warn;

use catalog_core::{Envelope, FailureKind, ProductId};

use crate::app::dto::{CreateProductRequest, ProductDto, UpdateProductRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> Response {
    errors::envelope_response(services.products().get_all().await)
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return malformed_body(rejection),
    };

    if let Err(e) = body.to_new_product().validate() {
        warn!(error = %e, "rejected product payload");
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    created_response(services.products().post(&body).await)
}

/// Creation keeps a 400 for every unsuccessful envelope, whatever its own status.
pub fn created_response(envelope: Envelope<ProductDto>) -> Response {
    if let Some(kind) = envelope.failure_kind() {
        warn!(?kind, error = envelope.error_message(), "product was not created");
    }
    let status = if envelope.is_successful() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    errors::envelope_response_with(status, envelope)
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::envelope_response(services.products().get_by_id(id).await)
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return malformed_body(rejection),
    };
    errors::envelope_response(services.products().put(id, &body).await)
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    errors::envelope_response(services.products().delete(id).await)
}

fn parse_id(raw: &str) -> Result<ProductId, Response> {
    raw.parse::<ProductId>().map_err(|e| {
        let envelope: Envelope<ProductDto> = Envelope::failure(e.to_string(), FailureKind::InvalidInput);
        errors::envelope_response(envelope)
    })
}

fn malformed_body(rejection: JsonRejection) -> Response {
    errors::json_error(StatusCode::BAD_REQUEST, "invalid_json", rejection.body_text())
}
