//! HTTP handlers of the studio API.

use actix_multipart::MultipartError;
use actix_web::error::{InternalError, JsonPayloadError, PayloadError};
use actix_web::{HttpRequest, HttpResponse};
use serde_json::json;

pub mod auth;
pub mod generation;

fn bad_request<E>(err: E, message: &str) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(json!({ "error": message })),
    )
    .into()
}

/// Renders undecodable JSON bodies with the API error shape.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected JSON body: {err}");
    match err {
        JsonPayloadError::ContentType => bad_request(err, "Expected a JSON request body"),
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            InternalError::from_response(
                err,
                HttpResponse::PayloadTooLarge().json(json!({ "error": "Request body too large" })),
            )
            .into()
        }
        _ => bad_request(err, "Invalid JSON body"),
    }
}

/// Renders malformed or oversized multipart bodies with the API error shape.
pub fn multipart_error_handler(err: MultipartError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected multipart body: {err}");
    if matches!(err, MultipartError::Payload(PayloadError::Overflow)) {
        return InternalError::from_response(
            err,
            HttpResponse::PayloadTooLarge().json(json!({ "error": "File too large (max 10MB)" })),
        )
        .into();
    }
    bad_request(err, "Invalid multipart body")
}
