//! JSON error responses of the song API.
//!
//! Every failure is rendered as `{"error": ...}`. Validation failures carry
//! a field to message map, everything else a sentence.

use axum::{
    extract::rejection::JsonRejection,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use crate::catalog::CatalogError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound,
    MethodNotAllowed(Method),
    Catalog(CatalogError),
    Internal,
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound => ApiError::NotFound,
            err => ApiError::Catalog(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn message(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(reason) => message(StatusCode::BAD_REQUEST, reason),
            ApiError::NotFound => message(
                StatusCode::NOT_FOUND,
                "the requested resource could not be found",
            ),
            ApiError::MethodNotAllowed(method) => message(
                StatusCode::METHOD_NOT_ALLOWED,
                format!("the {} method is not supported for this resource", method),
            ),
            ApiError::Internal => message(
                StatusCode::INTERNAL_SERVER_ERROR,
                "the server encountered a problem and could not process your request",
            ),
            ApiError::Catalog(err) => match err {
                CatalogError::Validation(errors) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "error": errors })),
                )
                    .into_response(),
                CatalogError::NotFound => ApiError::NotFound.into_response(),
                CatalogError::EditConflict => message(
                    StatusCode::CONFLICT,
                    "unable to update the record due to an edit conflict, please try again",
                ),
                CatalogError::Timeout(_) | CatalogError::StoreUnavailable(_) => {
                    error!("Song store failure: {}", err);
                    message(
                        StatusCode::SERVICE_UNAVAILABLE,
                        "the song store is temporarily unavailable, please try again later",
                    )
                }
                CatalogError::ExternalLookupFailed(_) => {
                    warn!("{}", err);
                    message(
                        StatusCode::BAD_GATEWAY,
                        "the song details could not be retrieved",
                    )
                }
            },
        }
    }
}
