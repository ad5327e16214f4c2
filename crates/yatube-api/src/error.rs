use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use yatube_db::StoreError;
use yatube_types::api::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Store(StoreError::Validation {
                field,
                message,
                value,
            }) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: message,
                    field: Some(field.to_string()),
                    value: Some(value),
                },
            ),
            ApiError::Store(StoreError::NotFound(what)) => {
                (StatusCode::NOT_FOUND, plain(format!("{what} not found")))
            }
            ApiError::Store(ref e) if e.is_integrity() => (StatusCode::CONFLICT, plain(e.to_string())),
            ApiError::Store(e) => {
                error!("Store error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, plain("internal error".into()))
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                plain("authentication required".into()),
            ),
            ApiError::Forbidden(reason) => (StatusCode::FORBIDDEN, plain(reason.to_string())),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, plain("internal error".into())),
        };

        (status, Json(body)).into_response()
    }
}

fn plain(error: String) -> ErrorResponse {
    ErrorResponse {
        error,
        field: None,
        value: None,
    }
}
