//! Mapping of use case errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chitchat_shared::protocol::{ErrorCode, ErrorResponse};
use thiserror::Error;

use crate::{
    domain::RegistryError,
    usecase::{ConnectError, OpenStreamError},
};

/// Error returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    OpenStream(#[from] OpenStreamError),

    /// The request body could not be decoded
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            ApiError::Connect(ConnectError::InvalidUsername(_)) | ApiError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidArgument)
            }
            ApiError::Connect(ConnectError::UsernameTaken(_))
            | ApiError::Connect(ConnectError::Registry(RegistryError::UsernameTaken(_))) => {
                (StatusCode::CONFLICT, ErrorCode::AlreadyExists)
            }
            ApiError::Connect(ConnectError::Registry(RegistryError::Unauthenticated))
            | ApiError::OpenStream(OpenStreamError::Unauthenticated) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::Unauthenticated)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorResponse {
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
