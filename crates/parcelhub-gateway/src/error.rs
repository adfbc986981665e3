// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps [`ParcelError`] onto HTTP responses.
//!
//! Every failure leaves the handler as `{"error": <kind>, "message": <text>}`
//! with a status code chosen by its [`ErrorKind`].

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parcelhub_core::{ErrorKind, ParcelError};
use serde::Serialize;

/// Error type returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub ParcelError);

/// Response body for failures.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorKind,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::UpstreamFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ParcelError> for ApiError {
    fn from(err: ParcelError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ParcelError::InvalidArgument(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(ParcelError::InvalidArgument(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(ParcelError::InvalidArgument(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);
        if status.is_server_error() {
            tracing::error!(error = %self.0, kind = %kind, "request failed");
        } else {
            tracing::warn!(error = %self.0, kind = %kind, "request rejected");
        }

        let message = match &self.0 {
            // Internal details stay in the log.
            ParcelError::Internal(_) | ParcelError::Config(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error: kind, message })).into_response()
    }
}
