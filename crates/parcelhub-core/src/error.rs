// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every parcelhub crate.

use serde::Serialize;
use strum::{Display, EnumString};
use thiserror::Error;

/// The primary error type used across adapter traits and lifecycle operations.
#[derive(Debug, Error)]
pub enum ParcelError {
    /// No credential was presented, or it failed verification.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The credential is valid but the caller's role does not permit the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A referenced entity is absent, or an update matched nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A required field is missing or a value is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The entity is already in the state the operation would move it to.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An external service (identity verifier, payment processor) failed.
    #[error("{service} error: {message}")]
    Upstream {
        service: &'static str,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Document store failure (connection, query, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors detected at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// The error taxonomy surfaced to callers at the handler boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    NotFound,
    InvalidArgument,
    Conflict,
    UpstreamFailure,
    Internal,
}

impl ParcelError {
    /// Shorthand for [`ParcelError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Wraps any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// Classifies this error into the caller-facing taxonomy.
    ///
    /// Store failures count as upstream failures: the document store is an
    /// external collaborator just like the identity and payment services.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated(_) => ErrorKind::Unauthenticated,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Upstream { .. } | Self::Storage { .. } => ErrorKind::UpstreamFailure,
            Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for ParcelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage {
            source: Box::new(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_and_upstream_collapse_to_upstream_failure() {
        let storage = ParcelError::storage(std::io::Error::other("disk"));
        let upstream = ParcelError::Upstream {
            service: "stripe",
            message: "boom".into(),
            source: None,
        };
        assert_eq!(storage.kind(), ErrorKind::UpstreamFailure);
        assert_eq!(upstream.kind(), ErrorKind::UpstreamFailure);
    }

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = ParcelError::not_found("parcel", "abc");
        assert_eq!(err.to_string(), "parcel not found: abc");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn error_kind_renders_snake_case() {
        assert_eq!(ErrorKind::InvalidArgument.to_string(), "invalid_argument");
        assert_eq!(
            serde_json::to_string(&ErrorKind::UpstreamFailure).unwrap(),
            "\"upstream_failure\""
        );
    }
}
