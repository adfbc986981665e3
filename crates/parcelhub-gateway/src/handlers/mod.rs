// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers, one module per resource.

pub mod parcels;
pub mod payments;
pub mod riders;
pub mod trackings;
pub mod users;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use parcelhub_core::HealthStatus;
use serde::Serialize;

use crate::server::AppState;

/// Plain-text liveness banner.
pub const BANNER: &str = "Parcel server is running 🚚";

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when any collaborator is not fully healthy.
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub storage: String,
    pub identity: String,
    pub payments: String,
}

fn describe(status: Result<HealthStatus, parcelhub_core::ParcelError>) -> (bool, bool, String) {
    match status {
        Ok(HealthStatus::Healthy) => (true, true, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (true, false, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => (false, false, format!("unhealthy: {reason}")),
        Err(e) => (false, false, format!("unhealthy: {e}")),
    }
}

/// GET /
pub async fn banner() -> &'static str {
    BANNER
}

/// GET /health
///
/// 503 when the document store is unusable, 200 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (storage_up, storage_ok, storage) = describe(state.storage.health_check().await);
    let (_, identity_ok, identity) = describe(state.verifier.health_check().await);
    let (_, payments_ok, payments) = describe(state.processor.health_check().await);

    let code = if storage_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status = if storage_ok && identity_ok && payments_ok {
        "ok"
    } else {
        "degraded"
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            uptime_secs: state.started_at.elapsed().as_secs(),
            storage,
            identity,
            payments,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok",
            version: "0.1.0",
            uptime_secs: 42,
            storage: "healthy".into(),
            identity: "healthy".into(),
            payments: "degraded: no key".into(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["uptime_secs"], 42);
        assert_eq!(json["payments"], "degraded: no key");
    }

    #[test]
    fn describe_separates_reachable_from_fully_healthy() {
        assert_eq!(describe(Ok(HealthStatus::Healthy)), (true, true, "healthy".into()));
        let (up, ok, _) = describe(Ok(HealthStatus::Degraded("slow".into())));
        assert!(up && !ok);
        let (up, ok, text) = describe(Ok(HealthStatus::Unhealthy("closed".into())));
        assert!(!up && !ok);
        assert_eq!(text, "unhealthy: closed");
    }
}
