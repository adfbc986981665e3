// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracking log routes. Reading a log is public; appending is for staff.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use parcelhub_core::TrackingLog;
use parcelhub_lifecycle::NewTrackingEntry;
use serde::Deserialize;

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct AppendRequest {
    #[serde(alias = "trackingId")]
    pub tracking_id: String,
    #[serde(default, alias = "parcelId")]
    pub parcel_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// POST /trackings
pub async fn append(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    body: Result<Json<AppendRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TrackingLog>)> {
    let Json(body) = body?;
    let log = state
        .services
        .tracker
        .append(
            &caller,
            NewTrackingEntry {
                tracking_id: body.tracking_id.trim().to_string(),
                parcel_id: body.parcel_id,
                status: body.status,
                message: body.message,
                updated_by: caller.email.clone(),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// GET /trackings/{tracking_id}/logs
pub async fn logs(
    State(state): State<AppState>,
    Path(tracking_id): Path<String>,
) -> ApiResult<Json<Vec<TrackingLog>>> {
    Ok(Json(state.services.tracker.logs(&tracking_id).await?))
}
