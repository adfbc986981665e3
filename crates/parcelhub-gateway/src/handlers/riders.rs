// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rider application and review routes.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use parcelhub_core::{Rider, RiderStatus};
use parcelhub_lifecycle::RiderApplication;
use serde::Deserialize;

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApplyRequest {
    pub name: String,
    pub district: String,
    pub phone: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AvailableQuery {
    #[serde(default)]
    pub district: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub status: RiderStatus,
}

/// POST /riders
pub async fn apply(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    body: Result<Json<ApplyRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Rider>)> {
    let Json(body) = body?;
    let rider = state
        .services
        .riders
        .apply(
            &caller,
            RiderApplication {
                name: body.name,
                district: body.district,
                phone: body.phone,
                region: body.region,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(rider)))
}

/// GET /riders/pending
pub async fn pending(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<Json<Vec<Rider>>> {
    Ok(Json(state.services.riders.pending(&caller).await?))
}

/// GET /riders/active
pub async fn active(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<Json<Vec<Rider>>> {
    Ok(Json(state.services.riders.active(&caller).await?))
}

/// GET /riders/available?district=
pub async fn available(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    query: Result<Query<AvailableQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Rider>>> {
    let Query(query) = query?;
    Ok(Json(
        state
            .services
            .riders
            .available(&caller, &query.district)
            .await?,
    ))
}

/// PATCH /riders/{id}/status
pub async fn review(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> ApiResult<Json<Rider>> {
    let Json(body) = body?;
    Ok(Json(
        state
            .services
            .riders
            .review(&caller, &id, body.status)
            .await?,
    ))
}
