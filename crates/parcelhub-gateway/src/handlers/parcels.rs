// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parcel routes and the rider-scoped delivery routes.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use parcelhub_core::{DeliveryStatus, Parcel, PaymentStatus};
use parcelhub_lifecycle::{NewParcel, ParcelQuery};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::server::AppState;

/// Request body for POST /parcels.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateParcelRequest {
    pub title: String,
    pub created_by: Option<String>,
    pub sender_district: String,
    pub receiver_district: String,
    #[serde(rename = "totalCost", alias = "total_cost")]
    pub total_cost: Option<f64>,
    pub tracking_id: Option<String>,
    pub parcel_type: Option<String>,
    pub weight: Option<f64>,
    pub sender_name: Option<String>,
    pub sender_contact: Option<String>,
    pub sender_address: Option<String>,
    pub receiver_name: Option<String>,
    pub receiver_contact: Option<String>,
    pub receiver_address: Option<String>,
}

impl From<CreateParcelRequest> for NewParcel {
    fn from(req: CreateParcelRequest) -> Self {
        Self {
            title: req.title,
            created_by: req.created_by,
            sender_district: req.sender_district,
            receiver_district: req.receiver_district,
            total_cost: req.total_cost,
            tracking_id: req.tracking_id,
            parcel_type: req.parcel_type,
            weight: req.weight,
            sender_name: req.sender_name,
            sender_contact: req.sender_contact,
            sender_address: req.sender_address,
            receiver_name: req.receiver_name,
            receiver_contact: req.receiver_contact,
            receiver_address: req.receiver_address,
        }
    }
}

/// Response body for POST /parcels.
#[derive(Debug, Serialize)]
pub struct CreatedParcel {
    #[serde(rename = "insertedId")]
    pub inserted_id: String,
    pub parcel: Parcel,
}

/// Query string for GET /parcels.
#[derive(Debug, Default, Deserialize)]
pub struct ListParcelsQuery {
    #[serde(alias = "created_by")]
    pub email: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub delivery_status: Option<DeliveryStatus>,
}

/// Request body for the status-advance routes.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(alias = "delivery_status")]
    pub status: DeliveryStatus,
}

/// Request body for PATCH /parcels/{id}/assign.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    #[serde(rename = "riderId", alias = "rider_id")]
    pub rider_id: String,
}

/// POST /parcels
pub async fn create(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    body: Result<Json<CreateParcelRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedParcel>)> {
    let Json(body) = body?;
    let parcel = state.services.parcels.create(&caller, body.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedParcel {
            inserted_id: parcel.id.clone(),
            parcel,
        }),
    ))
}

/// GET /parcels
pub async fn list(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    query: Result<Query<ListParcelsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Parcel>>> {
    let Query(query) = query?;
    let parcels = state
        .services
        .parcels
        .list(
            &caller,
            ParcelQuery {
                created_by: query.email.filter(|e| !e.trim().is_empty()),
                payment_status: query.payment_status,
                delivery_status: query.delivery_status,
            },
        )
        .await?;
    Ok(Json(parcels))
}

/// GET /parcels/{id}
pub async fn get_one(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<Parcel>> {
    Ok(Json(state.services.parcels.get(&caller, &id).await?))
}

/// DELETE /parcels/{id}
pub async fn delete(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.services.parcels.delete(&caller, &id).await?;
    Ok(Json(json!({ "deletedCount": 1 })))
}

/// PATCH /parcels/{id}/status
pub async fn advance_status(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Json<Parcel>> {
    let Json(body) = body?;
    let parcel = state
        .services
        .parcels
        .advance_status(&caller, &id, body.status)
        .await?;
    Ok(Json(parcel))
}

/// PATCH /parcels/{id}/assign
pub async fn assign_rider(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<AssignRequest>, JsonRejection>,
) -> ApiResult<Json<Parcel>> {
    let Json(body) = body?;
    let parcel = state
        .services
        .parcels
        .assign_rider(&caller, &id, body.rider_id.trim())
        .await?;
    Ok(Json(parcel))
}

/// GET /rider/parcels
pub async fn rider_active(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<Json<Vec<Parcel>>> {
    Ok(Json(state.services.parcels.rider_active(&caller).await?))
}

/// GET /rider/completed-deliveries
pub async fn rider_completed(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<Json<Vec<Parcel>>> {
    Ok(Json(state.services.parcels.rider_completed(&caller).await?))
}

/// PATCH /rider/completed-deliveries/{id}/cashout
pub async fn cash_out(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<Parcel>> {
    Ok(Json(state.services.parcels.cash_out(&caller, &id).await?))
}

/// PATCH /rider/update-status/{id}
///
/// Same transition rules as the admin route; the parcel must be assigned to
/// the calling rider.
pub async fn rider_update_status(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Json<Parcel>> {
    let Json(body) = body?;
    caller.require(parcelhub_lifecycle::Requirement::Rider)?;
    let parcel = state
        .services
        .parcels
        .advance_status(&caller, &id, body.status)
        .await?;
    Ok(Json(parcel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_accepts_camel_case_cost() {
        let req: CreateParcelRequest = serde_json::from_value(json!({
            "title": "Box",
            "created_by": "a@x.com",
            "sender_district": "Dhaka",
            "receiver_district": "Dhaka",
            "totalCost": 100
        }))
        .unwrap();
        assert_eq!(req.total_cost, Some(100.0));
        let parcel: NewParcel = req.into();
        assert_eq!(parcel.created_by.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn create_request_defaults_missing_fields() {
        let req: CreateParcelRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.title.is_empty());
        assert!(req.total_cost.is_none());
    }

    #[test]
    fn status_request_rejects_unknown_status() {
        assert!(serde_json::from_value::<StatusRequest>(json!({"status": "teleported"})).is_err());
        let req: StatusRequest = serde_json::from_value(json!({"status": "in_transit"})).unwrap();
        assert_eq!(req.status, DeliveryStatus::InTransit);
    }
}
