// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment routes.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use parcelhub_core::Payment;
use parcelhub_lifecycle::PaymentConfirmation;
use serde::{Deserialize, Serialize};

use crate::auth::Authenticated;
use crate::error::ApiResult;
use crate::server::AppState;

/// Request body for POST /create-payment-intent.
#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    #[serde(rename = "amountInCents", alias = "amount_in_cents")]
    pub amount_in_cents: i64,
    #[serde(default, rename = "parcelId", alias = "parcel_id")]
    pub parcel_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IntentResponse {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: String,
}

/// Request body for POST /payments.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    #[serde(rename = "parcelId", alias = "parcel_id")]
    pub parcel_id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub amount: f64,
    #[serde(default, rename = "paymentMethod", alias = "payment_method")]
    pub payment_method: Option<String>,
    #[serde(rename = "transactionId", alias = "transaction_id")]
    pub transaction_id: String,
}

#[derive(Debug, Serialize)]
pub struct RecordedPayment {
    #[serde(rename = "insertedId")]
    pub inserted_id: String,
    pub payment: Payment,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub email: Option<String>,
}

/// POST /create-payment-intent
pub async fn create_intent(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    body: Result<Json<IntentRequest>, JsonRejection>,
) -> ApiResult<Json<IntentResponse>> {
    let Json(body) = body?;
    let intent = state
        .services
        .payments
        .create_intent(&caller, body.amount_in_cents, body.parcel_id)
        .await?;
    Ok(Json(IntentResponse {
        client_secret: intent.client_secret,
        payment_intent_id: intent.id,
    }))
}

/// POST /payments
pub async fn confirm(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    body: Result<Json<PaymentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecordedPayment>)> {
    let Json(body) = body?;
    let payment = state
        .services
        .payments
        .confirm(
            &caller,
            PaymentConfirmation {
                parcel_id: body.parcel_id,
                email: body.email,
                amount: body.amount,
                payment_method: body.payment_method,
                transaction_id: body.transaction_id,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RecordedPayment {
            inserted_id: payment.id.clone(),
            payment,
        }),
    ))
}

/// GET /payments
pub async fn history(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Payment>>> {
    let Query(query) = query?;
    Ok(Json(state.services.payments.history(&caller, query.email).await?))
}
