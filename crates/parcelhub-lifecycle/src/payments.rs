// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment intents, payment confirmation, and payment history.

use std::sync::Arc;

use parcelhub_core::types::{TIMESTAMP_FORMAT, new_id};
use parcelhub_core::{
    Collection, Filter, Parcel, ParcelError, Payment, PaymentIntent, PaymentIntentRequest,
    PaymentProcessor, PaymentStatus, Sort,
};
use serde_json::json;
use tracing::{info, warn};

use crate::authz::Caller;
use crate::saga::{Saga, Step};
use crate::store::{self, Store, assignments};
use crate::tracking::{NewTrackingEntry, Tracker};

const MARK_PAID: Step = Step::new("mark_parcel_paid", "set the parcel's payment_status back to unpaid");
const INSERT_PAYMENT: Step = Step::new("insert_payment", "delete the inserted payment record");
const LOG_PAYMENT: Step = Step::new("append_tracking", "append the missing payment_done tracking entry");

/// A completed payment as reported by the client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentConfirmation {
    pub parcel_id: String,
    /// Payer email; defaults to the caller.
    pub email: Option<String>,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub transaction_id: String,
}

#[derive(Clone)]
pub struct PaymentLedger {
    store: Store,
    processor: Arc<dyn PaymentProcessor>,
    tracker: Tracker,
    currency: String,
}

impl PaymentLedger {
    pub fn new(
        store: Store,
        processor: Arc<dyn PaymentProcessor>,
        tracker: Tracker,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            store,
            processor,
            tracker,
            currency: currency.into(),
        }
    }

    /// Asks the processor for a payment intent.
    ///
    /// When a parcel is named it must exist and still be unpaid.
    pub async fn create_intent(
        &self,
        caller: &Caller,
        amount_minor: i64,
        parcel_id: Option<String>,
    ) -> Result<PaymentIntent, ParcelError> {
        let amount_minor = u64::try_from(amount_minor)
            .ok()
            .filter(|amount| *amount > 0)
            .ok_or_else(|| {
                ParcelError::InvalidArgument("amountInCents must be a positive integer".to_string())
            })?;

        if let Some(id) = parcel_id.as_deref() {
            let parcel: Parcel =
                store::find_one(&self.store, Collection::Parcels, &Filter::by_id(id))
                    .await?
                    .ok_or_else(|| ParcelError::not_found("parcel", id))?;
            if parcel.payment_status == PaymentStatus::Paid {
                return Err(ParcelError::Conflict(format!("parcel {id} is already paid")));
            }
        }

        let intent = self
            .processor
            .create_payment_intent(PaymentIntentRequest {
                amount_minor,
                currency: self.currency.clone(),
                parcel_id,
            })
            .await?;
        info!(intent_id = %intent.id, amount_minor, by = %caller.email, "payment intent created");
        Ok(intent)
    }

    /// Records a completed payment and marks the parcel paid.
    ///
    /// An absent parcel is `NotFound`; an already paid one is `Conflict`, and
    /// no second Payment record is written.
    pub async fn confirm(
        &self,
        caller: &Caller,
        confirmation: PaymentConfirmation,
    ) -> Result<Payment, ParcelError> {
        let parcel_id = confirmation.parcel_id.trim();
        if parcel_id.is_empty() {
            return Err(ParcelError::InvalidArgument("parcelId is required".to_string()));
        }
        if confirmation.transaction_id.trim().is_empty() {
            return Err(ParcelError::InvalidArgument(
                "transactionId is required".to_string(),
            ));
        }
        if !confirmation.amount.is_finite() || confirmation.amount < 0.0 {
            return Err(ParcelError::InvalidArgument(
                "amount must be a non-negative number".to_string(),
            ));
        }
        let email = match confirmation.email.as_deref().map(str::trim) {
            None | Some("") => caller.email.clone(),
            Some(email) if caller.is(email) || caller.is_admin() => email.to_ascii_lowercase(),
            Some(_) => {
                return Err(ParcelError::Forbidden(
                    "payments can only be recorded for your own account".to_string(),
                ));
            }
        };

        let parcel: Parcel =
            store::find_one(&self.store, Collection::Parcels, &Filter::by_id(parcel_id))
                .await?
                .ok_or_else(|| ParcelError::not_found("parcel", parcel_id))?;
        if parcel.payment_status == PaymentStatus::Paid {
            return Err(ParcelError::Conflict(format!(
                "parcel {parcel_id} is already paid"
            )));
        }

        let paid_at = chrono::Utc::now();
        let payment = Payment {
            id: new_id(),
            parcel_id: parcel.id.clone(),
            email,
            amount: confirmation.amount,
            payment_method: confirmation
                .payment_method
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "card".to_string()),
            transaction_id: confirmation.transaction_id.trim().to_string(),
            paid_at: paid_at.timestamp_millis(),
            paid_at_string: paid_at
                .format(TIMESTAMP_FORMAT)
                .to_string(),
        };

        let mut saga = Saga::begin(
            "confirm_payment",
            &self.tracker,
            parcel.tracking_key(),
            Some(parcel.id.clone()),
            caller.email.clone(),
        );

        saga.step(MARK_PAID, async {
            // Records written before the flag existed carry no payment_status.
            let unpaid = Filter::by_id(parcel_id).one_of(
                "payment_status",
                [json!(PaymentStatus::Unpaid), serde_json::Value::Null],
            );
            let result = self
                .store
                .update_one(
                    Collection::Parcels,
                    &unpaid,
                    assignments(json!({ "payment_status": PaymentStatus::Paid })),
                )
                .await?;
            if result.matched == 0 {
                warn!(parcel_id, "payment raced with another confirmation");
                return Err(ParcelError::Conflict(format!(
                    "parcel {parcel_id} is already paid"
                )));
            }
            Ok(())
        })
        .await?;

        saga.step(
            INSERT_PAYMENT,
            store::insert(&self.store, Collection::Payments, &payment),
        )
        .await?;

        saga.step(
            LOG_PAYMENT,
            self.tracker.record(NewTrackingEntry {
                tracking_id: parcel.tracking_key().to_string(),
                parcel_id: Some(parcel.id.clone()),
                status: "payment_done".to_string(),
                message: format!(
                    "Payment of {:.2} received ({})",
                    payment.amount, payment.transaction_id
                ),
                updated_by: caller.email.clone(),
            }),
        )
        .await?;
        saga.finish();

        info!(parcel_id, payment_id = %payment.id, "payment recorded");
        Ok(payment)
    }

    /// Lists payments newest first.
    ///
    /// Defaults to the caller's own payments. Admins may ask for anyone's, or
    /// for everything by omitting the email.
    pub async fn history(
        &self,
        caller: &Caller,
        email: Option<String>,
    ) -> Result<Vec<Payment>, ParcelError> {
        let email = match email.filter(|e| !e.trim().is_empty()) {
            Some(email) if !caller.is(&email) && !caller.is_admin() => {
                return Err(ParcelError::Forbidden(
                    "cannot list another user's payments".to_string(),
                ));
            }
            Some(email) => Some(email),
            None if caller.is_admin() => None,
            None => Some(caller.email.clone()),
        };

        let filter = match email {
            Some(email) => Filter::new().eq_ignore_case("email", email.trim()),
            None => Filter::new(),
        };
        store::find_all(
            &self.store,
            Collection::Payments,
            &filter,
            Some(&Sort::desc("paid_at")),
        )
        .await
    }
}
