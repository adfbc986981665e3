// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business rules for the parcel marketplace.
//!
//! This crate provides:
//! - **Authorization gate**: resolves a verified identity to its stored role
//! - **Parcel lifecycle**: creation, rider assignment, forward-only status
//!   advance and rider cashout
//! - **Riders and users**: applications, review, availability matching, roles
//! - **Payments**: intents through the payment processor, confirmation, history
//! - **Tracking log**: append-only audit trail per tracking id
//! - **Sagas**: multi-document operations with logged intent and recorded
//!   compensations

pub mod authz;
pub mod parcels;
pub mod payments;
pub mod payout;
pub mod riders;
pub mod saga;
pub mod store;
pub mod tracking;
pub mod users;

use std::sync::Arc;

use parcelhub_core::PaymentProcessor;

pub use authz::{AuthorizationGate, Caller, Requirement};
pub use parcels::{NewParcel, ParcelLifecycle, ParcelQuery};
pub use payments::{PaymentConfirmation, PaymentLedger};
pub use payout::PayoutRates;
pub use riders::{RiderApplication, RiderDirectory};
pub use store::Store;
pub use tracking::{NewTrackingEntry, Tracker};
pub use users::{SavedUser, UserDirectory};

/// Every service, wired to one document store.
#[derive(Clone)]
pub struct Services {
    pub gate: AuthorizationGate,
    pub users: UserDirectory,
    pub riders: RiderDirectory,
    pub parcels: ParcelLifecycle,
    pub payments: PaymentLedger,
    pub tracker: Tracker,
}

impl Services {
    pub fn new(
        store: Store,
        processor: Arc<dyn PaymentProcessor>,
        rates: PayoutRates,
        currency: impl Into<String>,
    ) -> Self {
        let tracker = Tracker::new(store.clone());
        let users = UserDirectory::new(store.clone());
        let riders = RiderDirectory::new(store.clone(), users.clone(), tracker.clone());
        let parcels =
            ParcelLifecycle::new(store.clone(), riders.clone(), tracker.clone(), rates);
        let payments = PaymentLedger::new(store.clone(), processor, tracker.clone(), currency);
        Self {
            gate: AuthorizationGate::new(store),
            users,
            riders,
            parcels,
            payments,
            tracker,
        }
    }
}
