// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for parcelhub.
//!
//! This crate provides the stored records, the error taxonomy, the document
//! filter model, and the adapter traits for the three external collaborators
//! (document store, identity verifier, payment processor).

pub mod document;
pub mod error;
pub mod traits;
pub mod types;

pub use document::{Collection, Document, Filter, ID_FIELD, Sort, SortDirection, UpdateResult};
pub use error::{ErrorKind, ParcelError};
pub use types::{
    AdapterType, DeliveryStatus, HealthStatus, Parcel, Payment, PaymentIntent,
    PaymentIntentRequest, PaymentStatus, Rider, RiderStatus, Role, TrackingLog, User,
    VerifiedIdentity, WorkStatus,
};

pub use traits::{IdentityVerifier, PaymentProcessor, PluginAdapter, StorageAdapter};
