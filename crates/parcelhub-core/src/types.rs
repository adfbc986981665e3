// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Records stored in the document store and common types used across adapter traits.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Timestamp format used for every stored timestamp.
///
/// Fixed width, so lexicographic order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current UTC time in [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Generates a fresh document identity.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of external collaborator an adapter stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Storage,
    Identity,
    Payments,
}

/// Identity claim produced by a successful bearer-token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Verified email, lower-cased.
    pub email: String,
    /// Identity provider's subject id, when it reports one.
    pub uid: Option<String>,
}

/// Request for a new payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    /// Amount in minor currency units (cents).
    pub amount_minor: u64,
    /// ISO 4217 currency code, lower-case.
    pub currency: String,
    /// Parcel the payment is for, attached as processor metadata.
    pub parcel_id: Option<String>,
}

/// A payment intent created by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: String,
    /// Opaque secret the client uses to complete payment out of band.
    pub client_secret: String,
}

/// Account role. A user record carries exactly one role at a time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
    Rider,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

/// Physical-fulfillment state of a parcel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    RiderAssigned,
    InTransit,
    Delivered,
    ServiceCenterDelivered,
}

impl DeliveryStatus {
    /// Whether the parcel reached one of the terminal delivery states.
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Delivered | Self::ServiceCenterDelivered)
    }

    /// Forward-only transition table.
    pub fn can_transition_to(self, next: DeliveryStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::RiderAssigned)
                | (Self::RiderAssigned, Self::InTransit)
                | (Self::InTransit, Self::Delivered)
                | (Self::InTransit, Self::ServiceCenterDelivered)
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RiderStatus {
    #[default]
    Pending,
    Active,
    /// Legacy spelling of `Active`, still present in older records.
    Approved,
    Rejected,
}

impl RiderStatus {
    /// Riders in this status may be assigned parcels.
    pub fn is_eligible(self) -> bool {
        matches!(self, Self::Active | Self::Approved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Available,
    InDelivery,
}

/// A shipment request, the central unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub created_by: String,
    pub sender_district: String,
    pub receiver_district: String,
    #[serde(rename = "totalCost")]
    pub total_cost: f64,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub delivery_status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parcel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_rider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_rider_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_rider_name: Option<String>,
    #[serde(default)]
    pub payout_cashed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_amount: Option<f64>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picked_up_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashed_out_at: Option<String>,
}

impl Parcel {
    /// Tracking identifier for log entries: the caller-supplied one, else the parcel id.
    pub fn tracking_key(&self) -> &str {
        self.tracking_id.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rider {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub district: String,
    #[serde(default)]
    pub status: RiderStatus,
    #[serde(default)]
    pub work_status: Option<WorkStatus>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: String,
    pub parcel_id: String,
    pub email: String,
    pub amount: f64,
    pub payment_method: String,
    pub transaction_id: String,
    /// Milliseconds since the Unix epoch.
    pub paid_at: i64,
    pub paid_at_string: String,
}

/// One append-only entry in a parcel's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingLog {
    #[serde(rename = "_id")]
    pub id: String,
    pub tracking_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parcel_id: Option<String>,
    pub status: String,
    pub message: String,
    pub updated_by: String,
    pub time: String,
}
