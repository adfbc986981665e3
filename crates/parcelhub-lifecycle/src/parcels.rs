// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parcel lifecycle: creation, rider assignment, status advance, cashout.
//!
//! Delivery status moves strictly forward:
//! `pending -> rider_assigned -> in_transit -> delivered | service_center_delivered`.
//! Every status write is conditional on the status that was read, so a
//! concurrent writer loses with `Conflict` instead of overwriting.

use parcelhub_core::types::{new_id, now_timestamp};
use parcelhub_core::{
    Collection, DeliveryStatus, Filter, Parcel, ParcelError, PaymentStatus, Sort, WorkStatus,
};
use serde_json::{Value, json};
use tracing::info;

use crate::authz::{Caller, Requirement};
use crate::payout::PayoutRates;
use crate::riders::RiderDirectory;
use crate::saga::{Saga, Step};
use crate::store::{self, Store, assignments};
use crate::tracking::{NewTrackingEntry, Tracker};

const MARK_RIDER_BUSY: Step = Step::new(
    "mark_rider_in_delivery",
    "set the rider's work_status back to available",
);
const ASSIGN_PARCEL: Step = Step::new(
    "update_parcel",
    "set the parcel back to pending and clear its assigned rider fields",
);
const LOG_ASSIGNMENT: Step = Step::new(
    "append_tracking",
    "append the missing rider_assigned tracking entry",
);
const ADVANCE_PARCEL: Step = Step::new(
    "update_parcel",
    "restore the parcel's previous delivery_status and clear the new timestamp",
);
const LOG_ADVANCE: Step = Step::new(
    "append_tracking",
    "append the missing status tracking entry",
);
const RELEASE_RIDER: Step = Step::new(
    "release_rider",
    "set the rider's work_status back to in_delivery",
);

/// Shipment details supplied by the creator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewParcel {
    pub title: String,
    /// Creator email; defaults to the caller.
    pub created_by: Option<String>,
    pub sender_district: String,
    pub receiver_district: String,
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

/// Optional filters for listing parcels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParcelQuery {
    pub created_by: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub delivery_status: Option<DeliveryStatus>,
}

/// Generates a tracking id such as `PCL-3F9A0C21`.
pub fn generate_tracking_id() -> String {
    let id = new_id();
    format!("PCL-{}", id[..8].to_ascii_uppercase())
}

fn required(field: &str, value: &str) -> Result<String, ParcelError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ParcelError::InvalidArgument(format!("{field} is required")))
    } else {
        Ok(value.to_string())
    }
}

#[derive(Clone)]
pub struct ParcelLifecycle {
    store: Store,
    riders: RiderDirectory,
    tracker: Tracker,
    rates: PayoutRates,
}

impl ParcelLifecycle {
    pub fn new(store: Store, riders: RiderDirectory, tracker: Tracker, rates: PayoutRates) -> Self {
        Self {
            store,
            riders,
            tracker,
            rates,
        }
    }

    async fn load(&self, parcel_id: &str) -> Result<Parcel, ParcelError> {
        store::find_one(&self.store, Collection::Parcels, &Filter::by_id(parcel_id))
            .await?
            .ok_or_else(|| ParcelError::not_found("parcel", parcel_id))
    }

    /// Creates a parcel in `pending`/`unpaid` with a server-set `createdAt`.
    pub async fn create(&self, caller: &Caller, new: NewParcel) -> Result<Parcel, ParcelError> {
        let created_by = match new.created_by.as_deref().map(str::trim) {
            None | Some("") => caller.email.clone(),
            Some(email) if caller.is(email) || caller.is_admin() => email.to_ascii_lowercase(),
            Some(_) => {
                return Err(ParcelError::Forbidden(
                    "parcels can only be created for your own account".to_string(),
                ));
            }
        };
        let total_cost = new
            .total_cost
            .ok_or_else(|| ParcelError::InvalidArgument("totalCost is required".to_string()))?;
        if !total_cost.is_finite() || total_cost < 0.0 {
            return Err(ParcelError::InvalidArgument(
                "totalCost must be a non-negative number".to_string(),
            ));
        }
        if new.weight.is_some_and(|w| !w.is_finite() || w < 0.0) {
            return Err(ParcelError::InvalidArgument(
                "weight must be a non-negative number".to_string(),
            ));
        }

        let parcel = Parcel {
            id: new_id(),
            title: required("title", &new.title)?,
            created_by,
            sender_district: required("sender_district", &new.sender_district)?,
            receiver_district: required("receiver_district", &new.receiver_district)?,
            total_cost,
            payment_status: PaymentStatus::Unpaid,
            delivery_status: DeliveryStatus::Pending,
            tracking_id: Some(
                new.tracking_id
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(generate_tracking_id),
            ),
            parcel_type: new.parcel_type,
            weight: new.weight,
            sender_name: new.sender_name,
            sender_contact: new.sender_contact,
            sender_address: new.sender_address,
            receiver_name: new.receiver_name,
            receiver_contact: new.receiver_contact,
            receiver_address: new.receiver_address,
            assigned_rider_id: None,
            assigned_rider_email: None,
            assigned_rider_name: None,
            payout_cashed: false,
            payout_amount: None,
            created_at: now_timestamp(),
            assigned_at: None,
            picked_up_at: None,
            delivered_at: None,
            cashed_out_at: None,
        };
        store::insert(&self.store, Collection::Parcels, &parcel).await?;
        info!(parcel_id = %parcel.id, created_by = %parcel.created_by, "parcel created");

        self.tracker
            .record(NewTrackingEntry {
                tracking_id: parcel.tracking_key().to_string(),
                parcel_id: Some(parcel.id.clone()),
                status: "parcel_created".to_string(),
                message: format!("Parcel \"{}\" created", parcel.title),
                updated_by: caller.email.clone(),
            })
            .await?;
        Ok(parcel)
    }

    /// Lists parcels newest first.
    ///
    /// Non-admins only see their own parcels; asking for someone else's is
    /// `Forbidden`.
    pub async fn list(&self, caller: &Caller, query: ParcelQuery) -> Result<Vec<Parcel>, ParcelError> {
        let created_by = match query.created_by {
            Some(email) if !caller.is(&email) && !caller.is_admin() => {
                return Err(ParcelError::Forbidden(
                    "cannot list another user's parcels".to_string(),
                ));
            }
            Some(email) => Some(email),
            None if caller.is_admin() => None,
            None => Some(caller.email.clone()),
        };

        let mut filter = Filter::new();
        if let Some(email) = created_by {
            filter = filter.eq_ignore_case("created_by", email);
        }
        if let Some(status) = query.payment_status {
            filter = match status {
                // Records written before the flag existed have no payment_status.
                PaymentStatus::Unpaid => filter.one_of(
                    "payment_status",
                    [json!(PaymentStatus::Unpaid), Value::Null],
                ),
                PaymentStatus::Paid => filter.eq("payment_status", json!(PaymentStatus::Paid)),
            };
        }
        if let Some(status) = query.delivery_status {
            filter = filter.eq("delivery_status", json!(status));
        }

        store::find_all(
            &self.store,
            Collection::Parcels,
            &filter,
            Some(&Sort::desc("createdAt")),
        )
        .await
    }

    /// Fetches one parcel. Visible to its creator, its assigned rider, and admins.
    pub async fn get(&self, caller: &Caller, parcel_id: &str) -> Result<Parcel, ParcelError> {
        let parcel = self.load(parcel_id).await?;
        let is_rider = parcel
            .assigned_rider_email
            .as_deref()
            .is_some_and(|email| caller.is(email));
        if caller.is(&parcel.created_by) || is_rider || caller.is_admin() {
            Ok(parcel)
        } else {
            Err(ParcelError::Forbidden(
                "parcel belongs to another user".to_string(),
            ))
        }
    }

    /// Deletes a parcel. Allowed to its creator and admins.
    pub async fn delete(&self, caller: &Caller, parcel_id: &str) -> Result<(), ParcelError> {
        let parcel = self.load(parcel_id).await?;
        if !caller.is(&parcel.created_by) && !caller.is_admin() {
            return Err(ParcelError::Forbidden(
                "only the creator or an admin can delete a parcel".to_string(),
            ));
        }
        let deleted = self
            .store
            .delete_one(Collection::Parcels, &Filter::by_id(parcel_id))
            .await?;
        if deleted == 0 {
            return Err(ParcelError::not_found("parcel", parcel_id));
        }
        info!(parcel_id, by = %caller.email, "parcel deleted");
        Ok(())
    }

    /// Assigns an eligible, free rider to a pending parcel. Admin only.
    ///
    /// Runs as a saga: parcel update, rider `in_delivery`, tracking entry.
    pub async fn assign_rider(
        &self,
        caller: &Caller,
        parcel_id: &str,
        rider_id: &str,
    ) -> Result<Parcel, ParcelError> {
        caller.require(Requirement::Admin)?;
        let mut parcel = self.load(parcel_id).await?;
        if !parcel
            .delivery_status
            .can_transition_to(DeliveryStatus::RiderAssigned)
        {
            return Err(ParcelError::InvalidArgument(format!(
                "cannot assign a rider to a parcel that is {}",
                parcel.delivery_status
            )));
        }

        let rider = self.riders.get(rider_id).await?;
        if !rider.status.is_eligible() {
            return Err(ParcelError::InvalidArgument(format!(
                "rider {} is {}, not active",
                rider.id, rider.status
            )));
        }
        if rider.work_status == Some(WorkStatus::InDelivery) {
            return Err(ParcelError::Conflict(format!(
                "rider {} is already on a delivery",
                rider.id
            )));
        }

        let now = now_timestamp();
        let mut saga = Saga::begin(
            "assign_rider",
            &self.tracker,
            parcel.tracking_key(),
            Some(parcel.id.clone()),
            caller.email.clone(),
        );

        // The rider is claimed first; a lost claim leaves the parcel untouched.
        saga.step(MARK_RIDER_BUSY, self.riders.claim_for_delivery(&rider.id))
            .await?;

        saga.step(ASSIGN_PARCEL, async {
            let result = self
                .store
                .update_one(
                    Collection::Parcels,
                    &Filter::by_id(parcel_id).eq("delivery_status", json!(DeliveryStatus::Pending)),
                    assignments(json!({
                        "delivery_status": DeliveryStatus::RiderAssigned,
                        "assigned_rider_id": rider.id,
                        "assigned_rider_email": rider.email,
                        "assigned_rider_name": rider.name,
                        "assigned_at": now,
                    })),
                )
                .await?;
            if result.matched == 0 {
                return Err(ParcelError::Conflict(
                    "parcel changed while assigning a rider".to_string(),
                ));
            }
            Ok(())
        })
        .await?;

        saga.step(
            LOG_ASSIGNMENT,
            self.tracker.record(NewTrackingEntry {
                tracking_id: parcel.tracking_key().to_string(),
                parcel_id: Some(parcel.id.clone()),
                status: DeliveryStatus::RiderAssigned.to_string(),
                message: format!("Assigned to rider {}", rider.name),
                updated_by: caller.email.clone(),
            }),
        )
        .await?;
        saga.finish();

        info!(parcel_id, rider_id = %rider.id, "rider assigned");
        parcel.delivery_status = DeliveryStatus::RiderAssigned;
        parcel.assigned_rider_id = Some(rider.id);
        parcel.assigned_rider_email = Some(rider.email);
        parcel.assigned_rider_name = Some(rider.name);
        parcel.assigned_at = Some(now);
        Ok(parcel)
    }

    /// Moves a parcel one step forward. Admins, or the assigned rider.
    ///
    /// `in_transit` stamps `picked_up_at`; the completed states stamp
    /// `delivered_at` and free the rider. `rider_assigned` is only reachable
    /// through [`ParcelLifecycle::assign_rider`].
    pub async fn advance_status(
        &self,
        caller: &Caller,
        parcel_id: &str,
        next: DeliveryStatus,
    ) -> Result<Parcel, ParcelError> {
        let mut parcel = self.load(parcel_id).await?;
        if !caller.is_admin() {
            caller.require(Requirement::Rider)?;
            let assigned = parcel
                .assigned_rider_email
                .as_deref()
                .is_some_and(|email| caller.is(email));
            if !assigned {
                return Err(ParcelError::Forbidden(
                    "parcel is not assigned to you".to_string(),
                ));
            }
        }

        let current = parcel.delivery_status;
        if next == DeliveryStatus::RiderAssigned || !current.can_transition_to(next) {
            return Err(ParcelError::InvalidArgument(format!(
                "illegal delivery status transition {current} -> {next}"
            )));
        }

        let now = now_timestamp();
        let mut set = json!({ "delivery_status": next });
        match next {
            DeliveryStatus::InTransit => set["picked_up_at"] = json!(now),
            DeliveryStatus::Delivered | DeliveryStatus::ServiceCenterDelivered => {
                set["delivered_at"] = json!(now)
            }
            DeliveryStatus::Pending | DeliveryStatus::RiderAssigned => {}
        }
        let message = match next {
            DeliveryStatus::InTransit => "Parcel picked up and in transit".to_string(),
            DeliveryStatus::Delivered => "Parcel delivered".to_string(),
            DeliveryStatus::ServiceCenterDelivered => {
                "Parcel delivered to the service center".to_string()
            }
            other => format!("Parcel is {other}"),
        };

        let mut saga = Saga::begin(
            "advance_status",
            &self.tracker,
            parcel.tracking_key(),
            Some(parcel.id.clone()),
            caller.email.clone(),
        );

        saga.step(ADVANCE_PARCEL, async {
            let result = self
                .store
                .update_one(
                    Collection::Parcels,
                    &Filter::by_id(parcel_id).eq("delivery_status", json!(current)),
                    assignments(set),
                )
                .await?;
            if result.matched == 0 {
                return Err(ParcelError::Conflict(format!(
                    "parcel is no longer {current}"
                )));
            }
            Ok(())
        })
        .await?;

        saga.step(
            LOG_ADVANCE,
            self.tracker.record(NewTrackingEntry {
                tracking_id: parcel.tracking_key().to_string(),
                parcel_id: Some(parcel.id.clone()),
                status: next.to_string(),
                message,
                updated_by: caller.email.clone(),
            }),
        )
        .await?;

        if next.is_completed() {
            if let Some(rider_id) = parcel.assigned_rider_id.as_deref() {
                saga.step(
                    RELEASE_RIDER,
                    self.riders.set_work_status(rider_id, WorkStatus::Available),
                )
                .await?;
            }
        }
        saga.finish();

        info!(parcel_id, from = %current, to = %next, by = %caller.email, "delivery status advanced");
        parcel.delivery_status = next;
        match next {
            DeliveryStatus::InTransit => parcel.picked_up_at = Some(now),
            DeliveryStatus::Delivered | DeliveryStatus::ServiceCenterDelivered => {
                parcel.delivered_at = Some(now)
            }
            DeliveryStatus::Pending | DeliveryStatus::RiderAssigned => {}
        }
        Ok(parcel)
    }

    /// Parcels currently assigned to the calling rider and not yet completed.
    pub async fn rider_active(&self, caller: &Caller) -> Result<Vec<Parcel>, ParcelError> {
        caller.require(Requirement::Rider)?;
        let filter = Filter::new()
            .eq_ignore_case("assigned_rider_email", caller.email.as_str())
            .one_of(
                "delivery_status",
                [
                    json!(DeliveryStatus::RiderAssigned),
                    json!(DeliveryStatus::InTransit),
                ],
            );
        store::find_all(
            &self.store,
            Collection::Parcels,
            &filter,
            Some(&Sort::asc("assigned_at")),
        )
        .await
    }

    /// The calling rider's completed deliveries, most recent first.
    pub async fn rider_completed(&self, caller: &Caller) -> Result<Vec<Parcel>, ParcelError> {
        caller.require(Requirement::Rider)?;
        let filter = Filter::new()
            .eq_ignore_case("assigned_rider_email", caller.email.as_str())
            .one_of(
                "delivery_status",
                [
                    json!(DeliveryStatus::Delivered),
                    json!(DeliveryStatus::ServiceCenterDelivered),
                ],
            );
        store::find_all(
            &self.store,
            Collection::Parcels,
            &filter,
            Some(&Sort::desc("delivered_at")),
        )
        .await
    }

    /// Cashes out the payout for a completed delivery. Once per parcel.
    ///
    /// Failures: absent parcel is `NotFound`, another rider's parcel is
    /// `Forbidden`, an incomplete delivery is `InvalidArgument`, and an
    /// already cashed parcel is `Conflict`.
    pub async fn cash_out(&self, caller: &Caller, parcel_id: &str) -> Result<Parcel, ParcelError> {
        caller.require(Requirement::Rider)?;
        let mut parcel = self.load(parcel_id).await?;

        let assigned = parcel
            .assigned_rider_email
            .as_deref()
            .is_some_and(|email| caller.is(email));
        if !assigned {
            return Err(ParcelError::Forbidden(
                "delivery belongs to another rider".to_string(),
            ));
        }
        if !parcel.delivery_status.is_completed() {
            return Err(ParcelError::InvalidArgument(format!(
                "delivery is {}, not completed",
                parcel.delivery_status
            )));
        }
        if parcel.payout_cashed {
            return Err(ParcelError::Conflict(
                "payout already cashed out".to_string(),
            ));
        }

        let amount = self.rates.payout(
            parcel.total_cost,
            &parcel.sender_district,
            &parcel.receiver_district,
        );
        let now = now_timestamp();
        let not_cashed = Filter::by_id(parcel_id)
            .one_of("payout_cashed", [json!(false), Value::Null]);
        let result = self
            .store
            .update_one(
                Collection::Parcels,
                &not_cashed,
                assignments(json!({
                    "payout_cashed": true,
                    "payout_amount": amount,
                    "cashed_out_at": now,
                })),
            )
            .await?;
        if result.matched == 0 {
            return Err(ParcelError::Conflict(
                "payout already cashed out".to_string(),
            ));
        }

        info!(parcel_id, rider = %caller.email, amount, "payout cashed out");
        parcel.payout_cashed = true;
        parcel.payout_amount = Some(amount);
        parcel.cashed_out_at = Some(now);
        Ok(parcel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, caller};
    use parcelhub_core::{RiderStatus, Role};

    fn new_parcel(created_by: &str, sender: &str, receiver: &str, cost: f64) -> NewParcel {
        NewParcel {
            title: "Box".into(),
            created_by: Some(created_by.into()),
            sender_district: sender.into(),
            receiver_district: receiver.into(),
            total_cost: Some(cost),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn creation_sets_pending_unpaid_and_timestamp() {
        let fx = Fixture::new();
        let user = caller("a@x.com", Role::User);
        let parcel = fx
            .parcels
            .create(&user, new_parcel("a@x.com", "Dhaka", "Dhaka", 100.0))
            .await
            .unwrap();

        assert_eq!(parcel.delivery_status, DeliveryStatus::Pending);
        assert_eq!(parcel.payment_status, PaymentStatus::Unpaid);
        assert!(!parcel.created_at.is_empty());
        let tracking_id = parcel.tracking_id.clone().unwrap();
        assert!(tracking_id.starts_with("PCL-"));

        let logs = fx.tracker.logs(&tracking_id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, "parcel_created");
    }

    #[tokio::test]
    async fn creation_validates_required_fields() {
        let fx = Fixture::new();
        let user = caller("a@x.com", Role::User);

        let mut missing_district = new_parcel("a@x.com", "Dhaka", " ", 10.0);
        assert!(matches!(
            fx.parcels.create(&user, missing_district.clone()).await,
            Err(ParcelError::InvalidArgument(_))
        ));
        missing_district.receiver_district = "Dhaka".into();
        missing_district.total_cost = Some(-1.0);
        assert!(matches!(
            fx.parcels.create(&user, missing_district.clone()).await,
            Err(ParcelError::InvalidArgument(_))
        ));
        missing_district.total_cost = None;
        assert!(matches!(
            fx.parcels.create(&user, missing_district).await,
            Err(ParcelError::InvalidArgument(_))
        ));
        assert!(matches!(
            fx.parcels
                .create(&user, new_parcel("b@x.com", "Dhaka", "Dhaka", 10.0))
                .await,
            Err(ParcelError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_scoped_to_caller() {
        let fx = Fixture::new();
        let a = caller("a@x.com", Role::User);
        let b = caller("b@x.com", Role::User);
        let first = fx.parcels.create(&a, new_parcel("a@x.com", "D", "D", 1.0)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = fx.parcels.create(&a, new_parcel("a@x.com", "D", "D", 2.0)).await.unwrap();
        fx.parcels.create(&b, new_parcel("b@x.com", "D", "D", 3.0)).await.unwrap();

        let mine = fx.parcels.list(&a, ParcelQuery::default()).await.unwrap();
        let ids: Vec<&str> = mine.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, [second.id.as_str(), first.id.as_str()]);

        let forbidden = fx
            .parcels
            .list(
                &a,
                ParcelQuery {
                    created_by: Some("b@x.com".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(forbidden, Err(ParcelError::Forbidden(_))));

        let admin = caller("boss@x.com", Role::Admin);
        assert_eq!(fx.parcels.list(&admin, ParcelQuery::default()).await.unwrap().len(), 3);
        let unpaid = fx
            .parcels
            .list(
                &admin,
                ParcelQuery {
                    payment_status: Some(PaymentStatus::Unpaid),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unpaid.len(), 3);
    }

    #[tokio::test]
    async fn full_delivery_flow_then_single_cashout() {
        let fx = Fixture::new();
        fx.seed_rider("r1", "rider@x.com", "Dhaka", RiderStatus::Active).await;
        let user = caller("a@x.com", Role::User);
        let admin = caller("boss@x.com", Role::Admin);
        let rider = caller("rider@x.com", Role::Rider);

        let parcel = fx
            .parcels
            .create(&user, new_parcel("a@x.com", "Dhaka", "dhaka", 100.0))
            .await
            .unwrap();

        let assigned = fx.parcels.assign_rider(&admin, &parcel.id, "r1").await.unwrap();
        assert_eq!(assigned.delivery_status, DeliveryStatus::RiderAssigned);
        assert_eq!(
            fx.riders.get("r1").await.unwrap().work_status,
            Some(WorkStatus::InDelivery)
        );
        assert_eq!(fx.parcels.rider_active(&rider).await.unwrap().len(), 1);

        let picked = fx
            .parcels
            .advance_status(&rider, &parcel.id, DeliveryStatus::InTransit)
            .await
            .unwrap();
        assert!(picked.picked_up_at.is_some());

        let delivered = fx
            .parcels
            .advance_status(&rider, &parcel.id, DeliveryStatus::Delivered)
            .await
            .unwrap();
        assert!(delivered.delivered_at.is_some());
        assert_eq!(
            fx.riders.get("r1").await.unwrap().work_status,
            Some(WorkStatus::Available)
        );
        assert_eq!(fx.parcels.rider_completed(&rider).await.unwrap().len(), 1);

        let cashed = fx.parcels.cash_out(&rider, &parcel.id).await.unwrap();
        assert!(cashed.payout_cashed);
        assert_eq!(cashed.payout_amount, Some(80.0));

        let again = fx.parcels.cash_out(&rider, &parcel.id).await;
        assert!(matches!(again, Err(ParcelError::Conflict(_))));

        let statuses: Vec<String> = fx
            .tracker
            .logs(parcel.tracking_key())
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.status)
            .collect();
        assert_eq!(
            statuses,
            ["parcel_created", "rider_assigned", "in_transit", "delivered"]
        );
    }

    #[tokio::test]
    async fn cross_district_payout_is_thirty_percent() {
        let fx = Fixture::new();
        fx.seed_rider("r1", "rider@x.com", "Dhaka", RiderStatus::Approved).await;
        let user = caller("a@x.com", Role::User);
        let admin = caller("boss@x.com", Role::Admin);
        let rider = caller("rider@x.com", Role::Rider);

        let parcel = fx
            .parcels
            .create(&user, new_parcel("a@x.com", "Dhaka", "Khulna", 100.0))
            .await
            .unwrap();
        fx.parcels.assign_rider(&admin, &parcel.id, "r1").await.unwrap();
        fx.parcels
            .advance_status(&admin, &parcel.id, DeliveryStatus::InTransit)
            .await
            .unwrap();
        fx.parcels
            .advance_status(&admin, &parcel.id, DeliveryStatus::ServiceCenterDelivered)
            .await
            .unwrap();

        let cashed = fx.parcels.cash_out(&rider, &parcel.id).await.unwrap();
        assert_eq!(cashed.payout_amount, Some(30.0));
    }

    #[tokio::test]
    async fn illegal_transitions_are_rejected() {
        let fx = Fixture::new();
        fx.seed_rider("r1", "rider@x.com", "Dhaka", RiderStatus::Active).await;
        let user = caller("a@x.com", Role::User);
        let admin = caller("boss@x.com", Role::Admin);

        let parcel = fx
            .parcels
            .create(&user, new_parcel("a@x.com", "Dhaka", "Dhaka", 10.0))
            .await
            .unwrap();

        for target in [
            DeliveryStatus::InTransit,
            DeliveryStatus::Delivered,
            DeliveryStatus::RiderAssigned,
            DeliveryStatus::Pending,
        ] {
            assert!(matches!(
                fx.parcels.advance_status(&admin, &parcel.id, target).await,
                Err(ParcelError::InvalidArgument(_))
            ));
        }

        fx.parcels.assign_rider(&admin, &parcel.id, "r1").await.unwrap();
        assert!(matches!(
            fx.parcels.assign_rider(&admin, &parcel.id, "r1").await,
            Err(ParcelError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn cashout_preconditions_are_distinct_failures() {
        let fx = Fixture::new();
        fx.seed_rider("r1", "rider@x.com", "Dhaka", RiderStatus::Active).await;
        let user = caller("a@x.com", Role::User);
        let admin = caller("boss@x.com", Role::Admin);
        let rider = caller("rider@x.com", Role::Rider);
        let other_rider = caller("other@x.com", Role::Rider);

        assert!(matches!(
            fx.parcels.cash_out(&rider, "missing").await,
            Err(ParcelError::NotFound { .. })
        ));

        let parcel = fx
            .parcels
            .create(&user, new_parcel("a@x.com", "Dhaka", "Dhaka", 10.0))
            .await
            .unwrap();
        fx.parcels.assign_rider(&admin, &parcel.id, "r1").await.unwrap();

        assert!(matches!(
            fx.parcels.cash_out(&other_rider, &parcel.id).await,
            Err(ParcelError::Forbidden(_))
        ));
        assert!(matches!(
            fx.parcels.cash_out(&rider, &parcel.id).await,
            Err(ParcelError::InvalidArgument(_))
        ));
        assert!(matches!(
            fx.parcels.cash_out(&user, &parcel.id).await,
            Err(ParcelError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn busy_or_unapproved_riders_cannot_be_assigned() {
        let fx = Fixture::new();
        fx.seed_rider("busy", "busy@x.com", "Dhaka", RiderStatus::Active).await;
        fx.seed_rider("new", "new@x.com", "Dhaka", RiderStatus::Pending).await;
        fx.riders.set_work_status("busy", WorkStatus::InDelivery).await.unwrap();
        let user = caller("a@x.com", Role::User);
        let admin = caller("boss@x.com", Role::Admin);
        let parcel = fx
            .parcels
            .create(&user, new_parcel("a@x.com", "Dhaka", "Dhaka", 10.0))
            .await
            .unwrap();

        assert!(matches!(
            fx.parcels.assign_rider(&admin, &parcel.id, "busy").await,
            Err(ParcelError::Conflict(_))
        ));
        assert!(matches!(
            fx.parcels.assign_rider(&admin, &parcel.id, "new").await,
            Err(ParcelError::InvalidArgument(_))
        ));
        assert!(matches!(
            fx.parcels.assign_rider(&admin, &parcel.id, "ghost").await,
            Err(ParcelError::NotFound { .. })
        ));
        assert!(matches!(
            fx.parcels.assign_rider(&user, &parcel.id, "busy").await,
            Err(ParcelError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_limited_to_creator_or_admin() {
        let fx = Fixture::new();
        let a = caller("a@x.com", Role::User);
        let b = caller("b@x.com", Role::User);
        let parcel = fx.parcels.create(&a, new_parcel("a@x.com", "D", "D", 1.0)).await.unwrap();

        assert!(matches!(
            fx.parcels.delete(&b, &parcel.id).await,
            Err(ParcelError::Forbidden(_))
        ));
        fx.parcels.delete(&a, &parcel.id).await.unwrap();
        assert!(matches!(
            fx.parcels.delete(&a, &parcel.id).await,
            Err(ParcelError::NotFound { .. })
        ));
    }
}
