// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rider applications, review, and availability matching.

use parcelhub_core::types::{new_id, now_timestamp};
use parcelhub_core::{
    Collection, Filter, ParcelError, Rider, RiderStatus, Role, Sort, WorkStatus,
};
use serde_json::{Value, json};
use tracing::info;

use crate::authz::{Caller, Requirement};
use crate::saga::{Saga, Step};
use crate::store::{self, Store, assignments};
use crate::tracking::Tracker;
use crate::users::UserDirectory;

const UPDATE_RIDER: Step = Step::new("update_rider", "restore the rider's previous status");
const UPDATE_USER_ROLE: Step = Step::new("update_user_role", "restore the user's previous role");

/// A rider application as submitted by the applicant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiderApplication {
    pub name: String,
    pub district: String,
    pub phone: Option<String>,
    pub region: Option<String>,
}

#[derive(Clone)]
pub struct RiderDirectory {
    store: Store,
    users: UserDirectory,
    tracker: Tracker,
}

impl RiderDirectory {
    pub fn new(store: Store, users: UserDirectory, tracker: Tracker) -> Self {
        Self {
            store,
            users,
            tracker,
        }
    }

    pub async fn get(&self, rider_id: &str) -> Result<Rider, ParcelError> {
        store::find_one(&self.store, Collection::Riders, &Filter::by_id(rider_id))
            .await?
            .ok_or_else(|| ParcelError::not_found("rider", rider_id))
    }

    /// Files an application for the caller. One application per email.
    pub async fn apply(
        &self,
        caller: &Caller,
        application: RiderApplication,
    ) -> Result<Rider, ParcelError> {
        let name = application.name.trim();
        let district = application.district.trim();
        if name.is_empty() {
            return Err(ParcelError::InvalidArgument("name is required".to_string()));
        }
        if district.is_empty() {
            return Err(ParcelError::InvalidArgument(
                "district is required".to_string(),
            ));
        }

        let existing: Option<Rider> = store::find_one(
            &self.store,
            Collection::Riders,
            &Filter::new().eq_ignore_case("email", caller.email.as_str()),
        )
        .await?;
        if let Some(existing) = existing {
            return Err(ParcelError::Conflict(format!(
                "rider application already exists with status {}",
                existing.status
            )));
        }

        let rider = Rider {
            id: new_id(),
            name: name.to_string(),
            email: caller.email.clone(),
            phone: application.phone,
            region: application.region,
            district: district.to_string(),
            status: RiderStatus::Pending,
            work_status: None,
            created_at: now_timestamp(),
        };
        store::insert(&self.store, Collection::Riders, &rider).await?;
        info!(rider_id = %rider.id, email = %rider.email, "rider application received");
        Ok(rider)
    }

    /// Riders awaiting review, oldest first. Admin only.
    pub async fn pending(&self, caller: &Caller) -> Result<Vec<Rider>, ParcelError> {
        caller.require(Requirement::Admin)?;
        store::find_all(
            &self.store,
            Collection::Riders,
            &Filter::new().eq("status", RiderStatus::Pending.to_string()),
            Some(&Sort::asc("created_at")),
        )
        .await
    }

    /// Approved riders, including those with the legacy `approved` status. Admin only.
    pub async fn active(&self, caller: &Caller) -> Result<Vec<Rider>, ParcelError> {
        caller.require(Requirement::Admin)?;
        store::find_all(
            &self.store,
            Collection::Riders,
            &eligible(),
            Some(&Sort::asc("name")),
        )
        .await
    }

    /// Eligible riders in `district` that are free for a new delivery.
    ///
    /// Open to any signed-in caller. District matching ignores ASCII case;
    /// riders without a work status count as available. No ranking among
    /// matches.
    pub async fn available(
        &self,
        caller: &Caller,
        district: &str,
    ) -> Result<Vec<Rider>, ParcelError> {
        caller.require(Requirement::Authenticated)?;
        let district = district.trim();
        if district.is_empty() {
            return Err(ParcelError::InvalidArgument(
                "district is required".to_string(),
            ));
        }
        let filter = eligible()
            .eq_ignore_case("district", district)
            .one_of(
                "work_status",
                [json!(WorkStatus::Available), Value::Null],
            );
        store::find_all(&self.store, Collection::Riders, &filter, None).await
    }

    /// Approves or rejects a rider, updating the linked user role.
    ///
    /// Approval (`active` or `approved`) also marks the rider available and
    /// gives the user the `rider` role. Rejection takes the `rider` role back.
    pub async fn review(
        &self,
        caller: &Caller,
        rider_id: &str,
        status: RiderStatus,
    ) -> Result<Rider, ParcelError> {
        caller.require(Requirement::Admin)?;
        if status == RiderStatus::Pending {
            return Err(ParcelError::InvalidArgument(
                "a rider can only be moved to active, approved or rejected".to_string(),
            ));
        }
        let mut rider = self.get(rider_id).await?;
        let approve = status.is_eligible();

        let mut set = json!({ "status": status });
        if approve {
            set["work_status"] = json!(rider.work_status.unwrap_or(WorkStatus::Available));
        }

        let mut saga = Saga::begin(
            "review_rider",
            &self.tracker,
            format!("rider:{}", rider.id),
            None,
            caller.email.clone(),
        );
        saga.step(UPDATE_RIDER, async {
            self.store
                .update_one(Collection::Riders, &Filter::by_id(rider_id), assignments(set))
                .await
                .map(|_| ())
        })
        .await?;
        saga.step(UPDATE_USER_ROLE, async {
            if approve {
                self.users.assign_role_by_email(&rider.email, Role::Rider).await
            } else {
                self.users.revoke_rider_role(&rider.email).await
            }
        })
        .await?;
        saga.finish();

        info!(rider_id, status = %status, by = %caller.email, "rider reviewed");
        rider.status = status;
        if approve && rider.work_status.is_none() {
            rider.work_status = Some(WorkStatus::Available);
        }
        Ok(rider)
    }

    /// Sets a rider's work status.
    pub(crate) async fn set_work_status(
        &self,
        rider_id: &str,
        work_status: WorkStatus,
    ) -> Result<(), ParcelError> {
        let result = self
            .store
            .update_one(
                Collection::Riders,
                &Filter::by_id(rider_id),
                assignments(json!({ "work_status": work_status })),
            )
            .await?;
        if result.matched == 0 {
            return Err(ParcelError::not_found("rider", rider_id));
        }
        Ok(())
    }

    /// Moves a free rider to `in_delivery`.
    ///
    /// The write only matches while the rider's work status is `available`
    /// or unset, so of two concurrent claims exactly one wins; the other is a
    /// `Conflict`.
    pub(crate) async fn claim_for_delivery(&self, rider_id: &str) -> Result<(), ParcelError> {
        let filter = Filter::by_id(rider_id).one_of(
            "work_status",
            [json!(WorkStatus::Available), Value::Null],
        );
        let result = self
            .store
            .update_one(
                Collection::Riders,
                &filter,
                assignments(json!({ "work_status": WorkStatus::InDelivery })),
            )
            .await?;
        if result.matched == 0 {
            return Err(ParcelError::Conflict(format!(
                "rider {rider_id} is already on a delivery"
            )));
        }
        Ok(())
    }
}

fn eligible() -> Filter {
    Filter::new().one_of(
        "status",
        [
            RiderStatus::Active.to_string(),
            RiderStatus::Approved.to_string(),
        ],
    )
}
