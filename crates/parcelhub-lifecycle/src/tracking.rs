// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only tracking log.
//!
//! Entries are keyed by a tracking identifier, never updated or deleted, and
//! read back in ascending timestamp order.

use parcelhub_core::types::{new_id, now_timestamp};
use parcelhub_core::{Collection, Filter, ParcelError, Sort, TrackingLog};
use tracing::debug;

use crate::authz::{Caller, Requirement};
use crate::store::{self, Store};

/// Fields supplied when appending an entry. `_id` and `time` are server-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrackingEntry {
    pub tracking_id: String,
    pub parcel_id: Option<String>,
    pub status: String,
    pub message: String,
    pub updated_by: String,
}

#[derive(Clone)]
pub struct Tracker {
    store: Store,
}

impl Tracker {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Appends one entry stamped with the current time.
    pub async fn record(&self, entry: NewTrackingEntry) -> Result<TrackingLog, ParcelError> {
        if entry.tracking_id.trim().is_empty() {
            return Err(ParcelError::InvalidArgument(
                "tracking_id is required".to_string(),
            ));
        }
        if entry.status.trim().is_empty() {
            return Err(ParcelError::InvalidArgument("status is required".to_string()));
        }

        let log = TrackingLog {
            id: new_id(),
            tracking_id: entry.tracking_id,
            parcel_id: entry.parcel_id,
            status: entry.status,
            message: entry.message,
            updated_by: entry.updated_by,
            time: now_timestamp(),
        };
        store::insert(&self.store, Collection::Trackings, &log).await?;
        debug!(tracking_id = %log.tracking_id, status = %log.status, "tracking entry appended");
        Ok(log)
    }

    /// Appends an entry on behalf of staff (admins and riders).
    ///
    /// `updated_by` is always the caller.
    pub async fn append(
        &self,
        caller: &Caller,
        mut entry: NewTrackingEntry,
    ) -> Result<TrackingLog, ParcelError> {
        if !caller.is_admin() {
            caller.require(Requirement::Rider)?;
        }
        entry.updated_by = caller.email.clone();
        self.record(entry).await
    }

    /// All entries for `tracking_id`, oldest first. Equal timestamps keep append order.
    pub async fn logs(&self, tracking_id: &str) -> Result<Vec<TrackingLog>, ParcelError> {
        store::find_all(
            &self.store,
            Collection::Trackings,
            &Filter::new().eq("tracking_id", tracking_id),
            Some(&Sort::asc("time")),
        )
        .await
    }
}
