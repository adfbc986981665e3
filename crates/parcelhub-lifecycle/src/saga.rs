// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-document operations as explicit sagas.
//!
//! The document store only guarantees single-document atomicity. A saga runs
//! its steps in a fixed order and logs intent before each one. When a step
//! fails, it appends a `saga_incomplete` entry to the parcel's tracking log
//! naming the steps that completed and the compensation each one needs, then
//! returns the original error. Compensations are recorded, never executed.

use std::future::Future;

use parcelhub_core::ParcelError;
use tracing::{error, info, warn};

use crate::tracking::{NewTrackingEntry, Tracker};

/// Tracking status used for the failure marker.
pub const SAGA_INCOMPLETE: &str = "saga_incomplete";

/// One step of a saga and the action that would undo it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub name: &'static str,
    pub compensation: &'static str,
}

impl Step {
    pub const fn new(name: &'static str, compensation: &'static str) -> Self {
        Self { name, compensation }
    }
}

/// A running saga over one parcel.
pub struct Saga<'a> {
    name: &'static str,
    tracker: &'a Tracker,
    tracking_id: String,
    parcel_id: Option<String>,
    actor: String,
    completed: Vec<Step>,
}

impl<'a> Saga<'a> {
    pub fn begin(
        name: &'static str,
        tracker: &'a Tracker,
        tracking_id: impl Into<String>,
        parcel_id: Option<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            name,
            tracker,
            tracking_id: tracking_id.into(),
            parcel_id,
            actor: actor.into(),
            completed: Vec::new(),
        }
    }

    /// Runs one step. `action` is not polled until intent has been logged.
    pub async fn step<T, F>(&mut self, step: Step, action: F) -> Result<T, ParcelError>
    where
        F: Future<Output = Result<T, ParcelError>>,
    {
        info!(
            saga = self.name,
            step = step.name,
            tracking_id = %self.tracking_id,
            "saga step starting"
        );
        match action.await {
            Ok(value) => {
                self.completed.push(step);
                Ok(value)
            }
            Err(err) => {
                self.abort(step, &err).await;
                Err(err)
            }
        }
    }

    /// Names of the steps completed so far.
    pub fn completed(&self) -> Vec<&'static str> {
        self.completed.iter().map(|s| s.name).collect()
    }

    /// Logs completion. Consumes the saga.
    pub fn finish(self) {
        info!(
            saga = self.name,
            tracking_id = %self.tracking_id,
            steps = self.completed.len(),
            "saga complete"
        );
    }

    async fn abort(&self, failed: Step, err: &ParcelError) {
        // Nothing was written yet, so there is nothing to report.
        if self.completed.is_empty() {
            warn!(saga = self.name, step = failed.name, error = %err, "saga step failed");
            return;
        }

        let message = self.incomplete_message(failed, err);
        error!(saga = self.name, step = failed.name, error = %err, "{message}");

        let entry = NewTrackingEntry {
            tracking_id: self.tracking_id.clone(),
            parcel_id: self.parcel_id.clone(),
            status: SAGA_INCOMPLETE.to_string(),
            message,
            updated_by: self.actor.clone(),
        };
        if let Err(log_err) = self.tracker.record(entry).await {
            error!(
                saga = self.name,
                error = %log_err,
                "could not record incomplete saga in tracking log"
            );
        }
    }

    fn incomplete_message(&self, failed: Step, err: &ParcelError) -> String {
        let done: Vec<&str> = self.completed.iter().map(|s| s.name).collect();
        let undo: Vec<&str> = self
            .completed
            .iter()
            .rev()
            .map(|s| s.compensation)
            .collect();
        format!(
            "{} stopped at `{}` ({err}); completed: {}; compensate: {}",
            self.name,
            failed.name,
            done.join(", "),
            undo.join("; ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::memory_store;
    use tracing_test::traced_test;

    const FIRST: Step = Step::new("first", "undo first");
    const SECOND: Step = Step::new("second", "undo second");
    const THIRD: Step = Step::new("third", "undo third");

    #[tokio::test]
    #[traced_test]
    async fn intent_is_logged_before_each_step() {
        let tracker = Tracker::new(memory_store());
        let mut saga = Saga::begin("demo", &tracker, "PCL-1", None, "admin@x.com");
        saga.step(FIRST, async { Ok(()) }).await.unwrap();
        saga.step(SECOND, async { Ok(()) }).await.unwrap();
        assert_eq!(saga.completed(), ["first", "second"]);
        saga.finish();

        assert!(logs_contain("saga step starting"));
        assert!(logs_contain("step=\"first\""));
        assert!(logs_contain("step=\"second\""));
        assert!(logs_contain("saga complete"));
    }

    #[tokio::test]
    #[traced_test]
    async fn failure_after_progress_records_compensations() {
        let tracker = Tracker::new(memory_store());
        let mut saga = Saga::begin("demo", &tracker, "PCL-2", Some("p2".into()), "admin@x.com");
        saga.step(FIRST, async { Ok(()) }).await.unwrap();
        saga.step(SECOND, async { Ok(()) }).await.unwrap();
        let err = saga
            .step(THIRD, async {
                Err::<(), _>(ParcelError::Internal("store went away".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ParcelError::Internal(_)));

        let logs = tracker.logs("PCL-2").await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, SAGA_INCOMPLETE);
        assert_eq!(logs[0].parcel_id.as_deref(), Some("p2"));
        assert!(logs[0].message.contains("stopped at `third`"));
        assert!(logs[0].message.contains("completed: first, second"));
        assert!(logs[0].message.contains("compensate: undo second; undo first"));
        assert!(logs_contain("stopped at"));
    }

    #[tokio::test]
    async fn failure_on_first_step_leaves_no_marker() {
        let tracker = Tracker::new(memory_store());
        let mut saga = Saga::begin("demo", &tracker, "PCL-3", None, "admin@x.com");
        let result = saga
            .step(FIRST, async { Err::<(), _>(ParcelError::Conflict("busy".into())) })
            .await;
        assert!(result.is_err());
        assert!(tracker.logs("PCL-3").await.unwrap().is_empty());
    }
}
