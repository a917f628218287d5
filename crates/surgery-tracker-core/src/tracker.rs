//! Patient tracker: a store plus the snapshot the engine queries.
//!
//! Every mutation goes to the store first and then reloads the snapshot,
//! so queries always reflect what the store holds.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::engine::PatientRoster;
use crate::models::{NewPatient, PatientStatus, PatientUpdate};
use crate::store::{PatientStore, StoreError};

/// Tracker errors.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Patient not found: {0}")]
    NotFound(String),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Coordinates a [`PatientStore`] with the in-memory [`PatientRoster`].
pub struct PatientTracker<S: PatientStore> {
    store: S,
    roster: PatientRoster,
    backfilled: bool,
}

impl<S: PatientStore> PatientTracker<S> {
    /// Create a tracker over `store`. Call [`load`](Self::load) before querying.
    pub fn new(store: S) -> Self {
        Self {
            store,
            roster: PatientRoster::default(),
            backfilled: false,
        }
    }

    /// Create and load, then run the one-time backfill.
    pub fn open(store: S) -> TrackerResult<Self> {
        let mut tracker = Self::new(store);
        tracker.load()?;
        tracker.backfill_created_at()?;
        Ok(tracker)
    }

    /// Current snapshot.
    pub fn roster(&self) -> &PatientRoster {
        &self.roster
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Refresh the snapshot from the store.
    pub fn load(&mut self) -> TrackerResult<usize> {
        let patients = self.store.snapshot()?;
        let count = patients.len();
        self.roster.replace(patients);
        Ok(count)
    }

    /// Register a patient. Status starts at "requested", no contact yet.
    pub fn add_patient(&mut self, patient: NewPatient) -> TrackerResult<String> {
        self.add_patient_at(patient, Utc::now())
    }

    pub fn add_patient_at(&mut self, patient: NewPatient, now: DateTime<Utc>) -> TrackerResult<String> {
        let id = self.store.push(&patient, now.timestamp_millis())?;
        tracing::debug!(%id, "Added patient");
        self.load()?;
        Ok(id)
    }

    /// Merge a partial update.
    pub fn update_patient(&mut self, id: &str, update: &PatientUpdate) -> TrackerResult<()> {
        if !self.store.update(id, update)? {
            return Err(TrackerError::NotFound(id.to_string()));
        }
        self.load()?;
        Ok(())
    }

    /// Edit form: status and notes.
    pub fn edit_patient(
        &mut self,
        id: &str,
        status: PatientStatus,
        notes: Option<String>,
    ) -> TrackerResult<()> {
        let update = PatientUpdate {
            status: Some(status),
            notes: Some(notes.unwrap_or_default()),
            ..Default::default()
        };
        self.update_patient(id, &update)
    }

    /// Flip the contact marker: stamp `now` if unset, clear it if set.
    ///
    /// Returns whether the patient is now marked as contacted.
    pub fn toggle_contact(&mut self, id: &str) -> TrackerResult<bool> {
        self.toggle_contact_at(id, Utc::now())
    }

    pub fn toggle_contact_at(&mut self, id: &str, now: DateTime<Utc>) -> TrackerResult<bool> {
        let patient = self
            .roster
            .get(id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))?;

        let next = if patient.is_contacted() {
            None
        } else {
            Some(now.timestamp_millis())
        };
        let update = PatientUpdate {
            last_contact_at: Some(next),
            ..Default::default()
        };
        self.update_patient(id, &update)?;
        Ok(next.is_some())
    }

    /// Delete a patient. Irreversible.
    pub fn remove_patient(&mut self, id: &str) -> TrackerResult<()> {
        if !self.store.remove(id)? {
            return Err(TrackerError::NotFound(id.to_string()));
        }
        tracing::debug!(%id, "Removed patient");
        self.load()?;
        Ok(())
    }

    /// Stamp `created_at = now` on every record missing it, keeping any
    /// contact marker. Runs once per tracker; later calls return 0.
    ///
    /// On a store failure the snapshot is refreshed and the pass stays
    /// pending, so a retry only touches records still missing the field.
    pub fn backfill_created_at(&mut self) -> TrackerResult<usize> {
        self.backfill_created_at_at(Utc::now())
    }

    pub fn backfill_created_at_at(&mut self, now: DateTime<Utc>) -> TrackerResult<usize> {
        if self.backfilled {
            return Ok(0);
        }

        let pending: Vec<(String, Option<i64>)> = self
            .roster
            .missing_created_at()
            .map(|p| (p.id.clone(), p.last_contact_at))
            .collect();

        let stamp = now.timestamp_millis();
        for (done, (id, last_contact_at)) in pending.iter().enumerate() {
            let update = PatientUpdate {
                created_at: Some(stamp),
                last_contact_at: Some(*last_contact_at),
                ..Default::default()
            };
            if let Err(e) = self.store.update(id, &update) {
                // Records stamped so far must not be stamped again on retry.
                if done > 0 {
                    if let Err(reload) = self.load() {
                        tracing::warn!(error = %reload, "Reload after partial backfill failed");
                    }
                }
                tracing::warn!(%id, stamped = done, error = %e, "Backfill interrupted");
                return Err(e.into());
            }
        }

        self.backfilled = true;
        if pending.is_empty() {
            tracing::debug!("All patients already have createdAt");
        } else {
            tracing::info!(count = pending.len(), "Backfilled missing createdAt");
            self.load()?;
        }
        Ok(pending.len())
    }
}
