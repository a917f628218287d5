//! Patient query engine.
//!
//! Pipeline: Snapshot → Days/Urgency → Filter → Sort → Group → Aggregate
//!
//! Everything here is pure and total: bad dates count as 0 days, unknown
//! data lands in the "normal" tier, nothing returns an error.

mod filter;
mod grouping;
mod stats;
mod summary;
mod temporal;

pub use filter::*;
pub use grouping::*;
pub use stats::*;
pub use summary::*;
pub use temporal::*;

use chrono::{DateTime, Utc};

use crate::models::PatientRecord;

/// The current patient snapshot, owned by the caller.
///
/// Queries read whatever snapshot is loaded at call time; two consecutive
/// queries may observe different snapshots if [`PatientRoster::replace`]
/// ran in between.
#[derive(Debug, Clone, Default)]
pub struct PatientRoster {
    patients: Vec<PatientRecord>,
}

impl PatientRoster {
    /// Create a roster from a snapshot.
    pub fn new(patients: Vec<PatientRecord>) -> Self {
        Self { patients }
    }

    /// Swap in a fresh snapshot.
    pub fn replace(&mut self, patients: Vec<PatientRecord>) {
        self.patients = patients;
    }

    /// All patients in snapshot order.
    pub fn patients(&self) -> &[PatientRecord] {
        &self.patients
    }

    /// Look up a patient by ID.
    pub fn get(&self, id: &str) -> Option<&PatientRecord> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Patients still missing a creation timestamp.
    pub fn missing_created_at(&self) -> impl Iterator<Item = &PatientRecord> {
        self.patients.iter().filter(|p| p.created_at.is_none())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn filter(&self, filter: &PatientFilter) -> Vec<&PatientRecord> {
        self.filter_at(filter, Utc::now())
    }

    pub fn filter_at(&self, filter: &PatientFilter, now: DateTime<Utc>) -> Vec<&PatientRecord> {
        filter_patients(&self.patients, filter, now)
    }

    pub fn view(&self, filter: &PatientFilter) -> PatientView<'_> {
        self.view_at(filter, Utc::now())
    }

    pub fn view_at(&self, filter: &PatientFilter, now: DateTime<Utc>) -> PatientView<'_> {
        patient_view(&self.patients, filter, now)
    }

    pub fn summaries_at(&self, filter: &PatientFilter, now: DateTime<Utc>) -> Vec<PatientSummary<'_>> {
        self.filter_at(filter, now)
            .into_iter()
            .map(|p| PatientSummary::new(p, now))
            .collect()
    }

    pub fn dashboard_stats(&self) -> DashboardStats {
        self.dashboard_stats_at(Utc::now())
    }

    pub fn dashboard_stats_at(&self, now: DateTime<Utc>) -> DashboardStats {
        dashboard_stats(&self.patients, now)
    }

    pub fn monthly_report(&self) -> MonthlyReport {
        self.monthly_report_at(Utc::now())
    }

    pub fn monthly_report_at(&self, now: DateTime<Utc>) -> MonthlyReport {
        monthly_report(&self.patients, now)
    }
}
