//! Status grouping for the patient list.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::filter::{filter_patients, PatientFilter};
use crate::models::{PatientRecord, PatientStatus};

/// Patients sharing a status, urgency-sorted.
#[derive(Debug, Clone, Serialize)]
pub struct StatusGroup<'a> {
    pub status: PatientStatus,
    pub label: &'static str,
    pub count: usize,
    pub patients: Vec<&'a PatientRecord>,
}

/// What the patient list shows for a given filter.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum PatientView<'a> {
    /// A status filter is active: one flat urgency-sorted list
    Flat(Vec<&'a PatientRecord>),
    /// No status filter: non-empty groups in journey order
    Grouped(Vec<StatusGroup<'a>>),
}

impl<'a> PatientView<'a> {
    /// Total records in the view.
    pub fn len(&self) -> usize {
        match self {
            PatientView::Flat(patients) => patients.len(),
            PatientView::Grouped(groups) => groups.iter().map(|g| g.count).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split an already-sorted list into status groups.
///
/// Groups follow journey order; relative order inside each group is kept.
pub fn group_by_status<'a>(sorted: &[&'a PatientRecord]) -> Vec<StatusGroup<'a>> {
    PatientStatus::ALL
        .into_iter()
        .filter_map(|status| {
            let members: Vec<&PatientRecord> = sorted
                .iter()
                .copied()
                .filter(|p| p.status == status)
                .collect();
            (!members.is_empty()).then(|| StatusGroup {
                status,
                label: status.label(),
                count: members.len(),
                patients: members,
            })
        })
        .collect()
}

/// Filter, sort, and group when no status is selected.
pub fn patient_view<'a>(
    patients: &'a [PatientRecord],
    filter: &PatientFilter,
    now: DateTime<Utc>,
) -> PatientView<'a> {
    let sorted = filter_patients(patients, filter, now);
    if filter.has_status() {
        PatientView::Flat(sorted)
    } else {
        PatientView::Grouped(group_by_status(&sorted))
    }
}
