//! Multi-field patient filtering with urgency ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::temporal::{days_since_at, Urgency};
use crate::models::{PatientRecord, PatientStatus};

/// Filter criteria. Every field is optional; empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientFilter {
    /// Case-insensitive substring of the patient name
    pub search: Option<String>,
    /// Exact status
    pub status: Option<PatientStatus>,
    /// Minimum days since the reference timestamp
    pub min_days: Option<u32>,
    /// Exact doctor
    pub doctor: Option<String>,
    /// Exact responsible staff member
    pub responsible: Option<String>,
}

impl PatientFilter {
    /// Filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_status(mut self, status: PatientStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_min_days(mut self, min_days: u32) -> Self {
        self.min_days = Some(min_days);
        self
    }

    pub fn with_doctor(mut self, doctor: impl Into<String>) -> Self {
        self.doctor = Some(doctor.into());
        self
    }

    pub fn with_responsible(mut self, responsible: impl Into<String>) -> Self {
        self.responsible = Some(responsible.into());
        self
    }

    /// Whether a status filter is active (disables grouping).
    pub fn has_status(&self) -> bool {
        self.status.is_some()
    }

    /// Check a single record against every active predicate.
    pub fn matches(&self, patient: &PatientRecord, now: DateTime<Utc>) -> bool {
        self.matches_search(patient)
            && self.status.map_or(true, |status| patient.status == status)
            && exact(&self.doctor, Some(patient.doctor.as_str()))
            && exact(&self.responsible, patient.responsible.as_deref())
            && self.min_days.map_or(true, |min| {
                days_since_at(&patient.reference_timestamp(), now) >= min
            })
    }

    fn matches_search(&self, patient: &PatientRecord) -> bool {
        match active(&self.search) {
            None => true,
            // A record without a name never matches a search.
            Some(_) if patient.name.is_empty() => false,
            Some(needle) => patient
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn exact(wanted: &Option<String>, actual: Option<&str>) -> bool {
    match active(wanted) {
        None => true,
        Some(wanted) => actual == Some(wanted),
    }
}

/// Urgency of a record at `now`, from its reference timestamp.
pub fn urgency_of(patient: &PatientRecord, now: DateTime<Utc>) -> Urgency {
    Urgency::classify(days_since_at(&patient.reference_timestamp(), now))
}

/// Apply `filter` and sort by urgency, most urgent first.
///
/// Records of equal urgency keep their snapshot order.
pub fn filter_patients<'a>(
    patients: &'a [PatientRecord],
    filter: &PatientFilter,
    now: DateTime<Utc>,
) -> Vec<&'a PatientRecord> {
    let mut ranked: Vec<(u8, &PatientRecord)> = patients
        .iter()
        .filter(|p| filter.matches(p, now))
        .map(|p| (urgency_of(p, now).rank(), p))
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked.into_iter().map(|(_, p)| p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn patient(id: &str, name: &str, days_ago: i64) -> PatientRecord {
        PatientRecord {
            id: id.into(),
            name: name.into(),
            doctor: "Dr. Dante".into(),
            responsible: None,
            surgery_type: "Catarata".into(),
            phone: String::new(),
            status: PatientStatus::Requested,
            notes: None,
            created_at: Some((now() - Duration::days(days_ago)).timestamp_millis()),
            last_contact_at: None,
            visit_date: None,
        }
    }

    #[test]
    fn test_empty_filter_keeps_all() {
        let patients = vec![patient("1", "Ana", 0), patient("2", "Bia", 5)];
        let result = filter_patients(&patients, &PatientFilter::new(), now());
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_search_case_insensitive() {
        let patients = vec![patient("1", "Ana Souza", 0), patient("2", "Bianca", 0)];
        let result = filter_patients(&patients, &PatientFilter::new().with_search("SOU"), now());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "1");

        let result = filter_patients(&patients, &PatientFilter::new().with_search("an"), now());
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_search_skips_nameless() {
        let patients = vec![patient("1", "", 0)];
        let result = filter_patients(&patients, &PatientFilter::new().with_search("a"), now());
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_strings_are_unset() {
        let patients = vec![patient("1", "Ana", 0)];
        let filter = PatientFilter::new()
            .with_search("")
            .with_doctor("")
            .with_responsible("");
        assert_eq!(filter_patients(&patients, &filter, now()).len(), 1);
    }

    #[test]
    fn test_doctor_and_responsible_exact() {
        let mut a = patient("1", "Ana", 0);
        a.responsible = Some("Carla".into());
        let mut b = patient("2", "Bia", 0);
        b.doctor = "Dra. Fabiana".into();

        let patients = vec![a, b];
        let by_doctor = PatientFilter::new().with_doctor("Dra. Fabiana");
        let ids: Vec<_> = filter_patients(&patients, &by_doctor, now())
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["2"]);

        let by_responsible = PatientFilter::new().with_responsible("Carla");
        let ids: Vec<_> = filter_patients(&patients, &by_responsible, now())
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1"]);

        // Case matters for exact fields
        let lower = PatientFilter::new().with_responsible("carla");
        assert!(filter_patients(&patients, &lower, now()).is_empty());
    }

    #[test]
    fn test_min_days_inclusive() {
        let patients = vec![patient("1", "Ana", 29), patient("2", "Bia", 30)];
        let result = filter_patients(&patients, &PatientFilter::new().with_min_days(30), now());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "2");
    }

    #[test]
    fn test_sorted_by_urgency_desc() {
        let patients = vec![
            patient("1", "Ana", 0),
            patient("2", "Bia", 70),
            patient("3", "Cida", 35),
            patient("4", "Davi", 50),
        ];
        let ids: Vec<_> = filter_patients(&patients, &PatientFilter::new(), now())
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["2", "4", "3", "1"]);
    }

    #[test]
    fn test_ties_keep_snapshot_order() {
        // All "normal" and all "amarelo" respectively, with differing day counts.
        let patients = vec![
            patient("n1", "A", 3),
            patient("y1", "B", 40),
            patient("n2", "C", 20),
            patient("y2", "D", 31),
            patient("n3", "E", 0),
        ];
        let ids: Vec<_> = filter_patients(&patients, &PatientFilter::new(), now())
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["y1", "y2", "n1", "n2", "n3"]);
    }
}
