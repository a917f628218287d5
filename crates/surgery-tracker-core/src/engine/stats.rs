//! Dashboard statistics and the monthly conversion report.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::filter::PatientFilter;
use super::temporal::days_since_at;
use crate::models::{PatientRecord, PatientStatus};

/// Month names for report labels (pt-BR).
const MONTH_NAMES: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Dashboard counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// All records
    pub total: usize,
    /// Per status, in journey order
    pub by_status: [usize; 4],
    /// Reference timestamp 30+ days old
    pub over_30: usize,
    /// Reference timestamp 45+ days old
    pub over_45: usize,
    /// Reference timestamp 60+ days old
    pub over_60: usize,
}

impl DashboardStats {
    /// Count for one status.
    pub fn count_for(&self, status: PatientStatus) -> usize {
        self.by_status[status.index()]
    }
}

/// Compute dashboard counters over the whole snapshot.
pub fn dashboard_stats(patients: &[PatientRecord], now: DateTime<Utc>) -> DashboardStats {
    patients.iter().fold(
        DashboardStats {
            total: patients.len(),
            ..Default::default()
        },
        |mut stats, patient| {
            stats.by_status[patient.status.index()] += 1;

            let days = days_since_at(&patient.reference_timestamp(), now);
            if days >= 30 {
                stats.over_30 += 1;
            }
            if days >= 45 {
                stats.over_45 += 1;
            }
            if days >= 60 {
                stats.over_60 += 1;
            }
            stats
        },
    )
}

/// Conversion report for patients registered this calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// Human-readable month label, e.g. "outubro de 2026"
    pub month: String,
    /// Patients created this month
    pub total_patients: usize,
    /// Of those, how many scheduled surgery
    pub scheduled_surgeries: usize,
    /// scheduled / total * 100, two decimals; 0 when there are no patients
    pub conversion_rate: f64,
}

/// Build the monthly report for the month containing `now` (UTC).
///
/// Only `created_at` is considered; records without it are excluded.
pub fn monthly_report(patients: &[PatientRecord], now: DateTime<Utc>) -> MonthlyReport {
    let in_month: Vec<&PatientRecord> = patients
        .iter()
        .filter(|p| {
            p.created_at
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .is_some_and(|created| {
                    created.month() == now.month() && created.year() == now.year()
                })
        })
        .collect();

    let scheduled = in_month
        .iter()
        .filter(|p| p.status == PatientStatus::Scheduled)
        .count();

    MonthlyReport {
        month: month_label(now),
        total_patients: in_month.len(),
        scheduled_surgeries: scheduled,
        conversion_rate: conversion_rate(scheduled, in_month.len()),
    }
}

/// Percentage rounded to two decimals; 0 for an empty denominator.
pub fn conversion_rate(scheduled: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = scheduled as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

/// "outubro de 2026"
pub fn month_label(now: DateTime<Utc>) -> String {
    let name = MONTH_NAMES[now.month0() as usize];
    format!("{} de {}", name, now.year())
}

/// Dashboard card shortcuts that jump to a filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardShortcut {
    /// "Total de Pacientes": clear every filter
    All,
    /// A status card
    Status(PatientStatus),
    /// "30+ dias", "45+ dias", "60+ dias"
    OverDays(u32),
}

impl DashboardShortcut {
    /// Parse a card key: `all`, `over30`/`over45`/`over60`, or a status label.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "all" => Some(DashboardShortcut::All),
            _ => {
                if let Some(days) = key.strip_prefix("over") {
                    return days.parse().ok().map(DashboardShortcut::OverDays);
                }
                PatientStatus::parse(key).map(DashboardShortcut::Status)
            }
        }
    }

    /// The list filter this card opens.
    pub fn to_filter(self) -> PatientFilter {
        match self {
            DashboardShortcut::All => PatientFilter::new(),
            DashboardShortcut::Status(status) => PatientFilter::new().with_status(status),
            DashboardShortcut::OverDays(days) => PatientFilter::new().with_min_days(days),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn patient(status: PatientStatus, created: DateTime<Utc>) -> PatientRecord {
        let mut p = PatientRecord::from_new(
            "x".into(),
            crate::models::NewPatient::new("Paciente"),
            created.timestamp_millis(),
        );
        p.status = status;
        p
    }

    #[test]
    fn test_dashboard_thresholds_overlap() {
        let patients = vec![
            patient(PatientStatus::Requested, now() - Duration::days(61)),
            patient(PatientStatus::Requested, now() - Duration::days(45)),
            patient(PatientStatus::Scheduled, now() - Duration::days(30)),
            patient(PatientStatus::Declined, now() - Duration::days(29)),
        ];
        let stats = dashboard_stats(&patients, now());

        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_status, [2, 1, 0, 1]);
        assert_eq!(stats.count_for(PatientStatus::Declined), 1);
        assert_eq!(stats.over_30, 3);
        assert_eq!(stats.over_45, 2);
        assert_eq!(stats.over_60, 1);
    }

    #[test]
    fn test_dashboard_empty() {
        assert_eq!(dashboard_stats(&[], now()), DashboardStats::default());
    }

    #[test]
    fn test_monthly_report_current_month_only() {
        let patients = vec![
            patient(PatientStatus::Scheduled, now() - Duration::days(1)),
            patient(PatientStatus::Requested, now() - Duration::days(2)),
            patient(PatientStatus::Requested, now() - Duration::days(3)),
            // September
            patient(PatientStatus::Scheduled, now() - Duration::days(40)),
            // October last year
            patient(PatientStatus::Scheduled, now() - Duration::days(365)),
        ];
        let report = monthly_report(&patients, now());

        assert_eq!(report.month, "outubro de 2026");
        assert_eq!(report.total_patients, 3);
        assert_eq!(report.scheduled_surgeries, 1);
        assert_eq!(report.conversion_rate, 33.33);
    }

    #[test]
    fn test_monthly_report_ignores_contact_and_missing_creation() {
        let mut contacted = patient(PatientStatus::Scheduled, now() - Duration::days(40));
        contacted.last_contact_at = Some(now().timestamp_millis());
        let mut legacy = patient(PatientStatus::Scheduled, now());
        legacy.created_at = None;

        let report = monthly_report(&[contacted, legacy], now());
        assert_eq!(report.total_patients, 0);
        assert_eq!(report.conversion_rate, 0.0);
    }

    #[test]
    fn test_conversion_rate_rounding() {
        assert_eq!(conversion_rate(0, 0), 0.0);
        assert_eq!(conversion_rate(2, 3), 66.67);
        assert_eq!(conversion_rate(1, 1), 100.0);
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(DashboardShortcut::parse("all"), Some(DashboardShortcut::All));
        assert_eq!(DashboardShortcut::parse("over45"), Some(DashboardShortcut::OverDays(45)));
        assert_eq!(
            DashboardShortcut::parse("Paciente agendou cirurgia"),
            Some(DashboardShortcut::Status(PatientStatus::Scheduled))
        );
        assert_eq!(DashboardShortcut::parse("overdue"), None);

        let filter = DashboardShortcut::OverDays(60).to_filter();
        assert_eq!(filter.min_days, Some(60));
        assert!(DashboardShortcut::All.to_filter() == PatientFilter::new());
    }
}
