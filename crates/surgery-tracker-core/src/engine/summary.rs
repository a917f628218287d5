//! Per-patient derived fields for list cards.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use super::temporal::{days_since_at, Urgency};
use crate::models::{PatientRecord, ReferenceSource};

/// The secondary line shown on a patient card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InfoLine {
    /// "Último contato: <date>"
    LastContact(NaiveDate),
    /// "Dias desde solicitação: <n>" (visit date drove the count)
    DaysSinceRequest(u32),
    /// "Dias desde cadastro: <n>"
    DaysSinceRegistration(u32),
}

impl InfoLine {
    /// Card text (pt-BR).
    pub fn label(&self) -> String {
        match self {
            InfoLine::LastContact(date) => format!("Último contato: {}", date.format("%d/%m/%Y")),
            InfoLine::DaysSinceRequest(days) => format!("Dias desde solicitação: {days}"),
            InfoLine::DaysSinceRegistration(days) => format!("Dias desde cadastro: {days}"),
        }
    }
}

/// Derived view of a single patient.
#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary<'a> {
    pub patient: &'a PatientRecord,
    pub days: u32,
    pub urgency: Urgency,
    pub contacted: bool,
    pub info: InfoLine,
}

impl<'a> PatientSummary<'a> {
    pub fn new(patient: &'a PatientRecord, now: DateTime<Utc>) -> Self {
        let days = days_since_at(&patient.reference_timestamp(), now);
        let info = match patient.reference_source() {
            ReferenceSource::LastContact => patient
                .last_contact_at
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .map(|dt| InfoLine::LastContact(dt.date_naive()))
                .unwrap_or(InfoLine::DaysSinceRegistration(days)),
            ReferenceSource::VisitDate => InfoLine::DaysSinceRequest(days),
            ReferenceSource::CreatedAt | ReferenceSource::None => {
                InfoLine::DaysSinceRegistration(days)
            }
        };

        Self {
            patient,
            days,
            urgency: Urgency::classify(days),
            contacted: patient.is_contacted(),
            info,
        }
    }
}
