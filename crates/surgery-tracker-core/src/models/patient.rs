//! Patient models.

use serde::{Deserialize, Serialize};

use super::timestamp::Timestamp;

/// Doctors the clinic schedules surgeries for.
pub const DOCTORS: [&str; 3] = ["Dr. Dante", "Dr. Alberto", "Dra. Fabiana"];

/// Where a patient is in the surgery journey.
///
/// Serialized with the labels staff see on the dashboard; English names are
/// accepted on input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum PatientStatus {
    /// Surgical risk assessment requested
    #[default]
    #[serde(rename = "Paciente solicitado risco", alias = "requested")]
    Requested,
    /// Surgery scheduled
    #[serde(rename = "Paciente agendou cirurgia", alias = "scheduled")]
    Scheduled,
    /// Surgery performed
    #[serde(rename = "Paciente fez cirurgia", alias = "performed")]
    Performed,
    /// Patient declined surgery
    #[serde(rename = "Paciente não quer operar", alias = "declined")]
    Declined,
}

impl PatientStatus {
    /// All statuses in journey order.
    pub const ALL: [PatientStatus; 4] = [
        PatientStatus::Requested,
        PatientStatus::Scheduled,
        PatientStatus::Performed,
        PatientStatus::Declined,
    ];

    /// Dashboard label.
    pub fn label(self) -> &'static str {
        match self {
            PatientStatus::Requested => "Paciente solicitado risco",
            PatientStatus::Scheduled => "Paciente agendou cirurgia",
            PatientStatus::Performed => "Paciente fez cirurgia",
            PatientStatus::Declined => "Paciente não quer operar",
        }
    }

    /// Position in the journey (0-based).
    pub fn index(self) -> usize {
        match self {
            PatientStatus::Requested => 0,
            PatientStatus::Scheduled => 1,
            PatientStatus::Performed => 2,
            PatientStatus::Declined => 3,
        }
    }

    /// Parse a dashboard label or English name.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|status| {
            status.label() == value || status.short_name().eq_ignore_ascii_case(value)
        })
    }

    /// Short English name.
    pub fn short_name(self) -> &'static str {
        match self {
            PatientStatus::Requested => "requested",
            PatientStatus::Scheduled => "scheduled",
            PatientStatus::Performed => "performed",
            PatientStatus::Declined => "declined",
        }
    }
}

/// Which field supplied a record's reference timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSource {
    LastContact,
    VisitDate,
    CreatedAt,
    None,
}

/// A tracked surgery patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Store-assigned identifier
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Assigned doctor (see [`DOCTORS`])
    #[serde(default)]
    pub doctor: String,
    /// Staff member responsible for follow-up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible: Option<String>,
    /// Surgery type, free text
    #[serde(default)]
    pub surgery_type: String,
    /// Phone, free text
    #[serde(default)]
    pub phone: String,
    /// Journey status
    #[serde(default)]
    pub status: PatientStatus,
    /// Staff notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Creation time (epoch ms); absent only on legacy records
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Last time staff marked contact as done (epoch ms)
    #[serde(default)]
    pub last_contact_at: Option<i64>,
    /// Visit date as typed into the form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<String>,
}

impl PatientRecord {
    /// Build a fresh record from form input.
    ///
    /// Status always starts at [`PatientStatus::Requested`] and no contact
    /// has been made yet.
    pub fn from_new(id: String, new: NewPatient, created_at: i64) -> Self {
        Self {
            id,
            name: new.name,
            doctor: new.doctor,
            responsible: non_empty(new.responsible),
            surgery_type: new.surgery_type,
            phone: new.phone,
            status: PatientStatus::Requested,
            notes: non_empty(new.notes),
            created_at: Some(created_at),
            last_contact_at: None,
            visit_date: non_empty(new.visit_date),
        }
    }

    /// Which field drives urgency: last contact, then visit date, then creation.
    ///
    /// Zero timestamps and empty visit dates are skipped.
    pub fn reference_source(&self) -> ReferenceSource {
        if self.last_contact_at.is_some_and(|ts| ts != 0) {
            ReferenceSource::LastContact
        } else if self.visit_date.as_deref().is_some_and(|d| !d.is_empty()) {
            ReferenceSource::VisitDate
        } else if self.created_at.is_some_and(|ts| ts != 0) {
            ReferenceSource::CreatedAt
        } else {
            ReferenceSource::None
        }
    }

    /// The timestamp used for day counts and urgency.
    pub fn reference_timestamp(&self) -> Timestamp {
        match self.reference_source() {
            ReferenceSource::LastContact => self.last_contact_at.into(),
            ReferenceSource::VisitDate => self
                .visit_date
                .clone()
                .map(Timestamp::Text)
                .unwrap_or_default(),
            ReferenceSource::CreatedAt => self.created_at.into(),
            ReferenceSource::None => Timestamp::Missing,
        }
    }

    /// Whether staff has marked contact as done.
    pub fn is_contacted(&self) -> bool {
        self.last_contact_at.is_some_and(|ts| ts != 0)
    }

    /// Digits of the phone number.
    pub fn phone_digits(&self) -> String {
        self.phone.chars().filter(char::is_ascii_digit).collect()
    }
}

/// Form input for registering a patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub name: String,
    #[serde(default)]
    pub visit_date: Option<String>,
    #[serde(default)]
    pub doctor: String,
    #[serde(default)]
    pub surgery_type: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub responsible: Option<String>,
}

impl NewPatient {
    /// Create form input with the required name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Partial update merged into a stored record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientUpdate {
    pub status: Option<PatientStatus>,
    pub notes: Option<String>,
    /// `Some(None)` clears the contact marker.
    pub last_contact_at: Option<Option<i64>>,
    pub created_at: Option<i64>,
}

impl PatientUpdate {
    /// Whether the update touches nothing.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.notes.is_none()
            && self.last_contact_at.is_none()
            && self.created_at.is_none()
    }

    /// Apply onto an in-memory record.
    pub fn apply_to(&self, record: &mut PatientRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(notes) = &self.notes {
            record.notes = Some(notes.clone());
        }
        if let Some(last_contact_at) = self.last_contact_at {
            record.last_contact_at = last_contact_at;
        }
        if let Some(created_at) = self.created_at {
            record.created_at = Some(created_at);
        }
    }

    /// JSON object with only the touched fields (camelCase keys).
    pub fn to_json_patch(&self) -> serde_json::Value {
        let mut patch = serde_json::Map::new();
        if let Some(status) = self.status {
            patch.insert("status".into(), status.label().into());
        }
        if let Some(notes) = &self.notes {
            patch.insert("notes".into(), notes.clone().into());
        }
        if let Some(last_contact_at) = self.last_contact_at {
            patch.insert("lastContactAt".into(), last_contact_at.into());
        }
        if let Some(created_at) = self.created_at {
            patch.insert("createdAt".into(), created_at.into());
        }
        serde_json::Value::Object(patch)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PatientRecord {
        PatientRecord::from_new("p1".into(), NewPatient::new("Maria"), 1_000)
    }

    #[test]
    fn test_new_record_defaults() {
        let mut form = NewPatient::new("Maria");
        form.notes = Some("   ".into());
        form.visit_date = Some(String::new());
        let patient = PatientRecord::from_new("p1".into(), form, 1_000);

        assert_eq!(patient.status, PatientStatus::Requested);
        assert_eq!(patient.created_at, Some(1_000));
        assert_eq!(patient.last_contact_at, None);
        assert_eq!(patient.notes, None);
        assert_eq!(patient.visit_date, None);
    }

    #[test]
    fn test_reference_priority() {
        let mut patient = record();
        assert_eq!(patient.reference_source(), ReferenceSource::CreatedAt);
        assert_eq!(patient.reference_timestamp(), Timestamp::Epoch(1_000));

        patient.visit_date = Some("2024-01-15".into());
        assert_eq!(patient.reference_source(), ReferenceSource::VisitDate);

        patient.last_contact_at = Some(5_000);
        assert_eq!(patient.reference_source(), ReferenceSource::LastContact);
        assert_eq!(patient.reference_timestamp(), Timestamp::Epoch(5_000));
    }

    #[test]
    fn test_reference_skips_empty_values() {
        let mut patient = record();
        patient.last_contact_at = Some(0);
        patient.visit_date = Some(String::new());
        assert_eq!(patient.reference_source(), ReferenceSource::CreatedAt);

        patient.created_at = None;
        assert_eq!(patient.reference_timestamp(), Timestamp::Missing);
    }

    #[test]
    fn test_zero_contact_is_not_contact() {
        let mut patient = record();
        assert!(!patient.is_contacted());
        patient.last_contact_at = Some(0);
        assert!(!patient.is_contacted());
        patient.last_contact_at = Some(5_000);
        assert!(patient.is_contacted());
    }

    #[test]
    fn test_status_serde_labels() {
        let json = serde_json::to_string(&PatientStatus::Scheduled).unwrap();
        assert_eq!(json, r#""Paciente agendou cirurgia""#);

        let status: PatientStatus = serde_json::from_str(r#""declined""#).unwrap();
        assert_eq!(status, PatientStatus::Declined);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(PatientStatus::parse("Paciente fez cirurgia"), Some(PatientStatus::Performed));
        assert_eq!(PatientStatus::parse("Scheduled"), Some(PatientStatus::Scheduled));
        assert_eq!(PatientStatus::parse("unknown"), None);
    }

    #[test]
    fn test_legacy_record_deserialize() {
        let json = r#"{
            "name": "João",
            "doctor": "Dr. Dante",
            "surgeryType": "Catarata",
            "phone": "(67) 99999-1234",
            "status": "Paciente solicitado risco",
            "lastContactAt": null
        }"#;
        let patient: PatientRecord = serde_json::from_str(json).unwrap();
        assert_eq!(patient.created_at, None);
        assert_eq!(patient.surgery_type, "Catarata");
        assert_eq!(patient.phone_digits(), "67999991234");
    }

    #[test]
    fn test_update_apply_and_patch() {
        let mut patient = record();
        patient.last_contact_at = Some(9_000);

        let update = PatientUpdate {
            status: Some(PatientStatus::Scheduled),
            last_contact_at: Some(None),
            ..Default::default()
        };
        update.apply_to(&mut patient);
        assert_eq!(patient.status, PatientStatus::Scheduled);
        assert_eq!(patient.last_contact_at, None);

        let patch = update.to_json_patch();
        assert_eq!(patch["status"], "Paciente agendou cirurgia");
        assert!(patch["lastContactAt"].is_null());
        assert!(patch.get("notes").is_none());
    }
}
