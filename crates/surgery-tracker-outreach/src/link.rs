//! WhatsApp Web contact links.

use chrono::{DateTime, Utc};
use reqwest::Url;
use surgery_tracker_core::{PatientRecord, PatientSummary};
use thiserror::Error;

use crate::message::{contact_message, message_for};
use crate::settings::{only_digits, OutreachSettings};

pub const WHATSAPP_SEND_URL: &str = "https://web.whatsapp.com/send";

/// Numbers this short are assumed to lack an area code.
const MAX_LOCAL_DIGITS: usize = 9;

/// Outreach errors.
#[derive(Error, Debug)]
pub enum OutreachError {
    #[error("Phone number has no digits: {0:?}")]
    NoPhoneDigits(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

pub type OutreachResult<T> = Result<T, OutreachError>;

/// Full international number (digits only) for a patient phone.
///
/// Local numbers get the configured area code unless they already start
/// with it; the country code is always prefixed.
pub fn normalize_phone(phone: &str, settings: &OutreachSettings) -> OutreachResult<String> {
    let mut digits = only_digits(phone);
    if digits.is_empty() {
        return Err(OutreachError::NoPhoneDigits(phone.to_string()));
    }

    let area = settings.area_digits();
    if !area.is_empty() && digits.len() <= MAX_LOCAL_DIGITS && !digits.starts_with(&area) {
        digits.insert_str(0, &area);
    }

    Ok(format!("{}{}", settings.country_digits(), digits))
}

/// `https://web.whatsapp.com/send?phone=..&text=..` for a number and message.
pub fn whatsapp_link(phone: &str, text: &str, settings: &OutreachSettings) -> OutreachResult<Url> {
    let number = normalize_phone(phone, settings)?;
    let mut url =
        Url::parse(WHATSAPP_SEND_URL).map_err(|e| OutreachError::InvalidUrl(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("phone", &number)
        .append_pair("text", text);
    Ok(url)
}

/// Link for explicit message fields.
pub fn contact_link(
    phone: &str,
    name: &str,
    doctor: &str,
    surgery: &str,
    days: u32,
    settings: &OutreachSettings,
) -> OutreachResult<Url> {
    whatsapp_link(phone, &contact_message(name, doctor, surgery, days), settings)
}

/// Link for a patient card, using the same day count the card shows.
pub fn contact_link_for(
    patient: &PatientRecord,
    settings: &OutreachSettings,
    now: DateTime<Utc>,
) -> OutreachResult<Url> {
    let days = PatientSummary::new(patient, now).days;
    tracing::debug!(id = %patient.id, days, "Building contact link");
    whatsapp_link(&patient.phone, &message_for(patient, days), settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use surgery_tracker_core::NewPatient;

    fn text_param(url: &Url) -> String {
        url.query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[test]
    fn test_prefixes_area_and_country() {
        let settings = OutreachSettings::default();
        assert_eq!(normalize_phone("99999-0000", &settings).unwrap(), "5567999990000");
        assert_eq!(normalize_phone("3321-4567", &settings).unwrap(), "556733214567");
    }

    #[test]
    fn test_keeps_existing_area_code() {
        let settings = OutreachSettings::default();
        // Short, but already starts with 67
        assert_eq!(normalize_phone("67999990", &settings).unwrap(), "5567999990");
        // Long enough to carry its own area code
        assert_eq!(
            normalize_phone("(11) 99999-0000", &settings).unwrap(),
            "5511999990000"
        );
    }

    #[test]
    fn test_area_code_disabled() {
        let settings = OutreachSettings {
            area_code: String::new(),
            ..Default::default()
        };
        assert_eq!(normalize_phone("99999-0000", &settings).unwrap(), "55999990000");
    }

    #[test]
    fn test_no_digits() {
        assert!(matches!(
            normalize_phone("sem telefone", &OutreachSettings::default()),
            Err(OutreachError::NoPhoneDigits(_))
        ));
    }

    #[test]
    fn test_whatsapp_link() {
        let url = contact_link(
            "99999-0000",
            "Maria",
            "Dr. Dante",
            "Catarata",
            31,
            &OutreachSettings::default(),
        )
        .unwrap();

        assert_eq!(url.host_str(), Some("web.whatsapp.com"));
        assert_eq!(url.path(), "/send");
        assert!(url.as_str().contains("phone=55679999"));
        assert_eq!(
            text_param(&url),
            contact_message("Maria", "Dr. Dante", "Catarata", 31)
        );
    }

    #[test]
    fn test_contact_link_for_record() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let mut form = NewPatient::new("Ana");
        form.phone = "3321-4567".into();
        let patient = PatientRecord::from_new(
            "p1".into(),
            form,
            (now - Duration::days(50)).timestamp_millis(),
        );

        let url = contact_link_for(&patient, &OutreachSettings::default(), now).unwrap();
        assert!(text_param(&url).contains("Já se passaram 50 dias"));
    }

    proptest! {
        #[test]
        fn prop_normalized_is_prefixed_digits(phone in "[0-9 ()+-]{0,16}") {
            let settings = OutreachSettings::default();
            match normalize_phone(&phone, &settings) {
                Ok(number) => {
                    prop_assert!(number.starts_with("55"));
                    prop_assert!(number.chars().all(|c| c.is_ascii_digit()));
                    prop_assert!(number.ends_with(&only_digits(&phone)));
                }
                Err(_) => prop_assert!(only_digits(&phone).is_empty()),
            }
        }
    }
}
