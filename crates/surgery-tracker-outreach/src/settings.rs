//! Clinic dialing settings.

use serde::{Deserialize, Serialize};

pub const DEFAULT_COUNTRY_CODE: &str = "55";
pub const DEFAULT_AREA_CODE: &str = "67";

/// Country and area code used to complete patient phone numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutreachSettings {
    pub country_code: String,
    /// Empty disables area-code prefixing
    pub area_code: String,
}

impl Default for OutreachSettings {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            area_code: DEFAULT_AREA_CODE.to_string(),
        }
    }
}

impl OutreachSettings {
    /// Strict parse; missing fields take defaults.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Lenient load from stored JSON: absent or invalid input yields defaults.
    pub fn from_json(raw: Option<&str>) -> Self {
        match raw.filter(|r| !r.trim().is_empty()) {
            None => Self::default(),
            Some(json) => Self::parse(json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Invalid outreach settings, using defaults");
                Self::default()
            }),
        }
    }

    /// Country code digits, falling back to the default when none are set.
    pub fn country_digits(&self) -> String {
        let digits = only_digits(&self.country_code);
        if digits.is_empty() {
            DEFAULT_COUNTRY_CODE.to_string()
        } else {
            digits
        }
    }

    /// Area code digits (possibly empty).
    pub fn area_digits(&self) -> String {
        only_digits(&self.area_code)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

pub(crate) fn only_digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
