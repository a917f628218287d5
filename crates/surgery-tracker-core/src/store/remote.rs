//! Realtime database REST client.
//!
//! Layout: `{base}/patients/{id}.json`. Push IDs sort chronologically, so
//! key order is creation order.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

use super::{PatientStore, StoreError, StoreMode, StoreResult};
use crate::config::StoreConfig;
use crate::models::{NewPatient, PatientRecord, PatientUpdate};

/// Remote patient store.
pub struct RemoteStore {
    base_url: String,
    auth_token: Option<String>,
    client: Client,
}

/// Characters the realtime database rejects in keys.
const FORBIDDEN_KEY_CHARS: [char; 6] = ['/', '.', '#', '$', '[', ']'];

/// Whether `id` can name a single record under `/patients`.
///
/// Anything else would address the collection, a child field, or carry a
/// query string once placed in the URL path.
pub fn is_valid_key(id: &str) -> bool {
    !id.is_empty()
        && !id
            .chars()
            .any(|c| FORBIDDEN_KEY_CHARS.contains(&c) || c == '?' || c.is_control())
}

/// Body returned by a push (`POST`).
#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

impl RemoteStore {
    /// Create a client for the database at `database_url`.
    pub fn new(
        database_url: &str,
        auth_token: Option<String>,
        timeout_secs: u64,
    ) -> StoreResult<Self> {
        let base_url = database_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(StoreError::Config("database URL is empty".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            auth_token: auth_token.filter(|t| !t.is_empty()),
            client,
        })
    }

    /// Create from store settings.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| StoreError::Config("missing databaseURL".into()))?;
        Self::new(url, config.auth_token.clone(), config.timeout_secs())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/patients.json", self.base_url)
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/patients/{}.json", self.base_url, id)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.query(&[("auth", token)]),
            None => request,
        }
    }

    fn exists(&self, id: &str) -> StoreResult<bool> {
        if !is_valid_key(id) {
            tracing::warn!(%id, "Rejected invalid patient key");
            return Ok(false);
        }
        let response = self.send(self.client.get(self.record_url(id)))?;
        let value: Value = response.json()?;
        Ok(!value.is_null())
    }

    fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = self.authorized(request).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// JSON body for a new patient (the store supplies the key).
pub fn push_body(patient: &NewPatient, created_at: i64) -> StoreResult<Value> {
    let record = PatientRecord::from_new(String::new(), patient.clone(), created_at);
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut value {
        map.remove("id");
    }
    Ok(value)
}

/// Decode a `/patients.json` body into records.
///
/// `null` means an empty collection. Entries that fail to decode are
/// skipped with a warning rather than failing the whole snapshot. Records
/// come back in key order, which is push order.
pub fn decode_snapshot(body: Value) -> Vec<PatientRecord> {
    let Value::Object(entries) = body else {
        return Vec::new();
    };

    let mut entries: Vec<(String, Value)> = entries.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    entries
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<PatientRecord>(value) {
            Ok(mut patient) => {
                patient.id = key;
                Some(patient)
            }
            Err(e) => {
                tracing::warn!(id = %key, error = %e, "Skipping malformed patient record");
                None
            }
        })
        .collect()
}

impl PatientStore for RemoteStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Remote
    }

    fn push(&self, patient: &NewPatient, created_at: i64) -> StoreResult<String> {
        let body = push_body(patient, created_at)?;
        let response = self.send(self.client.post(self.collection_url()).json(&body))?;
        let pushed: PushResponse = response.json()?;
        Ok(pushed.name)
    }

    fn update(&self, id: &str, update: &PatientUpdate) -> StoreResult<bool> {
        // PATCH would create a stub record for an unknown key.
        if !self.exists(id)? {
            return Ok(false);
        }
        if update.is_empty() {
            return Ok(true);
        }
        self.send(
            self.client
                .patch(self.record_url(id))
                .json(&update.to_json_patch()),
        )?;
        Ok(true)
    }

    fn remove(&self, id: &str) -> StoreResult<bool> {
        if !self.exists(id)? {
            return Ok(false);
        }
        self.send(self.client.delete(self.record_url(id)))?;
        Ok(true)
    }

    fn snapshot(&self) -> StoreResult<Vec<PatientRecord>> {
        let response = self.send(self.client.get(self.collection_url()))?;
        let body: Value = response.json()?;
        let patients = decode_snapshot(body);
        tracing::debug!(count = patients.len(), "Loaded remote patient snapshot");
        Ok(patients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientStatus;
    use serde_json::json;

    #[test]
    fn test_urls() {
        let store = RemoteStore::new("https://clinic.firebaseio.com/", None, 5).unwrap();
        assert_eq!(store.base_url(), "https://clinic.firebaseio.com");
        assert_eq!(
            store.collection_url(),
            "https://clinic.firebaseio.com/patients.json"
        );
        assert_eq!(
            store.record_url("-Nabc"),
            "https://clinic.firebaseio.com/patients/-Nabc.json"
        );
    }

    #[test]
    fn test_empty_url_rejected() {
        assert!(matches!(
            RemoteStore::new("  ", None, 5),
            Err(StoreError::Config(_))
        ));
        assert!(matches!(
            RemoteStore::from_config(&StoreConfig::default()),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    fn test_push_body_shape() {
        let mut form = NewPatient::new("Maria");
        form.doctor = "Dr. Dante".into();
        form.surgery_type = "Catarata".into();

        let body = push_body(&form, 1_700_000_000_000).unwrap();
        assert!(body.get("id").is_none());
        assert_eq!(body["name"], "Maria");
        assert_eq!(body["surgeryType"], "Catarata");
        assert_eq!(body["status"], "Paciente solicitado risco");
        assert_eq!(body["createdAt"], 1_700_000_000_000_i64);
        assert!(body["lastContactAt"].is_null());
    }

    #[test]
    fn test_decode_snapshot() {
        let body = json!({
            "-Na": {
                "name": "Ana",
                "doctor": "Dr. Dante",
                "surgeryType": "Catarata",
                "phone": "6799990000",
                "status": "Paciente agendou cirurgia",
                "createdAt": 1_700_000_000_000_i64,
                "lastContactAt": null
            },
            "-Nb": { "name": "Bia", "status": "não existe" },
            "-Nc": { "name": "Cida", "status": "Paciente fez cirurgia", "visitDate": "2026-09-01" }
        });

        let patients = decode_snapshot(body);
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[0].id, "-Na");
        assert_eq!(patients[0].status, PatientStatus::Scheduled);
        assert_eq!(patients[1].id, "-Nc");
        assert_eq!(patients[1].created_at, None);
        assert_eq!(patients[1].visit_date.as_deref(), Some("2026-09-01"));
    }

    #[test]
    fn test_decode_null_snapshot() {
        assert!(decode_snapshot(Value::Null).is_empty());
    }

    #[test]
    fn test_key_validation() {
        assert!(is_valid_key("-NabcXYZ_123"));
        assert!(is_valid_key("3f2b9c1e-uuid"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("-Nabc/name"));
        assert!(!is_valid_key("x.json?print=silent&y"));
        assert!(!is_valid_key("a#b"));
        assert!(!is_valid_key("a$b"));
        assert!(!is_valid_key("a[0]"));
    }

    #[test]
    fn test_invalid_keys_never_reach_the_server() {
        // Nothing listens here; a request would fail with an HTTP error.
        let store = RemoteStore::new("http://127.0.0.1:9", None, 1).unwrap();
        let update = PatientUpdate {
            status: Some(PatientStatus::Declined),
            ..Default::default()
        };
        for id in ["", "-Nabc/name", "x.json?print=silent&y"] {
            assert!(!store.update(id, &update).unwrap());
            assert!(!store.remove(id).unwrap());
        }
    }

    #[test]
    fn test_decode_snapshot_key_order() {
        let body = json!({
            "-Nc": { "name": "Cida" },
            "-Na": { "name": "Ana" },
            "-Nb": { "name": "Bia" }
        });
        let ids: Vec<String> = decode_snapshot(body).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["-Na", "-Nb", "-Nc"]);
    }
}
