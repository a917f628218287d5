//! [`PatientStore`] for the local SQLite database.

use super::{PatientStore, StoreMode, StoreResult};
use crate::db::Database;
use crate::models::{NewPatient, PatientRecord, PatientUpdate};

impl PatientStore for Database {
    fn mode(&self) -> StoreMode {
        StoreMode::Local
    }

    fn push(&self, patient: &NewPatient, created_at: i64) -> StoreResult<String> {
        Ok(self.create_patient(patient, created_at)?)
    }

    fn update(&self, id: &str, update: &PatientUpdate) -> StoreResult<bool> {
        Ok(self.update_patient(id, update)?)
    }

    fn remove(&self, id: &str) -> StoreResult<bool> {
        Ok(self.delete_patient(id)?)
    }

    fn snapshot(&self) -> StoreResult<Vec<PatientRecord>> {
        let patients = self.list_patients()?;
        tracing::debug!(count = patients.len(), "Loaded local patient snapshot");
        Ok(patients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientStatus;

    #[test]
    fn test_store_roundtrip_through_trait() {
        let db = Database::open_in_memory().unwrap();
        let store: &dyn PatientStore = &db;

        let id = store.push(&NewPatient::new("Maria"), 42).unwrap();
        let update = PatientUpdate {
            status: Some(PatientStatus::Performed),
            ..Default::default()
        };
        assert!(store.update(&id, &update).unwrap());

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].status, PatientStatus::Performed);

        assert!(store.remove(&id).unwrap());
        assert!(store.snapshot().unwrap().is_empty());
    }
}
