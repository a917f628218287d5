//! Patient database operations.

use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::{NewPatient, PatientRecord, PatientStatus, PatientUpdate};

const PATIENT_COLUMNS: &str = r#"
    id, name, doctor, responsible, surgery_type, phone,
    status, notes, created_at, last_contact_at, visit_date
"#;

fn row_to_patient(row: &Row<'_>) -> rusqlite::Result<PatientRecord> {
    let status: String = row.get(6)?;
    let status = PatientStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            Type::Text,
            format!("unknown patient status: {status}").into(),
        )
    })?;

    Ok(PatientRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        doctor: row.get(2)?,
        responsible: row.get(3)?,
        surgery_type: row.get(4)?,
        phone: row.get(5)?,
        status,
        notes: row.get(7)?,
        created_at: row.get(8)?,
        last_contact_at: row.get(9)?,
        visit_date: row.get(10)?,
    })
}

impl Database {
    /// Insert a full record (used by imports and tests with fixed IDs).
    pub fn insert_patient(&self, patient: &PatientRecord) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, name, doctor, responsible, surgery_type, phone,
                status, notes, created_at, last_contact_at, visit_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                patient.id,
                patient.name,
                patient.doctor,
                patient.responsible,
                patient.surgery_type,
                patient.phone,
                patient.status.label(),
                patient.notes,
                patient.created_at,
                patient.last_contact_at,
                patient.visit_date,
            ],
        )?;
        Ok(())
    }

    /// Register a patient from form input, returning the new ID.
    pub fn create_patient(&self, new: &NewPatient, created_at: i64) -> DbResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let patient = PatientRecord::from_new(id.clone(), new.clone(), created_at);
        self.insert_patient(&patient)?;
        Ok(id)
    }

    /// Merge a partial update into a stored patient.
    ///
    /// Returns `false` if no patient has that ID.
    pub fn update_patient(&self, id: &str, update: &PatientUpdate) -> DbResult<bool> {
        let Some(mut patient) = self.get_patient(id)? else {
            return Ok(false);
        };
        if update.is_empty() {
            return Ok(true);
        }
        update.apply_to(&mut patient);

        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                status = ?2,
                notes = ?3,
                created_at = ?4,
                last_contact_at = ?5
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.status.label(),
                patient.notes,
                patient.created_at,
                patient.last_contact_at,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<PatientRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?"),
                [id],
                row_to_patient,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all patients in insertion order.
    pub fn list_patients(&self) -> DbResult<Vec<PatientRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PATIENT_COLUMNS} FROM patients ORDER BY seq"))?;

        let rows = stmt.query_map([], row_to_patient)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a patient.
    pub fn delete_patient(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}
