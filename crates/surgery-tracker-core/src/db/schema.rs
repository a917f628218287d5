//! SQLite schema definition.

/// Complete database schema for the local patient store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,       -- insertion order for snapshots
    id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL DEFAULT '',
    doctor TEXT NOT NULL DEFAULT '',
    responsible TEXT,
    surgery_type TEXT NOT NULL DEFAULT '',
    phone TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'Paciente solicitado risco',
    notes TEXT,
    created_at INTEGER,                          -- epoch ms, NULL on legacy rows
    last_contact_at INTEGER,                     -- epoch ms, NULL when not contacted
    visit_date TEXT                              -- raw form input
);

CREATE INDEX IF NOT EXISTS idx_patients_status ON patients(status);
CREATE INDEX IF NOT EXISTS idx_patients_doctor ON patients(doctor);
"#;
