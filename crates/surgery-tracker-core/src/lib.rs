//! Surgery Tracker Core Library
//!
//! Patient follow-up for a surgery clinic: who is waiting, for how long, and
//! how urgent the next contact is.
//!
//! # Architecture
//!
//! ```text
//!        Remote realtime DB            Local SQLite
//!               │                           │
//!               └────── PatientStore ───────┘
//!                            │
//!                     snapshot (Vec)
//!                            │
//!                  ┌─────────▼─────────┐
//!                  │   PatientRoster   │
//!                  │ days → urgency    │
//!                  │ filter → sort     │
//!                  │ group → aggregate │
//!                  └─────────┬─────────┘
//!                            │
//!            ┌───────────────┼───────────────┐
//!            ▼               ▼               ▼
//!       Patient list     Dashboard     Monthly report
//! ```
//!
//! # Modules
//!
//! - [`engine`]: Urgency, filtering, grouping and statistics (pure)
//! - [`models`]: Domain types (PatientRecord, PatientStatus, Timestamp)
//! - [`store`]: Store trait, remote backend, backend selection
//! - [`db`]: SQLite local store
//! - [`tracker`]: Store + snapshot coordination (add, edit, contact, backfill)
//! - [`config`]: Store configuration

pub mod config;
pub mod db;
pub mod engine;
pub mod models;
pub mod store;
pub mod tracker;

// Re-export commonly used types
pub use config::StoreConfig;
pub use db::Database;
pub use engine::{
    DashboardShortcut, DashboardStats, MonthlyReport, PatientFilter, PatientRoster,
    PatientSummary, PatientView, StatusGroup, Urgency,
};
pub use models::{NewPatient, PatientRecord, PatientStatus, PatientUpdate, Timestamp, DOCTORS};
pub use store::{open_store, DynStore, PatientStore, RemoteStore, StoreMode};
pub use tracker::{PatientTracker, TrackerError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum SurgeryTrackerError {
    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for SurgeryTrackerError {
    fn from(e: db::DbError) -> Self {
        SurgeryTrackerError::StoreError(e.to_string())
    }
}

impl From<store::StoreError> for SurgeryTrackerError {
    fn from(e: store::StoreError) -> Self {
        SurgeryTrackerError::StoreError(e.to_string())
    }
}

impl From<TrackerError> for SurgeryTrackerError {
    fn from(e: TrackerError) -> Self {
        match e {
            TrackerError::NotFound(id) => SurgeryTrackerError::NotFound(id),
            TrackerError::Store(e) => e.into(),
        }
    }
}

impl From<config::ConfigError> for SurgeryTrackerError {
    fn from(e: config::ConfigError) -> Self {
        SurgeryTrackerError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for SurgeryTrackerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        SurgeryTrackerError::StoreError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Install the log subscriber. `RUST_LOG` wins over `filter`; repeated calls are no-ops.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(filter.as_deref().unwrap_or(config::default_log_filter()))
    });
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
}

/// Open or create a local database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<SurgeryTrackerCore>, SurgeryTrackerError> {
    let db = Database::open(&path)?;
    SurgeryTrackerCore::from_store(Box::new(db))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<SurgeryTrackerCore>, SurgeryTrackerError> {
    let db = Database::open_in_memory()?;
    SurgeryTrackerCore::from_store(Box::new(db))
}

/// Open the remote store if `config_json` is populated, else the local database at `local_path`.
#[uniffi::export]
pub fn open_configured_store(
    config_json: String,
    local_path: String,
) -> Result<Arc<SurgeryTrackerCore>, SurgeryTrackerError> {
    let config = StoreConfig::from_json_str(&config_json)?;
    let store = open_store(&config, &local_path)?;
    SurgeryTrackerCore::from_store(store)
}

/// Whole days since an epoch-millisecond timestamp (0 for missing/invalid).
#[uniffi::export]
pub fn days_since_millis(timestamp: Option<i64>) -> u32 {
    engine::days_since(&Timestamp::from(timestamp))
}

/// Whole days since a timestamp given as text (digits or a date).
#[uniffi::export]
pub fn days_since_text(raw: String) -> u32 {
    engine::days_since(&Timestamp::Text(raw))
}

/// Urgency tier name for a day count.
#[uniffi::export]
pub fn urgency_for_days(days: u32) -> String {
    Urgency::classify(days).as_str().to_string()
}

/// Known doctors.
#[uniffi::export]
pub fn known_doctors() -> Vec<String> {
    DOCTORS.iter().map(|d| d.to_string()).collect()
}

/// Status labels in journey order.
#[uniffi::export]
pub fn status_labels() -> Vec<String> {
    PatientStatus::ALL.iter().map(|s| s.label().to_string()).collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe tracker wrapper for FFI.
#[derive(uniffi::Object)]
pub struct SurgeryTrackerCore {
    tracker: Arc<Mutex<PatientTracker<DynStore>>>,
}

impl SurgeryTrackerCore {
    fn from_store(store: DynStore) -> Result<Arc<Self>, SurgeryTrackerError> {
        let tracker = PatientTracker::open(store)?;
        Ok(Arc::new(Self {
            tracker: Arc::new(Mutex::new(tracker)),
        }))
    }
}

#[uniffi::export]
impl SurgeryTrackerCore {
    // =========================================================================
    // Store
    // =========================================================================

    /// Storage mode label for the dashboard.
    pub fn storage_mode(&self) -> Result<String, SurgeryTrackerError> {
        let tracker = self.tracker.lock()?;
        Ok(tracker.store().mode().label().to_string())
    }

    /// Whether the remote store is active.
    pub fn is_remote(&self) -> Result<bool, SurgeryTrackerError> {
        let tracker = self.tracker.lock()?;
        Ok(tracker.store().mode() == StoreMode::Remote)
    }

    /// Reload the snapshot. There is no push channel; poll this to see
    /// changes made by other clients.
    pub fn reload(&self) -> Result<u32, SurgeryTrackerError> {
        let mut tracker = self.tracker.lock()?;
        Ok(tracker.load()? as u32)
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register a patient; returns the new ID.
    pub fn add_patient(&self, patient: FfiNewPatient) -> Result<String, SurgeryTrackerError> {
        if patient.name.trim().is_empty() {
            return Err(SurgeryTrackerError::InvalidInput("name is required".into()));
        }
        let mut tracker = self.tracker.lock()?;
        Ok(tracker.add_patient(patient.into())?)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatientCard>, SurgeryTrackerError> {
        let tracker = self.tracker.lock()?;
        let now = chrono::Utc::now();
        Ok(tracker
            .roster()
            .get(&id)
            .map(|p| PatientSummary::new(p, now).into()))
    }

    /// Edit status and notes.
    pub fn edit_patient(
        &self,
        id: String,
        status: String,
        notes: Option<String>,
    ) -> Result<(), SurgeryTrackerError> {
        let status = parse_status(&status)?;
        let mut tracker = self.tracker.lock()?;
        tracker.edit_patient(&id, status, notes)?;
        Ok(())
    }

    /// Toggle the contact marker; returns whether the patient is now contacted.
    pub fn toggle_contact(&self, id: String) -> Result<bool, SurgeryTrackerError> {
        let mut tracker = self.tracker.lock()?;
        Ok(tracker.toggle_contact(&id)?)
    }

    /// Delete a patient.
    pub fn remove_patient(&self, id: String) -> Result<(), SurgeryTrackerError> {
        let mut tracker = self.tracker.lock()?;
        tracker.remove_patient(&id)?;
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Filtered patients, most urgent first.
    pub fn filter_patients(
        &self,
        filter: FfiPatientFilter,
    ) -> Result<Vec<FfiPatientCard>, SurgeryTrackerError> {
        let filter = PatientFilter::try_from(filter)?;
        let tracker = self.tracker.lock()?;
        let now = chrono::Utc::now();
        Ok(tracker
            .roster()
            .summaries_at(&filter, now)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Patient list as shown: grouped by status unless a status is selected.
    pub fn patient_view(
        &self,
        filter: FfiPatientFilter,
    ) -> Result<FfiPatientView, SurgeryTrackerError> {
        let filter = PatientFilter::try_from(filter)?;
        let tracker = self.tracker.lock()?;
        let now = chrono::Utc::now();
        let cards = |patients: Vec<&PatientRecord>| -> Vec<FfiPatientCard> {
            patients
                .into_iter()
                .map(|p| PatientSummary::new(p, now).into())
                .collect()
        };

        let view = match tracker.roster().view_at(&filter, now) {
            PatientView::Grouped(groups) => FfiPatientView {
                grouped: true,
                groups: groups
                    .into_iter()
                    .map(|g| FfiStatusGroup {
                        status: g.label.to_string(),
                        count: g.count as u32,
                        patients: cards(g.patients),
                    })
                    .collect(),
            },
            PatientView::Flat(patients) => {
                let status = filter.status.map(|s| s.label().to_string()).unwrap_or_default();
                let count = patients.len() as u32;
                FfiPatientView {
                    grouped: false,
                    groups: vec![FfiStatusGroup {
                        status,
                        count,
                        patients: cards(patients),
                    }],
                }
            }
        };
        Ok(view)
    }

    /// Dashboard counters.
    pub fn dashboard_stats(&self) -> Result<FfiDashboardStats, SurgeryTrackerError> {
        let tracker = self.tracker.lock()?;
        Ok(tracker.roster().dashboard_stats().into())
    }

    /// Conversion report for the current month.
    pub fn monthly_report(&self) -> Result<FfiMonthlyReport, SurgeryTrackerError> {
        let tracker = self.tracker.lock()?;
        Ok(tracker.roster().monthly_report().into())
    }

    /// Filter opened by a dashboard card key (`all`, `over30`, a status label...).
    pub fn shortcut_filter(&self, key: String) -> Result<FfiPatientFilter, SurgeryTrackerError> {
        DashboardShortcut::parse(&key)
            .map(|shortcut| shortcut.to_filter().into())
            .ok_or_else(|| SurgeryTrackerError::InvalidInput(format!("unknown card: {key}")))
    }
}

fn parse_status(value: &str) -> Result<PatientStatus, SurgeryTrackerError> {
    PatientStatus::parse(value)
        .ok_or_else(|| SurgeryTrackerError::InvalidInput(format!("unknown status: {value}")))
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub name: String,
    pub visit_date: Option<String>,
    pub doctor: String,
    pub surgery_type: String,
    pub notes: Option<String>,
    pub phone: String,
    pub responsible: Option<String>,
}

impl From<FfiNewPatient> for NewPatient {
    fn from(p: FfiNewPatient) -> Self {
        NewPatient {
            name: p.name,
            visit_date: p.visit_date,
            doctor: p.doctor,
            surgery_type: p.surgery_type,
            notes: p.notes,
            phone: p.phone,
            responsible: p.responsible,
        }
    }
}

/// FFI-safe filter. Empty strings mean "any".
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiPatientFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub min_days: Option<u32>,
    pub doctor: Option<String>,
    pub responsible: Option<String>,
}

impl TryFrom<FfiPatientFilter> for PatientFilter {
    type Error = SurgeryTrackerError;

    fn try_from(f: FfiPatientFilter) -> Result<Self, Self::Error> {
        let status = match f.status.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_status(raw)?),
            None => None,
        };
        Ok(PatientFilter {
            search: f.search,
            status,
            min_days: f.min_days,
            doctor: f.doctor,
            responsible: f.responsible,
        })
    }
}

impl From<PatientFilter> for FfiPatientFilter {
    fn from(f: PatientFilter) -> Self {
        Self {
            search: f.search,
            status: f.status.map(|s| s.label().to_string()),
            min_days: f.min_days,
            doctor: f.doctor,
            responsible: f.responsible,
        }
    }
}

/// FFI-safe patient with derived fields.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientCard {
    pub id: String,
    pub name: String,
    pub doctor: String,
    pub responsible: Option<String>,
    pub surgery_type: String,
    pub phone: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: Option<i64>,
    pub last_contact_at: Option<i64>,
    pub visit_date: Option<String>,
    pub days: u32,
    pub urgency: String,
    pub contacted: bool,
    pub info_line: String,
}

impl From<PatientSummary<'_>> for FfiPatientCard {
    fn from(summary: PatientSummary<'_>) -> Self {
        let p = summary.patient;
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            doctor: p.doctor.clone(),
            responsible: p.responsible.clone(),
            surgery_type: p.surgery_type.clone(),
            phone: p.phone.clone(),
            status: p.status.label().to_string(),
            notes: p.notes.clone(),
            created_at: p.created_at,
            last_contact_at: p.last_contact_at,
            visit_date: p.visit_date.clone(),
            days: summary.days,
            urgency: summary.urgency.as_str().to_string(),
            contacted: summary.contacted,
            info_line: summary.info.label(),
        }
    }
}

/// FFI-safe status group.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStatusGroup {
    pub status: String,
    pub count: u32,
    pub patients: Vec<FfiPatientCard>,
}

/// FFI-safe patient list.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientView {
    /// `false` when a status filter produced a single flat list
    pub grouped: bool,
    pub groups: Vec<FfiStatusGroup>,
}

/// FFI-safe dashboard counters.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboardStats {
    pub total: u32,
    pub by_status: Vec<u32>,
    pub over_30: u32,
    pub over_45: u32,
    pub over_60: u32,
}

impl From<DashboardStats> for FfiDashboardStats {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total: stats.total as u32,
            by_status: stats.by_status.iter().map(|c| *c as u32).collect(),
            over_30: stats.over_30 as u32,
            over_45: stats.over_45 as u32,
            over_60: stats.over_60 as u32,
        }
    }
}

/// FFI-safe monthly report.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMonthlyReport {
    pub month: String,
    pub total_patients: u32,
    pub scheduled_surgeries: u32,
    pub conversion_rate: f64,
}

impl From<MonthlyReport> for FfiMonthlyReport {
    fn from(report: MonthlyReport) -> Self {
        Self {
            month: report.month,
            total_patients: report.total_patients as u32,
            scheduled_surgeries: report.scheduled_surgeries as u32,
            conversion_rate: report.conversion_rate,
        }
    }
}
