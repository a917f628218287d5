//! Record store abstraction and backend selection.
//!
//! The engine only needs snapshots; the tracker needs push/update/remove.
//! Two backends implement [`PatientStore`]:
//!
//! - [`RemoteStore`]: realtime database over its REST API
//! - [`Database`]: local SQLite fallback

mod local;
mod remote;

pub use remote::*;

use std::path::Path;

use thiserror::Error;

use crate::config::StoreConfig;
use crate::db::{Database, DbError};
use crate::models::{NewPatient, PatientRecord, PatientUpdate};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Local database error: {0}")]
    Local(#[from] DbError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote store returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid store configuration: {0}")]
    Config(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which backend is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Remote,
    Local,
}

impl StoreMode {
    /// Dashboard label.
    pub fn label(self) -> &'static str {
        match self {
            StoreMode::Remote => "Remoto (REST)",
            StoreMode::Local => "Local (SQLite)",
        }
    }
}

/// Persistence for patient records.
pub trait PatientStore {
    /// Which backend this is.
    fn mode(&self) -> StoreMode;

    /// Register a new patient; the store assigns the ID.
    fn push(&self, patient: &NewPatient, created_at: i64) -> StoreResult<String>;

    /// Merge fields into a patient. Returns `false` for an unknown ID.
    fn update(&self, id: &str, update: &PatientUpdate) -> StoreResult<bool>;

    /// Delete a patient. Returns `false` for an unknown ID.
    fn remove(&self, id: &str) -> StoreResult<bool>;

    /// Every patient, in creation order.
    fn snapshot(&self) -> StoreResult<Vec<PatientRecord>>;
}

impl<S: PatientStore + ?Sized> PatientStore for Box<S> {
    fn mode(&self) -> StoreMode {
        (**self).mode()
    }

    fn push(&self, patient: &NewPatient, created_at: i64) -> StoreResult<String> {
        (**self).push(patient, created_at)
    }

    fn update(&self, id: &str, update: &PatientUpdate) -> StoreResult<bool> {
        (**self).update(id, update)
    }

    fn remove(&self, id: &str) -> StoreResult<bool> {
        (**self).remove(id)
    }

    fn snapshot(&self) -> StoreResult<Vec<PatientRecord>> {
        (**self).snapshot()
    }
}

/// Boxed store usable across threads.
pub type DynStore = Box<dyn PatientStore + Send>;

/// Pick the backend: remote when the config is populated, else local SQLite at `local_path`.
pub fn open_store<P: AsRef<Path>>(config: &StoreConfig, local_path: P) -> StoreResult<DynStore> {
    if config.is_remote_configured() {
        let store = RemoteStore::from_config(config)?;
        tracing::info!(url = %store.base_url(), "Using remote patient store");
        return Ok(Box::new(store));
    }

    if config.has_placeholders() {
        tracing::warn!("Remote store config contains placeholders; falling back to local store");
    }
    let db = Database::open(local_path)?;
    tracing::info!("Using local patient store");
    Ok(Box::new(db))
}
