//! Catalog persistence boundary.
//!
//! Programs and exercises are owned by an external store; the run engine
//! only reads them and appends session summaries. Subscriptions are
//! `tokio::sync::watch` channels: a receiver observes the current value
//! immediately and every update afterwards.

mod file;
mod memory;


pub use file::JsonFileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use cadence_types::{CatalogSnapshot, Exercise, ImportPayload, ProgramRecord, SessionRecord};
use thiserror::Error;
use tokio::sync::watch;

/// Errors during catalog persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read catalog {path}")]
    ReadCatalog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write catalog {path}")]
    WriteCatalog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog {path}")]
    ParseCatalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode catalog")]
    EncodeCatalog(#[source] serde_json::Error),

    #[error("failed to create data directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Program/exercise/session store consumed by the run engine and the CLI.
pub trait DataStore: Send + Sync {
    /// Programs ordered by `updated_at`, newest first.
    fn programs(&self) -> Vec<ProgramRecord>;
    fn program(&self, id: &str) -> Option<ProgramRecord>;
    /// Exercises ordered by name.
    fn exercises(&self) -> Vec<Exercise>;
    /// Sessions newest first, optionally filtered to one program.
    fn sessions(&self, program_id: Option<&str>) -> Vec<SessionRecord>;

    fn watch_programs(&self) -> watch::Receiver<Vec<ProgramRecord>>;
    fn watch_exercises(&self) -> watch::Receiver<Vec<Exercise>>;

    /// Upsert by id; stamps `updated_at` and backfills `created_at`.
    fn save_program(&self, program: ProgramRecord) -> Result<(), StoreError>;
    fn delete_program(&self, id: &str) -> Result<(), StoreError>;
    /// Append a completed-run summary, assigning an id when absent.
    fn log_session(&self, session: SessionRecord) -> Result<(), StoreError>;

    fn export_all(&self) -> CatalogSnapshot;
    /// Each collection present in the payload replaces the stored one
    /// wholesale; absent collections are left untouched.
    fn import_all(&self, payload: ImportPayload) -> Result<(), StoreError>;
}
