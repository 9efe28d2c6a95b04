//! JSON-file-backed catalog store.
//!
//! The whole catalog lives in one pretty-printed JSON document, loaded at
//! open and rewritten after every mutation. The format is the same
//! `CatalogSnapshot` the export/import commands exchange, so a catalog file
//! is itself a valid export.

use std::fs;
use std::path::PathBuf;

use cadence_types::{CatalogSnapshot, Exercise, ImportPayload, ProgramRecord, SessionRecord};
use tokio::sync::watch;
use tracing::info;

use super::{DataStore, MemoryStore, StoreError};

pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// `~/.local/share/cadence/catalog.json` (or the platform equivalent).
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cadence")
            .join("catalog.json")
    }

    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let snapshot = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|source| StoreError::ReadCatalog {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&text).map_err(|source| StoreError::ParseCatalog {
                path: path.clone(),
                source,
            })?
        } else {
            CatalogSnapshot::default()
        };
        info!(path = %path.display(), "catalog opened");
        Ok(Self {
            path,
            inner: MemoryStore::with_data(snapshot),
        })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let snapshot = self.inner.export_all();
        let text =
            serde_json::to_string_pretty(&snapshot).map_err(StoreError::EncodeCatalog)?;
        fs::write(&self.path, text).map_err(|source| StoreError::WriteCatalog {
            path: self.path.clone(),
            source,
        })
    }
}

impl DataStore for JsonFileStore {
    fn programs(&self) -> Vec<ProgramRecord> {
        self.inner.programs()
    }

    fn program(&self, id: &str) -> Option<ProgramRecord> {
        self.inner.program(id)
    }

    fn exercises(&self) -> Vec<Exercise> {
        self.inner.exercises()
    }

    fn sessions(&self, program_id: Option<&str>) -> Vec<SessionRecord> {
        self.inner.sessions(program_id)
    }

    fn watch_programs(&self) -> watch::Receiver<Vec<ProgramRecord>> {
        self.inner.watch_programs()
    }

    fn watch_exercises(&self) -> watch::Receiver<Vec<Exercise>> {
        self.inner.watch_exercises()
    }

    fn save_program(&self, program: ProgramRecord) -> Result<(), StoreError> {
        self.inner.save_program(program)?;
        self.persist()
    }

    fn delete_program(&self, id: &str) -> Result<(), StoreError> {
        self.inner.delete_program(id)?;
        self.persist()
    }

    fn log_session(&self, session: SessionRecord) -> Result<(), StoreError> {
        self.inner.log_session(session)?;
        self.persist()
    }

    fn export_all(&self) -> CatalogSnapshot {
        self.inner.export_all()
    }

    fn import_all(&self, payload: ImportPayload) -> Result<(), StoreError> {
        self.inner.import_all(payload)?;
        self.persist()
    }
}
