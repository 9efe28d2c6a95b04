//! Shared CLI state.

use std::sync::Arc;

use rodio::OutputStreamHandle;
use tokio::sync::Mutex;
use tracing::info;

use cadence_core::catalog::seed_payload;
use cadence_core::config::AppConfig;
use cadence_core::store::{DataStore, JsonFileStore, StoreError};

use crate::audio::open_output;
use crate::service::RunHandle;

pub struct CliContext {
    pub store: Arc<dyn DataStore>,
    pub config: Mutex<AppConfig>,
    /// The active run, if one has been bound with `run`.
    pub run: Mutex<Option<RunHandle>>,
    /// Shared output device; `None` means every channel is silent.
    pub audio_out: Option<OutputStreamHandle>,
}

impl CliContext {
    pub fn new() -> Result<Self, StoreError> {
        let store = JsonFileStore::open(JsonFileStore::default_path())?;
        if store.programs().is_empty() && store.exercises().is_empty() {
            store.import_all(seed_payload())?;
            info!("installed the starter catalog");
        }
        Ok(Self {
            store: Arc::new(store),
            config: Mutex::new(AppConfig::load()),
            run: Mutex::new(None),
            audio_out: open_output(),
        })
    }
}
