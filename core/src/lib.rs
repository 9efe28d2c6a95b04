pub mod audio;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod run;
pub mod session;
pub mod store;
pub mod time;
pub mod timer;
pub mod wake_lock;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use audio::{AudioCoordinator, MusicBackend, SpeechBackend, ToneBackend};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::AppConfig;
pub use run::{NarrationLabels, RunController, RunSnapshot, RunStatus};
pub use session::{ResolvedProgram, SessionError, SessionRecorder, resolve_program};
pub use store::{DataStore, JsonFileStore, MemoryStore, StoreError};
pub use timer::{PreciseTimer, TimerTick};
pub use wake_lock::{NoopWakeLock, WakeLock};
