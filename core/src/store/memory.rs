//! In-memory catalog store.
//!
//! Backs the JSON file store and the tests. Watch senders are retained for
//! the store's lifetime so late subscribers always get the current value.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use cadence_types::{CatalogSnapshot, Exercise, ImportPayload, ProgramRecord, SessionRecord};
use chrono::Utc;
use tokio::sync::watch;

use super::{DataStore, StoreError};

#[derive(Default)]
struct Collections {
    exercises: Vec<Exercise>,
    programs: Vec<ProgramRecord>,
    sessions: Vec<SessionRecord>,
}

pub struct MemoryStore {
    inner: Mutex<Collections>,
    programs_tx: watch::Sender<Vec<ProgramRecord>>,
    exercises_tx: watch::Sender<Vec<Exercise>>,
    next_session_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_data(CatalogSnapshot::default())
    }

    pub fn with_data(snapshot: CatalogSnapshot) -> Self {
        let collections = Collections {
            exercises: snapshot.exercises,
            programs: snapshot.programs,
            sessions: snapshot.sessions,
        };
        let (programs_tx, _) = watch::channel(sorted_programs(&collections.programs));
        let (exercises_tx, _) = watch::channel(sorted_exercises(&collections.exercises));
        Self {
            inner: Mutex::new(collections),
            programs_tx,
            exercises_tx,
            next_session_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Collections> {
        self.inner.lock().expect("store poisoned")
    }

    fn notify(&self, collections: &Collections) {
        let _ = self.programs_tx.send(sorted_programs(&collections.programs));
        let _ = self
            .exercises_tx
            .send(sorted_exercises(&collections.exercises));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore for MemoryStore {
    fn programs(&self) -> Vec<ProgramRecord> {
        sorted_programs(&self.lock().programs)
    }

    fn program(&self, id: &str) -> Option<ProgramRecord> {
        self.lock().programs.iter().find(|p| p.id == id).cloned()
    }

    fn exercises(&self) -> Vec<Exercise> {
        sorted_exercises(&self.lock().exercises)
    }

    fn sessions(&self, program_id: Option<&str>) -> Vec<SessionRecord> {
        let collections = self.lock();
        let mut sessions: Vec<SessionRecord> = collections
            .sessions
            .iter()
            .filter(|s| program_id.is_none_or(|id| s.program_id == id))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        sessions
    }

    fn watch_programs(&self) -> watch::Receiver<Vec<ProgramRecord>> {
        self.programs_tx.subscribe()
    }

    fn watch_exercises(&self) -> watch::Receiver<Vec<Exercise>> {
        self.exercises_tx.subscribe()
    }

    fn save_program(&self, mut program: ProgramRecord) -> Result<(), StoreError> {
        let mut collections = self.lock();
        program.updated_at = Utc::now();
        match collections.programs.iter_mut().find(|p| p.id == program.id) {
            Some(existing) => {
                program.created_at = existing.created_at;
                *existing = program;
            }
            None => collections.programs.push(program),
        }
        self.notify(&collections);
        Ok(())
    }

    fn delete_program(&self, id: &str) -> Result<(), StoreError> {
        let mut collections = self.lock();
        collections.programs.retain(|p| p.id != id);
        self.notify(&collections);
        Ok(())
    }

    fn log_session(&self, mut session: SessionRecord) -> Result<(), StoreError> {
        if session.id.is_none() {
            let n = self.next_session_id.fetch_add(1, Ordering::Relaxed);
            session.id = Some(format!("session-{n:06}"));
        }
        self.lock().sessions.push(session);
        Ok(())
    }

    fn export_all(&self) -> CatalogSnapshot {
        let collections = self.lock();
        let mut sessions = collections.sessions.clone();
        sessions.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        CatalogSnapshot {
            exercises: sorted_exercises(&collections.exercises),
            programs: sorted_programs(&collections.programs),
            sessions,
        }
    }

    fn import_all(&self, payload: ImportPayload) -> Result<(), StoreError> {
        let mut collections = self.lock();
        if let Some(exercises) = payload.exercises {
            collections.exercises = exercises;
        }
        if let Some(programs) = payload.programs {
            collections.programs = programs;
        }
        if let Some(sessions) = payload.sessions {
            collections.sessions = sessions;
        }
        self.notify(&collections);
        Ok(())
    }
}

fn sorted_programs(programs: &[ProgramRecord]) -> Vec<ProgramRecord> {
    let mut programs = programs.to_vec();
    programs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    programs
}

fn sorted_exercises(exercises: &[Exercise]) -> Vec<Exercise> {
    let mut exercises = exercises.to_vec();
    exercises.sort_by(|a, b| a.name.cmp(&b.name));
    exercises
}
