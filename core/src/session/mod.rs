//! Program resolution and session recording.
//!
//! The glue between the store and the run controller: resolve a program
//! plus the exercises its steps reference, and write one summary row when
//! a run completes.

use std::collections::HashMap;
use std::sync::Arc;

use cadence_types::{Exercise, ProgramRecord, SessionRecord};
use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::store::DataStore;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("program '{id}' not found")]
    ProgramNotFound { id: String },
}

/// A program together with the exercise map its steps resolve against.
pub struct ResolvedProgram {
    pub program: ProgramRecord,
    pub exercises: HashMap<String, Exercise>,
}

impl ResolvedProgram {
    /// The run is allowed to start only when this holds.
    pub fn exercises_ready(&self) -> bool {
        !self.program.steps.is_empty()
            && self
                .program
                .steps
                .iter()
                .all(|step| self.exercises.contains_key(&step.exercise_id))
    }

    /// Exercise ids referenced by steps but absent from the map.
    pub fn missing_exercises(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .program
            .steps
            .iter()
            .filter(|step| !self.exercises.contains_key(&step.exercise_id))
            .map(|step| step.exercise_id.clone())
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}

/// Look up a program and pair it with the full exercise map.
pub fn resolve_program(
    store: &dyn DataStore,
    id: &str,
) -> Result<ResolvedProgram, SessionError> {
    let program = store
        .program(id)
        .ok_or_else(|| SessionError::ProgramNotFound { id: id.to_string() })?;
    let exercises = store
        .exercises()
        .into_iter()
        .map(|exercise| (exercise.id.clone(), exercise))
        .collect();
    Ok(ResolvedProgram { program, exercises })
}

/// Writes one summary row per completed run. Fire-and-forget: a write
/// failure is logged and the completed run state stands.
#[derive(Clone)]
pub struct SessionRecorder {
    store: Arc<dyn DataStore>,
}

impl SessionRecorder {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub fn record(&self, program_id: &str, duration_seconds: u32, interrupt_count: u32) {
        let session = SessionRecord {
            id: None,
            program_id: program_id.to_string(),
            completed_at: Utc::now(),
            duration_seconds,
            interrupt_count,
        };
        match self.store.log_session(session) {
            Ok(()) => {
                info!(program_id, duration_seconds, interrupt_count, "session recorded");
            }
            Err(error) => warn!(%error, program_id, "failed to record session"),
        }
    }
}
