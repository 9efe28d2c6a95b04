//! Run-state bookkeeping types.

use std::time::Duration;

use tokio::sync::oneshot;

/// Lifecycle of one bound program run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

/// What a deferred continuation should do when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StepStart {
    pub index: usize,
    pub announce: bool,
}

/// The single deferred continuation, guarded by a monotonic token. At most
/// one exists; replacing or clearing the slot supersedes the old
/// continuation, and a superseded receiver is dropped with it.
pub(crate) enum PendingOp {
    /// Waiting for step narration to finish before the timer starts.
    NarrationWait {
        token: u64,
        payload: StepStart,
        done: oneshot::Receiver<()>,
    },
    /// Waiting out the gap between a finished step and the next one.
    InterStepDelay {
        token: u64,
        payload: StepStart,
        deadline: Duration,
    },
}

impl PendingOp {
    pub(crate) fn payload(&self) -> StepStart {
        match self {
            PendingOp::NarrationWait { payload, .. } => *payload,
            PendingOp::InterStepDelay { payload, .. } => *payload,
        }
    }
}

/// Read-only view published to the UI layer.
#[derive(Debug, Clone, Default)]
pub struct RunSnapshot {
    pub status: RunStatus,
    /// 0-based position into the program's steps.
    pub current_index: usize,
    pub step_elapsed: Duration,
    pub step_remaining: Duration,
    /// Whole seconds credited for fully finished (or skipped) steps.
    pub completed_seconds: u32,
    pub interrupt_count: u32,
    /// Sum of every step duration in the bound program.
    pub total_seconds: u32,
    pub current_exercise: Option<String>,
    pub current_instruction: Option<String>,
    pub next_step: Option<NextStepPreview>,
    /// Raised for a short window around the side-switch cue.
    pub side_switch_cue: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextStepPreview {
    pub name: String,
    pub duration_seconds: u32,
}
