//! Session run state machine.
//!
//! States: `Idle → Running ⇄ Paused → Completed`. `Idle`/`Completed` accept
//! `start`; `Running` accepts `pause`/`skip`/`previous`/`restart`; `Paused`
//! accepts `resume` plus the same navigation actions. Binding a different
//! program silently resets to `Idle`.
//!
//! One invariant carries the whole design: at most one step timer and at
//! most one pending continuation (narration wait or inter-step delay) exist
//! at any time. Starting anything new replaces both, and only the latest
//! token's continuation may ever fire.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use cadence_types::{Exercise, ProgramRecord};
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, trace};

use crate::audio::{AudioCoordinator, cues};
use crate::clock::Clock;
use crate::run::narration::{NarrationLabels, build_instruction};
use crate::run::state::{NextStepPreview, PendingOp, RunSnapshot, RunStatus, StepStart};
use crate::timer::PreciseTimer;
use crate::wake_lock::WakeLock;

/// Invoked exactly once per run, with the program's total duration in
/// seconds and the number of pause interruptions.
pub type CompletionHandler = Box<dyn FnMut(u32, u32) + Send>;

pub struct RunController {
    program: ProgramRecord,
    exercises: HashMap<String, Exercise>,
    labels: NarrationLabels,
    audio: AudioCoordinator,
    wake_lock: Box<dyn WakeLock>,
    clock: Arc<dyn Clock>,
    on_completed: CompletionHandler,
    narration_enabled: bool,

    status: RunStatus,
    current_index: usize,
    step_elapsed: Duration,
    step_remaining: Duration,
    completed_seconds: u32,
    interrupt_count: u32,
    current_instruction: Option<String>,
    warning_issued: bool,
    side_switch_issued: bool,
    side_switch_visual_until: Option<Duration>,

    timer: Option<PreciseTimer>,
    pending: Option<PendingOp>,
    /// Payload preserved when a pause lands during a pending continuation,
    /// so resume can re-enter the start protocol where it left off.
    resume_payload: Option<StepStart>,
    next_token: u64,
}

impl RunController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        program: ProgramRecord,
        exercises: HashMap<String, Exercise>,
        labels: NarrationLabels,
        mut audio: AudioCoordinator,
        wake_lock: Box<dyn WakeLock>,
        clock: Arc<dyn Clock>,
        narration_enabled: bool,
        on_completed: CompletionHandler,
    ) -> Self {
        audio.load_music(program.music_url.as_deref());
        Self {
            program,
            exercises,
            labels,
            audio,
            wake_lock,
            clock,
            on_completed,
            narration_enabled,
            status: RunStatus::Idle,
            current_index: 0,
            step_elapsed: Duration::ZERO,
            step_remaining: Duration::ZERO,
            completed_seconds: 0,
            interrupt_count: 0,
            current_instruction: None,
            warning_issued: false,
            side_switch_issued: false,
            side_switch_visual_until: None,
            timer: None,
            pending: None,
            resume_payload: None,
            next_token: 0,
        }
    }

    // ─── Bindings ───────────────────────────────────────────────────────────

    /// Rebind the controller. A different program identity forces a silent
    /// reset; the same identity just refreshes the record in place.
    pub fn bind_program(&mut self, program: ProgramRecord) {
        let changed = program.id != self.program.id;
        self.program = program;
        if changed {
            self.reset_silently();
            self.audio.load_music(self.program.music_url.as_deref());
        }
    }

    /// Subscription-style exercise updates may arrive after construction.
    pub fn update_exercises(&mut self, exercises: HashMap<String, Exercise>) {
        self.exercises = exercises;
    }

    /// Every step's exercise id resolves and the program is non-empty.
    pub fn exercises_ready(&self) -> bool {
        !self.program.steps.is_empty()
            && self
                .program
                .steps
                .iter()
                .all(|step| self.exercises.contains_key(&step.exercise_id))
    }

    pub fn set_narration_enabled(&mut self, enabled: bool) {
        self.narration_enabled = enabled;
    }

    pub fn narration_enabled(&self) -> bool {
        self.narration_enabled
    }

    // ─── Actions ────────────────────────────────────────────────────────────

    pub fn start(&mut self) {
        if !matches!(self.status, RunStatus::Idle | RunStatus::Completed) {
            return;
        }
        if !self.exercises_ready() {
            debug!(program = %self.program.id, "run blocked: unresolved exercises");
            return;
        }
        self.completed_seconds = 0;
        self.interrupt_count = 0;
        self.start_step(0, true);
    }

    pub fn pause(&mut self) {
        if self.status != RunStatus::Running {
            return;
        }
        self.status = RunStatus::Paused;
        if let Some(timer) = self.timer.as_mut() {
            timer.pause();
        }
        if let Some(op) = self.pending.take() {
            self.resume_payload = Some(op.payload());
        }
        self.audio.cancel_scheduled_beeps();
        self.audio.stop_narration();
        self.audio.pause_music();
        self.wake_lock.release();
        self.interrupt_count += 1;
    }

    pub fn resume(&mut self) {
        if self.status != RunStatus::Paused {
            return;
        }
        if let Some(timer) = self.timer.as_mut() {
            timer.resume();
            self.status = RunStatus::Running;
            self.audio.request_playback();
            self.wake_lock.acquire();
            return;
        }
        // The pause landed before the step timer existed; re-enter the start
        // protocol with the preserved payload.
        if let Some(payload) = self.resume_payload.take() {
            self.start_step(payload.index, payload.announce);
        }
    }

    /// Credit the current step in full and move on.
    pub fn skip(&mut self) {
        if !self.is_active() {
            return;
        }
        let credited = self
            .program
            .steps
            .get(self.current_index)
            .map_or(0, |step| step.duration);
        self.completed_seconds += credited;
        self.start_step(self.current_index + 1, true);
    }

    /// Restart the previous step, debiting its credit. At index 0 this
    /// restarts the first step.
    pub fn previous(&mut self) {
        if !self.is_active() {
            return;
        }
        if self.current_index == 0 {
            self.start_step(0, true);
            return;
        }
        let debited = self
            .program
            .steps
            .get(self.current_index - 1)
            .map_or(0, |step| step.duration);
        self.completed_seconds = self.completed_seconds.saturating_sub(debited);
        self.start_step(self.current_index - 1, true);
    }

    pub fn restart(&mut self) {
        if !self.is_active() || self.current_index >= self.program.steps.len() {
            return;
        }
        self.start_step(self.current_index, true);
    }

    /// Re-speak the current instruction, fire and forget. Only meaningful
    /// mid-step; while a narration-gated start is still pending, replaying
    /// would race the gate, so it is refused.
    pub fn replay_instruction(&mut self) {
        if !self.is_active() || self.timer.is_none() {
            return;
        }
        if let Some(text) = self.current_instruction.clone() {
            let _ = self.audio.speak(&text);
        }
    }

    // ─── Audio passthrough ──────────────────────────────────────────────────

    pub fn set_volume(&mut self, volume: f32) {
        self.audio.set_volume(volume);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
        if self.status == RunStatus::Running {
            self.audio.request_playback();
        }
    }

    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.audio.is_muted();
        self.set_muted(muted);
        muted
    }

    pub fn user_interaction(&mut self) {
        self.audio.user_interaction();
    }

    pub fn audio(&mut self) -> &mut AudioCoordinator {
        &mut self.audio
    }

    // ─── Observation ────────────────────────────────────────────────────────

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn snapshot(&self) -> RunSnapshot {
        let current = self.program.steps.get(self.current_index);
        let next = self.program.steps.get(self.current_index + 1);
        RunSnapshot {
            status: self.status,
            current_index: self.current_index,
            step_elapsed: self.step_elapsed,
            step_remaining: self.step_remaining,
            completed_seconds: self.completed_seconds,
            interrupt_count: self.interrupt_count,
            total_seconds: self.program.total_seconds(),
            current_exercise: current
                .and_then(|step| self.exercises.get(&step.exercise_id))
                .map(|exercise| exercise.name.clone()),
            current_instruction: self.current_instruction.clone(),
            next_step: next.map(|step| NextStepPreview {
                name: self
                    .exercises
                    .get(&step.exercise_id)
                    .map_or_else(|| step.exercise_id.clone(), |e| e.name.clone()),
                duration_seconds: step.duration,
            }),
            side_switch_cue: self.side_switch_visual_until.is_some(),
        }
    }

    // ─── Ticking ────────────────────────────────────────────────────────────

    /// Advance the run: audio envelopes, the pending continuation, and the
    /// step timer with its cue side effects. Driven by the host at its
    /// preferred cadence; correctness does not depend on the tick rate.
    pub fn tick(&mut self) {
        self.audio.tick();
        let now = self.clock.now();
        if let Some(until) = self.side_switch_visual_until {
            if now >= until {
                self.side_switch_visual_until = None;
            }
        }
        if self.status != RunStatus::Running {
            return;
        }
        self.poll_pending(now);
        self.tick_timer(now);
    }

    fn poll_pending(&mut self, now: Duration) {
        let Some(op) = self.pending.take() else {
            return;
        };
        match op {
            PendingOp::NarrationWait {
                token,
                payload,
                mut done,
            } => match done.try_recv() {
                // A closed channel means the backend gave up; narration is
                // best-effort, so treat it as finished.
                Ok(()) | Err(TryRecvError::Closed) => {
                    trace!(token, index = payload.index, "narration finished");
                    if token == self.next_token {
                        if let Some(step) = self.program.steps.get(payload.index) {
                            self.begin_step_timer(step.duration);
                        }
                    }
                }
                Err(TryRecvError::Empty) => {
                    self.pending = Some(PendingOp::NarrationWait {
                        token,
                        payload,
                        done,
                    });
                }
            },
            PendingOp::InterStepDelay {
                token,
                payload,
                deadline,
            } => {
                if now >= deadline {
                    if token == self.next_token {
                        self.start_step(payload.index, payload.announce);
                    }
                } else {
                    self.pending = Some(PendingOp::InterStepDelay {
                        token,
                        payload,
                        deadline,
                    });
                }
            }
        }
    }

    fn tick_timer(&mut self, now: Duration) {
        let Some(timer) = self.timer.as_mut() else {
            return;
        };
        let Some(update) = timer.tick() else {
            return;
        };
        self.step_elapsed = update.elapsed;
        self.step_remaining = update.remaining;

        let Some(step) = self.program.steps.get(self.current_index).cloned() else {
            return;
        };
        let duration_ms = u64::from(step.duration) * 1000;
        let elapsed_ms = update.elapsed.as_millis() as u64;
        let remaining_ms = update.remaining.as_millis() as u64;

        let side_switch_planned = self
            .exercises
            .get(&step.exercise_id)
            .is_some_and(|exercise| exercise.side_switch)
            && u64::from(step.duration) >= cues::SIDE_SWITCH_MIN_DURATION_SECS;

        if side_switch_planned
            && !self.side_switch_issued
            && !update.finished
            && elapsed_ms >= duration_ms / 2
        {
            self.side_switch_issued = true;
            self.audio.double_beep(
                cues::SIDE_SWITCH_BEEP_FREQUENCY,
                Duration::from_millis(cues::SIDE_SWITCH_BEEP_DURATION_MS),
            );
            self.side_switch_visual_until =
                Some(now + Duration::from_millis(cues::SIDE_SWITCH_VISUAL_CUE_MS));
        }

        if !update.finished
            && !self.warning_issued
            && remaining_ms <= cues::WARNING_THRESHOLD_MS
            && warning_allowed(duration_ms, side_switch_planned)
        {
            self.warning_issued = true;
            self.audio.beep(
                cues::WARNING_BEEP_FREQUENCY,
                Duration::from_millis(cues::WARNING_BEEP_DURATION_MS),
            );
        }

        if update.finished {
            self.handle_step_complete(step.duration, now);
        }
    }

    // ─── Step protocol ──────────────────────────────────────────────────────

    /// Tear down whatever is in flight, then announce and/or arm the step at
    /// `index`. Past the last step this runs the completion protocol.
    fn start_step(&mut self, index: usize, announce: bool) {
        self.timer = None;
        self.pending = None;
        self.resume_payload = None;
        self.audio.cancel_scheduled_beeps();
        self.audio.stop_narration();

        let Some(step) = self.program.steps.get(index).cloned() else {
            self.finish_session();
            return;
        };

        self.current_index = index;
        self.step_elapsed = Duration::ZERO;
        self.step_remaining = Duration::from_secs(u64::from(step.duration));
        self.warning_issued = false;
        self.side_switch_issued = false;
        self.side_switch_visual_until = None;

        let total = self.program.steps.len();
        let instruction = if announce && self.narration_enabled {
            self.exercises
                .get(&step.exercise_id)
                .map(|exercise| build_instruction(exercise, step.duration, index, total, &self.labels))
        } else {
            None
        };

        match instruction {
            Some(text) => {
                self.current_instruction = Some(text.clone());
                let token = self.issue_token();
                let done = self.audio.speak(&text);
                self.pending = Some(PendingOp::NarrationWait {
                    token,
                    payload: StepStart {
                        index,
                        announce: true,
                    },
                    done,
                });
            }
            None => {
                self.current_instruction = None;
                self.begin_step_timer(step.duration);
            }
        }
        self.status = RunStatus::Running;
    }

    fn begin_step_timer(&mut self, duration_seconds: u32) {
        let mut timer = PreciseTimer::new(
            self.clock.clone(),
            Duration::from_secs(u64::from(duration_seconds)),
        );
        timer.start();
        self.timer = Some(timer);
        self.audio.request_playback();
        self.wake_lock.acquire();
    }

    fn handle_step_complete(&mut self, step_duration: u32, now: Duration) {
        self.audio.beep(
            cues::COMPLETION_BEEP_FREQUENCY,
            Duration::from_millis(cues::COMPLETION_BEEP_DURATION_MS),
        );
        self.completed_seconds += step_duration;
        self.timer = None;

        let next_index = self.current_index + 1;
        if next_index >= self.program.steps.len() {
            self.finish_session();
            return;
        }
        let token = self.issue_token();
        self.pending = Some(PendingOp::InterStepDelay {
            token,
            payload: StepStart {
                index: next_index,
                announce: true,
            },
            deadline: now + Duration::from_millis(cues::INTER_STEP_DELAY_MS),
        });
    }

    fn finish_session(&mut self) {
        if self.status == RunStatus::Completed {
            return;
        }
        self.timer = None;
        self.pending = None;
        self.resume_payload = None;
        self.audio.cancel_scheduled_beeps();
        self.audio.pause_music();
        self.audio.stop_narration();
        self.wake_lock.release();
        let farewell = self.labels.completed.clone();
        let _ = self.audio.speak(&farewell);
        self.status = RunStatus::Completed;
        self.current_instruction = None;
        (self.on_completed)(self.program.total_seconds(), self.interrupt_count);
    }

    fn reset_silently(&mut self) {
        self.timer = None;
        self.pending = None;
        self.resume_payload = None;
        self.audio.cancel_scheduled_beeps();
        self.audio.stop_narration();
        self.audio.pause_music();
        self.wake_lock.release();
        self.status = RunStatus::Idle;
        self.current_index = 0;
        self.step_elapsed = Duration::ZERO;
        self.step_remaining = Duration::ZERO;
        self.completed_seconds = 0;
        self.interrupt_count = 0;
        self.current_instruction = None;
        self.warning_issued = false;
        self.side_switch_issued = false;
        self.side_switch_visual_until = None;
    }

    fn is_active(&self) -> bool {
        matches!(self.status, RunStatus::Running | RunStatus::Paused)
    }

    fn issue_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }
}

/// The warning beep needs room of its own: never on steps shorter than the
/// threshold, and never when the side-switch midpoint cue would land within
/// `MIN_WARNING_GAP_AFTER_SWITCH_MS` of it.
fn warning_allowed(duration_ms: u64, side_switch_planned: bool) -> bool {
    if duration_ms <= cues::WARNING_THRESHOLD_MS {
        return false;
    }
    if !side_switch_planned {
        return true;
    }
    duration_ms / 2 >= cues::WARNING_THRESHOLD_MS + cues::MIN_WARNING_GAP_AFTER_SWITCH_MS
}
