//! Drift-corrected countdown timer.
//!
//! Every tick recomputes `elapsed = now - reference` from a monotonic clock
//! reading, so variable tick cadence and frame jitter never accumulate into
//! drift. Pausing freezes the elapsed value; resuming derives a new
//! reference point (`reference = now - elapsed_at_pause`) so the paused
//! interval is excluded from the total.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running { reference: Duration },
    Paused { elapsed: Duration },
    Finished,
}

/// One tick's worth of progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub elapsed: Duration,
    /// Never negative; clamped to zero on the final tick.
    pub remaining: Duration,
    /// True exactly once, on the tick that crosses zero remaining.
    pub finished: bool,
}

/// Cancellable, pausable countdown over a monotonic clock.
pub struct PreciseTimer {
    duration: Duration,
    clock: Arc<dyn Clock>,
    phase: Phase,
}

impl PreciseTimer {
    pub fn new(clock: Arc<dyn Clock>, duration: Duration) -> Self {
        Self {
            duration,
            clock,
            phase: Phase::Idle,
        }
    }

    /// Begin counting from zero. No-op while already running.
    pub fn start(&mut self) {
        if matches!(self.phase, Phase::Running { .. }) {
            return;
        }
        self.phase = Phase::Running {
            reference: self.clock.now(),
        };
    }

    /// Freeze the elapsed value. No-op unless running.
    pub fn pause(&mut self) {
        if let Phase::Running { reference } = self.phase {
            let elapsed = self.clock.now().saturating_sub(reference);
            self.phase = Phase::Paused { elapsed };
        }
    }

    /// Continue from the frozen elapsed value. No-op if running, finished,
    /// or never started.
    pub fn resume(&mut self) {
        if let Phase::Paused { elapsed } = self.phase {
            self.phase = Phase::Running {
                reference: self.clock.now().saturating_sub(elapsed),
            };
        }
    }

    /// Full reset. Safe to call any number of times, including before start.
    pub fn stop(&mut self) {
        self.phase = Phase::Idle;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.phase, Phase::Paused { .. })
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn elapsed(&self) -> Duration {
        match self.phase {
            Phase::Idle => Duration::ZERO,
            Phase::Running { reference } => self
                .clock
                .now()
                .saturating_sub(reference)
                .min(self.duration),
            Phase::Paused { elapsed } => elapsed,
            Phase::Finished => self.duration,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed())
    }

    /// Advance the countdown. Returns `None` unless running; reports
    /// `finished == true` exactly once, after which further ticks return
    /// `None` until the timer is restarted.
    pub fn tick(&mut self) -> Option<TimerTick> {
        let Phase::Running { reference } = self.phase else {
            return None;
        };
        let elapsed = self.clock.now().saturating_sub(reference);
        let remaining = self.duration.saturating_sub(elapsed);
        if remaining.is_zero() {
            self.phase = Phase::Finished;
            return Some(TimerTick {
                elapsed: self.duration,
                remaining: Duration::ZERO,
                finished: true,
            });
        }
        Some(TimerTick {
            elapsed,
            remaining,
            finished: false,
        })
    }
}
