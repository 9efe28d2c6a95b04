//! Background run service.
//!
//! Architecture mirrors the rest of the app: a handle for sending commands
//! and reading state, and a background task that owns the controller.
//! Control messages arrive on an mpsc channel, ticks come from a ~16 ms
//! interval (the display-refresh-equivalent cadence), and every loop turn
//! publishes a fresh snapshot through a watch channel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::info;

use cadence_core::audio::AudioCoordinator;
use cadence_core::clock::MonotonicClock;
use cadence_core::run::{NarrationLabels, RunController, RunSnapshot};
use cadence_core::session::{ResolvedProgram, SessionRecorder};
use cadence_core::wake_lock::NoopWakeLock;
use cadence_types::Exercise;

const TICK_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunCommand {
    Start,
    Pause,
    Resume,
    Skip,
    Previous,
    Restart,
    Replay,
    SetVolume(f32),
    SetMuted(bool),
    SetNarration(bool),
    Seek(u64),
    Shutdown,
}

/// Handle to the run task: send commands, read the latest snapshot.
#[derive(Clone)]
pub struct RunHandle {
    cmd_tx: mpsc::Sender<RunCommand>,
    snapshot_rx: watch::Receiver<RunSnapshot>,
}

impl RunHandle {
    pub async fn send(&self, command: RunCommand) -> Result<(), String> {
        self.cmd_tx
            .send(command)
            .await
            .map_err(|e| e.to_string())
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.snapshot_rx.borrow().clone()
    }
}

/// Bind a resolved program to a fresh controller and drive it on a
/// background task. Exercise updates arriving on the store subscription are
/// forwarded to the controller for as long as the run lives.
pub fn spawn_run(
    resolved: ResolvedProgram,
    audio: AudioCoordinator,
    recorder: SessionRecorder,
    narration_enabled: bool,
    mut exercises_rx: watch::Receiver<Vec<Exercise>>,
) -> RunHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel(32);

    let program_id = resolved.program.id.clone();
    let on_completed = Box::new(move |duration_seconds: u32, interrupt_count: u32| {
        recorder.record(&program_id, duration_seconds, interrupt_count);
    });

    let mut controller = RunController::new(
        resolved.program,
        resolved.exercises,
        NarrationLabels::default(),
        audio,
        Box::new(NoopWakeLock),
        Arc::new(MonotonicClock::new()),
        narration_enabled,
        on_completed,
    );

    let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut watching_exercises = true;
        loop {
            tokio::select! {
                command = cmd_rx.recv() => {
                    match command {
                        None | Some(RunCommand::Shutdown) => break,
                        Some(command) => apply(&mut controller, command),
                    }
                }
                changed = exercises_rx.changed(), if watching_exercises => {
                    match changed {
                        Ok(()) => {
                            let map: HashMap<String, Exercise> = exercises_rx
                                .borrow_and_update()
                                .iter()
                                .map(|exercise| (exercise.id.clone(), exercise.clone()))
                                .collect();
                            controller.update_exercises(map);
                        }
                        Err(_) => watching_exercises = false,
                    }
                }
                _ = ticker.tick() => controller.tick(),
            }
            let _ = snapshot_tx.send(controller.snapshot());
        }
        info!("run service stopped");
    });

    RunHandle {
        cmd_tx,
        snapshot_rx,
    }
}

fn apply(controller: &mut RunController, command: RunCommand) {
    // Every accepted command line is a qualifying user interaction for the
    // audio unlock rule.
    controller.user_interaction();
    match command {
        RunCommand::Start => controller.start(),
        RunCommand::Pause => controller.pause(),
        RunCommand::Resume => controller.resume(),
        RunCommand::Skip => controller.skip(),
        RunCommand::Previous => controller.previous(),
        RunCommand::Restart => controller.restart(),
        RunCommand::Replay => controller.replay_instruction(),
        RunCommand::SetVolume(volume) => controller.set_volume(volume),
        RunCommand::SetMuted(muted) => controller.set_muted(muted),
        RunCommand::SetNarration(enabled) => controller.set_narration_enabled(enabled),
        RunCommand::Seek(seconds) => controller
            .audio()
            .seek_music(Duration::from_secs(seconds)),
        RunCommand::Shutdown => {}
    }
}
