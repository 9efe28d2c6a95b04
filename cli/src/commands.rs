//! REPL command implementations.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use cadence_core::audio::library::CURATED_TRACKS;
use cadence_core::audio::{AudioCoordinator, cues};
use cadence_core::catalog::seed_payload;
use cadence_core::clock::{Clock, MonotonicClock};
use cadence_core::run::{NarrationLabels, RunStatus, speech_duration};
use cadence_core::session::{SessionRecorder, resolve_program};
use cadence_core::time::{format_duration, format_seconds};
use cadence_types::{CatalogSnapshot, ImportPayload};

use crate::CliContext;
use crate::audio::build_coordinator;
use crate::service::{RunCommand, spawn_run};

// ─────────────────────────────────────────────────────────────────────────────
// Catalog listings
// ─────────────────────────────────────────────────────────────────────────────

pub async fn show_programs(ctx: &CliContext) {
    let programs = ctx.store.programs();
    if programs.is_empty() {
        println!("No programs in the catalog. Try `seed` or `import`.");
        return;
    }
    println!("{:<20} {:<28} {:>5}  {}", "Id", "Name", "Steps", "Total");
    println!("{}", "-".repeat(68));
    for program in &programs {
        println!(
            "{:<20} {:<28} {:>5}  {}",
            program.id,
            program.name,
            program.steps.len(),
            format_duration(u64::from(program.total_seconds()))
        );
    }
    println!("\nTotal: {} programs", programs.len());
}

pub async fn show_exercises(ctx: &CliContext) {
    let exercises = ctx.store.exercises();
    if exercises.is_empty() {
        println!("No exercises in the catalog. Try `seed` or `import`.");
        return;
    }
    println!(
        "{:<22} {:<24} {:<6} {:<8} {:>5}  Sides",
        "Id", "Name", "Zone", "Level", "Secs"
    );
    println!("{}", "-".repeat(78));
    for exercise in &exercises {
        println!(
            "{:<22} {:<24} {:<6} {:<8} {:>5}  {}",
            exercise.id,
            exercise.name,
            format!("{:?}", exercise.zone).to_lowercase(),
            format!("{:?}", exercise.intensity).to_lowercase(),
            exercise.default_duration,
            if exercise.side_switch { "yes" } else { "-" }
        );
    }
}

pub async fn show_sessions(ctx: &CliContext, program_id: Option<&str>) {
    let sessions = ctx.store.sessions(program_id);
    if sessions.is_empty() {
        println!("No recorded sessions.");
        return;
    }
    println!(
        "{:<20} {:<26} {:>9}  Interrupts",
        "Program", "Completed at", "Duration"
    );
    println!("{}", "-".repeat(68));
    for session in &sessions {
        println!(
            "{:<20} {:<26} {:>9}  {}",
            session.program_id,
            session.completed_at.format("%Y-%m-%d %H:%M:%S"),
            format_seconds(u64::from(session.duration_seconds)),
            session.interrupt_count
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Running
// ─────────────────────────────────────────────────────────────────────────────

pub async fn run_program(ctx: &CliContext, id: &str) {
    let mut resolved = match resolve_program(ctx.store.as_ref(), id) {
        Ok(resolved) => resolved,
        Err(error) => {
            println!("{error}");
            return;
        }
    };
    if !resolved.exercises_ready() {
        println!(
            "Program '{id}' cannot run; unresolved exercises: {}",
            resolved.missing_exercises().join(", ")
        );
        return;
    }

    let config = ctx.config.lock().await.clone();
    if config.music_path.is_some() {
        resolved.program.music_url = config.music_path.clone();
    }

    let mut active = ctx.run.lock().await;
    if let Some(previous) = active.take() {
        let _ = previous.send(RunCommand::Shutdown).await;
    }

    let audio = build_coordinator(
        ctx.audio_out.clone(),
        Arc::new(MonotonicClock::new()) as Arc<dyn Clock>,
        &config.audio,
    );
    let recorder = SessionRecorder::new(ctx.store.clone());
    let handle = spawn_run(
        resolved,
        audio,
        recorder,
        config.audio.narration_enabled,
        ctx.store.watch_exercises(),
    );

    if let Err(error) = handle.send(RunCommand::Start).await {
        println!("failed to start run: {error}");
        return;
    }
    *active = Some(handle);
    println!("Running '{id}'. Use pause/resume/skip/previous/restart/status.");
}

async fn forward(ctx: &CliContext, command: RunCommand) {
    let active = ctx.run.lock().await;
    match active.as_ref() {
        Some(handle) => {
            if let Err(error) = handle.send(command).await {
                println!("run is gone: {error}");
            }
        }
        None => println!("No active run. Start one with `run --id <program>`."),
    }
}

pub async fn start(ctx: &CliContext) {
    forward(ctx, RunCommand::Start).await;
}

pub async fn pause(ctx: &CliContext) {
    forward(ctx, RunCommand::Pause).await;
}

pub async fn resume(ctx: &CliContext) {
    forward(ctx, RunCommand::Resume).await;
}

pub async fn skip(ctx: &CliContext) {
    forward(ctx, RunCommand::Skip).await;
}

pub async fn previous(ctx: &CliContext) {
    forward(ctx, RunCommand::Previous).await;
}

pub async fn restart(ctx: &CliContext) {
    forward(ctx, RunCommand::Restart).await;
}

pub async fn replay(ctx: &CliContext) {
    forward(ctx, RunCommand::Replay).await;
}

pub async fn stop_run(ctx: &CliContext) {
    let mut active = ctx.run.lock().await;
    match active.take() {
        Some(handle) => {
            let _ = handle.send(RunCommand::Shutdown).await;
            println!("Run stopped.");
        }
        None => println!("No active run."),
    }
}

pub async fn status(ctx: &CliContext) {
    let active = ctx.run.lock().await;
    let Some(handle) = active.as_ref() else {
        println!("No active run.");
        return;
    };
    let snap = handle.snapshot();
    let status = match snap.status {
        RunStatus::Idle => "idle",
        RunStatus::Running => "running",
        RunStatus::Paused => "paused",
        RunStatus::Completed => "completed",
    };
    println!("Status:     {status}");
    if let Some(name) = &snap.current_exercise {
        let marker = if snap.side_switch_cue {
            "  << switch sides"
        } else {
            ""
        };
        println!("Step:       {} ({}){marker}", name, snap.current_index + 1);
    }
    println!(
        "Step time:  {} elapsed / {} remaining",
        format_seconds(snap.step_elapsed.as_secs()),
        format_seconds(snap.step_remaining.as_secs())
    );
    let total_elapsed = u64::from(snap.completed_seconds) + snap.step_elapsed.as_secs();
    let total = u64::from(snap.total_seconds);
    println!(
        "Total:      {} / {}",
        format_seconds(total_elapsed),
        format_seconds(total)
    );
    println!("Interrupts: {}", snap.interrupt_count);
    match &snap.next_step {
        Some(next) => println!(
            "Next:       {} ({})",
            next.name,
            format_duration(u64::from(next.duration_seconds))
        ),
        None => println!("Next:       - last step -"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Audio preferences
// ─────────────────────────────────────────────────────────────────────────────

pub async fn set_volume(ctx: &CliContext, level: f32) {
    let level = level.clamp(0.0, 1.0);
    forward_if_running(ctx, RunCommand::SetVolume(level)).await;
    let mut config = ctx.config.lock().await;
    config.audio.music_volume = level;
    persist(&config);
    println!("Music volume set to {level:.2}");
}

pub async fn set_muted(ctx: &CliContext, muted: bool) {
    forward_if_running(ctx, RunCommand::SetMuted(muted)).await;
    let mut config = ctx.config.lock().await;
    config.audio.music_muted = muted;
    persist(&config);
    println!("Music {}", if muted { "muted" } else { "unmuted" });
}

pub async fn set_narration(ctx: &CliContext, enabled: bool) {
    forward_if_running(ctx, RunCommand::SetNarration(enabled)).await;
    let mut config = ctx.config.lock().await;
    config.audio.narration_enabled = enabled;
    persist(&config);
    println!(
        "Narration {}",
        if enabled { "enabled" } else { "disabled" }
    );
}

pub async fn seek(ctx: &CliContext, seconds: u64) {
    forward(ctx, RunCommand::Seek(seconds)).await;
}

async fn forward_if_running(ctx: &CliContext, command: RunCommand) {
    let active = ctx.run.lock().await;
    if let Some(handle) = active.as_ref() {
        let _ = handle.send(command).await;
    }
}

fn persist(config: &cadence_core::config::AppConfig) {
    if let Err(error) = config.save() {
        warn!(%error, "failed to persist configuration");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sound test
// ─────────────────────────────────────────────────────────────────────────────

/// Play every cue and a sample narration through the same coordinator path
/// the run uses.
pub async fn sound_test(ctx: &CliContext) {
    let config = ctx.config.lock().await.clone();
    let mut audio = build_coordinator(
        ctx.audio_out.clone(),
        Arc::new(MonotonicClock::new()) as Arc<dyn Clock>,
        &config.audio,
    );
    audio.user_interaction();

    let labels = NarrationLabels::default();
    let sample = format!(
        "Side lunges. Step 1 of 3. {}.",
        speech_duration(90, &labels)
    );
    println!("Narration: \"{sample}\"");
    let done = audio.speak(&sample);
    let _ = tokio::time::timeout(Duration::from_secs(12), done).await;

    println!(
        "Completion beep ({} Hz, {} ms)",
        cues::COMPLETION_BEEP_FREQUENCY,
        cues::COMPLETION_BEEP_DURATION_MS
    );
    audio.beep(
        cues::COMPLETION_BEEP_FREQUENCY,
        Duration::from_millis(cues::COMPLETION_BEEP_DURATION_MS),
    );
    tick_for(&mut audio, Duration::from_millis(800)).await;

    println!(
        "Warning beep ({} Hz, {} ms, window {} s)",
        cues::WARNING_BEEP_FREQUENCY,
        cues::WARNING_BEEP_DURATION_MS,
        cues::WARNING_THRESHOLD_MS / 1000
    );
    audio.beep(
        cues::WARNING_BEEP_FREQUENCY,
        Duration::from_millis(cues::WARNING_BEEP_DURATION_MS),
    );
    tick_for(&mut audio, Duration::from_millis(800)).await;

    println!(
        "Side-switch double beep ({} Hz, {} ms x2, +{} ms)",
        cues::SIDE_SWITCH_BEEP_FREQUENCY,
        cues::SIDE_SWITCH_BEEP_DURATION_MS,
        cues::SIDE_SWITCH_DOUBLE_BEEP_DELAY_MS
    );
    audio.double_beep(
        cues::SIDE_SWITCH_BEEP_FREQUENCY,
        Duration::from_millis(cues::SIDE_SWITCH_BEEP_DURATION_MS),
    );
    tick_for(&mut audio, Duration::from_millis(1_000)).await;

    println!("\nCurated tracks:");
    for track in CURATED_TRACKS {
        println!("  {:<22} {}  [{}]", track.id, track.label, track.source);
    }
}

/// Drive the coordinator's time-based state (duck fade, scheduled beeps)
/// for a short window.
async fn tick_for(audio: &mut AudioCoordinator, window: Duration) {
    let mut remaining = window;
    let step = Duration::from_millis(16);
    while !remaining.is_zero() {
        audio.tick();
        sleep(step).await;
        remaining = remaining.saturating_sub(step);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Import / export / seed
// ─────────────────────────────────────────────────────────────────────────────

pub async fn export_catalog(ctx: &CliContext, path: &str) {
    let snapshot = ctx.store.export_all();
    let text = match serde_json::to_string_pretty(&snapshot) {
        Ok(text) => text,
        Err(error) => {
            println!("failed to encode catalog: {error}");
            return;
        }
    };
    match std::fs::write(path, text) {
        Ok(()) => println!(
            "Exported {} exercises, {} programs, {} sessions to {path}",
            snapshot.exercises.len(),
            snapshot.programs.len(),
            snapshot.sessions.len()
        ),
        Err(error) => println!("failed to write {path}: {error}"),
    }
}

pub async fn import_catalog(ctx: &CliContext, path: &str) {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) => {
            println!("failed to read {path}: {error}");
            return;
        }
    };
    // Accept either a full snapshot or a partial payload.
    let payload: ImportPayload = match serde_json::from_str::<CatalogSnapshot>(&text) {
        Ok(snapshot) => snapshot.into(),
        Err(_) => match serde_json::from_str(&text) {
            Ok(payload) => payload,
            Err(error) => {
                println!("malformed catalog file: {error}");
                return;
            }
        },
    };
    match ctx.store.import_all(payload) {
        Ok(()) => println!("Catalog imported (collections replaced)."),
        Err(error) => println!("import failed: {error}"),
    }
}

pub async fn seed(ctx: &CliContext) {
    match ctx.store.import_all(seed_payload()) {
        Ok(()) => println!("Starter catalog installed."),
        Err(error) => println!("seeding failed: {error}"),
    }
}

pub fn exit() {
    println!("quitting...");
}
