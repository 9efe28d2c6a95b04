//! End-to-end controller behavior against a hand-driven clock.
//!
//! Narration uses the recording speech fake: `auto` completes utterances
//! immediately (the next tick sees them finished), `manual` holds them so
//! races between narration and navigation can be exercised.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cadence_types::{AudioSettings, Exercise, Intensity, ProgramRecord, ProgramStep, Zone};
use chrono::Utc;

use crate::audio::{AudioCoordinator, cues};
use crate::clock::{Clock, ManualClock};
use crate::run::{NarrationLabels, RunStatus};
use crate::test_support::{
    MockMusic, MockSpeech, MockTone, MockWakeLock, MusicLog, SpeechLog, ToneLog, WakeLockLog,
};

use super::RunController;

struct Harness {
    controller: RunController,
    clock: ManualClock,
    speech: SpeechLog,
    tone: ToneLog,
    music: MusicLog,
    wake: WakeLockLog,
    completions: Arc<Mutex<Vec<(u32, u32)>>>,
}

impl Harness {
    fn advance_and_tick(&mut self, by: Duration) {
        self.clock.advance(by);
        self.controller.tick();
    }

    fn completions(&self) -> Vec<(u32, u32)> {
        self.completions.lock().unwrap().clone()
    }
}

fn make_exercise(id: &str, side_switch: bool) -> Exercise {
    Exercise {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        tags: Vec::new(),
        zone: Zone::Full,
        intensity: Intensity::Medium,
        default_duration: 30,
        media: None,
        side_switch,
        created_at: None,
        updated_at: None,
    }
}

fn make_program(id: &str, steps: &[(&str, u32)], music_url: Option<&str>) -> ProgramRecord {
    ProgramRecord {
        id: id.to_string(),
        name: format!("program {id}"),
        steps: steps
            .iter()
            .enumerate()
            .map(|(i, (exercise_id, duration))| ProgramStep {
                id: format!("step-{i}"),
                exercise_id: exercise_id.to_string(),
                duration: *duration,
            })
            .collect(),
        music_url: music_url.map(str::to_string),
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn build_harness(
    steps: &[(&str, u32, bool)],
    speech: SpeechLog,
    narration_enabled: bool,
    music_url: Option<&str>,
) -> Harness {
    let clock = ManualClock::new();
    let tone = ToneLog::new();
    let music = MusicLog::new();
    let wake = WakeLockLog::new();
    music.set_track_duration(Duration::from_secs(300));

    let exercises: HashMap<String, Exercise> = steps
        .iter()
        .map(|(id, _, side)| (id.to_string(), make_exercise(id, *side)))
        .collect();
    let flat: Vec<(&str, u32)> = steps.iter().map(|(id, d, _)| (*id, *d)).collect();
    let program = make_program("p1", &flat, music_url);

    let audio = AudioCoordinator::new(
        Box::new(MockSpeech::new(speech.clone())),
        Box::new(MockTone::new(tone.clone())),
        Box::new(MockMusic::new(music.clone())),
        Arc::new(clock.clone()) as Arc<dyn Clock>,
        &AudioSettings::default(),
    );

    let completions: Arc<Mutex<Vec<(u32, u32)>>> = Arc::default();
    let sink = completions.clone();
    let controller = RunController::new(
        program,
        exercises,
        NarrationLabels::default(),
        audio,
        Box::new(MockWakeLock::new(wake.clone())),
        Arc::new(clock.clone()) as Arc<dyn Clock>,
        narration_enabled,
        Box::new(move |duration, interrupts| {
            sink.lock().unwrap().push((duration, interrupts));
        }),
    );

    Harness {
        controller,
        clock,
        speech,
        tone,
        music,
        wake,
        completions,
    }
}

fn harness(steps: &[(&str, u32, bool)]) -> Harness {
    build_harness(steps, SpeechLog::auto(), true, None)
}

#[test]
fn uninterrupted_run_accounts_every_step_and_completes_once() {
    let mut h = harness(&[("jacks", 3, false), ("squats", 4, false)]);

    h.controller.start();
    assert_eq!(h.controller.status(), RunStatus::Running);
    h.controller.tick(); // narration done, timer armed

    h.advance_and_tick(Duration::from_secs(3));
    let snap = h.controller.snapshot();
    assert_eq!(snap.completed_seconds, 3);
    assert_eq!(snap.current_index, 0, "inter-step delay still pending");

    h.advance_and_tick(Duration::from_secs(2)); // delay elapses, step 2 announced
    h.controller.tick(); // narration done, timer armed
    assert_eq!(h.controller.snapshot().current_index, 1);

    h.advance_and_tick(Duration::from_secs(4));
    assert_eq!(h.controller.status(), RunStatus::Completed);
    assert_eq!(h.controller.snapshot().completed_seconds, 7);
    assert_eq!(h.completions(), vec![(7, 0)]);

    // Name, position, and duration reach the narration channel.
    let spoken = h.speech.spoken();
    assert_eq!(spoken.len(), 3, "two step announcements plus the farewell");
    assert!(spoken[0].contains("jacks") && spoken[0].contains("Step 1 of 2"));
    assert!(spoken[1].contains("squats") && spoken[1].contains("4 seconds"));
}

#[test]
fn pause_and_resume_keep_elapsed_continuous_and_count_one_interrupt() {
    let mut h = harness(&[("hold", 10, false)]);
    h.controller.start();
    h.controller.tick();

    h.advance_and_tick(Duration::from_secs(3));
    h.controller.pause();
    assert_eq!(h.controller.status(), RunStatus::Paused);
    assert_eq!(h.wake.releases(), 1);

    // A long paused gap must not count toward the step.
    h.clock.advance(Duration::from_secs(30));
    h.controller.resume();
    assert_eq!(h.controller.status(), RunStatus::Running);

    h.advance_and_tick(Duration::from_secs(2));
    let snap = h.controller.snapshot();
    assert_eq!(snap.step_elapsed, Duration::from_secs(5));
    assert_eq!(snap.interrupt_count, 1);

    h.advance_and_tick(Duration::from_secs(5));
    assert_eq!(h.completions(), vec![(10, 1)]);
}

#[test]
fn skip_credits_the_full_step_and_advances_immediately() {
    let mut h = harness(&[("a", 5, false), ("b", 7, false)]);
    h.controller.start();
    h.controller.tick();
    h.advance_and_tick(Duration::from_secs(1));

    h.controller.skip();
    let snap = h.controller.snapshot();
    assert_eq!(snap.completed_seconds, 5);
    assert_eq!(snap.current_index, 1);

    // Skipping the last step completes the run with the program total.
    h.controller.tick();
    h.controller.skip();
    assert_eq!(h.controller.status(), RunStatus::Completed);
    assert_eq!(h.completions(), vec![(12, 0)]);
}

#[test]
fn previous_debits_one_step_and_never_underflows() {
    let mut h = harness(&[("a", 5, false), ("b", 7, false)]);
    h.controller.start();
    h.controller.tick();
    h.controller.skip(); // at step b, 5 s credited
    h.controller.tick();

    h.controller.previous();
    let snap = h.controller.snapshot();
    assert_eq!(snap.current_index, 0);
    assert_eq!(snap.completed_seconds, 0);

    // At index 0, previous restarts the first step; credit stays floored.
    h.controller.tick();
    h.controller.previous();
    let snap = h.controller.snapshot();
    assert_eq!(snap.current_index, 0);
    assert_eq!(snap.completed_seconds, 0);
}

#[test]
fn restart_replays_the_current_step_from_zero() {
    let mut h = harness(&[("a", 10, false)]);
    h.controller.start();
    h.controller.tick();
    h.advance_and_tick(Duration::from_secs(4));

    h.controller.restart();
    assert_eq!(h.controller.snapshot().step_elapsed, Duration::ZERO);
    h.controller.tick();

    h.advance_and_tick(Duration::from_secs(10));
    assert_eq!(h.controller.snapshot().completed_seconds, 10);
    assert_eq!(h.completions(), vec![(10, 0)]);
    assert_eq!(
        h.speech
            .spoken()
            .iter()
            .filter(|text| text.contains("Step 1 of 1"))
            .count(),
        2,
        "restart announces the step again"
    );
}

#[test]
fn side_switch_double_beep_fires_exactly_once_at_the_midpoint() {
    let mut h = harness(&[("lunges", 20, true)]);
    h.controller.start();
    h.controller.tick();

    // Just before the midpoint: nothing yet.
    h.advance_and_tick(Duration::from_millis(9_900));
    assert_eq!(h.tone.audible_at(cues::SIDE_SWITCH_BEEP_FREQUENCY), 0);

    h.advance_and_tick(Duration::from_millis(100));
    assert_eq!(h.tone.audible_at(cues::SIDE_SWITCH_BEEP_FREQUENCY), 1);
    assert!(h.controller.snapshot().side_switch_cue);

    // The delayed half arrives via tick.
    h.advance_and_tick(Duration::from_millis(
        cues::SIDE_SWITCH_DOUBLE_BEEP_DELAY_MS,
    ));
    assert_eq!(h.tone.audible_at(cues::SIDE_SWITCH_BEEP_FREQUENCY), 2);

    // Ticks past the midpoint never re-fire it.
    h.advance_and_tick(Duration::from_secs(2));
    h.advance_and_tick(Duration::from_secs(2));
    assert_eq!(h.tone.audible_at(cues::SIDE_SWITCH_BEEP_FREQUENCY), 2);

    // The visual flag clears on its own.
    assert!(!h.controller.snapshot().side_switch_cue);

    // 20 s side-switch step: the warning would crowd the midpoint cue.
    h.advance_and_tick(Duration::from_secs(3));
    assert_eq!(h.tone.audible_at(cues::WARNING_BEEP_FREQUENCY), 0);

    h.advance_and_tick(Duration::from_secs(3));
    assert_eq!(h.tone.audible_at(cues::COMPLETION_BEEP_FREQUENCY), 1);
}

#[test]
fn short_or_unflagged_steps_get_no_side_switch_cue() {
    // Flagged but under the 20 s minimum.
    let mut h = harness(&[("lunges", 18, true)]);
    h.controller.start();
    h.controller.tick();
    h.advance_and_tick(Duration::from_secs(9));
    h.advance_and_tick(Duration::from_secs(9));
    assert_eq!(h.tone.audible_at(cues::SIDE_SWITCH_BEEP_FREQUENCY), 0);

    // Long but unflagged.
    let mut h = harness(&[("plank", 40, false)]);
    h.controller.start();
    h.controller.tick();
    h.advance_and_tick(Duration::from_secs(20));
    assert_eq!(h.tone.audible_at(cues::SIDE_SWITCH_BEEP_FREQUENCY), 0);
}

#[test]
fn warning_beep_fires_once_when_it_has_room() {
    // Plain step: warning at the threshold, exactly once.
    let mut h = harness(&[("plank", 10, false)]);
    h.controller.start();
    h.controller.tick();
    h.advance_and_tick(Duration::from_millis(5_200));
    assert_eq!(h.tone.audible_at(cues::WARNING_BEEP_FREQUENCY), 1);
    h.advance_and_tick(Duration::from_millis(500));
    assert_eq!(h.tone.audible_at(cues::WARNING_BEEP_FREQUENCY), 1);

    // Long side-switch step: midpoint and warning are far apart, both fire.
    let mut h = harness(&[("lunges", 30, true)]);
    h.controller.start();
    h.controller.tick();
    h.advance_and_tick(Duration::from_secs(15));
    assert_eq!(h.tone.audible_at(cues::SIDE_SWITCH_BEEP_FREQUENCY), 1);
    h.advance_and_tick(Duration::from_millis(10_200));
    assert_eq!(h.tone.audible_at(cues::WARNING_BEEP_FREQUENCY), 1);
}

#[test]
fn steps_shorter_than_the_threshold_never_warn() {
    let mut h = harness(&[("burst", 4, false)]);
    h.controller.start();
    h.controller.tick();
    h.advance_and_tick(Duration::from_secs(1));
    h.advance_and_tick(Duration::from_secs(3));
    assert_eq!(h.tone.audible_at(cues::WARNING_BEEP_FREQUENCY), 0);
    assert_eq!(h.tone.audible_at(cues::COMPLETION_BEEP_FREQUENCY), 1);
}

#[test]
fn superseded_narration_never_starts_its_timer() {
    let mut h = build_harness(
        &[("a", 5, false), ("b", 7, false)],
        SpeechLog::manual(),
        true,
        None,
    );
    h.controller.start();
    h.controller.tick();
    assert_eq!(h.speech.pending_count(), 1);

    // Skip while the first announcement is still being spoken.
    h.controller.skip();
    assert_eq!(h.controller.snapshot().current_index, 1);

    // The stale utterance finishing must not arm step a's timer.
    assert!(h.speech.finish_next());
    h.advance_and_tick(Duration::from_secs(3));
    assert_eq!(
        h.controller.snapshot().step_elapsed,
        Duration::ZERO,
        "only the latest token may start a timer"
    );

    // The current announcement finishing does.
    assert!(h.speech.finish_next());
    h.controller.tick();
    h.advance_and_tick(Duration::from_secs(7));
    assert_eq!(h.controller.status(), RunStatus::Completed);
    assert_eq!(h.completions(), vec![(12, 0)]);
}

#[test]
fn pause_during_narration_resumes_by_restarting_the_announcement() {
    let mut h = build_harness(&[("a", 5, false)], SpeechLog::manual(), true, None);
    h.controller.start();
    h.controller.tick();

    h.controller.pause();
    assert_eq!(h.controller.snapshot().interrupt_count, 1);

    h.controller.resume();
    let spoken = h.speech.spoken();
    assert_eq!(spoken.len(), 2, "the announcement is spoken again");
    assert_eq!(spoken[0], spoken[1]);

    h.speech.finish_next(); // stale
    h.speech.finish_next(); // current
    h.controller.tick();
    h.advance_and_tick(Duration::from_secs(5));
    assert_eq!(h.completions(), vec![(5, 1)]);
}

#[test]
fn pause_during_the_inter_step_delay_resumes_into_the_next_step() {
    let mut h = harness(&[("a", 2, false), ("b", 3, false)]);
    h.controller.start();
    h.controller.tick();
    h.advance_and_tick(Duration::from_secs(2)); // step a done, delay pending

    h.controller.pause();
    h.clock.advance(Duration::from_secs(60));
    h.controller.resume();
    assert_eq!(h.controller.snapshot().current_index, 1);

    h.controller.tick();
    h.advance_and_tick(Duration::from_secs(3));
    assert_eq!(h.completions(), vec![(5, 1)]);
}

#[test]
fn the_inter_step_delay_holds_the_next_step_back() {
    let mut h = harness(&[("a", 2, false), ("b", 3, false)]);
    h.controller.start();
    h.controller.tick();
    h.advance_and_tick(Duration::from_secs(2));

    h.advance_and_tick(Duration::from_secs(1));
    assert_eq!(h.controller.snapshot().current_index, 0, "still waiting");

    h.advance_and_tick(Duration::from_secs(1));
    assert_eq!(h.controller.snapshot().current_index, 1);
}

#[test]
fn rebinding_a_different_program_resets_silently() {
    let mut h = harness(&[("a", 5, false)]);
    h.controller.start();
    h.controller.tick();
    h.advance_and_tick(Duration::from_secs(2));

    let other = make_program("p2", &[("a", 9)], None);
    h.controller.bind_program(other);

    let snap = h.controller.snapshot();
    assert_eq!(h.controller.status(), RunStatus::Idle);
    assert_eq!(snap.completed_seconds, 0);
    assert_eq!(snap.interrupt_count, 0);
    assert!(h.music.pause_calls() >= 1);
    assert!(h.completions().is_empty(), "a reset is not a completion");
}

#[test]
fn start_is_blocked_until_every_exercise_resolves() {
    let mut h = harness(&[("a", 5, false)]);
    h.controller.update_exercises(HashMap::new());
    assert!(!h.controller.exercises_ready());

    h.controller.start();
    assert_eq!(h.controller.status(), RunStatus::Idle);
    assert!(h.speech.spoken().is_empty());

    // The subscription delivering the map later unblocks the run.
    h.controller
        .update_exercises(HashMap::from([("a".to_string(), make_exercise("a", false))]));
    h.controller.start();
    assert_eq!(h.controller.status(), RunStatus::Running);
}

#[test]
fn starting_again_after_completion_resets_the_counters() {
    let mut h = harness(&[("a", 4, false)]);
    h.controller.start();
    h.controller.tick();
    h.advance_and_tick(Duration::from_secs(1));
    h.controller.pause();
    h.controller.resume();
    h.advance_and_tick(Duration::from_secs(3));
    assert_eq!(h.completions(), vec![(4, 1)]);

    h.controller.start();
    h.controller.tick();
    h.advance_and_tick(Duration::from_secs(4));
    assert_eq!(h.completions(), vec![(4, 1), (4, 0)]);
}

#[test]
fn disabled_narration_starts_the_timer_without_announcing() {
    let mut h = build_harness(&[("a", 3, false)], SpeechLog::auto(), false, None);
    h.controller.start();
    // No tick needed: the timer arms synchronously when nothing is spoken.
    h.advance_and_tick(Duration::from_secs(3));
    assert_eq!(h.controller.status(), RunStatus::Completed);
    assert_eq!(
        h.speech.spoken().len(),
        1,
        "only the completion farewell is spoken"
    );
}

#[test]
fn music_follows_the_run_lifecycle() {
    let mut h = build_harness(&[("a", 4, false)], SpeechLog::auto(), true, Some("track.mp3"));
    h.controller.start();
    h.controller.tick();
    assert!(h.music.is_playing());
    assert!(h.wake.acquires() >= 1);

    h.controller.pause();
    assert!(!h.music.is_playing());

    h.controller.resume();
    assert!(h.music.is_playing());

    h.advance_and_tick(Duration::from_secs(4));
    assert!(!h.music.is_playing(), "completion parks the music");
}

#[test]
fn replay_is_refused_while_the_start_gate_is_pending() {
    let mut h = build_harness(&[("a", 5, false)], SpeechLog::manual(), true, None);
    h.controller.start();
    h.controller.tick();
    assert_eq!(h.speech.spoken().len(), 1);

    h.controller.replay_instruction();
    assert_eq!(h.speech.spoken().len(), 1, "no replay before the timer runs");

    h.speech.finish_next();
    h.controller.tick();
    h.controller.replay_instruction();
    assert_eq!(h.speech.spoken().len(), 2);
}
