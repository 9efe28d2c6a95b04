//! Coordinator-level channel semantics: ducking, mute, unlock, warm-up.

use std::sync::Arc;
use std::time::Duration;

use cadence_types::AudioSettings;

use crate::clock::{Clock, ManualClock};
use crate::test_support::{MockMusic, MockSpeech, MockTone, MusicLog, SpeechLog, ToneLog};

use super::AudioCoordinator;
use super::cues;

struct Harness {
    audio: AudioCoordinator,
    clock: ManualClock,
    speech: SpeechLog,
    tone: ToneLog,
    music: MusicLog,
}

fn harness_with(settings: AudioSettings, music: MusicLog) -> Harness {
    let clock = ManualClock::new();
    let speech = SpeechLog::auto();
    let tone = ToneLog::new();
    let audio = AudioCoordinator::new(
        Box::new(MockSpeech::new(speech.clone())),
        Box::new(MockTone::new(tone.clone())),
        Box::new(MockMusic::new(music.clone())),
        Arc::new(clock.clone()) as Arc<dyn Clock>,
        &settings,
    );
    Harness {
        audio,
        clock,
        speech,
        tone,
        music,
    }
}

fn harness() -> Harness {
    harness_with(AudioSettings::default(), MusicLog::new())
}

fn approx(actual: f32, expected: f32) -> bool {
    (actual - expected).abs() < 1e-4
}

#[test]
fn beep_ducks_playing_music_and_reverts_after_sustain_and_fade() {
    let mut h = harness();
    h.audio.set_volume(0.8);
    h.music.set_track_duration(Duration::from_secs(120));
    h.audio.load_music(Some("track.mp3"));
    h.audio.request_playback();
    assert!(h.music.is_playing());

    h.audio
        .beep(cues::WARNING_BEEP_FREQUENCY, Duration::from_millis(160));
    assert!(
        approx(h.music.volume(), 0.8 * cues::DUCK_DEPTH),
        "duck should drop music to depth, got {}",
        h.music.volume()
    );

    // Still held during the sustain window.
    h.clock.advance(Duration::from_millis(cues::DUCK_SUSTAIN_MS - 50));
    h.audio.tick();
    assert!(approx(h.music.volume(), 0.8 * cues::DUCK_DEPTH));

    // Midway through the fade the gain is between depth and full.
    h.clock
        .advance(Duration::from_millis(50 + cues::DUCK_FADE_MS / 2));
    h.audio.tick();
    let mid = h.music.volume();
    assert!(mid > 0.8 * cues::DUCK_DEPTH && mid < 0.8);

    h.clock.advance(Duration::from_millis(cues::DUCK_FADE_MS));
    h.audio.tick();
    assert!(approx(h.music.volume(), 0.8));
}

#[test]
fn duck_is_a_no_op_when_music_is_not_playing() {
    let mut h = harness();
    h.audio.load_music(Some("track.mp3"));
    let before = h.music.volume_history().len();

    h.audio
        .beep(cues::WARNING_BEEP_FREQUENCY, Duration::from_millis(160));
    assert_eq!(
        h.music.volume_history().len(),
        before,
        "no volume writes while music is idle"
    );
}

#[test]
fn mute_zeroes_music_without_losing_the_stored_level() {
    let mut h = harness();
    h.audio.load_music(Some("track.mp3"));
    h.audio.set_volume(0.7);
    assert!(approx(h.music.volume(), 0.7));

    h.audio.set_muted(true);
    assert!(approx(h.music.volume(), 0.0));
    assert!(approx(h.audio.volume(), 0.7));

    h.audio.set_muted(false);
    assert!(approx(h.music.volume(), 0.7));
}

#[test]
fn request_playback_pauses_while_muted() {
    let mut h = harness();
    h.audio.load_music(Some("track.mp3"));
    h.audio.set_muted(true);
    h.audio.request_playback();
    assert!(!h.music.is_playing());
    assert_eq!(h.music.play_calls(), 0);
}

#[test]
fn set_volume_clamps_to_unit_range() {
    let mut h = harness();
    h.audio.set_volume(1.6);
    assert!(approx(h.audio.volume(), 1.0));
    h.audio.set_volume(-0.4);
    assert!(approx(h.audio.volume(), 0.0));
}

#[test]
fn locked_playback_defers_a_single_intent_until_interaction() {
    let mut h = harness_with(AudioSettings::default(), MusicLog::locked());
    h.audio.load_music(Some("track.mp3"));

    h.audio.request_playback();
    h.audio.request_playback();
    assert_eq!(h.music.play_calls(), 0, "locked playback must not start");
    assert!(h.audio.has_pending_unlock());

    h.audio.user_interaction();
    assert_eq!(h.music.play_calls(), 1, "one deferred intent, executed once");
    assert!(h.music.is_playing());
    assert!(!h.audio.has_pending_unlock());

    // Unlocked from here on: play goes straight through.
    h.audio.pause_music();
    h.audio.request_playback();
    assert_eq!(h.music.play_calls(), 2);
}

#[test]
fn pausing_music_drops_the_deferred_intent() {
    let mut h = harness_with(AudioSettings::default(), MusicLog::locked());
    h.audio.load_music(Some("track.mp3"));
    h.audio.request_playback();
    assert!(h.audio.has_pending_unlock());

    h.audio.pause_music();
    h.audio.user_interaction();
    assert_eq!(h.music.play_calls(), 0);
}

#[test]
fn warm_up_plays_the_inaudible_tone_once() {
    let mut h = harness();
    h.audio.warm_up();
    h.audio.warm_up();
    h.audio
        .beep(cues::COMPLETION_BEEP_FREQUENCY, Duration::from_millis(200));

    let silent: Vec<_> = h.tone.beeps().into_iter().filter(|b| b.volume == 0.0).collect();
    assert_eq!(silent.len(), 1, "warm-up tone exactly once");
    assert_eq!(h.tone.audible().len(), 1);
}

#[test]
fn speak_preempts_the_previous_utterance() {
    let mut h = harness();
    let _first = h.audio.speak("first");
    let _second = h.audio.speak("second");
    assert_eq!(h.speech.spoken(), vec!["first", "second"]);
    assert_eq!(h.speech.stop_count(), 2, "each speak stops the channel first");
}

#[test]
fn seek_clamps_to_track_duration() {
    let mut h = harness();
    h.music.set_track_duration(Duration::from_secs(100));
    h.audio.load_music(Some("track.mp3"));

    h.audio.seek_music(Duration::from_secs(250));
    assert_eq!(h.music.position(), Duration::from_secs(100));

    h.audio.seek_music(Duration::from_secs(30));
    assert_eq!(h.music.position(), Duration::from_secs(30));
}

#[test]
fn position_and_duration_are_zero_without_a_track() {
    let h = harness();
    assert_eq!(h.audio.music_position(), Duration::ZERO);
    assert_eq!(h.audio.music_duration(), Duration::ZERO);
}
