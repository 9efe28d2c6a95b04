//! Unified control surface over the narration, cue-tone, and music channels.
//!
//! The coordinator is owned by the run controller and ticked at the host's
//! cadence. Time-based envelopes (the music duck, the delayed half of a
//! double beep) are driven from the shared monotonic clock, never from
//! sleep-based timers.

use std::sync::Arc;
use std::time::Duration;

use cadence_types::AudioSettings;
use tokio::sync::oneshot;

use crate::audio::cues;
use crate::audio::{MusicBackend, SpeechBackend, ToneBackend};
use crate::clock::Clock;

#[derive(Debug, Clone, Copy)]
struct Duck {
    sustain_until: Duration,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledBeep {
    at: Duration,
    frequency_hz: f32,
    duration: Duration,
}

pub struct AudioCoordinator {
    speech: Box<dyn SpeechBackend>,
    tone: Box<dyn ToneBackend>,
    music: Box<dyn MusicBackend>,
    clock: Arc<dyn Clock>,
    /// Stored 0..1 music level; muting leaves it untouched.
    volume: f32,
    muted: bool,
    /// Whether a qualifying user interaction has been observed yet.
    interacted: bool,
    /// At most one deferred play intent while playback is locked.
    pending_unlock: bool,
    warmed: bool,
    duck: Option<Duck>,
    scheduled_beeps: Vec<ScheduledBeep>,
}

impl AudioCoordinator {
    pub fn new(
        speech: Box<dyn SpeechBackend>,
        tone: Box<dyn ToneBackend>,
        music: Box<dyn MusicBackend>,
        clock: Arc<dyn Clock>,
        settings: &AudioSettings,
    ) -> Self {
        Self {
            speech,
            tone,
            music,
            clock,
            volume: settings.music_volume.clamp(0.0, 1.0),
            muted: settings.music_muted,
            interacted: false,
            pending_unlock: false,
            warmed: false,
            duck: None,
            scheduled_beeps: Vec::new(),
        }
    }

    // ─── Narration ──────────────────────────────────────────────────────────

    /// Speak `text`, preempting any in-flight utterance. The receiver
    /// resolves when the utterance finishes or fails; dropping it simply
    /// discards the completion signal.
    pub fn speak(&mut self, text: &str) -> oneshot::Receiver<()> {
        self.speech.stop();
        self.speech.speak(text)
    }

    pub fn stop_narration(&mut self) {
        self.speech.stop();
    }

    // ─── Cue tones ──────────────────────────────────────────────────────────

    pub fn beep(&mut self, frequency_hz: f32, duration: Duration) {
        self.warm_up();
        self.duck_music();
        self.tone.beep(frequency_hz, duration, self.volume);
    }

    /// Two identical beeps separated by a fixed delay; the second half is
    /// played by `tick` when its moment arrives.
    pub fn double_beep(&mut self, frequency_hz: f32, duration: Duration) {
        self.beep(frequency_hz, duration);
        self.scheduled_beeps.push(ScheduledBeep {
            at: self.clock.now() + Duration::from_millis(cues::SIDE_SWITCH_DOUBLE_BEEP_DELAY_MS),
            frequency_hz,
            duration,
        });
    }

    /// Drop any not-yet-played scheduled beeps (step teardown, pause).
    pub fn cancel_scheduled_beeps(&mut self) {
        self.scheduled_beeps.clear();
    }

    /// Open the output path with an inaudible tone so the first real cue is
    /// not clipped. Idempotent.
    pub fn warm_up(&mut self) {
        if self.warmed {
            return;
        }
        self.warmed = true;
        self.tone
            .beep(cues::COMPLETION_BEEP_FREQUENCY, Duration::from_millis(20), 0.0);
    }

    // ─── Music ──────────────────────────────────────────────────────────────

    /// Replace the current track; any previous track is unloaded first.
    pub fn load_music(&mut self, source: Option<&str>) {
        self.music.load(source);
        self.apply_music_volume();
    }

    /// Ask for playback, honoring mute and the platform unlock rule. While
    /// locked, at most one play intent is kept and executed transparently on
    /// the next user interaction.
    pub fn request_playback(&mut self) {
        if self.muted {
            self.music.pause();
            return;
        }
        if self.music.requires_unlock() && !self.interacted {
            self.pending_unlock = true;
            return;
        }
        self.music.play();
    }

    pub fn pause_music(&mut self) {
        self.pending_unlock = false;
        self.music.pause();
    }

    pub fn music_playing(&self) -> bool {
        self.music.is_playing()
    }

    /// Clamps to `[0, duration]`.
    pub fn seek_music(&mut self, position: Duration) {
        let limit = self.music.duration();
        self.music.seek(position.min(limit));
    }

    pub fn music_position(&self) -> Duration {
        self.music.position()
    }

    pub fn music_duration(&self) -> Duration {
        self.music.duration()
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_music_volume();
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Mute forces effective music volume to zero without touching the
    /// stored level, so unmuting restores it.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_music_volume();
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.muted;
        self.set_muted(muted);
        muted
    }

    // ─── Interaction unlock ─────────────────────────────────────────────────

    /// Record a qualifying user interaction: warms the tone output and
    /// executes the deferred play intent, if one is queued.
    pub fn user_interaction(&mut self) {
        self.interacted = true;
        self.warm_up();
        if self.pending_unlock {
            self.pending_unlock = false;
            if !self.muted {
                self.music.play();
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn has_pending_unlock(&self) -> bool {
        self.pending_unlock
    }

    // ─── Ticking ────────────────────────────────────────────────────────────

    /// Advance time-based state: play scheduled beeps that have come due and
    /// walk the duck envelope back to full volume.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        let mut due = Vec::new();
        self.scheduled_beeps.retain(|beep| {
            if beep.at <= now {
                due.push(*beep);
                false
            } else {
                true
            }
        });
        for beep in due {
            self.beep(beep.frequency_hz, beep.duration);
        }

        if self.duck.is_some() {
            self.apply_music_volume();
        }
    }

    // ─── Ducking ────────────────────────────────────────────────────────────

    fn duck_music(&mut self) {
        if !self.music.is_playing() {
            return;
        }
        self.duck = Some(Duck {
            sustain_until: self.clock.now() + Duration::from_millis(cues::DUCK_SUSTAIN_MS),
        });
        self.apply_music_volume();
    }

    fn duck_gain(&mut self, now: Duration) -> f32 {
        let Some(duck) = self.duck else {
            return 1.0;
        };
        if now < duck.sustain_until {
            return cues::DUCK_DEPTH;
        }
        let fade = Duration::from_millis(cues::DUCK_FADE_MS);
        let since = now - duck.sustain_until;
        if since >= fade {
            self.duck = None;
            return 1.0;
        }
        let progress = since.as_secs_f32() / fade.as_secs_f32();
        cues::DUCK_DEPTH + (1.0 - cues::DUCK_DEPTH) * progress
    }

    fn apply_music_volume(&mut self) {
        let now = self.clock.now();
        let gain = if self.muted {
            0.0
        } else {
            self.volume * self.duck_gain(now)
        };
        self.music.set_volume(gain);
    }
}
