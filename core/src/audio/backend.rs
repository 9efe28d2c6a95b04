//! Platform audio seams.
//!
//! The coordinator drives its three channels through these traits. The CLI
//! provides rodio/TTS-backed implementations; tests use recording mocks.
//! Backend failures are soft: implementations log and go silent rather
//! than surfacing errors into the run engine.

use std::time::Duration;

use tokio::sync::oneshot;

/// Speech synthesis channel.
pub trait SpeechBackend: Send {
    /// Begin speaking, preempting any in-flight utterance. The returned
    /// receiver resolves when the utterance finishes or fails; it never
    /// carries an error.
    fn speak(&mut self, text: &str) -> oneshot::Receiver<()>;

    /// Cancel the in-flight utterance immediately.
    fn stop(&mut self);
}

/// Short synthesized tone channel.
pub trait ToneBackend: Send {
    fn beep(&mut self, frequency_hz: f32, duration: Duration, volume: f32);
}

/// Looping background music channel.
pub trait MusicBackend: Send {
    /// Replace the current track, unloading any previous one first.
    /// `None` unloads without a replacement.
    fn load(&mut self, source: Option<&str>);
    /// No-op while already playing.
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
    /// Position is pre-clamped by the coordinator.
    fn seek(&mut self, position: Duration);
    /// Zero when nothing is loaded.
    fn position(&self) -> Duration;
    /// Total track length; zero when nothing is loaded or unknown.
    fn duration(&self) -> Duration;
    fn set_volume(&mut self, volume: f32);
    /// Whether playback must wait for a user interaction first.
    fn requires_unlock(&self) -> bool {
        false
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Silent stand-ins
// ─────────────────────────────────────────────────────────────────────────────

/// Used where the platform offers no speech engine.
#[derive(Debug, Default)]
pub struct NullSpeech;

impl SpeechBackend for NullSpeech {
    fn speak(&mut self, _text: &str) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(());
        rx
    }

    fn stop(&mut self) {}
}

#[derive(Debug, Default)]
pub struct NullTone;

impl ToneBackend for NullTone {
    fn beep(&mut self, _frequency_hz: f32, _duration: Duration, _volume: f32) {}
}

#[derive(Debug, Default)]
pub struct NullMusic;

impl MusicBackend for NullMusic {
    fn load(&mut self, _source: Option<&str>) {}

    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn is_playing(&self) -> bool {
        false
    }

    fn seek(&mut self, _position: Duration) {}

    fn position(&self) -> Duration {
        Duration::ZERO
    }

    fn duration(&self) -> Duration {
        Duration::ZERO
    }

    fn set_volume(&mut self, _volume: f32) {}
}
