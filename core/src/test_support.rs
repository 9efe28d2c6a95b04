//! Recording fakes shared by the audio and run tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::audio::{MusicBackend, SpeechBackend, ToneBackend};
use crate::wake_lock::WakeLock;

// ─────────────────────────────────────────────────────────────────────────────
// Speech
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct SpeechLogInner {
    spoken: Vec<String>,
    stops: usize,
    pending: Vec<oneshot::Sender<()>>,
    auto_complete: bool,
}

/// Shared view into a `MockSpeech` backend.
#[derive(Clone, Default)]
pub struct SpeechLog {
    inner: Arc<Mutex<SpeechLogInner>>,
}

impl SpeechLog {
    /// Every utterance completes the moment it is spoken.
    pub fn auto() -> Self {
        let log = Self::default();
        log.inner.lock().unwrap().auto_complete = true;
        log
    }

    /// Utterances stay pending until `finish_next` is called.
    pub fn manual() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.inner.lock().unwrap().spoken.clone()
    }

    pub fn stop_count(&self) -> usize {
        self.inner.lock().unwrap().stops
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock().unwrap().pending.len()
    }

    /// Complete the oldest unfinished utterance. Returns false when none is
    /// pending. Completing a superseded utterance is harmless; its receiver
    /// is already gone.
    pub fn finish_next(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.pending.is_empty() {
            return false;
        }
        let tx = inner.pending.remove(0);
        let _ = tx.send(());
        true
    }
}

pub struct MockSpeech {
    log: SpeechLog,
}

impl MockSpeech {
    pub fn new(log: SpeechLog) -> Self {
        Self { log }
    }
}

impl SpeechBackend for MockSpeech {
    fn speak(&mut self, text: &str) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.log.inner.lock().unwrap();
        inner.spoken.push(text.to_string());
        if inner.auto_complete {
            let _ = tx.send(());
        } else {
            inner.pending.push(tx);
        }
        rx
    }

    fn stop(&mut self) {
        self.log.inner.lock().unwrap().stops += 1;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tones
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeepRecord {
    pub frequency_hz: f32,
    pub duration: Duration,
    pub volume: f32,
}

#[derive(Clone, Default)]
pub struct ToneLog {
    beeps: Arc<Mutex<Vec<BeepRecord>>>,
}

impl ToneLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn beeps(&self) -> Vec<BeepRecord> {
        self.beeps.lock().unwrap().clone()
    }

    /// Beeps with a non-zero volume, i.e. excluding the warm-up tone.
    pub fn audible(&self) -> Vec<BeepRecord> {
        self.beeps().into_iter().filter(|b| b.volume > 0.0).collect()
    }

    pub fn audible_at(&self, frequency_hz: f32) -> usize {
        self.audible()
            .iter()
            .filter(|b| b.frequency_hz == frequency_hz)
            .count()
    }
}

pub struct MockTone {
    log: ToneLog,
}

impl MockTone {
    pub fn new(log: ToneLog) -> Self {
        Self { log }
    }
}

impl ToneBackend for MockTone {
    fn beep(&mut self, frequency_hz: f32, duration: Duration, volume: f32) {
        self.log.beeps.lock().unwrap().push(BeepRecord {
            frequency_hz,
            duration,
            volume,
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Music
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct MusicState {
    loaded: Option<String>,
    playing: bool,
    volume: f32,
    volume_history: Vec<f32>,
    position: Duration,
    duration: Duration,
    play_calls: usize,
    pause_calls: usize,
    requires_unlock: bool,
}

#[derive(Clone, Default)]
pub struct MusicLog {
    inner: Arc<Mutex<MusicState>>,
}

impl MusicLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locked() -> Self {
        let log = Self::default();
        log.inner.lock().unwrap().requires_unlock = true;
        log
    }

    pub fn set_track_duration(&self, duration: Duration) {
        self.inner.lock().unwrap().duration = duration;
    }

    pub fn loaded(&self) -> Option<String> {
        self.inner.lock().unwrap().loaded.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock().unwrap().playing
    }

    pub fn volume(&self) -> f32 {
        self.inner.lock().unwrap().volume
    }

    pub fn volume_history(&self) -> Vec<f32> {
        self.inner.lock().unwrap().volume_history.clone()
    }

    pub fn play_calls(&self) -> usize {
        self.inner.lock().unwrap().play_calls
    }

    pub fn pause_calls(&self) -> usize {
        self.inner.lock().unwrap().pause_calls
    }

    pub fn position(&self) -> Duration {
        self.inner.lock().unwrap().position
    }
}

pub struct MockMusic {
    log: MusicLog,
}

impl MockMusic {
    pub fn new(log: MusicLog) -> Self {
        Self { log }
    }
}

impl MusicBackend for MockMusic {
    fn load(&mut self, source: Option<&str>) {
        let mut state = self.log.inner.lock().unwrap();
        state.loaded = source.map(str::to_string);
        state.playing = false;
        state.position = Duration::ZERO;
        if state.loaded.is_none() {
            state.duration = Duration::ZERO;
        }
    }

    fn play(&mut self) {
        let mut state = self.log.inner.lock().unwrap();
        state.play_calls += 1;
        if state.loaded.is_some() {
            state.playing = true;
        }
    }

    fn pause(&mut self) {
        let mut state = self.log.inner.lock().unwrap();
        state.pause_calls += 1;
        state.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.log.inner.lock().unwrap().playing
    }

    fn seek(&mut self, position: Duration) {
        self.log.inner.lock().unwrap().position = position;
    }

    fn position(&self) -> Duration {
        self.log.inner.lock().unwrap().position
    }

    fn duration(&self) -> Duration {
        self.log.inner.lock().unwrap().duration
    }

    fn set_volume(&mut self, volume: f32) {
        let mut state = self.log.inner.lock().unwrap();
        state.volume = volume;
        state.volume_history.push(volume);
    }

    fn requires_unlock(&self) -> bool {
        self.log.inner.lock().unwrap().requires_unlock
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wake lock
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct WakeLockLog {
    counts: Arc<Mutex<(usize, usize)>>,
}

impl WakeLockLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquires(&self) -> usize {
        self.counts.lock().unwrap().0
    }

    pub fn releases(&self) -> usize {
        self.counts.lock().unwrap().1
    }
}

pub struct MockWakeLock {
    log: WakeLockLog,
}

impl MockWakeLock {
    pub fn new(log: WakeLockLog) -> Self {
        Self { log }
    }
}

impl WakeLock for MockWakeLock {
    fn acquire(&mut self) {
        self.log.counts.lock().unwrap().0 += 1;
    }

    fn release(&mut self) {
        self.log.counts.lock().unwrap().1 += 1;
    }
}
