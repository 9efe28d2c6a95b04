//! Oscillator-style cue tones through rodio.

use std::time::Duration;

use cadence_core::audio::ToneBackend;
use rodio::source::{SineWave, Source};
use rodio::{OutputStreamHandle, Sink};
use tracing::debug;

pub struct RodioTone {
    handle: Option<OutputStreamHandle>,
}

impl RodioTone {
    pub fn new(handle: Option<OutputStreamHandle>) -> Self {
        Self { handle }
    }
}

impl ToneBackend for RodioTone {
    fn beep(&mut self, frequency_hz: f32, duration: Duration, volume: f32) {
        let Some(handle) = &self.handle else {
            return;
        };
        let sink = match Sink::try_new(handle) {
            Ok(sink) => sink,
            Err(error) => {
                debug!(%error, "cue tone sink unavailable");
                return;
            }
        };
        let source = SineWave::new(frequency_hz)
            .take_duration(duration)
            .amplify(volume);
        sink.append(source);
        // Plays to completion on the mixer thread.
        sink.detach();
    }
}
