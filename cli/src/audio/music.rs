//! Looping background track through a rodio sink.
//!
//! Playback position is tracked from a monotonic reference (base offset
//! plus the running span) rather than asking the decoder, so `seek` and
//! `position` behave the same for every container format. Track sources
//! are local file paths.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use cadence_core::audio::MusicBackend;
use rodio::{Decoder, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

pub struct RodioMusic {
    handle: Option<OutputStreamHandle>,
    sink: Option<Sink>,
    source_path: Option<PathBuf>,
    track_duration: Duration,
    /// Position accounting: folded-in playtime plus the running span.
    base: Duration,
    playing_since: Option<Instant>,
    volume: f32,
}

impl RodioMusic {
    pub fn new(handle: Option<OutputStreamHandle>) -> Self {
        Self {
            handle,
            sink: None,
            source_path: None,
            track_duration: Duration::ZERO,
            base: Duration::ZERO,
            playing_since: None,
            volume: 1.0,
        }
    }

    fn unload(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.source_path = None;
        self.track_duration = Duration::ZERO;
        self.base = Duration::ZERO;
        self.playing_since = None;
    }
}

impl MusicBackend for RodioMusic {
    fn load(&mut self, source: Option<&str>) {
        self.unload();
        let Some(source) = source else {
            return;
        };
        let Some(handle) = &self.handle else {
            return;
        };
        let path = PathBuf::from(source);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(error) => {
                warn!(%error, path = %path.display(), "failed to open music track");
                return;
            }
        };
        let decoder = match Decoder::new(BufReader::new(file)) {
            Ok(decoder) => decoder,
            Err(error) => {
                warn!(%error, path = %path.display(), "failed to decode music track");
                return;
            }
        };
        self.track_duration = decoder.total_duration().unwrap_or(Duration::ZERO);
        let sink = match Sink::try_new(handle) {
            Ok(sink) => sink,
            Err(error) => {
                debug!(%error, "music sink unavailable");
                return;
            }
        };
        sink.append(decoder.repeat_infinite());
        sink.pause();
        sink.set_volume(self.volume);
        self.sink = Some(sink);
        self.source_path = Some(path);
    }

    fn play(&mut self) {
        let Some(sink) = &self.sink else {
            return;
        };
        if self.playing_since.is_some() {
            return;
        }
        sink.play();
        self.playing_since = Some(Instant::now());
    }

    fn pause(&mut self) {
        let Some(sink) = &self.sink else {
            return;
        };
        if let Some(since) = self.playing_since.take() {
            self.base += since.elapsed();
        }
        sink.pause();
    }

    fn is_playing(&self) -> bool {
        self.playing_since.is_some()
    }

    fn seek(&mut self, position: Duration) {
        let Some(sink) = &self.sink else {
            return;
        };
        match sink.try_seek(position) {
            Ok(()) => {
                self.base = position;
                if self.playing_since.is_some() {
                    self.playing_since = Some(Instant::now());
                }
            }
            Err(error) => debug!(%error, "seek not supported for this track"),
        }
    }

    fn position(&self) -> Duration {
        if self.sink.is_none() {
            return Duration::ZERO;
        }
        let raw = self.base
            + self
                .playing_since
                .map_or(Duration::ZERO, |since| since.elapsed());
        if self.track_duration.is_zero() {
            return raw;
        }
        // The track loops; report the in-track offset.
        let wrapped = raw.as_nanos() % self.track_duration.as_nanos();
        Duration::from_nanos(wrapped as u64)
    }

    fn duration(&self) -> Duration {
        self.track_duration
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }
}
