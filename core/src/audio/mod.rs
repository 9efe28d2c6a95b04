//! Audio subsystem: narration, cue tones, and background music
//!
//! Three independently controlled channels behind one coordinator surface.
//! Platform playback lives behind the backend traits; the coordinator owns
//! volume, mute, ducking, warm-up, and deferred playback unlock.

mod backend;
mod coordinator;
pub mod cues;
pub mod library;

#[cfg(test)]
mod coordinator_tests;

pub use backend::{MusicBackend, NullMusic, NullSpeech, NullTone, SpeechBackend, ToneBackend};
pub use coordinator::AudioCoordinator;
