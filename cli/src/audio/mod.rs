//! rodio/TTS-backed audio channels.
//!
//! The rodio output stream is not `Send`, so it lives on a dedicated holder
//! thread for the process lifetime; everything else talks to it through the
//! cloneable handle. When no output device is available every channel
//! degrades to silence.

mod music;
mod speech;
mod tone;

pub use music::RodioMusic;
pub use speech::PlatformSpeech;
pub use tone::RodioTone;

use std::sync::Arc;
use std::sync::mpsc;

use cadence_core::audio::AudioCoordinator;
use cadence_core::clock::Clock;
use cadence_types::AudioSettings;
use rodio::OutputStreamHandle;
use tracing::warn;

/// Open the default output device on a dedicated holder thread.
/// Returns `None` when the platform has no usable device.
pub fn open_output() -> Option<OutputStreamHandle> {
    let (tx, rx) = mpsc::channel();
    let spawned = std::thread::Builder::new()
        .name("cadence-audio".to_string())
        .spawn(move || match rodio::OutputStream::try_default() {
            Ok((stream, handle)) => {
                let _ = tx.send(Some(handle));
                // The stream must outlive every sink attached to it.
                let _stream = stream;
                loop {
                    std::thread::park();
                }
            }
            Err(error) => {
                warn!(%error, "no audio output device, running silent");
                let _ = tx.send(None);
            }
        });
    if spawned.is_err() {
        return None;
    }
    rx.recv().ok().flatten()
}

/// Assemble a coordinator over the platform channels.
pub fn build_coordinator(
    output: Option<OutputStreamHandle>,
    clock: Arc<dyn Clock>,
    settings: &AudioSettings,
) -> AudioCoordinator {
    AudioCoordinator::new(
        Box::new(PlatformSpeech::new()),
        Box::new(RodioTone::new(output.clone())),
        Box::new(RodioMusic::new(output)),
        clock,
        settings,
    )
}
