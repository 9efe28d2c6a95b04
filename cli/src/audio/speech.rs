//! Narration via the platform speech engine.
//!
//! Linux runs `espeak` as a subprocess (the `tts` crate needs
//! speech-dispatcher there); completion is the child exiting, and stop
//! kills it. Other platforms use the `tts` crate and resolve the pending
//! utterance from its utterance-end callback. Either way the receiver
//! returned by `speak` always resolves, so the run engine never hangs on
//! a failed narration.

#[cfg(target_os = "linux")]
mod imp {
    use std::process::Stdio;
    use std::sync::{Arc, Mutex};

    use tokio::sync::{Notify, oneshot};
    use tracing::debug;

    use cadence_core::audio::SpeechBackend;

    pub struct PlatformSpeech {
        /// Cancellation handle for the in-flight utterance, replaced on
        /// every `speak`.
        current_cancel: Arc<Mutex<Arc<Notify>>>,
    }

    impl PlatformSpeech {
        pub fn new() -> Self {
            Self {
                current_cancel: Arc::new(Mutex::new(Arc::new(Notify::new()))),
            }
        }
    }

    impl Default for PlatformSpeech {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SpeechBackend for PlatformSpeech {
        fn speak(&mut self, text: &str) -> oneshot::Receiver<()> {
            let cancel = Arc::new(Notify::new());
            {
                let mut slot = self.current_cancel.lock().expect("speech lock poisoned");
                // Preempt whatever is still being spoken.
                slot.notify_one();
                *slot = cancel.clone();
            }

            let (tx, rx) = oneshot::channel();
            let text = text.to_string();
            tokio::spawn(async move {
                let child = tokio::process::Command::new("espeak")
                    .arg(&text)
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn();
                match child {
                    Ok(mut child) => {
                        tokio::select! {
                            _ = child.wait() => {}
                            _ = cancel.notified() => {
                                let _ = child.start_kill();
                                let _ = child.wait().await;
                            }
                        }
                    }
                    Err(error) => {
                        debug!(%error, "espeak unavailable, narration skipped");
                    }
                }
                let _ = tx.send(());
            });
            rx
        }

        fn stop(&mut self) {
            self.current_cancel
                .lock()
                .expect("speech lock poisoned")
                .notify_one();
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod imp {
    use std::sync::{Arc, Mutex};

    use tokio::sync::oneshot;
    use tracing::debug;

    use cadence_core::audio::SpeechBackend;

    pub struct PlatformSpeech {
        tts: Option<tts::Tts>,
        pending: Arc<Mutex<Option<oneshot::Sender<()>>>>,
    }

    impl PlatformSpeech {
        pub fn new() -> Self {
            let pending: Arc<Mutex<Option<oneshot::Sender<()>>>> = Arc::default();
            let tts = match tts::Tts::default() {
                Ok(mut engine) => {
                    let callback_pending = pending.clone();
                    let _ = engine.on_utterance_end(Some(Box::new(move |_utterance| {
                        if let Some(tx) = callback_pending
                            .lock()
                            .expect("speech lock poisoned")
                            .take()
                        {
                            let _ = tx.send(());
                        }
                    })));
                    Some(engine)
                }
                Err(error) => {
                    debug!(%error, "speech engine unavailable, narration disabled");
                    None
                }
            };
            Self { tts, pending }
        }

        fn resolve_pending(&self) {
            if let Some(tx) = self.pending.lock().expect("speech lock poisoned").take() {
                let _ = tx.send(());
            }
        }
    }

    impl Default for PlatformSpeech {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SpeechBackend for PlatformSpeech {
        fn speak(&mut self, text: &str) -> oneshot::Receiver<()> {
            let (tx, rx) = oneshot::channel();
            // A superseded utterance counts as finished.
            self.resolve_pending();
            match &mut self.tts {
                Some(tts) => {
                    *self.pending.lock().expect("speech lock poisoned") = Some(tx);
                    if tts.speak(text, true).is_err() {
                        self.resolve_pending();
                    }
                }
                None => {
                    let _ = tx.send(());
                }
            }
            rx
        }

        fn stop(&mut self) {
            if let Some(tts) = &mut self.tts {
                let _ = tts.stop();
            }
            self.resolve_pending();
        }
    }
}

pub use imp::PlatformSpeech;
