//! Session run engine
//!
//! `RunController` sequences program steps, owns the single step timer and
//! the single pending continuation, and drives the audio channels. All
//! control operations apply synchronously; asynchronous inputs (narration
//! completion, the inter-step gap, tick cadence) enter through `tick`.

mod controller;
mod narration;
mod state;

#[cfg(test)]
mod controller_tests;

pub use controller::{CompletionHandler, RunController};
pub use narration::{NarrationLabels, speech_duration};
pub use state::{NextStepPreview, RunSnapshot, RunStatus};
