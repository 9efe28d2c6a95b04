//! Cue tone vocabulary and timing constants.
//!
//! Three distinct tones: step completion, end-of-step warning, and the
//! side-switch double beep. The warning threshold and the minimum gap after
//! a side switch interact; see the run controller's warning suppression.

/// Played when a step's countdown reaches zero.
pub const COMPLETION_BEEP_FREQUENCY: f32 = 880.0;
pub const COMPLETION_BEEP_DURATION_MS: u64 = 200;

/// Played once, `WARNING_THRESHOLD_MS` before the end of a step.
pub const WARNING_BEEP_FREQUENCY: f32 = 660.0;
pub const WARNING_BEEP_DURATION_MS: u64 = 160;
pub const WARNING_THRESHOLD_MS: u64 = 5_000;

/// Side-switch cue: two identical beeps at the step midpoint.
pub const SIDE_SWITCH_BEEP_FREQUENCY: f32 = 740.0;
pub const SIDE_SWITCH_BEEP_DURATION_MS: u64 = 140;
pub const SIDE_SWITCH_DOUBLE_BEEP_DELAY_MS: u64 = 250;

/// Steps shorter than this never get a side-switch cue.
pub const SIDE_SWITCH_MIN_DURATION_SECS: u64 = 20;

/// How long the side-switch visual flag stays raised.
pub const SIDE_SWITCH_VISUAL_CUE_MS: u64 = 3_000;

/// The warning beep is suppressed when it would land closer than this to
/// the side-switch midpoint cue.
pub const MIN_WARNING_GAP_AFTER_SWITCH_MS: u64 = 6_000;

/// Gap between a finished step and the next announcement.
pub const INTER_STEP_DELAY_MS: u64 = 2_000;

/// Music duck envelope while a cue tone plays: drop to `DUCK_DEPTH` of the
/// stored volume, hold, then fade back linearly.
pub const DUCK_DEPTH: f32 = 0.25;
pub const DUCK_SUSTAIN_MS: u64 = 400;
pub const DUCK_FADE_MS: u64 = 120;
