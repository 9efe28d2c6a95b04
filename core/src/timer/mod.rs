//! Countdown timing
//!
//! `PreciseTimer` is the single step countdown used by the run controller.
//! The host drives it at whatever cadence it prefers; accuracy comes from
//! recomputing elapsed time against a monotonic reference, not from the
//! tick rate.

mod precise;


pub use precise::{PreciseTimer, TimerTick};
