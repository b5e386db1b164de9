//! Brake feel test detection
//!
//! - `phases`: bounded forward searches for acceleration, braking, recovery
//! - `segmenter`: the cursor-driven state machine that chains them into tests

mod phases;
mod segmenter;

pub use phases::{find_acceleration, find_braking, find_recovery, PhaseMiss, PhaseSearch};
pub use segmenter::PhaseSegmenter;
