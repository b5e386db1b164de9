//! Shared data structures for brake feel test and retardation analysis
//!
//! - Samples: raw SPM cells, raw columns, validated sample points
//! - Phases: acceleration / braking / recovery and the assembled test record
//! - Halts: halt inputs, located braking intervals, retardation estimates
//! - Report: aggregated brake feel report

mod sample;
mod phase;
mod halt;
mod report;

pub use sample::*;
pub use phase::*;
pub use halt::*;
pub use report::*;
