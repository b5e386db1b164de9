//! Emergency braking before a halt
//!
//! - `locator`: finds where sustained braking for a halt began
//! - `retardation`: turns that interval into deceleration rates
//! - `halts`: halts seen in the run and the per-halt outcome record

mod halts;
mod locator;
mod retardation;

pub use halts::{detect_halts, HaltAnalysis, HaltOutcome};
pub use locator::{EmergencyBrakingLocator, LocatorMiss};
pub use retardation::{RetardationCalculator, RetardationError};
