//! BFT Analyzer: locomotive brake feel tests and emergency braking retardation
//!
//! Works on speedometer (SPM) telemetry sampled at roughly 1 Hz.
//!
//! ## Architecture
//!
//! - **Preprocess**: halt boundary, time normalization, sample validation
//! - **Detection**: acceleration → braking → recovery segmentation into brake feel tests
//! - **Report**: averages and recommendations over the detected tests
//! - **Braking**: emergency braking onset before a halt and its retardation
//! - **SPM**: CSV loader for data-logger exports

pub mod config;
pub mod types;
pub mod observer;
pub mod preprocess;
pub mod detection;
pub mod braking;
pub mod report;
pub mod pipeline;
pub mod spm;

// Re-export configuration
pub use config::{ConfigError, DetectionConfig};

// Re-export commonly used types
pub use types::{
    BrakeFeelReport, BrakeFeelTest, CleanedSeries, EmergencyBrakingResult, Halt, RawColumns,
    RawValue, Recommendation, RecoveryKind, RetardationEstimate, SamplePoint,
};

// Re-export components
pub use braking::{
    detect_halts, EmergencyBrakingLocator, HaltAnalysis, HaltOutcome, LocatorMiss,
    RetardationCalculator, RetardationError,
};
pub use detection::PhaseSegmenter;
pub use observer::{DetectionObserver, NoopObserver, TracingObserver};
pub use pipeline::{BrakeFeelAnalysis, BrakeFeelAnalyzer, RetardationAnalyzer};
pub use report::ReportAggregator;
pub use spm::{SpmCsv, SpmLoadError, SpmRun};
