//! Detection Configuration Module
//!
//! Every threshold used by the brake feel test segmenter and the emergency
//! braking locator lives in one TOML-loadable structure, handed to each
//! component at construction.
//!
//! ## Loading Order
//!
//! 1. `BFT_CONFIG` environment variable (path to TOML file)
//! 2. `bft_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! ```ignore
//! let config = DetectionConfig::load();
//! let analyzer = BrakeFeelAnalyzer::new(config);
//! ```

mod detection_config;
pub mod defaults;
pub mod validation;

pub use detection_config::*;
