//! Detection Configuration - every segmentation and braking threshold as a
//! tunable TOML value
//!
//! Each struct implements `Default` with the values the detector has always
//! used, so a run without a config file behaves identically to one with an
//! empty file.

use super::defaults::{CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one analysis run.
///
/// Load with `DetectionConfig::load()` which searches:
/// 1. `$BFT_CONFIG` env var
/// 2. `./bft_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Run identification (logs and reports only)
    #[serde(default)]
    pub run: RunInfo,

    /// Time normalization and sample rejection
    #[serde(default)]
    pub preprocess: PreprocessConfig,

    /// Truncation boundary for brake feel test scanning
    #[serde(default)]
    pub boundary: BoundaryConfig,

    /// Segmenter cursor control
    #[serde(default)]
    pub segmenter: SegmenterConfig,

    /// Acceleration phase detection
    #[serde(default)]
    pub acceleration: AccelerationThresholds,

    /// Braking phase detection
    #[serde(default)]
    pub braking: BrakingThresholds,

    /// Recovery phase detection
    #[serde(default)]
    pub recovery: RecoveryThresholds,

    /// Emergency braking onset location before a halt
    #[serde(default)]
    pub emergency: EmergencyBrakingConfig,

    /// Report recommendation thresholds
    #[serde(default)]
    pub report: ReportThresholds,
}

impl DetectionConfig {
    /// Load configuration using the standard search order:
    /// 1. `$BFT_CONFIG` environment variable
    /// 2. `./bft_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), run = %config.run.name, "Loaded detection config from BFT_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from BFT_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "BFT_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(run = %config.run.name, "Loaded detection config from ./bft_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./bft_config.toml, using defaults");
                }
            }
        }

        info!("No bft_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Toml(err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are reported as warnings only; existing configs keep
    /// working when a field is renamed or removed.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in &super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents).map_err(ConfigError::Toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Detection config saved");
        Ok(())
    }

    /// Validate all thresholds for internal consistency.
    ///
    /// Rules:
    /// - Search windows and sample counts must be > 0
    /// - Every f64 must be finite; tolerances and bands must be >= 0
    /// - Gain and drop minimums must be > 0
    /// - The recovery noise band must contain the maintain band
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        // Windows and counts
        Self::check_nonzero(self.acceleration.window_samples, "acceleration.window_samples", &mut errors);
        Self::check_nonzero(self.braking.window_samples, "braking.window_samples", &mut errors);
        Self::check_nonzero(self.recovery.window_samples, "recovery.window_samples", &mut errors);
        Self::check_nonzero(self.recovery.maintain_samples, "recovery.maintain_samples", &mut errors);
        Self::check_nonzero(self.segmenter.min_lookahead_samples, "segmenter.min_lookahead_samples", &mut errors);

        // Tolerances
        Self::check_non_negative(self.acceleration.plateau_tolerance_kmh, "acceleration.plateau_tolerance_kmh", &mut errors);
        Self::check_non_negative(self.braking.plateau_tolerance_kmh, "braking.plateau_tolerance_kmh", &mut errors);
        Self::check_non_negative(self.recovery.maintain_band_kmh, "recovery.maintain_band_kmh", &mut errors);
        Self::check_non_negative(self.recovery.noise_band_kmh, "recovery.noise_band_kmh", &mut errors);
        Self::check_non_negative(self.recovery.accelerate_margin_kmh, "recovery.accelerate_margin_kmh", &mut errors);
        Self::check_non_negative(self.emergency.halt_match_tolerance_m, "emergency.halt_match_tolerance_m", &mut errors);
        Self::check_non_negative(self.boundary.min_halt_distance_m, "boundary.min_halt_distance_m", &mut errors);
        Self::check_non_negative(self.segmenter.min_test_speed_kmh, "segmenter.min_test_speed_kmh", &mut errors);
        Self::check_non_negative(self.report.low_speed_drop_kmh, "report.low_speed_drop_kmh", &mut errors);
        Self::check_non_negative(self.report.low_max_speed_kmh, "report.low_max_speed_kmh", &mut errors);

        // Minimums that define a detection
        Self::check_positive(self.acceleration.min_gain_kmh, "acceleration.min_gain_kmh", &mut errors);
        Self::check_positive(self.braking.arming_drop_kmh, "braking.arming_drop_kmh", &mut errors);
        Self::check_positive(self.braking.min_speed_drop_kmh, "braking.min_speed_drop_kmh", &mut errors);
        Self::check_positive(self.emergency.search_window_m, "emergency.search_window_m", &mut errors);
        Self::check_positive(self.preprocess.epoch_millis_threshold, "preprocess.epoch_millis_threshold", &mut errors);

        if self.recovery.noise_band_kmh < self.recovery.maintain_band_kmh {
            errors.push(format!(
                "recovery.noise_band_kmh ({:.1}) must be >= maintain_band_kmh ({:.1})",
                self.recovery.noise_band_kmh, self.recovery.maintain_band_kmh
            ));
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_nonzero(value: usize, name: &str, errors: &mut Vec<String>) {
        if value == 0 {
            errors.push(format!("{name} must be > 0"));
        }
    }

    fn check_non_negative(value: f64, name: &str, errors: &mut Vec<String>) {
        if !value.is_finite() {
            errors.push(format!("{name}: value must be finite (got {value})"));
        } else if value < 0.0 {
            errors.push(format!("{name} ({value:.3}) must be >= 0"));
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        if !value.is_finite() {
            errors.push(format!("{name}: value must be finite (got {value})"));
        } else if value <= 0.0 {
            errors.push(format!("{name} ({value:.3}) must be > 0"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config parse error: {0}")]
    Toml(#[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Run Info
// ============================================================================

/// Identification metadata; not used for logic, but appears in logs and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    /// Run name / identifier
    #[serde(default = "default_run_name")]
    pub name: String,

    /// Locomotive number
    #[serde(default)]
    pub loco_id: String,

    /// Train number
    #[serde(default)]
    pub train_no: String,
}

fn default_run_name() -> String {
    "UNNAMED".to_string()
}

impl Default for RunInfo {
    fn default() -> Self {
        Self {
            name: default_run_name(),
            loco_id: String::new(),
            train_no: String::new(),
        }
    }
}

// ============================================================================
// Preprocessing
// ============================================================================

/// Time normalization and rejection bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// A first time value whose magnitude exceeds this is treated as a
    /// millisecond epoch timestamp.
    #[serde(default = "default_epoch_millis_threshold")]
    pub epoch_millis_threshold: f64,

    /// How many dropped original indices are kept in the rejection tally.
    #[serde(default = "default_rejection_sample_limit")]
    pub rejection_sample_limit: usize,
}

fn default_epoch_millis_threshold() -> f64 { 1_000_000.0 }
fn default_rejection_sample_limit() -> usize { 5 }

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            epoch_millis_threshold: default_epoch_millis_threshold(),
            rejection_sample_limit: default_rejection_sample_limit(),
        }
    }
}

// ============================================================================
// Boundary
// ============================================================================

/// Where brake feel test scanning stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Minimum cumulative distance (m) for a standstill to end the scan window.
    /// Standstills closer to the start are yard or platform moves.
    #[serde(default = "default_min_halt_distance")]
    pub min_halt_distance_m: f64,
}

fn default_min_halt_distance() -> f64 { 700.0 }

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            min_halt_distance_m: default_min_halt_distance(),
        }
    }
}

// ============================================================================
// Segmenter
// ============================================================================

/// Cursor control for the phase segmenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Samples that must remain after the cursor to attempt a detection.
    #[serde(default = "default_min_lookahead")]
    pub min_lookahead_samples: usize,

    /// Peak speed an acceleration must reach before braking is tried (km/h).
    #[serde(default = "default_min_test_speed")]
    pub min_test_speed_kmh: f64,

    /// Cursor skip past the acceleration end when braking is not found.
    #[serde(default = "default_braking_miss_skip")]
    pub braking_miss_skip_samples: usize,
}

fn default_min_lookahead() -> usize { 30 }
fn default_min_test_speed() -> f64 { 20.0 }
fn default_braking_miss_skip() -> usize { 10 }

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_lookahead_samples: default_min_lookahead(),
            min_test_speed_kmh: default_min_test_speed(),
            braking_miss_skip_samples: default_braking_miss_skip(),
        }
    }
}

// ============================================================================
// Acceleration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccelerationThresholds {
    /// Maximum samples inspected from the search start.
    #[serde(default = "default_accel_window")]
    pub window_samples: usize,

    /// Adjacent changes within this band count as plateau (km/h).
    #[serde(default = "default_plateau_tolerance")]
    pub plateau_tolerance_kmh: f64,

    /// Required rise from start to peak (km/h).
    #[serde(default = "default_min_gain")]
    pub min_gain_kmh: f64,

    /// Phase ends once the plateau run exceeds this many samples.
    #[serde(default = "default_accel_max_plateau")]
    pub max_plateau_samples: usize,
}

fn default_accel_window() -> usize { 120 }
fn default_plateau_tolerance() -> f64 { 2.0 }
fn default_min_gain() -> f64 { 15.0 }
fn default_accel_max_plateau() -> usize { 10 }

impl Default for AccelerationThresholds {
    fn default() -> Self {
        Self {
            window_samples: default_accel_window(),
            plateau_tolerance_kmh: default_plateau_tolerance(),
            min_gain_kmh: default_min_gain(),
            max_plateau_samples: default_accel_max_plateau(),
        }
    }
}

// ============================================================================
// Braking
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrakingThresholds {
    /// Maximum samples inspected from the acceleration end.
    #[serde(default = "default_braking_window")]
    pub window_samples: usize,

    /// Adjacent changes within this band count as plateau (km/h).
    #[serde(default = "default_plateau_tolerance")]
    pub plateau_tolerance_kmh: f64,

    /// Drop from braking start that arms the phase (km/h).
    #[serde(default = "default_arming_drop")]
    pub arming_drop_kmh: f64,

    /// Required drop from braking start to the lowest speed (km/h).
    #[serde(default = "default_min_speed_drop")]
    pub min_speed_drop_kmh: f64,

    /// Once armed, the phase ends when the plateau run exceeds this.
    #[serde(default = "default_braking_max_plateau")]
    pub max_plateau_samples: usize,
}

fn default_braking_window() -> usize { 60 }
fn default_arming_drop() -> f64 { 10.0 }
fn default_min_speed_drop() -> f64 { 15.0 }
fn default_braking_max_plateau() -> usize { 15 }

impl Default for BrakingThresholds {
    fn default() -> Self {
        Self {
            window_samples: default_braking_window(),
            plateau_tolerance_kmh: default_plateau_tolerance(),
            arming_drop_kmh: default_arming_drop(),
            min_speed_drop_kmh: default_min_speed_drop(),
            max_plateau_samples: default_braking_max_plateau(),
        }
    }
}

// ============================================================================
// Recovery
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryThresholds {
    /// Maximum samples inspected from the braking end.
    #[serde(default = "default_recovery_window")]
    pub window_samples: usize,

    /// Speeds within this band of the braking low count towards maintain (km/h).
    #[serde(default = "default_maintain_band")]
    pub maintain_band_kmh: f64,

    /// Speeds inside this band but outside the maintain band decrement the
    /// maintain count instead of resetting it (km/h).
    #[serde(default = "default_noise_band")]
    pub noise_band_kmh: f64,

    /// A speed this far above the braking low is a re-acceleration (km/h).
    #[serde(default = "default_accelerate_margin")]
    pub accelerate_margin_kmh: f64,

    /// Maintain count that confirms a held speed.
    #[serde(default = "default_maintain_samples")]
    pub maintain_samples: usize,
}

fn default_recovery_window() -> usize { 40 }
fn default_maintain_band() -> f64 { 3.0 }
fn default_noise_band() -> f64 { 6.0 }
fn default_accelerate_margin() -> f64 { 5.0 }
fn default_maintain_samples() -> usize { 5 }

impl Default for RecoveryThresholds {
    fn default() -> Self {
        Self {
            window_samples: default_recovery_window(),
            maintain_band_kmh: default_maintain_band(),
            noise_band_kmh: default_noise_band(),
            accelerate_margin_kmh: default_accelerate_margin(),
            maintain_samples: default_maintain_samples(),
        }
    }
}

// ============================================================================
// Emergency Braking
// ============================================================================

/// Backward scan before a halt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyBrakingConfig {
    /// How far before the halt (m) the onset is searched for.
    #[serde(default = "default_search_window")]
    pub search_window_m: f64,

    /// A held speed must run longer than this many samples to be an onset.
    #[serde(default = "default_min_maintained_samples")]
    pub min_maintained_samples: usize,

    /// Allowed |cumulative distance - halt distance| when locating the halt
    /// sample (m). 0.0 means exact equality.
    #[serde(default)]
    pub halt_match_tolerance_m: f64,
}

fn default_search_window() -> f64 { 700.0 }
fn default_min_maintained_samples() -> usize { 2 }

impl Default for EmergencyBrakingConfig {
    fn default() -> Self {
        Self {
            search_window_m: default_search_window(),
            min_maintained_samples: default_min_maintained_samples(),
            halt_match_tolerance_m: 0.0,
        }
    }
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportThresholds {
    /// Average speed drop below this suggests a firmer application (km/h).
    #[serde(default = "default_low_speed_drop")]
    pub low_speed_drop_kmh: f64,

    /// Average peak speed below this suggests testing faster (km/h).
    #[serde(default = "default_low_max_speed")]
    pub low_max_speed_kmh: f64,
}

fn default_low_speed_drop() -> f64 { 10.0 }
fn default_low_max_speed() -> f64 { 30.0 }

impl Default for ReportThresholds {
    fn default() -> Self {
        Self {
            low_speed_drop_kmh: default_low_speed_drop(),
            low_max_speed_kmh: default_low_max_speed(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
