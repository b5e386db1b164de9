//! System-wide default constants.
//!
//! Unit conversions and file locations shared by the config layer, the
//! preprocessor and the retardation arithmetic.

// ============================================================================
// Config Discovery
// ============================================================================

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "BFT_CONFIG";

/// Config file looked up in the current working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bft_config.toml";

// ============================================================================
// Units
// ============================================================================

/// km/h to m/s.
pub const KMH_TO_MS: f64 = 1000.0 / 3600.0;

/// Milliseconds per second (epoch timestamps are in ms).
pub const MS_PER_SECOND: f64 = 1000.0;

/// Seconds per day, used when a clock-time column wraps past midnight.
pub const SECONDS_PER_DAY: i64 = 86_400;

// ============================================================================
// Reporting
// ============================================================================

/// Report averages are rounded to this many decimal places.
pub const REPORT_DECIMALS: i32 = 2;
