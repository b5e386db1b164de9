//! Config Validation Tests
//!
//! Exercises the detection config layer from outside the crate: typo
//! detection on unknown keys, consistency and physical-range validation,
//! and loading from disk.

use bft_analyzer::config::validation::{
    known_config_keys, suggest_correction, validate_physical_ranges, validate_unknown_keys,
};
use bft_analyzer::config::{ConfigError, DetectionConfig};
use std::io::Write;

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_braking_key_warns_with_suggestion() {
    let toml_str = r#"
[braking]
min_sped_drop_kmh = 12.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("min_sped_drop_kmh"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("braking.min_speed_drop_kmh")
    );
}

#[test]
fn unknown_section_has_no_close_suggestion() {
    let warnings = validate_unknown_keys("[telemetry_uplink]\nendpoint = \"x\"\n");
    assert!(!warnings.is_empty());
    assert!(warnings.iter().all(|w| w.suggestion.is_none()));
}

#[test]
fn full_valid_config_produces_zero_warnings() {
    let toml_str = r#"
[run]
name = "12951 UP"
loco_id = "WAP7-30245"
train_no = "12951"

[preprocess]
epoch_millis_threshold = 1000000.0
rejection_sample_limit = 5

[boundary]
min_halt_distance_m = 700.0

[segmenter]
min_lookahead_samples = 30
min_test_speed_kmh = 20.0
braking_miss_skip_samples = 10

[acceleration]
window_samples = 120
plateau_tolerance_kmh = 2.0
min_gain_kmh = 15.0
max_plateau_samples = 10

[braking]
window_samples = 60
plateau_tolerance_kmh = 2.0
arming_drop_kmh = 10.0
min_speed_drop_kmh = 15.0
max_plateau_samples = 15

[recovery]
window_samples = 40
maintain_band_kmh = 3.0
noise_band_kmh = 6.0
accelerate_margin_kmh = 5.0
maintain_samples = 5

[emergency]
search_window_m = 700.0
min_maintained_samples = 2
halt_match_tolerance_m = 0.0

[report]
low_speed_drop_kmh = 10.0
low_max_speed_kmh = 30.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "Unexpected warnings: {warnings:?}");
    let config = DetectionConfig::from_toml_str(toml_str).expect("valid config");
    assert_eq!(config.run.loco_id, "WAP7-30245");
}

#[test]
fn every_default_key_is_known() {
    let defaults = DetectionConfig::default().to_toml().expect("serialize");
    assert!(validate_unknown_keys(&defaults).is_empty());
    assert!(known_config_keys().contains("emergency.min_maintained_samples"));
}

#[test]
fn suggestion_requires_close_match() {
    let known = known_config_keys();
    assert_eq!(
        suggest_correction("recovery.maintain_sample", &known).as_deref(),
        Some("recovery.maintain_samples")
    );
    assert!(suggest_correction("completely.unrelated_key", &known).is_none());
}

// ============================================================================
// Range & Consistency Validation
// ============================================================================

#[test]
fn defaults_pass_range_checks() {
    let (errors, warnings) = validate_physical_ranges(&DetectionConfig::default());
    assert!(errors.is_empty(), "{errors:?}");
    assert!(warnings.is_empty(), "{warnings:?}");
}

#[test]
fn impossible_speed_threshold_is_an_error() {
    let mut config = DetectionConfig::default();
    config.braking.min_speed_drop_kmh = 350.0;
    let (errors, _) = validate_physical_ranges(&config);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("braking.min_speed_drop_kmh"));
    assert!(config.validate().is_err());
}

#[test]
fn unusual_halt_distance_only_warns() {
    let mut config = DetectionConfig::default();
    config.boundary.min_halt_distance_m = 50.0;
    let (errors, warnings) = validate_physical_ranges(&config);
    assert!(errors.is_empty());
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "boundary.min_halt_distance_m");
    assert!(config.validate().is_ok());
}

#[test]
fn halt_tolerance_opt_in_is_flagged() {
    let mut config = DetectionConfig::default();
    config.emergency.halt_match_tolerance_m = 0.5;
    let (_, warnings) = validate_physical_ranges(&config);
    assert!(warnings.iter().any(|w| w.field == "emergency.halt_match_tolerance_m"));
}

#[test]
fn validation_collects_every_error() {
    let toml_str = r#"
[acceleration]
window_samples = 0

[recovery]
maintain_band_kmh = 8.0
noise_band_kmh = 4.0

[emergency]
search_window_m = -5.0
"#;
    match DetectionConfig::from_toml_str(toml_str) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 3, "{errors:?}");
            assert!(errors.iter().any(|e| e.contains("acceleration.window_samples")));
            assert!(errors.iter().any(|e| e.contains("noise_band_kmh")));
            assert!(errors.iter().any(|e| e.contains("emergency.search_window_m")));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

// ============================================================================
// Loading From Disk
// ============================================================================

#[test]
fn load_from_file_applies_overrides() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[run]\nname = \"Trial\"\n\n[braking]\nmin_speed_drop_kmh = 18.0").expect("write");

    let config = DetectionConfig::load_from_file(file.path()).expect("load");
    assert_eq!(config.run.name, "Trial");
    assert_eq!(config.braking.min_speed_drop_kmh, 18.0);
    assert_eq!(config.acceleration, DetectionConfig::default().acceleration);
}

#[test]
fn save_then_load_preserves_config() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bft_config.toml");

    let mut config = DetectionConfig::default();
    config.run.name = "Round trip".to_string();
    config.recovery.maintain_samples = 7;
    config.save_to_file(&path).expect("save");

    assert_eq!(DetectionConfig::load_from_file(&path).expect("load"), config);
}

#[test]
fn malformed_file_reports_its_path() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[braking\nmin_speed_drop_kmh = ").expect("write");

    let err = DetectionConfig::load_from_file(file.path()).expect_err("should fail");
    assert!(matches!(err, ConfigError::Parse(ref path, _) if path == file.path()));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = DetectionConfig::load_from_file(&dir.path().join("absent.toml")).expect_err("missing");
    assert!(matches!(err, ConfigError::Io(..)));
}
