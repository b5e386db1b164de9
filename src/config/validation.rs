//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse: the raw TOML is first read into a `toml::Value`, its key
//! tree is compared against the known field names, and warnings with "did you
//! mean?" suggestions are emitted. Normal serde deserialization follows.
//! Warnings never break an existing config.

use std::collections::HashSet;

/// Highest speed any detection threshold may sensibly reference (km/h).
const MAX_PLAUSIBLE_SPEED_KMH: f64 = 200.0;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `DetectionConfig`.
///
/// Maintained by hand against the struct hierarchy in detection_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [run]
        "run",
        "run.name",
        "run.loco_id",
        "run.train_no",
        // [preprocess]
        "preprocess",
        "preprocess.epoch_millis_threshold",
        "preprocess.rejection_sample_limit",
        // [boundary]
        "boundary",
        "boundary.min_halt_distance_m",
        // [segmenter]
        "segmenter",
        "segmenter.min_lookahead_samples",
        "segmenter.min_test_speed_kmh",
        "segmenter.braking_miss_skip_samples",
        // [acceleration]
        "acceleration",
        "acceleration.window_samples",
        "acceleration.plateau_tolerance_kmh",
        "acceleration.min_gain_kmh",
        "acceleration.max_plateau_samples",
        // [braking]
        "braking",
        "braking.window_samples",
        "braking.plateau_tolerance_kmh",
        "braking.arming_drop_kmh",
        "braking.min_speed_drop_kmh",
        "braking.max_plateau_samples",
        // [recovery]
        "recovery",
        "recovery.window_samples",
        "recovery.maintain_band_kmh",
        "recovery.noise_band_kmh",
        "recovery.accelerate_margin_kmh",
        "recovery.maintain_samples",
        // [emergency]
        "emergency",
        "emergency.search_window_m",
        "emergency.min_maintained_samples",
        "emergency.halt_match_tolerance_m",
        // [report]
        "report",
        "report.low_speed_drop_kmh",
        "report.low_max_speed_kmh",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Edit distance between two strings, counted in chars.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let b_len = b_chars.len();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        // Tie-break on the key so the suggestion does not depend on hash order
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Never fails; parse errors surface later from serde.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed `DetectionConfig`.
///
/// Returns (errors, warnings): errors are impossible values that must stop
/// the run; warnings are suspicious but allowed.
pub fn validate_physical_ranges(
    config: &super::DetectionConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Speed thresholds beyond any locomotive's reach can never match
    for (name, value) in [
        ("segmenter.min_test_speed_kmh", config.segmenter.min_test_speed_kmh),
        ("acceleration.min_gain_kmh", config.acceleration.min_gain_kmh),
        ("braking.min_speed_drop_kmh", config.braking.min_speed_drop_kmh),
        ("braking.arming_drop_kmh", config.braking.arming_drop_kmh),
    ] {
        if value > MAX_PLAUSIBLE_SPEED_KMH {
            errors.push(format!(
                "{name} = {value:.1} is outside physical range (0-{MAX_PLAUSIBLE_SPEED_KMH:.0} km/h)"
            ));
        }
    }

    // A day of relative seconds must not be mistaken for epoch milliseconds
    let epoch = config.preprocess.epoch_millis_threshold;
    if epoch < 86_400.0 {
        errors.push(format!(
            "preprocess.epoch_millis_threshold = {epoch:.0} would classify relative seconds within a day as epoch milliseconds"
        ));
    }

    let halt = config.boundary.min_halt_distance_m;
    if !(100.0..=5_000.0).contains(&halt) {
        warnings.push(ValidationWarning {
            field: "boundary.min_halt_distance_m".to_string(),
            message: format!("min_halt_distance_m = {halt:.0} is outside typical range (100-5000 m)"),
            suggestion: None,
        });
    }

    let window = config.emergency.search_window_m;
    if !(200.0..=3_000.0).contains(&window) {
        warnings.push(ValidationWarning {
            field: "emergency.search_window_m".to_string(),
            message: format!("search_window_m = {window:.0} is outside typical range (200-3000 m)"),
            suggestion: None,
        });
    }

    for (name, value) in [
        ("acceleration.plateau_tolerance_kmh", config.acceleration.plateau_tolerance_kmh),
        ("braking.plateau_tolerance_kmh", config.braking.plateau_tolerance_kmh),
    ] {
        if value > 5.0 {
            warnings.push(ValidationWarning {
                field: name.to_string(),
                message: format!("{name} = {value:.1} is wider than typical SPM speed jitter (0-5 km/h)"),
                suggestion: None,
            });
        }
    }

    let tolerance = config.emergency.halt_match_tolerance_m;
    if tolerance > 0.0 {
        warnings.push(ValidationWarning {
            field: "emergency.halt_match_tolerance_m".to_string(),
            message: format!(
                "halt_match_tolerance_m = {tolerance:.2}: halts are matched approximately instead of exactly"
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectionConfig;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("braking", "braking"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("recovry", "recovery"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [braking]
            min_speed_drop_kmh = 15.0
        "#
        .parse()
        .expect("valid toml");
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"braking".to_string()));
        assert!(keys.contains(&"braking.min_speed_drop_kmh".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[braking]
min_sped_drop_kmh = 15.0
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].field.contains("min_sped_drop_kmh"));
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("braking.min_speed_drop_kmh")
        );
    }

    #[test]
    fn test_all_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[run]
name = "Test-1"
loco_id = "WAG9-31001"

[recovery]
maintain_samples = 4

[emergency]
search_window_m = 800.0
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.is_empty(), "Expected 0 warnings, got: {warnings:?}");
    }

    #[test]
    fn test_unknown_section_produces_warning() {
        let warnings = validate_unknown_keys("[decel]\nwindow = 3\n");
        assert!(warnings.iter().any(|w| w.field == "decel"));
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_physical_range_defaults_clean() {
        let (errors, warnings) = validate_physical_ranges(&DetectionConfig::default());
        assert!(errors.is_empty(), "Defaults should produce no errors: {errors:?}");
        assert!(warnings.is_empty(), "Defaults should produce no warnings: {warnings:?}");
    }

    #[test]
    fn test_physical_range_impossible_test_speed() {
        let mut config = DetectionConfig::default();
        config.segmenter.min_test_speed_kmh = 450.0;
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("min_test_speed_kmh")));
    }

    #[test]
    fn test_physical_range_small_epoch_threshold() {
        let mut config = DetectionConfig::default();
        config.preprocess.epoch_millis_threshold = 3_600.0;
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("epoch_millis_threshold")));
    }

    #[test]
    fn test_halt_tolerance_is_flagged() {
        let mut config = DetectionConfig::default();
        config.emergency.halt_match_tolerance_m = 1.0;
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.field == "emergency.halt_match_tolerance_m"));
    }
}
