//! SPM CSV Loader
//!
//! Reads a speedometer (SPM) data-logger export into `RawColumns`. Exports
//! from different recorders name their columns differently, so columns are
//! located by normalized header name:
//!
//! | Column               | Accepted headers                                     |
//! |----------------------|------------------------------------------------------|
//! | time (required)      | `time`, `timestamp`, `datetime`                      |
//! | speed (required)     | `speed`, `speed_kmph`, `speed_kmh`                   |
//! | incremental distance | `distance`, `dist`, `distance_m`                     |
//! | cumulative distance  | `cumulative_distance`, `cum_dist`, `cumdist`, ...    |
//!
//! Cells are kept raw: blanks become `Empty`, numbers `Number`, anything
//! else `Text`. Cleaning happens later in the preprocessor.
//!
//! # Usage
//!
//! ```ignore
//! let run = SpmCsv::load("runs/12951_up.csv")?;
//! let analysis = BrakeFeelAnalyzer::new(config).analyze(&run.columns);
//! ```

use crate::types::{RawColumns, RawValue};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpmLoadError {
    #[error("failed to open {}: {}", .0.display(), .1)]
    Open(PathBuf, #[source] std::io::Error),

    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("empty CSV: no header row")]
    Empty,

    #[error("CSV has no {0} column")]
    MissingColumn(&'static str),
}

// ============================================================================
// CSV Quote-Aware Parsing
// ============================================================================

/// Split a CSV line respecting quoted fields (handles commas inside quotes).
fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

fn parse_cell(field: &str) -> RawValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return RawValue::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(v) => RawValue::Number(v),
        Err(_) => RawValue::Text(trimmed.to_string()),
    }
}

// ============================================================================
// Column Mapping
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ColumnMap {
    time: Option<usize>,
    speed: Option<usize>,
    distance: Option<usize>,
    cumulative: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &str) -> Self {
        let mut map = Self::default();
        for (idx, col) in csv_split(header).iter().enumerate() {
            let slot = match normalize_header(col).as_str() {
                "time" | "timestamp" | "datetime" => &mut map.time,
                "speed" | "speedkmph" | "speedkmh" => &mut map.speed,
                "distance" | "dist" | "distancem" => &mut map.distance,
                "cumulativedistance" | "cumdist" | "cumdistance" | "cumulativedistancem"
                | "cumdistm" => &mut map.cumulative,
                _ => continue,
            };
            // First matching column wins
            slot.get_or_insert(idx);
        }
        map
    }

    fn validate(&self) -> Result<(), SpmLoadError> {
        if self.time.is_none() {
            return Err(SpmLoadError::MissingColumn("time"));
        }
        if self.speed.is_none() {
            return Err(SpmLoadError::MissingColumn("speed"));
        }
        Ok(())
    }

    fn summary(&self) -> String {
        let present: Vec<&str> = [
            ("time", self.time),
            ("speed", self.speed),
            ("distance", self.distance),
            ("cumulative_distance", self.cumulative),
        ]
        .iter()
        .filter_map(|&(name, idx)| idx.map(|_| name))
        .collect();
        format!("Found columns: [{}]", present.join(", "))
    }
}

/// Lowercase, with spaces, underscores, dots, dashes and bracketed units
/// removed: `"Cum. Distance (m)"` becomes `"cumdistancem"`.
fn normalize_header(name: &str) -> String {
    name.trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

// ============================================================================
// SPM Run
// ============================================================================

/// Metadata about a loaded SPM export.
#[derive(Debug, Clone, Serialize)]
pub struct SpmRunInfo {
    pub source_path: String,
    pub row_count: usize,
    pub has_distances: bool,
    pub columns_found: String,
}

/// A loaded SPM export ready for analysis.
#[derive(Debug, Clone)]
pub struct SpmRun {
    pub columns: RawColumns,
    pub info: SpmRunInfo,
}

pub struct SpmCsv;

impl SpmCsv {
    /// Load an SPM CSV export from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<SpmRun, SpmLoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SpmLoadError::Open(path.to_path_buf(), e))?;
        let mut run = Self::read(BufReader::new(file))?;
        run.info.source_path = path.display().to_string();

        tracing::info!(
            file = %run.info.source_path,
            rows = run.info.row_count,
            distances = run.info.has_distances,
            "SPM run loaded"
        );
        Ok(run)
    }

    /// Parse an SPM CSV document held in memory.
    pub fn parse_str(contents: &str) -> Result<SpmRun, SpmLoadError> {
        Self::read(contents.as_bytes())
    }

    fn read(reader: impl BufRead) -> Result<SpmRun, SpmLoadError> {
        let mut lines = reader.lines();

        let header = lines
            .next()
            .ok_or(SpmLoadError::Empty)?
            .map_err(|source| SpmLoadError::Read { line: 1, source })?;

        let map = ColumnMap::from_header(&header);
        map.validate()?;
        let columns_found = map.summary();
        tracing::debug!("{}", columns_found);

        let mut time = Vec::new();
        let mut speed = Vec::new();
        let mut distance = Vec::new();
        let mut cumulative = Vec::new();

        for (offset, line) in lines.enumerate() {
            let line = line.map_err(|source| SpmLoadError::Read { line: offset + 2, source })?;
            if line.trim().is_empty() {
                continue;
            }
            let fields = csv_split(&line);
            let cell = |idx: Option<usize>| {
                idx.and_then(|i| fields.get(i))
                    .map_or(RawValue::Empty, |f| parse_cell(f))
            };

            time.push(cell(map.time));
            speed.push(cell(map.speed));
            distance.push(cell(map.distance));
            cumulative.push(cell(map.cumulative));
        }

        let row_count = speed.len();
        let has_distances = map.distance.is_some() || map.cumulative.is_some();
        let mut columns = RawColumns::new(time, speed);
        if has_distances {
            columns = columns.with_distances(distance, cumulative);
        }

        Ok(SpmRun {
            columns,
            info: SpmRunInfo {
                source_path: String::new(),
                row_count,
                has_distances,
                columns_found,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_split_quotes() {
        assert_eq!(csv_split(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
        assert_eq!(csv_split(r#""say ""hi""",2"#), vec![r#"say "hi""#, "2"]);
        assert_eq!(csv_split("1,,3"), vec!["1", "", "3"]);
    }

    #[test]
    fn test_header_aliases() {
        let map = ColumnMap::from_header("Date,Time,Speed (Kmph),Distance,Cum. Dist");
        assert_eq!(map.time, Some(1));
        assert_eq!(map.speed, Some(2));
        assert_eq!(map.distance, Some(3));
        assert_eq!(map.cumulative, Some(4));
    }

    #[test]
    fn test_cells_kept_raw() {
        let run = SpmCsv::parse_str("time,speed\n10:00:00,12.5\n10:00:01,\n10:00:02,abc\n")
            .expect("parse");
        assert_eq!(run.info.row_count, 3);
        assert!(!run.info.has_distances);
        assert_eq!(run.columns.time[0], RawValue::Text("10:00:00".to_string()));
        assert_eq!(run.columns.speed, vec![
            RawValue::Number(12.5),
            RawValue::Empty,
            RawValue::Text("abc".to_string()),
        ]);
        assert!(run.columns.distance.is_none());
    }

    #[test]
    fn test_short_rows_pad_with_empty() {
        let run = SpmCsv::parse_str("time,speed,distance,cumdist\n0,10,2.8\n").expect("parse");
        assert_eq!(run.columns.cumulative_at(0), &RawValue::Empty);
        assert_eq!(run.columns.distance_at(0), &RawValue::Number(2.8));
    }

    #[test]
    fn test_missing_speed_column() {
        assert!(matches!(
            SpmCsv::parse_str("time,velocity\n0,1\n"),
            Err(SpmLoadError::MissingColumn("speed"))
        ));
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(SpmCsv::parse_str(""), Err(SpmLoadError::Empty)));
    }
}
