//! Telemetry sample types: raw cells as delivered, and validated points

use serde::{Deserialize, Serialize};

// ============================================================================
// Raw Input
// ============================================================================

/// One raw telemetry cell as delivered by the data source.
///
/// SPM exports mix numbers, clock strings and blanks in the same column, so
/// nothing is coerced until the preprocessor runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

static EMPTY_CELL: RawValue = RawValue::Empty;

impl RawValue {
    /// Finite numeric value of the cell, if any.
    ///
    /// Text is trimmed and parsed as a decimal; blanks, NaN and infinities
    /// are `None`.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Self::Number(v) => *v,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Empty => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Numeric value with anything unusable read as 0.0.
    pub fn as_number_or_zero(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// The cell's text, when it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Parallel raw columns for one run.
///
/// The speed column defines the run length; any other column that is shorter
/// reads as `Empty` past its end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawColumns {
    pub time: Vec<RawValue>,
    pub speed: Vec<RawValue>,
    #[serde(default)]
    pub distance: Option<Vec<RawValue>>,
    #[serde(default)]
    pub cumulative_distance: Option<Vec<RawValue>>,
}

impl RawColumns {
    pub fn new(time: Vec<RawValue>, speed: Vec<RawValue>) -> Self {
        Self {
            time,
            speed,
            distance: None,
            cumulative_distance: None,
        }
    }

    /// Attach the incremental and cumulative distance columns.
    #[must_use]
    pub fn with_distances(mut self, distance: Vec<RawValue>, cumulative: Vec<RawValue>) -> Self {
        self.distance = Some(distance);
        self.cumulative_distance = Some(cumulative);
        self
    }

    /// Build from already-numeric columns.
    pub fn from_numeric(time: &[f64], speed: &[f64], distance: &[f64], cumulative: &[f64]) -> Self {
        let cells = |values: &[f64]| values.iter().copied().map(RawValue::Number).collect();
        Self::new(cells(time), cells(speed)).with_distances(cells(distance), cells(cumulative))
    }

    pub fn len(&self) -> usize {
        self.speed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speed.is_empty()
    }

    pub fn time_at(&self, index: usize) -> &RawValue {
        self.time.get(index).unwrap_or(&EMPTY_CELL)
    }

    pub fn speed_at(&self, index: usize) -> &RawValue {
        self.speed.get(index).unwrap_or(&EMPTY_CELL)
    }

    pub fn distance_at(&self, index: usize) -> &RawValue {
        Self::cell(self.distance.as_ref(), index)
    }

    pub fn cumulative_at(&self, index: usize) -> &RawValue {
        Self::cell(self.cumulative_distance.as_ref(), index)
    }

    fn cell(column: Option<&Vec<RawValue>>, index: usize) -> &RawValue {
        column.and_then(|c| c.get(index)).unwrap_or(&EMPTY_CELL)
    }
}

// ============================================================================
// Validated Samples
// ============================================================================

/// One validated telemetry sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Seconds relative to the start of the run
    pub time_offset_s: f64,
    /// Speed (km/h), never negative
    pub speed_kmh: f64,
    /// Distance covered since the previous sample (m)
    pub incremental_distance_m: f64,
    /// Distance since the start of the run (m)
    pub cumulative_distance_m: f64,
    /// Row of this sample in the raw columns
    pub original_index: usize,
}

/// How the time column was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeBase {
    /// Millisecond epoch timestamps, rebased to whole seconds
    EpochMillis,
    /// Values already in seconds from the start of the run
    #[default]
    RelativeSeconds,
}

/// Why a raw sample was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    InvalidTime,
    InvalidSpeed,
    NegativeSpeed,
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTime => write!(f, "invalid time"),
            Self::InvalidSpeed => write!(f, "invalid speed"),
            Self::NegativeSpeed => write!(f, "negative speed"),
        }
    }
}

/// Bounded tally of dropped samples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionTally {
    pub total: usize,
    pub invalid_time: usize,
    pub invalid_speed: usize,
    pub negative_speed: usize,
    /// First dropped original indices, up to the configured limit
    pub first_indices: Vec<usize>,
}

impl RejectionTally {
    pub fn record(&mut self, original_index: usize, reason: RejectionReason, limit: usize) {
        self.total += 1;
        match reason {
            RejectionReason::InvalidTime => self.invalid_time += 1,
            RejectionReason::InvalidSpeed => self.invalid_speed += 1,
            RejectionReason::NegativeSpeed => self.negative_speed += 1,
        }
        if self.first_indices.len() < limit {
            self.first_indices.push(original_index);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Ordered subsequence of valid samples from one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanedSeries {
    pub points: Vec<SamplePoint>,
    pub rejected: RejectionTally,
    pub time_base: TimeBase,
}

impl CleanedSeries {
    /// Wrap already-validated points.
    pub fn from_points(points: Vec<SamplePoint>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn speeds(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.speed_kmh).collect()
    }

    /// Raw row index for each cleaned position.
    pub fn index_map(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.original_index).collect()
    }
}
