//! Halt inputs and emergency braking outputs

use super::SamplePoint;
use serde::{Deserialize, Serialize};

/// A scheduled or observed stop, identified by its cumulative distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Halt {
    pub cumulative_distance_m: f64,
    #[serde(default)]
    pub station: Option<String>,
    #[serde(default)]
    pub inter_station_distance_m: Option<f64>,
}

impl Halt {
    /// A halt known only by where it happened.
    pub fn at(cumulative_distance_m: f64) -> Self {
        Self {
            cumulative_distance_m,
            station: None,
            inter_station_distance_m: None,
        }
    }

    #[must_use]
    pub fn with_station(mut self, station: impl Into<String>) -> Self {
        self.station = Some(station.into());
        self
    }
}

/// Braking interval located before a halt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyBrakingResult {
    pub halt_distance_m: f64,
    /// Last sample of the held speed before deceleration
    pub retardation_start: SamplePoint,
    /// First standstill sample at the halt
    pub halt_point: SamplePoint,
    /// Cleaned-series position of `retardation_start`
    pub retardation_start_index: usize,
    /// Cleaned-series position of `halt_point`
    pub halt_index: usize,
    pub deceleration_distance_m: f64,
    /// Raw rows from onset to halt, one row per second
    pub deceleration_duration_s: f64,
    pub initial_speed_kmh: f64,
    pub max_speed_before_decel_kmh: f64,
}

/// Deceleration rates for one braking interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetardationEstimate {
    pub initial_speed_ms: f64,
    /// Initial speed over duration (m/s²)
    pub avg_retardation_ms2: f64,
    /// v² / 2s over the braking distance (m/s²)
    pub kinematic_retardation_ms2: f64,
}
