//! Emergency braking onset location
//!
//! Walks backward from a halt looking for the last stretch of constant speed
//! that is followed by a lower speed: the point where the driver started
//! braking for the stop.

use crate::config::EmergencyBrakingConfig;
use crate::types::{EmergencyBrakingResult, Halt, SamplePoint};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why no braking interval was found for a halt.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum LocatorMiss {
    #[error("no standstill sample at {distance_m} m")]
    HaltNotFound { distance_m: f64 },

    #[error("no held speed followed by a drop within {window_m} m before the halt at {distance_m} m")]
    NoBrakingOnset { distance_m: f64, window_m: f64 },
}

pub struct EmergencyBrakingLocator {
    search_window_m: f64,
    min_maintained_samples: usize,
    halt_match_tolerance_m: f64,
}

impl EmergencyBrakingLocator {
    pub fn new(config: &EmergencyBrakingConfig) -> Self {
        Self {
            search_window_m: config.search_window_m,
            min_maintained_samples: config.min_maintained_samples,
            halt_match_tolerance_m: config.halt_match_tolerance_m,
        }
    }

    /// Locate the braking interval ending at `halt`.
    ///
    /// `series` must be the full run, not the brake-feel window.
    pub fn locate(
        &self,
        series: &[SamplePoint],
        halt: &Halt,
    ) -> Result<EmergencyBrakingResult, LocatorMiss> {
        let halt_distance = halt.cumulative_distance_m;
        let halt_index = series
            .iter()
            .position(|p| self.is_halt_sample(p, halt_distance))
            .ok_or(LocatorMiss::HaltNotFound { distance_m: halt_distance })?;

        let mut max_speed = 0.0_f64;
        let mut onset = None;

        for index in (0..halt_index).rev() {
            let sample = &series[index];
            if halt_distance - sample.cumulative_distance_m > self.search_window_m {
                break;
            }
            max_speed = max_speed.max(sample.speed_kmh);

            let run_end = Self::held_run_end(series, index, halt_index);
            let run_len = run_end - index;
            if run_len > self.min_maintained_samples
                && run_end < halt_index
                && series[run_end].speed_kmh < sample.speed_kmh
            {
                onset = Some(run_end - 1);
                break;
            }
        }

        let onset_index = onset.ok_or(LocatorMiss::NoBrakingOnset {
            distance_m: halt_distance,
            window_m: self.search_window_m,
        })?;
        let retardation_start = series[onset_index];
        let halt_point = series[halt_index];
        // Raw rows are 1 s apart, including rows dropped during cleaning
        let raw_rows = halt_point
            .original_index
            .saturating_sub(retardation_start.original_index);

        Ok(EmergencyBrakingResult {
            halt_distance_m: halt_distance,
            retardation_start,
            halt_point,
            retardation_start_index: onset_index,
            halt_index,
            deceleration_distance_m: halt_distance - retardation_start.cumulative_distance_m,
            deceleration_duration_s: raw_rows as f64,
            initial_speed_kmh: retardation_start.speed_kmh,
            max_speed_before_decel_kmh: max_speed,
        })
    }

    #[allow(clippy::float_cmp)]
    fn is_halt_sample(&self, sample: &SamplePoint, halt_distance: f64) -> bool {
        if sample.speed_kmh != 0.0 {
            return false;
        }
        if self.halt_match_tolerance_m > 0.0 {
            (sample.cumulative_distance_m - halt_distance).abs() <= self.halt_match_tolerance_m
        } else {
            sample.cumulative_distance_m == halt_distance
        }
    }

    /// First position after `start` (bounded by `limit`) whose speed differs
    /// from the speed at `start`.
    #[allow(clippy::float_cmp)]
    fn held_run_end(series: &[SamplePoint], start: usize, limit: usize) -> usize {
        let speed = series[start].speed_kmh;
        series[start..limit]
            .iter()
            .position(|p| p.speed_kmh != speed)
            .map_or(limit, |offset| start + offset)
    }
}
