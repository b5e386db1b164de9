//! Retardation arithmetic for a located braking interval

use crate::config::defaults::KMH_TO_MS;
use crate::types::{EmergencyBrakingResult, RetardationEstimate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum RetardationError {
    #[error("deceleration duration must be positive, got {0} s")]
    NonPositiveDuration(f64),

    #[error("deceleration distance must be positive, got {0} m")]
    NonPositiveDistance(f64),

    #[error("initial speed must be finite and non-negative, got {0} km/h")]
    InvalidInitialSpeed(f64),
}

pub struct RetardationCalculator;

impl RetardationCalculator {
    /// Average and kinematic retardation for a located interval.
    pub fn calculate(result: &EmergencyBrakingResult) -> Result<RetardationEstimate, RetardationError> {
        Self::from_parts(
            result.initial_speed_kmh,
            result.deceleration_duration_s,
            result.deceleration_distance_m,
        )
    }

    /// `avg = u / t` and `kinematic = u² / 2s`, with `u` in m/s.
    pub fn from_parts(
        initial_speed_kmh: f64,
        duration_s: f64,
        distance_m: f64,
    ) -> Result<RetardationEstimate, RetardationError> {
        if !initial_speed_kmh.is_finite() || initial_speed_kmh < 0.0 {
            return Err(RetardationError::InvalidInitialSpeed(initial_speed_kmh));
        }
        if !duration_s.is_finite() || duration_s <= 0.0 {
            return Err(RetardationError::NonPositiveDuration(duration_s));
        }
        if !distance_m.is_finite() || distance_m <= 0.0 {
            return Err(RetardationError::NonPositiveDistance(distance_m));
        }

        let initial_speed_ms = initial_speed_kmh * KMH_TO_MS;
        Ok(RetardationEstimate {
            initial_speed_ms,
            avg_retardation_ms2: initial_speed_ms / duration_s,
            kinematic_retardation_ms2: initial_speed_ms.powi(2) / (2.0 * distance_m),
        })
    }
}
