//! Halts observed in a run, and the per-halt analysis record

use super::{LocatorMiss, RetardationError};
use crate::types::{EmergencyBrakingResult, Halt, RetardationEstimate, SamplePoint};
use serde::{Deserialize, Serialize};

/// One halt per distinct cumulative distance at which the train stood still,
/// nearest first.
///
/// For runs that arrive without a schedule-matched halts list.
pub fn detect_halts(series: &[SamplePoint]) -> Vec<Halt> {
    let mut distances: Vec<f64> = series
        .iter()
        .filter(|p| p.speed_kmh == 0.0)
        .map(|p| p.cumulative_distance_m)
        .collect();
    distances.sort_by(f64::total_cmp);
    distances.dedup();
    distances.into_iter().map(Halt::at).collect()
}

/// What happened when a halt was analysed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HaltOutcome {
    Resolved {
        braking: EmergencyBrakingResult,
        retardation: RetardationEstimate,
    },
    Unresolved {
        miss: LocatorMiss,
    },
    ComputationFailed {
        braking: EmergencyBrakingResult,
        error: RetardationError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HaltAnalysis {
    pub halt: Halt,
    pub outcome: HaltOutcome,
}

impl HaltAnalysis {
    pub fn retardation(&self) -> Option<&RetardationEstimate> {
        match &self.outcome {
            HaltOutcome::Resolved { retardation, .. } => Some(retardation),
            _ => None,
        }
    }

    pub fn braking(&self) -> Option<&EmergencyBrakingResult> {
        match &self.outcome {
            HaltOutcome::Resolved { braking, .. } | HaltOutcome::ComputationFailed { braking, .. } => {
                Some(braking)
            }
            HaltOutcome::Unresolved { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(speed_kmh: f64, cumulative_distance_m: f64) -> SamplePoint {
        SamplePoint {
            time_offset_s: 0.0,
            speed_kmh,
            incremental_distance_m: 0.0,
            cumulative_distance_m,
            original_index: 0,
        }
    }

    #[test]
    fn test_detect_halts_distinct_and_sorted() {
        let series = vec![
            point(0.0, 0.0),
            point(0.0, 0.0),
            point(30.0, 400.0),
            point(0.0, 36473.0),
            point(0.0, 36473.0),
            point(12.0, 12000.0),
            point(0.0, 12004.0),
        ];
        let halts: Vec<f64> = detect_halts(&series).iter().map(|h| h.cumulative_distance_m).collect();
        assert_eq!(halts, vec![0.0, 12004.0, 36473.0]);
    }

    #[test]
    fn test_detect_halts_none() {
        assert!(detect_halts(&[point(20.0, 10.0)]).is_empty());
    }
}
