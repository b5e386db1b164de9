//! Acceleration, braking and recovery searches
//!
//! Each search walks forward from a start position over a bounded window and
//! returns `PhaseSearch::Found` or `PhaseSearch::NotFound` with the reason.
//! The segmenter decides where to go next.

use crate::config::{AccelerationThresholds, BrakingThresholds, RecoveryThresholds};
use crate::types::{AccelerationPhase, BrakingPhase, RecoveryKind, RecoveryPhase};
use serde::{Deserialize, Serialize};

/// Outcome of one phase search.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseSearch<T> {
    Found(T),
    NotFound(PhaseMiss),
}

impl<T> PhaseSearch<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(phase) => Some(phase),
            Self::NotFound(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Why a search came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PhaseMiss {
    /// The start position is past the end of the series
    OutOfRange,
    /// Peak minus start speed stayed below the minimum gain
    InsufficientGain { gain_kmh: f64 },
    /// The acceleration peaked below the minimum test speed
    BelowTestSpeed { peak_kmh: f64 },
    /// Speed never fell far enough to arm the braking phase
    NotArmed { drop_kmh: f64 },
    /// Armed, but the drop to the lowest speed stayed below the minimum
    InsufficientDrop { drop_kmh: f64 },
    /// Speed neither settled nor climbed clear of the braking low
    NoRecovery,
}

impl std::fmt::Display for PhaseMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "start beyond series end"),
            Self::InsufficientGain { gain_kmh } => write!(f, "gain {gain_kmh:.1} km/h below minimum"),
            Self::BelowTestSpeed { peak_kmh } => write!(f, "peak {peak_kmh:.1} km/h below test speed"),
            Self::NotArmed { drop_kmh } => write!(f, "drop {drop_kmh:.1} km/h never armed braking"),
            Self::InsufficientDrop { drop_kmh } => write!(f, "drop {drop_kmh:.1} km/h below minimum"),
            Self::NoRecovery => write!(f, "no maintain or re-acceleration"),
        }
    }
}

// ============================================================================
// Acceleration
// ============================================================================

/// Find a rise of at least `min_gain_kmh` starting at `start`.
///
/// Adjacent changes within the plateau tolerance only extend the plateau
/// run. A clear rise resets the run and may raise the peak. A clear fall
/// ends the phase once the gain is already met, otherwise it resets the run.
/// The phase also ends when the plateau run exceeds its limit or the window
/// is used up. The phase ends at the peak.
pub fn find_acceleration(
    speeds: &[f64],
    start: usize,
    t: &AccelerationThresholds,
) -> PhaseSearch<AccelerationPhase> {
    let Some(&start_speed) = speeds.get(start) else {
        return PhaseSearch::NotFound(PhaseMiss::OutOfRange);
    };

    let mut max_speed = start_speed;
    let mut max_index = start;
    let mut plateau = 0usize;
    let mut current = start;

    while current + 1 < speeds.len() && current - start < t.window_samples {
        let (here, next) = (speeds[current], speeds[current + 1]);

        if (next - here).abs() <= t.plateau_tolerance_kmh {
            plateau += 1;
        } else if next > here {
            plateau = 0;
            if next > max_speed {
                max_speed = next;
                max_index = current + 1;
            }
        } else if max_speed - start_speed >= t.min_gain_kmh {
            break;
        } else {
            plateau = 0;
        }

        if plateau > t.max_plateau_samples {
            break;
        }
        current += 1;
    }

    let gain = max_speed - start_speed;
    if gain >= t.min_gain_kmh {
        PhaseSearch::Found(AccelerationPhase {
            start_index: start,
            start_speed,
            end_index: max_index,
            end_speed: max_speed,
            total_increase: gain,
        })
    } else {
        PhaseSearch::NotFound(PhaseMiss::InsufficientGain { gain_kmh: gain })
    }
}

// ============================================================================
// Braking
// ============================================================================

/// Find a drop of at least `min_speed_drop_kmh` starting at `start`.
///
/// The lowest speed only moves on falls beyond the plateau tolerance. The
/// phase arms once the drop from the start reaches `arming_drop_kmh`. Once
/// armed it ends on a clear rebound (when the minimum drop is already met),
/// on a plateau run past its limit, or at the window end.
pub fn find_braking(
    speeds: &[f64],
    start: usize,
    t: &BrakingThresholds,
) -> PhaseSearch<BrakingPhase> {
    let Some(&start_speed) = speeds.get(start) else {
        return PhaseSearch::NotFound(PhaseMiss::OutOfRange);
    };

    let mut lowest_speed = start_speed;
    let mut lowest_index = start;
    let mut plateau = 0usize;
    let mut armed = false;
    let mut current = start;

    while current + 1 < speeds.len() && current - start < t.window_samples {
        let (here, next) = (speeds[current], speeds[current + 1]);

        if (next - here).abs() <= t.plateau_tolerance_kmh {
            plateau += 1;
        } else if next < here {
            plateau = 0;
            if next < lowest_speed {
                lowest_speed = next;
                lowest_index = current + 1;
            }
            if start_speed - next >= t.arming_drop_kmh {
                armed = true;
            }
        } else if armed && start_speed - lowest_speed >= t.min_speed_drop_kmh {
            break;
        } else {
            plateau = 0;
        }

        if armed && plateau > t.max_plateau_samples {
            break;
        }
        current += 1;
    }

    let drop = start_speed - lowest_speed;
    if !armed {
        PhaseSearch::NotFound(PhaseMiss::NotArmed { drop_kmh: drop })
    } else if drop < t.min_speed_drop_kmh {
        PhaseSearch::NotFound(PhaseMiss::InsufficientDrop { drop_kmh: drop })
    } else {
        PhaseSearch::Found(BrakingPhase {
            start_index: start,
            start_speed,
            end_index: lowest_index,
            end_speed: lowest_speed,
            speed_drop: drop,
        })
    }
}

// ============================================================================
// Recovery
// ============================================================================

/// Find how speed recovered after braking bottomed out at `baseline`.
///
/// Speeds inside the maintain band count up; reaching the required count is
/// a `Maintain`. Any speed clear of the accelerate margin is an immediate
/// `Accelerate`. Speeds in the wider noise band count down by one instead of
/// resetting; anything further out resets the count. If the window runs out
/// and the highest speed seen cleared the margin, that is an `Accelerate`
/// ending on the last inspected sample.
pub fn find_recovery(
    speeds: &[f64],
    start: usize,
    baseline: f64,
    t: &RecoveryThresholds,
) -> PhaseSearch<RecoveryPhase> {
    if start >= speeds.len() {
        return PhaseSearch::NotFound(PhaseMiss::OutOfRange);
    }

    let recovered = |end_index: usize, end_speed: f64, kind: RecoveryKind| {
        PhaseSearch::Found(RecoveryPhase {
            start_index: start,
            end_index,
            end_speed,
            kind,
        })
    };

    let mut maintain = 0usize;
    let mut max_seen = baseline;
    let mut current = start;

    while current + 1 < speeds.len() && current - start < t.window_samples {
        let speed = speeds[current];
        max_seen = max_seen.max(speed);
        let deviation = (speed - baseline).abs();

        if deviation <= t.maintain_band_kmh {
            maintain += 1;
            if maintain >= t.maintain_samples {
                return recovered(current, speed, RecoveryKind::Maintain);
            }
        } else if speed > baseline + t.accelerate_margin_kmh {
            return recovered(current, speed, RecoveryKind::Accelerate);
        } else if deviation <= t.noise_band_kmh {
            maintain = maintain.saturating_sub(1);
        } else {
            maintain = 0;
        }
        current += 1;
    }

    if max_seen > baseline + t.accelerate_margin_kmh {
        recovered(current.saturating_sub(1).max(start), max_seen, RecoveryKind::Accelerate)
    } else {
        PhaseSearch::NotFound(PhaseMiss::NoRecovery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accel() -> AccelerationThresholds {
        AccelerationThresholds::default()
    }

    fn braking() -> BrakingThresholds {
        BrakingThresholds::default()
    }

    fn recovery() -> RecoveryThresholds {
        RecoveryThresholds::default()
    }

    #[test]
    fn test_acceleration_found_at_peak() {
        let speeds = [10.0, 14.0, 18.0, 22.0, 26.0, 30.0, 30.0, 29.0, 20.0];
        let phase = find_acceleration(&speeds, 0, &accel()).found().expect("acceleration");
        assert_eq!(phase.end_index, 5);
        assert_eq!(phase.end_speed, 30.0);
        assert_eq!(phase.total_increase, 20.0);
    }

    #[test]
    fn test_acceleration_slow_ramp_is_plateau() {
        // 2 km/h per sample never exceeds the tolerance
        let speeds: Vec<f64> = (0..30).map(|i| f64::from(i) * 2.0).collect();
        let result = find_acceleration(&speeds, 0, &accel());
        assert!(matches!(
            result,
            PhaseSearch::NotFound(PhaseMiss::InsufficientGain { .. })
        ));
    }

    #[test]
    fn test_acceleration_lost_before_qualifying() {
        let speeds = [0.0, 5.0, 10.0, 5.0, 0.0, 5.0, 10.0, 5.0, 0.0];
        let result = find_acceleration(&speeds, 0, &accel());
        assert_eq!(
            result,
            PhaseSearch::NotFound(PhaseMiss::InsufficientGain { gain_kmh: 10.0 })
        );
    }

    #[test]
    fn test_acceleration_ends_after_long_plateau() {
        let mut speeds = vec![0.0, 5.0, 10.0, 15.0, 20.0];
        speeds.extend(std::iter::repeat(20.0).take(12));
        speeds.push(40.0);
        let phase = find_acceleration(&speeds, 0, &accel()).found().expect("acceleration");
        // The rise to 40 comes after the plateau run already ended the phase
        assert_eq!(phase.end_speed, 20.0);
        assert_eq!(phase.end_index, 4);
    }

    #[test]
    fn test_acceleration_out_of_range() {
        assert_eq!(
            find_acceleration(&[1.0], 3, &accel()),
            PhaseSearch::NotFound(PhaseMiss::OutOfRange)
        );
    }

    #[test]
    fn test_braking_found_at_lowest() {
        let speeds = [40.0, 36.0, 32.0, 28.0, 24.0, 21.0, 20.0, 20.0, 26.0];
        let phase = find_braking(&speeds, 0, &braking()).found().expect("braking");
        assert_eq!(phase.end_index, 5);
        assert_eq!(phase.end_speed, 21.0);
        assert_eq!(phase.speed_drop, 19.0);
    }

    #[test]
    fn test_braking_small_dip_not_armed() {
        let speeds = [40.0, 37.0, 34.0, 37.0, 40.0, 40.0];
        assert!(matches!(
            find_braking(&speeds, 0, &braking()),
            PhaseSearch::NotFound(PhaseMiss::NotArmed { .. })
        ));
    }

    #[test]
    fn test_braking_armed_but_short_of_minimum_drop() {
        let speeds = [40.0, 36.0, 32.0, 28.0, 28.0, 28.0];
        assert_eq!(
            find_braking(&speeds, 0, &braking()),
            PhaseSearch::NotFound(PhaseMiss::InsufficientDrop { drop_kmh: 12.0 })
        );
    }

    #[test]
    fn test_braking_rebound_before_minimum_keeps_searching() {
        // Armed at 28 but the rebound comes before the drop reaches 15,
        // so the search continues and finds the later low.
        let speeds = [40.0, 34.0, 28.0, 32.0, 27.0, 22.0, 22.0];
        let phase = find_braking(&speeds, 0, &braking()).found().expect("braking");
        assert_eq!(phase.end_speed, 22.0);
        assert_eq!(phase.end_index, 5);
    }

    #[test]
    fn test_recovery_maintain() {
        let speeds = [5.0, 6.0, 5.0, 4.0, 5.0, 6.0, 5.0];
        let phase = find_recovery(&speeds, 0, 5.0, &recovery()).found().expect("recovery");
        assert_eq!(phase.kind, RecoveryKind::Maintain);
        assert_eq!(phase.end_index, 4);
        assert_eq!(phase.end_speed, 5.0);
    }

    #[test]
    fn test_recovery_accelerate() {
        let speeds = [20.0, 21.0, 23.0, 26.0, 30.0];
        let phase = find_recovery(&speeds, 0, 20.0, &recovery()).found().expect("recovery");
        assert_eq!(phase.kind, RecoveryKind::Accelerate);
        assert_eq!(phase.end_index, 3);
        assert_eq!(phase.end_speed, 26.0);
    }

    #[test]
    fn test_recovery_noise_band_decrements() {
        // Three in-band samples, one noisy one (count 3 -> 2), then three
        // more in-band samples complete the count of 5 at index 6.
        let speeds = [20.0, 20.0, 20.0, 15.0, 20.0, 20.0, 20.0, 20.0];
        let phase = find_recovery(&speeds, 0, 20.0, &recovery()).found().expect("recovery");
        assert_eq!(phase.kind, RecoveryKind::Maintain);
        assert_eq!(phase.end_index, 6);
    }

    #[test]
    fn test_recovery_far_deviation_resets() {
        // A sample 10 km/h under the baseline wipes the count
        let speeds = [20.0, 20.0, 20.0, 20.0, 10.0, 20.0, 20.0, 20.0, 20.0, 20.0, 20.0];
        let phase = find_recovery(&speeds, 0, 20.0, &recovery()).found().expect("recovery");
        assert_eq!(phase.end_index, 9);
    }

    #[test]
    fn test_recovery_window_fallback_to_accelerate() {
        // With the margin inside the maintain band a rise is counted as
        // maintain, and the window maximum decides at the end.
        let t = RecoveryThresholds {
            window_samples: 3,
            maintain_band_kmh: 3.0,
            noise_band_kmh: 6.0,
            accelerate_margin_kmh: 1.0,
            maintain_samples: 5,
        };
        let speeds = [20.0, 22.0, 21.0, 20.0, 20.0];
        let phase = find_recovery(&speeds, 0, 20.0, &t).found().expect("recovery");
        assert_eq!(phase.kind, RecoveryKind::Accelerate);
        assert_eq!(phase.end_index, 2);
        assert_eq!(phase.end_speed, 22.0);
    }

    #[test]
    fn test_recovery_none() {
        let speeds = [20.0, 10.0, 10.0, 10.0, 10.0];
        assert_eq!(
            find_recovery(&speeds, 0, 20.0, &recovery()),
            PhaseSearch::NotFound(PhaseMiss::NoRecovery)
        );
    }
}
