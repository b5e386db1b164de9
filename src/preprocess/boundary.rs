//! Truncation boundary for brake feel test scanning
//!
//! Brake feel tests are performed after departure and before the first real
//! stop. The first standstill far enough from the start ends the window.

use crate::config::BoundaryConfig;
use crate::types::RawColumns;

pub struct HaltBoundaryFinder {
    min_halt_distance_m: f64,
}

impl HaltBoundaryFinder {
    pub fn new(config: &BoundaryConfig) -> Self {
        Self {
            min_halt_distance_m: config.min_halt_distance_m,
        }
    }

    /// Exclusive end of the scan window over the raw rows.
    ///
    /// A standstill row (speed 0, incremental distance 0) ends the window
    /// when its cumulative distance is at least the minimum and differs from
    /// the last standstill seen. Standstills that do not qualify become the
    /// new reference. Unreadable cells count as 0. Returns the full length
    /// when no standstill qualifies.
    #[allow(clippy::float_cmp)]
    pub fn find(&self, raw: &RawColumns) -> usize {
        let mut last_halt_distance = 0.0;

        for index in 0..raw.len() {
            let speed = raw.speed_at(index).as_number_or_zero();
            let distance = raw.distance_at(index).as_number_or_zero();
            if speed != 0.0 || distance != 0.0 {
                continue;
            }

            let cumulative = raw.cumulative_at(index).as_number_or_zero();
            if cumulative >= self.min_halt_distance_m && cumulative != last_halt_distance {
                return index + 1;
            }
            last_halt_distance = cumulative;
        }

        raw.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawValue;

    fn finder() -> HaltBoundaryFinder {
        HaltBoundaryFinder::new(&BoundaryConfig::default())
    }

    fn columns(speed: &[f64], distance: &[f64], cumulative: &[f64]) -> RawColumns {
        let time: Vec<f64> = (0..speed.len()).map(|i| i as f64).collect();
        RawColumns::from_numeric(&time, speed, distance, cumulative)
    }

    #[test]
    fn test_initial_standstill_is_skipped() {
        let raw = columns(
            &[0.0, 0.0, 20.0, 40.0, 0.0, 0.0],
            &[0.0, 0.0, 5.0, 11.0, 0.0, 0.0],
            &[0.0, 0.0, 450.0, 900.0, 900.0, 900.0],
        );
        assert_eq!(finder().find(&raw), 5);
    }

    #[test]
    fn test_no_qualifying_halt_returns_full_length() {
        let raw = columns(&[0.0, 30.0, 0.0], &[0.0, 8.0, 0.0], &[0.0, 300.0, 300.0]);
        assert_eq!(finder().find(&raw), 3);
    }

    #[test]
    fn test_standstill_at_start_beyond_minimum_qualifies() {
        let raw = columns(&[0.0, 0.0], &[0.0, 0.0], &[800.0, 800.0]);
        assert_eq!(finder().find(&raw), 1);
    }

    #[test]
    fn test_short_stop_before_minimum_is_ignored() {
        let raw = columns(
            &[30.0, 0.0, 0.0, 25.0, 50.0, 0.0, 0.0],
            &[8.0, 0.0, 0.0, 7.0, 14.0, 0.0, 0.0],
            &[300.0, 300.0, 300.0, 500.0, 1200.0, 1200.0, 1200.0],
        );
        assert_eq!(finder().find(&raw), 6);
    }

    #[test]
    fn test_moving_sample_with_zero_speed_but_distance_is_not_a_halt() {
        let raw = columns(
            &[0.0, 40.0, 0.0, 0.0],
            &[3.0, 11.0, 0.0, 0.0],
            &[900.0, 911.0, 911.0, 911.0],
        );
        assert_eq!(finder().find(&raw), 3);
    }

    #[test]
    fn test_missing_distance_columns_never_truncate() {
        let raw = RawColumns::new(
            vec![RawValue::Number(0.0), RawValue::Number(1.0)],
            vec![RawValue::Number(0.0), RawValue::Number(0.0)],
        );
        assert_eq!(finder().find(&raw), 2);
    }

    #[test]
    fn test_unreadable_cells_count_as_zero() {
        let raw = RawColumns::new(
            vec![RawValue::Number(0.0), RawValue::Number(1.0)],
            vec![RawValue::from("--"), RawValue::Empty],
        )
        .with_distances(
            vec![RawValue::Empty, RawValue::Empty],
            vec![RawValue::Number(750.0), RawValue::Number(750.0)],
        );
        assert_eq!(finder().find(&raw), 1);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(finder().find(&RawColumns::default()), 0);
    }
}
