//! Series preprocessing
//!
//! Turns raw SPM columns into a `CleanedSeries`:
//! - time normalized to seconds from the start of the run
//! - rows with an unreadable time or speed, or a negative speed, dropped
//! - every kept sample tagged with its raw row index
//!
//! Dropped rows are never repaired and never fatal.

mod boundary;
mod time;

pub use boundary::HaltBoundaryFinder;
pub use time::normalize_times;
pub(crate) use time::round_half_up;

use crate::config::PreprocessConfig;
use crate::observer::{DetectionObserver, NoopObserver};
use crate::types::{CleanedSeries, RawColumns, RejectionReason, RejectionTally, SamplePoint};

pub struct SeriesPreprocessor {
    epoch_millis_threshold: f64,
    rejection_sample_limit: usize,
}

impl SeriesPreprocessor {
    pub fn new(config: &PreprocessConfig) -> Self {
        Self {
            epoch_millis_threshold: config.epoch_millis_threshold,
            rejection_sample_limit: config.rejection_sample_limit,
        }
    }

    /// Clean every raw row.
    pub fn clean(&self, raw: &RawColumns) -> CleanedSeries {
        self.preprocess(raw, raw.len(), &mut NoopObserver)
    }

    /// Clean raw rows `[0, end)`.
    ///
    /// Epoch detection and the clock base come from the first rows, so the
    /// cut never changes the times of the rows that are kept.
    pub fn preprocess(
        &self,
        raw: &RawColumns,
        end: usize,
        observer: &mut dyn DetectionObserver,
    ) -> CleanedSeries {
        let end = end.min(raw.len());
        let time_cells = &raw.time[..end.min(raw.time.len())];
        let (times, time_base) = normalize_times(time_cells, self.epoch_millis_threshold);

        let mut points = Vec::with_capacity(end);
        let mut rejected = RejectionTally::default();

        for index in 0..end {
            let time = times.get(index).copied().flatten();
            match Self::validate(time, raw.speed_at(index).as_number()) {
                Ok((time_offset_s, speed_kmh)) => points.push(SamplePoint {
                    time_offset_s,
                    speed_kmh,
                    incremental_distance_m: raw.distance_at(index).as_number_or_zero(),
                    cumulative_distance_m: raw.cumulative_at(index).as_number_or_zero(),
                    original_index: index,
                }),
                Err(reason) => {
                    rejected.record(index, reason, self.rejection_sample_limit);
                    observer.on_sample_rejected(index, reason);
                }
            }
        }

        CleanedSeries {
            points,
            rejected,
            time_base,
        }
    }

    fn validate(time: Option<f64>, speed: Option<f64>) -> Result<(f64, f64), RejectionReason> {
        let speed = speed.ok_or(RejectionReason::InvalidSpeed)?;
        let time = time.ok_or(RejectionReason::InvalidTime)?;
        if speed < 0.0 {
            return Err(RejectionReason::NegativeSpeed);
        }
        Ok((time, speed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawValue, TimeBase};

    fn preprocessor() -> SeriesPreprocessor {
        SeriesPreprocessor::new(&PreprocessConfig::default())
    }

    #[test]
    fn test_invalid_rows_are_dropped_with_index_preserved() {
        let raw = RawColumns::new(
            vec![0.0.into(), 1.0.into(), 2.0.into(), RawValue::Empty, 4.0.into()],
            vec![10.0.into(), (-1.0).into(), RawValue::from("x"), 12.0.into(), 14.0.into()],
        );
        let series = preprocessor().clean(&raw);

        assert_eq!(series.index_map(), vec![0, 4]);
        assert_eq!(series.speeds(), vec![10.0, 14.0]);
        assert_eq!(series.rejected.total, 3);
        assert_eq!(series.rejected.negative_speed, 1);
        assert_eq!(series.rejected.invalid_speed, 1);
        assert_eq!(series.rejected.invalid_time, 1);
        assert_eq!(series.rejected.first_indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_distances_read_as_zero() {
        let raw = RawColumns::new(vec![0.0.into()], vec![5.0.into()]);
        let series = preprocessor().clean(&raw);
        assert_eq!(series.points[0].incremental_distance_m, 0.0);
        assert_eq!(series.points[0].cumulative_distance_m, 0.0);
    }

    #[test]
    fn test_truncation_end_is_exclusive() {
        let time: Vec<f64> = (0..10).map(f64::from).collect();
        let speed = vec![30.0; 10];
        let raw = RawColumns::from_numeric(&time, &speed, &[0.0; 10], &[0.0; 10]);
        let series = preprocessor().preprocess(&raw, 4, &mut NoopObserver);
        assert_eq!(series.len(), 4);
        assert_eq!(series.points[3].original_index, 3);
    }

    #[test]
    fn test_epoch_series_is_rebased() {
        let raw = RawColumns::new(
            vec![1_690_000_000_000.0.into(), 1_690_000_001_000.0.into()],
            vec![0.0.into(), 3.0.into()],
        );
        let series = preprocessor().clean(&raw);
        assert_eq!(series.time_base, TimeBase::EpochMillis);
        assert_eq!(series.points[1].time_offset_s, 1.0);
    }

    #[test]
    fn test_empty_and_all_invalid_input() {
        assert!(preprocessor().clean(&RawColumns::default()).is_empty());

        let raw = RawColumns::new(vec![RawValue::Empty; 3], vec![RawValue::Empty; 3]);
        let series = preprocessor().clean(&raw);
        assert!(series.is_empty());
        assert_eq!(series.rejected.total, 3);
    }
}
