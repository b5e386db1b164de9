//! End-to-end analysis flows
//!
//! Brake feel tests:
//!   raw columns -> boundary -> preprocess -> segment -> report
//!
//! Emergency braking:
//!   raw columns -> preprocess (full run) -> per halt: locate -> retardation

use crate::braking::{
    detect_halts, EmergencyBrakingLocator, HaltAnalysis, HaltOutcome, RetardationCalculator,
};
use crate::config::DetectionConfig;
use crate::detection::PhaseSegmenter;
use crate::observer::{DetectionObserver, TracingObserver};
use crate::preprocess::{HaltBoundaryFinder, SeriesPreprocessor};
use crate::report::ReportAggregator;
use crate::types::{BrakeFeelReport, CleanedSeries, Halt, RawColumns, SamplePoint};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ============================================================================
// Brake Feel Tests
// ============================================================================

/// Result of one brake feel analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrakeFeelAnalysis {
    /// Exclusive raw-row end of the scanned window
    pub boundary: usize,
    /// The cleaned, truncated series the tests were found in
    pub series: CleanedSeries,
    pub report: BrakeFeelReport,
}

pub struct BrakeFeelAnalyzer {
    config: DetectionConfig,
}

impl BrakeFeelAnalyzer {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Analyze with diagnostics sent to `tracing`.
    pub fn analyze(&self, raw: &RawColumns) -> BrakeFeelAnalysis {
        let mut observer = TracingObserver::new(self.config.preprocess.rejection_sample_limit);
        self.analyze_with_observer(raw, &mut observer)
    }

    pub fn analyze_with_observer(
        &self,
        raw: &RawColumns,
        observer: &mut dyn DetectionObserver,
    ) -> BrakeFeelAnalysis {
        let boundary = HaltBoundaryFinder::new(&self.config.boundary).find(raw);
        observer.on_truncation(boundary, raw.len());

        let series = SeriesPreprocessor::new(&self.config.preprocess).preprocess(raw, boundary, observer);
        if !series.rejected.is_empty() {
            debug!(
                dropped = series.rejected.total,
                invalid_time = series.rejected.invalid_time,
                invalid_speed = series.rejected.invalid_speed,
                negative_speed = series.rejected.negative_speed,
                "Samples dropped during cleaning"
            );
        }

        let tests = PhaseSegmenter::new(&self.config).segment(&series, observer);
        let report = ReportAggregator::new(&self.config.report).aggregate(tests, series.len());

        info!(
            run = %self.config.run.name,
            raw_rows = raw.len(),
            boundary,
            data_points = report.summary.data_points,
            tests = report.summary.total_tests,
            "Brake feel analysis complete"
        );

        BrakeFeelAnalysis {
            boundary,
            series,
            report,
        }
    }
}

// ============================================================================
// Emergency Braking
// ============================================================================

pub struct RetardationAnalyzer {
    preprocessor: SeriesPreprocessor,
    locator: EmergencyBrakingLocator,
}

impl RetardationAnalyzer {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            preprocessor: SeriesPreprocessor::new(&config.preprocess),
            locator: EmergencyBrakingLocator::new(&config.emergency),
        }
    }

    /// Clean the whole run; halts can lie anywhere in it.
    pub fn prepare(&self, raw: &RawColumns) -> CleanedSeries {
        self.preprocessor.clean(raw)
    }

    /// Locate and rate the braking for one halt.
    pub fn analyze_halt(&self, series: &[SamplePoint], halt: &Halt) -> HaltAnalysis {
        let outcome = match self.locator.locate(series, halt) {
            Err(miss) => {
                warn!(halt_m = halt.cumulative_distance_m, reason = %miss, "Emergency braking onset not found");
                HaltOutcome::Unresolved { miss }
            }
            Ok(braking) => match RetardationCalculator::calculate(&braking) {
                Ok(retardation) => {
                    debug!(
                        halt_m = halt.cumulative_distance_m,
                        onset_m = braking.retardation_start.cumulative_distance_m,
                        initial_kmh = braking.initial_speed_kmh,
                        avg_ms2 = retardation.avg_retardation_ms2,
                        kinematic_ms2 = retardation.kinematic_retardation_ms2,
                        "Retardation computed"
                    );
                    HaltOutcome::Resolved { braking, retardation }
                }
                Err(error) => {
                    warn!(halt_m = halt.cumulative_distance_m, error = %error, "Retardation computation failed");
                    HaltOutcome::ComputationFailed { braking, error }
                }
            },
        };

        HaltAnalysis {
            halt: halt.clone(),
            outcome,
        }
    }

    /// One analysis per halt, in input order. A failing halt never stops
    /// the batch.
    pub fn analyze_halts(&self, series: &[SamplePoint], halts: &[Halt]) -> Vec<HaltAnalysis> {
        halts.iter().map(|halt| self.analyze_halt(series, halt)).collect()
    }

    /// Clean `raw` and analyze `halts`, or every observed standstill when
    /// `halts` is `None`.
    pub fn analyze_run(&self, raw: &RawColumns, halts: Option<&[Halt]>) -> Vec<HaltAnalysis> {
        let series = self.prepare(raw);
        let detected;
        let halts = match halts {
            Some(h) => h,
            None => {
                detected = detect_halts(&series.points);
                info!(halts = detected.len(), "Halts derived from standstill samples");
                &detected
            }
        };
        self.analyze_halts(&series.points, halts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_run_produces_empty_report() {
        let analysis = BrakeFeelAnalyzer::new(DetectionConfig::default()).analyze(&RawColumns::default());
        assert_eq!(analysis.boundary, 0);
        assert!(analysis.series.is_empty());
        assert_eq!(analysis.report.summary.total_tests, 0);
        assert_eq!(analysis.report.summary.data_points, 0);
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let speeds = [50.0, 50.0, 50.0, 50.0, 30.0, 10.0, 0.0];
        let cumulative = [0.0, 14.0, 28.0, 42.0, 52.0, 57.0, 58.0];
        let time: Vec<f64> = (0..7).map(f64::from).collect();
        let raw = RawColumns::from_numeric(&time, &speeds, &[0.0; 7], &cumulative);

        let analyzer = RetardationAnalyzer::new(&DetectionConfig::default());
        let halts = vec![Halt::at(999.0), Halt::at(58.0)];
        let results = analyzer.analyze_run(&raw, Some(halts.as_slice()));

        assert_eq!(results.len(), 2);
        assert!(matches!(results[0].outcome, HaltOutcome::Unresolved { .. }));
        let braking = results[1].braking().expect("located");
        assert_eq!(braking.retardation_start_index, 3);
        assert_eq!(braking.deceleration_distance_m, 16.0);
        assert!(results[1].retardation().is_some());
    }

    #[test]
    fn test_halts_derived_when_none_given() {
        let speeds = [0.0, 20.0, 20.0, 20.0, 10.0, 0.0];
        let cumulative = [0.0, 5.0, 11.0, 16.0, 19.0, 20.0];
        let time: Vec<f64> = (0..6).map(f64::from).collect();
        let raw = RawColumns::from_numeric(&time, &speeds, &[0.0; 6], &cumulative);

        let results = RetardationAnalyzer::new(&DetectionConfig::default()).analyze_run(&raw, None);
        let distances: Vec<f64> = results.iter().map(|r| r.halt.cumulative_distance_m).collect();
        assert_eq!(distances, vec![0.0, 20.0]);
        // Nothing precedes the departure standstill
        assert!(matches!(results[0].outcome, HaltOutcome::Unresolved { .. }));
        assert!(matches!(results[1].outcome, HaltOutcome::Resolved { .. }));
    }
}
