//! Brake feel report aggregation

use crate::config::defaults::REPORT_DECIMALS;
use crate::config::ReportThresholds;
use crate::preprocess::round_half_up;
use crate::types::{BrakeFeelReport, BrakeFeelTest, Recommendation, ReportSummary};

pub struct ReportAggregator {
    low_speed_drop_kmh: f64,
    low_max_speed_kmh: f64,
}

impl ReportAggregator {
    pub fn new(config: &ReportThresholds) -> Self {
        Self {
            low_speed_drop_kmh: config.low_speed_drop_kmh,
            low_max_speed_kmh: config.low_max_speed_kmh,
        }
    }

    /// Summarise `tests` found in a series of `data_points` samples.
    pub fn aggregate(&self, tests: Vec<BrakeFeelTest>, data_points: usize) -> BrakeFeelReport {
        if tests.is_empty() {
            return BrakeFeelReport {
                summary: ReportSummary {
                    data_points,
                    ..ReportSummary::default()
                },
                tests,
                recommendations: vec![Recommendation::NoTestsDetected],
            };
        }

        let count = tests.len() as f64;
        let mean = |f: fn(&BrakeFeelTest) -> f64| {
            round_to_report(tests.iter().map(f).sum::<f64>() / count)
        };
        let summary = ReportSummary {
            total_tests: tests.len(),
            data_points,
            average_speed_drop: mean(|t| t.speed_drop),
            average_max_speed: mean(|t| t.max_speed),
            average_test_duration: mean(|t| t.total_duration_s),
        };

        // Rules see the same rounded averages the report shows
        let mut recommendations = Vec::new();
        if summary.average_speed_drop < self.low_speed_drop_kmh {
            recommendations.push(Recommendation::IncreaseSpeedDrop);
        }
        if summary.average_max_speed < self.low_max_speed_kmh {
            recommendations.push(Recommendation::TestAtHigherSpeed);
        }
        if tests.len() == 1 {
            recommendations.push(Recommendation::ConductMultipleTests);
        }

        BrakeFeelReport {
            summary,
            tests,
            recommendations,
        }
    }
}

fn round_to_report(value: f64) -> f64 {
    let scale = 10f64.powi(REPORT_DECIMALS);
    round_half_up(value * scale) / scale
}
