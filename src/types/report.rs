//! Aggregated brake feel report

use super::BrakeFeelTest;
use serde::{Deserialize, Serialize};

/// Advice attached to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    IncreaseSpeedDrop,
    TestAtHigherSpeed,
    ConductMultipleTests,
    NoTestsDetected,
}

impl Recommendation {
    pub fn message(&self) -> &'static str {
        match self {
            Self::IncreaseSpeedDrop => {
                "Consider increasing speed drop for more effective brake feel testing"
            }
            Self::TestAtHigherSpeed => {
                "Consider conducting brake feel tests at higher speeds for better assessment"
            }
            Self::ConductMultipleTests => {
                "Single brake feel test detected. Consider multiple tests for comprehensive assessment"
            }
            Self::NoTestsDetected => "No brake feel tests detected in the provided data",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_tests: usize,
    /// Samples in the cleaned, truncated series
    pub data_points: usize,
    pub average_speed_drop: f64,
    pub average_max_speed: f64,
    pub average_test_duration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrakeFeelReport {
    pub summary: ReportSummary,
    pub tests: Vec<BrakeFeelTest>,
    pub recommendations: Vec<Recommendation>,
}

impl BrakeFeelReport {
    pub fn recommendation_messages(&self) -> Vec<&'static str> {
        self.recommendations.iter().map(Recommendation::message).collect()
    }
}
