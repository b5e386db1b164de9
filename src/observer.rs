//! Diagnostic callbacks for the detection pipeline
//!
//! The preprocessor and segmenter never log on their own. They report what
//! they see to a `DetectionObserver`; `TracingObserver` turns that into
//! `tracing` events, `NoopObserver` discards it.

use crate::detection::PhaseMiss;
use crate::types::{BrakeFeelTest, Phase, PhaseStage, RejectionReason};
use tracing::{debug, info, trace};

/// Receives diagnostics from the detection pipeline. Every method defaults
/// to doing nothing.
pub trait DetectionObserver {
    /// The raw series was cut at `boundary` out of `raw_len` rows.
    fn on_truncation(&mut self, _boundary: usize, _raw_len: usize) {}

    /// A raw row was dropped during cleaning.
    fn on_sample_rejected(&mut self, _original_index: usize, _reason: RejectionReason) {}

    /// A phase search succeeded.
    fn on_phase(&mut self, _phase: &Phase) {}

    /// A phase search starting at `cursor` came back empty.
    fn on_phase_miss(&mut self, _stage: PhaseStage, _cursor: usize, _miss: &PhaseMiss) {}

    /// The segmenter moved its scan cursor.
    fn on_cursor_advance(&mut self, _from: usize, _to: usize) {}

    /// A complete brake feel test was emitted.
    fn on_test(&mut self, _test: &BrakeFeelTest) {}
}

/// Discards every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DetectionObserver for NoopObserver {}

/// Forwards callbacks to `tracing`.
///
/// Rejected samples are logged individually only up to a limit; the rest
/// show up in the rejection tally.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    rejection_log_limit: usize,
    rejections_seen: usize,
}

impl TracingObserver {
    pub fn new(rejection_log_limit: usize) -> Self {
        Self {
            rejection_log_limit,
            rejections_seen: 0,
        }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new(5)
    }
}

impl DetectionObserver for TracingObserver {
    fn on_truncation(&mut self, boundary: usize, raw_len: usize) {
        if boundary < raw_len {
            debug!(boundary, raw_len, "Series truncated at first meaningful halt");
        }
    }

    fn on_sample_rejected(&mut self, original_index: usize, reason: RejectionReason) {
        self.rejections_seen += 1;
        if self.rejections_seen <= self.rejection_log_limit {
            debug!(original_index, %reason, "Sample dropped");
        } else if self.rejections_seen == self.rejection_log_limit + 1 {
            debug!("Further dropped samples are only counted");
        }
    }

    fn on_phase(&mut self, phase: &Phase) {
        trace!(
            stage = %phase.stage(),
            start = phase.start_index(),
            end = phase.end_index(),
            "Phase found"
        );
    }

    fn on_phase_miss(&mut self, stage: PhaseStage, cursor: usize, miss: &PhaseMiss) {
        trace!(%stage, cursor, %miss, "Phase not found");
    }

    fn on_test(&mut self, test: &BrakeFeelTest) {
        info!(
            test = test.test_number,
            start_s = test.start.time_offset_s,
            max_speed = test.max_speed,
            lowest_speed = test.lowest_speed,
            speed_drop = test.speed_drop,
            recovery = %test.recovery_kind,
            "Brake feel test detected"
        );
    }
}
