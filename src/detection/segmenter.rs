//! Brake feel test segmentation
//!
//! A single forward cursor walks the cleaned series. At each position the
//! segmenter tries acceleration, then braking from the acceleration peak,
//! then recovery from the braking low. Every outcome moves the cursor
//! strictly forward:
//!
//! | Outcome                          | Next cursor                    |
//! |----------------------------------|--------------------------------|
//! | acceleration missing or too slow | cursor + 1                     |
//! | braking missing                  | acceleration end + skip        |
//! | recovery missing                 | braking end                    |
//! | test emitted                     | recovery end                   |

use super::phases::{find_acceleration, find_braking, find_recovery, PhaseMiss, PhaseSearch};
use crate::config::{
    AccelerationThresholds, BrakingThresholds, DetectionConfig, RecoveryThresholds,
    SegmenterConfig,
};
use crate::observer::DetectionObserver;
use crate::types::{
    AccelerationPhase, BrakeFeelTest, BrakingPhase, CleanedSeries, Phase, PhaseStage,
};

/// Where the segmenter is within one detection attempt.
enum ScanState {
    Seeking,
    Accelerated(AccelerationPhase),
    Braked(AccelerationPhase, BrakingPhase),
}

pub struct PhaseSegmenter {
    segmenter: SegmenterConfig,
    acceleration: AccelerationThresholds,
    braking: BrakingThresholds,
    recovery: RecoveryThresholds,
}

impl PhaseSegmenter {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            segmenter: config.segmenter.clone(),
            acceleration: config.acceleration.clone(),
            braking: config.braking.clone(),
            recovery: config.recovery.clone(),
        }
    }

    /// Every brake feel test in `series`, in order.
    ///
    /// Each next cursor is clamped to at least `cursor + 1` so that
    /// zero-valued thresholds built outside `DetectionConfig::validate` cannot
    /// stall the scan.
    pub fn segment(
        &self,
        series: &CleanedSeries,
        observer: &mut dyn DetectionObserver,
    ) -> Vec<BrakeFeelTest> {
        let speeds = series.speeds();
        let lookahead = self.segmenter.min_lookahead_samples;
        let mut tests: Vec<BrakeFeelTest> = Vec::new();
        let mut cursor = 0usize;
        let mut state = ScanState::Seeking;

        loop {
            state = match state {
                ScanState::Seeking => {
                    if cursor + lookahead >= speeds.len() {
                        break;
                    }
                    match find_acceleration(&speeds, cursor, &self.acceleration) {
                        PhaseSearch::Found(accel) if accel.end_speed >= self.segmenter.min_test_speed_kmh => {
                            observer.on_phase(&Phase::Acceleration(accel));
                            ScanState::Accelerated(accel)
                        }
                        PhaseSearch::Found(accel) => {
                            let miss = PhaseMiss::BelowTestSpeed { peak_kmh: accel.end_speed };
                            let next = cursor + 1;
                            Self::advance(&mut cursor, next, PhaseStage::Acceleration, &miss, observer);
                            ScanState::Seeking
                        }
                        PhaseSearch::NotFound(miss) => {
                            let next = cursor + 1;
                            Self::advance(&mut cursor, next, PhaseStage::Acceleration, &miss, observer);
                            ScanState::Seeking
                        }
                    }
                }

                ScanState::Accelerated(accel) => {
                    match find_braking(&speeds, accel.end_index, &self.braking) {
                        PhaseSearch::Found(braking) => {
                            observer.on_phase(&Phase::Braking(braking));
                            ScanState::Braked(accel, braking)
                        }
                        PhaseSearch::NotFound(miss) => {
                            let next = (accel.end_index + self.segmenter.braking_miss_skip_samples)
                                .max(cursor + 1);
                            Self::advance(&mut cursor, next, PhaseStage::Braking, &miss, observer);
                            ScanState::Seeking
                        }
                    }
                }

                ScanState::Braked(accel, braking) => {
                    match find_recovery(&speeds, braking.end_index, braking.end_speed, &self.recovery) {
                        PhaseSearch::Found(recovery) => {
                            observer.on_phase(&Phase::Recovery(recovery));
                            let test = BrakeFeelTest::assemble(
                                tests.len() + 1,
                                &series.points,
                                accel,
                                braking,
                                recovery,
                            );
                            observer.on_test(&test);
                            tests.push(test);
                            let next = recovery.end_index.max(cursor + 1);
                            observer.on_cursor_advance(cursor, next);
                            cursor = next;
                            ScanState::Seeking
                        }
                        PhaseSearch::NotFound(miss) => {
                            let next = braking.end_index.max(cursor + 1);
                            Self::advance(&mut cursor, next, PhaseStage::Recovery, &miss, observer);
                            ScanState::Seeking
                        }
                    }
                }
            };
        }

        tests
    }

    fn advance(
        cursor: &mut usize,
        next: usize,
        stage: PhaseStage,
        miss: &PhaseMiss,
        observer: &mut dyn DetectionObserver,
    ) {
        observer.on_phase_miss(stage, *cursor, miss);
        observer.on_cursor_advance(*cursor, next);
        *cursor = next;
    }
}
