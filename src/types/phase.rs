//! Speed phases and the brake feel test record assembled from them

use super::SamplePoint;
use serde::{Deserialize, Serialize};

/// A qualifying rise in speed. Indices are cleaned-series positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerationPhase {
    pub start_index: usize,
    pub start_speed: f64,
    /// Position of the peak speed
    pub end_index: usize,
    pub end_speed: f64,
    /// Peak minus start speed (km/h)
    pub total_increase: f64,
}

/// A qualifying drop in speed starting at an acceleration peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrakingPhase {
    pub start_index: usize,
    pub start_speed: f64,
    /// Position of the lowest speed
    pub end_index: usize,
    pub end_speed: f64,
    /// Start minus lowest speed (km/h)
    pub speed_drop: f64,
}

/// How the driver came off the brake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryKind {
    /// Speed held near the braking low
    Maintain,
    /// Speed climbed clear of the braking low
    Accelerate,
}

impl std::fmt::Display for RecoveryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Maintain => write!(f, "maintain"),
            Self::Accelerate => write!(f, "accelerate"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoveryPhase {
    pub start_index: usize,
    pub end_index: usize,
    pub end_speed: f64,
    pub kind: RecoveryKind,
}

/// Any detected phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Acceleration(AccelerationPhase),
    Braking(BrakingPhase),
    Recovery(RecoveryPhase),
}

impl Phase {
    pub fn start_index(&self) -> usize {
        match self {
            Self::Acceleration(p) => p.start_index,
            Self::Braking(p) => p.start_index,
            Self::Recovery(p) => p.start_index,
        }
    }

    pub fn end_index(&self) -> usize {
        match self {
            Self::Acceleration(p) => p.end_index,
            Self::Braking(p) => p.end_index,
            Self::Recovery(p) => p.end_index,
        }
    }

    pub fn stage(&self) -> PhaseStage {
        match self {
            Self::Acceleration(_) => PhaseStage::Acceleration,
            Self::Braking(_) => PhaseStage::Braking,
            Self::Recovery(_) => PhaseStage::Recovery,
        }
    }
}

/// Which search the segmenter was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseStage {
    Acceleration,
    Braking,
    Recovery,
}

impl std::fmt::Display for PhaseStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Acceleration => write!(f, "acceleration"),
            Self::Braking => write!(f, "braking"),
            Self::Recovery => write!(f, "recovery"),
        }
    }
}

/// One accelerate, brake, recover sequence performed without stopping.
///
/// Built only when all three phases succeed back to back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrakeFeelTest {
    /// 1-based sequence number within the run
    pub test_number: usize,

    /// Sample where the acceleration began
    pub start: SamplePoint,
    /// Sample at the peak speed, where braking began
    pub peak: SamplePoint,
    /// Sample at the lowest speed under braking
    pub lowest: SamplePoint,
    /// Sample where recovery was confirmed
    pub end: SamplePoint,

    pub start_speed: f64,
    pub max_speed: f64,
    pub braking_start_speed: f64,
    pub lowest_speed: f64,
    pub recovery_speed: f64,
    pub recovery_kind: RecoveryKind,

    /// Braking start speed minus lowest speed (km/h)
    pub speed_drop: f64,
    /// End time minus start time (s)
    pub total_duration_s: f64,

    pub acceleration: AccelerationPhase,
    pub braking: BrakingPhase,
    pub recovery: RecoveryPhase,
}

impl BrakeFeelTest {
    /// Combine three consecutive phases over `points`.
    ///
    /// The phase indices must be positions in `points`; they always are when
    /// the phases were found on the same series.
    pub(crate) fn assemble(
        test_number: usize,
        points: &[SamplePoint],
        acceleration: AccelerationPhase,
        braking: BrakingPhase,
        recovery: RecoveryPhase,
    ) -> Self {
        let start = points[acceleration.start_index];
        let peak = points[acceleration.end_index];
        let lowest = points[braking.end_index];
        let end = points[recovery.end_index];

        Self {
            test_number,
            start,
            peak,
            lowest,
            end,
            start_speed: acceleration.start_speed,
            max_speed: acceleration.end_speed,
            braking_start_speed: braking.start_speed,
            lowest_speed: braking.end_speed,
            recovery_speed: recovery.end_speed,
            recovery_kind: recovery.kind,
            speed_drop: braking.start_speed - braking.end_speed,
            total_duration_s: end.time_offset_s - start.time_offset_s,
            acceleration,
            braking,
            recovery,
        }
    }

    pub fn start_index(&self) -> usize {
        self.acceleration.start_index
    }

    pub fn end_index(&self) -> usize {
        self.recovery.end_index
    }
}
