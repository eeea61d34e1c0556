//! Exercise state machine
//!
//! Runs the per-exercise detectors over each filtered frame in a fixed priority
//! order. Evaluation stops at the first detector that emits, so one ambiguous
//! frame can never be counted for two exercises.

use crate::config::DetectorConfig;
use crate::detectors::{build_detector, RepDetector};
use crate::error::RepError;
use crate::filter::{FilteredJoints, PoseFrameFilter};
use crate::types::{Exercise, ExerciseState, PoseEstimate, RepEvent};
use tracing::{debug, warn};

/// Ordered detector pipeline with one persistent state per exercise
pub struct ExerciseStateMachine {
    filter: PoseFrameFilter,
    detectors: Vec<Box<dyn RepDetector>>,
}

impl Default for ExerciseStateMachine {
    fn default() -> Self {
        Self::from_validated(&DetectorConfig::default())
    }
}

impl ExerciseStateMachine {
    /// Build the pipeline from configuration, in its priority order
    pub fn new(config: &DetectorConfig) -> Result<Self, RepError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: &DetectorConfig) -> Self {
        let detectors = config
            .priority
            .iter()
            .map(|exercise| build_detector(*exercise, config))
            .collect();

        Self {
            filter: PoseFrameFilter::new(config.confidence_threshold),
            detectors,
        }
    }

    /// Build a pipeline from explicit detectors, evaluated in the given order
    pub fn with_detectors(filter: PoseFrameFilter, detectors: Vec<Box<dyn RepDetector>>) -> Self {
        Self { filter, detectors }
    }

    /// Evaluate one frame and return the rep it completed, if any.
    ///
    /// Never fails: unusable poses and faults inside a detector both yield `None`.
    pub fn process_frame(&mut self, pose: &PoseEstimate) -> Option<RepEvent> {
        let Some(joints) = self.filter.filter(pose) else {
            debug!(frame = ?pose.frame_index, "no usable pose in frame");
            return None;
        };

        match self.evaluate(&joints) {
            Ok(event) => event,
            Err(e) => {
                warn!(frame = ?pose.frame_index, error = %e, "rep detection failed; skipping frame");
                None
            }
        }
    }

    fn evaluate(&mut self, joints: &FilteredJoints) -> Result<Option<RepEvent>, RepError> {
        for detector in self.detectors.iter_mut() {
            match detector.update(joints) {
                Ok(Some(event)) => return Ok(Some(event)),
                Ok(None) => {}
                Err(RepError::MissingJoint(joint)) => {
                    debug!(
                        exercise = detector.exercise().as_str(),
                        joint, "detector skipped: joint below confidence threshold"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Current state of one exercise, if it has a detector
    pub fn state(&self, exercise: Exercise) -> Option<ExerciseState> {
        self.detectors
            .iter()
            .find(|d| d.exercise() == exercise)
            .map(|d| d.state())
    }

    /// Current state of every detector, in priority order
    pub fn states(&self) -> Vec<(Exercise, ExerciseState)> {
        self.detectors
            .iter()
            .map(|d| (d.exercise(), d.state()))
            .collect()
    }

    pub fn priority(&self) -> Vec<Exercise> {
        self.detectors.iter().map(|d| d.exercise()).collect()
    }

    /// Return every detector to its session-start state
    pub fn reset(&mut self) {
        for detector in self.detectors.iter_mut() {
            detector.reset();
        }
    }
}
