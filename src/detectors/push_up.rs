//! Push-up detector
//!
//! Uses the absolute vertical distance between shoulders and wrists. A small gap
//! means the body is lowered (DOWN); a large gap means the arms are extended (UP).

use super::RepDetector;
use crate::config::PushUpThresholds;
use crate::error::RepError;
use crate::filter::FilteredJoints;
use crate::types::{Exercise, ExerciseState, RepEvent};

pub const PUSH_UP_FEEDBACK: &str = "Perfect push-up!";

#[derive(Debug, Clone)]
pub struct PushUpDetector {
    thresholds: PushUpThresholds,
    state: ExerciseState,
}

impl PushUpDetector {
    pub fn new(thresholds: PushUpThresholds) -> Self {
        Self {
            thresholds,
            state: ExerciseState::Up,
        }
    }
}

impl RepDetector for PushUpDetector {
    fn exercise(&self) -> Exercise {
        Exercise::PushUps
    }

    fn state(&self) -> ExerciseState {
        self.state
    }

    fn reset(&mut self) {
        self.state = ExerciseState::Up;
    }

    fn update(&mut self, joints: &FilteredJoints) -> Result<Option<RepEvent>, RepError> {
        let shoulder = FilteredJoints::require(joints.avg_shoulder_y, "avg_shoulder_y")?;
        let wrist = FilteredJoints::require(joints.avg_wrist_y, "avg_wrist_y")?;
        let dist = (shoulder - wrist).abs();

        if dist < self.thresholds.down_distance {
            self.state = ExerciseState::Down;
        } else if self.state == ExerciseState::Down && dist > self.thresholds.up_distance {
            self.state = ExerciseState::Up;
            return Ok(Some(RepEvent::good(Exercise::PushUps, PUSH_UP_FEEDBACK)));
        }

        Ok(None)
    }
}
