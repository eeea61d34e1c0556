//! Squat detector
//!
//! Tracks hip height relative to knee height. Hips dropping near knee level
//! enters DOWN; hips rising well clear of the knees returns to UP and counts.

use super::RepDetector;
use crate::config::SquatThresholds;
use crate::error::RepError;
use crate::filter::FilteredJoints;
use crate::types::{Exercise, ExerciseState, RepEvent};

pub const SQUAT_FEEDBACK: &str = "Great depth on that squat!";

#[derive(Debug, Clone)]
pub struct SquatDetector {
    thresholds: SquatThresholds,
    state: ExerciseState,
}

impl SquatDetector {
    pub fn new(thresholds: SquatThresholds) -> Self {
        Self {
            thresholds,
            state: ExerciseState::Up,
        }
    }
}

impl RepDetector for SquatDetector {
    fn exercise(&self) -> Exercise {
        Exercise::Squats
    }

    fn state(&self) -> ExerciseState {
        self.state
    }

    fn reset(&mut self) {
        self.state = ExerciseState::Up;
    }

    fn update(&mut self, joints: &FilteredJoints) -> Result<Option<RepEvent>, RepError> {
        let hip = FilteredJoints::require(joints.avg_hip_y, "avg_hip_y")?;
        let knee = FilteredJoints::require(joints.avg_knee_y, "avg_knee_y")?;

        if hip > knee - self.thresholds.down_offset {
            self.state = ExerciseState::Down;
        } else if self.state == ExerciseState::Down && hip < knee - self.thresholds.up_offset {
            self.state = ExerciseState::Up;
            return Ok(Some(RepEvent::good(Exercise::Squats, SQUAT_FEEDBACK)));
        }

        Ok(None)
    }
}
