//! Jumping jack detector
//!
//! Wrists above the nose enters UP. Wrists falling back near hip level returns to
//! DOWN and counts, so the rep fires on UP -> DOWN, the opposite polarity of the
//! squat and push-up detectors.

use super::RepDetector;
use crate::config::JumpingJackThresholds;
use crate::error::RepError;
use crate::filter::FilteredJoints;
use crate::types::{Exercise, ExerciseState, RepEvent};

pub const JUMPING_JACK_FEEDBACK: &str = "Awesome jumping jack!";

#[derive(Debug, Clone)]
pub struct JumpingJackDetector {
    thresholds: JumpingJackThresholds,
    state: ExerciseState,
}

impl JumpingJackDetector {
    pub fn new(thresholds: JumpingJackThresholds) -> Self {
        Self {
            thresholds,
            state: ExerciseState::Down,
        }
    }
}

impl RepDetector for JumpingJackDetector {
    fn exercise(&self) -> Exercise {
        Exercise::JumpingJacks
    }

    fn state(&self) -> ExerciseState {
        self.state
    }

    fn reset(&mut self) {
        self.state = ExerciseState::Down;
    }

    fn update(&mut self, joints: &FilteredJoints) -> Result<Option<RepEvent>, RepError> {
        let wrist = FilteredJoints::require(joints.avg_wrist_y, "avg_wrist_y")?;
        let nose = joints
            .confident_nose()
            .ok_or(RepError::MissingJoint("nose"))?;
        let nose_y = FilteredJoints::require(Some(nose.y), "nose")?;

        if wrist < nose_y + self.thresholds.raised_offset {
            self.state = ExerciseState::Up;
        } else if self.state == ExerciseState::Up {
            // Hips are optional: without them the arms cannot be judged lowered
            if joints.avg_hip_y.is_some() {
                let hip = FilteredJoints::require(joints.avg_hip_y, "avg_hip_y")?;
                if wrist > hip - self.thresholds.lowered_offset {
                    self.state = ExerciseState::Down;
                    return Ok(Some(RepEvent::good(
                        Exercise::JumpingJacks,
                        JUMPING_JACK_FEEDBACK,
                    )));
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Keypoint;

    fn joints(wrist: f64, nose: f64, hip: Option<f64>) -> FilteredJoints {
        FilteredJoints {
            avg_wrist_y: Some(wrist),
            avg_hip_y: hip,
            nose: Some(Keypoint::new(150.0, nose, 0.9)),
            confidence_threshold: 0.4,
            ..Default::default()
        }
    }

    fn detector() -> JumpingJackDetector {
        JumpingJackDetector::new(JumpingJackThresholds::default())
    }

    #[test]
    fn test_raising_arms_never_counts() {
        let mut jack = detector();
        assert_eq!(jack.update(&joints(100.0, 150.0, Some(500.0))).unwrap(), None);
        assert_eq!(jack.state(), ExerciseState::Up);
        // Staying raised stays silent
        assert_eq!(jack.update(&joints(90.0, 150.0, Some(500.0))).unwrap(), None);
    }

    #[test]
    fn test_rep_fires_on_lowering() {
        let mut jack = detector();
        jack.update(&joints(100.0, 150.0, Some(500.0))).unwrap();

        // Wrist 460 > 500 - 60
        let event = jack.update(&joints(460.0, 150.0, Some(500.0))).unwrap().unwrap();
        assert_eq!(event.exercise, Exercise::JumpingJacks);
        assert_eq!(event.feedback, JUMPING_JACK_FEEDBACK);
        assert_eq!(jack.state(), ExerciseState::Down);

        // Already down: no second rep
        assert_eq!(jack.update(&joints(470.0, 150.0, Some(500.0))).unwrap(), None);
    }

    #[test]
    fn test_mid_height_wrists_hold_state() {
        let mut jack = detector();
        jack.update(&joints(100.0, 150.0, Some(500.0))).unwrap();
        // Below nose but above hip - 60 (440)
        assert_eq!(jack.update(&joints(300.0, 150.0, Some(500.0))).unwrap(), None);
        assert_eq!(jack.state(), ExerciseState::Up);
    }

    #[test]
    fn test_no_rep_without_hips() {
        let mut jack = detector();
        jack.update(&joints(100.0, 150.0, None)).unwrap();
        assert_eq!(jack.update(&joints(600.0, 150.0, None)).unwrap(), None);
        assert_eq!(jack.state(), ExerciseState::Up);
    }

    #[test]
    fn test_low_confidence_nose_skips() {
        let mut jack = detector();
        let mut frame = joints(100.0, 150.0, Some(500.0));
        frame.nose = Some(Keypoint::new(150.0, 150.0, 0.4));
        assert!(matches!(
            jack.update(&frame),
            Err(RepError::MissingJoint("nose"))
        ));
        assert_eq!(jack.state(), ExerciseState::Down);
    }
}
