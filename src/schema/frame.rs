//! pose.frame.v1 schema definition

use crate::types::{PoseEstimate, KEYPOINT_COUNT};
use thiserror::Error;

/// Current schema version
pub const FRAME_SCHEMA_VERSION: &str = "pose.frame.v1";

/// Structural problems in a pose frame.
///
/// The counter itself tolerates all of these (the frame simply yields no rep);
/// validation exists so producers can catch them upstream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Person {person} has {found} keypoints, expected {expected}")]
    TooFewKeypoints {
        person: usize,
        found: usize,
        expected: usize,
    },

    #[error("Person {person} keypoint {index} has a non-finite coordinate")]
    NonFiniteKeypoint { person: usize, index: usize },

    #[error("Person {person} keypoint {index} confidence {value} is outside [0, 1]")]
    ConfidenceOutOfRange {
        person: usize,
        index: usize,
        value: f64,
    },
}

/// Check one frame against pose.frame.v1, reporting the first problem found
pub fn validate_frame(frame: &PoseEstimate) -> Result<(), FrameValidationError> {
    if let Some(version) = &frame.schema_version {
        if version != FRAME_SCHEMA_VERSION {
            return Err(FrameValidationError::InvalidSchemaVersion {
                expected: FRAME_SCHEMA_VERSION.to_string(),
                actual: version.clone(),
            });
        }
    }

    for (person, pose) in frame.persons.iter().enumerate() {
        if pose.keypoints.len() < KEYPOINT_COUNT {
            return Err(FrameValidationError::TooFewKeypoints {
                person,
                found: pose.keypoints.len(),
                expected: KEYPOINT_COUNT,
            });
        }

        for (index, kp) in pose.keypoints.iter().enumerate() {
            if !kp.x.is_finite() || !kp.y.is_finite() {
                return Err(FrameValidationError::NonFiniteKeypoint { person, index });
            }
            if !(0.0..=1.0).contains(&kp.confidence) {
                return Err(FrameValidationError::ConfidenceOutOfRange {
                    person,
                    index,
                    value: kp.confidence,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{skeleton, squat_frame};
    use crate::types::Keypoint;

    #[test]
    fn test_valid_frame() {
        let mut frame = squat_frame(500.0, 510.0);
        frame.schema_version = Some(FRAME_SCHEMA_VERSION.to_string());
        assert!(validate_frame(&frame).is_ok());
    }

    #[test]
    fn test_empty_frame_is_valid() {
        assert!(validate_frame(&PoseEstimate::default()).is_ok());
    }

    #[test]
    fn test_wrong_schema_version() {
        let mut frame = squat_frame(500.0, 510.0);
        frame.schema_version = Some("pose.frame.v0".to_string());
        assert!(matches!(
            validate_frame(&frame),
            Err(FrameValidationError::InvalidSchemaVersion { .. })
        ));
    }

    #[test]
    fn test_truncated_skeleton() {
        let mut keypoints = skeleton().build_keypoints();
        keypoints.truncate(5);
        let frame = PoseEstimate::single(keypoints);
        assert_eq!(
            validate_frame(&frame),
            Err(FrameValidationError::TooFewKeypoints {
                person: 0,
                found: 5,
                expected: KEYPOINT_COUNT
            })
        );
    }

    #[test]
    fn test_bad_keypoint_values() {
        let mut keypoints = skeleton().build_keypoints();
        keypoints[3] = Keypoint::new(f64::INFINITY, 0.0, 0.5);
        assert_eq!(
            validate_frame(&PoseEstimate::single(keypoints)),
            Err(FrameValidationError::NonFiniteKeypoint { person: 0, index: 3 })
        );

        let mut keypoints = skeleton().build_keypoints();
        keypoints[7] = Keypoint::new(1.0, 1.0, 1.2);
        assert!(matches!(
            validate_frame(&PoseEstimate::single(keypoints)),
            Err(FrameValidationError::ConfidenceOutOfRange { index: 7, .. })
        ));
    }
}
