//! Pose frame filtering
//!
//! This module extracts the joints the detectors need from a raw pose estimate:
//! - Confidence gating per keypoint
//! - Bilateral (left/right) averaging of vertical position
//! - Soft failure on missing or truncated skeletons
//!
//! There is no smoothing across frames; jitter is absorbed by detector hysteresis.

use crate::error::RepError;
use crate::types::{CocoKeypoint, Keypoint, PoseEstimate};

/// Joints extracted from one frame. Each average is present only when at least
/// one side of the pair cleared the confidence threshold.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilteredJoints {
    pub avg_hip_y: Option<f64>,
    pub avg_knee_y: Option<f64>,
    pub avg_wrist_y: Option<f64>,
    pub avg_shoulder_y: Option<f64>,
    /// Raw nose keypoint, ungated
    pub nose: Option<Keypoint>,
    pub confidence_threshold: f64,
}

impl FilteredJoints {
    /// Nose keypoint if it clears the confidence threshold
    pub fn confident_nose(&self) -> Option<&Keypoint> {
        self.nose
            .as_ref()
            .filter(|kp| kp.is_confident(self.confidence_threshold))
    }

    /// Unwrap a joint value for a detector, rejecting absent or non-finite input
    pub fn require(value: Option<f64>, name: &'static str) -> Result<f64, RepError> {
        match value {
            Some(v) if v.is_finite() => Ok(v),
            Some(_) => Err(RepError::NonFiniteInput(name)),
            None => Err(RepError::MissingJoint(name)),
        }
    }
}

/// Filter that turns a pose estimate into gated, averaged joints
#[derive(Debug, Clone, Copy)]
pub struct PoseFrameFilter {
    confidence_threshold: f64,
}

impl PoseFrameFilter {
    pub fn new(confidence_threshold: f64) -> Self {
        Self {
            confidence_threshold,
        }
    }

    /// Extract joints from the first detected person.
    ///
    /// Returns `None` when no person was detected or the skeleton has fewer
    /// than 17 keypoints.
    pub fn filter(&self, pose: &PoseEstimate) -> Option<FilteredJoints> {
        let person = pose.primary_person()?;
        if !person.is_complete() {
            return None;
        }

        let kps = &person.keypoints;
        let pair = |left: CocoKeypoint, right: CocoKeypoint| {
            self.bilateral_average(&kps[left.index()], &kps[right.index()])
        };

        Some(FilteredJoints {
            avg_hip_y: pair(CocoKeypoint::LeftHip, CocoKeypoint::RightHip),
            avg_knee_y: pair(CocoKeypoint::LeftKnee, CocoKeypoint::RightKnee),
            avg_wrist_y: pair(CocoKeypoint::LeftWrist, CocoKeypoint::RightWrist),
            avg_shoulder_y: pair(CocoKeypoint::LeftShoulder, CocoKeypoint::RightShoulder),
            nose: Some(kps[CocoKeypoint::Nose.index()]),
            confidence_threshold: self.confidence_threshold,
        })
    }

    /// Mean y over the sides above threshold
    fn bilateral_average(&self, left: &Keypoint, right: &Keypoint) -> Option<f64> {
        let ys: Vec<f64> = [left, right]
            .into_iter()
            .filter(|kp| kp.is_confident(self.confidence_threshold))
            .map(|kp| kp.y)
            .collect();

        if ys.is_empty() {
            return None;
        }
        Some(ys.iter().sum::<f64>() / ys.len() as f64)
    }
}
