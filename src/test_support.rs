//! Frame builders shared by unit tests

use crate::types::{CocoKeypoint, Keypoint, PoseEstimate, KEYPOINT_COUNT};

pub const VISIBLE: f64 = 0.9;

/// Builds a 17-point skeleton. Unset keypoints have zero confidence.
#[derive(Debug, Clone)]
pub struct SkeletonBuilder {
    keypoints: [Keypoint; KEYPOINT_COUNT],
}

impl Default for SkeletonBuilder {
    fn default() -> Self {
        Self {
            keypoints: [Keypoint::new(0.0, 0.0, 0.0); KEYPOINT_COUNT],
        }
    }
}

impl SkeletonBuilder {
    /// Set a bilateral pair by its left-side keypoint
    pub fn pair(
        mut self,
        left: CocoKeypoint,
        left_y: f64,
        left_conf: f64,
        right_y: f64,
        right_conf: f64,
    ) -> Self {
        let i = left.index();
        self.keypoints[i] = Keypoint::new(100.0, left_y, left_conf);
        self.keypoints[i + 1] = Keypoint::new(200.0, right_y, right_conf);
        self
    }

    /// Both sides of a pair visible at the same height
    pub fn both(self, left: CocoKeypoint, y: f64) -> Self {
        self.pair(left, y, VISIBLE, y, VISIBLE)
    }

    pub fn nose(mut self, y: f64, conf: f64) -> Self {
        self.keypoints[CocoKeypoint::Nose.index()] = Keypoint::new(150.0, y, conf);
        self
    }

    pub fn build_keypoints(&self) -> Vec<Keypoint> {
        self.keypoints.to_vec()
    }

    pub fn frame(&self) -> PoseEstimate {
        PoseEstimate::single(self.build_keypoints())
    }
}

pub fn skeleton() -> SkeletonBuilder {
    SkeletonBuilder::default()
}

/// Frame where only hips and knees are visible
pub fn squat_frame(hip_y: f64, knee_y: f64) -> PoseEstimate {
    skeleton()
        .both(CocoKeypoint::LeftHip, hip_y)
        .both(CocoKeypoint::LeftKnee, knee_y)
        .frame()
}

/// Frame where only shoulders and wrists are visible
pub fn push_up_frame(shoulder_y: f64, wrist_y: f64) -> PoseEstimate {
    skeleton()
        .both(CocoKeypoint::LeftShoulder, shoulder_y)
        .both(CocoKeypoint::LeftWrist, wrist_y)
        .frame()
}

/// Frame with wrists, a visible nose and optionally hips
pub fn jack_frame(wrist_y: f64, nose_y: f64, hip_y: Option<f64>) -> PoseEstimate {
    let mut builder = skeleton()
        .both(CocoKeypoint::LeftWrist, wrist_y)
        .nose(nose_y, VISIBLE);
    if let Some(hip) = hip_y {
        builder = builder.both(CocoKeypoint::LeftHip, hip);
    }
    builder.frame()
}
