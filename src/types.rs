//! Core types for the Synheart Reps pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: pose frames, rep events, sink acknowledgements, and session output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of keypoints in a COCO skeleton
pub const KEYPOINT_COUNT: usize = 17;

/// COCO keypoint schema. Discriminants are the positions in the keypoint array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CocoKeypoint {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl CocoKeypoint {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

/// A single 2D keypoint in image coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    /// Detection confidence (0.0 - 1.0)
    #[serde(alias = "conf", alias = "score")]
    pub confidence: f64,
}

impl Keypoint {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// True when confidence is strictly above the threshold
    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence > threshold
    }
}

/// One detected person: keypoints in COCO order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonPose {
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
}

impl PersonPose {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    pub fn get(&self, point: CocoKeypoint) -> Option<&Keypoint> {
        self.keypoints.get(point.index())
    }

    /// Whether the full skeleton is present
    pub fn is_complete(&self) -> bool {
        self.keypoints.len() >= KEYPOINT_COUNT
    }
}

/// Pose estimate for a single video frame (pose.frame.v1)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoseEstimate {
    /// Schema tag; optional, checked by validation when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Frame number in the stream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_index: Option<u64>,
    /// Capture timestamp in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    /// Detected persons, in detector order
    #[serde(default)]
    pub persons: Vec<PersonPose>,
}

impl PoseEstimate {
    /// Frame with a single detected person
    pub fn single(keypoints: Vec<Keypoint>) -> Self {
        Self {
            persons: vec![PersonPose::new(keypoints)],
            ..Default::default()
        }
    }

    /// The person the detectors look at. Only the first detection is used.
    pub fn primary_person(&self) -> Option<&PersonPose> {
        self.persons.first()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Supported exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exercise {
    Squats,
    JumpingJacks,
    PushUps,
}

impl Exercise {
    pub const ALL: [Exercise; 3] = [Exercise::Squats, Exercise::JumpingJacks, Exercise::PushUps];

    pub fn as_str(&self) -> &'static str {
        match self {
            Exercise::Squats => "squats",
            Exercise::JumpingJacks => "jumping_jacks",
            Exercise::PushUps => "push_ups",
        }
    }

    /// Human-readable label for summaries
    pub fn display_name(&self) -> &'static str {
        match self {
            Exercise::Squats => "Squats",
            Exercise::JumpingJacks => "Jumping Jacks",
            Exercise::PushUps => "Push-ups",
        }
    }
}

/// Qualitative form rating attached to each rep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormQuality {
    Good,
    Okay,
    Poor,
}

impl FormQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormQuality::Good => "good",
            FormQuality::Okay => "okay",
            FormQuality::Poor => "poor",
        }
    }

    /// Contribution of one rep to the form score (0-1)
    pub fn weight(&self) -> f64 {
        match self {
            FormQuality::Good => 1.0,
            FormQuality::Okay => 0.6,
            FormQuality::Poor => 0.2,
        }
    }
}

/// Two-valued per-exercise state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExerciseState {
    Up,
    Down,
}

/// A completed repetition, as emitted by a detector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepEvent {
    pub exercise: Exercise,
    pub form_quality: FormQuality,
    pub feedback: String,
}

impl RepEvent {
    pub fn good(exercise: Exercise, feedback: &str) -> Self {
        Self {
            exercise,
            form_quality: FormQuality::Good,
            feedback: feedback.to_string(),
        }
    }
}

/// Sink response to a recorded rep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepAck {
    /// 1-based rep number within the session
    pub rep_number: u32,
    /// Running form score (0-100)
    pub form_score: u8,
}

/// Sink response to a set boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetAck {
    /// 1-based set number within the session
    pub set_number: u32,
}

/// A counted rep with session bookkeeping, as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepRecord {
    pub exercise: Exercise,
    pub form_quality: FormQuality,
    pub feedback: String,
    pub rep_number: u32,
    pub set_number: u32,
    pub rep_in_set: u32,
    pub form_score: u8,
    /// True when this rep completed the configured reps-per-set
    pub set_complete: bool,
    /// Rest period to announce, present only when `set_complete`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_secs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
}

/// Per-exercise rep tally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseTally {
    pub exercise: Exercise,
    pub reps: u32,
    pub good_reps: u32,
}

/// Post-workout performance summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub exercises_done: Vec<String>,
    pub total_reps: u32,
    pub sets: u32,
    pub form_score: u8,
    pub good_rep_ratio: f64,
    pub reps_by_exercise: Vec<ExerciseTally>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_tip: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_serializes_snake_case() {
        let json = serde_json::to_string(&Exercise::JumpingJacks).unwrap();
        assert_eq!(json, "\"jumping_jacks\"");
        let back: Exercise = serde_json::from_str("\"push_ups\"").unwrap();
        assert_eq!(back, Exercise::PushUps);
    }

    #[test]
    fn test_keypoint_confidence_aliases() {
        let kp: Keypoint = serde_json::from_str(r#"{"x": 1.0, "y": 2.0, "conf": 0.9}"#).unwrap();
        assert_eq!(kp.confidence, 0.9);
        let kp: Keypoint = serde_json::from_str(r#"{"x": 1.0, "y": 2.0, "score": 0.3}"#).unwrap();
        assert!(!kp.is_confident(0.4));
    }

    #[test]
    fn test_confidence_threshold_is_strict() {
        assert!(!Keypoint::new(0.0, 0.0, 0.4).is_confident(0.4));
        assert!(Keypoint::new(0.0, 0.0, 0.41).is_confident(0.4));
    }

    #[test]
    fn test_pose_estimate_defaults() {
        let frame = PoseEstimate::from_json("{}").unwrap();
        assert!(frame.primary_person().is_none());
        assert!(frame.frame_index.is_none());
    }

    #[test]
    fn test_coco_indices() {
        assert_eq!(CocoKeypoint::Nose.index(), 0);
        assert_eq!(CocoKeypoint::LeftShoulder.index(), 5);
        assert_eq!(CocoKeypoint::RightWrist.index(), 10);
        assert_eq!(CocoKeypoint::RightAnkle.index(), KEYPOINT_COUNT - 1);
    }

    #[test]
    fn test_state_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&ExerciseState::Down).unwrap(), "\"DOWN\"");
    }
}
