//! Detector and session configuration
//!
//! All thresholds are in the same pixel units as the incoming keypoints, so they
//! can be retuned per camera resolution without touching the detectors.

use crate::error::RepError;
use crate::types::Exercise;
use serde::{Deserialize, Serialize};

/// Minimum keypoint confidence (exclusive) for a joint to be used
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.4;

/// Default reps before a set is considered complete
pub const DEFAULT_REPS_PER_SET: u32 = 10;

/// Default rest between sets, in seconds
pub const DEFAULT_REST_DURATION_SECS: u32 = 60;

/// Squat hysteresis band, as offsets above knee level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquatThresholds {
    /// DOWN when `hip_y > knee_y - down_offset`
    pub down_offset: f64,
    /// UP (rep) when `hip_y < knee_y - up_offset`
    pub up_offset: f64,
}

impl Default for SquatThresholds {
    fn default() -> Self {
        Self {
            down_offset: 40.0,
            up_offset: 80.0,
        }
    }
}

/// Jumping jack bands, relative to the head and hips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpingJackThresholds {
    /// UP when `wrist_y < nose_y + raised_offset`
    pub raised_offset: f64,
    /// DOWN (rep) when `wrist_y > hip_y - lowered_offset`
    pub lowered_offset: f64,
}

impl Default for JumpingJackThresholds {
    fn default() -> Self {
        Self {
            raised_offset: 0.0,
            lowered_offset: 60.0,
        }
    }
}

/// Push-up band on the vertical shoulder-to-wrist distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushUpThresholds {
    /// DOWN when distance drops below this
    pub down_distance: f64,
    /// UP (rep) when distance rises above this
    pub up_distance: f64,
}

impl Default for PushUpThresholds {
    fn default() -> Self {
        Self {
            down_distance: 70.0,
            up_distance: 90.0,
        }
    }
}

/// Configuration for the pose filter and the per-exercise detectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub confidence_threshold: f64,
    pub squat: SquatThresholds,
    pub jumping_jack: JumpingJackThresholds,
    pub push_up: PushUpThresholds,
    /// Detector evaluation order; the first detector to emit wins the frame
    pub priority: Vec<Exercise>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            squat: SquatThresholds::default(),
            jumping_jack: JumpingJackThresholds::default(),
            push_up: PushUpThresholds::default(),
            priority: Exercise::ALL.to_vec(),
        }
    }
}

impl DetectorConfig {
    /// Check that every band keeps its hysteresis and the priority list is usable
    pub fn validate(&self) -> Result<(), RepError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(RepError::InvalidConfig(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }

        if self.squat.up_offset <= self.squat.down_offset {
            return Err(RepError::InvalidConfig(format!(
                "squat.up_offset ({}) must exceed squat.down_offset ({})",
                self.squat.up_offset, self.squat.down_offset
            )));
        }

        if self.push_up.up_distance <= self.push_up.down_distance {
            return Err(RepError::InvalidConfig(format!(
                "push_up.up_distance ({}) must exceed push_up.down_distance ({})",
                self.push_up.up_distance, self.push_up.down_distance
            )));
        }

        let values = [
            self.squat.down_offset,
            self.squat.up_offset,
            self.jumping_jack.raised_offset,
            self.jumping_jack.lowered_offset,
            self.push_up.down_distance,
            self.push_up.up_distance,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(RepError::InvalidConfig(
                "thresholds must be finite numbers".to_string(),
            ));
        }

        if self.priority.is_empty() {
            return Err(RepError::InvalidConfig(
                "priority must list at least one exercise".to_string(),
            ));
        }

        for (i, exercise) in self.priority.iter().enumerate() {
            if self.priority[..i].contains(exercise) {
                return Err(RepError::InvalidConfig(format!(
                    "priority lists {} more than once",
                    exercise.as_str()
                )));
            }
        }

        Ok(())
    }
}

/// Set bookkeeping owned by the caller, not the detectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub reps_per_set: u32,
    pub rest_duration_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reps_per_set: DEFAULT_REPS_PER_SET,
            rest_duration_secs: DEFAULT_REST_DURATION_SECS,
        }
    }
}

/// Complete configuration for a rep counter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub detector: DetectorConfig,
    pub session: SessionConfig,
}

impl CounterConfig {
    /// Load and validate configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, RepError> {
        let config: CounterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, RepError> {
        serde_json::to_string_pretty(self).map_err(|e| RepError::EncodingError(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), RepError> {
        self.detector.validate()?;
        if self.session.reps_per_set == 0 {
            return Err(RepError::InvalidConfig(
                "session.reps_per_set must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        let config = CounterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detector.confidence_threshold, 0.4);
        assert_eq!(
            config.detector.priority,
            vec![Exercise::Squats, Exercise::JumpingJacks, Exercise::PushUps]
        );
        assert_eq!(config.session.reps_per_set, 10);
        assert_eq!(config.session.rest_duration_secs, 60);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = CounterConfig::from_json(
            r#"{"detector": {"squat": {"down_offset": 30.0}}, "session": {"reps_per_set": 12}}"#,
        )
        .unwrap();

        assert_eq!(config.detector.squat.down_offset, 30.0);
        assert_eq!(config.detector.squat.up_offset, 80.0);
        assert_eq!(config.detector.push_up, PushUpThresholds::default());
        assert_eq!(config.session.reps_per_set, 12);
        assert_eq!(config.session.rest_duration_secs, 60);
    }

    #[test]
    fn test_roundtrip_json() {
        let mut config = CounterConfig::default();
        config.detector.priority = vec![Exercise::PushUps, Exercise::Squats];
        let json = config.to_json().unwrap();
        assert_eq!(CounterConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_collapsed_squat_band_rejected() {
        let mut config = CounterConfig::default();
        config.detector.squat.up_offset = 40.0;
        assert!(matches!(config.validate(), Err(RepError::InvalidConfig(_))));
    }

    #[test]
    fn test_inverted_push_up_band_rejected() {
        let mut config = CounterConfig::default();
        config.detector.push_up.up_distance = 50.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_priority_rejected() {
        let result = CounterConfig::from_json(
            r#"{"detector": {"priority": ["squats", "push_ups", "squats"]}}"#,
        );
        assert!(matches!(result, Err(RepError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_priority_rejected() {
        let result = CounterConfig::from_json(r#"{"detector": {"priority": []}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let result = CounterConfig::from_json(r#"{"detector": {"confidence_threshold": 1.5}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_reps_per_set_rejected() {
        let result = CounterConfig::from_json(r#"{"session": {"reps_per_set": 0}}"#);
        assert!(result.is_err());
    }
}
