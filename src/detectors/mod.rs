//! Per-exercise rep detectors
//!
//! Each detector is a two-state (UP/DOWN) machine with an asymmetric threshold
//! pair. A detector consumes the filtered joints of one frame, updates its own
//! state, and emits at most one rep event.

mod jumping_jack;
mod push_up;
mod squat;

pub use jumping_jack::JumpingJackDetector;
pub use push_up::PushUpDetector;
pub use squat::SquatDetector;

use crate::config::DetectorConfig;
use crate::error::RepError;
use crate::filter::FilteredJoints;
use crate::types::{Exercise, ExerciseState, RepEvent};

/// Trait for per-exercise rep detectors
pub trait RepDetector: Send {
    /// Exercise this detector counts
    fn exercise(&self) -> Exercise;

    /// Current persisted state
    fn state(&self) -> ExerciseState;

    /// Restore the session-start state
    fn reset(&mut self);

    /// Evaluate one frame.
    ///
    /// Returns `Err(RepError::MissingJoint)` when a required joint was withheld;
    /// the state is left untouched in that case.
    fn update(&mut self, joints: &FilteredJoints) -> Result<Option<RepEvent>, RepError>;
}

/// Build the detector for an exercise from configuration
pub fn build_detector(exercise: Exercise, config: &DetectorConfig) -> Box<dyn RepDetector> {
    match exercise {
        Exercise::Squats => Box::new(SquatDetector::new(config.squat.clone())),
        Exercise::JumpingJacks => Box::new(JumpingJackDetector::new(config.jumping_jack.clone())),
        Exercise::PushUps => Box::new(PushUpDetector::new(config.push_up.clone())),
    }
}
