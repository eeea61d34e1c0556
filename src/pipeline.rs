//! Pipeline orchestration
//!
//! This module provides the public API for Synheart Reps. It drives one
//! session's frames through the state machine and forwards counted reps and set
//! boundaries to the session's sink.

use crate::config::{CounterConfig, SessionConfig};
use crate::error::RepError;
use crate::schema::FrameReader;
use crate::session::SessionId;
use crate::sink::{RepEventSink, WorkoutSession};
use crate::state_machine::ExerciseStateMachine;
use crate::types::{Exercise, ExerciseState, PoseEstimate, RepRecord, WorkoutSummary};
use tracing::info;

/// Count reps in an NDJSON frame stream with default configuration (stateless,
/// one-shot).
///
/// # Arguments
/// * `frames_ndjson` - One pose.frame.v1 JSON object per line
///
/// # Returns
/// Every counted rep, in frame order
///
/// # Example
/// ```ignore
/// let reps = count_reps(ndjson)?;
/// ```
pub fn count_reps(frames_ndjson: String) -> Result<Vec<RepRecord>, RepError> {
    count_reps_with_config(&frames_ndjson, &CounterConfig::default())
}

/// Count reps in an NDJSON frame stream with explicit configuration
pub fn count_reps_with_config(
    frames_ndjson: &str,
    config: &CounterConfig,
) -> Result<Vec<RepRecord>, RepError> {
    let frames = FrameReader::parse_ndjson(frames_ndjson)?;
    let mut counter = RepCounter::with_config(config.clone())?;
    Ok(counter.process_frames(&frames))
}

/// Set-boundary policy owned by the session, not the detectors.
///
/// A new set begins on the first rep, whenever the exercise label differs from
/// the previous rep, and after `reps_per_set` reps of the same exercise.
#[derive(Debug, Clone)]
pub struct SetTracker {
    reps_per_set: u32,
    current: Option<Exercise>,
    reps_in_set: u32,
}

impl SetTracker {
    pub fn new(reps_per_set: u32) -> Self {
        Self {
            reps_per_set,
            current: None,
            reps_in_set: 0,
        }
    }

    /// Whether a rep of `exercise` opens a new set
    pub fn begins_new_set(&self, exercise: Exercise) -> bool {
        match self.current {
            None => true,
            Some(current) => current != exercise || self.reps_in_set >= self.reps_per_set,
        }
    }

    pub fn start_set(&mut self, exercise: Exercise) {
        self.current = Some(exercise);
        self.reps_in_set = 0;
    }

    /// Count a rep in the current set and return its position
    pub fn count_rep(&mut self) -> u32 {
        self.reps_in_set += 1;
        self.reps_in_set
    }

    pub fn is_set_complete(&self) -> bool {
        self.reps_in_set >= self.reps_per_set
    }

    pub fn current(&self) -> Option<Exercise> {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.reps_in_set = 0;
    }
}

/// Stateful per-session processor.
///
/// Each session must own its own counter: detector states are never shared.
pub struct RepCounter<S: RepEventSink = WorkoutSession> {
    machine: ExerciseStateMachine,
    sink: S,
    sets: SetTracker,
    session: SessionConfig,
    current_set: u32,
    frames_processed: u64,
}

impl Default for RepCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl RepCounter {
    /// Create a counter with default configuration and a fresh workout session
    pub fn new() -> Self {
        let config = CounterConfig::default();
        Self {
            machine: ExerciseStateMachine::default(),
            sink: WorkoutSession::default(),
            sets: SetTracker::new(config.session.reps_per_set),
            session: config.session,
            current_set: 0,
            frames_processed: 0,
        }
    }

    /// Create a counter with explicit configuration
    pub fn with_config(config: CounterConfig) -> Result<Self, RepError> {
        Self::with_sink(config, WorkoutSession::default())
    }

    /// Create a counter bound to a known session id
    pub fn with_session_id(config: CounterConfig, session_id: SessionId) -> Result<Self, RepError> {
        Self::with_sink(config, WorkoutSession::new(session_id))
    }

    pub fn session_id(&self) -> &SessionId {
        self.sink.session_id()
    }

    /// Summary of the workout so far
    pub fn summary(&self) -> WorkoutSummary {
        self.sink.summary()
    }

    /// Close the session and return its final summary
    pub fn finish(&mut self) -> WorkoutSummary {
        self.sink.finish();
        self.sink.summary()
    }

    /// Start the session over under the same id: detector states return to
    /// their initial values and totals are cleared.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.sets.reset();
        self.sink = WorkoutSession::new(self.sink.session_id().clone());
        self.current_set = 0;
        self.frames_processed = 0;
    }
}

impl<S: RepEventSink> RepCounter<S> {
    /// Create a counter that reports to a caller-provided sink
    pub fn with_sink(config: CounterConfig, sink: S) -> Result<Self, RepError> {
        config.validate()?;
        Ok(Self {
            machine: ExerciseStateMachine::new(&config.detector)?,
            sink,
            sets: SetTracker::new(config.session.reps_per_set),
            session: config.session,
            current_set: 0,
            frames_processed: 0,
        })
    }

    /// Process one frame. At most one rep is counted per frame.
    pub fn process_frame(&mut self, pose: &PoseEstimate) -> Option<RepRecord> {
        self.frames_processed += 1;

        let event = self.machine.process_frame(pose)?;
        let exercise = event.exercise;

        if self.sets.begins_new_set(exercise) {
            let ack = self.sink.record_set_boundary(exercise);
            self.current_set = ack.set_number;
            self.sets.start_set(exercise);
            info!(
                exercise = exercise.as_str(),
                set = ack.set_number,
                "set started"
            );
        }

        let rep_in_set = self.sets.count_rep();
        let set_complete = self.sets.is_set_complete();
        let form_quality = event.form_quality;
        let feedback = event.feedback.clone();
        let ack = self.sink.record_rep(event);

        info!(
            exercise = exercise.as_str(),
            rep = ack.rep_number,
            set = self.current_set,
            rep_in_set,
            "rep counted"
        );

        Some(RepRecord {
            exercise,
            form_quality,
            feedback,
            rep_number: ack.rep_number,
            set_number: self.current_set,
            rep_in_set,
            form_score: ack.form_score,
            set_complete,
            rest_secs: set_complete.then_some(self.session.rest_duration_secs),
            frame_index: pose.frame_index,
            timestamp_ms: pose.timestamp_ms,
        })
    }

    /// Parse and process one pose.frame.v1 JSON object
    pub fn process_frame_json(&mut self, frame_json: &str) -> Result<Option<RepRecord>, RepError> {
        let pose = PoseEstimate::from_json(frame_json)?;
        Ok(self.process_frame(&pose))
    }

    /// Process a batch of frames in order
    pub fn process_frames(&mut self, frames: &[PoseEstimate]) -> Vec<RepRecord> {
        frames
            .iter()
            .filter_map(|frame| self.process_frame(frame))
            .collect()
    }

    /// Current UP/DOWN state per exercise, in priority order
    pub fn states(&self) -> Vec<(Exercise, ExerciseState)> {
        self.machine.states()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn session_config(&self) -> &SessionConfig {
        &self.session
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
