//! Synheart Reps - On-device exercise repetition counting from pose keypoints
//!
//! Reps turns a stream of 17-point COCO pose estimates into counted repetitions
//! through a deterministic per-frame pipeline: confidence filtering → per-exercise
//! hysteresis detectors (priority ordered, first match wins) → session sink.
//!
//! ## Modules
//!
//! - **Counting Pipeline**: Drive frames through the state machine into a workout session
//! - **Sessions**: Own one counter per session, addressed by explicit id

pub mod config;
pub mod detectors;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod schema;
pub mod session;
pub mod sink;
pub mod state_machine;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

#[cfg(test)]
mod test_support;

pub use config::CounterConfig;
pub use error::RepError;
pub use pipeline::{count_reps, count_reps_with_config, RepCounter};
pub use session::{SessionId, SessionRegistry};
pub use sink::{RepEventSink, WorkoutSession};
pub use state_machine::ExerciseStateMachine;

// Schema exports
pub use schema::{FrameReader, FRAME_SCHEMA_VERSION};

/// Reps version reported by the CLI and FFI
pub const REPS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for emitted rep records
pub const PRODUCER_NAME: &str = "synheart-reps";
