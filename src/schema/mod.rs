//! pose.frame.v1 input schema
//!
//! This module defines how per-frame pose estimates arrive from the
//! pose-estimation stage, either as NDJSON (streaming) or a JSON array (batch),
//! and how a batch of frames is checked before processing.

mod frame;
mod reader;

pub use frame::*;
pub use reader::*;
