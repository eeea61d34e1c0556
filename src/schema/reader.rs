//! Frame parsing for batch and streaming input

use crate::error::RepError;
use crate::schema::frame::{validate_frame, FrameValidationError};
use crate::types::PoseEstimate;

/// Reader for pose.frame.v1 input
pub struct FrameReader;

impl FrameReader {
    /// Parse a JSON string containing an array of frames
    pub fn parse_array(json: &str) -> Result<Vec<PoseEstimate>, RepError> {
        let frames: Vec<PoseEstimate> = serde_json::from_str(json)?;
        Ok(frames)
    }

    /// Parse NDJSON (one frame per line). Blank lines are skipped.
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<PoseEstimate>, RepError> {
        let mut frames = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<PoseEstimate>(trimmed) {
                Ok(frame) => frames.push(frame),
                Err(e) => {
                    return Err(RepError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(frames)
    }

    /// Validate a batch of frames, returning only the failures
    pub fn validate_frames(frames: &[PoseEstimate]) -> Vec<FrameValidationResult> {
        frames
            .iter()
            .enumerate()
            .filter_map(|(idx, frame)| {
                validate_frame(frame).err().map(|error| FrameValidationResult {
                    index: idx,
                    frame_index: frame.frame_index,
                    error,
                })
            })
            .collect()
    }
}

/// A frame that failed validation
#[derive(Debug, Clone)]
pub struct FrameValidationResult {
    /// Position in the input
    pub index: usize,
    /// Producer-assigned frame number, if any
    pub frame_index: Option<u64>,
    pub error: FrameValidationError,
}
