//! Generate a synthetic squat stream and count it
//!
//! Prints the pose.frame.v1 NDJSON to stdout with `--frames`, otherwise the
//! counted rep records followed by the workout summary.

use synheart_reps::types::{CocoKeypoint, Keypoint, PoseEstimate, KEYPOINT_COUNT};
use synheart_reps::{RepCounter, FRAME_SCHEMA_VERSION};

const KNEE_Y: f64 = 510.0;
const STANDING_HIP_Y: f64 = 380.0;
const BOTTOM_HIP_Y: f64 = 500.0;
const FRAMES_PER_REP: u64 = 30;

fn squat_frame(frame_index: u64, hip_y: f64) -> PoseEstimate {
    let mut keypoints = vec![Keypoint::new(0.0, 0.0, 0.1); KEYPOINT_COUNT];
    for (joint, y) in [(CocoKeypoint::LeftHip, hip_y), (CocoKeypoint::LeftKnee, KNEE_Y)] {
        keypoints[joint.index()] = Keypoint::new(280.0, y, 0.92);
        keypoints[joint.index() + 1] = Keypoint::new(360.0, y + 2.0, 0.88);
    }

    let mut frame = PoseEstimate::single(keypoints);
    frame.schema_version = Some(FRAME_SCHEMA_VERSION.to_string());
    frame.frame_index = Some(frame_index);
    frame.timestamp_ms = Some(frame_index * 33);
    frame
}

fn main() {
    let frames_only = std::env::args().any(|a| a == "--frames");
    let reps = 12;

    // Hip height follows a cosine between standing and the bottom of the squat
    let frames: Vec<PoseEstimate> = (0..reps * FRAMES_PER_REP)
        .map(|i| {
            let phase = (i % FRAMES_PER_REP) as f64 / FRAMES_PER_REP as f64;
            let depth = (1.0 - (phase * std::f64::consts::TAU).cos()) / 2.0;
            squat_frame(i, STANDING_HIP_Y + depth * (BOTTOM_HIP_Y - STANDING_HIP_Y))
        })
        .collect();

    if frames_only {
        for frame in &frames {
            match serde_json::to_string(frame) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("Error: {e:?}"),
            }
        }
        return;
    }

    let mut counter = RepCounter::new();
    for record in counter.process_frames(&frames) {
        match serde_json::to_string(&record) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("Error: {e:?}"),
        }
    }

    match serde_json::to_string_pretty(&counter.finish()) {
        Ok(summary) => println!("{summary}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
