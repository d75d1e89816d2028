//! Data models for hand landmarks, detections and arithmetic problems.
//!
//! Models are independent of the recognition logic and of any I/O.

pub mod detection;
pub mod landmark;
pub mod problem;

// Re-export all model types
pub use detection::{DetectionEvent, DetectionRecord};
pub use landmark::{Landmark, LandmarkError, LandmarkSet, LANDMARK_COUNT};
pub use problem::{Operator, Problem, MAX_ANSWER, MAX_OPERAND, MIN_ANSWER};
