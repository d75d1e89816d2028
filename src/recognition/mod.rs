//! Gesture recognition: finger counting and result gating.

pub mod finger_counter;
pub mod gate;

pub use finger_counter::{count, count_event, FingerCount};
pub use gate::{Admission, GateDecision, GateState, RecognitionGate};
