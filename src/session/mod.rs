//! Interaction session: controller, collaborators and the detection loop.

pub mod camera;
pub mod controller;
pub mod detector;
pub mod display;
pub mod runner;

pub use camera::{Camera, CameraError, CaptureSize, Frame, SyntheticCamera};
pub use controller::{
    InteractionController, InteractionState, Resolution, SessionSettings, Verdict,
    DEFAULT_FAILURE_THRESHOLD,
};
pub use detector::{DetectorError, DetectorOptions, HandDetector, ScriptedDetector};
pub use display::{DisplaySink, DisplayState, RecordingDisplay};
pub use runner::{
    EndReason, Session, SessionError, SessionHandle, SessionOptions, SessionSummary,
};
