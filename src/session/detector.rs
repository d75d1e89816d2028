//! Hand landmark detector collaborator.
//!
//! The landmark model is external. It is configured once and then handed
//! one frame at a time; `process_frame` takes `&mut self`, so a caller can
//! never have two detections in flight on the same detector.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

use crate::models::DetectionEvent;
use crate::session::camera::Frame;

/// Options passed through to the detector unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    /// Hands tracked at once (only one is supported)
    pub max_num_hands: u8,
    /// Landmark model complexity (0 or 1)
    pub model_complexity: u8,
    /// Minimum confidence for a new detection
    pub min_detection_confidence: f32,
    /// Minimum confidence to keep tracking
    pub min_tracking_confidence: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            max_num_hands: 1,
            model_complexity: 1,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.7,
        }
    }
}

/// Detector failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    /// The model could not be loaded or configured.
    #[error("hand detector initialization failed: {0}")]
    Init(String),
    /// A single frame could not be processed.
    #[error("hand detection failed for frame: {0}")]
    Frame(String),
}

/// Narrow interface to the landmark model.
#[allow(async_fn_in_trait)]
pub trait HandDetector {
    /// Loads the model with `options`.
    async fn configure(&mut self, options: &DetectorOptions) -> Result<(), DetectorError>;

    /// Runs the model on one frame.
    async fn process_frame(&mut self, frame: &Frame) -> Result<DetectionEvent, DetectorError>;
}

/// Detector that replays a fixed script of results.
///
/// Once the script is used up every frame reports [`DetectionEvent::NoHand`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedDetector {
    script: VecDeque<Result<DetectionEvent, DetectorError>>,
    latency: Duration,
    configure_error: Option<DetectorError>,
    options: Option<DetectorOptions>,
    frames_processed: u64,
}

impl ScriptedDetector {
    /// Detector yielding `events` in order.
    pub fn new(events: impl IntoIterator<Item = DetectionEvent>) -> Self {
        Self {
            script: events.into_iter().map(Ok).collect(),
            ..Self::default()
        }
    }

    /// Simulated model latency per frame.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Makes `configure` fail with `error`.
    pub fn failing_configure(mut self, error: DetectorError) -> Self {
        self.configure_error = Some(error);
        self
    }

    /// Appends a failing frame to the script.
    pub fn then_fail(mut self, message: impl Into<String>) -> Self {
        self.script
            .push_back(Err(DetectorError::Frame(message.into())));
        self
    }

    /// Options received by `configure`.
    #[must_use]
    pub const fn options(&self) -> Option<&DetectorOptions> {
        self.options.as_ref()
    }

    /// Frames processed so far.
    #[must_use]
    pub const fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// True once every scripted result has been returned.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.script.is_empty()
    }
}

impl HandDetector for ScriptedDetector {
    async fn configure(&mut self, options: &DetectorOptions) -> Result<(), DetectorError> {
        if let Some(error) = &self.configure_error {
            return Err(error.clone());
        }
        self.options = Some(*options);
        Ok(())
    }

    async fn process_frame(&mut self, _frame: &Frame) -> Result<DetectionEvent, DetectorError> {
        if self.options.is_none() {
            return Err(DetectorError::Frame("detector was not configured".to_string()));
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.frames_processed += 1;
        self.script.pop_front().unwrap_or(Ok(DetectionEvent::NoHand))
    }
}
