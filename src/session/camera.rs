//! Camera collaborator.
//!
//! Video acquisition lives outside the crate. The session only needs a way
//! to open the device (which may be refused) and to pull the next frame.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Size of the offscreen buffer frames are drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for CaptureSize {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// One RGBA frame handed to the detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Row-major RGBA bytes
    pub pixels: Vec<u8>,
}

impl Frame {
    /// All-black frame of the given size.
    #[must_use]
    pub fn blank(size: CaptureSize) -> Self {
        let len = size.width as usize * size.height as usize * 4;
        Self {
            width: size.width,
            height: size.height,
            pixels: vec![0; len],
        }
    }
}

/// Camera failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// The user refused camera access.
    #[error("camera access was denied, check the permissions")]
    PermissionDenied,
    /// No usable camera.
    #[error("camera unavailable: {0}")]
    Unavailable(String),
}

/// Live video source.
#[allow(async_fn_in_trait)]
pub trait Camera {
    /// Requests access and starts streaming at `size`.
    async fn open(&mut self, size: CaptureSize) -> Result<(), CameraError>;

    /// Waits for the next display refresh and returns the current frame.
    async fn capture(&mut self) -> Result<Frame, CameraError>;
}

/// Camera producing blank frames at a fixed interval.
///
/// Stands in for a real device in replays and tests; the detector decides
/// what each frame contains.
#[derive(Debug, Clone)]
pub struct SyntheticCamera {
    frame_interval: Duration,
    open_error: Option<CameraError>,
    size: Option<CaptureSize>,
    frames_captured: u64,
}

impl SyntheticCamera {
    /// Camera that grants access and ticks every `frame_interval`.
    #[must_use]
    pub const fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            open_error: None,
            size: None,
            frames_captured: 0,
        }
    }

    /// Camera whose `open` fails with `error`.
    #[must_use]
    pub const fn failing(error: CameraError) -> Self {
        Self {
            frame_interval: Duration::ZERO,
            open_error: Some(error),
            size: None,
            frames_captured: 0,
        }
    }

    /// Frames handed out so far.
    #[must_use]
    pub const fn frames_captured(&self) -> u64 {
        self.frames_captured
    }
}

impl Camera for SyntheticCamera {
    async fn open(&mut self, size: CaptureSize) -> Result<(), CameraError> {
        if let Some(error) = &self.open_error {
            return Err(error.clone());
        }
        self.size = Some(size);
        Ok(())
    }

    async fn capture(&mut self) -> Result<Frame, CameraError> {
        let size = self
            .size
            .ok_or_else(|| CameraError::Unavailable("camera was not opened".to_string()))?;
        tokio::time::sleep(self.frame_interval).await;
        self.frames_captured += 1;
        Ok(Frame::blank(size))
    }
}
