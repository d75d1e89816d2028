//! Hand landmark data structures.
//!
//! Landmark indices follow the MediaPipe hand model convention. The detector
//! owns that convention, so sets are stored in the exact order received and
//! are never reordered.

use serde::{Deserialize, Serialize};
use std::ops::Index;
use thiserror::Error;

// ============================================================================
// HAND LANDMARK INDICES
// ============================================================================

/// Number of landmarks in one hand skeleton.
pub const LANDMARK_COUNT: usize = 21;

/// MediaPipe hand landmark indices.
#[allow(missing_docs)]
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

pub use index::*;

/// Fingertip indices, thumb first.
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Reference joint for each entry of [`FINGERTIPS`].
///
/// The thumb has no PIP joint; its MCP (index 2) takes that role.
pub const PIP_JOINTS: [usize; 5] = [THUMB_MCP, INDEX_PIP, MIDDLE_PIP, RING_PIP, PINKY_PIP];

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// A single tracked point in normalized image coordinates.
///
/// `y` grows downward, so a smaller `y` is higher on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position (0.0 to 1.0 of image width)
    pub x: f32,
    /// Vertical position (0.0 to 1.0 of image height)
    pub y: f32,
    /// Depth relative to the wrist
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    /// Creates a landmark from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Errors raised when building a [`LandmarkSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LandmarkError {
    /// The detector output did not contain exactly 21 points.
    #[error("expected 21 hand landmarks, got {0}")]
    WrongCount(usize),
}

/// One hand skeleton: exactly 21 landmarks, index-addressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkSet([Landmark; LANDMARK_COUNT]);

impl LandmarkSet {
    /// Wraps a full skeleton.
    #[must_use]
    pub const fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self(landmarks)
    }

    /// Builds a set from detector output, rejecting anything but 21 points.
    pub fn from_slice(landmarks: &[Landmark]) -> Result<Self, LandmarkError> {
        let array: [Landmark; LANDMARK_COUNT] = landmarks
            .try_into()
            .map_err(|_| LandmarkError::WrongCount(landmarks.len()))?;
        Ok(Self(array))
    }

    /// Returns the landmarks in detector order.
    #[must_use]
    pub const fn as_array(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.0
    }
}

impl Index<usize> for LandmarkSet {
    type Output = Landmark;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkSet {
    type Error = LandmarkError;

    fn try_from(landmarks: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::from_slice(&landmarks)
    }
}
