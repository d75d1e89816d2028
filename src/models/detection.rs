//! Per-frame detector output.

use serde::{Deserialize, Serialize};

use crate::models::landmark::{Landmark, LandmarkError, LandmarkSet};

/// One frame's worth of hand-tracking output.
///
/// Produced at camera frame rate and never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectionEvent {
    /// No hand in frame.
    NoHand,
    /// Exactly one tracked hand.
    OneHand(LandmarkSet),
}

impl DetectionEvent {
    /// Returns the landmark set, if a hand was detected.
    #[must_use]
    pub const fn landmarks(&self) -> Option<&LandmarkSet> {
        match self {
            Self::NoHand => None,
            Self::OneHand(set) => Some(set),
        }
    }
}

/// Wire form of a detection: `{"landmarks": [{x, y, z}, ...] | null}`.
///
/// Used by the HTTP API and by replay files. A missing or null `landmarks`
/// field means no hand was found in the frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// Landmarks of the first tracked hand, in detector order.
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

impl DetectionRecord {
    /// Converts the record into an event, validating the landmark count.
    pub fn into_event(self) -> Result<DetectionEvent, LandmarkError> {
        match self.landmarks {
            None => Ok(DetectionEvent::NoHand),
            Some(points) => Ok(DetectionEvent::OneHand(LandmarkSet::try_from(points)?)),
        }
    }
}

impl From<&DetectionEvent> for DetectionRecord {
    fn from(event: &DetectionEvent) -> Self {
        Self {
            landmarks: event.landmarks().map(|set| set.as_array().to_vec()),
        }
    }
}
