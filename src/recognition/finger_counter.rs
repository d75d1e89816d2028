//! Raised-finger counting from a hand skeleton.
//!
//! A finger counts as raised when its tip sits strictly above its reference
//! joint in image space. The tally starts at [`TALLY_BASE`] rather than zero,
//! so a fully open hand reads 4 and a closed fist reads -1. Consumers must
//! treat negative tallies as "no valid count".

use serde::Serialize;
use std::fmt;

use crate::models::landmark::{FINGERTIPS, PIP_JOINTS};
use crate::models::{DetectionEvent, LandmarkSet};

/// Starting value of the raised-finger tally.
pub const TALLY_BASE: i8 = -1;

/// Largest tally a hand can produce.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const MAX_TALLY: i8 = TALLY_BASE + FINGERTIPS.len() as i8;

/// Placeholder shown when no hand is in frame.
pub const NO_HAND_PLACEHOLDER: &str = "-";

/// Result of counting one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "Option<i8>")]
pub enum FingerCount {
    /// No hand present.
    Unknown,
    /// Raw tally in `TALLY_BASE..=MAX_TALLY`.
    Tally(i8),
}

impl FingerCount {
    /// Returns the count if it can be scored (hand present, non-negative).
    #[must_use]
    pub fn valid(self) -> Option<u8> {
        match self {
            Self::Unknown => None,
            Self::Tally(tally) => u8::try_from(tally).ok(),
        }
    }

    /// True when no hand was detected.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl From<FingerCount> for Option<i8> {
    fn from(count: FingerCount) -> Self {
        match count {
            FingerCount::Unknown => None,
            FingerCount::Tally(tally) => Some(tally),
        }
    }
}

impl fmt::Display for FingerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str(NO_HAND_PLACEHOLDER),
            Self::Tally(tally) => write!(f, "{tally}"),
        }
    }
}

/// Counts raised fingers on one hand.
#[must_use]
pub fn count(landmarks: &LandmarkSet) -> FingerCount {
    let mut tally = TALLY_BASE;
    for (&tip, &pip) in FINGERTIPS.iter().zip(PIP_JOINTS.iter()) {
        if landmarks[tip].y < landmarks[pip].y {
            tally += 1;
        }
    }
    FingerCount::Tally(tally)
}

/// Counts raised fingers for a detection event.
///
/// `NoHand` maps to [`FingerCount::Unknown`], never to a tally.
#[must_use]
pub fn count_event(event: &DetectionEvent) -> FingerCount {
    match event {
        DetectionEvent::NoHand => FingerCount::Unknown,
        DetectionEvent::OneHand(landmarks) => count(landmarks),
    }
}
