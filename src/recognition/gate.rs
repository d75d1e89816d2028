//! Recognition gate: decides which detections get scored.
//!
//! The detector reports tens of frames per second. Without suppression a
//! single gesture would be scored many times before the user can react, so
//! after every scored attempt the gate locks for a fixed window.
//!
//! The gate never reads the clock. Callers pass `now` explicitly and report
//! expiry through [`RecognitionGate::poll_expired`].

use std::time::{Duration, Instant};

use crate::models::DetectionEvent;
use crate::recognition::finger_counter::{count_event, FingerCount};

/// Default suppression window after a scored attempt.
pub const DEFAULT_LOCK_DURATION: Duration = Duration::from_millis(1500);

/// Gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Accepting results.
    Open,
    /// Suppressing results until the deadline.
    Locked {
        /// Moment the lock may be released.
        until: Instant,
    },
}

/// What the gate did with one detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Valid count to score against the current problem.
    Accepted(u8),
    /// Dropped because the gate is locked.
    Suppressed,
    /// Dropped because there is no hand or the tally is negative.
    Discarded,
}

/// Outcome of admitting one detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Count for display, computed for every frame.
    pub count: FingerCount,
    /// Whether the count may be scored.
    pub decision: GateDecision,
}

/// Two-state gate between the detector stream and the scorer.
#[derive(Debug, Clone)]
pub struct RecognitionGate {
    state: GateState,
    lock_duration: Duration,
}

impl Default for RecognitionGate {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_DURATION)
    }
}

impl RecognitionGate {
    /// Creates an open gate.
    #[must_use]
    pub const fn new(lock_duration: Duration) -> Self {
        Self {
            state: GateState::Open,
            lock_duration,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> GateState {
        self.state
    }

    /// True while results are suppressed.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self.state, GateState::Locked { .. })
    }

    /// Deadline of the current lock, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        match self.state {
            GateState::Open => None,
            GateState::Locked { until } => Some(until),
        }
    }

    /// Configured lock window.
    #[must_use]
    pub const fn lock_duration(&self) -> Duration {
        self.lock_duration
    }

    /// Counts the detection and decides whether it may be scored.
    pub fn admit(&self, event: &DetectionEvent) -> Admission {
        self.admit_count(count_event(event))
    }

    /// Decides whether an already computed count may be scored.
    pub fn admit_count(&self, count: FingerCount) -> Admission {
        let decision = if self.is_locked() {
            GateDecision::Suppressed
        } else {
            match count.valid() {
                Some(valid) => GateDecision::Accepted(valid),
                None => GateDecision::Discarded,
            }
        };
        Admission { count, decision }
    }

    /// Locks the gate for the configured window starting at `now`.
    pub fn lock(&mut self, now: Instant) {
        self.state = GateState::Locked {
            until: now + self.lock_duration,
        };
    }

    /// Reopens the gate if its lock has run out.
    ///
    /// Returns true exactly once per lock, on the call that reopens it.
    pub fn poll_expired(&mut self, now: Instant) -> bool {
        match self.state {
            GateState::Locked { until } if now >= until => {
                self.state = GateState::Open;
                true
            }
            _ => false,
        }
    }
}
