//! Interaction controller: binds the detection stream to problem solving.
//!
//! The controller owns all session state. It is created when a session
//! starts, mutated only through its methods and dropped when the session
//! ends; nothing outlives it. Time is passed in explicitly, so the same
//! controller drives the cooperative camera loop and the HTTP API.
//!
//! ## Flow
//!
//! - An accepted count equal to the answer shows success, resets the failure
//!   counter and locks the gate. When the lock runs out the success
//!   indicator is hidden and the next problem is drawn.
//! - Any other accepted count shows "try again", bumps the failure counter
//!   and locks the gate. When the lock runs out the indicator is hidden; once
//!   the counter has reached the failure threshold the problem is replaced
//!   and the counter resets.
//! - While the gate is locked no detection changes the problem or the
//!   counter. The finger count on screen still follows the hand.

use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use crate::models::{DetectionEvent, Problem};
use crate::problems::{ProblemGenerator, ProblemSource};
use crate::recognition::gate::DEFAULT_LOCK_DURATION;
use crate::recognition::{count_event, FingerCount, GateDecision, RecognitionGate};
use crate::session::display::DisplayState;

/// Default number of wrong answers before the problem is replaced.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Timing and retry rules of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// How long feedback stays up and detections are suppressed.
    pub lock_duration: Duration,
    /// Consecutive wrong answers that force a new problem.
    pub failure_threshold: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            lock_duration: DEFAULT_LOCK_DURATION,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

/// Snapshot of the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionState {
    /// Problem being asked.
    pub current_problem: Problem,
    /// True while feedback is shown and detections are suppressed.
    pub is_locked: bool,
    /// Wrong answers since the last correct answer or forced replacement.
    pub consecutive_failures: u32,
}

/// Result of scoring one accepted count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Verdict {
    /// The count matched the answer.
    Correct {
        /// Scored count
        count: u8,
    },
    /// The count was valid but wrong.
    Wrong {
        /// Scored count
        count: u8,
        /// Failure counter after this attempt
        consecutive_failures: u32,
    },
}

/// What happened when a feedback window closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Success feedback ended and a new problem was drawn.
    NextProblem,
    /// Retry feedback ended; the failure threshold forced a new problem.
    ReplacedAfterFailures,
    /// Retry feedback ended; the same problem stays.
    SameProblem,
}

/// Feedback waiting for its lock window to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingFeedback {
    Success,
    Retry,
}

/// Owns and drives one interaction session.
#[derive(Debug)]
pub struct InteractionController<P = ProblemGenerator> {
    problems: P,
    gate: RecognitionGate,
    settings: SessionSettings,
    current_problem: Problem,
    consecutive_failures: u32,
    pending: Option<PendingFeedback>,
    display: DisplayState,
}

impl<P: ProblemSource> InteractionController<P> {
    /// Starts a session by seeding the first problem.
    pub fn new(mut problems: P, settings: SessionSettings) -> Self {
        let current_problem = problems.next_problem();
        info!(problem = %current_problem, "Seeded first problem");
        Self {
            problems,
            gate: RecognitionGate::new(settings.lock_duration),
            settings,
            current_problem,
            consecutive_failures: 0,
            pending: None,
            display: DisplayState::new(current_problem.prompt()),
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> InteractionState {
        InteractionState {
            current_problem: self.current_problem,
            is_locked: self.gate.is_locked(),
            consecutive_failures: self.consecutive_failures,
        }
    }

    /// What the user currently sees.
    #[must_use]
    pub const fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Problem being asked.
    #[must_use]
    pub const fn current_problem(&self) -> &Problem {
        &self.current_problem
    }

    /// Wrong answers since the last reset.
    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Session rules.
    #[must_use]
    pub const fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// When the pending feedback window closes, if one is open.
    #[must_use]
    pub const fn lock_deadline(&self) -> Option<Instant> {
        self.gate.deadline()
    }

    /// Feeds one detection.
    ///
    /// Closes a due feedback window first, then updates the displayed count
    /// and scores the detection if the gate accepts it.
    pub fn handle_event(&mut self, event: &DetectionEvent, now: Instant) -> Option<Verdict> {
        self.handle_count(count_event(event), now)
    }

    /// Feeds one frame's finger count.
    ///
    /// Same as [`handle_event`](Self::handle_event) for callers that count
    /// fingers themselves.
    pub fn handle_count(&mut self, count: FingerCount, now: Instant) -> Option<Verdict> {
        self.tick(now);

        let admission = self.gate.admit_count(count);
        self.display.finger_count = admission.count;

        match admission.decision {
            GateDecision::Accepted(count) => Some(self.score(count, now)),
            GateDecision::Suppressed => {
                trace!(count = %admission.count, "Detection suppressed while locked");
                None
            }
            GateDecision::Discarded => None,
        }
    }

    /// Closes the feedback window if its lock has run out.
    pub fn tick(&mut self, now: Instant) -> Option<Resolution> {
        if !self.gate.poll_expired(now) {
            return None;
        }

        let resolution = match self.pending.take()? {
            PendingFeedback::Success => {
                self.display.success_visible = false;
                self.advance();
                Resolution::NextProblem
            }
            PendingFeedback::Retry => {
                self.display.retry_visible = false;
                if self.consecutive_failures >= self.settings.failure_threshold {
                    self.consecutive_failures = 0;
                    self.advance();
                    Resolution::ReplacedAfterFailures
                } else {
                    Resolution::SameProblem
                }
            }
        };

        debug!(?resolution, problem = %self.current_problem, "Feedback window closed");
        Some(resolution)
    }

    /// Scores an accepted count and opens the feedback window.
    fn score(&mut self, count: u8, now: Instant) -> Verdict {
        let verdict = if count == self.current_problem.answer() {
            self.consecutive_failures = 0;
            self.display.success_visible = true;
            self.pending = Some(PendingFeedback::Success);
            Verdict::Correct { count }
        } else {
            self.consecutive_failures += 1;
            self.display.retry_visible = true;
            self.pending = Some(PendingFeedback::Retry);
            Verdict::Wrong {
                count,
                consecutive_failures: self.consecutive_failures,
            }
        };

        self.gate.lock(now);
        debug!(?verdict, problem = %self.current_problem, "Scored attempt");
        verdict
    }

    /// Replaces the current problem wholesale.
    fn advance(&mut self) {
        self.current_problem = self.problems.next_problem();
        self.display.problem_text = self.current_problem.prompt();
    }
}
