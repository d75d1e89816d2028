//! Arithmetic problem supply.
//!
//! The controller pulls problems through [`ProblemSource`] so tests can
//! script exact problems while the application uses [`ProblemGenerator`].

pub mod generator;

pub use generator::{valid_problems, ProblemGenerator, DEFAULT_MAX_ATTEMPTS};

use std::collections::VecDeque;

use crate::models::Problem;

/// Supplies the next problem whenever the controller advances.
pub trait ProblemSource {
    /// Returns a fresh problem.
    fn next_problem(&mut self) -> Problem;
}

/// Replays a fixed list of problems, then defers to a generator.
///
/// Used by replays and tests that need to know the answers in advance.
#[derive(Debug, Clone)]
pub struct ScriptedProblems<S = ProblemGenerator> {
    queue: VecDeque<Problem>,
    fallback: S,
}

impl<S: ProblemSource> ScriptedProblems<S> {
    /// Creates a source that yields `problems` in order before using `fallback`.
    pub fn new(problems: impl IntoIterator<Item = Problem>, fallback: S) -> Self {
        Self {
            queue: problems.into_iter().collect(),
            fallback,
        }
    }

    /// Number of scripted problems not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl<S: ProblemSource> ProblemSource for ScriptedProblems<S> {
    fn next_problem(&mut self) -> Problem {
        self.queue
            .pop_front()
            .unwrap_or_else(|| self.fallback.next_problem())
    }
}
