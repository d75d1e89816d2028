//! Random arithmetic problem generation.
//!
//! Problems are drawn by rejection sampling: operands and operator are
//! sampled together and the whole triple is redrawn until its answer fits on
//! one hand. Division by zero counts as a rejection. The loop is bounded; if
//! every attempt is rejected the generator falls back to a uniform pick from
//! the enumerated set of valid problems, which always contains `0 + 0`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{trace, warn};

use crate::models::{Operator, Problem, MAX_OPERAND};
use crate::problems::ProblemSource;

/// Default bound on rejection-sampling attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// Rejection sampler over `0..=MAX_OPERAND` operands and all operators.
#[derive(Debug, Clone)]
pub struct ProblemGenerator<R = StdRng> {
    rng: R,
    max_attempts: u32,
}

impl ProblemGenerator<StdRng> {
    /// Creates a generator seeded from OS entropy.
    #[must_use]
    pub fn from_entropy(max_attempts: u32) -> Self {
        Self::with_rng(StdRng::from_entropy(), max_attempts)
    }

    /// Creates a reproducible generator.
    #[must_use]
    pub fn seeded(seed: u64, max_attempts: u32) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), max_attempts)
    }
}

impl<R: Rng> ProblemGenerator<R> {
    /// Creates a generator over the given randomness source.
    pub const fn with_rng(rng: R, max_attempts: u32) -> Self {
        Self { rng, max_attempts }
    }

    /// Draws one candidate triple.
    fn draw(&mut self) -> (u8, Operator, u8) {
        let operator = Operator::ALL[self.rng.gen_range(0..Operator::ALL.len())];
        let operand1 = self.rng.gen_range(0..=MAX_OPERAND);
        let operand2 = self.rng.gen_range(0..=MAX_OPERAND);
        (operand1, operator, operand2)
    }

    /// Produces a problem whose answer is in the valid range.
    pub fn generate(&mut self) -> Problem {
        let max_attempts = self.max_attempts;
        let draws = std::iter::from_fn(|| Some(self.draw()));
        if let Some((problem, attempts)) = first_valid(draws, max_attempts) {
            trace!(attempts, problem = %problem, "Generated problem");
            return problem;
        }

        warn!(
            max_attempts,
            "Rejection sampling exhausted, picking from enumerated problems"
        );
        let candidates = valid_problems();
        candidates[self.rng.gen_range(0..candidates.len())]
    }
}

impl<R: Rng> ProblemSource for ProblemGenerator<R> {
    fn next_problem(&mut self) -> Problem {
        self.generate()
    }
}

/// Returns the first valid triple among at most `max_attempts` draws,
/// together with the number of draws it took.
fn first_valid<I>(draws: I, max_attempts: u32) -> Option<(Problem, u32)>
where
    I: IntoIterator<Item = (u8, Operator, u8)>,
{
    draws
        .into_iter()
        .zip(1..=max_attempts)
        .find_map(|((operand1, operator, operand2), attempt)| {
            Problem::new(operand1, operator, operand2).map(|problem| (problem, attempt))
        })
}

/// Enumerates every valid problem over the operand range.
#[must_use]
pub fn valid_problems() -> Vec<Problem> {
    let mut problems = Vec::new();
    for operator in Operator::ALL {
        for operand1 in 0..=MAX_OPERAND {
            for operand2 in 0..=MAX_OPERAND {
                if let Some(problem) = Problem::new(operand1, operator, operand2) {
                    problems.push(problem);
                }
            }
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MAX_ANSWER, MIN_ANSWER};
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_generated_answers_are_in_range() {
        let mut generator = ProblemGenerator::seeded(7, DEFAULT_MAX_ATTEMPTS);
        for _ in 0..2000 {
            let problem = generator.generate();
            assert!((MIN_ANSWER..=MAX_ANSWER).contains(&problem.answer()));
            assert!(problem.operand1() <= MAX_OPERAND);
            assert!(problem.operand2() <= MAX_OPERAND);
            if problem.operator() == Operator::Divide {
                assert_ne!(problem.operand2(), 0);
            }
        }
    }

    #[test]
    fn test_all_operators_are_produced() {
        let mut generator = ProblemGenerator::seeded(42, DEFAULT_MAX_ATTEMPTS);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(generator.generate().operator());
        }
        assert_eq!(seen.len(), Operator::ALL.len());
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = ProblemGenerator::seeded(3, DEFAULT_MAX_ATTEMPTS);
        let mut b = ProblemGenerator::seeded(3, DEFAULT_MAX_ATTEMPTS);
        for _ in 0..20 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[test]
    fn test_division_by_zero_is_resampled() {
        let draws = [
            (4, Operator::Divide, 0),
            (0, Operator::Divide, 0),
            (4, Operator::Divide, 2),
        ];
        let (problem, attempts) = first_valid(draws, DEFAULT_MAX_ATTEMPTS).unwrap();
        assert_eq!(problem, Problem::new(4, Operator::Divide, 2).unwrap());
        assert_eq!(problem.answer(), 2);
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_out_of_range_triples_are_resampled() {
        let draws = [(5, Operator::Multiply, 5), (1, Operator::Subtract, 3), (2, Operator::Add, 3)];
        let (problem, attempts) = first_valid(draws, DEFAULT_MAX_ATTEMPTS).unwrap();
        assert_eq!(problem.answer(), 5);
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_first_valid_respects_attempt_bound() {
        let draws = [(5, Operator::Multiply, 5), (2, Operator::Add, 3)];
        assert!(first_valid(draws, 1).is_none());
    }

    #[test]
    fn test_exhausted_sampling_falls_back() {
        // Zero attempts skips sampling entirely
        let mut generator = ProblemGenerator::with_rng(StepRng::new(0, 1), 0);
        let problem = generator.generate();
        assert!(valid_problems().contains(&problem));
    }

    #[test]
    fn test_valid_problems_contains_known_cases() {
        let problems = valid_problems();
        assert!(problems.contains(&Problem::new(2, Operator::Add, 3).unwrap()));
        assert!(problems.contains(&Problem::new(0, Operator::Add, 0).unwrap()));
        assert!(!problems.is_empty());
    }
}
