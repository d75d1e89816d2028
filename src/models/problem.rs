//! Arithmetic problem data structures.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest operand a problem may use.
pub const MAX_OPERAND: u8 = 5;

/// Smallest valid answer.
pub const MIN_ANSWER: u8 = 0;

/// Largest valid answer (one hand).
pub const MAX_ANSWER: u8 = 5;

/// Arithmetic operator of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Addition
    #[serde(rename = "+")]
    Add,
    /// Subtraction
    #[serde(rename = "-")]
    Subtract,
    /// Multiplication
    #[serde(rename = "*")]
    Multiply,
    /// Floor division
    #[serde(rename = "/")]
    Divide,
}

impl Operator {
    /// All operators, in sampling order.
    pub const ALL: [Self; 4] = [Self::Add, Self::Subtract, Self::Multiply, Self::Divide];

    /// Returns the symbol shown to the user.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }

    /// Applies the operator.
    ///
    /// Division floors (operands are non-negative) and returns `None` for a
    /// zero divisor.
    #[must_use]
    pub fn apply(self, lhs: u8, rhs: u8) -> Option<i32> {
        let (lhs, rhs) = (i32::from(lhs), i32::from(rhs));
        match self {
            Self::Add => Some(lhs + rhs),
            Self::Subtract => Some(lhs - rhs),
            Self::Multiply => Some(lhs * rhs),
            Self::Divide => lhs.checked_div(rhs),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// An arithmetic problem whose answer can be shown with fingers.
///
/// # Invariants
///
/// - `answer` is in `MIN_ANSWER..=MAX_ANSWER`
/// - `operand2` is never zero for [`Operator::Divide`]
///
/// Problems are only built through [`Problem::new`] and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Problem {
    operand1: u8,
    operand2: u8,
    operator: Operator,
    answer: u8,
}

impl Problem {
    /// Builds a problem, or `None` when the triple has no valid answer.
    #[must_use]
    pub fn new(operand1: u8, operator: Operator, operand2: u8) -> Option<Self> {
        let value = operator.apply(operand1, operand2)?;
        let answer = u8::try_from(value).ok()?;
        if !(MIN_ANSWER..=MAX_ANSWER).contains(&answer) {
            return None;
        }
        Some(Self {
            operand1,
            operand2,
            operator,
            answer,
        })
    }

    /// Left operand.
    #[must_use]
    pub const fn operand1(&self) -> u8 {
        self.operand1
    }

    /// Right operand.
    #[must_use]
    pub const fn operand2(&self) -> u8 {
        self.operand2
    }

    /// Operator.
    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    /// Expected finger count.
    #[must_use]
    pub const fn answer(&self) -> u8 {
        self.answer
    }

    /// Text shown to the user, e.g. `"2 + 3 = ?"`.
    #[must_use]
    pub fn prompt(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} = ?",
            self.operand1, self.operator, self.operand2
        )
    }
}
