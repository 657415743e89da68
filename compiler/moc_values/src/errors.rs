//! Evaluation failures.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` is the closed set of ways constant evaluation can fail.
//! Factory functions (`not_constant()`, `division_by_zero(..)`, ...) are the
//! public construction API and fill in both `kind` and `message`.
//!
//! Not every failure is an error in the user's model: `NotConstant` only
//! means "leave this expression symbolic", and drives backtracking between
//! evaluation alternatives. Each kind classifies itself so the evaluator can
//! decide whether to keep trying, and whether to report.

mod diagnostics;

use std::fmt;

use moc_ir::Span;

/// Result of a fallible evaluation step.
pub type EvalResult<T> = Result<T, EvalError>;

/// Typed failure category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// The expression depends on something that is not known at compile
    /// time, or no evaluation rule applies.
    NotConstant,
    /// Variable has no binding and no default.
    UnboundValue { name: String },
    /// `size` or a declared dimension could not be resolved.
    DimensionNotKnown { expr: String },
    DivisionByZero {
        numerator: String,
        denominator: String,
    },
    ModuloByZero {
        numerator: String,
        denominator: String,
    },
    RecursionLimitExceeded { limit: usize },
    NegativeSqrt { value: String },
    /// A reduction guard evaluated to something other than a Boolean.
    ReductionGuardFailure { guard: String },
    InvalidCastOrShape { message: String },
    IntegerOverflow { operation: String },
    IndexOutOfBounds { index: i64, len: usize },
    /// A reduction's cross product exceeded the iteration cap.
    IterationLimitExceeded { limit: usize },
    InvalidArgument { function: String, message: String },
    /// An invariant established by the type checker does not hold.
    InternalError { message: String },
}

impl EvalErrorKind {
    /// Fatal failures abort the whole evaluation instead of letting the
    /// next alternative be tried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::RecursionLimitExceeded { .. })
    }

    /// Whether a reporting context turns this failure into a diagnostic.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::NotConstant | Self::IndexOutOfBounds { .. })
    }

    /// Reported even in a silent context.
    pub fn always_reported(&self) -> bool {
        matches!(self, Self::InternalError { .. })
    }

    /// Significance used to pick which failure to surface when every
    /// alternative failed. Higher wins.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::NotConstant => 0,
            Self::IndexOutOfBounds { .. } => 1,
            Self::UnboundValue { .. } | Self::DimensionNotKnown { .. } => 2,
            Self::DivisionByZero { .. }
            | Self::ModuloByZero { .. }
            | Self::NegativeSqrt { .. }
            | Self::ReductionGuardFailure { .. }
            | Self::InvalidCastOrShape { .. }
            | Self::IntegerOverflow { .. }
            | Self::IterationLimitExceeded { .. }
            | Self::InvalidArgument { .. } => 3,
            Self::InternalError { .. } => 4,
            Self::RecursionLimitExceeded { .. } => 5,
        }
    }
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConstant => write!(f, "expression is not constant"),
            Self::UnboundValue { name } => {
                write!(f, "variable `{name}` has no value and no default")
            }
            Self::DimensionNotKnown { expr } => {
                write!(f, "dimension of `{expr}` is not known")
            }
            Self::DivisionByZero {
                numerator,
                denominator,
            } => write!(f, "division by zero in `{numerator} / {denominator}`"),
            Self::ModuloByZero {
                numerator,
                denominator,
            } => write!(f, "modulo by zero in `mod({numerator}, {denominator})`"),
            Self::RecursionLimitExceeded { limit } => {
                write!(f, "evaluation recursion limit of {limit} exceeded")
            }
            Self::NegativeSqrt { value } => {
                write!(f, "square root of negative number {value}")
            }
            Self::ReductionGuardFailure { guard } => {
                write!(f, "reduction guard `{guard}` did not evaluate to a Boolean")
            }
            Self::InvalidCastOrShape { message } => write!(f, "{message}"),
            Self::IntegerOverflow { operation } => {
                write!(f, "integer overflow in {operation}")
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for dimension of size {len}")
            }
            Self::IterationLimitExceeded { limit } => {
                write!(f, "reduction exceeds {limit} iterations")
            }
            Self::InvalidArgument { function, message } => {
                write!(f, "invalid argument to `{function}`: {message}")
            }
            Self::InternalError { message } => {
                write!(f, "internal evaluator error: {message}")
            }
        }
    }
}

/// Evaluation failure.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory-made errors.
    pub message: String,
    /// Location the failure was reported at.
    pub span: Option<Span>,
    pub notes: Vec<String>,
    /// Set once the failure has been handed to a diagnostic sink.
    pub reported: bool,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            span: None,
            notes: Vec::new(),
            reported: false,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    #[must_use]
    pub fn mark_reported(mut self) -> Self {
        self.reported = true;
        self
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }

    #[inline]
    pub fn is_not_constant(&self) -> bool {
        self.kind == EvalErrorKind::NotConstant
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

/// The expression cannot be evaluated at compile time.
#[cold]
pub fn not_constant() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotConstant)
}

#[cold]
pub fn unbound_value(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnboundValue {
        name: name.to_string(),
    })
}

#[cold]
pub fn dimension_not_known(expr: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DimensionNotKnown {
        expr: expr.to_string(),
    })
}

/// Division by an exact zero; operands are the printed expressions.
#[cold]
pub fn division_by_zero(numerator: &str, denominator: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero {
        numerator: numerator.to_string(),
        denominator: denominator.to_string(),
    })
}

#[cold]
pub fn modulo_by_zero(numerator: &str, denominator: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ModuloByZero {
        numerator: numerator.to_string(),
        denominator: denominator.to_string(),
    })
}

#[cold]
pub fn recursion_limit_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecursionLimitExceeded { limit })
}

#[cold]
pub fn negative_sqrt(value: f64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NegativeSqrt {
        value: moc_ir::format_real(value),
    })
}

#[cold]
pub fn reduction_guard_failure(guard: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReductionGuardFailure {
        guard: guard.to_string(),
    })
}

#[cold]
pub fn invalid_cast_or_shape(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidCastOrShape {
        message: message.into(),
    })
}

#[cold]
pub fn integer_overflow(operation: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow {
        operation: operation.to_string(),
    })
}

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, len })
}

#[cold]
pub fn iteration_limit_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IterationLimitExceeded { limit })
}

#[cold]
pub fn invalid_argument(function: &str, message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidArgument {
        function: function.to_string(),
        message: message.into(),
    })
}

#[cold]
pub fn internal_error(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InternalError {
        message: message.into(),
    })
}

#[cfg(test)]
mod tests;
