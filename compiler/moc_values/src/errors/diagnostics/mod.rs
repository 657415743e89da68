//! Evaluation failure to diagnostic conversion.
//!
//! # Error Code Ranges
//!
//! - E6001–E6013: constant evaluation failures
//! - E9001: internal evaluator error

use moc_diagnostic::{Diagnostic, ErrorCode};

use super::{EvalError, EvalErrorKind};

impl EvalErrorKind {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnboundValue { .. } => ErrorCode::E6001,
            Self::DimensionNotKnown { .. } => ErrorCode::E6002,
            Self::DivisionByZero { .. } => ErrorCode::E6003,
            Self::ModuloByZero { .. } => ErrorCode::E6004,
            Self::RecursionLimitExceeded { .. } => ErrorCode::E6005,
            Self::NegativeSqrt { .. } => ErrorCode::E6006,
            Self::ReductionGuardFailure { .. } => ErrorCode::E6007,
            Self::InvalidCastOrShape { .. } => ErrorCode::E6008,
            Self::IntegerOverflow { .. } => ErrorCode::E6009,
            Self::IterationLimitExceeded { .. } => ErrorCode::E6010,
            Self::InvalidArgument { .. } => ErrorCode::E6011,
            Self::IndexOutOfBounds { .. } => ErrorCode::E6012,
            Self::NotConstant => ErrorCode::E6013,
            Self::InternalError { .. } => ErrorCode::E9001,
        }
    }

    /// Concise label for the primary span.
    pub fn primary_label(&self) -> &'static str {
        match self {
            Self::NotConstant => "not a constant expression",
            Self::UnboundValue { .. } => "no value for this variable",
            Self::DimensionNotKnown { .. } => "dimension not known",
            Self::DivisionByZero { .. } => "division by zero here",
            Self::ModuloByZero { .. } => "modulo by zero here",
            Self::RecursionLimitExceeded { .. } => "recursion limit exceeded here",
            Self::NegativeSqrt { .. } => "negative argument",
            Self::ReductionGuardFailure { .. } => "guard is not a Boolean",
            Self::InvalidCastOrShape { .. } => "invalid cast or shape",
            Self::IntegerOverflow { .. } => "overflow occurred here",
            Self::IndexOutOfBounds { .. } => "index out of bounds",
            Self::IterationLimitExceeded { .. } => "too many iterations",
            Self::InvalidArgument { .. } => "invalid argument",
            Self::InternalError { .. } => "internal error",
        }
    }

    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::UnboundValue { name } => {
                Some(format!("give `{name}` a binding or a default value"))
            }
            Self::RecursionLimitExceeded { .. } => Some(
                "check for a binding that depends on itself, or raise MOC_EVAL_RECURSION_LIMIT"
                    .to_string(),
            ),
            Self::DivisionByZero { .. } | Self::ModuloByZero { .. } => {
                Some("guard the divisor against zero".to_string())
            }
            _ => None,
        }
    }
}

impl EvalError {
    /// Convert into a `Diagnostic` with the E6xxx code of its kind.
    #[cold]
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.kind.error_code()).with_message(&self.message);

        if let Some(span) = self.span {
            diag = diag.with_label(span, self.kind.primary_label());
        }

        for note in &self.notes {
            diag = diag.with_note(note);
        }

        if let Some(suggestion) = self.kind.suggestion() {
            diag = diag.with_suggestion(suggestion);
        }

        diag
    }
}
