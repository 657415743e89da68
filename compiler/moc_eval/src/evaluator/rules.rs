//! Ordered alternatives.
//!
//! An alternative returns `None` when it does not apply to the expression
//! at all, `Some(Ok(..))` when it evaluated it, and `Some(Err(..))` when it
//! applied but failed. A failed alternative is abandoned silently and the
//! next one is tried; only a fatal failure stops the search.

use moc_values::{not_constant, EvalError};

use super::{ConstEvaluator, EvalOutcome};

/// One named alternative.
pub(crate) struct Alternative<'f> {
    name: &'static str,
    run: &'f dyn Fn() -> Option<EvalOutcome>,
}

pub(crate) fn alt<'f>(
    name: &'static str,
    run: &'f dyn Fn() -> Option<EvalOutcome>,
) -> Alternative<'f> {
    Alternative { name, run }
}

impl ConstEvaluator<'_> {
    /// Try `alternatives` in order; the first success wins.
    ///
    /// When all fail, the most significant failure is returned (see
    /// `EvalErrorKind::precedence`), and `NotConstant` when none applied.
    pub(crate) fn first_match(&self, alternatives: &[Alternative<'_>]) -> EvalOutcome {
        let mut failure: Option<EvalError> = None;
        for alternative in alternatives {
            match (alternative.run)() {
                None => {}
                Some(Ok(done)) => return Ok(done),
                Some(Err(err)) if err.is_fatal() => return Err(err),
                Some(Err(err)) => {
                    if self.config.trace() {
                        tracing::debug!(
                            alternative = alternative.name,
                            %err,
                            "alternative abandoned"
                        );
                    }
                    failure = Some(match failure {
                        Some(prev) if prev.kind.precedence() >= err.kind.precedence() => prev,
                        _ => err,
                    });
                }
            }
        }
        Err(failure.unwrap_or_else(not_constant))
    }
}
