//! Evaluation mode and diagnostic context.
//!
//! The two are independent: `EvalMode` decides what the evaluator is allowed
//! to read, `DiagContext` decides whether a failure becomes a diagnostic.

use moc_ir::Span;

/// How strictly non-constant references are treated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EvalMode {
    /// Interactive or partial evaluation: variables of any constness may be
    /// read, and unbound reads fail silently.
    Implicit,
    /// Translation-time evaluation: only constants and parameters may be
    /// read, and unbound reads are reported.
    #[default]
    Explicit,
}

impl EvalMode {
    /// Whether bindings of non-constant variables may be evaluated.
    #[inline]
    pub fn reads_variables(self) -> bool {
        matches!(self, Self::Implicit)
    }

    /// Whether reading an unbound variable is worth a diagnostic.
    #[inline]
    pub fn reports_unbound(self) -> bool {
        matches!(self, Self::Explicit)
    }
}

/// Whether failures are turned into diagnostics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DiagContext {
    /// Speculative evaluation; failures are only returned.
    #[default]
    Silent,
    /// Failures are reported at this location.
    Reporting(Span),
}

impl DiagContext {
    #[inline]
    pub fn is_reporting(self) -> bool {
        matches!(self, Self::Reporting(_))
    }

    /// Reporting location, if any.
    #[inline]
    pub fn span(self) -> Option<Span> {
        match self {
            Self::Reporting(span) => Some(span),
            Self::Silent => None,
        }
    }
}

#[cfg(test)]
mod tests;
