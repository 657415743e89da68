//! `ConstEvaluatorBuilder` for assembling an evaluator from its collaborators.

use std::cell::Cell;

use moc_diagnostic::{DiagnosticSink, NullSink};

use super::ConstEvaluator;
use crate::collaborators::{
    CallEvaluator, Elaborator, IdentitySimplifier, NoCallEvaluator, NoElaborator, Simplifier,
};
use crate::config::EvalConfig;
use crate::counters::EvalCounters;
use crate::print_handler::{stdout_handler, SharedPrintHandler};

static NO_CALLS: NoCallEvaluator = NoCallEvaluator;
static IDENTITY: IdentitySimplifier = IdentitySimplifier;
static NO_ELABORATION: NoElaborator = NoElaborator;
static DISCARD: NullSink = NullSink;

/// Builder for [`ConstEvaluator`].
///
/// Every collaborator is optional. Without them the evaluator folds pure
/// expressions only: user function calls are not constant, `Eval(...)`
/// splicing fails, diagnostics are dropped and `print` writes to stdout.
pub struct ConstEvaluatorBuilder<'a> {
    config: EvalConfig,
    calls: &'a dyn CallEvaluator,
    simplifier: &'a dyn Simplifier,
    elaborator: &'a dyn Elaborator,
    sink: &'a dyn DiagnosticSink,
    print_handler: Option<SharedPrintHandler>,
    counters: bool,
}

impl Default for ConstEvaluatorBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ConstEvaluatorBuilder<'a> {
    /// Start from the process-wide configuration.
    pub fn new() -> Self {
        ConstEvaluatorBuilder {
            config: EvalConfig::global(),
            calls: &NO_CALLS,
            simplifier: &IDENTITY,
            elaborator: &NO_ELABORATION,
            sink: &DISCARD,
            print_handler: None,
            counters: false,
        }
    }

    /// Override the configuration for this evaluator only.
    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the executor for user-defined functions.
    #[must_use]
    pub fn calls(mut self, calls: &'a dyn CallEvaluator) -> Self {
        self.calls = calls;
        self
    }

    #[must_use]
    pub fn simplifier(mut self, simplifier: &'a dyn Simplifier) -> Self {
        self.simplifier = simplifier;
        self
    }

    #[must_use]
    pub fn elaborator(mut self, elaborator: &'a dyn Elaborator) -> Self {
        self.elaborator = elaborator;
        self
    }

    /// Set where reported failures go.
    #[must_use]
    pub fn sink(mut self, sink: &'a dyn DiagnosticSink) -> Self {
        self.sink = sink;
        self
    }

    /// Set the print handler used by `print`. Default is stdout.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Enable evaluation counters.
    #[must_use]
    pub fn with_counters(mut self) -> Self {
        self.counters = true;
        self
    }

    pub fn build(self) -> ConstEvaluator<'a> {
        ConstEvaluator {
            config: self.config,
            calls: self.calls,
            simplifier: self.simplifier,
            elaborator: self.elaborator,
            sink: self.sink,
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
            counters: self.counters.then(EvalCounters::new),
            entry_depth: Cell::new(0),
        }
    }
}
