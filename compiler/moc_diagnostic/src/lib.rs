//! Diagnostic system for evaluation failures.
//!
//! The evaluator never formats or prints errors itself. It classifies a
//! failure, turns it into a [`Diagnostic`] (error code, message, primary
//! label, notes) and hands it to a [`DiagnosticSink`]. What the sink does with
//! it (queueing, rendering, discarding) is up to the embedding compiler.

mod diagnostic;
mod error_code;
pub mod queue;
mod sink;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
pub use sink::{CollectingSink, DiagnosticSink, NullSink};
