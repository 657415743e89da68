//! Moc Eval - constant-expression evaluator for the moc typed IR.
//!
//! Reduces elaborated expressions to [`Value`]s during model translation:
//! literals, operators, relations, casts, component references into the
//! scope chain, builtin and known external calls, reductions and quoted code
//! splicing. User function bodies, symbolic simplification and elaboration
//! are delegated to the [`CallEvaluator`], [`Simplifier`] and [`Elaborator`]
//! collaborators.
//!
//! # Architecture
//!
//! - [`ConstEvaluator`]: recursive dispatch with a depth guard, built with
//!   [`ConstEvaluatorBuilder`]
//! - [`EvalContext`]: evaluation state threaded by value through every step
//! - [`Env`]: persistent scope chain with variable and class lookup
//! - [`EvalMode`] / [`DiagContext`]: which variables may be read and whether
//!   failures become diagnostics
//! - `builtins`: static name → handler tables, including the MetaModelica
//!   group gated by [`EvalFlags::METAMODELICA`]
//!
//! # Example
//!
//! ```
//! use moc_eval::{ConstEvaluator, DiagContext, Env, EvalConfig, EvalContext, EvalMode};
//! use moc_eval::{BinaryOp, Expr, Value};
//!
//! let ev = ConstEvaluator::builder().config(EvalConfig::default()).build();
//! let expr = Expr::binary(Expr::int(1), BinaryOp::Add, Expr::int(2));
//! let (_, value) = ev
//!     .evaluate(EvalContext::new(), &Env::new(), &expr, EvalMode::Implicit, DiagContext::Silent)
//!     .unwrap();
//! assert_eq!(value, Value::Integer(3));
//! ```

mod builtins;
mod collaborators;
mod config;
mod context;
mod counters;
mod cref;
mod environment;
mod eval_mode;
mod evaluator;
mod operators;
mod print_handler;
mod quote;
mod reduction;
mod relations;
mod shape;
mod value_expr;

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;

use std::sync::Once;

pub use builtins::{is_known_external_func, BASE_BUILTINS, METAMODELICA_BUILTINS};
pub use collaborators::{
    CallEvaluator, Elaborator, IdentitySimplifier, NoCallEvaluator, NoElaborator, Simplifier,
};
pub use config::{EvalConfig, EvalFlags, DEFAULT_RECURSION_LIMIT};
pub use context::{EvalContext, FunctionTable};
pub use counters::EvalCounters;
pub use environment::{
    Binding, ClassDef, Constness, Env, ExternalDecl, FunctionDef, RecordDef, RecordFieldDecl,
    ScopeKind, VarInfo, VarLookup,
};
pub use eval_mode::{DiagContext, EvalMode};
pub use evaluator::{ConstEvaluator, ConstEvaluatorBuilder, EvalOutcome};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler,
};

pub use moc_diagnostic::{CollectingSink, Diagnostic, DiagnosticSink, ErrorCode, NullSink};
pub use moc_ir::{
    AstExp, BinaryOp, CodeFragment, ComponentRef, Dimension, Expr, Path, RelationOp, Span, Type,
    UnaryOp,
};
pub use moc_values::{EvalError, EvalErrorKind, EvalResult, Value};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call more than once. Does nothing unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=moc_eval=debug` or `RUST_LOG=moc_eval=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
