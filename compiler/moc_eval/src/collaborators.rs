//! Interfaces to the phases around the evaluator.
//!
//! The evaluator never executes user function bodies, never simplifies
//! symbolically and never elaborates source syntax itself; it delegates
//! through these traits. The unit-struct defaults make a standalone
//! evaluator usable for pure expression folding.

use moc_ir::{AstExp, Expr};
use moc_values::{not_constant, Value};

use crate::context::EvalContext;
use crate::environment::Env;
use crate::eval_mode::EvalMode;
use crate::EvalOutcome;

/// Executes user-defined (non-builtin) functions.
pub trait CallEvaluator {
    /// Evaluate `call` (an `Expr::Call`) with already evaluated arguments.
    fn call_function(
        &self,
        ctx: EvalContext,
        env: &Env,
        call: &Expr,
        args: Vec<Value>,
        mode: EvalMode,
    ) -> EvalOutcome;
}

/// Symbolic simplification used when an expression is not constant.
pub trait Simplifier {
    fn simplify(&self, expr: Expr) -> Expr;
}

/// Turns untyped syntax into typed IR, for `Eval(...)` splicing.
pub trait Elaborator {
    fn elaborate(&self, env: &Env, ast: &AstExp) -> Option<Expr>;
}

/// Call evaluator that can evaluate nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoCallEvaluator;

impl CallEvaluator for NoCallEvaluator {
    fn call_function(
        &self,
        _ctx: EvalContext,
        _env: &Env,
        _call: &Expr,
        _args: Vec<Value>,
        _mode: EvalMode,
    ) -> EvalOutcome {
        Err(not_constant())
    }
}

/// Returns expressions unchanged.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdentitySimplifier;

impl Simplifier for IdentitySimplifier {
    fn simplify(&self, expr: Expr) -> Expr {
        expr
    }
}

/// Elaborator that rejects everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoElaborator;

impl Elaborator for NoElaborator {
    fn elaborate(&self, _env: &Env, _ast: &AstExp) -> Option<Expr> {
        None
    }
}
