//! The constant evaluator.
//!
//! # Architecture
//!
//! Every evaluation step goes through [`ConstEvaluator::eval`], which checks
//! the depth counter, counts the step and grows the native stack if needed
//! before dispatching on the expression variant (`expr.rs`). Variants whose
//! evaluation has several overlapping alternatives (calls, casts, logical
//! operators) are dispatched through the ordered rule combinator in
//! `rules.rs`; the first alternative that succeeds wins.
//!
//! The [`EvalContext`] is threaded by value: every step takes it and returns
//! it, possibly extended. Failures are plain `EvalError`s until they reach a
//! reporting boundary (a public entry point, or argument evaluation of a
//! pure call), where the [`DiagContext`] decides whether they become
//! diagnostics.
//!
//! Helper modules:
//! - `expr` - per-variant evaluation, arrays, ranges, indexing
//! - `call` - builtin, known external and user function calls
//! - `cast` - record, numeric and enumeration casts
//! - `logical` - `and`/`or` with short-circuiting, `not`

mod builder;
mod call;
mod cast;
mod expr;
mod logical;
mod rules;

use std::cell::Cell;

pub use builder::ConstEvaluatorBuilder;
pub(crate) use expr::{enum_literal, expected, project_field};

use moc_diagnostic::DiagnosticSink;
use moc_ir::{AstExp, ComponentRef, Dimension, Expr, Type};
use moc_stack::ensure_sufficient_stack;
use moc_values::{recursion_limit_exceeded, EvalError, EvalResult, Value};

use crate::collaborators::{CallEvaluator, Elaborator, Simplifier};
use crate::config::EvalConfig;
use crate::context::EvalContext;
use crate::counters::EvalCounters;
use crate::environment::{Constness, Env};
use crate::eval_mode::{DiagContext, EvalMode};
use crate::print_handler::SharedPrintHandler;
use crate::value_expr::value_to_expr;

/// Result of evaluating one expression: the updated context and the value.
pub type EvalOutcome = EvalResult<(EvalContext, Value)>;

/// Per-call evaluation parameters that stay fixed while descending, apart
/// from the depth and (inside reductions) the environment.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Request<'r> {
    pub(crate) env: &'r Env,
    pub(crate) mode: EvalMode,
    pub(crate) diag: DiagContext,
    pub(crate) depth: usize,
}

impl<'r> Request<'r> {
    pub(crate) fn new(env: &'r Env, mode: EvalMode, diag: DiagContext, depth: usize) -> Self {
        Request {
            env,
            mode,
            diag,
            depth,
        }
    }

    /// The request for a direct sub-expression.
    #[inline]
    #[must_use]
    pub(crate) fn deeper(self) -> Self {
        Request {
            depth: self.depth + 1,
            ..self
        }
    }

    /// The same request in another environment.
    #[inline]
    pub(crate) fn with_env<'n>(self, env: &'n Env) -> Request<'n> {
        Request {
            env,
            mode: self.mode,
            diag: self.diag,
            depth: self.depth,
        }
    }
}

/// Constant-expression evaluator.
///
/// Holds the collaborators and configuration; all evaluation state lives in
/// the [`EvalContext`] passed through each call. Build one with
/// [`ConstEvaluatorBuilder`].
pub struct ConstEvaluator<'a> {
    pub(crate) config: EvalConfig,
    pub(crate) calls: &'a dyn CallEvaluator,
    pub(crate) simplifier: &'a dyn Simplifier,
    pub(crate) elaborator: &'a dyn Elaborator,
    pub(crate) sink: &'a dyn DiagnosticSink,
    pub(crate) print_handler: SharedPrintHandler,
    pub(crate) counters: Option<EvalCounters>,
    /// Depth at which public entry points start. Raised while a user
    /// function call is delegated, so re-entrant evaluation from the call
    /// evaluator keeps counting towards the same limit.
    entry_depth: Cell<usize>,
}

impl<'a> ConstEvaluator<'a> {
    pub fn builder() -> ConstEvaluatorBuilder<'a> {
        ConstEvaluatorBuilder::new()
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Counters, when enabled on the builder.
    pub fn counters(&self) -> Option<&EvalCounters> {
        self.counters.as_ref()
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    fn request<'r>(&self, env: &'r Env, mode: EvalMode, diag: DiagContext) -> Request<'r> {
        Request::new(env, mode, diag, self.entry_depth.get())
    }

    /// Evaluate `expr` to a value.
    ///
    /// Failures are reported through the diagnostic sink when `diag` is
    /// `Reporting` and the failure kind is reportable.
    #[tracing::instrument(level = "trace", skip_all, fields(depth = self.entry_depth.get()))]
    pub fn evaluate(
        &self,
        ctx: EvalContext,
        env: &Env,
        expr: &Expr,
        mode: EvalMode,
        diag: DiagContext,
    ) -> EvalOutcome {
        self.eval_reporting(ctx, self.request(env, mode, diag), expr)
    }

    /// Evaluate a sequence in order, threading the context from each
    /// element to the next.
    pub fn evaluate_list(
        &self,
        ctx: EvalContext,
        env: &Env,
        exprs: &[Expr],
        mode: EvalMode,
        diag: DiagContext,
    ) -> EvalResult<(EvalContext, Vec<Value>)> {
        let req = self.request(env, mode, diag);
        let mut ctx = ctx;
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let (next, value) = self.eval_reporting(ctx, req, expr)?;
            ctx = next;
            values.push(value);
        }
        Ok((ctx, values))
    }

    /// Resolve a component reference and apply its subscripts.
    pub fn evaluate_cref(
        &self,
        ctx: EvalContext,
        env: &Env,
        cref: &ComponentRef,
        mode: EvalMode,
        diag: DiagContext,
    ) -> EvalOutcome {
        let req = self.request(env, mode, diag);
        self.eval_cref(ctx, req, cref, &Type::Unknown)
            .map_err(|err| self.report(err, diag))
    }

    /// Resolve one array dimension to an `Integer`.
    pub fn evaluate_dimension(
        &self,
        ctx: EvalContext,
        env: &Env,
        dim: &Dimension,
        mode: EvalMode,
        diag: DiagContext,
    ) -> EvalOutcome {
        let req = self.request(env, mode, diag);
        let (ctx, size) = self
            .eval_dimension(ctx, req, dim)
            .map_err(|err| self.report(err, diag))?;
        let size = i64::try_from(size)
            .map_err(|_| self.report(moc_values::integer_overflow("dimension size"), diag))?;
        Ok((ctx, Value::Integer(size)))
    }

    /// Fold `expr` if it is constant, otherwise hand it to the simplifier.
    ///
    /// Never fails: this is how earlier phases fold opportunistically.
    pub fn ceval_if_constant(
        &self,
        ctx: EvalContext,
        env: &Env,
        expr: Expr,
        constness: Constness,
        mode: EvalMode,
        diag: DiagContext,
    ) -> (EvalContext, Expr) {
        if !constness.is_evaluable() && !mode.reads_variables() {
            return (ctx, self.simplifier.simplify(expr));
        }
        match self.evaluate(ctx.clone(), env, &expr, mode, diag) {
            Ok((ctx, value)) => match value_to_expr(&value) {
                Some(folded) => (ctx, folded),
                None => (ctx, self.simplifier.simplify(expr)),
            },
            Err(err) => {
                tracing::trace!(%err, "not folded");
                (ctx, self.simplifier.simplify(expr))
            }
        }
    }

    /// Replace every `Eval(e)` in a quoted expression by the value of `e`.
    pub fn splice_ast(
        &self,
        ctx: EvalContext,
        env: &Env,
        ast: &AstExp,
        mode: EvalMode,
        diag: DiagContext,
    ) -> EvalResult<(EvalContext, AstExp)> {
        let req = self.request(env, mode, diag);
        self.splice(ctx, req, ast)
            .map_err(|err| self.report(err, diag))
    }

    /// Evaluate one expression. Every recursive step goes through here.
    pub(crate) fn eval(&self, ctx: EvalContext, req: Request<'_>, expr: &Expr) -> EvalOutcome {
        let limit = self.config.recursion_limit;
        if req.depth > limit {
            return Err(recursion_limit_exceeded(limit));
        }
        if let Some(counters) = &self.counters {
            counters.count_expression();
        }
        ensure_sufficient_stack(|| self.eval_expr(ctx, req, expr))
    }

    /// Evaluate and report a failure according to the request's context.
    pub(crate) fn eval_reporting(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        expr: &Expr,
    ) -> EvalOutcome {
        self.eval(ctx, req, expr)
            .map_err(|err| self.report(err, req.diag))
    }

    /// Evaluate a sequence without reporting.
    pub(crate) fn eval_all(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        exprs: &[Expr],
    ) -> EvalResult<(EvalContext, Vec<Value>)> {
        let mut ctx = ctx;
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let (next, value) = self.eval(ctx, req, expr)?;
            ctx = next;
            values.push(value);
        }
        Ok((ctx, values))
    }

    /// Hand a failure to the sink once, if the context asks for it.
    pub(crate) fn report(&self, err: EvalError, diag: DiagContext) -> EvalError {
        if err.reported {
            return err;
        }
        let wanted =
            (diag.is_reporting() && err.kind.is_reportable()) || err.kind.always_reported();
        if !wanted {
            return err;
        }
        let err = match diag.span() {
            Some(span) => err.with_span(span),
            None => err,
        };
        self.sink.report(err.to_diagnostic());
        err.mark_reported()
    }

    /// Run `f` with public entry points starting at `depth`.
    pub(crate) fn with_entry_depth<R>(&self, depth: usize, f: impl FnOnce() -> R) -> R {
        let saved = self.entry_depth.replace(depth);
        let result = f();
        self.entry_depth.set(saved);
        result
    }
}

#[cfg(test)]
mod tests;
