//! Call expressions.
//!
//! Alternatives, in order:
//! 1. `smooth(0, e)` is `e`
//! 2. builtin functions, through the builtin table
//! 3. known external functions, evaluated directly
//! 4. pure user functions, delegated to the call evaluator
//! 5. impure functions, which are never constant
//!
//! Known external and pure user functions share one evaluation of the
//! arguments, so a failing argument is evaluated once per call no matter
//! how deeply such calls nest.

use moc_ir::{CallAttrs, Expr, Path};
use moc_values::{not_constant, EvalResult, Value};

use super::rules::alt;
use super::{ConstEvaluator, EvalOutcome, Request};
use crate::builtins::{known_external, lookup_builtin};
use crate::context::EvalContext;

impl ConstEvaluator<'_> {
    pub(super) fn eval_call(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        call: &Expr,
        path: &Path,
        args: &[Expr],
        attrs: &CallAttrs,
    ) -> EvalOutcome {
        // The `smooth` builtin stands or falls with `e` as well.
        if let Some(outcome) = self.call_smooth_zero(&ctx, req, path, args, attrs) {
            return outcome;
        }
        self.first_match(&[
            alt("builtin", &|| self.call_builtin(&ctx, req, path, args, attrs)),
            alt("function", &|| self.call_function(&ctx, req, call, path, args, attrs)),
            alt("impure function", &|| attrs.impure.then(|| Err(not_constant()))),
        ])
    }

    fn call_smooth_zero(
        &self,
        ctx: &EvalContext,
        req: Request<'_>,
        path: &Path,
        args: &[Expr],
        attrs: &CallAttrs,
    ) -> Option<EvalOutcome> {
        match args {
            [Expr::Integer(0), e] if attrs.builtin && path.last() == "smooth" => {
                Some(self.eval(ctx.clone(), req, e))
            }
            _ => None,
        }
    }

    fn call_builtin(
        &self,
        ctx: &EvalContext,
        req: Request<'_>,
        path: &Path,
        args: &[Expr],
        attrs: &CallAttrs,
    ) -> Option<EvalOutcome> {
        if !attrs.builtin {
            return None;
        }
        let name = path.last();
        let handler = lookup_builtin(name, self.config.metamodelica())?;
        if let Some(counters) = &self.counters {
            counters.count_builtin_call();
        }
        tracing::debug!(builtin = name, args = args.len(), "builtin call");
        Some(handler.call(self, ctx.clone(), req, args))
    }

    /// Known external functions first, then delegation. Both see the same
    /// argument values.
    fn call_function(
        &self,
        ctx: &EvalContext,
        req: Request<'_>,
        call: &Expr,
        path: &Path,
        args: &[Expr],
        attrs: &CallAttrs,
    ) -> Option<EvalOutcome> {
        if attrs.builtin || attrs.impure {
            return None;
        }
        let (ctx, values) = match self.eval_arguments(ctx.clone(), req, args) {
            Ok(done) => done,
            Err(err) => return Some(Err(err)),
        };
        let external = match known_external(req.env, path) {
            Some((external, handler)) => {
                if let Some(counters) = &self.counters {
                    counters.count_builtin_call();
                }
                tracing::debug!(function = %path, external, "known external call");
                match handler(&values) {
                    Ok(value) => return Some(Ok((ctx, value))),
                    Err(err) => Some(err),
                }
            }
            None => None,
        };
        Some(match (self.delegate_call(ctx, req, call, values), external) {
            (Err(err), Some(prev))
                if !err.is_fatal() && prev.kind.precedence() >= err.kind.precedence() =>
            {
                Err(prev)
            }
            (outcome, _) => outcome,
        })
    }

    /// Evaluate call arguments, reporting their failures.
    fn eval_arguments(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        args: &[Expr],
    ) -> EvalResult<(EvalContext, Vec<Value>)> {
        let mut ctx = ctx;
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let (next, value) = self.eval_reporting(ctx, req, arg)?;
            ctx = next;
            values.push(value);
        }
        Ok((ctx, values))
    }

    fn delegate_call(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        call: &Expr,
        values: Vec<Value>,
    ) -> EvalOutcome {
        if let Some(counters) = &self.counters {
            counters.count_function_call();
        }
        tracing::debug!(call = %call, "delegating function call");
        self.with_entry_depth(req.depth + 1, || {
            self.calls.call_function(ctx, req.env, call, values, req.mode)
        })
    }
}
