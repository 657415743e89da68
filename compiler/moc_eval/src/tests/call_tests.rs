//! User function calls delegated to the call evaluator, and the depth
//! guard.

use std::cell::Cell;

use moc_diagnostic::CollectingSink;
use moc_ir::{BinaryOp, CallAttrs, Expr, Path, Span, UnaryOp};
use moc_values::{EvalErrorKind, Value};
use pretty_assertions::assert_eq;

use super::{eval_with, evaluator};
use crate::{
    CallEvaluator, ConstEvaluator, DiagContext, Env, EvalConfig, EvalContext, EvalFlags, EvalMode,
    EvalOutcome,
};

/// Doubles its only Integer argument and counts how often it ran.
#[derive(Default)]
struct Doubler {
    calls: Cell<usize>,
}

impl CallEvaluator for Doubler {
    fn call_function(
        &self,
        ctx: EvalContext,
        _env: &Env,
        _call: &Expr,
        args: Vec<Value>,
        _mode: EvalMode,
    ) -> EvalOutcome {
        self.calls.set(self.calls.get() + 1);
        match args.as_slice() {
            [Value::Integer(n)] => Ok((ctx, Value::Integer(n * 2))),
            _ => Err(moc_values::not_constant()),
        }
    }
}

fn user_call(arg: Expr) -> Expr {
    Expr::call(Path::parse("P.double"), vec![arg])
}

#[test]
fn pure_calls_are_delegated_with_evaluated_arguments() {
    let doubler = Doubler::default();
    let ev = ConstEvaluator::builder()
        .config(EvalConfig::default())
        .calls(&doubler)
        .with_counters()
        .build();
    let expr = user_call(Expr::binary(Expr::int(20), BinaryOp::Add, Expr::int(1)));
    assert_eq!(
        eval_with(&ev, &Env::new(), &expr, EvalMode::Explicit),
        Ok(Value::Integer(42))
    );
    assert_eq!(doubler.calls.get(), 1);
    assert_eq!(ev.counters().unwrap().function_calls(), 1);
}

#[test]
fn without_a_call_evaluator_calls_are_not_constant() {
    let ev = evaluator(EvalFlags::empty());
    assert_eq!(
        eval_with(&ev, &Env::new(), &user_call(Expr::int(1)), EvalMode::Explicit)
            .map_err(|e| e.kind),
        Err(EvalErrorKind::NotConstant)
    );
}

#[test]
fn impure_calls_are_never_delegated() {
    let doubler = Doubler::default();
    let ev = ConstEvaluator::builder()
        .config(EvalConfig::default())
        .calls(&doubler)
        .build();
    let expr = Expr::Call {
        path: Path::parse("P.random"),
        args: vec![Expr::int(1)],
        attrs: CallAttrs {
            impure: true,
            ..CallAttrs::default()
        },
    };
    assert_eq!(
        eval_with(&ev, &Env::new(), &expr, EvalMode::Implicit).map_err(|e| e.kind),
        Err(EvalErrorKind::NotConstant)
    );
    assert_eq!(doubler.calls.get(), 0);
}

#[test]
fn argument_failures_are_reported_once() {
    let doubler = Doubler::default();
    let sink = CollectingSink::new();
    let ev = ConstEvaluator::builder()
        .config(EvalConfig::default())
        .calls(&doubler)
        .sink(&sink)
        .build();
    let expr = user_call(Expr::binary(Expr::int(1), BinaryOp::Div, Expr::int(0)));
    let result = ev.evaluate(
        EvalContext::new(),
        &Env::new(),
        &expr,
        EvalMode::Explicit,
        DiagContext::Reporting(Span::new(0, 12)),
    );
    let err = result.map(|(_, v)| v).unwrap_err();
    assert!(err.reported);
    assert!(matches!(err.kind, EvalErrorKind::DivisionByZero { .. }));
    assert_eq!(sink.len(), 1);
    assert_eq!(doubler.calls.get(), 0);
}

fn nested_negations(depth: usize) -> Expr {
    (0..depth).fold(Expr::int(1), |e, _| Expr::unary(UnaryOp::Minus, e))
}

#[test]
fn deep_nesting_hits_the_recursion_limit() {
    let ev = ConstEvaluator::builder()
        .config(EvalConfig::default().with_recursion_limit(256))
        .build();
    assert_eq!(
        eval_with(&ev, &Env::new(), &nested_negations(300), EvalMode::Implicit)
            .map_err(|e| e.kind),
        Err(EvalErrorKind::RecursionLimitExceeded { limit: 256 })
    );

    let ev = ConstEvaluator::builder()
        .config(EvalConfig::default().with_recursion_limit(1000))
        .build();
    assert_eq!(
        eval_with(&ev, &Env::new(), &nested_negations(300), EvalMode::Implicit),
        Ok(Value::Integer(1))
    );
}

#[test]
fn recursion_failures_are_always_fatal() {
    // A failing first alternative must not hide the limit behind a later one.
    let ev = ConstEvaluator::builder()
        .config(EvalConfig::default().with_recursion_limit(8))
        .build();
    let expr = Expr::builtin_call("abs", vec![nested_negations(20)]);
    assert_eq!(
        eval_with(&ev, &Env::new(), &expr, EvalMode::Implicit).map_err(|e| e.kind),
        Err(EvalErrorKind::RecursionLimitExceeded { limit: 8 })
    );
}
