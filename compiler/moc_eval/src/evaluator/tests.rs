use moc_ir::{ComponentRef, Expr, Subscript, Type};
use moc_values::{
    division_by_zero, internal_error, invalid_argument, not_constant, recursion_limit_exceeded,
    EvalErrorKind, Value,
};
use pretty_assertions::assert_eq;

use super::rules::alt;
use super::*;
use crate::environment::VarInfo;

fn evaluator() -> ConstEvaluator<'static> {
    ConstEvaluator::builder().config(EvalConfig::default()).build()
}

fn kind_of(outcome: EvalOutcome) -> Result<Value, EvalErrorKind> {
    outcome.map(|(_, v)| v).map_err(|e| e.kind)
}

// Ordered alternatives

#[test]
fn first_success_wins() {
    let ev = evaluator();
    let ctx = EvalContext::new();
    let outcome = ev.first_match(&[
        alt("inapplicable", &|| None),
        alt("fails", &|| Some(Err(invalid_argument("f", "bad")))),
        alt("works", &|| Some(Ok((ctx.clone(), Value::Integer(1))))),
        alt("never tried", &|| Some(Ok((ctx.clone(), Value::Integer(2))))),
    ]);
    assert_eq!(kind_of(outcome), Ok(Value::Integer(1)));
}

#[test]
fn most_significant_failure_is_kept() {
    let ev = evaluator();
    let outcome = ev.first_match(&[
        alt("a", &|| Some(Err(not_constant()))),
        alt("b", &|| Some(Err(division_by_zero("1", "0")))),
        alt("c", &|| Some(Err(not_constant()))),
    ]);
    assert_eq!(
        kind_of(outcome),
        Err(EvalErrorKind::DivisionByZero {
            numerator: "1".into(),
            denominator: "0".into(),
        })
    );

    let outcome = ev.first_match(&[
        alt("a", &|| Some(Err(internal_error("broken")))),
        alt("b", &|| Some(Err(division_by_zero("1", "0")))),
    ]);
    assert!(matches!(
        kind_of(outcome),
        Err(EvalErrorKind::InternalError { .. })
    ));
}

#[test]
fn fatal_failures_stop_the_search() {
    let ev = evaluator();
    let ctx = EvalContext::new();
    let outcome = ev.first_match(&[
        alt("deep", &|| Some(Err(recursion_limit_exceeded(4)))),
        alt("would work", &|| Some(Ok((ctx.clone(), Value::Integer(1))))),
    ]);
    assert_eq!(
        kind_of(outcome),
        Err(EvalErrorKind::RecursionLimitExceeded { limit: 4 })
    );
}

#[test]
fn nothing_applicable_is_not_constant() {
    let ev = evaluator();
    let outcome = ev.first_match(&[alt("a", &|| None), alt("b", &|| None)]);
    assert_eq!(kind_of(outcome), Err(EvalErrorKind::NotConstant));
}

// Entry points

fn param_env() -> Env {
    Env::new()
        .push_scope("M", crate::environment::ScopeKind::Class)
        .with_var(
            "n",
            VarInfo::bound(
                Type::Integer,
                Constness::Param,
                Expr::binary(Expr::int(1), moc_ir::BinaryOp::Add, Expr::int(2)),
            ),
        )
        .with_var(
            "v",
            VarInfo::value(
                Type::array(Type::Integer, &[3]),
                Value::array(vec![Value::Integer(7), Value::Integer(8), Value::Integer(9)]),
            ),
        )
}

#[test]
fn evaluate_list_threads_the_context() {
    let ev = evaluator();
    let exprs = [Expr::cref("n"), Expr::int(5), Expr::cref("n")];
    let result = ev.evaluate_list(
        EvalContext::new(),
        &param_env(),
        &exprs,
        EvalMode::Explicit,
        DiagContext::Silent,
    );
    let (ctx, values) = match result {
        Ok(done) => done,
        Err(err) => panic!("list should evaluate: {err}"),
    };
    assert_eq!(
        values,
        vec![Value::Integer(3), Value::Integer(5), Value::Integer(3)]
    );
    assert_eq!(ctx.constant_count(), 1);
}

#[test]
fn evaluate_list_stops_at_the_first_failure() {
    let ev = evaluator();
    let exprs = [Expr::int(1), Expr::cref("missing"), Expr::int(2)];
    let result = ev.evaluate_list(
        EvalContext::new(),
        &Env::new(),
        &exprs,
        EvalMode::Explicit,
        DiagContext::Silent,
    );
    assert_eq!(
        result.map(|(_, v)| v).map_err(|e| e.kind),
        Err(EvalErrorKind::NotConstant)
    );
}

#[test]
fn evaluate_cref_applies_subscripts() {
    let ev = evaluator();
    let cref = ComponentRef::ident("v").with_subscripts(vec![Subscript::Index(Expr::int(2))]);
    let outcome = ev.evaluate_cref(
        EvalContext::new(),
        &param_env(),
        &cref,
        EvalMode::Explicit,
        DiagContext::Silent,
    );
    assert_eq!(kind_of(outcome), Ok(Value::Integer(8)));
}

#[test]
fn evaluate_dimension_of_static_sizes() {
    let ev = evaluator();
    let dim = |d: &Dimension| {
        kind_of(ev.evaluate_dimension(
            EvalContext::new(),
            &Env::new(),
            d,
            EvalMode::Explicit,
            DiagContext::Silent,
        ))
    };
    assert_eq!(dim(&Dimension::Known(3)), Ok(Value::Integer(3)));
    assert_eq!(dim(&Dimension::Boolean), Ok(Value::Integer(2)));
    assert!(matches!(
        dim(&Dimension::Unknown),
        Err(EvalErrorKind::DimensionNotKnown { .. })
    ));
    assert!(matches!(
        dim(&Dimension::Exp(Box::new(Expr::int(-1)))),
        Err(EvalErrorKind::InvalidArgument { .. })
    ));
}

#[test]
fn ceval_if_constant_folds_constants() {
    let ev = evaluator();
    let (ctx, folded) = ev.ceval_if_constant(
        EvalContext::new(),
        &param_env(),
        Expr::binary(Expr::cref("n"), moc_ir::BinaryOp::Mul, Expr::int(2)),
        Constness::Param,
        EvalMode::Explicit,
        DiagContext::Silent,
    );
    assert_eq!(folded, Expr::int(6));
    assert_eq!(ctx.constant_count(), 1);
}

#[test]
fn ceval_if_constant_leaves_the_rest_to_the_simplifier() {
    let ev = evaluator();
    let open = Expr::binary(Expr::cref("free"), moc_ir::BinaryOp::Add, Expr::int(1));
    let (_, kept) = ev.ceval_if_constant(
        EvalContext::new(),
        &Env::new(),
        open.clone(),
        Constness::Const,
        EvalMode::Explicit,
        DiagContext::Silent,
    );
    assert_eq!(kept, open);

    // Variables are not folded unless the mode reads them.
    let constant = Expr::int(1);
    let (_, kept) = ev.ceval_if_constant(
        EvalContext::new(),
        &Env::new(),
        constant.clone(),
        Constness::Var,
        EvalMode::Explicit,
        DiagContext::Silent,
    );
    assert_eq!(kept, constant);
}

#[test]
fn builder_defaults() {
    let ev = evaluator();
    assert!(ev.counters().is_none());
    assert_eq!(ev.config().recursion_limit, crate::DEFAULT_RECURSION_LIMIT);
    assert_eq!(ev.print_handler().get_output(), "");
}
