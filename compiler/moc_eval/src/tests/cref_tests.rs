//! Component references: bindings, caching, unbound variables, record
//! defaults and subscripted references.

use moc_ir::{BinaryOp, Dimension, Expr, Path, Subscript, Type};
use moc_values::{EvalErrorKind, Value};
use pretty_assertions::assert_eq;

use super::{cref_sub, eval_with, evaluator, int_exprs, ints};
use crate::{
    ClassDef, ConstEvaluator, Constness, DiagContext, Env, EvalConfig, EvalContext, EvalFlags,
    EvalMode, RecordDef, RecordFieldDecl, ScopeKind, VarInfo,
};

fn plus(lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(lhs, BinaryOp::Add, rhs)
}

#[test]
fn value_bindings() {
    let env = Env::new().with_var("x", VarInfo::value(Type::Integer, Value::Integer(3)));
    let ev = evaluator(EvalFlags::empty());
    let expr = plus(Expr::cref("x"), Expr::int(1));
    assert_eq!(eval_with(&ev, &env, &expr, EvalMode::Explicit), Ok(Value::Integer(4)));
}

#[test]
fn variables_are_only_read_in_implicit_mode() {
    let env = Env::new()
        .with_var("p", VarInfo::bound(Type::Real, Constness::Param, Expr::real(2.0)))
        .with_var("v", VarInfo::bound(Type::Real, Constness::Var, Expr::real(3.0)));
    let ev = evaluator(EvalFlags::empty());

    let p = Expr::cref("p");
    let v = Expr::cref("v");
    assert_eq!(eval_with(&ev, &env, &p, EvalMode::Explicit), Ok(Value::Real(2.0)));
    assert_eq!(
        eval_with(&ev, &env, &v, EvalMode::Explicit).map_err(|e| e.kind),
        Err(EvalErrorKind::NotConstant)
    );
    assert_eq!(eval_with(&ev, &env, &v, EvalMode::Implicit), Ok(Value::Real(3.0)));
}

#[test]
fn forced_bindings_are_remembered() {
    let env = Env::new().push_scope("M", ScopeKind::Class).with_var(
        "n",
        VarInfo::bound(
            Type::Integer,
            Constness::Param,
            plus(Expr::int(1), Expr::int(2)),
        ),
    );
    let ev = evaluator(EvalFlags::empty());
    let (ctx, value) = ev
        .evaluate(
            EvalContext::new(),
            &env,
            &Expr::cref("n"),
            EvalMode::Explicit,
            DiagContext::Silent,
        )
        .unwrap();
    assert_eq!(value, Value::Integer(3));
    assert_eq!(ctx.constant_count(), 1);
    assert_eq!(ctx.constant("M.n"), Some(&Value::Integer(3)));
}

#[test]
fn bindings_evaluate_in_their_declaring_scope() {
    let outer = Env::new()
        .with_var("n", VarInfo::value(Type::Integer, Value::Integer(2)))
        .with_var(
            "m",
            VarInfo::bound(
                Type::Integer,
                Constness::Param,
                Expr::binary(Expr::cref("n"), BinaryOp::Mul, Expr::int(3)),
            ),
        );
    let inner = outer
        .push_scope("f", ScopeKind::Function)
        .with_var("n", VarInfo::value(Type::Integer, Value::Integer(100)));
    let ev = evaluator(EvalFlags::empty());
    assert_eq!(
        eval_with(&ev, &inner, &Expr::cref("m"), EvalMode::Explicit),
        Ok(Value::Integer(6))
    );
}

#[test]
fn self_referencing_bindings_stop_immediately() {
    let env = Env::new().with_var(
        "x",
        VarInfo::bound(
            Type::Integer,
            Constness::Param,
            plus(Expr::cref("x"), Expr::int(1)),
        ),
    );
    let ev = ConstEvaluator::builder()
        .config(EvalConfig::default())
        .with_counters()
        .build();
    assert_eq!(
        eval_with(&ev, &env, &Expr::cref("x"), EvalMode::Explicit).map_err(|e| e.kind),
        Err(EvalErrorKind::NotConstant)
    );
    let counters = ev.counters().unwrap();
    assert_eq!(counters.crefs(), 1);
    assert!(counters.expressions() <= 2);
}

#[test]
fn mutually_recursive_bindings_hit_the_recursion_limit() {
    let env = Env::new()
        .with_var("a", VarInfo::bound(Type::Integer, Constness::Param, Expr::cref("b")))
        .with_var("b", VarInfo::bound(Type::Integer, Constness::Param, Expr::cref("a")));
    let ev = ConstEvaluator::builder()
        .config(EvalConfig::default().with_recursion_limit(50))
        .build();
    assert_eq!(
        eval_with(&ev, &env, &Expr::cref("a"), EvalMode::Explicit).map_err(|e| e.kind),
        Err(EvalErrorKind::RecursionLimitExceeded { limit: 50 })
    );
}

#[test]
fn unbound_variables_depend_on_the_mode() {
    let env = Env::new().with_var("k", VarInfo::unbound(Type::Real, Constness::Param));
    let ev = evaluator(EvalFlags::empty());
    let k = Expr::cref("k");
    assert_eq!(
        eval_with(&ev, &env, &k, EvalMode::Explicit).map_err(|e| e.kind),
        Err(EvalErrorKind::UnboundValue { name: "k".into() })
    );
    assert_eq!(
        eval_with(&ev, &env, &k, EvalMode::Implicit).map_err(|e| e.kind),
        Err(EvalErrorKind::NotConstant)
    );
}

#[test]
fn deferred_unbound_variables_become_placeholders() {
    let env = Env::new()
        .push_scope("M", ScopeKind::Class)
        .with_var("k", VarInfo::unbound(Type::Real, Constness::Param));
    let ev = evaluator(EvalFlags::DEFER_UNBOUND);
    let k = Expr::cref("k");
    assert_eq!(
        eval_with(&ev, &env, &k, EvalMode::Explicit),
        Ok(Value::empty("M", "k", Type::Real))
    );
    // A placeholder never takes part in arithmetic.
    assert_eq!(
        eval_with(&ev, &env, &plus(k, Expr::real(1.0)), EvalMode::Explicit).map_err(|e| e.kind),
        Err(EvalErrorKind::NotConstant)
    );
}

fn record_env() -> Env {
    let def = RecordDef {
        path: Path::parse("R"),
        fields: vec![
            RecordFieldDecl {
                name: "a".into(),
                ty: Type::Integer,
                default: Some(Expr::int(1)),
            },
            RecordFieldDecl {
                name: "b".into(),
                ty: Type::Integer,
                default: Some(plus(Expr::cref("a"), Expr::int(1))),
            },
        ],
    };
    Env::new().with_class(ClassDef::Record(def)).with_var(
        "r",
        VarInfo::unbound(
            Type::Record {
                path: Path::parse("R"),
            },
            Constness::Param,
        ),
    )
}

#[test]
fn unbound_records_are_built_from_field_defaults() {
    let ev = evaluator(EvalFlags::empty());
    let env = record_env();
    assert_eq!(
        eval_with(&ev, &env, &Expr::cref("r"), EvalMode::Explicit),
        Ok(Value::record(
            Path::parse("R"),
            vec![Value::Integer(1), Value::Integer(2)],
            vec!["a".into(), "b".into()],
            -1,
        ))
    );
    assert_eq!(
        eval_with(&ev, &env, &Expr::cref("r.b"), EvalMode::Explicit),
        Ok(Value::Integer(2))
    );
}

#[test]
fn record_defaults_win_over_deferral() {
    let ev = evaluator(EvalFlags::DEFER_UNBOUND);
    let value = eval_with(&ev, &record_env(), &Expr::cref("r.a"), EvalMode::Explicit);
    assert_eq!(value, Ok(Value::Integer(1)));
}

#[test]
fn dotted_declarations_are_found_first() {
    let env = Env::new()
        .with_var("a.b", VarInfo::value(Type::Integer, Value::Integer(5)))
        .with_var(
            "a",
            VarInfo::value(
                Type::Unknown,
                Value::record(
                    Path::parse("A"),
                    vec![Value::Integer(9)],
                    vec!["b".into()],
                    -1,
                ),
            ),
        );
    let ev = evaluator(EvalFlags::empty());
    assert_eq!(
        eval_with(&ev, &env, &Expr::cref("a.b"), EvalMode::Explicit),
        Ok(Value::Integer(5))
    );
}

#[test]
fn subscripted_references() {
    let env = Env::new().with_var(
        "x",
        VarInfo::bound(
            Type::array(Type::Integer, &[3]),
            Constness::Const,
            int_exprs(&[10, 20, 30]),
        ),
    );
    let ev = evaluator(EvalFlags::empty());
    let ty = Type::Integer;
    let second = cref_sub("x", vec![Subscript::Index(Expr::int(2))], ty.clone());
    assert_eq!(eval_with(&ev, &env, &second, EvalMode::Explicit), Ok(Value::Integer(20)));

    let slice = cref_sub(
        "x",
        vec![Subscript::Slice(Expr::range(Expr::int(2), None, Expr::int(3)))],
        Type::array(ty, &[2]),
    );
    assert_eq!(eval_with(&ev, &env, &slice, EvalMode::Explicit), Ok(ints(&[20, 30])));
}

#[test]
fn dimensions_come_from_declarations() {
    let env = Env::new()
        .with_var("n", VarInfo::value(Type::Integer, Value::Integer(4)))
        .with_var(
            "x",
            VarInfo::unbound(Type::Real, Constness::Var),
        );
    let ev = evaluator(EvalFlags::empty());
    let (_, size) = ev
        .evaluate_dimension(
            EvalContext::new(),
            &env,
            &Dimension::Exp(Box::new(Expr::cref("n"))),
            EvalMode::Explicit,
            DiagContext::Silent,
        )
        .unwrap();
    assert_eq!(size, Value::Integer(4));

    let unknown = ev.evaluate_dimension(
        EvalContext::new(),
        &env,
        &Dimension::Exp(Box::new(Expr::cref("x"))),
        EvalMode::Explicit,
        DiagContext::Silent,
    );
    assert!(matches!(
        unknown.map_err(|e| e.kind),
        Err(EvalErrorKind::DimensionNotKnown { .. })
    ));
}
