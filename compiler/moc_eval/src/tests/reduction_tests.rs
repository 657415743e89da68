//! Reductions: collecting folds, named folds, guards and iteration order.

use moc_ir::{
    BinaryOp, Expr, IterKind, Path, Reduction, ReductionInfo, ReductionIterator, RelationOp, Type,
};
use moc_values::{EvalErrorKind, Value};
use pretty_assertions::assert_eq;

use super::{eval, int_exprs, ints};

fn iterator(id: &str, source: Expr) -> ReductionIterator {
    ReductionIterator {
        id: id.into(),
        source,
        guard: None,
        ty: Type::Integer,
    }
}

fn range(start: i64, stop: i64) -> Expr {
    Expr::range(Expr::int(start), None, Expr::int(stop))
}

fn info(name: &str, iter_kind: IterKind) -> ReductionInfo {
    ReductionInfo {
        path: Path::ident(name),
        iter_kind,
        ty: Type::Integer,
        default: None,
        fold_name: "$value".into(),
        result_name: "$result".into(),
        fold_exp: None,
    }
}

fn reduction(info: ReductionInfo, body: Expr, iterators: Vec<ReductionIterator>) -> Expr {
    Expr::Reduction(Box::new(Reduction {
        info,
        body,
        iterators,
    }))
}

fn square(name: &str) -> Expr {
    Expr::binary(Expr::cref(name), BinaryOp::Mul, Expr::cref(name))
}

#[test]
fn array_comprehension() {
    let expr = reduction(
        info("array", IterKind::Combine),
        square("i"),
        vec![iterator("i", range(1, 4))],
    );
    assert_eq!(eval(&expr), Ok(ints(&[1, 4, 9, 16])));
}

#[test]
fn first_iterator_varies_fastest() {
    // array(10 * i + j for i in 1:2, j in 1:3)
    let body = Expr::binary(
        Expr::binary(Expr::int(10), BinaryOp::Mul, Expr::cref("i")),
        BinaryOp::Add,
        Expr::cref("j"),
    );
    let expr = reduction(
        info("array", IterKind::Combine),
        body,
        vec![iterator("i", range(1, 2)), iterator("j", range(1, 3))],
    );
    assert_eq!(
        eval(&expr),
        Ok(Value::array(vec![ints(&[11, 21]), ints(&[12, 22]), ints(&[13, 23])]))
    );
}

#[test]
fn list_folds_keep_or_reverse_order() {
    let source = int_exprs(&[3, 1, 2]);
    let list = reduction(
        info("list", IterKind::Combine),
        Expr::cref("x"),
        vec![iterator("x", source.clone())],
    );
    let ints_list = |v: &[i64]| Value::list(v.iter().copied().map(Value::Integer).collect());
    assert_eq!(eval(&list), Ok(ints_list(&[3, 1, 2])));

    let reversed = reduction(
        info("listReverse", IterKind::Combine),
        Expr::cref("x"),
        vec![iterator("x", source)],
    );
    assert_eq!(eval(&reversed), Ok(ints_list(&[2, 1, 3])));
}

#[test]
fn guards_filter_candidates() {
    let mut it = iterator("i", range(1, 6));
    it.guard = Some(Expr::relation(Expr::cref("i"), RelationOp::Greater, Expr::int(3)));
    let expr = reduction(info("array", IterKind::Combine), Expr::cref("i"), vec![it]);
    assert_eq!(eval(&expr), Ok(ints(&[4, 5, 6])));
}

#[test]
fn non_boolean_guards_fail() {
    let mut it = iterator("i", range(1, 3));
    it.guard = Some(Expr::int(1));
    let expr = reduction(info("array", IterKind::Combine), Expr::cref("i"), vec![it]);
    assert_eq!(
        eval(&expr).map_err(|e| e.kind),
        Err(EvalErrorKind::ReductionGuardFailure { guard: "1".into() })
    );
}

#[test]
fn empty_reductions() {
    let empty = || vec![iterator("i", range(1, 0))];

    let mut with_default = info("sum", IterKind::Combine);
    with_default.default = Some(Expr::int(0));
    assert_eq!(
        eval(&reduction(with_default, Expr::cref("i"), empty())),
        Ok(Value::Integer(0))
    );

    let named = reduction(info("sum", IterKind::Combine), Expr::cref("i"), empty());
    assert_eq!(eval(&named), Ok(Value::Fail));

    for name in ["array", "list", "listReverse"] {
        let collecting = reduction(info(name, IterKind::Combine), Expr::cref("i"), empty());
        assert_eq!(eval(&collecting), Ok(Value::Fail), "{name}");
    }

    let mut with_empty_array = info("array", IterKind::Combine);
    with_empty_array.default = Some(Expr::array(Vec::new()));
    assert_eq!(
        eval(&reduction(with_empty_array, Expr::cref("i"), empty())),
        Ok(Value::array(Vec::new()))
    );
}

#[test]
fn arithmetic_folds_without_fold_expression() {
    let sum = reduction(
        info("sum", IterKind::Combine),
        Expr::cref("i"),
        vec![iterator("i", range(1, 4))],
    );
    assert_eq!(eval(&sum), Ok(Value::Integer(10)));

    let max = reduction(
        info("max", IterKind::Combine),
        Expr::cref("x"),
        vec![iterator("x", int_exprs(&[2, 9, 4]))],
    );
    assert_eq!(eval(&max), Ok(Value::Integer(9)));
}

#[test]
fn fold_expression_combines_value_and_accumulator() {
    let mut product = info("product", IterKind::Combine);
    product.fold_exp = Some(Expr::binary(
        Expr::cref("$value"),
        BinaryOp::Mul,
        Expr::cref("$result"),
    ));
    let expr = reduction(product, Expr::cref("i"), vec![iterator("i", range(1, 4))]);
    assert_eq!(eval(&expr), Ok(Value::Integer(24)));
}

#[test]
fn threaded_iterators_zip() {
    let body = Expr::binary(Expr::cref("a"), BinaryOp::Add, Expr::cref("b"));
    let zipped = reduction(
        info("array", IterKind::Thread),
        body.clone(),
        vec![iterator("a", range(1, 3)), iterator("b", int_exprs(&[10, 20, 30]))],
    );
    assert_eq!(eval(&zipped), Ok(ints(&[11, 22, 33])));

    let uneven = reduction(
        info("array", IterKind::Thread),
        body,
        vec![iterator("a", range(1, 2)), iterator("b", range(1, 3))],
    );
    assert!(matches!(
        eval(&uneven).map_err(|e| e.kind),
        Err(EvalErrorKind::InvalidCastOrShape { .. })
    ));
}

#[test]
fn iteration_count_is_capped() {
    let expr = reduction(
        info("sum", IterKind::Combine),
        Expr::int(1),
        vec![iterator("i", range(1, 1000)), iterator("j", range(1, 1000))],
    );
    assert_eq!(
        eval(&expr).map_err(|e| e.kind),
        Err(EvalErrorKind::IterationLimitExceeded {
            limit: crate::reduction::MAX_REDUCTION_ITERATIONS,
        })
    );
}
