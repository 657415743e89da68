use super::*;
use crate::{IterKind, Path, ReductionInfo, ReductionIterator};

fn sum_over(id: &str, source: Expr, body: Expr) -> Expr {
    Expr::Reduction(Box::new(Reduction {
        info: ReductionInfo {
            path: Path::ident("sum"),
            iter_kind: IterKind::Combine,
            ty: Type::Integer,
            default: None,
            fold_name: "$fold".to_string(),
            result_name: "$res".to_string(),
            fold_exp: None,
        },
        body,
        iterators: vec![ReductionIterator {
            id: id.to_string(),
            source,
            guard: None,
            ty: Type::Integer,
        }],
    }))
}

#[test]
fn cref_name_strips_subscripts() {
    let cref = ComponentRef::ident("a.b").with_subscripts(vec![Subscript::Index(Expr::int(2))]);
    assert_eq!(cref.name(), "a.b");
    assert!(cref.has_subscripts());
    assert_eq!(cref.subscripts().count(), 1);
}

#[test]
fn references_finds_nested_cref() {
    let e = Expr::binary(Expr::int(1), BinaryOp::Add, Expr::cref("r"));
    assert!(e.references("r"));
    assert!(!e.references("q"));
}

#[test]
fn references_looks_into_subscripts() {
    let e = Expr::Cref {
        cref: ComponentRef::ident("x").with_subscripts(vec![Subscript::Index(Expr::cref("n"))]),
        ty: Type::Unknown,
    };
    assert!(e.references("n"));
}

#[test]
fn reduction_iterator_shadows_outer_name() {
    let e = sum_over("i", Expr::range(Expr::int(1), None, Expr::int(3)), Expr::cref("i"));
    assert!(!e.references("i"));
    let e = sum_over("i", Expr::range(Expr::int(1), None, Expr::cref("i")), Expr::cref("i"));
    assert!(e.references("i"));
}

#[test]
fn array_constructor_marks_scalar_elements() {
    let Expr::Array { scalar, .. } = Expr::array(vec![Expr::int(1), Expr::int(2)]) else {
        panic!("expected array");
    };
    assert!(scalar);
    let Expr::Array { scalar, .. } = Expr::array(vec![Expr::array(vec![Expr::int(1)])]) else {
        panic!("expected array");
    };
    assert!(!scalar);
}
