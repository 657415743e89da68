//! Relational comparison of evaluated scalars.

use std::cmp::Ordering;

use moc_ir::RelationOp;
use moc_values::Value;

/// Compare two scalars. `None` means the pair is not comparable (mixed
/// kinds, NaN, or non-scalars), which the caller treats as non-constant.
///
/// `>` and `>=` are decided as the swapped `<` and `<=`.
pub(crate) fn relate(lhs: &Value, op: RelationOp, rhs: &Value) -> Option<bool> {
    match op {
        RelationOp::Greater => relate(rhs, RelationOp::Less, lhs),
        RelationOp::GreaterEq => relate(rhs, RelationOp::LessEq, lhs),
        RelationOp::Less => Some(ordering(lhs, rhs)? == Ordering::Less),
        RelationOp::LessEq => Some(ordering(lhs, rhs)? != Ordering::Greater),
        RelationOp::Equal => Some(ordering(lhs, rhs)? == Ordering::Equal),
        RelationOp::NotEqual => Some(ordering(lhs, rhs)? != Ordering::Equal),
    }
}

fn ordering(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Real(a), Value::Real(b)) => a.partial_cmp(b),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Enum { index: a, .. }, Value::Enum { index: b, .. })
        | (Value::Enum { index: a, .. }, Value::Integer(b))
        | (Value::Integer(a), Value::Enum { index: b, .. }) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use moc_ir::Path;

    use super::*;

    #[test]
    fn greater_is_swapped_less() {
        let (one, two) = (Value::Integer(1), Value::Integer(2));
        assert_eq!(relate(&two, RelationOp::Greater, &one), Some(true));
        assert_eq!(relate(&one, RelationOp::GreaterEq, &one), Some(true));
        assert_eq!(relate(&one, RelationOp::Greater, &two), Some(false));
    }

    #[test]
    fn strings_compare_lexicographically() {
        let (a, b) = (Value::string("abc"), Value::string("abd"));
        assert_eq!(relate(&a, RelationOp::Less, &b), Some(true));
        assert_eq!(relate(&a, RelationOp::NotEqual, &b), Some(true));
        assert_eq!(relate(&a, RelationOp::Equal, &a), Some(true));
    }

    #[test]
    fn enumerations_compare_by_index() {
        let a = Value::enum_literal(Path::parse("E.a"), 1);
        let c = Value::enum_literal(Path::parse("E.c"), 3);
        assert_eq!(relate(&a, RelationOp::Less, &c), Some(true));
        assert_eq!(relate(&c, RelationOp::Equal, &Value::Integer(3)), Some(true));
    }

    #[test]
    fn false_orders_before_true() {
        let (f, t) = (Value::Bool(false), Value::Bool(true));
        assert_eq!(relate(&f, RelationOp::Less, &t), Some(true));
    }

    #[test]
    fn incomparable_pairs() {
        let nan = Value::Real(f64::NAN);
        assert_eq!(relate(&nan, RelationOp::Equal, &nan), None);
        assert_eq!(
            relate(&Value::Integer(1), RelationOp::Less, &Value::Real(2.0)),
            None
        );
        assert_eq!(
            relate(&Value::string("a"), RelationOp::Less, &Value::Integer(2)),
            None
        );
    }
}
