//! Values back to literal expressions, for folding constants in place.

use moc_ir::{Dimension, Expr, Type};
use moc_values::Value;

/// Literal expression with the same value, or `None` for values that have
/// no literal form (`fail()`, no-return results, deferred placeholders).
pub(crate) fn value_to_expr(value: &Value) -> Option<Expr> {
    let all = |values: &[Value]| values.iter().map(value_to_expr).collect::<Option<Vec<_>>>();
    let expr = match value {
        Value::Integer(n) => Expr::Integer(*n),
        Value::Real(x) => Expr::Real(*x),
        Value::Bool(b) => Expr::Bool(*b),
        Value::Str(s) => Expr::Str(s.to_string()),
        Value::Enum { path, index } => Expr::Enum {
            path: path.clone(),
            index: *index,
        },
        Value::Array { elements, dims } => Expr::Array {
            ty: Type::Array {
                elem: Box::new(leaf_type(value)),
                dims: dims.iter().map(|&d| Dimension::Known(d)).collect(),
            },
            scalar: dims.len() == 1,
            elements: all(elements)?,
        },
        Value::List(elements) => Expr::List(all(elements)?),
        Value::Tuple(elements) => Expr::Tuple(all(elements)?),
        Value::Record(record) if record.index >= 0 => Expr::MetaRecordCall {
            path: record.path.clone(),
            index: record.index,
            args: all(&record.fields)?,
            field_names: record.field_names.clone(),
        },
        Value::Record(record) => Expr::Record {
            path: record.path.clone(),
            args: all(&record.fields)?,
            field_names: record.field_names.clone(),
        },
        Value::Optional(inner) => match inner {
            Some(v) => Expr::Optional(Some(Box::new(value_to_expr(v)?))),
            None => Expr::Optional(None),
        },
        Value::Boxed(inner) => Expr::Boxed(Box::new(value_to_expr(inner)?)),
        Value::Code(fragment) => Expr::Code(Box::new((**fragment).clone())),
        Value::Fail | Value::NoReturn | Value::Empty(_) => return None,
    };
    Some(expr)
}

/// Scalar type of the first leaf of an array.
fn leaf_type(value: &Value) -> Type {
    let mut leaf = value;
    while let Value::Array { elements, .. } = leaf {
        match elements.first() {
            Some(first) => leaf = first,
            None => return Type::Unknown,
        }
    }
    match leaf {
        Value::Integer(_) => Type::Integer,
        Value::Real(_) => Type::Real,
        Value::Bool(_) => Type::Boolean,
        Value::Str(_) => Type::String,
        Value::Record(record) => Type::Record {
            path: record.path.clone(),
        },
        _ => Type::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use moc_ir::Path;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn arrays_carry_their_shape() {
        let v = Value::array(vec![
            Value::array(vec![Value::Real(1.0), Value::Real(2.0)]),
            Value::array(vec![Value::Real(3.0), Value::Real(4.0)]),
        ]);
        let Some(Expr::Array { ty, scalar, .. }) = value_to_expr(&v) else {
            panic!("expected an array literal");
        };
        assert_eq!(ty, Type::array(Type::Real, &[2, 2]));
        assert!(!scalar);
    }

    #[test]
    fn uniontype_records_keep_their_index() {
        let v = Value::record(Path::parse("U.R"), vec![Value::Integer(1)], vec!["x".into()], 2);
        assert!(matches!(
            value_to_expr(&v),
            Some(Expr::MetaRecordCall { index: 2, .. })
        ));
    }

    #[test]
    fn markers_have_no_literal() {
        assert_eq!(value_to_expr(&Value::Fail), None);
        let empty = Value::empty("M", "x", Type::Real);
        assert_eq!(value_to_expr(&empty), None);
    }
}
