//! Array construction and indexing helpers shared by the evaluator and the
//! builtins.
//!
//! Everything here keeps `Value::Array::dims` consistent with the nesting.

use moc_values::{index_out_of_bounds, internal_error, invalid_cast_or_shape, EvalResult, Value};

use crate::evaluator::expected;

/// 1-based position denoted by a subscript value.
pub(crate) fn index_of(value: &Value) -> EvalResult<i64> {
    match value {
        Value::Integer(n) => Ok(*n),
        Value::Enum { index, .. } => Ok(*index),
        Value::Bool(false) => Ok(1),
        Value::Bool(true) => Ok(2),
        other => Err(expected("subscript", "Integer", other)),
    }
}

/// The element at 1-based `index` of the outermost dimension.
pub(crate) fn select(value: &Value, index: i64) -> EvalResult<Value> {
    let Value::Array { elements, .. } = value else {
        return Err(expected("subscripted value", "array", value));
    };
    usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| elements.get(i))
        .cloned()
        .ok_or_else(|| index_out_of_bounds(index, elements.len()))
}

/// Array of `dims` shape with every element equal to `value`.
pub(crate) fn fill(value: &Value, dims: &[usize]) -> Value {
    match dims.split_first() {
        None => value.clone(),
        Some((&n, rest)) => {
            if n == 0 {
                let mut all = dims.to_vec();
                all.extend_from_slice(value.dims());
                return Value::array_with_dims(Vec::new(), all);
            }
            let inner = fill(value, rest);
            Value::array(vec![inner; n])
        }
    }
}

/// Re-nest a flat sequence into `dims`, outermost first, building each
/// level with `make`. Used for arrays and for nested lists.
pub(crate) fn nest(flat: Vec<Value>, dims: &[usize], make: fn(Vec<Value>) -> Value) -> Value {
    match dims {
        [] | [_] => make(flat),
        [outer, inner @ ..] => {
            let chunk: usize = inner.iter().product();
            if chunk == 0 || *outer == 0 {
                let empty = make(Vec::new());
                return if empty.is_array() {
                    Value::array_with_dims(Vec::new(), dims.to_vec())
                } else {
                    empty
                };
            }
            let mut rest = flat.into_iter();
            let rows = (0..*outer)
                .map(|_| nest(rest.by_ref().take(chunk).collect(), inner, make))
                .collect();
            make(rows)
        }
    }
}

/// Concatenate arrays along 1-based dimension `k`.
pub(crate) fn concat(k: usize, parts: &[Value]) -> EvalResult<Value> {
    let Some(first) = parts.first() else {
        return Err(invalid_cast_or_shape("cat needs at least one array"));
    };
    let rank = first.dims().len();
    if k == 0 || k > rank {
        return Err(invalid_cast_or_shape(format!(
            "cannot concatenate along dimension {k} of a rank {rank} array"
        )));
    }
    for part in parts {
        let dims = part.dims();
        let same_shape = dims.len() == rank
            && dims
                .iter()
                .zip(first.dims())
                .enumerate()
                .all(|(i, (a, b))| i + 1 == k || a == b);
        if !same_shape {
            return Err(invalid_cast_or_shape(format!(
                "cannot concatenate arrays of sizes {:?} and {:?} along dimension {k}",
                first.dims(),
                dims
            )));
        }
    }

    if k == 1 {
        let mut dims = first.dims().to_vec();
        let mut elements = Vec::new();
        for part in parts {
            elements.extend(part.elements().unwrap_or_default().iter().cloned());
        }
        dims[0] = elements.len();
        return Ok(Value::array_with_dims(elements, dims));
    }

    let rows = first.dims()[0];
    let mut out = Vec::with_capacity(rows);
    for i in 0..rows {
        let slices = parts
            .iter()
            .map(|p| {
                p.elements()
                    .and_then(|e| e.get(i))
                    .cloned()
                    .ok_or_else(|| internal_error("ragged array in concatenation"))
            })
            .collect::<EvalResult<Vec<_>>>()?;
        out.push(concat(k - 1, &slices)?);
    }
    if out.is_empty() {
        let mut dims = first.dims().to_vec();
        dims[k - 1] = parts.iter().map(|p| p.dims()[k - 1]).sum();
        return Ok(Value::array_with_dims(Vec::new(), dims));
    }
    Ok(Value::array(out))
}

/// Identity matrix whose elements have the kind of `like`.
pub(crate) fn identity(n: usize, like: &Value) -> Value {
    let (zero, one) = match like {
        Value::Real(_) => (Value::Real(0.0), Value::Real(1.0)),
        _ => (Value::Integer(0), Value::Integer(1)),
    };
    let rows = (0..n)
        .map(|i| {
            let row = (0..n)
                .map(|j| if i == j { one.clone() } else { zero.clone() })
                .collect();
            Value::array_with_dims(row, vec![n])
        })
        .collect();
    Value::array_with_dims(rows, vec![n, n])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ints(ns: &[i64]) -> Value {
        Value::array(ns.iter().map(|&n| Value::Integer(n)).collect())
    }

    #[test]
    fn select_is_one_based_and_checked() {
        let v = ints(&[10, 20, 30]);
        assert_eq!(select(&v, 2), Ok(Value::Integer(20)));
        assert!(matches!(
            select(&v, 4).map_err(|e| e.kind),
            Err(moc_values::EvalErrorKind::IndexOutOfBounds { index: 4, len: 3 })
        ));
        assert!(select(&v, 0).is_err());
    }

    #[test]
    fn boolean_and_enum_subscripts() {
        assert_eq!(index_of(&Value::Bool(false)), Ok(1));
        assert_eq!(index_of(&Value::Bool(true)), Ok(2));
        let lit = Value::enum_literal(moc_ir::Path::parse("E.c"), 3);
        assert_eq!(index_of(&lit), Ok(3));
    }

    #[test]
    fn fill_keeps_shape_for_empty_dims() {
        let v = fill(&Value::Real(1.0), &[0, 3]);
        assert_eq!(v.dims(), &[0, 3]);
        let v = fill(&Value::Integer(7), &[2, 2]);
        assert_eq!(v, Value::array(vec![ints(&[7, 7]), ints(&[7, 7])]));
    }

    #[test]
    fn concat_along_both_dimensions() {
        let a = Value::array(vec![ints(&[1, 2])]);
        let b = Value::array(vec![ints(&[3, 4])]);
        let rows = concat(1, &[a.clone(), b.clone()]);
        assert_eq!(rows, Ok(Value::array(vec![ints(&[1, 2]), ints(&[3, 4])])));
        let cols = concat(2, &[a, b]);
        assert_eq!(cols, Ok(Value::array(vec![ints(&[1, 2, 3, 4])])));
        assert!(concat(2, &[ints(&[1]), ints(&[2])]).is_err());
    }

    #[test]
    fn nest_partitions_outermost_first() {
        let flat = (1..=6).map(Value::Integer).collect();
        let v = nest(flat, &[2, 3], Value::array);
        assert_eq!(v, Value::array(vec![ints(&[1, 2, 3]), ints(&[4, 5, 6])]));
        assert_eq!(v.dims(), &[2, 3]);
    }
}
