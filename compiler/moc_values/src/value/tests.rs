use pretty_assertions::assert_eq;

use super::*;

fn ints(ns: &[i64]) -> Vec<Value> {
    ns.iter().map(|&n| Value::Integer(n)).collect()
}

#[test]
fn array_derives_dims_from_elements() {
    let row = Value::array(ints(&[1, 2, 3]));
    assert_eq!(row.dims(), &[3]);

    let m = Value::array(vec![row.clone(), row]);
    assert_eq!(m.dims(), &[2, 3]);
    assert!(m.is_matrix());

    let empty = Value::array(Vec::new());
    assert_eq!(empty.dims(), &[0]);
}

#[test]
fn from_flat_renests_row_major() {
    let m = Value::from_flat(ints(&[1, 2, 3, 4, 5, 6]), &[2, 3]);
    assert_eq!(m.to_string(), "{{1, 2, 3}, {4, 5, 6}}");
    assert_eq!(m.dims(), &[2, 3]);
    assert_eq!(m.flatten(), ints(&[1, 2, 3, 4, 5, 6]));
}

#[test]
fn from_flat_keeps_empty_inner_dimensions() {
    let m = Value::from_flat(Vec::new(), &[2, 0]);
    assert_eq!(m.dims(), &[2, 0]);
    assert_eq!(m.elements().map(<[Value]>::len), Some(2));
}

#[test]
fn map_leaves_preserves_shape() {
    let m = Value::from_flat(ints(&[1, 2, 3, 4]), &[2, 2]);
    let doubled: Result<Value, ()> = m.try_map_leaves(&mut |v| match v {
        Value::Integer(n) => Ok(Value::Integer(n * 2)),
        _ => Err(()),
    });
    assert_eq!(doubled, Ok(Value::from_flat(ints(&[2, 4, 6, 8]), &[2, 2])));
}

#[test]
fn zip_leaves_rejects_shape_mismatch() {
    let a = Value::array(ints(&[1, 2]));
    let b = Value::array(ints(&[1, 2, 3]));
    let mut add = |x: &Value, y: &Value| -> Result<Value, ()> {
        Ok(Value::Integer(x.as_integer().unwrap_or(0) + y.as_integer().unwrap_or(0)))
    };
    assert!(a.try_zip_leaves(&b, &mut add).is_none());
    assert_eq!(
        a.try_zip_leaves(&a, &mut add),
        Some(Ok(Value::array(ints(&[2, 4]))))
    );
}

#[test]
fn transpose_swaps_dimensions() {
    let m = Value::from_flat(ints(&[1, 2, 3, 4, 5, 6]), &[2, 3]);
    let t = m.transpose();
    assert_eq!(
        t.as_ref().map(ToString::to_string).as_deref(),
        Some("{{1, 4}, {2, 5}, {3, 6}}")
    );
    assert_eq!(t.as_ref().map(Value::dims), Some(&[3usize, 2][..]));
}

#[test]
fn display_uses_modelica_notation() {
    let r = Value::record(
        Path::parse("P"),
        vec![Value::Integer(1), Value::Real(2.0)],
        vec!["x".into(), "y".into()],
        -1,
    );
    assert_eq!(r.to_string(), "P(x = 1, y = 2.0)");
    assert_eq!(Value::some(Value::string("a")).to_string(), "SOME(\"a\")");
    assert_eq!(Value::none().to_string(), "NONE()");
    assert_eq!(
        Value::tuple(vec![Value::Bool(true), Value::Integer(3)]).to_string(),
        "(true, 3)"
    );
}

#[test]
fn record_field_lookup() {
    let r = RecordValue {
        path: Path::parse("P"),
        fields: ints(&[7, 8]),
        field_names: vec!["a".into(), "b".into()],
        index: -1,
    };
    assert_eq!(r.field("b"), Some(&Value::Integer(8)));
    assert_eq!(r.field("c"), None);
}

#[test]
fn unboxed_strips_nested_boxes() {
    let v = Value::boxed(Value::boxed(Value::Integer(4)));
    assert_eq!(v.unboxed(), &Value::Integer(4));
}

#[test]
fn zero_test_is_exact() {
    assert!(Value::Real(0.0).is_zero());
    assert!(Value::Real(-0.0).is_zero());
    assert!(!Value::Real(1e-300).is_zero());
    assert!(Value::Integer(0).is_zero());
}
