//! MetaModelica builtins: integer/real/string conversions and the list,
//! array and option primitives.

use moc_ir::format_real;
use moc_values::{index_out_of_bounds, integer_overflow, invalid_argument, EvalResult, Value};

use super::math::real_to_integer;
use super::{
    arg, bool_arg, int_arg, real_arg, require_args, seq_arg, str_arg, Builtin, BuiltinTable,
};
use crate::evaluator::expected;

pub(super) fn register(table: &mut BuiltinTable) {
    // Numbers
    table.insert("intString", Builtin::Strict(int_string));
    table.insert("realString", Builtin::Strict(real_string));
    table.insert("intReal", Builtin::Strict(int_real));
    table.insert("realInt", Builtin::Strict(real_int));
    table.insert("intAbs", Builtin::Strict(int_abs));
    table.insert("intMax", Builtin::Strict(|a| int_pair("intMax", a, i64::max)));
    table.insert("intMin", Builtin::Strict(|a| int_pair("intMin", a, i64::min)));
    table.insert("boolString", Builtin::Strict(bool_string));

    // Strings
    table.insert("stringLength", Builtin::Strict(string_length));
    table.insert("stringAppend", Builtin::Strict(string_append));
    table.insert("stringAppendList", Builtin::Strict(string_append_list));
    table.insert("stringEq", Builtin::Strict(string_eq));
    table.insert("stringCompare", Builtin::Strict(string_compare));
    table.insert("stringInt", Builtin::Strict(string_int));
    table.insert("stringReal", Builtin::Strict(string_real));
    table.insert("stringCharInt", Builtin::Strict(string_char_int));
    table.insert("intStringChar", Builtin::Strict(int_string_char));
    table.insert("stringListStringChar", Builtin::Strict(string_list_string_char));
    table.insert("stringGetStringChar", Builtin::Strict(string_get_string_char));

    // Lists
    table.insert("listAppend", Builtin::Strict(list_append));
    table.insert("listReverse", Builtin::Strict(list_reverse));
    table.insert("listMember", Builtin::Strict(list_member));
    table.insert("listLength", Builtin::Strict(|a| length("listLength", a)));
    table.insert("listHead", Builtin::Strict(list_head));
    table.insert("listRest", Builtin::Strict(list_rest));
    table.insert("listGet", Builtin::Strict(|a| nth("listGet", a)));
    table.insert("listEmpty", Builtin::Strict(list_empty));

    // Arrays and options
    table.insert("listArray", Builtin::Strict(list_array));
    table.insert("arrayList", Builtin::Strict(array_list));
    table.insert("arrayLength", Builtin::Strict(|a| length("arrayLength", a)));
    table.insert("arrayGet", Builtin::Strict(|a| nth("arrayGet", a)));
    table.insert("isSome", Builtin::Strict(|a| is_some("isSome", a, true)));
    table.insert("isNone", Builtin::Strict(|a| is_some("isNone", a, false)));
}

fn count(name: &str, n: usize) -> EvalResult<Value> {
    i64::try_from(n)
        .map(Value::Integer)
        .map_err(|_| integer_overflow(name))
}

fn int_string(args: &[Value]) -> EvalResult<Value> {
    require_args("intString", 1, args)?;
    Ok(Value::string(int_arg("intString", args, 0)?.to_string()))
}

fn real_string(args: &[Value]) -> EvalResult<Value> {
    require_args("realString", 1, args)?;
    Ok(Value::string(format_real(real_arg("realString", args, 0)?)))
}

fn int_real(args: &[Value]) -> EvalResult<Value> {
    require_args("intReal", 1, args)?;
    Ok(Value::Real(int_arg("intReal", args, 0)? as f64))
}

/// Truncates towards zero.
fn real_int(args: &[Value]) -> EvalResult<Value> {
    require_args("realInt", 1, args)?;
    real_to_integer("realInt", real_arg("realInt", args, 0)?.trunc())
}

fn int_abs(args: &[Value]) -> EvalResult<Value> {
    require_args("intAbs", 1, args)?;
    int_arg("intAbs", args, 0)?
        .checked_abs()
        .map(Value::Integer)
        .ok_or_else(|| integer_overflow("intAbs"))
}

fn int_pair(name: &str, args: &[Value], f: fn(i64, i64) -> i64) -> EvalResult<Value> {
    require_args(name, 2, args)?;
    Ok(Value::Integer(f(int_arg(name, args, 0)?, int_arg(name, args, 1)?)))
}

fn bool_string(args: &[Value]) -> EvalResult<Value> {
    require_args("boolString", 1, args)?;
    Ok(Value::string(bool_arg("boolString", args, 0)?.to_string()))
}

fn string_length(args: &[Value]) -> EvalResult<Value> {
    require_args("stringLength", 1, args)?;
    count("stringLength", str_arg("stringLength", args, 0)?.len())
}

fn string_append(args: &[Value]) -> EvalResult<Value> {
    require_args("stringAppend", 2, args)?;
    let a = str_arg("stringAppend", args, 0)?;
    let b = str_arg("stringAppend", args, 1)?;
    Ok(Value::string(format!("{a}{b}")))
}

fn string_append_list(args: &[Value]) -> EvalResult<Value> {
    require_args("stringAppendList", 1, args)?;
    let mut out = String::new();
    for part in seq_arg("stringAppendList", args, 0)? {
        let part = part.unboxed();
        out.push_str(
            part.as_str()
                .ok_or_else(|| expected("stringAppendList", "String", part))?,
        );
    }
    Ok(Value::string(out))
}

fn string_eq(args: &[Value]) -> EvalResult<Value> {
    require_args("stringEq", 2, args)?;
    Ok(Value::Bool(
        str_arg("stringEq", args, 0)? == str_arg("stringEq", args, 1)?,
    ))
}

/// `-1`, `0` or `1` by byte order.
fn string_compare(args: &[Value]) -> EvalResult<Value> {
    require_args("stringCompare", 2, args)?;
    let a = str_arg("stringCompare", args, 0)?;
    let b = str_arg("stringCompare", args, 1)?;
    Ok(Value::Integer(a.cmp(b) as i64))
}

fn string_int(args: &[Value]) -> EvalResult<Value> {
    require_args("stringInt", 1, args)?;
    let s = str_arg("stringInt", args, 0)?;
    s.trim()
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|_| invalid_argument("stringInt", format!("{s:?} is not an Integer")))
}

fn string_real(args: &[Value]) -> EvalResult<Value> {
    require_args("stringReal", 1, args)?;
    let s = str_arg("stringReal", args, 0)?;
    s.trim()
        .parse::<f64>()
        .map(Value::Real)
        .map_err(|_| invalid_argument("stringReal", format!("{s:?} is not a Real")))
}

/// Character code of a one-character string.
fn string_char_int(args: &[Value]) -> EvalResult<Value> {
    require_args("stringCharInt", 1, args)?;
    let s = str_arg("stringCharInt", args, 0)?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Integer(i64::from(u32::from(c)))),
        _ => Err(invalid_argument(
            "stringCharInt",
            format!("{s:?} is not a single character"),
        )),
    }
}

fn int_string_char(args: &[Value]) -> EvalResult<Value> {
    require_args("intStringChar", 1, args)?;
    let n = int_arg("intStringChar", args, 0)?;
    u32::try_from(n)
        .ok()
        .and_then(char::from_u32)
        .map(|c| Value::string(c.to_string()))
        .ok_or_else(|| invalid_argument("intStringChar", format!("{n} is not a character code")))
}

fn string_list_string_char(args: &[Value]) -> EvalResult<Value> {
    require_args("stringListStringChar", 1, args)?;
    let s = str_arg("stringListStringChar", args, 0)?;
    Ok(Value::list(
        s.chars().map(|c| Value::string(c.to_string())).collect(),
    ))
}

/// 1-based character access.
fn string_get_string_char(args: &[Value]) -> EvalResult<Value> {
    require_args("stringGetStringChar", 2, args)?;
    let s = str_arg("stringGetStringChar", args, 0)?;
    let i = int_arg("stringGetStringChar", args, 1)?;
    let len = s.chars().count();
    i.checked_sub(1)
        .and_then(|k| usize::try_from(k).ok())
        .and_then(|k| s.chars().nth(k))
        .map(|c| Value::string(c.to_string()))
        .ok_or_else(|| index_out_of_bounds(i, len))
}

fn list_append(args: &[Value]) -> EvalResult<Value> {
    require_args("listAppend", 2, args)?;
    let mut out = seq_arg("listAppend", args, 0)?.to_vec();
    out.extend_from_slice(seq_arg("listAppend", args, 1)?);
    Ok(Value::list(out))
}

fn list_reverse(args: &[Value]) -> EvalResult<Value> {
    require_args("listReverse", 1, args)?;
    Ok(Value::list(
        seq_arg("listReverse", args, 0)?.iter().rev().cloned().collect(),
    ))
}

fn list_member(args: &[Value]) -> EvalResult<Value> {
    require_args("listMember", 2, args)?;
    let needle = arg("listMember", args, 0)?;
    let found = seq_arg("listMember", args, 1)?
        .iter()
        .any(|v| v.unboxed() == needle);
    Ok(Value::Bool(found))
}

fn length(name: &str, args: &[Value]) -> EvalResult<Value> {
    require_args(name, 1, args)?;
    count(name, seq_arg(name, args, 0)?.len())
}

fn list_head(args: &[Value]) -> EvalResult<Value> {
    require_args("listHead", 1, args)?;
    seq_arg("listHead", args, 0)?
        .first()
        .cloned()
        .ok_or_else(|| invalid_argument("listHead", "list is empty"))
}

fn list_rest(args: &[Value]) -> EvalResult<Value> {
    require_args("listRest", 1, args)?;
    match seq_arg("listRest", args, 0)? {
        [] => Err(invalid_argument("listRest", "list is empty")),
        [_, rest @ ..] => Ok(Value::list(rest.to_vec())),
    }
}

/// 1-based element access.
fn nth(name: &str, args: &[Value]) -> EvalResult<Value> {
    require_args(name, 2, args)?;
    let seq = seq_arg(name, args, 0)?;
    let i = int_arg(name, args, 1)?;
    i.checked_sub(1)
        .and_then(|k| usize::try_from(k).ok())
        .and_then(|k| seq.get(k))
        .cloned()
        .ok_or_else(|| index_out_of_bounds(i, seq.len()))
}

fn list_empty(args: &[Value]) -> EvalResult<Value> {
    require_args("listEmpty", 1, args)?;
    Ok(Value::Bool(seq_arg("listEmpty", args, 0)?.is_empty()))
}

fn list_array(args: &[Value]) -> EvalResult<Value> {
    require_args("listArray", 1, args)?;
    let elements = seq_arg("listArray", args, 0)?.to_vec();
    let n = elements.len();
    Ok(Value::array_with_dims(elements, vec![n]))
}

fn array_list(args: &[Value]) -> EvalResult<Value> {
    require_args("arrayList", 1, args)?;
    Ok(Value::list(seq_arg("arrayList", args, 0)?.to_vec()))
}

fn is_some(name: &str, args: &[Value], want_some: bool) -> EvalResult<Value> {
    require_args(name, 1, args)?;
    match arg(name, args, 0)? {
        Value::Optional(inner) => Ok(Value::Bool(inner.is_some() == want_some)),
        other => Err(expected(name, "Option", other)),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ints(values: &[i64]) -> Value {
        Value::list(values.iter().copied().map(Value::Integer).collect())
    }

    #[test]
    fn list_primitives() {
        let l = ints(&[1, 2, 3]);
        assert_eq!(list_head(&[l.clone()]), Ok(Value::Integer(1)));
        assert_eq!(list_rest(&[l.clone()]), Ok(ints(&[2, 3])));
        assert_eq!(list_reverse(&[l.clone()]), Ok(ints(&[3, 2, 1])));
        assert_eq!(nth("listGet", &[l.clone(), Value::Integer(3)]), Ok(Value::Integer(3)));
        assert_eq!(
            list_member(&[Value::boxed(Value::Integer(2)), l.clone()]),
            Ok(Value::Bool(true))
        );
        assert_eq!(list_append(&[l, ints(&[4])]), Ok(ints(&[1, 2, 3, 4])));
    }

    #[test]
    fn empty_lists_have_no_head() {
        let empty = ints(&[]);
        assert!(list_head(&[empty.clone()]).is_err());
        assert!(list_rest(&[empty.clone()]).is_err());
        assert_eq!(list_empty(&[empty]), Ok(Value::Bool(true)));
    }

    #[test]
    fn index_out_of_range() {
        assert_eq!(
            nth("listGet", &[ints(&[1]), Value::Integer(0)]),
            Err(index_out_of_bounds(0, 1))
        );
    }

    #[test]
    fn string_conversions() {
        assert_eq!(string_int(&[Value::string(" 42")]), Ok(Value::Integer(42)));
        assert!(string_int(&[Value::string("4x")]).is_err());
        assert_eq!(real_string(&[Value::Real(2.0)]), Ok(Value::string("2.0")));
        assert_eq!(real_int(&[Value::Real(-2.7)]), Ok(Value::Integer(-2)));
        assert_eq!(
            string_compare(&[Value::string("a"), Value::string("b")]),
            Ok(Value::Integer(-1))
        );
        assert_eq!(
            string_get_string_char(&[Value::string("abc"), Value::Integer(2)]),
            Ok(Value::string("b"))
        );
        assert_eq!(string_char_int(&[Value::string("A")]), Ok(Value::Integer(65)));
    }

    #[test]
    fn options() {
        assert_eq!(
            is_some("isSome", &[Value::some(Value::Integer(1))], true),
            Ok(Value::Bool(true))
        );
        assert_eq!(is_some("isNone", &[Value::none()], false), Ok(Value::Bool(true)));
    }
}
