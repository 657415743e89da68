//! External functions with a known constant implementation.
//!
//! A function declared `external` has no body to evaluate. When its external
//! identifier names one of the C math routines or a Modelica string utility,
//! the call is evaluated here instead of being left to the runtime.

use std::sync::OnceLock;

use moc_ir::Path;
use moc_values::{index_out_of_bounds, EvalResult, Value};
use rustc_hash::FxHashMap;

use super::math::{map_real, positive, sqrt, unit_domain};
use super::{bool_arg, int_arg, real_arg, require_arg_range, require_args, str_arg};
use crate::environment::{ClassDef, Env};

pub(crate) type ExternalHandler = fn(&[Value]) -> EvalResult<Value>;

type ExternalTable = FxHashMap<&'static str, ExternalHandler>;

fn table() -> &'static ExternalTable {
    static TABLE: OnceLock<ExternalTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut t: ExternalTable = FxHashMap::default();
        t.insert("acos", |a| map_real("acos", a, |x| unit_domain("acos", x).map(f64::acos)));
        t.insert("asin", |a| map_real("asin", a, |x| unit_domain("asin", x).map(f64::asin)));
        t.insert("atan", |a| map_real("atan", a, |x| Ok(x.atan())));
        t.insert("atan2", atan2);
        t.insert("cos", |a| map_real("cos", a, |x| Ok(x.cos())));
        t.insert("cosh", |a| map_real("cosh", a, |x| Ok(x.cosh())));
        t.insert("exp", |a| map_real("exp", a, |x| Ok(x.exp())));
        t.insert("log", |a| map_real("log", a, |x| positive("log", x).map(f64::ln)));
        t.insert("log10", |a| map_real("log10", a, |x| positive("log10", x).map(f64::log10)));
        t.insert("sin", |a| map_real("sin", a, |x| Ok(x.sin())));
        t.insert("sinh", |a| map_real("sinh", a, |x| Ok(x.sinh())));
        t.insert("tan", |a| map_real("tan", a, |x| Ok(x.tan())));
        t.insert("tanh", |a| map_real("tanh", a, |x| Ok(x.tanh())));
        t.insert("fabs", |a| map_real("fabs", a, |x| Ok(x.abs())));
        t.insert("floor", |a| map_real("floor", a, |x| Ok(x.floor())));
        t.insert("ceil", |a| map_real("ceil", a, |x| Ok(x.ceil())));
        t.insert("sqrt", |a| map_real("sqrt", a, sqrt));

        t.insert("ModelicaStrings_substring", substring);
        t.insert("ModelicaStrings_length", length);
        t.insert("ModelicaStrings_compare", compare);
        t.insert("ModelicaStrings_skipWhiteSpace", skip_white_space);
        t.insert("ModelicaStrings_scanInteger", scan_integer);
        t.insert("ModelicaStrings_scanReal", scan_real);
        t.insert("ModelicaStrings_hashString", hash_string);
        t
    })
}

/// Whether `name` is an external identifier evaluated at compile time.
pub fn is_known_external_func(name: &str) -> bool {
    table().contains_key(name)
}

/// External identifier and handler of the function at `path`, if it is an
/// external function with a known implementation.
pub(crate) fn known_external(env: &Env, path: &Path) -> Option<(&'static str, ExternalHandler)> {
    let Some(ClassDef::Function(def)) = env.lookup_class(path) else {
        return None;
    };
    let decl = def.external.as_ref()?;
    table()
        .get_key_value(decl.name.as_str())
        .map(|(name, handler)| (*name, *handler))
}

fn atan2(args: &[Value]) -> EvalResult<Value> {
    require_args("atan2", 2, args)?;
    Ok(Value::Real(
        real_arg("atan2", args, 0)?.atan2(real_arg("atan2", args, 1)?),
    ))
}

// Modelica.Utilities.Strings. Indices are 1-based character positions.

fn chars_of(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn index_value(i: usize) -> Value {
    Value::Integer(i64::try_from(i).unwrap_or(i64::MAX))
}

/// 0-based offset of a 1-based index that may point one past the end.
fn start_offset(i: i64, len: usize) -> EvalResult<usize> {
    i.checked_sub(1)
        .and_then(|k| usize::try_from(k).ok())
        .filter(|&k| k <= len)
        .ok_or_else(|| index_out_of_bounds(i, len))
}

/// Characters `start..=end`; an empty string when `end < start`.
fn substring(args: &[Value]) -> EvalResult<Value> {
    require_args("ModelicaStrings_substring", 3, args)?;
    let chars = chars_of(str_arg("ModelicaStrings_substring", args, 0)?);
    let start = int_arg("ModelicaStrings_substring", args, 1)?;
    let end = int_arg("ModelicaStrings_substring", args, 2)?;
    if end < start {
        return Ok(Value::string(""));
    }
    let from = start_offset(start, chars.len())?;
    let to = usize::try_from(end)
        .ok()
        .filter(|&e| e <= chars.len())
        .ok_or_else(|| index_out_of_bounds(end, chars.len()))?;
    Ok(Value::string(chars[from..to].iter().collect::<String>()))
}

fn length(args: &[Value]) -> EvalResult<Value> {
    require_args("ModelicaStrings_length", 1, args)?;
    let s = str_arg("ModelicaStrings_length", args, 0)?;
    Ok(index_value(s.chars().count()))
}

/// `Modelica.Utilities.Types.Compare` literal for the ordering of two
/// strings.
fn compare(args: &[Value]) -> EvalResult<Value> {
    require_arg_range("ModelicaStrings_compare", 2, 3, args)?;
    let a = str_arg("ModelicaStrings_compare", args, 0)?;
    let b = str_arg("ModelicaStrings_compare", args, 1)?;
    let case_sensitive = match args.get(2) {
        Some(_) => bool_arg("ModelicaStrings_compare", args, 2)?,
        None => true,
    };
    let ordering = if case_sensitive {
        a.cmp(b)
    } else {
        a.to_lowercase().cmp(&b.to_lowercase())
    };
    let (name, index) = match ordering {
        std::cmp::Ordering::Less => ("Less", 1),
        std::cmp::Ordering::Equal => ("Equal", 2),
        std::cmp::Ordering::Greater => ("Greater", 3),
    };
    let path = Path::parse("Modelica.Utilities.Types.Compare").join(name);
    Ok(Value::enum_literal(path, index))
}

/// Offset of the first non-whitespace character at or after `from`.
fn skip_ws(chars: &[char], from: usize) -> usize {
    chars[from..]
        .iter()
        .position(|c| !c.is_whitespace())
        .map_or(chars.len(), |k| from + k)
}

/// Index of the first non-whitespace character at or after `startIndex`,
/// or one past the end.
fn skip_white_space(args: &[Value]) -> EvalResult<Value> {
    require_arg_range("ModelicaStrings_skipWhiteSpace", 1, 2, args)?;
    let chars = chars_of(str_arg("ModelicaStrings_skipWhiteSpace", args, 0)?);
    let start = match args.get(1) {
        Some(_) => int_arg("ModelicaStrings_skipWhiteSpace", args, 1)?,
        None => 1,
    };
    let from = start_offset(start, chars.len())?;
    Ok(index_value(skip_ws(&chars, from) + 1))
}

/// Scan arguments: the string, the 1-based start index and whether a sign
/// is allowed.
fn scan_args(name: &str, args: &[Value]) -> EvalResult<(Vec<char>, usize, bool)> {
    require_arg_range(name, 1, 3, args)?;
    let chars = chars_of(str_arg(name, args, 0)?);
    let start = match args.get(1) {
        Some(_) => int_arg(name, args, 1)?,
        None => 1,
    };
    let unsigned = match args.get(2) {
        Some(_) => bool_arg(name, args, 2)?,
        None => false,
    };
    let from = start_offset(start, chars.len())?;
    Ok((chars, from, unsigned))
}

/// Length of a run of ASCII digits at `at`.
fn digits(chars: &[char], at: usize) -> usize {
    chars[at..].iter().take_while(|c| c.is_ascii_digit()).count()
}

fn sign_len(chars: &[char], at: usize, unsigned: bool) -> usize {
    usize::from(!unsigned && matches!(chars.get(at), Some('+' | '-')))
}

/// `(nextIndex, value)`; on failure `nextIndex` is the start index and the
/// value is zero.
fn scan_integer(args: &[Value]) -> EvalResult<Value> {
    let (chars, from, unsigned) = scan_args("ModelicaStrings_scanInteger", args)?;
    let at = skip_ws(&chars, from);
    let sign = sign_len(&chars, at, unsigned);
    let n = digits(&chars, at + sign);
    let text: String = chars[at..at + sign + n].iter().collect();
    match text.parse::<i64>() {
        Ok(value) if n > 0 => Ok(Value::tuple(vec![
            index_value(at + sign + n + 1),
            Value::Integer(value),
        ])),
        _ => Ok(Value::tuple(vec![index_value(from + 1), Value::Integer(0)])),
    }
}

fn scan_real(args: &[Value]) -> EvalResult<Value> {
    let (chars, from, unsigned) = scan_args("ModelicaStrings_scanReal", args)?;
    let at = skip_ws(&chars, from);
    let mut end = at + sign_len(&chars, at, unsigned);
    let whole = digits(&chars, end);
    end += whole;
    let mut fraction = 0;
    if chars.get(end) == Some(&'.') {
        fraction = digits(&chars, end + 1);
        end += 1 + fraction;
    }
    if whole + fraction == 0 {
        return Ok(Value::tuple(vec![index_value(from + 1), Value::Real(0.0)]));
    }
    if matches!(chars.get(end), Some('e' | 'E')) {
        let exp_sign = sign_len(&chars, end + 1, false);
        let exp_digits = digits(&chars, end + 1 + exp_sign);
        if exp_digits > 0 {
            end += 1 + exp_sign + exp_digits;
        }
    }
    let text: String = chars[at..end].iter().collect();
    match text.parse::<f64>() {
        Ok(value) => Ok(Value::tuple(vec![index_value(end + 1), Value::Real(value)])),
        Err(_) => Ok(Value::tuple(vec![index_value(from + 1), Value::Real(0.0)])),
    }
}

/// Jenkins one-at-a-time hash of the UTF-8 bytes.
fn hash_string(args: &[Value]) -> EvalResult<Value> {
    require_args("ModelicaStrings_hashString", 1, args)?;
    let s = str_arg("ModelicaStrings_hashString", args, 0)?;
    let mut h: u32 = 0;
    for &b in s.as_bytes() {
        h = h.wrapping_add(u32::from(b));
        h = h.wrapping_add(h << 10);
        h ^= h >> 6;
    }
    h = h.wrapping_add(h << 3);
    h ^= h >> 11;
    h = h.wrapping_add(h << 15);
    Ok(Value::Integer(i64::from(h as i32)))
}

#[cfg(test)]
mod tests {
    use moc_ir::Type;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::environment::{ExternalDecl, FunctionDef};

    fn s(text: &str) -> Value {
        Value::string(text)
    }

    fn external_fn(path: &str, external: &str) -> ClassDef {
        ClassDef::Function(FunctionDef {
            path: Path::parse(path),
            inputs: vec!["x".into()],
            output: Type::Real,
            impure: false,
            external: Some(ExternalDecl {
                name: external.into(),
                language: "C".into(),
            }),
        })
    }

    #[test]
    fn resolves_by_external_identifier() {
        let env = Env::new().with_class(external_fn("Modelica.Math.mySin", "sin"));
        let found = known_external(&env, &Path::parse("Modelica.Math.mySin"));
        assert_eq!(found.map(|(name, _)| name), Some("sin"));

        let env = Env::new().with_class(external_fn("P.f", "myOwnRoutine"));
        assert!(known_external(&env, &Path::parse("P.f")).is_none());
        assert!(known_external(&Env::new(), &Path::parse("P.g")).is_none());
    }

    #[test]
    fn known_names() {
        assert!(is_known_external_func("fabs"));
        assert!(is_known_external_func("ModelicaStrings_scanReal"));
        assert!(!is_known_external_func("printf"));
    }

    #[test]
    fn substrings_are_inclusive() {
        let args = [s("hello"), Value::Integer(2), Value::Integer(4)];
        assert_eq!(substring(&args), Ok(s("ell")));
        let args = [s("hello"), Value::Integer(3), Value::Integer(2)];
        assert_eq!(substring(&args), Ok(s("")));
        let args = [s("hello"), Value::Integer(2), Value::Integer(9)];
        assert_eq!(substring(&args), Err(index_out_of_bounds(9, 5)));
    }

    #[test]
    fn comparison_yields_an_enumeration_literal() {
        let Ok(Value::Enum { path, index }) = compare(&[s("abc"), s("ABD"), Value::Bool(false)])
        else {
            panic!("expected an enumeration literal");
        };
        assert_eq!(index, 1);
        assert_eq!(path.last(), "Less");
        let Ok(Value::Enum { index, .. }) = compare(&[s("a"), s("a")]) else {
            panic!("expected an enumeration literal");
        };
        assert_eq!(index, 2);
    }

    #[test]
    fn scanning() {
        assert_eq!(
            scan_integer(&[s("  -42 rest"), Value::Integer(1)]),
            Ok(Value::tuple(vec![Value::Integer(6), Value::Integer(-42)]))
        );
        assert_eq!(
            scan_integer(&[s("abc"), Value::Integer(1)]),
            Ok(Value::tuple(vec![Value::Integer(1), Value::Integer(0)]))
        );
        assert_eq!(
            scan_real(&[s("x 1.5e3;"), Value::Integer(2)]),
            Ok(Value::tuple(vec![Value::Integer(8), Value::Real(1500.0)]))
        );
        assert_eq!(
            skip_white_space(&[s("a   b"), Value::Integer(2)]),
            Ok(Value::Integer(5))
        );
    }

    #[test]
    fn hashing_is_stable() {
        assert_eq!(hash_string(&[s("")]), Ok(Value::Integer(0)));
        assert_eq!(
            hash_string(&[s("a")]),
            hash_string(&[Value::boxed(s("a"))])
        );
    }
}
