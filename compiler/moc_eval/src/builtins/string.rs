//! String conversion, printing and the remaining special forms.

use moc_ir::Expr;
use moc_values::{invalid_argument, not_constant, EvalResult, Value};

use super::{arg, bool_arg, int_arg, require_arg_range, require_args, Builtin, BuiltinTable};
use crate::context::EvalContext;
use crate::evaluator::{expected, ConstEvaluator, EvalOutcome, Request};

/// Significant digits of `String(r)` when none are given.
const DEFAULT_SIGNIFICANT_DIGITS: usize = 6;

pub(super) fn register(table: &mut BuiltinTable) {
    table.insert("String", Builtin::Strict(string));
    table.insert("Integer", Builtin::Strict(enum_index));
    table.insert("print", Builtin::Special(print));
    table.insert("fail", Builtin::Strict(fail));
    table.insert("simplify", Builtin::Special(simplify));
}

/// `String(x, ...)`.
///
/// For a Real the optional arguments are `significantDigits`,
/// `minimumLength` and `leftJustified`; for other scalars they are
/// `minimumLength` and `leftJustified`.
fn string(args: &[Value]) -> EvalResult<Value> {
    require_arg_range("String", 1, 4, args)?;
    let value = arg("String", args, 0)?;
    let (text, layout_from) = match value {
        Value::Real(x) => {
            let digits = match args.get(1).map(Value::unboxed) {
                None => DEFAULT_SIGNIFICANT_DIGITS,
                Some(Value::Integer(d)) => usize::try_from(*d).map_err(|_| {
                    invalid_argument("String", format!("significantDigits {d} is negative"))
                })?,
                // Format strings are left to the runtime.
                Some(Value::Str(_)) => return Err(not_constant()),
                Some(other) => return Err(expected("String", "Integer", other)),
            };
            (format_significant(*x, digits), 2)
        }
        Value::Integer(n) => (n.to_string(), 1),
        Value::Bool(b) => (b.to_string(), 1),
        Value::Str(s) => (s.to_string(), 1),
        Value::Enum { path, .. } => (path.last().to_string(), 1),
        other => return Err(expected("String", "scalar", other)),
    };

    let min_len = match args.get(layout_from) {
        Some(_) => usize::try_from(int_arg("String", args, layout_from)?.max(0)).unwrap_or(0),
        None => 0,
    };
    let left = match args.get(layout_from + 1) {
        Some(_) => bool_arg("String", args, layout_from + 1)?,
        None => true,
    };
    Ok(Value::string(pad(text, min_len, left)))
}

fn pad(text: String, min_len: usize, left_justified: bool) -> String {
    let len = text.chars().count();
    if len >= min_len {
        return text;
    }
    let fill = " ".repeat(min_len - len);
    if left_justified {
        text + &fill
    } else {
        fill + &text
    }
}

/// `%.<digits>g` formatting: shortest of fixed and scientific notation for
/// the given number of significant digits, trailing zeros removed.
pub(crate) fn format_significant(x: f64, digits: usize) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        let inf = if x > 0.0 { "inf" } else { "-inf" };
        return inf.to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    let digits = digits.max(1);
    // Scientific formatting rounds first, so the exponent already accounts
    // for carries such as 9.9999995 -> 1.00000e1.
    let sci = format!("{:.*e}", digits - 1, x);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i64 = exponent.parse().unwrap_or(0);
    let digits_i = i64::try_from(digits).unwrap_or(i64::MAX);

    if exponent < -4 || exponent >= digits_i {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    } else {
        let decimals = usize::try_from(digits_i - 1 - exponent).unwrap_or(0);
        trim_fraction(&format!("{x:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// `Integer(e)` of an enumeration literal is its index.
fn enum_index(args: &[Value]) -> EvalResult<Value> {
    require_args("Integer", 1, args)?;
    match arg("Integer", args, 0)? {
        Value::Enum { index, .. } => Ok(Value::Integer(*index)),
        Value::Integer(n) => Ok(Value::Integer(*n)),
        other => Err(expected("Integer", "enumeration literal", other)),
    }
}

fn print(
    ev: &ConstEvaluator<'_>,
    ctx: EvalContext,
    req: Request<'_>,
    args: &[Expr],
) -> EvalOutcome {
    require_args("print", 1, args)?;
    let (ctx, value) = ev.eval(ctx, req, &args[0])?;
    match value.unboxed() {
        Value::Str(s) => {
            ev.print_handler.print(s);
            Ok((ctx, Value::NoReturn))
        }
        other => Err(expected("print", "String", other)),
    }
}

fn fail(args: &[Value]) -> EvalResult<Value> {
    require_args("fail", 0, args)?;
    Ok(Value::Fail)
}

/// `simplify(e)`: evaluate the symbolically simplified argument.
fn simplify(
    ev: &ConstEvaluator<'_>,
    ctx: EvalContext,
    req: Request<'_>,
    args: &[Expr],
) -> EvalOutcome {
    require_arg_range("simplify", 1, 2, args)?;
    let simplified = ev.simplifier.simplify(args[0].clone());
    ev.eval(ctx, req, &simplified)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn significant_digits() {
        assert_eq!(format_significant(1.0, 6), "1");
        assert_eq!(format_significant(0.1, 6), "0.1");
        assert_eq!(format_significant(3.14159265, 3), "3.14");
        assert_eq!(format_significant(123456789.0, 6), "1.23457e+08");
        assert_eq!(format_significant(0.00001234, 6), "1.234e-05");
        assert_eq!(format_significant(9.9999995, 6), "10");
        assert_eq!(format_significant(-2.5, 6), "-2.5");
    }

    #[test]
    fn padding() {
        let args = [Value::Integer(42), Value::Integer(5), Value::Bool(false)];
        assert_eq!(string(&args), Ok(Value::string("   42")));
        let args = [Value::Real(1.5), Value::Integer(6), Value::Integer(6)];
        assert_eq!(string(&args), Ok(Value::string("1.5   ")));
    }

    #[test]
    fn enumeration_literals_print_their_name() {
        let lit = Value::enum_literal(moc_ir::Path::parse("Color.red"), 1);
        assert_eq!(string(&[lit.clone()]), Ok(Value::string("red")));
        assert_eq!(enum_index(&[lit]), Ok(Value::Integer(1)));
    }
}
