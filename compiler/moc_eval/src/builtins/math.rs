//! Numeric builtins.
//!
//! Single-argument functions apply elementwise to arrays. `div`, `mod` and
//! `rem` see their argument expressions so a zero divisor is reported with
//! the source text.

use moc_ir::{Expr, RelationOp};
use moc_values::{
    division_by_zero, integer_overflow, invalid_argument, modulo_by_zero, negative_sqrt,
    EvalResult, Value,
};

use super::{arg, real_arg, require_arg_range, require_args, Builtin, BuiltinTable};
use crate::context::EvalContext;
use crate::evaluator::{expected, ConstEvaluator, EvalOutcome, Request};
use crate::relations::relate;

pub(super) fn register(table: &mut BuiltinTable) {
    table.insert("floor", Builtin::Strict(|a| map_real("floor", a, |x| Ok(x.floor()))));
    table.insert("ceil", Builtin::Strict(|a| map_real("ceil", a, |x| Ok(x.ceil()))));
    table.insert("abs", Builtin::Strict(abs));
    table.insert("sign", Builtin::Strict(sign));
    table.insert("sqrt", Builtin::Strict(|a| map_real("sqrt", a, sqrt)));
    table.insert("sin", Builtin::Strict(|a| map_real("sin", a, |x| Ok(x.sin()))));
    table.insert("cos", Builtin::Strict(|a| map_real("cos", a, |x| Ok(x.cos()))));
    table.insert("tan", Builtin::Strict(|a| map_real("tan", a, |x| Ok(x.tan()))));
    table.insert(
        "asin",
        Builtin::Strict(|a| map_real("asin", a, |x| unit_domain("asin", x).map(f64::asin))),
    );
    table.insert(
        "acos",
        Builtin::Strict(|a| map_real("acos", a, |x| unit_domain("acos", x).map(f64::acos))),
    );
    table.insert("atan", Builtin::Strict(|a| map_real("atan", a, |x| Ok(x.atan()))));
    table.insert("atan2", Builtin::Strict(atan2));
    table.insert("sinh", Builtin::Strict(|a| map_real("sinh", a, |x| Ok(x.sinh()))));
    table.insert("cosh", Builtin::Strict(|a| map_real("cosh", a, |x| Ok(x.cosh()))));
    table.insert("tanh", Builtin::Strict(|a| map_real("tanh", a, |x| Ok(x.tanh()))));
    table.insert("exp", Builtin::Strict(|a| map_real("exp", a, |x| Ok(x.exp()))));
    table.insert(
        "log",
        Builtin::Strict(|a| map_real("log", a, |x| positive("log", x).map(f64::ln))),
    );
    table.insert(
        "log10",
        Builtin::Strict(|a| map_real("log10", a, |x| positive("log10", x).map(f64::log10))),
    );
    table.insert("integer", Builtin::Strict(integer));
    table.insert("div", Builtin::Special(div));
    table.insert("mod", Builtin::Special(modulo));
    table.insert("rem", Builtin::Special(rem));
    table.insert("max", Builtin::Strict(|a| extremum("max", RelationOp::Greater, a)));
    table.insert("min", Builtin::Strict(|a| extremum("min", RelationOp::Less, a)));
    table.insert("noEvent", Builtin::Special(no_event));
    table.insert("smooth", Builtin::Special(smooth));
}

/// Apply `f` to every leaf of the only argument.
pub(super) fn map_real(
    name: &str,
    args: &[Value],
    f: fn(f64) -> EvalResult<f64>,
) -> EvalResult<Value> {
    require_args(name, 1, args)?;
    arg(name, args, 0)?.try_map_leaves(&mut |v| match v.as_number() {
        Some(x) => f(x).map(Value::Real),
        None => Err(expected(name, "Real", v)),
    })
}

pub(super) fn sqrt(x: f64) -> EvalResult<f64> {
    if x < 0.0 {
        Err(negative_sqrt(x))
    } else {
        Ok(x.sqrt())
    }
}

pub(super) fn positive(name: &str, x: f64) -> EvalResult<f64> {
    if x > 0.0 {
        Ok(x)
    } else {
        Err(invalid_argument(name, format!("{x} is not positive")))
    }
}

pub(super) fn unit_domain(name: &str, x: f64) -> EvalResult<f64> {
    if (-1.0..=1.0).contains(&x) {
        Ok(x)
    } else {
        Err(invalid_argument(name, format!("{x} is outside [-1, 1]")))
    }
}

fn abs(args: &[Value]) -> EvalResult<Value> {
    require_args("abs", 1, args)?;
    arg("abs", args, 0)?.try_map_leaves(&mut |v| match v {
        Value::Integer(n) => n
            .checked_abs()
            .map(Value::Integer)
            .ok_or_else(|| integer_overflow("abs")),
        Value::Real(x) => Ok(Value::Real(x.abs())),
        other => Err(expected("abs", "Integer or Real", other)),
    })
}

fn sign(args: &[Value]) -> EvalResult<Value> {
    require_args("sign", 1, args)?;
    arg("sign", args, 0)?.try_map_leaves(&mut |v| match v {
        Value::Integer(n) => Ok(Value::Integer(n.signum())),
        Value::Real(x) if *x > 0.0 => Ok(Value::Integer(1)),
        Value::Real(x) if *x < 0.0 => Ok(Value::Integer(-1)),
        Value::Real(_) => Ok(Value::Integer(0)),
        other => Err(expected("sign", "Integer or Real", other)),
    })
}

fn atan2(args: &[Value]) -> EvalResult<Value> {
    require_args("atan2", 2, args)?;
    let y = real_arg("atan2", args, 0)?;
    let x = real_arg("atan2", args, 1)?;
    Ok(Value::Real(y.atan2(x)))
}

/// Largest Integer not greater than the argument.
fn integer(args: &[Value]) -> EvalResult<Value> {
    require_args("integer", 1, args)?;
    arg("integer", args, 0)?.try_map_leaves(&mut |v| match v {
        Value::Integer(n) => Ok(Value::Integer(*n)),
        Value::Real(x) => real_to_integer("integer", x.floor()),
        other => Err(expected("integer", "Real", other)),
    })
}

/// Convert an integral Real to an Integer, refusing values out of range.
pub(super) fn real_to_integer(name: &str, x: f64) -> EvalResult<Value> {
    if x.is_finite() && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        Ok(Value::Integer(x as i64))
    } else {
        Err(integer_overflow(name))
    }
}

/// Evaluate both operands; a zero divisor is reported with the printed
/// argument expressions.
fn divisor_operands(
    ev: &ConstEvaluator<'_>,
    ctx: EvalContext,
    req: Request<'_>,
    name: &str,
    args: &[Expr],
    zero: fn(&str, &str) -> moc_values::EvalError,
) -> EvalResult<(EvalContext, Value, Value)> {
    require_args(name, 2, args)?;
    let (ctx, values) = ev.eval_all(ctx, req, args)?;
    let mut values = values.into_iter();
    let (Some(x), Some(y)) = (values.next(), values.next()) else {
        return Err(moc_values::internal_error(format!("`{name}` takes 2 arguments")));
    };
    if y.is_zero() {
        return Err(zero(&args[0].to_string(), &args[1].to_string()));
    }
    Ok((ctx, x, y))
}

/// `div(x, y)`: quotient truncated towards zero.
fn div(ev: &ConstEvaluator<'_>, ctx: EvalContext, req: Request<'_>, args: &[Expr]) -> EvalOutcome {
    let (ctx, x, y) = divisor_operands(ev, ctx, req, "div", args, division_by_zero)?;
    let quotient = match (&x, &y) {
        (Value::Integer(a), Value::Integer(b)) => a
            .checked_div(*b)
            .map(Value::Integer)
            .ok_or_else(|| integer_overflow("div"))?,
        _ => Value::Real((number("div", &x)? / number("div", &y)?).trunc()),
    };
    Ok((ctx, quotient))
}

/// `mod(x, y)`: `x - floor(x / y) * y`, so the result has the sign of `y`.
fn modulo(
    ev: &ConstEvaluator<'_>,
    ctx: EvalContext,
    req: Request<'_>,
    args: &[Expr],
) -> EvalOutcome {
    let (ctx, x, y) = divisor_operands(ev, ctx, req, "mod", args, modulo_by_zero)?;
    let result = match (&x, &y) {
        (Value::Integer(a), Value::Integer(b)) => {
            let r = a.checked_rem(*b).ok_or_else(|| integer_overflow("mod"))?;
            let r = if r != 0 && (r < 0) != (*b < 0) { r + b } else { r };
            Value::Integer(r)
        }
        _ => {
            let (a, b) = (number("mod", &x)?, number("mod", &y)?);
            Value::Real(a - (a / b).floor() * b)
        }
    };
    Ok((ctx, result))
}

/// `rem(x, y)`: `x - div(x, y) * y`.
fn rem(ev: &ConstEvaluator<'_>, ctx: EvalContext, req: Request<'_>, args: &[Expr]) -> EvalOutcome {
    let (ctx, x, y) = divisor_operands(ev, ctx, req, "rem", args, modulo_by_zero)?;
    let result = match (&x, &y) {
        (Value::Integer(a), Value::Integer(b)) => a
            .checked_rem(*b)
            .map(Value::Integer)
            .ok_or_else(|| integer_overflow("rem"))?,
        _ => Value::Real(number("rem", &x)? % number("rem", &y)?),
    };
    Ok((ctx, result))
}

fn number(name: &str, v: &Value) -> EvalResult<f64> {
    v.as_number()
        .ok_or_else(|| expected(name, "Integer or Real", v))
}

/// `max(a, b)`, `max(A)` and the `min` counterparts.
fn extremum(name: &str, better: RelationOp, args: &[Value]) -> EvalResult<Value> {
    require_arg_range(name, 1, 2, args)?;
    let candidates = if args.len() == 2 {
        vec![arg(name, args, 0)?.clone(), arg(name, args, 1)?.clone()]
    } else {
        arg(name, args, 0)?.flatten()
    };
    let mut candidates = candidates.into_iter();
    let Some(mut best) = candidates.next() else {
        return Err(invalid_argument(name, "array is empty"));
    };
    for candidate in candidates {
        match relate(&candidate, better, &best) {
            Some(true) => best = candidate,
            Some(false) => {}
            None => {
                return Err(expected(name, best.type_name(), &candidate));
            }
        }
    }
    Ok(best)
}

fn no_event(
    ev: &ConstEvaluator<'_>,
    ctx: EvalContext,
    req: Request<'_>,
    args: &[Expr],
) -> EvalOutcome {
    require_args("noEvent", 1, args)?;
    ev.eval(ctx, req, &args[0])
}

/// `smooth(p, e)` is `e` for any order `p`.
fn smooth(
    ev: &ConstEvaluator<'_>,
    ctx: EvalContext,
    req: Request<'_>,
    args: &[Expr],
) -> EvalOutcome {
    require_args("smooth", 2, args)?;
    ev.eval(ctx, req, &args[1])
}
