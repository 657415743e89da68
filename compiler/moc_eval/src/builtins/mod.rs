//! Builtin function dispatch.
//!
//! Builtins live in static name → handler tables built once on first use.
//! The base table is always consulted; the MetaModelica table is merged in
//! only when the configuration enables the MetaModelica grammar.
//!
//! Handlers come in two shapes:
//! - [`Builtin::Strict`] handlers receive the evaluated arguments in order.
//! - [`Builtin::Special`] handlers receive the unevaluated arguments, for
//!   builtins that need the source expressions (`div` diagnostics), the
//!   declared type (`size`), or a collaborator (`print`, `simplify`).
//!
//! Known external functions (C math, Modelica string utilities) are matched
//! by their external identifier in `external.rs`.

mod array;
mod external;
mod math;
mod meta;
mod string;

use std::sync::OnceLock;

use moc_ir::Expr;
use moc_values::{internal_error, EvalResult, Value};
use rustc_hash::FxHashMap;

pub(crate) use external::known_external;
pub use external::is_known_external_func;

use crate::context::EvalContext;
use crate::evaluator::{expected, ConstEvaluator, EvalOutcome, Request};

pub(crate) type SpecialHandler =
    fn(&ConstEvaluator<'_>, EvalContext, Request<'_>, &[Expr]) -> EvalOutcome;

pub(crate) type StrictHandler = fn(&[Value]) -> EvalResult<Value>;

/// A builtin function implementation.
#[derive(Copy, Clone)]
pub(crate) enum Builtin {
    /// Sees the unevaluated argument expressions.
    Special(SpecialHandler),
    /// Applied to the evaluated arguments.
    Strict(StrictHandler),
}

impl Builtin {
    pub(crate) fn call(
        self,
        ev: &ConstEvaluator<'_>,
        ctx: EvalContext,
        req: Request<'_>,
        args: &[Expr],
    ) -> EvalOutcome {
        match self {
            Builtin::Special(handler) => handler(ev, ctx, req, args),
            Builtin::Strict(handler) => {
                let (ctx, values) = ev.eval_all(ctx, req, args)?;
                Ok((ctx, handler(&values)?))
            }
        }
    }
}

type BuiltinTable = FxHashMap<&'static str, Builtin>;

fn base_table() -> &'static BuiltinTable {
    static TABLE: OnceLock<BuiltinTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = FxHashMap::default();
        math::register(&mut table);
        array::register(&mut table);
        string::register(&mut table);
        table
    })
}

fn metamodelica_table() -> &'static BuiltinTable {
    static TABLE: OnceLock<BuiltinTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = FxHashMap::default();
        meta::register(&mut table);
        table
    })
}

/// Handler for the builtin `name`, if there is one.
pub(crate) fn lookup_builtin(name: &str, metamodelica: bool) -> Option<Builtin> {
    base_table()
        .get(name)
        .or_else(|| {
            if metamodelica {
                metamodelica_table().get(name)
            } else {
                None
            }
        })
        .copied()
}

/// Names in the base table, sorted.
pub const BASE_BUILTINS: &[&str] = &[
    "Integer", "String", "abs", "acos", "asin", "atan", "atan2", "cat", "ceil", "cos", "cosh",
    "cross", "diagonal", "div", "exp", "fail", "fill", "floor", "identity", "integer", "linspace",
    "log", "log10", "matrix", "max", "min", "mod", "ndims", "noEvent", "ones", "outerProduct",
    "print", "product", "promote", "rem", "scalar", "sign", "simplify", "sin", "sinh", "size",
    "skew", "smooth", "sqrt", "sum", "symmetric", "tan", "tanh", "transpose", "vector", "zeros",
];

/// Names in the MetaModelica table, sorted.
pub const METAMODELICA_BUILTINS: &[&str] = &[
    "arrayGet",
    "arrayLength",
    "arrayList",
    "boolString",
    "intAbs",
    "intMax",
    "intMin",
    "intReal",
    "intString",
    "intStringChar",
    "isNone",
    "isSome",
    "listAppend",
    "listArray",
    "listEmpty",
    "listGet",
    "listHead",
    "listLength",
    "listMember",
    "listRest",
    "listReverse",
    "realInt",
    "realString",
    "stringAppend",
    "stringAppendList",
    "stringCharInt",
    "stringCompare",
    "stringEq",
    "stringGetStringChar",
    "stringInt",
    "stringLength",
    "stringListStringChar",
    "stringReal",
];

// Argument helpers

pub(super) fn require_args<T>(name: &str, n: usize, args: &[T]) -> EvalResult<()> {
    require_arg_range(name, n, n, args)
}

pub(super) fn require_arg_range<T>(
    name: &str,
    min: usize,
    max: usize,
    args: &[T],
) -> EvalResult<()> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else if min == max {
        Err(internal_error(format!(
            "`{name}` takes {min} argument(s), got {}",
            args.len()
        )))
    } else {
        Err(internal_error(format!(
            "`{name}` takes {min} to {max} arguments, got {}",
            args.len()
        )))
    }
}

fn position(name: &str, i: usize) -> String {
    format!("argument {} of `{name}`", i + 1)
}

/// The `i`th argument with any box stripped.
pub(super) fn arg<'v>(name: &str, args: &'v [Value], i: usize) -> EvalResult<&'v Value> {
    args.get(i)
        .map(Value::unboxed)
        .ok_or_else(|| internal_error(format!("`{name}` is missing {}", position(name, i))))
}

pub(super) fn int_arg(name: &str, args: &[Value], i: usize) -> EvalResult<i64> {
    let v = arg(name, args, i)?;
    v.as_integer()
        .ok_or_else(|| expected(&position(name, i), "Integer", v))
}

/// A Real argument; Integers are widened.
pub(super) fn real_arg(name: &str, args: &[Value], i: usize) -> EvalResult<f64> {
    let v = arg(name, args, i)?;
    v.as_number()
        .ok_or_else(|| expected(&position(name, i), "Real", v))
}

pub(super) fn bool_arg(name: &str, args: &[Value], i: usize) -> EvalResult<bool> {
    let v = arg(name, args, i)?;
    v.as_bool()
        .ok_or_else(|| expected(&position(name, i), "Boolean", v))
}

pub(super) fn str_arg<'v>(name: &str, args: &'v [Value], i: usize) -> EvalResult<&'v str> {
    let v = arg(name, args, i)?;
    v.as_str()
        .ok_or_else(|| expected(&position(name, i), "String", v))
}

/// Elements of an array or list argument.
pub(super) fn seq_arg<'v>(name: &str, args: &'v [Value], i: usize) -> EvalResult<&'v [Value]> {
    let v = arg(name, args, i)?;
    v.elements()
        .ok_or_else(|| expected(&position(name, i), "array or list", v))
}

/// A non-negative Integer argument used as a size.
pub(super) fn size_arg(name: &str, args: &[Value], i: usize) -> EvalResult<usize> {
    let n = int_arg(name, args, i)?;
    usize::try_from(n).map_err(|_| {
        moc_values::invalid_argument(name, format!("size {n} must not be negative"))
    })
}
