//! Evaluator tests through the public entry points.
//!
//! Each file covers one area; the helpers here build an evaluator with an
//! explicit configuration so the tests do not depend on `MOC_EVAL_*`
//! variables in the environment running them.

mod call_tests;
mod cref_tests;
mod reduction_tests;

use moc_ir::{ComponentRef, Expr, Subscript, Type};
use moc_values::{EvalResult, Value};

use crate::{ConstEvaluator, DiagContext, Env, EvalConfig, EvalContext, EvalFlags, EvalMode};

pub(crate) fn evaluator(flags: EvalFlags) -> ConstEvaluator<'static> {
    ConstEvaluator::builder()
        .config(EvalConfig::default().with_flags(flags))
        .build()
}

pub(crate) fn eval_with(
    ev: &ConstEvaluator<'_>,
    env: &Env,
    expr: &Expr,
    mode: EvalMode,
) -> EvalResult<Value> {
    ev.evaluate(EvalContext::new(), env, expr, mode, DiagContext::Silent)
        .map(|(_, value)| value)
}

/// Evaluate in an empty environment with default flags.
pub(crate) fn eval(expr: &Expr) -> EvalResult<Value> {
    eval_with(&evaluator(EvalFlags::empty()), &Env::new(), expr, EvalMode::Implicit)
}

pub(crate) fn ints(values: &[i64]) -> Value {
    Value::array(values.iter().copied().map(Value::Integer).collect())
}

pub(crate) fn int_exprs(values: &[i64]) -> Expr {
    Expr::array(values.iter().copied().map(Expr::int).collect())
}

pub(crate) fn reals(values: &[f64]) -> Value {
    Value::array(values.iter().copied().map(Value::Real).collect())
}

/// Typed reference `name` with subscripts on its last identifier.
pub(crate) fn cref_sub(name: &str, subs: Vec<Subscript>, ty: Type) -> Expr {
    Expr::Cref {
        cref: ComponentRef::ident(name).with_subscripts(subs),
        ty,
    }
}
