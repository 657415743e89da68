//! Casts.
//!
//! Alternatives, in order: record casts pass the value through, numeric
//! casts convert Integer and Real leaves, Integer to enumeration casts pick
//! the literal by position, and casts to any other type are the identity.

use moc_ir::{Expr, Type};
use moc_values::{integer_overflow, not_constant, EvalResult, Value};

use super::rules::alt;
use super::{enum_literal, ConstEvaluator, EvalOutcome, Request};
use crate::context::EvalContext;

impl ConstEvaluator<'_> {
    pub(super) fn eval_cast(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        ty: &Type,
        operand: &Expr,
    ) -> EvalOutcome {
        self.first_match(&[
            alt("record cast", &|| self.cast_record(&ctx, req, ty, operand)),
            alt("numeric cast", &|| self.cast_numeric(&ctx, req, ty, operand)),
            alt("enumeration cast", &|| self.cast_enum(&ctx, req, ty, operand)),
            alt("identity cast", &|| {
                (!converts(ty)).then(|| self.eval(ctx.clone(), req, operand))
            }),
        ])
    }

    fn cast_record(
        &self,
        ctx: &EvalContext,
        req: Request<'_>,
        ty: &Type,
        operand: &Expr,
    ) -> Option<EvalOutcome> {
        ty.element_type()
            .is_record()
            .then(|| self.eval(ctx.clone(), req, operand))
    }

    fn cast_numeric(
        &self,
        ctx: &EvalContext,
        req: Request<'_>,
        ty: &Type,
        operand: &Expr,
    ) -> Option<EvalOutcome> {
        let to_real = match ty.element_type() {
            Type::Real => true,
            Type::Integer => false,
            _ => return None,
        };
        Some(self.eval(ctx.clone(), req, operand).and_then(|(ctx, value)| {
            let cast = value.try_map_leaves(&mut |leaf| convert_number(leaf, to_real))?;
            Ok((ctx, cast))
        }))
    }

    fn cast_enum(
        &self,
        ctx: &EvalContext,
        req: Request<'_>,
        ty: &Type,
        operand: &Expr,
    ) -> Option<EvalOutcome> {
        let Type::Enumeration { path, literals } = ty.element_type() else {
            return None;
        };
        Some(self.eval(ctx.clone(), req, operand).and_then(|(ctx, value)| {
            let cast = value.try_map_leaves(&mut |leaf| match leaf {
                Value::Integer(n) => enum_literal(path, literals, *n),
                Value::Enum { .. } => Ok(leaf.clone()),
                _ => Err(not_constant()),
            })?;
            Ok((ctx, cast))
        }))
    }
}

/// Whether a cast to `ty` has a conversion alternative of its own.
fn converts(ty: &Type) -> bool {
    let elem = ty.element_type();
    elem.is_record() || matches!(elem, Type::Real | Type::Integer | Type::Enumeration { .. })
}

fn convert_number(leaf: &Value, to_real: bool) -> EvalResult<Value> {
    match (leaf, to_real) {
        (Value::Integer(n), true) => Ok(Value::Real(*n as f64)),
        (Value::Real(x), false) => {
            let truncated = x.trunc();
            if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64
            {
                Ok(Value::Integer(truncated as i64))
            } else {
                Err(integer_overflow("Real to Integer conversion"))
            }
        }
        (Value::Integer(_), false) | (Value::Real(_), true) => Ok(leaf.clone()),
        _ => Err(not_constant()),
    }
}
