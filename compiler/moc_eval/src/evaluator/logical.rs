//! `and`, `or` and `not`.
//!
//! The left operand is evaluated once. `false and e` and `true or e` are
//! decided without evaluating `e`; otherwise both operands are combined,
//! elementwise for Boolean arrays.

use moc_ir::{Expr, LogicalOp};
use moc_values::{invalid_cast_or_shape, EvalResult, Value};

use super::rules::alt;
use super::{expected, ConstEvaluator, EvalOutcome, Request};
use crate::context::EvalContext;

impl ConstEvaluator<'_> {
    pub(super) fn eval_logical(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        lhs: &Expr,
        op: LogicalOp,
        rhs: &Expr,
    ) -> EvalOutcome {
        let (ctx, left) = self.eval(ctx, req, lhs)?;
        self.first_match(&[
            alt("false and", &|| {
                (op == LogicalOp::And && left == Value::Bool(false))
                    .then(|| Ok((ctx.clone(), Value::Bool(false))))
            }),
            alt("true or", &|| {
                (op == LogicalOp::Or && left == Value::Bool(true))
                    .then(|| Ok((ctx.clone(), Value::Bool(true))))
            }),
            alt("logical", &|| {
                Some(self.eval(ctx.clone(), req, rhs).and_then(|(ctx, right)| {
                    Ok((ctx, combine(op, &left, &right)?))
                }))
            }),
        ])
    }

    pub(super) fn eval_not(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        operand: &Expr,
    ) -> EvalOutcome {
        let (ctx, value) = self.eval(ctx, req, operand)?;
        let negated = value.try_map_leaves(&mut |leaf| match leaf {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(expected("not", "Boolean", other)),
        })?;
        Ok((ctx, negated))
    }
}

fn combine(op: LogicalOp, left: &Value, right: &Value) -> EvalResult<Value> {
    let mut apply = |a: &Value, b: &Value| match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(match op {
            LogicalOp::And => *a && *b,
            LogicalOp::Or => *a || *b,
        })),
        (Value::Bool(_), other) | (other, _) => Err(expected(op.as_symbol(), "Boolean", other)),
    };
    left.try_zip_leaves(right, &mut apply).unwrap_or_else(|| {
        Err(invalid_cast_or_shape(format!(
            "operands of `{}` have different sizes",
            op.as_symbol()
        )))
    })
}
