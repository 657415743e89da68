//! Per-variant evaluation.

use moc_ir::{BinaryOp, Dimension, Expr, Path, RelationOp, Subscript, Type};
use moc_values::{
    dimension_not_known, internal_error, invalid_argument, iteration_limit_exceeded,
    not_constant, EvalResult, Value,
};

use super::{ConstEvaluator, EvalOutcome, Request};
use crate::context::EvalContext;
use crate::operators::{binary_op, unary_op};
use crate::relations::relate;
use crate::shape::{concat, index_of, select};

/// Ranges longer than this are refused instead of materialized.
pub(crate) const MAX_RANGE_LEN: usize = 10_000_000;

/// Tolerance on the element count of Real ranges.
const REAL_RANGE_EPS: f64 = 1e-10;

impl ConstEvaluator<'_> {
    pub(super) fn eval_expr(&self, ctx: EvalContext, req: Request<'_>, expr: &Expr) -> EvalOutcome {
        let inner = req.deeper();
        match expr {
            Expr::Integer(n) => Ok((ctx, Value::Integer(*n))),
            Expr::Real(x) => Ok((ctx, Value::Real(*x))),
            Expr::Bool(b) => Ok((ctx, Value::Bool(*b))),
            Expr::Str(s) => Ok((ctx, Value::string(s.as_str()))),
            Expr::Enum { path, index } => Ok((ctx, Value::enum_literal(path.clone(), *index))),

            Expr::Array { ty, elements, .. } => self.eval_array(ctx, inner, ty, elements),
            Expr::Matrix { rows, .. } => self.eval_matrix(ctx, inner, rows),
            Expr::Range {
                ty,
                start,
                step,
                stop,
            } => self.eval_range(ctx, inner, ty, start, step.as_deref(), stop),
            Expr::Tuple(elements) => {
                let (ctx, values) = self.eval_all(ctx, inner, elements)?;
                Ok((ctx, Value::tuple(values)))
            }

            Expr::Cast { ty, expr } => self.eval_cast(ctx, inner, ty, expr),
            Expr::Cref { cref, ty } => self.eval_cref(ctx, inner, cref, ty),

            Expr::Binary { lhs, op, rhs } => self.eval_binary(ctx, inner, lhs, *op, rhs),
            Expr::Unary { op, operand } => {
                let (ctx, value) = self.eval(ctx, inner, operand)?;
                Ok((ctx, unary_op(*op, &value)?))
            }
            Expr::LogicalBinary { lhs, op, rhs } => self.eval_logical(ctx, inner, lhs, *op, rhs),
            Expr::Not(operand) => self.eval_not(ctx, inner, operand),
            Expr::Relation { lhs, op, rhs } => self.eval_relation(ctx, inner, lhs, *op, rhs),
            Expr::If { cond, then, else_ } => {
                let (ctx, cond) = self.eval(ctx, inner, cond)?;
                match cond {
                    Value::Bool(true) => self.eval(ctx, inner, then),
                    Value::Bool(false) => self.eval(ctx, inner, else_),
                    other => Err(expected("if-condition", "Boolean", &other)),
                }
            }

            Expr::Call { path, args, attrs } => self.eval_call(ctx, inner, expr, path, args, attrs),
            Expr::Record {
                path,
                args,
                field_names,
            } => {
                let (ctx, fields) = self.eval_all(ctx, inner, args)?;
                Ok((ctx, Value::record(path.clone(), fields, field_names.clone(), -1)))
            }
            Expr::MetaRecordCall {
                path,
                index,
                args,
                field_names,
            } => {
                let (ctx, fields) = self.eval_all(ctx, inner, args)?;
                Ok((
                    ctx,
                    Value::record(path.clone(), fields, field_names.clone(), *index),
                ))
            }

            Expr::ArraySub { expr, subs } => {
                let (ctx, value) = self.eval(ctx, inner, expr)?;
                let subs: Vec<&Subscript> = subs.iter().collect();
                self.apply_subscripts(ctx, inner, value, &subs)
            }
            Expr::TupleSub { expr, index } => {
                let (ctx, value) = self.eval(ctx, inner, expr)?;
                match &value {
                    Value::Tuple(elements) => index
                        .checked_sub(1)
                        .and_then(|i| elements.get(i))
                        .cloned()
                        .map(|v| (ctx, v))
                        .ok_or_else(|| {
                            internal_error(format!("tuple has no element {index}"))
                        }),
                    other => Err(expected("tuple projection", "tuple", other)),
                }
            }
            Expr::RecordField { expr, field } => {
                let (ctx, value) = self.eval(ctx, inner, expr)?;
                Ok((ctx, project_field(&value, field)?))
            }
            Expr::Size { expr, dim } => self.eval_size(ctx, inner, expr, dim.as_deref()),

            Expr::List(elements) => {
                let (ctx, values) = self.eval_all(ctx, inner, elements)?;
                Ok((ctx, Value::list(values)))
            }
            Expr::Cons { head, tail } => {
                let (ctx, head) = self.eval(ctx, inner, head)?;
                let (ctx, tail) = self.eval(ctx, inner, tail)?;
                match &tail {
                    Value::List(rest) => {
                        let mut elements = Vec::with_capacity(rest.len() + 1);
                        elements.push(head);
                        elements.extend(rest.iter().cloned());
                        Ok((ctx, Value::list(elements)))
                    }
                    other => Err(expected("cons", "list", other)),
                }
            }
            Expr::Optional(None) => Ok((ctx, Value::none())),
            Expr::Optional(Some(e)) => {
                let (ctx, value) = self.eval(ctx, inner, e)?;
                Ok((ctx, Value::some(value)))
            }
            Expr::Boxed(e) => {
                let (ctx, value) = self.eval(ctx, inner, e)?;
                Ok((ctx, Value::boxed(value)))
            }
            Expr::Unbox { expr, .. } => {
                let (ctx, value) = self.eval(ctx, inner, expr)?;
                match value {
                    Value::Boxed(boxed) => Ok((ctx, (*boxed).clone())),
                    other => Err(expected("unbox", "boxed value", &other)),
                }
            }

            Expr::Reduction(reduction) => self.eval_reduction(ctx, inner, reduction),
            Expr::Code(fragment) => self.eval_code(ctx, inner, fragment),
        }
    }

    /// `{a, b, c}`; dimensions come from the declared type when it is
    /// statically known, from the elements otherwise.
    fn eval_array(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        ty: &Type,
        elements: &[Expr],
    ) -> EvalOutcome {
        let (ctx, values) = self.eval_all(ctx, req, elements)?;
        let value = match ty.static_dims() {
            Some(dims) if values.is_empty() && dims.first() == Some(&0) => {
                Value::array_with_dims(values, dims)
            }
            _ => Value::array(values),
        };
        Ok((ctx, value))
    }

    /// `[a, b; c, d]`. Each row is a horizontal concatenation of its
    /// elements; the rows are then stacked.
    fn eval_matrix(&self, ctx: EvalContext, req: Request<'_>, rows: &[Vec<Expr>]) -> EvalOutcome {
        let mut ctx = ctx;
        let mut blocks = Vec::with_capacity(rows.len());
        for row in rows {
            let (next, values) = self.eval_all(ctx, req, row)?;
            ctx = next;
            if values.iter().all(|v| !v.is_array()) {
                blocks.push(Value::array(vec![Value::array(values)]));
            } else {
                let parts: Vec<Value> = values.iter().map(as_matrix).collect();
                blocks.push(concat(2, &parts)?);
            }
        }
        if blocks.is_empty() {
            return Ok((ctx, Value::array_with_dims(Vec::new(), vec![0, 0])));
        }
        Ok((ctx, concat(1, &blocks)?))
    }

    fn eval_range(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        ty: &Type,
        start: &Expr,
        step: Option<&Expr>,
        stop: &Expr,
    ) -> EvalOutcome {
        let (ctx, start) = self.eval(ctx, req, start)?;
        let (ctx, step) = match step {
            Some(step) => {
                let (ctx, step) = self.eval(ctx, req, step)?;
                (ctx, Some(step))
            }
            None => (ctx, None),
        };
        let (ctx, stop) = self.eval(ctx, req, stop)?;
        let elements = range_values(&start, step.as_ref(), &stop, ty.element_type())?;
        Ok((ctx, Value::array(elements)))
    }

    fn eval_binary(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        lhs: &Expr,
        op: BinaryOp,
        rhs: &Expr,
    ) -> EvalOutcome {
        let (ctx, left) = self.eval(ctx, req, lhs)?;
        let (ctx, right) = self.eval(ctx, req, rhs)?;
        if op.is_division() && has_zero(&right) {
            return Err(moc_values::division_by_zero(
                &lhs.to_string(),
                &rhs.to_string(),
            ));
        }
        Ok((ctx, binary_op(op, &left, &right)?))
    }

    fn eval_relation(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        lhs: &Expr,
        op: RelationOp,
        rhs: &Expr,
    ) -> EvalOutcome {
        let (ctx, left) = self.eval(ctx, req, lhs)?;
        let (ctx, right) = self.eval(ctx, req, rhs)?;
        match relate(&left, op, &right) {
            Some(result) => Ok((ctx, Value::Bool(result))),
            None => {
                if self.config.trace() {
                    tracing::debug!(
                        lhs = left.type_name(),
                        rhs = right.type_name(),
                        op = op.as_symbol(),
                        "relation not defined for operands"
                    );
                }
                Err(not_constant())
            }
        }
    }

    /// `size(e)` and `size(e, k)`.
    pub(crate) fn eval_size(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        expr: &Expr,
        dim: Option<&Expr>,
    ) -> EvalOutcome {
        let (ctx, dims) = self.dims_of(ctx, req, expr)?;
        match dim {
            None => {
                let sizes = dims.iter().map(|&d| size_value(d)).collect::<EvalResult<_>>()?;
                Ok((ctx, Value::array(sizes)))
            }
            Some(dim) => {
                let (ctx, k) = self.eval(ctx, req, dim)?;
                let k = k
                    .as_integer()
                    .ok_or_else(|| expected("size dimension", "Integer", &k))?;
                let size = usize::try_from(k)
                    .ok()
                    .and_then(|k| k.checked_sub(1))
                    .and_then(|k| dims.get(k))
                    .ok_or_else(|| {
                        invalid_argument(
                            "size",
                            format!("dimension {k} out of range for rank {}", dims.len()),
                        )
                    })?;
                Ok((ctx, size_value(*size)?))
            }
        }
    }

    /// Dimensions of an array-valued expression. The declared type of a
    /// reference is consulted first so that `size` works on arrays whose
    /// elements are not constant.
    pub(crate) fn dims_of(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        expr: &Expr,
    ) -> EvalResult<(EvalContext, Vec<usize>)> {
        let declared = match expr {
            Expr::Cref { ty, .. } if ty.is_array() => ty.dims(),
            _ => &[],
        };
        if declared.is_empty() {
            let (ctx, value) = self.eval(ctx, req, expr)?;
            return Ok((ctx, value.dims().to_vec()));
        }

        let mut resolved = ctx.clone();
        let mut sizes = Vec::with_capacity(declared.len());
        for dim in declared {
            match self.eval_dimension(resolved.clone(), req, dim) {
                Ok((next, size)) => {
                    resolved = next;
                    sizes.push(size);
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(_) => break,
            }
        }
        if sizes.len() == declared.len() {
            return Ok((resolved, sizes));
        }

        match self.eval(ctx, req, expr) {
            Ok((ctx, value)) if value.is_array() => Ok((ctx, value.dims().to_vec())),
            Err(err) if err.is_fatal() => Err(err),
            _ => Err(dimension_not_known(&expr.to_string())),
        }
    }

    /// Size of one declared dimension.
    pub(crate) fn eval_dimension(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        dim: &Dimension,
    ) -> EvalResult<(EvalContext, usize)> {
        match dim {
            Dimension::Known(n) | Dimension::Enum { size: n, .. } => Ok((ctx, *n)),
            Dimension::Boolean => Ok((ctx, 2)),
            Dimension::Exp(e) => match self.eval(ctx, req.deeper(), e) {
                Ok((ctx, Value::Integer(n))) => usize::try_from(n)
                    .map(|n| (ctx, n))
                    .map_err(|_| invalid_argument("dimension", format!("negative size {n}"))),
                Err(err) if err.is_fatal() => Err(err),
                _ => Err(dimension_not_known(&e.to_string())),
            },
            Dimension::Unknown => Err(dimension_not_known(":")),
        }
    }

    /// Apply subscripts to an already evaluated value, outermost first.
    pub(crate) fn apply_subscripts(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        value: Value,
        subs: &[&Subscript],
    ) -> EvalOutcome {
        let Some((first, rest)) = subs.split_first() else {
            return Ok((ctx, value));
        };
        match first {
            Subscript::Index(e) => {
                let (ctx, index) = self.eval(ctx, req, e)?;
                let element = select(&value, index_of(&index)?)?;
                self.apply_subscripts(ctx, req, element, rest)
            }
            Subscript::Slice(e) => {
                let (ctx, indices) = self.eval(ctx, req, e)?;
                let mut ctx = ctx;
                let mut picked = Vec::new();
                for index in indices.flatten() {
                    let element = select(&value, index_of(&index)?)?;
                    let (next, element) = self.apply_subscripts(ctx, req, element, rest)?;
                    ctx = next;
                    picked.push(element);
                }
                Ok((ctx, Value::array(picked)))
            }
            Subscript::Whole => {
                if rest.is_empty() {
                    return Ok((ctx, value));
                }
                let Value::Array { elements, dims } = &value else {
                    return self.apply_subscripts(ctx, req, value, rest);
                };
                if elements.is_empty() {
                    return Ok((ctx, Value::array_with_dims(Vec::new(), vec![dims[0]])));
                }
                let mut ctx = ctx;
                let mut mapped = Vec::with_capacity(elements.len());
                for element in elements.iter() {
                    let (next, element) =
                        self.apply_subscripts(ctx, req, element.clone(), rest)?;
                    ctx = next;
                    mapped.push(element);
                }
                Ok((ctx, Value::array(mapped)))
            }
        }
    }
}

/// Type-checker invariant violation: `what` should have been a `want`.
pub(crate) fn expected(what: &str, want: &str, got: &Value) -> moc_values::EvalError {
    match got {
        Value::Empty(_) => not_constant(),
        other => internal_error(format!("{what}: expected {want}, got {}", other.type_name())),
    }
}

fn size_value(size: usize) -> EvalResult<Value> {
    i64::try_from(size)
        .map(Value::Integer)
        .map_err(|_| moc_values::integer_overflow("size"))
}

/// Whether any scalar leaf is an exact zero.
fn has_zero(value: &Value) -> bool {
    match value {
        Value::Array { elements, .. } => elements.iter().any(has_zero),
        other => other.is_zero(),
    }
}

/// View a matrix-constructor element as a two-dimensional block: scalars
/// become 1x1, vectors become columns.
fn as_matrix(value: &Value) -> Value {
    match value.dims().len() {
        0 => Value::array(vec![Value::array(vec![value.clone()])]),
        1 => Value::array(
            value
                .flatten()
                .into_iter()
                .map(|v| Value::array(vec![v]))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// `record.field`, mapped over arrays of records.
pub(crate) fn project_field(value: &Value, field: &str) -> EvalResult<Value> {
    match value {
        Value::Record(record) => record
            .field(field)
            .cloned()
            .ok_or_else(|| internal_error(format!("record {} has no field {field}", record.path))),
        Value::Array { elements, dims } if elements.is_empty() => {
            Ok(Value::array_with_dims(Vec::new(), dims.clone()))
        }
        Value::Array { elements, .. } => Ok(Value::array(
            elements
                .iter()
                .map(|e| project_field(e, field))
                .collect::<EvalResult<_>>()?,
        )),
        other => Err(expected("field access", "record", other)),
    }
}

fn checked_len(n: i128) -> EvalResult<usize> {
    match usize::try_from(n.max(0)) {
        Ok(n) if n <= MAX_RANGE_LEN => Ok(n),
        _ => Err(iteration_limit_exceeded(MAX_RANGE_LEN)),
    }
}

/// Elements of `start:step:stop`.
fn range_values(
    start: &Value,
    step: Option<&Value>,
    stop: &Value,
    elem_ty: &Type,
) -> EvalResult<Vec<Value>> {
    match (start, step, stop) {
        (Value::Integer(a), step, Value::Integer(b)) => {
            let step = match step {
                None => 1,
                Some(Value::Integer(s)) => *s,
                Some(other) => return Err(expected("range step", "Integer", other)),
            };
            if step == 0 {
                return Err(invalid_argument("range", "step must not be zero"));
            }
            let (a, b, s) = (i128::from(*a), i128::from(*b), i128::from(step));
            let n = checked_len((b - a).div_euclid(s) + 1)?;
            Ok((0..n)
                .map(|i| Value::Integer((a + i as i128 * s) as i64))
                .collect())
        }
        (Value::Real(a), step, Value::Real(b)) => {
            let step = match step {
                None => 1.0,
                Some(Value::Real(s)) => *s,
                Some(other) => return Err(expected("range step", "Real", other)),
            };
            if step == 0.0 {
                return Err(invalid_argument("range", "step must not be zero"));
            }
            let count = ((b - a) / step + REAL_RANGE_EPS).floor() + 1.0;
            if !count.is_finite() {
                return Err(invalid_argument("range", "bounds are not finite"));
            }
            let n = checked_len(count.max(0.0).min(MAX_RANGE_LEN as f64 + 1.0) as i128)?;
            Ok((0..n).map(|i| Value::Real(a + i as f64 * step)).collect())
        }
        (Value::Bool(a), None, Value::Bool(b)) => Ok(match (a, b) {
            (false, true) => vec![Value::Bool(false), Value::Bool(true)],
            (x, y) if x == y => vec![Value::Bool(*x)],
            _ => Vec::new(),
        }),
        (Value::Enum { index: a, .. }, None, Value::Enum { index: b, .. }) => {
            let Type::Enumeration { path, literals } = elem_ty else {
                return if a > b {
                    Ok(Vec::new())
                } else {
                    Err(not_constant())
                };
            };
            (*a..=*b)
                .map(|i| enum_literal(path, literals, i))
                .collect()
        }
        (a, _, b) => Err(internal_error(format!(
            "range over {} and {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

/// The `index`th (1-based) literal of an enumeration type.
pub(crate) fn enum_literal(path: &Path, literals: &[String], index: i64) -> EvalResult<Value> {
    usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| literals.get(i))
        .map(|name| Value::enum_literal(path.join(name.as_str()), index))
        .ok_or_else(|| {
            moc_values::invalid_cast_or_shape(format!(
                "enumeration {path} has no literal with index {index}"
            ))
        })
}
