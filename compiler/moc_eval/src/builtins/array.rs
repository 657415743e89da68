//! Array construction, reduction and shape builtins.

use moc_ir::Expr;
use moc_values::{invalid_argument, invalid_cast_or_shape, EvalResult, Value};

use super::{
    arg, int_arg, real_arg, require_arg_range, require_args, seq_arg, size_arg, Builtin,
    BuiltinTable,
};
use crate::context::EvalContext;
use crate::evaluator::{expected, ConstEvaluator, EvalOutcome, Request};
use crate::operators::{scalar_op, zero_like, Arith};
use crate::shape::{concat, fill, identity};

pub(super) fn register(table: &mut BuiltinTable) {
    table.insert("diagonal", Builtin::Strict(diagonal));
    table.insert("cross", Builtin::Strict(cross));
    table.insert("identity", Builtin::Strict(identity_matrix));
    table.insert("promote", Builtin::Strict(promote));
    table.insert("fill", Builtin::Strict(fill_array));
    table.insert("zeros", Builtin::Strict(|a| filled("zeros", &Value::Integer(0), a)));
    table.insert("ones", Builtin::Strict(|a| filled("ones", &Value::Integer(1), a)));
    table.insert("cat", Builtin::Strict(cat));
    table.insert("sum", Builtin::Strict(|a| fold_leaves("sum", Arith::Add, a)));
    table.insert("product", Builtin::Strict(|a| fold_leaves("product", Arith::Mul, a)));
    table.insert("ndims", Builtin::Special(ndims));
    table.insert("size", Builtin::Special(size));
    table.insert("scalar", Builtin::Strict(scalar));
    table.insert("vector", Builtin::Strict(vector));
    table.insert("matrix", Builtin::Strict(matrix));
    table.insert("transpose", Builtin::Strict(transpose));
    table.insert("outerProduct", Builtin::Strict(outer_product));
    table.insert("symmetric", Builtin::Strict(symmetric));
    table.insert("skew", Builtin::Strict(skew));
    table.insert("linspace", Builtin::Strict(linspace));
}

fn vector_of(values: Vec<Value>) -> Value {
    let n = values.len();
    Value::array_with_dims(values, vec![n])
}

fn matrix_of(rows: Vec<Vec<Value>>, cols: usize) -> Value {
    let n = rows.len();
    let rows = rows
        .into_iter()
        .map(|row| Value::array_with_dims(row, vec![cols]))
        .collect();
    Value::array_with_dims(rows, vec![n, cols])
}

fn square_rows<'v>(name: &str, m: &'v Value) -> EvalResult<Vec<&'v [Value]>> {
    let rows = m
        .matrix_rows()
        .ok_or_else(|| expected(name, "matrix", m))?;
    if rows.iter().any(|r| r.len() != rows.len()) {
        return Err(invalid_cast_or_shape(format!(
            "`{name}` needs a square matrix, got size {:?}",
            m.dims()
        )));
    }
    Ok(rows)
}

fn vector_len<'v>(name: &str, args: &'v [Value], i: usize, n: usize) -> EvalResult<&'v [Value]> {
    let v = seq_arg(name, args, i)?;
    if v.len() != n {
        return Err(invalid_cast_or_shape(format!(
            "`{name}` needs vectors of size {n}, got {}",
            v.len()
        )));
    }
    Ok(v)
}

fn mul(a: &Value, b: &Value) -> EvalResult<Value> {
    scalar_op(Arith::Mul, a, b)
}

fn sub(a: &Value, b: &Value) -> EvalResult<Value> {
    scalar_op(Arith::Sub, a, b)
}

/// Square matrix with `v` on the diagonal.
fn diagonal(args: &[Value]) -> EvalResult<Value> {
    require_args("diagonal", 1, args)?;
    let v = seq_arg("diagonal", args, 0)?;
    let n = v.len();
    let rows = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if i == j { v[i].clone() } else { zero_like(&v[i]) })
                .collect()
        })
        .collect();
    Ok(matrix_of(rows, n))
}

fn cross(args: &[Value]) -> EvalResult<Value> {
    require_args("cross", 2, args)?;
    let x = vector_len("cross", args, 0, 3)?;
    let y = vector_len("cross", args, 1, 3)?;
    let component = |a: usize, b: usize| sub(&mul(&x[a], &y[b])?, &mul(&x[b], &y[a])?);
    Ok(vector_of(vec![
        component(1, 2)?,
        component(2, 0)?,
        component(0, 1)?,
    ]))
}

fn identity_matrix(args: &[Value]) -> EvalResult<Value> {
    require_args("identity", 1, args)?;
    let n = size_arg("identity", args, 0)?;
    Ok(identity(n, &Value::Integer(0)))
}

/// Append trailing dimensions of size 1 until the rank is `n`.
fn promote(args: &[Value]) -> EvalResult<Value> {
    require_args("promote", 2, args)?;
    let value = arg("promote", args, 0)?;
    let n = size_arg("promote", args, 1)?;
    let rank = value.dims().len();
    if n < rank {
        return Err(invalid_argument(
            "promote",
            format!("cannot promote a rank {rank} array to rank {n}"),
        ));
    }
    Ok(append_unit_dims(value, n - rank))
}

fn append_unit_dims(value: &Value, k: usize) -> Value {
    match value {
        Value::Array { elements, dims } => {
            let elements = elements.iter().map(|e| append_unit_dims(e, k)).collect();
            let mut dims = dims.clone();
            dims.extend(std::iter::repeat(1).take(k));
            Value::array_with_dims(elements, dims)
        }
        scalar => (0..k).fold(scalar.clone(), |v, _| Value::array(vec![v])),
    }
}

fn dims_from(name: &str, args: &[Value], from: usize) -> EvalResult<Vec<usize>> {
    (from..args.len()).map(|i| size_arg(name, args, i)).collect()
}

fn fill_array(args: &[Value]) -> EvalResult<Value> {
    if args.len() < 2 {
        return Err(invalid_argument("fill", "needs a value and at least one size"));
    }
    let dims = dims_from("fill", args, 1)?;
    Ok(fill(arg("fill", args, 0)?, &dims))
}

fn filled(name: &str, value: &Value, args: &[Value]) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(invalid_argument(name, "needs at least one size"));
    }
    Ok(fill(value, &dims_from(name, args, 0)?))
}

/// `cat(k, A, B, ...)`.
fn cat(args: &[Value]) -> EvalResult<Value> {
    let k = int_arg("cat", args, 0)?;
    let k = usize::try_from(k)
        .map_err(|_| invalid_argument("cat", format!("dimension {k} must be positive")))?;
    concat(k, &args[1..])
}

/// Sum or product of all elements.
fn fold_leaves(name: &str, op: Arith, args: &[Value]) -> EvalResult<Value> {
    require_args(name, 1, args)?;
    let leaves = arg(name, args, 0)?.flatten();
    let unit = |like: &Value| match (op, like) {
        (Arith::Mul, Value::Real(_)) => Value::Real(1.0),
        (Arith::Mul, _) => Value::Integer(1),
        (_, like) => zero_like(like),
    };
    let Some(first) = leaves.first() else {
        return Ok(unit(&Value::Integer(0)));
    };
    leaves
        .iter()
        .try_fold(unit(first), |acc, leaf| scalar_op(op, &acc, leaf))
}

fn ndims(
    ev: &ConstEvaluator<'_>,
    ctx: EvalContext,
    req: Request<'_>,
    args: &[Expr],
) -> EvalOutcome {
    require_args("ndims", 1, args)?;
    let (ctx, dims) = ev.dims_of(ctx, req, &args[0])?;
    let rank = i64::try_from(dims.len()).map_err(|_| moc_values::integer_overflow("ndims"))?;
    Ok((ctx, Value::Integer(rank)))
}

fn size(ev: &ConstEvaluator<'_>, ctx: EvalContext, req: Request<'_>, args: &[Expr]) -> EvalOutcome {
    require_arg_range("size", 1, 2, args)?;
    ev.eval_size(ctx, req, &args[0], args.get(1))
}

/// The only element of an array whose dimensions are all 1.
fn scalar(args: &[Value]) -> EvalResult<Value> {
    require_args("scalar", 1, args)?;
    let value = arg("scalar", args, 0)?;
    if value.dims().iter().any(|&d| d != 1) {
        return Err(invalid_cast_or_shape(format!(
            "`scalar` needs an array of size 1, got {:?}",
            value.dims()
        )));
    }
    Ok(value.flatten().into_iter().next().unwrap_or_else(|| value.clone()))
}

/// Flatten an array with at most one dimension larger than 1.
fn vector(args: &[Value]) -> EvalResult<Value> {
    require_args("vector", 1, args)?;
    let value = arg("vector", args, 0)?;
    if value.dims().iter().filter(|&&d| d > 1).count() > 1 {
        return Err(invalid_cast_or_shape(format!(
            "`vector` needs at most one dimension larger than 1, got {:?}",
            value.dims()
        )));
    }
    Ok(vector_of(value.flatten()))
}

/// The first two dimensions; trailing dimensions must have size 1.
fn matrix(args: &[Value]) -> EvalResult<Value> {
    require_args("matrix", 1, args)?;
    let value = arg("matrix", args, 0)?;
    let dims = value.dims();
    match dims.len() {
        0 => Ok(matrix_of(vec![vec![value.clone()]], 1)),
        1 => Ok(Value::from_flat(value.flatten(), &[dims[0], 1])),
        2 => Ok(value.clone()),
        _ if dims[2..].iter().all(|&d| d == 1) => {
            Ok(Value::from_flat(value.flatten(), &dims[..2]))
        }
        _ => Err(invalid_cast_or_shape(format!(
            "`matrix` needs trailing dimensions of size 1, got {dims:?}"
        ))),
    }
}

fn transpose(args: &[Value]) -> EvalResult<Value> {
    require_args("transpose", 1, args)?;
    let value = arg("transpose", args, 0)?;
    value
        .transpose()
        .ok_or_else(|| expected("transpose", "matrix", value))
}

fn outer_product(args: &[Value]) -> EvalResult<Value> {
    require_args("outerProduct", 2, args)?;
    let x = seq_arg("outerProduct", args, 0)?;
    let y = seq_arg("outerProduct", args, 1)?;
    let rows = x
        .iter()
        .map(|a| y.iter().map(|b| mul(a, b)).collect::<EvalResult<Vec<_>>>())
        .collect::<EvalResult<Vec<_>>>()?;
    Ok(matrix_of(rows, y.len()))
}

/// Mirror the upper triangle onto the lower one.
fn symmetric(args: &[Value]) -> EvalResult<Value> {
    require_args("symmetric", 1, args)?;
    let rows = square_rows("symmetric", arg("symmetric", args, 0)?)?;
    let n = rows.len();
    let out = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if i > j { rows[j][i].clone() } else { rows[i][j].clone() })
                .collect()
        })
        .collect();
    Ok(matrix_of(out, n))
}

/// Cross-product matrix of a 3-vector.
fn skew(args: &[Value]) -> EvalResult<Value> {
    require_args("skew", 1, args)?;
    let x = vector_len("skew", args, 0, 3)?;
    let zero = zero_like(&x[0]);
    let neg = |v: &Value| sub(&zero, v);
    let rows = vec![
        vec![zero.clone(), neg(&x[2])?, x[1].clone()],
        vec![x[2].clone(), zero.clone(), neg(&x[0])?],
        vec![neg(&x[1])?, x[0].clone(), zero.clone()],
    ];
    Ok(matrix_of(rows, 3))
}

/// `n` equally spaced Reals from `x1` to `x2`.
fn linspace(args: &[Value]) -> EvalResult<Value> {
    require_args("linspace", 3, args)?;
    let x1 = real_arg("linspace", args, 0)?;
    let x2 = real_arg("linspace", args, 1)?;
    let n = size_arg("linspace", args, 2)?;
    if n < 2 {
        return Err(invalid_argument("linspace", format!("needs at least 2 points, got {n}")));
    }
    let step = (x2 - x1) / (n - 1) as f64;
    Ok(vector_of(
        (0..n).map(|i| Value::Real(x1 + i as f64 * step)).collect(),
    ))
}
