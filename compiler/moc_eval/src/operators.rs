//! Arithmetic on evaluated operands.
//!
//! Scalars go through a safe Integer-or-Real dispatch: two Integers use
//! checked integer arithmetic, two Reals use IEEE-754 arithmetic. A mixed
//! pair means the type checker did not insert a cast, which is an internal
//! error. Array operators map the scalar operation over leaves according to
//! the operand shape encoded in the operator tag.
//!
//! Integer `^` stays in the Integers: a negative exponent is an invalid
//! argument rather than a silent switch to Real.
//!
//! Division by zero is detected by the caller, which knows the source
//! expressions; an Integer division that still sees a zero divisor reports
//! it without them.

use moc_ir::{BinaryOp, UnaryOp};
use moc_values::{
    division_by_zero, integer_overflow, internal_error, invalid_argument, invalid_cast_or_shape,
    not_constant, EvalResult, Value,
};

use crate::shape::identity;

/// Scalar arithmetic operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Arith {
    fn name(self) -> &'static str {
        match self {
            Arith::Add => "addition",
            Arith::Sub => "subtraction",
            Arith::Mul => "multiplication",
            Arith::Div => "division",
            Arith::Pow => "exponentiation",
        }
    }
}

/// Operand shape of a binary operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Shape {
    Scalar,
    ArrayArray,
    ArrayScalar,
    ScalarArray,
}

fn classify(op: BinaryOp) -> Option<(Arith, Shape)> {
    use BinaryOp as B;
    let classified = match op {
        B::Add => (Arith::Add, Shape::Scalar),
        B::Sub => (Arith::Sub, Shape::Scalar),
        B::Mul => (Arith::Mul, Shape::Scalar),
        B::Div => (Arith::Div, Shape::Scalar),
        B::Pow => (Arith::Pow, Shape::Scalar),
        B::AddArr => (Arith::Add, Shape::ArrayArray),
        B::SubArr => (Arith::Sub, Shape::ArrayArray),
        B::MulArr => (Arith::Mul, Shape::ArrayArray),
        B::DivArr => (Arith::Div, Shape::ArrayArray),
        B::PowArr => (Arith::Pow, Shape::ArrayArray),
        B::AddArrayScalar => (Arith::Add, Shape::ArrayScalar),
        B::SubArrayScalar => (Arith::Sub, Shape::ArrayScalar),
        B::MulArrayScalar => (Arith::Mul, Shape::ArrayScalar),
        B::DivArrayScalar => (Arith::Div, Shape::ArrayScalar),
        B::PowArrayScalar => (Arith::Pow, Shape::ArrayScalar),
        B::AddScalarArray => (Arith::Add, Shape::ScalarArray),
        B::SubScalarArray => (Arith::Sub, Shape::ScalarArray),
        B::MulScalarArray => (Arith::Mul, Shape::ScalarArray),
        B::DivScalarArray => (Arith::Div, Shape::ScalarArray),
        B::PowScalarArray => (Arith::Pow, Shape::ScalarArray),
        B::AddStr | B::MulScalarProduct | B::MulMatrixProduct | B::PowMatrix => return None,
    };
    Some(classified)
}

/// Apply a binary operator to evaluated operands.
pub(crate) fn binary_op(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    let Some((arith, shape)) = classify(op) else {
        return match op {
            BinaryOp::AddStr => concat_strings(lhs, rhs),
            BinaryOp::MulScalarProduct => dot(lhs, rhs),
            BinaryOp::MulMatrixProduct => matrix_product(lhs, rhs),
            _ => matrix_power(lhs, rhs),
        };
    };
    match shape {
        Shape::Scalar if lhs.is_array() || rhs.is_array() => Err(internal_error(format!(
            "scalar operator `{}` applied to an array",
            op.as_symbol()
        ))),
        Shape::Scalar => scalar_op(arith, lhs, rhs),
        Shape::ArrayArray => lhs
            .try_zip_leaves(rhs, &mut |a, b| scalar_op(arith, a, b))
            .unwrap_or_else(|| {
                Err(invalid_cast_or_shape(format!(
                    "operands of `{}` have sizes {:?} and {:?}",
                    op.as_symbol(),
                    lhs.dims(),
                    rhs.dims()
                )))
            }),
        Shape::ArrayScalar => lhs.try_map_leaves(&mut |a| scalar_op(arith, a, rhs)),
        Shape::ScalarArray => rhs.try_map_leaves(&mut |b| scalar_op(arith, lhs, b)),
    }
}

/// Integer-or-Real dispatch for one scalar operation.
pub(crate) fn scalar_op(op: Arith, lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => int_op(op, *a, *b),
        (Value::Real(a), Value::Real(b)) => real_op(op, *a, *b),
        (Value::Str(a), Value::Str(b)) if op == Arith::Add => {
            Ok(Value::string(format!("{}{}", a.as_str(), b.as_str())))
        }
        (Value::Empty(_), _) | (_, Value::Empty(_)) => Err(not_constant()),
        (a, b) => Err(internal_error(format!(
            "{} of {} and {}",
            op.name(),
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn int_op(op: Arith, a: i64, b: i64) -> EvalResult<Value> {
    let result = match op {
        Arith::Add => a.checked_add(b),
        Arith::Sub => a.checked_sub(b),
        Arith::Mul => a.checked_mul(b),
        Arith::Div => {
            if b == 0 {
                return Err(division_by_zero(&a.to_string(), "0"));
            }
            a.checked_div(b)
        }
        Arith::Pow => {
            if b < 0 {
                return Err(invalid_argument("^", "Integer exponent must be non-negative"));
            }
            u32::try_from(b).ok().and_then(|e| a.checked_pow(e))
        }
    };
    result
        .map(Value::Integer)
        .ok_or_else(|| integer_overflow(op.name()))
}

fn real_op(op: Arith, a: f64, b: f64) -> EvalResult<Value> {
    let result = match op {
        Arith::Add => a + b,
        Arith::Sub => a - b,
        Arith::Mul => a * b,
        Arith::Div => a / b,
        Arith::Pow => {
            let p = a.powf(b);
            if p.is_nan() && !a.is_nan() && !b.is_nan() {
                return Err(invalid_argument(
                    "^",
                    format!("{a} ^ {b} is not a real number"),
                ));
            }
            p
        }
    };
    Ok(Value::Real(result))
}

fn concat_strings(lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => {
            Ok(Value::string(format!("{}{}", a.as_str(), b.as_str())))
        }
        (Value::Array { .. }, Value::Array { .. }) => lhs
            .try_zip_leaves(rhs, &mut concat_strings)
            .unwrap_or_else(|| Err(invalid_cast_or_shape("string arrays have different sizes"))),
        (a, b) => Err(internal_error(format!(
            "string concatenation of {} and {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

/// Additive identity for elements like `like`.
pub(crate) fn zero_like(like: &Value) -> Value {
    match like {
        Value::Real(_) => Value::Real(0.0),
        _ => Value::Integer(0),
    }
}

/// Sum of pairwise products.
fn dot_slices(a: &[Value], b: &[Value]) -> EvalResult<Value> {
    if a.len() != b.len() {
        return Err(invalid_cast_or_shape(format!(
            "scalar product of vectors of sizes {} and {}",
            a.len(),
            b.len()
        )));
    }
    let mut sum = match a.first() {
        Some(first) => zero_like(first),
        None => Value::Integer(0),
    };
    for (x, y) in a.iter().zip(b) {
        let product = scalar_op(Arith::Mul, x, y)?;
        sum = scalar_op(Arith::Add, &sum, &product)?;
    }
    Ok(sum)
}

fn vector_elements(v: &Value) -> EvalResult<&[Value]> {
    v.elements()
        .ok_or_else(|| internal_error(format!("expected a vector, got {}", v.type_name())))
}

fn dot(lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    dot_slices(vector_elements(lhs)?, vector_elements(rhs)?)
}

/// Matrix-vector, vector-matrix, matrix-matrix or vector-vector product,
/// tried in that order.
pub(crate) fn matrix_product(lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    match (lhs.is_matrix(), rhs.is_matrix()) {
        (true, false) => {
            let rows = matrix_rows(lhs)?;
            let v = vector_elements(rhs)?;
            let out = rows
                .iter()
                .map(|row| dot_slices(row, v))
                .collect::<EvalResult<Vec<_>>>()?;
            Ok(Value::array_with_dims(out, vec![rows.len()]))
        }
        (false, true) => {
            let v = vector_elements(lhs)?;
            let cols = columns(rhs)?;
            let out = cols
                .iter()
                .map(|col| dot_slices(v, col))
                .collect::<EvalResult<Vec<_>>>()?;
            let n = out.len();
            Ok(Value::array_with_dims(out, vec![n]))
        }
        (true, true) => {
            let rows = matrix_rows(lhs)?;
            let cols = columns(rhs)?;
            let out = rows
                .iter()
                .map(|row| {
                    let entries = cols
                        .iter()
                        .map(|col| dot_slices(row, col))
                        .collect::<EvalResult<Vec<_>>>()?;
                    Ok(Value::array_with_dims(entries, vec![cols.len()]))
                })
                .collect::<EvalResult<Vec<_>>>()?;
            Ok(Value::array_with_dims(out, vec![rows.len(), cols.len()]))
        }
        (false, false) => dot(lhs, rhs),
    }
}

fn matrix_rows(m: &Value) -> EvalResult<Vec<&[Value]>> {
    m.matrix_rows()
        .ok_or_else(|| internal_error("matrix operand is not rectangular"))
}

fn columns(m: &Value) -> EvalResult<Vec<Vec<Value>>> {
    let transposed = m
        .transpose()
        .ok_or_else(|| internal_error("matrix operand is not rectangular"))?;
    Ok(transposed
        .elements()
        .unwrap_or_default()
        .iter()
        .map(|col| col.elements().unwrap_or_default().to_vec())
        .collect())
}

/// Square matrix to a non-negative Integer power.
fn matrix_power(lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    let Value::Integer(n) = rhs else {
        return Err(internal_error(format!(
            "matrix power with a {} exponent",
            rhs.type_name()
        )));
    };
    let dims = lhs.dims();
    if dims.len() != 2 || dims[0] != dims[1] {
        return Err(invalid_cast_or_shape(format!(
            "matrix power of a non-square matrix of size {dims:?}"
        )));
    }
    if *n < 0 {
        return Err(invalid_argument("^", "matrix exponent must be non-negative"));
    }
    let like = lhs.flatten().into_iter().next().unwrap_or(Value::Integer(0));
    let mut result = identity(dims[0], &like);
    let mut base = lhs.clone();
    let mut n = *n;
    // Square-and-multiply: O(log n) products.
    while n > 0 {
        if n & 1 == 1 {
            result = matrix_product(&result, &base)?;
        }
        n >>= 1;
        if n > 0 {
            base = matrix_product(&base, &base)?;
        }
    }
    Ok(result)
}

/// Negation; arrays are negated elementwise.
pub(crate) fn unary_op(op: UnaryOp, value: &Value) -> EvalResult<Value> {
    match op {
        UnaryOp::Minus | UnaryOp::MinusArr => value.try_map_leaves(&mut negate),
    }
}

fn negate(value: &Value) -> EvalResult<Value> {
    match value {
        Value::Integer(n) => n
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| integer_overflow("negation")),
        Value::Real(x) => Ok(Value::Real(-x)),
        Value::Empty(_) => Err(not_constant()),
        other => Err(internal_error(format!("negation of {}", other.type_name()))),
    }
}
