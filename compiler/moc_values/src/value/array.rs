//! Array shape helpers.
//!
//! Arrays are nested `Value::Array`s, one level per dimension. These helpers
//! keep `dims` consistent when flattening, re-nesting and mapping.

use super::Value;

impl Value {
    /// Scalar leaves of a (possibly nested) array in row-major order. A
    /// non-array yields itself.
    pub fn flatten(&self) -> Vec<Value> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<Value>) {
        match self {
            Value::Array { elements, .. } => {
                for e in elements.iter() {
                    e.flatten_into(out);
                }
            }
            other => out.push(other.clone()),
        }
    }

    /// Re-nest a row-major sequence into an array of the given shape.
    ///
    /// The caller guarantees `flat.len()` equals the product of `dims`.
    pub fn from_flat(flat: Vec<Value>, dims: &[usize]) -> Value {
        match dims {
            [] => {
                let n = flat.len();
                Value::array_with_dims(flat, vec![n])
            }
            [_] => Value::array_with_dims(flat, dims.to_vec()),
            [outer, inner @ ..] => {
                let chunk: usize = inner.iter().product();
                let mut rest = flat.into_iter();
                let rows = (0..*outer)
                    .map(|_| Value::from_flat(rest.by_ref().take(chunk).collect(), inner))
                    .collect();
                Value::array_with_dims(rows, dims.to_vec())
            }
        }
    }

    /// Apply `f` to every scalar leaf, preserving the array shape.
    pub fn try_map_leaves<E>(
        &self,
        f: &mut dyn FnMut(&Value) -> Result<Value, E>,
    ) -> Result<Value, E> {
        match self {
            Value::Array { elements, dims } => {
                let mapped = elements
                    .iter()
                    .map(|e| e.try_map_leaves(f))
                    .collect::<Result<Vec<_>, E>>()?;
                Ok(Value::array_with_dims(mapped, dims.clone()))
            }
            other => f(other),
        }
    }

    /// Combine the scalar leaves of two equally shaped arrays. Returns `None`
    /// when the shapes differ. The result takes the left operand's shape.
    pub fn try_zip_leaves<E>(
        &self,
        other: &Value,
        f: &mut dyn FnMut(&Value, &Value) -> Result<Value, E>,
    ) -> Option<Result<Value, E>> {
        match (self, other) {
            (
                Value::Array { elements: a, dims },
                Value::Array {
                    elements: b,
                    dims: other_dims,
                },
            ) => {
                if dims != other_dims || a.len() != b.len() {
                    return None;
                }
                let mut out = Vec::with_capacity(a.len());
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.try_zip_leaves(y, f)? {
                        Ok(v) => out.push(v),
                        Err(e) => return Some(Err(e)),
                    }
                }
                Some(Ok(Value::array_with_dims(out, dims.clone())))
            }
            (Value::Array { .. }, _) | (_, Value::Array { .. }) => None,
            (x, y) => Some(f(x, y)),
        }
    }

    /// Whether this is an array whose elements are themselves arrays.
    pub fn is_matrix(&self) -> bool {
        matches!(
            self,
            Value::Array { elements, .. } if matches!(elements.first(), Some(Value::Array { .. }))
        )
    }

    /// Rows of a two-level array.
    pub fn matrix_rows(&self) -> Option<Vec<&[Value]>> {
        let rows = self.elements()?;
        rows.iter()
            .map(|r| match r {
                Value::Array { elements, .. } => Some(elements.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Transpose of a matrix (swaps the first two dimensions).
    pub fn transpose(&self) -> Option<Value> {
        let rows = self.matrix_rows()?;
        let dims = self.dims();
        if dims.len() < 2 {
            return None;
        }
        let (n, m) = (dims[0], dims[1]);
        let inner = dims[2..].to_vec();
        let mut cols = Vec::with_capacity(m);
        for j in 0..m {
            let col: Vec<Value> = rows
                .iter()
                .map(|row| row.get(j).cloned())
                .collect::<Option<_>>()?;
            let mut col_dims = vec![n];
            col_dims.extend_from_slice(&inner);
            cols.push(Value::array_with_dims(col, col_dims));
        }
        let mut out_dims = vec![m, n];
        out_dims.extend_from_slice(&inner);
        Some(Value::array_with_dims(cols, out_dims))
    }
}
