//! Values produced by constant evaluation.
//!
//! # Heap Enforcement
//!
//! Every variant that owns shared data holds it in a [`Heap<T>`], whose
//! constructor is private to this module. Values are therefore built only
//! through the factory methods below:
//!
//! ```text
//! let s = Value::string("hello");
//! let v = Value::array(vec![Value::Integer(1), Value::Integer(2)]);
//! let r = Value::record(path, fields, names, -1);
//! ```
//!
//! # Array Shape
//!
//! `Array::dims` always has one entry per nesting level and each level has
//! exactly `dims[k]` elements. [`Value::array`] derives the dimensions from
//! the elements; [`Value::array_with_dims`] is used when the declared shape
//! is known, which matters for empty arrays (`Real[0, 3]`).

mod array;
mod heap;

use std::fmt;

use moc_ir::{format_real, CodeFragment, Path, Type};

pub use heap::Heap;

/// Record instance.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordValue {
    pub path: Path,
    pub fields: Vec<Value>,
    pub field_names: Vec<String>,
    /// Position of the record within its uniontype, or -1 for plain records.
    pub index: i32,
}

impl RecordValue {
    /// Value of the named field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.field_names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.fields.get(i))
    }
}

/// Placeholder for a variable that has a declared type but no binding.
///
/// Carries enough context for a later phase to report the missing binding
/// at a location the evaluator does not know.
#[derive(Clone, Debug, PartialEq)]
pub struct EmptyValue {
    /// Scope the variable was looked up in.
    pub scope: String,
    pub name: String,
    pub ty: Type,
}

/// Result of constant evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    // Scalars
    Integer(i64),
    Real(f64),
    Bool(bool),
    Str(Heap<String>),
    /// Enumeration literal; `index` is 1-based.
    Enum { path: Path, index: i64 },

    // Collections
    /// Rectangular array, nested one level per dimension.
    Array {
        elements: Heap<Vec<Value>>,
        dims: Vec<usize>,
    },
    /// MetaModelica list.
    List(Heap<Vec<Value>>),
    Tuple(Heap<Vec<Value>>),
    Record(Heap<RecordValue>),
    /// `SOME(v)` / `NONE()`.
    Optional(Option<Heap<Value>>),
    /// Polymorphic box.
    Boxed(Heap<Value>),

    // Markers
    /// Result of `fail()`.
    Fail,
    /// Result of a call that returns nothing.
    NoReturn,
    /// Quoted code.
    Code(Heap<CodeFragment>),
    /// Deferred unbound variable.
    Empty(Heap<EmptyValue>),
}

// Factory methods (the only way to build heap values)

impl Value {
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    #[inline]
    pub fn enum_literal(path: Path, index: i64) -> Self {
        Value::Enum { path, index }
    }

    /// Array whose dimensions are derived from its elements: the element
    /// count followed by the dimensions of the first element.
    pub fn array(elements: Vec<Value>) -> Self {
        let mut dims = vec![elements.len()];
        if let Some(Value::Array { dims: inner, .. }) = elements.first() {
            dims.extend_from_slice(inner);
        }
        Value::Array {
            elements: Heap::new(elements),
            dims,
        }
    }

    /// Array with explicitly known dimensions.
    pub fn array_with_dims(elements: Vec<Value>, dims: Vec<usize>) -> Self {
        Value::Array {
            elements: Heap::new(elements),
            dims,
        }
    }

    #[inline]
    pub fn list(elements: Vec<Value>) -> Self {
        Value::List(Heap::new(elements))
    }

    #[inline]
    pub fn tuple(elements: Vec<Value>) -> Self {
        Value::Tuple(Heap::new(elements))
    }

    pub fn record(path: Path, fields: Vec<Value>, field_names: Vec<String>, index: i32) -> Self {
        Value::Record(Heap::new(RecordValue {
            path,
            fields,
            field_names,
            index,
        }))
    }

    #[inline]
    pub fn some(value: Value) -> Self {
        Value::Optional(Some(Heap::new(value)))
    }

    #[inline]
    pub fn none() -> Self {
        Value::Optional(None)
    }

    #[inline]
    pub fn boxed(value: Value) -> Self {
        Value::Boxed(Heap::new(value))
    }

    #[inline]
    pub fn code(fragment: CodeFragment) -> Self {
        Value::Code(Heap::new(fragment))
    }

    pub fn empty(scope: impl Into<String>, name: impl Into<String>, ty: Type) -> Self {
        Value::Empty(Heap::new(EmptyValue {
            scope: scope.into(),
            name: name.into(),
            ty,
        }))
    }
}

// Accessors

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(x) => Some(*x),
            _ => None,
        }
    }

    /// Integer or Real widened to `f64`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Real(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Elements of an array or list.
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::Array { elements, .. } | Value::List(elements) => Some(elements.as_slice()),
            _ => None,
        }
    }

    /// Array dimensions; empty for anything that is not an array.
    pub fn dims(&self) -> &[usize] {
        match self {
            Value::Array { dims, .. } => dims,
            _ => &[],
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array { .. })
    }

    /// Exact zero test for divisors (no epsilon).
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Integer(n) => *n == 0,
            Value::Real(x) => *x == 0.0,
            _ => false,
        }
    }

    /// Strip any number of `Boxed` wrappers.
    pub fn unboxed(&self) -> &Value {
        match self {
            Value::Boxed(inner) => inner.unboxed(),
            other => other,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Real(_) => "Real",
            Value::Bool(_) => "Boolean",
            Value::Str(_) => "String",
            Value::Enum { .. } => "enumeration",
            Value::Array { .. } => "array",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Record(_) => "record",
            Value::Optional(_) => "Option",
            Value::Boxed(_) => "boxed",
            Value::Fail => "fail",
            Value::NoReturn => "no return",
            Value::Code(_) => "Code",
            Value::Empty(_) => "empty",
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Real(x) => write!(f, "{}", format_real(*x)),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "\"{}\"", s.as_str()),
            Value::Enum { path, .. } => write!(f, "{path}"),
            Value::Array { elements, .. } | Value::List(elements) => {
                write_seq(f, "{", elements, "}")
            }
            Value::Tuple(elements) => write_seq(f, "(", elements, ")"),
            Value::Record(r) => {
                write!(f, "{}(", r.path)?;
                for (i, (name, value)) in r.field_names.iter().zip(r.fields.iter()).enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name} = {value}")?;
                }
                write!(f, ")")
            }
            Value::Optional(Some(v)) => write!(f, "SOME({v})"),
            Value::Optional(None) => write!(f, "NONE()"),
            Value::Boxed(v) => write!(f, "{v}"),
            Value::Fail => write!(f, "fail()"),
            Value::NoReturn => write!(f, "#NORETURN#"),
            Value::Code(code) => write!(f, "$Code({code})"),
            Value::Empty(e) => write!(f, "<empty {}>", e.name),
        }
    }
}

#[cfg(test)]
mod tests;
