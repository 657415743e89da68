//! Declared types as annotated by the type checker.

use crate::{Expr, Path};

/// One array dimension of a declared type.
#[derive(Clone, PartialEq, Debug)]
pub enum Dimension {
    /// Statically known size.
    Known(usize),
    /// Dimension indexed by an enumeration; the size is the literal count.
    Enum { path: Path, size: usize },
    /// Dimension indexed by `Boolean` (always size 2).
    Boolean,
    /// Size given by an expression that still needs evaluation.
    Exp(Box<Expr>),
    /// Size not known (`:` in a declaration).
    Unknown,
}

impl Dimension {
    /// The size when it is known without evaluation.
    pub fn static_size(&self) -> Option<usize> {
        match self {
            Dimension::Known(n) | Dimension::Enum { size: n, .. } => Some(*n),
            Dimension::Boolean => Some(2),
            Dimension::Exp(_) | Dimension::Unknown => None,
        }
    }
}

/// A declared type.
#[derive(Clone, PartialEq, Debug)]
pub enum Type {
    Integer,
    Real,
    Boolean,
    String,
    /// Enumeration type with its literals in declaration order.
    Enumeration { path: Path, literals: Vec<String> },
    /// Array type. `dims` lists every dimension, outermost first.
    Array { elem: Box<Type>, dims: Vec<Dimension> },
    /// Record type; fields are looked up through the class definition.
    Record { path: Path },
    Tuple(Vec<Type>),
    /// MetaModelica `list<T>`.
    List(Box<Type>),
    /// MetaModelica `Option<T>`.
    Optional(Box<Type>),
    /// Polymorphic boxed value.
    MetaBoxed(Box<Type>),
    /// Quoted code.
    Code,
    /// Result of a call that returns nothing.
    NoReturn,
    Unknown,
}

impl Type {
    /// Shorthand for an array type with statically known dimensions.
    pub fn array(elem: Type, dims: &[usize]) -> Type {
        Type::Array {
            elem: Box::new(elem),
            dims: dims.iter().map(|&d| Dimension::Known(d)).collect(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. })
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Type::Record { .. })
    }

    /// Array dimensions, or an empty slice for scalars.
    pub fn dims(&self) -> &[Dimension] {
        match self {
            Type::Array { dims, .. } => dims,
            _ => &[],
        }
    }

    /// All dimension sizes when every one is statically known.
    pub fn static_dims(&self) -> Option<Vec<usize>> {
        self.dims().iter().map(Dimension::static_size).collect()
    }

    /// Element type with array dimensions stripped.
    pub fn element_type(&self) -> &Type {
        match self {
            Type::Array { elem, .. } => elem.element_type(),
            other => other,
        }
    }
}
