//! Moc IR - typed intermediate representation for constant evaluation.
//!
//! This crate contains the data structures the evaluator consumes:
//! - Spans for source locations
//! - Qualified paths (`Modelica.Math.sin`, `E.a`)
//! - Declared types and array dimensions
//! - Operator tags (scalar, array-array, array-scalar, scalar-array)
//! - Typed expressions (`Expr`), component references and subscripts
//! - Reductions (comprehension-style folds)
//! - Untyped AST fragments for quoted code (`AstExp`)
//!
//! The IR is produced by elaboration and type checking, which live outside
//! this workspace. Every type derives `Clone`, `PartialEq` and `Debug` so the
//! evaluator and its tests can build and compare trees directly.

pub mod ast;
mod expr;
mod operators;
mod path;
mod printer;
mod span;
mod types;

pub use ast::{AstExp, AstOp, CodeFragment};
pub use expr::{
    CallAttrs, ComponentRef, CrefPart, Expr, IterKind, Reduction, ReductionInfo,
    ReductionIterator, Subscript,
};
pub use operators::{BinaryOp, LogicalOp, RelationOp, UnaryOp};
pub use path::Path;
pub use printer::format_real;
pub use span::Span;
pub use types::{Dimension, Type};
