//! Values produced by constant evaluation, and the ways evaluation fails.
//!
//! - [`Value`]: the closed result type, with `Heap<T>`-enforced factories
//! - [`EvalError`] / [`EvalErrorKind`]: structured failure categories with
//!   conversion to [`moc_diagnostic::Diagnostic`]

mod errors;
mod value;

pub use errors::{
    dimension_not_known, division_by_zero, index_out_of_bounds, integer_overflow,
    internal_error, invalid_argument, invalid_cast_or_shape, iteration_limit_exceeded,
    modulo_by_zero, negative_sqrt, not_constant, recursion_limit_exceeded,
    reduction_guard_failure, unbound_value, EvalError, EvalErrorKind, EvalResult,
};
pub use value::{EmptyValue, Heap, RecordValue, Value};
