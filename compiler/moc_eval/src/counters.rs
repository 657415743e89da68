//! Evaluation counters for profiling.
//!
//! Counting goes through `&self` because the evaluator is shared immutably
//! by every recursive step.

use std::cell::Cell;

#[derive(Debug, Default)]
pub struct EvalCounters {
    expressions: Cell<u64>,
    crefs: Cell<u64>,
    builtin_calls: Cell<u64>,
    function_calls: Cell<u64>,
}

fn bump(c: &Cell<u64>) {
    c.set(c.get().wrapping_add(1));
}

impl EvalCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn count_expression(&self) {
        bump(&self.expressions);
    }

    #[inline]
    pub fn count_cref(&self) {
        bump(&self.crefs);
    }

    #[inline]
    pub fn count_builtin_call(&self) {
        bump(&self.builtin_calls);
    }

    #[inline]
    pub fn count_function_call(&self) {
        bump(&self.function_calls);
    }

    pub fn expressions(&self) -> u64 {
        self.expressions.get()
    }

    pub fn crefs(&self) -> u64 {
        self.crefs.get()
    }

    pub fn builtin_calls(&self) -> u64 {
        self.builtin_calls.get()
    }

    pub fn function_calls(&self) -> u64 {
        self.function_calls.get()
    }

    /// Format a summary report.
    pub fn report(&self) -> String {
        format!(
            "Evaluation profile:\n  \
             Expressions evaluated: {}\n  \
             Component references:  {}\n  \
             Builtin calls:         {}\n  \
             Function calls:        {}",
            self.expressions(),
            self.crefs(),
            self.builtin_calls(),
            self.function_calls(),
        )
    }
}
