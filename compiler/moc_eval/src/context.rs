//! The threaded evaluation context.
//!
//! `EvalContext` is passed into every evaluation step and returned updated;
//! there is no global evaluation state. Cloning is cheap (two `Arc`s), so
//! the rule combinator can hand each alternative its own copy and keep the
//! one from the alternative that succeeded.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use moc_ir::Path;
use moc_values::Value;

use crate::environment::FunctionDef;

/// Function definitions available to the external call evaluator.
#[derive(Clone, Debug, Default)]
pub struct FunctionTable {
    functions: FxHashMap<String, FunctionDef>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, def: FunctionDef) {
        self.functions.insert(def.path.to_string(), def);
    }

    pub fn get(&self, path: &Path) -> Option<&FunctionDef> {
        self.functions.get(&path.to_string())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Per-session accumulator: variables already forced constant, and the
/// function table handle.
#[derive(Clone, Debug, Default)]
pub struct EvalContext {
    constants: Arc<FxHashMap<String, Value>>,
    functions: Arc<FunctionTable>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context sharing an existing function table.
    pub fn with_functions(functions: Arc<FunctionTable>) -> Self {
        EvalContext {
            constants: Arc::default(),
            functions,
        }
    }

    /// Key under which a variable's value is remembered.
    pub fn constant_key(scope: &str, name: &str) -> String {
        if scope.is_empty() {
            name.to_string()
        } else {
            format!("{scope}.{name}")
        }
    }

    /// Value previously forced for a scope-qualified variable.
    pub fn constant(&self, key: &str) -> Option<&Value> {
        self.constants.get(key)
    }

    /// Remember a forced value. The map only grows.
    pub fn record_constant(&mut self, key: String, value: Value) {
        Arc::make_mut(&mut self.constants)
            .entry(key)
            .or_insert(value);
    }

    /// Number of variables forced so far.
    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Add a function definition, copying the table if it is shared.
    pub fn add_function(&mut self, def: FunctionDef) {
        Arc::make_mut(&mut self.functions).insert(def);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moc_ir::Type;

    #[test]
    fn constants_grow_monotonically() {
        let mut ctx = EvalContext::new();
        let key = EvalContext::constant_key("M", "p");
        assert_eq!(key, "M.p");
        ctx.record_constant(key.clone(), Value::Integer(3));
        ctx.record_constant(key.clone(), Value::Integer(4));
        assert_eq!(ctx.constant(&key), Some(&Value::Integer(3)));
        assert_eq!(ctx.constant_count(), 1);
        assert_eq!(EvalContext::constant_key("", "q"), "q");
    }

    #[test]
    fn clones_are_independent() {
        let mut a = EvalContext::new();
        let b = a.clone();
        a.record_constant("x".into(), Value::Bool(true));
        assert_eq!(a.constant_count(), 1);
        assert_eq!(b.constant_count(), 0);
    }

    #[test]
    fn function_table_copy_on_write() {
        let mut table = FunctionTable::new();
        table.insert(FunctionDef {
            path: Path::parse("P.f"),
            inputs: vec!["x".into()],
            output: Type::Real,
            impure: false,
            external: None,
        });
        let shared = Arc::new(table);
        let mut ctx = EvalContext::with_functions(Arc::clone(&shared));
        ctx.add_function(FunctionDef {
            path: Path::parse("P.g"),
            inputs: Vec::new(),
            output: Type::Integer,
            impure: true,
            external: None,
        });
        assert_eq!(shared.len(), 1);
        assert_eq!(ctx.functions().len(), 2);
        assert!(ctx.functions().get(&Path::parse("P.g")).is_some());
    }
}
