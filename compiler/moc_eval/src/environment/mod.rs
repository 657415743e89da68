//! Lexical environment consumed by the evaluator.
//!
//! The environment is a persistent chain of frames. Pushing a scope shares
//! the parent chain, so the reduction engine can bind an iterator per
//! iteration without copying the enclosing scopes. Defining into an `Env`
//! copies its innermost frame only when that frame is shared.
//!
//! Name resolution, inheritance and redeclaration are resolved before the
//! evaluator sees the environment; lookups here are exact-name.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use moc_ir::{Expr, Path, Type};
use moc_values::Value;

/// Variability of a declared variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Constness {
    Const,
    Param,
    Var,
}

impl Constness {
    /// Const and Param bindings are evaluable at translation time.
    #[inline]
    pub fn is_evaluable(self) -> bool {
        matches!(self, Constness::Const | Constness::Param)
    }
}

/// How a variable obtained its value.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    Unbound,
    Value(Value),
    Expr {
        expr: Expr,
        constness: Constness,
        /// Value computed by an earlier phase, if any.
        cached: Option<Value>,
    },
}

/// Declared type, constness and binding of a variable.
#[derive(Clone, Debug, PartialEq)]
pub struct VarInfo {
    pub ty: Type,
    pub constness: Constness,
    pub binding: Binding,
}

impl VarInfo {
    /// Constant bound to an already evaluated value.
    pub fn value(ty: Type, value: Value) -> Self {
        VarInfo {
            ty,
            constness: Constness::Const,
            binding: Binding::Value(value),
        }
    }

    /// Variable bound to an expression.
    pub fn bound(ty: Type, constness: Constness, expr: Expr) -> Self {
        VarInfo {
            ty,
            constness,
            binding: Binding::Expr {
                expr,
                constness,
                cached: None,
            },
        }
    }

    pub fn unbound(ty: Type, constness: Constness) -> Self {
        VarInfo {
            ty,
            constness,
            binding: Binding::Unbound,
        }
    }
}

/// Field of a record class.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordFieldDecl {
    pub name: String,
    pub ty: Type,
    pub default: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordDef {
    pub path: Path,
    pub fields: Vec<RecordFieldDecl>,
}

/// `external "C" name(...)` clause of a function.
#[derive(Clone, Debug, PartialEq)]
pub struct ExternalDecl {
    /// External identifier; defaults to the function's own name.
    pub name: String,
    pub language: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub path: Path,
    pub inputs: Vec<String>,
    pub output: Type,
    pub impure: bool,
    pub external: Option<ExternalDecl>,
}

/// Class definition visible to the evaluator.
#[derive(Clone, Debug, PartialEq)]
pub enum ClassDef {
    Record(RecordDef),
    Function(FunctionDef),
}

impl ClassDef {
    pub fn path(&self) -> &Path {
        match self {
            ClassDef::Record(r) => &r.path,
            ClassDef::Function(f) => &f.path,
        }
    }
}

/// Kind of a scope frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Class,
    Function,
    /// Frame introduced by a reduction or for-loop iterator.
    Iterator,
}

#[derive(Clone, Debug)]
struct Frame {
    name: String,
    kind: ScopeKind,
    vars: FxHashMap<String, VarInfo>,
    classes: FxHashMap<String, ClassDef>,
    parent: Option<Rc<Frame>>,
}

/// Result of a variable lookup.
#[derive(Clone, Debug)]
pub struct VarLookup<'e> {
    pub info: &'e VarInfo,
    /// Name of the frame the variable was found in.
    pub scope: &'e str,
    /// The variable is an iterator binding.
    pub in_iterator_scope: bool,
    /// Environment as seen from the defining frame; bindings are evaluated
    /// here.
    pub env: Env,
}

/// Persistent scope chain.
#[derive(Clone, Debug)]
pub struct Env {
    head: Rc<Frame>,
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl Env {
    /// Environment with a single, empty top-level frame.
    pub fn new() -> Self {
        Env {
            head: Rc::new(Frame {
                name: String::new(),
                kind: ScopeKind::Class,
                vars: FxHashMap::default(),
                classes: FxHashMap::default(),
                parent: None,
            }),
        }
    }

    /// New environment with an empty innermost frame on top of `self`.
    #[must_use]
    pub fn push_scope(&self, name: impl Into<String>, kind: ScopeKind) -> Env {
        Env {
            head: Rc::new(Frame {
                name: name.into(),
                kind,
                vars: FxHashMap::default(),
                classes: FxHashMap::default(),
                parent: Some(Rc::clone(&self.head)),
            }),
        }
    }

    /// Define (or redefine) a variable in the innermost frame.
    pub fn define_var(&mut self, name: impl Into<String>, info: VarInfo) {
        Rc::make_mut(&mut self.head).vars.insert(name.into(), info);
    }

    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, info: VarInfo) -> Self {
        self.define_var(name, info);
        self
    }

    /// Define a class in the innermost frame, keyed by its full path.
    pub fn define_class(&mut self, def: ClassDef) {
        let key = def.path().to_string();
        Rc::make_mut(&mut self.head).classes.insert(key, def);
    }

    #[must_use]
    pub fn with_class(mut self, def: ClassDef) -> Self {
        self.define_class(def);
        self
    }

    fn frames(&self) -> impl Iterator<Item = &Rc<Frame>> {
        std::iter::successors(Some(&self.head), |f| f.parent.as_ref())
    }

    /// Innermost definition of `name` (a dotted component name).
    pub fn lookup_variable(&self, name: &str) -> Option<VarLookup<'_>> {
        self.frames().find_map(|frame| {
            frame.vars.get(name).map(|info| VarLookup {
                info,
                scope: frame.name.as_str(),
                in_iterator_scope: frame.kind == ScopeKind::Iterator,
                env: Env {
                    head: Rc::clone(frame),
                },
            })
        })
    }

    pub fn lookup_class(&self, path: &Path) -> Option<&ClassDef> {
        let key = path.to_string();
        self.frames().find_map(|frame| frame.classes.get(&key))
    }

    /// Whether the innermost frame is an iterator scope.
    pub fn in_iterator_scope(&self) -> bool {
        self.head.kind == ScopeKind::Iterator
    }

    /// Name of the innermost frame.
    pub fn scope_name(&self) -> &str {
        &self.head.name
    }
}
