//! Typed expressions.
//!
//! `Expr` is a plain owned tree. Sub-expressions are boxed; there is no arena
//! because the evaluator only ever walks trees handed to it by elaboration.

use crate::{BinaryOp, CodeFragment, LogicalOp, Path, RelationOp, Type, UnaryOp};

/// A subscript applied to an array-valued expression or component.
#[derive(Clone, PartialEq, Debug)]
pub enum Subscript {
    /// `:`, every element of the dimension.
    Whole,
    /// Array of 1-based indices (or enumeration/Boolean literals).
    Slice(Expr),
    /// Single 1-based index (or enumeration/Boolean literal).
    Index(Expr),
}

/// One identifier of a component reference with its own subscripts.
#[derive(Clone, PartialEq, Debug)]
pub struct CrefPart {
    pub ident: String,
    pub subscripts: Vec<Subscript>,
}

/// A possibly qualified, possibly subscripted reference to a component
/// (`a.b[2]`).
#[derive(Clone, PartialEq, Debug)]
pub struct ComponentRef {
    pub parts: Vec<CrefPart>,
}

impl ComponentRef {
    /// Reference from a dotted name without subscripts.
    pub fn ident(dotted: &str) -> Self {
        ComponentRef {
            parts: dotted
                .split('.')
                .map(|ident| CrefPart {
                    ident: ident.to_string(),
                    subscripts: Vec::new(),
                })
                .collect(),
        }
    }

    /// Replace the subscripts of the last identifier.
    #[must_use]
    pub fn with_subscripts(mut self, subscripts: Vec<Subscript>) -> Self {
        if let Some(last) = self.parts.last_mut() {
            last.subscripts = subscripts;
        }
        self
    }

    /// The dotted name with all subscripts stripped; this is the key used
    /// for environment lookup.
    pub fn name(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.ident.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// All subscripts, outermost identifier first.
    pub fn subscripts(&self) -> impl Iterator<Item = &Subscript> {
        self.parts.iter().flat_map(|p| p.subscripts.iter())
    }

    pub fn has_subscripts(&self) -> bool {
        self.parts.iter().any(|p| !p.subscripts.is_empty())
    }
}

/// Attributes the type checker attaches to a call.
#[derive(Clone, PartialEq, Debug)]
pub struct CallAttrs {
    pub ty: Type,
    /// The callee is an intrinsic handled by the builtin table.
    pub builtin: bool,
    /// The callee has side effects and is never constant-evaluated.
    pub impure: bool,
}

impl Default for CallAttrs {
    fn default() -> Self {
        CallAttrs {
            ty: Type::Unknown,
            builtin: false,
            impure: false,
        }
    }
}

/// How the value sequences of several iterators are combined.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IterKind {
    /// Cross product of all iterator ranges.
    Combine,
    /// Position-wise zip; every range must have the same length.
    Thread,
}

/// Fold description of a reduction.
#[derive(Clone, PartialEq, Debug)]
pub struct ReductionInfo {
    /// Reduction name: `array`, `list`, `listReverse`, `sum`, `product` or a
    /// user fold function.
    pub path: Path,
    pub iter_kind: IterKind,
    /// Result type.
    pub ty: Type,
    /// Value used when there is nothing to iterate over.
    pub default: Option<Expr>,
    /// Name bound to the freshly evaluated body inside `fold_exp`.
    pub fold_name: String,
    /// Name bound to the running accumulator inside `fold_exp`.
    pub result_name: String,
    /// Expression combining `fold_name` and `result_name`.
    pub fold_exp: Option<Expr>,
}

/// One `id in source if guard` clause.
#[derive(Clone, PartialEq, Debug)]
pub struct ReductionIterator {
    pub id: String,
    pub source: Expr,
    pub guard: Option<Expr>,
    pub ty: Type,
}

/// Comprehension-style construct (`sum(f(i) for i in 1:n)`).
#[derive(Clone, PartialEq, Debug)]
pub struct Reduction {
    pub info: ReductionInfo,
    pub body: Expr,
    pub iterators: Vec<ReductionIterator>,
}

/// A typed IR expression.
#[derive(Clone, PartialEq, Debug)]
pub enum Expr {
    // Literals
    Integer(i64),
    Real(f64),
    Bool(bool),
    Str(String),
    /// Enumeration literal; `index` is 1-based.
    Enum { path: Path, index: i64 },

    // Arrays
    /// `{a, b, c}`. `ty` is the full array type; `scalar` is set when the
    /// elements are scalars.
    Array {
        ty: Type,
        scalar: bool,
        elements: Vec<Expr>,
    },
    /// `[a, b; c, d]`, row by row.
    Matrix { ty: Type, rows: Vec<Vec<Expr>> },
    /// `start:step:stop`.
    Range {
        ty: Type,
        start: Box<Expr>,
        step: Option<Box<Expr>>,
        stop: Box<Expr>,
    },

    Tuple(Vec<Expr>),
    Cast { ty: Type, expr: Box<Expr> },
    Cref { cref: ComponentRef, ty: Type },

    // Operators
    Binary {
        lhs: Box<Expr>,
        op: BinaryOp,
        rhs: Box<Expr>,
    },
    Unary { op: UnaryOp, operand: Box<Expr> },
    LogicalBinary {
        lhs: Box<Expr>,
        op: LogicalOp,
        rhs: Box<Expr>,
    },
    Not(Box<Expr>),
    Relation {
        lhs: Box<Expr>,
        op: RelationOp,
        rhs: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        else_: Box<Expr>,
    },

    // Calls and constructors
    Call {
        path: Path,
        args: Vec<Expr>,
        attrs: CallAttrs,
    },
    /// Record constructor call.
    Record {
        path: Path,
        args: Vec<Expr>,
        field_names: Vec<String>,
    },
    /// MetaModelica uniontype record constructor; `index` is the record's
    /// position within its uniontype.
    MetaRecordCall {
        path: Path,
        index: i32,
        args: Vec<Expr>,
        field_names: Vec<String>,
    },

    // Indexing
    ArraySub {
        expr: Box<Expr>,
        subs: Vec<Subscript>,
    },
    /// 1-based tuple projection.
    TupleSub { expr: Box<Expr>, index: usize },
    /// Record field projection.
    RecordField { expr: Box<Expr>, field: String },
    /// `size(expr)` or `size(expr, dim)`.
    Size {
        expr: Box<Expr>,
        dim: Option<Box<Expr>>,
    },

    // MetaModelica collections and polymorphism
    List(Vec<Expr>),
    Cons { head: Box<Expr>, tail: Box<Expr> },
    Optional(Option<Box<Expr>>),
    Boxed(Box<Expr>),
    Unbox { expr: Box<Expr>, ty: Type },

    Reduction(Box<Reduction>),
    /// Quoted code.
    Code(Box<CodeFragment>),
}

impl Expr {
    pub fn int(n: i64) -> Expr {
        Expr::Integer(n)
    }

    pub fn real(x: f64) -> Expr {
        Expr::Real(x)
    }

    pub fn boolean(b: bool) -> Expr {
        Expr::Bool(b)
    }

    pub fn string(s: impl Into<String>) -> Expr {
        Expr::Str(s.into())
    }

    /// Unsubscripted reference with an unknown declared type.
    pub fn cref(dotted: &str) -> Expr {
        Expr::Cref {
            cref: ComponentRef::ident(dotted),
            ty: Type::Unknown,
        }
    }

    pub fn binary(lhs: Expr, op: BinaryOp, rhs: Expr) -> Expr {
        Expr::Binary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn logical(lhs: Expr, op: LogicalOp, rhs: Expr) -> Expr {
        Expr::LogicalBinary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    pub fn relation(lhs: Expr, op: RelationOp, rhs: Expr) -> Expr {
        Expr::Relation {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    pub fn if_exp(cond: Expr, then: Expr, else_: Expr) -> Expr {
        Expr::If {
            cond: Box::new(cond),
            then: Box::new(then),
            else_: Box::new(else_),
        }
    }

    /// Array constructor whose dimensions are derived from its elements.
    pub fn array(elements: Vec<Expr>) -> Expr {
        let scalar = !elements
            .iter()
            .any(|e| matches!(e, Expr::Array { .. } | Expr::Matrix { .. }));
        Expr::Array {
            ty: Type::Array {
                elem: Box::new(Type::Unknown),
                dims: vec![crate::Dimension::Unknown],
            },
            scalar,
            elements,
        }
    }

    pub fn range(start: Expr, step: Option<Expr>, stop: Expr) -> Expr {
        Expr::Range {
            ty: Type::Unknown,
            start: Box::new(start),
            step: step.map(Box::new),
            stop: Box::new(stop),
        }
    }

    pub fn cast(ty: Type, expr: Expr) -> Expr {
        Expr::Cast {
            ty,
            expr: Box::new(expr),
        }
    }

    /// Call to a builtin function by its simple name.
    pub fn builtin_call(name: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            path: Path::ident(name),
            args,
            attrs: CallAttrs {
                builtin: true,
                ..CallAttrs::default()
            },
        }
    }

    /// Call to a pure, non-builtin function.
    pub fn call(path: Path, args: Vec<Expr>) -> Expr {
        Expr::Call {
            path,
            args,
            attrs: CallAttrs::default(),
        }
    }

    pub fn array_sub(expr: Expr, subs: Vec<Subscript>) -> Expr {
        Expr::ArraySub {
            expr: Box::new(expr),
            subs,
        }
    }

    /// Whether this is a literal that evaluates to itself.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expr::Integer(_) | Expr::Real(_) | Expr::Bool(_) | Expr::Str(_) | Expr::Enum { .. }
        )
    }

    /// Visit the direct sub-expressions.
    pub fn for_each_child(&self, f: &mut dyn FnMut(&Expr)) {
        match self {
            Expr::Integer(_)
            | Expr::Real(_)
            | Expr::Bool(_)
            | Expr::Str(_)
            | Expr::Enum { .. }
            | Expr::Code(_)
            | Expr::Optional(None) => {}
            Expr::Array { elements, .. }
            | Expr::Tuple(elements)
            | Expr::List(elements)
            | Expr::Call { args: elements, .. }
            | Expr::Record { args: elements, .. }
            | Expr::MetaRecordCall { args: elements, .. } => elements.iter().for_each(f),
            Expr::Matrix { rows, .. } => rows.iter().flatten().for_each(f),
            Expr::Range {
                start, step, stop, ..
            } => {
                f(start);
                if let Some(step) = step {
                    f(step);
                }
                f(stop);
            }
            Expr::Cast { expr, .. }
            | Expr::TupleSub { expr, .. }
            | Expr::RecordField { expr, .. }
            | Expr::Boxed(expr)
            | Expr::Unbox { expr, .. }
            | Expr::Not(expr)
            | Expr::Unary { operand: expr, .. }
            | Expr::Optional(Some(expr)) => f(expr),
            Expr::Cref { cref, .. } => {
                for sub in cref.subscripts() {
                    if let Subscript::Slice(e) | Subscript::Index(e) = sub {
                        f(e);
                    }
                }
            }
            Expr::Binary { lhs, rhs, .. }
            | Expr::LogicalBinary { lhs, rhs, .. }
            | Expr::Relation { lhs, rhs, .. }
            | Expr::Cons {
                head: lhs,
                tail: rhs,
            } => {
                f(lhs);
                f(rhs);
            }
            Expr::If { cond, then, else_ } => {
                f(cond);
                f(then);
                f(else_);
            }
            Expr::ArraySub { expr, subs } => {
                f(expr);
                for sub in subs {
                    if let Subscript::Slice(e) | Subscript::Index(e) = sub {
                        f(e);
                    }
                }
            }
            Expr::Size { expr, dim } => {
                f(expr);
                if let Some(dim) = dim {
                    f(dim);
                }
            }
            Expr::Reduction(r) => {
                for it in &r.iterators {
                    f(&it.source);
                    if let Some(guard) = &it.guard {
                        f(guard);
                    }
                }
                f(&r.body);
            }
        }
    }

    /// Whether `name` (a stripped dotted component name) occurs free in this
    /// expression. Reduction iterators shadow outer names.
    pub fn references(&self, name: &str) -> bool {
        match self {
            Expr::Cref { cref, .. } if cref.name() == name => true,
            Expr::Reduction(r) => {
                if r.iterators.iter().any(|it| it.source.references(name)) {
                    return true;
                }
                if r.iterators.iter().any(|it| it.id == name) {
                    return false;
                }
                r.body.references(name)
                    || r
                        .iterators
                        .iter()
                        .filter_map(|it| it.guard.as_ref())
                        .any(|g| g.references(name))
            }
            _ => {
                let mut found = false;
                self.for_each_child(&mut |child| {
                    found = found || child.references(name);
                });
                found
            }
        }
    }
}

#[cfg(test)]
mod tests;
