//! Untyped expression trees for quoted code.
//!
//! A `Code` expression carries a fragment of source-level syntax that is not
//! elaborated. The only thing the evaluator does with it is splice values
//! into `Eval(...)` markers.

use crate::Path;

/// Source-level operators, before type-directed disambiguation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AstOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    AddEw,
    SubEw,
    MulEw,
    DivEw,
    PowEw,
    UMinus,
    UPlus,
    And,
    Or,
    Not,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Equal,
    NotEqual,
}

impl AstOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add | Self::UPlus => "+",
            Self::Sub | Self::UMinus => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
            Self::AddEw => ".+",
            Self::SubEw => ".-",
            Self::MulEw => ".*",
            Self::DivEw => "./",
            Self::PowEw => ".^",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Equal => "==",
            Self::NotEqual => "<>",
        }
    }
}

/// Untyped expression.
#[derive(Clone, PartialEq, Debug)]
pub enum AstExp {
    Integer(i64),
    Real(f64),
    Str(String),
    Bool(bool),
    /// Component or type reference; subscripts are kept as expressions.
    Cref { path: Path, subscripts: Vec<AstExp> },
    Binary {
        lhs: Box<AstExp>,
        op: AstOp,
        rhs: Box<AstExp>,
    },
    Unary { op: AstOp, operand: Box<AstExp> },
    LogicalBinary {
        lhs: Box<AstExp>,
        op: AstOp,
        rhs: Box<AstExp>,
    },
    LogicalUnary { op: AstOp, operand: Box<AstExp> },
    Relation {
        lhs: Box<AstExp>,
        op: AstOp,
        rhs: Box<AstExp>,
    },
    If {
        cond: Box<AstExp>,
        then: Box<AstExp>,
        else_ifs: Vec<(AstExp, AstExp)>,
        else_: Box<AstExp>,
    },
    Call {
        func: Path,
        args: Vec<AstExp>,
        named: Vec<(String, AstExp)>,
    },
    Array(Vec<AstExp>),
    Matrix(Vec<Vec<AstExp>>),
    Range {
        start: Box<AstExp>,
        step: Option<Box<AstExp>>,
        stop: Box<AstExp>,
    },
    Tuple(Vec<AstExp>),
    /// MetaModelica list literal.
    List(Vec<AstExp>),
    /// `end` inside a subscript.
    End,
}

impl AstExp {
    pub fn ident(name: &str) -> AstExp {
        AstExp::Cref {
            path: Path::parse(name),
            subscripts: Vec::new(),
        }
    }

    pub fn call(func: &str, args: Vec<AstExp>) -> AstExp {
        AstExp::Call {
            func: Path::parse(func),
            args,
            named: Vec::new(),
        }
    }

    pub fn binary(lhs: AstExp, op: AstOp, rhs: AstExp) -> AstExp {
        AstExp::Binary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }
}

/// A quoted code fragment.
#[derive(Clone, PartialEq, Debug)]
pub enum CodeFragment {
    Expression(AstExp),
    TypeName(Path),
    ComponentName(Path),
}
