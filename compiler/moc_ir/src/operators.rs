//! Operator tags.
//!
//! Array operators carry distinct tags for array-array, array-scalar and
//! scalar-array operand shapes, because operand order matters for `-`, `/`
//! and `^` and the type checker has already decided which shape applies.

/// Binary arithmetic operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Scalar
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    /// String concatenation.
    AddStr,

    // Elementwise array ⊗ array (equal shapes)
    AddArr,
    SubArr,
    MulArr,
    DivArr,
    PowArr,

    // Array ⊗ scalar
    AddArrayScalar,
    SubArrayScalar,
    MulArrayScalar,
    DivArrayScalar,
    PowArrayScalar,

    // Scalar ⊗ array
    AddScalarArray,
    SubScalarArray,
    MulScalarArray,
    DivScalarArray,
    PowScalarArray,

    // Linear algebra
    /// Vector dot product.
    MulScalarProduct,
    /// Matrix-vector, vector-matrix and matrix-matrix products.
    MulMatrixProduct,
    /// Square matrix raised to a non-negative integer power.
    PowMatrix,
}

impl BinaryOp {
    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add | Self::AddStr | Self::AddArr => "+",
            Self::AddArrayScalar | Self::AddScalarArray => ".+",
            Self::Sub | Self::SubArr => "-",
            Self::SubArrayScalar | Self::SubScalarArray => ".-",
            Self::Mul | Self::MulScalarProduct | Self::MulMatrixProduct => "*",
            Self::MulArr | Self::MulArrayScalar | Self::MulScalarArray => ".*",
            Self::Div => "/",
            Self::DivArr | Self::DivArrayScalar | Self::DivScalarArray => "./",
            Self::Pow | Self::PowMatrix => "^",
            Self::PowArr | Self::PowArrayScalar | Self::PowScalarArray => ".^",
        }
    }

    /// Whether the right operand is a divisor checked against zero.
    pub const fn is_division(self) -> bool {
        matches!(
            self,
            Self::Div | Self::DivArr | Self::DivArrayScalar | Self::DivScalarArray
        )
    }
}

/// Unary arithmetic operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Minus,
    /// Elementwise negation of an array.
    MinusArr,
}

/// Binary logical operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Relational operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RelationOp {
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Equal,
    NotEqual,
}

impl RelationOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Equal => "==",
            Self::NotEqual => "<>",
        }
    }
}
