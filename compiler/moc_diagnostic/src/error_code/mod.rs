use std::fmt;

/// Error codes for evaluation diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E6xxx: Constant evaluation errors
/// - E9xxx: Internal errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Evaluation Errors (E6xxx)
    /// Variable has no binding and no default
    E6001,
    /// Array dimension cannot be determined
    E6002,
    /// Division by zero
    E6003,
    /// Modulo or remainder by zero
    E6004,
    /// Recursion limit exceeded
    E6005,
    /// Square root of a negative number
    E6006,
    /// Reduction guard did not evaluate to a Boolean
    E6007,
    /// Invalid cast or array shape mismatch
    E6008,
    /// Integer overflow
    E6009,
    /// Reduction iteration limit exceeded
    E6010,
    /// Invalid argument to a builtin function
    E6011,
    /// Subscript out of bounds
    E6012,
    /// Expression is not constant
    E6013,

    // Internal Errors (E9xxx)
    /// Internal evaluator error
    E9001,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6005 => "E6005",
            ErrorCode::E6006 => "E6006",
            ErrorCode::E6007 => "E6007",
            ErrorCode::E6008 => "E6008",
            ErrorCode::E6009 => "E6009",
            ErrorCode::E6010 => "E6010",
            ErrorCode::E6011 => "E6011",
            ErrorCode::E6012 => "E6012",
            ErrorCode::E6013 => "E6013",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Check if this is an evaluation error (E6xxx range).
    pub fn is_eval_error(&self) -> bool {
        self.as_str().starts_with("E6")
    }

    /// Check if this is an internal error (E9xxx range).
    pub fn is_internal_error(&self) -> bool {
        self.as_str().starts_with("E9")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests;
