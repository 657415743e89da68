//! Modelica-style printing of IR and AST nodes.
//!
//! Used in diagnostics (`division by zero in 1 / (x - x)`) and for the
//! printed form of spliced values.

use std::fmt;

use crate::{AstExp, CodeFragment, ComponentRef, Dimension, Expr, Subscript, Type};

/// Format a real so it always reads as a real (`1.0`, not `1`).
pub fn format_real(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        format!("{x:?}")
    }
}

fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Subscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subscript::Whole => write!(f, ":"),
            Subscript::Slice(e) | Subscript::Index(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", part.ident)?;
            if !part.subscripts.is_empty() {
                write!(f, "[")?;
                comma_list(f, &part.subscripts)?;
                write!(f, "]")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Known(n) => write!(f, "{n}"),
            Dimension::Enum { path, .. } => write!(f, "{path}"),
            Dimension::Boolean => write!(f, "Boolean"),
            Dimension::Exp(e) => write!(f, "{e}"),
            Dimension::Unknown => write!(f, ":"),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer => write!(f, "Integer"),
            Type::Real => write!(f, "Real"),
            Type::Boolean => write!(f, "Boolean"),
            Type::String => write!(f, "String"),
            Type::Enumeration { path, .. } | Type::Record { path } => write!(f, "{path}"),
            Type::Array { elem, dims } => {
                write!(f, "{elem}[")?;
                comma_list(f, dims)?;
                write!(f, "]")
            }
            Type::Tuple(types) => {
                write!(f, "(")?;
                comma_list(f, types)?;
                write!(f, ")")
            }
            Type::List(t) => write!(f, "list<{t}>"),
            Type::Optional(t) => write!(f, "Option<{t}>"),
            Type::MetaBoxed(t) => write!(f, "#{t}"),
            Type::Code => write!(f, "Code"),
            Type::NoReturn => write!(f, "#NORETURN#"),
            Type::Unknown => write!(f, "?"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Integer(n) => write!(f, "{n}"),
            Expr::Real(x) => write!(f, "{}", format_real(*x)),
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Str(s) => write!(f, "\"{s}\""),
            Expr::Enum { path, .. } => write!(f, "{path}"),
            Expr::Array { elements, .. } | Expr::List(elements) => {
                write!(f, "{{")?;
                comma_list(f, elements)?;
                write!(f, "}}")
            }
            Expr::Matrix { rows, .. } => {
                write!(f, "[")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    comma_list(f, row)?;
                }
                write!(f, "]")
            }
            Expr::Range {
                start, step, stop, ..
            } => match step {
                Some(step) => write!(f, "{start}:{step}:{stop}"),
                None => write!(f, "{start}:{stop}"),
            },
            Expr::Tuple(elements) => {
                write!(f, "(")?;
                comma_list(f, elements)?;
                write!(f, ")")
            }
            Expr::Cast { ty, expr } => write!(f, "{ty}({expr})"),
            Expr::Cref { cref, .. } => write!(f, "{cref}"),
            Expr::Binary { lhs, op, rhs } => write!(f, "({lhs} {} {rhs})", op.as_symbol()),
            Expr::Unary { operand, .. } => write!(f, "(-{operand})"),
            Expr::LogicalBinary { lhs, op, rhs } => {
                write!(f, "({lhs} {} {rhs})", op.as_symbol())
            }
            Expr::Not(e) => write!(f, "(not {e})"),
            Expr::Relation { lhs, op, rhs } => write!(f, "({lhs} {} {rhs})", op.as_symbol()),
            Expr::If { cond, then, else_ } => {
                write!(f, "if {cond} then {then} else {else_}")
            }
            Expr::Call { path, args, .. }
            | Expr::Record { path, args, .. }
            | Expr::MetaRecordCall { path, args, .. } => {
                write!(f, "{path}(")?;
                comma_list(f, args)?;
                write!(f, ")")
            }
            Expr::ArraySub { expr, subs } => {
                write!(f, "{expr}[")?;
                comma_list(f, subs)?;
                write!(f, "]")
            }
            Expr::TupleSub { expr, index } => write!(f, "{expr}[{index}]"),
            Expr::RecordField { expr, field } => write!(f, "{expr}.{field}"),
            Expr::Size { expr, dim } => match dim {
                Some(dim) => write!(f, "size({expr}, {dim})"),
                None => write!(f, "size({expr})"),
            },
            Expr::Cons { head, tail } => write!(f, "{head} :: {tail}"),
            Expr::Optional(Some(e)) => write!(f, "SOME({e})"),
            Expr::Optional(None) => write!(f, "NONE()"),
            Expr::Boxed(e) | Expr::Unbox { expr: e, .. } => write!(f, "{e}"),
            Expr::Reduction(r) => {
                write!(f, "{}({} for ", r.info.path, r.body)?;
                for (i, it) in r.iterators.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} in {}", it.id, it.source)?;
                    if let Some(guard) = &it.guard {
                        write!(f, " guard {guard}")?;
                    }
                }
                write!(f, ")")
            }
            Expr::Code(code) => write!(f, "$Code({code})"),
        }
    }
}

impl fmt::Display for CodeFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeFragment::Expression(e) => write!(f, "{e}"),
            CodeFragment::TypeName(p) | CodeFragment::ComponentName(p) => write!(f, "{p}"),
        }
    }
}

impl fmt::Display for AstExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstExp::Integer(n) => write!(f, "{n}"),
            AstExp::Real(x) => write!(f, "{}", format_real(*x)),
            AstExp::Str(s) => write!(f, "\"{s}\""),
            AstExp::Bool(b) => write!(f, "{b}"),
            AstExp::Cref { path, subscripts } => {
                write!(f, "{path}")?;
                if !subscripts.is_empty() {
                    write!(f, "[")?;
                    comma_list(f, subscripts)?;
                    write!(f, "]")?;
                }
                Ok(())
            }
            AstExp::Binary { lhs, op, rhs }
            | AstExp::LogicalBinary { lhs, op, rhs }
            | AstExp::Relation { lhs, op, rhs } => write!(f, "{lhs} {} {rhs}", op.as_symbol()),
            AstExp::Unary { op, operand } => write!(f, "{}{operand}", op.as_symbol()),
            AstExp::LogicalUnary { op, operand } => write!(f, "{} {operand}", op.as_symbol()),
            AstExp::If {
                cond,
                then,
                else_ifs,
                else_,
            } => {
                write!(f, "if {cond} then {then}")?;
                for (c, e) in else_ifs {
                    write!(f, " elseif {c} then {e}")?;
                }
                write!(f, " else {else_}")
            }
            AstExp::Call { func, args, named } => {
                write!(f, "{func}(")?;
                comma_list(f, args)?;
                for (i, (name, arg)) in named.iter().enumerate() {
                    if i > 0 || !args.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name} = {arg}")?;
                }
                write!(f, ")")
            }
            AstExp::Array(elements) | AstExp::List(elements) => {
                write!(f, "{{")?;
                comma_list(f, elements)?;
                write!(f, "}}")
            }
            AstExp::Matrix(rows) => {
                write!(f, "[")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    comma_list(f, row)?;
                }
                write!(f, "]")
            }
            AstExp::Range { start, step, stop } => match step {
                Some(step) => write!(f, "{start}:{step}:{stop}"),
                None => write!(f, "{start}:{stop}"),
            },
            AstExp::Tuple(elements) => {
                write!(f, "(")?;
                comma_list(f, elements)?;
                write!(f, ")")
            }
            AstExp::End => write!(f, "end"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AstOp, BinaryOp};

    #[test]
    fn reals_always_print_with_a_fraction() {
        assert_eq!(format_real(1.0), "1.0");
        assert_eq!(format_real(2.5), "2.5");
        assert_eq!(format_real(-0.125), "-0.125");
    }

    #[test]
    fn prints_binary_and_calls() {
        let e = Expr::binary(Expr::int(1), BinaryOp::Div, Expr::cref("x"));
        assert_eq!(e.to_string(), "(1 / x)");
        let c = Expr::builtin_call("sin", vec![Expr::real(0.5)]);
        assert_eq!(c.to_string(), "sin(0.5)");
    }

    #[test]
    fn prints_ast_with_named_args() {
        let call = AstExp::Call {
            func: "plot".into(),
            args: vec![AstExp::ident("x")],
            named: vec![("n".to_string(), AstExp::Integer(3))],
        };
        assert_eq!(call.to_string(), "plot(x, n = 3)");
        let b = AstExp::binary(AstExp::Integer(1), AstOp::Add, AstExp::Real(2.0));
        assert_eq!(b.to_string(), "1 + 2.0");
    }
}
