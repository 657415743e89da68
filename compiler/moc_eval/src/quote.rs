//! Quoted code and `Eval(..)` splicing.
//!
//! A quoted expression is kept as an untyped AST. Every `Eval(e)` inside it
//! is elaborated, evaluated, and replaced by the AST form of its value;
//! everything else is copied unchanged.

use moc_ir::{AstExp, CodeFragment};
use moc_values::{not_constant, recursion_limit_exceeded, EvalResult, Value};

use crate::context::EvalContext;
use crate::evaluator::{ConstEvaluator, EvalOutcome, Request};

/// Name of the splice marker.
const EVAL_MARKER: &str = "Eval";

impl ConstEvaluator<'_> {
    pub(crate) fn eval_code(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        fragment: &CodeFragment,
    ) -> EvalOutcome {
        match fragment {
            CodeFragment::Expression(ast) => {
                let (ctx, spliced) = self.splice(ctx, req, ast)?;
                Ok((ctx, Value::code(CodeFragment::Expression(spliced))))
            }
            other => Ok((ctx, Value::code(other.clone()))),
        }
    }

    /// Copy of `ast` with every `Eval(e)` replaced by the value of `e`.
    pub(crate) fn splice(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        ast: &AstExp,
    ) -> EvalResult<(EvalContext, AstExp)> {
        let limit = self.config.recursion_limit;
        if req.depth > limit {
            return Err(recursion_limit_exceeded(limit));
        }
        if let Some(marked) = eval_marker(ast) {
            let Some(expr) = self.elaborator.elaborate(req.env, marked) else {
                tracing::trace!(ast = %marked, "spliced expression did not elaborate");
                return Err(not_constant());
            };
            let (ctx, value) = self.eval(ctx, req.deeper(), &expr)?;
            return Ok((ctx, value_to_ast(&value)?));
        }

        let inner = req.deeper();
        match ast {
            AstExp::Cref { path, subscripts } => {
                let (ctx, subscripts) = self.splice_all(ctx, inner, subscripts)?;
                Ok((
                    ctx,
                    AstExp::Cref {
                        path: path.clone(),
                        subscripts,
                    },
                ))
            }
            AstExp::Binary { lhs, op, rhs } => {
                let (ctx, lhs) = self.splice(ctx, inner, lhs)?;
                let (ctx, rhs) = self.splice(ctx, inner, rhs)?;
                Ok((
                    ctx,
                    AstExp::Binary {
                        lhs: Box::new(lhs),
                        op: *op,
                        rhs: Box::new(rhs),
                    },
                ))
            }
            AstExp::LogicalBinary { lhs, op, rhs } => {
                let (ctx, lhs) = self.splice(ctx, inner, lhs)?;
                let (ctx, rhs) = self.splice(ctx, inner, rhs)?;
                Ok((
                    ctx,
                    AstExp::LogicalBinary {
                        lhs: Box::new(lhs),
                        op: *op,
                        rhs: Box::new(rhs),
                    },
                ))
            }
            AstExp::Relation { lhs, op, rhs } => {
                let (ctx, lhs) = self.splice(ctx, inner, lhs)?;
                let (ctx, rhs) = self.splice(ctx, inner, rhs)?;
                Ok((
                    ctx,
                    AstExp::Relation {
                        lhs: Box::new(lhs),
                        op: *op,
                        rhs: Box::new(rhs),
                    },
                ))
            }
            AstExp::Unary { op, operand } => {
                let (ctx, operand) = self.splice(ctx, inner, operand)?;
                Ok((
                    ctx,
                    AstExp::Unary {
                        op: *op,
                        operand: Box::new(operand),
                    },
                ))
            }
            AstExp::LogicalUnary { op, operand } => {
                let (ctx, operand) = self.splice(ctx, inner, operand)?;
                Ok((
                    ctx,
                    AstExp::LogicalUnary {
                        op: *op,
                        operand: Box::new(operand),
                    },
                ))
            }
            AstExp::If {
                cond,
                then,
                else_ifs,
                else_,
            } => {
                let (ctx, cond) = self.splice(ctx, inner, cond)?;
                let (mut ctx, then) = self.splice(ctx, inner, then)?;
                let mut branches = Vec::with_capacity(else_ifs.len());
                for (c, e) in else_ifs {
                    let (next, c) = self.splice(ctx, inner, c)?;
                    let (next, e) = self.splice(next, inner, e)?;
                    ctx = next;
                    branches.push((c, e));
                }
                let (ctx, else_) = self.splice(ctx, inner, else_)?;
                Ok((
                    ctx,
                    AstExp::If {
                        cond: Box::new(cond),
                        then: Box::new(then),
                        else_ifs: branches,
                        else_: Box::new(else_),
                    },
                ))
            }
            AstExp::Call { func, args, named } => {
                let (mut ctx, args) = self.splice_all(ctx, inner, args)?;
                let mut spliced = Vec::with_capacity(named.len());
                for (name, arg) in named {
                    let (next, arg) = self.splice(ctx, inner, arg)?;
                    ctx = next;
                    spliced.push((name.clone(), arg));
                }
                Ok((
                    ctx,
                    AstExp::Call {
                        func: func.clone(),
                        args,
                        named: spliced,
                    },
                ))
            }
            AstExp::Array(elements) => {
                let (ctx, elements) = self.splice_all(ctx, inner, elements)?;
                Ok((ctx, AstExp::Array(elements)))
            }
            AstExp::Matrix(rows) => {
                let mut ctx = ctx;
                let mut spliced = Vec::with_capacity(rows.len());
                for row in rows {
                    let (next, row) = self.splice_all(ctx, inner, row)?;
                    ctx = next;
                    spliced.push(row);
                }
                Ok((ctx, AstExp::Matrix(spliced)))
            }
            AstExp::Range { start, step, stop } => {
                let (mut ctx, start) = self.splice(ctx, inner, start)?;
                let step = match step {
                    Some(step) => {
                        let (next, step) = self.splice(ctx, inner, step)?;
                        ctx = next;
                        Some(Box::new(step))
                    }
                    None => None,
                };
                let (ctx, stop) = self.splice(ctx, inner, stop)?;
                Ok((
                    ctx,
                    AstExp::Range {
                        start: Box::new(start),
                        step,
                        stop: Box::new(stop),
                    },
                ))
            }
            AstExp::Tuple(elements) => {
                let (ctx, elements) = self.splice_all(ctx, inner, elements)?;
                Ok((ctx, AstExp::Tuple(elements)))
            }
            AstExp::List(elements) => {
                let (ctx, elements) = self.splice_all(ctx, inner, elements)?;
                Ok((ctx, AstExp::List(elements)))
            }
            AstExp::Integer(_)
            | AstExp::Real(_)
            | AstExp::Str(_)
            | AstExp::Bool(_)
            | AstExp::End => Ok((ctx, ast.clone())),
        }
    }

    fn splice_all(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        asts: &[AstExp],
    ) -> EvalResult<(EvalContext, Vec<AstExp>)> {
        let mut ctx = ctx;
        let mut out = Vec::with_capacity(asts.len());
        for ast in asts {
            let (next, spliced) = self.splice(ctx, req, ast)?;
            ctx = next;
            out.push(spliced);
        }
        Ok((ctx, out))
    }
}

/// The argument of an `Eval(e)` marker: an unqualified call with exactly
/// one positional argument.
fn eval_marker(ast: &AstExp) -> Option<&AstExp> {
    match ast {
        AstExp::Call { func, args, named }
            if func.is_ident() && func.last() == EVAL_MARKER && named.is_empty() =>
        {
            match args.as_slice() {
                [arg] => Some(arg),
                _ => None,
            }
        }
        _ => None,
    }
}

/// AST form of a value.
pub(crate) fn value_to_ast(value: &Value) -> EvalResult<AstExp> {
    let all = |values: &[Value]| values.iter().map(value_to_ast).collect::<EvalResult<Vec<_>>>();
    let ast = match value {
        Value::Integer(n) => AstExp::Integer(*n),
        Value::Real(x) => AstExp::Real(*x),
        Value::Bool(b) => AstExp::Bool(*b),
        Value::Str(s) => AstExp::Str(s.to_string()),
        Value::Enum { path, .. } => AstExp::Cref {
            path: path.clone(),
            subscripts: Vec::new(),
        },
        Value::Array { elements, .. } => AstExp::Array(all(elements)?),
        Value::List(elements) => AstExp::List(all(elements)?),
        Value::Tuple(elements) => AstExp::Tuple(all(elements)?),
        Value::Record(record) => AstExp::Call {
            func: record.path.clone(),
            args: all(&record.fields)?,
            named: Vec::new(),
        },
        Value::Optional(Some(inner)) => AstExp::call("SOME", vec![value_to_ast(inner)?]),
        Value::Optional(None) => AstExp::call("NONE", Vec::new()),
        Value::Boxed(inner) => value_to_ast(inner)?,
        Value::Code(fragment) => match &**fragment {
            CodeFragment::Expression(e) => e.clone(),
            CodeFragment::TypeName(path) | CodeFragment::ComponentName(path) => AstExp::Cref {
                path: path.clone(),
                subscripts: Vec::new(),
            },
        },
        Value::Fail | Value::NoReturn | Value::Empty(_) => return Err(not_constant()),
    };
    Ok(ast)
}

#[cfg(test)]
mod tests {
    use moc_ir::{AstOp, Path};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn marker_needs_exactly_one_positional_argument() {
        let one = AstExp::call("Eval", vec![AstExp::Integer(1)]);
        assert_eq!(eval_marker(&one), Some(&AstExp::Integer(1)));
        let two = AstExp::call("Eval", vec![AstExp::Integer(1), AstExp::Integer(2)]);
        assert_eq!(eval_marker(&two), None);
        let qualified = AstExp::call("P.Eval", vec![AstExp::Integer(1)]);
        assert_eq!(eval_marker(&qualified), None);
    }

    #[test]
    fn values_become_ast() {
        let v = Value::array(vec![Value::Integer(1), Value::Real(2.5)]);
        assert_eq!(
            value_to_ast(&v),
            Ok(AstExp::Array(vec![AstExp::Integer(1), AstExp::Real(2.5)]))
        );
        assert_eq!(
            value_to_ast(&Value::some(Value::Bool(true))),
            Ok(AstExp::call("SOME", vec![AstExp::Bool(true)]))
        );
        assert_eq!(
            value_to_ast(&Value::enum_literal(Path::parse("E.b"), 2)),
            Ok(AstExp::ident("E.b"))
        );
        let quoted = AstExp::binary(AstExp::ident("x"), AstOp::Add, AstExp::Integer(1));
        assert_eq!(
            value_to_ast(&Value::code(CodeFragment::Expression(quoted.clone()))),
            Ok(quoted)
        );
    }

    #[test]
    fn markers_have_no_ast_form() {
        assert!(value_to_ast(&Value::Fail).is_err());
        assert!(value_to_ast(&Value::NoReturn).is_err());
    }
}
