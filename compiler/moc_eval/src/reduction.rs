//! Reductions: `array(e for i in s)`, `list(..)`, `listReverse(..)`,
//! `sum(..)`, `product(..)` and user folds.
//!
//! Each iterator source is evaluated to a sequence and filtered by its
//! guard. The sequences are combined into binding tuples (cross product
//! with the first iterator varying fastest, or a position-wise zip), the
//! body is evaluated once per tuple, and the results are folded.
//!
//! For `array`, `list` and `listReverse` the folded sequence is re-nested
//! by the recorded iterator lengths, the last declared iterator becoming
//! the outermost dimension. A reduction over no tuples at all is its
//! default, or `Fail` without one.

use moc_ir::{IterKind, Reduction, ReductionInfo, ReductionIterator, RelationOp};
use moc_values::{
    internal_error, invalid_cast_or_shape, iteration_limit_exceeded, not_constant,
    reduction_guard_failure, EvalResult, Value,
};

use crate::context::EvalContext;
use crate::environment::{Env, ScopeKind, VarInfo};
use crate::evaluator::{expected, ConstEvaluator, EvalOutcome, Request};
use crate::operators::{scalar_op, Arith};
use crate::relations::relate;
use crate::shape::nest;

/// Cap on the number of binding tuples of one reduction.
pub(crate) const MAX_REDUCTION_ITERATIONS: usize = 100_000;

const ITERATOR_SCOPE: &str = "$reduction";

/// How body values are accumulated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Fold {
    Array,
    List,
    ListReverse,
    Named,
}

impl Fold {
    fn of(info: &ReductionInfo) -> Fold {
        match info.path.last() {
            "array" => Fold::Array,
            "list" => Fold::List,
            "listReverse" => Fold::ListReverse,
            _ => Fold::Named,
        }
    }
}

impl ConstEvaluator<'_> {
    pub(crate) fn eval_reduction(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        reduction: &Reduction,
    ) -> EvalOutcome {
        let info = &reduction.info;
        let fold = Fold::of(info);
        let (mut ctx, sequences) = self.iterator_sequences(ctx, req, &reduction.iterators)?;
        let tuples = combine(info.iter_kind, &sequences)?;
        let shape = match info.iter_kind {
            IterKind::Combine => sequences.iter().rev().map(Vec::len).collect(),
            IterKind::Thread => vec![tuples.len()],
        };
        if self.config.trace() {
            tracing::debug!(
                reduction = %info.path,
                iterations = tuples.len(),
                "evaluating reduction"
            );
        }

        // An empty collection, when wanted, comes in as the default.
        if tuples.is_empty() {
            return match &info.default {
                Some(default) => self.eval(ctx, req, default),
                None => Ok((ctx, Value::Fail)),
            };
        }

        let mut acc: Option<Value> = None;
        let mut collected = Vec::new();
        for tuple in &tuples {
            let scope = bind_iterators(req.env, &reduction.iterators, tuple);
            let (next, value) = self.eval(ctx, req.with_env(&scope), &reduction.body)?;
            ctx = next;
            if fold != Fold::Named {
                collected.push(value);
                continue;
            }
            acc = Some(match acc {
                None => value,
                Some(prev) => {
                    let (next, folded) = self.fold_step(ctx, req, info, prev, value)?;
                    ctx = next;
                    folded
                }
            });
        }

        match acc {
            Some(value) => Ok((ctx, value)),
            None => Ok((ctx, collect(fold, collected, &shape))),
        }
    }

    /// Candidate values of every iterator, after its guard.
    fn iterator_sequences(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        iterators: &[ReductionIterator],
    ) -> EvalResult<(EvalContext, Vec<Vec<Value>>)> {
        let mut ctx = ctx;
        let mut sequences = Vec::with_capacity(iterators.len());
        for it in iterators {
            let (next, source) = self.eval(ctx, req, &it.source)?;
            ctx = next;
            let candidates = match &source {
                Value::Array { elements, .. } | Value::List(elements) => elements.to_vec(),
                Value::Empty(_) => return Err(not_constant()),
                other => return Err(expected("reduction iterator", "array or list", other)),
            };
            let Some(guard) = &it.guard else {
                sequences.push(candidates);
                continue;
            };
            let mut kept = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                let scope = req
                    .env
                    .push_scope(ITERATOR_SCOPE, ScopeKind::Iterator)
                    .with_var(it.id.as_str(), VarInfo::value(it.ty.clone(), candidate.clone()));
                let (next, verdict) = self.eval(ctx, req.with_env(&scope).deeper(), guard)?;
                ctx = next;
                match verdict {
                    Value::Bool(true) => kept.push(candidate),
                    Value::Bool(false) => {}
                    _ => return Err(reduction_guard_failure(&guard.to_string())),
                }
            }
            sequences.push(kept);
        }
        Ok((ctx, sequences))
    }

    /// Combine the running accumulator with the next body value.
    fn fold_step(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        info: &ReductionInfo,
        acc: Value,
        next: Value,
    ) -> EvalOutcome {
        let Some(fold_exp) = &info.fold_exp else {
            return Ok((ctx, fallback_fold(info.path.last(), &acc, &next)?));
        };
        let scope = req
            .env
            .push_scope(ITERATOR_SCOPE, ScopeKind::Iterator)
            .with_var(info.fold_name.as_str(), VarInfo::value(info.ty.clone(), next))
            .with_var(info.result_name.as_str(), VarInfo::value(info.ty.clone(), acc));
        self.eval(ctx, req.with_env(&scope).deeper(), fold_exp)
    }
}

fn bind_iterators(env: &Env, iterators: &[ReductionIterator], tuple: &[Value]) -> Env {
    let mut scope = env.push_scope(ITERATOR_SCOPE, ScopeKind::Iterator);
    for (it, value) in iterators.iter().zip(tuple) {
        scope.define_var(it.id.as_str(), VarInfo::value(it.ty.clone(), value.clone()));
    }
    scope
}

/// Binding tuples, one value per iterator.
fn combine(kind: IterKind, sequences: &[Vec<Value>]) -> EvalResult<Vec<Vec<Value>>> {
    match kind {
        IterKind::Thread => {
            let len = sequences.first().map_or(0, Vec::len);
            if sequences.iter().any(|s| s.len() != len) {
                let lens: Vec<usize> = sequences.iter().map(Vec::len).collect();
                return Err(invalid_cast_or_shape(format!(
                    "threaded reduction iterators have different lengths {lens:?}"
                )));
            }
            Ok((0..len)
                .map(|i| sequences.iter().map(|s| s[i].clone()).collect())
                .collect())
        }
        IterKind::Combine => {
            let total = sequences
                .iter()
                .try_fold(1usize, |n, s| n.checked_mul(s.len()))
                .filter(|&n| n <= MAX_REDUCTION_ITERATIONS)
                .ok_or_else(|| iteration_limit_exceeded(MAX_REDUCTION_ITERATIONS))?;
            let mut tuples = Vec::with_capacity(total);
            for flat in 0..total {
                let mut rest = flat;
                let tuple = sequences
                    .iter()
                    .map(|s| {
                        let value = s[rest % s.len()].clone();
                        rest /= s.len();
                        value
                    })
                    .collect();
                tuples.push(tuple);
            }
            Ok(tuples)
        }
    }
}

/// Result of a pseudo-fold over at least one value.
fn collect(fold: Fold, mut values: Vec<Value>, shape: &[usize]) -> Value {
    match fold {
        Fold::Array => {
            let values = values.iter().map(|v| v.unboxed().clone()).collect();
            nest(values, shape, Value::array)
        }
        Fold::List => nest(values, shape, Value::list),
        Fold::ListReverse => {
            values.reverse();
            nest(values, shape, Value::list)
        }
        Fold::Named => Value::Fail,
    }
}

/// `sum`, `product`, `min` and `max` without an explicit fold expression.
fn fallback_fold(name: &str, acc: &Value, next: &Value) -> EvalResult<Value> {
    match name {
        "sum" => combine_numeric(Arith::Add, acc, next),
        "product" => combine_numeric(Arith::Mul, acc, next),
        "min" | "max" => {
            let op = if name == "max" {
                RelationOp::GreaterEq
            } else {
                RelationOp::LessEq
            };
            let keep = relate(acc, op, next).ok_or_else(|| {
                internal_error(format!(
                    "`{name}` reduction over {} and {}",
                    acc.type_name(),
                    next.type_name()
                ))
            })?;
            Ok(if keep { acc.clone() } else { next.clone() })
        }
        _ => Err(internal_error(format!(
            "reduction `{name}` has no fold expression"
        ))),
    }
}

fn combine_numeric(op: Arith, acc: &Value, next: &Value) -> EvalResult<Value> {
    if acc.is_array() || next.is_array() {
        return acc
            .try_zip_leaves(next, &mut |a, b| scalar_op(op, a, b))
            .unwrap_or_else(|| {
                Err(invalid_cast_or_shape(format!(
                    "reduction over arrays of sizes {:?} and {:?}",
                    acc.dims(),
                    next.dims()
                )))
            });
    }
    if acc.as_number().is_none() {
        return Err(internal_error(format!(
            "reduction accumulator is {}, expected a number",
            acc.type_name()
        )));
    }
    scalar_op(op, acc, next)
}
