//! Component reference resolution.
//!
//! A reference is resolved by looking up its stripped name; when that name
//! is not declared, the longest declared prefix is resolved and the
//! remaining identifiers are projected as record fields. Subscripts of each
//! identifier are applied as soon as that identifier's value is known.
//!
//! Expression bindings are evaluated in the environment of the scope that
//! declares them. Values forced this way are remembered in the context and
//! reused on later lookups of the same variable.

use moc_ir::{ComponentRef, CrefPart, Subscript, Type};
use moc_values::{not_constant, unbound_value, Value};

use crate::context::EvalContext;
use crate::environment::{Binding, ClassDef, Env, RecordDef, ScopeKind, VarInfo, VarLookup};
use crate::evaluator::{project_field, ConstEvaluator, EvalOutcome, Request};

impl ConstEvaluator<'_> {
    /// Resolve `cref` and apply its subscripts. `ty` is the type the
    /// reference was annotated with, if known.
    pub(crate) fn eval_cref(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        cref: &ComponentRef,
        ty: &Type,
    ) -> EvalOutcome {
        if let Some(counters) = &self.counters {
            counters.count_cref();
        }
        let (declared, fields) = split_declared(req.env, &cref.parts);
        let name = join_idents(declared);
        let declared_ty = if fields.is_empty() { ty } else { &Type::Unknown };

        let (mut ctx, mut value) = self.eval_variable(ctx, req, &name, declared_ty)?;
        let subs: Vec<&Subscript> = declared.iter().flat_map(|p| p.subscripts.iter()).collect();
        (ctx, value) = self.apply_subscripts(ctx, req, value, &subs)?;

        for part in fields {
            value = project_field(&value, &part.ident)?;
            let subs: Vec<&Subscript> = part.subscripts.iter().collect();
            (ctx, value) = self.apply_subscripts(ctx, req, value, &subs)?;
        }
        Ok((ctx, value))
    }

    /// Value of the variable `name`.
    fn eval_variable(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        name: &str,
        ty: &Type,
    ) -> EvalOutcome {
        let Some(lookup) = req.env.lookup_variable(name) else {
            tracing::trace!(name, "reference to undeclared variable");
            return Err(not_constant());
        };
        match &lookup.info.binding {
            Binding::Value(value) => Ok((ctx, value.clone())),
            Binding::Unbound => self.eval_unbound(ctx, req, &lookup, name, ty),
            Binding::Expr {
                expr,
                constness,
                cached,
            } => {
                let readable = constness.is_evaluable()
                    || req.mode.reads_variables()
                    || lookup.in_iterator_scope
                    || req.env.in_iterator_scope();
                if !readable {
                    return Err(not_constant());
                }
                if let Some(value) = cached {
                    return Ok((ctx, value.clone()));
                }

                let key = (!lookup.in_iterator_scope)
                    .then(|| EvalContext::constant_key(lookup.scope, name));
                if let Some(value) = key.as_deref().and_then(|k| ctx.constant(k)) {
                    let value = value.clone();
                    return Ok((ctx, value));
                }

                if expr.references(name) {
                    if self.config.trace() {
                        tracing::debug!(name, "binding refers to itself");
                    }
                    return Err(not_constant());
                }

                let (mut ctx, value) = self.eval(ctx, req.with_env(&lookup.env), expr)?;
                if let Some(key) = key {
                    ctx.record_constant(key, value.clone());
                }
                Ok((ctx, value))
            }
        }
    }

    /// A declared variable without a binding.
    fn eval_unbound(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        lookup: &VarLookup<'_>,
        name: &str,
        ty: &Type,
    ) -> EvalOutcome {
        let info: &VarInfo = lookup.info;
        if !info.constness.is_evaluable() && !req.mode.reads_variables() {
            return Err(not_constant());
        }

        if let Type::Record { path } = &info.ty {
            if let Some(ClassDef::Record(def)) = req.env.lookup_class(path) {
                if def.fields.iter().all(|f| f.default.is_some()) {
                    return self.record_from_defaults(ctx, req, def);
                }
            }
        }

        let declared = if info.ty == Type::Unknown { ty } else { &info.ty };
        if self.config.defer_unbound() && *declared != Type::Unknown {
            return Ok((ctx, Value::empty(lookup.scope, name, declared.clone())));
        }

        if req.mode.reports_unbound() {
            Err(unbound_value(name))
        } else {
            Err(not_constant())
        }
    }

    /// Record value built from field defaults; later defaults may refer to
    /// earlier fields.
    fn record_from_defaults(
        &self,
        ctx: EvalContext,
        req: Request<'_>,
        def: &RecordDef,
    ) -> EvalOutcome {
        let mut scope = req.env.push_scope(def.path.to_string(), ScopeKind::Class);
        let mut ctx = ctx;
        let mut fields = Vec::with_capacity(def.fields.len());
        for field in &def.fields {
            let Some(default) = &field.default else {
                return Err(not_constant());
            };
            let (next, value) = self.eval(ctx, req.with_env(&scope).deeper(), default)?;
            ctx = next;
            scope.define_var(
                field.name.as_str(),
                VarInfo::value(field.ty.clone(), value.clone()),
            );
            fields.push(value);
        }
        let names = def.fields.iter().map(|f| f.name.clone()).collect();
        Ok((ctx, Value::record(def.path.clone(), fields, names, -1)))
    }
}

/// Split a reference into its longest declared prefix and the trailing
/// record fields. Falls back to the whole reference when no prefix is
/// declared, so the lookup failure is reported for the full name.
fn split_declared<'c>(env: &Env, parts: &'c [CrefPart]) -> (&'c [CrefPart], &'c [CrefPart]) {
    (1..=parts.len())
        .rev()
        .find(|&n| env.lookup_variable(&join_idents(&parts[..n])).is_some())
        .map_or((parts, &[][..]), |n| parts.split_at(n))
}

fn join_idents(parts: &[CrefPart]) -> String {
    let mut name = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            name.push('.');
        }
        name.push_str(&part.ident);
    }
    name
}
