//! Expression typing for one body.
//!
//! [`InferEngine`] owns everything that is per-body: the scope chain, the
//! flow tracker, recorded expression types and instantiations, and the
//! errors found so far. It borrows the frozen [`TypeTable`], so many engines
//! can run at once.
//!
//! The expression walk itself lives in [`expr`] as free functions taking
//! the engine and the arena, split by concern:
//!
//! - `expr/mod.rs`: dispatch, literals, names, fields, indexing
//! - `expr/calls.rs`: calls, methods, struct literals, generic arguments
//! - `expr/collections.rs`: array, map and tuple literals
//! - `expr/conditions.rs`: conditions and the facts they prove
//! - `expr/control_flow.rs`: blocks, statements, branches and loops
//! - `expr/operators.rs`: unary and binary operators

mod expr;
mod walk;

pub use expr::{check_expr, infer_discarded, infer_expr};
pub(crate) use expr::const_value_of;

use kite_ir::{ExprId, Name, ParsedType, Span, StringInterner};
use rustc_hash::FxHashMap;

use crate::env::TypeEnv;
use crate::flow::{FlowTypeTracker, NarrowPath};
use crate::solver::Instantiation;
use crate::{
    ErrorPolicy, GenericParams, ParamBounds, TypeCheckError, TypeErrorKind, TypeId, TypeTable,
};

/// What one engine produced.
#[derive(Clone, Debug, Default)]
pub struct InferOutput {
    pub expr_types: FxHashMap<ExprId, TypeId>,
    pub instantiations: FxHashMap<ExprId, Instantiation>,
    pub errors: Vec<TypeCheckError>,
}

pub struct InferEngine<'a> {
    table: &'a TypeTable,
    names: &'a StringInterner,
    /// Generic parameters visible in the body.
    generics: &'a GenericParams,
    bounds: ParamBounds,
    env: TypeEnv,
    flow: FlowTypeTracker,
    return_type: TypeId,
    loop_depth: u32,
    policy: ErrorPolicy,
    aborted: bool,
    expr_types: FxHashMap<ExprId, TypeId>,
    instantiations: FxHashMap<ExprId, Instantiation>,
    errors: Vec<TypeCheckError>,
}

impl<'a> InferEngine<'a> {
    pub fn new(
        table: &'a TypeTable,
        names: &'a StringInterner,
        generics: &'a GenericParams,
        policy: ErrorPolicy,
    ) -> Self {
        let mut bounds = ParamBounds::new();
        for param in generics {
            if !param.is_const() {
                bounds.insert(
                    table.interner().param(param.name, param.index),
                    param.constraints().to_vec(),
                );
            }
        }
        InferEngine {
            table,
            names,
            generics,
            bounds,
            env: TypeEnv::new(),
            flow: FlowTypeTracker::new(),
            return_type: TypeId::UNIT,
            loop_depth: 0,
            policy,
            aborted: false,
            expr_types: FxHashMap::default(),
            instantiations: FxHashMap::default(),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_return_type(mut self, ret: TypeId) -> Self {
        self.return_type = ret;
        self
    }

    #[inline]
    pub fn table(&self) -> &'a TypeTable {
        self.table
    }

    #[inline]
    pub fn names(&self) -> &'a StringInterner {
        self.names
    }

    pub fn bind_local(&mut self, name: Name, ty: TypeId, mutable: bool) {
        self.flow.invalidate(&NarrowPath::var(name));
        self.env.bind(name, ty, mutable);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn expr_type(&self, id: ExprId) -> Option<TypeId> {
        self.expr_types.get(&id).copied()
    }

    pub fn errors(&self) -> &[TypeCheckError] {
        &self.errors
    }

    pub fn finish(self) -> InferOutput {
        InferOutput {
            expr_types: self.expr_types,
            instantiations: self.instantiations,
            errors: self.errors,
        }
    }

    /// Record an error and return the error sentinel for the expression.
    pub(crate) fn error(&mut self, span: Span, kind: impl Into<TypeErrorKind>) -> TypeId {
        let err = TypeCheckError::new(span, kind);
        tracing::debug!(code = %err.code(), ?span, "type error");
        self.errors.push(err);
        if self.policy == ErrorPolicy::AbortFunction {
            self.aborted = true;
        }
        TypeId::ERROR
    }

    pub(crate) fn store_type(&mut self, id: ExprId, ty: TypeId) {
        self.expr_types.insert(id, ty);
    }

    pub(crate) fn record_instantiation(&mut self, id: ExprId, inst: Instantiation) {
        self.instantiations.insert(id, inst);
    }

    /// Assignability with the constraints of in-scope generic parameters.
    pub(crate) fn assignable(&self, value: TypeId, target: TypeId) -> bool {
        self.table.assignable_in(value, target, &self.bounds)
    }

    pub(crate) fn bounds(&self) -> &ParamBounds {
        &self.bounds
    }

    pub(crate) fn generics(&self) -> &'a GenericParams {
        self.generics
    }

    /// Resolve a type written in the body, reporting failures.
    pub(crate) fn resolve_type(&mut self, parsed: &ParsedType, span: Span) -> TypeId {
        match self.table.resolve(parsed, self.generics, self.names) {
            Ok(ty) => ty,
            Err(err) => self.error(span, err),
        }
    }

    /// Enter a nested scope, returning the one to restore.
    pub(crate) fn enter_scope(&mut self) -> TypeEnv {
        let child = self.env.child();
        std::mem::replace(&mut self.env, child)
    }

    /// Leave a scope: narrowings on names it bound die with it.
    pub(crate) fn exit_scope(&mut self, outer: TypeEnv) {
        let bound: Vec<Name> = self.env.own_names().collect();
        for name in bound {
            self.flow.invalidate(&NarrowPath::var(name));
        }
        self.env = outer;
    }
}

#[cfg(test)]
mod tests;
