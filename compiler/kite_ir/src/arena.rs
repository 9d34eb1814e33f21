//! Flat storage for expression trees.
//!
//! Nodes refer to each other by [`ExprId`]; variable-length children live in
//! side tables addressed by range types. Children are allocated before their
//! parent, so every id a node holds is smaller than the node's own id.

use crate::ast::{
    ArmRange, FieldInitRange, GenericArgRange, MapEntryRange, MatchArm, StmtRange,
};
use crate::{Expr, ExprId, ExprKind, ExprRange, FieldInit, GenericArg, MapEntry, Span, Stmt};

#[inline]
fn to_u32(n: usize, what: &str) -> u32 {
    match u32::try_from(n) {
        Ok(v) => v,
        Err(_) => panic!("{what} arena exceeded u32::MAX entries"),
    }
}

/// Arena owning every expression of a module.
#[derive(Clone, Default, Debug)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    expr_lists: Vec<ExprId>,
    stmts: Vec<Stmt>,
    arms: Vec<MatchArm>,
    field_inits: Vec<FieldInit>,
    map_entries: Vec<MapEntry>,
    generic_args: Vec<GenericArg>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(to_u32(self.exprs.len(), "expression"));
        self.exprs.push(expr);
        id
    }

    /// Shorthand for `alloc_expr(Expr::new(kind, span))`.
    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.alloc_expr(Expr::new(kind, span))
    }

    /// # Panics
    /// If `id` is invalid or out of range.
    #[inline]
    #[track_caller]
    pub fn get_expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn try_get_expr(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id.get()?.index())
    }

    pub fn alloc_expr_list(&mut self, ids: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = to_u32(self.expr_lists.len(), "expression list");
        self.expr_lists.extend(ids);
        let len = to_u32(self.expr_lists.len(), "expression list") - start;
        ExprRange::new(start, len)
    }

    pub fn get_expr_list(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.to_range()]
    }

    pub fn alloc_stmts(&mut self, stmts: impl IntoIterator<Item = Stmt>) -> StmtRange {
        let start = to_u32(self.stmts.len(), "statement");
        self.stmts.extend(stmts);
        let len = to_u32(self.stmts.len(), "statement") - start;
        StmtRange::new(start, len)
    }

    pub fn get_stmts(&self, range: StmtRange) -> &[Stmt] {
        &self.stmts[range.to_range()]
    }

    pub fn alloc_arms(&mut self, arms: impl IntoIterator<Item = MatchArm>) -> ArmRange {
        let start = to_u32(self.arms.len(), "match arm");
        self.arms.extend(arms);
        let len = to_u32(self.arms.len(), "match arm") - start;
        ArmRange::new(start, len)
    }

    pub fn get_arms(&self, range: ArmRange) -> &[MatchArm] {
        &self.arms[range.to_range()]
    }

    pub fn alloc_field_inits(
        &mut self,
        inits: impl IntoIterator<Item = FieldInit>,
    ) -> FieldInitRange {
        let start = to_u32(self.field_inits.len(), "field initializer");
        self.field_inits.extend(inits);
        let len = to_u32(self.field_inits.len(), "field initializer") - start;
        FieldInitRange::new(start, len)
    }

    pub fn get_field_inits(&self, range: FieldInitRange) -> &[FieldInit] {
        &self.field_inits[range.to_range()]
    }

    pub fn alloc_map_entries(
        &mut self,
        entries: impl IntoIterator<Item = MapEntry>,
    ) -> MapEntryRange {
        let start = to_u32(self.map_entries.len(), "map entry");
        self.map_entries.extend(entries);
        let len = to_u32(self.map_entries.len(), "map entry") - start;
        MapEntryRange::new(start, len)
    }

    pub fn get_map_entries(&self, range: MapEntryRange) -> &[MapEntry] {
        &self.map_entries[range.to_range()]
    }

    pub fn alloc_generic_args(
        &mut self,
        args: impl IntoIterator<Item = GenericArg>,
    ) -> GenericArgRange {
        let start = to_u32(self.generic_args.len(), "generic argument");
        self.generic_args.extend(args);
        let len = to_u32(self.generic_args.len(), "generic argument") - start;
        GenericArgRange::new(start, len)
    }

    pub fn get_generic_args(&self, range: GenericArgRange) -> &[GenericArg] {
        &self.generic_args[range.to_range()]
    }

    /// Number of expressions; sizes per-expression side tables.
    #[inline]
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}
