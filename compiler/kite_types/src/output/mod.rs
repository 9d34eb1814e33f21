//! Type checker output.
//!
//! - [`TypedModule`]: per-expression types and per-site instantiations
//! - [`TypeCheckResult`]: the module plus the frozen table and diagnostics

use kite_diagnostic::{Diagnostic, ErrorGuaranteed};
use kite_ir::ExprId;
use rustc_hash::FxHashMap;

use crate::solver::Instantiation;
use crate::{TypeCheckError, TypeId, TypeTable};

/// Everything the pass attaches to the AST.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct TypedModule {
    /// Type of each expression, indexed by `ExprId`. `None` for expressions
    /// that were never reached (e.g. after an aborted body).
    pub expr_types: Vec<Option<TypeId>>,
    /// Instantiation recorded on each generic call or construction site.
    pub instantiations: FxHashMap<ExprId, Instantiation>,
    /// Errors in source order of the bodies that produced them.
    pub errors: Vec<TypeCheckError>,
}

impl TypedModule {
    pub fn expr_type(&self, id: ExprId) -> Option<TypeId> {
        self.expr_types.get(id.index()).copied().flatten()
    }

    pub fn instantiation_of(&self, id: ExprId) -> Option<&Instantiation> {
        self.instantiations.get(&id)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Result of checking one module.
#[derive(Clone, Debug)]
pub struct TypeCheckResult {
    pub typed: TypedModule,
    /// The table the module was checked against, for spelling types.
    pub table: TypeTable,
    /// Rendered diagnostics, sorted by span.
    pub diagnostics: Vec<Diagnostic>,
    /// Present iff at least one error was emitted.
    pub error_guarantee: Option<ErrorGuaranteed>,
}

impl TypeCheckResult {
    pub fn has_errors(&self) -> bool {
        self.error_guarantee.is_some()
    }

    /// Type of an expression, spelled for display.
    pub fn display_expr_type(&self, id: ExprId, names: &kite_ir::StringInterner) -> Option<String> {
        self.typed
            .expr_type(id)
            .map(|ty| self.table.display(ty, names))
    }
}

#[cfg(test)]
mod tests;
