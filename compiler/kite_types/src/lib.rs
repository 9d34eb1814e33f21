//! Static semantic core for Kite.
//!
//! Takes an already-built AST ([`kite_ir`]) and produces types for every
//! expression, the instantiation of every generic site, and diagnostics.
//!
//! # Components
//!
//! - [`TypeTable`]: interned types plus the declaration registry. Type
//!   identity is `TypeId` equality; assignability lives here.
//! - [`ConstraintSolver`]: generic instantiation by structural unification.
//! - [`FlowTypeTracker`]: narrowing environments driven by conditions.
//! - [`LubResolver`]: the join used to type `if`/`match` in value position.
//!
//! [`check_module`] runs registration, then checks every body against the
//! frozen table, optionally in parallel.

mod check;
mod config;
mod data;
mod env;
mod flags;
mod flow;
mod infer;
mod lub;
mod output;
mod registry;
mod solver;
mod table;
mod type_error;
mod type_id;
mod type_interner;

#[cfg(test)]
mod test_support;

pub use check::check_module;
pub use config::{CheckConfig, ErrorPolicy};
pub use data::{ConstValue, TypeData};
pub use env::{Local, TypeEnv};
pub use flags::TypeFlags;
pub use flow::{
    BranchOutcome, Fact, FlowEnvironment, FlowFact, FlowTypeTracker, NarrowPath, Narrowing,
};
pub use infer::{check_expr, infer_discarded, infer_expr, InferEngine, InferOutput};
pub use lub::{LubError, LubResolver};
pub use output::{TypeCheckResult, TypedModule};
pub use registry::{
    ConstInfo, DeclInfo, DeclKind, DeclRegistry, EnumInfo, FunctionSig, GenericParamDef,
    GenericParamDefKind, GenericParams, InterfaceInfo, MethodSig, ParamSig, StructInfo, TypeDef,
};
pub use solver::{
    ConstraintSolver, Equation, ExplicitGenericArg, GenericBinding, Instantiation, SolveError,
};
pub use table::{ParamBounds, ResolveError, ResolvedMethod, TypeTable};
pub use type_error::{TypeCheckError, TypeErrorKind};
pub use type_id::{DeclId, NumericCategory, Primitive, TypeId, TypeVar};
pub use type_interner::{SharedTypeInterner, TypeInternError, TypeInterner};

// Size assertions to prevent accidental regressions.
#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{DeclId, TypeId, TypeVar};
    kite_ir::static_assert_size!(TypeId, 4);
    kite_ir::static_assert_size!(TypeVar, 4);
    kite_ir::static_assert_size!(DeclId, 4);
}
