//! Kite IR: the syntax-side data the semantic core consumes.
//!
//! This crate holds everything upstream of type checking that the core
//! reads but never produces:
//! - Spans for source locations
//! - Names for interned identifiers
//! - The flat expression arena (`ExprArena`, `ExprId`)
//! - Declaration nodes (functions, structs, enums, interfaces, aliases)
//! - `ParsedType`, the unresolved form of type annotations
//!
//! The tree is assumed well formed: missing sub-nodes are a parser bug,
//! not something the semantic core recovers from.

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
pub mod ast;
mod expr_id;
mod interner;
mod name;
mod parsed_type;
mod span;

pub use arena::ExprArena;
pub use ast::{
    AliasDef, ArmRange, BinaryOp, ConstDef, EnumDef, Expr, ExprKind, FieldDef, FieldInit,
    FieldInitRange, Function, GenericArg, GenericArgRange, GenericParam, GenericParamKind,
    InterfaceDef, MapEntry, MapEntryRange, MatchArm, MatchPattern, MethodDef, Module, Param, Stmt,
    StmtKind, StmtRange, StructDef, UnaryOp,
};
pub use expr_id::{ExprId, ExprRange};
pub use interner::{InternError, SharedInterner, StringInterner, PRIMITIVE_TYPE_NAMES};
pub use name::Name;
pub use parsed_type::ParsedType;
pub use span::Span;
