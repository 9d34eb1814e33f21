//! Expression inference.
//!
//! `expected` is a hint, not a requirement: literals adopt it when they fit
//! and branch expressions fall back to it when their arms do not join.
//! Only [`check_expr`] turns a disagreement into an error.

mod calls;
mod collections;
mod conditions;
mod control_flow;
mod operators;

pub(crate) use calls::const_value_of;

use kite_ir::{ExprArena, ExprId, ExprKind, Name, Span};

use super::walk::path_of;
use super::InferEngine;
use crate::flow::NarrowPath;
use crate::{DeclKind, Primitive, TypeData, TypeDef, TypeErrorKind, TypeId};

/// Infer `expr_id` in value position.
#[tracing::instrument(level = "trace", skip(engine, arena))]
pub fn infer_expr(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    expr_id: ExprId,
    expected: Option<TypeId>,
) -> TypeId {
    infer_expr_in(engine, arena, expr_id, expected, true)
}

/// Infer `expr_id` in statement position, where its value is unused.
pub fn infer_discarded(engine: &mut InferEngine<'_>, arena: &ExprArena, expr_id: ExprId) -> TypeId {
    infer_expr_in(engine, arena, expr_id, None, false)
}

/// Infer `expr_id` and require it to be assignable to `expected`.
#[tracing::instrument(level = "trace", skip(engine, arena))]
pub fn check_expr(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    expr_id: ExprId,
    expected: TypeId,
) -> TypeId {
    let found = infer_expr(engine, arena, expr_id, Some(expected));
    if !engine.is_aborted() && !engine.assignable(found, expected) {
        let span = arena.get_expr(expr_id).span;
        engine.error(span, TypeErrorKind::Mismatch { expected, found });
    }
    found
}

fn infer_expr_in(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    expr_id: ExprId,
    expected: Option<TypeId>,
    used: bool,
) -> TypeId {
    if engine.is_aborted() || !expr_id.is_present() {
        return TypeId::ERROR;
    }
    let ty = infer_expr_inner(engine, arena, expr_id, expected, used);
    if engine.is_aborted() {
        return TypeId::ERROR;
    }
    engine.store_type(expr_id, ty);
    ty
}

fn infer_expr_inner(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    expr_id: ExprId,
    expected: Option<TypeId>,
    used: bool,
) -> TypeId {
    let expr = arena.get_expr(expr_id);
    let span = expr.span;
    match &expr.kind {
        ExprKind::Int(value) => infer_int(engine, i128::from(*value), expected),
        ExprKind::Float(_) => infer_float(engine, expected),
        ExprKind::Bool(_) => TypeId::BOOL,
        ExprKind::Str(_) => TypeId::STRING,
        ExprKind::Rune(_) => TypeId::RUNE,
        ExprKind::NoneLit => infer_none(engine, expected),
        ExprKind::Nil => infer_nil(engine, expected),

        ExprKind::Ident(name) => infer_ident(engine, *name, span),
        ExprKind::EnumVariant { enum_name, variant } => {
            infer_enum_variant(engine, *enum_name, *variant, span)
        }
        ExprKind::Field { receiver, field } => {
            infer_field(engine, arena, expr_id, *receiver, *field, span)
        }
        ExprKind::Index { receiver, index } => infer_index(engine, arena, *receiver, *index, span),

        ExprKind::Unary { op, operand } => {
            operators::infer_unary(engine, arena, expr_id, *op, *operand, expected)
        }
        ExprKind::Binary { op, .. } if op.is_logical() => {
            conditions::infer_condition(engine, arena, expr_id);
            TypeId::BOOL
        }
        ExprKind::Binary { op, left, right } => {
            operators::infer_binary(engine, arena, *op, *left, *right, span, expected)
        }
        ExprKind::Is { .. } | ExprKind::NoneCheck { .. } => {
            conditions::infer_condition(engine, arena, expr_id);
            TypeId::BOOL
        }

        ExprKind::Call {
            callee,
            generic_args,
            args,
        } => calls::infer_call(engine, arena, expr_id, *callee, *generic_args, *args),
        ExprKind::MethodCall {
            receiver,
            method,
            args,
        } => calls::infer_method_call(engine, arena, *receiver, *method, *args, span),
        ExprKind::MutArg(operand) => calls::infer_mut_arg(engine, arena, *operand, expected),
        ExprKind::Ref { mutable, operand } => {
            calls::infer_ref(engine, arena, *mutable, *operand, expected, span)
        }
        ExprKind::StructLit {
            name,
            generic_args,
            fields,
        } => calls::infer_struct_lit(engine, arena, expr_id, *name, *generic_args, *fields),

        ExprKind::ArrayLit(elems) => {
            collections::infer_array(engine, arena, *elems, expected, span)
        }
        ExprKind::MapLit(entries) => {
            collections::infer_map(engine, arena, *entries, expected, span)
        }
        ExprKind::Tuple(elems) => collections::infer_tuple(engine, arena, *elems, expected),

        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => control_flow::infer_if(
            engine,
            arena,
            *cond,
            *then_branch,
            *else_branch,
            expected,
            used,
            span,
        ),
        ExprKind::IfGuard {
            binding,
            value,
            then_branch,
            else_branch,
        } => control_flow::infer_if_guard(
            engine,
            arena,
            *binding,
            *value,
            *then_branch,
            *else_branch,
            expected,
            used,
            span,
        ),
        ExprKind::Match {
            scrutinee,
            arms,
            else_branch,
        } => control_flow::infer_match(
            engine,
            arena,
            *scrutinee,
            *arms,
            *else_branch,
            expected,
            used,
            span,
        ),
        ExprKind::Block { stmts, result } => {
            control_flow::infer_block(engine, arena, *stmts, *result, expected, used)
        }
        ExprKind::Return(value) => control_flow::infer_return(engine, arena, *value, span),
        ExprKind::Break => control_flow::infer_loop_control(engine, "break", span),
        ExprKind::Continue => control_flow::infer_loop_control(engine, "continue", span),
        ExprKind::Loop { cond, body } => control_flow::infer_loop(engine, arena, *cond, *body),
    }
}

/// The type a literal should try to take from its context: the expected
/// type with any `?T` / `Result[T, E]` wrappers peeled.
fn literal_target(engine: &InferEngine<'_>, expected: Option<TypeId>) -> Option<TypeId> {
    let mut ty = expected?;
    loop {
        match engine.table().lookup(ty) {
            TypeData::Option(inner) | TypeData::Result { ok: inner, .. } => ty = inner,
            _ => return Some(ty),
        }
    }
}

fn infer_int(engine: &InferEngine<'_>, value: i128, expected: Option<TypeId>) -> TypeId {
    if let Some(prim) = literal_target(engine, expected).and_then(Primitive::from_type_id) {
        let fits = prim
            .int_range()
            .is_some_and(|(min, max)| (min..=max).contains(&value));
        if fits || prim.is_float() {
            return prim.type_id();
        }
    }
    if i32::try_from(value).is_ok() {
        TypeId::I32
    } else {
        TypeId::I64
    }
}

fn infer_float(engine: &InferEngine<'_>, expected: Option<TypeId>) -> TypeId {
    match literal_target(engine, expected).and_then(Primitive::from_type_id) {
        Some(prim) if prim.is_float() => prim.type_id(),
        _ => TypeId::F64,
    }
}

fn infer_none(engine: &InferEngine<'_>, expected: Option<TypeId>) -> TypeId {
    match expected {
        Some(ty) if engine.table().option_inner(ty).is_some() => ty,
        _ => TypeId::UNTYPED_NONE,
    }
}

fn infer_nil(engine: &InferEngine<'_>, expected: Option<TypeId>) -> TypeId {
    match expected.map(|ty| (ty, engine.table().lookup(ty))) {
        Some((ty, TypeData::Pointer { .. })) => ty,
        _ => TypeId::UNTYPED_NIL,
    }
}

/// A literal whose type is decided by context: numeric literals (possibly
/// negated), `none` and `nil`.
pub(super) fn is_untyped_literal(arena: &ExprArena, id: ExprId) -> bool {
    match arena.try_get_expr(id).map(|e| &e.kind) {
        Some(ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::NoneLit | ExprKind::Nil) => true,
        Some(ExprKind::Unary {
            op: kite_ir::UnaryOp::Neg,
            operand,
        }) => matches!(
            arena.try_get_expr(*operand).map(|e| &e.kind),
            Some(ExprKind::Int(_) | ExprKind::Float(_))
        ),
        _ => false,
    }
}

fn infer_ident(engine: &mut InferEngine<'_>, name: Name, span: Span) -> TypeId {
    if let Some(local) = engine.env.lookup(name) {
        return engine
            .flow
            .narrowed(&NarrowPath::var(name))
            .unwrap_or(local.ty);
    }
    let table = engine.table();
    if let Some(info) = table.registry().constant(name) {
        return info.ty;
    }
    if let Some(sig) = table.registry().function(name) {
        return match sig.generics.get(0) {
            // A generic function has no single type without a call site.
            Some(param) => engine.error(span, TypeErrorKind::UnresolvedGeneric { param: param.name }),
            None => table.fn_type(sig),
        };
    }
    engine.error(span, TypeErrorKind::UnknownIdent { name })
}

fn infer_enum_variant(
    engine: &mut InferEngine<'_>,
    enum_name: Name,
    variant: Name,
    span: Span,
) -> TypeId {
    let table = engine.table();
    let Some(TypeDef::Decl(decl)) = table.registry().type_def(enum_name) else {
        return engine.error(span, TypeErrorKind::UnknownType { name: enum_name });
    };
    let ty = table.interner().named(decl, &[]);
    match &table.registry().decl(decl).kind {
        DeclKind::Enum(info) if info.variants.contains(&variant) => ty,
        _ => engine.error(span, TypeErrorKind::UnknownMember { ty, member: variant }),
    }
}

/// Type of a path as declared, before any narrowing of the path itself.
/// Prefixes of the path are read with their narrowing.
pub(super) fn declared_path_type(engine: &InferEngine<'_>, path: &NarrowPath) -> Option<TypeId> {
    let mut ty = engine.env.lookup(path.root())?.ty;
    let mut prefix = NarrowPath::var(path.root());
    for &field in path.fields() {
        let receiver = engine.flow.narrowed(&prefix).unwrap_or(ty);
        ty = engine.table().field_type(receiver, field)?;
        prefix = prefix.field(field);
    }
    Some(ty)
}

fn infer_field(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    expr_id: ExprId,
    receiver: ExprId,
    field: Name,
    span: Span,
) -> TypeId {
    let receiver_ty = infer_expr(engine, arena, receiver, None);
    if receiver_ty.is_error() {
        return TypeId::ERROR;
    }
    if let Some(narrowed) = path_of(arena, expr_id)
        .filter(|p| engine.env.lookup(p.root()).is_some())
        .and_then(|p| engine.flow.narrowed(&p))
    {
        return narrowed;
    }
    match engine.table().field_type(receiver_ty, field) {
        Some(ty) => ty,
        None => engine.error(
            span,
            TypeErrorKind::UnknownMember {
                ty: receiver_ty,
                member: field,
            },
        ),
    }
}

fn infer_index(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    receiver: ExprId,
    index: ExprId,
    span: Span,
) -> TypeId {
    let receiver_ty = infer_expr(engine, arena, receiver, None);
    let table = engine.table();
    let container = table.deref(receiver_ty);
    match table.lookup(container) {
        _ if receiver_ty.is_error() => {
            infer_expr(engine, arena, index, None);
            TypeId::ERROR
        }
        TypeData::FixedArray { elem, .. } | TypeData::DynArray(elem) => {
            check_integer_index(engine, arena, index);
            elem
        }
        TypeData::Primitive(Primitive::String) => {
            check_integer_index(engine, arena, index);
            TypeId::U8
        }
        TypeData::Map { key, value } => {
            check_expr(engine, arena, index, key);
            value
        }
        _ => {
            infer_expr(engine, arena, index, None);
            engine.error(span, TypeErrorKind::NotIndexable { ty: receiver_ty })
        }
    }
}

fn check_integer_index(engine: &mut InferEngine<'_>, arena: &ExprArena, index: ExprId) {
    let ty = infer_expr(engine, arena, index, Some(TypeId::USIZE));
    let is_int = Primitive::from_type_id(ty).is_some_and(Primitive::is_integer);
    if !ty.is_error() && !is_int {
        let span = arena.get_expr(index).span;
        engine.error(
            span,
            TypeErrorKind::Mismatch {
                expected: TypeId::USIZE,
                found: ty,
            },
        );
    }
}
