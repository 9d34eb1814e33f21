//! Array, map and tuple literals.
//!
//! With an expected collection type every element is checked against it.
//! Without one the first element decides and the rest must agree; an empty
//! literal then has nothing to go on.

use kite_ir::{ExprArena, ExprRange, MapEntryRange, Span};

use super::{check_expr, infer_expr};
use crate::infer::InferEngine;
use crate::{TypeData, TypeErrorKind, TypeId};

/// Peel `?T` so `x: ?[]i32 := [1]` still sees the element type.
fn collection_hint(engine: &InferEngine<'_>, expected: Option<TypeId>) -> Option<TypeData> {
    let mut ty = expected?;
    while let Some(inner) = engine.table().option_inner(ty) {
        ty = inner;
    }
    Some(engine.table().lookup(ty))
}

pub(super) fn infer_array(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    elems: ExprRange,
    expected: Option<TypeId>,
    span: Span,
) -> TypeId {
    let ids = arena.get_expr_list(elems);
    let interner = engine.table().interner();

    let (elem, fixed_len) = match collection_hint(engine, expected) {
        Some(TypeData::DynArray(elem)) => (elem, None),
        Some(TypeData::FixedArray { len, elem }) => (elem, Some(len)),
        _ => {
            let Some((&first, rest)) = ids.split_first() else {
                return engine.error(span, TypeErrorKind::UntypedLiteral);
            };
            let elem = infer_expr(engine, arena, first, None);
            for &id in rest {
                check_expr(engine, arena, id, elem);
            }
            return if elem.is_error() {
                TypeId::ERROR
            } else {
                interner.dyn_array(elem)
            };
        }
    };

    for &id in ids {
        check_expr(engine, arena, id, elem);
    }
    match fixed_len {
        Some(len) if len == ids.len() as u64 => interner.fixed_array(len, elem),
        _ => interner.dyn_array(elem),
    }
}

pub(super) fn infer_map(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    entries: MapEntryRange,
    expected: Option<TypeId>,
    span: Span,
) -> TypeId {
    let entries = arena.get_map_entries(entries);
    let interner = engine.table().interner();

    let (key, value) = match collection_hint(engine, expected) {
        Some(TypeData::Map { key, value }) => (key, value),
        _ => {
            let Some(first) = entries.first() else {
                return engine.error(span, TypeErrorKind::UntypedLiteral);
            };
            let key = infer_expr(engine, arena, first.key, None);
            let value = infer_expr(engine, arena, first.value, None);
            for entry in &entries[1..] {
                check_expr(engine, arena, entry.key, key);
                check_expr(engine, arena, entry.value, value);
            }
            if key.is_error() || value.is_error() {
                return TypeId::ERROR;
            }
            return interner.map(key, value);
        }
    };

    for entry in entries {
        check_expr(engine, arena, entry.key, key);
        check_expr(engine, arena, entry.value, value);
    }
    interner.map(key, value)
}

pub(super) fn infer_tuple(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    elems: ExprRange,
    expected: Option<TypeId>,
) -> TypeId {
    let ids = arena.get_expr_list(elems);
    let hints: Vec<Option<TypeId>> = match collection_hint(engine, expected) {
        Some(TypeData::Tuple(tys)) if tys.len() == ids.len() => tys.iter().copied().map(Some).collect(),
        _ => vec![None; ids.len()],
    };
    let tys: Vec<TypeId> = ids
        .iter()
        .zip(hints)
        .map(|(&id, hint)| infer_expr(engine, arena, id, hint))
        .collect();
    engine.table().interner().tuple(&tys)
}
