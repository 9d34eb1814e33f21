//! Syntactic scans over expression trees.

use kite_ir::{ExprArena, ExprId, ExprKind, GenericArg, MatchPattern, StmtKind};
use smallvec::SmallVec;

use crate::flow::NarrowPath;
use crate::DeclRegistry;

/// Direct children of `id`, in source order.
pub(super) fn children(arena: &ExprArena, id: ExprId) -> SmallVec<[ExprId; 4]> {
    let mut out: SmallVec<[ExprId; 4]> = SmallVec::new();
    let Some(expr) = arena.try_get_expr(id) else {
        return out;
    };
    match &expr.kind {
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Bool(_)
        | ExprKind::Str(_)
        | ExprKind::Rune(_)
        | ExprKind::NoneLit
        | ExprKind::Nil
        | ExprKind::Ident(_)
        | ExprKind::EnumVariant { .. }
        | ExprKind::Break
        | ExprKind::Continue => {}
        ExprKind::Field { receiver, .. } => out.push(*receiver),
        ExprKind::Index { receiver, index } => out.extend([*receiver, *index]),
        ExprKind::Unary { operand, .. }
        | ExprKind::Ref { operand, .. }
        | ExprKind::Is { operand, .. }
        | ExprKind::NoneCheck { operand, .. }
        | ExprKind::MutArg(operand)
        | ExprKind::Return(operand) => out.push(*operand),
        ExprKind::Binary { left, right, .. } => out.extend([*left, *right]),
        ExprKind::Call {
            generic_args, args, ..
        } => {
            for arg in arena.get_generic_args(*generic_args) {
                if let GenericArg::Const(e) = arg {
                    out.push(*e);
                }
            }
            out.extend(arena.get_expr_list(*args).iter().copied());
        }
        ExprKind::MethodCall { receiver, args, .. } => {
            out.push(*receiver);
            out.extend(arena.get_expr_list(*args).iter().copied());
        }
        ExprKind::StructLit { fields, .. } => {
            out.extend(arena.get_field_inits(*fields).iter().map(|f| f.value));
        }
        ExprKind::ArrayLit(elems) | ExprKind::Tuple(elems) => {
            out.extend(arena.get_expr_list(*elems).iter().copied());
        }
        ExprKind::MapLit(entries) => {
            for entry in arena.get_map_entries(*entries) {
                out.extend([entry.key, entry.value]);
            }
        }
        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => out.extend([*cond, *then_branch, *else_branch]),
        ExprKind::IfGuard {
            value,
            then_branch,
            else_branch,
            ..
        } => out.extend([*value, *then_branch, *else_branch]),
        ExprKind::Match {
            scrutinee,
            arms,
            else_branch,
        } => {
            out.push(*scrutinee);
            for arm in arena.get_arms(*arms) {
                if let MatchPattern::Value(e) = arm.pattern {
                    out.push(e);
                }
                out.push(arm.body);
            }
            out.push(*else_branch);
        }
        ExprKind::Block { stmts, result } => {
            for stmt in arena.get_stmts(*stmts) {
                match &stmt.kind {
                    StmtKind::Let { init, .. } => out.push(*init),
                    StmtKind::Assign { target, value } => out.extend([*target, *value]),
                    StmtKind::Expr(e) => out.push(*e),
                }
            }
            out.push(*result);
        }
        ExprKind::Loop { cond, body } => out.extend([*cond, *body]),
    }
    out.retain(|c| c.is_present());
    out
}

/// The narrowable path an expression denotes, if any: a name or a chain of
/// field accesses off one.
pub(super) fn path_of(arena: &ExprArena, id: ExprId) -> Option<NarrowPath> {
    match &arena.try_get_expr(id)?.kind {
        ExprKind::Ident(name) => Some(NarrowPath::var(*name)),
        ExprKind::Field { receiver, field } => Some(path_of(arena, *receiver)?.field(*field)),
        _ => None,
    }
}

/// What a loop body may write: assignment targets, `mut` arguments,
/// `&mut` operands and receivers of `mut`-receiver methods that are paths.
/// Also reports whether the body can `break` out of this loop.
///
/// Receiver types are unknown before the body is checked, so a method call
/// counts as a write when any declaration has a `mut`-receiver method of that
/// name.
pub(super) fn loop_effects(
    registry: &DeclRegistry,
    arena: &ExprArena,
    body: ExprId,
) -> (Vec<NarrowPath>, bool) {
    let mut written = Vec::new();
    let mut breaks = false;
    scan(registry, arena, body, 0, &mut written, &mut breaks);
    (written, breaks)
}

fn scan(
    registry: &DeclRegistry,
    arena: &ExprArena,
    id: ExprId,
    nested_loops: u32,
    written: &mut Vec<NarrowPath>,
    breaks: &mut bool,
) {
    let Some(expr) = arena.try_get_expr(id) else {
        return;
    };
    let mut nested = nested_loops;
    match &expr.kind {
        ExprKind::Break if nested_loops == 0 => *breaks = true,
        ExprKind::MutArg(operand)
        | ExprKind::Ref {
            mutable: true,
            operand,
        } => written.extend(path_of(arena, *operand)),
        ExprKind::MethodCall {
            receiver, method, ..
        } if registry.any_mut_receiver(*method) => written.extend(path_of(arena, *receiver)),
        ExprKind::Block { stmts, .. } => {
            for stmt in arena.get_stmts(*stmts) {
                if let StmtKind::Assign { target, .. } = stmt.kind {
                    written.extend(path_of(arena, target));
                }
            }
        }
        ExprKind::Loop { .. } => nested += 1,
        _ => {}
    }
    for child in children(arena, id) {
        scan(registry, arena, child, nested, written, breaks);
    }
}
