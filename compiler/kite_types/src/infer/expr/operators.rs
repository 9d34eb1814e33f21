//! Unary and binary operators.

use kite_ir::{BinaryOp, ExprArena, ExprId, ExprKind, Span, UnaryOp};

use super::{infer_expr, infer_int, is_untyped_literal};
use crate::infer::InferEngine;
use crate::{NumericCategory, Primitive, TypeErrorKind, TypeId};

pub(super) fn infer_unary(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    expr_id: ExprId,
    op: UnaryOp,
    operand: ExprId,
    expected: Option<TypeId>,
) -> TypeId {
    if op == UnaryOp::Not {
        super::conditions::infer_condition(engine, arena, expr_id);
        return TypeId::BOOL;
    }

    // `-128` must fit `i8` as one literal, not as `-(128)`.
    if let ExprKind::Int(value) = arena.get_expr(operand).kind {
        let ty = infer_int(engine, -i128::from(value), expected);
        engine.store_type(operand, ty);
        return ty;
    }

    let ty = infer_expr(engine, arena, operand, expected);
    let category = Primitive::from_type_id(ty).and_then(Primitive::category);
    match category {
        _ if ty.is_error() => TypeId::ERROR,
        Some(NumericCategory::Signed | NumericCategory::Float) => ty,
        _ => {
            let span = arena.get_expr(operand).span;
            engine.error(span, TypeErrorKind::InvalidOperand { op: "-", operand: ty })
        }
    }
}

pub(super) fn infer_binary(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    op: BinaryOp,
    left: ExprId,
    right: ExprId,
    span: Span,
    expected: Option<TypeId>,
) -> TypeId {
    let hint = if op.is_comparison() { None } else { expected };
    // A literal takes its type from the other operand.
    let (left_ty, right_ty) = if is_untyped_literal(arena, left) && !is_untyped_literal(arena, right)
    {
        let right_ty = infer_expr(engine, arena, right, hint);
        let left_ty = infer_expr(engine, arena, left, Some(right_ty));
        (left_ty, right_ty)
    } else {
        let left_ty = infer_expr(engine, arena, left, hint);
        let right_ty = infer_expr(engine, arena, right, Some(left_ty));
        (left_ty, right_ty)
    };
    if left_ty.is_error() || right_ty.is_error() {
        return if op.is_comparison() {
            TypeId::BOOL
        } else {
            TypeId::ERROR
        };
    }

    let invalid = TypeErrorKind::InvalidOperands {
        op,
        left: left_ty,
        right: right_ty,
    };
    let same = left_ty == right_ty;
    let prim = Primitive::from_type_id(left_ty).filter(|_| same);
    match op {
        BinaryOp::Eq | BinaryOp::NotEq => {
            if !engine.assignable(left_ty, right_ty) && !engine.assignable(right_ty, left_ty) {
                engine.error(span, invalid);
            }
            TypeId::BOOL
        }
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordered = prim.is_some_and(|p| {
                p.category().is_some() || matches!(p, Primitive::String | Primitive::Rune)
            });
            if !ordered {
                engine.error(span, invalid);
            }
            TypeId::BOOL
        }
        BinaryOp::Add if prim == Some(Primitive::String) => TypeId::STRING,
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            if prim.is_some_and(|p| p.category().is_some()) {
                left_ty
            } else {
                engine.error(span, invalid)
            }
        }
        BinaryOp::Rem => {
            if prim.is_some_and(Primitive::is_integer) {
                left_ty
            } else {
                engine.error(span, invalid)
            }
        }
        // Routed through condition inference before reaching here.
        BinaryOp::And | BinaryOp::Or => TypeId::BOOL,
    }
}
