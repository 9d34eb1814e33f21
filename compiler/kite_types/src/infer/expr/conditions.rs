//! Conditions and the flow facts they prove.
//!
//! The algebra:
//!
//! - `x is T`: true branch `x: T`, false branch `x` is not `T`
//! - `x == none`: true branch nothing useful, false branch `x` is present
//! - `!c` swaps the two sides
//! - `a && b`: `b` is checked with `a`'s true facts in force; both sets of
//!   true facts hold when the whole is true
//! - `a || b`: `b` is checked with `a`'s false facts in force; both sets of
//!   false facts hold when the whole is false

use kite_ir::{BinaryOp, ExprArena, ExprId, ExprKind, ParsedType, Span, UnaryOp};

use super::{check_expr, declared_path_type, infer_expr};
use crate::flow::{Fact, FlowFact, NarrowPath};
use crate::infer::walk::path_of;
use crate::infer::InferEngine;
use crate::{TypeErrorKind, TypeId};

/// What holds in each branch of a condition.
#[derive(Clone, Debug, Default)]
pub(crate) struct CondFacts {
    pub when_true: Vec<FlowFact>,
    pub when_false: Vec<FlowFact>,
}

impl CondFacts {
    fn swapped(self) -> Self {
        CondFacts {
            when_true: self.when_false,
            when_false: self.when_true,
        }
    }
}

/// Type a condition (recording `bool` on it) and collect its facts.
pub(crate) fn infer_condition(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    expr_id: ExprId,
) -> CondFacts {
    if engine.is_aborted() || !expr_id.is_present() {
        return CondFacts::default();
    }
    let expr = arena.get_expr(expr_id);
    let span = expr.span;
    let facts = match &expr.kind {
        ExprKind::Unary {
            op: UnaryOp::Not,
            operand,
        } => infer_condition(engine, arena, *operand).swapped(),
        ExprKind::Binary {
            op: BinaryOp::And,
            left,
            right,
        } => {
            let lhs = infer_condition(engine, arena, *left);
            let table = engine.table();
            engine.flow.push_branch(&lhs.when_true, table);
            let rhs = infer_condition(engine, arena, *right);
            engine.flow.pop_branch();
            CondFacts {
                when_true: lhs.when_true.into_iter().chain(rhs.when_true).collect(),
                when_false: Vec::new(),
            }
        }
        ExprKind::Binary {
            op: BinaryOp::Or,
            left,
            right,
        } => {
            let lhs = infer_condition(engine, arena, *left);
            let table = engine.table();
            engine.flow.push_branch(&lhs.when_false, table);
            let rhs = infer_condition(engine, arena, *right);
            engine.flow.pop_branch();
            CondFacts {
                when_true: Vec::new(),
                when_false: lhs.when_false.into_iter().chain(rhs.when_false).collect(),
            }
        }
        ExprKind::Is {
            operand,
            ty,
            negated,
        } => {
            let facts = infer_is(engine, arena, *operand, ty, span);
            if *negated {
                facts.swapped()
            } else {
                facts
            }
        }
        ExprKind::NoneCheck { operand, negated } => {
            let facts = infer_none_check(engine, arena, *operand, span);
            if *negated {
                facts.swapped()
            } else {
                facts
            }
        }
        _ => {
            check_expr(engine, arena, expr_id, TypeId::BOOL);
            return CondFacts::default();
        }
    };
    if !engine.is_aborted() {
        engine.store_type(expr_id, TypeId::BOOL);
    }
    facts
}

/// Narrowable path of `operand` with its declared type, when it is one.
pub(super) fn narrowable(
    engine: &InferEngine<'_>,
    arena: &ExprArena,
    operand: ExprId,
) -> Option<(NarrowPath, TypeId)> {
    let path = path_of(arena, operand)?;
    let declared = declared_path_type(engine, &path)?;
    Some((path, declared))
}

fn infer_is(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    operand: ExprId,
    ty: &ParsedType,
    span: Span,
) -> CondFacts {
    let subject = infer_expr(engine, arena, operand, None);
    let target = engine.resolve_type(ty, span);
    let path = narrowable(engine, arena, operand);
    if !check_type_test(engine, subject, path.as_ref(), target, span) {
        return CondFacts::default();
    }
    match path {
        Some((path, declared)) => CondFacts {
            when_true: vec![FlowFact {
                path: path.clone(),
                declared,
                fact: Fact::Is(target),
            }],
            when_false: vec![FlowFact {
                path,
                declared,
                fact: Fact::IsNot(target),
            }],
        },
        None => CondFacts::default(),
    }
}

/// Validate a runtime type test of `subject` against `target`, shared by
/// `is` and `match` type patterns. Returns whether the test can hold.
pub(super) fn check_type_test(
    engine: &mut InferEngine<'_>,
    subject: TypeId,
    path: Option<&(NarrowPath, TypeId)>,
    target: TypeId,
    span: Span,
) -> bool {
    if subject.is_error() || target.is_error() {
        return false;
    }
    let table = engine.table();
    let declared = path.map_or(subject, |(_, d)| *d);

    // What enclosing conditions already proved.
    if let Some(narrowing) = path.and_then(|(p, _)| engine.flow.narrowing(p)) {
        let concrete = !table.is_interface(narrowing.ty) && !table.is_union(narrowing.ty);
        if narrowing.excludes(target) || (concrete && narrowing.ty != target) {
            let known = narrowing.ty;
            engine.error(
                span,
                TypeErrorKind::ImpossibleTypeTest {
                    subject: known,
                    target,
                },
            );
            return false;
        }
    }

    // A path read as an interface or union is tested as that type, e.g. an
    // optional interface already proven present.
    let tested = if table.is_interface(subject) || table.is_union(subject) {
        subject
    } else {
        declared
    };
    let can_hold = target == tested
        || if table.is_interface(tested) {
            table.implements(target, tested)
        } else if table.is_union(tested) {
            table
                .exhaustive_members(tested)
                .is_some_and(|members| members.contains(&target))
        } else {
            false
        };
    if !can_hold {
        engine.error(
            span,
            TypeErrorKind::InvalidNarrowingTarget {
                subject: tested,
                target,
            },
        );
    }
    can_hold
}

fn infer_none_check(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    operand: ExprId,
    span: Span,
) -> CondFacts {
    let subject = infer_expr(engine, arena, operand, None);
    if subject.is_error() {
        return CondFacts::default();
    }
    if engine.table().option_inner(subject).is_none() {
        engine.error(span, TypeErrorKind::NotAnOption { found: subject });
        return CondFacts::default();
    }
    match narrowable(engine, arena, operand) {
        Some((path, declared)) => CondFacts {
            when_true: vec![FlowFact {
                path: path.clone(),
                declared,
                fact: Fact::IsNone,
            }],
            when_false: vec![FlowFact {
                path,
                declared,
                fact: Fact::NotNone,
            }],
        },
        None => CondFacts::default(),
    }
}
