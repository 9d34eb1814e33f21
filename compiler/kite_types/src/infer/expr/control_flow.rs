//! Blocks, statements, branches and loops.
//!
//! Every branch point follows the same shape: push a flow layer per arm
//! seeded with the arm's facts, infer the arm, pop the layer, then join
//! the non-terminal arms back into the enclosing layer.

use kite_ir::{ArmRange, ExprArena, ExprId, ExprKind, MatchPattern, Name, Span, Stmt, StmtKind, StmtRange};

use super::calls::require_mutable;
use super::conditions::{check_type_test, infer_condition, narrowable};
use super::{check_expr, declared_path_type, infer_discarded, infer_expr, infer_expr_in};
use crate::flow::{BranchOutcome, Fact, FlowFact};
use crate::infer::walk::{loop_effects, path_of};
use crate::infer::InferEngine;
use crate::lub::LubResolver;
use crate::{TypeErrorKind, TypeId};

/// Type of a branching expression from its arm types.
fn branch_type(
    engine: &mut InferEngine<'_>,
    arm_types: &[TypeId],
    expected: Option<TypeId>,
    used: bool,
    span: Span,
) -> TypeId {
    if !used {
        return if !arm_types.is_empty() && arm_types.iter().all(|t| t.is_never()) {
            TypeId::NEVER
        } else {
            TypeId::UNIT
        };
    }
    match LubResolver::new(engine.table()).lub_all(arm_types) {
        Ok(ty) => ty,
        Err(err) => match expected {
            // Context decides when the arms cannot.
            Some(ty) if arm_types.iter().all(|&t| engine.assignable(t, ty)) => ty,
            _ => engine.error(span, err),
        },
    }
}

#[expect(clippy::too_many_arguments, reason = "mirrors the node's fields")]
pub(super) fn infer_if(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    cond: ExprId,
    then_branch: ExprId,
    else_branch: ExprId,
    expected: Option<TypeId>,
    used: bool,
    span: Span,
) -> TypeId {
    let facts = infer_condition(engine, arena, cond);
    let table = engine.table();

    engine.flow.push_branch(&facts.when_true, table);
    let then_ty = infer_expr_in(engine, arena, then_branch, expected, used);
    let then_env = engine.flow.pop_branch();

    engine.flow.push_branch(&facts.when_false, table);
    let else_ty = if else_branch.is_present() {
        infer_expr_in(engine, arena, else_branch, expected, used)
    } else {
        TypeId::UNIT
    };
    let else_env = engine.flow.pop_branch();

    let outcomes = vec![
        BranchOutcome {
            env: then_env,
            terminal: then_ty.is_never(),
        },
        BranchOutcome {
            env: else_env,
            terminal: else_ty.is_never(),
        },
    ];
    engine.flow.join(outcomes, table);

    if else_branch.is_present() {
        branch_type(engine, &[then_ty, else_ty], expected, used, span)
    } else {
        TypeId::UNIT
    }
}

#[expect(clippy::too_many_arguments, reason = "mirrors the node's fields")]
pub(super) fn infer_if_guard(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    binding: Name,
    value: ExprId,
    then_branch: ExprId,
    else_branch: ExprId,
    expected: Option<TypeId>,
    used: bool,
    span: Span,
) -> TypeId {
    let value_ty = infer_expr(engine, arena, value, None);
    let table = engine.table();
    let inner = match table.option_inner(value_ty) {
        Some(inner) => inner,
        None if value_ty.is_error() => TypeId::ERROR,
        None => {
            let value_span = arena.get_expr(value).span;
            engine.error(value_span, TypeErrorKind::NotAnOption { found: value_ty })
        }
    };
    let path = narrowable(engine, arena, value);
    let fact = |fact: Fact| -> Vec<FlowFact> {
        path.iter()
            .map(|(path, declared)| FlowFact {
                path: path.clone(),
                declared: *declared,
                fact,
            })
            .collect()
    };

    engine.flow.push_branch(&fact(Fact::NotNone), table);
    let outer = engine.enter_scope();
    engine.bind_local(binding, inner, false);
    let then_ty = infer_expr_in(engine, arena, then_branch, expected, used);
    engine.exit_scope(outer);
    let then_env = engine.flow.pop_branch();

    engine.flow.push_branch(&fact(Fact::IsNone), table);
    let else_ty = if else_branch.is_present() {
        infer_expr_in(engine, arena, else_branch, expected, used)
    } else {
        TypeId::UNIT
    };
    let else_env = engine.flow.pop_branch();

    let outcomes = vec![
        BranchOutcome {
            env: then_env,
            terminal: then_ty.is_never(),
        },
        BranchOutcome {
            env: else_env,
            terminal: else_ty.is_never(),
        },
    ];
    engine.flow.join(outcomes, table);

    if else_branch.is_present() {
        branch_type(engine, &[then_ty, else_ty], expected, used, span)
    } else {
        TypeId::UNIT
    }
}

/// `match`: value arms compare against the scrutinee; type arms narrow it
/// inside the arm and exclude the type from every later arm.
#[expect(clippy::too_many_arguments, reason = "mirrors the node's fields")]
pub(super) fn infer_match(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    scrutinee: ExprId,
    arms: ArmRange,
    else_branch: ExprId,
    expected: Option<TypeId>,
    used: bool,
    span: Span,
) -> TypeId {
    let scrutinee_ty = infer_expr(engine, arena, scrutinee, None);
    let path = narrowable(engine, arena, scrutinee);
    let table = engine.table();

    // Negative facts from earlier type arms accumulate in this layer.
    engine.flow.push_branch(&[], table);
    let mut outcomes = Vec::new();
    let mut arm_types = Vec::new();

    for arm in arena.get_arms(arms) {
        let mut target = None;
        match &arm.pattern {
            MatchPattern::Value(value) => {
                let value_ty = infer_expr(engine, arena, *value, Some(scrutinee_ty));
                let comparable = value_ty.is_error()
                    || scrutinee_ty.is_error()
                    || engine.assignable(value_ty, scrutinee_ty)
                    || engine.assignable(scrutinee_ty, value_ty);
                if !comparable {
                    let value_span = arena.get_expr(*value).span;
                    engine.error(
                        value_span,
                        TypeErrorKind::Mismatch {
                            expected: scrutinee_ty,
                            found: value_ty,
                        },
                    );
                }
            }
            MatchPattern::Type(parsed) => {
                let ty = engine.resolve_type(parsed, arm.span);
                if check_type_test(engine, scrutinee_ty, path.as_ref(), ty, arm.span) {
                    target = Some(ty);
                }
            }
        }

        let facts: Vec<FlowFact> = match (&path, target) {
            (Some((p, declared)), Some(ty)) => vec![FlowFact {
                path: p.clone(),
                declared: *declared,
                fact: Fact::Is(ty),
            }],
            _ => Vec::new(),
        };
        engine.flow.push_branch(&facts, table);
        let ty = infer_expr_in(engine, arena, arm.body, expected, used);
        let env = engine.flow.pop_branch();
        outcomes.push(BranchOutcome {
            env,
            terminal: ty.is_never(),
        });
        arm_types.push(ty);

        if let (Some((p, declared)), Some(ty)) = (&path, target) {
            engine.flow.apply(
                &[FlowFact {
                    path: p.clone(),
                    declared: *declared,
                    fact: Fact::IsNot(ty),
                }],
                table,
            );
        }
    }

    if else_branch.is_present() {
        engine.flow.push_branch(&[], table);
        let ty = infer_expr_in(engine, arena, else_branch, expected, used);
        let env = engine.flow.pop_branch();
        outcomes.push(BranchOutcome {
            env,
            terminal: ty.is_never(),
        });
        arm_types.push(ty);
    } else {
        // No arm taken. Impossible once the type arms covered every member.
        let exhausted = path
            .as_ref()
            .is_some_and(|(p, _)| engine.flow.narrowed(p) == Some(TypeId::NEVER));
        outcomes.push(BranchOutcome {
            env: engine.flow.current().clone(),
            terminal: exhausted,
        });
    }

    engine.flow.pop_branch();
    let all_terminal = outcomes.iter().all(|o| o.terminal);
    engine.flow.join(outcomes, table);

    if used {
        branch_type(engine, &arm_types, expected, used, span)
    } else if all_terminal {
        TypeId::NEVER
    } else {
        TypeId::UNIT
    }
}

pub(super) fn infer_block(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    stmts: StmtRange,
    result: ExprId,
    expected: Option<TypeId>,
    used: bool,
) -> TypeId {
    let outer = engine.enter_scope();
    let mut diverges = false;
    for stmt in arena.get_stmts(stmts) {
        if infer_stmt(engine, arena, stmt).is_never() {
            diverges = true;
        }
        if engine.is_aborted() {
            break;
        }
    }
    let result_ty = if result.is_present() {
        infer_expr_in(engine, arena, result, expected, used)
    } else {
        TypeId::UNIT
    };
    engine.exit_scope(outer);
    if diverges {
        TypeId::NEVER
    } else {
        result_ty
    }
}

fn infer_stmt(engine: &mut InferEngine<'_>, arena: &ExprArena, stmt: &Stmt) -> TypeId {
    match &stmt.kind {
        StmtKind::Let {
            name,
            mutable,
            ty,
            init,
        } => {
            let (declared, init_ty) = match ty {
                Some(parsed) => {
                    let declared = engine.resolve_type(parsed, stmt.span);
                    let init_ty = if declared.is_error() {
                        infer_expr(engine, arena, *init, None)
                    } else {
                        check_expr(engine, arena, *init, declared)
                    };
                    (declared, init_ty)
                }
                None => {
                    let init_ty = infer_expr(engine, arena, *init, None);
                    let declared = if init_ty.is_untyped() {
                        let span = arena.get_expr(*init).span;
                        engine.error(span, TypeErrorKind::UntypedLiteral)
                    } else {
                        init_ty
                    };
                    (declared, init_ty)
                }
            };
            engine.bind_local(*name, declared, *mutable);
            if init_ty.is_never() {
                TypeId::NEVER
            } else {
                TypeId::UNIT
            }
        }
        StmtKind::Assign { target, value } => {
            infer_assign(engine, arena, *target, *value, stmt.span);
            TypeId::UNIT
        }
        StmtKind::Expr(expr) => infer_discarded(engine, arena, *expr),
    }
}

fn infer_assign(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    target: ExprId,
    value: ExprId,
    span: Span,
) {
    let target_ty = infer_expr(engine, arena, target, None);

    if let Some(path) = path_of(arena, target).filter(|p| engine.env.lookup(p.root()).is_some()) {
        require_mutable(engine, &path, span);
        // Assign against the declared type, not the narrowed one.
        match declared_path_type(engine, &path) {
            Some(declared) => {
                check_expr(engine, arena, value, declared);
            }
            None => {
                infer_expr(engine, arena, value, None);
            }
        }
        engine.flow.invalidate(&path);
        return;
    }

    // `a[i] = v` writes through the root of `a`.
    let mut root = target;
    while let Some(ExprKind::Index { receiver, .. } | ExprKind::Field { receiver, .. }) =
        arena.try_get_expr(root).map(|e| &e.kind)
    {
        root = *receiver;
    }
    match arena.try_get_expr(root).map(|e| &e.kind) {
        Some(ExprKind::Ident(name)) if engine.env.lookup(*name).is_none() => {
            if engine.table().registry().constant(*name).is_some() {
                engine.error(span, TypeErrorKind::AssignToImmutable { name: *name });
            }
        }
        _ => {
            if let Some(path) = path_of(arena, root) {
                require_mutable(engine, &path, span);
                engine.flow.invalidate(&path);
            }
        }
    }

    if target_ty.is_error() {
        infer_expr(engine, arena, value, None);
    } else {
        check_expr(engine, arena, value, target_ty);
    }
}

pub(super) fn infer_return(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    value: ExprId,
    span: Span,
) -> TypeId {
    let ret = engine.return_type;
    if value.is_present() {
        check_expr(engine, arena, value, ret);
    } else if ret != TypeId::UNIT && !ret.is_error() {
        engine.error(
            span,
            TypeErrorKind::Mismatch {
                expected: ret,
                found: TypeId::UNIT,
            },
        );
    }
    TypeId::NEVER
}

pub(super) fn infer_loop_control(
    engine: &mut InferEngine<'_>,
    keyword: &'static str,
    span: Span,
) -> TypeId {
    if engine.loop_depth == 0 {
        engine.error(span, TypeErrorKind::ControlOutsideLoop { keyword });
    }
    TypeId::NEVER
}

/// `for cond { body }`. Paths the body writes lose their narrowing before
/// the condition is even checked, and nothing proven inside the body
/// survives the loop.
pub(super) fn infer_loop(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    cond: ExprId,
    body: ExprId,
) -> TypeId {
    let (written, breaks) = loop_effects(engine.table().registry(), arena, body);
    for path in &written {
        engine.flow.invalidate(path);
    }

    let facts = infer_condition(engine, arena, cond);
    let table = engine.table();
    engine.flow.push_branch(&facts.when_true, table);
    engine.loop_depth += 1;
    infer_discarded(engine, arena, body);
    engine.loop_depth -= 1;
    engine.flow.pop_branch();

    match (cond.is_present(), breaks) {
        // Without a `break` the loop only exits through its condition.
        (true, false) => {
            engine.flow.apply(&facts.when_false, table);
            TypeId::UNIT
        }
        (false, false) => TypeId::NEVER,
        (_, true) => TypeId::UNIT,
    }
}
