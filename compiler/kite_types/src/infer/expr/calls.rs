//! Calls, method calls, struct literals and explicit generic arguments.
//!
//! Generic sites go through the [`ConstraintSolver`]: explicit arguments
//! bind position-wise; otherwise each argument whose declared type mentions
//! a generic parameter contributes one equation. Untyped numeric literals
//! contribute weak equations, so `max(1, x)` takes its type from `x`.
//! After solving, every argument is checked against the instantiated
//! parameter type and the instantiation is recorded on the site.

use kite_ir::{
    ExprArena, ExprId, ExprKind, ExprRange, FieldInitRange, GenericArg, GenericArgRange, Name,
    Span, UnaryOp,
};

use super::{check_expr, infer_expr, is_untyped_literal};
use crate::flow::NarrowPath;
use crate::registry::GenericParamDefKind;
use crate::infer::walk::path_of;
use crate::infer::InferEngine;
use crate::solver::{ConstraintSolver, Equation, ExplicitGenericArg, Instantiation};
use crate::{
    ConstValue, DeclKind, FunctionSig, GenericParams, TypeData, TypeDef, TypeErrorKind, TypeId,
};

/// Argument state while a generic site is being solved.
#[derive(Copy, Clone)]
enum ArgState {
    Pending,
    /// Inferred without context; rechecked against the instantiated type.
    Inferred(TypeId),
    /// Already checked against a parameter type with no generics in it.
    Checked,
}

pub(super) fn infer_call(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    expr_id: ExprId,
    callee: Name,
    generic_args: GenericArgRange,
    args: ExprRange,
) -> TypeId {
    let span = arena.get_expr(expr_id).span;
    let arg_ids = arena.get_expr_list(args);

    if let Some(local) = engine.env.lookup(callee) {
        let ty = engine
            .flow
            .narrowed(&NarrowPath::var(callee))
            .unwrap_or(local.ty);
        return match engine.table().lookup(ty) {
            TypeData::Function {
                params,
                variadic,
                ret,
            } => {
                if check_arity(engine, arena, arg_ids, params.len(), variadic, span) {
                    for (i, &arg) in arg_ids.iter().enumerate() {
                        let target = params.get(i).or(params.last()).copied();
                        check_or_infer(engine, arena, arg, target);
                    }
                }
                ret
            }
            _ if ty.is_error() => infer_all(engine, arena, arg_ids),
            _ => {
                infer_all(engine, arena, arg_ids);
                engine.error(span, TypeErrorKind::NotCallable { name: callee })
            }
        };
    }

    let Some(sig) = engine.table().registry().function(callee) else {
        infer_all(engine, arena, arg_ids);
        return engine.error(span, TypeErrorKind::UnknownIdent { name: callee });
    };

    if sig.generics.is_empty() {
        if !generic_args.is_empty() {
            infer_all(engine, arena, arg_ids);
            return engine.error(
                span,
                TypeErrorKind::GenericArgCount {
                    min: 0,
                    max: 0,
                    found: generic_args.len(),
                },
            );
        }
        if check_arity(engine, arena, arg_ids, sig.params.len(), sig.variadic, span) {
            for (i, &arg) in arg_ids.iter().enumerate() {
                check_or_infer(engine, arena, arg, sig.param_type_at(i));
            }
        }
        return sig.ret;
    }

    if !check_arity(engine, arena, arg_ids, sig.params.len(), sig.variadic, span) {
        return TypeId::ERROR;
    }
    match instantiate_call(engine, arena, sig, generic_args, arg_ids, span) {
        Some(inst) => {
            let ret = inst.apply(engine.table(), sig.ret);
            engine.record_instantiation(expr_id, inst);
            ret
        }
        None => TypeId::ERROR,
    }
}

fn instantiate_call(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    sig: &FunctionSig,
    generic_args: GenericArgRange,
    arg_ids: &[ExprId],
    span: Span,
) -> Option<Instantiation> {
    let patterns: Vec<TypeId> = (0..arg_ids.len())
        .map(|i| sig.param_type_at(i).unwrap_or(TypeId::ERROR))
        .collect();
    instantiate(
        engine,
        arena,
        &sig.generics,
        generic_args,
        arg_ids,
        &patterns,
        span,
    )
}

/// Solve one generic site and check every argument against the result.
/// `patterns[i]` is the declared type for `arg_ids[i]`.
fn instantiate(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    generics: &GenericParams,
    generic_args: GenericArgRange,
    arg_ids: &[ExprId],
    patterns: &[TypeId],
    span: Span,
) -> Option<Instantiation> {
    let table = engine.table();
    let mut states = vec![ArgState::Pending; arg_ids.len()];

    let solved = if generic_args.is_empty() {
        let mut equations = Vec::with_capacity(arg_ids.len());
        for (i, (&arg, &pattern)) in arg_ids.iter().zip(patterns).enumerate() {
            if !table.flags(pattern).has_params() {
                check_expr(engine, arena, arg, pattern);
                states[i] = ArgState::Checked;
                continue;
            }
            let ty = infer_expr(engine, arena, arg, None);
            states[i] = ArgState::Inferred(ty);
            if is_untyped_literal(arena, arg) {
                equations.push(Equation::weak(pattern, ty));
            } else {
                equations.push(Equation::new(pattern, ty));
            }
        }
        ConstraintSolver::new(table, generics, engine.bounds()).solve_inferred(&equations)
    } else {
        let explicit = eval_generic_args(engine, arena, generics, generic_args, span);
        ConstraintSolver::new(table, generics, engine.bounds()).solve_explicit(&explicit)
    };

    let inst = match solved {
        Ok(inst) => inst,
        Err(err) => {
            for (&arg, state) in arg_ids.iter().zip(&states) {
                if matches!(state, ArgState::Pending) {
                    infer_expr(engine, arena, arg, None);
                }
            }
            engine.error(span, err);
            return None;
        }
    };

    for ((&arg, &pattern), state) in arg_ids.iter().zip(patterns).zip(states) {
        let target = inst.apply(table, pattern);
        match state {
            ArgState::Checked => {}
            ArgState::Inferred(_) if is_untyped_literal(arena, arg) => {
                check_expr(engine, arena, arg, target);
            }
            ArgState::Inferred(found) => {
                if !engine.assignable(found, target) {
                    let arg_span = arena.get_expr(arg).span;
                    engine.error(
                        arg_span,
                        TypeErrorKind::Mismatch {
                            expected: target,
                            found,
                        },
                    );
                }
            }
            ArgState::Pending => {
                check_expr(engine, arena, arg, target);
            }
        }
    }
    Some(inst)
}

/// Report an arity mismatch, inferring the arguments for their own sake.
/// Returns whether the count was acceptable.
fn check_arity(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    arg_ids: &[ExprId],
    declared: usize,
    variadic: bool,
    span: Span,
) -> bool {
    let found = arg_ids.len();
    let expected = if variadic {
        declared.saturating_sub(1)
    } else {
        declared
    };
    let ok = if variadic {
        found >= expected
    } else {
        found == expected
    };
    if !ok {
        infer_all(engine, arena, arg_ids);
        engine.error(
            span,
            TypeErrorKind::ArgCountMismatch {
                expected,
                found,
                variadic,
            },
        );
    }
    ok
}

fn check_or_infer(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    arg: ExprId,
    target: Option<TypeId>,
) {
    match target {
        Some(ty) => {
            check_expr(engine, arena, arg, ty);
        }
        None => {
            infer_expr(engine, arena, arg, None);
        }
    }
}

fn infer_all(engine: &mut InferEngine<'_>, arena: &ExprArena, ids: &[ExprId]) -> TypeId {
    for &id in ids {
        infer_expr(engine, arena, id, None);
    }
    TypeId::ERROR
}

/// Evaluate explicit generic arguments against the declaration's
/// parameters. A bare name that denotes a constant counts as a value when
/// the parameter is a const parameter.
fn eval_generic_args(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    generics: &GenericParams,
    range: GenericArgRange,
    span: Span,
) -> Vec<ExplicitGenericArg> {
    let registry = engine.table().registry();
    arena
        .get_generic_args(range)
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let const_ty = generics.get(i).and_then(|p| match &p.kind {
                GenericParamDefKind::Const { ty } => Some(*ty),
                GenericParamDefKind::Type { .. } => None,
            });
            match arg {
                GenericArg::Type(parsed) => {
                    let named_const = const_ty
                        .and(parsed.as_bare_name())
                        .and_then(|name| registry.constant(name));
                    match named_const {
                        Some(info) => info
                            .value
                            .map_or(ExplicitGenericArg::NotConstant, ExplicitGenericArg::Const),
                        None => ExplicitGenericArg::Type(engine.resolve_type(parsed, span)),
                    }
                }
                GenericArg::Const(expr) => {
                    infer_expr(engine, arena, *expr, const_ty);
                    const_value_of(engine, arena, *expr)
                        .map_or(ExplicitGenericArg::NotConstant, ExplicitGenericArg::Const)
                }
            }
        })
        .collect()
}

/// Compile-time value of a literal, a negated integer literal, or a
/// declared constant.
pub(crate) fn const_value_of(
    engine: &InferEngine<'_>,
    arena: &ExprArena,
    id: ExprId,
) -> Option<ConstValue> {
    match &arena.try_get_expr(id)?.kind {
        ExprKind::Int(n) => Some(ConstValue::Int(i128::from(*n))),
        ExprKind::Bool(b) => Some(ConstValue::Bool(*b)),
        ExprKind::Rune(c) => Some(ConstValue::Rune(*c)),
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand,
        } => match const_value_of(engine, arena, *operand)? {
            ConstValue::Int(n) => Some(ConstValue::Int(-n)),
            _ => None,
        },
        ExprKind::Ident(name) if engine.env.lookup(*name).is_none() => {
            engine.table().registry().constant(*name)?.value
        }
        _ => None,
    }
}

pub(super) fn infer_method_call(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    receiver: ExprId,
    method: Name,
    args: ExprRange,
    span: Span,
) -> TypeId {
    let arg_ids = arena.get_expr_list(args);
    let receiver_ty = infer_expr(engine, arena, receiver, None);
    if receiver_ty.is_error() {
        return infer_all(engine, arena, arg_ids);
    }
    let table = engine.table();
    let Some(resolved) = table.method(receiver_ty, method) else {
        infer_all(engine, arena, arg_ids);
        return engine.error(
            span,
            TypeErrorKind::UnknownMember {
                ty: receiver_ty,
                member: method,
            },
        );
    };
    let sig = &resolved.method.sig;
    let subst = |ty: TypeId| table.substitute_params(ty, &resolved.receiver_args);

    if check_arity(engine, arena, arg_ids, sig.params.len(), sig.variadic, span) {
        for (i, &arg) in arg_ids.iter().enumerate() {
            check_or_infer(engine, arena, arg, sig.param_type_at(i).map(subst));
        }
    }

    // The method may replace what the receiver holds: its narrowing is
    // no longer proven.
    if resolved.method.mut_receiver {
        if let Some(path) = path_of(arena, receiver) {
            require_mutable(engine, &path, span);
            engine.flow.invalidate(&path);
        }
    }
    subst(sig.ret)
}

/// Writing through `path` needs its root binding to be `mut`.
pub(super) fn require_mutable(engine: &mut InferEngine<'_>, path: &NarrowPath, span: Span) -> bool {
    match engine.env.lookup(path.root()) {
        Some(local) if !local.mutable => {
            engine.error(
                span,
                TypeErrorKind::AssignToImmutable { name: path.root() },
            );
            false
        }
        _ => true,
    }
}

pub(super) fn infer_mut_arg(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    operand: ExprId,
    expected: Option<TypeId>,
) -> TypeId {
    let ty = infer_expr(engine, arena, operand, expected);
    if let Some(path) = path_of(arena, operand) {
        let span = arena.get_expr(operand).span;
        require_mutable(engine, &path, span);
        engine.flow.invalidate(&path);
    }
    ty
}

pub(super) fn infer_ref(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    mutable: bool,
    operand: ExprId,
    expected: Option<TypeId>,
    span: Span,
) -> TypeId {
    let table = engine.table();
    let hint = expected.and_then(|ty| match table.lookup(ty) {
        TypeData::Reference { inner, .. } => Some(inner),
        _ => None,
    });
    let ty = infer_expr(engine, arena, operand, hint);
    if mutable {
        if let Some(path) = path_of(arena, operand) {
            require_mutable(engine, &path, span);
            engine.flow.invalidate(&path);
        }
    }
    if ty.is_error() {
        return TypeId::ERROR;
    }
    table.interner().reference(mutable, ty)
}

pub(super) fn infer_struct_lit(
    engine: &mut InferEngine<'_>,
    arena: &ExprArena,
    expr_id: ExprId,
    name: Name,
    generic_args: GenericArgRange,
    fields: FieldInitRange,
) -> TypeId {
    let span = arena.get_expr(expr_id).span;
    let inits = arena.get_field_inits(fields);
    let values: Vec<ExprId> = inits.iter().map(|f| f.value).collect();
    let table = engine.table();

    let decl = match table.registry().type_def(name) {
        Some(TypeDef::Decl(decl)) => decl,
        Some(TypeDef::Alias(_)) => {
            infer_all(engine, arena, &values);
            return engine.error(span, TypeErrorKind::NotAStruct { name });
        }
        None => {
            infer_all(engine, arena, &values);
            return engine.error(span, TypeErrorKind::UnknownType { name });
        }
    };
    let info = table.registry().decl(decl);
    let DeclKind::Struct(strukt) = &info.kind else {
        infer_all(engine, arena, &values);
        return engine.error(span, TypeErrorKind::NotAStruct { name });
    };

    // Declared types of the initialized fields; unknown names are reported
    // and their values inferred on their own.
    let self_args: Vec<TypeId> = info
        .generics
        .iter()
        .map(|p| table.interner().param(p.name, p.index))
        .collect();
    let self_ty = table.interner().named(decl, &self_args);
    let mut known: Vec<ExprId> = Vec::with_capacity(inits.len());
    let mut patterns: Vec<TypeId> = Vec::with_capacity(inits.len());
    for init in inits {
        match strukt.fields.iter().find(|(n, _)| *n == init.name) {
            Some(&(_, ty)) => {
                known.push(init.value);
                patterns.push(ty);
            }
            None => {
                infer_expr(engine, arena, init.value, None);
                engine.error(
                    init.span,
                    TypeErrorKind::UnknownMember {
                        ty: self_ty,
                        member: init.name,
                    },
                );
            }
        }
    }

    if info.generics.is_empty() {
        if !generic_args.is_empty() {
            infer_all(engine, arena, &known);
            return engine.error(
                span,
                TypeErrorKind::GenericArgCount {
                    min: 0,
                    max: 0,
                    found: generic_args.len(),
                },
            );
        }
        for (&value, &ty) in known.iter().zip(&patterns) {
            check_expr(engine, arena, value, ty);
        }
        return self_ty;
    }

    match instantiate(
        engine,
        arena,
        &info.generics,
        generic_args,
        &known,
        &patterns,
        span,
    ) {
        Some(inst) => {
            let ty = table.interner().named(decl, inst.type_args());
            engine.record_instantiation(expr_id, inst);
            ty
        }
        None => TypeId::ERROR,
    }
}
