//! Function and method body checking.
//!
//! Each body gets its own [`InferEngine`] over the frozen table, so bodies
//! are independent and can run on the rayon pool.

use kite_ir::{ExprArena, ExprId, Module, Name, StringInterner};
use rayon::prelude::*;

use crate::infer::{check_expr, infer_discarded, InferEngine, InferOutput};
use crate::registry::ParamSig;
use crate::{CheckConfig, DeclKind, GenericParams, TypeDef, TypeId, TypeTable};

/// One body to check, with everything it needs from its signature.
pub(super) struct BodyJob<'t> {
    name: Name,
    generics: &'t GenericParams,
    params: Vec<(Name, TypeId, bool)>,
    ret: TypeId,
    body: ExprId,
}

/// Collect the bodies of `module` in declaration order: functions first,
/// then methods. Bodiless declarations and those whose signature failed to
/// register are skipped.
pub(super) fn collect_jobs<'t>(table: &'t TypeTable, module: &Module) -> Vec<BodyJob<'t>> {
    let registry = table.registry();
    let interner = table.interner();
    let mut jobs = Vec::new();

    for func in &module.functions {
        let Some(sig) = registry.function(func.name).filter(|s| s.span == func.span) else {
            continue;
        };
        if !func.body.is_present() {
            continue;
        }
        let count = sig.params.len();
        let params = sig
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                // `...T` arrives as `[]T`.
                let ty = if sig.variadic && i + 1 == count {
                    interner.dyn_array(p.ty)
                } else {
                    p.ty
                };
                (p.name, ty, p.mutable)
            })
            .collect();
        jobs.push(BodyJob {
            name: func.name,
            generics: &sig.generics,
            params,
            ret: sig.ret,
            body: func.body,
        });
    }

    for method in &module.methods {
        let Some(TypeDef::Decl(decl)) = registry.type_def(method.receiver_type) else {
            continue;
        };
        let Some(sig) = registry
            .method(decl, method.name)
            .filter(|m| m.sig.span == method.span)
        else {
            continue;
        };
        if !method.body.is_present() {
            continue;
        }
        let info = registry.decl(decl);
        let args: Vec<TypeId> = info
            .generics
            .iter()
            .map(|p| interner.param(p.name, p.index))
            .collect();
        let receiver = match info.kind {
            DeclKind::Interface(_) => interner.interface(decl, &args),
            DeclKind::Struct(_) | DeclKind::Enum(_) => interner.named(decl, &args),
        };
        let mut params = vec![(method.receiver_name, receiver, sig.mut_receiver)];
        params.extend(sig.sig.params.iter().map(|p: &ParamSig| (p.name, p.ty, p.mutable)));
        jobs.push(BodyJob {
            name: method.name,
            generics: &info.generics,
            params,
            ret: sig.sig.ret,
            body: method.body,
        });
    }

    jobs
}

impl BodyJob<'_> {
    #[tracing::instrument(level = "debug", skip_all, fields(name = names.lookup(self.name)))]
    fn check(
        &self,
        table: &TypeTable,
        names: &StringInterner,
        arena: &ExprArena,
        config: &CheckConfig,
    ) -> InferOutput {
        let mut engine =
            InferEngine::new(table, names, self.generics, config.error_policy).with_return_type(self.ret);
        for &(name, ty, mutable) in &self.params {
            engine.bind_local(name, ty, mutable);
        }
        if self.ret == TypeId::UNIT {
            infer_discarded(&mut engine, arena, self.body);
        } else {
            check_expr(&mut engine, arena, self.body, self.ret);
        }
        engine.finish()
    }
}

/// Check every job, in parallel when configured. Outputs come back in job
/// order either way.
pub(super) fn check_bodies(
    jobs: &[BodyJob<'_>],
    table: &TypeTable,
    names: &StringInterner,
    arena: &ExprArena,
    config: &CheckConfig,
) -> Vec<InferOutput> {
    if config.parallel {
        jobs.par_iter()
            .map(|job| job.check(table, names, arena, config))
            .collect()
    } else {
        jobs.iter()
            .map(|job| job.check(table, names, arena, config))
            .collect()
    }
}
