//! Module checking: registration, then every body against the frozen table.

mod bodies;
mod registration;

use kite_diagnostic::{DiagnosticConfig, DiagnosticQueue};
use kite_ir::{ExprArena, Module, StringInterner};

use crate::infer::InferOutput;
use crate::{CheckConfig, TypeCheckResult, TypedModule};

use registration::Registrar;

/// Type check `module`.
///
/// Registration errors and body errors are reported together; one broken
/// declaration or body never stops the others from being checked.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(
        functions = module.functions.len(),
        methods = module.methods.len(),
        parallel = config.parallel,
    )
)]
pub fn check_module(
    module: &Module,
    arena: &ExprArena,
    names: &StringInterner,
    config: &CheckConfig,
) -> TypeCheckResult {
    let mut registrar = Registrar::new(names, arena);
    registrar.register(module);
    let Registrar {
        table,
        errors: registration_errors,
        const_outputs,
        ..
    } = registrar;

    let jobs = bodies::collect_jobs(&table, module);
    let body_outputs = bodies::check_bodies(&jobs, &table, names, arena, config);

    let mut typed = TypedModule {
        expr_types: vec![None; arena.len()],
        errors: registration_errors,
        ..TypedModule::default()
    };
    for output in const_outputs.into_iter().chain(body_outputs) {
        merge_output(&mut typed, output);
    }
    tracing::debug!(errors = typed.errors.len(), "module checked");

    let mut queue =
        DiagnosticQueue::with_config(DiagnosticConfig::with_error_limit(config.error_limit));
    for err in &typed.errors {
        queue.add(err.to_diagnostic(&table, names));
    }
    let error_guarantee = queue.has_errors();
    let diagnostics = queue.flush();

    TypeCheckResult {
        typed,
        table,
        diagnostics,
        error_guarantee,
    }
}

fn merge_output(typed: &mut TypedModule, output: InferOutput) {
    for (id, ty) in output.expr_types {
        if let Some(slot) = typed.expr_types.get_mut(id.index()) {
            *slot = Some(ty);
        }
    }
    typed.instantiations.extend(output.instantiations);
    typed.errors.extend(output.errors);
}
