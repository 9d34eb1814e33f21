//! Declaration registration.
//!
//! Fills the [`DeclRegistry`](crate::DeclRegistry) from a module's
//! declarations, in an order where everything a step resolves is already
//! known:
//!
//! 1. struct, enum and interface names (so any declaration can mention any
//!    other)
//! 2. generic parameter names and kinds of those declarations
//! 3. aliases, repeated until no more resolve
//! 4. generic parameter constraints, defaults and const types
//! 5. constants, in declaration order
//! 6. struct fields, enum backing types, `implements` lists
//! 7. function and method signatures

use kite_ir::{
    AliasDef, ConstDef, ExprArena, GenericParam, GenericParamKind, Module, Name, Param, ParsedType,
    Span, StringInterner,
};

use crate::infer::{check_expr, const_value_of, infer_expr, InferEngine, InferOutput};
use crate::registry::{
    ConstInfo, DeclInfo, EnumInfo, GenericParamDefKind, InterfaceInfo, ParamSig, StructInfo,
};
use crate::table::ResolveError;
use crate::{
    DeclId, DeclKind, ErrorPolicy, FunctionSig, GenericParamDef, GenericParams, MethodSig,
    Primitive, TypeCheckError, TypeDef, TypeErrorKind, TypeId, TypeTable,
};

pub(super) struct Registrar<'a> {
    pub(super) table: TypeTable,
    names: &'a StringInterner,
    arena: &'a ExprArena,
    pub(super) errors: Vec<TypeCheckError>,
    /// What typing the constant initializers produced.
    pub(super) const_outputs: Vec<InferOutput>,
}

impl<'a> Registrar<'a> {
    pub(super) fn new(names: &'a StringInterner, arena: &'a ExprArena) -> Self {
        Registrar {
            table: TypeTable::new(),
            names,
            arena,
            errors: Vec::new(),
            const_outputs: Vec::new(),
        }
    }

    fn error(&mut self, span: Span, kind: impl Into<TypeErrorKind>) {
        let err = TypeCheckError::new(span, kind);
        tracing::debug!(code = %err.code(), ?span, "registration error");
        self.errors.push(err);
    }

    fn resolve(&mut self, parsed: &ParsedType, scope: &GenericParams, span: Span) -> TypeId {
        match self.table.resolve(parsed, scope, self.names) {
            Ok(ty) => ty,
            Err(err) => {
                self.error(span, err);
                TypeId::ERROR
            }
        }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub(super) fn register(&mut self, module: &Module) {
        let structs: Vec<Option<DeclId>> = module
            .structs
            .iter()
            .map(|def| {
                let kind = DeclKind::Struct(StructInfo {
                    fields: Vec::new(),
                    implements: Vec::new(),
                });
                self.declare(def.name, def.span, &def.generics, kind)
            })
            .collect();
        let enums: Vec<Option<DeclId>> = module
            .enums
            .iter()
            .map(|def| {
                let kind = DeclKind::Enum(EnumInfo {
                    backing: TypeId::I32,
                    variants: Vec::new(),
                    implements: Vec::new(),
                });
                self.declare(def.name, def.span, &[], kind)
            })
            .collect();
        let interfaces: Vec<Option<DeclId>> = module
            .interfaces
            .iter()
            .map(|def| {
                let kind = DeclKind::Interface(InterfaceInfo {
                    sealed: def.sealed,
                    implementors: Vec::new(),
                });
                self.declare(def.name, def.span, &def.generics, kind)
            })
            .collect();

        self.register_aliases(&module.aliases);

        let generic_decls = structs
            .iter()
            .zip(module.structs.iter().map(|def| &def.generics))
            .chain(
                interfaces
                    .iter()
                    .zip(module.interfaces.iter().map(|def| &def.generics)),
            );
        for (decl, generics) in generic_decls {
            if let Some(decl) = *decl {
                let params = self.resolve_generics(generics);
                self.table.registry_mut().decl_mut(decl).generics = params;
            }
        }

        for konst in &module.consts {
            self.register_const(konst);
        }

        for (decl, def) in structs.iter().zip(&module.structs) {
            let Some(decl) = *decl else { continue };
            let scope = self.table.registry().decl(decl).generics.clone();
            let mut fields: Vec<(Name, TypeId)> = Vec::with_capacity(def.fields.len());
            for field in &def.fields {
                if fields.iter().any(|(name, _)| *name == field.name) {
                    self.error(field.span, TypeErrorKind::DuplicateDefinition { name: field.name });
                    continue;
                }
                let ty = self.resolve(&field.ty, &scope, field.span);
                fields.push((field.name, ty));
            }
            let implements = self.resolve_implements(decl, &def.implements, &scope, def.span);
            self.table.registry_mut().decl_mut(decl).kind =
                DeclKind::Struct(StructInfo { fields, implements });
        }

        for (decl, def) in enums.iter().zip(&module.enums) {
            let Some(decl) = *decl else { continue };
            let backing = match &def.backing {
                Some(parsed) => {
                    let ty = self.resolve(parsed, &GenericParams::default(), def.span);
                    let is_int = Primitive::from_type_id(ty).is_some_and(Primitive::is_integer);
                    if !ty.is_error() && !is_int {
                        self.error(
                            def.span,
                            TypeErrorKind::Mismatch {
                                expected: TypeId::I32,
                                found: ty,
                            },
                        );
                    }
                    ty
                }
                None => TypeId::I32,
            };
            let mut variants: Vec<Name> = Vec::with_capacity(def.variants.len());
            for &variant in &def.variants {
                if variants.contains(&variant) {
                    self.error(def.span, TypeErrorKind::DuplicateDefinition { name: variant });
                } else {
                    variants.push(variant);
                }
            }
            let implements =
                self.resolve_implements(decl, &def.implements, &GenericParams::default(), def.span);
            self.table.registry_mut().decl_mut(decl).kind = DeclKind::Enum(EnumInfo {
                backing,
                variants,
                implements,
            });
        }

        for func in &module.functions {
            let generics = self.resolve_generics(&func.generics);
            let params = self.resolve_params(&func.params, &generics);
            let ret = self.resolve_ret(func.ret.as_ref(), &generics, func.span);
            let added = self.table.registry_mut().add_function(FunctionSig {
                name: func.name,
                generics,
                params,
                variadic: func.variadic,
                ret,
                span: func.span,
            });
            if !added {
                self.error(func.span, TypeErrorKind::DuplicateDefinition { name: func.name });
            }
        }

        for method in &module.methods {
            let Some(receiver) = self.receiver_decl(method.receiver_type, method.span) else {
                continue;
            };
            let scope = self.table.registry().decl(receiver).generics.clone();
            let params = self.resolve_params(&method.params, &scope);
            let ret = self.resolve_ret(method.ret.as_ref(), &scope, method.span);
            let added = self.table.registry_mut().add_method(MethodSig {
                receiver,
                mut_receiver: method.mut_receiver,
                sig: FunctionSig {
                    name: method.name,
                    generics: GenericParams::default(),
                    params,
                    variadic: false,
                    ret,
                    span: method.span,
                },
            });
            if !added {
                self.error(method.span, TypeErrorKind::DuplicateDefinition { name: method.name });
            }
        }
    }

    /// Allocate a declaration with its final kind left empty and generic
    /// parameters that only carry names and kinds. `None` if the name is
    /// taken.
    fn declare(
        &mut self,
        name: Name,
        span: Span,
        generics: &[GenericParam],
        kind: DeclKind,
    ) -> Option<DeclId> {
        let decl = self.table.registry_mut().add_decl(DeclInfo {
            name,
            generics: placeholder_generics(generics),
            kind,
            span,
        });
        if decl.is_none() {
            self.error(span, TypeErrorKind::DuplicateDefinition { name });
        }
        decl
    }

    /// Aliases may refer to each other in any order: resolve what can be
    /// resolved until a round makes no progress, then report the rest.
    fn register_aliases(&mut self, aliases: &[AliasDef]) {
        let mut pending: Vec<&AliasDef> = Vec::new();
        for alias in aliases {
            if self.table.registry().type_def(alias.name).is_some()
                || pending.iter().any(|p| p.name == alias.name)
            {
                self.error(alias.span, TypeErrorKind::DuplicateDefinition { name: alias.name });
            } else {
                pending.push(alias);
            }
        }

        let scope = GenericParams::default();
        loop {
            let before = pending.len();
            let mut unresolved = Vec::new();
            for alias in pending {
                match self.table.resolve(&alias.target, &scope, self.names) {
                    Ok(target) => {
                        self.table.registry_mut().add_alias(alias.name, target);
                    }
                    Err(err) => unresolved.push((alias, err)),
                }
            }
            if unresolved.len() == before {
                for (alias, err) in unresolved {
                    self.error(alias.span, err);
                    // Keep later uses from cascading.
                    self.table.registry_mut().add_alias(alias.name, TypeId::ERROR);
                }
                return;
            }
            pending = unresolved
                .into_iter()
                .filter_map(|(alias, err)| match err {
                    ResolveError::UnknownType { .. } => Some(alias),
                    err => {
                        self.error(alias.span, err);
                        self.table.registry_mut().add_alias(alias.name, TypeId::ERROR);
                        None
                    }
                })
                .collect();
            if pending.is_empty() {
                return;
            }
        }
    }

    fn resolve_generics(&mut self, params: &[GenericParam]) -> GenericParams {
        let scope = placeholder_generics(params);
        let defs = params
            .iter()
            .zip(0u32..)
            .map(|(param, index)| {
                let kind = match &param.kind {
                    GenericParamKind::Type { bounds, default } => {
                        let mut constraints = Vec::with_capacity(bounds.len());
                        for bound in bounds {
                            let ty = self.resolve(bound, &scope, param.span);
                            if ty.is_error() {
                                continue;
                            }
                            if self.table.is_interface(ty) {
                                constraints.push(ty);
                            } else {
                                self.error(param.span, TypeErrorKind::NotAnInterface { ty });
                            }
                        }
                        let default = default
                            .as_ref()
                            .map(|d| self.resolve(d, &scope, param.span));
                        GenericParamDefKind::Type {
                            constraints,
                            default,
                        }
                    }
                    GenericParamKind::Const { ty } => GenericParamDefKind::Const {
                        ty: self.resolve(ty, &scope, param.span),
                    },
                };
                GenericParamDef {
                    name: param.name,
                    index,
                    kind,
                }
            })
            .collect();
        GenericParams::new(defs)
    }

    fn resolve_params(&mut self, params: &[Param], scope: &GenericParams) -> Vec<ParamSig> {
        params
            .iter()
            .map(|p| ParamSig {
                name: p.name,
                ty: self.resolve(&p.ty, scope, p.span),
                mutable: p.mutable,
            })
            .collect()
    }

    fn resolve_ret(&mut self, ret: Option<&ParsedType>, scope: &GenericParams, span: Span) -> TypeId {
        ret.map_or(TypeId::UNIT, |ret| self.resolve(ret, scope, span))
    }

    /// Resolve an `implements` list and record `decl` as an implementor of
    /// each interface.
    fn resolve_implements(
        &mut self,
        decl: DeclId,
        written: &[ParsedType],
        scope: &GenericParams,
        span: Span,
    ) -> Vec<TypeId> {
        let mut implements = Vec::with_capacity(written.len());
        for parsed in written {
            let ty = self.resolve(parsed, scope, span);
            if ty.is_error() {
                continue;
            }
            let Some(iface) = self.table.decl_of(ty).filter(|_| self.table.is_interface(ty)) else {
                self.error(span, TypeErrorKind::NotAnInterface { ty });
                continue;
            };
            if let DeclKind::Interface(info) = &mut self.table.registry_mut().decl_mut(iface).kind {
                if !info.implementors.contains(&decl) {
                    info.implementors.push(decl);
                }
            }
            implements.push(ty);
        }
        implements
    }

    fn receiver_decl(&mut self, name: Name, span: Span) -> Option<DeclId> {
        match self.table.registry().type_def(name) {
            Some(TypeDef::Decl(decl)) => Some(decl),
            _ => {
                self.error(span, TypeErrorKind::UnknownType { name });
                None
            }
        }
    }

    /// Constants are typed like `let` bindings; their value is kept when
    /// the initializer is a compile-time literal. An initializer may only
    /// use constants declared before it.
    fn register_const(&mut self, konst: &ConstDef) {
        let scope = GenericParams::default();
        let declared = konst
            .ty
            .as_ref()
            .map(|parsed| self.resolve(parsed, &scope, konst.span));

        let mut engine = InferEngine::new(&self.table, self.names, &scope, ErrorPolicy::Recover);
        let ty = match declared {
            Some(ty) if !ty.is_error() => {
                check_expr(&mut engine, self.arena, konst.value, ty);
                ty
            }
            _ => {
                let found = infer_expr(&mut engine, self.arena, konst.value, None);
                if found.is_untyped() {
                    engine.error(konst.span, TypeErrorKind::UntypedLiteral)
                } else {
                    declared.unwrap_or(found)
                }
            }
        };
        let value = const_value_of(&engine, self.arena, konst.value);
        self.const_outputs.push(engine.finish());

        let added = self.table.registry_mut().add_const(
            konst.name,
            ConstInfo {
                ty,
                value,
                span: konst.span,
            },
        );
        if !added {
            self.error(konst.span, TypeErrorKind::DuplicateDefinition { name: konst.name });
        }
    }
}

/// Generic parameters with names and kinds only, so signatures can mention
/// any parameter of the list regardless of order.
fn placeholder_generics(params: &[GenericParam]) -> GenericParams {
    GenericParams::new(
        params
            .iter()
            .zip(0u32..)
            .map(|(param, index)| GenericParamDef {
                name: param.name,
                index,
                kind: match param.kind {
                    GenericParamKind::Type { .. } => GenericParamDefKind::Type {
                        constraints: Vec::new(),
                        default: None,
                    },
                    GenericParamKind::Const { .. } => GenericParamDefKind::Const { ty: TypeId::ERROR },
                },
            })
            .collect(),
    )
}
