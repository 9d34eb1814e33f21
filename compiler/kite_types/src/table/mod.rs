//! The type table: single source of truth for type identity and
//! assignability.
//!
//! Wraps the shared [`TypeInterner`] and the [`DeclRegistry`]. Registration
//! needs `&mut TypeTable`; after that the table is only ever shared as
//! `&TypeTable`, which is `Sync`, so function bodies can be checked in
//! parallel against it.

mod assignable;
mod format;
mod resolve;
mod subst;

pub use assignable::ParamBounds;
pub use resolve::ResolveError;

use kite_ir::Name;

use crate::{
    DeclId, DeclKind, DeclRegistry, MethodSig, SharedTypeInterner, TypeData, TypeFlags, TypeId,
    TypeInterner,
};

/// A method found through [`TypeTable::method`].
#[derive(Clone, Debug)]
pub struct ResolvedMethod<'a> {
    pub method: &'a MethodSig,
    /// Generic arguments of the declaration the method was found on, for
    /// substituting into its signature.
    pub receiver_args: Vec<TypeId>,
}

#[derive(Clone, Debug, Default)]
pub struct TypeTable {
    interner: SharedTypeInterner,
    registry: DeclRegistry,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interner(interner: SharedTypeInterner) -> Self {
        TypeTable {
            interner,
            registry: DeclRegistry::new(),
        }
    }

    #[inline]
    pub fn interner(&self) -> &TypeInterner {
        &self.interner
    }

    pub fn shared_interner(&self) -> SharedTypeInterner {
        self.interner.clone()
    }

    #[inline]
    pub fn registry(&self) -> &DeclRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DeclRegistry {
        &mut self.registry
    }

    #[inline]
    pub fn lookup(&self, ty: TypeId) -> TypeData {
        self.interner.lookup(ty)
    }

    #[inline]
    pub fn flags(&self, ty: TypeId) -> TypeFlags {
        self.interner.flags(ty)
    }

    /// Structural equality. Interning makes this an id comparison.
    #[inline]
    pub fn identical(&self, a: TypeId, b: TypeId) -> bool {
        a == b
    }

    pub fn is_interface(&self, ty: TypeId) -> bool {
        !ty.is_pre_interned() && matches!(self.lookup(ty), TypeData::Interface { .. })
    }

    pub fn is_union(&self, ty: TypeId) -> bool {
        !ty.is_pre_interned() && matches!(self.lookup(ty), TypeData::Union(_))
    }

    /// `T` for `?T`.
    pub fn option_inner(&self, ty: TypeId) -> Option<TypeId> {
        match self.lookup(ty) {
            TypeData::Option(inner) => Some(inner),
            _ => None,
        }
    }

    /// Strip any number of reference and pointer layers.
    pub fn deref(&self, mut ty: TypeId) -> TypeId {
        loop {
            match self.lookup(ty) {
                TypeData::Reference { inner, .. } | TypeData::Pointer { inner, .. } => ty = inner,
                _ => return ty,
            }
        }
    }

    /// Interfaces `ty` is known to implement. An interface type counts as
    /// implementing itself.
    pub fn interfaces_of(&self, ty: TypeId) -> Vec<TypeId> {
        match self.lookup(ty) {
            TypeData::Named { decl, args } => self
                .registry
                .decl(decl)
                .implements()
                .iter()
                .map(|&iface| self.substitute_params(iface, &args))
                .collect(),
            TypeData::Interface { .. } => vec![ty],
            _ => Vec::new(),
        }
    }

    /// `value`'s declaration lists `iface` (after substituting its generic
    /// arguments).
    pub fn implements(&self, value: TypeId, iface: TypeId) -> bool {
        match self.lookup(value) {
            TypeData::Named { decl, args } => self
                .registry
                .decl(decl)
                .implements()
                .iter()
                .any(|&i| self.substitute_params(i, &args) == iface),
            _ => false,
        }
    }

    /// Declared type of `field` on `ty`, looking through references and
    /// pointers.
    pub fn field_type(&self, ty: TypeId, field: Name) -> Option<TypeId> {
        let TypeData::Named { decl, args } = self.lookup(self.deref(ty)) else {
            return None;
        };
        let DeclKind::Struct(info) = &self.registry.decl(decl).kind else {
            return None;
        };
        info.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|&(_, field_ty)| self.substitute_params(field_ty, &args))
    }

    /// Find `name` on `ty`: its own declaration first, then the interfaces
    /// it implements.
    pub fn method(&self, ty: TypeId, name: Name) -> Option<ResolvedMethod<'_>> {
        let ty = self.deref(ty);
        let (decl, args) = match self.lookup(ty) {
            TypeData::Named { decl, args } | TypeData::Interface { decl, args } => (decl, args),
            _ => return None,
        };
        if let Some(method) = self.registry.method(decl, name) {
            return Some(ResolvedMethod {
                method,
                receiver_args: args.to_vec(),
            });
        }
        self.interfaces_of(ty).into_iter().find_map(|iface| {
            let TypeData::Interface { decl, args } = self.lookup(iface) else {
                return None;
            };
            self.registry
                .method(decl, name)
                .map(|method| ResolvedMethod {
                    method,
                    receiver_args: args.to_vec(),
                })
        })
    }

    /// The full set of runtime types a value of `ty` can hold, when known:
    /// the members of a union, or the implementors of a sealed interface
    /// whose implementors are all non-generic.
    pub fn exhaustive_members(&self, ty: TypeId) -> Option<Vec<TypeId>> {
        match self.lookup(ty) {
            TypeData::Union(members) => Some(members.to_vec()),
            TypeData::Interface { decl, args } if args.is_empty() => {
                let DeclKind::Interface(info) = &self.registry.decl(decl).kind else {
                    return None;
                };
                if !info.sealed {
                    return None;
                }
                info.implementors
                    .iter()
                    .map(|&d| {
                        self.registry
                            .decl(d)
                            .generics
                            .is_empty()
                            .then(|| self.interner.named(d, &[]))
                    })
                    .collect()
            }
            _ => None,
        }
    }

    /// The declaration behind a named or interface type.
    pub fn decl_of(&self, ty: TypeId) -> Option<DeclId> {
        match self.lookup(ty) {
            TypeData::Named { decl, .. } | TypeData::Interface { decl, .. } => Some(decl),
            _ => None,
        }
    }

    /// Function type of a signature.
    pub fn fn_type(&self, sig: &crate::FunctionSig) -> TypeId {
        let params: Vec<TypeId> = sig.params.iter().map(|p| p.ty).collect();
        self.interner.function(&params, sig.variadic, sig.ret)
    }
}
