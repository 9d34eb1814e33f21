//! Structural rewriting of types.

use rustc_hash::FxHashMap;

use super::TypeTable;
use crate::{TypeData, TypeFlags, TypeId, TypeVar};

impl TypeTable {
    /// Rewrite `ty` bottom-up. `leaf` is offered every node whose flags
    /// intersect `mask`; returning `Some` replaces that node (the
    /// replacement is not revisited).
    pub fn map_types(
        &self,
        ty: TypeId,
        mask: TypeFlags,
        leaf: &mut dyn FnMut(&TypeData) -> Option<TypeId>,
    ) -> TypeId {
        if !self.flags(ty).intersects(mask) {
            return ty;
        }
        let data = self.lookup(ty);
        if let Some(replacement) = leaf(&data) {
            return replacement;
        }

        let mut go = |t: TypeId| self.map_types(t, mask, leaf);
        let interner = self.interner();
        match data {
            TypeData::Pointer { mutable, inner } => interner.pointer(mutable, go(inner)),
            TypeData::Reference { mutable, inner } => interner.reference(mutable, go(inner)),
            TypeData::FixedArray { len, elem } => interner.fixed_array(len, go(elem)),
            TypeData::DynArray(elem) => interner.dyn_array(go(elem)),
            TypeData::Map { key, value } => {
                let key = go(key);
                interner.map(key, go(value))
            }
            TypeData::Tuple(elems) => {
                let elems: Vec<TypeId> = elems.iter().map(|&e| go(e)).collect();
                interner.tuple(&elems)
            }
            TypeData::Function {
                params,
                variadic,
                ret,
            } => {
                let params: Vec<TypeId> = params.iter().map(|&p| go(p)).collect();
                interner.function(&params, variadic, go(ret))
            }
            TypeData::Option(inner) => interner.option(go(inner)),
            TypeData::Result { ok, err } => {
                let ok = go(ok);
                interner.result(ok, go(err))
            }
            TypeData::Channel(inner) => interner.channel(go(inner)),
            TypeData::Named { decl, args } => {
                let args: Vec<TypeId> = args.iter().map(|&a| go(a)).collect();
                interner.named(decl, &args)
            }
            TypeData::Interface { decl, args } => {
                let args: Vec<TypeId> = args.iter().map(|&a| go(a)).collect();
                interner.interface(decl, &args)
            }
            TypeData::Union(members) => {
                let members: Vec<TypeId> = members.iter().map(|&m| go(m)).collect();
                interner.union(&members)
            }
            TypeData::Primitive(_)
            | TypeData::Unit
            | TypeData::Never
            | TypeData::Error
            | TypeData::UntypedNone
            | TypeData::UntypedNil
            | TypeData::Param { .. }
            | TypeData::Var(_)
            | TypeData::Const(_) => ty,
        }
    }

    /// Replace each `Param { index }` with `args[index]`. Parameters past
    /// the end of `args` are left alone.
    pub fn substitute_params(&self, ty: TypeId, args: &[TypeId]) -> TypeId {
        if args.is_empty() {
            return ty;
        }
        self.map_types(ty, TypeFlags::HAS_PARAM, &mut |data| match data {
            TypeData::Param { index, .. } => args.get(*index as usize).copied(),
            _ => None,
        })
    }

    /// Replace bound type variables.
    pub fn substitute_vars(&self, ty: TypeId, bindings: &FxHashMap<TypeVar, TypeId>) -> TypeId {
        self.map_types(ty, TypeFlags::HAS_VAR, &mut |data| match data {
            TypeData::Var(var) => bindings.get(var).copied(),
            _ => None,
        })
    }
}
