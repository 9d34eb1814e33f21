//! Assignability: may a value of one type be stored where another is
//! expected. Directional; evaluated with the target fixed.

use rustc_hash::FxHashMap;

use super::TypeTable;
use crate::{DeclKind, TypeData, TypeId};

/// Interface constraints of the generic parameters in scope, keyed by the
/// parameter's `Param` type.
#[derive(Clone, Debug, Default)]
pub struct ParamBounds(FxHashMap<TypeId, Vec<TypeId>>);

impl ParamBounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, param: TypeId, constraints: Vec<TypeId>) {
        self.0.insert(param, constraints);
    }

    pub fn get(&self, param: TypeId) -> &[TypeId] {
        self.0.get(&param).map_or(&[], Vec::as_slice)
    }
}

impl TypeTable {
    /// Assignability with no generic parameters in scope.
    pub fn assignable(&self, value: TypeId, target: TypeId) -> bool {
        self.assignable_in(value, target, &ParamBounds::default())
    }

    /// `true` when a value of type `value` may be used where `target` is
    /// expected.
    ///
    /// Holds when the types are identical, or:
    /// - `value` is `never`, or either side is the error sentinel
    /// - `target` is an interface `value` implements (or a bound of the
    ///   generic parameter `value`)
    /// - `target` is a union containing `value` (every member, for a union
    ///   `value`)
    /// - reference/pointer covariance on mutability; `&void`/`*void` accept
    ///   any reference/pointer of compatible mutability. `void` and `()`
    ///   are both the unit type, so `&()` is the same type as `&void`.
    /// - lossless widening within one numeric category
    /// - an enum into its identical backing type
    /// - `nil` into any pointer, `none` into any option
    /// - lifting into `?T` or `Result[T, E]` when assignable to `T`
    pub fn assignable_in(&self, value: TypeId, target: TypeId, bounds: &ParamBounds) -> bool {
        if value == target || value.is_never() || value.is_error() || target.is_error() {
            return true;
        }

        let value_data = self.lookup(value);
        let target_data = self.lookup(target);

        let direct = match (&value_data, &target_data) {
            (TypeData::Param { .. }, TypeData::Interface { .. }) => {
                bounds.get(value).contains(&target)
            }
            (_, TypeData::Interface { .. }) => self.implements(value, target),
            (TypeData::Union(members), TypeData::Union(targets)) => {
                members.iter().all(|m| targets.contains(m))
            }
            (_, TypeData::Union(targets)) => targets.contains(&value),
            (
                TypeData::Reference {
                    mutable: vm,
                    inner: vi,
                },
                TypeData::Reference {
                    mutable: tm,
                    inner: ti,
                },
            )
            | (
                TypeData::Pointer {
                    mutable: vm,
                    inner: vi,
                },
                TypeData::Pointer {
                    mutable: tm,
                    inner: ti,
                },
            ) => (*vm || !*tm) && (vi == ti || *ti == TypeId::UNIT),
            (TypeData::UntypedNil, TypeData::Pointer { .. })
            | (TypeData::UntypedNone, TypeData::Option(_)) => true,
            (TypeData::Primitive(from), TypeData::Primitive(to)) => from.widens_to(*to),
            (TypeData::Named { decl, .. }, TypeData::Primitive(_)) => {
                matches!(
                    &self.registry().decl(*decl).kind,
                    DeclKind::Enum(info) if info.backing == target
                )
            }
            _ => false,
        };
        if direct {
            return true;
        }

        match target_data {
            TypeData::Option(inner) => self.assignable_in(value, inner, bounds),
            TypeData::Result { ok, .. } => self.assignable_in(value, ok, bounds),
            _ => false,
        }
    }
}
