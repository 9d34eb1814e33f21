//! Sharded type interner.
//!
//! Hash-conses [`TypeData`] into [`TypeId`]s. Follows the same layout as
//! `StringInterner` in `kite_ir`: one `RwLock` per shard, so concurrently
//! checked function bodies can intern new structural types while sharing
//! one interner.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use kite_ir::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{ConstValue, DeclId, Primitive, TypeData, TypeFlags, TypeId, TypeVar};

/// Error when interning a type fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeInternError {
    /// A shard ran out of local indices.
    ShardOverflow { shard_idx: usize },
}

impl std::fmt::Display for TypeInternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeInternError::ShardOverflow { shard_idx } => {
                write!(f, "type interner shard {shard_idx} exceeded capacity")
            }
        }
    }
}

impl std::error::Error for TypeInternError {}

struct TypeShard {
    map: FxHashMap<TypeData, u32>,
    types: Vec<(TypeData, TypeFlags)>,
}

impl TypeShard {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            types: Vec::with_capacity(256),
        }
    }

    /// Shard 0, holding the pre-interned types at their fixed ids.
    fn with_pre_interned() -> Self {
        let mut shard = Self::new();
        let fixed = Primitive::ALL
            .iter()
            .map(|&p| (TypeData::Primitive(p), TypeFlags::empty()))
            .chain([
                (TypeData::Unit, TypeFlags::empty()),
                (TypeData::Never, TypeFlags::empty()),
                (TypeData::Error, TypeFlags::HAS_ERROR),
                (TypeData::UntypedNone, TypeFlags::IS_UNTYPED),
                (TypeData::UntypedNil, TypeFlags::IS_UNTYPED),
            ]);
        for (local, (data, flags)) in (0u32..).zip(fixed) {
            shard.map.insert(data.clone(), local);
            shard.types.push((data, flags));
        }
        debug_assert_eq!(shard.types.len(), TypeId::PRE_INTERNED as usize);
        shard
    }
}

const NUM_SHARDS: usize = 16;

/// Sharded type interner for concurrent access.
pub struct TypeInterner {
    shards: [RwLock<TypeShard>; NUM_SHARDS],
    next_var: AtomicU32,
}

impl TypeInterner {
    pub fn new() -> Self {
        let shards = std::array::from_fn(|i| {
            if i == 0 {
                RwLock::new(TypeShard::with_pre_interned())
            } else {
                RwLock::new(TypeShard::new())
            }
        });

        Self {
            shards,
            next_var: AtomicU32::new(0),
        }
    }

    #[inline]
    fn shard_for(data: &TypeData) -> usize {
        let mut hasher = rustc_hash::FxHasher::default();
        data.hash(&mut hasher);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "truncation is fine for hash-based shard selection"
        )]
        let hash_usize = hasher.finish() as usize;
        hash_usize % NUM_SHARDS
    }

    fn pre_interned(data: &TypeData) -> Option<TypeId> {
        match data {
            TypeData::Primitive(p) => Some(p.type_id()),
            TypeData::Unit => Some(TypeId::UNIT),
            TypeData::Never => Some(TypeId::NEVER),
            TypeData::Error => Some(TypeId::ERROR),
            TypeData::UntypedNone => Some(TypeId::UNTYPED_NONE),
            TypeData::UntypedNil => Some(TypeId::UNTYPED_NIL),
            _ => None,
        }
    }

    fn compute_flags(&self, data: &TypeData) -> TypeFlags {
        let own = match data {
            TypeData::Var(_) => TypeFlags::HAS_VAR,
            TypeData::Param { .. } => TypeFlags::HAS_PARAM,
            TypeData::Const(_) => TypeFlags::HAS_CONST,
            _ => TypeFlags::empty(),
        };
        own | TypeFlags::propagate(data.children().into_iter().map(|c| self.flags(c)))
    }

    /// Intern `data`, returning the existing id if it was seen before.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "shard_idx is bounded by NUM_SHARDS (16)"
    )]
    pub fn try_intern(&self, data: TypeData) -> Result<TypeId, TypeInternError> {
        if let Some(id) = Self::pre_interned(&data) {
            return Ok(id);
        }

        let shard_idx = Self::shard_for(&data);
        let shard = &self.shards[shard_idx];

        {
            let guard = shard.read();
            if let Some(&local) = guard.map.get(&data) {
                return Ok(TypeId::from_shard_local(shard_idx as u32, local));
            }
        }

        // Child flags read other shards; compute before taking the write lock.
        let flags = self.compute_flags(&data);

        let mut guard = shard.write();
        if let Some(&local) = guard.map.get(&data) {
            return Ok(TypeId::from_shard_local(shard_idx as u32, local));
        }

        let local = u32::try_from(guard.types.len())
            .ok()
            .filter(|&local| local <= TypeId::MAX_LOCAL)
            .ok_or(TypeInternError::ShardOverflow { shard_idx })?;
        guard.types.push((data.clone(), flags));
        guard.map.insert(data, local);

        Ok(TypeId::from_shard_local(shard_idx as u32, local))
    }

    /// Intern `data`.
    ///
    /// # Panics
    /// Panics if a shard overflows; use [`try_intern`](Self::try_intern) to
    /// handle that case.
    pub fn intern(&self, data: TypeData) -> TypeId {
        self.try_intern(data).unwrap_or_else(|e| panic!("{e}"))
    }

    /// The data behind `id`.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this interner.
    pub fn lookup(&self, id: TypeId) -> TypeData {
        self.shards[id.shard()].read().types[id.local()].0.clone()
    }

    /// Cached flags of `id`.
    pub fn flags(&self, id: TypeId) -> TypeFlags {
        self.shards[id.shard()].read().types[id.local()].1
    }

    /// Number of interned types.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().types.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    // === Constructors ===

    pub fn primitive(&self, p: Primitive) -> TypeId {
        p.type_id()
    }

    pub fn pointer(&self, mutable: bool, inner: TypeId) -> TypeId {
        self.intern(TypeData::Pointer { mutable, inner })
    }

    pub fn reference(&self, mutable: bool, inner: TypeId) -> TypeId {
        self.intern(TypeData::Reference { mutable, inner })
    }

    pub fn fixed_array(&self, len: u64, elem: TypeId) -> TypeId {
        self.intern(TypeData::FixedArray { len, elem })
    }

    pub fn dyn_array(&self, elem: TypeId) -> TypeId {
        self.intern(TypeData::DynArray(elem))
    }

    pub fn map(&self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(TypeData::Map { key, value })
    }

    /// Zero elements is unit; one element is that element.
    pub fn tuple(&self, elems: &[TypeId]) -> TypeId {
        match elems {
            [] => TypeId::UNIT,
            [single] => *single,
            _ => self.intern(TypeData::Tuple(elems.into())),
        }
    }

    pub fn function(&self, params: &[TypeId], variadic: bool, ret: TypeId) -> TypeId {
        self.intern(TypeData::Function {
            params: params.into(),
            variadic,
            ret,
        })
    }

    pub fn option(&self, inner: TypeId) -> TypeId {
        self.intern(TypeData::Option(inner))
    }

    pub fn result(&self, ok: TypeId, err: TypeId) -> TypeId {
        self.intern(TypeData::Result { ok, err })
    }

    pub fn channel(&self, inner: TypeId) -> TypeId {
        self.intern(TypeData::Channel(inner))
    }

    pub fn named(&self, decl: DeclId, args: &[TypeId]) -> TypeId {
        self.intern(TypeData::Named {
            decl,
            args: args.into(),
        })
    }

    pub fn interface(&self, decl: DeclId, args: &[TypeId]) -> TypeId {
        self.intern(TypeData::Interface {
            decl,
            args: args.into(),
        })
    }

    /// Canonical union: nested unions flattened, `never` dropped, members
    /// sorted and deduplicated. Empty is `never`; one member is that member.
    pub fn union(&self, members: &[TypeId]) -> TypeId {
        let mut flat = Vec::with_capacity(members.len());
        for &member in members {
            match self.lookup(member) {
                TypeData::Union(inner) => flat.extend_from_slice(&inner),
                TypeData::Never => {}
                _ => flat.push(member),
            }
        }
        flat.sort_unstable();
        flat.dedup();
        match flat.as_slice() {
            [] => TypeId::NEVER,
            [single] => *single,
            _ => self.intern(TypeData::Union(flat.into())),
        }
    }

    pub fn param(&self, name: Name, index: u32) -> TypeId {
        self.intern(TypeData::Param { name, index })
    }

    pub fn const_value(&self, value: ConstValue) -> TypeId {
        self.intern(TypeData::Const(value))
    }

    /// A type variable not handed out before.
    pub fn fresh_var(&self) -> TypeId {
        let var = TypeVar(self.next_var.fetch_add(1, Ordering::Relaxed));
        self.intern(TypeData::Var(var))
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInterner")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Clonable, thread-safe handle to one [`TypeInterner`].
#[derive(Clone, Debug, Default)]
pub struct SharedTypeInterner(Arc<TypeInterner>);

impl SharedTypeInterner {
    pub fn new() -> Self {
        SharedTypeInterner(Arc::new(TypeInterner::new()))
    }
}

impl std::ops::Deref for SharedTypeInterner {
    type Target = TypeInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests;
