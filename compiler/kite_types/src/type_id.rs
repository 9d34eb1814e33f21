//! Type handles and primitive kinds.
//!
//! `TypeId` is the canonical handle for an interned type. Every structurally
//! equal type is interned exactly once, so type identity is a `u32`
//! comparison.

use std::fmt;

/// Handle to an interned type: `shard << 28 | local`.
///
/// Pre-interned types live in shard 0 at fixed local indices, so their raw
/// value equals their index.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    // === Primitives (0-14) ===
    pub const I8: TypeId = TypeId(0);
    pub const I16: TypeId = TypeId(1);
    pub const I32: TypeId = TypeId(2);
    pub const I64: TypeId = TypeId(3);
    pub const ISIZE: TypeId = TypeId(4);
    pub const U8: TypeId = TypeId(5);
    pub const U16: TypeId = TypeId(6);
    pub const U32: TypeId = TypeId(7);
    pub const U64: TypeId = TypeId(8);
    pub const USIZE: TypeId = TypeId(9);
    pub const F32: TypeId = TypeId(10);
    pub const F64: TypeId = TypeId(11);
    pub const BOOL: TypeId = TypeId(12);
    pub const STRING: TypeId = TypeId(13);
    pub const RUNE: TypeId = TypeId(14);

    // === Special types (15-19) ===
    /// The unit type; also what `void` resolves to.
    pub const UNIT: TypeId = TypeId(15);
    /// Bottom type: the type of `return`, `break`, `continue`.
    pub const NEVER: TypeId = TypeId(16);
    /// Sentinel substituted for expressions that failed to type.
    pub const ERROR: TypeId = TypeId(17);
    /// Type of the `none` literal before it meets an option type.
    pub const UNTYPED_NONE: TypeId = TypeId(18);
    /// Type of the `nil` literal before it meets a pointer type.
    pub const UNTYPED_NIL: TypeId = TypeId(19);

    /// Number of pre-interned types.
    pub const PRE_INTERNED: u32 = 20;

    const LOCAL_BITS: u32 = 28;
    pub(crate) const MAX_LOCAL: u32 = (1 << Self::LOCAL_BITS) - 1;

    #[inline]
    pub(crate) const fn from_shard_local(shard: u32, local: u32) -> Self {
        TypeId((shard << Self::LOCAL_BITS) | local)
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TypeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn shard(self) -> usize {
        (self.0 >> Self::LOCAL_BITS) as usize
    }

    #[inline]
    pub(crate) const fn local(self) -> usize {
        (self.0 & Self::MAX_LOCAL) as usize
    }

    /// One of the fixed ids above.
    #[inline]
    pub const fn is_pre_interned(self) -> bool {
        self.0 < Self::PRE_INTERNED
    }

    /// `none` or `nil` before adoption.
    #[inline]
    pub const fn is_untyped(self) -> bool {
        self.0 == Self::UNTYPED_NONE.0 || self.0 == Self::UNTYPED_NIL.0
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }

    #[inline]
    pub const fn is_never(self) -> bool {
        self.0 == Self::NEVER.0
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Primitive::from_type_id(*self) {
            Some(p) => write!(f, "TypeId({})", p.name()),
            None => match *self {
                TypeId::UNIT => write!(f, "TypeId(unit)"),
                TypeId::NEVER => write!(f, "TypeId(never)"),
                TypeId::ERROR => write!(f, "TypeId(error)"),
                TypeId::UNTYPED_NONE => write!(f, "TypeId(none)"),
                TypeId::UNTYPED_NIL => write!(f, "TypeId(nil)"),
                _ => write!(f, "TypeId({}:{})", self.shard(), self.local()),
            },
        }
    }
}

/// A solver-local type variable.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeVar(pub u32);

/// Index of a struct, enum or interface in the declaration registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct DeclId(pub(crate) u32);

impl DeclId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Numeric category for lossless widening.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NumericCategory {
    Signed,
    Unsigned,
    Float,
}

/// Built-in scalar types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Primitive {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Bool,
    String,
    Rune,
}

impl Primitive {
    /// In `TypeId` order.
    pub const ALL: [Primitive; 15] = [
        Primitive::I8,
        Primitive::I16,
        Primitive::I32,
        Primitive::I64,
        Primitive::Isize,
        Primitive::U8,
        Primitive::U16,
        Primitive::U32,
        Primitive::U64,
        Primitive::Usize,
        Primitive::F32,
        Primitive::F64,
        Primitive::Bool,
        Primitive::String,
        Primitive::Rune,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::Isize => "isize",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::Usize => "usize",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Bool => "bool",
            Primitive::String => "string",
            Primitive::Rune => "rune",
        }
    }

    /// Resolve a source-level name, including the `int` and `byte` aliases.
    pub fn from_name(name: &str) -> Option<Primitive> {
        match name {
            "int" => Some(Primitive::I32),
            "byte" => Some(Primitive::U8),
            _ => Self::ALL.iter().copied().find(|p| p.name() == name),
        }
    }

    #[inline]
    pub const fn type_id(self) -> TypeId {
        TypeId(self as u32)
    }

    pub fn from_type_id(id: TypeId) -> Option<Primitive> {
        Self::ALL.get(id.raw() as usize).copied()
    }

    pub const fn category(self) -> Option<NumericCategory> {
        match self {
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64 | Primitive::Isize => {
                Some(NumericCategory::Signed)
            }
            Primitive::U8 | Primitive::U16 | Primitive::U32 | Primitive::U64 | Primitive::Usize => {
                Some(NumericCategory::Unsigned)
            }
            Primitive::F32 | Primitive::F64 => Some(NumericCategory::Float),
            Primitive::Bool | Primitive::String | Primitive::Rune => None,
        }
    }

    /// Width in bits; pointer-sized integers count as 64.
    pub const fn bits(self) -> u32 {
        match self {
            Primitive::I8 | Primitive::U8 | Primitive::Bool => 8,
            Primitive::I16 | Primitive::U16 => 16,
            Primitive::I32 | Primitive::U32 | Primitive::F32 | Primitive::Rune => 32,
            Primitive::I64
            | Primitive::Isize
            | Primitive::U64
            | Primitive::Usize
            | Primitive::F64
            | Primitive::String => 64,
        }
    }

    pub const fn is_integer(self) -> bool {
        matches!(
            self.category(),
            Some(NumericCategory::Signed | NumericCategory::Unsigned)
        )
    }

    pub const fn is_float(self) -> bool {
        matches!(self.category(), Some(NumericCategory::Float))
    }

    /// Inclusive value range of an integer primitive.
    pub fn int_range(self) -> Option<(i128, i128)> {
        let bits = self.bits();
        match self.category()? {
            NumericCategory::Signed => {
                let max = (1i128 << (bits - 1)) - 1;
                Some((-max - 1, max))
            }
            NumericCategory::Unsigned => Some((0, (1i128 << bits) - 1)),
            NumericCategory::Float => None,
        }
    }

    /// `self` widens to `target` without loss: same category, no narrower.
    pub fn widens_to(self, target: Primitive) -> bool {
        match (self.category(), target.category()) {
            (Some(from), Some(to)) => from == to && self.bits() <= target.bits(),
            _ => false,
        }
    }
}
