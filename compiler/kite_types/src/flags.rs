//! Cached per-type flags.
//!
//! Computed once when a type is interned, so substitution and error checks
//! can skip types that contain nothing to do.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u8 {
        /// Contains a solver type variable.
        const HAS_VAR = 1 << 0;
        /// Contains a declared generic parameter.
        const HAS_PARAM = 1 << 1;
        /// Contains the error sentinel.
        const HAS_ERROR = 1 << 2;
        /// Contains an untyped `none`/`nil`.
        const IS_UNTYPED = 1 << 3;
        /// Contains a type-level constant.
        const HAS_CONST = 1 << 4;
    }
}

impl TypeFlags {
    /// Flags a compound type inherits from its children.
    pub const PROPAGATE_MASK: Self = Self::from_bits_truncate(
        Self::HAS_VAR.bits()
            | Self::HAS_PARAM.bits()
            | Self::HAS_ERROR.bits()
            | Self::IS_UNTYPED.bits()
            | Self::HAS_CONST.bits(),
    );

    #[inline]
    pub const fn has_vars(self) -> bool {
        self.contains(Self::HAS_VAR)
    }

    #[inline]
    pub const fn has_params(self) -> bool {
        self.contains(Self::HAS_PARAM)
    }

    #[inline]
    pub const fn has_errors(self) -> bool {
        self.contains(Self::HAS_ERROR)
    }

    /// Nothing left to substitute.
    #[inline]
    pub const fn is_closed(self) -> bool {
        !self.intersects(Self::HAS_VAR.union(Self::HAS_PARAM))
    }

    /// Union of the propagating flags of `children`.
    pub fn propagate(children: impl IntoIterator<Item = TypeFlags>) -> Self {
        children
            .into_iter()
            .fold(Self::empty(), |acc, f| acc | (f & Self::PROPAGATE_MASK))
    }
}
