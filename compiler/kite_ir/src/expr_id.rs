//! Expression handles and ranges for the flat arena.

use std::fmt;

/// Index into an [`ExprArena`](crate::ExprArena).
///
/// Optional children (a missing `else`, a bare `return`) use
/// [`ExprId::INVALID`] rather than `Option<ExprId>`, keeping nodes small.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// Sentinel for "no expression".
    pub const INVALID: ExprId = ExprId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// True unless this is the [`INVALID`](Self::INVALID) sentinel.
    #[inline]
    pub const fn is_present(self) -> bool {
        self.0 != u32::MAX
    }

    /// `Some(self)` when present.
    #[inline]
    pub const fn get(self) -> Option<ExprId> {
        if self.is_present() {
            Some(self)
        } else {
            None
        }
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_present() {
            write!(f, "ExprId({})", self.0)
        } else {
            write!(f, "ExprId::INVALID")
        }
    }
}

impl Default for ExprId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Declares a `{ start, len }` range type indexing one of the arena's
/// side tables.
macro_rules! define_range {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            pub start: u32,
            pub len: u32,
        }

        impl $name {
            pub const EMPTY: $name = $name { start: 0, len: 0 };

            #[inline]
            pub const fn new(start: u32, len: u32) -> Self {
                $name { start, len }
            }

            #[inline]
            pub const fn is_empty(&self) -> bool {
                self.len == 0
            }

            #[inline]
            pub const fn len(&self) -> usize {
                self.len as usize
            }

            #[inline]
            pub(crate) const fn to_range(self) -> std::ops::Range<usize> {
                self.start as usize..(self.start + self.len) as usize
            }
        }
    };
}

pub(crate) use define_range;

define_range!(
    /// Contiguous run of expression ids (call arguments, array elements).
    ExprRange
);
