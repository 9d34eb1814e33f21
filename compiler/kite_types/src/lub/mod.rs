//! Least upper bound of branch types.
//!
//! Used wherever several arms produce one value: `if`/`else` and `match`
//! expressions. The rules, in order:
//!
//! - `<error>` absorbs everything so one bad arm reports once;
//! - identical types join to themselves;
//! - `never` joins to the other side;
//! - `none` with `T` gives `?T` (or `T` when it already is an option);
//! - `T` with `?T` gives `?T`;
//! - `nil` with a pointer gives the pointer;
//! - otherwise the interfaces both sides implement: exactly one is the
//!   answer, several is ambiguous, none is incompatible.
//!
//! The joined type never depends on argument order.

use crate::{TypeData, TypeId, TypeTable};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum LubError {
    /// More than one common interface. Candidates are sorted by id.
    Ambiguous { candidates: Vec<TypeId> },
    Incompatible { left: TypeId, right: TypeId },
}

pub struct LubResolver<'a> {
    table: &'a TypeTable,
}

impl<'a> LubResolver<'a> {
    pub fn new(table: &'a TypeTable) -> Self {
        LubResolver { table }
    }

    pub fn lub(&self, a: TypeId, b: TypeId) -> Result<TypeId, LubError> {
        if a.is_error() || b.is_error() {
            return Ok(TypeId::ERROR);
        }
        if a == b {
            return Ok(a);
        }
        if a.is_never() {
            return Ok(b);
        }
        if b.is_never() {
            return Ok(a);
        }
        if let Some(joined) = self.join_untyped(a, b).or_else(|| self.join_untyped(b, a)) {
            return Ok(joined);
        }
        if self.table.option_inner(a) == Some(b) {
            return Ok(a);
        }
        if self.table.option_inner(b) == Some(a) {
            return Ok(b);
        }
        self.common_interface(a, b)
    }

    /// Fold over all arm types left to right. Empty input joins to `never`.
    pub fn lub_all(&self, types: &[TypeId]) -> Result<TypeId, LubError> {
        types
            .iter()
            .try_fold(TypeId::NEVER, |acc, &ty| self.lub(acc, ty))
    }

    /// `none` or `nil` on the left meeting a typed right side.
    fn join_untyped(&self, untyped: TypeId, other: TypeId) -> Option<TypeId> {
        if other.is_untyped() {
            return None;
        }
        match untyped {
            TypeId::UNTYPED_NONE => Some(match self.table.option_inner(other) {
                Some(_) => other,
                None => self.table.interner().option(other),
            }),
            TypeId::UNTYPED_NIL
                if matches!(self.table.lookup(other), TypeData::Pointer { .. }) =>
            {
                Some(other)
            }
            _ => None,
        }
    }

    fn common_interface(&self, a: TypeId, b: TypeId) -> Result<TypeId, LubError> {
        let right = self.table.interfaces_of(b);
        let mut common: Vec<TypeId> = self
            .table
            .interfaces_of(a)
            .into_iter()
            .filter(|i| right.contains(i))
            .collect();
        // Sorted so the outcome is the same for `(a, b)` and `(b, a)`.
        common.sort_unstable();
        common.dedup();
        match common.as_slice() {
            [] => Err(LubError::Incompatible { left: a, right: b }),
            [only] => Ok(*only),
            _ => {
                tracing::debug!(?a, ?b, candidates = common.len(), "ambiguous branch join");
                Err(LubError::Ambiguous { candidates: common })
            }
        }
    }
}

#[cfg(test)]
mod tests;
