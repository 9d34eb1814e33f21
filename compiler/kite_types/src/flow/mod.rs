//! Flow-sensitive narrowing ("smart casts").
//!
//! A [`FlowEnvironment`] maps narrowable paths (a variable, or a chain of
//! field accesses off one) to what the enclosing conditions have proven
//! about them. [`FlowTypeTracker`] keeps one environment per open branch:
//! entering a branch pushes a copy of the current layer seeded with the
//! branch's facts, leaving it pops the layer, and the join point replaces
//! the current layer with the intersection of every reachable arm.
//!
//! Narrowing only ever refines a lookup. Forgetting a fact is always sound;
//! the declared type is the fallback.

use kite_ir::Name;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{TypeId, TypeTable};

/// A variable, or a chain of field accesses rooted at one, with no call in
/// between.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct NarrowPath {
    root: Name,
    fields: SmallVec<[Name; 2]>,
}

impl NarrowPath {
    pub fn var(root: Name) -> Self {
        NarrowPath {
            root,
            fields: SmallVec::new(),
        }
    }

    /// `self.field`.
    #[must_use]
    pub fn field(&self, field: Name) -> Self {
        let mut fields = self.fields.clone();
        fields.push(field);
        NarrowPath {
            root: self.root,
            fields,
        }
    }

    pub fn root(&self) -> Name {
        self.root
    }

    pub fn fields(&self) -> &[Name] {
        &self.fields
    }

    /// `self` is `prefix` or reached through it.
    pub fn starts_with(&self, prefix: &NarrowPath) -> bool {
        self.root == prefix.root && self.fields.starts_with(&prefix.fields)
    }
}

/// What a condition proves about a path in one branch.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Fact {
    /// The runtime type is exactly this type.
    Is(TypeId),
    /// The runtime type is not this type.
    IsNot(TypeId),
    NotNone,
    IsNone,
}

/// One fact about one path, with the path's declared type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FlowFact {
    pub path: NarrowPath,
    pub declared: TypeId,
    pub fact: Fact,
}

/// The refined view of one path.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Narrowing {
    pub declared: TypeId,
    /// Type to use on read.
    pub ty: TypeId,
    /// Runtime types proven impossible here, sorted.
    pub excluded: SmallVec<[TypeId; 4]>,
}

impl Narrowing {
    fn unrefined(declared: TypeId) -> Self {
        Narrowing {
            declared,
            ty: declared,
            excluded: SmallVec::new(),
        }
    }

    fn is_trivial(&self) -> bool {
        self.ty == self.declared && self.excluded.is_empty()
    }

    pub fn excludes(&self, ty: TypeId) -> bool {
        self.excluded.contains(&ty)
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct FlowEnvironment {
    entries: FxHashMap<NarrowPath, Narrowing>,
}

impl FlowEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &NarrowPath) -> Option<&Narrowing> {
        self.entries.get(path)
    }

    pub fn narrowed_type(&self, path: &NarrowPath) -> Option<TypeId> {
        self.entries.get(path).map(|n| n.ty)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record `fact` about `path`.
    pub fn apply(&mut self, path: &NarrowPath, declared: TypeId, fact: Fact, table: &TypeTable) {
        let mut narrowing = self
            .entries
            .get(path)
            .filter(|n| n.declared == declared)
            .cloned()
            .unwrap_or_else(|| Narrowing::unrefined(declared));

        match fact {
            Fact::Is(ty) => narrowing.ty = ty,
            Fact::IsNot(ty) => {
                if let Err(pos) = narrowing.excluded.binary_search(&ty) {
                    narrowing.excluded.insert(pos, ty);
                }
                // An option proven present is tested as its payload.
                let base = match table.option_inner(declared) {
                    Some(inner) if table.option_inner(narrowing.ty).is_none() => inner,
                    _ => declared,
                };
                if let Some(members) = table.exhaustive_members(base) {
                    let remaining: Vec<TypeId> = members
                        .into_iter()
                        .filter(|m| !narrowing.excludes(*m))
                        .collect();
                    match remaining.as_slice() {
                        [] => narrowing.ty = TypeId::NEVER,
                        [only] => narrowing.ty = *only,
                        _ if table.is_union(base) => {
                            narrowing.ty = table.interner().union(&remaining);
                        }
                        _ => {}
                    }
                }
            }
            Fact::NotNone => {
                if let Some(inner) = table.option_inner(narrowing.ty) {
                    narrowing.ty = inner;
                }
            }
            Fact::IsNone => {}
        }

        if narrowing.is_trivial() {
            self.entries.remove(path);
        } else {
            self.entries.insert(path.clone(), narrowing);
        }
    }

    /// Forget `path` and every path reached through it.
    pub fn invalidate(&mut self, path: &NarrowPath) {
        self.entries.retain(|p, _| !p.starts_with(path));
    }

    /// Narrowings that hold on both sides. Differing refined types widen to
    /// whichever side accepts the other, and excluded sets are intersected.
    #[must_use]
    pub fn merge(&self, other: &FlowEnvironment, table: &TypeTable) -> FlowEnvironment {
        let entries = self
            .entries
            .iter()
            .filter_map(|(path, mine)| {
                let theirs = other.entries.get(path)?;
                if mine.declared != theirs.declared {
                    return None;
                }
                let ty = if mine.ty == theirs.ty || table.assignable(theirs.ty, mine.ty) {
                    mine.ty
                } else if table.assignable(mine.ty, theirs.ty) {
                    theirs.ty
                } else {
                    return None;
                };
                let merged = Narrowing {
                    declared: mine.declared,
                    ty,
                    excluded: mine
                        .excluded
                        .iter()
                        .copied()
                        .filter(|t| theirs.excludes(*t))
                        .collect(),
                };
                (!merged.is_trivial()).then(|| (path.clone(), merged))
            })
            .collect();
        FlowEnvironment { entries }
    }
}

/// How one arm of a branch ended.
#[derive(Clone, Debug)]
pub struct BranchOutcome {
    pub env: FlowEnvironment,
    /// The arm never falls through (`return`, `break`, `continue`, or an
    /// expression of type `never`).
    pub terminal: bool,
}

/// Stack of flow layers for one function body.
#[derive(Clone, Debug)]
pub struct FlowTypeTracker {
    stack: Vec<FlowEnvironment>,
}

impl Default for FlowTypeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowTypeTracker {
    pub fn new() -> Self {
        FlowTypeTracker {
            stack: vec![FlowEnvironment::new()],
        }
    }

    pub fn current(&self) -> &FlowEnvironment {
        // The entry layer is never popped.
        &self.stack[self.stack.len() - 1]
    }

    fn current_mut(&mut self) -> &mut FlowEnvironment {
        let top = self.stack.len() - 1;
        &mut self.stack[top]
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn narrowing(&self, path: &NarrowPath) -> Option<&Narrowing> {
        self.current().get(path)
    }

    pub fn narrowed(&self, path: &NarrowPath) -> Option<TypeId> {
        self.current().narrowed_type(path)
    }

    /// Record facts in the current layer, e.g. after a guard clause.
    pub fn apply(&mut self, facts: &[FlowFact], table: &TypeTable) {
        let env = self.current_mut();
        for f in facts {
            env.apply(&f.path, f.declared, f.fact, table);
        }
    }

    /// Enter a branch in which `facts` hold.
    pub fn push_branch(&mut self, facts: &[FlowFact], table: &TypeTable) {
        let mut layer = self.current().clone();
        for f in facts {
            layer.apply(&f.path, f.declared, f.fact, table);
        }
        tracing::debug!(depth = self.stack.len(), facts = facts.len(), "push flow branch");
        self.stack.push(layer);
    }

    /// Leave the innermost branch, returning its final state.
    pub fn pop_branch(&mut self) -> FlowEnvironment {
        if self.stack.len() > 1 {
            self.stack.pop().unwrap_or_default()
        } else {
            tracing::error!("pop of the function entry flow layer");
            self.current().clone()
        }
    }

    /// Replace the current layer with what holds after every non-terminal
    /// arm. If every arm is terminal the code after the join is unreachable
    /// and the layer is left alone.
    pub fn join(&mut self, outcomes: Vec<BranchOutcome>, table: &TypeTable) {
        let mut live = outcomes.into_iter().filter(|o| !o.terminal).map(|o| o.env);
        let Some(first) = live.next() else {
            return;
        };
        let merged = live.fold(first, |acc, env| acc.merge(&env, table));
        tracing::debug!(narrowed = merged.len(), "join flow branches");
        *self.current_mut() = merged;
    }

    /// A write through `path` (or a call that may replace it).
    pub fn invalidate(&mut self, path: &NarrowPath) {
        self.current_mut().invalidate(path);
    }
}

#[cfg(test)]
mod tests;
