//! Lexical scopes for local bindings.

use std::rc::Rc;

use kite_ir::Name;
use rustc_hash::FxHashMap;

use crate::TypeId;

/// A local binding: a parameter or a `let`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Local {
    /// Declared type. Narrowing never changes this.
    pub ty: TypeId,
    pub mutable: bool,
}

#[derive(Clone, Debug, Default)]
struct TypeEnvInner {
    bindings: FxHashMap<Name, Local>,
    parent: Option<TypeEnv>,
}

/// Scope chain for one function body.
///
/// `Rc`-shared parents make [`TypeEnv::child`] O(1). Not `Send`: each body
/// builds its own.
#[derive(Clone, Debug, Default)]
pub struct TypeEnv(Rc<TypeEnvInner>);

impl TypeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn child(&self) -> Self {
        TypeEnv(Rc::new(TypeEnvInner {
            bindings: FxHashMap::default(),
            parent: Some(self.clone()),
        }))
    }

    /// The enclosing scope, if any.
    pub fn parent(&self) -> Option<TypeEnv> {
        self.0.parent.clone()
    }

    /// Bind in the current scope, shadowing outer bindings.
    pub fn bind(&mut self, name: Name, ty: TypeId, mutable: bool) {
        Rc::make_mut(&mut self.0)
            .bindings
            .insert(name, Local { ty, mutable });
    }

    pub fn lookup(&self, name: Name) -> Option<Local> {
        self.0
            .bindings
            .get(&name)
            .copied()
            .or_else(|| self.0.parent.as_ref().and_then(|p| p.lookup(name)))
    }

    /// Names bound directly in this scope.
    pub fn own_names(&self) -> impl Iterator<Item = Name> + '_ {
        self.0.bindings.keys().copied()
    }
}
