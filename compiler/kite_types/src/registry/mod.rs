//! Declaration registry.
//!
//! Holds what the registration pass learns from struct, enum, interface,
//! alias, function, method and constant declarations. Filled once before any
//! body is checked; read-only afterwards.

use kite_ir::{Name, Span};
use rustc_hash::FxHashMap;

use crate::{ConstValue, DeclId, TypeId};

/// One declared generic parameter.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct GenericParamDef {
    pub name: Name,
    /// Position in the owning declaration's parameter list.
    pub index: u32,
    pub kind: GenericParamDefKind,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum GenericParamDefKind {
    Type {
        /// Interfaces the binding must satisfy.
        constraints: Vec<TypeId>,
        default: Option<TypeId>,
    },
    /// Restricted to integer, `bool` and `rune` types.
    Const { ty: TypeId },
}

impl GenericParamDef {
    pub fn is_const(&self) -> bool {
        matches!(self.kind, GenericParamDefKind::Const { .. })
    }

    pub fn default(&self) -> Option<TypeId> {
        match &self.kind {
            GenericParamDefKind::Type { default, .. } => *default,
            GenericParamDefKind::Const { .. } => None,
        }
    }

    pub fn constraints(&self) -> &[TypeId] {
        match &self.kind {
            GenericParamDefKind::Type { constraints, .. } => constraints,
            GenericParamDefKind::Const { .. } => &[],
        }
    }
}

/// Ordered generic parameters of a declaration. Immutable once registered.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct GenericParams(Vec<GenericParamDef>);

impl GenericParams {
    pub fn new(params: Vec<GenericParamDef>) -> Self {
        GenericParams(params)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GenericParamDef> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&GenericParamDef> {
        self.0.get(index)
    }

    pub fn find(&self, name: Name) -> Option<&GenericParamDef> {
        self.0.iter().find(|p| p.name == name)
    }

    pub fn as_slice(&self) -> &[GenericParamDef] {
        &self.0
    }

    /// Parameters an explicit argument list must cover: those before the
    /// first trailing run of defaulted type parameters.
    pub fn required_count(&self) -> usize {
        self.0
            .iter()
            .rposition(|p| p.default().is_none())
            .map_or(0, |i| i + 1)
    }
}

impl<'a> IntoIterator for &'a GenericParams {
    type Item = &'a GenericParamDef;
    type IntoIter = std::slice::Iter<'a, GenericParamDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParamSig {
    pub name: Name,
    pub ty: TypeId,
    pub mutable: bool,
}

/// Signature of a function or method.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionSig {
    pub name: Name,
    pub generics: GenericParams,
    /// For variadic signatures the last entry's `ty` is the element type.
    pub params: Vec<ParamSig>,
    pub variadic: bool,
    pub ret: TypeId,
    pub span: Span,
}

impl FunctionSig {
    /// Parameter type expected at argument position `index`, accounting for
    /// the variadic tail.
    pub fn param_type_at(&self, index: usize) -> Option<TypeId> {
        if index < self.min_args() {
            self.params.get(index).map(|p| p.ty)
        } else if self.variadic {
            self.params.last().map(|p| p.ty)
        } else {
            None
        }
    }

    /// Minimum number of arguments.
    pub fn min_args(&self) -> usize {
        if self.variadic {
            self.params.len().saturating_sub(1)
        } else {
            self.params.len()
        }
    }

    pub fn accepts_arg_count(&self, count: usize) -> bool {
        if self.variadic {
            count >= self.min_args()
        } else {
            count == self.params.len()
        }
    }
}

/// A method attached to a declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodSig {
    pub receiver: DeclId,
    /// The method may replace what the receiver holds.
    pub mut_receiver: bool,
    pub sig: FunctionSig,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct StructInfo {
    pub fields: Vec<(Name, TypeId)>,
    /// Interface types, possibly mentioning the struct's own parameters.
    pub implements: Vec<TypeId>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumInfo {
    pub backing: TypeId,
    pub variants: Vec<Name>,
    pub implements: Vec<TypeId>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct InterfaceInfo {
    pub sealed: bool,
    /// Structs and enums listing this interface, in declaration order.
    pub implementors: Vec<DeclId>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    Struct(StructInfo),
    Enum(EnumInfo),
    Interface(InterfaceInfo),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DeclInfo {
    pub name: Name,
    pub generics: GenericParams,
    pub kind: DeclKind,
    pub span: Span,
}

impl DeclInfo {
    pub fn implements(&self) -> &[TypeId] {
        match &self.kind {
            DeclKind::Struct(s) => &s.implements,
            DeclKind::Enum(e) => &e.implements,
            DeclKind::Interface(_) => &[],
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, DeclKind::Interface(_))
    }
}

/// What a type name refers to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeDef {
    Decl(DeclId),
    /// Aliases are transparent: the name stands for this type.
    Alias(TypeId),
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConstInfo {
    pub ty: TypeId,
    /// `None` when the initializer is not a compile-time literal.
    pub value: Option<ConstValue>,
    pub span: Span,
}

#[derive(Clone, Debug, Default)]
pub struct DeclRegistry {
    decls: Vec<DeclInfo>,
    types: FxHashMap<Name, TypeDef>,
    functions: FxHashMap<Name, FunctionSig>,
    methods: FxHashMap<(DeclId, Name), MethodSig>,
    consts: FxHashMap<Name, ConstInfo>,
}

impl DeclRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration under `name`, replacing nothing.
    ///
    /// Returns `None` if the name is already a type.
    pub fn add_decl(&mut self, info: DeclInfo) -> Option<DeclId> {
        if self.types.contains_key(&info.name) {
            return None;
        }
        let id = DeclId(u32::try_from(self.decls.len()).ok()?);
        self.types.insert(info.name, TypeDef::Decl(id));
        self.decls.push(info);
        Some(id)
    }

    /// Returns `false` if the name is already a type.
    pub fn add_alias(&mut self, name: Name, target: TypeId) -> bool {
        if self.types.contains_key(&name) {
            return false;
        }
        self.types.insert(name, TypeDef::Alias(target));
        true
    }

    /// Returns `false` if a function of that name exists.
    pub fn add_function(&mut self, sig: FunctionSig) -> bool {
        if self.functions.contains_key(&sig.name) {
            return false;
        }
        self.functions.insert(sig.name, sig);
        true
    }

    /// Returns `false` if the receiver already has that method.
    pub fn add_method(&mut self, method: MethodSig) -> bool {
        let key = (method.receiver, method.sig.name);
        if self.methods.contains_key(&key) {
            return false;
        }
        self.methods.insert(key, method);
        true
    }

    /// Returns `false` if a constant of that name exists.
    pub fn add_const(&mut self, name: Name, info: ConstInfo) -> bool {
        if self.consts.contains_key(&name) {
            return false;
        }
        self.consts.insert(name, info);
        true
    }

    pub fn decl(&self, id: DeclId) -> &DeclInfo {
        &self.decls[id.index()]
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut DeclInfo {
        &mut self.decls[id.index()]
    }

    pub fn decls(&self) -> impl Iterator<Item = (DeclId, &DeclInfo)> {
        (0u32..).map(DeclId).zip(self.decls.iter())
    }

    pub fn type_def(&self, name: Name) -> Option<TypeDef> {
        self.types.get(&name).copied()
    }

    pub fn function(&self, name: Name) -> Option<&FunctionSig> {
        self.functions.get(&name)
    }

    pub fn method(&self, receiver: DeclId, name: Name) -> Option<&MethodSig> {
        self.methods.get(&(receiver, name))
    }

    /// Whether any receiver has a method `name` with a `mut` receiver. Used
    /// where the receiver's type is not known yet.
    pub fn any_mut_receiver(&self, name: Name) -> bool {
        self.methods
            .iter()
            .any(|((_, method), sig)| *method == name && sig.mut_receiver)
    }

    pub fn constant(&self, name: Name) -> Option<&ConstInfo> {
        self.consts.get(&name)
    }
}
