//! Structural payload of interned types.

use std::fmt;

use kite_ir::Name;

use crate::{DeclId, Primitive, TypeId, TypeVar};

/// A compile-time constant usable as a const generic argument.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstValue {
    Int(i128),
    Bool(bool),
    Rune(char),
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(n) => write!(f, "{n}"),
            ConstValue::Bool(b) => write!(f, "{b}"),
            ConstValue::Rune(c) => write!(f, "`{c}`"),
        }
    }
}

/// Interned type data.
///
/// Constructors on [`TypeInterner`](crate::TypeInterner) canonicalize
/// tuples and unions before interning; build those through them rather than
/// interning the variants directly.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeData {
    Primitive(Primitive),
    Unit,
    Never,
    Error,
    UntypedNone,
    UntypedNil,

    Pointer { mutable: bool, inner: TypeId },
    Reference { mutable: bool, inner: TypeId },
    FixedArray { len: u64, elem: TypeId },
    DynArray(TypeId),
    Map { key: TypeId, value: TypeId },
    /// Two or more elements.
    Tuple(Box<[TypeId]>),
    /// Parameter names are not part of the type.
    Function {
        params: Box<[TypeId]>,
        variadic: bool,
        ret: TypeId,
    },
    Option(TypeId),
    Result { ok: TypeId, err: TypeId },
    Channel(TypeId),

    /// An instantiated struct or enum.
    Named { decl: DeclId, args: Box<[TypeId]> },
    /// An instantiated interface.
    Interface { decl: DeclId, args: Box<[TypeId]> },
    /// Sorted, deduplicated, flattened; two or more members.
    Union(Box<[TypeId]>),

    /// Declared generic parameter; rigid inside its declaration.
    Param { name: Name, index: u32 },
    /// Solver variable; never escapes a solve.
    Var(TypeVar),
    /// Value of a const generic argument, e.g. the `4` in `Buf[4]`.
    Const(ConstValue),
}

impl TypeData {
    /// Immediate child types, in declaration order.
    pub fn children(&self) -> Vec<TypeId> {
        match self {
            TypeData::Primitive(_)
            | TypeData::Unit
            | TypeData::Never
            | TypeData::Error
            | TypeData::UntypedNone
            | TypeData::UntypedNil
            | TypeData::Param { .. }
            | TypeData::Var(_)
            | TypeData::Const(_) => Vec::new(),
            TypeData::Pointer { inner, .. }
            | TypeData::Reference { inner, .. }
            | TypeData::FixedArray { elem: inner, .. }
            | TypeData::DynArray(inner)
            | TypeData::Option(inner)
            | TypeData::Channel(inner) => vec![*inner],
            TypeData::Map { key, value } => vec![*key, *value],
            TypeData::Result { ok, err } => vec![*ok, *err],
            TypeData::Tuple(elems) | TypeData::Union(elems) => elems.to_vec(),
            TypeData::Function { params, ret, .. } => {
                let mut out = params.to_vec();
                out.push(*ret);
                out
            }
            TypeData::Named { args, .. } | TypeData::Interface { args, .. } => args.to_vec(),
        }
    }
}
