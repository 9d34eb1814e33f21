//! Type annotations as written, before resolution.
//!
//! Built-in types (`i32`, `string`, `bool`, ...) are plain
//! [`ParsedType::Named`] entries; the type table recognises them by name.

use crate::Name;

/// A type expression from the source.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParsedType {
    /// `Name` or `Name[Args]`: a primitive, struct, enum, interface, alias,
    /// generic parameter, or (in generic argument position) a constant.
    Named { name: Name, type_args: Vec<ParsedType> },
    /// `*T` / `*mut T`
    Pointer { mutable: bool, inner: Box<ParsedType> },
    /// `&T` / `&mut T`
    Reference { mutable: bool, inner: Box<ParsedType> },
    /// `[N]T`
    FixedArray { len: u64, elem: Box<ParsedType> },
    /// `[]T`
    DynArray(Box<ParsedType>),
    /// `map[K]V`
    Map { key: Box<ParsedType>, value: Box<ParsedType> },
    /// `(A, B)`; `()` is unit.
    Tuple(Vec<ParsedType>),
    /// `fn (A, ...B) R`
    Function {
        params: Vec<ParsedType>,
        variadic: bool,
        ret: Box<ParsedType>,
    },
    /// `?T`
    Option(Box<ParsedType>),
    /// `Result[T, E]`
    Result { ok: Box<ParsedType>, err: Box<ParsedType> },
    /// `chan T`
    Channel(Box<ParsedType>),
    /// `A | B` (only meaningful as an alias target)
    Union(Vec<ParsedType>),
    /// `never`
    Never,
}

impl ParsedType {
    #[inline]
    pub fn named(name: Name) -> Self {
        ParsedType::Named {
            name,
            type_args: Vec::new(),
        }
    }

    #[inline]
    pub fn named_with_args(name: Name, type_args: Vec<ParsedType>) -> Self {
        ParsedType::Named { name, type_args }
    }

    #[inline]
    pub fn unit() -> Self {
        ParsedType::Tuple(Vec::new())
    }

    #[inline]
    pub fn dyn_array(elem: ParsedType) -> Self {
        ParsedType::DynArray(Box::new(elem))
    }

    #[inline]
    pub fn option(inner: ParsedType) -> Self {
        ParsedType::Option(Box::new(inner))
    }

    #[inline]
    pub fn reference(mutable: bool, inner: ParsedType) -> Self {
        ParsedType::Reference {
            mutable,
            inner: Box::new(inner),
        }
    }

    #[inline]
    pub fn pointer(mutable: bool, inner: ParsedType) -> Self {
        ParsedType::Pointer {
            mutable,
            inner: Box::new(inner),
        }
    }

    #[inline]
    pub fn map(key: ParsedType, value: ParsedType) -> Self {
        ParsedType::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    #[inline]
    pub fn result(ok: ParsedType, err: ParsedType) -> Self {
        ParsedType::Result {
            ok: Box::new(ok),
            err: Box::new(err),
        }
    }

    /// The bare name of a `Named` type without arguments.
    pub fn as_bare_name(&self) -> Option<Name> {
        match self {
            ParsedType::Named { name, type_args } if type_args.is_empty() => Some(*name),
            _ => None,
        }
    }
}
