//! Declaration nodes.

use crate::{ExprId, Name, ParsedType, Span};

/// A generic parameter of a declaration.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct GenericParam {
    pub name: Name,
    pub kind: GenericParamKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum GenericParamKind {
    /// `T`, `T: I1 + I2`, `T = Default`
    Type {
        bounds: Vec<ParsedType>,
        default: Option<ParsedType>,
    },
    /// `const N as usize`
    Const { ty: ParsedType },
}

impl GenericParam {
    pub fn ty(name: Name, span: Span) -> Self {
        GenericParam {
            name,
            kind: GenericParamKind::Type {
                bounds: Vec::new(),
                default: None,
            },
            span,
        }
    }
}

/// A function parameter.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub name: Name,
    pub ty: ParsedType,
    pub mutable: bool,
    pub span: Span,
}

/// A top-level function.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Function {
    pub name: Name,
    pub generics: Vec<GenericParam>,
    pub params: Vec<Param>,
    /// When set, the last parameter is `...T`: its `ty` is the element type.
    pub variadic: bool,
    /// `None` means unit.
    pub ret: Option<ParsedType>,
    /// Invalid for bodiless (extern) declarations.
    pub body: ExprId,
    pub span: Span,
}

/// A method attached to a struct, enum or interface.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodDef {
    pub receiver_type: Name,
    pub receiver_name: Name,
    /// `fn (mut self T) name(...)`: the method may replace what the
    /// receiver holds.
    pub mut_receiver: bool,
    pub name: Name,
    pub params: Vec<Param>,
    pub ret: Option<ParsedType>,
    pub body: ExprId,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldDef {
    pub name: Name,
    pub ty: ParsedType,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct StructDef {
    pub name: Name,
    pub generics: Vec<GenericParam>,
    pub fields: Vec<FieldDef>,
    pub implements: Vec<ParsedType>,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumDef {
    pub name: Name,
    /// Backing integer type; `None` means `i32`.
    pub backing: Option<ParsedType>,
    pub variants: Vec<Name>,
    pub implements: Vec<ParsedType>,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct InterfaceDef {
    pub name: Name,
    pub generics: Vec<GenericParam>,
    /// The implementor set is closed: every implementor is declared in this
    /// module.
    pub sealed: bool,
    pub span: Span,
}

/// `type Name = Target`, including sum types `type Shape = Circle | Square`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct AliasDef {
    pub name: Name,
    pub target: ParsedType,
    pub span: Span,
}

/// `const NAME = value`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConstDef {
    pub name: Name,
    pub ty: Option<ParsedType>,
    pub value: ExprId,
    pub span: Span,
}

/// Every declaration of one compilation unit.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Module {
    pub functions: Vec<Function>,
    pub methods: Vec<MethodDef>,
    pub structs: Vec<StructDef>,
    pub enums: Vec<EnumDef>,
    pub interfaces: Vec<InterfaceDef>,
    pub aliases: Vec<AliasDef>,
    pub consts: Vec<ConstDef>,
}
