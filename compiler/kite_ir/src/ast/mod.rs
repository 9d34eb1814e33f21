//! Expression and statement nodes.
//!
//! Children are [`ExprId`]s into the owning [`ExprArena`](crate::ExprArena);
//! lists are ranges into the arena's side tables.

mod items;

pub use items::{
    AliasDef, ConstDef, EnumDef, FieldDef, Function, GenericParam, GenericParamKind, InterfaceDef,
    MethodDef, Module, Param, StructDef,
};

use crate::expr_id::define_range;
use crate::{ExprId, ExprRange, Name, ParsedType, Span};

define_range!(
    /// Statements of a block.
    StmtRange
);
define_range!(
    /// Arms of a `match`.
    ArmRange
);
define_range!(
    /// Field initializers of a struct literal.
    FieldInitRange
);
define_range!(
    /// Entries of a map literal.
    MapEntryRange
);
define_range!(
    /// Explicit generic arguments at a call or construction site.
    GenericArgRange
);

/// An expression node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// Expression kinds.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// Untyped integer literal.
    Int(i64),
    /// Untyped float literal, stored as bits for `Hash`.
    Float(u64),
    Bool(bool),
    Str(Name),
    Rune(char),
    /// The untyped `none` literal.
    NoneLit,
    /// The untyped `nil` literal.
    Nil,

    Ident(Name),
    /// `Enum.variant`
    EnumVariant { enum_name: Name, variant: Name },
    /// `receiver.field`
    Field { receiver: ExprId, field: Name },
    /// `receiver[index]`
    Index { receiver: ExprId, index: ExprId },
    Unary { op: UnaryOp, operand: ExprId },
    Binary { op: BinaryOp, left: ExprId, right: ExprId },

    /// `callee[generic_args](args)`
    Call {
        callee: Name,
        generic_args: GenericArgRange,
        args: ExprRange,
    },
    /// `receiver.method(args)`
    MethodCall {
        receiver: ExprId,
        method: Name,
        args: ExprRange,
    },
    /// An argument passed as `mut x`.
    MutArg(ExprId),
    /// `&x` / `&mut x`
    Ref { mutable: bool, operand: ExprId },

    /// `Name[generic_args]{ field: value, ... }`
    StructLit {
        name: Name,
        generic_args: GenericArgRange,
        fields: FieldInitRange,
    },
    /// `[a, b, c]`
    ArrayLit(ExprRange),
    /// `{ k: v, ... }`
    MapLit(MapEntryRange),
    /// `(a, b)`
    Tuple(ExprRange),

    /// `operand is T` / `operand !is T`
    Is {
        operand: ExprId,
        ty: ParsedType,
        negated: bool,
    },
    /// `operand == none` / `operand != none`
    NoneCheck { operand: ExprId, negated: bool },

    /// `if cond { then } else { else }`; `else_branch` may be invalid.
    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },
    /// `if binding := value { then } else { else }`
    IfGuard {
        binding: Name,
        value: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },
    /// `match scrutinee { arms... else { else } }`
    Match {
        scrutinee: ExprId,
        arms: ArmRange,
        else_branch: ExprId,
    },

    /// `{ stmts; result }`; `result` may be invalid.
    Block { stmts: StmtRange, result: ExprId },
    /// `return value`; `value` may be invalid.
    Return(ExprId),
    Break,
    Continue,
    /// `for cond { body }`; an invalid `cond` is an infinite loop.
    Loop { cond: ExprId, body: ExprId },
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// A statement inside a block.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    /// `name := init` / `mut name := init` / `name: T := init`
    Let {
        name: Name,
        mutable: bool,
        ty: Option<ParsedType>,
        init: ExprId,
    },
    /// `target = value`
    Assign { target: ExprId, value: ExprId },
    Expr(ExprId),
}

/// One `match` arm.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MatchArm {
    pub pattern: MatchPattern,
    pub body: ExprId,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum MatchPattern {
    /// A value compared against the scrutinee.
    Value(ExprId),
    /// A type the scrutinee is tested against (`Dog { ... }`).
    Type(ParsedType),
}

/// `field: value` in a struct literal.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldInit {
    pub name: Name,
    pub value: ExprId,
    pub span: Span,
}

/// `key: value` in a map literal.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MapEntry {
    pub key: ExprId,
    pub value: ExprId,
    pub span: Span,
}

/// One explicit generic argument.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum GenericArg {
    Type(ParsedType),
    /// A value argument for a const generic parameter.
    Const(ExprId),
}
