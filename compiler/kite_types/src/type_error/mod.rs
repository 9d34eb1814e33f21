//! Type checking errors.
//!
//! [`TypeCheckError`] is what the inference engine records: a span plus a
//! [`TypeErrorKind`] holding interned ids. Turning it into a
//! [`Diagnostic`] needs the table and the name interner to spell the types,
//! so that happens once at the end of checking, not at the error site.

use kite_diagnostic::{Diagnostic, ErrorCode};
use kite_ir::{BinaryOp, Name, Span, StringInterner};

use crate::lub::LubError;
use crate::solver::SolveError;
use crate::table::ResolveError;
use crate::{ConstValue, TypeId, TypeTable};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeCheckError {
    pub span: Span,
    pub kind: TypeErrorKind,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeErrorKind {
    Mismatch {
        expected: TypeId,
        found: TypeId,
    },
    UnknownType {
        name: Name,
    },
    UnknownIdent {
        name: Name,
    },
    ArgCountMismatch {
        expected: usize,
        found: usize,
        variadic: bool,
    },
    UnresolvedGeneric {
        param: Name,
    },
    ConflictingBinding {
        param: Name,
        first: TypeId,
        second: TypeId,
    },
    ConstraintViolation {
        param: Name,
        ty: TypeId,
        constraint: TypeId,
    },
    GenericArgCount {
        min: usize,
        max: usize,
        found: usize,
    },
    GenericArgKind {
        param: Name,
        expected_const: bool,
    },
    ConstDomain {
        param: Name,
        value: ConstValue,
        ty: TypeId,
    },
    ConstNotConstant {
        param: Name,
    },
    AmbiguousLub {
        candidates: Vec<TypeId>,
    },
    IncompatibleBranches {
        first: TypeId,
        second: TypeId,
    },
    /// `is` on a value whose static type cannot hold the target.
    InvalidNarrowingTarget {
        subject: TypeId,
        target: TypeId,
    },
    /// `is` that flow facts already rule out.
    ImpossibleTypeTest {
        subject: TypeId,
        target: TypeId,
    },
    UnknownMember {
        ty: TypeId,
        member: Name,
    },
    NotCallable {
        name: Name,
    },
    /// A struct literal naming something that is not a struct.
    NotAStruct {
        name: Name,
    },
    AssignToImmutable {
        name: Name,
    },
    DuplicateDefinition {
        name: Name,
    },
    /// `none`, `nil` or an empty literal with nothing to take a type from.
    UntypedLiteral,
    /// `== none` on something that is not an option.
    NotAnOption {
        found: TypeId,
    },
    InvalidOperands {
        op: BinaryOp,
        left: TypeId,
        right: TypeId,
    },
    InvalidOperand {
        op: &'static str,
        operand: TypeId,
    },
    NotIndexable {
        ty: TypeId,
    },
    /// A non-interface type in an `implements` list.
    NotAnInterface {
        ty: TypeId,
    },
    ControlOutsideLoop {
        keyword: &'static str,
    },
    Internal {
        message: String,
    },
}

impl From<SolveError> for TypeErrorKind {
    fn from(err: SolveError) -> Self {
        match err {
            SolveError::Unresolved { param } => TypeErrorKind::UnresolvedGeneric { param },
            SolveError::Conflicting {
                param,
                first,
                second,
            } => TypeErrorKind::ConflictingBinding {
                param,
                first,
                second,
            },
            SolveError::ConstraintViolation {
                param,
                ty,
                constraint,
            } => TypeErrorKind::ConstraintViolation {
                param,
                ty,
                constraint,
            },
            SolveError::GenericArgCount { min, max, found } => {
                TypeErrorKind::GenericArgCount { min, max, found }
            }
            SolveError::GenericArgKind {
                param,
                expected_const,
            } => TypeErrorKind::GenericArgKind {
                param,
                expected_const,
            },
            SolveError::ConstDomain { param, value, ty } => {
                TypeErrorKind::ConstDomain { param, value, ty }
            }
            SolveError::ConstNotConstant { param } => TypeErrorKind::ConstNotConstant { param },
        }
    }
}

impl From<LubError> for TypeErrorKind {
    fn from(err: LubError) -> Self {
        match err {
            LubError::Ambiguous { candidates } => TypeErrorKind::AmbiguousLub { candidates },
            LubError::Incompatible { left, right } => TypeErrorKind::IncompatibleBranches {
                first: left,
                second: right,
            },
        }
    }
}

impl From<ResolveError> for TypeErrorKind {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UnknownType { name } => TypeErrorKind::UnknownType { name },
            ResolveError::GenericArgCount {
                min, max, found, ..
            } => TypeErrorKind::GenericArgCount { min, max, found },
            ResolveError::ConstArgExpected { param, .. } => TypeErrorKind::GenericArgKind {
                param,
                expected_const: true,
            },
        }
    }
}

impl TypeErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            TypeErrorKind::Mismatch { .. }
            | TypeErrorKind::NotAnOption { .. }
            | TypeErrorKind::NotAnInterface { .. } => ErrorCode::E2001,
            TypeErrorKind::UnknownType { .. } | TypeErrorKind::NotAStruct { .. } => {
                ErrorCode::E2002
            }
            TypeErrorKind::UnknownIdent { .. } => ErrorCode::E2003,
            TypeErrorKind::ArgCountMismatch { .. } => ErrorCode::E2004,
            TypeErrorKind::UnresolvedGeneric { .. } => ErrorCode::E2005,
            TypeErrorKind::ConflictingBinding { .. } => ErrorCode::E2006,
            TypeErrorKind::ConstraintViolation { .. } => ErrorCode::E2007,
            TypeErrorKind::GenericArgCount { .. } | TypeErrorKind::GenericArgKind { .. } => {
                ErrorCode::E2008
            }
            TypeErrorKind::ConstDomain { .. } => ErrorCode::E2009,
            TypeErrorKind::ConstNotConstant { .. } => ErrorCode::E2010,
            TypeErrorKind::AmbiguousLub { .. } => ErrorCode::E2011,
            TypeErrorKind::IncompatibleBranches { .. } => ErrorCode::E2012,
            TypeErrorKind::InvalidNarrowingTarget { .. } => ErrorCode::E2013,
            TypeErrorKind::ImpossibleTypeTest { .. } => ErrorCode::E2014,
            TypeErrorKind::UnknownMember { .. } => ErrorCode::E2015,
            TypeErrorKind::NotCallable { .. } => ErrorCode::E2016,
            TypeErrorKind::AssignToImmutable { .. } => ErrorCode::E2017,
            TypeErrorKind::DuplicateDefinition { .. } => ErrorCode::E2018,
            TypeErrorKind::UntypedLiteral => ErrorCode::E2019,
            TypeErrorKind::InvalidOperands { .. }
            | TypeErrorKind::InvalidOperand { .. }
            | TypeErrorKind::NotIndexable { .. } => ErrorCode::E2020,
            TypeErrorKind::ControlOutsideLoop { .. } => ErrorCode::E2021,
            TypeErrorKind::Internal { .. } => ErrorCode::E9001,
        }
    }
}

impl TypeCheckError {
    pub fn new(span: Span, kind: impl Into<TypeErrorKind>) -> Self {
        TypeCheckError {
            span,
            kind: kind.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    /// Render into a diagnostic record, spelling types in source syntax.
    #[expect(clippy::too_many_lines, reason = "one arm per error kind")]
    pub fn to_diagnostic(&self, table: &TypeTable, names: &StringInterner) -> Diagnostic {
        let ty = |id: TypeId| table.display(id, names);
        let name = |n: Name| names.lookup(n);
        let diag = Diagnostic::error(self.code());
        let span = self.span;

        match &self.kind {
            TypeErrorKind::Mismatch { expected, found } => diag
                .with_message(format!("expected `{}`, found `{}`", ty(*expected), ty(*found)))
                .with_label(span, format!("this is `{}`", ty(*found))),
            TypeErrorKind::UnknownType { name: n } => diag
                .with_message(format!("unknown type `{}`", name(*n)))
                .with_label(span, "not found in this scope"),
            TypeErrorKind::UnknownIdent { name: n } => diag
                .with_message(format!("unknown identifier `{}`", name(*n)))
                .with_label(span, "not found in this scope"),
            TypeErrorKind::ArgCountMismatch {
                expected,
                found,
                variadic,
            } => {
                let at_least = if *variadic { "at least " } else { "" };
                let s = if *expected == 1 { "" } else { "s" };
                diag.with_message(format!(
                    "expected {at_least}{expected} argument{s}, found {found}"
                ))
                .with_label(span, "wrong number of arguments")
            }
            TypeErrorKind::UnresolvedGeneric { param } => diag
                .with_message(format!("cannot infer type parameter `{}`", name(*param)))
                .with_label(span, "type parameter not constrained by any argument")
                .with_suggestion("pass the generic arguments explicitly"),
            TypeErrorKind::ConflictingBinding {
                param,
                first,
                second,
            } => diag
                .with_message(format!(
                    "conflicting types for parameter `{}`: `{}` vs `{}`",
                    name(*param),
                    ty(*first),
                    ty(*second)
                ))
                .with_label(span, "arguments disagree"),
            TypeErrorKind::ConstraintViolation {
                param,
                ty: bound,
                constraint,
            } => diag
                .with_message(format!(
                    "type `{}` does not satisfy constraint `{}`",
                    ty(*bound),
                    ty(*constraint)
                ))
                .with_label(span, format!("required by parameter `{}`", name(*param))),
            TypeErrorKind::GenericArgCount { min, max, found } => {
                let expected = if min == max {
                    format!("{max}")
                } else {
                    format!("{min} to {max}")
                };
                diag.with_message(format!(
                    "expected {expected} generic arguments, found {found}"
                ))
                .with_label(span, "wrong number of generic arguments")
            }
            TypeErrorKind::GenericArgKind {
                param,
                expected_const,
            } => {
                let what = if *expected_const { "a constant" } else { "a type" };
                diag.with_message(format!(
                    "generic parameter `{}` expects {what}",
                    name(*param)
                ))
                .with_label(span, "wrong kind of generic argument")
            }
            TypeErrorKind::ConstDomain {
                param,
                value,
                ty: const_ty,
            } => diag
                .with_message(format!(
                    "`{value}` is out of range for `{}` parameter `{}`",
                    ty(*const_ty),
                    name(*param)
                ))
                .with_label(span, "value outside the parameter's type"),
            TypeErrorKind::ConstNotConstant { param } => diag
                .with_message(format!(
                    "argument for const parameter `{}` is not a compile-time constant",
                    name(*param)
                ))
                .with_label(span, "not known at compile time"),
            TypeErrorKind::AmbiguousLub { candidates } => {
                let list = candidates
                    .iter()
                    .map(|&c| format!("`{}`", ty(c)))
                    .collect::<Vec<_>>()
                    .join(", ");
                diag.with_message(format!("branches have several common interfaces: {list}"))
                    .with_label(span, "cannot pick one branch type")
                    .with_suggestion("annotate the expected type to disambiguate")
            }
            TypeErrorKind::IncompatibleBranches { first, second } => diag
                .with_message(format!(
                    "branches have incompatible types `{}` and `{}`",
                    ty(*first),
                    ty(*second)
                ))
                .with_label(span, "no common type"),
            TypeErrorKind::InvalidNarrowingTarget { subject, target } => diag
                .with_message(format!(
                    "a value of type `{}` can never be `{}`",
                    ty(*subject),
                    ty(*target)
                ))
                .with_label(span, "invalid type test"),
            TypeErrorKind::ImpossibleTypeTest { subject, target } => diag
                .with_message(format!(
                    "this value is never `{}` here (known: `{}`)",
                    ty(*target),
                    ty(*subject)
                ))
                .with_label(span, "already ruled out by an enclosing condition"),
            TypeErrorKind::UnknownMember { ty: owner, member } => diag
                .with_message(format!(
                    "no member `{}` on type `{}`",
                    name(*member),
                    ty(*owner)
                ))
                .with_label(span, "unknown member"),
            TypeErrorKind::NotCallable { name: n } => diag
                .with_message(format!("`{}` is not a function", name(*n)))
                .with_label(span, "not callable"),
            TypeErrorKind::NotAStruct { name: n } => diag
                .with_message(format!("`{}` is not a struct", name(*n)))
                .with_label(span, "cannot construct with a struct literal"),
            TypeErrorKind::AssignToImmutable { name: n } => diag
                .with_message(format!("cannot assign through immutable binding `{}`", name(*n)))
                .with_label(span, "binding is not `mut`"),
            TypeErrorKind::DuplicateDefinition { name: n } => diag
                .with_message(format!("`{}` is defined more than once", name(*n)))
                .with_label(span, "redefined here"),
            TypeErrorKind::UntypedLiteral => diag
                .with_message("cannot infer the type of this literal")
                .with_label(span, "add a type annotation"),
            TypeErrorKind::NotAnOption { found } => diag
                .with_message(format!(
                    "only option values compare with `none`, found `{}`",
                    ty(*found)
                ))
                .with_label(span, "not an option"),
            TypeErrorKind::InvalidOperands { op, left, right } => diag
                .with_message(format!(
                    "operator `{}` is not defined for `{}` and `{}`",
                    op.as_str(),
                    ty(*left),
                    ty(*right)
                ))
                .with_label(span, "invalid operands"),
            TypeErrorKind::InvalidOperand { op, operand } => diag
                .with_message(format!(
                    "operator `{op}` is not defined for `{}`",
                    ty(*operand)
                ))
                .with_label(span, "invalid operand"),
            TypeErrorKind::NotIndexable { ty: found } => diag
                .with_message(format!("cannot index into a value of type `{}`", ty(*found)))
                .with_label(span, "not indexable"),
            TypeErrorKind::NotAnInterface { ty: found } => diag
                .with_message(format!("`{}` is not an interface", ty(*found)))
                .with_label(span, "only interfaces can be implemented"),
            TypeErrorKind::ControlOutsideLoop { keyword } => diag
                .with_message(format!("`{keyword}` outside of a loop"))
                .with_label(span, "not inside a loop"),
            TypeErrorKind::Internal { message } => diag
                .with_message(format!("internal error: {message}"))
                .with_label(span, "here")
                .with_note("this is a bug in the type checker"),
        }
    }
}
