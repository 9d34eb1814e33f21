//! Instantiation failures.

use kite_ir::Name;

use crate::{ConstValue, TypeId};

/// Why a call or construction site could not be instantiated.
///
/// Solving is all-or-nothing: any of these means no binding from the
/// attempt is kept.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum SolveError {
    /// No equation bound the parameter and it has no default.
    Unresolved { param: Name },
    /// Two equations bound the parameter to different types.
    Conflicting {
        param: Name,
        first: TypeId,
        second: TypeId,
    },
    /// The bound type does not satisfy one of the parameter's interfaces.
    ConstraintViolation {
        param: Name,
        ty: TypeId,
        constraint: TypeId,
    },
    /// Too many explicit arguments, or too few with no defaults to cover
    /// the rest.
    GenericArgCount {
        min: usize,
        max: usize,
        found: usize,
    },
    /// A type given for a const parameter or a value for a type parameter.
    GenericArgKind { param: Name, expected_const: bool },
    /// A const argument outside the parameter's declared type.
    ConstDomain {
        param: Name,
        value: ConstValue,
        ty: TypeId,
    },
    /// A const argument that is not a compile-time constant.
    ConstNotConstant { param: Name },
}
