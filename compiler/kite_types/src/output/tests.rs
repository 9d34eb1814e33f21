use kite_ir::{ExprId, Span};
use pretty_assertions::assert_eq;

use super::*;
use crate::TypeErrorKind;

#[test]
fn expr_type_handles_unreached_and_out_of_range() {
    let typed = TypedModule {
        expr_types: vec![Some(TypeId::I32), None],
        ..TypedModule::default()
    };
    assert_eq!(typed.expr_type(ExprId::new(0)), Some(TypeId::I32));
    assert_eq!(typed.expr_type(ExprId::new(1)), None);
    assert_eq!(typed.expr_type(ExprId::new(7)), None);
    assert_eq!(typed.instantiation_of(ExprId::new(0)), None);
    assert!(!typed.has_errors());
}

#[test]
fn errors_mark_module() {
    let typed = TypedModule {
        errors: vec![TypeCheckError::new(Span::DUMMY, TypeErrorKind::UntypedLiteral)],
        ..TypedModule::default()
    };
    assert!(typed.has_errors());
}
