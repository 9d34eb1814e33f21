use pretty_assertions::assert_eq;

use super::*;
use crate::test_support::zoo;

#[test]
fn none_joins_to_option_in_either_order() {
    let z = zoo();
    let lub = LubResolver::new(&z.table);
    let opt_i32 = z.table.interner().option(TypeId::I32);
    assert_eq!(lub.lub(TypeId::UNTYPED_NONE, TypeId::I32), Ok(opt_i32));
    assert_eq!(lub.lub(TypeId::I32, TypeId::UNTYPED_NONE), Ok(opt_i32));
    assert_eq!(lub.lub(opt_i32, TypeId::UNTYPED_NONE), Ok(opt_i32));
}

#[test]
fn value_joins_with_its_option() {
    let z = zoo();
    let lub = LubResolver::new(&z.table);
    let opt = z.table.interner().option(z.dog);
    assert_eq!(lub.lub(z.dog, opt), Ok(opt));
    assert_eq!(lub.lub(opt, z.dog), Ok(opt));
}

#[test]
fn never_yields_the_other_side() {
    let z = zoo();
    let lub = LubResolver::new(&z.table);
    assert_eq!(lub.lub(TypeId::NEVER, TypeId::STRING), Ok(TypeId::STRING));
    assert_eq!(lub.lub(z.cat, TypeId::NEVER), Ok(z.cat));
}

#[test]
fn nil_joins_with_pointer_only() {
    let z = zoo();
    let lub = LubResolver::new(&z.table);
    let ptr = z.table.interner().pointer(false, TypeId::U8);
    assert_eq!(lub.lub(TypeId::UNTYPED_NIL, ptr), Ok(ptr));
    assert_eq!(lub.lub(ptr, TypeId::UNTYPED_NIL), Ok(ptr));
    assert_eq!(
        lub.lub(TypeId::UNTYPED_NIL, TypeId::I32),
        Err(LubError::Incompatible {
            left: TypeId::UNTYPED_NIL,
            right: TypeId::I32,
        })
    );
}

#[test]
fn single_common_interface_wins() {
    let z = zoo();
    let lub = LubResolver::new(&z.table);
    assert_eq!(lub.lub(z.dog, z.bird), Ok(z.animal));
    assert_eq!(lub.lub(z.bird, z.dog), Ok(z.animal));
    // An implementor joined with its interface.
    assert_eq!(lub.lub(z.pet, z.cat), Ok(z.pet));
}

#[test]
fn several_common_interfaces_are_ambiguous() {
    let z = zoo();
    let lub = LubResolver::new(&z.table);
    let mut candidates = vec![z.animal, z.pet];
    candidates.sort_unstable();
    let expected = Err(LubError::Ambiguous { candidates });
    assert_eq!(lub.lub(z.dog, z.cat), expected);
    assert_eq!(lub.lub(z.cat, z.dog), expected);
}

#[test]
fn incompatible_keeps_source_order() {
    let z = zoo();
    let lub = LubResolver::new(&z.table);
    assert_eq!(
        lub.lub(TypeId::STRING, TypeId::I32),
        Err(LubError::Incompatible {
            left: TypeId::STRING,
            right: TypeId::I32,
        })
    );
    assert_eq!(
        lub.lub(TypeId::I32, TypeId::STRING),
        Err(LubError::Incompatible {
            left: TypeId::I32,
            right: TypeId::STRING,
        })
    );
}

#[test]
fn error_absorbs() {
    let z = zoo();
    let lub = LubResolver::new(&z.table);
    assert_eq!(lub.lub(TypeId::ERROR, TypeId::I32), Ok(TypeId::ERROR));
    assert_eq!(lub.lub(z.dog, TypeId::ERROR), Ok(TypeId::ERROR));
}

#[test]
fn folds_all_arms() {
    let z = zoo();
    let lub = LubResolver::new(&z.table);
    assert_eq!(lub.lub_all(&[]), Ok(TypeId::NEVER));
    assert_eq!(
        lub.lub_all(&[TypeId::I64, TypeId::NEVER, TypeId::UNTYPED_NONE]),
        Ok(z.table.interner().option(TypeId::I64))
    );
    assert_eq!(lub.lub_all(&[z.dog, z.bird, z.cat]), Ok(z.animal));
}
