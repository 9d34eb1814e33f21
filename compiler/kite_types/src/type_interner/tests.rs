use std::thread;

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn pre_interned_ids_are_fixed() {
    let interner = TypeInterner::new();
    assert_eq!(interner.intern(TypeData::Primitive(Primitive::I32)), TypeId::I32);
    assert_eq!(interner.intern(TypeData::Unit), TypeId::UNIT);
    assert_eq!(interner.intern(TypeData::UntypedNil), TypeId::UNTYPED_NIL);
    assert_eq!(interner.lookup(TypeId::STRING), TypeData::Primitive(Primitive::String));
    assert_eq!(interner.lookup(TypeId::NEVER), TypeData::Never);
}

#[test]
fn structurally_equal_types_share_an_id() {
    let interner = TypeInterner::new();
    let a = interner.dyn_array(TypeId::I32);
    let b = interner.dyn_array(TypeId::I32);
    let c = interner.dyn_array(TypeId::I64);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.lookup(a), TypeData::DynArray(TypeId::I32));
}

#[test]
fn fixed_array_length_is_part_of_identity() {
    let interner = TypeInterner::new();
    assert_ne!(
        interner.fixed_array(3, TypeId::U8),
        interner.fixed_array(4, TypeId::U8)
    );
}

#[test]
fn mutability_is_part_of_identity() {
    let interner = TypeInterner::new();
    assert_ne!(
        interner.reference(true, TypeId::I32),
        interner.reference(false, TypeId::I32)
    );
    assert_ne!(
        interner.reference(false, TypeId::I32),
        interner.pointer(false, TypeId::I32)
    );
}

#[test]
fn tuple_collapses_small_arities() {
    let interner = TypeInterner::new();
    assert_eq!(interner.tuple(&[]), TypeId::UNIT);
    assert_eq!(interner.tuple(&[TypeId::BOOL]), TypeId::BOOL);
    let pair = interner.tuple(&[TypeId::BOOL, TypeId::I32]);
    assert_eq!(
        interner.lookup(pair),
        TypeData::Tuple(vec![TypeId::BOOL, TypeId::I32].into())
    );
    assert_ne!(pair, interner.tuple(&[TypeId::I32, TypeId::BOOL]));
}

#[test]
fn union_is_canonical() {
    let interner = TypeInterner::new();
    let ab = interner.union(&[TypeId::I32, TypeId::STRING]);
    let ba = interner.union(&[TypeId::STRING, TypeId::I32, TypeId::I32]);
    assert_eq!(ab, ba);

    let nested = interner.union(&[ab, TypeId::BOOL]);
    let flat = interner.union(&[TypeId::BOOL, TypeId::I32, TypeId::STRING]);
    assert_eq!(nested, flat);

    assert_eq!(interner.union(&[]), TypeId::NEVER);
    assert_eq!(interner.union(&[TypeId::RUNE, TypeId::NEVER]), TypeId::RUNE);
}

#[test]
fn flags_propagate_from_children() {
    let interner = TypeInterner::new();
    let var = interner.fresh_var();
    let param = interner.param(kite_ir::Name::from_raw(7), 0);

    assert!(interner.flags(var).has_vars());
    assert!(interner.flags(interner.option(var)).has_vars());
    assert!(interner.flags(interner.map(TypeId::STRING, param)).has_params());
    assert!(interner.flags(interner.dyn_array(TypeId::ERROR)).has_errors());
    assert!(interner.flags(interner.dyn_array(TypeId::I32)).is_closed());
}

#[test]
fn fresh_vars_are_distinct() {
    let interner = TypeInterner::new();
    assert_ne!(interner.fresh_var(), interner.fresh_var());
}

#[test]
fn concurrent_interning_agrees() {
    let interner = SharedTypeInterner::new();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let interner = interner.clone();
            thread::spawn(move || {
                (0..64u64)
                    .map(|n| interner.fixed_array(n, TypeId::U8))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<Vec<TypeId>> = handles
        .into_iter()
        .map(|h| h.join().unwrap_or_default())
        .collect();
    for other in &results[1..] {
        assert_eq!(&results[0], other);
    }
}
