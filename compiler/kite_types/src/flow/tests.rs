use pretty_assertions::assert_eq;

use super::*;
use crate::test_support::zoo;

fn fact(path: &NarrowPath, declared: TypeId, fact: Fact) -> FlowFact {
    FlowFact {
        path: path.clone(),
        declared,
        fact,
    }
}

#[test]
fn paths_extend_and_prefix() {
    let z = zoo();
    let pet = NarrowPath::var(z.names.intern("pet"));
    let owner = pet.field(z.names.intern("owner"));
    let owner_name = owner.field(z.names.intern("name"));
    assert!(owner_name.starts_with(&pet));
    assert!(owner_name.starts_with(&owner));
    assert!(!pet.starts_with(&owner));
    assert!(!NarrowPath::var(z.names.intern("other")).starts_with(&pet));
    assert_eq!(owner_name.fields().len(), 2);
}

#[test]
fn is_fact_narrows_to_target() {
    let z = zoo();
    let s = NarrowPath::var(z.names.intern("s"));
    let mut env = FlowEnvironment::new();
    env.apply(&s, z.animal, Fact::Is(z.dog), &z.table);
    assert_eq!(env.narrowed_type(&s), Some(z.dog));
}

#[test]
fn negative_facts_accumulate_to_the_complement() {
    let z = zoo();
    let s = NarrowPath::var(z.names.intern("s"));
    let mut env = FlowEnvironment::new();

    env.apply(&s, z.animal, Fact::IsNot(z.dog), &z.table);
    // Two implementors left: stays the interface, but remembers Dog is out.
    assert_eq!(env.narrowed_type(&s), Some(z.animal));
    assert!(env.get(&s).is_some_and(|n| n.excludes(z.dog)));

    env.apply(&s, z.animal, Fact::IsNot(z.cat), &z.table);
    assert_eq!(env.narrowed_type(&s), Some(z.bird));
}

#[test]
fn open_interface_keeps_declared_type() {
    let z = zoo();
    let p = NarrowPath::var(z.names.intern("p"));
    let mut env = FlowEnvironment::new();
    env.apply(&p, z.pet, Fact::IsNot(z.dog), &z.table);
    assert_eq!(env.narrowed_type(&p), Some(z.pet));
    assert!(env.get(&p).is_some_and(|n| n.excludes(z.dog)));
}

#[test]
fn union_complement_is_a_smaller_union() {
    let z = zoo();
    let i = z.table.interner();
    let declared = i.union(&[z.dog, z.cat, TypeId::STRING]);
    let v = NarrowPath::var(z.names.intern("v"));
    let mut env = FlowEnvironment::new();
    env.apply(&v, declared, Fact::IsNot(TypeId::STRING), &z.table);
    assert_eq!(env.narrowed_type(&v), Some(i.union(&[z.dog, z.cat])));
}

#[test]
fn not_none_unwraps_option() {
    let z = zoo();
    let opt = z.table.interner().option(TypeId::I32);
    let x = NarrowPath::var(z.names.intern("x"));
    let mut env = FlowEnvironment::new();
    env.apply(&x, opt, Fact::IsNone, &z.table);
    assert!(env.is_empty());
    env.apply(&x, opt, Fact::NotNone, &z.table);
    assert_eq!(env.narrowed_type(&x), Some(TypeId::I32));
}

#[test]
fn invalidate_drops_path_and_extensions() {
    let z = zoo();
    let a = NarrowPath::var(z.names.intern("a"));
    let a_f = a.field(z.names.intern("f"));
    let b = NarrowPath::var(z.names.intern("b"));
    let opt = z.table.interner().option(TypeId::BOOL);
    let mut env = FlowEnvironment::new();
    for p in [&a, &a_f, &b] {
        env.apply(p, opt, Fact::NotNone, &z.table);
    }
    env.invalidate(&a);
    assert_eq!(env.narrowed_type(&a), None);
    assert_eq!(env.narrowed_type(&a_f), None);
    assert_eq!(env.narrowed_type(&b), Some(TypeId::BOOL));
}

#[test]
fn merge_keeps_what_both_sides_prove() {
    let z = zoo();
    let s = NarrowPath::var(z.names.intern("s"));
    let t = NarrowPath::var(z.names.intern("t"));
    let mut left = FlowEnvironment::new();
    let mut right = FlowEnvironment::new();
    left.apply(&s, z.animal, Fact::Is(z.dog), &z.table);
    right.apply(&s, z.animal, Fact::Is(z.cat), &z.table);
    left.apply(&t, z.animal, Fact::IsNot(z.dog), &z.table);
    left.apply(&t, z.animal, Fact::IsNot(z.cat), &z.table);
    right.apply(&t, z.animal, Fact::IsNot(z.dog), &z.table);

    let merged = left.merge(&right, &z.table);
    assert_eq!(merged.narrowed_type(&s), None);
    // Left has `t: Bird`, right still `t: Animal`: `t` widens back to
    // `Animal` and keeps the exclusion both sides share.
    assert_eq!(
        merged.get(&t).map(|n| (n.ty, n.excluded.to_vec())),
        Some((z.animal, vec![z.dog]))
    );

    // Over an open interface both sides stay `Pet`; only the shared
    // exclusion survives.
    let p = NarrowPath::var(z.names.intern("p"));
    let mut left = FlowEnvironment::new();
    let mut right = FlowEnvironment::new();
    left.apply(&p, z.pet, Fact::IsNot(z.dog), &z.table);
    left.apply(&p, z.pet, Fact::IsNot(z.cat), &z.table);
    right.apply(&p, z.pet, Fact::IsNot(z.dog), &z.table);
    let merged = left.merge(&right, &z.table);
    let excluded: Vec<TypeId> = merged
        .get(&p)
        .map(|n| n.excluded.to_vec())
        .unwrap_or_default();
    assert_eq!(excluded, vec![z.dog]);
}

#[test]
fn merge_with_self_is_identity() {
    let z = zoo();
    let s = NarrowPath::var(z.names.intern("s"));
    let mut env = FlowEnvironment::new();
    env.apply(&s, z.animal, Fact::IsNot(z.cat), &z.table);
    assert_eq!(env.merge(&env, &z.table), env);
}

#[test]
fn tracker_branches_and_joins() {
    let z = zoo();
    let x = NarrowPath::var(z.names.intern("x"));
    let opt = z.table.interner().option(z.dog);
    let mut flow = FlowTypeTracker::new();

    flow.push_branch(&[fact(&x, opt, Fact::NotNone)], &z.table);
    assert_eq!(flow.narrowed(&x), Some(z.dog));
    assert_eq!(flow.depth(), 2);
    let then_env = flow.pop_branch();

    flow.push_branch(&[fact(&x, opt, Fact::IsNone)], &z.table);
    let else_env = flow.pop_branch();
    assert_eq!(flow.narrowed(&x), None);

    let outcomes = vec![
        BranchOutcome {
            env: then_env.clone(),
            terminal: false,
        },
        BranchOutcome {
            env: else_env,
            terminal: false,
        },
    ];
    flow.join(outcomes, &z.table);
    assert_eq!(flow.narrowed(&x), None);

    // Guard clause: the `none` arm returns, so the other arm's facts hold.
    let outcomes = vec![
        BranchOutcome {
            env: FlowEnvironment::new(),
            terminal: true,
        },
        BranchOutcome {
            env: then_env,
            terminal: false,
        },
    ];
    flow.join(outcomes, &z.table);
    assert_eq!(flow.narrowed(&x), Some(z.dog));
}

#[test]
fn all_terminal_join_leaves_layer_alone() {
    let z = zoo();
    let x = NarrowPath::var(z.names.intern("x"));
    let mut flow = FlowTypeTracker::new();
    flow.apply(&[fact(&x, z.animal, Fact::Is(z.cat))], &z.table);
    let outcomes = vec![BranchOutcome {
        env: FlowEnvironment::new(),
        terminal: true,
    }];
    flow.join(outcomes, &z.table);
    assert_eq!(flow.narrowed(&x), Some(z.cat));
}

#[test]
fn entry_layer_survives_extra_pop() {
    let mut flow = FlowTypeTracker::new();
    let _ = flow.pop_branch();
    assert_eq!(flow.depth(), 1);
}
