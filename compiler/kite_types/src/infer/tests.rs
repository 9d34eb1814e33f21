use kite_diagnostic::ErrorCode;
use kite_ir::{BinaryOp, ExprId, ParsedType, Span};
use pretty_assertions::assert_eq;

use super::*;
use crate::test_support::{zoo, Ast, Zoo};
use crate::{FunctionSig, MethodSig, ParamSig, TypeDef};

const NONE: ExprId = ExprId::INVALID;

fn engine<'a>(z: &'a Zoo, generics: &'a GenericParams) -> InferEngine<'a> {
    InferEngine::new(&z.table, &z.names, generics, ErrorPolicy::Recover)
}

fn codes(engine: &InferEngine<'_>) -> Vec<ErrorCode> {
    engine.errors().iter().map(TypeCheckError::code).collect()
}

#[test]
fn int_literal_defaults_and_adopts_context() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);

    let plain = ast.int(7);
    let big = ast.int(3_000_000_000);
    let small = ast.int(200);
    let float_ctx = ast.int(1);

    assert_eq!(infer_expr(&mut e, &ast.arena, plain, None), TypeId::I32);
    assert_eq!(infer_expr(&mut e, &ast.arena, big, None), TypeId::I64);
    assert_eq!(check_expr(&mut e, &ast.arena, small, TypeId::U8), TypeId::U8);
    assert_eq!(check_expr(&mut e, &ast.arena, float_ctx, TypeId::F64), TypeId::F64);
    assert_eq!(codes(&e), vec![]);
}

#[test]
fn int_literal_out_of_range_for_context_mismatches() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);

    let lit = ast.int(300);
    assert_eq!(check_expr(&mut e, &ast.arena, lit, TypeId::U8), TypeId::I32);
    assert_eq!(codes(&e), vec![ErrorCode::E2001]);
}

#[test]
fn float_and_pointer_literals_follow_context() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    let ptr = z.table.interner().pointer(false, TypeId::U8);

    let half = ast.float(0.5);
    let other = ast.float(2.5);
    let nil = ast.nil();
    assert_eq!(check_expr(&mut e, &ast.arena, half, TypeId::F32), TypeId::F32);
    assert_eq!(infer_expr(&mut e, &ast.arena, other, None), TypeId::F64);
    assert_eq!(check_expr(&mut e, &ast.arena, nil, ptr), ptr);
    assert_eq!(codes(&e), vec![]);
}

#[test]
fn untyped_let_is_rejected() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);

    let none = ast.none();
    let bind = ast.let_("x", None, none);
    let opt = ast.none();
    let typed = ast.let_("y", Some(ParsedType::option(ast.ty("i32"))), opt);
    let body = ast.block(vec![bind, typed], NONE);

    infer_discarded(&mut e, &ast.arena, body);
    assert_eq!(codes(&e), vec![ErrorCode::E2019]);
    assert_eq!(
        e.expr_type(opt),
        Some(z.table.interner().option(TypeId::I32))
    );
}

#[test]
fn is_narrows_inside_then_branch_only() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("a"), z.animal, false);

    let a = ast.ident("a");
    let cond = ast.is(a, "Dog");
    let inside = ast.ident("a");
    let then = ast.block(vec![], inside);
    let test = ast.if_(cond, then, NONE);
    let stmt = ast.stmt(test);
    let after = ast.ident("a");
    let body = ast.block(vec![stmt], after);

    infer_discarded(&mut e, &ast.arena, body);
    assert_eq!(codes(&e), vec![]);
    assert_eq!(e.expr_type(inside), Some(z.dog));
    assert_eq!(e.expr_type(after), Some(z.animal));
    assert_eq!(e.expr_type(cond), Some(TypeId::BOOL));
}

#[test]
fn guard_clause_narrows_the_rest_of_the_block() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("a"), z.animal, false);

    let a = ast.ident("a");
    let cond = ast.is_not(a, "Dog");
    let bail = ast.ret(NONE);
    let guard = ast.if_(cond, bail, NONE);
    let stmt = ast.stmt(guard);
    let after = ast.ident("a");
    let body = ast.block(vec![stmt], after);

    infer_discarded(&mut e, &ast.arena, body);
    assert_eq!(codes(&e), vec![]);
    assert_eq!(e.expr_type(after), Some(z.dog));
}

#[test]
fn none_check_guard_unwraps_option() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("o"), z.table.interner().option(TypeId::I32), false);

    let o = ast.ident("o");
    let cond = ast.none_check(o, false);
    let bail = ast.ret(NONE);
    let guard = ast.if_(cond, bail, NONE);
    let stmt = ast.stmt(guard);
    let after = ast.ident("o");
    let body = ast.block(vec![stmt], after);

    infer_discarded(&mut e, &ast.arena, body);
    assert_eq!(codes(&e), vec![]);
    assert_eq!(e.expr_type(after), Some(TypeId::I32));
}

#[test]
fn none_check_on_non_option_is_reported() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("d"), z.dog, false);

    let d = ast.ident("d");
    let cond = ast.none_check(d, true);
    assert_eq!(infer_expr(&mut e, &ast.arena, cond, None), TypeId::BOOL);
    assert_eq!(codes(&e), vec![ErrorCode::E2001]);
}

#[test]
fn if_guard_binds_the_present_value() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("o"), z.table.interner().option(TypeId::I32), false);

    let o = ast.ident("o");
    let v = ast.ident("v");
    let zero = ast.int(0);
    let guard = ast.if_guard("v", o, v, zero);

    assert_eq!(infer_expr(&mut e, &ast.arena, guard, None), TypeId::I32);
    assert_eq!(e.expr_type(v), Some(TypeId::I32));
    assert_eq!(codes(&e), vec![]);
}

#[test]
fn and_checks_right_side_under_left_facts() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("a"), z.animal, false);
    e.bind_local(ast.name("d"), z.dog, false);

    let a = ast.ident("a");
    let test = ast.is(a, "Dog");
    let right_a = ast.ident("a");
    let d = ast.ident("d");
    let eq = ast.binary(BinaryOp::Eq, right_a, d);
    let cond = ast.binary(BinaryOp::And, test, eq);

    assert_eq!(infer_expr(&mut e, &ast.arena, cond, None), TypeId::BOOL);
    assert_eq!(e.expr_type(right_a), Some(z.dog));
    assert_eq!(codes(&e), vec![]);
}

#[test]
fn or_checks_right_side_under_left_negation() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("a"), z.animal, false);
    e.bind_local(ast.name("d"), z.dog, false);

    let a = ast.ident("a");
    let test = ast.is_not(a, "Dog");
    let right_a = ast.ident("a");
    let d = ast.ident("d");
    let eq = ast.binary(BinaryOp::Eq, right_a, d);
    let cond = ast.binary(BinaryOp::Or, test, eq);

    infer_expr(&mut e, &ast.arena, cond, None);
    assert_eq!(e.expr_type(right_a), Some(z.dog));
}

#[test]
fn nested_contradicting_test_is_impossible() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("a"), z.animal, false);

    let a = ast.ident("a");
    let outer_cond = ast.is(a, "Dog");
    let a2 = ast.ident("a");
    let inner_cond = ast.is(a2, "Cat");
    let empty = ast.block(vec![], NONE);
    let inner = ast.if_(inner_cond, empty, NONE);
    let outer = ast.if_(outer_cond, inner, NONE);

    infer_discarded(&mut e, &ast.arena, outer);
    assert_eq!(codes(&e), vec![ErrorCode::E2014]);
}

#[test]
fn testing_a_concrete_value_for_another_type_is_invalid() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("d"), z.dog, false);

    let d = ast.ident("d");
    let test = ast.is(d, "Cat");
    infer_expr(&mut e, &ast.arena, test, None);
    assert_eq!(codes(&e), vec![ErrorCode::E2013]);
}

#[test]
fn ambiguous_branches_need_context() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("flag"), TypeId::BOOL, false);
    e.bind_local(ast.name("d"), z.dog, false);
    e.bind_local(ast.name("c"), z.cat, false);

    let branch = |ast: &mut Ast<'_>| {
        let flag = ast.ident("flag");
        let d = ast.ident("d");
        let c = ast.ident("c");
        ast.if_(flag, d, c)
    };

    let bare = branch(&mut ast);
    let bare_let = ast.let_("x", None, bare);
    let hinted = branch(&mut ast);
    let hinted_let = ast.let_("y", Some(ast.ty("Animal")), hinted);
    let body = ast.block(vec![bare_let, hinted_let], NONE);

    infer_discarded(&mut e, &ast.arena, body);
    assert_eq!(codes(&e), vec![ErrorCode::E2011]);
    assert_eq!(e.expr_type(bare), Some(TypeId::ERROR));
    assert_eq!(e.expr_type(hinted), Some(z.animal));
}

#[test]
fn branches_join_to_their_only_common_interface() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("flag"), TypeId::BOOL, false);
    e.bind_local(ast.name("d"), z.dog, false);
    e.bind_local(ast.name("b"), z.bird, false);

    let flag = ast.ident("flag");
    let d = ast.ident("d");
    let b = ast.ident("b");
    let choice = ast.if_(flag, d, b);
    assert_eq!(infer_expr(&mut e, &ast.arena, choice, None), z.animal);

    // A diverging arm does not take part.
    let flag = ast.ident("flag");
    let d = ast.ident("d");
    let bail = ast.ret(NONE);
    let choice = ast.if_(flag, d, bail);
    assert_eq!(infer_expr(&mut e, &ast.arena, choice, None), z.dog);
    assert_eq!(codes(&e), vec![]);
}

#[test]
fn match_type_arms_narrow_and_exclude() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("a"), z.animal, false);

    let scrutinee = ast.ident("a");
    let in_dog = ast.ident("a");
    let read = ast.stmt(in_dog);
    let dog_body = ast.block(vec![read], NONE);
    let dog_arm = ast.type_arm("Dog", dog_body);
    let cat_ret = ast.ret(NONE);
    let cat_arm = ast.type_arm("Cat", cat_ret);
    let m = ast.match_(scrutinee, vec![dog_arm, cat_arm], NONE);
    let stmt = ast.stmt(m);
    let after = ast.ident("a");
    let body = ast.block(vec![stmt], after);

    infer_discarded(&mut e, &ast.arena, body);
    assert_eq!(codes(&e), vec![]);
    assert_eq!(e.expr_type(in_dog), Some(z.dog));
    // Dog falls through, Cat returns, Bird never matched: Dog or Bird.
    assert_eq!(e.expr_type(after), Some(z.animal));
}

#[test]
fn match_without_else_leaves_the_unmatched_member() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("a"), z.animal, false);

    let scrutinee = ast.ident("a");
    let dog_ret = ast.ret(NONE);
    let dog_arm = ast.type_arm("Dog", dog_ret);
    let cat_ret = ast.ret(NONE);
    let cat_arm = ast.type_arm("Cat", cat_ret);
    let m = ast.match_(scrutinee, vec![dog_arm, cat_arm], NONE);
    let stmt = ast.stmt(m);
    let after = ast.ident("a");
    let body = ast.block(vec![stmt], after);

    infer_discarded(&mut e, &ast.arena, body);
    assert_eq!(codes(&e), vec![]);
    assert_eq!(e.expr_type(after), Some(z.bird));
}

#[test]
fn match_covering_every_member_diverges() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("a"), z.animal, false);

    let scrutinee = ast.ident("a");
    let arms = ["Dog", "Cat", "Bird"]
        .into_iter()
        .map(|ty| {
            let bail = ast.ret(NONE);
            ast.type_arm(ty, bail)
        })
        .collect();
    let m = ast.match_(scrutinee, arms, NONE);
    let stmt = ast.stmt(m);
    let body = ast.block(vec![stmt], NONE);

    assert_eq!(infer_discarded(&mut e, &ast.arena, body), TypeId::NEVER);
    assert_eq!(codes(&e), vec![]);
}

#[test]
fn match_value_arms_must_be_comparable() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("n"), TypeId::U8, false);

    let scrutinee = ast.ident("n");
    let one = ast.int(1);
    let one_body = ast.str("one");
    let one_arm = ast.value_arm(one, one_body);
    let text = ast.str("two");
    let text_body = ast.str("two");
    let text_arm = ast.value_arm(text, text_body);
    let fallback = ast.str("many");
    let m = ast.match_(scrutinee, vec![one_arm, text_arm], fallback);

    assert_eq!(infer_expr(&mut e, &ast.arena, m, None), TypeId::STRING);
    assert_eq!(e.expr_type(one), Some(TypeId::U8));
    assert_eq!(codes(&e), vec![ErrorCode::E2001]);
}

#[test]
fn loop_drops_narrowing_of_written_paths() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("a"), z.animal, true);
    e.bind_local(ast.name("b"), z.bird, false);

    let a = ast.ident("a");
    let cond = ast.is_not(a, "Dog");
    let bail = ast.ret(NONE);
    let guard = ast.if_(cond, bail, NONE);
    let guard = ast.stmt(guard);

    let read = ast.ident("a");
    let read_stmt = ast.stmt(read);
    let target = ast.ident("a");
    let b = ast.ident("b");
    let write = ast.assign(target, b);
    let loop_body = ast.block(vec![read_stmt, write], NONE);
    let always = ast.bool(true);
    let lp = ast.loop_(always, loop_body);
    let lp = ast.stmt(lp);

    let after = ast.ident("a");
    let body = ast.block(vec![guard, lp], after);

    infer_discarded(&mut e, &ast.arena, body);
    assert_eq!(codes(&e), vec![]);
    assert_eq!(e.expr_type(read), Some(z.animal));
    assert_eq!(e.expr_type(after), Some(z.animal));
}

fn unit_sig(z: &Zoo, name: &str, params: Vec<ParamSig>) -> FunctionSig {
    FunctionSig {
        name: z.names.intern(name),
        generics: GenericParams::default(),
        params,
        variadic: false,
        ret: TypeId::UNIT,
        span: Span::DUMMY,
    }
}

/// The zoo plus three ways to write a `Dog`: `take(mut d Dog)`,
/// `poke(d &mut Dog)` and `(mut d Dog) reset()`.
fn zoo_with_writers() -> Zoo {
    let mut z = zoo();
    let d = z.names.intern("d");
    let by_mut_ref = z.table.interner().reference(true, z.dog);
    for (name, ty, mutable) in [("take", z.dog, true), ("poke", by_mut_ref, false)] {
        let sig = unit_sig(&z, name, vec![ParamSig { name: d, ty, mutable }]);
        assert!(z.table.registry_mut().add_function(sig));
    }
    let Some(TypeDef::Decl(dog)) = z.table.registry().type_def(z.names.intern("Dog")) else {
        panic!("Dog is not registered");
    };
    let reset = MethodSig {
        receiver: dog,
        mut_receiver: true,
        sig: unit_sig(&z, "reset", Vec::new()),
    };
    assert!(z.table.registry_mut().add_method(reset));
    z
}

#[test]
fn calls_that_may_write_drop_narrowing() {
    let z = zoo_with_writers();
    let generics = GenericParams::default();

    for writer in ["take", "poke", "reset"] {
        let mut e = engine(&z, &generics);
        let mut ast = Ast::new(&z.names);
        e.bind_local(ast.name("a"), z.animal, true);

        // if a !is Dog { return }; a; <write a>; a
        let a = ast.ident("a");
        let cond = ast.is_not(a, "Dog");
        let bail = ast.ret(NONE);
        let guard = ast.if_(cond, bail, NONE);
        let guard = ast.stmt(guard);
        let before = ast.ident("a");
        let before_stmt = ast.stmt(before);
        let a = ast.ident("a");
        let write = match writer {
            "take" => {
                let arg = ast.mut_arg(a);
                ast.call("take", &[arg])
            }
            "poke" => {
                let arg = ast.reference(true, a);
                ast.call("poke", &[arg])
            }
            _ => ast.method_call(a, "reset", &[]),
        };
        let write = ast.stmt(write);
        let after = ast.ident("a");
        let body = ast.block(vec![guard, before_stmt, write], after);

        infer_discarded(&mut e, &ast.arena, body);
        assert_eq!(codes(&e), vec![], "{writer}");
        assert_eq!(e.expr_type(before), Some(z.dog), "{writer}");
        assert_eq!(e.expr_type(after), Some(z.animal), "{writer}");
    }
}

#[test]
fn optional_interface_proven_present_is_tested_as_the_interface() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("x"), z.table.interner().option(z.animal), false);

    // if x == none { return }
    let x = ast.ident("x");
    let missing = ast.none_check(x, false);
    let bail = ast.ret(NONE);
    let guard = ast.if_(missing, bail, NONE);
    let guard = ast.stmt(guard);

    // if x is Dog { x }
    let x = ast.ident("x");
    let cond = ast.is(x, "Dog");
    let inside = ast.ident("x");
    let inside_stmt = ast.stmt(inside);
    let then = ast.block(vec![inside_stmt], NONE);
    let test = ast.if_(cond, then, NONE);
    let test = ast.stmt(test);

    // match x { Dog => return, Cat => return }
    let scrutinee = ast.ident("x");
    let dog_ret = ast.ret(NONE);
    let dog_arm = ast.type_arm("Dog", dog_ret);
    let cat_ret = ast.ret(NONE);
    let cat_arm = ast.type_arm("Cat", cat_ret);
    let m = ast.match_(scrutinee, vec![dog_arm, cat_arm], NONE);
    let m = ast.stmt(m);

    let after = ast.ident("x");
    let body = ast.block(vec![guard, test, m], after);

    infer_discarded(&mut e, &ast.arena, body);
    assert_eq!(codes(&e), vec![]);
    assert_eq!(e.expr_type(scrutinee), Some(z.animal));
    assert_eq!(e.expr_type(inside), Some(z.dog));
    // Both other members returned: only a Bird gets here.
    assert_eq!(e.expr_type(after), Some(z.bird));
}

#[test]
fn loop_condition_false_facts_hold_after_the_loop() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("o"), z.table.interner().option(TypeId::I32), false);

    let o = ast.ident("o");
    let cond = ast.none_check(o, false);
    let empty = ast.block(vec![], NONE);
    let lp = ast.loop_(cond, empty);
    let lp = ast.stmt(lp);
    let after = ast.ident("o");
    let body = ast.block(vec![lp], after);

    infer_discarded(&mut e, &ast.arena, body);
    assert_eq!(e.expr_type(after), Some(TypeId::I32));
}

#[test]
fn infinite_loop_diverges_unless_it_breaks() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);

    let empty = ast.block(vec![], NONE);
    let forever = ast.loop_(NONE, empty);
    assert_eq!(infer_discarded(&mut e, &ast.arena, forever), TypeId::NEVER);

    let brk = ast.brk();
    let brk = ast.stmt(brk);
    let cont = ast.cont();
    let cont = ast.stmt(cont);
    let body = ast.block(vec![cont, brk], NONE);
    let exits = ast.loop_(NONE, body);
    assert_eq!(infer_discarded(&mut e, &ast.arena, exits), TypeId::UNIT);
    assert_eq!(codes(&e), vec![]);
}

#[test]
fn break_outside_loop_is_reported() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);

    let brk = ast.brk();
    infer_discarded(&mut e, &ast.arena, brk);
    assert_eq!(codes(&e), vec![ErrorCode::E2021]);
}

#[test]
fn return_checks_against_declared_type() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics).with_return_type(TypeId::I32);
    let mut ast = Ast::new(&z.names);

    let fine = ast.int(1);
    let fine = ast.ret(fine);
    let wrong = ast.str("no");
    let wrong = ast.ret(wrong);
    let bare = ast.ret(NONE);

    assert_eq!(infer_discarded(&mut e, &ast.arena, fine), TypeId::NEVER);
    infer_discarded(&mut e, &ast.arena, wrong);
    infer_discarded(&mut e, &ast.arena, bare);
    assert_eq!(codes(&e), vec![ErrorCode::E2001, ErrorCode::E2001]);
}

#[test]
fn assignment_requires_mutable_binding() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("fixed"), TypeId::I32, false);
    e.bind_local(ast.name("counter"), TypeId::I32, true);

    let fixed = ast.ident("fixed");
    let one = ast.int(1);
    let bad = ast.assign(fixed, one);
    let counter = ast.ident("counter");
    let two = ast.int(2);
    let good = ast.assign(counter, two);
    let body = ast.block(vec![bad, good], NONE);

    infer_discarded(&mut e, &ast.arena, body);
    assert_eq!(codes(&e), vec![ErrorCode::E2017]);
}

#[test]
fn assignment_checks_against_declared_not_narrowed_type() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("a"), z.animal, true);
    e.bind_local(ast.name("b"), z.bird, false);

    let a = ast.ident("a");
    let cond = ast.is(a, "Dog");
    let target = ast.ident("a");
    let b = ast.ident("b");
    let write = ast.assign(target, b);
    let after_write = ast.ident("a");
    let then = ast.block(vec![write], after_write);
    let test = ast.if_(cond, then, NONE);

    infer_discarded(&mut e, &ast.arena, test);
    assert_eq!(codes(&e), vec![]);
    assert_eq!(e.expr_type(after_write), Some(z.animal));
}

#[test]
fn collection_literals() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    let i = z.table.interner();

    let one = ast.int(1);
    let two = ast.int(2);
    let ints = ast.array(&[one, two]);
    assert_eq!(
        infer_expr(&mut e, &ast.arena, ints, None),
        i.dyn_array(TypeId::I32)
    );

    let empty = ast.array(&[]);
    let bytes = i.dyn_array(TypeId::U8);
    assert_eq!(check_expr(&mut e, &ast.arena, empty, bytes), bytes);

    let key = ast.str("k");
    let value = ast.int(1);
    let map = ast.map(&[(key, value)]);
    assert_eq!(
        infer_expr(&mut e, &ast.arena, map, None),
        i.map(TypeId::STRING, TypeId::I32)
    );

    let n = ast.int(1);
    let s = ast.str("s");
    let pair = ast.tuple(&[n, s]);
    assert_eq!(
        infer_expr(&mut e, &ast.arena, pair, None),
        i.tuple(&[TypeId::I32, TypeId::STRING])
    );
    assert_eq!(codes(&e), vec![]);

    let unknown = ast.array(&[]);
    infer_expr(&mut e, &ast.arena, unknown, None);
    assert_eq!(codes(&e), vec![ErrorCode::E2019]);
}

#[test]
fn indexing_arrays_strings_and_maps() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    let i = z.table.interner();
    e.bind_local(ast.name("xs"), i.dyn_array(z.dog), false);
    e.bind_local(ast.name("s"), TypeId::STRING, false);
    e.bind_local(ast.name("m"), i.map(TypeId::STRING, TypeId::BOOL), false);

    let xs = ast.ident("xs");
    let zero = ast.int(0);
    let elem = ast.index(xs, zero);
    let s = ast.ident("s");
    let one = ast.int(1);
    let byte = ast.index(s, one);
    let m = ast.ident("m");
    let key = ast.str("k");
    let entry = ast.index(m, key);
    let flag = ast.bool(true);
    let bad = ast.index(flag, zero);

    assert_eq!(infer_expr(&mut e, &ast.arena, elem, None), z.dog);
    assert_eq!(e.expr_type(zero), Some(TypeId::USIZE));
    assert_eq!(infer_expr(&mut e, &ast.arena, byte, None), TypeId::U8);
    assert_eq!(infer_expr(&mut e, &ast.arena, entry, None), TypeId::BOOL);
    assert_eq!(codes(&e), vec![]);
    assert_eq!(infer_expr(&mut e, &ast.arena, bad, None), TypeId::ERROR);
    assert_eq!(codes(&e), vec![ErrorCode::E2020]);
}

#[test]
fn field_access_and_unknown_members() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);
    e.bind_local(ast.name("d"), z.dog, false);

    let d = ast.ident("d");
    let name = ast.field(d, "name");
    let d2 = ast.ident("d");
    let missing = ast.field(d2, "wings");
    let unknown = ast.ident("nobody");

    assert_eq!(infer_expr(&mut e, &ast.arena, name, None), TypeId::STRING);
    assert_eq!(infer_expr(&mut e, &ast.arena, missing, None), TypeId::ERROR);
    assert_eq!(infer_expr(&mut e, &ast.arena, unknown, None), TypeId::ERROR);
    assert_eq!(codes(&e), vec![ErrorCode::E2015, ErrorCode::E2003]);
}

#[test]
fn abort_policy_stops_after_first_error() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = InferEngine::new(&z.table, &z.names, &generics, ErrorPolicy::AbortFunction);
    let mut ast = Ast::new(&z.names);

    let first = ast.ident("missing");
    let first = ast.stmt(first);
    let second = ast.brk();
    let second = ast.stmt(second);
    let body = ast.block(vec![first, second], NONE);

    assert_eq!(infer_discarded(&mut e, &ast.arena, body), TypeId::ERROR);
    assert!(e.is_aborted());
    assert_eq!(codes(&e), vec![ErrorCode::E2003]);
}

#[test]
fn scope_exit_forgets_inner_bindings() {
    let z = zoo();
    let generics = GenericParams::default();
    let mut e = engine(&z, &generics);
    let mut ast = Ast::new(&z.names);

    let one = ast.int(1);
    let inner = ast.let_("x", None, one);
    let x = ast.ident("x");
    let block = ast.block(vec![inner], x);
    let block = ast.stmt(block);
    let outside = ast.ident("x");
    let body = ast.block(vec![block], outside);

    infer_discarded(&mut e, &ast.arena, body);
    assert_eq!(e.expr_type(x), Some(TypeId::I32));
    assert_eq!(codes(&e), vec![ErrorCode::E2003]);
}
