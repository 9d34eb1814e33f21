use kite_ir::{Name, Span, StringInterner};
use pretty_assertions::assert_eq;

use super::*;
use crate::registry::{DeclInfo, DeclKind, GenericParamDef, InterfaceInfo, StructInfo};
use crate::DeclId;

struct Fixture {
    table: TypeTable,
    names: StringInterner,
    shape: TypeId,
    square: TypeId,
    container_decl: DeclId,
    box_decl: DeclId,
}

fn add(table: &mut TypeTable, name: Name, generics: GenericParams, kind: DeclKind) -> DeclId {
    table
        .registry_mut()
        .add_decl(DeclInfo {
            name,
            generics,
            kind,
            span: Span::DUMMY,
        })
        .unwrap_or_else(|| panic!("duplicate declaration"))
}

fn type_param(name: Name, index: u32, constraints: Vec<TypeId>, default: Option<TypeId>) -> GenericParamDef {
    GenericParamDef {
        name,
        index,
        kind: GenericParamDefKind::Type {
            constraints,
            default,
        },
    }
}

fn const_param(name: Name, index: u32, ty: TypeId) -> GenericParamDef {
    GenericParamDef {
        name,
        index,
        kind: GenericParamDefKind::Const { ty },
    }
}

fn fixture() -> Fixture {
    let names = StringInterner::new();
    let mut table = TypeTable::new();
    let interface = || {
        DeclKind::Interface(InterfaceInfo {
            sealed: false,
            implementors: Vec::new(),
        })
    };

    let shape_decl = add(&mut table, names.intern("Shape"), GenericParams::default(), interface());
    let shape = table.interner().interface(shape_decl, &[]);
    let square_decl = add(
        &mut table,
        names.intern("Square"),
        GenericParams::default(),
        DeclKind::Struct(StructInfo {
            fields: Vec::new(),
            implements: vec![shape],
        }),
    );

    let t = names.intern("T");
    let container_decl = add(
        &mut table,
        names.intern("Container"),
        GenericParams::new(vec![type_param(t, 0, Vec::new(), None)]),
        interface(),
    );
    let t_param = table.interner().param(t, 0);
    let container_t = table.interner().interface(container_decl, &[t_param]);
    let box_decl = add(
        &mut table,
        names.intern("Box"),
        GenericParams::new(vec![type_param(t, 0, Vec::new(), None)]),
        DeclKind::Struct(StructInfo {
            fields: vec![(names.intern("value"), t_param)],
            implements: vec![container_t],
        }),
    );

    let square = table.interner().named(square_decl, &[]);
    Fixture {
        table,
        names,
        shape,
        square,
        container_decl,
        box_decl,
    }
}

fn single(f: &Fixture, constraints: Vec<TypeId>, default: Option<TypeId>) -> (GenericParams, TypeId) {
    let t = f.names.intern("T");
    (
        GenericParams::new(vec![type_param(t, 0, constraints, default)]),
        f.table.interner().param(t, 0),
    )
}

fn solve(f: &Fixture, generics: &GenericParams, equations: &[Equation]) -> Result<Instantiation, SolveError> {
    ConstraintSolver::new(&f.table, generics, &ParamBounds::new()).solve_inferred(equations)
}

#[test]
fn binds_from_first_argument() {
    let f = fixture();
    let (generics, t) = single(&f, Vec::new(), None);
    let inst = solve(&f, &generics, &[Equation::new(t, TypeId::STRING), Equation::new(t, TypeId::STRING)])
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(inst.type_args(), &[TypeId::STRING]);
    assert_eq!(inst.get(f.names.intern("T")), Some(GenericBinding::Type(TypeId::STRING)));
}

#[test]
fn disagreeing_arguments_conflict() {
    let f = fixture();
    let (generics, t) = single(&f, Vec::new(), None);
    let err = solve(&f, &generics, &[Equation::new(t, TypeId::I32), Equation::new(t, TypeId::STRING)]);
    assert_eq!(
        err,
        Err(SolveError::Conflicting {
            param: f.names.intern("T"),
            first: TypeId::I32,
            second: TypeId::STRING,
        })
    );
}

#[test]
fn literal_yields_to_typed_argument() {
    let f = fixture();
    let (generics, t) = single(&f, Vec::new(), None);
    // `max(1, x)` with `x: i8`: the literal's default type must not win.
    let inst = solve(&f, &generics, &[Equation::weak(t, TypeId::I32), Equation::new(t, TypeId::I8)])
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(inst.type_args(), &[TypeId::I8]);

    let only_literals = solve(&f, &generics, &[Equation::weak(t, TypeId::I32)])
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(only_literals.type_args(), &[TypeId::I32]);
}

#[test]
fn disagreeing_literals_conflict() {
    let f = fixture();
    let (generics, t) = single(&f, Vec::new(), None);
    // `pair(1, 2.5)`: neither literal yields to the other.
    let err = solve(&f, &generics, &[Equation::weak(t, TypeId::I32), Equation::weak(t, TypeId::F64)]);
    assert_eq!(
        err,
        Err(SolveError::Conflicting {
            param: f.names.intern("T"),
            first: TypeId::I32,
            second: TypeId::F64,
        })
    );

    // A typed argument still decides over both.
    let typed = solve(
        &f,
        &generics,
        &[
            Equation::weak(t, TypeId::I32),
            Equation::weak(t, TypeId::F64),
            Equation::new(t, TypeId::F32),
        ],
    )
    .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(typed.type_args(), &[TypeId::F32]);
}

#[test]
fn unbound_parameter_uses_default_or_fails() {
    let f = fixture();
    let (generics, _) = single(&f, Vec::new(), None);
    assert_eq!(
        solve(&f, &generics, &[]),
        Err(SolveError::Unresolved {
            param: f.names.intern("T")
        })
    );

    let (defaulted, _) = single(&f, Vec::new(), Some(TypeId::BOOL));
    let inst = solve(&f, &defaulted, &[]).unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(inst.type_args(), &[TypeId::BOOL]);
}

#[test]
fn untyped_and_error_actuals_teach_nothing() {
    let f = fixture();
    let (generics, t) = single(&f, Vec::new(), None);
    let inst = solve(
        &f,
        &generics,
        &[
            Equation::new(t, TypeId::ERROR),
            Equation::new(t, TypeId::UNTYPED_NONE),
            Equation::new(t, TypeId::F64),
        ],
    )
    .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(inst.type_args(), &[TypeId::F64]);
}

#[test]
fn decomposes_structure() {
    let f = fixture();
    let i = f.table.interner();
    let t_name = f.names.intern("T");
    let u_name = f.names.intern("U");
    let generics = GenericParams::new(vec![
        type_param(t_name, 0, Vec::new(), None),
        type_param(u_name, 1, Vec::new(), None),
    ]);
    let t = i.param(t_name, 0);
    let u = i.param(u_name, 1);

    let pattern = i.map(t, i.dyn_array(u));
    let actual = i.map(TypeId::STRING, i.dyn_array(f.square));
    let inst = solve(&f, &generics, &[Equation::new(pattern, actual)])
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(inst.type_args(), &[TypeId::STRING, f.square]);

    let fn_pattern = i.function(&[t], false, u);
    let fn_actual = i.function(&[TypeId::I64], false, TypeId::BOOL);
    let inst = solve(&f, &generics, &[Equation::new(fn_pattern, fn_actual)])
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(inst.type_args(), &[TypeId::I64, TypeId::BOOL]);
}

#[test]
fn option_pattern_lifts_plain_value() {
    let f = fixture();
    let (generics, t) = single(&f, Vec::new(), None);
    let pattern = f.table.interner().option(t);
    let inst = solve(&f, &generics, &[Equation::new(pattern, TypeId::U16)])
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(inst.type_args(), &[TypeId::U16]);
}

#[test]
fn interface_pattern_matches_implementor() {
    let f = fixture();
    let (generics, t) = single(&f, Vec::new(), None);
    let i = f.table.interner();
    let pattern = i.interface(f.container_decl, &[t]);
    let actual = i.named(f.box_decl, &[TypeId::STRING]);
    let inst = solve(&f, &generics, &[Equation::new(pattern, actual)])
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(inst.type_args(), &[TypeId::STRING]);
    assert_eq!(inst.apply(&f.table, pattern), i.interface(f.container_decl, &[TypeId::STRING]));
}

#[test]
fn bindings_must_satisfy_constraints() {
    let f = fixture();
    let (generics, t) = single(&f, vec![f.shape], None);
    let ok = solve(&f, &generics, &[Equation::new(t, f.square)]);
    assert!(ok.is_ok());

    assert_eq!(
        solve(&f, &generics, &[Equation::new(t, TypeId::I32)]),
        Err(SolveError::ConstraintViolation {
            param: f.names.intern("T"),
            ty: TypeId::I32,
            constraint: f.shape,
        })
    );
}

#[test]
fn constrained_param_in_scope_satisfies_constraint() {
    let f = fixture();
    let (generics, t) = single(&f, vec![f.shape], None);
    // Calling from inside another generic `fn g[S: Shape](s: S)`.
    let s = f.table.interner().param(f.names.intern("S"), 0);
    let mut bounds = ParamBounds::new();
    bounds.insert(s, vec![f.shape]);
    let inst = ConstraintSolver::new(&f.table, &generics, &bounds)
        .solve_inferred(&[Equation::new(t, s)])
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(inst.type_args(), &[s]);
}

#[test]
fn explicit_arguments_bind_positionally_and_fill_defaults() {
    let f = fixture();
    let k = f.names.intern("K");
    let v = f.names.intern("V");
    let k_param = f.table.interner().param(k, 0);
    let generics = GenericParams::new(vec![
        type_param(k, 0, Vec::new(), None),
        type_param(v, 1, Vec::new(), Some(f.table.interner().dyn_array(k_param))),
    ]);
    let bounds = ParamBounds::new();
    let solver = || ConstraintSolver::new(&f.table, &generics, &bounds);

    let inst = solver()
        .solve_explicit(&[ExplicitGenericArg::Type(TypeId::STRING)])
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(
        inst.type_args(),
        &[TypeId::STRING, f.table.interner().dyn_array(TypeId::STRING)]
    );

    let count = SolveError::GenericArgCount {
        min: 1,
        max: 2,
        found: 3,
    };
    let three = [ExplicitGenericArg::Type(TypeId::I32); 3];
    assert_eq!(solver().solve_explicit(&three), Err(count));
    assert_eq!(
        solver().solve_explicit(&[]),
        Err(SolveError::GenericArgCount {
            min: 1,
            max: 2,
            found: 0
        })
    );
}

#[test]
fn const_parameters_check_kind_and_domain() {
    let f = fixture();
    let n = f.names.intern("N");
    let generics = GenericParams::new(vec![const_param(n, 0, TypeId::U8)]);
    let bounds = ParamBounds::new();
    let solver = || ConstraintSolver::new(&f.table, &generics, &bounds);

    let inst = solver()
        .solve_explicit(&[ExplicitGenericArg::Const(ConstValue::Int(4))])
        .unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(inst.get(n), Some(GenericBinding::Const(ConstValue::Int(4))));
    assert_eq!(
        inst.type_args(),
        &[f.table.interner().const_value(ConstValue::Int(4))]
    );

    assert_eq!(
        solver().solve_explicit(&[ExplicitGenericArg::Const(ConstValue::Int(256))]),
        Err(SolveError::ConstDomain {
            param: n,
            value: ConstValue::Int(256),
            ty: TypeId::U8,
        })
    );
    assert_eq!(
        solver().solve_explicit(&[ExplicitGenericArg::Const(ConstValue::Bool(true))]),
        Err(SolveError::ConstDomain {
            param: n,
            value: ConstValue::Bool(true),
            ty: TypeId::U8,
        })
    );
    assert_eq!(
        solver().solve_explicit(&[ExplicitGenericArg::NotConstant]),
        Err(SolveError::ConstNotConstant { param: n })
    );
    assert_eq!(
        solver().solve_explicit(&[ExplicitGenericArg::Type(TypeId::I32)]),
        Err(SolveError::GenericArgKind {
            param: n,
            expected_const: true
        })
    );
}

#[test]
fn type_parameter_rejects_value_argument() {
    let f = fixture();
    let (generics, _) = single(&f, Vec::new(), None);
    let err = ConstraintSolver::new(&f.table, &generics, &ParamBounds::new())
        .solve_explicit(&[ExplicitGenericArg::Const(ConstValue::Int(1))]);
    assert_eq!(
        err,
        Err(SolveError::GenericArgKind {
            param: f.names.intern("T"),
            expected_const: false
        })
    );
}
