//! Constraint solver for generic instantiation.
//!
//! Given the generic parameters of a declaration and either explicit
//! arguments or one equation per argument/field, derives a binding for every
//! parameter:
//!
//! 1. Explicit arguments bind position-wise; missing trailing parameters
//!    take their defaults.
//! 2. Otherwise the declaration's parameters are opened into fresh type
//!    variables and each `(pattern, actual)` equation is unified left to
//!    right by structural decomposition. A variable binds on first sight;
//!    a later equation must agree exactly.
//! 3. Unbound parameters fall back to their default or fail.
//! 4. Every binding is re-checked against its interface constraints.
//!
//! The substitution lives only inside one [`ConstraintSolver`]; the result
//! is an [`Instantiation`] with no type variables left in it.

mod error;

pub use error::SolveError;

use kite_ir::Name;
use rustc_hash::FxHashMap;

use crate::registry::GenericParamDefKind;
use crate::{
    ConstValue, GenericParams, ParamBounds, Primitive, TypeData, TypeId, TypeTable, TypeVar,
};

/// One structural equation: the declared `pattern` (mentioning the
/// declaration's `Param`s) against the `actual` type at the site.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Equation {
    pub pattern: TypeId,
    pub actual: TypeId,
    /// A weak equation comes from an untyped literal: it binds a parameter
    /// nothing else binds, but never conflicts with a stronger binding.
    /// Weak equations that disagree with each other still conflict.
    pub weak: bool,
}

impl Equation {
    pub fn new(pattern: TypeId, actual: TypeId) -> Self {
        Equation {
            pattern,
            actual,
            weak: false,
        }
    }

    pub fn weak(pattern: TypeId, actual: TypeId) -> Self {
        Equation {
            pattern,
            actual,
            weak: true,
        }
    }
}

/// An explicit generic argument after evaluation at the site.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExplicitGenericArg {
    Type(TypeId),
    Const(ConstValue),
    /// A value argument that is not known at compile time.
    NotConstant,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum GenericBinding {
    Type(TypeId),
    Const(ConstValue),
}

/// The recorded result of instantiating one call or construction site.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Instantiation {
    params: Vec<(Name, GenericBinding)>,
    type_args: Vec<TypeId>,
}

impl Instantiation {
    fn new(table: &TypeTable, params: Vec<(Name, GenericBinding)>) -> Self {
        let type_args = params
            .iter()
            .map(|(_, binding)| match *binding {
                GenericBinding::Type(ty) => ty,
                GenericBinding::Const(value) => table.interner().const_value(value),
            })
            .collect();
        Instantiation { params, type_args }
    }

    /// Bindings in declaration order.
    pub fn params(&self) -> &[(Name, GenericBinding)] {
        &self.params
    }

    pub fn get(&self, param: Name) -> Option<GenericBinding> {
        self.params
            .iter()
            .find(|(name, _)| *name == param)
            .map(|&(_, binding)| binding)
    }

    /// Bindings as types, constants interned as type-level values; the
    /// argument list of the instantiated declaration.
    pub fn type_args(&self) -> &[TypeId] {
        &self.type_args
    }

    /// Substitute the bindings into a type from the declaration.
    pub fn apply(&self, table: &TypeTable, ty: TypeId) -> TypeId {
        table.substitute_params(ty, &self.type_args)
    }
}

/// One solving attempt for one site.
pub struct ConstraintSolver<'a> {
    table: &'a TypeTable,
    generics: &'a GenericParams,
    /// Constraints of the generic parameters in scope at the site.
    bounds: &'a ParamBounds,
    /// Type variable standing for each parameter, by index.
    vars: Vec<TypeId>,
    bindings: FxHashMap<TypeVar, TypeId>,
    /// Bindings that came only from weak equations.
    weak: FxHashMap<TypeVar, TypeId>,
}

impl<'a> ConstraintSolver<'a> {
    pub fn new(table: &'a TypeTable, generics: &'a GenericParams, bounds: &'a ParamBounds) -> Self {
        ConstraintSolver {
            table,
            generics,
            bounds,
            vars: Vec::new(),
            bindings: FxHashMap::default(),
            weak: FxHashMap::default(),
        }
    }

    /// Bind position-wise from explicit arguments.
    #[tracing::instrument(level = "debug", skip_all, fields(params = self.generics.len(), args = args.len()))]
    pub fn solve_explicit(
        self,
        args: &[ExplicitGenericArg],
    ) -> Result<Instantiation, SolveError> {
        let count_error = SolveError::GenericArgCount {
            min: self.generics.required_count(),
            max: self.generics.len(),
            found: args.len(),
        };
        if args.len() > self.generics.len() || args.len() < self.generics.required_count() {
            return Err(count_error);
        }

        let mut bound: Vec<(Name, GenericBinding)> = Vec::with_capacity(self.generics.len());
        let mut type_args: Vec<TypeId> = Vec::with_capacity(self.generics.len());
        for param in self.generics {
            let binding = match (args.get(param.index as usize), &param.kind) {
                (Some(ExplicitGenericArg::Type(ty)), GenericParamDefKind::Type { .. }) => {
                    GenericBinding::Type(*ty)
                }
                (Some(ExplicitGenericArg::Const(value)), GenericParamDefKind::Const { ty }) => {
                    check_const_domain(param.name, *value, *ty)?;
                    GenericBinding::Const(*value)
                }
                (Some(ExplicitGenericArg::NotConstant), GenericParamDefKind::Const { .. }) => {
                    return Err(SolveError::ConstNotConstant { param: param.name });
                }
                (Some(_), kind) => {
                    return Err(SolveError::GenericArgKind {
                        param: param.name,
                        expected_const: matches!(kind, GenericParamDefKind::Const { .. }),
                    });
                }
                (None, _) => match param.default() {
                    Some(default) => {
                        GenericBinding::Type(self.table.substitute_params(default, &type_args))
                    }
                    None => return Err(count_error),
                },
            };
            type_args.push(match binding {
                GenericBinding::Type(ty) => ty,
                GenericBinding::Const(value) => self.table.interner().const_value(value),
            });
            bound.push((param.name, binding));
        }

        self.finish(bound)
    }

    /// Bind by unifying each equation, left to right.
    #[tracing::instrument(level = "debug", skip_all, fields(params = self.generics.len(), equations = equations.len()))]
    pub fn solve_inferred(mut self, equations: &[Equation]) -> Result<Instantiation, SolveError> {
        let interner = self.table.interner();
        self.vars = self.generics.iter().map(|_| interner.fresh_var()).collect();

        // Strong equations first so a literal never decides a binding that
        // a typed argument later contradicts.
        for eq in equations.iter().filter(|e| !e.weak) {
            let pattern = self.open(eq.pattern);
            self.unify(pattern, eq.actual, false)?;
        }
        for eq in equations.iter().filter(|e| e.weak) {
            let pattern = self.open(eq.pattern);
            self.unify(pattern, eq.actual, true)?;
        }

        let mut bound: Vec<(Name, GenericBinding)> = Vec::with_capacity(self.generics.len());
        let mut type_args: Vec<TypeId> = Vec::with_capacity(self.generics.len());
        for (param, &var) in self.generics.iter().zip(&self.vars) {
            let found = self.binding_of(var);
            let ty = match (found, &param.kind) {
                (Some(ty), GenericParamDefKind::Type { .. }) => ty,
                (None, GenericParamDefKind::Type { default: Some(d), .. }) => {
                    self.table.substitute_params(*d, &type_args)
                }
                _ => return Err(SolveError::Unresolved { param: param.name }),
            };
            if self.table.flags(ty).has_vars() {
                tracing::error!(param = ?param.name, ?ty, "type variable escaped a solve");
                return Err(SolveError::Unresolved { param: param.name });
            }
            tracing::debug!(param = ?param.name, ?ty, "bound generic parameter");
            type_args.push(ty);
            bound.push((param.name, GenericBinding::Type(ty)));
        }

        self.finish(bound)
    }

    fn binding_of(&self, var: TypeId) -> Option<TypeId> {
        let TypeData::Var(v) = self.table.lookup(var) else {
            return None;
        };
        self.bindings.get(&v).or_else(|| self.weak.get(&v)).copied()
    }

    /// Replace the declaration's parameters with this attempt's variables.
    fn open(&self, pattern: TypeId) -> TypeId {
        self.table.substitute_params(pattern, &self.vars)
    }

    fn param_name(&self, var: TypeVar) -> Name {
        self.vars
            .iter()
            .position(|&v| self.table.lookup(v) == TypeData::Var(var))
            .and_then(|i| self.generics.get(i))
            .map_or(Name::EMPTY, |p| p.name)
    }

    fn unify(&mut self, pattern: TypeId, actual: TypeId, weak: bool) -> Result<(), SolveError> {
        if !self.table.flags(pattern).has_vars() {
            return Ok(());
        }
        // Nothing to learn from these; assignability is checked later.
        if actual.is_error() || actual.is_never() || actual.is_untyped() {
            return Ok(());
        }

        let table = self.table;
        match (table.lookup(pattern), table.lookup(actual)) {
            (TypeData::Var(var), _) => self.bind(var, actual, weak),
            (
                TypeData::Pointer { inner: p, .. },
                TypeData::Pointer { inner: a, .. },
            )
            | (
                TypeData::Reference { inner: p, .. },
                TypeData::Reference { inner: a, .. },
            )
            | (TypeData::FixedArray { elem: p, .. }, TypeData::FixedArray { elem: a, .. })
            | (TypeData::DynArray(p), TypeData::DynArray(a))
            | (TypeData::Option(p), TypeData::Option(a))
            | (TypeData::Channel(p), TypeData::Channel(a)) => self.unify(p, a, weak),
            (
                TypeData::Map { key: pk, value: pv },
                TypeData::Map { key: ak, value: av },
            ) => {
                self.unify(pk, ak, weak)?;
                self.unify(pv, av, weak)
            }
            (TypeData::Result { ok: po, err: pe }, TypeData::Result { ok: ao, err: ae }) => {
                self.unify(po, ao, weak)?;
                self.unify(pe, ae, weak)
            }
            (TypeData::Tuple(ps), TypeData::Tuple(actuals)) if ps.len() == actuals.len() => {
                self.unify_all(&ps, &actuals, weak)
            }
            (
                TypeData::Function {
                    params: ps,
                    ret: pr,
                    ..
                },
                TypeData::Function {
                    params: actuals,
                    ret: ar,
                    ..
                },
            ) if ps.len() == actuals.len() => {
                self.unify_all(&ps, &actuals, weak)?;
                self.unify(pr, ar, weak)
            }
            (
                TypeData::Named { decl: pd, args: ps },
                TypeData::Named { decl: ad, args: actuals },
            )
            | (
                TypeData::Interface { decl: pd, args: ps },
                TypeData::Interface { decl: ad, args: actuals },
            ) if pd == ad => self.unify_all(&ps, &actuals, weak),
            // An interface pattern against an implementor: unify with the
            // matching `implements` entry.
            (TypeData::Interface { decl, args: ps }, TypeData::Named { .. }) => {
                let matching = table.interfaces_of(actual).into_iter().find_map(|iface| {
                    match table.lookup(iface) {
                        TypeData::Interface { decl: d, args } if d == decl => Some(args),
                        _ => None,
                    }
                });
                match matching {
                    Some(actuals) => self.unify_all(&ps, &actuals, weak),
                    None => Ok(()),
                }
            }
            // `?T` / `Result[T, E]` against a plain value lifts it.
            (TypeData::Option(p), _) | (TypeData::Result { ok: p, .. }, _) => {
                self.unify(p, actual, weak)
            }
            _ => Ok(()),
        }
    }

    fn unify_all(
        &mut self,
        patterns: &[TypeId],
        actuals: &[TypeId],
        weak: bool,
    ) -> Result<(), SolveError> {
        for (&p, &a) in patterns.iter().zip(actuals) {
            self.unify(p, a, weak)?;
        }
        Ok(())
    }

    fn bind(&mut self, var: TypeVar, actual: TypeId, weak: bool) -> Result<(), SolveError> {
        if let Some(&existing) = self.bindings.get(&var) {
            if existing == actual || weak {
                return Ok(());
            }
            return Err(SolveError::Conflicting {
                param: self.param_name(var),
                first: existing,
                second: actual,
            });
        }
        if weak {
            // Two literals still have to agree with each other.
            if let Some(&existing) = self.weak.get(&var) {
                if existing != actual {
                    return Err(SolveError::Conflicting {
                        param: self.param_name(var),
                        first: existing,
                        second: actual,
                    });
                }
                return Ok(());
            }
            self.weak.insert(var, actual);
        } else {
            self.bindings.insert(var, actual);
        }
        Ok(())
    }

    /// Re-check every binding against its interface constraints.
    fn finish(self, bound: Vec<(Name, GenericBinding)>) -> Result<Instantiation, SolveError> {
        let inst = Instantiation::new(self.table, bound);
        for param in self.generics {
            let Some(&ty) = inst.type_args.get(param.index as usize) else {
                continue;
            };
            for &constraint in param.constraints() {
                let constraint = inst.apply(self.table, constraint);
                if !self.table.assignable_in(ty, constraint, self.bounds) {
                    return Err(SolveError::ConstraintViolation {
                        param: param.name,
                        ty,
                        constraint,
                    });
                }
            }
        }
        Ok(inst)
    }
}

/// Const generic values must lie in the declared type's domain.
fn check_const_domain(param: Name, value: ConstValue, ty: TypeId) -> Result<(), SolveError> {
    let ok = match (Primitive::from_type_id(ty), value) {
        (Some(Primitive::Bool), ConstValue::Bool(_)) | (Some(Primitive::Rune), ConstValue::Rune(_)) => {
            true
        }
        (Some(prim), ConstValue::Int(n)) => prim
            .int_range()
            .is_some_and(|(min, max)| (min..=max).contains(&n)),
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(SolveError::ConstDomain { param, value, ty })
    }
}

#[cfg(test)]
mod tests;
