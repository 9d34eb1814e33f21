//! Resolution of written type annotations into interned types.

use kite_ir::{Name, ParsedType, StringInterner};

use super::TypeTable;
use crate::registry::{GenericParamDefKind, TypeDef};
use crate::{GenericParams, Primitive, TypeId};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ResolveError {
    UnknownType {
        name: Name,
    },
    GenericArgCount {
        name: Name,
        min: usize,
        max: usize,
        found: usize,
    },
    /// A const generic position given something other than a known
    /// constant.
    ConstArgExpected {
        name: Name,
        param: Name,
    },
}

impl TypeTable {
    /// Resolve `parsed` with the generic parameters of `scope` visible.
    pub fn resolve(
        &self,
        parsed: &ParsedType,
        scope: &GenericParams,
        names: &StringInterner,
    ) -> Result<TypeId, ResolveError> {
        let interner = self.interner();
        let go = |ty: &ParsedType| self.resolve(ty, scope, names);
        Ok(match parsed {
            ParsedType::Named { name, type_args } => {
                return self.resolve_named(*name, type_args, scope, names);
            }
            ParsedType::Pointer { mutable, inner } => interner.pointer(*mutable, go(inner)?),
            ParsedType::Reference { mutable, inner } => interner.reference(*mutable, go(inner)?),
            ParsedType::FixedArray { len, elem } => interner.fixed_array(*len, go(elem)?),
            ParsedType::DynArray(elem) => interner.dyn_array(go(elem)?),
            ParsedType::Map { key, value } => {
                let key = go(key)?;
                interner.map(key, go(value)?)
            }
            ParsedType::Tuple(elems) => {
                let elems = elems.iter().map(go).collect::<Result<Vec<_>, _>>()?;
                interner.tuple(&elems)
            }
            ParsedType::Function {
                params,
                variadic,
                ret,
            } => {
                let params = params.iter().map(go).collect::<Result<Vec<_>, _>>()?;
                interner.function(&params, *variadic, go(ret)?)
            }
            ParsedType::Option(inner) => interner.option(go(inner)?),
            ParsedType::Result { ok, err } => {
                let ok = go(ok)?;
                interner.result(ok, go(err)?)
            }
            ParsedType::Channel(inner) => interner.channel(go(inner)?),
            ParsedType::Union(members) => {
                let members = members.iter().map(go).collect::<Result<Vec<_>, _>>()?;
                interner.union(&members)
            }
            ParsedType::Never => TypeId::NEVER,
        })
    }

    fn resolve_named(
        &self,
        name: Name,
        type_args: &[ParsedType],
        scope: &GenericParams,
        names: &StringInterner,
    ) -> Result<TypeId, ResolveError> {
        let no_args = |ty: TypeId| {
            if type_args.is_empty() {
                Ok(ty)
            } else {
                Err(ResolveError::GenericArgCount {
                    name,
                    min: 0,
                    max: 0,
                    found: type_args.len(),
                })
            }
        };

        if let Some(param) = scope.find(name) {
            return no_args(self.interner().param(param.name, param.index));
        }

        match names.lookup(name) {
            "void" => return no_args(TypeId::UNIT),
            "never" => return no_args(TypeId::NEVER),
            text => {
                if let Some(prim) = Primitive::from_name(text) {
                    return no_args(prim.type_id());
                }
            }
        }

        match self.registry().type_def(name) {
            Some(TypeDef::Alias(target)) => no_args(target),
            Some(TypeDef::Decl(decl)) => {
                let info = self.registry().decl(decl);
                let generics = &info.generics;
                if type_args.len() > generics.len() || type_args.len() < generics.required_count()
                {
                    return Err(ResolveError::GenericArgCount {
                        name,
                        min: generics.required_count(),
                        max: generics.len(),
                        found: type_args.len(),
                    });
                }

                let mut args = Vec::with_capacity(generics.len());
                for param in generics {
                    let arg = match (type_args.get(param.index as usize), &param.kind) {
                        (Some(arg), GenericParamDefKind::Type { .. }) => {
                            self.resolve(arg, scope, names)?
                        }
                        (Some(arg), GenericParamDefKind::Const { .. }) => {
                            self.resolve_const_arg(arg, scope).ok_or(
                                ResolveError::ConstArgExpected {
                                    name,
                                    param: param.name,
                                },
                            )?
                        }
                        (None, _) => match param.default() {
                            Some(default) => self.substitute_params(default, &args),
                            None => TypeId::ERROR,
                        },
                    };
                    args.push(arg);
                }

                Ok(if info.is_interface() {
                    self.interner().interface(decl, &args)
                } else {
                    self.interner().named(decl, &args)
                })
            }
            None => Err(ResolveError::UnknownType { name }),
        }
    }

    /// A const generic argument in type position: a declared constant with
    /// a known value, or a const parameter of the enclosing declaration.
    fn resolve_const_arg(&self, arg: &ParsedType, scope: &GenericParams) -> Option<TypeId> {
        let name = arg.as_bare_name()?;
        if let Some(param) = scope.find(name).filter(|p| p.is_const()) {
            return Some(self.interner().param(param.name, param.index));
        }
        let value = self.registry().constant(name)?.value?;
        Some(self.interner().const_value(value))
    }
}
