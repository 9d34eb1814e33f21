//! Source-like rendering of types for diagnostics.

use std::fmt::Write;

use kite_ir::StringInterner;

use super::TypeTable;
use crate::{TypeData, TypeId};

impl TypeTable {
    /// Render `ty` the way it would be written in source.
    pub fn display(&self, ty: TypeId, names: &StringInterner) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty, names);
        out
    }

    fn write_list(&self, out: &mut String, types: &[TypeId], names: &StringInterner) {
        for (i, &ty) in types.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_type(out, ty, names);
        }
    }

    fn write_type(&self, out: &mut String, ty: TypeId, names: &StringInterner) {
        match self.lookup(ty) {
            TypeData::Primitive(p) => out.push_str(p.name()),
            TypeData::Unit => out.push_str("void"),
            TypeData::Never => out.push_str("never"),
            TypeData::Error => out.push_str("<error>"),
            TypeData::UntypedNone => out.push_str("none"),
            TypeData::UntypedNil => out.push_str("nil"),
            TypeData::Pointer { mutable, inner } => {
                out.push_str(if mutable { "*mut " } else { "*" });
                self.write_type(out, inner, names);
            }
            TypeData::Reference { mutable, inner } => {
                out.push_str(if mutable { "&mut " } else { "&" });
                self.write_type(out, inner, names);
            }
            TypeData::FixedArray { len, elem } => {
                let _ = write!(out, "[{len}]");
                self.write_type(out, elem, names);
            }
            TypeData::DynArray(elem) => {
                out.push_str("[]");
                self.write_type(out, elem, names);
            }
            TypeData::Map { key, value } => {
                out.push_str("map[");
                self.write_type(out, key, names);
                out.push(']');
                self.write_type(out, value, names);
            }
            TypeData::Tuple(elems) => {
                out.push('(');
                self.write_list(out, &elems, names);
                out.push(')');
            }
            TypeData::Function {
                params,
                variadic,
                ret,
            } => {
                out.push_str("fn (");
                for (i, &p) in params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if variadic && i + 1 == params.len() {
                        out.push_str("...");
                    }
                    self.write_type(out, p, names);
                }
                out.push(')');
                if ret != TypeId::UNIT {
                    out.push(' ');
                    self.write_type(out, ret, names);
                }
            }
            TypeData::Option(inner) => {
                out.push('?');
                self.write_type(out, inner, names);
            }
            TypeData::Result { ok, err } => {
                out.push_str("Result[");
                self.write_list(out, &[ok, err], names);
                out.push(']');
            }
            TypeData::Channel(inner) => {
                out.push_str("chan ");
                self.write_type(out, inner, names);
            }
            TypeData::Named { decl, args } | TypeData::Interface { decl, args } => {
                out.push_str(names.lookup(self.registry().decl(decl).name));
                if !args.is_empty() {
                    out.push('[');
                    self.write_list(out, &args, names);
                    out.push(']');
                }
            }
            TypeData::Union(members) => {
                for (i, &m) in members.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    self.write_type(out, m, names);
                }
            }
            TypeData::Param { name, .. } => out.push_str(names.lookup(name)),
            TypeData::Var(var) => {
                let _ = write!(out, "$T{}", var.0);
            }
            TypeData::Const(value) => {
                let _ = write!(out, "{value}");
            }
        }
    }
}
