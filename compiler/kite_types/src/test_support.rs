//! Shared fixtures for unit tests.

use std::sync::Once;

use kite_ir::{
    BinaryOp, ExprArena, ExprId, ExprKind, FieldInit, GenericArg, MapEntry, MatchArm,
    MatchPattern, Name, ParsedType, Span, Stmt, StmtKind, StringInterner, UnaryOp,
};

use crate::registry::{DeclInfo, InterfaceInfo, StructInfo};
use crate::{DeclId, DeclKind, GenericParams, TypeId, TypeTable};

static TRACING_INIT: Once = Once::new();

/// Install a subscriber when `RUST_LOG` is set, e.g.
/// `RUST_LOG=kite_types=trace cargo test -p kite_types`.
pub(crate) fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_test_writer().with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

/// A small declaration set: a sealed `Animal` interface implemented by
/// `Dog`, `Cat` and `Bird`, an open `Pet` interface implemented by `Dog`
/// and `Cat` only.
pub(crate) struct Zoo {
    pub table: TypeTable,
    pub names: StringInterner,
    pub animal: TypeId,
    pub pet: TypeId,
    pub dog: TypeId,
    pub cat: TypeId,
    pub bird: TypeId,
}

fn declare(table: &mut TypeTable, name: Name, kind: DeclKind) -> DeclId {
    table
        .registry_mut()
        .add_decl(DeclInfo {
            name,
            generics: GenericParams::default(),
            kind,
            span: Span::DUMMY,
        })
        .unwrap_or_else(|| panic!("duplicate declaration"))
}

fn interface(sealed: bool) -> DeclKind {
    DeclKind::Interface(InterfaceInfo {
        sealed,
        implementors: Vec::new(),
    })
}

pub(crate) fn zoo() -> Zoo {
    let names = StringInterner::new();
    let mut table = TypeTable::new();

    let animal_decl = declare(&mut table, names.intern("Animal"), interface(true));
    let pet_decl = declare(&mut table, names.intern("Pet"), interface(false));
    let animal = table.interner().interface(animal_decl, &[]);
    let pet = table.interner().interface(pet_decl, &[]);

    let implementor = |table: &mut TypeTable, name: &str, implements: Vec<TypeId>| {
        let decl = declare(
            table,
            names.intern(name),
            DeclKind::Struct(StructInfo {
                fields: vec![(names.intern("name"), TypeId::STRING)],
                implements,
            }),
        );
        if let DeclKind::Interface(info) = &mut table.registry_mut().decl_mut(animal_decl).kind {
            info.implementors.push(decl);
        }
        table.interner().named(decl, &[])
    };
    let dog = implementor(&mut table, "Dog", vec![animal, pet]);
    let cat = implementor(&mut table, "Cat", vec![animal, pet]);
    let bird = implementor(&mut table, "Bird", vec![animal]);

    Zoo {
        table,
        names,
        animal,
        pet,
        dog,
        cat,
        bird,
    }
}

/// Builds expression trees by hand. Every node gets its own one-byte span
/// so errors can be matched to the node that caused them.
pub(crate) struct Ast<'n> {
    pub arena: ExprArena,
    names: &'n StringInterner,
    next_offset: u32,
}

impl<'n> Ast<'n> {
    pub fn new(names: &'n StringInterner) -> Self {
        Ast {
            arena: ExprArena::new(),
            names,
            next_offset: 0,
        }
    }

    pub fn name(&self, s: &str) -> Name {
        self.names.intern(s)
    }

    pub fn ty(&self, s: &str) -> ParsedType {
        ParsedType::named(self.name(s))
    }

    /// A span no other node has.
    pub fn span(&mut self) -> Span {
        let start = self.next_offset;
        self.next_offset += 1;
        Span::new(start, start + 1)
    }

    pub fn span_of(&self, id: ExprId) -> Span {
        self.arena.get_expr(id).span
    }

    fn alloc(&mut self, kind: ExprKind) -> ExprId {
        let span = self.span();
        self.arena.alloc(kind, span)
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.alloc(ExprKind::Int(value))
    }

    pub fn float(&mut self, value: f64) -> ExprId {
        self.alloc(ExprKind::Float(value.to_bits()))
    }

    pub fn bool(&mut self, value: bool) -> ExprId {
        self.alloc(ExprKind::Bool(value))
    }

    pub fn str(&mut self, value: &str) -> ExprId {
        let name = self.name(value);
        self.alloc(ExprKind::Str(name))
    }

    pub fn none(&mut self) -> ExprId {
        self.alloc(ExprKind::NoneLit)
    }

    pub fn nil(&mut self) -> ExprId {
        self.alloc(ExprKind::Nil)
    }

    pub fn ident(&mut self, name: &str) -> ExprId {
        let name = self.name(name);
        self.alloc(ExprKind::Ident(name))
    }

    pub fn variant(&mut self, enum_name: &str, variant: &str) -> ExprId {
        let (enum_name, variant) = (self.name(enum_name), self.name(variant));
        self.alloc(ExprKind::EnumVariant { enum_name, variant })
    }

    pub fn field(&mut self, receiver: ExprId, field: &str) -> ExprId {
        let field = self.name(field);
        self.alloc(ExprKind::Field { receiver, field })
    }

    pub fn index(&mut self, receiver: ExprId, index: ExprId) -> ExprId {
        self.alloc(ExprKind::Index { receiver, index })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.alloc(ExprKind::Unary { op, operand })
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.alloc(ExprKind::Binary { op, left, right })
    }

    pub fn call(&mut self, callee: &str, args: &[ExprId]) -> ExprId {
        self.call_generic(callee, Vec::new(), args)
    }

    pub fn call_generic(
        &mut self,
        callee: &str,
        generic_args: Vec<GenericArg>,
        args: &[ExprId],
    ) -> ExprId {
        let callee = self.name(callee);
        let generic_args = self.arena.alloc_generic_args(generic_args);
        let args = self.arena.alloc_expr_list(args.iter().copied());
        self.alloc(ExprKind::Call {
            callee,
            generic_args,
            args,
        })
    }

    pub fn method_call(&mut self, receiver: ExprId, method: &str, args: &[ExprId]) -> ExprId {
        let method = self.name(method);
        let args = self.arena.alloc_expr_list(args.iter().copied());
        self.alloc(ExprKind::MethodCall {
            receiver,
            method,
            args,
        })
    }

    pub fn mut_arg(&mut self, operand: ExprId) -> ExprId {
        self.alloc(ExprKind::MutArg(operand))
    }

    pub fn reference(&mut self, mutable: bool, operand: ExprId) -> ExprId {
        self.alloc(ExprKind::Ref { mutable, operand })
    }

    pub fn struct_lit(&mut self, name: &str, fields: &[(&str, ExprId)]) -> ExprId {
        self.struct_lit_generic(name, Vec::new(), fields)
    }

    pub fn struct_lit_generic(
        &mut self,
        name: &str,
        generic_args: Vec<GenericArg>,
        fields: &[(&str, ExprId)],
    ) -> ExprId {
        let name = self.name(name);
        let inits: Vec<FieldInit> = fields
            .iter()
            .map(|&(field, value)| FieldInit {
                name: self.name(field),
                value,
                span: Span::DUMMY,
            })
            .collect();
        let generic_args = self.arena.alloc_generic_args(generic_args);
        let fields = self.arena.alloc_field_inits(inits);
        self.alloc(ExprKind::StructLit {
            name,
            generic_args,
            fields,
        })
    }

    pub fn array(&mut self, elems: &[ExprId]) -> ExprId {
        let elems = self.arena.alloc_expr_list(elems.iter().copied());
        self.alloc(ExprKind::ArrayLit(elems))
    }

    pub fn map(&mut self, entries: &[(ExprId, ExprId)]) -> ExprId {
        let entries = self
            .arena
            .alloc_map_entries(entries.iter().map(|&(key, value)| MapEntry {
                key,
                value,
                span: Span::DUMMY,
            }));
        self.alloc(ExprKind::MapLit(entries))
    }

    pub fn tuple(&mut self, elems: &[ExprId]) -> ExprId {
        let elems = self.arena.alloc_expr_list(elems.iter().copied());
        self.alloc(ExprKind::Tuple(elems))
    }

    pub fn is(&mut self, operand: ExprId, ty: &str) -> ExprId {
        let ty = self.ty(ty);
        self.alloc(ExprKind::Is {
            operand,
            ty,
            negated: false,
        })
    }

    pub fn is_not(&mut self, operand: ExprId, ty: &str) -> ExprId {
        let ty = self.ty(ty);
        self.alloc(ExprKind::Is {
            operand,
            ty,
            negated: true,
        })
    }

    /// `operand == none`, or `operand != none` when `negated`.
    pub fn none_check(&mut self, operand: ExprId, negated: bool) -> ExprId {
        self.alloc(ExprKind::NoneCheck { operand, negated })
    }

    pub fn if_(&mut self, cond: ExprId, then_branch: ExprId, else_branch: ExprId) -> ExprId {
        self.alloc(ExprKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn if_guard(
        &mut self,
        binding: &str,
        value: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    ) -> ExprId {
        let binding = self.name(binding);
        self.alloc(ExprKind::IfGuard {
            binding,
            value,
            then_branch,
            else_branch,
        })
    }

    pub fn type_arm(&mut self, ty: &str, body: ExprId) -> MatchArm {
        MatchArm {
            pattern: MatchPattern::Type(self.ty(ty)),
            body,
            span: self.span(),
        }
    }

    pub fn value_arm(&mut self, value: ExprId, body: ExprId) -> MatchArm {
        MatchArm {
            pattern: MatchPattern::Value(value),
            body,
            span: self.span(),
        }
    }

    pub fn match_(&mut self, scrutinee: ExprId, arms: Vec<MatchArm>, else_branch: ExprId) -> ExprId {
        let arms = self.arena.alloc_arms(arms);
        self.alloc(ExprKind::Match {
            scrutinee,
            arms,
            else_branch,
        })
    }

    pub fn block(&mut self, stmts: Vec<Stmt>, result: ExprId) -> ExprId {
        let stmts = self.arena.alloc_stmts(stmts);
        self.alloc(ExprKind::Block { stmts, result })
    }

    pub fn let_(&mut self, name: &str, ty: Option<ParsedType>, init: ExprId) -> Stmt {
        self.binding(name, false, ty, init)
    }

    pub fn let_mut(&mut self, name: &str, ty: Option<ParsedType>, init: ExprId) -> Stmt {
        self.binding(name, true, ty, init)
    }

    fn binding(&mut self, name: &str, mutable: bool, ty: Option<ParsedType>, init: ExprId) -> Stmt {
        Stmt {
            kind: StmtKind::Let {
                name: self.name(name),
                mutable,
                ty,
                init,
            },
            span: self.span(),
        }
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId) -> Stmt {
        Stmt {
            kind: StmtKind::Assign { target, value },
            span: self.span(),
        }
    }

    pub fn stmt(&mut self, expr: ExprId) -> Stmt {
        Stmt {
            kind: StmtKind::Expr(expr),
            span: self.span(),
        }
    }

    pub fn ret(&mut self, value: ExprId) -> ExprId {
        self.alloc(ExprKind::Return(value))
    }

    pub fn brk(&mut self) -> ExprId {
        self.alloc(ExprKind::Break)
    }

    pub fn cont(&mut self) -> ExprId {
        self.alloc(ExprKind::Continue)
    }

    pub fn loop_(&mut self, cond: ExprId, body: ExprId) -> ExprId {
        self.alloc(ExprKind::Loop { cond, body })
    }
}
