use std::fmt;

use itertools::Itertools;

use crate::{
    ast::{Block, EffectRow, Expr, GenericParam, Ident, TypeExpr, Visibility, WherePredicate},
    span::Span,
    strutils,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Decl {
    pub kind: DeclKind,
    pub span: Span,
    pub doc: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeclKind {
    Fn(FnDecl),
    Struct(StructDecl),
    Enum(EnumDecl),
    Trait(TraitDecl),
    Impl(ImplDecl),
    TypeAlias(TypeAliasDecl),
    Const(ConstDecl),
    Mod(ModDecl),
    Use(UseDecl),
}

/// Everything about a function up to, but not including, its body.
#[derive(Clone, Debug, PartialEq)]
pub struct FnHeader {
    pub vis: Visibility,
    pub unsafety: bool,
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub params: Vec<Param>,
    pub ret: Option<TypeExpr>,
    pub effects: Option<EffectRow>,
    pub where_clause: Vec<WherePredicate>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FnDecl {
    pub header: FnHeader,
    /// `None` for a required trait method.
    pub body: Option<Block>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub kind: ParamKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParamKind {
    /// `self`, `mut self`
    SelfValue { mutable: bool },
    /// `&self`, `&mut self`
    SelfRef { mutable: bool },
    Named {
        mutable: bool,
        name: Ident,
        ty: TypeExpr,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    pub vis: Visibility,
    pub name: Ident,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StructBody {
    Named(Vec<FieldDecl>),
    Tuple(Vec<TypeExpr>),
    Unit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructDecl {
    pub vis: Visibility,
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub where_clause: Vec<WherePredicate>,
    pub body: StructBody,
}

#[derive(Clone, Debug, PartialEq)]
pub enum VariantPayload {
    Unit,
    Tuple(Vec<TypeExpr>),
    Named(Vec<FieldDecl>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    pub name: Ident,
    pub payload: VariantPayload,
    pub discriminant: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumDecl {
    pub vis: Visibility,
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub where_clause: Vec<WherePredicate>,
    pub variants: Vec<Variant>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TraitItem {
    Method(FnDecl),
    /// `type Item: Bound = Default;`
    AssocType {
        name: Ident,
        bounds: Vec<TypeExpr>,
        default: Option<TypeExpr>,
        span: Span,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct TraitDecl {
    pub vis: Visibility,
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub supertraits: Vec<TypeExpr>,
    pub where_clause: Vec<WherePredicate>,
    pub items: Vec<TraitItem>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ImplItem {
    Method(FnDecl),
    /// `type Item = Concrete;`
    TypeAssign { name: Ident, ty: TypeExpr, span: Span },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImplDecl {
    pub vis: Visibility,
    pub generics: Vec<GenericParam>,
    pub trait_ref: Option<TypeExpr>,
    pub target: TypeExpr,
    pub where_clause: Vec<WherePredicate>,
    pub items: Vec<ImplItem>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeAliasDecl {
    pub vis: Visibility,
    pub name: Ident,
    pub generics: Vec<GenericParam>,
    pub ty: TypeExpr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConstDecl {
    pub vis: Visibility,
    pub name: Ident,
    pub ty: Option<TypeExpr>,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModDecl {
    pub vis: Visibility,
    pub name: Ident,
    /// `None` for `mod name;`
    pub body: Option<Vec<Decl>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UseDecl {
    pub vis: Visibility,
    pub tree: UseTree,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UseTree {
    pub prefix: Vec<Ident>,
    pub kind: UseTreeKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum UseTreeKind {
    Simple { alias: Option<Ident> },
    Glob,
    Nested(Vec<UseTree>),
}

impl Decl {
    pub fn new(kind: DeclKind, span: Span) -> Decl {
        Decl {
            kind,
            span,
            doc: None,
        }
    }

    /// The declared name, if the declaration has one.
    pub fn name(&self) -> Option<&Ident> {
        match &self.kind {
            DeclKind::Fn(f) => Some(&f.header.name),
            DeclKind::Struct(s) => Some(&s.name),
            DeclKind::Enum(e) => Some(&e.name),
            DeclKind::Trait(t) => Some(&t.name),
            DeclKind::TypeAlias(t) => Some(&t.name),
            DeclKind::Const(c) => Some(&c.name),
            DeclKind::Mod(m) => Some(&m.name),
            DeclKind::Impl(_) | DeclKind::Use(_) => None,
        }
    }
}

fn fmt_generics(generics: &[GenericParam]) -> String {
    if generics.is_empty() {
        String::new()
    } else {
        format!("[{}]", generics.iter().join(", "))
    }
}

fn fmt_where(preds: &[WherePredicate]) -> String {
    if preds.is_empty() {
        String::new()
    } else {
        format!(" where {}", preds.iter().join(", "))
    }
}

fn fmt_body<T: fmt::Display>(head: String, items: &[T]) -> String {
    if items.is_empty() {
        format!("({})", head)
    } else {
        format!("({}\n{}\n)", head, strutils::indent_lines_iter(items, 2))
    }
}

impl fmt::Display for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DeclKind::Fn(func) => write!(f, "{}", func),
            DeclKind::Struct(s) => {
                let head = format!(
                    "struct {}{}{}{}",
                    s.vis,
                    s.name,
                    fmt_generics(&s.generics),
                    fmt_where(&s.where_clause)
                );
                match &s.body {
                    StructBody::Named(fields) => write!(f, "{}", fmt_body(head, fields)),
                    StructBody::Tuple(tys) => write!(f, "({} ({}))", head, tys.iter().join(", ")),
                    StructBody::Unit => write!(f, "({})", head),
                }
            }
            DeclKind::Enum(e) => {
                let head = format!(
                    "enum {}{}{}{}",
                    e.vis,
                    e.name,
                    fmt_generics(&e.generics),
                    fmt_where(&e.where_clause)
                );
                write!(f, "{}", fmt_body(head, &e.variants))
            }
            DeclKind::Trait(t) => {
                let mut head = format!("trait {}{}{}", t.vis, t.name, fmt_generics(&t.generics));
                if !t.supertraits.is_empty() {
                    head.push_str(&format!(": {}", t.supertraits.iter().join(" + ")));
                }
                head.push_str(&fmt_where(&t.where_clause));
                write!(f, "{}", fmt_body(head, &t.items))
            }
            DeclKind::Impl(i) => {
                let mut head = format!("{}impl{}", i.vis, fmt_generics(&i.generics));
                if let Some(trait_ref) = &i.trait_ref {
                    head.push_str(&format!(" {} for", trait_ref));
                }
                head.push_str(&format!(" {}{}", i.target, fmt_where(&i.where_clause)));
                write!(f, "{}", fmt_body(head, &i.items))
            }
            DeclKind::TypeAlias(t) => write!(
                f,
                "(type {}{}{} = {})",
                t.vis,
                t.name,
                fmt_generics(&t.generics),
                t.ty
            ),
            DeclKind::Const(c) => match &c.ty {
                Some(ty) => write!(f, "(const {}{}: {} {})", c.vis, c.name, ty, c.value),
                None => write!(f, "(const {}{} {})", c.vis, c.name, c.value),
            },
            DeclKind::Mod(m) => match &m.body {
                Some(decls) => write!(f, "{}", fmt_body(format!("mod {}{}", m.vis, m.name), decls)),
                None => write!(f, "(mod {}{};)", m.vis, m.name),
            },
            DeclKind::Use(u) => write!(f, "(use {}{})", u.vis, u.tree),
        }
    }
}

impl fmt::Display for FnHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}({})",
            self.vis,
            if self.unsafety { "unsafe " } else { "" },
            self.name,
            fmt_generics(&self.generics),
            self.params.iter().join(", ")
        )?;
        if let Some(ret) = &self.ret {
            write!(f, " -> {}", ret)?;
        }
        if let Some(effects) = &self.effects {
            write!(f, " {}", effects)?;
        }
        write!(f, "{}", fmt_where(&self.where_clause))
    }
}

impl fmt::Display for FnDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            Some(body) => write!(
                f,
                "(fn {}\n{}\n)",
                self.header,
                strutils::indent_lines(body, 2)
            ),
            None => write!(f, "(fn {};)", self.header),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParamKind::SelfValue { mutable: true } => write!(f, "mut self"),
            ParamKind::SelfValue { mutable: false } => write!(f, "self"),
            ParamKind::SelfRef { mutable: true } => write!(f, "&mut self"),
            ParamKind::SelfRef { mutable: false } => write!(f, "&self"),
            ParamKind::Named { mutable, name, ty } => {
                if *mutable {
                    write!(f, "mut {}: {}", name, ty)
                } else {
                    write!(f, "{}: {}", name, ty)
                }
            }
        }
    }
}

impl fmt::Display for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}: {}", self.vis, self.name, self.ty)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            VariantPayload::Unit => write!(f, "{}", self.name)?,
            VariantPayload::Tuple(tys) => write!(f, "{}({})", self.name, tys.iter().join(", "))?,
            VariantPayload::Named(fields) => {
                write!(f, "{} {{ {} }}", self.name, fields.iter().join(", "))?
            }
        }
        if let Some(value) = &self.discriminant {
            write!(f, " = {}", value)?;
        }
        Ok(())
    }
}

impl fmt::Display for TraitItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraitItem::Method(func) => write!(f, "{}", func),
            TraitItem::AssocType {
                name,
                bounds,
                default,
                ..
            } => {
                write!(f, "(type {}", name)?;
                if !bounds.is_empty() {
                    write!(f, ": {}", bounds.iter().join(" + "))?;
                }
                if let Some(default) = default {
                    write!(f, " = {}", default)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for ImplItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImplItem::Method(func) => write!(f, "{}", func),
            ImplItem::TypeAssign { name, ty, .. } => write!(f, "(type {} = {})", name, ty),
        }
    }
}

impl fmt::Display for UseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.prefix.iter().join("::");
        match &self.kind {
            UseTreeKind::Simple { alias: Some(alias) } => write!(f, "{} as {}", prefix, alias),
            UseTreeKind::Simple { alias: None } => write!(f, "{}", prefix),
            UseTreeKind::Glob if prefix.is_empty() => write!(f, "*"),
            UseTreeKind::Glob => write!(f, "{}::*", prefix),
            UseTreeKind::Nested(trees) if prefix.is_empty() => {
                write!(f, "{{{}}}", trees.iter().join(", "))
            }
            UseTreeKind::Nested(trees) => write!(f, "{}::{{{}}}", prefix, trees.iter().join(", ")),
        }
    }
}
