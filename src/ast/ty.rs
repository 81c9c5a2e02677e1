use std::fmt;

use itertools::Itertools;

use crate::{
    ast::{Expr, Ident, Respan},
    span::Span,
};

#[derive(Clone, Debug, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantifier {
    Exists,
    Forall,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeKind {
    /// `int`, `Vec[T]`
    Named { name: Ident, args: Vec<TypeExpr> },
    /// `Self::Item`
    Projection { base: Box<TypeExpr>, assoc: Ident },
    Pointer(Box<TypeExpr>),
    Reference { mutable: bool, inner: Box<TypeExpr> },
    Optional(Box<TypeExpr>),
    Function {
        type_params: Vec<GenericParam>,
        params: Vec<TypeExpr>,
        ret: Option<Box<TypeExpr>>,
        effects: Option<EffectRow>,
    },
    Chan(Box<TypeExpr>),
    Tuple(Vec<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array { elem: Box<TypeExpr>, len: Box<Expr> },
    Record { fields: Vec<TypeField>, rest: Option<Ident> },
    Quantified {
        quantifier: Quantifier,
        params: Vec<GenericParam>,
        body: Box<TypeExpr>,
    },
    /// `_`
    Infer,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeField {
    pub name: Ident,
    pub ty: TypeExpr,
}

/// `/ IO` or `/ { IO, Net | R }`
#[derive(Clone, Debug, PartialEq)]
pub struct EffectRow {
    pub effects: Vec<TypeExpr>,
    pub rest: Option<Ident>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GenericParam {
    pub kind: GenericParamKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GenericParamKind {
    /// `T: Bound + Other`
    Type { name: Ident, bounds: Vec<TypeExpr> },
    /// `const N: usize`
    Const { name: Ident, ty: TypeExpr },
    /// A type constructor such as `F[_]`, with its arity.
    Constructor {
        name: Ident,
        arity: usize,
        bounds: Vec<TypeExpr>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct WherePredicate {
    pub ty: TypeExpr,
    pub bounds: Vec<TypeExpr>,
    pub span: Span,
}

impl TypeExpr {
    pub fn new(kind: TypeKind, span: Span) -> TypeExpr {
        TypeExpr { kind, span }
    }
}

impl Respan for TypeExpr {
    fn respan(&mut self, span: Span) {
        self.span = span;
    }
}

fn fmt_bounds(bounds: &[TypeExpr]) -> String {
    bounds.iter().join(" + ")
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Named { name, args } => {
                if args.is_empty() {
                    write!(f, "{}", name)
                } else {
                    write!(f, "{}[{}]", name, args.iter().join(", "))
                }
            }
            TypeKind::Projection { base, assoc } => write!(f, "{}::{}", base, assoc),
            TypeKind::Pointer(inner) => write!(f, "(ptr {})", inner),
            TypeKind::Reference { mutable, inner } => {
                if *mutable {
                    write!(f, "(ref mut {})", inner)
                } else {
                    write!(f, "(ref {})", inner)
                }
            }
            TypeKind::Optional(inner) => write!(f, "(optional {})", inner),
            TypeKind::Function {
                type_params,
                params,
                ret,
                effects,
            } => {
                write!(f, "(fn")?;
                if !type_params.is_empty() {
                    write!(f, "[{}]", type_params.iter().join(", "))?;
                }
                write!(f, " ({})", params.iter().join(", "))?;
                if let Some(ret) = ret {
                    write!(f, " -> {}", ret)?;
                }
                if let Some(effects) = effects {
                    write!(f, " {}", effects)?;
                }
                write!(f, ")")
            }
            TypeKind::Chan(inner) => write!(f, "(chan {})", inner),
            TypeKind::Tuple(items) => {
                if items.is_empty() {
                    write!(f, "(tuple)")
                } else {
                    write!(f, "(tuple {})", items.iter().join(" "))
                }
            }
            TypeKind::Slice(elem) => write!(f, "(slice {})", elem),
            TypeKind::Array { elem, len } => write!(f, "(array {} {})", elem, len),
            TypeKind::Record { fields, rest } => {
                write!(f, "(record")?;
                for field in fields.iter() {
                    write!(f, " ({} {})", field.name, field.ty)?;
                }
                if let Some(rest) = rest {
                    write!(f, " | {}", rest)?;
                }
                write!(f, ")")
            }
            TypeKind::Quantified {
                quantifier,
                params,
                body,
            } => {
                let q = match quantifier {
                    Quantifier::Exists => "exists",
                    Quantifier::Forall => "forall",
                };
                write!(f, "({} [{}] {})", q, params.iter().join(", "), body)
            }
            TypeKind::Infer => write!(f, "_"),
        }
    }
}

impl fmt::Display for EffectRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/ {{{}", self.effects.iter().join(", "))?;
        if let Some(rest) = &self.rest {
            write!(f, " | {}", rest)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for GenericParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            GenericParamKind::Type { name, bounds } => {
                if bounds.is_empty() {
                    write!(f, "{}", name)
                } else {
                    write!(f, "{}: {}", name, fmt_bounds(bounds))
                }
            }
            GenericParamKind::Const { name, ty } => write!(f, "const {}: {}", name, ty),
            GenericParamKind::Constructor {
                name,
                arity,
                bounds,
            } => {
                let holes = vec!["_"; *arity].join(", ");
                if bounds.is_empty() {
                    write!(f, "{}[{}]", name, holes)
                } else {
                    write!(f, "{}[{}]: {}", name, holes, fmt_bounds(bounds))
                }
            }
        }
    }
}

impl fmt::Display for WherePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.ty, fmt_bounds(&self.bounds))
    }
}
