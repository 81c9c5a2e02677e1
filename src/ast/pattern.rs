use std::fmt;

use itertools::Itertools;

use crate::{
    ast::{Ident, Literal, Respan},
    span::Span,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PatternKind {
    Wildcard,
    /// `..` inside a tuple, slice or tuple-struct pattern
    Rest,
    Binding {
        name: Ident,
        mutable: bool,
        by_ref: bool,
        sub: Option<Box<Pattern>>,
    },
    Literal(Literal),
    Range {
        start: Literal,
        end: Literal,
        inclusive: bool,
    },
    Tuple(Vec<Pattern>),
    Slice(Vec<Pattern>),
    /// `Some(x)`
    TupleStruct {
        path: Vec<Ident>,
        elems: Vec<Pattern>,
    },
    /// `Shape::Circle(r)` or `Color::Red`
    Variant {
        path: Vec<Ident>,
        payload: Option<Vec<Pattern>>,
    },
    Struct {
        path: Vec<Ident>,
        fields: Vec<FieldPattern>,
        rest: bool,
    },
    Ref {
        mutable: bool,
        pattern: Box<Pattern>,
    },
    Box(Box<Pattern>),
    Or(Vec<Pattern>),
}

/// `name: pattern`, or the shorthand `name` which binds the field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldPattern {
    pub name: Ident,
    pub pattern: Option<Pattern>,
    pub span: Span,
}

impl Pattern {
    pub fn new(kind: PatternKind, span: Span) -> Pattern {
        Pattern { kind, span }
    }

    /// Whether this pattern is, or binds, a rest `..`.
    pub fn is_rest(&self) -> bool {
        match &self.kind {
            PatternKind::Rest => true,
            PatternKind::Binding { sub: Some(sub), .. } => sub.is_rest(),
            _ => false,
        }
    }
}

impl Respan for Pattern {
    fn respan(&mut self, span: Span) {
        self.span = span;
    }
}

fn fmt_path(path: &[Ident]) -> String {
    path.iter().join("::")
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PatternKind::Wildcard => write!(f, "_"),
            PatternKind::Rest => write!(f, ".."),
            PatternKind::Binding {
                name,
                mutable,
                by_ref,
                sub,
            } => {
                let name = match (by_ref, mutable) {
                    (true, true) => format!("ref mut {}", name),
                    (true, false) => format!("ref {}", name),
                    (false, true) => format!("mut {}", name),
                    (false, false) => name.to_string(),
                };
                match sub {
                    Some(sub) => write!(f, "(@ {} {})", name, sub),
                    None => write!(f, "{}", name),
                }
            }
            PatternKind::Literal(lit) => write!(f, "{}", lit),
            PatternKind::Range {
                start,
                end,
                inclusive,
            } => {
                let limits = if *inclusive { "..=" } else { ".." };
                write!(f, "(range {} {} {})", start, limits, end)
            }
            PatternKind::Tuple(elems) => {
                if elems.is_empty() {
                    write!(f, "(tuple)")
                } else {
                    write!(f, "(tuple {})", elems.iter().join(" "))
                }
            }
            PatternKind::Slice(elems) => {
                if elems.is_empty() {
                    write!(f, "(slice)")
                } else {
                    write!(f, "(slice {})", elems.iter().join(" "))
                }
            }
            PatternKind::TupleStruct { path, elems } => {
                if elems.is_empty() {
                    write!(f, "({})", fmt_path(path))
                } else {
                    write!(f, "({} {})", fmt_path(path), elems.iter().join(" "))
                }
            }
            PatternKind::Variant { path, payload } => match payload {
                Some(elems) if !elems.is_empty() => {
                    write!(f, "({} {})", fmt_path(path), elems.iter().join(" "))
                }
                Some(_) => write!(f, "({})", fmt_path(path)),
                None => write!(f, "{}", fmt_path(path)),
            },
            PatternKind::Struct { path, fields, rest } => {
                write!(f, "(struct {}", fmt_path(path))?;
                for field in fields.iter() {
                    match &field.pattern {
                        Some(p) => write!(f, " ({} {})", field.name, p)?,
                        None => write!(f, " {}", field.name)?,
                    }
                }
                if *rest {
                    write!(f, " ..")?;
                }
                write!(f, ")")
            }
            PatternKind::Ref { mutable, pattern } => {
                if *mutable {
                    write!(f, "(ref mut {})", pattern)
                } else {
                    write!(f, "(ref {})", pattern)
                }
            }
            PatternKind::Box(pattern) => write!(f, "(box {})", pattern),
            PatternKind::Or(alts) => write!(f, "(or {})", alts.iter().join(" ")),
        }
    }
}
