use std::fmt;

use itertools::Itertools;

use crate::{
    ast::{AssignOp, BinaryOp, Ident, Pattern, Respan, Stmt, TypeExpr, UnaryOp},
    span::Span,
    strutils,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(String),
    Float(String),
    Str(String),
    Char(char),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(s) | Literal::Float(s) => write!(f, "{}", s),
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Char(c) => write!(f, "{:?}", c),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Name(Ident),
    Path {
        base: Box<Expr>,
        member: Ident,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Ref {
        mutable: bool,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Range {
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
        inclusive: bool,
    },
    Cast {
        expr: Box<Expr>,
        ty: TypeExpr,
    },
    /// `chan <- value`
    Send {
        chan: Box<Expr>,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Indexing or generic arguments: `a[i]`, `Vec[int]`.
    Index {
        base: Box<Expr>,
        args: Vec<Expr>,
    },
    Field {
        base: Box<Expr>,
        field: Ident,
    },
    Try(Box<Expr>),
    Tuple(Vec<Expr>),
    Array(Vec<Expr>),
    Block(Block),
    Unsafe(Block),
    Map(Vec<MapEntry>),
    Record(Vec<FieldInit>),
    Struct {
        name: Box<Expr>,
        fields: Vec<FieldInit>,
    },
    If {
        cond: Box<Expr>,
        then: Block,
        otherwise: Option<Box<Expr>>,
    },
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    Closure {
        params: Vec<ClosureParam>,
        ret: Option<TypeExpr>,
        body: Box<Expr>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub tail: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
}

/// `name: value` inside a record or struct literal; shorthand `name` stores
/// the name itself as the value.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldInit {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Expr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClosureParam {
    pub pattern: Pattern,
    pub ty: Option<TypeExpr>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Expr {
        Expr { kind, span }
    }

    /// Whether the expression ends in a block and can therefore stand as a
    /// statement without a trailing `;`.
    pub fn is_block_like(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Block(_) | ExprKind::Unsafe(_) | ExprKind::If { .. } | ExprKind::Match { .. }
        )
    }

    pub fn is_call(&self) -> bool {
        matches!(self.kind, ExprKind::Call { .. })
    }
}

impl Respan for Expr {
    fn respan(&mut self, span: Span) {
        self.span = span;
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(lit) => write!(f, "{}", lit),
            ExprKind::Name(name) => write!(f, "{}", name),
            ExprKind::Path { base, member } => write!(f, "{}::{}", base, member),
            ExprKind::Unary { op, expr } => match op {
                UnaryOp::Deref => write!(f, "(deref {})", expr),
                UnaryOp::Recv => write!(f, "(recv {})", expr),
                _ => write!(f, "(unaryop {} {})", op, expr),
            },
            ExprKind::Ref { mutable, expr } => {
                if *mutable {
                    write!(f, "(ref mut {})", expr)
                } else {
                    write!(f, "(ref {})", expr)
                }
            }
            ExprKind::Binary { op, lhs, rhs } => write!(f, "(binop {} {} {})", lhs, op, rhs),
            ExprKind::Assign { op, lhs, rhs } => write!(f, "(assign {} {} {})", lhs, op, rhs),
            ExprKind::Range {
                start,
                end,
                inclusive,
            } => {
                let limits = if *inclusive { "..=" } else { ".." };
                write!(f, "(range")?;
                if let Some(start) = start {
                    write!(f, " {}", start)?;
                }
                write!(f, " {}", limits)?;
                if let Some(end) = end {
                    write!(f, " {}", end)?;
                }
                write!(f, ")")
            }
            ExprKind::Cast { expr, ty } => write!(f, "(cast {} as {})", expr, ty),
            ExprKind::Send { chan, value } => write!(f, "(send {} {})", chan, value),
            ExprKind::Call { callee, args } => {
                if args.is_empty() {
                    write!(f, "(call {})", callee)
                } else {
                    write!(f, "(call {} {})", callee, args.iter().join(" "))
                }
            }
            ExprKind::Index { base, args } => {
                write!(f, "(index {} {})", base, args.iter().join(" "))
            }
            ExprKind::Field { base, field } => write!(f, "{}.{}", base, field),
            ExprKind::Try(expr) => write!(f, "(try {})", expr),
            ExprKind::Tuple(items) => {
                if items.is_empty() {
                    write!(f, "(tuple)")
                } else {
                    write!(f, "(tuple {})", items.iter().join(" "))
                }
            }
            ExprKind::Array(items) => {
                if items.is_empty() {
                    write!(f, "(array)")
                } else {
                    write!(f, "(array {})", items.iter().join(" "))
                }
            }
            ExprKind::Block(block) => write!(f, "{}", block),
            ExprKind::Unsafe(block) => write!(f, "(unsafe {})", block),
            ExprKind::Map(entries) => {
                if entries.is_empty() {
                    write!(f, "(map)")
                } else {
                    let entries = entries
                        .iter()
                        .map(|e| format!("({} {})", e.key, e.value))
                        .join(" ");
                    write!(f, "(map {})", entries)
                }
            }
            ExprKind::Record(fields) => {
                if fields.is_empty() {
                    write!(f, "(record)")
                } else {
                    write!(f, "(record {})", fields.iter().join(" "))
                }
            }
            ExprKind::Struct { name, fields } => {
                if fields.is_empty() {
                    write!(f, "(struct {})", name)
                } else {
                    write!(f, "(struct {} {})", name, fields.iter().join(" "))
                }
            }
            ExprKind::If {
                cond,
                then,
                otherwise,
            } => {
                write!(f, "(if {}\n{}", cond, strutils::indent_lines(then, 2))?;
                if let Some(otherwise) = otherwise {
                    write!(f, "\nelse\n{}", strutils::indent_lines(otherwise, 2))?;
                }
                write!(f, "\n)")
            }
            ExprKind::Match { scrutinee, arms } => {
                if arms.is_empty() {
                    write!(f, "(match {})", scrutinee)
                } else {
                    let arms = strutils::indent_lines_iter(arms, 2);
                    write!(f, "(match {}\n{}\n)", scrutinee, arms)
                }
            }
            ExprKind::Closure { params, ret, body } => {
                write!(f, "(closure [{}]", params.iter().join(", "))?;
                if let Some(ret) = ret {
                    write!(f, " -> {}", ret)?;
                }
                write!(f, " => {})", body)
            }
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stmts.is_empty() && self.tail.is_none() {
            return write!(f, "(block)");
        }

        let mut items = self.stmts.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        if let Some(tail) = &self.tail {
            items.push(format!("(tail {})", tail));
        }
        write!(f, "(block\n{}\n)", strutils::indent_lines_iter(items, 2))
    }
}

impl fmt::Display for FieldInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {})", self.name, self.value)
    }
}

impl fmt::Display for MatchArm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.guard {
            Some(guard) => write!(f, "(arm {} if {} => {})", self.pattern, guard, self.body),
            None => write!(f, "(arm {} => {})", self.pattern, self.body),
        }
    }
}

impl fmt::Display for ClosureParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ty {
            Some(ty) => write!(f, "{}: {}", self.pattern, ty),
            None => write!(f, "{}", self.pattern),
        }
    }
}
