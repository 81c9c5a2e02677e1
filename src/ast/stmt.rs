use std::fmt;

use itertools::Itertools;

use crate::{
    ast::{Block, Decl, Expr, Pattern, TypeExpr},
    span::Span,
    strutils,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Let {
        pattern: Pattern,
        ty: Option<TypeExpr>,
        init: Option<Expr>,
    },
    Expr {
        expr: Expr,
        semi: bool,
    },
    Return(Option<Expr>),
    While {
        cond: Expr,
        body: Block,
    },
    For {
        pattern: Pattern,
        iter: Expr,
        body: Block,
    },
    Break(Option<Expr>),
    Continue,
    Spawn(SpawnTarget),
    Select(Vec<SelectCase>),
    Item(Box<Decl>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SpawnTarget {
    Call(Expr),
    Block(Block),
    /// `|params| body(args)`
    Closure { closure: Expr, args: Vec<Expr> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectCase {
    pub comm: SelectComm,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SelectComm {
    Let { pattern: Pattern, value: Expr },
    Expr(Expr),
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Stmt {
        Stmt { kind, span }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StmtKind::Let { pattern, ty, init } => {
                write!(f, "(let {}", pattern)?;
                if let Some(ty) = ty {
                    write!(f, ": {}", ty)?;
                }
                if let Some(init) = init {
                    write!(f, " {}", init)?;
                }
                write!(f, ")")
            }
            StmtKind::Expr { expr, .. } => write!(f, "{}", expr),
            StmtKind::Return(Some(expr)) => write!(f, "(return {})", expr),
            StmtKind::Return(None) => write!(f, "(return)"),
            StmtKind::While { cond, body } => {
                write!(f, "(while {}\n{}\n)", cond, strutils::indent_lines(body, 2))
            }
            StmtKind::For {
                pattern,
                iter,
                body,
            } => write!(
                f,
                "(for {} in {}\n{}\n)",
                pattern,
                iter,
                strutils::indent_lines(body, 2)
            ),
            StmtKind::Break(Some(expr)) => write!(f, "(break {})", expr),
            StmtKind::Break(None) => write!(f, "(break)"),
            StmtKind::Continue => write!(f, "(continue)"),
            StmtKind::Spawn(target) => write!(f, "(spawn {})", target),
            StmtKind::Select(cases) => {
                if cases.is_empty() {
                    write!(f, "(select)")
                } else {
                    write!(f, "(select\n{}\n)", strutils::indent_lines_iter(cases, 2))
                }
            }
            StmtKind::Item(decl) => write!(f, "{}", decl),
        }
    }
}

impl fmt::Display for SpawnTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnTarget::Call(call) => write!(f, "{}", call),
            SpawnTarget::Block(block) => write!(f, "{}", block),
            SpawnTarget::Closure { closure, args } => {
                if args.is_empty() {
                    write!(f, "(call {})", closure)
                } else {
                    write!(f, "(call {} {})", closure, args.iter().join(" "))
                }
            }
        }
    }
}

impl fmt::Display for SelectCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let comm = match &self.comm {
            SelectComm::Let { pattern, value } => format!("(let {} {})", pattern, value),
            SelectComm::Expr(expr) => expr.to_string(),
        };
        write!(f, "(case {}\n{}\n)", comm, strutils::indent_lines(&self.body, 2))
    }
}
