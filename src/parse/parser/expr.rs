use super::{collections::SeqSpec, ops::Precedence, ExprResult, Parser, Restrictions};

use crate::{
    ast::{self, token::TokenKind, Respan},
    errors::{Diagnostic, DiagnosticCode},
};

impl Parser {
    pub(crate) fn parse_literal_expr(&mut self) -> ExprResult {
        let tok = self.bump();
        let lit = match tok.kind {
            TokenKind::Int => ast::Literal::Int(tok.text.clone()),
            TokenKind::Float => ast::Literal::Float(tok.text.clone()),
            TokenKind::Str => ast::Literal::Str(tok.value.clone().unwrap_or_default()),
            TokenKind::Char => {
                let value = tok.value.as_deref().and_then(|v| v.chars().next());
                match value {
                    Some(ch) => ast::Literal::Char(ch),
                    None => {
                        let diag = Diagnostic::error("empty character literal", tok.span)
                            .with_code(DiagnosticCode::IllegalToken);
                        return Err(self.error(diag));
                    }
                }
            }
            TokenKind::True => ast::Literal::Bool(true),
            TokenKind::False => ast::Literal::Bool(false),
            _ => {
                let msg = format!("expected a literal, but found {}", tok);
                let diag = Diagnostic::error(msg, tok.span).with_code(DiagnosticCode::ExpectedToken);
                return Err(self.error(diag));
            }
        };
        Ok(ast::Expr::new(ast::ExprKind::Literal(lit), tok.span))
    }

    pub(crate) fn parse_name_expr(&mut self) -> ExprResult {
        let name = self.expect_id()?;
        let span = name.span;
        Ok(ast::Expr::new(ast::ExprKind::Name(name), span))
    }

    /// `()` is the unit tuple, `(e)` a grouped expression and `(e,)` or
    /// `(a, b)` a tuple.
    pub(crate) fn parse_paren_expr(&mut self) -> ExprResult {
        let start = self.start_pos();
        let parser = &mut self.scope().without_restrictions(Restrictions::NO_STRUCT_LITERAL);
        let open = parser.expect(TokenKind::LeftParen)?;
        if expect_if!(parser, TokenKind::RightParen) {
            let span = parser.span_from(start);
            return Ok(ast::Expr::new(ast::ExprKind::Tuple(vec![]), span));
        }

        let mut first = parser.parse_expr()?;
        if expect_if!(parser, TokenKind::Comma) {
            let spec = SeqSpec::comma(TokenKind::RightParen, "a tuple element");
            let seq = parser.parse_seq(&open, spec, |p| p.parse_expr())?;
            let mut items = vec![first];
            items.extend(seq.items);
            let span = parser.span_from(start);
            return Ok(ast::Expr::new(ast::ExprKind::Tuple(items), span));
        }

        parser.expect_matching(&open, TokenKind::RightParen)?;
        first.respan(parser.span_from(start));
        Ok(first)
    }

    pub(crate) fn parse_unary_expr(&mut self, op: ast::UnaryOp) -> ExprResult {
        let start = self.start_pos();
        self.bump();
        let expr = self.parse_expr_with(Precedence::Prefix)?;
        Ok(ast::Expr::new(
            ast::ExprKind::Unary {
                op,
                expr: Box::new(expr),
            },
            self.span_from(start),
        ))
    }

    /// `&e` or `&mut e`.
    pub(crate) fn parse_ref_expr(&mut self) -> ExprResult {
        let start = self.start_pos();
        self.expect(TokenKind::Ampersand)?;
        let mutable = expect_if!(self, TokenKind::Mut);
        let expr = self.parse_expr_with(Precedence::Prefix)?;
        Ok(ast::Expr::new(
            ast::ExprKind::Ref {
                mutable,
                expr: Box::new(expr),
            },
            self.span_from(start),
        ))
    }

    /// `&&e` is lexed as one token but means `& &e`.
    pub(crate) fn parse_double_ref_expr(&mut self) -> ExprResult {
        let start = self.start_pos();
        self.expect(TokenKind::DoubleAmpersand)?;
        let mutable = expect_if!(self, TokenKind::Mut);
        let expr = self.parse_expr_with(Precedence::Prefix)?;
        let span = self.span_from(start);
        let inner = ast::Expr::new(
            ast::ExprKind::Ref {
                mutable,
                expr: Box::new(expr),
            },
            span,
        );
        Ok(ast::Expr::new(
            ast::ExprKind::Ref {
                mutable: false,
                expr: Box::new(inner),
            },
            span,
        ))
    }

    pub(crate) fn parse_unsafe_expr(&mut self) -> ExprResult {
        let start = self.start_pos();
        self.expect(TokenKind::Unsafe)?;
        let block = self.parse_block(true)?;
        Ok(ast::Expr::new(
            ast::ExprKind::Unsafe(block),
            self.span_from(start),
        ))
    }

    pub(crate) fn parse_call_expr(&mut self, callee: ast::Expr) -> ExprResult {
        let parser = &mut self.scope().without_restrictions(Restrictions::NO_STRUCT_LITERAL);
        let spec = SeqSpec::comma(TokenKind::RightParen, "an argument");
        let seq = parser.parse_delimited(TokenKind::LeftParen, spec, |p| p.parse_expr())?;
        let span = callee.span.merge(&seq.close);
        Ok(ast::Expr::new(
            ast::ExprKind::Call {
                callee: Box::new(callee),
                args: seq.items,
            },
            span,
        ))
    }

    pub(crate) fn parse_index_expr(&mut self, base: ast::Expr) -> ExprResult {
        let parser = &mut self.scope().without_restrictions(Restrictions::NO_STRUCT_LITERAL);
        let spec = SeqSpec::comma(TokenKind::RightBracket, "an index").non_empty();
        let seq = parser.parse_delimited(TokenKind::LeftBracket, spec, |p| p.parse_expr())?;
        let span = base.span.merge(&seq.close);
        Ok(ast::Expr::new(
            ast::ExprKind::Index {
                base: Box::new(base),
                args: seq.items,
            },
            span,
        ))
    }

    /// `e.name`, or `e.0` for a tuple position.
    pub(crate) fn parse_field_expr(&mut self, base: ast::Expr) -> ExprResult {
        let start = base.span.start;
        self.expect(TokenKind::Dot)?;
        let field = match self.kind() {
            TokenKind::Ident => self.expect_id()?,
            TokenKind::Int => {
                let tok = self.bump();
                ast::Ident::new(tok.text, tok.span)
            }
            _ => return Err(self.expected("a field name")),
        };
        Ok(ast::Expr::new(
            ast::ExprKind::Field {
                base: Box::new(base),
                field,
            },
            self.span_from(start),
        ))
    }

    pub(crate) fn parse_path_expr(&mut self, base: ast::Expr) -> ExprResult {
        let start = base.span.start;
        self.expect(TokenKind::DoubleColon)?;
        let member = self.expect_id()?;
        Ok(ast::Expr::new(
            ast::ExprKind::Path {
                base: Box::new(base),
                member,
            },
            self.span_from(start),
        ))
    }
}
