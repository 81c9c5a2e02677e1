use super::{
    collections::{CurlyKind, SeqSpec},
    ExprResult, ParseResult, Parser, Recover, RecoveryCtx, Restrictions,
};

use itertools::Itertools;

use crate::{
    ast::{self, token::TokenKind},
    errors::{Diagnostic, DiagnosticCode},
};

impl Parser {
    /// `if cond { ... } else if ... else { ... }`
    ///
    /// The arms of an `else if` chain are collected first and nested
    /// afterwards, so a long chain does not recurse.
    pub(crate) fn parse_if_expr(&mut self) -> ExprResult {
        let start = self.start_pos();
        let (cond, then) = self.parse_if_arm()?;

        let mut chain = vec![];
        let mut otherwise = None;
        while expect_if!(self, TokenKind::Else) {
            if peek!(self, TokenKind::If) {
                let arm_start = self.start_pos();
                let (cond, then) = self.parse_if_arm()?;
                chain.push((arm_start, cond, then));
            } else {
                let block = self.parse_block(true)?;
                let span = block.span;
                otherwise = Some(ast::Expr::new(ast::ExprKind::Block(block), span));
                break;
            }
        }

        // every arm's span runs to the end of the whole chain
        for (arm_start, cond, then) in chain.into_iter().rev() {
            otherwise = Some(ast::Expr::new(
                ast::ExprKind::If {
                    cond: Box::new(cond),
                    then,
                    otherwise: otherwise.map(Box::new),
                },
                self.span_from(arm_start),
            ));
        }

        Ok(ast::Expr::new(
            ast::ExprKind::If {
                cond: Box::new(cond),
                then,
                otherwise: otherwise.map(Box::new),
            },
            self.span_from(start),
        ))
    }

    fn parse_if_arm(&mut self) -> ParseResult<(ast::Expr, ast::Block)> {
        self.expect(TokenKind::If)?;
        let cond = self
            .scope()
            .with_restrictions(Restrictions::NO_STRUCT_LITERAL)
            .parse_expr()?;
        let then = self.parse_block(true)?;
        Ok((cond, then))
    }

    pub(crate) fn parse_match_expr(&mut self) -> ExprResult {
        let start = self.start_pos();
        self.expect(TokenKind::Match)?;
        let scrutinee = self
            .scope()
            .with_restrictions(Restrictions::NO_STRUCT_LITERAL)
            .parse_expr()?;

        let open = self.expect(TokenKind::LeftCurly)?;
        let parser = &mut self
            .scope()
            .without_restrictions(Restrictions::NO_STRUCT_LITERAL);
        let mut arms = vec![];
        loop {
            if peek!(parser, TokenKind::RightCurly | TokenKind::EOF) {
                break;
            }

            let before = parser.consumed();
            let arm = parser
                .parse_match_arm()
                .map(Some)
                .recover_with(parser, RecoveryCtx::seq(Some(TokenKind::RightCurly)), |_| None);

            match arm {
                Some(arm) => {
                    let block_body = arm.body.is_block_like();
                    arms.push(arm);
                    if !expect_if!(parser, TokenKind::Comma)
                        && !block_body
                        && !peek!(parser, TokenKind::RightCurly)
                    {
                        let found = parser.current().clone();
                        let msg = format!("expected `,` after match arm, but found {}", found);
                        let diag = Diagnostic::error(msg, found.span)
                            .with_code(DiagnosticCode::MissingSeparator)
                            .with_help("arms whose body is not a block end with `,`");
                        parser.record(diag);
                    }
                }
                None => {
                    if parser.consumed() == before
                        && !peek!(parser, TokenKind::RightCurly | TokenKind::EOF)
                    {
                        parser.bump();
                    }
                }
            }
        }
        parser.expect_matching(&open, TokenKind::RightCurly)?;

        Ok(ast::Expr::new(
            ast::ExprKind::Match {
                scrutinee: Box::new(scrutinee),
                arms,
            },
            parser.span_from(start),
        ))
    }

    /// `pattern (if guard)? => body`
    fn parse_match_arm(&mut self) -> ParseResult<ast::MatchArm> {
        let start = self.start_pos();
        let parser = &mut self.scope().with_description("a match arm");
        let (pattern, bare_alternation) = parser.parse_arm_pattern()?;

        let guard = if peek!(parser, TokenKind::If) {
            if bare_alternation {
                let span = parser.current().span;
                let diag = Diagnostic::error(
                    "a guard after an unparenthesized alternation is ambiguous",
                    span,
                )
                .with_code(DiagnosticCode::AmbiguousGuard)
                .with_label(pattern.span, "this alternation")
                .with_help(format!(
                    "wrap the alternatives in parentheses: `({}) if ...`",
                    alternatives_text(&pattern)
                ));
                return Err(parser.error(diag));
            }

            parser.bump();
            Some(parser.parse_expr()?)
        } else {
            None
        };

        if !expect_if!(parser, TokenKind::FatArrow) {
            return Err(parser.expected("`=>` after the match arm's pattern"));
        }

        // a block body ends the arm, so the next arm's pattern is never
        // taken as an operator or a call on it
        let body = if peek!(parser, TokenKind::LeftCurly) && parser.curly_kind() == CurlyKind::Block {
            parser.parse_prefix_expr()?
        } else {
            parser.parse_expr()?
        };
        Ok(ast::MatchArm {
            pattern,
            guard,
            body,
            span: parser.span_from(start),
        })
    }

    /// `|params| body`, `|params| -> T { ... }` or `|| body`.
    pub(crate) fn parse_closure_expr(&mut self) -> ExprResult {
        let start = self.start_pos();
        let params = if expect_if!(self, TokenKind::DoublePipe) {
            vec![]
        } else {
            let spec = SeqSpec::comma(TokenKind::Pipe, "a closure parameter");
            self.parse_delimited(TokenKind::Pipe, spec, |p| p.parse_closure_param())?
                .items
        };

        let parser = &mut self
            .scope()
            .without_restrictions(Restrictions::NO_STRUCT_LITERAL);
        let ret = if expect_if!(parser, TokenKind::Arrow) {
            Some(parser.parse_type()?)
        } else {
            None
        };

        let body = if ret.is_some() || peek!(parser, TokenKind::LeftCurly) {
            // an explicit return type requires a block body
            let block = parser.parse_block(true)?;
            let span = block.span;
            ast::Expr::new(ast::ExprKind::Block(block), span)
        } else {
            parser.parse_expr()?
        };

        Ok(ast::Expr::new(
            ast::ExprKind::Closure {
                params,
                ret,
                body: Box::new(body),
            },
            parser.span_from(start),
        ))
    }

    fn parse_closure_param(&mut self) -> ParseResult<ast::ClosureParam> {
        let pattern = self.parse_pattern_single()?;
        let ty = if expect_if!(self, TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        Ok(ast::ClosureParam { pattern, ty })
    }
}

fn alternatives_text(pattern: &ast::Pattern) -> String {
    match &pattern.kind {
        ast::PatternKind::Or(alts) => alts.iter().join(" | "),
        _ => pattern.to_string(),
    }
}
