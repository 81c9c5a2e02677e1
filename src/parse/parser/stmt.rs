use super::{
    collections::{CurlyKind, SeqSpec},
    ParseResult, Parser, Recover, RecoveryCtx, Restrictions, StmtResult,
};

use crate::{
    ast::{self, token::TokenKind},
    errors::{Diagnostic, DiagnosticCode},
};

impl Parser {
    /// Parses `{ stmt* tail? }`. When `allow_tail` is set, an expression
    /// right before the closing brace becomes the block's value instead of
    /// a statement.
    pub(crate) fn parse_block(&mut self, allow_tail: bool) -> ParseResult<ast::Block> {
        let start = self.start_pos();
        let open = self.expect(TokenKind::LeftCurly)?;
        let parser = &mut self
            .scope()
            .with_block_tail(allow_tail)
            .without_restrictions(Restrictions::NO_STRUCT_LITERAL)
            .deeper("block")?;

        let mut stmts = vec![];
        let mut tail: Option<Box<ast::Expr>> = None;
        loop {
            if peek!(parser, TokenKind::RightCurly | TokenKind::EOF) {
                break;
            }

            let before = parser.consumed();
            let stmt = parser
                .parse_stmt()
                .recover_with(parser, RecoveryCtx::stmt(Some(TokenKind::RightCurly)), |_| None);

            if let Some(expr) = parser.ctx.tail.pending.take() {
                if let Some(prev) = &tail {
                    let diag = Diagnostic::error("block already has a tail expression", expr.span)
                        .with_code(DiagnosticCode::StrayTail)
                        .with_label(prev.span, "first tail expression");
                    parser.record(diag);
                }

                if peek!(parser, TokenKind::RightCurly) {
                    log::debug!("[parse_block] tail at {}", expr.span);
                    tail = Some(Box::new(expr));
                    break;
                }

                let diag = Diagnostic::error(
                    "a tail expression must be the last thing in a block",
                    expr.span,
                )
                .with_code(DiagnosticCode::StrayTail);
                parser.record(diag);
                let span = expr.span;
                stmts.push(ast::Stmt::new(
                    ast::StmtKind::Expr { expr, semi: false },
                    span,
                ));
                continue;
            }

            match stmt {
                Some(stmt) => stmts.push(stmt),
                None => {
                    if parser.consumed() == before
                        && !peek!(parser, TokenKind::RightCurly | TokenKind::EOF)
                    {
                        log::debug!("[parse_block] skipping {}", parser.current());
                        parser.bump();
                    }
                }
            }
        }

        parser.expect_matching(&open, TokenKind::RightCurly)?;
        Ok(ast::Block {
            stmts,
            tail,
            span: parser.span_from(start),
        })
    }

    /// Parses one statement. Returns `Ok(None)` for an empty statement and
    /// when the expression just parsed was captured as the block's tail.
    pub(crate) fn parse_stmt(&mut self) -> StmtResult {
        log::trace!("[parse_stmt] {}", self.current());
        let stmt = match self.kind() {
            TokenKind::Semi => {
                self.bump();
                return Ok(None);
            }
            TokenKind::Let => self.parse_let_stmt()?,
            TokenKind::Return => self.parse_return_stmt()?,
            TokenKind::Break => self.parse_break_stmt()?,
            TokenKind::Continue => self.parse_continue_stmt()?,
            TokenKind::While => self.parse_while_stmt()?,
            TokenKind::For => self.parse_for_stmt()?,
            TokenKind::Spawn => self.parse_spawn_stmt()?,
            TokenKind::Select => self.parse_select_stmt()?,
            TokenKind::Unsafe if self.kind_at(1) == TokenKind::LeftCurly => {
                return self.parse_expr_stmt()
            }
            kind if kind.is_decl_start() => {
                let start = self.start_pos();
                let decl = self.parse_decl()?;
                ast::Stmt::new(ast::StmtKind::Item(Box::new(decl)), self.span_from(start))
            }
            _ => return self.parse_expr_stmt(),
        };
        Ok(Some(stmt))
    }

    fn at_block_like(&mut self) -> bool {
        match self.kind() {
            TokenKind::If | TokenKind::Match => true,
            TokenKind::Unsafe => self.kind_at(1) == TokenKind::LeftCurly,
            TokenKind::LeftCurly => self.curly_kind() == CurlyKind::Block,
            _ => false,
        }
    }

    fn parse_expr_stmt(&mut self) -> StmtResult {
        let start = self.start_pos();
        // a block-like expression at the start of a statement ends the
        // statement; `if c { a } - 1` is two statements
        let expr = if self.at_block_like() {
            self.parse_prefix_expr()?
        } else {
            self.parse_expr()?
        };

        if expect_if!(self, TokenKind::Semi) {
            return Ok(Some(ast::Stmt::new(
                ast::StmtKind::Expr { expr, semi: true },
                self.span_from(start),
            )));
        }

        if peek!(self, TokenKind::RightCurly) && self.ctx.tail.allow {
            self.ctx.tail.pending = Some(expr);
            return Ok(None);
        }

        if !expr.is_block_like() && !peek!(self, TokenKind::RightCurly) {
            let found = self.current().clone();
            let msg = format!("expected `;` after expression, but found {}", found);
            let diag = Diagnostic::error(msg, found.span)
                .with_code(DiagnosticCode::ExpectedToken)
                .with_label(expr.span, "this expression");
            self.record(diag);
        }

        let span = expr.span;
        Ok(Some(ast::Stmt::new(
            ast::StmtKind::Expr { expr, semi: false },
            span,
        )))
    }

    /// Consumes the `;` ending a statement. A statement that is the last
    /// one in its block may leave it out.
    fn expect_stmt_end(&mut self) -> ParseResult<()> {
        if expect_if!(self, TokenKind::Semi) || peek!(self, TokenKind::RightCurly) {
            Ok(())
        } else {
            Err(self.expected("`;`"))
        }
    }

    fn parse_let_stmt(&mut self) -> ParseResult<ast::Stmt> {
        let start = self.start_pos();
        let parser = &mut self.scope().with_description("a let statement");
        parser.expect(TokenKind::Let)?;
        let pattern = parser.parse_pattern()?;
        let ty = if expect_if!(parser, TokenKind::Colon) {
            Some(parser.parse_type()?)
        } else {
            None
        };
        let init = if expect_if!(parser, TokenKind::Equals) {
            Some(parser.parse_expr()?)
        } else {
            None
        };
        if !expect_if!(parser, TokenKind::Semi) {
            return Err(parser.expected("`;` after a let statement"));
        }

        Ok(ast::Stmt::new(
            ast::StmtKind::Let { pattern, ty, init },
            parser.span_from(start),
        ))
    }

    fn parse_return_stmt(&mut self) -> ParseResult<ast::Stmt> {
        let start = self.start_pos();
        self.expect(TokenKind::Return)?;
        let value = if peek!(self, TokenKind::Semi | TokenKind::RightCurly) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_stmt_end()?;
        Ok(ast::Stmt::new(
            ast::StmtKind::Return(value),
            self.span_from(start),
        ))
    }

    fn parse_break_stmt(&mut self) -> ParseResult<ast::Stmt> {
        let start = self.start_pos();
        self.expect(TokenKind::Break)?;
        let value = if peek!(self, TokenKind::Semi | TokenKind::RightCurly) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_stmt_end()?;
        Ok(ast::Stmt::new(
            ast::StmtKind::Break(value),
            self.span_from(start),
        ))
    }

    fn parse_continue_stmt(&mut self) -> ParseResult<ast::Stmt> {
        let start = self.start_pos();
        self.expect(TokenKind::Continue)?;
        self.expect_stmt_end()?;
        Ok(ast::Stmt::new(ast::StmtKind::Continue, self.span_from(start)))
    }

    fn parse_while_stmt(&mut self) -> ParseResult<ast::Stmt> {
        let start = self.start_pos();
        self.expect(TokenKind::While)?;
        let cond = self
            .scope()
            .with_restrictions(Restrictions::NO_STRUCT_LITERAL)
            .parse_expr()?;
        let body = self.parse_block(false)?;
        Ok(ast::Stmt::new(
            ast::StmtKind::While { cond, body },
            self.span_from(start),
        ))
    }

    fn parse_for_stmt(&mut self) -> ParseResult<ast::Stmt> {
        let start = self.start_pos();
        self.expect(TokenKind::For)?;
        let pattern = self.parse_pattern()?;
        if !expect_if!(self, TokenKind::In) {
            return Err(self.expected("`in` after the loop pattern"));
        }
        let iter = self
            .scope()
            .with_restrictions(Restrictions::NO_STRUCT_LITERAL)
            .parse_expr()?;
        let body = self.parse_block(false)?;
        Ok(ast::Stmt::new(
            ast::StmtKind::For {
                pattern,
                iter,
                body,
            },
            self.span_from(start),
        ))
    }

    /// `spawn f(x);`, `spawn { ... }` or `spawn |x| { ... }(arg);`
    fn parse_spawn_stmt(&mut self) -> ParseResult<ast::Stmt> {
        let start = self.start_pos();
        let parser = &mut self.scope().with_description("a spawn statement");
        let spawn = parser.expect(TokenKind::Spawn)?;

        let target = match parser.kind() {
            TokenKind::LeftCurly => {
                let block = parser.parse_block(true)?;
                expect_if!(parser, TokenKind::Semi);
                let span = parser.span_from(start);
                return Ok(ast::Stmt::new(
                    ast::StmtKind::Spawn(ast::SpawnTarget::Block(block)),
                    span,
                ));
            }
            TokenKind::Pipe | TokenKind::DoublePipe => {
                let closure = parser.parse_closure_expr()?;
                if !peek!(parser, TokenKind::LeftParen) {
                    let diag = Diagnostic::error(
                        "a function literal passed to `spawn` must be invoked",
                        closure.span,
                    )
                    .with_code(DiagnosticCode::InvalidSpawn)
                    .with_label(spawn.span, "spawned here")
                    .with_help("call it with its arguments: `spawn |x| { ... }(arg);`");
                    return Err(parser.error(diag));
                }

                let spec = SeqSpec::comma(TokenKind::RightParen, "an argument");
                let args = parser
                    .parse_delimited(TokenKind::LeftParen, spec, |p| p.parse_expr())?
                    .items;
                ast::SpawnTarget::Closure { closure, args }
            }
            _ => {
                let expr = parser.parse_expr()?;
                if !expr.is_call() {
                    let diag = Diagnostic::error("`spawn` expects a call", expr.span)
                        .with_code(DiagnosticCode::InvalidSpawn)
                        .with_label(spawn.span, "spawned here")
                        .with_help("spawn a call `f(x)`, a block, or an invoked function literal");
                    return Err(parser.error(diag));
                }
                ast::SpawnTarget::Call(expr)
            }
        };

        parser.expect_stmt_end()?;
        Ok(ast::Stmt::new(
            ast::StmtKind::Spawn(target),
            parser.span_from(start),
        ))
    }

    /// `select { let v = <-ch => { ... }, ch <- x => { ... } }`
    fn parse_select_stmt(&mut self) -> ParseResult<ast::Stmt> {
        let start = self.start_pos();
        let select = self.expect(TokenKind::Select)?;
        let open = self.expect(TokenKind::LeftCurly)?;

        let mut cases = vec![];
        loop {
            if peek!(self, TokenKind::RightCurly | TokenKind::EOF) {
                break;
            }

            let before = self.consumed();
            let case = self
                .parse_select_case()
                .map(Some)
                .recover_with(self, RecoveryCtx::seq(Some(TokenKind::RightCurly)), |_| None);

            match case {
                Some(case) => {
                    cases.push(case);
                    expect_if!(self, TokenKind::Comma);
                }
                None => {
                    if self.consumed() == before
                        && !peek!(self, TokenKind::RightCurly | TokenKind::EOF)
                    {
                        self.bump();
                    }
                }
            }
        }
        self.expect_matching(&open, TokenKind::RightCurly)?;

        let span = self.span_from(start);
        if cases.is_empty() {
            let diag = Diagnostic::warning("`select` has no cases", select.span)
                .with_code(DiagnosticCode::EmptySelect)
                .with_help("an empty `select` blocks forever");
            self.record(diag);
        }

        Ok(ast::Stmt::new(ast::StmtKind::Select(cases), span))
    }

    fn parse_select_case(&mut self) -> ParseResult<ast::SelectCase> {
        let start = self.start_pos();
        let parser = &mut self.scope().with_description("a select case");
        let comm = if expect_if!(parser, TokenKind::Let) {
            let pattern = parser.parse_pattern()?;
            if !expect_if!(parser, TokenKind::Equals) {
                return Err(parser.expected("`=` in a receiving select case"));
            }
            let value = parser.parse_expr()?;
            ast::SelectComm::Let { pattern, value }
        } else {
            ast::SelectComm::Expr(parser.parse_expr()?)
        };

        if !expect_if!(parser, TokenKind::FatArrow) {
            return Err(parser.expected("`=>` after the select case"));
        }

        let body = parser.parse_block(true)?;
        Ok(ast::SelectCase {
            comm,
            body,
            span: parser.span_from(start),
        })
    }
}
