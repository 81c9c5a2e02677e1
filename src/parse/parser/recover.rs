use crate::ast::token::TokenKind;

use super::{ParseResult, Parser};

/// Where a failed production should resynchronize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RecoveryMode {
    /// Skip to the end of the broken declaration.
    Decl,
    /// Skip to the next statement inside a block.
    Stmt,
    /// Skip to the next element of a comma-separated body, such as a match
    /// arm or a select case.
    Seq,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct RecoveryCtx {
    pub mode: RecoveryMode,
    /// The token that closes the enclosing construct, if any. It is never
    /// consumed by recovery.
    pub stop: Option<TokenKind>,
}

impl RecoveryCtx {
    pub fn decl(stop: Option<TokenKind>) -> RecoveryCtx {
        RecoveryCtx {
            mode: RecoveryMode::Decl,
            stop,
        }
    }

    pub fn stmt(stop: Option<TokenKind>) -> RecoveryCtx {
        RecoveryCtx {
            mode: RecoveryMode::Stmt,
            stop,
        }
    }

    pub fn seq(stop: Option<TokenKind>) -> RecoveryCtx {
        RecoveryCtx {
            mode: RecoveryMode::Seq,
            stop,
        }
    }
}

pub(crate) trait Recover<T> {
    fn recover_with(
        self,
        parser: &mut Parser,
        ctx: RecoveryCtx,
        fallback: impl FnOnce(&mut Parser) -> T,
    ) -> T;
}

impl<T> Recover<T> for ParseResult<T> {
    fn recover_with(
        self,
        parser: &mut Parser,
        ctx: RecoveryCtx,
        fallback: impl FnOnce(&mut Parser) -> T,
    ) -> T {
        match self {
            Ok(value) => value,
            Err(_) => {
                // the diagnostic was recorded where the failure happened
                parser.synchronize(ctx);
                fallback(parser)
            }
        }
    }
}

impl Parser {
    /// Discards tokens until a point where parsing can safely resume.
    /// Nested delimiters are skipped as a unit so that a `;` or `}` inside
    /// them does not end recovery early.
    pub(crate) fn synchronize(&mut self, ctx: RecoveryCtx) {
        let start = self.consumed();
        // [paren, bracket, curly]
        let mut depth = [0usize; 3];
        loop {
            let kind = self.kind();
            if kind == TokenKind::EOF {
                break;
            }

            let at_top = depth.iter().all(|d| *d == 0);
            if at_top {
                if ctx.stop == Some(kind) {
                    break;
                }

                match (ctx.mode, kind) {
                    (RecoveryMode::Decl, TokenKind::Semi)
                    | (RecoveryMode::Stmt, TokenKind::Semi)
                    | (RecoveryMode::Seq, TokenKind::Comma) => {
                        self.bump();
                        break;
                    }
                    (RecoveryMode::Decl, TokenKind::RightCurly) => {
                        // a stray closer at the top level is part of the
                        // broken declaration
                        self.bump();
                        break;
                    }
                    (_, TokenKind::RightCurly) => break,
                    (RecoveryMode::Decl, k) if k.is_decl_start() => break,
                    (RecoveryMode::Stmt, k) if k.is_decl_start() || k.is_stmt_start() => break,
                    _ => {}
                }
            }

            match kind {
                TokenKind::LeftParen => depth[0] += 1,
                TokenKind::LeftBracket => depth[1] += 1,
                TokenKind::LeftCurly => depth[2] += 1,
                TokenKind::RightParen => depth[0] = depth[0].saturating_sub(1),
                TokenKind::RightBracket => depth[1] = depth[1].saturating_sub(1),
                TokenKind::RightCurly => depth[2] = depth[2].saturating_sub(1),
                _ => {}
            }
            self.bump();
        }

        log::debug!(
            "[synchronize] {:?} skipped {} token(s), resuming at {}",
            ctx.mode,
            self.consumed() - start,
            self.current()
        );
    }
}
