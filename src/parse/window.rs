use std::collections::VecDeque;

use crate::{
    ast::token::{Token, TokenKind},
    parse::lexer::TokenSource,
    span::{FileId, Pos},
};

/// The parser's view of the token stream: the token under examination, the
/// one right after it, and an overflow buffer for deeper lookahead.
pub struct TokenWindow {
    source: Box<dyn TokenSource>,
    current: Token,
    peek: Token,
    buffer: VecDeque<Token>,
    prev_end: Pos,
    consumed: usize,
}

impl TokenWindow {
    pub fn new(mut source: Box<dyn TokenSource>) -> TokenWindow {
        let current = source.next_token();
        let peek = source.next_token();
        let prev_end = current.span.start;
        TokenWindow {
            source,
            current,
            peek,
            buffer: VecDeque::new(),
            prev_end,
            consumed: 0,
        }
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    pub fn peek(&self) -> &Token {
        &self.peek
    }

    /// Returns the token `n` positions past the current one: `peek_at(0)` is
    /// the current token and `peek_at(1)` is the same as `peek()`.
    pub fn peek_at(&mut self, n: usize) -> &Token {
        match n {
            0 => &self.current,
            1 => &self.peek,
            _ => {
                let idx = n - 2;
                while self.buffer.len() <= idx {
                    if self.buffer.back().map_or(self.peek.kind, |t| t.kind) == TokenKind::EOF {
                        break;
                    }
                    let tok = self.source.next_token();
                    self.buffer.push_back(tok);
                }
                // an exhausted source repeats its end-of-input sentinel
                match self.buffer.get(idx) {
                    Some(tok) => tok,
                    None => self.buffer.back().unwrap_or(&self.peek),
                }
            }
        }
    }

    /// Moves past the current token and returns it.
    pub fn advance(&mut self) -> Token {
        let next = if self.peek.kind == TokenKind::EOF {
            self.peek.clone()
        } else {
            match self.buffer.pop_front() {
                Some(tok) => tok,
                None => self.source.next_token(),
            }
        };
        let peek = std::mem::replace(&mut self.peek, next);
        let prev = std::mem::replace(&mut self.current, peek);
        if prev.kind != TokenKind::EOF {
            self.prev_end = prev.span.end;
            self.consumed += 1;
        }
        prev
    }

    /// End of the most recently consumed token.
    pub fn prev_end(&self) -> Pos {
        self.prev_end
    }

    /// Number of tokens consumed so far; used to check that recovery made
    /// progress.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn module_doc(&self) -> Option<String> {
        self.source.module_doc()
    }

    pub fn set_file(&mut self, file: FileId) {
        self.source.set_file(file);
        self.current.span.file = Some(file);
        self.peek.span.file = Some(file);
        for tok in self.buffer.iter_mut() {
            tok.span.file = Some(file);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TokenWindow;
    use crate::{ast::token::TokenKind, parse::lexer::Lexer, span::FileId};

    fn window(src: &str) -> TokenWindow {
        TokenWindow::new(Box::new(Lexer::new(src)))
    }

    #[test]
    fn advance_promotes_peek() {
        let mut w = window("a b c");
        assert_eq!(w.current().text, "a");
        assert_eq!(w.peek().text, "b");
        let old_peek = w.peek().clone();
        let prev = w.advance();
        assert_eq!(prev.text, "a");
        assert_eq!(w.current(), &old_peek);
        assert_eq!(w.peek().text, "c");
    }

    #[test]
    fn peek_at_fills_buffer_without_consuming() {
        let mut w = window("a b c d");
        assert_eq!(w.peek_at(3).text, "d");
        assert_eq!(w.peek_at(2).text, "c");
        assert_eq!(w.current().text, "a");
        w.advance();
        w.advance();
        assert_eq!(w.current().text, "c");
        assert_eq!(w.peek().text, "d");
        assert_eq!(w.consumed(), 2);
    }

    #[test]
    fn lookahead_past_the_end_yields_eof() {
        let mut w = window("a");
        assert_eq!(w.peek_at(1).kind, TokenKind::EOF);
        assert_eq!(w.peek_at(5).kind, TokenKind::EOF);
        w.advance();
        assert_eq!(w.current().kind, TokenKind::EOF);
        w.advance();
        assert_eq!(w.current().kind, TokenKind::EOF);
        assert_eq!(w.consumed(), 1);
    }

    #[test]
    fn set_file_tags_buffered_tokens() {
        let mut w = window("a b c");
        w.peek_at(2);
        w.set_file(FileId(2));
        w.advance();
        w.advance();
        assert_eq!(w.current().span.file, Some(FileId(2)));
    }
}
