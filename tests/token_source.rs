#![cfg(test)]

use vireo::{
    ast::token::{Token, TokenKind},
    parse::{ParseOptions, Parser, TokenSource},
    span::{FileId, Pos, Span},
};

/// Hands out a fixed list of tokens, one column apart.
struct VecSource {
    tokens: Vec<(TokenKind, &'static str)>,
    idx: usize,
    file: Option<FileId>,
}

impl VecSource {
    fn new(tokens: Vec<(TokenKind, &'static str)>) -> VecSource {
        VecSource {
            tokens,
            idx: 0,
            file: None,
        }
    }

    fn span_at(&self, idx: usize, len: usize) -> Span {
        let pos = |col| Pos {
            lineno: 0,
            col,
            offset: col,
        };
        Span::new(pos(idx * 2), pos(idx * 2 + len)).with_file(self.file)
    }
}

impl TokenSource for VecSource {
    fn next_token(&mut self) -> Token {
        match self.tokens.get(self.idx) {
            Some(&(kind, text)) => {
                let tok = Token::new(kind, text, self.span_at(self.idx, text.len()));
                self.idx += 1;
                tok
            }
            None => Token::eof(self.span_at(self.idx, 0)),
        }
    }

    fn set_file(&mut self, file: FileId) {
        self.file = Some(file);
    }
}

#[test]
fn parses_from_any_token_source() {
    let source = VecSource::new(vec![
        (TokenKind::Fn, "fn"),
        (TokenKind::Ident, "id"),
        (TokenKind::LeftParen, "("),
        (TokenKind::Ident, "x"),
        (TokenKind::Colon, ":"),
        (TokenKind::Ident, "int"),
        (TokenKind::RightParen, ")"),
        (TokenKind::LeftCurly, "{"),
        (TokenKind::Ident, "x"),
        (TokenKind::RightCurly, "}"),
    ]);
    let options = ParseOptions {
        file_id: Some(FileId(2)),
        ..ParseOptions::default()
    };
    let mut parser = Parser::from_source(source, options);
    let file = parser.parse_file().expect("file parses");
    assert!(parser.errors().is_empty(), "{:?}", parser.errors());
    assert_eq!(file.decls.len(), 1);
    assert_eq!(file.span.file, Some(FileId(2)));
    assert_eq!(file.decls[0].name().map(|n| n.name.as_str()), Some("id"));
}

#[test]
fn illegal_tokens_from_a_source_are_reported() {
    let source = VecSource::new(vec![
        (TokenKind::Illegal, "#"),
        (TokenKind::Struct, "struct"),
        (TokenKind::Ident, "S"),
        (TokenKind::Semi, ";"),
    ]);
    let mut parser = Parser::from_source(source, ParseOptions::default());
    let file = parser.parse_file().expect("file parses");
    assert_eq!(file.decls.len(), 1);
    assert_eq!(parser.errors().len(), 1);
    assert_eq!(parser.errors()[0].msg, "illegal token `#`");
}
