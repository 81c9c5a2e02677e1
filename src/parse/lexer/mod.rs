use fnv::FnvHashMap;

use crate::{
    ast::token::{Token, TokenKind},
    span::{FileId, Pos, Span},
};

lazy_static! {
    static ref KEYWORDS: FnvHashMap<&'static str, TokenKind> = {
        let mut m = FnvHashMap::default();
        m.insert("fn", TokenKind::Fn);
        m.insert("let", TokenKind::Let);
        m.insert("mut", TokenKind::Mut);
        m.insert("ref", TokenKind::Ref);
        m.insert("return", TokenKind::Return);
        m.insert("if", TokenKind::If);
        m.insert("else", TokenKind::Else);
        m.insert("while", TokenKind::While);
        m.insert("for", TokenKind::For);
        m.insert("in", TokenKind::In);
        m.insert("break", TokenKind::Break);
        m.insert("continue", TokenKind::Continue);
        m.insert("spawn", TokenKind::Spawn);
        m.insert("select", TokenKind::Select);
        m.insert("chan", TokenKind::Chan);
        m.insert("match", TokenKind::Match);
        m.insert("struct", TokenKind::Struct);
        m.insert("enum", TokenKind::Enum);
        m.insert("trait", TokenKind::Trait);
        m.insert("impl", TokenKind::Impl);
        m.insert("type", TokenKind::Type);
        m.insert("const", TokenKind::Const);
        m.insert("mod", TokenKind::Mod);
        m.insert("use", TokenKind::Use);
        m.insert("pub", TokenKind::Pub);
        m.insert("unsafe", TokenKind::Unsafe);
        m.insert("where", TokenKind::Where);
        m.insert("as", TokenKind::As);
        m.insert("box", TokenKind::Box);
        m.insert("exists", TokenKind::Exists);
        m.insert("forall", TokenKind::Forall);
        m.insert("true", TokenKind::True);
        m.insert("false", TokenKind::False);
        m
    };
}

/// A pull-based source of tokens. The parser never looks at raw text; it
/// only sees what a `TokenSource` hands it.
pub trait TokenSource {
    fn next_token(&mut self) -> Token;

    /// Tags every span produced from here on with `file`.
    fn set_file(&mut self, file: FileId);

    /// Module-level documentation (`//!`) seen so far.
    fn module_doc(&self) -> Option<String> {
        None
    }
}

pub struct Lexer {
    src: Vec<char>,
    idx: usize,
    pos: Pos,
    file: Option<FileId>,
    module_doc: Option<String>,
}

fn is_valid_id_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn push_doc_line(doc: &mut Option<String>, line: &str) {
    match doc {
        Some(d) => {
            d.push('\n');
            d.push_str(line);
        }
        None => *doc = Some(line.to_string()),
    }
}

impl Lexer {
    pub fn new(src: &str) -> Lexer {
        Lexer {
            src: src.chars().collect(),
            idx: 0,
            pos: Pos::new(),
            file: None,
            module_doc: None,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.idx >= self.src.len()
    }


    fn char_at(&self, index: usize) -> Option<char> {
        self.src.get(index).copied()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.char_at(self.idx)?;
        self.idx += 1;
        self.pos.offset += ch.len_utf8();
        if ch == '\n' {
            self.pos.lineno += 1;
            self.pos.col = 0;
        } else {
            self.pos.col += 1;
        }
        Some(ch)
    }

    fn first(&self) -> char {
        self.char_at(self.idx).unwrap_or('\0')
    }

    fn second(&self) -> char {
        self.char_at(self.idx + 1).unwrap_or('\0')
    }

    fn consume_chars(&mut self, n: usize) {
        for _ in 0..n {
            self.next_char();
        }
    }

    fn next_char_while(&mut self, mut f: impl FnMut(char) -> bool) -> String {
        let mut s = String::new();
        while !self.is_eof() && f(self.first()) {
            if let Some(ch) = self.next_char() {
                s.push(ch);
            }
        }
        s
    }

    fn span_from(&self, start: Pos) -> Span {
        Span::new(start, self.pos).with_file(self.file)
    }

    fn text_from(&self, start_idx: usize) -> String {
        self.src[start_idx..self.idx].iter().collect()
    }

    /// Skips whitespace and comments, returning the `///` doc lines that
    /// immediately precede the next token.
    fn skip_trivia(&mut self) -> Option<String> {
        let mut doc = None;
        loop {
            match (self.first(), self.second()) {
                (c, _) if c.is_whitespace() && !self.is_eof() => {
                    self.next_char();
                }
                ('/', '/') => {
                    self.consume_chars(2);
                    let is_doc = self.first() == '/' && self.second() != '/';
                    let is_module_doc = self.first() == '!';
                    if is_doc || is_module_doc {
                        self.next_char();
                    }
                    let content = self.next_char_while(|c| c != '\n');
                    let content = content.strip_prefix(' ').unwrap_or(&content).to_string();
                    if is_doc {
                        push_doc_line(&mut doc, &content);
                    } else if is_module_doc {
                        push_doc_line(&mut self.module_doc, &content);
                    } else {
                        doc = None;
                    }
                }
                ('/', '*') => {
                    self.consume_chars(2);
                    let mut depth = 1;
                    while depth > 0 && !self.is_eof() {
                        match (self.first(), self.second()) {
                            ('/', '*') => {
                                self.consume_chars(2);
                                depth += 1;
                            }
                            ('*', '/') => {
                                self.consume_chars(2);
                                depth -= 1;
                            }
                            _ => {
                                self.next_char();
                            }
                        }
                    }
                    doc = None;
                }
                _ => return doc,
            }
        }
    }

    fn escape(&mut self) -> Result<char, String> {
        match self.next_char() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('0') => Ok('\0'),
            Some('\\') => Ok('\\'),
            Some('\'') => Ok('\''),
            Some('"') => Ok('"'),
            Some('u') if self.first() == '{' => {
                self.next_char();
                let hex = self.next_char_while(|c| c.is_ascii_hexdigit());
                if self.first() != '}' {
                    return Err(str!("unterminated unicode escape"));
                }
                self.next_char();
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("invalid unicode escape `\\u{{{}}}`", hex))
            }
            Some(c) => Err(format!("unknown character escape `\\{}`", c)),
            None => Err(str!("unterminated escape sequence")),
        }
    }

    /// Reads the body of a quoted literal after the opening quote, decoding
    /// escapes.
    fn quoted(&mut self, quote: char) -> Result<String, String> {
        let mut s = String::new();
        let mut err = None;
        loop {
            match self.next_char() {
                Some(c) if c == quote => break,
                Some('\\') => match self.escape() {
                    Ok(c) => s.push(c),
                    Err(e) => {
                        err.get_or_insert(e);
                    }
                },
                Some('\n') if quote == '\'' => {
                    return Err(str!("unterminated character literal"));
                }
                Some(c) => s.push(c),
                None if quote == '"' => return Err(str!("unterminated string literal")),
                None => return Err(str!("unterminated character literal")),
            }
        }

        match err {
            Some(e) => Err(e),
            None => Ok(s),
        }
    }

    fn number(&mut self, first: char) -> TokenKind {
        if first == '0' && matches!(self.first(), 'x' | 'o' | 'b') {
            let radix = match self.first() {
                'x' => 16,
                'o' => 8,
                _ => 2,
            };
            self.next_char();
            self.next_char_while(|c| c == '_' || c.is_digit(radix));
            return TokenKind::Int;
        }

        self.next_char_while(|c| c == '_' || c.is_ascii_digit());
        let mut kind = TokenKind::Int;
        if self.first() == '.' && self.second().is_ascii_digit() {
            self.next_char();
            self.next_char_while(|c| c == '_' || c.is_ascii_digit());
            kind = TokenKind::Float;
        }

        if matches!(self.first(), 'e' | 'E') {
            let sign = matches!(self.second(), '+' | '-');
            let digit_at = if sign { self.idx + 2 } else { self.idx + 1 };
            if self.char_at(digit_at).map_or(false, |c| c.is_ascii_digit()) {
                self.consume_chars(if sign { 2 } else { 1 });
                self.next_char_while(|c| c.is_ascii_digit());
                kind = TokenKind::Float;
            }
        }
        kind
    }

    fn keyword_or_ident(&mut self) -> TokenKind {
        let start_idx = self.idx - 1;
        self.next_char_while(is_valid_id_char);
        let text = self.text_from(start_idx);
        KEYWORDS.get(text.as_str()).copied().unwrap_or(TokenKind::Ident)
    }

    fn lex_token(&mut self) -> Token {
        let doc = self.skip_trivia();
        let start = self.pos;
        let start_idx = self.idx;
        let c = match self.next_char() {
            Some(c) => c,
            None => return Token::eof(self.span_from(start)),
        };

        let mut value = None;
        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftCurly,
            '}' => TokenKind::RightCurly,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semi,
            '@' => TokenKind::At,
            '?' => TokenKind::Question,
            '^' => TokenKind::Caret,
            ':' => match self.first() {
                ':' => {
                    self.next_char();
                    TokenKind::DoubleColon
                }
                _ => TokenKind::Colon,
            },
            '.' => match (self.first(), self.second()) {
                ('.', '=') => {
                    self.consume_chars(2);
                    TokenKind::DotDotEq
                }
                ('.', _) => {
                    self.next_char();
                    TokenKind::DotDot
                }
                _ => TokenKind::Dot,
            },
            '-' => match self.first() {
                '>' => {
                    self.next_char();
                    TokenKind::Arrow
                }
                '=' => {
                    self.next_char();
                    TokenKind::MinusEq
                }
                _ => TokenKind::Minus,
            },
            '=' => match self.first() {
                '>' => {
                    self.next_char();
                    TokenKind::FatArrow
                }
                '=' => {
                    self.next_char();
                    TokenKind::EqEq
                }
                _ => TokenKind::Equals,
            },
            '<' => match self.first() {
                '-' => {
                    self.next_char();
                    TokenKind::LeftArrow
                }
                '=' => {
                    self.next_char();
                    TokenKind::LtEq
                }
                _ => TokenKind::Lt,
            },
            '>' => match self.first() {
                '=' => {
                    self.next_char();
                    TokenKind::GtEq
                }
                _ => TokenKind::Gt,
            },
            '!' => match self.first() {
                '=' => {
                    self.next_char();
                    TokenKind::NotEq
                }
                _ => TokenKind::Exclamation,
            },
            '+' | '*' | '/' | '%' if self.first() == '=' => {
                self.next_char();
                match c {
                    '+' => TokenKind::PlusEq,
                    '*' => TokenKind::AsteriskEq,
                    '/' => TokenKind::SlashEq,
                    _ => TokenKind::PercentEq,
                }
            }
            '+' => TokenKind::Plus,
            '*' => TokenKind::Asterisk,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '&' => match self.first() {
                '&' => {
                    self.next_char();
                    TokenKind::DoubleAmpersand
                }
                _ => TokenKind::Ampersand,
            },
            '|' => match self.first() {
                '|' => {
                    self.next_char();
                    TokenKind::DoublePipe
                }
                _ => TokenKind::Pipe,
            },
            '"' => match self.quoted('"') {
                Ok(s) => {
                    value = Some(s);
                    TokenKind::Str
                }
                Err(e) => {
                    value = Some(e);
                    TokenKind::Illegal
                }
            },
            '\'' => match self.quoted('\'') {
                Ok(s) if s.chars().count() == 1 => {
                    value = Some(s);
                    TokenKind::Char
                }
                Ok(_) => {
                    value = Some(str!("character literals must contain exactly one character"));
                    TokenKind::Illegal
                }
                Err(e) => {
                    value = Some(e);
                    TokenKind::Illegal
                }
            },
            '_' if !is_valid_id_char(self.first()) => TokenKind::Underscore,
            c if c == '_' || c.is_alphabetic() => self.keyword_or_ident(),
            c if c.is_ascii_digit() => self.number(c),
            c => {
                value = Some(format!("unexpected character `{}`", c));
                TokenKind::Illegal
            }
        };

        let mut tok = Token::new(kind, self.text_from(start_idx), self.span_from(start));
        tok.value = value;
        tok.doc = doc;
        log::trace!("[lex_token] {:?} {} at {}", tok.kind, tok, tok.span);
        tok
    }
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> Token {
        self.lex_token()
    }

    fn set_file(&mut self, file: FileId) {
        self.file = Some(file);
    }

    fn module_doc(&self) -> Option<String> {
        self.module_doc.clone()
    }
}

#[cfg(test)]
mod lexer_tests {
    use crate::{ast::token::TokenKind, span::FileId};

    use super::{Lexer, TokenSource};

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lex = Lexer::new(src);
        let mut out = vec![];
        loop {
            let tok = lex.next_token();
            if tok.kind == TokenKind::EOF {
                break;
            }
            out.push(tok.kind);
        }
        out
    }

    #[test]
    fn lexes_keywords_and_punctuation() {
        assert_eq!(
            kinds("fn f(x: &mut int) -> chan int / IO { x <- 1; }"),
            vec![
                TokenKind::Fn,
                TokenKind::Ident,
                TokenKind::LeftParen,
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Ampersand,
                TokenKind::Mut,
                TokenKind::Ident,
                TokenKind::RightParen,
                TokenKind::Arrow,
                TokenKind::Chan,
                TokenKind::Ident,
                TokenKind::Slash,
                TokenKind::Ident,
                TokenKind::LeftCurly,
                TokenKind::Ident,
                TokenKind::LeftArrow,
                TokenKind::Int,
                TokenKind::Semi,
                TokenKind::RightCurly,
            ]
        );
    }

    #[test]
    fn lexes_ranges_without_floats() {
        assert_eq!(
            kinds("1..5 1..=5 1.5 ..x"),
            vec![
                TokenKind::Int,
                TokenKind::DotDot,
                TokenKind::Int,
                TokenKind::Int,
                TokenKind::DotDotEq,
                TokenKind::Int,
                TokenKind::Float,
                TokenKind::DotDot,
                TokenKind::Ident,
            ]
        );
    }

    #[test]
    fn decodes_string_and_char_escapes() {
        let mut lex = Lexer::new(r#""a\n\"b\"" '\'' '\u{41}'"#);
        let s = lex.next_token();
        assert_eq!(s.kind, TokenKind::Str);
        assert_eq!(s.value.as_deref(), Some("a\n\"b\""));
        assert_eq!(s.text, r#""a\n\"b\"""#);

        let c = lex.next_token();
        assert_eq!(c.kind, TokenKind::Char);
        assert_eq!(c.value.as_deref(), Some("'"));

        let u = lex.next_token();
        assert_eq!(u.value.as_deref(), Some("A"));
    }

    #[test]
    fn unterminated_string_is_illegal() {
        let mut lex = Lexer::new("\"abc");
        let tok = lex.next_token();
        assert_eq!(tok.kind, TokenKind::Illegal);
        assert_eq!(tok.value.as_deref(), Some("unterminated string literal"));
        assert_eq!(lex.next_token().kind, TokenKind::EOF);
    }

    #[test]
    fn skips_comments_and_collects_docs() {
        let mut lex = Lexer::new("//! module\n// plain\n/* block /* nested */ */\n/// first\n/// second\nfn");
        let tok = lex.next_token();
        assert_eq!(tok.kind, TokenKind::Fn);
        assert_eq!(tok.doc.as_deref(), Some("first\nsecond"));
        assert_eq!(lex.module_doc().as_deref(), Some("module"));
    }

    #[test]
    fn spans_use_byte_offsets_and_file_tags() {
        let mut lex = Lexer::new("é x");
        lex.set_file(FileId(7));
        let first = lex.next_token();
        assert_eq!(first.span.start.offset, 0);
        assert_eq!(first.span.end.offset, 2);
        let second = lex.next_token();
        assert_eq!(second.span.start.offset, 3);
        assert_eq!(second.span.start.col, 2);
        assert_eq!(second.span.file, Some(FileId(7)));
    }

    #[test]
    fn underscore_alone_is_a_token() {
        assert_eq!(
            kinds("_ _x"),
            vec![TokenKind::Underscore, TokenKind::Ident]
        );
    }
}
