use std::fmt;

use crate::span::Span;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TokenKind {
    /// identifier
    Ident,
    /// integer literal
    Int,
    /// floating point literal
    Float,
    /// string literal
    Str,
    /// character literal
    Char,
    /// true
    True,
    /// false
    False,

    /// fn
    Fn,
    /// let
    Let,
    /// mut
    Mut,
    /// ref
    Ref,
    /// return
    Return,
    /// if
    If,
    /// else
    Else,
    /// while
    While,
    /// for
    For,
    /// in
    In,
    /// break
    Break,
    /// continue
    Continue,
    /// spawn
    Spawn,
    /// select
    Select,
    /// chan
    Chan,
    /// match
    Match,
    /// struct
    Struct,
    /// enum
    Enum,
    /// trait
    Trait,
    /// impl
    Impl,
    /// type
    Type,
    /// const
    Const,
    /// mod
    Mod,
    /// use
    Use,
    /// pub
    Pub,
    /// unsafe
    Unsafe,
    /// where
    Where,
    /// as
    As,
    /// box
    Box,
    /// exists
    Exists,
    /// forall
    Forall,

    /// (
    LeftParen,
    /// )
    RightParen,
    /// {
    LeftCurly,
    /// }
    RightCurly,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// ,
    Comma,
    /// ;
    Semi,
    /// :
    Colon,
    /// ::
    DoubleColon,
    /// .
    Dot,
    /// ..
    DotDot,
    /// ..=
    DotDotEq,
    /// ->
    Arrow,
    /// =>
    FatArrow,
    /// <-
    LeftArrow,
    /// =
    Equals,
    /// ==
    EqEq,
    /// !=
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Asterisk,
    /// /
    Slash,
    /// %
    Percent,
    /// +=
    PlusEq,
    /// -=
    MinusEq,
    /// *=
    AsteriskEq,
    /// /=
    SlashEq,
    /// %=
    PercentEq,
    /// &
    Ampersand,
    /// &&
    DoubleAmpersand,
    /// |
    Pipe,
    /// ||
    DoublePipe,
    /// ^
    Caret,
    /// !
    Exclamation,
    /// ?
    Question,
    /// @
    At,
    /// _
    Underscore,

    /// a character or literal the lexer could not make sense of
    Illegal,
    /// end of input
    EOF,
}

impl TokenKind {
    pub fn desc(&self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::Str => "string",
            TokenKind::Char => "character",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Fn => "`fn`",
            TokenKind::Let => "`let`",
            TokenKind::Mut => "`mut`",
            TokenKind::Ref => "`ref`",
            TokenKind::Return => "`return`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::While => "`while`",
            TokenKind::For => "`for`",
            TokenKind::In => "`in`",
            TokenKind::Break => "`break`",
            TokenKind::Continue => "`continue`",
            TokenKind::Spawn => "`spawn`",
            TokenKind::Select => "`select`",
            TokenKind::Chan => "`chan`",
            TokenKind::Match => "`match`",
            TokenKind::Struct => "`struct`",
            TokenKind::Enum => "`enum`",
            TokenKind::Trait => "`trait`",
            TokenKind::Impl => "`impl`",
            TokenKind::Type => "`type`",
            TokenKind::Const => "`const`",
            TokenKind::Mod => "`mod`",
            TokenKind::Use => "`use`",
            TokenKind::Pub => "`pub`",
            TokenKind::Unsafe => "`unsafe`",
            TokenKind::Where => "`where`",
            TokenKind::As => "`as`",
            TokenKind::Box => "`box`",
            TokenKind::Exists => "`exists`",
            TokenKind::Forall => "`forall`",
            TokenKind::LeftParen => "`(`",
            TokenKind::RightParen => "`)`",
            TokenKind::LeftCurly => "`{`",
            TokenKind::RightCurly => "`}`",
            TokenKind::LeftBracket => "`[`",
            TokenKind::RightBracket => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Semi => "`;`",
            TokenKind::Colon => "`:`",
            TokenKind::DoubleColon => "`::`",
            TokenKind::Dot => "`.`",
            TokenKind::DotDot => "`..`",
            TokenKind::DotDotEq => "`..=`",
            TokenKind::Arrow => "`->`",
            TokenKind::FatArrow => "`=>`",
            TokenKind::LeftArrow => "`<-`",
            TokenKind::Equals => "`=`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Asterisk => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::PlusEq => "`+=`",
            TokenKind::MinusEq => "`-=`",
            TokenKind::AsteriskEq => "`*=`",
            TokenKind::SlashEq => "`/=`",
            TokenKind::PercentEq => "`%=`",
            TokenKind::Ampersand => "`&`",
            TokenKind::DoubleAmpersand => "`&&`",
            TokenKind::Pipe => "`|`",
            TokenKind::DoublePipe => "`||`",
            TokenKind::Caret => "`^`",
            TokenKind::Exclamation => "`!`",
            TokenKind::Question => "`?`",
            TokenKind::At => "`@`",
            TokenKind::Underscore => "`_`",
            TokenKind::Illegal => "illegal token",
            TokenKind::EOF => "end of input",
        }
    }

    /// Tokens that begin a declaration, including its modifiers.
    pub fn is_decl_start(&self) -> bool {
        matches!(
            self,
            TokenKind::Fn
                | TokenKind::Struct
                | TokenKind::Enum
                | TokenKind::Trait
                | TokenKind::Impl
                | TokenKind::Type
                | TokenKind::Const
                | TokenKind::Mod
                | TokenKind::Use
                | TokenKind::Pub
                | TokenKind::Unsafe
        )
    }

    /// Keywords that a statement may begin with and that are safe places
    /// to resume after an error inside a block.
    pub fn is_stmt_start(&self) -> bool {
        matches!(
            self,
            TokenKind::Let
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Match
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Float
                | TokenKind::Str
                | TokenKind::Char
                | TokenKind::True
                | TokenKind::False
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.desc())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text of the token.
    pub text: String,
    /// The decoded value of string and character literals; for illegal
    /// tokens, the reason the lexer rejected them.
    pub value: Option<String>,
    pub span: Span,
    /// Doc comment lines (`///`) immediately preceding the token.
    pub doc: Option<String>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Token {
        Token {
            kind,
            text: text.into(),
            value: None,
            span,
            doc: None,
        }
    }

    pub fn eof(span: Span) -> Token {
        Token::new(TokenKind::EOF, "", span)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EOF => write!(f, "end of input"),
            _ => write!(f, "`{}`", self.text),
        }
    }
}
