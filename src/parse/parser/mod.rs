#[macro_use]
mod macros;

mod collections;
mod context;
mod control;
mod decl;
mod expr;
mod func;
mod imports;
mod ops;
mod pattern;
mod recover;
mod stmt;
mod ty;

#[cfg(test)]
mod tests;

use crate::{
    ast::{
        token::{Token, TokenKind},
        Decl, Expr, File, Ident, Pattern, Stmt, TypeExpr,
    },
    errors::{Diagnostic, DiagnosticCode},
    parse::{
        lexer::{Lexer, TokenSource},
        window::TokenWindow,
    },
    pathlib::FilePath,
    span::{FileId, Pos, Span},
};

pub(crate) use context::{ParseContext, ParseScope};
pub(crate) use recover::{Recover, RecoveryCtx};

/// Marker for a production that gave up. The diagnostic explaining why has
/// already been recorded on the parser by the time this is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseFailed;

pub type ParseResult<T> = Result<T, ParseFailed>;
pub type ExprResult = ParseResult<Expr>;
pub type TypeResult = ParseResult<TypeExpr>;
pub type PatternResult = ParseResult<Pattern>;
pub type StmtResult = ParseResult<Option<Stmt>>;
pub type DeclResult = ParseResult<Decl>;

bitflags::bitflags! {
    #[derive(Default)]
    pub struct Restrictions: u8 {
        /// `Name {` does not start a struct literal. Set while parsing the
        /// head of `if`, `while`, `for` and `match`, where `{` opens the body.
        const NO_STRUCT_LITERAL = 1 << 0;
    }
}

/// Deep enough for real programs, shallow enough that hitting the limit
/// comes well before exhausting a 2 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Clone, Debug)]
pub struct ParseOptions {
    pub filepath: FilePath,
    /// Tag attached to every span produced for this input.
    pub file_id: Option<FileId>,
    /// How deeply expressions, types, patterns and blocks may nest before
    /// the parser gives up on the construct.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> ParseOptions {
        ParseOptions {
            filepath: FilePath::default(),
            file_id: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn new(filepath: impl Into<FilePath>) -> ParseOptions {
        ParseOptions {
            filepath: filepath.into(),
            ..ParseOptions::default()
        }
    }
}

/// A parse result bundled with every diagnostic produced along the way.
#[derive(Debug)]
pub struct ParseDiagnostics<T> {
    pub value: Option<T>,
    pub errors: Vec<Diagnostic>,
}

impl<T> ParseDiagnostics<T> {
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(Diagnostic::is_error)
    }
}

pub struct Parser {
    window: TokenWindow,
    options: ParseOptions,
    errors: Vec<Diagnostic>,
    pub(crate) ctx: ParseContext,
}

impl Parser {
    pub fn new(src: &str, options: ParseOptions) -> Parser {
        Parser::from_source(Lexer::new(src), options)
    }

    pub fn from_source(source: impl TokenSource + 'static, options: ParseOptions) -> Parser {
        let mut window = TokenWindow::new(Box::new(source));
        if let Some(file) = options.file_id {
            window.set_file(file);
        }

        let mut parser = Parser {
            window,
            options,
            errors: vec![],
            ctx: ParseContext::default(),
        };
        parser.skip_illegal();
        parser
    }

    /// Parses `src` as a whole file and returns the tree together with all
    /// diagnostics.
    pub fn parse_source(src: &str, options: ParseOptions) -> ParseDiagnostics<File> {
        let mut parser = Parser::new(src, options);
        let value = parser.parse_file();
        ParseDiagnostics {
            value,
            errors: parser.into_errors(),
        }
    }

    /// Parses a sequence of declarations up to the end of input. Returns
    /// `None` when no declaration could be produced at all; diagnostics are
    /// available through `errors` either way.
    pub fn parse_file(&mut self) -> Option<File> {
        let start = self.start_pos();
        log::debug!("[parse_file] {}", self.options.filepath);
        let decls = self.parse_items(None);
        if decls.is_empty() {
            log::debug!("[parse_file] no declarations");
            return None;
        }

        let span = self.span_from(start);
        Some(File {
            decls,
            doc: self.window.module_doc(),
            filepath: self.options.filepath.clone(),
            span,
        })
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Diagnostic> {
        self.errors
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub(crate) fn scope(&mut self) -> ParseScope<'_> {
        ParseScope {
            p: self,
            undo: vec![],
        }
    }

    pub(crate) fn current(&self) -> &Token {
        self.window.current()
    }

    pub(crate) fn kind(&self) -> TokenKind {
        self.window.current().kind
    }

    pub(crate) fn kind_at(&mut self, n: usize) -> TokenKind {
        self.window.peek_at(n).kind
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.at(TokenKind::EOF)
    }

    pub(crate) fn consumed(&self) -> usize {
        self.window.consumed()
    }

    pub(crate) fn restricted(&self, r: Restrictions) -> bool {
        self.ctx.restrictions.contains(r)
    }

    /// Consumes the current token and returns it. Illegal tokens that
    /// follow are reported and skipped, so productions never see them.
    pub(crate) fn bump(&mut self) -> Token {
        let tok = self.window.advance();
        log::trace!("[bump] {} at {}", tok, tok.span);
        self.skip_illegal();
        tok
    }

    fn skip_illegal(&mut self) {
        while self.at(TokenKind::Illegal) {
            let tok = self.window.advance();
            let msg = tok
                .value
                .clone()
                .unwrap_or_else(|| format!("illegal token `{}`", tok.text));
            self.record(Diagnostic::error(msg, tok.span).with_code(DiagnosticCode::IllegalToken));
        }
    }

    pub(crate) fn start_pos(&self) -> Pos {
        self.current().span.start
    }

    /// The span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: Pos) -> Span {
        let end = self.window.prev_end();
        let end = if end.offset < start.offset { start } else { end };
        Span::new(start, end).with_file(self.options.file_id)
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.expected(kind.desc()))
        }
    }

    pub(crate) fn expect_id(&mut self) -> ParseResult<Ident> {
        if self.at(TokenKind::Ident) {
            let tok = self.bump();
            Ok(Ident::new(tok.text, tok.span))
        } else {
            Err(self.expected("an identifier"))
        }
    }

    /// Expects the token closing the delimiter opened at `open`.
    pub(crate) fn expect_matching(&mut self, open: &Token, close: TokenKind) -> ParseResult<Token> {
        if self.at(close) {
            return Ok(self.bump());
        }

        let found = self.current().clone();
        let msg = format!(
            "expected a matching {} for `{}`, but found {}",
            close.desc(),
            open.text,
            found
        );
        let diag = Diagnostic::error(msg, found.span)
            .with_code(DiagnosticCode::UnclosedDelimiter)
            .with_label(open.span, format!("`{}` opened here", open.text));
        Err(self.error(diag))
    }

    /// Records "expected X, but found Y" at the current token without
    /// consuming it.
    pub(crate) fn expected(&mut self, what: &str) -> ParseFailed {
        let found = self.current().clone();
        let msg = format!("expected {}, but found {}", what, found);
        self.error(Diagnostic::error(msg, found.span).with_code(DiagnosticCode::ExpectedToken))
    }

    /// Records "unexpected X" at the current token without consuming it.
    pub(crate) fn unexpected(&mut self) -> ParseFailed {
        let found = self.current().clone();
        let msg = format!("unexpected {}", found);
        self.error(Diagnostic::error(msg, found.span).with_code(DiagnosticCode::UnexpectedToken))
    }

    pub(crate) fn error(&mut self, diag: Diagnostic) -> ParseFailed {
        self.record(diag);
        ParseFailed
    }

    /// Adds a diagnostic, annotated with what was being parsed. The same
    /// message at the same place is only reported once.
    pub(crate) fn record(&mut self, mut diag: Diagnostic) {
        if let Some(desc) = &self.ctx.description {
            diag = diag.with_note(format!("while parsing {}", desc));
        }

        if let Some(last) = self.errors.last() {
            if last.msg == diag.msg && last.span == diag.span {
                log::debug!("[record] DUPLICATE ERROR: {}", diag);
                return;
            }
        }

        log::debug!("[record] {}", diag);
        self.errors.push(diag);
    }
}
