use super::{ExprResult, ParseResult, Parser, Restrictions};
use crate::{
    ast::{
        self,
        token::{Token, TokenKind},
    },
    errors::{Diagnostic, DiagnosticCode},
    span::Span,
};

/// How far past `{` the parser looks for a `:` or `=>` that marks a map
/// literal.
const MAP_KEY_LOOKAHEAD: usize = 4;

/// Describes one delimited, separated list. Parsing starts right after the
/// opening delimiter and ends after consuming `close`.
#[derive(Clone, Copy)]
pub(crate) struct SeqSpec {
    pub close: TokenKind,
    pub separator: TokenKind,
    pub allow_empty: bool,
    pub allow_trailing: bool,
    /// Accept an open-row tail `| Name` before the closing delimiter.
    pub row_tail: bool,
    /// What one element is, for diagnostics ("a parameter").
    pub element: &'static str,
    /// Produces a more specific message when the separator is missing in
    /// front of the given token.
    pub missing_separator: Option<fn(&Token) -> Option<String>>,
}

impl SeqSpec {
    pub fn comma(close: TokenKind, element: &'static str) -> SeqSpec {
        SeqSpec {
            close,
            separator: TokenKind::Comma,
            allow_empty: true,
            allow_trailing: true,
            row_tail: false,
            element,
            missing_separator: None,
        }
    }

    pub fn non_empty(mut self) -> SeqSpec {
        self.allow_empty = false;
        self
    }

    pub fn no_trailing(mut self) -> SeqSpec {
        self.allow_trailing = false;
        self
    }

    pub fn with_row_tail(mut self) -> SeqSpec {
        self.row_tail = true;
        self
    }

    pub fn with_missing_separator(mut self, f: fn(&Token) -> Option<String>) -> SeqSpec {
        self.missing_separator = Some(f);
        self
    }
}

#[derive(Debug)]
pub(crate) struct Seq<T> {
    pub items: Vec<T>,
    pub rest: Option<ast::Ident>,
    /// The list ended with a separator right before `close`.
    pub trailing: bool,
    pub close: Span,
}

/// What a `{` in expression position opens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CurlyKind {
    Block,
    Map,
    Record,
}

impl Parser {
    /// Expects `open`, then parses the rest of the list described by `spec`.
    pub(crate) fn parse_delimited<T>(
        &mut self,
        open: TokenKind,
        spec: SeqSpec,
        f: impl FnMut(&mut Parser) -> ParseResult<T>,
    ) -> ParseResult<Seq<T>> {
        let open = self.expect(open)?;
        self.parse_seq(&open, spec, f)
    }

    /// The one list combinator. `open` is the delimiter that was already
    /// consumed; it is only used to point at the opener when the list is
    /// never closed.
    ///
    /// A failing element aborts the list. A missing separator is an error,
    /// while a forbidden trailing separator is reported and the list is
    /// still returned.
    pub(crate) fn parse_seq<T>(
        &mut self,
        open: &Token,
        spec: SeqSpec,
        mut f: impl FnMut(&mut Parser) -> ParseResult<T>,
    ) -> ParseResult<Seq<T>> {
        let mut items = vec![];
        let mut rest = None;
        let mut trailing = false;

        if self.at(spec.close) {
            if !spec.allow_empty {
                let found = self.current().clone();
                let msg = format!("expected {}, but found {}", spec.element, found);
                return Err(self.error(
                    Diagnostic::error(msg, found.span).with_code(DiagnosticCode::MissingElement),
                ));
            }

            let close = self.bump();
            return Ok(Seq {
                items,
                rest,
                trailing,
                close: close.span,
            });
        }

        loop {
            if spec.row_tail && self.at(TokenKind::Pipe) {
                self.bump();
                rest = Some(self.expect_id()?);
                break;
            }

            items.push(f(self)?);

            if self.at(spec.separator) {
                let sep = self.bump();
                if self.at(spec.close) {
                    trailing = true;
                    if !spec.allow_trailing {
                        let diag = Diagnostic::error(
                            format!("unexpected trailing {}", spec.separator.desc()),
                            sep.span,
                        )
                        .with_code(DiagnosticCode::MissingElement)
                        .with_help(format!("remove the trailing {}", spec.separator.desc()));
                        self.record(diag);
                    }
                    break;
                }

                if self.is_eof() {
                    break;
                }
                continue;
            }

            if self.at(spec.close) || self.is_eof() {
                break;
            }

            if spec.row_tail && self.at(TokenKind::Pipe) {
                continue;
            }

            let found = self.current().clone();
            let msg = spec
                .missing_separator
                .and_then(|f| f(&found))
                .unwrap_or_else(|| {
                    format!(
                        "expected {} or {}, but found {}",
                        spec.separator.desc(),
                        spec.close.desc(),
                        found
                    )
                });
            return Err(self.error(
                Diagnostic::error(msg, found.span).with_code(DiagnosticCode::MissingSeparator),
            ));
        }

        let close = self.expect_matching(open, spec.close)?;
        log::trace!(
            "[parse_seq] {} element(s) of {} closed at {} (trailing: {})",
            items.len(),
            spec.element,
            close.span,
            trailing
        );
        Ok(Seq {
            items,
            rest,
            trailing,
            close: close.span,
        })
    }

    /// Decides what the `{` under the cursor opens, without consuming
    /// anything. `{}` is an empty block.
    pub(crate) fn curly_kind(&mut self) -> CurlyKind {
        let first = self.kind_at(1);
        if first == TokenKind::RightCurly {
            return CurlyKind::Block;
        }

        if first == TokenKind::Ident && self.kind_at(2) == TokenKind::Colon {
            return CurlyKind::Record;
        }

        if first.is_stmt_start() || first.is_decl_start() {
            return CurlyKind::Block;
        }

        let mut depth = 0usize;
        for n in 1..=MAP_KEY_LOOKAHEAD {
            match self.kind_at(n) {
                TokenKind::LeftParen | TokenKind::LeftBracket => depth += 1,
                TokenKind::RightParen | TokenKind::RightBracket => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                TokenKind::Colon | TokenKind::FatArrow if depth == 0 => return CurlyKind::Map,
                TokenKind::LeftCurly
                | TokenKind::RightCurly
                | TokenKind::Semi
                | TokenKind::EOF
                    if depth == 0 =>
                {
                    break
                }
                _ => {}
            }
        }
        CurlyKind::Block
    }

    pub(crate) fn parse_curly_expr(&mut self) -> ExprResult {
        match self.curly_kind() {
            CurlyKind::Block => {
                let block = self.parse_block(true)?;
                let span = block.span;
                Ok(ast::Expr::new(ast::ExprKind::Block(block), span))
            }
            CurlyKind::Map => self.parse_map_expr(),
            CurlyKind::Record => self.parse_record_expr(),
        }
    }

    pub(crate) fn parse_array_expr(&mut self) -> ExprResult {
        let start = self.start_pos();
        let parser = &mut self.scope().without_restrictions(Restrictions::NO_STRUCT_LITERAL);
        let spec = SeqSpec::comma(TokenKind::RightBracket, "an array element");
        let seq = parser.parse_delimited(TokenKind::LeftBracket, spec, |p| p.parse_expr())?;
        Ok(ast::Expr::new(
            ast::ExprKind::Array(seq.items),
            parser.span_from(start),
        ))
    }

    /// `{ key: value, ... }` or `{ key => value, ... }`.
    fn parse_map_expr(&mut self) -> ExprResult {
        let start = self.start_pos();
        let parser = &mut self.scope().without_restrictions(Restrictions::NO_STRUCT_LITERAL);
        let spec = SeqSpec::comma(TokenKind::RightCurly, "a map entry");
        let seq = parser.parse_delimited(TokenKind::LeftCurly, spec, |p| {
            let key = p.parse_expr()?;
            if !expect_if!(p, TokenKind::Colon | TokenKind::FatArrow) {
                return Err(p.expected("`:` or `=>` after a map key"));
            }
            let value = p.parse_expr()?;
            Ok(ast::MapEntry { key, value })
        })?;
        Ok(ast::Expr::new(
            ast::ExprKind::Map(seq.items),
            parser.span_from(start),
        ))
    }

    /// `{ x: 1, y }`: an anonymous record.
    fn parse_record_expr(&mut self) -> ExprResult {
        let start = self.start_pos();
        let parser = &mut self.scope().without_restrictions(Restrictions::NO_STRUCT_LITERAL);
        let spec = SeqSpec::comma(TokenKind::RightCurly, "a field");
        let seq = parser.parse_delimited(TokenKind::LeftCurly, spec, |p| p.parse_field_init())?;
        Ok(ast::Expr::new(
            ast::ExprKind::Record(seq.items),
            parser.span_from(start),
        ))
    }

    /// The field list of `Name { ... }`; `name` has already been parsed and
    /// the cursor is on `{`.
    pub(crate) fn parse_struct_expr(&mut self, name: ast::Expr) -> ExprResult {
        let start = name.span.start;
        let parser = &mut self.scope().without_restrictions(Restrictions::NO_STRUCT_LITERAL);
        let spec = SeqSpec::comma(TokenKind::RightCurly, "a field");
        let seq = parser.parse_delimited(TokenKind::LeftCurly, spec, |p| p.parse_field_init())?;
        Ok(ast::Expr::new(
            ast::ExprKind::Struct {
                name: Box::new(name),
                fields: seq.items,
            },
            parser.span_from(start),
        ))
    }

    /// `name: value`, or the shorthand `name` for `name: name`.
    fn parse_field_init(&mut self) -> ParseResult<ast::FieldInit> {
        let start = self.start_pos();
        let name = self.expect_id()?;
        let value = if expect_if!(self, TokenKind::Colon) {
            self.parse_expr()?
        } else {
            ast::Expr::new(ast::ExprKind::Name(name.clone()), name.span)
        };
        Ok(ast::FieldInit {
            name,
            value,
            span: self.span_from(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CurlyKind, Seq, SeqSpec};
    use crate::{
        ast::{token::TokenKind, Ident},
        errors::{Diagnostic, DiagnosticCode},
        parse::{ParseOptions, ParseResult, Parser},
    };

    fn names(src: &str, spec: SeqSpec) -> (ParseResult<Seq<Ident>>, Vec<Diagnostic>) {
        let mut parser = Parser::new(src, ParseOptions::default());
        let seq = parser.parse_delimited(TokenKind::LeftParen, spec, |p| p.expect_id());
        (seq, parser.errors().to_vec())
    }

    fn listed(seq: &Seq<Ident>) -> String {
        seq.items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn separator_policy() {
        let spec = SeqSpec::comma(TokenKind::RightParen, "a name");

        let (seq, errors) = names("()", spec);
        let seq = seq.expect("empty list");
        assert!(seq.items.is_empty() && !seq.trailing && errors.is_empty());

        let (seq, errors) = names("(a, b, c)", spec);
        let seq = seq.expect("plain list");
        assert_eq!(listed(&seq), "a b c");
        assert!(!seq.trailing && errors.is_empty());

        let (seq, errors) = names("(a, b, c,)", spec);
        let seq = seq.expect("trailing comma");
        assert_eq!(listed(&seq), "a b c");
        assert!(seq.trailing && errors.is_empty());

        let (seq, errors) = names("(a b)", spec);
        assert!(seq.is_err());
        assert_eq!(errors[0].code, Some(DiagnosticCode::MissingSeparator));
        assert_eq!(errors[0].msg, "expected `,` or `)`, but found `b`");
    }

    #[test]
    fn forbidden_trailing_separator_still_returns_the_list() {
        let spec = SeqSpec::comma(TokenKind::RightParen, "a name").no_trailing();
        let (seq, errors) = names("(a, b,)", spec);
        let seq = seq.expect("list is kept");
        assert!(seq.trailing);
        assert_eq!(seq.items.len(), 2);
        assert_eq!(errors[0].code, Some(DiagnosticCode::MissingElement));
    }

    #[test]
    fn empty_list_where_one_is_required() {
        let spec = SeqSpec::comma(TokenKind::RightParen, "a name").non_empty();
        let (seq, errors) = names("()", spec);
        assert!(seq.is_err());
        assert_eq!(errors[0].code, Some(DiagnosticCode::MissingElement));
    }

    fn curly(src: &str) -> CurlyKind {
        let mut parser = Parser::new(src, ParseOptions::default());
        parser.curly_kind()
    }

    #[test]
    fn classifies_braces_by_lookahead() {
        assert_eq!(curly("{}"), CurlyKind::Block);
        assert_eq!(curly("{ x }"), CurlyKind::Block);
        assert_eq!(curly("{ x: 1 }"), CurlyKind::Record);
        assert_eq!(curly("{ \"a\": 1 }"), CurlyKind::Map);
        assert_eq!(curly("{ a::b => 1 }"), CurlyKind::Map);
        assert_eq!(curly("{ let x = 1; }"), CurlyKind::Block);
        assert_eq!(curly("{ f(a, b) }"), CurlyKind::Block);
        assert_eq!(curly("{ (a): 1 }"), CurlyKind::Map);
    }

    #[test]
    fn map_detection_is_bounded() {
        // the `:` sits past the lookahead limit
        assert_eq!(curly("{ a + b + c : 1 }"), CurlyKind::Block);
    }
}
