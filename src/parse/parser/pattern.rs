use super::{collections::SeqSpec, ParseFailed, ParseResult, Parser, PatternResult};

use crate::{
    ast::{self, token::TokenKind, Respan},
    errors::{Diagnostic, DiagnosticCode},
    span::Span,
};

const GUARD_HELP: &str = "move the logic into a match guard: `pattern if condition => ...`";

enum FieldItem {
    Field(ast::FieldPattern),
    Rest(Span),
}

impl Parser {
    /// A full pattern, alternations included. `..` is not allowed at the
    /// top level.
    pub(crate) fn parse_pattern(&mut self) -> PatternResult {
        self.parse_pattern_top().map(|(pattern, _)| pattern)
    }

    /// Like `parse_pattern`, also reporting whether the result is an
    /// alternation written without parentheses.
    pub(crate) fn parse_pattern_top(&mut self) -> ParseResult<(ast::Pattern, bool)> {
        let parser = &mut self.scope().with_rest_allowed(false).deeper("pattern")?;
        parser.parse_pattern_or()
    }

    /// The pattern of a match arm. Expression syntax right after it is
    /// rejected with advice to use a guard.
    pub(crate) fn parse_arm_pattern(&mut self) -> ParseResult<(ast::Pattern, bool)> {
        let (pattern, bare_alternation) = self.parse_pattern_top()?;
        self.reject_pattern_trailer()?;
        Ok((pattern, bare_alternation))
    }

    /// A pattern that cannot be an alternation, for positions where `|`
    /// means something else, such as closure parameters.
    pub(crate) fn parse_pattern_single(&mut self) -> PatternResult {
        let parser = &mut self.scope().with_rest_allowed(false).deeper("pattern")?;
        parser.parse_pattern_binding()
    }

    fn parse_pattern_or(&mut self) -> ParseResult<(ast::Pattern, bool)> {
        let start = self.start_pos();
        let first = self.parse_pattern_binding()?;
        if !peek!(self, TokenKind::Pipe) {
            return Ok((first, false));
        }
        if first.is_rest() {
            let diag = Diagnostic::error("`..` cannot be one of several alternatives", first.span)
                .with_code(DiagnosticCode::InvalidRest);
            return Err(self.error(diag));
        }

        let mut alts = vec![first];
        let parser = &mut self.scope().with_rest_allowed(false);
        while expect_if!(parser, TokenKind::Pipe) {
            alts.push(parser.parse_pattern_binding()?);
        }
        let span = parser.span_from(start);
        Ok((ast::Pattern::new(ast::PatternKind::Or(alts), span), true))
    }

    /// `name @ pattern`, or a primary pattern.
    fn parse_pattern_binding(&mut self) -> PatternResult {
        let start = self.start_pos();
        let mut pattern = self.parse_pattern_primary()?;

        if peek!(self, TokenKind::At) {
            let at = self.current().clone();
            match &mut pattern.kind {
                ast::PatternKind::Binding { sub, .. } if sub.is_none() => {
                    self.bump();
                    let inner = self.scope().deeper("pattern")?.parse_pattern_binding()?;
                    *sub = Some(Box::new(inner));
                    pattern.span = self.span_from(start);
                }
                _ => {
                    let diag = Diagnostic::error("`@` must follow a plain binding name", at.span)
                        .with_code(DiagnosticCode::InvalidPattern)
                        .with_label(pattern.span, "not a binding");
                    return Err(self.error(diag));
                }
            }
        }

        Ok(pattern)
    }

    /// Catches expression syntax after an arm's pattern and explains that
    /// it belongs in a guard.
    fn reject_pattern_trailer(&mut self) -> ParseResult<()> {
        let msg = match self.kind() {
            TokenKind::Equals
            | TokenKind::PlusEq
            | TokenKind::MinusEq
            | TokenKind::AsteriskEq
            | TokenKind::SlashEq
            | TokenKind::PercentEq => "assignment is not allowed in a pattern",
            TokenKind::Dot
                if self.kind_at(1) == TokenKind::Ident
                    && self.kind_at(2) == TokenKind::LeftParen =>
            {
                "method calls are not allowed in a pattern"
            }
            TokenKind::Dot => "field access is not allowed in a pattern",
            TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Asterisk
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::DoubleAmpersand
            | TokenKind::DoublePipe => "operators are not allowed in a pattern",
            _ => return Ok(()),
        };

        let span = self.current().span;
        let diag = Diagnostic::error(msg, span)
            .with_code(DiagnosticCode::InvalidPattern)
            .with_help(GUARD_HELP);
        Err(self.error(diag))
    }

    fn parse_pattern_primary(&mut self) -> PatternResult {
        let rest_allowed = self.ctx.rest_allowed;
        let parser = &mut self.scope().with_rest_allowed(false);
        let start = parser.start_pos();
        log::trace!("[parse_pattern_primary] {}", parser.current());

        let kind = match parser.kind() {
            TokenKind::Underscore => {
                parser.bump();
                ast::PatternKind::Wildcard
            }
            TokenKind::DotDot => {
                let tok = parser.bump();
                if !rest_allowed {
                    let diag = Diagnostic::error(
                        "`..` is only allowed inside tuple, slice and struct patterns",
                        tok.span,
                    )
                    .with_code(DiagnosticCode::InvalidRest);
                    return Err(parser.error(diag));
                }
                ast::PatternKind::Rest
            }
            TokenKind::Mut => {
                parser.bump();
                let name = parser.expect_id()?;
                ast::PatternKind::Binding {
                    name,
                    mutable: true,
                    by_ref: false,
                    sub: None,
                }
            }
            TokenKind::Ref => {
                parser.bump();
                let mutable = expect_if!(parser, TokenKind::Mut);
                let name = parser.expect_id()?;
                ast::PatternKind::Binding {
                    name,
                    mutable,
                    by_ref: true,
                    sub: None,
                }
            }
            TokenKind::Ampersand => {
                parser.bump();
                let mutable = expect_if!(parser, TokenKind::Mut);
                let pattern = parser.nested_pattern_primary()?;
                ast::PatternKind::Ref {
                    mutable,
                    pattern: Box::new(pattern),
                }
            }
            TokenKind::DoubleAmpersand => {
                parser.bump();
                let mutable = expect_if!(parser, TokenKind::Mut);
                let pattern = parser.nested_pattern_primary()?;
                let inner = ast::Pattern::new(
                    ast::PatternKind::Ref {
                        mutable,
                        pattern: Box::new(pattern),
                    },
                    parser.span_from(start),
                );
                ast::PatternKind::Ref {
                    mutable: false,
                    pattern: Box::new(inner),
                }
            }
            TokenKind::Box => {
                parser.bump();
                let pattern = parser.nested_pattern_primary()?;
                ast::PatternKind::Box(Box::new(pattern))
            }
            TokenKind::LeftParen => return parser.parse_paren_pattern(),
            TokenKind::LeftBracket => {
                let spec = SeqSpec::comma(TokenKind::RightBracket, "a pattern");
                let elems = parser
                    .parse_delimited(TokenKind::LeftBracket, spec, |p| p.parse_pattern_element())?
                    .items;
                parser.check_single_rest(&elems, "slice");
                ast::PatternKind::Slice(elems)
            }
            TokenKind::Minus if peek_at!(parser, 1, TokenKind::Int | TokenKind::Float) => {
                parser.parse_literal_pattern()?
            }
            kind if kind.is_literal() => parser.parse_literal_pattern()?,
            TokenKind::Ident => parser.parse_path_pattern()?,
            TokenKind::LeftCurly => return Err(parser.not_a_pattern("blocks")),
            TokenKind::If
            | TokenKind::Match
            | TokenKind::While
            | TokenKind::For
            | TokenKind::Return => return Err(parser.not_a_pattern("control flow expressions")),
            TokenKind::Pipe | TokenKind::DoublePipe => return Err(parser.not_a_pattern("closures")),
            _ => return Err(parser.expected("a pattern")),
        };

        Ok(ast::Pattern::new(kind, parser.span_from(start)))
    }

    fn nested_pattern_primary(&mut self) -> PatternResult {
        self.scope().deeper("pattern")?.parse_pattern_primary()
    }

    fn not_a_pattern(&mut self, what: &str) -> ParseFailed {
        let span = self.current().span;
        let diag = Diagnostic::error(format!("{} are not allowed in a pattern", what), span)
            .with_code(DiagnosticCode::InvalidPattern)
            .with_help(GUARD_HELP);
        self.error(diag)
    }

    /// An element of a tuple, slice or tuple-struct pattern, where `..` is
    /// allowed.
    fn parse_pattern_element(&mut self) -> PatternResult {
        let parser = &mut self.scope().with_rest_allowed(true).deeper("pattern")?;
        parser.parse_pattern_or().map(|(pattern, _)| pattern)
    }

    fn check_single_rest(&mut self, elems: &[ast::Pattern], what: &str) {
        let mut rests = elems.iter().filter(|p| p.is_rest());
        if let (Some(first), Some(second)) = (rests.next(), rests.next()) {
            let diag = Diagnostic::error(
                format!("`..` can only be used once per {} pattern", what),
                second.span,
            )
            .with_code(DiagnosticCode::InvalidRest)
            .with_label(first.span, "previously used here");
            self.record(diag);
        }
    }

    /// `()`, `(p)` or `(a, b, ..)`.
    fn parse_paren_pattern(&mut self) -> PatternResult {
        let start = self.start_pos();
        let open = self.expect(TokenKind::LeftParen)?;
        if expect_if!(self, TokenKind::RightParen) {
            return Ok(ast::Pattern::new(
                ast::PatternKind::Tuple(vec![]),
                self.span_from(start),
            ));
        }

        let mut first = self.parse_pattern_element()?;
        if expect_if!(self, TokenKind::Comma) {
            let spec = SeqSpec::comma(TokenKind::RightParen, "a pattern");
            let seq = self.parse_seq(&open, spec, |p| p.parse_pattern_element())?;
            let mut elems = vec![first];
            elems.extend(seq.items);
            self.check_single_rest(&elems, "tuple");
            return Ok(ast::Pattern::new(
                ast::PatternKind::Tuple(elems),
                self.span_from(start),
            ));
        }

        self.expect_matching(&open, TokenKind::RightParen)?;
        if first.is_rest() {
            // `(..)` matches a tuple of any length
            return Ok(ast::Pattern::new(
                ast::PatternKind::Tuple(vec![first]),
                self.span_from(start),
            ));
        }
        first.respan(self.span_from(start));
        Ok(first)
    }

    fn parse_pattern_literal_value(&mut self) -> ParseResult<ast::Literal> {
        let negative = expect_if!(self, TokenKind::Minus);
        if negative && !peek!(self, TokenKind::Int | TokenKind::Float) {
            return Err(self.expected("a number after `-`"));
        }
        let tok = self.bump();
        let sign = if negative { "-" } else { "" };
        let lit = match tok.kind {
            TokenKind::Int => ast::Literal::Int(format!("{}{}", sign, tok.text)),
            TokenKind::Float => ast::Literal::Float(format!("{}{}", sign, tok.text)),
            TokenKind::Str if !negative => ast::Literal::Str(tok.value.unwrap_or_default()),
            TokenKind::Char if !negative => {
                match tok.value.as_deref().and_then(|v| v.chars().next()) {
                    Some(ch) => ast::Literal::Char(ch),
                    None => {
                        let diag = Diagnostic::error("empty character literal", tok.span)
                            .with_code(DiagnosticCode::IllegalToken);
                        return Err(self.error(diag));
                    }
                }
            }
            TokenKind::True if !negative => ast::Literal::Bool(true),
            TokenKind::False if !negative => ast::Literal::Bool(false),
            _ => {
                let msg = format!("expected a literal, but found {}", tok);
                let diag =
                    Diagnostic::error(msg, tok.span).with_code(DiagnosticCode::ExpectedToken);
                return Err(self.error(diag));
            }
        };
        Ok(lit)
    }

    /// A literal, or a range between two literals. Exclusive ranges are
    /// only accepted between characters.
    fn parse_literal_pattern(&mut self) -> ParseResult<ast::PatternKind> {
        let start_lit = self.parse_pattern_literal_value()?;
        let inclusive = match self.kind() {
            TokenKind::DotDotEq => true,
            TokenKind::DotDot => false,
            _ => return Ok(ast::PatternKind::Literal(start_lit)),
        };

        let op = self.bump();
        if !peek!(self, TokenKind::Int | TokenKind::Float | TokenKind::Char | TokenKind::Minus) {
            return Err(self.expected("the end of the range"));
        }
        let end_lit = self.parse_pattern_literal_value()?;

        let both_chars = matches!(
            (&start_lit, &end_lit),
            (ast::Literal::Char(_), ast::Literal::Char(_))
        );
        if !inclusive && !both_chars {
            let diag = Diagnostic::error(
                "exclusive range patterns are only supported between `char` literals",
                op.span,
            )
            .with_code(DiagnosticCode::InvalidPattern)
            .with_help("use `..=` for an inclusive range");
            return Err(self.error(diag));
        }

        Ok(ast::PatternKind::Range {
            start: start_lit,
            end: end_lit,
            inclusive,
        })
    }

    /// Binding names, enum variants, tuple structs and struct patterns.
    fn parse_path_pattern(&mut self) -> ParseResult<ast::PatternKind> {
        let mut path = vec![self.expect_id()?];
        while expect_if!(self, TokenKind::DoubleColon) {
            path.push(self.expect_id()?);
        }

        match self.kind() {
            TokenKind::LeftParen => {
                let spec = SeqSpec::comma(TokenKind::RightParen, "a pattern");
                let elems = self
                    .parse_delimited(TokenKind::LeftParen, spec, |p| p.parse_pattern_element())?
                    .items;
                self.check_single_rest(&elems, "tuple");
                if path.len() == 1 {
                    Ok(ast::PatternKind::TupleStruct { path, elems })
                } else {
                    Ok(ast::PatternKind::Variant {
                        path,
                        payload: Some(elems),
                    })
                }
            }
            TokenKind::LeftCurly => self.parse_struct_pattern(path),
            _ if path.len() == 1 => {
                let name = path.remove(0);
                Ok(ast::PatternKind::Binding {
                    name,
                    mutable: false,
                    by_ref: false,
                    sub: None,
                })
            }
            _ => Ok(ast::PatternKind::Variant {
                path,
                payload: None,
            }),
        }
    }

    /// `Path { field, field: pattern, .. }`
    fn parse_struct_pattern(&mut self, path: Vec<ast::Ident>) -> ParseResult<ast::PatternKind> {
        let spec = SeqSpec::comma(TokenKind::RightCurly, "a field pattern");
        let items = self
            .parse_delimited(TokenKind::LeftCurly, spec, |p| {
                if peek!(p, TokenKind::DotDot) {
                    p.scope()
                        .with_rest_allowed(true)
                        .parse_pattern_primary()
                        .map(|rest| FieldItem::Rest(rest.span))
                } else {
                    p.parse_field_pattern().map(FieldItem::Field)
                }
            })?
            .items;

        let mut fields = vec![];
        let mut rest = false;
        let count = items.len();
        for (idx, item) in items.into_iter().enumerate() {
            match item {
                FieldItem::Field(field) => fields.push(field),
                FieldItem::Rest(span) if rest => {
                    let diag = Diagnostic::error("`..` can only be used once per struct pattern", span)
                        .with_code(DiagnosticCode::InvalidRest);
                    self.record(diag);
                }
                FieldItem::Rest(span) => {
                    rest = true;
                    if idx + 1 != count {
                        let diag =
                            Diagnostic::error("`..` must be the last entry of a struct pattern", span)
                                .with_code(DiagnosticCode::InvalidRest);
                        self.record(diag);
                    }
                }
            }
        }

        Ok(ast::PatternKind::Struct { path, fields, rest })
    }

    fn parse_field_pattern(&mut self) -> ParseResult<ast::FieldPattern> {
        let start = self.start_pos();
        let name = self.expect_id()?;
        let pattern = if expect_if!(self, TokenKind::Colon) {
            Some(self.parse_pattern_element_strict()?)
        } else {
            None
        };
        Ok(ast::FieldPattern {
            name,
            pattern,
            span: self.span_from(start),
        })
    }

    /// A nested pattern in a position where `..` is not an element.
    fn parse_pattern_element_strict(&mut self) -> PatternResult {
        let parser = &mut self.scope().with_rest_allowed(false).deeper("pattern")?;
        parser.parse_pattern_or().map(|(pattern, _)| pattern)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{token::TokenKind, PatternKind},
        errors::DiagnosticCode,
        parse::{ParseOptions, Parser},
    };

    fn pattern(src: &str) -> String {
        let mut parser = Parser::new(src, ParseOptions::default());
        let pattern = parser.parse_pattern().expect("pattern parses");
        assert!(parser.errors().is_empty(), "{:?}", parser.errors());
        pattern.to_string()
    }

    fn pattern_error(src: &str) -> (String, DiagnosticCode, Option<String>) {
        let mut parser = Parser::new(src, ParseOptions::default());
        let _ = parser.parse_arm_pattern();
        let diag = parser.errors().first().expect("a diagnostic").clone();
        (diag.msg, diag.code.expect("a code"), diag.help)
    }

    #[test]
    fn single_ident_is_a_binding() {
        let mut parser = Parser::new("x", ParseOptions::default());
        let p = parser.parse_pattern().expect("pattern parses");
        assert!(matches!(p.kind, PatternKind::Binding { .. }));
    }

    #[test]
    fn paths_and_payloads() {
        assert_eq!(pattern("Some(x)"), "(Some x)");
        assert_eq!(pattern("Shape::Circle"), "Shape::Circle");
        assert_eq!(pattern("Shape::Rect(w, h)"), "(Shape::Rect w h)");
        assert_eq!(pattern("Point { x, y: 0, .. }"), "(struct Point x (y 0) ..)");
    }

    #[test]
    fn rest_inside_sequences() {
        assert_eq!(pattern("(first, ..)"), "(tuple first ..)");
        assert_eq!(pattern("[head, rest @ ..]"), "(slice head (@ rest ..))");
        assert_eq!(pattern("(..)"), "(tuple ..)");
    }

    #[test]
    fn rest_at_top_level_is_rejected() {
        let (_, code, _) = pattern_error("..");
        assert_eq!(code, DiagnosticCode::InvalidRest);
    }

    #[test]
    fn rest_inside_alternation_is_rejected() {
        for src in &["(a | ..)", "(.. | a)", "(.. | a, ..)", "[.. | a]"] {
            let (_, code, _) = pattern_error(src);
            assert_eq!(code, DiagnosticCode::InvalidRest, "{}", src);
        }
    }

    #[test]
    fn deeply_nested_prefixes_hit_the_limit() {
        for prefix in &["box ", "&", "&&", "x @ "] {
            let src = format!("{}x", prefix.repeat(5000));
            let mut parser = Parser::new(&src, ParseOptions::default());
            assert!(parser.parse_pattern().is_err(), "{}", prefix);
            assert!(
                parser.errors().iter().any(|e| e.code == Some(DiagnosticCode::TooDeep)),
                "{:?}",
                parser.errors()
            );
        }
    }

    #[test]
    fn nested_prefixes_within_the_limit() {
        assert_eq!(pattern("box box x"), "(box (box x))");
        assert_eq!(pattern("a @ b @ 1"), "(@ a (@ b 1))");
    }

    #[test]
    fn minus_must_precede_a_number() {
        let mut parser = Parser::new("1..=-}", ParseOptions::default());
        assert!(parser.parse_pattern().is_err());
        assert!(parser.errors()[0].msg.contains("after `-`"), "{}", parser.errors()[0].msg);
        assert_eq!(parser.current().kind, TokenKind::RightCurly);
    }

    #[test]
    fn two_rests_in_a_tuple() {
        let (msg, code, _) = pattern_error("(.., x, ..)");
        assert_eq!(code, DiagnosticCode::InvalidRest);
        assert!(msg.contains("once"), "{}", msg);
    }

    #[test]
    fn ranges_and_negative_literals() {
        assert_eq!(pattern("1..=5"), "(range 1 ..= 5)");
        assert_eq!(pattern("-10..=-1"), "(range -10 ..= -1)");
        assert_eq!(pattern("'a'..'z'"), "(range 'a' .. 'z')");
    }

    #[test]
    fn exclusive_integer_range_is_rejected() {
        let (_, code, help) = pattern_error("1..5");
        assert_eq!(code, DiagnosticCode::InvalidPattern);
        assert!(help.unwrap_or_default().contains("..="));
    }

    #[test]
    fn expressions_point_at_guards() {
        for src in &["x = 1", "{ x }", "if x", "|x| x", "x.len()", "a + 1"] {
            let (_, code, help) = pattern_error(src);
            assert_eq!(code, DiagnosticCode::InvalidPattern, "{}", src);
            assert!(help.unwrap_or_default().contains("guard"), "{}", src);
        }
    }

    #[test]
    fn bindings_with_modifiers() {
        assert_eq!(pattern("mut x"), "mut x");
        assert_eq!(pattern("ref mut x"), "ref mut x");
        assert_eq!(pattern("&(a, b)"), "(ref (tuple a b))");
        assert_eq!(pattern("box x"), "(box x)");
        assert_eq!(pattern("A | B"), "(or A B)");
    }
}
