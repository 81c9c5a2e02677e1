use super::{collections::SeqSpec, ParseResult, Parser, TypeResult};

use crate::{
    ast::{self, token::TokenKind, Respan},
    span::Pos,
};

impl Parser {
    /// A type, including any trailing `?` marks.
    pub(crate) fn parse_type(&mut self) -> TypeResult {
        let parser = &mut self.scope().deeper("type")?;
        let start = parser.start_pos();
        let mut ty = parser.parse_type_prefix()?;
        while expect_if!(parser, TokenKind::Question) {
            ty = ast::TypeExpr::new(ast::TypeKind::Optional(Box::new(ty)), parser.span_from(start));
        }
        Ok(ty)
    }

    /// A type without trailing `?`. Prefix constructors such as `*`, `&`
    /// and `chan` apply to another prefix type, so `*T?` is `(*T)?`.
    fn parse_type_prefix(&mut self) -> TypeResult {
        let start = self.start_pos();
        log::trace!("[parse_type_prefix] {}", self.current());
        match self.kind() {
            TokenKind::Ident => self.parse_named_type(),
            TokenKind::Underscore => {
                let tok = self.bump();
                Ok(ast::TypeExpr::new(ast::TypeKind::Infer, tok.span))
            }
            TokenKind::Asterisk => {
                self.bump();
                let inner = self.nested_type_prefix()?;
                Ok(self.mk_type(ast::TypeKind::Pointer(Box::new(inner)), start))
            }
            TokenKind::Ampersand => {
                self.bump();
                let mutable = expect_if!(self, TokenKind::Mut);
                let inner = self.nested_type_prefix()?;
                Ok(self.mk_type(
                    ast::TypeKind::Reference {
                        mutable,
                        inner: Box::new(inner),
                    },
                    start,
                ))
            }
            TokenKind::DoubleAmpersand => {
                self.bump();
                let mutable = expect_if!(self, TokenKind::Mut);
                let inner = self.nested_type_prefix()?;
                let inner = self.mk_type(
                    ast::TypeKind::Reference {
                        mutable,
                        inner: Box::new(inner),
                    },
                    start,
                );
                Ok(self.mk_type(
                    ast::TypeKind::Reference {
                        mutable: false,
                        inner: Box::new(inner),
                    },
                    start,
                ))
            }
            TokenKind::Chan => {
                self.bump();
                let inner = self.nested_type_prefix()?;
                Ok(self.mk_type(ast::TypeKind::Chan(Box::new(inner)), start))
            }
            TokenKind::Fn => self.parse_fn_type(),
            TokenKind::LeftParen => self.parse_paren_type(),
            TokenKind::LeftBracket => self.parse_bracket_type(),
            TokenKind::LeftCurly => self.parse_record_type(),
            TokenKind::Exists => self.parse_quantified_type(ast::Quantifier::Exists),
            TokenKind::Forall => self.parse_quantified_type(ast::Quantifier::Forall),
            _ => Err(self.expected("a type")),
        }
    }

    fn nested_type_prefix(&mut self) -> TypeResult {
        self.scope().deeper("type")?.parse_type_prefix()
    }

    fn mk_type(&self, kind: ast::TypeKind, start: Pos) -> ast::TypeExpr {
        ast::TypeExpr::new(kind, self.span_from(start))
    }

    /// `Name`, `Name[Args]` and projections `Name::Assoc`.
    pub(crate) fn parse_named_type(&mut self) -> TypeResult {
        let start = self.start_pos();
        let name = self.expect_id()?;
        let args = if peek!(self, TokenKind::LeftBracket) {
            let spec = SeqSpec::comma(TokenKind::RightBracket, "a type argument").non_empty();
            self.parse_delimited(TokenKind::LeftBracket, spec, |p| p.parse_type())?
                .items
        } else {
            vec![]
        };

        let mut ty = self.mk_type(ast::TypeKind::Named { name, args }, start);
        while expect_if!(self, TokenKind::DoubleColon) {
            let assoc = self.expect_id()?;
            ty = self.mk_type(
                ast::TypeKind::Projection {
                    base: Box::new(ty),
                    assoc,
                },
                start,
            );
        }
        Ok(ty)
    }

    /// `fn[T](A, B) -> R / E`
    fn parse_fn_type(&mut self) -> TypeResult {
        let start = self.start_pos();
        self.expect(TokenKind::Fn)?;
        let type_params = if peek!(self, TokenKind::LeftBracket) {
            self.parse_generic_params()?
        } else {
            vec![]
        };

        let spec = SeqSpec::comma(TokenKind::RightParen, "a parameter type");
        let params = self
            .parse_delimited(TokenKind::LeftParen, spec, |p| p.parse_type())?
            .items;

        let ret = if expect_if!(self, TokenKind::Arrow) {
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };

        let effects = self.parse_effects()?;
        Ok(self.mk_type(
            ast::TypeKind::Function {
                type_params,
                params,
                ret,
                effects,
            },
            start,
        ))
    }

    /// `()`, `(T)` or `(A, B)`.
    fn parse_paren_type(&mut self) -> TypeResult {
        let start = self.start_pos();
        let open = self.expect(TokenKind::LeftParen)?;
        if expect_if!(self, TokenKind::RightParen) {
            return Ok(self.mk_type(ast::TypeKind::Tuple(vec![]), start));
        }

        let mut first = self.parse_type()?;
        if expect_if!(self, TokenKind::Comma) {
            let spec = SeqSpec::comma(TokenKind::RightParen, "a tuple element type");
            let seq = self.parse_seq(&open, spec, |p| p.parse_type())?;
            let mut items = vec![first];
            items.extend(seq.items);
            return Ok(self.mk_type(ast::TypeKind::Tuple(items), start));
        }

        self.expect_matching(&open, TokenKind::RightParen)?;
        first.respan(self.span_from(start));
        Ok(first)
    }

    /// `[]T` is a slice, `[T; N]` a fixed-size array.
    fn parse_bracket_type(&mut self) -> TypeResult {
        let start = self.start_pos();
        let open = self.expect(TokenKind::LeftBracket)?;
        if expect_if!(self, TokenKind::RightBracket) {
            let elem = self.nested_type_prefix()?;
            return Ok(self.mk_type(ast::TypeKind::Slice(Box::new(elem)), start));
        }

        let elem = self.parse_type()?;
        if !expect_if!(self, TokenKind::Semi) {
            return Err(self.expected("`;` and a length in an array type"));
        }
        let len = self.parse_expr()?;
        self.expect_matching(&open, TokenKind::RightBracket)?;
        Ok(self.mk_type(
            ast::TypeKind::Array {
                elem: Box::new(elem),
                len: Box::new(len),
            },
            start,
        ))
    }

    /// `{x: int, y: T | R}`: a closed or open record row.
    fn parse_record_type(&mut self) -> TypeResult {
        let start = self.start_pos();
        let spec = SeqSpec::comma(TokenKind::RightCurly, "a record field").with_row_tail();
        let seq = self.parse_delimited(TokenKind::LeftCurly, spec, |p| {
            let name = p.expect_id()?;
            p.expect(TokenKind::Colon)?;
            let ty = p.parse_type()?;
            Ok(ast::TypeField { name, ty })
        })?;
        Ok(self.mk_type(
            ast::TypeKind::Record {
                fields: seq.items,
                rest: seq.rest,
            },
            start,
        ))
    }

    /// `exists[T: Show]. T` style quantifiers; parameters end at `.`.
    fn parse_quantified_type(&mut self, quantifier: ast::Quantifier) -> TypeResult {
        let start = self.start_pos();
        let keyword = self.bump();
        let spec = SeqSpec::comma(TokenKind::Dot, "a type variable")
            .non_empty()
            .no_trailing()
            .with_missing_separator(|found| {
                Some(format!(
                    "expected `,` or `.` between a quantifier's variables and its body, but found {}",
                    found
                ))
            });
        let params = self
            .parse_seq(&keyword, spec, |p| p.parse_generic_param())?
            .items;
        let body = self.parse_type()?;
        Ok(self.mk_type(
            ast::TypeKind::Quantified {
                quantifier,
                params,
                body: Box::new(body),
            },
            start,
        ))
    }

    /// An optional effect annotation: `/ IO` or `/ {IO, State | e}`.
    pub(crate) fn parse_effects(&mut self) -> ParseResult<Option<ast::EffectRow>> {
        if !peek!(self, TokenKind::Slash) {
            return Ok(None);
        }

        let start = self.start_pos();
        self.bump();
        if peek!(self, TokenKind::LeftCurly) {
            let spec = SeqSpec::comma(TokenKind::RightCurly, "an effect").with_row_tail();
            let seq = self.parse_delimited(TokenKind::LeftCurly, spec, |p| p.parse_named_type())?;
            return Ok(Some(ast::EffectRow {
                effects: seq.items,
                rest: seq.rest,
                span: self.span_from(start),
            }));
        }

        let effect = self.parse_named_type()?;
        Ok(Some(ast::EffectRow {
            effects: vec![effect],
            rest: None,
            span: self.span_from(start),
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::parse::{ParseOptions, Parser};

    fn ty(src: &str) -> String {
        let mut parser = Parser::new(src, ParseOptions::default());
        let ty = parser.parse_type().expect("type parses");
        assert!(parser.errors().is_empty(), "{:?}", parser.errors());
        assert!(parser.is_eof(), "input left over after {}", ty);
        ty.to_string()
    }

    #[test]
    fn pointer_binds_tighter_than_optional() {
        assert_eq!(ty("*int?"), "(optional (ptr int))");
        assert_eq!(ty("*(int?)"), "(ptr (optional int))");
        assert_eq!(ty("&mut T"), "(ref mut T)");
        assert_eq!(ty("chan int?"), "(optional (chan int))");
    }

    #[test]
    fn named_types_take_arguments_and_projections() {
        assert_eq!(ty("Map[string, Vec[int]]"), "Map[string, Vec[int]]");
        assert_eq!(ty("T::Item"), "T::Item");
    }

    #[test]
    fn function_types_carry_effects() {
        assert_eq!(ty("fn(int, bool) -> int"), "(fn (int, bool) -> int)");
        assert_eq!(ty("fn[T](T) -> T / {IO | e}"), "(fn[T] (T) -> T / {IO | e})");
        assert_eq!(ty("fn() / IO"), "(fn () / {IO})");
    }

    #[test]
    fn slices_arrays_and_tuples() {
        assert_eq!(ty("[]u8"), "(slice u8)");
        assert_eq!(ty("[int; 4]"), "(array int 4)");
        assert_eq!(ty("()"), "(tuple)");
        assert_eq!(ty("(int, bool)"), "(tuple int bool)");
        assert_eq!(ty("(int)"), "int");
    }

    #[test]
    fn records_may_be_open() {
        assert_eq!(ty("{x: int, y: int}"), "(record (x int) (y int))");
        assert_eq!(ty("{x: int | r}"), "(record (x int) | r)");
    }

    #[test]
    fn quantifier_params_end_at_dot() {
        assert_eq!(ty("exists T: Show. T"), "(exists [T: Show] T)");
        assert_eq!(ty("forall A, B. fn(A) -> B"), "(forall [A, B] (fn (A) -> B))");
    }

    #[test]
    fn grouping_widens_span() {
        let mut parser = Parser::new("(int)", ParseOptions::default());
        let ty = parser.parse_type().expect("type parses");
        assert_eq!(ty.span.start.offset, 0);
        assert_eq!(ty.span.end.offset, 5);
    }

    #[test]
    fn missing_dot_after_quantifier() {
        let mut parser = Parser::new("forall T U", ParseOptions::default());
        assert!(parser.parse_type().is_err());
        let msg = &parser.errors()[0].msg;
        assert!(msg.contains("between a quantifier's variables"), "{}", msg);
    }
}
