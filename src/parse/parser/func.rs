use super::{collections::SeqSpec, ParseResult, Parser};

use crate::{
    ast::{
        self,
        token::{Token, TokenKind},
    },
    span::Pos,
};

fn const_param_separator(found: &Token) -> Option<String> {
    if found.kind == TokenKind::Const {
        Some(str!("missing comma before const generic parameter"))
    } else {
        None
    }
}

impl Parser {
    /// Everything of a function up to its body:
    /// `pub unsafe fn name[T](params) -> R / E where ...`
    pub(crate) fn parse_fn_header(&mut self) -> ParseResult<ast::FnHeader> {
        let start = self.start_pos();
        let vis = self.parse_visibility();
        let unsafety = expect_if!(self, TokenKind::Unsafe);
        self.expect(TokenKind::Fn)?;
        let name = self.expect_id()?;

        let parser = &mut self
            .scope()
            .with_description(format!("the signature of `{}`", name));
        let generics = if peek!(parser, TokenKind::LeftBracket) {
            parser.parse_generic_params()?
        } else {
            vec![]
        };

        let spec = SeqSpec::comma(TokenKind::RightParen, "a parameter");
        let params = parser
            .parse_delimited(TokenKind::LeftParen, spec, |p| p.parse_param())?
            .items;

        let ret = if expect_if!(parser, TokenKind::Arrow) {
            Some(parser.parse_type()?)
        } else {
            None
        };
        let effects = parser.parse_effects()?;
        let where_clause = parser.parse_where_clause()?;

        Ok(ast::FnHeader {
            vis,
            unsafety,
            name,
            generics,
            params,
            ret,
            effects,
            where_clause,
            span: parser.span_from(start),
        })
    }

    pub(crate) fn parse_visibility(&mut self) -> ast::Visibility {
        if expect_if!(self, TokenKind::Pub) {
            ast::Visibility::Public
        } else {
            ast::Visibility::Private
        }
    }

    fn at_self(&mut self, n: usize) -> bool {
        self.kind_at(n) == TokenKind::Ident && self.window.peek_at(n).text == "self"
    }

    /// `self`, `mut self`, `&self`, `&mut self` or `mut? name: T`.
    fn parse_param(&mut self) -> ParseResult<ast::Param> {
        let start = self.start_pos();
        let kind = match self.kind() {
            TokenKind::Ampersand => {
                self.bump();
                let mutable = expect_if!(self, TokenKind::Mut);
                if !self.at_self(0) {
                    return Err(self.expected("`self` after `&` in a parameter list"));
                }
                self.bump();
                ast::ParamKind::SelfRef { mutable }
            }
            TokenKind::Mut if self.at_self(1) => {
                self.bump();
                self.bump();
                ast::ParamKind::SelfValue { mutable: true }
            }
            TokenKind::Ident if self.at_self(0) => {
                self.bump();
                ast::ParamKind::SelfValue { mutable: false }
            }
            TokenKind::Mut | TokenKind::Ident => {
                let mutable = expect_if!(self, TokenKind::Mut);
                let name = self.expect_id()?;
                if !expect_if!(self, TokenKind::Colon) {
                    return Err(self.expected("`:` and a type after the parameter name"));
                }
                let ty = self.parse_type()?;
                ast::ParamKind::Named { mutable, name, ty }
            }
            _ => return Err(self.expected("a parameter")),
        };

        Ok(ast::Param {
            kind,
            span: self.span_from(start),
        })
    }

    /// `[T: A + B, const N: usize, F[_]: Functor]`
    pub(crate) fn parse_generic_params(&mut self) -> ParseResult<Vec<ast::GenericParam>> {
        let spec = SeqSpec::comma(TokenKind::RightBracket, "a generic parameter")
            .non_empty()
            .with_missing_separator(const_param_separator);
        let seq = self.parse_delimited(TokenKind::LeftBracket, spec, |p| p.parse_generic_param())?;
        Ok(seq.items)
    }

    pub(crate) fn parse_generic_param(&mut self) -> ParseResult<ast::GenericParam> {
        let start = self.start_pos();
        if expect_if!(self, TokenKind::Const) {
            let name = self.expect_id()?;
            self.expect(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            return Ok(self.mk_generic_param(ast::GenericParamKind::Const { name, ty }, start));
        }

        let name = self.expect_id()?;
        let kind = match self.constructor_arity() {
            Some(arity) => {
                // `[` then `_` and `, _` for each further hole, then `]`
                for _ in 0..(arity * 2 + 1) {
                    self.bump();
                }
                let bounds = self.parse_opt_bounds()?;
                ast::GenericParamKind::Constructor {
                    name,
                    arity,
                    bounds,
                }
            }
            None => {
                let bounds = self.parse_opt_bounds()?;
                ast::GenericParamKind::Type { name, bounds }
            }
        };
        Ok(self.mk_generic_param(kind, start))
    }

    fn mk_generic_param(&self, kind: ast::GenericParamKind, start: Pos) -> ast::GenericParam {
        ast::GenericParam {
            kind,
            span: self.span_from(start),
        }
    }

    /// Looks for `[_, _, ...]` right after a generic parameter's name, which
    /// marks a type constructor. Returns the number of holes.
    fn constructor_arity(&mut self) -> Option<usize> {
        if self.kind() != TokenKind::LeftBracket {
            return None;
        }

        let mut n = 1;
        let mut arity = 0;
        loop {
            if self.kind_at(n) != TokenKind::Underscore {
                return None;
            }
            arity += 1;
            n += 1;
            match self.kind_at(n) {
                TokenKind::Comma => n += 1,
                TokenKind::RightBracket => return Some(arity),
                _ => return None,
            }
        }
    }

    fn parse_opt_bounds(&mut self) -> ParseResult<Vec<ast::TypeExpr>> {
        if expect_if!(self, TokenKind::Colon) {
            self.parse_bounds()
        } else {
            Ok(vec![])
        }
    }

    /// `A + B + C`
    pub(crate) fn parse_bounds(&mut self) -> ParseResult<Vec<ast::TypeExpr>> {
        let mut bounds = vec![self.parse_type()?];
        while expect_if!(self, TokenKind::Plus) {
            bounds.push(self.parse_type()?);
        }
        Ok(bounds)
    }

    /// `where T: A + B, U: C`. The clause has no closing delimiter; it ends
    /// at the first token that cannot continue it.
    pub(crate) fn parse_where_clause(&mut self) -> ParseResult<Vec<ast::WherePredicate>> {
        if !expect_if!(self, TokenKind::Where) {
            return Ok(vec![]);
        }

        let mut preds = vec![];
        loop {
            let start = self.start_pos();
            let ty = self.parse_type()?;
            if !expect_if!(self, TokenKind::Colon) {
                return Err(self.expected("`:` and bounds in a where clause"));
            }
            let bounds = self.parse_bounds()?;
            preds.push(ast::WherePredicate {
                ty,
                bounds,
                span: self.span_from(start),
            });

            if !peek!(self, TokenKind::Comma) {
                break;
            }
            self.bump();
            if peek!(self, TokenKind::LeftCurly | TokenKind::Semi | TokenKind::EOF) {
                break;
            }
        }
        Ok(preds)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{GenericParamKind, ParamKind},
        parse::{ParseOptions, Parser},
    };

    fn parser(src: &str) -> Parser {
        Parser::new(src, ParseOptions::default())
    }

    #[test]
    fn header_with_everything() {
        let mut p = parser("pub unsafe fn map[T, U](xs: List[T], f: fn(T) -> U) -> List[U] / IO where T: Show");
        let header = p.parse_fn_header().expect("header parses");
        assert!(p.errors().is_empty(), "{:?}", p.errors());
        assert!(header.vis.is_public());
        assert!(header.unsafety);
        assert_eq!(header.name.name, "map");
        assert_eq!(header.generics.len(), 2);
        assert_eq!(header.params.len(), 2);
        assert_eq!(header.ret.map(|t| t.to_string()).as_deref(), Some("List[U]"));
        assert!(header.effects.is_some());
        assert_eq!(header.where_clause.len(), 1);
    }

    #[test]
    fn self_parameters() {
        let mut p = parser("fn m(&mut self, mut other: int)");
        let header = p.parse_fn_header().expect("header parses");
        assert_eq!(header.params[0].kind, ParamKind::SelfRef { mutable: true });
        assert!(matches!(
            header.params[1].kind,
            ParamKind::Named { mutable: true, .. }
        ));
    }

    #[test]
    fn generic_param_kinds() {
        let mut p = parser("[T: Eq + Hash, const N: usize, F[_, _]: Bifunctor]");
        let params = p.parse_generic_params().expect("generics parse");
        assert!(p.errors().is_empty(), "{:?}", p.errors());
        assert_eq!(params.len(), 3);
        assert!(matches!(&params[0].kind, GenericParamKind::Type { bounds, .. } if bounds.len() == 2));
        assert!(matches!(&params[1].kind, GenericParamKind::Const { .. }));
        assert!(matches!(
            &params[2].kind,
            GenericParamKind::Constructor { arity: 2, .. }
        ));
        assert_eq!(params[2].to_string(), "F[_, _]: Bifunctor");
    }

    #[test]
    fn missing_comma_before_const() {
        let mut p = parser("[T const N: usize]");
        assert!(p.parse_generic_params().is_err());
        assert_eq!(p.errors()[0].msg, "missing comma before const generic parameter");
    }

    #[test]
    fn empty_generics_are_rejected() {
        let mut p = parser("[]");
        assert!(p.parse_generic_params().is_err());
    }
}
