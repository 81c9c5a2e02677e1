use super::{collections::SeqSpec, DeclResult, ParseResult, Parser, Recover, RecoveryCtx};

use crate::{
    ast::{self, token::TokenKind},
    errors::{Diagnostic, DiagnosticCode},
};

impl Parser {
    /// Parses declarations until end of input or `stop`. A declaration that
    /// fails is skipped and parsing resumes with the next one.
    pub(crate) fn parse_items(&mut self, stop: Option<TokenKind>) -> Vec<ast::Decl> {
        let mut decls = vec![];
        loop {
            if self.is_eof() || stop.map_or(false, |s| self.at(s)) {
                break;
            }

            let before = self.consumed();
            let decl = self
                .parse_decl()
                .map(Some)
                .recover_with(self, RecoveryCtx::decl(stop), |_| None);

            match decl {
                Some(decl) => {
                    log::debug!("[parse_items] parsed {}", decl.span);
                    decls.push(decl)
                }
                None => {
                    if self.consumed() == before
                        && !self.is_eof()
                        && stop.map_or(true, |s| !self.at(s))
                    {
                        log::debug!("[parse_items] skipping {}", self.current());
                        self.bump();
                    }
                }
            }
        }
        decls
    }

    /// One declaration, with its doc comment and modifiers.
    pub(crate) fn parse_decl(&mut self) -> DeclResult {
        let start = self.start_pos();
        let doc = self.current().doc.clone();

        // look past `pub` and `unsafe` to find out what is being declared
        let mut n = 0;
        if self.kind_at(n) == TokenKind::Pub {
            n += 1;
        }
        let unsafety = self.kind_at(n) == TokenKind::Unsafe;
        if unsafety {
            n += 1;
        }

        let keyword = self.kind_at(n);
        if unsafety && keyword != TokenKind::Fn {
            let span = self.window.peek_at(n).span;
            let msg = format!("expected `fn` after `unsafe`, but found {}", keyword.desc());
            let diag = Diagnostic::error(msg, span)
                .with_code(DiagnosticCode::ExpectedToken)
                .with_help("only functions can be marked `unsafe`");
            return Err(self.error(diag));
        }

        let kind = match keyword {
            TokenKind::Fn => ast::DeclKind::Fn(self.parse_fn_decl(true)?),
            TokenKind::Struct => ast::DeclKind::Struct(self.parse_struct_decl()?),
            TokenKind::Enum => ast::DeclKind::Enum(self.parse_enum_decl()?),
            TokenKind::Trait => ast::DeclKind::Trait(self.parse_trait_decl()?),
            TokenKind::Impl => ast::DeclKind::Impl(self.parse_impl_decl()?),
            TokenKind::Type => ast::DeclKind::TypeAlias(self.parse_type_alias_decl()?),
            TokenKind::Const => ast::DeclKind::Const(self.parse_const_decl()?),
            TokenKind::Mod => ast::DeclKind::Mod(self.parse_mod_decl()?),
            TokenKind::Use => ast::DeclKind::Use(self.parse_use_decl()?),
            TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightCurly if n == 0 => {
                return Err(self.unexpected())
            }
            _ => {
                let tok = self.window.peek_at(n).clone();
                let msg = format!("expected a declaration, but found {}", tok);
                let diag = Diagnostic::error(msg, tok.span).with_code(DiagnosticCode::ExpectedToken);
                return Err(self.error(diag));
            }
        };

        let mut decl = ast::Decl::new(kind, self.span_from(start));
        decl.doc = doc;
        Ok(decl)
    }

    /// A function. Bodies are optional only where a signature alone is
    /// meaningful, such as trait methods.
    fn parse_fn_decl(&mut self, require_body: bool) -> ParseResult<ast::FnDecl> {
        let header = self.parse_fn_header()?;
        let parser = &mut self
            .scope()
            .with_description(format!("the body of `{}`", header.name));
        let body = if !require_body && expect_if!(parser, TokenKind::Semi) {
            None
        } else {
            Some(parser.parse_block(true)?)
        };
        Ok(ast::FnDecl { header, body })
    }

    fn parse_opt_generics(&mut self) -> ParseResult<Vec<ast::GenericParam>> {
        if peek!(self, TokenKind::LeftBracket) {
            self.parse_generic_params()
        } else {
            Ok(vec![])
        }
    }

    fn parse_struct_decl(&mut self) -> ParseResult<ast::StructDecl> {
        let vis = self.parse_visibility();
        self.expect(TokenKind::Struct)?;
        let name = self.expect_id()?;
        let parser = &mut self.scope().with_description(format!("struct `{}`", name));
        let generics = parser.parse_opt_generics()?;

        let (where_clause, body) = match parser.kind() {
            TokenKind::LeftParen => {
                let spec = SeqSpec::comma(TokenKind::RightParen, "a field type");
                let fields = parser
                    .parse_delimited(TokenKind::LeftParen, spec, |p| {
                        // visibility on a tuple field is accepted and dropped
                        p.parse_visibility();
                        p.parse_type()
                    })?
                    .items;
                let where_clause = parser.parse_where_clause()?;
                parser.expect(TokenKind::Semi)?;
                (where_clause, ast::StructBody::Tuple(fields))
            }
            TokenKind::Semi => {
                parser.bump();
                (vec![], ast::StructBody::Unit)
            }
            _ => {
                let where_clause = parser.parse_where_clause()?;
                if expect_if!(parser, TokenKind::Semi) {
                    (where_clause, ast::StructBody::Unit)
                } else {
                    let fields = parser.parse_field_decls()?;
                    (where_clause, ast::StructBody::Named(fields))
                }
            }
        };

        Ok(ast::StructDecl {
            vis,
            name,
            generics,
            where_clause,
            body,
        })
    }

    /// `{ pub name: T, ... }`
    fn parse_field_decls(&mut self) -> ParseResult<Vec<ast::FieldDecl>> {
        let spec = SeqSpec::comma(TokenKind::RightCurly, "a field");
        let seq = self.parse_delimited(TokenKind::LeftCurly, spec, |p| {
            let start = p.start_pos();
            let vis = p.parse_visibility();
            let name = p.expect_id()?;
            p.expect(TokenKind::Colon)?;
            let ty = p.parse_type()?;
            Ok(ast::FieldDecl {
                vis,
                name,
                ty,
                span: p.span_from(start),
            })
        })?;
        Ok(seq.items)
    }

    fn parse_enum_decl(&mut self) -> ParseResult<ast::EnumDecl> {
        let vis = self.parse_visibility();
        self.expect(TokenKind::Enum)?;
        let name = self.expect_id()?;
        let parser = &mut self.scope().with_description(format!("enum `{}`", name));
        let generics = parser.parse_opt_generics()?;
        let where_clause = parser.parse_where_clause()?;

        let spec = SeqSpec::comma(TokenKind::RightCurly, "a variant");
        let variants = parser
            .parse_delimited(TokenKind::LeftCurly, spec, |p| p.parse_variant())?
            .items;

        Ok(ast::EnumDecl {
            vis,
            name,
            generics,
            where_clause,
            variants,
        })
    }

    /// `Name`, `Name(A, B)`, `Name { x: A }`, each optionally `= value`.
    fn parse_variant(&mut self) -> ParseResult<ast::Variant> {
        let start = self.start_pos();
        let name = self.expect_id()?;
        let payload = match self.kind() {
            TokenKind::LeftParen => {
                let spec = SeqSpec::comma(TokenKind::RightParen, "a field type");
                let types = self
                    .parse_delimited(TokenKind::LeftParen, spec, |p| p.parse_type())?
                    .items;
                ast::VariantPayload::Tuple(types)
            }
            TokenKind::LeftCurly => ast::VariantPayload::Named(self.parse_field_decls()?),
            _ => ast::VariantPayload::Unit,
        };
        let discriminant = if expect_if!(self, TokenKind::Equals) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(ast::Variant {
            name,
            payload,
            discriminant,
            span: self.span_from(start),
        })
    }

    fn parse_trait_decl(&mut self) -> ParseResult<ast::TraitDecl> {
        let vis = self.parse_visibility();
        self.expect(TokenKind::Trait)?;
        let name = self.expect_id()?;
        let parser = &mut self.scope().with_description(format!("trait `{}`", name));
        let generics = parser.parse_opt_generics()?;
        let supertraits = if expect_if!(parser, TokenKind::Colon) {
            parser.parse_bounds()?
        } else {
            vec![]
        };
        let where_clause = parser.parse_where_clause()?;

        let open = parser.expect(TokenKind::LeftCurly)?;
        let items = parser.parse_body_items(|p| p.parse_trait_item());
        parser.expect_matching(&open, TokenKind::RightCurly)?;

        Ok(ast::TraitDecl {
            vis,
            name,
            generics,
            supertraits,
            where_clause,
            items,
        })
    }

    fn parse_trait_item(&mut self) -> ParseResult<ast::TraitItem> {
        if peek!(self, TokenKind::Type) {
            let start = self.start_pos();
            self.bump();
            let name = self.expect_id()?;
            let bounds = if expect_if!(self, TokenKind::Colon) {
                self.parse_bounds()?
            } else {
                vec![]
            };
            let default = if expect_if!(self, TokenKind::Equals) {
                Some(self.parse_type()?)
            } else {
                None
            };
            self.expect(TokenKind::Semi)?;
            return Ok(ast::TraitItem::AssocType {
                name,
                bounds,
                default,
                span: self.span_from(start),
            });
        }

        Ok(ast::TraitItem::Method(self.parse_fn_decl(false)?))
    }

    /// `impl[T] Trait[T] for Target[T] where ... { ... }` or an inherent
    /// `impl Target { ... }`.
    fn parse_impl_decl(&mut self) -> ParseResult<ast::ImplDecl> {
        let vis = self.parse_visibility();
        self.expect(TokenKind::Impl)?;
        let parser = &mut self.scope().with_description("an impl block");
        let generics = parser.parse_opt_generics()?;
        let first = parser.parse_type()?;
        let (trait_ref, target) = if expect_if!(parser, TokenKind::For) {
            (Some(first), parser.parse_type()?)
        } else {
            (None, first)
        };
        let where_clause = parser.parse_where_clause()?;

        let open = parser.expect(TokenKind::LeftCurly)?;
        let items = parser.parse_body_items(|p| p.parse_impl_item());
        parser.expect_matching(&open, TokenKind::RightCurly)?;

        Ok(ast::ImplDecl {
            vis,
            generics,
            trait_ref,
            target,
            where_clause,
            items,
        })
    }

    fn parse_impl_item(&mut self) -> ParseResult<ast::ImplItem> {
        if peek!(self, TokenKind::Type) {
            let start = self.start_pos();
            self.bump();
            let name = self.expect_id()?;
            self.expect(TokenKind::Equals)?;
            let ty = self.parse_type()?;
            self.expect(TokenKind::Semi)?;
            return Ok(ast::ImplItem::TypeAssign {
                name,
                ty,
                span: self.span_from(start),
            });
        }

        Ok(ast::ImplItem::Method(self.parse_fn_decl(true)?))
    }

    /// The items of a trait or impl body, up to but not including `}`.
    fn parse_body_items<T>(&mut self, mut f: impl FnMut(&mut Parser) -> ParseResult<T>) -> Vec<T> {
        let mut items = vec![];
        loop {
            if peek!(self, TokenKind::RightCurly | TokenKind::EOF) {
                break;
            }

            let before = self.consumed();
            let stop = Some(TokenKind::RightCurly);
            let item = f(self).map(Some).recover_with(self, RecoveryCtx::decl(stop), |_| None);
            match item {
                Some(item) => items.push(item),
                None => {
                    if self.consumed() == before
                        && !peek!(self, TokenKind::RightCurly | TokenKind::EOF)
                    {
                        self.bump();
                    }
                }
            }
        }
        items
    }

    fn parse_type_alias_decl(&mut self) -> ParseResult<ast::TypeAliasDecl> {
        let vis = self.parse_visibility();
        self.expect(TokenKind::Type)?;
        let name = self.expect_id()?;
        let generics = self.parse_opt_generics()?;
        self.expect(TokenKind::Equals)?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Semi)?;
        Ok(ast::TypeAliasDecl {
            vis,
            name,
            generics,
            ty,
        })
    }

    fn parse_const_decl(&mut self) -> ParseResult<ast::ConstDecl> {
        let vis = self.parse_visibility();
        self.expect(TokenKind::Const)?;
        let name = self.expect_id()?;
        let ty = if expect_if!(self, TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(TokenKind::Equals)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semi)?;
        Ok(ast::ConstDecl {
            vis,
            name,
            ty,
            value,
        })
    }
}
