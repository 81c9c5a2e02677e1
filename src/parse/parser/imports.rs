use super::{collections::SeqSpec, ParseResult, Parser};

use crate::ast::{self, token::TokenKind};

impl Parser {
    /// `mod name;` or `mod name { items }`
    pub(crate) fn parse_mod_decl(&mut self) -> ParseResult<ast::ModDecl> {
        let vis = self.parse_visibility();
        self.expect(TokenKind::Mod)?;
        let name = self.expect_id()?;
        if expect_if!(self, TokenKind::Semi) {
            return Ok(ast::ModDecl {
                vis,
                name,
                body: None,
            });
        }

        let open = self.expect(TokenKind::LeftCurly)?;
        let parser = &mut self
            .scope()
            .with_description(format!("module `{}`", name))
            .deeper("module")?;
        let decls = parser.parse_items(Some(TokenKind::RightCurly));
        parser.expect_matching(&open, TokenKind::RightCurly)?;
        Ok(ast::ModDecl {
            vis,
            name,
            body: Some(decls),
        })
    }

    /// Parses a use declaration
    ///
    /// Examples:
    ///   use a::b;
    ///   use a::b as c;
    ///   use a::{b, c::*};
    ///   use {a, b};
    pub(crate) fn parse_use_decl(&mut self) -> ParseResult<ast::UseDecl> {
        let vis = self.parse_visibility();
        self.expect(TokenKind::Use)?;
        let parser = &mut self.scope().with_description("a use declaration");
        let tree = parser.parse_use_tree()?;
        parser.expect(TokenKind::Semi)?;
        Ok(ast::UseDecl { vis, tree })
    }

    fn parse_use_tree(&mut self) -> ParseResult<ast::UseTree> {
        let start = self.start_pos();
        let mut prefix = vec![];
        let kind = loop {
            match self.kind() {
                TokenKind::Asterisk => {
                    self.bump();
                    break ast::UseTreeKind::Glob;
                }
                TokenKind::LeftCurly => {
                    let spec = SeqSpec::comma(TokenKind::RightCurly, "an import");
                    let trees = self
                        .parse_delimited(TokenKind::LeftCurly, spec, |p| {
                            p.scope().deeper("import")?.parse_use_tree()
                        })?
                        .items;
                    break ast::UseTreeKind::Nested(trees);
                }
                TokenKind::Ident => {
                    prefix.push(self.expect_id()?);
                    if expect_if!(self, TokenKind::DoubleColon) {
                        continue;
                    }

                    let alias = if expect_if!(self, TokenKind::As) {
                        Some(self.expect_id()?)
                    } else {
                        None
                    };
                    break ast::UseTreeKind::Simple { alias };
                }
                _ if prefix.is_empty() => return Err(self.expected("a path to import")),
                _ => return Err(self.expected("a name, `*` or `{` after `::`")),
            }
        };

        Ok(ast::UseTree {
            prefix,
            kind,
            span: self.span_from(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::DeclKind,
        errors::DiagnosticCode,
        parse::{ParseOptions, Parser},
    };

    fn use_decl(src: &str) -> String {
        let mut parser = Parser::new(src, ParseOptions::default());
        let decl = parser.parse_decl().expect("use parses");
        assert!(parser.errors().is_empty(), "{:?}", parser.errors());
        assert!(matches!(decl.kind, DeclKind::Use(_)));
        decl.to_string()
    }

    #[test]
    fn simple_paths_and_aliases() {
        assert_eq!(use_decl("use a::b;"), "(use a::b)");
        assert_eq!(use_decl("pub use a::b as c;"), "(use pub a::b as c)");
    }

    #[test]
    fn globs_and_nested_trees() {
        assert_eq!(use_decl("use a::*;"), "(use a::*)");
        assert_eq!(use_decl("use a::{b, c::{d, e as f}, g::*};"), "(use a::{b, c::{d, e as f}, g::*})");
        assert_eq!(use_decl("use {a, b};"), "(use {a, b})");
    }

    #[test]
    fn dangling_path_separator() {
        let mut parser = Parser::new("use a::;", ParseOptions::default());
        assert!(parser.parse_decl().is_err());
        assert!(parser.errors()[0].msg.contains("after `::`"), "{}", parser.errors()[0].msg);
    }

    #[test]
    fn inline_modules_hold_items() {
        let mut parser = Parser::new("mod inner { fn f() {} struct S; }", ParseOptions::default());
        let decl = parser.parse_decl().expect("mod parses");
        assert!(parser.errors().is_empty(), "{:?}", parser.errors());
        match decl.kind {
            DeclKind::Mod(m) => assert_eq!(m.body.map(|b| b.len()), Some(2)),
            other => panic!("expected a module, found {:?}", other),
        }
    }

    #[test]
    fn nesting_of_modules_and_imports_is_limited() {
        let modules = format!("{}{}", "mod m { ".repeat(5000), "}".repeat(5000));
        let imports = format!("use {}a{};", "{".repeat(5000), "}".repeat(5000));
        for src in &[modules, imports] {
            let mut options = ParseOptions::default();
            options.max_depth = 16;
            let mut parser = Parser::new(src, options);
            let _ = parser.parse_decl();
            assert!(parser.errors().iter().any(|e| e.code == Some(DiagnosticCode::TooDeep)));
        }
    }

    #[test]
    fn module_declarations_without_body() {
        let mut parser = Parser::new("pub mod outer;", ParseOptions::default());
        let decl = parser.parse_decl().expect("mod parses");
        assert_eq!(decl.to_string(), "(mod pub outer;)");
    }
}
