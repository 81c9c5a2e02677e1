use crate::{
    ast::{DeclKind, ExprKind, File, SpawnTarget, StmtKind},
    errors::{Diagnostic, DiagnosticCode, Severity},
    parse::{ParseOptions, Parser, DEFAULT_MAX_DEPTH},
    span::FileId,
};

#[allow(dead_code)]
fn enable_debug_logs() {
    let _ = fern::Dispatch::new()
        .level(log::LevelFilter::Debug)
        .chain(std::io::stderr())
        .apply();
}

fn expr(src: &str) -> String {
    let mut parser = Parser::new(src, ParseOptions::default());
    let expr = parser.parse_expr().expect("expression parses");
    assert!(parser.errors().is_empty(), "{:?}", parser.errors());
    assert!(parser.is_eof(), "input left over after {}", expr);
    expr.to_string()
}

fn parse(src: &str) -> (Option<File>, Vec<Diagnostic>) {
    let result = Parser::parse_source(src, ParseOptions::default());
    (result.value, result.errors)
}

fn parse_ok(src: &str) -> File {
    let (file, errors) = parse(src);
    assert!(errors.is_empty(), "{:?}", errors);
    file.expect("file parses")
}

fn has_code(errors: &[Diagnostic], code: DiagnosticCode) -> bool {
    errors.iter().any(|e| e.code == Some(code))
}

/// The body of the first function in `file`.
fn first_body(file: &File) -> &crate::ast::Block {
    match &file.decls[0].kind {
        DeclKind::Fn(f) => f.body.as_ref().expect("function has a body"),
        other => panic!("expected a function, found {:?}", other),
    }
}

#[test]
fn operator_precedence() {
    assert_eq!(expr("1 + 2 * 3"), "(binop 1 + (binop 2 * 3))");
    assert_eq!(expr("1 - 2 - 3"), "(binop (binop 1 - 2) - 3)");
    assert_eq!(expr("a || b && c"), "(binop a || (binop b && c))");
    assert_eq!(expr("a == b | c"), "(binop a == (binop b | c))");
    assert_eq!(expr("x as int + 1"), "(binop (cast x as int) + 1)");
    assert_eq!(expr("-a.b()"), "(unaryop - (call a.b))");
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(expr("a = b = c"), "(assign a = (assign b = c))");
    assert_eq!(expr("a += 1 + 2"), "(assign a += (binop 1 + 2))");
}

#[test]
fn channel_operators() {
    assert_eq!(expr("ch <- x + 1"), "(send ch (binop x + 1))");
    assert_eq!(expr("<-ch"), "(recv ch)");
}

#[test]
fn postfix_chains() {
    assert_eq!(expr("f(a, b)[0].c"), "(index (call f a b) 0).c");
    assert_eq!(expr("a::b(1)?"), "(try (call a::b 1))");
}

#[test]
fn struct_literals_are_restricted_in_conditions() {
    assert_eq!(expr("S {}"), "(struct S)");
    assert_eq!(expr("S { x: 1 }"), "(struct S (x 1))");

    let mut parser = Parser::new("if s {} else {}", ParseOptions::default());
    let e = parser.parse_expr().expect("if parses");
    assert!(parser.errors().is_empty(), "{:?}", parser.errors());
    match e.kind {
        ExprKind::If { cond, .. } => assert!(matches!(cond.kind, ExprKind::Name(_))),
        other => panic!("expected an if, found {:?}", other),
    }
}

#[test]
fn curly_expressions() {
    assert_eq!(expr(r#"{ "a": 1, "b": 2 }"#), r#"(map ("a" 1) ("b" 2))"#);
    assert_eq!(expr("{ x: 1, y }"), "(record (x 1) (y y))");
    assert_eq!(expr("{}"), "(block)");
    assert_eq!(expr("{ k => v }"), "(map (k v))");
    assert_eq!(expr("{ k => v, j => w }"), "(map (k v) (j w))");
}

#[test]
fn delimited_list_policy() {
    assert_eq!(expr("f()"), "(call f)");
    assert_eq!(expr("f(a, b, c)"), "(call f a b c)");
    assert_eq!(expr("f(a, b, c,)"), "(call f a b c)");

    let mut parser = Parser::new("f(a b)", ParseOptions::default());
    assert!(parser.parse_expr().is_err());
    assert_eq!(parser.errors()[0].code, Some(DiagnosticCode::MissingSeparator));
}

#[test]
fn impl_blocks_accept_visibility() {
    let file = parse_ok("pub impl S { fn f() {} }\nimpl T {}");
    assert_eq!(file.decls.len(), 2);
    match &file.decls[0].kind {
        DeclKind::Impl(i) => assert!(i.vis.is_public()),
        other => panic!("expected impl, found {:?}", other),
    }
    assert_eq!(file.decls[1].to_string(), "(impl T)");
}

#[test]
fn tail_expressions() {
    let file = parse_ok("fn f() -> int { let x = 1; x }");
    let body = first_body(&file);
    assert_eq!(body.stmts.len(), 1);
    assert_eq!(body.tail.as_ref().map(|t| t.to_string()).as_deref(), Some("x"));

    let file = parse_ok("fn f() { if c { a } else { b } }");
    let body = first_body(&file);
    assert!(body.stmts.is_empty());
    match body.tail.as_ref().map(|t| &t.kind) {
        Some(ExprKind::If { then, .. }) => assert!(then.tail.is_some()),
        other => panic!("expected an if tail, found {:?}", other),
    }
}

#[test]
fn tails_stay_with_their_own_block() {
    let file = parse_ok("fn f() { let y = { let x = 10; { x + 1 } }; }");
    let body = first_body(&file);
    assert_eq!(body.stmts.len(), 1);
    assert!(body.tail.is_none());

    let init = match &body.stmts[0].kind {
        StmtKind::Let { init: Some(init), .. } => init,
        other => panic!("expected a let with a value, found {:?}", other),
    };
    let outer = match &init.kind {
        ExprKind::Block(block) => block,
        other => panic!("expected a block, found {:?}", other),
    };
    assert_eq!(outer.stmts.len(), 1);
    match outer.tail.as_ref().map(|t| &t.kind) {
        Some(ExprKind::Block(inner)) => {
            assert!(inner.stmts.is_empty());
            assert_eq!(
                inner.tail.as_ref().map(|t| t.to_string()).as_deref(),
                Some("(binop x + 1)")
            );
        }
        other => panic!("expected a block tail, found {:?}", other),
    }
}

#[test]
fn loop_bodies_have_no_tail() {
    let file = parse_ok("fn f() { while c { x } for i in xs { y } }");
    let body = first_body(&file);
    assert_eq!(body.stmts.len(), 2);
    assert!(body.tail.is_none());
    match &body.stmts[0].kind {
        StmtKind::While { body, .. } => {
            assert!(body.tail.is_none());
            assert!(matches!(body.stmts[0].kind, StmtKind::Expr { semi: false, .. }));
        }
        other => panic!("expected a while loop, found {:?}", other),
    }
}

#[test]
fn block_like_statement_ends_at_its_block() {
    let file = parse_ok("fn f() { if c { a } - 1 }");
    let body = first_body(&file);
    assert_eq!(body.stmts.len(), 1);
    assert_eq!(
        body.tail.as_ref().map(|t| t.to_string()).as_deref(),
        Some("(unaryop - 1)")
    );
}

#[test]
fn missing_semicolon_keeps_statement() {
    let (file, errors) = parse("fn f() { a() b() }");
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].msg.starts_with("expected `;` after expression"));
    let file = file.expect("file parses");
    let body = first_body(&file);
    assert_eq!(body.stmts.len(), 1);
    assert!(body.tail.is_some());
}

#[test]
fn recovers_at_next_declaration() {
    let (file, errors) = parse("fn broken(\nfn ok() {}");
    assert!(!errors.is_empty());
    let file = file.expect("the second function survives");
    assert_eq!(file.decls.len(), 1);
    assert_eq!(file.decls[0].name().map(|n| n.name.as_str()), Some("ok"));
}

#[test]
fn recovers_inside_blocks() {
    let (file, errors) = parse("fn f() { let = 1; g(); }");
    assert_eq!(errors.len(), 1, "{:?}", errors);
    let file = file.expect("file parses");
    assert_eq!(first_body(&file).stmts.len(), 1);
}

#[test]
fn nothing_to_parse() {
    let (file, errors) = parse("");
    assert!(file.is_none());
    assert!(errors.is_empty());

    let (file, errors) = parse("} } }");
    assert!(file.is_none());
    assert!(!errors.is_empty());
}

#[test]
fn spawn_forms() {
    let file = parse_ok("fn f() { spawn g(1); spawn { work(); } spawn |x| { run(x); }(1); }");
    let body = first_body(&file);
    let targets = body
        .stmts
        .iter()
        .map(|s| match &s.kind {
            StmtKind::Spawn(target) => target,
            other => panic!("expected spawn, found {:?}", other),
        })
        .collect::<Vec<_>>();
    assert!(matches!(targets[0], SpawnTarget::Call(_)));
    assert!(matches!(targets[1], SpawnTarget::Block(_)));
    assert!(matches!(targets[2], SpawnTarget::Closure { args, .. } if args.len() == 1));
}

#[test]
fn spawn_needs_something_to_run() {
    let (_, errors) = parse("fn f() { spawn x; }");
    assert!(has_code(&errors, DiagnosticCode::InvalidSpawn), "{:?}", errors);

    let (_, errors) = parse("fn f() { spawn |x| { run(x); }; }");
    assert!(has_code(&errors, DiagnosticCode::InvalidSpawn), "{:?}", errors);
}

#[test]
fn select_cases() {
    let file = parse_ok("fn f() { select { let v = <-ch => { v; }, out <- 1 => {} } }");
    match &first_body(&file).stmts[0].kind {
        StmtKind::Select(cases) => assert_eq!(cases.len(), 2),
        other => panic!("expected select, found {:?}", other),
    }
}

#[test]
fn empty_select_is_a_warning() {
    let (file, errors) = parse("fn f() { select {} }");
    assert!(file.is_some());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].severity, Severity::Warning);
    assert_eq!(errors[0].code, Some(DiagnosticCode::EmptySelect));
}

#[test]
fn match_arms() {
    let file = parse_ok("fn f() { match x { 1 | 2 => a, (3 | 4) if y => { b } _ => c } }");
    match first_body(&file).tail.as_ref().map(|t| &t.kind) {
        Some(ExprKind::Match { arms, .. }) => {
            assert_eq!(arms.len(), 3);
            assert!(arms[1].guard.is_some());
        }
        other => panic!("expected match, found {:?}", other),
    }
}

#[test]
fn guard_after_bare_alternation_is_ambiguous() {
    let (_, errors) = parse("fn f() { match x { 1 | 2 if y => a, _ => b } }");
    let diag = errors
        .iter()
        .find(|e| e.code == Some(DiagnosticCode::AmbiguousGuard))
        .expect("ambiguous guard reported");
    assert_eq!(diag.help.as_deref(), Some("wrap the alternatives in parentheses: `(1 | 2) if ...`"));
}

#[test]
fn arms_need_commas() {
    let (_, errors) = parse("fn f() { match x { 1 => a 2 => b } }");
    assert!(has_code(&errors, DiagnosticCode::MissingSeparator), "{:?}", errors);
}

#[test]
fn trailing_separator_where_forbidden() {
    let mut parser = Parser::new("forall A,. A", ParseOptions::default());
    let ty = parser.parse_type().expect("type still parses");
    assert_eq!(ty.to_string(), "(forall [A] A)");
    assert_eq!(parser.errors().len(), 1);
    assert!(parser.errors()[0].msg.contains("trailing"));
}

#[test]
fn missing_separator_in_arguments() {
    let (_, errors) = parse("fn f() { g(1, 2; }");
    assert_eq!(errors[0].code, Some(DiagnosticCode::MissingSeparator));
    assert_eq!(errors[0].msg, "expected `,` or `)`, but found `;`");
}

#[test]
fn unclosed_delimiter_points_at_opener() {
    let mut parser = Parser::new("[1, 2", ParseOptions::default());
    assert!(parser.parse_expr().is_err());
    let diag = &parser.errors()[0];
    assert_eq!(diag.code, Some(DiagnosticCode::UnclosedDelimiter));
    assert_eq!(diag.labels[0].span.start.offset, 0);
}

#[test]
fn nesting_limit() {
    let options = ParseOptions {
        max_depth: 8,
        ..ParseOptions::default()
    };
    let result = Parser::parse_source("fn f() { ((((((((((1)))))))))); }\nfn g() {}", options);
    assert!(has_code(&result.errors, DiagnosticCode::TooDeep));
    let diag = result
        .errors
        .iter()
        .find(|e| e.code == Some(DiagnosticCode::TooDeep))
        .expect("too deep");
    assert!(diag.notes.iter().any(|n| n == "the nesting limit is 8"), "{:?}", diag.notes);
    assert_eq!(result.value.map(|f| f.decls.len()), Some(2));
}

#[test]
fn default_nesting_limit_reports_instead_of_overflowing() {
    let depth = DEFAULT_MAX_DEPTH + 10;
    let src = format!("fn f() {{ {}1{}; }}", "(".repeat(depth), ")".repeat(depth));
    let result = Parser::parse_source(&src, ParseOptions::default());
    assert!(has_code(&result.errors, DiagnosticCode::TooDeep), "{:?}", result.errors);
    assert_eq!(result.value.map(|f| f.decls.len()), Some(1));
}

#[test]
fn nesting_within_the_default_limit() {
    let depth = DEFAULT_MAX_DEPTH - 8;
    let src = format!("fn f() {{ {}1{}; }}", "(".repeat(depth), ")".repeat(depth));
    let (_, errors) = parse(&src);
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn long_else_if_chains_do_not_nest() {
    let arms = "else if x { 1 } ".repeat(1000);
    let src = format!("fn f() {{ if x {{ 0 }} {}else {{ 2 }} }}", arms);
    let (file, errors) = parse(&src);
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(file.map(|f| f.decls.len()), Some(1));

    let mut parser = Parser::new("if a { 1 } else if b { 2 } else { 3 }", ParseOptions::default());
    let e = parser.parse_expr().expect("if parses");
    let inner = match e.kind {
        ExprKind::If {
            otherwise: Some(inner),
            ..
        } => inner,
        other => panic!("expected an if, found {:?}", other),
    };
    assert_eq!(inner.span.end, e.span.end);
    assert!(matches!(
        inner.kind,
        ExprKind::If { otherwise: Some(ref last), .. } if matches!(last.kind, ExprKind::Block(_))
    ));
}

#[test]
fn illegal_tokens_are_reported_and_skipped() {
    let (file, errors) = parse("fn f() {} $ fn g() {}");
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert_eq!(errors[0].code, Some(DiagnosticCode::IllegalToken));
    assert_eq!(errors[0].msg, "unexpected character `$`");
    assert_eq!(file.map(|f| f.decls.len()), Some(2));
}

#[test]
fn diagnostics_name_what_was_being_parsed() {
    let (_, errors) = parse("fn f(x: ) {}");
    assert!(!errors.is_empty());
    assert!(
        errors[0].notes.iter().any(|n| n == "while parsing the signature of `f`"),
        "{:?}",
        errors[0].notes
    );
}

#[test]
fn unsafe_applies_to_functions_only() {
    let (file, errors) = parse("unsafe struct S; unsafe fn f() {}");
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].msg.starts_with("expected `fn` after `unsafe`"));
    let file = file.expect("file parses");
    assert!(file.decls.iter().any(|d| d.name().map(|n| n.name.as_str()) == Some("f")));
}

#[test]
fn declarations() {
    let src = r#"
        /// A point.
        pub struct Point { pub x: int, y: int }
        struct Wrapper(int);
        struct Marker;
        enum Shape[T] { Circle(T), Rect { w: T, h: T }, Empty = 0 }
        trait Show: Debug { type Out: Display = string; fn show(&self) -> string; fn twice(&self) { self.show() } }
        impl[T] Show for List[T] where T: Show { type Out = string; fn show(&self) -> string { "" } }
        type Pair[T] = (T, T);
        const LIMIT: int = 10;
        use std::io::{read, write as put};
        mod util;
    "#;
    let file = parse_ok(src);
    assert_eq!(file.decls.len(), 11);
    assert_eq!(file.decls[0].doc.as_deref(), Some("A point."));
    match &file.decls[4].kind {
        DeclKind::Enum(e) => {
            assert_eq!(e.variants.len(), 3);
            assert!(e.variants[2].discriminant.is_some());
        }
        other => panic!("expected enum, found {:?}", other),
    }
    match &file.decls[5].kind {
        DeclKind::Trait(t) => {
            assert_eq!(t.supertraits.len(), 1);
            assert_eq!(t.items.len(), 3);
        }
        other => panic!("expected trait, found {:?}", other),
    }
    match &file.decls[6].kind {
        DeclKind::Impl(i) => {
            assert!(i.trait_ref.is_some());
            assert_eq!(i.where_clause.len(), 1);
            assert_eq!(i.items.len(), 2);
        }
        other => panic!("expected impl, found {:?}", other),
    }
}

#[test]
fn broken_trait_item_does_not_lose_the_rest() {
    let (file, errors) = parse("trait T { fn a(; fn b(); }");
    assert!(!errors.is_empty());
    match file.map(|f| f.decls.into_iter().next().map(|d| d.kind)) {
        Some(Some(DeclKind::Trait(t))) => assert_eq!(t.items.len(), 1),
        other => panic!("expected a trait, found {:?}", other),
    }
}

#[test]
fn spans_nest() {
    let file = parse_ok("fn f() { let x = 1 + 2; x }\nstruct S;");
    for decl in file.decls.iter() {
        assert!(file.span.contains(&decl.span));
    }
    let body = first_body(&file);
    assert!(file.decls[0].span.contains(&body.span));
    for stmt in body.stmts.iter() {
        assert!(body.span.contains(&stmt.span));
    }
    assert_eq!(file.decls[1].span.start.lineno, 1);
}

#[test]
fn spans_carry_the_file_id() {
    let options = ParseOptions {
        file_id: Some(FileId(7)),
        ..ParseOptions::default()
    };
    let result = Parser::parse_source("fn f() { g() }", options);
    let file = result.value.expect("file parses");
    assert_eq!(file.span.file, Some(FileId(7)));
    assert_eq!(file.decls[0].span.file, Some(FileId(7)));
    assert_eq!(first_body(&file).span.file, Some(FileId(7)));
}

#[test]
fn module_doc_is_attached_to_the_file() {
    let file = parse_ok("//! Helpers.\n//! More.\nfn f() {}");
    assert_eq!(file.doc.as_deref(), Some("Helpers.\nMore."));
}
