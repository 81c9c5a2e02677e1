#![cfg(test)]

mod utils;

use vireo::{
    ast::{DeclKind, StmtKind},
    errors::{DiagnosticCode, Severity},
};

use utils::*;

const PROGRAM: &str = r#"
//! Worker pool example.

use std::sync::{channel, Sender as Tx};

/// A unit of work.
pub struct Job[T] where T: Send {
    pub id: int,
    payload: T,
}

pub enum Status { Idle, Busy(int), Failed { code: int } }

trait Worker {
    type Output: Show;
    fn run(&mut self, job: Job[int]) -> Self::Output / {IO | e};
}

fn spawn_all(jobs: []Job[int], out: chan Status) / IO {
    for job in jobs {
        spawn |j| { out <- Status::Busy(j.id); }(job);
    }
    select {
        let s = <-out => { log(s); },
    }
}

fn classify(s: Status) -> int {
    match s {
        Status::Idle => 0,
        Status::Busy(n) if n > 10 => { n * 2 }
        Status::Failed { code, .. } => code,
        _ => -1,
    }
}
"#;

#[test]
fn parses_a_realistic_program() {
    let (file, errors) = test_parse(PROGRAM);
    assert!(errors.is_empty(), "{:?}", error_messages(&errors));
    let file = file.expect("program parses");
    assert_eq!(file.doc.as_deref(), Some("Worker pool example."));
    assert_eq!(file.decls.len(), 6);
    assert_eq!(file.decls[1].doc.as_deref(), Some("A unit of work."));
    assert!(file.decls.iter().all(|d| file.span.contains(&d.span)));

    match &file.decls[4].kind {
        DeclKind::Fn(f) => {
            assert!(f.header.effects.is_some());
            let body = f.body.as_ref().expect("body");
            assert!(matches!(body.stmts[0].kind, StmtKind::For { .. }));
            assert!(matches!(body.stmts[1].kind, StmtKind::Select(_)));
        }
        other => panic!("expected a function, found {:?}", other),
    }
}

#[test]
fn several_broken_declarations() {
    let src = "fn a( { }\nstruct B { x: }\nfn c() -> int { 1 }\nenum D { E(, }\nconst F: int = 2;";
    let (file, errors) = test_parse(src);
    let file = file.expect("the intact declarations survive");
    let names = file
        .decls
        .iter()
        .filter_map(|d| d.name().map(|n| n.name.clone()))
        .collect::<Vec<_>>();
    assert!(names.contains(&"c".to_string()), "{:?}", names);
    assert!(names.contains(&"F".to_string()), "{:?}", names);
    assert!(errors.len() >= 3, "{:?}", error_messages(&errors));
    assert!(errors.iter().all(|e| e.severity == Severity::Error));
}

#[test]
fn broken_statements_keep_the_block() {
    let src = "fn f() {\n    let x = ;\n    let y = 2;\n    g(y)\n}\n";
    let (file, errors) = test_parse(src);
    assert_eq!(errors.len(), 1, "{:?}", error_messages(&errors));
    assert_eq!(errors[0].span.start.lineno, 1);
    let file = file.expect("file parses");
    match &file.decls[0].kind {
        DeclKind::Fn(f) => {
            let body = f.body.as_ref().expect("body");
            assert_eq!(body.stmts.len(), 1);
            assert!(body.tail.is_some());
        }
        other => panic!("expected a function, found {:?}", other),
    }
}

#[test]
fn stray_tokens_between_declarations() {
    let (file, errors) = test_parse("fn a() {}\n) ) ]\nfn b() {}");
    assert_eq!(errors[0].msg, "unexpected `)`");
    assert_eq!(file.map(|f| f.decls.len()), Some(2));
}

#[test]
fn misplaced_pattern_syntax_gets_advice() {
    let (_, errors) = test_parse("fn f() { match x { a.len() => 1, _ => 2 } }");
    let diag = errors
        .iter()
        .find(|e| e.code == Some(DiagnosticCode::InvalidPattern))
        .expect("pattern diagnostic");
    assert!(diag.help.is_some());
}

#[test]
fn every_diagnostic_has_a_code() {
    let (_, errors) = test_parse("fn f( { let = ; match { } spawn 1; select {} }\nstruct");
    assert!(!errors.is_empty());
    assert!(errors.iter().all(|e| e.code.is_some()), "{:?}", errors);
}
