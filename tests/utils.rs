#![allow(dead_code)]

use vireo::{
    ast::File,
    errors::Diagnostic,
    parse::{ParseOptions, Parser},
    pathlib::FilePath,
};

pub fn enable_debug_logs() {
    let _ = fern::Dispatch::new()
        .level(log::LevelFilter::Debug)
        .chain(std::io::stderr())
        .apply();
}

pub fn test_parse(src: &str) -> (Option<File>, Vec<Diagnostic>) {
    let options = ParseOptions::new(FilePath::from("test.vr"));
    let result = Parser::parse_source(src, options);
    (result.value, result.errors)
}

pub fn error_messages(errors: &[Diagnostic]) -> Vec<&str> {
    errors.iter().map(|e| e.msg.as_str()).collect()
}
