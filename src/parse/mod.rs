pub mod lexer;
mod parser;
pub mod window;

pub use lexer::{Lexer, TokenSource};
pub use parser::{
    ParseDiagnostics, ParseFailed, ParseOptions, ParseResult, Parser, DEFAULT_MAX_DEPTH,
};
