#[macro_use]
extern crate lazy_static;

#[macro_use]
mod macros;

pub mod ast;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logger;
pub mod parse;
pub mod pathlib;
pub mod span;
pub mod strutils;
