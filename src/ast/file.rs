use std::fmt;

use crate::{ast::Decl, pathlib::FilePath, span::Span};

/// A parsed compilation unit.
#[derive(Clone, Debug, PartialEq)]
pub struct File {
    pub decls: Vec<Decl>,
    /// `//!` lines at the top of the file.
    pub doc: Option<String>,
    pub filepath: FilePath,
    pub span: Span,
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for decl in self.decls.iter() {
            writeln!(f, "{}", decl)?;
        }
        Ok(())
    }
}
