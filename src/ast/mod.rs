mod decl;
mod expr;
mod file;
mod node;
mod op;
mod pattern;
mod stmt;
mod ty;

pub mod token;

pub use decl::*;
pub use expr::*;
pub use file::*;
pub use node::*;
pub use op::*;
pub use pattern::*;
pub use stmt::*;
pub use ty::*;
