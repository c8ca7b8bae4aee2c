//! Statement language
//!
//! Classification, scanning and parsing of the small statement dialect the
//! engine accepts.

pub mod ast;
pub mod classifier;
pub mod parser;
pub mod scanner;

pub use ast::Statement;
pub use classifier::{classify, normalize, StatementKind};
pub use parser::{parse, Parser};
