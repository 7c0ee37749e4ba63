//! Mojom front end: lexer, syntax tree, and parser.

pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod token;

pub use ast::{Definition, ImportDecl, MojomFile};
pub use parser::{parse, ParseError};
pub use token::{Span, Token};
