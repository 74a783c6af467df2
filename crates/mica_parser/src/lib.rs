//! mica_parser: Recursive descent parser for mica.
//!
//! Parses token streams from the scanner into an arena-allocated syntax tree.

mod parser;
mod syntax_tree;

pub use parser::Parser;
pub use syntax_tree::SyntaxTree;
