//! mica_ast: Syntax tree definitions for the mica language.
//!
//! Defines the `SyntaxKind` enum, operator precedence facts shared by the
//! parser and the bound-tree printer, and the arena-allocated syntax nodes
//! the parser produces.

pub mod node;
pub mod precedence;
pub mod syntax_kind;

pub use node::*;
pub use precedence::OperatorPrecedence;
pub use syntax_kind::SyntaxKind;
