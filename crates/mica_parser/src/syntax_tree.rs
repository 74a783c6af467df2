//! A parsed compilation unit together with its source text.

use bumpalo::Bump;
use mica_ast::node::CompilationUnit;
use mica_core::text::{LineAndColumn, LineMap};
use mica_diagnostics::DiagnosticCollection;

use crate::parser::Parser;

/// The result of parsing one source text.
///
/// The text and every node live in the arena passed to [`SyntaxTree::parse`];
/// the tree only borrows them.
pub struct SyntaxTree<'a> {
    text: &'a str,
    line_map: LineMap,
    root: &'a CompilationUnit<'a>,
    diagnostics: DiagnosticCollection,
}

impl<'a> SyntaxTree<'a> {
    /// Parse `text`, copying it into `arena` first.
    pub fn parse(arena: &'a Bump, text: &str) -> Self {
        let text: &'a str = arena.alloc_str(text);
        let mut parser = Parser::new(arena, text);
        let root = parser.parse_compilation_unit();
        Self {
            text,
            line_map: LineMap::new(text),
            root,
            diagnostics: parser.take_diagnostics(),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn root(&self) -> &'a CompilationUnit<'a> {
        self.root
    }

    /// Scan and parse diagnostics, in the order they were found.
    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn line_map(&self) -> &LineMap {
        &self.line_map
    }

    pub fn line_and_column_of(&self, pos: u32) -> LineAndColumn {
        self.line_map.line_and_column_of(pos)
    }
}

impl std::fmt::Debug for SyntaxTree<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("members", &self.root.members.len())
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}
