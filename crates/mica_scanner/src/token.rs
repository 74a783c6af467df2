//! Token information produced by the scanner.

use mica_ast::syntax_kind::SyntaxKind;
use mica_core::text::TextSpan;

/// The decoded value carried by a literal token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    Int(i32),
    /// String contents with escapes resolved.
    String(String),
}

/// Information about a scanned token.
#[derive(Debug, Clone)]
pub struct TokenInfo<'t> {
    pub kind: SyntaxKind,
    pub span: TextSpan,
    /// The raw source text of the token.
    pub text: &'t str,
    pub value: Option<TokenValue>,
    /// Whether a line break separates this token from the previous one.
    pub preceding_line_break: bool,
}

impl<'t> TokenInfo<'t> {
    /// Whether this token has zero length.
    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}
