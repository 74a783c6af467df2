//! The mica scanner.
//!
//! Converts source text into a stream of tokens that the parser consumes.
//! Positions are byte offsets into the source text.

use crate::token::{TokenInfo, TokenValue};
use mica_ast::syntax_kind::SyntaxKind;
use mica_core::text::TextSpan;
use mica_diagnostics::{messages, DiagnosticCollection};

/// The scanner converts mica source text into tokens.
pub struct Scanner<'t> {
    /// The source text being scanned.
    text: &'t str,
    /// Current byte position in the text.
    pos: usize,
    /// Start of the current token (after leading whitespace).
    token_start: usize,
    /// The current token kind.
    token: SyntaxKind,
    /// The decoded value of the current token, for literals.
    token_value: Option<TokenValue>,
    /// Whether whitespace before the current token contained a line break.
    preceding_line_break: bool,
    /// Accumulated diagnostics.
    diagnostics: DiagnosticCollection,
}

impl<'t> Scanner<'t> {
    /// Create a new scanner for the given source text.
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            pos: 0,
            token_start: 0,
            token: SyntaxKind::BadToken,
            token_value: None,
            preceding_line_break: false,
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Get the current token kind.
    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Get the raw source text of the current token.
    #[inline]
    pub fn token_text(&self) -> &'t str {
        &self.text[self.token_start..self.pos]
    }

    /// Get the start position of the current token.
    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Get the current position (end of current token).
    #[inline]
    pub fn token_end(&self) -> usize {
        self.pos
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Get a TokenInfo for the current token.
    pub fn token_info(&self) -> TokenInfo<'t> {
        TokenInfo {
            kind: self.token,
            span: self.token_span(),
            text: self.token_text(),
            value: self.token_value.clone(),
            preceding_line_break: self.preceding_line_break,
        }
    }

    fn token_span(&self) -> TextSpan {
        TextSpan::from_bounds(self.token_start as u32, self.pos as u32)
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    #[inline]
    fn peek_char(&self) -> Option<char> {
        let mut chars = self.text[self.pos..].chars();
        chars.next();
        chars.next()
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if !ch.is_whitespace() {
                return;
            }
            if ch == '\n' || ch == '\r' {
                self.preceding_line_break = true;
            }
            self.pos += ch.len_utf8();
        }
    }

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_value = None;
        self.preceding_line_break = false;

        self.skip_whitespace();
        self.token_start = self.pos;

        let Some(ch) = self.current_char() else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        self.token = match ch {
            '+' => self.single(SyntaxKind::PlusToken),
            '-' => self.single(SyntaxKind::MinusToken),
            '*' => self.single(SyntaxKind::StarToken),
            '/' => self.single(SyntaxKind::SlashToken),
            '(' => self.single(SyntaxKind::OpenParenthesisToken),
            ')' => self.single(SyntaxKind::CloseParenthesisToken),
            '{' => self.single(SyntaxKind::OpenBraceToken),
            '}' => self.single(SyntaxKind::CloseBraceToken),
            ':' => self.single(SyntaxKind::ColonToken),
            ',' => self.single(SyntaxKind::CommaToken),
            '~' => self.single(SyntaxKind::TildeToken),
            '^' => self.single(SyntaxKind::HatToken),

            '&' => self.single_or_double('&', SyntaxKind::AmpersandToken, SyntaxKind::AmpersandAmpersandToken),
            '|' => self.single_or_double('|', SyntaxKind::PipeToken, SyntaxKind::PipePipeToken),
            '=' => self.single_or_double('=', SyntaxKind::EqualsToken, SyntaxKind::EqualsEqualsToken),
            '!' => self.single_or_double('=', SyntaxKind::BangToken, SyntaxKind::BangEqualsToken),
            '<' => self.single_or_double('=', SyntaxKind::LessToken, SyntaxKind::LessOrEqualsToken),
            '>' => self.single_or_double('=', SyntaxKind::GreaterToken, SyntaxKind::GreaterOrEqualsToken),

            '"' => self.scan_string_literal(),

            '0'..='9' => self.scan_number(),

            _ if is_identifier_start(ch) => self.scan_identifier_or_keyword(),

            _ => {
                self.pos += ch.len_utf8();
                self.diagnostics.report(
                    self.token_span(),
                    &messages::BAD_CHARACTER_INPUT_0,
                    &[&ch.to_string()],
                );
                SyntaxKind::BadToken
            }
        };

        self.token
    }

    // ========================================================================
    // Token-specific scanning methods
    // ========================================================================

    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        kind
    }

    /// Scan a one-character token that becomes a two-character token when
    /// followed by `second`.
    fn single_or_double(&mut self, second: char, single: SyntaxKind, double: SyntaxKind) -> SyntaxKind {
        if self.peek_char() == Some(second) {
            self.pos += 2;
            double
        } else {
            self.pos += 1;
            single
        }
    }

    fn scan_string_literal(&mut self) -> SyntaxKind {
        self.pos += 1; // skip opening quote
        let mut result = String::new();
        loop {
            match self.current_char() {
                None | Some('\r') | Some('\n') => {
                    self.diagnostics.report(
                        TextSpan::new(self.token_start as u32, 1),
                        &messages::UNTERMINATED_STRING_LITERAL,
                        &[],
                    );
                    break;
                }
                Some('"') => {
                    self.pos += 1;
                    break;
                }
                Some('\\') if matches!(self.peek_char(), Some('"') | Some('\\')) => {
                    self.pos += 1;
                    if let Some(escaped) = self.current_char() {
                        result.push(escaped);
                        self.pos += 1;
                    }
                }
                Some(ch) => {
                    result.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
        self.token_value = Some(TokenValue::String(result));
        SyntaxKind::StringToken
    }

    fn scan_number(&mut self) -> SyntaxKind {
        while matches!(self.current_char(), Some('0'..='9')) {
            self.pos += 1;
        }

        let text = self.token_text();
        let value = match text.parse::<i32>() {
            Ok(value) => value,
            Err(_) => {
                self.diagnostics.report(
                    self.token_span(),
                    &messages::THE_NUMBER_0_ISNT_A_VALID_1,
                    &[text, "int"],
                );
                0
            }
        };
        self.token_value = Some(TokenValue::Int(value));
        SyntaxKind::NumberToken
    }

    fn scan_identifier_or_keyword(&mut self) -> SyntaxKind {
        while let Some(ch) = self.current_char() {
            if !is_identifier_part(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        SyntaxKind::from_keyword(self.token_text()).unwrap_or(SyntaxKind::IdentifierToken)
    }

    /// Whether the scanner has consumed the whole text.
    pub fn is_at_end(&self) -> bool {
        self.is_eof()
    }
}

/// Check if a character can start an identifier.
fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic() || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_start(ch))
}

/// Check if a character can be part of an identifier.
fn is_identifier_part(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric() || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_continue(ch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_simple_tokens() {
        let mut scanner = Scanner::new("( ) { } : , ~ ^");
        assert_eq!(scanner.scan(), SyntaxKind::OpenParenthesisToken);
        assert_eq!(scanner.scan(), SyntaxKind::CloseParenthesisToken);
        assert_eq!(scanner.scan(), SyntaxKind::OpenBraceToken);
        assert_eq!(scanner.scan(), SyntaxKind::CloseBraceToken);
        assert_eq!(scanner.scan(), SyntaxKind::ColonToken);
        assert_eq!(scanner.scan(), SyntaxKind::CommaToken);
        assert_eq!(scanner.scan(), SyntaxKind::TildeToken);
        assert_eq!(scanner.scan(), SyntaxKind::HatToken);
        assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
        assert!(scanner.is_at_end());
    }

    #[test]
    fn test_token_info_spans() {
        let mut scanner = Scanner::new("  let\nx");
        scanner.scan();
        let info = scanner.token_info();
        assert_eq!(info.kind, SyntaxKind::LetKeyword);
        assert_eq!(info.span, TextSpan::new(2, 3));
        assert!(!info.preceding_line_break);

        scanner.scan();
        let info = scanner.token_info();
        assert_eq!(info.text, "x");
        assert!(info.preceding_line_break);
    }
}
