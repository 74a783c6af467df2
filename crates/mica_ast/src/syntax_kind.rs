//! SyntaxKind enum - all token and node kinds in the mica syntax tree.

/// The kind of a syntax token or node.
///
/// Token kinds come first, keywords occupy one contiguous range, and node
/// kinds follow; the range predicates below rely on that ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    BadToken = 0,
    EndOfFileToken = 1,

    // Literals
    NumberToken = 2,
    StringToken = 3,
    IdentifierToken = 4,

    // Punctuation
    PlusToken = 5,
    MinusToken = 6,
    StarToken = 7,
    SlashToken = 8,
    BangToken = 9,
    EqualsToken = 10,
    TildeToken = 11,
    HatToken = 12,
    AmpersandToken = 13,
    AmpersandAmpersandToken = 14,
    PipeToken = 15,
    PipePipeToken = 16,
    EqualsEqualsToken = 17,
    BangEqualsToken = 18,
    LessToken = 19,
    LessOrEqualsToken = 20,
    GreaterToken = 21,
    GreaterOrEqualsToken = 22,
    OpenParenthesisToken = 23,
    CloseParenthesisToken = 24,
    OpenBraceToken = 25,
    CloseBraceToken = 26,
    ColonToken = 27,
    CommaToken = 28,

    // ========================================================================
    // Keywords
    // ========================================================================
    BreakKeyword = 40,
    ContinueKeyword = 41,
    DoKeyword = 42,
    ElseKeyword = 43,
    FalseKeyword = 44,
    ForKeyword = 45,
    FunctionKeyword = 46,
    IfKeyword = 47,
    LetKeyword = 48,
    ReturnKeyword = 49,
    ToKeyword = 50,
    TrueKeyword = 51,
    VarKeyword = 52,
    WhileKeyword = 53,

    // ========================================================================
    // Nodes
    // ========================================================================
    CompilationUnit = 80,
    FunctionDeclaration = 81,
    GlobalStatement = 82,
    Parameter = 83,
    TypeClause = 84,
    ElseClause = 85,

    // Statements
    BlockStatement = 90,
    VariableDeclaration = 91,
    IfStatement = 92,
    WhileStatement = 93,
    DoWhileStatement = 94,
    ForStatement = 95,
    BreakStatement = 96,
    ContinueStatement = 97,
    ReturnStatement = 98,
    ExpressionStatement = 99,

    // Expressions
    LiteralExpression = 110,
    NameExpression = 111,
    UnaryExpression = 112,
    BinaryExpression = 113,
    ParenthesizedExpression = 114,
    AssignmentExpression = 115,
    CallExpression = 116,
}

impl SyntaxKind {
    pub const FIRST_PUNCTUATION: SyntaxKind = SyntaxKind::PlusToken;
    pub const LAST_PUNCTUATION: SyntaxKind = SyntaxKind::CommaToken;
    pub const FIRST_KEYWORD: SyntaxKind = SyntaxKind::BreakKeyword;
    pub const LAST_KEYWORD: SyntaxKind = SyntaxKind::WhileKeyword;

    /// Every token kind with a fixed surface text, punctuation then keywords.
    pub const FIXED_TEXT_TOKENS: &'static [SyntaxKind] = &[
        SyntaxKind::PlusToken,
        SyntaxKind::MinusToken,
        SyntaxKind::StarToken,
        SyntaxKind::SlashToken,
        SyntaxKind::BangToken,
        SyntaxKind::EqualsToken,
        SyntaxKind::TildeToken,
        SyntaxKind::HatToken,
        SyntaxKind::AmpersandToken,
        SyntaxKind::AmpersandAmpersandToken,
        SyntaxKind::PipeToken,
        SyntaxKind::PipePipeToken,
        SyntaxKind::EqualsEqualsToken,
        SyntaxKind::BangEqualsToken,
        SyntaxKind::LessToken,
        SyntaxKind::LessOrEqualsToken,
        SyntaxKind::GreaterToken,
        SyntaxKind::GreaterOrEqualsToken,
        SyntaxKind::OpenParenthesisToken,
        SyntaxKind::CloseParenthesisToken,
        SyntaxKind::OpenBraceToken,
        SyntaxKind::CloseBraceToken,
        SyntaxKind::ColonToken,
        SyntaxKind::CommaToken,
        SyntaxKind::BreakKeyword,
        SyntaxKind::ContinueKeyword,
        SyntaxKind::DoKeyword,
        SyntaxKind::ElseKeyword,
        SyntaxKind::FalseKeyword,
        SyntaxKind::ForKeyword,
        SyntaxKind::FunctionKeyword,
        SyntaxKind::IfKeyword,
        SyntaxKind::LetKeyword,
        SyntaxKind::ReturnKeyword,
        SyntaxKind::ToKeyword,
        SyntaxKind::TrueKeyword,
        SyntaxKind::VarKeyword,
        SyntaxKind::WhileKeyword,
    ];

    /// Whether this kind represents a keyword.
    #[inline]
    pub fn is_keyword(self) -> bool {
        let v = self as u16;
        v >= SyntaxKind::FIRST_KEYWORD as u16 && v <= SyntaxKind::LAST_KEYWORD as u16
    }

    /// Whether this kind represents a punctuation token.
    #[inline]
    pub fn is_punctuation(self) -> bool {
        let v = self as u16;
        v >= SyntaxKind::FIRST_PUNCTUATION as u16 && v <= SyntaxKind::LAST_PUNCTUATION as u16
    }

    /// Whether this kind is a token (as opposed to a node).
    #[inline]
    pub fn is_token(self) -> bool {
        (self as u16) < SyntaxKind::CompilationUnit as u16
    }

    /// Get the keyword text for a keyword kind, or None.
    pub fn keyword_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::BreakKeyword => Some("break"),
            SyntaxKind::ContinueKeyword => Some("continue"),
            SyntaxKind::DoKeyword => Some("do"),
            SyntaxKind::ElseKeyword => Some("else"),
            SyntaxKind::FalseKeyword => Some("false"),
            SyntaxKind::ForKeyword => Some("for"),
            SyntaxKind::FunctionKeyword => Some("function"),
            SyntaxKind::IfKeyword => Some("if"),
            SyntaxKind::LetKeyword => Some("let"),
            SyntaxKind::ReturnKeyword => Some("return"),
            SyntaxKind::ToKeyword => Some("to"),
            SyntaxKind::TrueKeyword => Some("true"),
            SyntaxKind::VarKeyword => Some("var"),
            SyntaxKind::WhileKeyword => Some("while"),
            _ => None,
        }
    }

    /// Look up a keyword kind from its text.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        match text {
            "break" => Some(SyntaxKind::BreakKeyword),
            "continue" => Some(SyntaxKind::ContinueKeyword),
            "do" => Some(SyntaxKind::DoKeyword),
            "else" => Some(SyntaxKind::ElseKeyword),
            "false" => Some(SyntaxKind::FalseKeyword),
            "for" => Some(SyntaxKind::ForKeyword),
            "function" => Some(SyntaxKind::FunctionKeyword),
            "if" => Some(SyntaxKind::IfKeyword),
            "let" => Some(SyntaxKind::LetKeyword),
            "return" => Some(SyntaxKind::ReturnKeyword),
            "to" => Some(SyntaxKind::ToKeyword),
            "true" => Some(SyntaxKind::TrueKeyword),
            "var" => Some(SyntaxKind::VarKeyword),
            "while" => Some(SyntaxKind::WhileKeyword),
            _ => None,
        }
    }

    /// Get the punctuation text for a punctuation kind, or None.
    pub fn punctuation_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::PlusToken => Some("+"),
            SyntaxKind::MinusToken => Some("-"),
            SyntaxKind::StarToken => Some("*"),
            SyntaxKind::SlashToken => Some("/"),
            SyntaxKind::BangToken => Some("!"),
            SyntaxKind::EqualsToken => Some("="),
            SyntaxKind::TildeToken => Some("~"),
            SyntaxKind::HatToken => Some("^"),
            SyntaxKind::AmpersandToken => Some("&"),
            SyntaxKind::AmpersandAmpersandToken => Some("&&"),
            SyntaxKind::PipeToken => Some("|"),
            SyntaxKind::PipePipeToken => Some("||"),
            SyntaxKind::EqualsEqualsToken => Some("=="),
            SyntaxKind::BangEqualsToken => Some("!="),
            SyntaxKind::LessToken => Some("<"),
            SyntaxKind::LessOrEqualsToken => Some("<="),
            SyntaxKind::GreaterToken => Some(">"),
            SyntaxKind::GreaterOrEqualsToken => Some(">="),
            SyntaxKind::OpenParenthesisToken => Some("("),
            SyntaxKind::CloseParenthesisToken => Some(")"),
            SyntaxKind::OpenBraceToken => Some("{"),
            SyntaxKind::CloseBraceToken => Some("}"),
            SyntaxKind::ColonToken => Some(":"),
            SyntaxKind::CommaToken => Some(","),
            _ => None,
        }
    }

    /// The fixed surface text of a token kind, if it has one.
    pub fn text(self) -> Option<&'static str> {
        self.keyword_text().or_else(|| self.punctuation_text())
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_text_roundtrip() {
        for kind in SyntaxKind::FIXED_TEXT_TOKENS.iter().copied().filter(|k| k.is_keyword()) {
            let text = kind.keyword_text().unwrap();
            assert_eq!(SyntaxKind::from_keyword(text), Some(kind));
        }
        assert_eq!(SyntaxKind::from_keyword("function1"), None);
    }

    #[test]
    fn test_every_fixed_token_has_text() {
        for kind in SyntaxKind::FIXED_TEXT_TOKENS {
            assert!(kind.text().is_some(), "{kind} has no text");
            assert!(kind.is_token());
        }
        assert_eq!(SyntaxKind::IdentifierToken.text(), None);
    }

    #[test]
    fn test_display_uses_variant_name() {
        assert_eq!(SyntaxKind::IdentifierToken.to_string(), "IdentifierToken");
        assert_eq!(SyntaxKind::CloseParenthesisToken.to_string(), "CloseParenthesisToken");
    }
}
