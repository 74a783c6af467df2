//! Scanner integration tests.
//!
//! Verifies that the scanner correctly tokenizes mica source text.

use mica_ast::syntax_kind::SyntaxKind;
use mica_core::text::TextSpan;
use mica_scanner::{Scanner, TokenInfo, TokenValue};

/// Helper: scan all tokens from source, excluding the end-of-file token.
fn scan_all(source: &str) -> Vec<TokenInfo<'_>> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    while scanner.scan() != SyntaxKind::EndOfFileToken {
        tokens.push(scanner.token_info());
    }
    tokens
}

/// Helper: scan all token kinds.
fn scan_kinds(source: &str) -> Vec<SyntaxKind> {
    scan_all(source).into_iter().map(|t| t.kind).collect()
}

/// Helper: scan and return the diagnostic messages.
fn scan_diagnostics(source: &str) -> Vec<(String, TextSpan)> {
    let mut scanner = Scanner::new(source);
    while scanner.scan() != SyntaxKind::EndOfFileToken {}
    scanner
        .take_diagnostics()
        .into_diagnostics()
        .into_iter()
        .map(|d| (d.message_text, d.span))
        .collect()
}

/// Whether scanning `a` directly followed by `b` would merge them into other tokens.
fn requires_separator(a: SyntaxKind, b: SyntaxKind) -> bool {
    let a_is_word = a.is_keyword() || a == SyntaxKind::IdentifierToken || a == SyntaxKind::NumberToken;
    let b_is_word = b.is_keyword() || b == SyntaxKind::IdentifierToken || b == SyntaxKind::NumberToken;
    if a_is_word && b_is_word {
        return true;
    }
    matches!(
        (a, b),
        (SyntaxKind::BangToken, SyntaxKind::EqualsToken)
            | (SyntaxKind::BangToken, SyntaxKind::EqualsEqualsToken)
            | (SyntaxKind::EqualsToken, SyntaxKind::EqualsToken)
            | (SyntaxKind::EqualsToken, SyntaxKind::EqualsEqualsToken)
            | (SyntaxKind::LessToken, SyntaxKind::EqualsToken)
            | (SyntaxKind::LessToken, SyntaxKind::EqualsEqualsToken)
            | (SyntaxKind::GreaterToken, SyntaxKind::EqualsToken)
            | (SyntaxKind::GreaterToken, SyntaxKind::EqualsEqualsToken)
            | (SyntaxKind::AmpersandToken, SyntaxKind::AmpersandToken)
            | (SyntaxKind::AmpersandToken, SyntaxKind::AmpersandAmpersandToken)
            | (SyntaxKind::PipeToken, SyntaxKind::PipeToken)
            | (SyntaxKind::PipeToken, SyntaxKind::PipePipeToken)
    )
}

// ============================================================================
// Fixed-text tokens
// ============================================================================

#[test]
fn test_every_fixed_token_round_trips() {
    for &kind in SyntaxKind::FIXED_TEXT_TOKENS {
        let text = kind.text().unwrap();
        let tokens = scan_all(text);
        assert_eq!(tokens.len(), 1, "{text} scanned as {tokens:?}");
        assert_eq!(tokens[0].kind, kind);
        assert_eq!(tokens[0].text, text);
        assert_eq!(tokens[0].span, TextSpan::new(0, text.len() as u32));
    }
}

#[test]
fn test_token_pairs() {
    let samples: Vec<(SyntaxKind, &str)> = SyntaxKind::FIXED_TEXT_TOKENS
        .iter()
        .map(|&k| (k, k.text().unwrap()))
        .chain([
            (SyntaxKind::IdentifierToken, "a"),
            (SyntaxKind::IdentifierToken, "abc"),
            (SyntaxKind::NumberToken, "1"),
            (SyntaxKind::NumberToken, "123"),
        ])
        .collect();

    for &(kind1, text1) in &samples {
        for &(kind2, text2) in &samples {
            let separator = if requires_separator(kind1, kind2) { " " } else { "" };
            let source = format!("{text1}{separator}{text2}");
            let tokens = scan_all(&source);
            assert_eq!(tokens.len(), 2, "{source:?} scanned as {tokens:?}");
            assert_eq!((tokens[0].kind, tokens[0].text), (kind1, text1));
            assert_eq!((tokens[1].kind, tokens[1].text), (kind2, text2));
        }
    }
}

#[test]
fn test_two_character_operators() {
    assert_eq!(
        scan_kinds("== != <= >= && || = ! < > & |"),
        vec![
            SyntaxKind::EqualsEqualsToken,
            SyntaxKind::BangEqualsToken,
            SyntaxKind::LessOrEqualsToken,
            SyntaxKind::GreaterOrEqualsToken,
            SyntaxKind::AmpersandAmpersandToken,
            SyntaxKind::PipePipeToken,
            SyntaxKind::EqualsToken,
            SyntaxKind::BangToken,
            SyntaxKind::LessToken,
            SyntaxKind::GreaterToken,
            SyntaxKind::AmpersandToken,
            SyntaxKind::PipeToken,
        ]
    );
}

// ============================================================================
// Literals and identifiers
// ============================================================================

#[test]
fn test_empty_source() {
    assert!(scan_all("").is_empty());
    assert!(scan_all("   \n\t  ").is_empty());
}

#[test]
fn test_number_literal() {
    let tokens = scan_all("42");
    assert_eq!(tokens[0].kind, SyntaxKind::NumberToken);
    assert_eq!(tokens[0].value, Some(TokenValue::Int(42)));
}

#[test]
fn test_number_literal_overflow() {
    let diagnostics = scan_diagnostics("99999999999");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].0, "The number 99999999999 isn't a valid int.");
    assert_eq!(diagnostics[0].1, TextSpan::new(0, 11));

    let tokens = scan_all("99999999999");
    assert_eq!(tokens[0].value, Some(TokenValue::Int(0)));
}

#[test]
fn test_string_literal_with_escapes() {
    let tokens = scan_all(r#""say \"hi\" \\ now\n""#);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, SyntaxKind::StringToken);
    assert_eq!(
        tokens[0].value,
        Some(TokenValue::String(r#"say "hi" \ now\n"#.to_string()))
    );
}

#[test]
fn test_unterminated_string() {
    let diagnostics = scan_diagnostics("var s = \"abc\nprint(s)");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].0, "Unterminated string literal.");
    assert_eq!(diagnostics[0].1, TextSpan::new(8, 1));
}

#[test]
fn test_identifiers_and_keywords() {
    assert_eq!(
        scan_kinds("function fib_2 letter tó to"),
        vec![
            SyntaxKind::FunctionKeyword,
            SyntaxKind::IdentifierToken,
            SyntaxKind::IdentifierToken,
            SyntaxKind::IdentifierToken,
            SyntaxKind::ToKeyword,
        ]
    );
}

#[test]
fn test_bad_character() {
    let diagnostics = scan_diagnostics("1 $ 2");
    assert_eq!(diagnostics, vec![("bad character input: '$'.".to_string(), TextSpan::new(2, 1))]);
    assert_eq!(
        scan_kinds("1 $ 2"),
        vec![SyntaxKind::NumberToken, SyntaxKind::BadToken, SyntaxKind::NumberToken]
    );
}
