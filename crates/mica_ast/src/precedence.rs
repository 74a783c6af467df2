//! Operator precedence for binary and unary operators.

use crate::syntax_kind::SyntaxKind;

/// Operator precedence levels, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum OperatorPrecedence {
    /// Context with no enclosing operator.
    Lowest = 0,
    /// `|`, `||`, `^`
    Disjunction = 1,
    /// `&`, `&&`
    Conjunction = 2,
    /// `==`, `!=`, `<`, `<=`, `>`, `>=`
    Comparison = 3,
    Additive = 4,
    Multiplicative = 5,
    Unary = 6,
}

/// Get the binary operator precedence for a given token kind.
pub fn binary_operator_precedence(kind: SyntaxKind) -> Option<OperatorPrecedence> {
    match kind {
        SyntaxKind::StarToken | SyntaxKind::SlashToken => Some(OperatorPrecedence::Multiplicative),
        SyntaxKind::PlusToken | SyntaxKind::MinusToken => Some(OperatorPrecedence::Additive),
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::BangEqualsToken
        | SyntaxKind::LessToken
        | SyntaxKind::LessOrEqualsToken
        | SyntaxKind::GreaterToken
        | SyntaxKind::GreaterOrEqualsToken => Some(OperatorPrecedence::Comparison),
        SyntaxKind::AmpersandToken | SyntaxKind::AmpersandAmpersandToken => {
            Some(OperatorPrecedence::Conjunction)
        }
        SyntaxKind::PipeToken | SyntaxKind::PipePipeToken | SyntaxKind::HatToken => {
            Some(OperatorPrecedence::Disjunction)
        }
        _ => None,
    }
}

/// Get the unary operator precedence for a given token kind.
pub fn unary_operator_precedence(kind: SyntaxKind) -> Option<OperatorPrecedence> {
    match kind {
        SyntaxKind::PlusToken
        | SyntaxKind::MinusToken
        | SyntaxKind::BangToken
        | SyntaxKind::TildeToken => Some(OperatorPrecedence::Unary),
        _ => None,
    }
}

/// All token kinds that can start a unary expression.
pub fn unary_operator_kinds() -> impl Iterator<Item = SyntaxKind> {
    SyntaxKind::FIXED_TEXT_TOKENS
        .iter()
        .copied()
        .filter(|kind| unary_operator_precedence(*kind).is_some())
}

/// All token kinds that can join a binary expression.
pub fn binary_operator_kinds() -> impl Iterator<Item = SyntaxKind> {
    SyntaxKind::FIXED_TEXT_TOKENS
        .iter()
        .copied()
        .filter(|kind| binary_operator_precedence(*kind).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_sets() {
        assert_eq!(unary_operator_kinds().count(), 4);
        assert_eq!(binary_operator_kinds().count(), 15);
        assert!(
            binary_operator_precedence(SyntaxKind::StarToken)
                > binary_operator_precedence(SyntaxKind::PlusToken)
        );
        assert_eq!(binary_operator_precedence(SyntaxKind::EqualsToken), None);
    }
}
