//! Operator tables.
//!
//! Every operator the language supports is one row in a static table keyed
//! by its syntax kind and operand types. Binding an operator is a table
//! lookup; the bound tree keeps a `&'static` reference to the matching row.

use crate::symbol::TypeSymbol;
use mica_ast::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundUnaryOperatorKind {
    Identity,
    Negation,
    LogicalNegation,
    OnesComplement,
}

#[derive(Debug, PartialEq, Eq)]
pub struct BoundUnaryOperator {
    pub syntax_kind: SyntaxKind,
    pub kind: BoundUnaryOperatorKind,
    pub operand_type: TypeSymbol,
    pub result_type: TypeSymbol,
}

impl BoundUnaryOperator {
    const fn new(syntax_kind: SyntaxKind, kind: BoundUnaryOperatorKind, operand_type: TypeSymbol) -> Self {
        Self {
            syntax_kind,
            kind,
            operand_type,
            result_type: operand_type,
        }
    }

    /// Find the operator for `syntax_kind` applied to an operand of `operand_type`.
    pub fn bind(syntax_kind: SyntaxKind, operand_type: TypeSymbol) -> Option<&'static BoundUnaryOperator> {
        UNARY_OPERATORS
            .iter()
            .find(|op| op.syntax_kind == syntax_kind && op.operand_type == operand_type)
    }
}

static UNARY_OPERATORS: [BoundUnaryOperator; 4] = [
    BoundUnaryOperator::new(SyntaxKind::BangToken, BoundUnaryOperatorKind::LogicalNegation, TypeSymbol::Bool),
    BoundUnaryOperator::new(SyntaxKind::PlusToken, BoundUnaryOperatorKind::Identity, TypeSymbol::Int),
    BoundUnaryOperator::new(SyntaxKind::MinusToken, BoundUnaryOperatorKind::Negation, TypeSymbol::Int),
    BoundUnaryOperator::new(SyntaxKind::TildeToken, BoundUnaryOperatorKind::OnesComplement, TypeSymbol::Int),
];

// ============================================================================
// Binary operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundBinaryOperatorKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    LogicalAnd,
    LogicalOr,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    Equals,
    NotEquals,
    Less,
    LessOrEquals,
    Greater,
    GreaterOrEquals,
}

#[derive(Debug, PartialEq, Eq)]
pub struct BoundBinaryOperator {
    pub syntax_kind: SyntaxKind,
    pub kind: BoundBinaryOperatorKind,
    pub left_type: TypeSymbol,
    pub right_type: TypeSymbol,
    pub result_type: TypeSymbol,
}

impl BoundBinaryOperator {
    const fn new(syntax_kind: SyntaxKind, kind: BoundBinaryOperatorKind, operand_type: TypeSymbol) -> Self {
        Self::with_result(syntax_kind, kind, operand_type, operand_type)
    }

    const fn with_result(
        syntax_kind: SyntaxKind,
        kind: BoundBinaryOperatorKind,
        operand_type: TypeSymbol,
        result_type: TypeSymbol,
    ) -> Self {
        Self {
            syntax_kind,
            kind,
            left_type: operand_type,
            right_type: operand_type,
            result_type,
        }
    }

    /// Find the operator for `syntax_kind` applied to operands of the given types.
    pub fn bind(
        syntax_kind: SyntaxKind,
        left_type: TypeSymbol,
        right_type: TypeSymbol,
    ) -> Option<&'static BoundBinaryOperator> {
        BINARY_OPERATORS.iter().find(|op| {
            op.syntax_kind == syntax_kind && op.left_type == left_type && op.right_type == right_type
        })
    }
}

use BoundBinaryOperatorKind as B;
use SyntaxKind as K;
use TypeSymbol as T;

static BINARY_OPERATORS: [BoundBinaryOperator; 23] = [
    BoundBinaryOperator::new(K::PlusToken, B::Addition, T::Int),
    BoundBinaryOperator::new(K::MinusToken, B::Subtraction, T::Int),
    BoundBinaryOperator::new(K::StarToken, B::Multiplication, T::Int),
    BoundBinaryOperator::new(K::SlashToken, B::Division, T::Int),
    BoundBinaryOperator::new(K::AmpersandToken, B::BitwiseAnd, T::Int),
    BoundBinaryOperator::new(K::PipeToken, B::BitwiseOr, T::Int),
    BoundBinaryOperator::new(K::HatToken, B::BitwiseXor, T::Int),
    BoundBinaryOperator::with_result(K::EqualsEqualsToken, B::Equals, T::Int, T::Bool),
    BoundBinaryOperator::with_result(K::BangEqualsToken, B::NotEquals, T::Int, T::Bool),
    BoundBinaryOperator::with_result(K::LessToken, B::Less, T::Int, T::Bool),
    BoundBinaryOperator::with_result(K::LessOrEqualsToken, B::LessOrEquals, T::Int, T::Bool),
    BoundBinaryOperator::with_result(K::GreaterToken, B::Greater, T::Int, T::Bool),
    BoundBinaryOperator::with_result(K::GreaterOrEqualsToken, B::GreaterOrEquals, T::Int, T::Bool),
    BoundBinaryOperator::new(K::AmpersandAmpersandToken, B::LogicalAnd, T::Bool),
    BoundBinaryOperator::new(K::PipePipeToken, B::LogicalOr, T::Bool),
    BoundBinaryOperator::new(K::AmpersandToken, B::BitwiseAnd, T::Bool),
    BoundBinaryOperator::new(K::PipeToken, B::BitwiseOr, T::Bool),
    BoundBinaryOperator::new(K::HatToken, B::BitwiseXor, T::Bool),
    BoundBinaryOperator::new(K::EqualsEqualsToken, B::Equals, T::Bool),
    BoundBinaryOperator::new(K::BangEqualsToken, B::NotEquals, T::Bool),
    BoundBinaryOperator::new(K::PlusToken, B::Addition, T::String),
    BoundBinaryOperator::with_result(K::EqualsEqualsToken, B::Equals, T::String, T::Bool),
    BoundBinaryOperator::with_result(K::BangEqualsToken, B::NotEquals, T::String, T::Bool),
];
