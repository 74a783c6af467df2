//! Syntax node definitions for the mica language.
//!
//! Nodes reference child nodes via arena-allocated references and keep every
//! token they were built from, so any node can report the source span it
//! covers. Tokens synthesized by the parser for error recovery have empty
//! text and an empty span.

use crate::syntax_kind::SyntaxKind;
use mica_core::text::TextSpan;

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

// ============================================================================
// Tokens
// ============================================================================

/// The decoded value of a literal token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralValue<'a> {
    Int(i32),
    Bool(bool),
    String(&'a str),
}

#[derive(Debug, Clone, Copy)]
pub struct SyntaxToken<'a> {
    pub kind: SyntaxKind,
    pub span: TextSpan,
    /// The source text of the token, including quotes for strings.
    pub text: &'a str,
    pub value: Option<LiteralValue<'a>>,
}

impl<'a> SyntaxToken<'a> {
    pub fn new(kind: SyntaxKind, span: TextSpan, text: &'a str) -> Self {
        Self {
            kind,
            span,
            text,
            value: None,
        }
    }

    /// A token inserted by the parser where the source lacked one.
    pub fn missing(kind: SyntaxKind, pos: u32) -> Self {
        Self::new(kind, TextSpan::empty(pos), "")
    }

    /// Whether the parser synthesized this token for error recovery.
    pub fn is_missing(&self) -> bool {
        self.text.is_empty() && self.kind != SyntaxKind::EndOfFileToken
    }
}

// ============================================================================
// Compilation Unit and Members
// ============================================================================

#[derive(Debug)]
pub struct CompilationUnit<'a> {
    pub members: NodeList<'a, Member<'a>>,
    pub end_of_file_token: SyntaxToken<'a>,
}

/// A top-level member of a compilation unit.
#[derive(Debug)]
pub enum Member<'a> {
    FunctionDeclaration(FunctionDeclaration<'a>),
    GlobalStatement(Statement<'a>),
}

impl<'a> Member<'a> {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            Member::FunctionDeclaration(_) => SyntaxKind::FunctionDeclaration,
            Member::GlobalStatement(_) => SyntaxKind::GlobalStatement,
        }
    }

    pub fn span(&self) -> TextSpan {
        match self {
            Member::FunctionDeclaration(n) => n.span(),
            Member::GlobalStatement(n) => n.span(),
        }
    }
}

#[derive(Debug)]
pub struct FunctionDeclaration<'a> {
    pub function_keyword: SyntaxToken<'a>,
    pub identifier: SyntaxToken<'a>,
    pub open_parenthesis_token: SyntaxToken<'a>,
    pub parameters: NodeList<'a, Parameter<'a>>,
    pub close_parenthesis_token: SyntaxToken<'a>,
    pub type_clause: Option<TypeClause<'a>>,
    pub body: &'a BlockStatement<'a>,
}

impl<'a> FunctionDeclaration<'a> {
    pub fn span(&self) -> TextSpan {
        self.function_keyword.span.union(&self.body.span())
    }
}

#[derive(Debug)]
pub struct Parameter<'a> {
    pub identifier: SyntaxToken<'a>,
    pub type_clause: TypeClause<'a>,
}

impl<'a> Parameter<'a> {
    pub fn span(&self) -> TextSpan {
        self.identifier.span.union(&self.type_clause.span())
    }
}

/// `: type`
#[derive(Debug)]
pub struct TypeClause<'a> {
    pub colon_token: SyntaxToken<'a>,
    pub identifier: SyntaxToken<'a>,
}

impl<'a> TypeClause<'a> {
    pub fn span(&self) -> TextSpan {
        self.colon_token.span.union(&self.identifier.span)
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug)]
pub enum Statement<'a> {
    Block(BlockStatement<'a>),
    VariableDeclaration(VariableDeclaration<'a>),
    If(IfStatement<'a>),
    While(WhileStatement<'a>),
    DoWhile(DoWhileStatement<'a>),
    For(ForStatement<'a>),
    Break(BreakStatement<'a>),
    Continue(ContinueStatement<'a>),
    Return(ReturnStatement<'a>),
    Expression(ExpressionStatement<'a>),
}

impl<'a> Statement<'a> {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            Statement::Block(_) => SyntaxKind::BlockStatement,
            Statement::VariableDeclaration(_) => SyntaxKind::VariableDeclaration,
            Statement::If(_) => SyntaxKind::IfStatement,
            Statement::While(_) => SyntaxKind::WhileStatement,
            Statement::DoWhile(_) => SyntaxKind::DoWhileStatement,
            Statement::For(_) => SyntaxKind::ForStatement,
            Statement::Break(_) => SyntaxKind::BreakStatement,
            Statement::Continue(_) => SyntaxKind::ContinueStatement,
            Statement::Return(_) => SyntaxKind::ReturnStatement,
            Statement::Expression(_) => SyntaxKind::ExpressionStatement,
        }
    }

    pub fn span(&self) -> TextSpan {
        match self {
            Statement::Block(n) => n.span(),
            Statement::VariableDeclaration(n) => n.keyword.span.union(&n.initializer.span()),
            Statement::If(n) => {
                let end = match &n.else_clause {
                    Some(else_clause) => else_clause.statement.span(),
                    None => n.then_statement.span(),
                };
                n.if_keyword.span.union(&end)
            }
            Statement::While(n) => n.while_keyword.span.union(&n.body.span()),
            Statement::DoWhile(n) => n.do_keyword.span.union(&n.condition.span()),
            Statement::For(n) => n.for_keyword.span.union(&n.body.span()),
            Statement::Break(n) => n.keyword.span,
            Statement::Continue(n) => n.keyword.span,
            Statement::Return(n) => match n.expression {
                Some(expression) => n.return_keyword.span.union(&expression.span()),
                None => n.return_keyword.span,
            },
            Statement::Expression(n) => n.expression.span(),
        }
    }
}

#[derive(Debug)]
pub struct BlockStatement<'a> {
    pub open_brace_token: SyntaxToken<'a>,
    pub statements: NodeList<'a, Statement<'a>>,
    pub close_brace_token: SyntaxToken<'a>,
}

impl<'a> BlockStatement<'a> {
    pub fn span(&self) -> TextSpan {
        self.open_brace_token.span.union(&self.close_brace_token.span)
    }
}

/// `let name [: type] = initializer` or `var name [: type] = initializer`
#[derive(Debug)]
pub struct VariableDeclaration<'a> {
    pub keyword: SyntaxToken<'a>,
    pub identifier: SyntaxToken<'a>,
    pub type_clause: Option<TypeClause<'a>>,
    pub equals_token: SyntaxToken<'a>,
    pub initializer: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct IfStatement<'a> {
    pub if_keyword: SyntaxToken<'a>,
    pub condition: &'a Expression<'a>,
    pub then_statement: &'a Statement<'a>,
    pub else_clause: Option<ElseClause<'a>>,
}

#[derive(Debug)]
pub struct ElseClause<'a> {
    pub else_keyword: SyntaxToken<'a>,
    pub statement: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct WhileStatement<'a> {
    pub while_keyword: SyntaxToken<'a>,
    pub condition: &'a Expression<'a>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct DoWhileStatement<'a> {
    pub do_keyword: SyntaxToken<'a>,
    pub body: &'a Statement<'a>,
    pub while_keyword: SyntaxToken<'a>,
    pub condition: &'a Expression<'a>,
}

/// `for name = lower to upper body`
#[derive(Debug)]
pub struct ForStatement<'a> {
    pub for_keyword: SyntaxToken<'a>,
    pub identifier: SyntaxToken<'a>,
    pub equals_token: SyntaxToken<'a>,
    pub lower_bound: &'a Expression<'a>,
    pub to_keyword: SyntaxToken<'a>,
    pub upper_bound: &'a Expression<'a>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug)]
pub struct BreakStatement<'a> {
    pub keyword: SyntaxToken<'a>,
}

#[derive(Debug)]
pub struct ContinueStatement<'a> {
    pub keyword: SyntaxToken<'a>,
}

#[derive(Debug)]
pub struct ReturnStatement<'a> {
    pub return_keyword: SyntaxToken<'a>,
    pub expression: Option<&'a Expression<'a>>,
}

#[derive(Debug)]
pub struct ExpressionStatement<'a> {
    pub expression: &'a Expression<'a>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug)]
pub enum Expression<'a> {
    Literal(LiteralExpression<'a>),
    Name(NameExpression<'a>),
    Unary(UnaryExpression<'a>),
    Binary(BinaryExpression<'a>),
    Parenthesized(ParenthesizedExpression<'a>),
    Assignment(AssignmentExpression<'a>),
    Call(CallExpression<'a>),
}

impl<'a> Expression<'a> {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            Expression::Literal(_) => SyntaxKind::LiteralExpression,
            Expression::Name(_) => SyntaxKind::NameExpression,
            Expression::Unary(_) => SyntaxKind::UnaryExpression,
            Expression::Binary(_) => SyntaxKind::BinaryExpression,
            Expression::Parenthesized(_) => SyntaxKind::ParenthesizedExpression,
            Expression::Assignment(_) => SyntaxKind::AssignmentExpression,
            Expression::Call(_) => SyntaxKind::CallExpression,
        }
    }

    pub fn span(&self) -> TextSpan {
        match self {
            Expression::Literal(n) => n.literal_token.span,
            Expression::Name(n) => n.identifier.span,
            Expression::Unary(n) => n.operator_token.span.union(&n.operand.span()),
            Expression::Binary(n) => n.left.span().union(&n.right.span()),
            Expression::Parenthesized(n) => {
                n.open_parenthesis_token.span.union(&n.close_parenthesis_token.span)
            }
            Expression::Assignment(n) => n.identifier.span.union(&n.expression.span()),
            Expression::Call(n) => n.span(),
        }
    }
}

#[derive(Debug)]
pub struct LiteralExpression<'a> {
    pub literal_token: SyntaxToken<'a>,
    pub value: LiteralValue<'a>,
}

#[derive(Debug)]
pub struct NameExpression<'a> {
    pub identifier: SyntaxToken<'a>,
}

#[derive(Debug)]
pub struct UnaryExpression<'a> {
    pub operator_token: SyntaxToken<'a>,
    pub operand: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct BinaryExpression<'a> {
    pub left: &'a Expression<'a>,
    pub operator_token: SyntaxToken<'a>,
    pub right: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct ParenthesizedExpression<'a> {
    pub open_parenthesis_token: SyntaxToken<'a>,
    pub expression: &'a Expression<'a>,
    pub close_parenthesis_token: SyntaxToken<'a>,
}

/// `name = expression`
#[derive(Debug)]
pub struct AssignmentExpression<'a> {
    pub identifier: SyntaxToken<'a>,
    pub equals_token: SyntaxToken<'a>,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct CallExpression<'a> {
    pub identifier: SyntaxToken<'a>,
    pub open_parenthesis_token: SyntaxToken<'a>,
    pub arguments: NodeList<'a, &'a Expression<'a>>,
    pub close_parenthesis_token: SyntaxToken<'a>,
}

impl<'a> CallExpression<'a> {
    /// From the function name through the closing parenthesis.
    pub fn span(&self) -> TextSpan {
        self.identifier.span.union(&self.close_parenthesis_token.span)
    }
}
