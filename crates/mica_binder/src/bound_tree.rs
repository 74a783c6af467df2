//! Bound tree definitions.
//!
//! The bound tree is the typed, name-resolved form of a program. Nodes are
//! immutable and shared through `Arc`, so a rewrite that leaves a subtree
//! unchanged can hand back the same allocation.

use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};
use crate::symbol::{FunctionSymbol, TypeSymbol, VariableSymbol};
use crate::value::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundNodeKind {
    // Expressions
    ErrorExpression,
    LiteralExpression,
    VariableExpression,
    AssignmentExpression,
    UnaryExpression,
    BinaryExpression,
    CallExpression,
    ConversionExpression,

    // Statements
    BlockStatement,
    VariableDeclaration,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    LabelStatement,
    GotoStatement,
    ConditionalGotoStatement,
    ReturnStatement,
    ExpressionStatement,
}

impl fmt::Display for BoundNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ============================================================================
// Labels
// ============================================================================

/// A jump target. Labels compare by identity, not by name.
#[derive(Clone)]
pub struct BoundLabel(Arc<str>);

impl BoundLabel {
    pub fn new(name: impl AsRef<str>) -> Self {
        BoundLabel(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq for BoundLabel {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for BoundLabel {}

impl Hash for BoundLabel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const u8 as usize).hash(state);
    }
}

impl fmt::Debug for BoundLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for BoundLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone)]
pub enum BoundExpression {
    /// Stands in for an expression that failed to bind.
    Error,
    Literal(Value),
    Variable(Arc<VariableSymbol>),
    Assignment {
        variable: Arc<VariableSymbol>,
        expression: Arc<BoundExpression>,
    },
    Unary {
        op: &'static BoundUnaryOperator,
        operand: Arc<BoundExpression>,
    },
    Binary {
        left: Arc<BoundExpression>,
        op: &'static BoundBinaryOperator,
        right: Arc<BoundExpression>,
    },
    Call {
        function: Arc<FunctionSymbol>,
        arguments: Vec<Arc<BoundExpression>>,
    },
    Conversion {
        ty: TypeSymbol,
        expression: Arc<BoundExpression>,
    },
}

impl BoundExpression {
    pub fn kind(&self) -> BoundNodeKind {
        match self {
            BoundExpression::Error => BoundNodeKind::ErrorExpression,
            BoundExpression::Literal(_) => BoundNodeKind::LiteralExpression,
            BoundExpression::Variable(_) => BoundNodeKind::VariableExpression,
            BoundExpression::Assignment { .. } => BoundNodeKind::AssignmentExpression,
            BoundExpression::Unary { .. } => BoundNodeKind::UnaryExpression,
            BoundExpression::Binary { .. } => BoundNodeKind::BinaryExpression,
            BoundExpression::Call { .. } => BoundNodeKind::CallExpression,
            BoundExpression::Conversion { .. } => BoundNodeKind::ConversionExpression,
        }
    }

    /// The static type of the expression.
    pub fn ty(&self) -> TypeSymbol {
        match self {
            BoundExpression::Error => TypeSymbol::Error,
            BoundExpression::Literal(value) => value.ty(),
            BoundExpression::Variable(variable) => variable.ty,
            BoundExpression::Assignment { expression, .. } => expression.ty(),
            BoundExpression::Unary { op, .. } => op.result_type,
            BoundExpression::Binary { op, .. } => op.result_type,
            BoundExpression::Call { function, .. } => function.return_type,
            BoundExpression::Conversion { ty, .. } => *ty,
        }
    }

    pub fn literal(value: impl Into<Value>) -> Arc<BoundExpression> {
        Arc::new(BoundExpression::Literal(value.into()))
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct BoundBlockStatement {
    pub statements: Vec<Arc<BoundStatement>>,
}

impl BoundBlockStatement {
    pub fn new(statements: Vec<Arc<BoundStatement>>) -> Self {
        Self { statements }
    }
}

#[derive(Debug, Clone)]
pub enum BoundStatement {
    Block(BoundBlockStatement),
    VariableDeclaration {
        variable: Arc<VariableSymbol>,
        initializer: Arc<BoundExpression>,
    },
    If {
        condition: Arc<BoundExpression>,
        then_statement: Arc<BoundStatement>,
        else_statement: Option<Arc<BoundStatement>>,
    },
    While {
        condition: Arc<BoundExpression>,
        body: Arc<BoundStatement>,
        break_label: BoundLabel,
        continue_label: BoundLabel,
    },
    DoWhile {
        body: Arc<BoundStatement>,
        condition: Arc<BoundExpression>,
        break_label: BoundLabel,
        continue_label: BoundLabel,
    },
    For {
        variable: Arc<VariableSymbol>,
        lower_bound: Arc<BoundExpression>,
        upper_bound: Arc<BoundExpression>,
        body: Arc<BoundStatement>,
        break_label: BoundLabel,
        continue_label: BoundLabel,
    },
    Label(BoundLabel),
    Goto(BoundLabel),
    ConditionalGoto {
        label: BoundLabel,
        condition: Arc<BoundExpression>,
        jump_if_false: bool,
    },
    Return(Option<Arc<BoundExpression>>),
    Expression(Arc<BoundExpression>),
}

impl BoundStatement {
    pub fn kind(&self) -> BoundNodeKind {
        match self {
            BoundStatement::Block(_) => BoundNodeKind::BlockStatement,
            BoundStatement::VariableDeclaration { .. } => BoundNodeKind::VariableDeclaration,
            BoundStatement::If { .. } => BoundNodeKind::IfStatement,
            BoundStatement::While { .. } => BoundNodeKind::WhileStatement,
            BoundStatement::DoWhile { .. } => BoundNodeKind::DoWhileStatement,
            BoundStatement::For { .. } => BoundNodeKind::ForStatement,
            BoundStatement::Label(_) => BoundNodeKind::LabelStatement,
            BoundStatement::Goto(_) => BoundNodeKind::GotoStatement,
            BoundStatement::ConditionalGoto { .. } => BoundNodeKind::ConditionalGotoStatement,
            BoundStatement::Return(_) => BoundNodeKind::ReturnStatement,
            BoundStatement::Expression(_) => BoundNodeKind::ExpressionStatement,
        }
    }
}

// ============================================================================
// Generic node view
// ============================================================================

/// A borrowed view of any bound node, used for generic traversal.
#[derive(Debug, Clone, Copy)]
pub enum BoundNode<'n> {
    Expression(&'n BoundExpression),
    Statement(&'n BoundStatement),
}

impl<'n> BoundNode<'n> {
    pub fn kind(&self) -> BoundNodeKind {
        match self {
            BoundNode::Expression(e) => e.kind(),
            BoundNode::Statement(s) => s.kind(),
        }
    }

    /// Child nodes in source order.
    pub fn children(&self) -> Vec<BoundNode<'n>> {
        use BoundNode::{Expression as E, Statement as S};
        match *self {
            BoundNode::Expression(expression) => match expression {
                BoundExpression::Error | BoundExpression::Literal(_) | BoundExpression::Variable(_) => Vec::new(),
                BoundExpression::Assignment { expression, .. } => vec![E(expression)],
                BoundExpression::Unary { operand, .. } => vec![E(operand)],
                BoundExpression::Binary { left, right, .. } => vec![E(left), E(right)],
                BoundExpression::Call { arguments, .. } => arguments.iter().map(|a| E(a)).collect(),
                BoundExpression::Conversion { expression, .. } => vec![E(expression)],
            },
            BoundNode::Statement(statement) => match statement {
                BoundStatement::Block(block) => block.statements.iter().map(|s| S(s)).collect(),
                BoundStatement::VariableDeclaration { initializer, .. } => vec![E(initializer)],
                BoundStatement::If {
                    condition,
                    then_statement,
                    else_statement,
                } => {
                    let mut children = vec![E(condition), S(then_statement)];
                    if let Some(else_statement) = else_statement {
                        children.push(S(else_statement));
                    }
                    children
                }
                BoundStatement::While { condition, body, .. } => vec![E(condition), S(body)],
                BoundStatement::DoWhile { body, condition, .. } => vec![S(body), E(condition)],
                BoundStatement::For {
                    lower_bound,
                    upper_bound,
                    body,
                    ..
                } => vec![E(lower_bound), E(upper_bound), S(body)],
                BoundStatement::Label(_) | BoundStatement::Goto(_) => Vec::new(),
                BoundStatement::ConditionalGoto { condition, .. } => vec![E(condition)],
                BoundStatement::Return(expression) => expression.iter().map(|e| E(e)).collect(),
                BoundStatement::Expression(expression) => vec![E(expression)],
            },
        }
    }

    /// Scalar properties of the node, as (name, rendered value) pairs.
    pub fn properties(&self) -> Vec<(&'static str, String)> {
        match *self {
            BoundNode::Expression(expression) => {
                let mut properties = vec![("type", expression.ty().to_string())];
                match expression {
                    BoundExpression::Literal(value) => properties.push(("value", value.to_string())),
                    BoundExpression::Variable(variable) | BoundExpression::Assignment { variable, .. } => {
                        properties.push(("variable", variable.name.clone()))
                    }
                    BoundExpression::Unary { op, .. } => properties.push(("op", format!("{:?}", op.kind))),
                    BoundExpression::Binary { op, .. } => properties.push(("op", format!("{:?}", op.kind))),
                    BoundExpression::Call { function, .. } => properties.push(("function", function.name.clone())),
                    BoundExpression::Error | BoundExpression::Conversion { .. } => {}
                }
                properties
            }
            BoundNode::Statement(statement) => match statement {
                BoundStatement::VariableDeclaration { variable, .. } => {
                    vec![("variable", variable.name.clone()), ("type", variable.ty.to_string())]
                }
                BoundStatement::While {
                    break_label,
                    continue_label,
                    ..
                }
                | BoundStatement::DoWhile {
                    break_label,
                    continue_label,
                    ..
                } => vec![
                    ("break", break_label.to_string()),
                    ("continue", continue_label.to_string()),
                ],
                BoundStatement::For {
                    variable,
                    break_label,
                    continue_label,
                    ..
                } => vec![
                    ("variable", variable.name.clone()),
                    ("break", break_label.to_string()),
                    ("continue", continue_label.to_string()),
                ],
                BoundStatement::Label(label) | BoundStatement::Goto(label) => vec![("label", label.to_string())],
                BoundStatement::ConditionalGoto {
                    label, jump_if_false, ..
                } => vec![("label", label.to_string()), ("jumpIfFalse", jump_if_false.to_string())],
                _ => Vec::new(),
            },
        }
    }
}

impl<'n> From<&'n BoundExpression> for BoundNode<'n> {
    fn from(expression: &'n BoundExpression) -> Self {
        BoundNode::Expression(expression)
    }
}

impl<'n> From<&'n BoundStatement> for BoundNode<'n> {
    fn from(statement: &'n BoundStatement) -> Self {
        BoundNode::Statement(statement)
    }
}

/// Write an indented outline of `node` and its descendants, one node per
/// line: the kind followed by its properties.
pub fn write_outline(out: &mut impl fmt::Write, node: BoundNode<'_>) -> fmt::Result {
    write_outline_at(out, node, 0)
}

fn write_outline_at(out: &mut impl fmt::Write, node: BoundNode<'_>, depth: usize) -> fmt::Result {
    write!(out, "{:width$}{}", "", node.kind(), width = depth * 4)?;
    for (name, value) in node.properties() {
        write!(out, " {name}={value}")?;
    }
    writeln!(out)?;
    for child in node.children() {
        write_outline_at(out, child, depth + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::VariableKind;

    #[test]
    fn test_labels_compare_by_identity() {
        let a = BoundLabel::new("label1");
        let b = BoundLabel::new("label1");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_outline() {
        let x = VariableSymbol::new("x", VariableKind::Global, TypeSymbol::Int, false);
        let statement = BoundStatement::VariableDeclaration {
            variable: x,
            initializer: BoundExpression::literal(42),
        };
        let mut out = String::new();
        write_outline(&mut out, BoundNode::Statement(&statement)).unwrap();
        assert_eq!(
            out,
            "VariableDeclaration variable=x type=int\n    LiteralExpression type=int value=42\n"
        );
    }
}
