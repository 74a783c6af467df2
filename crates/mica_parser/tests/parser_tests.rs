//! Parser integration tests.
//!
//! Verifies tree shape, operator precedence and error recovery.

use bumpalo::Bump;
use mica_ast::node::*;
use mica_ast::precedence::{
    binary_operator_kinds, binary_operator_precedence, unary_operator_kinds, unary_operator_precedence,
};
use mica_ast::syntax_kind::SyntaxKind;
use mica_parser::SyntaxTree;

/// Helper: render an expression fully parenthesized, e.g. `((a + b) * c)`.
fn render(expression: &Expression<'_>) -> String {
    match expression {
        Expression::Literal(n) => n.literal_token.text.to_string(),
        Expression::Name(n) => n.identifier.text.to_string(),
        Expression::Unary(n) => format!("({}{})", n.operator_token.text, render(n.operand)),
        Expression::Binary(n) => format!(
            "({} {} {})",
            render(n.left),
            n.operator_token.text,
            render(n.right)
        ),
        Expression::Parenthesized(n) => render(n.expression),
        Expression::Assignment(n) => format!("({} = {})", n.identifier.text, render(n.expression)),
        Expression::Call(n) => {
            let arguments: Vec<String> = n.arguments.iter().map(|a| render(a)).collect();
            format!("{}({})", n.identifier.text, arguments.join(", "))
        }
    }
}

/// Helper: parse a single expression statement and render it.
fn parse_expression(source: &str) -> String {
    let arena = Bump::new();
    let tree = SyntaxTree::parse(&arena, source);
    assert!(
        tree.diagnostics().is_empty(),
        "Unexpected diagnostics for {source:?}: {:?}",
        tree.diagnostics().diagnostics()
    );
    let members = tree.root().members;
    assert_eq!(members.len(), 1);
    match &members[0] {
        Member::GlobalStatement(Statement::Expression(statement)) => render(statement.expression),
        other => panic!("expected an expression statement, got {:?}", other.kind()),
    }
}

/// Helper: parse and return diagnostic messages.
fn parse_diagnostics(source: &str) -> Vec<String> {
    let arena = Bump::new();
    let tree = SyntaxTree::parse(&arena, source);
    tree.diagnostics().iter().map(|d| d.message_text.clone()).collect()
}

fn text(kind: SyntaxKind) -> &'static str {
    kind.text().unwrap()
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_binary_expression_honors_precedences() {
    for op1 in binary_operator_kinds() {
        for op2 in binary_operator_kinds() {
            let p1 = binary_operator_precedence(op1).unwrap();
            let p2 = binary_operator_precedence(op2).unwrap();
            let source = format!("a {} b {} c", text(op1), text(op2));
            let expected = if p1 >= p2 {
                format!("((a {} b) {} c)", text(op1), text(op2))
            } else {
                format!("(a {} (b {} c))", text(op1), text(op2))
            };
            assert_eq!(parse_expression(&source), expected, "source: {source}");
        }
    }
}

#[test]
fn test_unary_expression_honors_precedences() {
    for unary in unary_operator_kinds() {
        for binary in binary_operator_kinds() {
            let unary_precedence = unary_operator_precedence(unary).unwrap();
            let binary_precedence = binary_operator_precedence(binary).unwrap();
            let source = format!("{}a {} b", text(unary), text(binary));
            let expected = if unary_precedence >= binary_precedence {
                format!("(({}a) {} b)", text(unary), text(binary))
            } else {
                format!("({}(a {} b))", text(unary), text(binary))
            };
            assert_eq!(parse_expression(&source), expected, "source: {source}");
        }
    }
}

#[test]
fn test_assignment_is_right_associative() {
    assert_eq!(parse_expression("a = b = 1 + 2"), "(a = (b = (1 + 2)))");
}

#[test]
fn test_parenthesized_and_calls() {
    assert_eq!(parse_expression("(1 + 2) * f(x, \"s\")"), "((1 + 2) * f(x, \"s\"))");
    assert_eq!(parse_expression("g()"), "g()");
}

// ============================================================================
// Statements and members
// ============================================================================

#[test]
fn test_function_declaration() {
    let arena = Bump::new();
    let tree = SyntaxTree::parse(&arena, "function add(a: int, b: int): int { return a + b }");
    assert!(tree.diagnostics().is_empty());
    let Member::FunctionDeclaration(function) = &tree.root().members[0] else {
        panic!("expected a function declaration");
    };
    assert_eq!(function.identifier.text, "add");
    let names: Vec<&str> = function.parameters.iter().map(|p| p.identifier.text).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(function.type_clause.as_ref().map(|t| t.identifier.text), Some("int"));
    assert_eq!(function.body.statements.len(), 1);
    assert_eq!(function.body.statements[0].kind(), SyntaxKind::ReturnStatement);
}

#[test]
fn test_statement_kinds() {
    let arena = Bump::new();
    let source = "{ let a = 1 var b: int = 2 if a < b b = 3 else b = 4 while false { } do { break } while true for i = 1 to 10 continue }";
    let tree = SyntaxTree::parse(&arena, source);
    assert!(tree.diagnostics().is_empty(), "{:?}", tree.diagnostics().diagnostics());
    let Member::GlobalStatement(Statement::Block(block)) = &tree.root().members[0] else {
        panic!("expected a block");
    };
    let kinds: Vec<SyntaxKind> = block.statements.iter().map(Statement::kind).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::VariableDeclaration,
            SyntaxKind::VariableDeclaration,
            SyntaxKind::IfStatement,
            SyntaxKind::WhileStatement,
            SyntaxKind::DoWhileStatement,
            SyntaxKind::ForStatement,
        ]
    );
}

#[test]
fn test_return_value_must_start_on_same_line() {
    let arena = Bump::new();
    let tree = SyntaxTree::parse(&arena, "function f() { return\n1 }");
    let Member::FunctionDeclaration(function) = &tree.root().members[0] else {
        panic!("expected a function declaration");
    };
    let Statement::Return(ret) = &function.body.statements[0] else {
        panic!("expected a return statement");
    };
    assert!(ret.expression.is_none());
    assert_eq!(function.body.statements.len(), 2);
}

// ============================================================================
// Error recovery
// ============================================================================

#[test]
fn test_missing_token_is_reported_and_synthesized() {
    let diagnostics = parse_diagnostics("var x 10");
    assert_eq!(
        diagnostics,
        vec!["Unexpected token <NumberToken>, expected <EqualsToken>."]
    );

    let arena = Bump::new();
    let tree = SyntaxTree::parse(&arena, "var = 10");
    let Member::GlobalStatement(Statement::VariableDeclaration(declaration)) = &tree.root().members[0] else {
        panic!("expected a variable declaration");
    };
    assert!(declaration.identifier.is_missing());
    assert!(declaration.identifier.span.is_empty());
}

#[test]
fn test_unconsumed_token_is_skipped() {
    let diagnostics = parse_diagnostics(")");
    assert_eq!(
        diagnostics,
        vec!["Unexpected token <CloseParenthesisToken>, expected <IdentifierToken>."]
    );
}

#[test]
fn test_scanner_diagnostics_come_first() {
    let diagnostics = parse_diagnostics("1 + $");
    assert_eq!(
        diagnostics,
        vec![
            "bad character input: '$'.",
            "Unexpected token <EndOfFileToken>, expected <IdentifierToken>.",
        ]
    );
}
