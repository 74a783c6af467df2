//! Renders bound trees back into surface-like syntax.
//!
//! Lowered constructs print as `goto`, `goto L if c`, `goto L unless c` and
//! `L:` lines. Operands are parenthesized only where precedence requires.

use crate::binder::BoundProgram;
use crate::bound_tree::{BoundBlockStatement, BoundExpression, BoundStatement};
use crate::symbol::{FunctionSymbol, TypeSymbol};
use crate::value::Value;
use mica_ast::precedence::{binary_operator_precedence, OperatorPrecedence};
use std::fmt::Write;

const INDENT: &str = "    ";

#[derive(Debug)]
pub struct BoundTreePrinter {
    output: String,
    indent: usize,
    at_line_start: bool,
}

impl BoundTreePrinter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
            at_line_start: true,
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    pub fn statement_to_string(statement: &BoundStatement) -> String {
        let mut printer = Self::new();
        printer.write_statement(statement);
        printer.finish()
    }

    pub fn expression_to_string(expression: &BoundExpression) -> String {
        let mut printer = Self::new();
        printer.write_expression(expression);
        printer.finish()
    }

    /// Print every function body, then the top-level statements.
    pub fn program_to_string(program: &BoundProgram) -> String {
        let mut printer = Self::new();
        for (function, body) in &program.functions {
            printer.write_function_header(function);
            printer.write_block(body);
        }
        printer.write_block(&program.statement);
        printer.finish()
    }

    pub fn write_function_header(&mut self, function: &FunctionSymbol) {
        self.write("function ");
        self.write(&function.name);
        self.write("(");
        for (i, parameter) in function.parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&parameter.name);
            self.write(": ");
            self.write(parameter.ty.name());
        }
        self.write(")");
        if function.return_type != TypeSymbol::Void {
            self.write(": ");
            self.write(function.return_type.name());
        }
        self.line();
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn write_statement(&mut self, statement: &BoundStatement) {
        match statement {
            BoundStatement::Block(block) => self.write_block(block),
            BoundStatement::VariableDeclaration { variable, initializer } => {
                self.write(if variable.is_read_only { "let " } else { "var " });
                self.write(&variable.name);
                self.write(" = ");
                self.write_expression(initializer);
                self.line();
            }
            BoundStatement::If {
                condition,
                then_statement,
                else_statement,
            } => {
                self.write("if ");
                self.write_expression(condition);
                self.line();
                self.write_nested_statement(then_statement);
                if let Some(else_statement) = else_statement {
                    self.write("else");
                    self.line();
                    self.write_nested_statement(else_statement);
                }
            }
            BoundStatement::While { condition, body, .. } => {
                self.write("while ");
                self.write_expression(condition);
                self.line();
                self.write_nested_statement(body);
            }
            BoundStatement::DoWhile { body, condition, .. } => {
                self.write("do");
                self.line();
                self.write_nested_statement(body);
                self.write("while ");
                self.write_expression(condition);
                self.line();
            }
            BoundStatement::For {
                variable,
                lower_bound,
                upper_bound,
                body,
                ..
            } => {
                self.write("for ");
                self.write(&variable.name);
                self.write(" = ");
                self.write_expression(lower_bound);
                self.write(" to ");
                self.write_expression(upper_bound);
                self.line();
                self.write_nested_statement(body);
            }
            BoundStatement::Label(label) => {
                let unindent = self.indent > 0;
                if unindent {
                    self.indent -= 1;
                }
                self.write(label.name());
                self.write(":");
                self.line();
                if unindent {
                    self.indent += 1;
                }
            }
            BoundStatement::Goto(label) => {
                self.write("goto ");
                self.write(label.name());
                self.line();
            }
            BoundStatement::ConditionalGoto {
                label,
                condition,
                jump_if_false,
            } => {
                self.write("goto ");
                self.write(label.name());
                self.write(if *jump_if_false { " unless " } else { " if " });
                self.write_expression(condition);
                self.line();
            }
            BoundStatement::Return(expression) => {
                self.write("return");
                if let Some(expression) = expression {
                    self.write(" ");
                    self.write_expression(expression);
                }
                self.line();
            }
            BoundStatement::Expression(expression) => {
                self.write_expression(expression);
                self.line();
            }
        }
    }

    pub fn write_block(&mut self, block: &BoundBlockStatement) {
        self.write("{");
        self.line();
        self.indent += 1;
        for statement in &block.statements {
            self.write_statement(statement);
        }
        self.indent -= 1;
        self.write("}");
        self.line();
    }

    fn write_nested_statement(&mut self, statement: &BoundStatement) {
        if matches!(statement, BoundStatement::Block(_)) {
            self.write_statement(statement);
        } else {
            self.indent += 1;
            self.write_statement(statement);
            self.indent -= 1;
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn write_expression(&mut self, expression: &BoundExpression) {
        match expression {
            BoundExpression::Error => self.write("?"),
            BoundExpression::Literal(value) => self.write_literal(value),
            BoundExpression::Variable(variable) => self.write(&variable.name),
            BoundExpression::Assignment { variable, expression } => {
                self.write(&variable.name);
                self.write(" = ");
                self.write_expression(expression);
            }
            BoundExpression::Unary { op, operand } => {
                self.write(op.syntax_kind.text().unwrap_or("?"));
                self.write_nested_expression(OperatorPrecedence::Unary, operand, true);
            }
            BoundExpression::Binary { left, op, right } => {
                let precedence = precedence_of(expression);
                self.write_nested_expression(precedence, left, false);
                self.write(" ");
                self.write(op.syntax_kind.text().unwrap_or("?"));
                self.write(" ");
                self.write_nested_expression(precedence, right, true);
            }
            BoundExpression::Call { function, arguments } => {
                self.write(&function.name);
                self.write("(");
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.write_expression(argument);
                }
                self.write(")");
            }
            BoundExpression::Conversion { ty, expression } => {
                self.write(ty.name());
                self.write("(");
                self.write_expression(expression);
                self.write(")");
            }
        }
    }

    /// Operators associate to the left, so an operand at the parent's own
    /// precedence only needs parentheses on the right (`wrap_equal`).
    fn write_nested_expression(&mut self, parent: OperatorPrecedence, expression: &BoundExpression, wrap_equal: bool) {
        let needs_parentheses = match expression {
            BoundExpression::Unary { .. } | BoundExpression::Binary { .. } => {
                let child = precedence_of(expression);
                parent > child || (wrap_equal && parent == child)
            }
            BoundExpression::Assignment { .. } => true,
            _ => false,
        };
        if needs_parentheses {
            self.write("(");
            self.write_expression(expression);
            self.write(")");
        } else {
            self.write_expression(expression);
        }
    }

    fn write_literal(&mut self, value: &Value) {
        match value {
            Value::String(text) => {
                self.write("\"");
                self.write(&text.replace('\\', "\\\\").replace('"', "\\\""));
                self.write("\"");
            }
            other => {
                let text = other.to_string();
                self.write(&text);
            }
        }
    }

    // ========================================================================
    // Output
    // ========================================================================

    fn write(&mut self, text: &str) {
        if self.at_line_start {
            for _ in 0..self.indent {
                self.output.push_str(INDENT);
            }
            self.at_line_start = false;
        }
        let _ = self.output.write_str(text);
    }

    fn line(&mut self) {
        self.output.push('\n');
        self.at_line_start = true;
    }
}

impl Default for BoundTreePrinter {
    fn default() -> Self {
        Self::new()
    }
}

fn precedence_of(expression: &BoundExpression) -> OperatorPrecedence {
    match expression {
        BoundExpression::Unary { .. } => OperatorPrecedence::Unary,
        BoundExpression::Binary { op, .. } => {
            binary_operator_precedence(op.syntax_kind).unwrap_or(OperatorPrecedence::Lowest)
        }
        _ => OperatorPrecedence::Unary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound_tree::BoundLabel;
    use crate::operators::BoundBinaryOperator;
    use crate::symbol::{VariableKind, VariableSymbol};
    use mica_ast::syntax_kind::SyntaxKind;
    use std::sync::Arc;

    fn binary(left: Arc<BoundExpression>, kind: SyntaxKind, right: Arc<BoundExpression>) -> Arc<BoundExpression> {
        let op = BoundBinaryOperator::bind(kind, left.ty(), right.ty()).unwrap();
        Arc::new(BoundExpression::Binary { left, op, right })
    }

    #[test]
    fn test_parenthesizes_by_precedence() {
        let sum = binary(BoundExpression::literal(1), SyntaxKind::PlusToken, BoundExpression::literal(2));
        let product = binary(sum.clone(), SyntaxKind::StarToken, BoundExpression::literal(3));
        assert_eq!(BoundTreePrinter::expression_to_string(&product), "(1 + 2) * 3");
        let product = binary(BoundExpression::literal(3), SyntaxKind::StarToken, BoundExpression::literal(4));
        let sum = binary(BoundExpression::literal(1), SyntaxKind::PlusToken, product);
        assert_eq!(BoundTreePrinter::expression_to_string(&sum), "1 + 3 * 4");
    }

    #[test]
    fn test_left_associative_chain_is_bare() {
        let left = binary(BoundExpression::literal(1), SyntaxKind::PlusToken, BoundExpression::literal(2));
        let chain = binary(left, SyntaxKind::PlusToken, BoundExpression::literal(3));
        assert_eq!(BoundTreePrinter::expression_to_string(&chain), "1 + 2 + 3");

        let right = binary(BoundExpression::literal(2), SyntaxKind::MinusToken, BoundExpression::literal(3));
        let grouped = binary(BoundExpression::literal(1), SyntaxKind::MinusToken, right);
        assert_eq!(BoundTreePrinter::expression_to_string(&grouped), "1 - (2 - 3)");
    }

    #[test]
    fn test_assignment_operand_is_parenthesized() {
        let a = VariableSymbol::new("a", VariableKind::Global, TypeSymbol::Int, false);
        let assignment = Arc::new(BoundExpression::Assignment {
            variable: a.clone(),
            expression: BoundExpression::literal(10),
        });
        let product = binary(assignment, SyntaxKind::StarToken, Arc::new(BoundExpression::Variable(a)));
        assert_eq!(BoundTreePrinter::expression_to_string(&product), "(a = 10) * a");
    }

    #[test]
    fn test_string_literal_is_escaped() {
        let literal = BoundExpression::literal("a \"b\" \\");
        assert_eq!(BoundTreePrinter::expression_to_string(&literal), r#""a \"b\" \\""#);
    }

    #[test]
    fn test_lowered_statements() {
        let x = VariableSymbol::new("x", VariableKind::Global, TypeSymbol::Bool, false);
        let label = BoundLabel::new("end");
        let block = BoundBlockStatement::new(vec![
            Arc::new(BoundStatement::ConditionalGoto {
                label: label.clone(),
                condition: Arc::new(BoundExpression::Variable(x)),
                jump_if_false: true,
            }),
            Arc::new(BoundStatement::Goto(label.clone())),
            Arc::new(BoundStatement::Label(label)),
            Arc::new(BoundStatement::Return(None)),
        ]);
        assert_eq!(
            BoundTreePrinter::statement_to_string(&BoundStatement::Block(block)),
            "{\n    goto end unless x\n    goto end\nend:\n    return\n}\n"
        );
    }
}
