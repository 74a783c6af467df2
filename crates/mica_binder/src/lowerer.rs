//! Lowering of structured control flow.
//!
//! `if`, `while`, `do ... while` and `for` are rewritten in terms of labels,
//! gotos and conditional gotos, then every nested block is flattened into a
//! single statement list. Subtrees the rewrite does not touch are shared
//! with the input rather than copied.

use crate::bound_tree::{BoundBlockStatement, BoundExpression, BoundLabel, BoundStatement};
use crate::operators::BoundBinaryOperator;
use crate::symbol::{TypeSymbol, VariableKind, VariableSymbol};
use mica_ast::syntax_kind::SyntaxKind;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Lowerer {
    label_count: u32,
}

impl Lowerer {
    /// Lower `statement` into one flat block.
    pub fn lower(statement: &Arc<BoundStatement>) -> BoundBlockStatement {
        let mut lowerer = Lowerer::default();
        let rewritten = lowerer.rewrite_statement(statement);
        let lowered = flatten(rewritten);
        tracing::trace!(statements = lowered.statements.len(), "lowered body");
        lowered
    }

    fn generate_label(&mut self) -> BoundLabel {
        self.label_count += 1;
        BoundLabel::new(format!("label{}", self.label_count))
    }

    fn rewrite_statement(&mut self, node: &Arc<BoundStatement>) -> Arc<BoundStatement> {
        match &**node {
            BoundStatement::Block(block) => self.rewrite_block(node, block),
            BoundStatement::If {
                condition,
                then_statement,
                else_statement,
            } => self.lower_if(condition, then_statement, else_statement.as_ref()),
            BoundStatement::While {
                condition,
                body,
                break_label,
                continue_label,
            } => self.lower_while(condition, body, break_label, continue_label),
            BoundStatement::DoWhile {
                body,
                condition,
                break_label,
                continue_label,
            } => self.lower_do_while(body, condition, break_label, continue_label),
            BoundStatement::For {
                variable,
                lower_bound,
                upper_bound,
                body,
                break_label,
                continue_label,
            } => self.lower_for(variable, lower_bound, upper_bound, body, break_label, continue_label),
            BoundStatement::VariableDeclaration { .. }
            | BoundStatement::Label(_)
            | BoundStatement::Goto(_)
            | BoundStatement::ConditionalGoto { .. }
            | BoundStatement::Return(_)
            | BoundStatement::Expression(_) => Arc::clone(node),
        }
    }

    fn rewrite_block(&mut self, node: &Arc<BoundStatement>, block: &BoundBlockStatement) -> Arc<BoundStatement> {
        let mut rewritten: Option<Vec<Arc<BoundStatement>>> = None;
        for (i, statement) in block.statements.iter().enumerate() {
            let new_statement = self.rewrite_statement(statement);
            match rewritten.as_mut() {
                Some(statements) => statements.push(new_statement),
                None if !Arc::ptr_eq(&new_statement, statement) => {
                    let mut statements = Vec::with_capacity(block.statements.len());
                    statements.extend(block.statements[..i].iter().cloned());
                    statements.push(new_statement);
                    rewritten = Some(statements);
                }
                None => {}
            }
        }
        match rewritten {
            Some(statements) => block_statement(statements),
            None => Arc::clone(node),
        }
    }

    // if <condition>
    //     <then>
    //
    // ---->
    //
    // gotoFalse <condition> end
    // <then>
    // end:
    //
    // if <condition>
    //     <then>
    // else
    //     <else>
    //
    // ---->
    //
    // gotoFalse <condition> else
    // <then>
    // goto end
    // else:
    // <else>
    // end:
    fn lower_if(
        &mut self,
        condition: &Arc<BoundExpression>,
        then_statement: &Arc<BoundStatement>,
        else_statement: Option<&Arc<BoundStatement>>,
    ) -> Arc<BoundStatement> {
        let result = match else_statement {
            None => {
                let end_label = self.generate_label();
                block_statement(vec![
                    conditional_goto(&end_label, condition, true),
                    Arc::clone(then_statement),
                    label(&end_label),
                ])
            }
            Some(else_statement) => {
                let else_label = self.generate_label();
                let end_label = self.generate_label();
                block_statement(vec![
                    conditional_goto(&else_label, condition, true),
                    Arc::clone(then_statement),
                    goto(&end_label),
                    label(&else_label),
                    Arc::clone(else_statement),
                    label(&end_label),
                ])
            }
        };
        self.rewrite_statement(&result)
    }

    // while <condition>
    //     <body>
    //
    // ---->
    //
    // goto continue
    // body:
    // <body>
    // continue:
    // gotoTrue <condition> body
    // break:
    fn lower_while(
        &mut self,
        condition: &Arc<BoundExpression>,
        body: &Arc<BoundStatement>,
        break_label: &BoundLabel,
        continue_label: &BoundLabel,
    ) -> Arc<BoundStatement> {
        let body_label = self.generate_label();
        let result = block_statement(vec![
            goto(continue_label),
            label(&body_label),
            Arc::clone(body),
            label(continue_label),
            conditional_goto(&body_label, condition, false),
            label(break_label),
        ]);
        self.rewrite_statement(&result)
    }

    // do
    //     <body>
    // while <condition>
    //
    // ---->
    //
    // body:
    // <body>
    // continue:
    // gotoTrue <condition> body
    // break:
    fn lower_do_while(
        &mut self,
        body: &Arc<BoundStatement>,
        condition: &Arc<BoundExpression>,
        break_label: &BoundLabel,
        continue_label: &BoundLabel,
    ) -> Arc<BoundStatement> {
        let body_label = self.generate_label();
        let result = block_statement(vec![
            label(&body_label),
            Arc::clone(body),
            label(continue_label),
            conditional_goto(&body_label, condition, false),
            label(break_label),
        ]);
        self.rewrite_statement(&result)
    }

    // for <var> = <lower> to <upper>
    //     <body>
    //
    // ---->
    //
    // {
    //     var <var> = <lower>
    //     let upperBound = <upper>
    //     while (<var> <= upperBound)
    //     {
    //         <body>
    //         continue:
    //         <var> = <var> + 1
    //     }
    // }
    fn lower_for(
        &mut self,
        variable: &Arc<VariableSymbol>,
        lower_bound: &Arc<BoundExpression>,
        upper_bound: &Arc<BoundExpression>,
        body: &Arc<BoundStatement>,
        break_label: &BoundLabel,
        continue_label: &BoundLabel,
    ) -> Arc<BoundStatement> {
        let upper_kind = match variable.kind {
            VariableKind::Global => VariableKind::Global,
            VariableKind::Local | VariableKind::Parameter => VariableKind::Local,
        };
        let upper_bound_symbol = VariableSymbol::new("upperBound", upper_kind, TypeSymbol::Int, true);

        let variable_declaration = Arc::new(BoundStatement::VariableDeclaration {
            variable: Arc::clone(variable),
            initializer: Arc::clone(lower_bound),
        });
        let upper_bound_declaration = Arc::new(BoundStatement::VariableDeclaration {
            variable: Arc::clone(&upper_bound_symbol),
            initializer: Arc::clone(upper_bound),
        });
        let condition = Arc::new(BoundExpression::Binary {
            left: Arc::new(BoundExpression::Variable(Arc::clone(variable))),
            op: int_operator(SyntaxKind::LessOrEqualsToken),
            right: Arc::new(BoundExpression::Variable(upper_bound_symbol)),
        });
        let increment = Arc::new(BoundStatement::Expression(Arc::new(BoundExpression::Assignment {
            variable: Arc::clone(variable),
            expression: Arc::new(BoundExpression::Binary {
                left: Arc::new(BoundExpression::Variable(Arc::clone(variable))),
                op: int_operator(SyntaxKind::PlusToken),
                right: BoundExpression::literal(1),
            }),
        })));
        let while_body = block_statement(vec![Arc::clone(body), label(continue_label), increment]);
        let while_statement = Arc::new(BoundStatement::While {
            condition,
            body: while_body,
            break_label: break_label.clone(),
            continue_label: self.generate_label(),
        });
        let result = block_statement(vec![variable_declaration, upper_bound_declaration, while_statement]);
        self.rewrite_statement(&result)
    }
}

/// Pop nested blocks off a stack until only non-block statements remain, in
/// their original order.
fn flatten(statement: Arc<BoundStatement>) -> BoundBlockStatement {
    let mut statements = Vec::new();
    let mut stack = vec![statement];
    while let Some(current) = stack.pop() {
        match &*current {
            BoundStatement::Block(block) => stack.extend(block.statements.iter().rev().cloned()),
            _ => statements.push(current),
        }
    }
    BoundBlockStatement::new(statements)
}

fn int_operator(kind: SyntaxKind) -> &'static BoundBinaryOperator {
    match BoundBinaryOperator::bind(kind, TypeSymbol::Int, TypeSymbol::Int) {
        Some(op) => op,
        None => unreachable!("int operator {kind:?} missing from the operator table"),
    }
}

fn block_statement(statements: Vec<Arc<BoundStatement>>) -> Arc<BoundStatement> {
    Arc::new(BoundStatement::Block(BoundBlockStatement::new(statements)))
}

fn label(label: &BoundLabel) -> Arc<BoundStatement> {
    Arc::new(BoundStatement::Label(label.clone()))
}

fn goto(label: &BoundLabel) -> Arc<BoundStatement> {
    Arc::new(BoundStatement::Goto(label.clone()))
}

fn conditional_goto(label: &BoundLabel, condition: &Arc<BoundExpression>, jump_if_false: bool) -> Arc<BoundStatement> {
    Arc::new(BoundStatement::ConditionalGoto {
        label: label.clone(),
        condition: Arc::clone(condition),
        jump_if_false,
    })
}
