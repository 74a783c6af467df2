//! The binder implementation.
//!
//! Walks the syntax tree and produces a typed bound tree. Handles:
//! - Name resolution through a chain of scopes (block, function, global,
//!   replayed previous submissions, builtins)
//! - Operator resolution and conversion checks
//! - `let`/`var` declarations, read-only enforcement
//! - Function declarations, parameters and `return` checking
//! - `break`/`continue` targets for loops
//!
//! Binding never stops at the first problem. Each one is reported as a
//! diagnostic and the offending expression binds to an error node whose
//! type suppresses follow-up reports.

use crate::bound_tree::{BoundBlockStatement, BoundExpression, BoundLabel, BoundStatement};
use crate::control_flow::ControlFlowGraph;
use crate::conversion::Conversion;
use crate::lowerer::Lowerer;
use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};
use crate::scope::{ScopeArena, ScopeId};
use crate::symbol::{FunctionSymbol, TypeSymbol, VariableKind, VariableSymbol};
use crate::value::Value;
use indexmap::IndexMap;
use mica_ast::node::*;
use mica_ast::syntax_kind::SyntaxKind;
use mica_core::text::TextSpan;
use mica_diagnostics::messages;
use mica_diagnostics::DiagnosticCollection;
use rustc_hash::FxHashSet;
use std::sync::Arc;

// ============================================================================
// Binding results
// ============================================================================

/// A function declared by a submission, paired with its syntax.
#[derive(Debug, Clone)]
pub struct BoundFunctionDeclaration<'a> {
    pub symbol: Arc<FunctionSymbol>,
    pub syntax: &'a FunctionDeclaration<'a>,
}

/// The declarations and top-level statements of one submission, linked to
/// the global scope of the submission before it.
#[derive(Debug)]
pub struct BoundGlobalScope<'a> {
    pub previous: Option<Arc<BoundGlobalScope<'a>>>,
    pub diagnostics: DiagnosticCollection,
    pub functions: Vec<BoundFunctionDeclaration<'a>>,
    pub variables: Vec<Arc<VariableSymbol>>,
    pub statements: Vec<Arc<BoundStatement>>,
}

impl<'a> BoundGlobalScope<'a> {
    pub fn function_symbols(&self) -> impl Iterator<Item = &Arc<FunctionSymbol>> {
        self.functions.iter().map(|f| &f.symbol)
    }
}

/// Lowered bodies for every function visible to a submission, plus the
/// lowered top-level statements.
#[derive(Debug, Default)]
pub struct BoundProgram {
    /// Diagnostics found while binding function bodies.
    pub diagnostics: DiagnosticCollection,
    pub functions: IndexMap<Arc<FunctionSymbol>, BoundBlockStatement>,
    pub statement: BoundBlockStatement,
}

// ============================================================================
// Binder
// ============================================================================

pub struct Binder<'a> {
    scopes: ScopeArena,
    scope: ScopeId,
    /// The function whose body is being bound, if any.
    function: Option<Arc<FunctionSymbol>>,
    /// (break, continue) targets of the enclosing loops, innermost last.
    loop_stack: Vec<(BoundLabel, BoundLabel)>,
    label_counter: u32,
    declarations: Vec<BoundFunctionDeclaration<'a>>,
    diagnostics: DiagnosticCollection,
}

impl<'a> Binder<'a> {
    fn new(previous: Option<&BoundGlobalScope<'a>>, function: Option<Arc<FunctionSymbol>>) -> Self {
        let mut scopes = ScopeArena::new();
        let parent = create_parent_scope(&mut scopes, previous);
        let scope = scopes.push(parent);
        if let Some(function) = &function {
            for parameter in &function.parameters {
                scopes.declare_variable(scope, Arc::clone(parameter));
            }
        }
        Self {
            scopes,
            scope,
            function,
            loop_stack: Vec::new(),
            label_counter: 0,
            declarations: Vec::new(),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Bind the declarations and top-level statements of `unit`, on top of
    /// everything `previous` and its ancestors declared.
    pub fn bind_global_scope(
        previous: Option<Arc<BoundGlobalScope<'a>>>,
        unit: &'a CompilationUnit<'a>,
    ) -> BoundGlobalScope<'a> {
        let mut binder = Binder::new(previous.as_deref(), None);

        for member in unit.members {
            if let Member::FunctionDeclaration(function) = member {
                binder.bind_function_declaration(function);
            }
        }

        let mut statements = Vec::new();
        for member in unit.members {
            if let Member::GlobalStatement(statement) = member {
                statements.push(binder.bind_statement(statement));
            }
        }

        let variables = binder.scopes.declared_variables(binder.scope);
        let mut diagnostics = DiagnosticCollection::new();
        if let Some(previous) = &previous {
            diagnostics.extend_from_slice(previous.diagnostics.diagnostics());
        }
        diagnostics.extend(binder.take_diagnostics());

        tracing::debug!(
            functions = binder.declarations.len(),
            variables = variables.len(),
            statements = statements.len(),
            diagnostics = diagnostics.len(),
            "bound global scope"
        );

        BoundGlobalScope {
            previous,
            diagnostics,
            functions: binder.declarations,
            variables,
            statements,
        }
    }

    /// Bind and lower every function body reachable from `global_scope`,
    /// and lower its top-level statements.
    pub fn bind_program(global_scope: &Arc<BoundGlobalScope<'a>>) -> BoundProgram {
        let mut program = BoundProgram::default();

        let mut current = Some(global_scope);
        while let Some(scope) = current {
            for declaration in &scope.functions {
                let function = &declaration.symbol;
                let mut binder = Binder::new(Some(global_scope.as_ref()), Some(Arc::clone(function)));
                let body = binder.bind_block_statement(declaration.syntax.body);
                let lowered = Lowerer::lower(&Arc::new(BoundStatement::Block(body)));

                if function.return_type != TypeSymbol::Void && !ControlFlowGraph::all_paths_return(&lowered) {
                    binder.report(
                        declaration.syntax.identifier.span,
                        &messages::NOT_ALL_PATHS_RETURN_A_VALUE,
                        &[],
                    );
                }

                tracing::debug!(function = %function.name, statements = lowered.statements.len(), "bound function body");
                program.functions.insert(Arc::clone(function), lowered);
                program.diagnostics.extend(binder.take_diagnostics());
            }
            current = scope.previous.as_ref();
        }

        let statements = Arc::new(BoundStatement::Block(BoundBlockStatement::new(
            global_scope.statements.clone(),
        )));
        program.statement = Lowerer::lower(&statements);
        program
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    fn report(&mut self, span: TextSpan, message: &mica_diagnostics::DiagnosticMessage, args: &[&str]) {
        self.diagnostics.report(span, message, args);
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn bind_function_declaration(&mut self, syntax: &'a FunctionDeclaration<'a>) {
        let mut parameters = Vec::new();
        let mut seen = FxHashSet::default();
        for parameter in syntax.parameters {
            let name = parameter.identifier.text;
            let ty = self.bind_type_clause(Some(&parameter.type_clause)).unwrap_or(TypeSymbol::Error);
            if !seen.insert(name) {
                self.report(parameter.span(), &messages::PARAMETER_0_DECLARED_MULTIPLE_TIMES, &[name]);
            } else {
                parameters.push(VariableSymbol::new(name, VariableKind::Parameter, ty, true));
            }
        }

        let return_type = self.bind_type_clause(syntax.type_clause.as_ref()).unwrap_or(TypeSymbol::Void);
        let function = FunctionSymbol::new(syntax.identifier.text, parameters, return_type);

        if syntax.identifier.is_missing() {
            return;
        }
        if self.scopes.declare_function(self.scope, Arc::clone(&function)) {
            self.declarations.push(BoundFunctionDeclaration { symbol: function, syntax });
        } else {
            self.report(
                syntax.identifier.span,
                &messages::FUNCTION_0_ALREADY_DECLARED,
                &[syntax.identifier.text],
            );
        }
    }

    /// Resolve an optional type clause. Unknown names are reported and
    /// resolve to `None`.
    fn bind_type_clause(&mut self, syntax: Option<&TypeClause<'_>>) -> Option<TypeSymbol> {
        let syntax = syntax?;
        if syntax.identifier.is_missing() {
            return None;
        }
        let ty = TypeSymbol::lookup(syntax.identifier.text);
        if ty.is_none() {
            self.report(
                syntax.identifier.span,
                &messages::TYPE_0_DOES_NOT_EXIST,
                &[syntax.identifier.text],
            );
        }
        ty
    }

    fn bind_variable(&mut self, identifier: &SyntaxToken<'_>, is_read_only: bool, ty: TypeSymbol) -> Arc<VariableSymbol> {
        let name = if identifier.is_missing() { "?" } else { identifier.text };
        let kind = if self.function.is_some() {
            VariableKind::Local
        } else {
            VariableKind::Global
        };
        let variable = VariableSymbol::new(name, kind, ty, is_read_only);
        if !identifier.is_missing() && !self.scopes.declare_variable(self.scope, Arc::clone(&variable)) {
            self.report(identifier.span, &messages::VARIABLE_0_ALREADY_DECLARED, &[name]);
        }
        variable
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn bind_statement(&mut self, syntax: &Statement<'_>) -> Arc<BoundStatement> {
        let statement = match syntax {
            Statement::Block(block) => BoundStatement::Block(self.bind_block_statement(block)),
            Statement::VariableDeclaration(declaration) => self.bind_variable_declaration(declaration),
            Statement::If(statement) => self.bind_if_statement(statement),
            Statement::While(statement) => self.bind_while_statement(statement),
            Statement::DoWhile(statement) => self.bind_do_while_statement(statement),
            Statement::For(statement) => self.bind_for_statement(statement),
            Statement::Break(statement) => self.bind_jump(&statement.keyword, |(break_label, _)| break_label),
            Statement::Continue(statement) => {
                self.bind_jump(&statement.keyword, |(_, continue_label)| continue_label)
            }
            Statement::Return(statement) => self.bind_return_statement(statement),
            Statement::Expression(statement) => {
                BoundStatement::Expression(self.bind_expression(statement.expression, true))
            }
        };
        Arc::new(statement)
    }

    fn bind_block_statement(&mut self, syntax: &BlockStatement<'_>) -> BoundBlockStatement {
        let parent = self.scope;
        self.scope = self.scopes.push(parent);
        let statements = syntax.statements.iter().map(|s| self.bind_statement(s)).collect();
        self.scope = parent;
        BoundBlockStatement::new(statements)
    }

    fn bind_variable_declaration(&mut self, syntax: &VariableDeclaration<'_>) -> BoundStatement {
        let is_read_only = syntax.keyword.kind == SyntaxKind::LetKeyword;
        let declared_type = self.bind_type_clause(syntax.type_clause.as_ref());
        let initializer = self.bind_expression(syntax.initializer, false);
        let variable_type = declared_type.unwrap_or_else(|| initializer.ty());
        let variable = self.bind_variable(&syntax.identifier, is_read_only, variable_type);
        let initializer = self.bind_conversion(syntax.initializer.span(), initializer, variable_type, false);
        BoundStatement::VariableDeclaration { variable, initializer }
    }

    fn bind_if_statement(&mut self, syntax: &IfStatement<'_>) -> BoundStatement {
        let condition = self.bind_expression_to(syntax.condition, TypeSymbol::Bool);
        let then_statement = self.bind_statement(syntax.then_statement);
        let else_statement = syntax.else_clause.as_ref().map(|clause| self.bind_statement(clause.statement));
        BoundStatement::If {
            condition,
            then_statement,
            else_statement,
        }
    }

    fn bind_while_statement(&mut self, syntax: &WhileStatement<'_>) -> BoundStatement {
        let condition = self.bind_expression_to(syntax.condition, TypeSymbol::Bool);
        let (body, break_label, continue_label) = self.bind_loop_body(syntax.body);
        BoundStatement::While {
            condition,
            body,
            break_label,
            continue_label,
        }
    }

    fn bind_do_while_statement(&mut self, syntax: &DoWhileStatement<'_>) -> BoundStatement {
        let (body, break_label, continue_label) = self.bind_loop_body(syntax.body);
        let condition = self.bind_expression_to(syntax.condition, TypeSymbol::Bool);
        BoundStatement::DoWhile {
            body,
            condition,
            break_label,
            continue_label,
        }
    }

    fn bind_for_statement(&mut self, syntax: &ForStatement<'_>) -> BoundStatement {
        let lower_bound = self.bind_expression_to(syntax.lower_bound, TypeSymbol::Int);
        let upper_bound = self.bind_expression_to(syntax.upper_bound, TypeSymbol::Int);

        let parent = self.scope;
        self.scope = self.scopes.push(parent);
        let variable = self.bind_variable(&syntax.identifier, true, TypeSymbol::Int);
        let (body, break_label, continue_label) = self.bind_loop_body(syntax.body);
        self.scope = parent;

        BoundStatement::For {
            variable,
            lower_bound,
            upper_bound,
            body,
            break_label,
            continue_label,
        }
    }

    fn bind_loop_body(&mut self, body: &Statement<'_>) -> (Arc<BoundStatement>, BoundLabel, BoundLabel) {
        self.label_counter += 1;
        let break_label = BoundLabel::new(format!("break{}", self.label_counter));
        let continue_label = BoundLabel::new(format!("continue{}", self.label_counter));

        self.loop_stack.push((break_label.clone(), continue_label.clone()));
        let body = self.bind_statement(body);
        self.loop_stack.pop();

        (body, break_label, continue_label)
    }

    /// `break` or `continue`: a goto to the innermost loop's matching label.
    fn bind_jump(
        &mut self,
        keyword: &SyntaxToken<'_>,
        select: impl FnOnce(&(BoundLabel, BoundLabel)) -> &BoundLabel,
    ) -> BoundStatement {
        match self.loop_stack.last() {
            Some(labels) => BoundStatement::Goto(select(labels).clone()),
            None => {
                self.report(keyword.span, &messages::THE_KEYWORD_0_CAN_ONLY_BE_USED_IN_LOOPS, &[keyword.text]);
                BoundStatement::Expression(Arc::new(BoundExpression::Error))
            }
        }
    }

    fn bind_return_statement(&mut self, syntax: &ReturnStatement<'_>) -> BoundStatement {
        let mut expression = syntax.expression.map(|e| self.bind_expression(e, false));

        match self.function.as_ref().map(|f| (f.name.clone(), f.return_type)) {
            None => {
                self.report(
                    syntax.return_keyword.span,
                    &messages::RETURN_KEYWORD_IS_INVALID_OUTSIDE_METHODS,
                    &[],
                );
            }
            Some((name, TypeSymbol::Void)) => {
                if let Some(value) = syntax.expression {
                    self.report(value.span(), &messages::METHOD_0_IS_VOID_AND_CANNOT_RETURN_VALUE, &[name.as_str()]);
                }
            }
            Some((_, return_type)) => match (syntax.expression, expression.take()) {
                (Some(value), Some(bound)) => {
                    expression = Some(self.bind_conversion(value.span(), bound, return_type, false));
                }
                _ => {
                    self.report(
                        syntax.return_keyword.span,
                        &messages::MISSING_0_RETURN_VALUE,
                        &[return_type.name()],
                    );
                }
            },
        }

        BoundStatement::Return(expression)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Bind an expression. Unless `can_be_void`, a void result is reported
    /// and replaced by an error node.
    fn bind_expression(&mut self, syntax: &Expression<'_>, can_be_void: bool) -> Arc<BoundExpression> {
        let result = self.bind_expression_internal(syntax);
        if !can_be_void && result.ty() == TypeSymbol::Void {
            self.report(syntax.span(), &messages::EXPRESSION_MUST_HAVE_A_VALUE, &[]);
            return Arc::new(BoundExpression::Error);
        }
        result
    }

    /// Bind an expression and convert it to `target`, allowing only
    /// conversions that need no explicit syntax.
    fn bind_expression_to(&mut self, syntax: &Expression<'_>, target: TypeSymbol) -> Arc<BoundExpression> {
        let expression = self.bind_expression(syntax, false);
        self.bind_conversion(syntax.span(), expression, target, false)
    }

    fn bind_expression_internal(&mut self, syntax: &Expression<'_>) -> Arc<BoundExpression> {
        match syntax {
            Expression::Literal(literal) => Arc::new(BoundExpression::Literal(match literal.value {
                LiteralValue::Int(value) => Value::Int(value),
                LiteralValue::Bool(value) => Value::Bool(value),
                LiteralValue::String(value) => Value::String(value.to_string()),
            })),
            Expression::Name(name) => self.bind_name_expression(name),
            Expression::Unary(unary) => self.bind_unary_expression(unary),
            Expression::Binary(binary) => self.bind_binary_expression(binary),
            Expression::Parenthesized(parenthesized) => self.bind_expression(parenthesized.expression, false),
            Expression::Assignment(assignment) => self.bind_assignment_expression(assignment),
            Expression::Call(call) => self.bind_call_expression(call),
        }
    }

    fn bind_name_expression(&mut self, syntax: &NameExpression<'_>) -> Arc<BoundExpression> {
        let identifier = &syntax.identifier;
        if identifier.is_missing() {
            // The parser already reported the missing token.
            return Arc::new(BoundExpression::Error);
        }
        match self.scopes.lookup_variable(self.scope, identifier.text) {
            Some(variable) => Arc::new(BoundExpression::Variable(Arc::clone(variable))),
            None => {
                self.report(identifier.span, &messages::VARIABLE_0_DOES_NOT_EXIST, &[identifier.text]);
                Arc::new(BoundExpression::Error)
            }
        }
    }

    fn bind_assignment_expression(&mut self, syntax: &AssignmentExpression<'_>) -> Arc<BoundExpression> {
        let name = syntax.identifier.text;
        let expression = self.bind_expression(syntax.expression, false);

        let Some(variable) = self.scopes.lookup_variable(self.scope, name).cloned() else {
            self.report(syntax.identifier.span, &messages::VARIABLE_0_DOES_NOT_EXIST, &[name]);
            return expression;
        };

        if variable.is_read_only {
            self.report(syntax.equals_token.span, &messages::VARIABLE_0_IS_READ_ONLY, &[name]);
        }

        let expression = self.bind_conversion(syntax.expression.span(), expression, variable.ty, false);
        Arc::new(BoundExpression::Assignment { variable, expression })
    }

    fn bind_unary_expression(&mut self, syntax: &UnaryExpression<'_>) -> Arc<BoundExpression> {
        let operand = self.bind_expression(syntax.operand, false);
        if operand.ty() == TypeSymbol::Error {
            return Arc::new(BoundExpression::Error);
        }
        match BoundUnaryOperator::bind(syntax.operator_token.kind, operand.ty()) {
            Some(op) => Arc::new(BoundExpression::Unary { op, operand }),
            None => {
                self.report(
                    syntax.operator_token.span,
                    &messages::UNARY_OPERATOR_0_IS_NOT_DEFINED_FOR_TYPE_1,
                    &[syntax.operator_token.text, operand.ty().name()],
                );
                Arc::new(BoundExpression::Error)
            }
        }
    }

    fn bind_binary_expression(&mut self, syntax: &BinaryExpression<'_>) -> Arc<BoundExpression> {
        let left = self.bind_expression(syntax.left, false);
        let right = self.bind_expression(syntax.right, false);
        if left.ty() == TypeSymbol::Error || right.ty() == TypeSymbol::Error {
            return Arc::new(BoundExpression::Error);
        }
        match BoundBinaryOperator::bind(syntax.operator_token.kind, left.ty(), right.ty()) {
            Some(op) => Arc::new(BoundExpression::Binary { left, op, right }),
            None => {
                self.report(
                    syntax.operator_token.span,
                    &messages::BINARY_OPERATOR_0_IS_NOT_DEFINED_FOR_TYPES_1_AND_2,
                    &[syntax.operator_token.text, left.ty().name(), right.ty().name()],
                );
                Arc::new(BoundExpression::Error)
            }
        }
    }

    fn bind_call_expression(&mut self, syntax: &CallExpression<'_>) -> Arc<BoundExpression> {
        let name = syntax.identifier.text;

        if let ([argument], Some(ty)) = (syntax.arguments, TypeSymbol::lookup(name)) {
            let expression = self.bind_expression(argument, false);
            return self.bind_conversion(argument.span(), expression, ty, true);
        }

        let arguments: Vec<Arc<BoundExpression>> =
            syntax.arguments.iter().map(|a| self.bind_expression(a, false)).collect();

        let Some(function) = self.scopes.lookup_function(self.scope, name).cloned() else {
            self.report(syntax.identifier.span, &messages::UNDEFINED_FUNCTION_0, &[name]);
            return Arc::new(BoundExpression::Error);
        };

        if arguments.len() != function.parameters.len() {
            self.report(
                syntax.span(),
                &messages::FUNCTION_0_REQUIRES_1_ARGUMENTS_BUT_WAS_GIVEN_2,
                &[name, &function.parameters.len().to_string(), &arguments.len().to_string()],
            );
            return Arc::new(BoundExpression::Error);
        }

        let mut has_mismatch = false;
        for ((argument, parameter), syntax_argument) in
            arguments.iter().zip(&function.parameters).zip(syntax.arguments)
        {
            if argument.ty() == parameter.ty {
                continue;
            }
            has_mismatch = true;
            if argument.ty() != TypeSymbol::Error {
                self.report(
                    syntax_argument.span(),
                    &messages::FUNCTION_0_REQUIRES_ARGUMENT_1_TO_BE_OF_TYPE_2_BUT_RECEIVED_3,
                    &[name, &parameter.name, parameter.ty.name(), argument.ty().name()],
                );
            }
        }
        if has_mismatch {
            return Arc::new(BoundExpression::Error);
        }

        Arc::new(BoundExpression::Call { function, arguments })
    }

    /// Convert `expression` to `ty`. Explicit conversions are reported
    /// unless `allow_explicit`, but still bound.
    fn bind_conversion(
        &mut self,
        span: TextSpan,
        expression: Arc<BoundExpression>,
        ty: TypeSymbol,
        allow_explicit: bool,
    ) -> Arc<BoundExpression> {
        let conversion = Conversion::classify(expression.ty(), ty);

        if !conversion.exists() {
            if expression.ty() != TypeSymbol::Error && ty != TypeSymbol::Error {
                self.report(
                    span,
                    &messages::CANNOT_CONVERT_TYPE_0_TO_1,
                    &[expression.ty().name(), ty.name()],
                );
            }
            return Arc::new(BoundExpression::Error);
        }

        if !allow_explicit && conversion.is_explicit() {
            self.report(
                span,
                &messages::CANNOT_CONVERT_TYPE_0_TO_1,
                &[expression.ty().name(), ty.name()],
            );
        }

        if conversion.is_identity() {
            return expression;
        }
        Arc::new(BoundExpression::Conversion { ty, expression })
    }
}

/// Rebuild the scopes of every previous submission, oldest outermost, on top
/// of the builtin root. Returns the innermost rebuilt scope.
fn create_parent_scope(scopes: &mut ScopeArena, previous: Option<&BoundGlobalScope<'_>>) -> ScopeId {
    let mut chain = Vec::new();
    let mut current = previous;
    while let Some(scope) = current {
        chain.push(scope);
        current = scope.previous.as_deref();
    }

    let mut parent = scopes.root();
    for previous in chain.into_iter().rev() {
        let scope = scopes.push(parent);
        for function in previous.function_symbols() {
            scopes.declare_function(scope, Arc::clone(function));
        }
        for variable in &previous.variables {
            scopes.declare_variable(scope, Arc::clone(variable));
        }
        parent = scope;
    }
    parent
}
