//! The mica parser implementation.
//!
//! A recursive descent parser over the full token list of a source text.
//! Every production returns a node even when tokens are missing: the parser
//! reports the problem, synthesizes an empty token and keeps going.

use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;
use mica_ast::node::*;
use mica_ast::precedence::{binary_operator_precedence, unary_operator_precedence, OperatorPrecedence};
use mica_ast::syntax_kind::SyntaxKind;
use mica_diagnostics::{messages, DiagnosticCollection};
use mica_scanner::{Scanner, TokenInfo, TokenValue};

/// The parser produces a `CompilationUnit` from mica source text.
pub struct Parser<'a> {
    arena: &'a Bump,
    /// Tokens of the whole text; bad tokens are dropped, the last one is end-of-file.
    tokens: Vec<TokenInfo<'a>>,
    position: usize,
    diagnostics: DiagnosticCollection,
}

impl<'a> Parser<'a> {
    /// Create a parser over text that already lives in `arena`.
    pub fn new(arena: &'a Bump, text: &'a str) -> Self {
        let mut scanner = Scanner::new(text);
        let mut tokens = Vec::new();
        loop {
            let kind = scanner.scan();
            if kind != SyntaxKind::BadToken {
                tokens.push(scanner.token_info());
            }
            if kind == SyntaxKind::EndOfFileToken {
                break;
            }
        }
        Self {
            arena,
            tokens,
            position: 0,
            diagnostics: scanner.take_diagnostics(),
        }
    }

    pub fn parse_compilation_unit(&mut self) -> &'a CompilationUnit<'a> {
        let members = self.parse_members();
        let end_of_file_token = self.match_token(SyntaxKind::EndOfFileToken);
        self.arena.alloc(CompilationUnit {
            members,
            end_of_file_token,
        })
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    // ========================================================================
    // Token management
    // ========================================================================

    fn peek(&self, offset: usize) -> &TokenInfo<'a> {
        let index = (self.position + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    #[inline]
    fn current(&self) -> &TokenInfo<'a> {
        self.peek(0)
    }

    #[inline]
    fn current_kind(&self) -> SyntaxKind {
        self.current().kind
    }

    fn next_token(&mut self) -> SyntaxToken<'a> {
        let token = self.to_syntax_token(self.current().clone());
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    fn match_token(&mut self, kind: SyntaxKind) -> SyntaxToken<'a> {
        if self.current_kind() == kind {
            return self.next_token();
        }
        let current = self.current();
        let (span, actual) = (current.span, current.kind.to_string());
        self.diagnostics.report(
            span,
            &messages::UNEXPECTED_TOKEN_0_EXPECTED_1,
            &[&actual, &kind.to_string()],
        );
        SyntaxToken::missing(kind, span.start)
    }

    fn to_syntax_token(&self, info: TokenInfo<'a>) -> SyntaxToken<'a> {
        let value = match info.value {
            Some(TokenValue::Int(value)) => Some(LiteralValue::Int(value)),
            Some(TokenValue::String(value)) => Some(LiteralValue::String(self.arena.alloc_str(&value))),
            None => None,
        };
        SyntaxToken {
            kind: info.kind,
            span: info.span,
            text: info.text,
            value,
        }
    }

    // ========================================================================
    // Members
    // ========================================================================

    fn parse_members(&mut self) -> NodeList<'a, Member<'a>> {
        let mut members = BumpVec::new_in(self.arena);
        while self.current_kind() != SyntaxKind::EndOfFileToken {
            let start = self.position;
            members.push(self.parse_member());
            // Skip a token the member could not consume so the loop makes progress.
            if self.position == start {
                self.next_token();
            }
        }
        members.into_bump_slice()
    }

    fn parse_member(&mut self) -> Member<'a> {
        if self.current_kind() == SyntaxKind::FunctionKeyword {
            Member::FunctionDeclaration(self.parse_function_declaration())
        } else {
            Member::GlobalStatement(self.parse_statement())
        }
    }

    fn parse_function_declaration(&mut self) -> FunctionDeclaration<'a> {
        let function_keyword = self.match_token(SyntaxKind::FunctionKeyword);
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        let open_parenthesis_token = self.match_token(SyntaxKind::OpenParenthesisToken);
        let parameters = self.parse_parameter_list();
        let close_parenthesis_token = self.match_token(SyntaxKind::CloseParenthesisToken);
        let type_clause = self.parse_optional_type_clause();
        let body = self.parse_block_statement();
        FunctionDeclaration {
            function_keyword,
            identifier,
            open_parenthesis_token,
            parameters,
            close_parenthesis_token,
            type_clause,
            body: self.arena.alloc(body),
        }
    }

    fn parse_parameter_list(&mut self) -> NodeList<'a, Parameter<'a>> {
        let mut parameters = BumpVec::new_in(self.arena);
        while !matches!(
            self.current_kind(),
            SyntaxKind::CloseParenthesisToken | SyntaxKind::EndOfFileToken
        ) {
            let identifier = self.match_token(SyntaxKind::IdentifierToken);
            let type_clause = self.parse_type_clause();
            parameters.push(Parameter {
                identifier,
                type_clause,
            });
            if self.current_kind() != SyntaxKind::CommaToken {
                break;
            }
            self.next_token();
        }
        parameters.into_bump_slice()
    }

    fn parse_optional_type_clause(&mut self) -> Option<TypeClause<'a>> {
        if self.current_kind() == SyntaxKind::ColonToken {
            Some(self.parse_type_clause())
        } else {
            None
        }
    }

    fn parse_type_clause(&mut self) -> TypeClause<'a> {
        let colon_token = self.match_token(SyntaxKind::ColonToken);
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        TypeClause {
            colon_token,
            identifier,
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_statement(&mut self) -> Statement<'a> {
        match self.current_kind() {
            SyntaxKind::OpenBraceToken => Statement::Block(self.parse_block_statement()),
            SyntaxKind::LetKeyword | SyntaxKind::VarKeyword => self.parse_variable_declaration(),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::DoKeyword => self.parse_do_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::BreakKeyword => Statement::Break(BreakStatement {
                keyword: self.next_token(),
            }),
            SyntaxKind::ContinueKeyword => Statement::Continue(ContinueStatement {
                keyword: self.next_token(),
            }),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            _ => Statement::Expression(ExpressionStatement {
                expression: self.parse_expression(),
            }),
        }
    }

    fn parse_statement_ref(&mut self) -> &'a Statement<'a> {
        let statement = self.parse_statement();
        self.arena.alloc(statement)
    }

    fn parse_block_statement(&mut self) -> BlockStatement<'a> {
        let open_brace_token = self.match_token(SyntaxKind::OpenBraceToken);
        let mut statements = BumpVec::new_in(self.arena);
        while !matches!(
            self.current_kind(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let start = self.position;
            statements.push(self.parse_statement());
            if self.position == start {
                self.next_token();
            }
        }
        let close_brace_token = self.match_token(SyntaxKind::CloseBraceToken);
        BlockStatement {
            open_brace_token,
            statements: statements.into_bump_slice(),
            close_brace_token,
        }
    }

    fn parse_variable_declaration(&mut self) -> Statement<'a> {
        let expected = if self.current_kind() == SyntaxKind::LetKeyword {
            SyntaxKind::LetKeyword
        } else {
            SyntaxKind::VarKeyword
        };
        let keyword = self.match_token(expected);
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        let type_clause = self.parse_optional_type_clause();
        let equals_token = self.match_token(SyntaxKind::EqualsToken);
        let initializer = self.parse_expression();
        Statement::VariableDeclaration(VariableDeclaration {
            keyword,
            identifier,
            type_clause,
            equals_token,
            initializer,
        })
    }

    fn parse_if_statement(&mut self) -> Statement<'a> {
        let if_keyword = self.match_token(SyntaxKind::IfKeyword);
        let condition = self.parse_expression();
        let then_statement = self.parse_statement_ref();
        let else_clause = if self.current_kind() == SyntaxKind::ElseKeyword {
            let else_keyword = self.next_token();
            let statement = self.parse_statement_ref();
            Some(ElseClause {
                else_keyword,
                statement,
            })
        } else {
            None
        };
        Statement::If(IfStatement {
            if_keyword,
            condition,
            then_statement,
            else_clause,
        })
    }

    fn parse_while_statement(&mut self) -> Statement<'a> {
        let while_keyword = self.match_token(SyntaxKind::WhileKeyword);
        let condition = self.parse_expression();
        let body = self.parse_statement_ref();
        Statement::While(WhileStatement {
            while_keyword,
            condition,
            body,
        })
    }

    fn parse_do_while_statement(&mut self) -> Statement<'a> {
        let do_keyword = self.match_token(SyntaxKind::DoKeyword);
        let body = self.parse_statement_ref();
        let while_keyword = self.match_token(SyntaxKind::WhileKeyword);
        let condition = self.parse_expression();
        Statement::DoWhile(DoWhileStatement {
            do_keyword,
            body,
            while_keyword,
            condition,
        })
    }

    fn parse_for_statement(&mut self) -> Statement<'a> {
        let for_keyword = self.match_token(SyntaxKind::ForKeyword);
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        let equals_token = self.match_token(SyntaxKind::EqualsToken);
        let lower_bound = self.parse_expression();
        let to_keyword = self.match_token(SyntaxKind::ToKeyword);
        let upper_bound = self.parse_expression();
        let body = self.parse_statement_ref();
        Statement::For(ForStatement {
            for_keyword,
            identifier,
            equals_token,
            lower_bound,
            to_keyword,
            upper_bound,
            body,
        })
    }

    fn parse_return_statement(&mut self) -> Statement<'a> {
        let return_keyword = self.match_token(SyntaxKind::ReturnKeyword);
        // A value only counts when it starts on the same line as `return`.
        let current = self.current();
        let has_expression = !current.preceding_line_break
            && !matches!(
                current.kind,
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
            );
        let expression = if has_expression {
            Some(self.parse_expression())
        } else {
            None
        };
        Statement::Return(ReturnStatement {
            return_keyword,
            expression,
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expression(&mut self) -> &'a Expression<'a> {
        self.parse_assignment_expression()
    }

    fn parse_assignment_expression(&mut self) -> &'a Expression<'a> {
        if self.peek(0).kind == SyntaxKind::IdentifierToken && self.peek(1).kind == SyntaxKind::EqualsToken {
            let identifier = self.next_token();
            let equals_token = self.next_token();
            let expression = self.parse_assignment_expression();
            return self.arena.alloc(Expression::Assignment(AssignmentExpression {
                identifier,
                equals_token,
                expression,
            }));
        }
        self.parse_binary_expression(OperatorPrecedence::Lowest)
    }

    fn parse_binary_expression(&mut self, parent_precedence: OperatorPrecedence) -> &'a Expression<'a> {
        let mut left = match unary_operator_precedence(self.current_kind()) {
            Some(precedence) if precedence >= parent_precedence => {
                let operator_token = self.next_token();
                let operand = self.parse_binary_expression(precedence);
                &*self.arena.alloc(Expression::Unary(UnaryExpression {
                    operator_token,
                    operand,
                }))
            }
            _ => self.parse_primary_expression(),
        };

        loop {
            let precedence = match binary_operator_precedence(self.current_kind()) {
                Some(precedence) if precedence > parent_precedence => precedence,
                _ => break,
            };
            let operator_token = self.next_token();
            let right = self.parse_binary_expression(precedence);
            left = self.arena.alloc(Expression::Binary(BinaryExpression {
                left,
                operator_token,
                right,
            }));
        }

        left
    }

    fn parse_primary_expression(&mut self) -> &'a Expression<'a> {
        let expression = match self.current_kind() {
            SyntaxKind::OpenParenthesisToken => {
                let open_parenthesis_token = self.next_token();
                let expression = self.parse_expression();
                let close_parenthesis_token = self.match_token(SyntaxKind::CloseParenthesisToken);
                Expression::Parenthesized(ParenthesizedExpression {
                    open_parenthesis_token,
                    expression,
                    close_parenthesis_token,
                })
            }
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                let literal_token = self.next_token();
                let value = LiteralValue::Bool(literal_token.kind == SyntaxKind::TrueKeyword);
                Expression::Literal(LiteralExpression {
                    literal_token,
                    value,
                })
            }
            SyntaxKind::NumberToken => {
                let literal_token = self.next_token();
                let value = literal_token.value.unwrap_or(LiteralValue::Int(0));
                Expression::Literal(LiteralExpression {
                    literal_token,
                    value,
                })
            }
            SyntaxKind::StringToken => {
                let literal_token = self.next_token();
                let value = literal_token.value.unwrap_or(LiteralValue::String(""));
                Expression::Literal(LiteralExpression {
                    literal_token,
                    value,
                })
            }
            SyntaxKind::IdentifierToken if self.peek(1).kind == SyntaxKind::OpenParenthesisToken => {
                self.parse_call_expression()
            }
            _ => Expression::Name(NameExpression {
                identifier: self.match_token(SyntaxKind::IdentifierToken),
            }),
        };
        self.arena.alloc(expression)
    }

    fn parse_call_expression(&mut self) -> Expression<'a> {
        let identifier = self.match_token(SyntaxKind::IdentifierToken);
        let open_parenthesis_token = self.match_token(SyntaxKind::OpenParenthesisToken);
        let mut arguments = BumpVec::new_in(self.arena);
        while !matches!(
            self.current_kind(),
            SyntaxKind::CloseParenthesisToken | SyntaxKind::EndOfFileToken
        ) {
            arguments.push(self.parse_expression());
            if self.current_kind() != SyntaxKind::CommaToken {
                break;
            }
            self.next_token();
        }
        let close_parenthesis_token = self.match_token(SyntaxKind::CloseParenthesisToken);
        Expression::Call(CallExpression {
            identifier,
            open_parenthesis_token,
            arguments: arguments.into_bump_slice(),
            close_parenthesis_token,
        })
    }
}
