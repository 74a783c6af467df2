//! The evaluator implementation.

use crate::console::Console;
use crate::error::EvaluateError;
use mica_binder::{
    builtins, BoundBinaryOperator, BoundBinaryOperatorKind, BoundBlockStatement, BoundExpression, BoundLabel,
    BoundProgram, BoundStatement, BoundUnaryOperator, BoundUnaryOperatorKind, FunctionSymbol, SymbolId,
    TypeSymbol, Value, VariableKind, VariableSymbol,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Remaining stack below which evaluation moves to a fresh segment.
const STACK_RED_ZONE: usize = 128 * 1024;
/// Size of each additional stack segment.
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Storage for variables, keyed by symbol identity.
pub type Variables = FxHashMap<Arc<VariableSymbol>, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Abort after executing this many statements. `None` runs unbounded.
    pub step_limit: Option<u64>,
    /// Maximum nesting of user function calls.
    pub max_call_depth: Option<usize>,
    /// Seed for `random`. `None` seeds from the operating system.
    pub random_seed: Option<u64>,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            step_limit: None,
            max_call_depth: Some(1000),
            random_seed: None,
        }
    }
}

/// A lowered body with its label-to-index jump table.
struct CompiledBody<'p> {
    statements: &'p [Arc<BoundStatement>],
    labels: FxHashMap<BoundLabel, usize>,
}

impl<'p> CompiledBody<'p> {
    fn new(body: &'p BoundBlockStatement) -> Self {
        let labels = body
            .statements
            .iter()
            .enumerate()
            .filter_map(|(i, statement)| match &**statement {
                BoundStatement::Label(label) => Some((label.clone(), i + 1)),
                _ => None,
            })
            .collect();
        Self {
            statements: &body.statements,
            labels,
        }
    }

    fn target(&self, label: &BoundLabel) -> Result<usize, EvaluateError> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| EvaluateError::UndefinedLabel(label.name().to_string()))
    }
}

pub struct Evaluator<'p> {
    globals: &'p mut Variables,
    /// One frame per active user function call.
    locals: Vec<Variables>,
    main: Rc<CompiledBody<'p>>,
    functions: FxHashMap<SymbolId, Rc<CompiledBody<'p>>>,
    console: &'p mut dyn Console,
    options: EvaluatorOptions,
    random: Option<StdRng>,
    steps: u64,
}

impl<'p> Evaluator<'p> {
    pub fn new(
        program: &'p BoundProgram,
        globals: &'p mut Variables,
        console: &'p mut dyn Console,
        options: EvaluatorOptions,
    ) -> Self {
        let functions = program
            .functions
            .iter()
            .map(|(function, body)| (function.id, Rc::new(CompiledBody::new(body))))
            .collect();
        Self {
            globals,
            locals: Vec::new(),
            main: Rc::new(CompiledBody::new(&program.statement)),
            functions,
            console,
            options,
            random: None,
            steps: 0,
        }
    }

    /// Run the top-level statements. Returns the value of the last
    /// expression or declaration executed.
    pub fn evaluate(&mut self) -> Result<Option<Value>, EvaluateError> {
        let main = Rc::clone(&self.main);
        let result = self.evaluate_body(&main);
        tracing::debug!(steps = self.steps, ok = result.is_ok(), "evaluation finished");
        result
    }

    fn evaluate_body(&mut self, body: &CompiledBody<'p>) -> Result<Option<Value>, EvaluateError> {
        let mut last_value = None;
        let mut index = 0;
        while let Some(statement) = body.statements.get(index) {
            self.tick()?;
            index += 1;
            match &**statement {
                BoundStatement::VariableDeclaration { variable, initializer } => {
                    let value = self.evaluate_value(initializer)?;
                    self.assign(variable, value.clone());
                    last_value = Some(value);
                }
                BoundStatement::Expression(expression) => {
                    last_value = self.evaluate_expression(expression)?;
                }
                BoundStatement::Goto(label) => index = body.target(label)?,
                BoundStatement::ConditionalGoto {
                    label,
                    condition,
                    jump_if_false,
                } => {
                    let condition = self.evaluate_bool(condition)?;
                    if condition != *jump_if_false {
                        index = body.target(label)?;
                    }
                }
                BoundStatement::Label(_) => {}
                BoundStatement::Return(expression) => {
                    return match expression {
                        Some(expression) => self.evaluate_expression(expression),
                        None => Ok(None),
                    };
                }
                other => return Err(EvaluateError::UnexpectedNode(other.kind())),
            }
        }
        Ok(last_value)
    }

    fn tick(&mut self) -> Result<(), EvaluateError> {
        self.steps += 1;
        match self.options.step_limit {
            Some(limit) if self.steps > limit => {
                tracing::debug!(limit, "step limit exceeded");
                Err(EvaluateError::StepLimitExceeded(limit))
            }
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Variables
    // ========================================================================

    fn assign(&mut self, variable: &Arc<VariableSymbol>, value: Value) {
        let storage = match (variable.kind, self.locals.last_mut()) {
            (VariableKind::Local | VariableKind::Parameter, Some(frame)) => frame,
            _ => &mut *self.globals,
        };
        storage.insert(Arc::clone(variable), value);
    }

    fn lookup(&self, variable: &VariableSymbol) -> Result<Value, EvaluateError> {
        let storage = match (variable.kind, self.locals.last()) {
            (VariableKind::Local | VariableKind::Parameter, Some(frame)) => frame,
            _ => &*self.globals,
        };
        storage
            .get(variable)
            .cloned()
            .ok_or_else(|| EvaluateError::UnassignedVariable(variable.name.clone()))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Evaluate an expression that must produce a value.
    fn evaluate_value(&mut self, expression: &BoundExpression) -> Result<Value, EvaluateError> {
        self.evaluate_expression(expression)?.ok_or(EvaluateError::MissingValue)
    }

    fn evaluate_int(&mut self, expression: &BoundExpression) -> Result<i32, EvaluateError> {
        let value = self.evaluate_value(expression)?;
        value.as_int().ok_or_else(|| mismatch("an int operand", &value))
    }

    fn evaluate_bool(&mut self, expression: &BoundExpression) -> Result<bool, EvaluateError> {
        let value = self.evaluate_value(expression)?;
        value.as_bool().ok_or_else(|| mismatch("a bool operand", &value))
    }

    fn evaluate_string(&mut self, expression: &BoundExpression) -> Result<String, EvaluateError> {
        match self.evaluate_value(expression)? {
            Value::String(text) => Ok(text),
            other => Err(mismatch("a string operand", &other)),
        }
    }

    /// Every call and nested operand passes through here, so this is where
    /// the native stack is grown.
    fn evaluate_expression(&mut self, expression: &BoundExpression) -> Result<Option<Value>, EvaluateError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.evaluate_expression_inner(expression))
    }

    fn evaluate_expression_inner(&mut self, expression: &BoundExpression) -> Result<Option<Value>, EvaluateError> {
        let value = match expression {
            BoundExpression::Literal(value) => value.clone(),
            BoundExpression::Variable(variable) => self.lookup(variable)?,
            BoundExpression::Assignment { variable, expression } => {
                let value = self.evaluate_value(expression)?;
                self.assign(variable, value.clone());
                value
            }
            BoundExpression::Unary { op, operand } => self.evaluate_unary(op, operand)?,
            BoundExpression::Binary { left, op, right } => self.evaluate_binary(left, op, right)?,
            BoundExpression::Call { function, arguments } => return self.evaluate_call(function, arguments),
            BoundExpression::Conversion { ty, expression } => {
                let value = self.evaluate_value(expression)?;
                convert(value, *ty)?
            }
            BoundExpression::Error => return Err(EvaluateError::UnexpectedNode(expression.kind())),
        };
        Ok(Some(value))
    }

    fn evaluate_unary(&mut self, op: &BoundUnaryOperator, operand: &BoundExpression) -> Result<Value, EvaluateError> {
        Ok(match op.kind {
            BoundUnaryOperatorKind::Identity => Value::Int(self.evaluate_int(operand)?),
            BoundUnaryOperatorKind::Negation => Value::Int(self.evaluate_int(operand)?.wrapping_neg()),
            BoundUnaryOperatorKind::OnesComplement => Value::Int(!self.evaluate_int(operand)?),
            BoundUnaryOperatorKind::LogicalNegation => Value::Bool(!self.evaluate_bool(operand)?),
        })
    }

    fn evaluate_binary(
        &mut self,
        left: &BoundExpression,
        op: &BoundBinaryOperator,
        right: &BoundExpression,
    ) -> Result<Value, EvaluateError> {
        use BoundBinaryOperatorKind as K;

        // `&&` and `||` skip the right operand when the left decides.
        match op.kind {
            K::LogicalAnd => return Ok(Value::Bool(self.evaluate_bool(left)? && self.evaluate_bool(right)?)),
            K::LogicalOr => return Ok(Value::Bool(self.evaluate_bool(left)? || self.evaluate_bool(right)?)),
            _ => {}
        }

        let left = self.evaluate_value(left)?;
        let right = self.evaluate_value(right)?;
        let result = match (op.kind, &left, &right) {
            (K::Equals, l, r) => Value::Bool(l == r),
            (K::NotEquals, l, r) => Value::Bool(l != r),

            (K::Addition, Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_add(*r)),
            (K::Addition, Value::String(l), Value::String(r)) => Value::String(format!("{l}{r}")),
            (K::Subtraction, Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_sub(*r)),
            (K::Multiplication, Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_mul(*r)),
            (K::Division, Value::Int(_), Value::Int(0)) => return Err(EvaluateError::DivisionByZero),
            (K::Division, Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_div(*r)),

            (K::BitwiseAnd, Value::Int(l), Value::Int(r)) => Value::Int(l & r),
            (K::BitwiseOr, Value::Int(l), Value::Int(r)) => Value::Int(l | r),
            (K::BitwiseXor, Value::Int(l), Value::Int(r)) => Value::Int(l ^ r),
            (K::BitwiseAnd, Value::Bool(l), Value::Bool(r)) => Value::Bool(l & r),
            (K::BitwiseOr, Value::Bool(l), Value::Bool(r)) => Value::Bool(l | r),
            (K::BitwiseXor, Value::Bool(l), Value::Bool(r)) => Value::Bool(l ^ r),

            (K::Less, Value::Int(l), Value::Int(r)) => Value::Bool(l < r),
            (K::LessOrEquals, Value::Int(l), Value::Int(r)) => Value::Bool(l <= r),
            (K::Greater, Value::Int(l), Value::Int(r)) => Value::Bool(l > r),
            (K::GreaterOrEquals, Value::Int(l), Value::Int(r)) => Value::Bool(l >= r),

            (kind, l, _) => return Err(mismatch(&format!("{kind:?}"), l)),
        };
        Ok(result)
    }

    // ========================================================================
    // Calls
    // ========================================================================

    fn evaluate_call(
        &mut self,
        function: &Arc<FunctionSymbol>,
        arguments: &[Arc<BoundExpression>],
    ) -> Result<Option<Value>, EvaluateError> {
        if function.id == builtins::PRINT.id {
            let text = self.evaluate_string(&arguments[0])?;
            self.console.write_line(&text)?;
            return Ok(None);
        }
        if function.id == builtins::INPUT.id {
            let line = self.console.read_line()?.unwrap_or_default();
            return Ok(Some(Value::String(line)));
        }
        if function.id == builtins::RANDOM.id {
            let min = self.evaluate_int(&arguments[0])?;
            let max = self.evaluate_int(&arguments[1])?;
            return self.random(min, max).map(|v| Some(Value::Int(v)));
        }

        if let Some(limit) = self.options.max_call_depth {
            if self.locals.len() >= limit {
                return Err(EvaluateError::CallDepthExceeded(limit));
            }
        }

        let mut frame = Variables::default();
        for (parameter, argument) in function.parameters.iter().zip(arguments) {
            let value = self.evaluate_value(argument)?;
            frame.insert(Arc::clone(parameter), value);
        }

        let body = self
            .functions
            .get(&function.id)
            .cloned()
            .ok_or_else(|| EvaluateError::MissingBody(function.name.clone()))?;

        tracing::trace!(function = %function.name, depth = self.locals.len() + 1, "call");
        self.locals.push(frame);
        let result = self.evaluate_body(&body);
        self.locals.pop();

        let value = result?;
        Ok(if function.return_type == TypeSymbol::Void { None } else { value })
    }

    /// An int in `min..max`, or `min` when the range is empty.
    fn random(&mut self, min: i32, max: i32) -> Result<i32, EvaluateError> {
        if min > max {
            return Err(EvaluateError::InvalidRandomRange { min, max });
        }
        if min == max {
            return Ok(min);
        }
        let seed = self.options.random_seed;
        let random = self.random.get_or_insert_with(|| match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        });
        Ok(random.gen_range(min..max))
    }
}

fn convert(value: Value, ty: TypeSymbol) -> Result<Value, EvaluateError> {
    let invalid = |value: &Value| EvaluateError::InvalidConversion {
        value: value.to_string(),
        ty,
    };
    match (ty, value) {
        (TypeSymbol::String, value) => Ok(Value::String(value.to_string())),
        (TypeSymbol::Int, Value::Int(v)) => Ok(Value::Int(v)),
        (TypeSymbol::Int, Value::String(text)) => text
            .trim()
            .parse::<i32>()
            .map(Value::Int)
            .map_err(|_| invalid(&Value::String(text))),
        (TypeSymbol::Bool, Value::Bool(v)) => Ok(Value::Bool(v)),
        (TypeSymbol::Bool, Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(invalid(&Value::String(text)))
            }
        }
        (ty, value) => Err(EvaluateError::TypeMismatch {
            operation: format!("conversion to {ty}"),
            ty: value.ty(),
        }),
    }
}

fn mismatch(operation: &str, value: &Value) -> EvaluateError {
    EvaluateError::TypeMismatch {
        operation: operation.to_string(),
        ty: value.ty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert() {
        assert_eq!(convert(Value::Int(12), TypeSymbol::String).unwrap(), Value::from("12"));
        assert_eq!(convert(Value::Bool(true), TypeSymbol::String).unwrap(), Value::from("true"));
        assert_eq!(convert(Value::from(" 42 "), TypeSymbol::Int).unwrap(), Value::Int(42));
        assert_eq!(convert(Value::from("False"), TypeSymbol::Bool).unwrap(), Value::Bool(false));
        assert!(matches!(
            convert(Value::from("abc"), TypeSymbol::Int),
            Err(EvaluateError::InvalidConversion { .. })
        ));
        assert!(convert(Value::Int(1), TypeSymbol::Bool).unwrap_err().is_internal());
    }
}
