//! Compiler integration tests.
//!
//! End-to-end tests for the pipeline: parse -> bind -> lower -> evaluate,
//! plus chaining, emit and control-flow graph output.

use bumpalo::Bump;
use mica_binder::Value;
use mica_compiler::{evaluator_options, Compilation, EvaluationResult};
use mica_evaluator::{BufferedConsole, EvaluateError, EvaluatorOptions, Variables};
use mica_options::CompilerOptions;
use mica_parser::SyntaxTree;
use std::sync::Arc;

/// Helper: compile and evaluate `source` with fresh globals.
fn evaluate(source: &str) -> Result<EvaluationResult, EvaluateError> {
    let arena = Bump::new();
    let compilation = Compilation::new(SyntaxTree::parse(&arena, source));
    let mut variables = Variables::default();
    let mut console = BufferedConsole::new();
    compilation.evaluate_with(&mut variables, &mut console, EvaluatorOptions::default())
}

fn assert_value(source: &str, expected: impl Into<Value>) {
    let result = evaluate(source).unwrap_or_else(|e| panic!("evaluation of {source:?} failed: {e}"));
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.value, Some(expected.into()), "source: {source}");
}

fn messages(result: &EvaluationResult) -> Vec<&str> {
    result.diagnostics.iter().map(|d| d.message_text.as_str()).collect()
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_arithmetic() {
    assert_value("1", 1);
    assert_value("+1", 1);
    assert_value("-1", -1);
    assert_value("~1", -2);
    assert_value("14 + 12", 26);
    assert_value("12 - 3", 9);
    assert_value("4 * 2", 8);
    assert_value("9 / 3", 3);
    assert_value("1 + 2 * 3", 7);
    assert_value("(1 + 2) * 3", 9);
    assert_value("1 | 2", 3);
    assert_value("1 & 3", 1);
    assert_value("1 ^ 0", 1);
    assert_value("2147483647 + 1", i32::MIN);
}

#[test]
fn test_comparisons_and_logic() {
    assert_value("12 == 3", false);
    assert_value("3 != 3", false);
    assert_value("3 < 4", true);
    assert_value("5 <= 4", false);
    assert_value("4 >= 4", true);
    assert_value("false == false", true);
    assert_value("true && false", false);
    assert_value("false || true", true);
    assert_value("true ^ true", false);
    assert_value("!true", false);
    assert_value("\"test\" == \"test\"", true);
    assert_value("\"test\" != \"abc\"", true);
    assert_value("\"a\" + \"b\"", "ab");
}

#[test]
fn test_assignment_is_an_expression() {
    assert_value("{ var a = 0 (a = 10) * a }", 100);
}

#[test]
fn test_statements() {
    assert_value("{ var a = 0 if a == 0 a = 10 a }", 10);
    assert_value("{ var a = 0 if a == 4 a = 10 else a = 5 a }", 5);
    assert_value("{ var i = 0 var a = 0 while i < 10 { a = a + 2 i = i + 1 } a }", 20);
    assert_value("{ var a = 0 for i = 1 to 10 { a = i } a }", 10);
    assert_value("{ var a = 0 do a = a + 1 while a < 10 a }", 10);
    assert_value("{ var i = 0 while i < 5 { i = i + 1 if i == 3 continue } i }", 5);
    assert_value("{ var i = 0 while true { i = i + 1 if i == 7 break } i }", 7);
}

#[test]
fn test_for_upper_bound_is_inclusive() {
    assert_value("{ var a = 0 for i = 0 to 10 { a = i + 1 } a }", 11);
    assert_value("{ var n = 0 for i = 5 to 5 n = n + 1 n }", 1);
    assert_value("{ var n = 0 for i = 6 to 5 n = n + 1 n }", 0);
}

#[test]
fn test_for_bounds_are_evaluated_once() {
    assert_value("{ var n = 3 var count = 0 for i = 1 to n { n = 10 count = count + 1 } count }", 3);
}

#[test]
fn test_conversions() {
    assert_value("string(12)", "12");
    assert_value("string(true)", "true");
    assert_value("int(\"42\") + 1", 43);
    assert_value("bool(\"true\")", true);
}

#[test]
fn test_functions() {
    assert_value(
        r#"
        function square(n: int): int { return n * n }
        square(9)
        "#,
        81,
    );
    assert_value(
        r#"
        function count(n: int): int {
            var total = 0
            for i = 1 to n total = total + i
            return total
        }
        count(4)
        "#,
        10,
    );
}

#[test]
fn test_read_only_assignment_still_reports() {
    let result = evaluate("{ let x = 10 x = 0 }").unwrap();
    assert_eq!(messages(&result), vec!["Variable 'x' is read-only and cannot be assigned to."]);
    assert_eq!(result.value, None);
}

#[test]
fn test_diagnostics_block_evaluation() {
    let result = evaluate("print(\"never\") x").unwrap();
    assert_eq!(messages(&result), vec!["Variable 'x' does not exist."]);
    assert_eq!(result.value, None);
}

#[test]
fn test_parse_diagnostics_come_first() {
    let result = evaluate("var x = y +").unwrap();
    let messages = messages(&result);
    assert!(messages[0].starts_with("Unexpected token"), "{messages:?}");
    assert_eq!(messages.last(), Some(&"Variable 'y' does not exist."));
}

#[test]
fn test_program_diagnostics_block_evaluation() {
    let result = evaluate("function f(): int { } f()").unwrap();
    assert_eq!(messages(&result), vec!["Not all path return a value."]);
}

#[test]
fn test_runtime_error_is_returned() {
    let err = evaluate("{ var zero = 0 1 / zero }").unwrap_err();
    assert!(matches!(err, EvaluateError::DivisionByZero));
    assert!(!err.is_internal());
}

// ============================================================================
// Chaining
// ============================================================================

#[test]
fn test_continue_with_sees_previous_declarations() {
    let arena = Bump::new();
    let mut variables = Variables::default();
    let mut console = BufferedConsole::new();
    let options = EvaluatorOptions::default();

    let first = Arc::new(Compilation::new(SyntaxTree::parse(
        &arena,
        "function twice(n: int): int { return n * 2 } var x = 21",
    )));
    let result = first.evaluate_with(&mut variables, &mut console, options).unwrap();
    assert!(result.diagnostics.is_empty());

    let second = Arc::new(first.continue_with(SyntaxTree::parse(&arena, "x = twice(x)")));
    let result = second.evaluate_with(&mut variables, &mut console, options).unwrap();
    assert_eq!(result.value, Some(Value::Int(42)));

    let third = second.continue_with(SyntaxTree::parse(&arena, "var x = \"shadowed\" x"));
    let result = third.evaluate_with(&mut variables, &mut console, options).unwrap();
    assert_eq!(result.value, Some(Value::from("shadowed")));
    assert!(Arc::ptr_eq(third.previous().unwrap(), &second));
}

#[test]
fn test_global_scope_is_computed_once() {
    let arena = Bump::new();
    let compilation = Compilation::new(SyntaxTree::parse(&arena, "var a = 1"));
    assert!(Arc::ptr_eq(compilation.global_scope(), compilation.global_scope()));
}

// ============================================================================
// Emit
// ============================================================================

#[test]
fn test_emit_tree() {
    let arena = Bump::new();
    let compilation = Compilation::new(SyntaxTree::parse(
        &arena,
        "function add(a: int, b: int): int { return a + b } print(string(add(1, 2)))",
    ));
    let mut out = Vec::new();
    compilation.emit_tree(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "function add(a: int, b: int): int\n{\n    return a + b\n}\n{\n    print(string(add(1, 2)))\n}\n"
    );
}

#[test]
fn test_emit_control_flow_graph() {
    let arena = Bump::new();
    let compilation = Compilation::new(SyntaxTree::parse(
        &arena,
        "function sign(n: int): int { if n < 0 return -1 return 1 } sign(5)",
    ));

    let mut out = Vec::new();
    assert!(compilation.emit_control_flow_graph(Some("sign"), &mut out).unwrap());
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("digraph G {\n"));
    assert!(text.contains("[label = \"n < 0\"]"), "{text}");
    assert!(text.contains("[label = \"!(n < 0)\"]"), "{text}");

    let mut out = Vec::new();
    assert!(compilation.emit_control_flow_graph(None, &mut out).unwrap());
    assert!(String::from_utf8(out).unwrap().contains("sign(5)"));

    assert!(!compilation.emit_control_flow_graph(Some("missing"), &mut Vec::new()).unwrap());
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_evaluator_options_from_config() {
    let options = CompilerOptions {
        step_limit: Some(10),
        random_seed: Some(3),
        ..CompilerOptions::default()
    };
    let evaluator = evaluator_options(&options);
    assert_eq!(evaluator.step_limit, Some(10));
    assert_eq!(evaluator.random_seed, Some(3));
    assert_eq!(evaluator.max_call_depth, EvaluatorOptions::default().max_call_depth);
}

#[test]
fn test_step_limit_stops_infinite_loop() {
    let arena = Bump::new();
    let compilation = Compilation::new(SyntaxTree::parse(&arena, "while true { }"));
    let options = EvaluatorOptions {
        step_limit: Some(1000),
        ..EvaluatorOptions::default()
    };
    let err = compilation
        .evaluate_with(&mut Variables::default(), &mut BufferedConsole::new(), options)
        .unwrap_err();
    assert!(matches!(err, EvaluateError::StepLimitExceeded(1000)));
}
