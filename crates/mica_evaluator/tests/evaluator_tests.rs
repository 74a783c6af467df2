//! Evaluator integration tests.
//!
//! Parses and binds a program, then runs it against a buffered console.

use bumpalo::Bump;
use mica_binder::{Binder, Value};
use mica_evaluator::{BufferedConsole, EvaluateError, Evaluator, EvaluatorOptions, Variables};
use mica_parser::SyntaxTree;
use std::sync::Arc;

struct Run {
    result: Result<Option<Value>, EvaluateError>,
    output: Vec<String>,
}

fn run_with(source: &str, input: &[&str], options: EvaluatorOptions) -> Run {
    let arena = Bump::new();
    let tree = SyntaxTree::parse(&arena, source);
    assert!(tree.diagnostics().is_empty(), "{:?}", tree.diagnostics());
    let global_scope = Arc::new(Binder::bind_global_scope(None, tree.root()));
    assert!(global_scope.diagnostics.is_empty(), "{:?}", global_scope.diagnostics);
    let program = Binder::bind_program(&global_scope);
    assert!(program.diagnostics.is_empty(), "{:?}", program.diagnostics);

    let mut globals = Variables::default();
    let mut console = BufferedConsole::with_input(input.iter().map(|s| s.to_string()));
    let result = Evaluator::new(&program, &mut globals, &mut console, options).evaluate();
    Run {
        result,
        output: console.take_output(),
    }
}

fn run(source: &str) -> Run {
    run_with(source, &[], EvaluatorOptions::default())
}

fn value(source: &str) -> Value {
    run(source)
        .result
        .unwrap_or_else(|e| panic!("evaluation failed: {e}"))
        .expect("no value")
}

#[test]
fn test_last_statement_value() {
    assert_eq!(value("1 + 2 * 3"), Value::Int(7));
    assert_eq!(value("var a = 4 a * a"), Value::Int(16));
    assert_eq!(value("\"ab\" + \"cd\""), Value::from("abcd"));
}

#[test]
fn test_short_circuit_skips_right_operand() {
    let run = run(
        r#"
        function side(): bool { print("called") return true }
        false && side()
        "#,
    );
    assert_eq!(run.result.unwrap(), Some(Value::Bool(false)));
    assert!(run.output.is_empty());
}

#[test]
fn test_loops() {
    assert_eq!(value("var s = 0 for i = 1 to 10 s = s + i s"), Value::Int(55));
    assert_eq!(value("var n = 0 while n < 5 n = n + 1 n"), Value::Int(5));
    assert_eq!(value("var n = 10 do n = n + 1 while false n"), Value::Int(11));
}

#[test]
fn test_recursive_function() {
    assert_eq!(
        value("function fib(n: int): int { if n < 2 return n return fib(n - 1) + fib(n - 2) } fib(10)"),
        Value::Int(55)
    );
}

#[test]
fn test_print_and_input() {
    let run = run_with(
        "var name = input() print(\"hello \" + name) var next = input() next",
        &["mica"],
        EvaluatorOptions::default(),
    );
    assert_eq!(run.output, vec!["hello mica"]);
    assert_eq!(run.result.unwrap(), Some(Value::from("")));
}

#[test]
fn test_seeded_random_is_reproducible() {
    let options = EvaluatorOptions {
        random_seed: Some(7),
        ..EvaluatorOptions::default()
    };
    let source = "var a = random(0, 1000) var b = random(0, 1000) string(a) + \",\" + string(b)";
    let first = run_with(source, &[], options).result.unwrap();
    let second = run_with(source, &[], options).result.unwrap();
    assert_eq!(first, second);
    assert_eq!(value("random(5, 5)"), Value::Int(5));
}

#[test]
fn test_runtime_errors() {
    assert!(matches!(run("var z = 0 10 / z").result, Err(EvaluateError::DivisionByZero)));
    assert!(matches!(
        run("int(\"twelve\")").result,
        Err(EvaluateError::InvalidConversion { .. })
    ));
    assert!(matches!(
        run("random(3, 1)").result,
        Err(EvaluateError::InvalidRandomRange { min: 3, max: 1 })
    ));
}

#[test]
fn test_limits() {
    let options = EvaluatorOptions {
        step_limit: Some(100),
        ..EvaluatorOptions::default()
    };
    let run = run_with("while true { }", &[], options);
    assert!(matches!(run.result, Err(EvaluateError::StepLimitExceeded(100))));

    let options = EvaluatorOptions {
        max_call_depth: Some(50),
        ..EvaluatorOptions::default()
    };
    let run = run_with("function f(n: int): int { return f(n + 1) } f(0)", &[], options);
    assert!(matches!(run.result, Err(EvaluateError::CallDepthExceeded(50))));
}

#[test]
fn test_deep_recursion_within_default_depth() {
    assert_eq!(
        value("function depth(n: int): int { if n == 0 return 0 return 1 + depth(n - 1) } depth(900)"),
        Value::Int(900)
    );
}

#[test]
fn test_unbounded_recursion_hits_default_depth() {
    let run = run("function f(n: int): int { return 1 + f(n + 1) } f(0)");
    let limit = EvaluatorOptions::default().max_call_depth.unwrap();
    assert!(matches!(run.result, Err(EvaluateError::CallDepthExceeded(l)) if l == limit));
}

#[test]
fn test_void_call_has_no_value() {
    let run = run("print(\"x\")");
    assert_eq!(run.result.unwrap(), None);
    assert_eq!(run.output, vec!["x"]);
}

#[test]
fn test_global_read_before_declaration() {
    let run = run("function f(): int { return later } f() var later = 1");
    assert!(matches!(run.result, Err(EvaluateError::UnassignedVariable(ref name)) if name == "later"));
    assert!(!run.result.unwrap_err().is_internal());
}
