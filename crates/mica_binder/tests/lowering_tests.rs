//! Lowering integration tests.
//!
//! Binds small programs and checks the printed form of the lowered body.

use bumpalo::Bump;
use mica_binder::{Binder, BoundStatement, BoundTreePrinter};
use mica_parser::SyntaxTree;
use std::sync::Arc;

/// Helper: bind `source` and print its lowered top-level statements.
fn lower(source: &str) -> String {
    let arena = Bump::new();
    let tree = SyntaxTree::parse(&arena, source);
    let global_scope = Arc::new(Binder::bind_global_scope(None, tree.root()));
    assert!(global_scope.diagnostics.is_empty(), "{:?}", global_scope.diagnostics);
    let program = Binder::bind_program(&global_scope);
    BoundTreePrinter::statement_to_string(&BoundStatement::Block(program.statement))
}

fn unindent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().skip_while(|l| l.trim().is_empty()).collect();
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    let mut result: String = lines
        .iter()
        .map(|l| if l.len() >= indent { &l[indent..] } else { l.trim_start() })
        .collect::<Vec<_>>()
        .join("\n");
    result.truncate(result.trim_end().len());
    result.push('\n');
    result
}

#[test]
fn test_if_without_else() {
    assert_eq!(
        lower("var a = 1 if a == 1 a = 2"),
        unindent(
            "
            {
                var a = 1
                goto label1 unless a == 1
                a = 2
            label1:
            }
            "
        )
    );
}

#[test]
fn test_if_with_else() {
    assert_eq!(
        lower("var a = 1 if a == 1 a = 2 else a = 3"),
        unindent(
            "
            {
                var a = 1
                goto label1 unless a == 1
                a = 2
                goto label2
            label1:
                a = 3
            label2:
            }
            "
        )
    );
}

#[test]
fn test_while_checks_condition_first() {
    assert_eq!(
        lower("var x = 0 while x < 3 x = x + 1"),
        unindent(
            "
            {
                var x = 0
                goto continue1
            label1:
                x = x + 1
            continue1:
                goto label1 if x < 3
            break1:
            }
            "
        )
    );
}

#[test]
fn test_do_while_runs_body_first() {
    assert_eq!(
        lower("var x = 0 do x = x + 1 while x < 3"),
        unindent(
            "
            {
                var x = 0
            label1:
                x = x + 1
            continue1:
                goto label1 if x < 3
            break1:
            }
            "
        )
    );
}

#[test]
fn test_for_becomes_while_with_upper_bound() {
    assert_eq!(
        lower("for i = 1 to 3 print(string(i))"),
        unindent(
            "
            {
                let i = 1
                let upperBound = 3
                goto label1
            label2:
                print(string(i))
            continue1:
                i = i + 1
            label1:
                goto label2 if i <= upperBound
            break1:
            }
            "
        )
    );
}

#[test]
fn test_break_and_continue_become_gotos() {
    assert_eq!(
        lower("while true { if false continue break }"),
        unindent(
            "
            {
                goto continue1
            label1:
                goto label2 unless false
                goto continue1
            label2:
                goto break1
            continue1:
                goto label1 if true
            break1:
            }
            "
        )
    );
}

#[test]
fn test_straight_line_code_is_shared() {
    let arena = Bump::new();
    let tree = SyntaxTree::parse(&arena, "var x = 1 x + 2");
    let global_scope = Arc::new(Binder::bind_global_scope(None, tree.root()));
    let program = Binder::bind_program(&global_scope);
    assert_eq!(program.statement.statements.len(), 2);
    for (lowered, bound) in program.statement.statements.iter().zip(&global_scope.statements) {
        assert!(Arc::ptr_eq(lowered, bound));
    }
}

#[test]
fn test_function_bodies_are_flat() {
    let arena = Bump::new();
    let tree = SyntaxTree::parse(
        &arena,
        "function f(n: int): int { { var a = n { return a } } }",
    );
    let global_scope = Arc::new(Binder::bind_global_scope(None, tree.root()));
    let program = Binder::bind_program(&global_scope);
    assert!(program.diagnostics.is_empty(), "{:?}", program.diagnostics);
    let body = program.functions.values().next().unwrap();
    assert_eq!(body.statements.len(), 2);
    assert!(body.statements.iter().all(|s| !matches!(**s, BoundStatement::Block(_))));
}
