//! mica_compiler: Compilation orchestration.
//!
//! A [`Compilation`] wraps one parsed submission. It binds the global scope
//! lazily, chains onto a previous compilation so that earlier variables and
//! functions stay visible, and drives lowering, emit and evaluation.

use mica_binder::{Binder, BoundGlobalScope, BoundProgram, BoundTreePrinter, ControlFlowGraph, Value};
use mica_diagnostics::Diagnostic;
use mica_evaluator::{Console, EvaluateError, Evaluator, EvaluatorOptions, StdConsole, Variables};
use mica_options::CompilerOptions;
use mica_parser::SyntaxTree;
use std::io;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// The outcome of [`Compilation::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResult {
    /// Parse and bind diagnostics. Non-empty means nothing was evaluated.
    pub diagnostics: Vec<Diagnostic>,
    /// The value of the last top-level expression, if any.
    pub value: Option<Value>,
}

/// One compiled submission, optionally chained onto a previous one.
pub struct Compilation<'a> {
    previous: Option<Arc<Compilation<'a>>>,
    syntax_tree: SyntaxTree<'a>,
    global_scope: OnceLock<Arc<BoundGlobalScope<'a>>>,
    program: OnceLock<BoundProgram>,
}

impl<'a> Compilation<'a> {
    pub fn new(syntax_tree: SyntaxTree<'a>) -> Self {
        Self::with_previous(None, syntax_tree)
    }

    fn with_previous(previous: Option<Arc<Compilation<'a>>>, syntax_tree: SyntaxTree<'a>) -> Self {
        Self {
            previous,
            syntax_tree,
            global_scope: OnceLock::new(),
            program: OnceLock::new(),
        }
    }

    /// A new compilation of `syntax_tree` that sees everything declared by
    /// `self` and its predecessors.
    pub fn continue_with(self: &Arc<Self>, syntax_tree: SyntaxTree<'a>) -> Compilation<'a> {
        Self::with_previous(Some(Arc::clone(self)), syntax_tree)
    }

    pub fn previous(&self) -> Option<&Arc<Compilation<'a>>> {
        self.previous.as_ref()
    }

    pub fn syntax_tree(&self) -> &SyntaxTree<'a> {
        &self.syntax_tree
    }

    /// The bound global scope, computed on first use.
    pub fn global_scope(&self) -> &Arc<BoundGlobalScope<'a>> {
        self.global_scope.get_or_init(|| {
            let start = Instant::now();
            let previous = self.previous.as_ref().map(|p| Arc::clone(p.global_scope()));
            let scope = Binder::bind_global_scope(previous, self.syntax_tree.root());
            tracing::debug!(elapsed_us = start.elapsed().as_micros() as u64, "bound global scope");
            Arc::new(scope)
        })
    }

    /// The bound and lowered program, computed on first use.
    pub fn program(&self) -> &BoundProgram {
        self.program.get_or_init(|| {
            let start = Instant::now();
            let program = Binder::bind_program(self.global_scope());
            tracing::debug!(
                functions = program.functions.len(),
                elapsed_us = start.elapsed().as_micros() as u64,
                "bound program"
            );
            program
        })
    }

    /// Parse diagnostics followed by global-scope diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.syntax_tree
            .diagnostics()
            .iter()
            .chain(self.global_scope().diagnostics.iter())
            .cloned()
            .collect()
    }

    /// Evaluate against the process console with default options.
    pub fn evaluate(&self, variables: &mut Variables) -> Result<EvaluationResult, EvaluateError> {
        self.evaluate_with(variables, &mut StdConsole, EvaluatorOptions::default())
    }

    pub fn evaluate_with(
        &self,
        variables: &mut Variables,
        console: &mut dyn Console,
        options: EvaluatorOptions,
    ) -> Result<EvaluationResult, EvaluateError> {
        let diagnostics = self.diagnostics();
        if !diagnostics.is_empty() {
            return Ok(EvaluationResult { diagnostics, value: None });
        }

        let program = self.program();
        if !program.diagnostics.is_empty() {
            return Ok(EvaluationResult {
                diagnostics: program.diagnostics.diagnostics().to_vec(),
                value: None,
            });
        }

        let _span = tracing::debug_span!("evaluate").entered();
        let start = Instant::now();
        let value = Evaluator::new(program, variables, console, options).evaluate();
        tracing::debug!(elapsed_us = start.elapsed().as_micros() as u64, "evaluated");
        Ok(EvaluationResult {
            diagnostics: Vec::new(),
            value: value?,
        })
    }

    /// Write the lowered program as source-like text.
    pub fn emit_tree(&self, out: &mut impl io::Write) -> io::Result<()> {
        out.write_all(BoundTreePrinter::program_to_string(self.program()).as_bytes())
    }

    /// Write the Graphviz graph of the named function's lowered body, or of
    /// the top-level statements when `function_name` is `None`.
    ///
    /// Returns `Ok(false)` when no function of that name was compiled.
    pub fn emit_control_flow_graph(&self, function_name: Option<&str>, out: &mut impl io::Write) -> io::Result<bool> {
        let program = self.program();
        let body = match function_name {
            None => &program.statement,
            Some(name) => match program.functions.iter().find(|(f, _)| f.name == name) {
                Some((_, body)) => body,
                None => return Ok(false),
            },
        };
        ControlFlowGraph::create(body).write_to(out)?;
        Ok(true)
    }
}

/// Evaluator settings taken from `options`. An unset call depth keeps the
/// evaluator's default limit.
pub fn evaluator_options(options: &CompilerOptions) -> EvaluatorOptions {
    let defaults = EvaluatorOptions::default();
    EvaluatorOptions {
        step_limit: options.step_limit,
        max_call_depth: options.max_call_depth.or(defaults.max_call_depth),
        random_seed: options.random_seed,
    }
}
