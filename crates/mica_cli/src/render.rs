//! Terminal rendering of diagnostics, values and errors.

use mica_core::text::LineMap;
use mica_diagnostics::{Diagnostic, DiagnosticCategory};
use mica_evaluator::EvaluateError;
use miette::{LabeledSpan, NamedSource, Severity, SourceCode, SourceSpan};
use std::fmt;
use std::io::IsTerminal;

// ANSI color codes
pub const RED: &str = "\x1b[31m";
pub const YELLOW: &str = "\x1b[33m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";
pub const GRAY: &str = "\x1b[90m";
pub const BOLD: &str = "\x1b[1m";
pub const RESET: &str = "\x1b[0m";

pub fn stderr_is_terminal() -> bool {
    std::io::stderr().is_terminal()
}

pub fn stdout_is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// A diagnostic paired with the text it points into, rendered by miette.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SourceReport {
    message: String,
    code: u32,
    severity: Severity,
    span: SourceSpan,
    source_code: NamedSource<String>,
}

impl SourceReport {
    pub fn new(diagnostic: &Diagnostic, file_name: &str, text: &str) -> Self {
        let severity = match diagnostic.category {
            DiagnosticCategory::Error => Severity::Error,
            DiagnosticCategory::Warning => Severity::Warning,
        };
        Self {
            message: diagnostic.message_text.clone(),
            code: diagnostic.code,
            severity,
            span: diagnostic.span.to_range().into(),
            source_code: NamedSource::new(file_name, text.to_string()),
        }
    }
}

impl miette::Diagnostic for SourceReport {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("MC{}", self.code)))
    }

    fn severity(&self) -> Option<Severity> {
        Some(self.severity)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.source_code)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(None, self.span))))
    }
}

/// Print `diagnostics` to stderr. With `pretty`, each one becomes a miette
/// report with a source snippet; otherwise one `file(line, col): ...` line.
pub fn print_diagnostics(diagnostics: &[Diagnostic], file_name: &str, text: &str, pretty: bool) {
    let line_map = LineMap::new(text);
    for diagnostic in diagnostics {
        if pretty {
            let report = miette::Report::new(SourceReport::new(diagnostic, file_name, text));
            eprintln!("{report:?}");
        } else {
            print_diagnostic(diagnostic, file_name, &line_map, false);
        }
    }

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    if errors > 0 {
        let plural = if errors == 1 { "" } else { "s" };
        if pretty {
            eprintln!("{RED}Found {errors} error{plural}.{RESET}");
        } else {
            eprintln!("Found {errors} error{plural}.");
        }
    }
}

pub fn print_diagnostic(diagnostic: &Diagnostic, file_name: &str, line_map: &LineMap, use_color: bool) {
    let position = line_map.line_and_column_of(diagnostic.span.start);
    if use_color {
        let color = if diagnostic.is_error() { RED } else { YELLOW };
        eprintln!(
            "{CYAN}{file_name}{RESET}{position}: {BOLD}{color}{}{RESET} {GRAY}MC{}{RESET}: {}",
            diagnostic.category, diagnostic.code, diagnostic.message_text
        );
    } else {
        eprintln!("{file_name}{position}: {diagnostic}");
    }
}

pub fn print_value(value: &impl fmt::Display) {
    if stdout_is_terminal() {
        println!("{MAGENTA}{value}{RESET}");
    } else {
        println!("{value}");
    }
}

pub fn print_error(msg: &str) {
    if stderr_is_terminal() {
        eprintln!("{BOLD}{RED}error{RESET}: {msg}");
    } else {
        eprintln!("error: {msg}");
    }
}

/// Report a failed evaluation. Internal errors are flagged as bugs.
pub fn print_evaluate_error(error: &EvaluateError) {
    if error.is_internal() {
        print_error(&error.to_string());
    } else {
        print_error(&format!("runtime error: {error}"));
    }
}
