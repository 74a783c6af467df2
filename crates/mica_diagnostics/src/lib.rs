//! mica_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Every user-facing problem found by the scanner, parser or binder is
//! recorded as a [`Diagnostic`] built from one of the [`messages`] templates.
//! Stages never abort on a diagnostic; they append it and keep going.

use mica_core::text::TextSpan;
use std::fmt;

/// Diagnostic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code (e.g., 1001, 2004).
    pub code: u32,
    /// The category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The source text span the diagnostic points at.
    pub span: TextSpan,
    /// The message with all placeholders filled in.
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    pub fn new(span: TextSpan, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            span,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} MC{}: {}",
            self.category, self.code, self.message_text
        )
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated during compilation.
///
/// Append-only: diagnostics keep the order in which stages reported them.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Build a diagnostic from a template and append it.
    pub fn report(&mut self, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) {
        self.add(Diagnostic::new(span, message, args));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn extend_from_slice(&mut self, diagnostics: &[Diagnostic]) {
        self.diagnostics.extend_from_slice(diagnostics);
    }
}

impl From<Vec<Diagnostic>> for DiagnosticCollection {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

impl<'a> IntoIterator for &'a DiagnosticCollection {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Scanner errors (1000-1099)
    // ========================================================================
    pub const THE_NUMBER_0_ISNT_A_VALID_1: DiagnosticMessage = diag!(1001, Error, "The number {0} isn't a valid {1}.");
    pub const BAD_CHARACTER_INPUT_0: DiagnosticMessage = diag!(1002, Error, "bad character input: '{0}'.");
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1003, Error, "Unterminated string literal.");

    // ========================================================================
    // Parser errors (1100-1199)
    // ========================================================================
    pub const UNEXPECTED_TOKEN_0_EXPECTED_1: DiagnosticMessage = diag!(1101, Error, "Unexpected token <{0}>, expected <{1}>.");

    // ========================================================================
    // Binder errors (2000-2999)
    // ========================================================================
    pub const UNARY_OPERATOR_0_IS_NOT_DEFINED_FOR_TYPE_1: DiagnosticMessage = diag!(2001, Error, "Unary operator '{0}' is not defined for type '{1}'.");
    pub const BINARY_OPERATOR_0_IS_NOT_DEFINED_FOR_TYPES_1_AND_2: DiagnosticMessage = diag!(2002, Error, "Binary operator '{0}' is not defined for types '{1}' and '{2}'.");
    pub const VARIABLE_0_DOES_NOT_EXIST: DiagnosticMessage = diag!(2003, Error, "Variable '{0}' does not exist.");
    pub const EXPRESSION_MUST_HAVE_A_VALUE: DiagnosticMessage = diag!(2004, Error, "Expression must have a value.");
    pub const VARIABLE_0_ALREADY_DECLARED: DiagnosticMessage = diag!(2005, Error, "Variable '{0}' already declared.");
    pub const CANNOT_CONVERT_TYPE_0_TO_1: DiagnosticMessage = diag!(2006, Error, "Cannot convert type '{0}' to '{1}'.");
    pub const PARAMETER_0_DECLARED_MULTIPLE_TIMES: DiagnosticMessage = diag!(2007, Error, "Parameter {0} declared multiple times.");
    pub const VARIABLE_0_IS_READ_ONLY: DiagnosticMessage = diag!(2008, Error, "Variable '{0}' is read-only and cannot be assigned to.");
    pub const FUNCTION_0_ALREADY_DECLARED: DiagnosticMessage = diag!(2009, Error, "Function '{0}' already declared.");
    pub const UNDEFINED_FUNCTION_0: DiagnosticMessage = diag!(2010, Error, "Undefined function '{0}'.");
    pub const FUNCTION_0_REQUIRES_1_ARGUMENTS_BUT_WAS_GIVEN_2: DiagnosticMessage = diag!(2011, Error, "Function '{0}' requires {1} arguments but was given {2}.");
    pub const FUNCTION_0_REQUIRES_ARGUMENT_1_TO_BE_OF_TYPE_2_BUT_RECEIVED_3: DiagnosticMessage = diag!(2012, Error, "Function '{0}' requires argument '{1}' to be of type {2} but received {3}.");
    pub const TYPE_0_DOES_NOT_EXIST: DiagnosticMessage = diag!(2013, Error, "Type '{0}' does not exist.");
    pub const THE_KEYWORD_0_CAN_ONLY_BE_USED_IN_LOOPS: DiagnosticMessage = diag!(2014, Error, "The keyword {0} can only be used in loops.");
    pub const METHOD_0_IS_VOID_AND_CANNOT_RETURN_VALUE: DiagnosticMessage = diag!(2015, Error, "Method '{0}' is of type void and cannot return value.");
    pub const MISSING_0_RETURN_VALUE: DiagnosticMessage = diag!(2016, Error, "Missing {0} return value.");
    pub const RETURN_KEYWORD_IS_INVALID_OUTSIDE_METHODS: DiagnosticMessage = diag!(2017, Error, "Return keyword is invalid outside methods.");

    // ========================================================================
    // Flow analysis errors (3000-3099)
    // ========================================================================
    pub const NOT_ALL_PATHS_RETURN_A_VALUE: DiagnosticMessage = diag!(3001, Error, "Not all path return a value.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let msg = format_message(messages::CANNOT_CONVERT_TYPE_0_TO_1.message, &["bool", "int"]);
        assert_eq!(msg, "Cannot convert type 'bool' to 'int'.");
    }

    #[test]
    fn test_format_message_no_args() {
        let msg = format_message(messages::UNTERMINATED_STRING_LITERAL.message, &[]);
        assert_eq!(msg, "Unterminated string literal.");
    }

    #[test]
    fn test_format_message_three_args() {
        let msg = format_message(
            messages::BINARY_OPERATOR_0_IS_NOT_DEFINED_FOR_TYPES_1_AND_2.message,
            &["*", "int", "bool"],
        );
        assert_eq!(msg, "Binary operator '*' is not defined for types 'int' and 'bool'.");
    }

    #[test]
    fn test_format_message_four_args() {
        let msg = format_message(
            messages::FUNCTION_0_REQUIRES_ARGUMENT_1_TO_BE_OF_TYPE_2_BUT_RECEIVED_3.message,
            &["print", "text", "string", "int"],
        );
        assert_eq!(
            msg,
            "Function 'print' requires argument 'text' to be of type string but received int."
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(TextSpan::new(10, 5), &messages::VARIABLE_0_DOES_NOT_EXIST, &["foo"]);
        assert_eq!(diag.to_string(), "error MC2003: Variable 'foo' does not exist.");
        assert_eq!(diag.span, TextSpan::new(10, 5));
    }

    #[test]
    fn test_collection_keeps_report_order() {
        let mut first = DiagnosticCollection::new();
        first.report(TextSpan::new(4, 1), &messages::BAD_CHARACTER_INPUT_0, &["$"]);
        let mut second = DiagnosticCollection::new();
        second.report(TextSpan::new(0, 1), &messages::EXPRESSION_MUST_HAVE_A_VALUE, &[]);
        first.extend(second);

        assert_eq!(first.len(), 2);
        assert!(first.has_errors());
        let texts: Vec<&str> = first.iter().map(|d| d.message_text.as_str()).collect();
        assert_eq!(texts, vec!["bad character input: '$'.", "Expression must have a value."]);
    }
}
