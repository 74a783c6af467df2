//! Evaluation errors.

use mica_binder::{BoundNodeKind, TypeSymbol};

/// A failure while running a program that passed binding.
///
/// Variants marked internal indicate a bug in an earlier stage, never a
/// mistake in the user's program.
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    #[error("internal error: unexpected {0} reached the evaluator")]
    UnexpectedNode(BoundNodeKind),

    #[error("internal error: label '{0}' is not defined in the current body")]
    UndefinedLabel(String),

    #[error("internal error: {operation} is not defined for {ty} values")]
    TypeMismatch { operation: String, ty: TypeSymbol },

    /// A function read a global whose declaration has not run yet.
    #[error("variable '{0}' was read before it was assigned")]
    UnassignedVariable(String),

    #[error("internal error: function '{0}' has no bound body")]
    MissingBody(String),

    #[error("internal error: expression produced no value")]
    MissingValue,

    #[error("division by zero")]
    DivisionByZero,

    #[error("cannot convert '{value}' to {ty}")]
    InvalidConversion { value: String, ty: TypeSymbol },

    #[error("random: min ({min}) must not be greater than max ({max})")]
    InvalidRandomRange { min: i32, max: i32 },

    #[error("evaluation exceeded the step limit of {0}")]
    StepLimitExceeded(u64),

    #[error("call depth exceeded the limit of {0}")]
    CallDepthExceeded(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EvaluateError {
    /// Whether this error comes from a broken invariant rather than from
    /// the program being evaluated.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            EvaluateError::UnexpectedNode(_)
                | EvaluateError::UndefinedLabel(_)
                | EvaluateError::TypeMismatch { .. }
                | EvaluateError::MissingBody(_)
                | EvaluateError::MissingValue
        )
    }
}
