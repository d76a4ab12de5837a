//! Evaluation-time error taxonomy.

use thiserror::Error;

use crate::event::context::FieldPath;
use crate::event::value::ValueKind;

/// Errors raised while evaluating a constraint against one event.
///
/// Every variant is recoverable at the dispatcher level: a failed
/// evaluation means "this filter could not be applied to this event",
/// never a process-level fault. The engine itself neither logs nor
/// retries; failures propagate to the immediate caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("cannot interpret {actual} value as {requested}")]
    TypeMismatch {
        requested: ValueKind,
        actual: ValueKind,
    },

    #[error("operator {op} cannot combine {left} with {right}")]
    Incomparable {
        op: &'static str,
        left: ValueKind,
        right: ValueKind,
    },

    #[error("event has no field at {0}")]
    FieldAbsent(FieldPath),

    #[error("index {index} out of bounds at {path}")]
    IndexOutOfBounds { path: FieldPath, index: usize },

    #[error("cannot navigate {path}: {reason}")]
    BadPath { path: FieldPath, reason: String },

    #[error("division by zero")]
    DivisionByZero,
}

/// Result type for evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;
