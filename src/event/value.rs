//! Typed values produced by constraint evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constraint::error::{EvalError, EvalResult};

/// Type tags for [`Value`], used in coercion checks and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Boolean,
    Long,
    Double,
    String,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Long => "long",
            ValueKind::Double => "double",
            ValueKind::String => "string",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of evaluating a constraint subtree against one event.
///
/// Carries exactly one of four shapes and never changes after
/// construction. Coercions between shapes are pure and fail with
/// [`EvalError::TypeMismatch`] when the source shape cannot represent the
/// requested one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    Long(i64),
    Double(f64),
    String(String),
}

impl Value {
    /// Canonical boolean results for the boolean-heavy operator paths.
    pub const TRUE: Value = Value::Boolean(true);
    pub const FALSE: Value = Value::Boolean(false);

    /// Get the type tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Long(_) => ValueKind::Long,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
        }
    }

    /// Whether this value carries a numeric tag.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Long(_) | Value::Double(_))
    }

    /// Coerce to a boolean. Strings convert only for the exact tokens
    /// `true` and `false`.
    pub fn as_bool(&self) -> EvalResult<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            Value::String(s) if s == "true" => Ok(true),
            Value::String(s) if s == "false" => Ok(false),
            _ => Err(self.mismatch(ValueKind::Boolean)),
        }
    }

    /// Coerce to a signed integer. Numeric strings parse; doubles do not
    /// narrow (widening runs long to double only).
    pub fn as_long(&self) -> EvalResult<i64> {
        match self {
            Value::Long(n) => Ok(*n),
            Value::String(s) => s.parse().map_err(|_| self.mismatch(ValueKind::Long)),
            _ => Err(self.mismatch(ValueKind::Long)),
        }
    }

    /// Coerce to a float. Longs widen; numeric strings parse.
    pub fn as_double(&self) -> EvalResult<f64> {
        match self {
            Value::Double(d) => Ok(*d),
            Value::Long(n) => Ok(*n as f64),
            Value::String(s) => s.parse().map_err(|_| self.mismatch(ValueKind::Double)),
            _ => Err(self.mismatch(ValueKind::Double)),
        }
    }

    /// Coerce to a string. Numbers format canonically; booleans do not
    /// convert.
    pub fn as_string(&self) -> EvalResult<String> {
        match self {
            Value::String(s) => Ok(s.clone()),
            Value::Long(n) => Ok(n.to_string()),
            Value::Double(d) => Ok(d.to_string()),
            Value::Boolean(_) => Err(self.mismatch(ValueKind::String)),
        }
    }

    fn mismatch(&self, requested: ValueKind) -> EvalError {
        EvalError::TypeMismatch {
            requested,
            actual: self.kind(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        if b {
            Value::TRUE
        } else {
            Value::FALSE
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Long(n) => write!(f, "{}", n),
            Value::Double(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "'{}'", s),
        }
    }
}
