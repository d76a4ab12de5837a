//! JSON-backed event adapter.
//!
//! Structured events reach the engine as self-describing documents; this
//! adapter exposes a `serde_json::Value` payload through [`EventContext`]
//! so the evaluator never sees the concrete wire shape.

use anyhow::{Context as _, Result};
use serde_json::Value as Json;

use crate::constraint::error::{EvalError, EvalResult};
use crate::event::context::{EventContext, FieldPath, PathStep};
use crate::event::value::Value;

/// One event materialized as a JSON document.
///
/// Wraps exactly one payload for the duration of one evaluation; holds no
/// other state, so a fresh `JsonEvent` per delivery decision is cheap.
#[derive(Debug, Clone)]
pub struct JsonEvent {
    body: Json,
}

impl JsonEvent {
    pub fn new(body: Json) -> Self {
        Self { body }
    }

    pub fn from_str(text: &str) -> Result<Self> {
        let body = serde_json::from_str(text).context("event payload is not valid JSON")?;
        Ok(Self::new(body))
    }

    pub fn body(&self) -> &Json {
        &self.body
    }

    /// Walk `path` through the document. `Ok(None)` when a step names a
    /// missing member or an out-of-range element; `Err` when a step tries
    /// to traverse through a value of the wrong shape.
    fn locate(&self, path: &FieldPath) -> EvalResult<Option<&Json>> {
        let mut current = &self.body;
        for step in path.steps() {
            current = match (step, current) {
                (PathStep::Field(name), Json::Object(members)) => match members.get(name) {
                    Some(value) => value,
                    None => return Ok(None),
                },
                (PathStep::Index(index), Json::Array(items)) => match items.get(*index) {
                    Some(value) => value,
                    None => return Ok(None),
                },
                (PathStep::Field(name), _) => {
                    return Err(EvalError::BadPath {
                        path: path.clone(),
                        reason: format!("cannot take member {:?} of a non-structure", name),
                    })
                }
                (PathStep::Index(index), _) => {
                    return Err(EvalError::BadPath {
                        path: path.clone(),
                        reason: format!("cannot take element [{}] of a non-array", index),
                    })
                }
            };
        }
        Ok(Some(current))
    }

    fn scalar(&self, json: &Json, path: &FieldPath) -> EvalResult<Value> {
        match json {
            Json::Bool(b) => Ok(Value::from(*b)),
            Json::Number(n) => {
                if let Some(long) = n.as_i64() {
                    Ok(Value::Long(long))
                } else if let Some(double) = n.as_f64() {
                    Ok(Value::Double(double))
                } else {
                    // u64 above i64::MAX with no f64 representation
                    Err(EvalError::BadPath {
                        path: path.clone(),
                        reason: format!("number {} is out of range", n),
                    })
                }
            }
            Json::String(s) => Ok(Value::String(s.clone())),
            Json::Null => Err(EvalError::BadPath {
                path: path.clone(),
                reason: "field is null".to_string(),
            }),
            Json::Array(_) | Json::Object(_) => Err(EvalError::BadPath {
                path: path.clone(),
                reason: "field is not a scalar".to_string(),
            }),
        }
    }
}

impl EventContext for JsonEvent {
    fn resolve(&self, path: &FieldPath) -> EvalResult<Option<Value>> {
        match self.locate(path)? {
            Some(json) => Ok(Some(self.scalar(json, path)?)),
            None => Ok(None),
        }
    }

    fn exists(&self, path: &FieldPath) -> bool {
        // Presence only: a null or structured field still exists, and a
        // wrong-shape path simply names nothing.
        matches!(self.locate(path), Ok(Some(_)))
    }

    fn index(&self, path: &FieldPath, index: usize) -> EvalResult<Option<Value>> {
        match self.locate(path)? {
            None => Err(EvalError::FieldAbsent(path.clone())),
            Some(Json::Array(items)) => match items.get(index) {
                Some(json) => Ok(Some(self.scalar(json, path)?)),
                None => Ok(None),
            },
            Some(_) => Err(EvalError::BadPath {
                path: path.clone(),
                reason: "field is not an array".to_string(),
            }),
        }
    }
}
