//! Read-only access to the event under evaluation.

use anyhow::{bail, Context as _, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constraint::error::EvalResult;
use crate::event::value::Value;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathStep {
    /// Named component access (`header.priority`).
    Field(String),
    /// Positional element access (`recipients[2]`).
    Index(usize),
}

/// Dotted path addressing one field of a structured event.
///
/// Built by the grammar front end; the engine never re-validates it. The
/// textual form is `name.name[index].name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath {
    steps: Vec<PathStep>,
}

impl FieldPath {
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    /// Create a single-segment path.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            steps: vec![PathStep::Field(name.into())],
        }
    }

    /// Append a named component step.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.steps.push(PathStep::Field(name.into()));
        self
    }

    /// Append a positional step.
    pub fn index(mut self, index: usize) -> Self {
        self.steps.push(PathStep::Index(index));
        self
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Parse the dotted textual form, e.g. `header.recipients[2].name`.
    ///
    /// A convenience for builders and tests; production trees arrive with
    /// paths already structured.
    pub fn parse(text: &str) -> Result<Self> {
        let mut steps = Vec::new();
        for segment in text.split('.') {
            let (name, mut brackets) = match segment.find('[') {
                Some(pos) => segment.split_at(pos),
                None => (segment, ""),
            };
            if name.is_empty() {
                bail!("empty segment in field path {:?}", text);
            }
            steps.push(PathStep::Field(name.to_string()));
            while !brackets.is_empty() {
                let Some(close) = brackets.find(']') else {
                    bail!("unclosed index in field path {:?}", text);
                };
                let index: usize = brackets[1..close]
                    .parse()
                    .with_context(|| format!("bad index in field path {:?}", text))?;
                steps.push(PathStep::Index(index));
                brackets = &brackets[close + 1..];
                if !brackets.is_empty() && !brackets.starts_with('[') {
                    bail!("trailing characters after index in field path {:?}", text);
                }
            }
        }
        Ok(Self { steps })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for step in &self.steps {
            match step {
                PathStep::Field(name) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathStep::Index(index) => write!(f, "[{}]", index)?,
            }
            first = false;
        }
        Ok(())
    }
}

/// Read-only view of one event for the duration of one evaluation.
///
/// `resolve` yields `Ok(None)` for an absent path instead of failing, so
/// existence probing stays distinguishable from a field dereference that
/// assumed presence; the caller decides which one it is performing.
/// Traversing a path through a wrong-shape value is an error.
///
/// Implementations hold no per-evaluation mutable state and are never
/// retained by the tree, so one event view serves one tree walk and is
/// then discarded.
pub trait EventContext {
    /// Look up the scalar value at `path`; `Ok(None)` when absent.
    fn resolve(&self, path: &FieldPath) -> EvalResult<Option<Value>>;

    /// Whether `path` names anything in the event, without dereferencing
    /// the value it points at.
    fn exists(&self, path: &FieldPath) -> bool;

    /// Element `index` of the array at `path`; `Ok(None)` when the index
    /// is out of range.
    fn index(&self, path: &FieldPath, index: usize) -> EvalResult<Option<Value>>;
}

/// The event with no fields at all.
///
/// Backs context-free evaluation of static subtrees: a static subtree
/// never consults its context, so the empty event answers every probe
/// with "absent".
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyEvent;

impl EventContext for EmptyEvent {
    fn resolve(&self, _path: &FieldPath) -> EvalResult<Option<Value>> {
        Ok(None)
    }

    fn exists(&self, _path: &FieldPath) -> bool {
        false
    }

    fn index(&self, _path: &FieldPath, _index: usize) -> EvalResult<Option<Value>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_builders() {
        let path = FieldPath::root("header").field("recipients").index(2);
        assert_eq!(
            path.steps(),
            &[
                PathStep::Field("header".to_string()),
                PathStep::Field("recipients".to_string()),
                PathStep::Index(2),
            ]
        );
    }

    #[test]
    fn test_path_display() {
        let path = FieldPath::root("header").field("recipients").index(2).field("name");
        assert_eq!(path.to_string(), "header.recipients[2].name");

        assert_eq!(FieldPath::root("priority").to_string(), "priority");
    }

    #[test]
    fn test_path_parse_round_trip() {
        for text in ["priority", "header.priority", "items[0]", "a.b[1][2].c"] {
            let path = FieldPath::parse(text).unwrap();
            assert_eq!(path.to_string(), text);
        }
    }

    #[test]
    fn test_path_parse_rejects_malformed() {
        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("a..b").is_err());
        assert!(FieldPath::parse("a[").is_err());
        assert!(FieldPath::parse("a[x]").is_err());
        assert!(FieldPath::parse("a[1]b").is_err());
    }

    #[test]
    fn test_empty_event() {
        let path = FieldPath::root("anything");
        assert_eq!(EmptyEvent.resolve(&path).unwrap(), None);
        assert!(!EmptyEvent.exists(&path));
        assert_eq!(EmptyEvent.index(&path, 0).unwrap(), None);
    }
}
