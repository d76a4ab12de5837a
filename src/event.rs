//! Event-side abstractions: the values constraints compute over and the
//! read-only view a constraint evaluates against.

pub mod context;
pub mod json;
pub mod value;

pub use context::{EmptyEvent, EventContext, FieldPath, PathStep};
pub use json::JsonEvent;
pub use value::{Value, ValueKind};
