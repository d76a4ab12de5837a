//! Filters: attached constraint sets with match-any semantics.
//!
//! A subscriber's filter holds any number of compiled constraints; an
//! event passes the filter when at least one constraint matches it. The
//! strict per-constraint verdict stays available through
//! [`evaluate_constraint`]; this layer applies the dispatcher-side policy
//! of reading a constraint that failed to evaluate as a non-match.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use log::{debug, warn};

use crate::constraint::eval::evaluate_constraint;
use crate::constraint::fold::fold;
use crate::constraint::node::Expression;
use crate::event::context::EventContext;

/// Identifier handed out for one attached constraint.
pub type ConstraintId = u64;

/// A set of constraints attached by one subscriber.
///
/// Attach, detach and match may run concurrently: the expression trees
/// themselves are immutable, and the constraint table is sharded. One
/// filter instance is typically shared behind an `Arc` by the channel
/// dispatcher.
#[derive(Debug, Default)]
pub struct Filter {
    constraints: DashMap<ConstraintId, Expression>,
    next_id: AtomicU64,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a compiled constraint, folding its static subtrees once so
    /// per-event evaluation never redoes event-independent work.
    pub fn attach(&self, expr: Expression) -> ConstraintId {
        let folded = fold(&expr);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("attach constraint {}: {}", id, folded);
        self.constraints.insert(id, folded);
        id
    }

    /// Detach a constraint; returns whether it was attached.
    pub fn detach(&self, id: ConstraintId) -> bool {
        let removed = self.constraints.remove(&id).is_some();
        if removed {
            debug!("detach constraint {}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Decide delivery for one event: true when any attached constraint
    /// matches. A constraint that fails to evaluate against this event is
    /// logged and counts as a non-match; sibling constraints still run.
    pub fn matches<C: EventContext>(&self, context: &C) -> bool {
        for entry in self.constraints.iter() {
            match evaluate_constraint(entry.value(), context) {
                Ok(true) => return true,
                Ok(false) => {}
                Err(err) => {
                    warn!("constraint {} not evaluable for event: {}", entry.key(), err);
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::context::FieldPath;
    use crate::event::json::JsonEvent;
    use serde_json::json;

    fn priority_above(threshold: i64) -> Expression {
        Expression::gt(
            Expression::field(FieldPath::root("priority")),
            Expression::literal(threshold),
        )
    }

    #[test]
    fn test_empty_filter_matches_nothing() {
        let filter = Filter::new();
        assert!(filter.is_empty());
        assert!(!filter.matches(&JsonEvent::new(json!({"priority": 10}))));
    }

    #[test]
    fn test_match_any_constraint() {
        let filter = Filter::new();
        filter.attach(priority_above(5));
        filter.attach(Expression::eq(
            Expression::field(FieldPath::root("source")),
            Expression::literal("sensor-7"),
        ));
        assert_eq!(filter.len(), 2);

        // First constraint misses, second hits
        assert!(filter.matches(&JsonEvent::new(json!({
            "priority": 1,
            "source": "sensor-7",
        }))));
        // Neither hits
        assert!(!filter.matches(&JsonEvent::new(json!({
            "priority": 1,
            "source": "sensor-9",
        }))));
    }

    #[test]
    fn test_detach() {
        let filter = Filter::new();
        let id = filter.attach(priority_above(5));
        let event = JsonEvent::new(json!({"priority": 10}));

        assert!(filter.matches(&event));
        assert!(filter.detach(id));
        assert!(!filter.matches(&event));
        assert!(!filter.detach(id));
    }

    #[test]
    fn test_failing_constraint_reads_as_non_match() {
        let filter = Filter::new();
        // Dereferences a field the event does not carry
        filter.attach(Expression::eq(
            Expression::field(FieldPath::root("missing")),
            Expression::literal(1i64),
        ));
        filter.attach(priority_above(5));

        let event = JsonEvent::new(json!({"priority": 10}));
        // The failing constraint neither matches nor poisons its sibling
        assert!(filter.matches(&event));

        let low = JsonEvent::new(json!({"priority": 1}));
        assert!(!filter.matches(&low));
    }

    #[test]
    fn test_attach_folds_static_subtrees() {
        let filter = Filter::new();
        let id = filter.attach(Expression::gt(
            Expression::field(FieldPath::root("priority")),
            Expression::add_expr(Expression::literal(2i64), Expression::literal(3i64)),
        ));

        let stored = filter.constraints.get(&id).unwrap();
        assert_eq!(
            *stored.value(),
            Expression::gt(
                Expression::field(FieldPath::root("priority")),
                Expression::literal(5i64),
            )
        );
    }

    #[test]
    fn test_ids_are_distinct() {
        let filter = Filter::new();
        let a = filter.attach(priority_above(1));
        let b = filter.attach(priority_above(2));
        assert_ne!(a, b);
    }
}
