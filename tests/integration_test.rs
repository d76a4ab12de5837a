use std::sync::Arc;
use std::thread;

use serde_json::json;

use eventsieve::constraint::{
    evaluate_constraint, fold, walk, EvalError, Expression, FieldCollector, Order, Visitor,
};
use eventsieve::event::{FieldPath, JsonEvent};
use eventsieve::filter::Filter;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A realistic subscriber constraint:
/// exist header.priority and header.priority >= 4 and 'alert' ~ type
fn alert_constraint() -> Expression {
    let priority = FieldPath::parse("header.priority").unwrap();
    Expression::and(
        Expression::and(
            Expression::exists(priority.clone()),
            Expression::ge(Expression::field(priority), Expression::literal(4i64)),
        ),
        Expression::substr(
            Expression::literal("alert"),
            Expression::field(FieldPath::root("type")),
        ),
    )
}

fn alert_event(priority: i64) -> JsonEvent {
    JsonEvent::new(json!({
        "header": {"priority": priority},
        "type": "sensor.alert.temperature",
    }))
}

#[test]
fn test_end_to_end_constraint_evaluation() {
    init_logging();

    let expr = alert_constraint();

    assert_eq!(evaluate_constraint(&expr, &alert_event(5)), Ok(true));
    assert_eq!(evaluate_constraint(&expr, &alert_event(1)), Ok(false));

    // The exist guard turns a missing header into a clean non-match
    let headerless = JsonEvent::new(json!({"type": "sensor.alert.temperature"}));
    assert_eq!(evaluate_constraint(&expr, &headerless), Ok(false));
}

#[test]
fn test_concurrent_evaluation_of_shared_tree() {
    init_logging();

    let expr = Arc::new(alert_constraint());
    let mut handles = vec![];

    // Many threads, one tree, each thread with its own events; results
    // must depend only on each thread's own context
    for i in 0..8 {
        let expr = Arc::clone(&expr);
        handles.push(thread::spawn(move || {
            let expected = i % 2 == 0;
            for _ in 0..200 {
                let priority = if expected { 4 + i as i64 } else { i as i64 % 4 };
                let event = alert_event(priority);
                assert_eq!(evaluate_constraint(&expr, &event), Ok(expected));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_filter_match_and_attach() {
    init_logging();

    let filter = Arc::new(Filter::new());
    filter.attach(alert_constraint());

    let mut handles = vec![];

    // Matchers run while constraints come and go
    for _ in 0..4 {
        let filter = Arc::clone(&filter);
        handles.push(thread::spawn(move || {
            for _ in 0..200 {
                assert!(filter.matches(&alert_event(9)));
                assert!(!filter.matches(&JsonEvent::new(json!({"type": "noise"}))));
            }
        }));
    }
    for _ in 0..2 {
        let filter = Arc::clone(&filter);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let id = filter.attach(Expression::eq(
                    Expression::field(FieldPath::root("shard")),
                    Expression::literal(i as i64),
                ));
                assert!(filter.detach(id));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // The original constraint survived the churn
    assert_eq!(filter.len(), 1);
    assert!(filter.matches(&alert_event(9)));
}

#[test]
fn test_folded_tree_is_equivalent() {
    init_logging();

    // priority >= (2 * 2) and 'alert' ~ type
    let expr = Expression::and(
        Expression::ge(
            Expression::field(FieldPath::parse("header.priority").unwrap()),
            Expression::mul_expr(Expression::literal(2i64), Expression::literal(2i64)),
        ),
        Expression::substr(
            Expression::literal("alert"),
            Expression::field(FieldPath::root("type")),
        ),
    );
    let folded = fold(&expr);

    for priority in [0, 3, 4, 9] {
        let event = alert_event(priority);
        assert_eq!(
            evaluate_constraint(&expr, &event),
            evaluate_constraint(&folded, &event),
        );
    }
}

#[test]
fn test_serialized_constraint_round_trip() {
    init_logging();

    let expr = alert_constraint();
    let wire = serde_json::to_string(&expr).unwrap();
    let revived: Expression = serde_json::from_str(&wire).unwrap();

    assert_eq!(revived, expr);
    assert_eq!(
        evaluate_constraint(&revived, &alert_event(5)),
        evaluate_constraint(&expr, &alert_event(5)),
    );
}

#[test]
fn test_field_collection_for_indexing() {
    init_logging();

    let paths = FieldCollector::collect(&alert_constraint());
    assert_eq!(paths.len(), 2);
    assert!(paths.contains(&FieldPath::parse("header.priority").unwrap()));
    assert!(paths.contains(&FieldPath::root("type")));
}

#[test]
fn test_type_mismatch_surfaces_to_caller() {
    init_logging();

    let expr = Expression::eq(
        Expression::literal("abc"),
        Expression::field(FieldPath::parse("header.priority").unwrap()),
    );
    assert!(matches!(
        evaluate_constraint(&expr, &alert_event(5)),
        Err(EvalError::Incomparable { .. })
    ));
}

#[test]
fn test_visitor_failure_aborts_walk() {
    init_logging();

    /// Refuses trees that dereference fields outside an allowed set.
    struct AllowList {
        allowed: Vec<FieldPath>,
    }

    impl Visitor for AllowList {
        type Error = String;

        fn visit_field(&mut self, path: &FieldPath) -> Result<(), Self::Error> {
            if self.allowed.contains(path) {
                Ok(())
            } else {
                Err(format!("field {} is not subscribable", path))
            }
        }
    }

    let mut validator = AllowList {
        allowed: vec![FieldPath::parse("header.priority").unwrap()],
    };
    let verdict = walk(&alert_constraint(), &mut validator, Order::Pre);
    assert_eq!(verdict, Err("field type is not subscribable".to_string()));
}
