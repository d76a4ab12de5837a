//! Constraint expression trees and their evaluation machinery.
//!
//! This module provides:
//! - Constraint AST representation
//! - Evaluation against one event through an [`EventContext`](crate::event::EventContext)
//! - Static (event-independent) subtree analysis and constant folding
//! - Multi-order visitor traversal for external passes

pub mod error;
pub mod eval;
pub mod fold;
pub mod node;
pub mod operator;
pub mod visitor;

pub use error::{EvalError, EvalResult};
pub use eval::{constraint_to_predicate, evaluate_constraint, Evaluator, Predicate};
pub use fold::fold;
pub use node::Expression;
pub use operator::{BinaryOperator, UnaryOperator};
pub use visitor::{walk, FieldCollector, Order, Visitor};
