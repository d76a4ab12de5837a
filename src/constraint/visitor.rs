//! Visitor protocol for constraint-tree traversal.
//!
//! External passes (constraint indexing, printing, validation) inspect
//! trees without the tree knowing what the pass does: [`walk`] dispatches
//! one callback per node, keyed to the node's kind, in the caller's
//! chosen order. A callback returning `Err` aborts the remaining walk.

use std::collections::HashSet;
use std::convert::Infallible;

use crate::constraint::node::Expression;
use crate::constraint::operator::{BinaryOperator, UnaryOperator};
use crate::event::context::FieldPath;
use crate::event::value::Value;

/// Traversal orders for [`walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Self, then left, then right.
    Pre,
    /// Left, then self, then right.
    In,
    /// Left, then right, then self.
    Post,
}

/// Per-kind callbacks for one pass over a constraint tree.
///
/// Every callback defaults to doing nothing, so a pass implements only
/// the kinds it cares about. Callbacks receive the node's payload;
/// operator callbacks also see the (not yet walked) operand subtrees.
pub trait Visitor {
    type Error;

    fn visit_literal(&mut self, _value: &Value) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_field(&mut self, _path: &FieldPath) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_index(&mut self, _path: &FieldPath, _index: usize) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_exists(&mut self, _path: &FieldPath) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_unary(
        &mut self,
        _op: UnaryOperator,
        _operand: &Expression,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_binary(
        &mut self,
        _op: BinaryOperator,
        _left: &Expression,
        _right: &Expression,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Walk `expr`, dispatching one callback per node in the given order.
///
/// The first callback failure aborts the walk; no further nodes are
/// visited.
pub fn walk<V: Visitor>(expr: &Expression, visitor: &mut V, order: Order) -> Result<(), V::Error> {
    match expr {
        Expression::Literal(value) => visitor.visit_literal(value),
        Expression::Field(path) => visitor.visit_field(path),
        Expression::Index { path, index } => visitor.visit_index(path, *index),
        Expression::Exists(path) => visitor.visit_exists(path),

        Expression::Unary { op, operand } => match order {
            Order::Pre => {
                visitor.visit_unary(*op, operand)?;
                walk(operand, visitor, order)
            }
            // With a single operand, in-order and post-order coincide
            Order::In | Order::Post => {
                walk(operand, visitor, order)?;
                visitor.visit_unary(*op, operand)
            }
        },

        Expression::Binary { op, left, right } => match order {
            Order::Pre => {
                visitor.visit_binary(*op, left, right)?;
                walk(left, visitor, order)?;
                walk(right, visitor, order)
            }
            Order::In => {
                walk(left, visitor, order)?;
                visitor.visit_binary(*op, left, right)?;
                walk(right, visitor, order)
            }
            Order::Post => {
                walk(left, visitor, order)?;
                walk(right, visitor, order)?;
                visitor.visit_binary(*op, left, right)
            }
        },
    }
}

/// Collects the distinct field paths a constraint dereferences or probes.
///
/// The building block for field-to-subscriber reverse indexing: the union
/// of collected paths over a channel's filters tells the dispatcher which
/// fields matter at all.
#[derive(Debug, Default)]
pub struct FieldCollector {
    paths: HashSet<FieldPath>,
}

impl FieldCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gather every referenced path in one pass.
    pub fn collect(expr: &Expression) -> HashSet<FieldPath> {
        let mut collector = FieldCollector::new();
        // The collector cannot fail, so the walk cannot abort
        let _ = walk(expr, &mut collector, Order::Pre);
        collector.paths
    }

    pub fn into_paths(self) -> HashSet<FieldPath> {
        self.paths
    }
}

impl Visitor for FieldCollector {
    type Error = Infallible;

    fn visit_field(&mut self, path: &FieldPath) -> Result<(), Self::Error> {
        self.paths.insert(path.clone());
        Ok(())
    }

    fn visit_index(&mut self, path: &FieldPath, _index: usize) -> Result<(), Self::Error> {
        self.paths.insert(path.clone());
        Ok(())
    }

    fn visit_exists(&mut self, path: &FieldPath) -> Result<(), Self::Error> {
        self.paths.insert(path.clone());
        Ok(())
    }
}
