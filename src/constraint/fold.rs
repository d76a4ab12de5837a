//! Constant folding of static subtrees.

use crate::constraint::eval::Evaluator;
use crate::constraint::node::Expression;
use crate::event::context::EmptyEvent;

/// Rewrite every maximal static subtree into the literal it evaluates to.
///
/// A static subtree never consults the event, so its value can be
/// computed once at attach time instead of per delivery decision. The
/// folded tree evaluates identically to the original for every context:
/// a static subtree whose evaluation fails (`10 / 0`) is left in place,
/// so the failure, or the boolean short-circuit that skips the subtree
/// entirely, still happens at evaluation time.
pub fn fold(expr: &Expression) -> Expression {
    if expr.is_static() {
        if let Ok(value) = Evaluator::new(&EmptyEvent).evaluate(expr) {
            return Expression::Literal(value);
        }
        return expr.clone();
    }

    match expr {
        Expression::Unary { op, operand } => Expression::Unary {
            op: *op,
            operand: Box::new(fold(operand)),
        },
        Expression::Binary { op, left, right } => Expression::Binary {
            op: *op,
            left: Box::new(fold(left)),
            right: Box::new(fold(right)),
        },
        other => other.clone(),
    }
}
