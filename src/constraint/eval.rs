//! Constraint evaluation against one event.

use std::cmp::Ordering;

use crate::constraint::error::{EvalError, EvalResult};
use crate::constraint::node::Expression;
use crate::constraint::operator::{BinaryOperator, UnaryOperator};
use crate::event::context::{EventContext, FieldPath};
use crate::event::value::{Value, ValueKind};

/// Evaluator for constraint trees.
///
/// Borrows one event view for one tree walk and holds nothing else, so
/// any number of evaluators may share one tree across threads.
pub struct Evaluator<'a, C: EventContext> {
    context: &'a C,
}

impl<'a, C: EventContext> Evaluator<'a, C> {
    pub fn new(context: &'a C) -> Self {
        Self { context }
    }

    /// Evaluate an expression and return the resulting value.
    pub fn evaluate(&self, expr: &Expression) -> EvalResult<Value> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),

            Expression::Field(path) => self.evaluate_field(path),

            Expression::Index { path, index } => self.evaluate_index(path, *index),

            // A pure presence probe: the value is never dereferenced, so
            // a missing field is an answer here, not a failure.
            Expression::Exists(path) => Ok(Value::from(self.context.exists(path))),

            Expression::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                apply_unary(*op, value)
            }

            Expression::Binary { op, left, right } => self.evaluate_binary(*op, left, right),
        }
    }

    fn evaluate_field(&self, path: &FieldPath) -> EvalResult<Value> {
        self.context
            .resolve(path)?
            .ok_or_else(|| EvalError::FieldAbsent(path.clone()))
    }

    fn evaluate_index(&self, path: &FieldPath, index: usize) -> EvalResult<Value> {
        self.context
            .index(path, index)?
            .ok_or_else(|| EvalError::IndexOutOfBounds {
                path: path.clone(),
                index,
            })
    }

    fn evaluate_binary(
        &self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> EvalResult<Value> {
        // The boolean connectives decide on the left operand alone when
        // they can, so an exist-guarded right operand is never touched.
        match op {
            BinaryOperator::And => {
                if !self.evaluate(left)?.as_bool()? {
                    return Ok(Value::FALSE);
                }
                Ok(Value::from(self.evaluate(right)?.as_bool()?))
            }
            BinaryOperator::Or => {
                if self.evaluate(left)?.as_bool()? {
                    return Ok(Value::TRUE);
                }
                Ok(Value::from(self.evaluate(right)?.as_bool()?))
            }
            _ => {
                let lhs = self.evaluate(left)?;
                let rhs = self.evaluate(right)?;
                apply_binary(op, lhs, rhs)
            }
        }
    }
}

/// Apply a unary operator to an already-evaluated operand.
pub fn apply_unary(op: UnaryOperator, value: Value) -> EvalResult<Value> {
    match op {
        UnaryOperator::Not => Ok(Value::from(!value.as_bool()?)),
        UnaryOperator::Neg => match value {
            Value::Long(n) => Ok(Value::Long(n.wrapping_neg())),
            Value::Double(d) => Ok(Value::Double(-d)),
            other => Err(EvalError::TypeMismatch {
                requested: ValueKind::Double,
                actual: other.kind(),
            }),
        },
    }
}

/// Apply a binary operator to already-evaluated operands.
///
/// `and`/`or` combine here without short-circuiting; the evaluator only
/// reaches this path once both operands are in hand.
pub fn apply_binary(op: BinaryOperator, lhs: Value, rhs: Value) -> EvalResult<Value> {
    match op {
        BinaryOperator::Add => numeric(op, lhs, rhs, i64::wrapping_add, |a, b| a + b),
        BinaryOperator::Sub => numeric(op, lhs, rhs, i64::wrapping_sub, |a, b| a - b),
        BinaryOperator::Mul => numeric(op, lhs, rhs, i64::wrapping_mul, |a, b| a * b),
        BinaryOperator::Div => {
            if let (Value::Long(_), Value::Long(0)) = (&lhs, &rhs) {
                return Err(EvalError::DivisionByZero);
            }
            // Float division follows IEEE and may produce infinities
            numeric(op, lhs, rhs, i64::wrapping_div, |a, b| a / b)
        }

        BinaryOperator::Eq => compare(op, lhs, rhs, |ord| ord == Ordering::Equal),
        BinaryOperator::Ne => compare(op, lhs, rhs, |ord| ord != Ordering::Equal),
        BinaryOperator::Lt => compare(op, lhs, rhs, |ord| ord == Ordering::Less),
        BinaryOperator::Le => compare(op, lhs, rhs, |ord| ord != Ordering::Greater),
        BinaryOperator::Gt => compare(op, lhs, rhs, |ord| ord == Ordering::Greater),
        BinaryOperator::Ge => compare(op, lhs, rhs, |ord| ord != Ordering::Less),

        BinaryOperator::And => Ok(Value::from(lhs.as_bool()? && rhs.as_bool()?)),
        BinaryOperator::Or => Ok(Value::from(lhs.as_bool()? || rhs.as_bool()?)),

        BinaryOperator::Substr => {
            let needle = lhs.as_string()?;
            let haystack = rhs.as_string()?;
            Ok(Value::from(haystack.contains(&needle)))
        }
    }
}

fn numeric(
    op: BinaryOperator,
    lhs: Value,
    rhs: Value,
    long_fn: fn(i64, i64) -> i64,
    double_fn: fn(f64, f64) -> f64,
) -> EvalResult<Value> {
    match (&lhs, &rhs) {
        (Value::Long(a), Value::Long(b)) => Ok(Value::Long(long_fn(*a, *b))),
        // Either operand being a double widens the whole computation
        _ if lhs.is_numeric() && rhs.is_numeric() => {
            Ok(Value::Double(double_fn(lhs.as_double()?, rhs.as_double()?)))
        }
        _ => Err(EvalError::Incomparable {
            op: op.as_str(),
            left: lhs.kind(),
            right: rhs.kind(),
        }),
    }
}

/// Coerce both operands to a common type and order them.
fn compare(
    op: BinaryOperator,
    lhs: Value,
    rhs: Value,
    take: fn(Ordering) -> bool,
) -> EvalResult<Value> {
    let incomparable = || EvalError::Incomparable {
        op: op.as_str(),
        left: lhs.kind(),
        right: rhs.kind(),
    };

    let ordering = match (&lhs, &rhs) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
        (Value::Long(a), Value::Long(b)) => a.cmp(b),

        // A boolean against a string: the string must be a boolean token
        (Value::Boolean(_), Value::String(_)) | (Value::String(_), Value::Boolean(_)) => {
            let a = lhs.as_bool().map_err(|_| incomparable())?;
            let b = rhs.as_bool().map_err(|_| incomparable())?;
            a.cmp(&b)
        }

        // Mixed numerics (and numeric strings against numbers) order as
        // doubles; a string that does not parse is incomparable, never a
        // silent false
        _ if lhs.is_numeric() || rhs.is_numeric() => {
            let a = lhs.as_double().map_err(|_| incomparable())?;
            let b = rhs.as_double().map_err(|_| incomparable())?;
            a.partial_cmp(&b).ok_or_else(incomparable)?
        }

        _ => return Err(incomparable()),
    };

    Ok(Value::from(take(ordering)))
}

/// Evaluate `expr` against `context`, requiring a boolean verdict.
///
/// The delivery decision for one (event, filter) pair.
pub fn evaluate_constraint<C: EventContext>(expr: &Expression, context: &C) -> EvalResult<bool> {
    Evaluator::new(context).evaluate(expr)?.as_bool()
}

/// Type alias for boxed match predicates.
pub type Predicate<C> = Box<dyn Fn(&C) -> bool + Send + Sync + 'static>;

/// Wrap an expression as a predicate over event views; evaluation failure
/// and non-boolean verdicts both read as "no match".
pub fn constraint_to_predicate<C: EventContext>(expr: Expression) -> Predicate<C> {
    Box::new(move |context| evaluate_constraint(&expr, context).unwrap_or(false))
}
