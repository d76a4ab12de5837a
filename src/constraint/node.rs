//! Constraint AST definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constraint::operator::{BinaryOperator, UnaryOperator};
use crate::event::context::FieldPath;
use crate::event::value::Value;

/// One node of a parsed constraint expression.
///
/// Trees are built once by the grammar front end (or deserialized from a
/// remote producer that did the parsing) with arity already validated,
/// and are never mutated afterwards. Evaluation takes `&self`, so one
/// tree can serve any number of concurrent evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Constant value.
    Literal(Value),

    /// Dereference of an event field by component path.
    Field(FieldPath),

    /// Array element access through the event's index probe.
    Index { path: FieldPath, index: usize },

    /// Existence probe; never dereferences the value it tests.
    Exists(FieldPath),

    /// Unary operation.
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    /// Binary operation.
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    /// Create a literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    /// Create a field dereference expression.
    pub fn field(path: FieldPath) -> Self {
        Expression::Field(path)
    }

    /// Create an array element access expression.
    pub fn index_at(path: FieldPath, index: usize) -> Self {
        Expression::Index { path, index }
    }

    /// Create an existence probe expression.
    pub fn exists(path: FieldPath) -> Self {
        Expression::Exists(path)
    }

    /// Create a unary operation expression.
    pub fn unary_op(op: UnaryOperator, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Create a binary operation expression.
    pub fn binary_op(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Create an AND expression.
    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::And, left, right)
    }

    /// Create an OR expression.
    pub fn or(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Or, left, right)
    }

    /// Create a NOT expression.
    pub fn not_expr(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::Not, operand)
    }

    /// Create a numeric negation expression.
    pub fn neg_expr(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::Neg, operand)
    }

    /// Create an equality expression.
    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Eq, left, right)
    }

    /// Create a not-equal expression.
    pub fn ne(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Ne, left, right)
    }

    /// Create a less-than expression.
    pub fn lt(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Lt, left, right)
    }

    /// Create a less-than-or-equal expression.
    pub fn le(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Le, left, right)
    }

    /// Create a greater-than expression.
    pub fn gt(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Gt, left, right)
    }

    /// Create a greater-than-or-equal expression.
    pub fn ge(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Ge, left, right)
    }

    /// Create an addition expression.
    pub fn add_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Add, left, right)
    }

    /// Create a subtraction expression.
    pub fn sub_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Sub, left, right)
    }

    /// Create a multiplication expression.
    pub fn mul_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Mul, left, right)
    }

    /// Create a division expression.
    pub fn div_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Div, left, right)
    }

    /// Create a substring-containment expression: true when `needle`
    /// occurs anywhere inside `haystack`.
    pub fn substr(needle: Expression, haystack: Expression) -> Self {
        Self::binary_op(BinaryOperator::Substr, needle, haystack)
    }

    /// Whether this subtree's value is independent of the event under
    /// test: literals are, field accesses are not, and operators are
    /// static when all of their operands are.
    pub fn is_static(&self) -> bool {
        match self {
            Expression::Literal(_) => true,
            Expression::Field(_) | Expression::Index { .. } | Expression::Exists(_) => false,
            Expression::Unary { operand, .. } => operand.is_static(),
            Expression::Binary { left, right, .. } => left.is_static() && right.is_static(),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Field(path) => write!(f, "$.{}", path),
            Expression::Index { path, index } => write!(f, "$.{}[{}]", path, index),
            Expression::Exists(path) => write!(f, "exist $.{}", path),
            Expression::Unary { op, operand } => write!(f, "{} {}", op.as_str(), operand),
            Expression::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.as_str(), right)
            }
        }
    }
}
