//! `when` guards on mixins and rulesets.

use std::cmp::Ordering;

use crate::error::Result;
use crate::parser::{CompareOp, Condition, Guard};
use crate::types::Value;

use super::Evaluator;
use super::env::Scope;
use super::operations::{OpMode, compare_numbers};

impl Evaluator<'_> {
    /// A guard holds when any of its comma separated conditions holds.
    pub(crate) fn eval_guard(&mut self, guard: &Guard, scope: &Scope) -> Result<bool> {
        for condition in &guard.conditions {
            if self.eval_condition(condition, scope)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn eval_condition(&mut self, condition: &Condition, scope: &Scope) -> Result<bool> {
        match condition {
            Condition::Compare { op, lhs, rhs } => {
                let a = self.eval_expr(lhs, scope, OpMode::Math)?;
                let b = self.eval_expr(rhs, scope, OpMode::Math)?;
                Ok(compare_values(*op, &a, &b))
            }
            Condition::Truthy(expr) => Ok(self.eval_expr(expr, scope, OpMode::Math)?.is_true()),
            Condition::And(conditions) => {
                for condition in conditions {
                    if !self.eval_condition(condition, scope)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::Not(inner) => Ok(!self.eval_condition(inner, scope)?),
        }
    }
}

/// Compare two values.
///
/// Numbers compare after unit conversion; values that cannot be ordered
/// (incompatible units, keywords) only satisfy `=` when their text matches.
pub fn compare_values(op: CompareOp, a: &Value, b: &Value) -> bool {
    let ordering = match (a, b) {
        (Value::Number { dim: x, .. }, Value::Number { dim: y, .. }) => compare_numbers(x, y),
        (Value::Color(x), Value::Color(y)) => {
            (x.rgb == y.rgb && x.alpha == y.alpha).then_some(Ordering::Equal)
        }
        _ => (a.to_unquoted() == b.to_unquoted()).then_some(Ordering::Equal),
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ge => ordering != Ordering::Less,
        CompareOp::Gt => ordering == Ordering::Greater,
    }
}
