//! Arithmetic on evaluated values.
//!
//! ## Unit rules
//!
//! | operation | operands | result unit |
//! |-----------|----------|-------------|
//! | `+ -` | `a`, unitless | unit of `a` |
//! | `+ -` | `a`, `b` convertible | unit of the left operand |
//! | `+ -` | `a`, `b` not convertible | [`LessError::UnitMismatch`] |
//! | `*` | `a`, unitless | unit of `a` |
//! | `/` | `a`, same group as `a` | unitless |
//!
//! Colors combine channel by channel; a number used with a color applies to
//! every channel.

use crate::error::{LessError, Position, Result};
use crate::parser::Op;
use crate::types::{Color, Dimension, Separator, Value};

/// How `/` and other operators are treated in the current context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpMode {
    /// Evaluate arithmetic.
    Math,
    /// Like `Math`, but a top-level `/` is a literal separator (`font`, media features).
    Slash,
    /// Print operations as written (`calc()` arguments).
    Literal,
}

/// Apply `op` to two values.
pub fn operate(op: Op, lhs: Value, rhs: Value, position: &Position) -> Result<Value> {
    match (lhs, rhs) {
        (Value::Number { dim: a, .. }, Value::Number { dim: b, .. }) => {
            operate_numbers(op, &a, &b, position).map(|dim| Value::Number { dim, raw: None })
        }
        (Value::Color(a), Value::Color(b)) => Ok(Value::Color(operate_colors(op, &a, &b, position)?)),
        (Value::Color(a), Value::Number { dim, .. }) => {
            let b = gray(dim.value, a.alpha);
            Ok(Value::Color(operate_colors(op, &a, &b, position)?))
        }
        (Value::Number { dim, .. }, Value::Color(b)) => {
            let a = gray(dim.value, b.alpha);
            Ok(Value::Color(operate_colors(op, &a, &b, position)?))
        }
        (lhs, rhs) if op == Op::Div => Ok(Value::List {
            items: vec![lhs, rhs],
            separator: Separator::Slash,
        }),
        (lhs, rhs) => Err(LessError::InvalidOperation {
            position: position.clone(),
            message: format!(
                "cannot apply '{}' to {} and {}",
                op.symbol(),
                lhs.to_css(),
                rhs.to_css()
            ),
        }),
    }
}

fn gray(value: f64, alpha: f64) -> Color {
    Color::rgba(value, value, value, alpha)
}

fn mismatch(a: &Dimension, b: &Dimension, position: &Position) -> LessError {
    LessError::UnitMismatch {
        position: position.clone(),
        left: a.unit.clone(),
        right: b.unit.clone(),
    }
}

/// Arithmetic on two numbers with the unit rules above.
pub fn operate_numbers(
    op: Op,
    a: &Dimension,
    b: &Dimension,
    position: &Position,
) -> Result<Dimension> {
    // The unit the result is expressed in and the right operand converted to it.
    let (unit, b_value) = if a.is_unitless() {
        (b.unit.clone(), b.value)
    } else {
        let converted = b.convert_to(&a.unit).ok_or_else(|| mismatch(a, b, position))?;
        (a.unit.clone(), converted.value)
    };

    let result = match op {
        Op::Add => Dimension::new(a.value + b_value, unit),
        Op::Sub => Dimension::new(a.value - b_value, unit),
        Op::Mul => Dimension::new(a.value * b_value, unit),
        Op::Div => {
            if b_value == 0.0 {
                return Err(LessError::InvalidOperation {
                    position: position.clone(),
                    message: "division by zero".to_string(),
                });
            }
            let unit = if !a.is_unitless() && !b.is_unitless() {
                String::new()
            } else {
                unit
            };
            Dimension::new(a.value / b_value, unit)
        }
    };
    Ok(result)
}

fn operate_colors(op: Op, a: &Color, b: &Color, position: &Position) -> Result<Color> {
    let mut rgb = [0.0; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let (x, y) = (a.rgb[i], b.rgb[i]);
        *channel = match op {
            Op::Add => x + y,
            Op::Sub => x - y,
            Op::Mul => x * y,
            Op::Div => {
                if y == 0.0 {
                    return Err(LessError::InvalidOperation {
                        position: position.clone(),
                        message: "division by zero".to_string(),
                    });
                }
                x / y
            }
        };
    }
    let alpha = a.alpha * (1.0 - b.alpha) + b.alpha;
    Ok(Color::rgba(rgb[0], rgb[1], rgb[2], alpha))
}

/// Numeric comparison for guards; `None` when the operands do not compare.
pub fn compare_numbers(a: &Dimension, b: &Dimension) -> Option<std::cmp::Ordering> {
    let b = if a.is_unitless() || b.is_unitless() {
        b.value
    } else {
        b.convert_to(&a.unit)?.value
    };
    a.value.partial_cmp(&b)
}
