//! Numeric promotion ladder
//!
//! Kinds rank Integer < Long < Rational < Float < Double. Integral pairs
//! use checked 64-bit arithmetic; everything else (and any overflow) is
//! computed in `f64`. A result that is finite, whole and inside the `i64`
//! range collapses to Integer. Other results take the widest floating kind
//! among the operands, or Double when both operands were integral.

use super::error::{InterpResult, RuntimeError};
use super::value::{unsupported, Value, ValueKind};
use std::cmp::Ordering;

/// Arithmetic operators subject to promotion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arith {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl Arith {
    pub fn symbol(self) -> &'static str {
        match self {
            Arith::Add => "+",
            Arith::Subtract => "-",
            Arith::Multiply => "*",
            Arith::Divide => "/",
            Arith::Modulo => "%",
        }
    }
}

/// Position on the ladder, `None` for non-numeric kinds
pub fn rank(kind: ValueKind) -> Option<u8> {
    match kind {
        ValueKind::Integer => Some(0),
        ValueKind::Long => Some(1),
        ValueKind::Rational => Some(2),
        ValueKind::Float => Some(3),
        ValueKind::Double => Some(4),
        _ => None,
    }
}

fn is_integral(kind: ValueKind) -> bool {
    matches!(kind, ValueKind::Integer | ValueKind::Long)
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(n) | Value::Long(n) => Some(*n),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(n) | Value::Long(n) => Some(*n as f64),
        Value::Rational(x) | Value::Double(x) => Some(*x),
        Value::Float(x) => Some(f64::from(*x)),
        _ => None,
    }
}

/// 2^63; every f64 strictly below it (and at or above -2^63) fits an i64
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Collapse a floating result, falling back to `widest`'s kind
pub fn collapse(result: f64, widest: ValueKind) -> Value {
    // Float results are rounded first so the collapse sees the stored value
    let result = match widest {
        ValueKind::Float => f64::from(result as f32),
        _ => result,
    };
    if result.is_finite() && result == result.floor() && (-I64_BOUND..I64_BOUND).contains(&result) {
        return Value::Integer(result as i64);
    }
    match widest {
        ValueKind::Rational => Value::Rational(result),
        ValueKind::Float => Value::Float(result as f32),
        _ => Value::Double(result),
    }
}

fn widest(a: ValueKind, b: ValueKind) -> ValueKind {
    if rank(a) >= rank(b) { a } else { b }
}

/// Apply `op` to two numeric values
pub fn arithmetic(op: Arith, a: &Value, b: &Value) -> InterpResult<Value> {
    let (ka, kb) = (a.kind(), b.kind());
    if rank(ka).is_none() || rank(kb).is_none() {
        return Err(unsupported(op.symbol(), a, b));
    }

    if is_integral(ka) && is_integral(kb) && op != Arith::Divide {
        if let (Some(x), Some(y)) = (as_i64(a), as_i64(b)) {
            let exact = match op {
                Arith::Add => x.checked_add(y),
                Arith::Subtract => x.checked_sub(y),
                Arith::Multiply => x.checked_mul(y),
                Arith::Modulo => x.checked_rem(y),
                Arith::Divide => None,
            };
            if let Some(n) = exact {
                return Ok(Value::Integer(n));
            }
        }
    }

    let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) else {
        return Err(unsupported(op.symbol(), a, b));
    };
    let result = match op {
        Arith::Add => x + y,
        Arith::Subtract => x - y,
        Arith::Multiply => x * y,
        Arith::Divide => x / y,
        Arith::Modulo => x % y,
    };
    Ok(collapse(result, widest(ka, kb)))
}

/// Arithmetic negation; keeps the operand's kind except on Integer overflow
pub fn negate(value: &Value) -> InterpResult<Value> {
    match value {
        Value::Integer(n) => Ok(n
            .checked_neg()
            .map_or(Value::Double(-(*n as f64)), Value::Integer)),
        Value::Long(n) => Ok(n
            .checked_neg()
            .map_or(Value::Double(-(*n as f64)), Value::Long)),
        Value::Rational(x) => Ok(Value::Rational(-x)),
        Value::Float(x) => Ok(Value::Float(-x)),
        Value::Double(x) => Ok(Value::Double(-x)),
        other => Err(RuntimeError::type_error(format!(
            "cannot negate {}",
            other.describe()
        ))),
    }
}

/// Ordering of two numeric values; `None` if either is NaN or non-numeric
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_i64(a), as_i64(b)) {
        return Some(x.cmp(&y));
    }
    as_f64(a)?.partial_cmp(&as_f64(b)?)
}

/// Parse number-literal text. Suffixes: `L` Long, `f` Float, `r` Rational,
/// `d` Double. Unsuffixed text with a point or exponent is a Double,
/// otherwise an Integer (Double when it overflows).
pub fn parse_number(text: &str) -> Option<Value> {
    let text = text.trim().replace('_', "");
    let (body, suffix) = match text.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E') => (&text[..i], Some(c)),
        _ => (text.as_str(), None),
    };
    match suffix.map(|c| c.to_ascii_lowercase()) {
        Some('l') => body.parse().ok().map(Value::Long),
        Some('f') => body.parse().ok().map(Value::Float),
        Some('r') => body.parse().ok().map(Value::Rational),
        Some('d') => body.parse().ok().map(Value::Double),
        Some(_) => None,
        None if body.contains(['.', 'e', 'E']) => body.parse().ok().map(Value::Double),
        None => body
            .parse()
            .map(Value::Integer)
            .ok()
            .or_else(|| body.parse().ok().map(Value::Double)),
    }
}
