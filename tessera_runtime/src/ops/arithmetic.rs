//! Arithmetic and unary dispatch.
//!
//! Provides type-specialized fast paths for int/float operands, with
//! fallback to slot-table dispatch for object operands. Primitive
//! pairs never consult user tables.
//!
//! Integer semantics: checked arithmetic surfacing `OverflowError`,
//! Euclidean floor division and modulo, division by zero surfacing
//! `ZeroDivisionError`. Mixed int/float operands promote to float;
//! true division always produces a float.

use crate::object::type_obj::{BinaryOp, HandlerResult, UnaryOp};
use crate::ops::dispatch;
use tessera_core::{ProtocolError, Value};

// =============================================================================
// Numeric Coercion
// =============================================================================

/// Widen a primitive numeric operand to f64. Bools and strings are not
/// numeric here.
#[inline]
fn to_float(value: &Value) -> Option<f64> {
    if let Some(f) = value.as_float() {
        Some(f)
    } else {
        value.as_int().map(|i| i as f64)
    }
}

/// Whether a value takes the primitive fast path.
#[inline]
fn is_numeric(value: &Value) -> bool {
    matches!(value, Value::Int(_) | Value::Float(_))
}

// =============================================================================
// Primitive Fast Paths
// =============================================================================

/// Int ⊕ int, with checked arithmetic.
fn int_binary(op: BinaryOp, x: i64, y: i64) -> Result<Value, ProtocolError> {
    match op {
        BinaryOp::Add => x
            .checked_add(y)
            .map(Value::int)
            .ok_or_else(|| ProtocolError::overflow(op.symbol())),
        BinaryOp::Sub => x
            .checked_sub(y)
            .map(Value::int)
            .ok_or_else(|| ProtocolError::overflow(op.symbol())),
        BinaryOp::Mul => x
            .checked_mul(y)
            .map(Value::int)
            .ok_or_else(|| ProtocolError::overflow(op.symbol())),
        BinaryOp::TrueDiv => {
            if y == 0 {
                Err(ProtocolError::zero_division())
            } else {
                // True division always produces a float.
                Ok(Value::float(x as f64 / y as f64))
            }
        }
        BinaryOp::FloorDiv => {
            if y == 0 {
                Err(ProtocolError::zero_division())
            } else {
                Ok(Value::int(x.div_euclid(y)))
            }
        }
        BinaryOp::Mod => {
            if y == 0 {
                Err(ProtocolError::zero_division())
            } else {
                Ok(Value::int(x.rem_euclid(y)))
            }
        }
        BinaryOp::Pow => int_pow(x, y),
    }
}

/// Int ** int. Negative exponents produce a float; positive exponents
/// stay integral when the result fits.
fn int_pow(base: i64, exp: i64) -> Result<Value, ProtocolError> {
    if exp < 0 {
        return Ok(Value::float((base as f64).powi(exp as i32)));
    }
    if exp <= u32::MAX as i64 {
        if let Some(result) = (base as i128).checked_pow(exp as u32) {
            if result >= i64::MIN as i128 && result <= i64::MAX as i128 {
                return Ok(Value::int(result as i64));
            }
        }
    }
    Err(ProtocolError::overflow("**"))
}

/// Float ⊕ float (or promoted mixed operands).
fn float_binary(op: BinaryOp, x: f64, y: f64) -> Result<Value, ProtocolError> {
    match op {
        BinaryOp::Add => Ok(Value::float(x + y)),
        BinaryOp::Sub => Ok(Value::float(x - y)),
        BinaryOp::Mul => Ok(Value::float(x * y)),
        BinaryOp::TrueDiv => {
            if y == 0.0 {
                Err(ProtocolError::zero_division())
            } else {
                Ok(Value::float(x / y))
            }
        }
        BinaryOp::FloorDiv => {
            if y == 0.0 {
                Err(ProtocolError::zero_division())
            } else {
                Ok(Value::float((x / y).floor()))
            }
        }
        BinaryOp::Mod => {
            if y == 0.0 {
                Err(ProtocolError::zero_division())
            } else {
                // Floored modulo, sign follows the divisor.
                Ok(Value::float(x - y * (x / y).floor()))
            }
        }
        BinaryOp::Pow => Ok(Value::float(x.powf(y))),
    }
}

/// Primitive binary fast path. Returns `None` when either operand is
/// not primitive numeric, sending the operation to slot dispatch.
fn primitive_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Option<Result<Value, ProtocolError>> {
    if !is_numeric(lhs) || !is_numeric(rhs) {
        return None;
    }

    // Int op int stays integral.
    if let (Some(x), Some(y)) = (lhs.as_int(), rhs.as_int()) {
        return Some(int_binary(op, x, y));
    }

    // Mixed or float operands promote to float.
    match (to_float(lhs), to_float(rhs)) {
        (Some(x), Some(y)) => Some(float_binary(op, x, y)),
        _ => None,
    }
}

// =============================================================================
// Binary Dispatch
// =============================================================================

/// Apply a binary operator: primitive fast path, then forward and
/// reflected slot dispatch.
pub fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, ProtocolError> {
    if let Some(result) = primitive_binary(op, lhs, rhs) {
        return result;
    }

    dispatch::resolve_binary(
        op.symbol(),
        lhs,
        rhs,
        |t| t.slots().binary_chain(op),
        |t| t.slots().reflected_chain(op),
    )
}

// =============================================================================
// In-Place Dispatch
// =============================================================================

/// Apply an in-place binary operator.
///
/// The in-place chain is tried first; a handler that succeeds has
/// mutated the object internally, and the binding is left untouched —
/// the object is never implicitly replaced. On `NotApplicable` the
/// operation falls back to the non-mutating forward dispatch and
/// rebinds the fresh result to `target`.
pub fn inplace(op: BinaryOp, target: &mut Value, rhs: &Value) -> Result<(), ProtocolError> {
    if let Some(result) = primitive_binary(op, target, rhs) {
        *target = result?;
        return Ok(());
    }

    if let Some(target_type) = dispatch::type_object_of(target) {
        match dispatch::run_binary_chain(target_type.slots().inplace_chain(op), target, rhs)? {
            // The handler's result value is advisory; the caller's slot
            // keeps the original object.
            HandlerResult::Handled(_) => return Ok(()),
            HandlerResult::NotApplicable => {}
        }
    }

    let result = dispatch::resolve_binary(
        op.inplace_symbol(),
        target,
        rhs,
        |t| t.slots().binary_chain(op),
        |t| t.slots().reflected_chain(op),
    )?;
    *target = result;
    Ok(())
}

// =============================================================================
// Unary Dispatch
// =============================================================================

/// Apply a unary operator: primitive fast path, then slot dispatch.
pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value, ProtocolError> {
    if let Some(x) = operand.as_int() {
        return match op {
            UnaryOp::Neg => x
                .checked_neg()
                .map(Value::int)
                .ok_or_else(|| ProtocolError::overflow("-")),
            UnaryOp::Pos => Ok(Value::int(x)),
            UnaryOp::Abs => x
                .checked_abs()
                .map(Value::int)
                .ok_or_else(|| ProtocolError::overflow("abs")),
        };
    }

    if let Some(x) = operand.as_float() {
        return Ok(match op {
            UnaryOp::Neg => Value::float(-x),
            UnaryOp::Pos => Value::float(x),
            UnaryOp::Abs => Value::float(x.abs()),
        });
    }

    dispatch::resolve_unary(op.symbol(), operand, |t| t.slots().unary_chain(op))
}

// =============================================================================
// Tests
// =============================================================================
