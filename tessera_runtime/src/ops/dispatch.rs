//! Shared dispatch resolution core.
//!
//! Given an operation, a primary operand, and an optional secondary
//! operand, resolution either finds exactly one handler whose result is
//! final, or fails with `ProtocolUnsupported` naming the operation and
//! both operand types.
//!
//! # Resolution Order
//!
//! 1. Walk the primary operand type's forward chain in declaration
//!    order. The first outcome other than `NotApplicable` — a value or
//!    a domain error — is final.
//! 2. For binary operators only, and only when the secondary operand's
//!    type differs from the primary's, walk the secondary type's
//!    reflected chain with swapped argument order.
//! 3. Fail with `ProtocolUnsupported`.
//!
//! The same-type skip in step 2 keeps a type's forward handler
//! authoritative against itself and rules out non-terminating mutual
//! reflection between a type and itself.

use crate::object::instance::Instance;
use crate::object::type_obj::{BinaryHandler, HandlerResult, TypeObject, UnaryHandler};
use std::sync::Arc;
use tessera_core::{ProtocolError, Value};

// =============================================================================
// Slot Lookup
// =============================================================================

/// Fetch the type object governing a value's dispatch, if any.
///
/// Primitives have no slot table; their behavior is built into the
/// individual families' fast paths. The returned `Arc` is the snapshot
/// the whole operation resolves against.
#[inline]
pub(crate) fn type_object_of(value: &Value) -> Option<Arc<TypeObject>> {
    Instance::from_value(value).map(|inst| inst.class().clone())
}

// =============================================================================
// Chain Walking
// =============================================================================

/// Walk a handler chain in declaration order. The first outcome other
/// than `NotApplicable` is final; an empty or fully declining chain
/// reports `NotApplicable`.
pub(crate) fn run_binary_chain(
    chain: &[BinaryHandler],
    primary: &Value,
    secondary: &Value,
) -> Result<HandlerResult, ProtocolError> {
    for handler in chain {
        match handler(primary, secondary)? {
            HandlerResult::Handled(value) => return Ok(HandlerResult::Handled(value)),
            HandlerResult::NotApplicable => {}
        }
    }
    Ok(HandlerResult::NotApplicable)
}

/// Walk a unary handler chain in declaration order.
pub(crate) fn run_unary_chain(
    chain: &[UnaryHandler],
    operand: &Value,
) -> Result<HandlerResult, ProtocolError> {
    for handler in chain {
        match handler(operand)? {
            HandlerResult::Handled(value) => return Ok(HandlerResult::Handled(value)),
            HandlerResult::NotApplicable => {}
        }
    }
    Ok(HandlerResult::NotApplicable)
}

// =============================================================================
// Binary Resolution
// =============================================================================

/// Resolve a binary operation through forward and reflected chains.
///
/// `forward` and `reflected` select the operation's chains from a slot
/// table; the comparison family reuses this core with mirrored chains.
pub(crate) fn resolve_binary<F, R>(
    symbol: &str,
    lhs: &Value,
    rhs: &Value,
    forward: F,
    reflected: R,
) -> Result<Value, ProtocolError>
where
    F: for<'a> Fn(&'a TypeObject) -> &'a [BinaryHandler],
    R: for<'a> Fn(&'a TypeObject) -> &'a [BinaryHandler],
{
    match try_resolve_binary(lhs, rhs, forward, reflected)? {
        HandlerResult::Handled(value) => Ok(value),
        HandlerResult::NotApplicable => Err(ProtocolError::unsupported_operand(
            symbol,
            lhs.type_name(),
            rhs.type_name(),
        )),
    }
}

/// Like [`resolve_binary`] but reports `NotApplicable` instead of
/// failing, for callers with their own fallbacks (comparison derivation
/// policies, identity equality).
pub(crate) fn try_resolve_binary<F, R>(
    lhs: &Value,
    rhs: &Value,
    forward: F,
    reflected: R,
) -> Result<HandlerResult, ProtocolError>
where
    F: for<'a> Fn(&'a TypeObject) -> &'a [BinaryHandler],
    R: for<'a> Fn(&'a TypeObject) -> &'a [BinaryHandler],
{
    // Step 1: forward chain on the primary operand's type.
    if let Some(lhs_type) = type_object_of(lhs) {
        match run_binary_chain(forward(lhs_type.as_ref()), lhs, rhs)? {
            HandlerResult::Handled(value) => return Ok(HandlerResult::Handled(value)),
            HandlerResult::NotApplicable => {}
        }
    }

    // Step 2: reflected chain on the secondary operand's type, skipped
    // entirely for identical operand types.
    if rhs.type_id() != lhs.type_id() {
        if let Some(rhs_type) = type_object_of(rhs) {
            // Argument order is swapped relative to the forward form.
            match run_binary_chain(reflected(rhs_type.as_ref()), rhs, lhs)? {
                HandlerResult::Handled(value) => return Ok(HandlerResult::Handled(value)),
                HandlerResult::NotApplicable => {}
            }
        }
    }

    Ok(HandlerResult::NotApplicable)
}

// =============================================================================
// Unary Resolution
// =============================================================================

/// Resolve a unary operation against the operand type's chain.
pub(crate) fn resolve_unary<F>(
    symbol: &str,
    operand: &Value,
    chain: F,
) -> Result<Value, ProtocolError>
where
    F: for<'a> Fn(&'a TypeObject) -> &'a [UnaryHandler],
{
    if let Some(operand_type) = type_object_of(operand) {
        match run_unary_chain(chain(operand_type.as_ref()), operand)? {
            HandlerResult::Handled(value) => return Ok(value),
            HandlerResult::NotApplicable => {}
        }
    }
    Err(ProtocolError::unsupported(symbol, operand.type_name()))
}

// =============================================================================
// Tests
// =============================================================================
