//! Iteration dispatch: obtain a cursor from an iterable.
//!
//! Two-phase protocol: "obtain cursor" here, "advance cursor" on the
//! returned [`CursorObject`]. How a cursor is obtained is an explicit
//! declaration:
//!
//! - a declared cursor factory produces the cursor value (a fresh
//!   object per request, for re-iterable containers);
//! - the `SELF_CURSOR` flag declares that the iterable is its own
//!   cursor;
//! - with neither, a cursor is synthesized from indexing + length,
//!   walking 0 .. len.
//!
//! The value acting as a cursor must belong to a type declaring
//! advancement; its position state lives in that value, so each
//! factory-produced cursor owns one independent traversal.

use crate::object::type_obj::TypeFlags;
use crate::ops::dispatch;
use crate::types::cursor::CursorObject;
use tessera_core::{ProtocolError, Value};

/// Obtain a traversal cursor for an iterable value.
pub fn obtain_cursor(iterable: &Value) -> Result<CursorObject, ProtocolError> {
    let Some(iterable_type) = dispatch::type_object_of(iterable) else {
        return Err(ProtocolError::unsupported("iter", iterable.type_name()));
    };
    let slots = iterable_type.slots();

    // Explicitly declared cursor acquisition.
    if let Some(factory) = slots.cursor_factory() {
        let cursor_value = factory(iterable)?;
        return wrap_cursor_value(cursor_value);
    }
    if iterable_type.flags().contains(TypeFlags::SELF_CURSOR) {
        return wrap_cursor_value(iterable.clone());
    }

    // Synthesized index-walking cursor from indexing + length.
    if let (Some(item), Some(len)) = (slots.item(), slots.length()) {
        let len = len(iterable)?;
        return Ok(CursorObject::indexed(iterable.clone(), item.clone(), len));
    }

    Err(ProtocolError::unsupported("iter", iterable.type_name()))
}

/// Wrap a cursor value in a `CursorObject` driven by its type's
/// advancement handler.
pub(crate) fn wrap_cursor_value(cursor_value: Value) -> Result<CursorObject, ProtocolError> {
    let Some(cursor_type) = dispatch::type_object_of(&cursor_value) else {
        return Err(ProtocolError::unsupported("advance", cursor_value.type_name()));
    };
    match cursor_type.slots().advance() {
        Some(advance) => {
            let advance = advance.clone();
            Ok(CursorObject::from_advance(cursor_value, advance))
        }
        None => Err(ProtocolError::unsupported("advance", cursor_value.type_name())),
    }
}

// =============================================================================
// Tests
// =============================================================================
