//! Container dispatch: length, indexing, membership, reversal.
//!
//! Each capability is independent; declaring one does not require the
//! others. Two generic fallbacks are synthesized:
//!
//! - reversal, from indexing + length, walking length−1 down to 0
//!   lazily when no bespoke reversal is declared;
//! - membership, by a linear scan over the iteration protocol using
//!   equality resolution, when no membership handler is declared.

use crate::ops::{comparison, dispatch, iteration};
use crate::types::cursor::CursorObject;
use tessera_core::{ProtocolError, Value};

// =============================================================================
// Length & Indexing
// =============================================================================

/// Number of elements in a container.
pub fn length(container: &Value) -> Result<usize, ProtocolError> {
    let Some(container_type) = dispatch::type_object_of(container) else {
        return Err(ProtocolError::unsupported("len", container.type_name()));
    };
    match container_type.slots().length() {
        Some(handler) => handler(container),
        None => Err(ProtocolError::unsupported("len", container.type_name())),
    }
}

/// Element at an index.
pub fn get_item(container: &Value, index: i64) -> Result<Value, ProtocolError> {
    let Some(container_type) = dispatch::type_object_of(container) else {
        return Err(ProtocolError::unsupported("index", container.type_name()));
    };
    match container_type.slots().item() {
        Some(handler) => handler(container, index),
        None => Err(ProtocolError::unsupported("index", container.type_name())),
    }
}

// =============================================================================
// Membership
// =============================================================================

/// Membership test.
///
/// Without a declared handler, falls back to a linear scan over the
/// iteration protocol, comparing each produced element against the
/// query with equality resolution.
pub fn contains(container: &Value, query: &Value) -> Result<bool, ProtocolError> {
    if let Some(container_type) = dispatch::type_object_of(container) {
        if let Some(handler) = container_type.slots().contains() {
            return handler(container, query);
        }
    }

    let mut cursor = iteration::obtain_cursor(container).map_err(|_| {
        ProtocolError::unsupported("in", container.type_name())
    })?;
    while let Some(element) = cursor.next()? {
        if comparison::equals(&element, query)? {
            return Ok(true);
        }
    }
    Ok(false)
}

// =============================================================================
// Reversal
// =============================================================================

/// Lazy reversed traversal.
///
/// A bespoke reversal handler produces the cursor value; otherwise a
/// reverse index-walking cursor is synthesized from indexing + length.
pub fn reversed(container: &Value) -> Result<CursorObject, ProtocolError> {
    let Some(container_type) = dispatch::type_object_of(container) else {
        return Err(ProtocolError::unsupported("reversed", container.type_name()));
    };
    let slots = container_type.slots();

    if let Some(handler) = slots.reversed() {
        let cursor_value = handler(container)?;
        return iteration::wrap_cursor_value(cursor_value);
    }

    if let (Some(item), Some(len)) = (slots.item(), slots.length()) {
        let len = len(container)?;
        return Ok(CursorObject::reverse_indexed(
            container.clone(),
            item.clone(),
            len,
        ));
    }

    Err(ProtocolError::unsupported("reversed", container.type_name()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::builder::TypeBuilder;
    use crate::object::instance::Instance;
    use crate::object::registry::TypeRegistry;
    use crate::object::type_obj::TypeObject;
    use std::sync::Arc;
    use tessera_core::ProtocolErrorKind;

    /// Fixed sequence type over items 10, 20, 30 with indexing + length.
    fn fixed_sequence(registry: &TypeRegistry) -> Arc<TypeObject> {
        const ITEMS: [i64; 3] = [10, 20, 30];
        TypeBuilder::new("fixed_seq")
            .length(|_| Ok(ITEMS.len()))
            .item(|_, index| {
                usize::try_from(index)
                    .ok()
                    .and_then(|i| ITEMS.get(i).copied())
                    .map(Value::int)
                    .ok_or_else(|| ProtocolError::index_out_of_range(index, ITEMS.len()))
            })
            .register_in(registry)
    }

    #[test]
    fn test_length_and_item() {
        let registry = TypeRegistry::new();
        let obj = Instance::new_value(fixed_sequence(&registry));

        assert_eq!(length(&obj).unwrap(), 3);
        assert_eq!(get_item(&obj, 1).unwrap().as_int(), Some(20));
        let err = get_item(&obj, 9).unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::Index);
    }

    #[test]
    fn test_membership_falls_back_to_iteration() {
        let registry = TypeRegistry::new();
        let obj = Instance::new_value(fixed_sequence(&registry));

        assert!(contains(&obj, &Value::int(20)).unwrap());
        assert!(!contains(&obj, &Value::int(99)).unwrap());
    }

    #[test]
    fn test_declared_membership_wins() {
        let registry = TypeRegistry::new();
        let ty = TypeBuilder::new("always_in")
            .contains(|_, _| Ok(true))
            .register_in(&registry);
        let obj = Instance::new_value(ty);

        assert!(contains(&obj, &Value::str("anything")).unwrap());
    }

    #[test]
    fn test_synthesized_reversal_is_lazy_walk() {
        let registry = TypeRegistry::new();
        let obj = Instance::new_value(fixed_sequence(&registry));

        let mut cursor = reversed(&obj).unwrap();
        let values = cursor.collect_remaining().unwrap();
        let ints: Vec<i64> = values.iter().filter_map(Value::as_int).collect();
        assert_eq!(ints, vec![30, 20, 10]);
    }

    #[test]
    fn test_capabilities_are_independent() {
        let registry = TypeRegistry::new();
        // Length only: no indexing, no reversal, no membership scan.
        let ty = TypeBuilder::new("sized_only")
            .length(|_| Ok(5))
            .register_in(&registry);
        let obj = Instance::new_value(ty);

        assert_eq!(length(&obj).unwrap(), 5);
        assert_eq!(
            get_item(&obj, 0).unwrap_err().kind(),
            ProtocolErrorKind::Unsupported
        );
        assert_eq!(
            reversed(&obj).unwrap_err().kind(),
            ProtocolErrorKind::Unsupported
        );
        assert_eq!(
            contains(&obj, &Value::int(1)).unwrap_err().kind(),
            ProtocolErrorKind::Unsupported
        );
    }
}
