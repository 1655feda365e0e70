//! Type registry mapping `TypeId` to `TypeObject`.
//!
//! Provides O(1) lookup of type objects by id. The registry is
//! read-mostly: each type is registered exactly once and frozen;
//! lookups hand out `Arc` snapshots, so a dispatch in flight never
//! observes a partially registered type.

use crate::object::type_obj::TypeObject;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use tessera_core::TypeId;

/// Registry of all declared types.
pub struct TypeRegistry {
    /// Map from TypeId to the frozen type object.
    types: RwLock<FxHashMap<TypeId, Arc<TypeObject>>>,
    /// Counter for allocating user-defined TypeIds.
    next_id: AtomicU32,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            types: RwLock::new(FxHashMap::default()),
            next_id: AtomicU32::new(TypeId::FIRST_USER_TYPE),
        }
    }

    /// Allocate a new TypeId for a user-defined type.
    pub fn allocate_type_id(&self) -> TypeId {
        TypeId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a frozen type object. Registration is serialized by the
    /// registry lock; re-registering an id replaces the entry for future
    /// lookups only.
    pub fn register(&self, type_obj: Arc<TypeObject>) {
        let mut types = self.types.write();
        types.insert(type_obj.type_id(), type_obj);
    }

    /// Look up a type by id.
    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<Arc<TypeObject>> {
        let types = self.types.read();
        types.get(&type_id).cloned()
    }

    /// Check if a type is registered.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        let types = self.types.read();
        types.contains_key(&type_id)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        let types = self.types.read();
        types.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Global Registry Access
// =============================================================================

static GLOBAL_REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

/// Process-wide type registry.
pub fn global_registry() -> &'static TypeRegistry {
    GLOBAL_REGISTRY.get_or_init(TypeRegistry::new)
}

// =============================================================================
// Tests
// =============================================================================
