//! Instance objects.
//!
//! An `Instance` pairs a back-reference to its frozen `TypeObject` with
//! per-instance attribute storage. Storage is owned by the instance;
//! descriptors keep their per-instance state here, keyed by the bound
//! attribute name, never inside the descriptor itself.
//!
//! The `raw_*` accessors bypass the attribute interception gate. They
//! exist for handlers (interceptors, descriptors) that need gate-free
//! access to the underlying storage.

use crate::object::type_obj::TypeObject;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::any::Any;
use std::sync::Arc;
use tessera_core::{InternedString, ProtocolObject, TypeId, Value, intern};

/// An instance of a registered type.
pub struct Instance {
    /// The owning type. Holding the `Arc` directly keeps dispatch free
    /// of registry lookups and pins the snapshot this instance was
    /// created against.
    class: Arc<TypeObject>,
    /// Per-instance attribute storage.
    fields: RwLock<FxHashMap<InternedString, Value>>,
}

impl Instance {
    /// Create a new instance of the given type.
    pub fn new(class: Arc<TypeObject>) -> Arc<Self> {
        Arc::new(Self {
            class,
            fields: RwLock::new(FxHashMap::default()),
        })
    }

    /// Create a new instance wrapped in a `Value`.
    pub fn new_value(class: Arc<TypeObject>) -> Value {
        Value::object(Self::new(class))
    }

    /// The owning type.
    #[inline]
    pub fn class(&self) -> &Arc<TypeObject> {
        &self.class
    }

    /// Downcast a value to an instance, if it is one.
    #[inline]
    pub fn from_value(value: &Value) -> Option<&Instance> {
        value.as_object()?.as_any().downcast_ref::<Instance>()
    }

    // =========================================================================
    // Raw Storage Access (bypasses the interception gate)
    // =========================================================================

    /// Read a field directly from storage.
    #[inline]
    pub fn raw_get(&self, name: &str) -> Option<Value> {
        self.fields.read().get(name).cloned()
    }

    /// Write a field directly to storage.
    #[inline]
    pub fn raw_set(&self, name: &str, value: Value) {
        self.fields.write().insert(intern(name), value);
    }

    /// Remove a field directly from storage. Returns whether it existed.
    #[inline]
    pub fn raw_delete(&self, name: &str) -> bool {
        self.fields.write().remove(name).is_some()
    }

    /// Check whether a field exists in storage.
    #[inline]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.read().contains_key(name)
    }

    /// Number of stored fields.
    pub fn field_count(&self) -> usize {
        self.fields.read().len()
    }
}

impl ProtocolObject for Instance {
    #[inline]
    fn type_id(&self) -> TypeId {
        TypeObject::type_id(&self.class)
    }

    #[inline]
    fn type_name(&self) -> &str {
        self.class.name().as_str()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<{} instance, {} field(s)>",
            self.class.name(),
            self.field_count()
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
