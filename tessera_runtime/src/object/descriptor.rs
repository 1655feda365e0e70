//! Reusable attribute-behavior units.
//!
//! A `Descriptor` is attached to one or more owner types under a name
//! and is invoked by attribute resolution when the declared attribute
//! resolves to it rather than to a plain value. One descriptor instance
//! may be shared by every instance of several owner types, so it must
//! keep per-instance state in the instance's own storage, keyed by the
//! bound name.
//!
//! # Naming
//!
//! The binder invokes [`Descriptor::attached`] exactly once per
//! attachment with the owner type and the attribute name. This is the
//! only point a descriptor may learn its name; afterwards the binding
//! is stable for that (owner, attribute) pair.

use crate::object::instance::Instance;
use crate::object::type_obj::TypeObject;
use std::sync::{Arc, OnceLock};
use tessera_core::{InternedString, ProtocolError, Value};

// =============================================================================
// Descriptor Trait
// =============================================================================

/// An attribute-behavior unit attachable to multiple owner types.
pub trait Descriptor: Send + Sync {
    /// One-time naming callback, invoked by the binder at attachment.
    fn attached(&self, owner: &TypeObject, name: &InternedString) {
        let _ = (owner, name);
    }

    /// Resolve a read on `instance`.
    fn get(&self, instance: &Value, owner: &TypeObject) -> Result<Value, ProtocolError>;

    /// Resolve a write on `instance`. Must reject before any storage
    /// mutation (all-or-nothing).
    fn set(&self, instance: &Value, owner: &TypeObject, value: &Value)
    -> Result<(), ProtocolError> {
        let _ = (instance, value);
        Err(ProtocolError::type_error(format!(
            "attribute of '{}' is read-only",
            owner.name()
        )))
    }

    /// Resolve a deletion on `instance`.
    fn delete(&self, instance: &Value, owner: &TypeObject) -> Result<(), ProtocolError> {
        let _ = instance;
        Err(ProtocolError::type_error(format!(
            "attribute of '{}' cannot be deleted",
            owner.name()
        )))
    }
}

// =============================================================================
// GuardedField
// =============================================================================

/// Validator predicate for [`GuardedField`].
pub type Validator = Arc<dyn Fn(&Value) -> Result<(), ProtocolError> + Send + Sync>;

/// A validating data descriptor.
///
/// Stores its value in the instance's own storage under the bound name;
/// the validator runs before any mutation, so a rejected set leaves the
/// previous value intact.
pub struct GuardedField {
    /// Bound attribute name. The first binding wins; a shared
    /// descriptor keyed under one name across several owners reads and
    /// writes the same per-instance key everywhere.
    name: OnceLock<InternedString>,
    validator: Validator,
}

impl GuardedField {
    /// Create a field guarded by the given validator.
    pub fn new(
        validator: impl Fn(&Value) -> Result<(), ProtocolError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: OnceLock::new(),
            validator: Arc::new(validator),
        })
    }

    /// A field that only admits positive numbers.
    pub fn positive_number() -> Arc<Self> {
        Self::new(|value| match value {
            Value::Int(i) if *i > 0 => Ok(()),
            Value::Float(f) if *f > 0.0 => Ok(()),
            Value::Int(_) | Value::Float(_) => Err(ProtocolError::validation(format!(
                "expected a positive number, got {:?}",
                value
            ))),
            other => Err(ProtocolError::validation(format!(
                "expected a positive number, got '{}'",
                other.type_name()
            ))),
        })
    }

    /// The bound name, if attachment has happened.
    pub fn bound_name(&self) -> Option<&InternedString> {
        self.name.get()
    }

    fn require_name(&self) -> Result<&InternedString, ProtocolError> {
        self.name.get().ok_or_else(|| {
            ProtocolError::type_error("descriptor used before attachment to an owner type")
        })
    }

    fn instance_of<'v>(value: &'v Value, owner: &TypeObject) -> Result<&'v Instance, ProtocolError> {
        Instance::from_value(value).ok_or_else(|| {
            ProtocolError::type_error(format!(
                "descriptor of '{}' applied to non-instance value '{}'",
                owner.name(),
                value.type_name()
            ))
        })
    }
}

impl Descriptor for GuardedField {
    fn attached(&self, _owner: &TypeObject, name: &InternedString) {
        // First binding wins; later attachments under the same name are
        // no-ops, which keeps the (owner, attribute) binding stable.
        let _ = self.name.set(name.clone());
    }

    fn get(&self, instance: &Value, owner: &TypeObject) -> Result<Value, ProtocolError> {
        let name = self.require_name()?;
        let inst = Self::instance_of(instance, owner)?;
        inst.raw_get(name).ok_or_else(|| {
            ProtocolError::attribute_missing(instance.type_name(), name.as_str())
        })
    }

    fn set(&self, instance: &Value, owner: &TypeObject, value: &Value)
    -> Result<(), ProtocolError> {
        let name = self.require_name()?;
        let inst = Self::instance_of(instance, owner)?;
        // Validate before touching storage.
        (self.validator)(value)?;
        inst.raw_set(name, value.clone());
        Ok(())
    }

    fn delete(&self, instance: &Value, owner: &TypeObject) -> Result<(), ProtocolError> {
        let name = self.require_name()?;
        let inst = Self::instance_of(instance, owner)?;
        if inst.raw_delete(name) {
            Ok(())
        } else {
            Err(ProtocolError::attribute_missing(
                instance.type_name(),
                name.as_str(),
            ))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::type_obj::{ClassDict, TypeFlags, TypeSlots};
    use tessera_core::{ProtocolErrorKind, TypeId, intern};

    fn test_owner(name: &str) -> Arc<TypeObject> {
        Arc::new(TypeObject::assemble(
            intern(name),
            TypeId::from_raw(TypeId::FIRST_USER_TYPE),
            TypeFlags::empty(),
            TypeSlots::default(),
            ClassDict::default(),
        ))
    }

    #[test]
    fn test_unbound_descriptor_errors() {
        let field = GuardedField::positive_number();
        let owner = test_owner("gauge");
        let inst = Instance::new_value(owner.clone());
        let err = field.get(&inst, &owner).unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::Type);
    }

    #[test]
    fn test_set_then_get() {
        let field = GuardedField::positive_number();
        let owner = test_owner("gauge");
        field.attached(&owner, &intern("level"));

        let inst = Instance::new_value(owner.clone());
        field.set(&inst, &owner, &Value::int(5)).unwrap();
        assert_eq!(field.get(&inst, &owner).unwrap().as_int(), Some(5));
    }

    #[test]
    fn test_rejected_set_leaves_storage_untouched() {
        let field = GuardedField::positive_number();
        let owner = test_owner("gauge");
        field.attached(&owner, &intern("level"));

        let inst = Instance::new_value(owner.clone());
        field.set(&inst, &owner, &Value::int(5)).unwrap();

        let err = field.set(&inst, &owner, &Value::int(-2)).unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::Validation);
        // All-or-nothing: the previous value survives.
        assert_eq!(field.get(&inst, &owner).unwrap().as_int(), Some(5));
    }

    #[test]
    fn test_non_numeric_rejected() {
        let field = GuardedField::positive_number();
        let owner = test_owner("gauge");
        field.attached(&owner, &intern("level"));

        let inst = Instance::new_value(owner.clone());
        let err = field.set(&inst, &owner, &Value::str("tall")).unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::Validation);
    }

    #[test]
    fn test_get_before_set_is_missing() {
        let field = GuardedField::positive_number();
        let owner = test_owner("gauge");
        field.attached(&owner, &intern("level"));

        let inst = Instance::new_value(owner.clone());
        let err = field.get(&inst, &owner).unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::AttributeMissing);
    }

    #[test]
    fn test_delete_roundtrip() {
        let field = GuardedField::positive_number();
        let owner = test_owner("gauge");
        field.attached(&owner, &intern("level"));

        let inst = Instance::new_value(owner.clone());
        field.set(&inst, &owner, &Value::int(1)).unwrap();
        field.delete(&inst, &owner).unwrap();
        let err = field.delete(&inst, &owner).unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::AttributeMissing);
    }

    #[test]
    fn test_binding_is_stable() {
        let field = GuardedField::positive_number();
        let owner_a = test_owner("gauge");
        let owner_b = test_owner("meter");
        field.attached(&owner_a, &intern("level"));
        field.attached(&owner_b, &intern("level"));
        assert_eq!(field.bound_name().unwrap().as_str(), "level");
    }
}
