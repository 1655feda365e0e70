//! Integration tests for attribute interception and descriptors.
//!
//! Coverage:
//! - The interceptor as mandatory read gate
//! - Fallback-on-missing routing
//! - Unconditional deletion refusal
//! - Descriptor sharing across owner types with per-instance state

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tessera_runtime::ops::{del_attr, get_attr, set_attr, storage_get};
use tessera_runtime::{
    Descriptor, GuardedField, Instance, InternedString, ProtocolError, ProtocolErrorKind,
    TypeBuilder, TypeObject, Value,
};

// =============================================================================
// Interception
// =============================================================================

mod interception {
    use super::*;

    #[test]
    fn test_interceptor_runs_for_existing_attributes() {
        // The interceptor tags every read, including reads of
        // attributes that exist in storage.
        let ty = TypeBuilder::new("tagger")
            .attr_interceptor(|obj, name| {
                let underlying = storage_get(obj, name)?;
                let tagged = format!("seen:{:?}", underlying);
                Ok(Value::str(tagged))
            })
            .register();
        let obj = Instance::new_value(ty);
        set_attr(&obj, "x", &Value::int(9)).unwrap();

        let result = get_attr(&obj, "x").unwrap();
        assert_eq!(result.as_str(), Some("seen:9"));
    }

    #[test]
    fn test_interceptor_missing_routes_to_fallback() {
        let ty = TypeBuilder::new("defaulting")
            .attr_interceptor(storage_get)
            .attr_fallback(|_, name| Ok(Value::str(format!("default:{}", name))))
            .register();
        let obj = Instance::new_value(ty);

        set_attr(&obj, "x", &Value::int(1)).unwrap();
        assert_eq!(get_attr(&obj, "x").unwrap().as_int(), Some(1));
        // Missing attribute: the fallback answers.
        assert_eq!(
            get_attr(&obj, "ghost").unwrap().as_str(),
            Some("default:ghost")
        );
    }

    #[test]
    fn test_missing_propagates_without_fallback() {
        let ty = TypeBuilder::new("strict")
            .attr_interceptor(storage_get)
            .register();
        let obj = Instance::new_value(ty);

        let err = get_attr(&obj, "ghost").unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::AttributeMissing);
    }

    #[test]
    fn test_non_missing_interceptor_error_is_final() {
        // A fallback is declared, but only AttributeMissing routes to
        // it; other failures propagate directly.
        let ty = TypeBuilder::new("guarded")
            .attr_interceptor(|_, name| {
                if name.starts_with('_') {
                    Err(ProtocolError::type_error("private attribute"))
                } else {
                    Err(ProtocolError::attribute_missing("guarded", name))
                }
            })
            .attr_fallback(|_, _| Ok(Value::str("fallback")))
            .register();
        let obj = Instance::new_value(ty);

        assert_eq!(get_attr(&obj, "x").unwrap().as_str(), Some("fallback"));
        let err = get_attr(&obj, "_secret").unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::Type);
    }

    #[test]
    fn test_fallback_applies_without_interceptor_too() {
        let ty = TypeBuilder::new("lazy_default")
            .attr_fallback(|_, _| Ok(Value::int(0)))
            .register();
        let obj = Instance::new_value(ty);

        set_attr(&obj, "x", &Value::int(5)).unwrap();
        assert_eq!(get_attr(&obj, "x").unwrap().as_int(), Some(5));
        assert_eq!(get_attr(&obj, "missing").unwrap().as_int(), Some(0));
    }

    #[test]
    fn test_writer_routes_all_writes() {
        // Writes go through the declared writer, which normalizes the
        // stored value.
        let ty = TypeBuilder::new("clamping")
            .attr_writer(|obj, name, value| {
                let inst = Instance::from_value(obj)
                    .ok_or_else(|| ProtocolError::type_error("not an instance"))?;
                let clamped = match value.as_int() {
                    Some(n) => Value::int(n.clamp(0, 100)),
                    None => value.clone(),
                };
                inst.raw_set(name, clamped);
                Ok(())
            })
            .register();
        let obj = Instance::new_value(ty);

        set_attr(&obj, "level", &Value::int(250)).unwrap();
        assert_eq!(get_attr(&obj, "level").unwrap().as_int(), Some(100));
    }
}

// =============================================================================
// Deletion
// =============================================================================

mod deletion {
    use super::*;

    #[test]
    fn test_unconditional_refusal_denies_every_name() {
        let ty = TypeBuilder::new("immutable_record")
            .attr_deleter(|obj, name| {
                Err(ProtocolError::attribute_denied(obj.type_name(), name))
            })
            .register();
        let obj = Instance::new_value(ty);
        set_attr(&obj, "x", &Value::int(1)).unwrap();

        // Existing attribute: denied.
        let err = del_attr(&obj, "x").unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::AttributeDenied);

        // Nonexistent attribute: still denied, not missing.
        let err = del_attr(&obj, "never_was").unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::AttributeDenied);

        // The refusal left the attribute in place.
        assert_eq!(get_attr(&obj, "x").unwrap().as_int(), Some(1));
    }
}

// =============================================================================
// Descriptors
// =============================================================================

mod descriptors {
    use super::*;

    #[test]
    fn test_validating_descriptor_all_or_nothing() {
        let ty = TypeBuilder::new("tank")
            .descriptor("volume", GuardedField::positive_number())
            .register();
        let obj = Instance::new_value(ty);

        set_attr(&obj, "volume", &Value::float(1.5)).unwrap();
        assert_eq!(get_attr(&obj, "volume").unwrap().as_float(), Some(1.5));

        let err = set_attr(&obj, "volume", &Value::int(-3)).unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::Validation);
        // The rejected set mutated nothing.
        assert_eq!(get_attr(&obj, "volume").unwrap().as_float(), Some(1.5));

        let err = set_attr(&obj, "volume", &Value::str("full")).unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::Validation);
    }

    #[test]
    fn test_descriptor_shared_across_owner_types() {
        // One descriptor instance attached to two owner types under the
        // same name: state is per (instance, name), never shared.
        let shared = GuardedField::positive_number();
        let tank = TypeBuilder::new("shared_tank")
            .descriptor("level", shared.clone())
            .register();
        let silo = TypeBuilder::new("shared_silo")
            .descriptor("level", shared)
            .register();

        let tank_a = Instance::new_value(tank.clone());
        let tank_b = Instance::new_value(tank);
        let silo_a = Instance::new_value(silo);

        set_attr(&tank_a, "level", &Value::int(10)).unwrap();
        set_attr(&tank_b, "level", &Value::int(20)).unwrap();
        set_attr(&silo_a, "level", &Value::int(30)).unwrap();

        assert_eq!(get_attr(&tank_a, "level").unwrap().as_int(), Some(10));
        assert_eq!(get_attr(&tank_b, "level").unwrap().as_int(), Some(20));
        assert_eq!(get_attr(&silo_a, "level").unwrap().as_int(), Some(30));
    }

    #[test]
    fn test_naming_callback_once_per_attachment() {
        struct Probe {
            attachments: AtomicUsize,
        }
        impl Descriptor for Probe {
            fn attached(&self, _owner: &TypeObject, _name: &InternedString) {
                self.attachments.fetch_add(1, Ordering::SeqCst);
            }
            fn get(&self, _instance: &Value, _owner: &TypeObject) -> Result<Value, ProtocolError> {
                Ok(Value::none())
            }
        }

        let probe = Arc::new(Probe {
            attachments: AtomicUsize::new(0),
        });
        TypeBuilder::new("probe_owner_a")
            .descriptor("field", probe.clone())
            .register();
        TypeBuilder::new("probe_owner_b")
            .descriptor("field", probe.clone())
            .register();

        // Exactly once per attachment, and creating instances never
        // re-runs the naming callback.
        assert_eq!(probe.attachments.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_descriptor_wins_over_instance_storage() {
        let ty = TypeBuilder::new("guarded_gauge")
            .descriptor("level", GuardedField::positive_number())
            .register();
        let obj = Instance::new_value(ty);
        set_attr(&obj, "level", &Value::int(4)).unwrap();

        // The descriptor's backing state lives in instance storage
        // under the bound name, yet reads still resolve through the
        // descriptor rather than raw storage.
        let inst = Instance::from_value(&obj).unwrap();
        assert!(inst.has_field("level"));
        assert_eq!(get_attr(&obj, "level").unwrap().as_int(), Some(4));

        // Deletion routes through the descriptor as well.
        del_attr(&obj, "level").unwrap();
        let err = get_attr(&obj, "level").unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::AttributeMissing);
    }
}
