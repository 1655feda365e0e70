//! Attribute interception.
//!
//! Every attribute read, write, and delete on an object routes through
//! here. Reads walk a fixed chain; each link is optional and declared
//! explicitly:
//!
//! 1. The read interceptor, when declared, runs first on *every* read,
//!    including reads of attributes that exist. An `AttributeMissing`
//!    failure from it routes to step 3; any other outcome is final.
//! 2. Otherwise, storage resolution: a declared descriptor for the name
//!    takes precedence, then the instance's own storage, then a plain
//!    class attribute.
//! 3. The fallback-on-missing handler, when declared.
//! 4. `AttributeMissing`.
//!
//! # Re-entrancy
//!
//! The interceptor is the single mandatory gate for all reads,
//! including reads the interceptor itself performs through [`get_attr`]
//! — which therefore recurse. This is intentional and is the caller's
//! responsibility to avoid, not something the dispatcher prevents:
//! interceptors that need the underlying value should use
//! [`storage_get`] or `Instance::raw_get`, which bypass the gate.

use crate::object::instance::Instance;
use crate::object::type_obj::{ClassAttr, TypeObject};
use crate::ops::dispatch;
use std::sync::Arc;
use tessera_core::{ProtocolError, ProtocolErrorKind, Value};

// =============================================================================
// Read
// =============================================================================

/// Read an attribute through the full interception chain.
pub fn get_attr(obj: &Value, name: &str) -> Result<Value, ProtocolError> {
    let Some(obj_type) = dispatch::type_object_of(obj) else {
        return Err(ProtocolError::attribute_missing(obj.type_name(), name));
    };

    if let Some(interceptor) = obj_type.slots().attr_read() {
        return match interceptor(obj, name) {
            Ok(value) => Ok(value),
            Err(err) if err.kind() == ProtocolErrorKind::AttributeMissing => {
                run_fallback(obj, &obj_type, name, err)
            }
            Err(err) => Err(err),
        };
    }

    match storage_lookup(obj, &obj_type, name)? {
        Some(value) => Ok(value),
        None => {
            let missing = ProtocolError::attribute_missing(obj.type_name(), name);
            run_fallback(obj, &obj_type, name, missing)
        }
    }
}

/// Read an attribute from storage, bypassing the interception gate.
///
/// Descriptor resolution still applies. Intended for interceptor
/// handlers that need the underlying value without re-entering
/// themselves.
pub fn storage_get(obj: &Value, name: &str) -> Result<Value, ProtocolError> {
    let Some(obj_type) = dispatch::type_object_of(obj) else {
        return Err(ProtocolError::attribute_missing(obj.type_name(), name));
    };
    match storage_lookup(obj, &obj_type, name)? {
        Some(value) => Ok(value),
        None => Err(ProtocolError::attribute_missing(obj.type_name(), name)),
    }
}

/// Storage resolution: descriptor, instance storage, plain class attr.
fn storage_lookup(
    obj: &Value,
    obj_type: &Arc<TypeObject>,
    name: &str,
) -> Result<Option<Value>, ProtocolError> {
    // A declared descriptor owns the name outright; instance storage
    // holds its backing state, so the descriptor must win the lookup.
    if let Some(ClassAttr::Descriptor(descriptor)) = obj_type.dict().get(name) {
        return descriptor.get(obj, obj_type).map(Some);
    }

    if let Some(inst) = Instance::from_value(obj) {
        if let Some(value) = inst.raw_get(name) {
            return Ok(Some(value));
        }
    }

    if let Some(ClassAttr::Plain(value)) = obj_type.dict().get(name) {
        return Ok(Some(value.clone()));
    }

    Ok(None)
}

/// Route a missing read through the fallback handler, or propagate.
fn run_fallback(
    obj: &Value,
    obj_type: &Arc<TypeObject>,
    name: &str,
    missing: ProtocolError,
) -> Result<Value, ProtocolError> {
    match obj_type.slots().attr_fallback() {
        Some(fallback) => fallback(obj, name),
        None => Err(missing),
    }
}

// =============================================================================
// Write
// =============================================================================

/// Write an attribute: declared write handler, then descriptor, then
/// direct storage.
pub fn set_attr(obj: &Value, name: &str, value: &Value) -> Result<(), ProtocolError> {
    let Some(obj_type) = dispatch::type_object_of(obj) else {
        return Err(ProtocolError::type_error(format!(
            "cannot set attribute '{}' on '{}'",
            name,
            obj.type_name()
        )));
    };

    if let Some(writer) = obj_type.slots().attr_write() {
        return writer(obj, name, value);
    }

    if let Some(ClassAttr::Descriptor(descriptor)) = obj_type.dict().get(name) {
        return descriptor.set(obj, &obj_type, value);
    }

    if let Some(inst) = Instance::from_value(obj) {
        inst.raw_set(name, value.clone());
        return Ok(());
    }

    Err(ProtocolError::type_error(format!(
        "cannot set attribute '{}' on '{}'",
        name,
        obj.type_name()
    )))
}

// =============================================================================
// Delete
// =============================================================================

/// Delete an attribute: declared delete handler, then descriptor, then
/// direct storage.
///
/// A type whose delete handler refuses unconditionally makes every
/// deletion — including of names that do not exist — fail with
/// `AttributeDenied`.
pub fn del_attr(obj: &Value, name: &str) -> Result<(), ProtocolError> {
    let Some(obj_type) = dispatch::type_object_of(obj) else {
        return Err(ProtocolError::attribute_missing(obj.type_name(), name));
    };

    if let Some(deleter) = obj_type.slots().attr_delete() {
        return deleter(obj, name);
    }

    if let Some(ClassAttr::Descriptor(descriptor)) = obj_type.dict().get(name) {
        return descriptor.delete(obj, &obj_type);
    }

    if let Some(inst) = Instance::from_value(obj) {
        if inst.raw_delete(name) {
            return Ok(());
        }
    }

    Err(ProtocolError::attribute_missing(obj.type_name(), name))
}

// =============================================================================
// Tests
// =============================================================================
