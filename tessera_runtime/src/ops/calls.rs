//! Invocation dispatch.
//!
//! An object whose type declares a call handler is usable wherever a
//! plain function is expected. Arguments pass through unchanged; the
//! return value is whatever the handler produces, including none.

use crate::ops::dispatch;
use tessera_core::{ProtocolError, Value};

/// Invoke a callable value with the given arguments.
pub fn call(callee: &Value, args: &[Value]) -> Result<Value, ProtocolError> {
    let Some(callee_type) = dispatch::type_object_of(callee) else {
        return Err(ProtocolError::unsupported("call", callee.type_name()));
    };
    match callee_type.slots().call() {
        Some(handler) => handler(callee, args),
        None => Err(ProtocolError::unsupported("call", callee.type_name())),
    }
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
    use tessera_core::ProtocolErrorKind;

    #[test]
    fn test_arguments_pass_through_unchanged() {
        let registry = TypeRegistry::new();
        let ty = TypeBuilder::new("summer")
            .call(|_, args| {
                let mut total = 0;
                for arg in args {
                    total += arg.as_int().ok_or_else(|| {
                        ProtocolError::type_error("summer only takes integers")
                    })?;
                }
                Ok(Value::int(total))
            })
            .register_in(&registry);
        let obj = Instance::new_value(ty);

        let result = call(&obj, &[Value::int(1), Value::int(2), Value::int(3)]).unwrap();
        assert_eq!(result.as_int(), Some(6));
    }

    #[test]
    fn test_none_return_is_legal() {
        let registry = TypeRegistry::new();
        let ty = TypeBuilder::new("sink")
            .call(|_, _| Ok(Value::none()))
            .register_in(&registry);
        let obj = Instance::new_value(ty);

        assert!(call(&obj, &[]).unwrap().is_none());
    }

    #[test]
    fn test_undeclared_call_is_unsupported() {
        let registry = TypeRegistry::new();
        let ty = TypeBuilder::new("inert").register_in(&registry);
        let obj = Instance::new_value(ty);

        let err = call(&obj, &[]).unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::Unsupported);
        assert!(err.message().contains("inert"));
    }

    #[test]
    fn test_primitive_is_not_callable() {
        let err = call(&Value::int(3), &[]).unwrap_err();
        assert_eq!(err.kind(), ProtocolErrorKind::Unsupported);
    }
}
