//! The protocol declaration surface.
//!
//! `TypeBuilder` is the only way user code opts a type into protocols.
//! Each method declares one capability explicitly; nothing is inferred
//! from naming convention. `register` freezes the declaration into a
//! `TypeObject`, invokes descriptor naming callbacks, and publishes the
//! type in a registry.

use crate::object::descriptor::Descriptor;
use crate::object::registry::{TypeRegistry, global_registry};
use crate::object::type_obj::{
    BinaryOp, ClassAttr, ClassDict, CompareOp, HandlerResult, TypeFlags, TypeObject, TypeSlots,
    UnaryOp,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tessera_core::{InternedString, ProtocolError, Value, intern};

/// Builder for declaring a type's protocol set.
///
/// ```
/// use tessera_runtime::{TypeBuilder, BinaryOp, HandlerResult, Value, Instance};
///
/// let counter = TypeBuilder::new("counter")
///     .binary(BinaryOp::Add, |lhs, rhs| {
///         let inst = Instance::from_value(lhs).unwrap();
///         let base = inst.raw_get("count").and_then(|v| v.as_int()).unwrap_or(0);
///         match rhs.as_int() {
///             Some(n) => Ok(HandlerResult::Handled(Value::int(base + n))),
///             None => Ok(HandlerResult::NotApplicable),
///         }
///     })
///     .register();
/// assert_eq!(counter.name().as_str(), "counter");
/// ```
pub struct TypeBuilder {
    name: InternedString,
    flags: TypeFlags,
    slots: TypeSlots,
    attrs: FxHashMap<InternedString, ClassAttr>,
    descriptors: Vec<(InternedString, Arc<dyn Descriptor>)>,
}

impl TypeBuilder {
    /// Start declaring a type with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: intern(name),
            flags: TypeFlags::empty(),
            slots: TypeSlots::default(),
            attrs: FxHashMap::default(),
            descriptors: Vec::new(),
        }
    }

    // =========================================================================
    // Flags
    // =========================================================================

    /// Declare that obtaining a cursor returns the iterable itself.
    pub fn self_cursor(mut self) -> Self {
        self.flags |= TypeFlags::SELF_CURSOR;
        self
    }

    /// Derive `!=` by negating the resolved `==`.
    pub fn derive_ne_from_eq(mut self) -> Self {
        self.flags |= TypeFlags::DERIVE_NE_FROM_EQ;
        self
    }

    /// Derive `>` and `>=` from `<` and `<=` with swapped operands.
    pub fn derive_order_swap(mut self) -> Self {
        self.flags |= TypeFlags::DERIVE_ORDER_SWAP;
        self
    }

    // =========================================================================
    // Operator Families
    // =========================================================================

    /// Declare a forward binary operator handler. Repeated declarations
    /// for the same operator form an ordered fallback chain.
    pub fn binary<F>(mut self, op: BinaryOp, handler: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<HandlerResult, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.binary[op.index()].push(Arc::new(handler));
        self
    }

    /// Declare a reflected (right-hand) binary operator handler.
    /// Receives `(self, other)` with this type's value first, i.e.
    /// argument order is already swapped relative to the forward form.
    pub fn reflected<F>(mut self, op: BinaryOp, handler: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<HandlerResult, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.reflected[op.index()].push(Arc::new(handler));
        self
    }

    /// Declare an in-place binary operator handler. A handler that
    /// succeeds mutates the object internally and the caller's binding
    /// is left untouched; returning `NotApplicable` falls back to the
    /// non-mutating forward dispatch, which rebinds.
    pub fn inplace<F>(mut self, op: BinaryOp, handler: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<HandlerResult, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.inplace[op.index()].push(Arc::new(handler));
        self
    }

    /// Declare a unary operator handler.
    pub fn unary<F>(mut self, op: UnaryOp, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<HandlerResult, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.unary[op.index()].push(Arc::new(handler));
        self
    }

    /// Declare a comparison handler.
    pub fn compare<F>(mut self, op: CompareOp, handler: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<HandlerResult, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.compare[op.index()].push(Arc::new(handler));
        self
    }

    // =========================================================================
    // Attribute Protocol
    // =========================================================================

    /// Declare the read interceptor. When declared it is the single
    /// mandatory gate for every read, including reads of attributes
    /// that exist.
    pub fn attr_interceptor<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &str) -> Result<Value, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.attr_read = Some(Arc::new(handler));
        self
    }

    /// Declare the fallback-on-missing read handler.
    pub fn attr_fallback<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &str) -> Result<Value, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.attr_fallback = Some(Arc::new(handler));
        self
    }

    /// Declare the attribute write handler.
    pub fn attr_writer<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &str, &Value) -> Result<(), ProtocolError> + Send + Sync + 'static,
    {
        self.slots.attr_write = Some(Arc::new(handler));
        self
    }

    /// Declare the attribute delete handler. A type may refuse all
    /// deletion here by returning `AttributeDenied` unconditionally.
    pub fn attr_deleter<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &str) -> Result<(), ProtocolError> + Send + Sync + 'static,
    {
        self.slots.attr_delete = Some(Arc::new(handler));
        self
    }

    // =========================================================================
    // Iteration Protocol
    // =========================================================================

    /// Declare the cursor factory. The returned value acts as the
    /// traversal cursor; it may be a fresh object per request.
    pub fn cursor_factory<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.cursor_factory = Some(Arc::new(handler));
        self
    }

    /// Declare cursor advancement for values of this type.
    /// `Ok(None)` signals exhaustion.
    pub fn advance<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<Option<Value>, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.advance = Some(Arc::new(handler));
        self
    }

    // =========================================================================
    // Invocation & Containers
    // =========================================================================

    /// Declare the invocation handler.
    pub fn call<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.call = Some(Arc::new(handler));
        self
    }

    /// Declare the length handler.
    pub fn length<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<usize, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.len = Some(Arc::new(handler));
        self
    }

    /// Declare the indexing handler.
    pub fn item<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, i64) -> Result<Value, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.item = Some(Arc::new(handler));
        self
    }

    /// Declare the membership handler.
    pub fn contains<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<bool, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.contains = Some(Arc::new(handler));
        self
    }

    /// Declare a bespoke reversal: a cursor factory over the reversed
    /// sequence.
    pub fn reversed<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.reversed = Some(Arc::new(handler));
        self
    }

    // =========================================================================
    // Scoped Resource Protocol
    // =========================================================================

    /// Declare the scoped-resource entry handler.
    pub fn enter<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.enter = Some(Arc::new(handler));
        self
    }

    /// Declare the scoped-resource exit handler. Returning `true`
    /// suppresses an in-flight failure.
    pub fn exit<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value, Option<&ProtocolError>) -> Result<bool, ProtocolError> + Send + Sync + 'static,
    {
        self.slots.exit = Some(Arc::new(handler));
        self
    }

    // =========================================================================
    // Class Dictionary
    // =========================================================================

    /// Declare a plain class attribute shared by all instances.
    pub fn class_attr(mut self, name: &str, value: Value) -> Self {
        self.attrs.insert(intern(name), ClassAttr::Plain(value));
        self
    }

    /// Attach a descriptor under a name. The descriptor's naming
    /// callback runs once, at registration.
    pub fn descriptor(mut self, name: &str, descriptor: Arc<dyn Descriptor>) -> Self {
        let name = intern(name);
        self.attrs
            .insert(name.clone(), ClassAttr::Descriptor(descriptor.clone()));
        self.descriptors.push((name, descriptor));
        self
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Freeze and publish the type in the given registry.
    pub fn register_in(self, registry: &TypeRegistry) -> Arc<TypeObject> {
        let type_id = registry.allocate_type_id();
        let type_obj = Arc::new(TypeObject::assemble(
            self.name,
            type_id,
            self.flags,
            self.slots,
            ClassDict::from_entries(self.attrs),
        ));

        // The one-time naming callback: the only point a descriptor
        // learns its name.
        for (name, descriptor) in &self.descriptors {
            descriptor.attached(&type_obj, name);
        }

        registry.register(type_obj.clone());
        type_obj
    }

    /// Freeze and publish the type in the process-wide registry.
    pub fn register(self) -> Arc<TypeObject> {
        self.register_in(global_registry())
    }
}

// =============================================================================
// Tests
// =============================================================================
