//! Protocol dispatcher runtime for tessera.
//!
//! This crate provides:
//! - Type objects with per-operation slot tables (`TypeObject`, `TypeSlots`)
//! - The declaration surface for opting into protocols (`TypeBuilder`)
//! - A process-wide type registry with frozen-after-build semantics
//! - Per-instance attribute storage (`Instance`)
//! - Reusable attribute-behavior units (`Descriptor`, `GuardedField`)
//! - Stateful traversal cursors (`CursorObject`)
//! - The six dispatch families under `ops`

#![deny(unsafe_op_in_unsafe_fn)]

pub mod object;
pub mod ops;
pub mod types;

// Re-export commonly used items.
pub use object::builder::TypeBuilder;
pub use object::descriptor::{Descriptor, GuardedField};
pub use object::instance::Instance;
pub use object::registry::{TypeRegistry, global_registry};
pub use object::type_obj::{
    BinaryOp, ClassAttr, CompareOp, HandlerResult, TypeFlags, TypeObject, TypeSlots, UnaryOp,
};
pub use types::cursor::CursorObject;

// Re-export the core value model at the root for convenience.
pub use tessera_core::{InternedString, ProtocolError, ProtocolErrorKind, TypeId, Value, intern};
