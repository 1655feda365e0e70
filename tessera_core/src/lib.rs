//! Core value model for the tessera protocol dispatcher.
//!
//! This crate provides:
//! - The dynamic `Value` type exchanged by protocol handlers
//! - Type identity (`TypeId`) for fast dispatch
//! - The protocol error taxonomy (`ProtocolError`)
//! - String interning for attribute and type names

pub mod error;
pub mod intern;
pub mod value;

pub use error::{ProtocolError, ProtocolErrorKind};
pub use intern::{InternedString, intern};
pub use value::{ProtocolObject, TypeId, Value};
