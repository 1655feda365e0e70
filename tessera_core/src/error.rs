//! Protocol error taxonomy.
//!
//! Every failure the dispatcher can surface is a `ProtocolError` with a
//! kind and a human-readable message naming the operation and the
//! operand types involved, so a caller can diagnose which declaration
//! is missing.
//!
//! Iteration exhaustion is deliberately absent from this taxonomy: it
//! is a normal termination signal, reported as `Ok(None)` by cursor
//! advancement, never as an error.

use std::fmt;

// =============================================================================
// Error Kind
// =============================================================================

/// Classification of protocol failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolErrorKind {
    /// No applicable handler after the full fallback chain.
    Unsupported,
    /// Attribute read fallback chain exhausted.
    AttributeMissing,
    /// Attribute deletion explicitly refused.
    AttributeDenied,
    /// Descriptor rejected a value on set.
    Validation,
    /// Division or modulo by zero in primitive arithmetic.
    ZeroDivision,
    /// Primitive integer arithmetic overflowed.
    Overflow,
    /// Index out of range for a container operation.
    Index,
    /// Operand or argument had an unusable type.
    Type,
}

impl ProtocolErrorKind {
    /// Display name, used as the error message prefix.
    pub const fn name(self) -> &'static str {
        match self {
            ProtocolErrorKind::Unsupported => "ProtocolUnsupported",
            ProtocolErrorKind::AttributeMissing => "AttributeMissing",
            ProtocolErrorKind::AttributeDenied => "AttributeDenied",
            ProtocolErrorKind::Validation => "ValidationError",
            ProtocolErrorKind::ZeroDivision => "ZeroDivisionError",
            ProtocolErrorKind::Overflow => "OverflowError",
            ProtocolErrorKind::Index => "IndexError",
            ProtocolErrorKind::Type => "TypeError",
        }
    }
}

// =============================================================================
// Protocol Error
// =============================================================================

/// A protocol dispatch failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    kind: ProtocolErrorKind,
    message: String,
}

impl ProtocolError {
    /// Construct from kind and message.
    pub fn new(kind: ProtocolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Error kind.
    #[inline]
    pub fn kind(&self) -> ProtocolErrorKind {
        self.kind
    }

    /// Error message (without the kind prefix).
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    /// No handler for a binary operator.
    pub fn unsupported_operand(op: &str, lhs: &str, rhs: &str) -> Self {
        Self::new(
            ProtocolErrorKind::Unsupported,
            format!("unsupported operand type(s) for '{}': '{}' and '{}'", op, lhs, rhs),
        )
    }

    /// No handler for a unary operator or single-operand protocol.
    pub fn unsupported(op: &str, type_name: &str) -> Self {
        Self::new(
            ProtocolErrorKind::Unsupported,
            format!("'{}' is not supported by type '{}'", op, type_name),
        )
    }

    /// Attribute read failed after the full fallback chain.
    pub fn attribute_missing(type_name: &str, attr: &str) -> Self {
        Self::new(
            ProtocolErrorKind::AttributeMissing,
            format!("'{}' object has no attribute '{}'", type_name, attr),
        )
    }

    /// Attribute deletion refused.
    pub fn attribute_denied(type_name: &str, attr: &str) -> Self {
        Self::new(
            ProtocolErrorKind::AttributeDenied,
            format!("'{}' object refuses deletion of attribute '{}'", type_name, attr),
        )
    }

    /// Descriptor set rejected the value.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::Validation, message)
    }

    /// Division by zero.
    pub fn zero_division() -> Self {
        Self::new(ProtocolErrorKind::ZeroDivision, "division by zero")
    }

    /// Integer overflow.
    pub fn overflow(op: &str) -> Self {
        Self::new(
            ProtocolErrorKind::Overflow,
            format!("integer overflow in '{}'", op),
        )
    }

    /// Index out of range.
    pub fn index_out_of_range(index: i64, len: usize) -> Self {
        Self::new(
            ProtocolErrorKind::Index,
            format!("index {} out of range for length {}", index, len),
        )
    }

    /// Generic type error.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::Type, message)
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

impl std::error::Error for ProtocolError {}

// =============================================================================
// Tests
// =============================================================================
