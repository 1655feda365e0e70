//! Traversal cursors.
//!
//! A `CursorObject` owns the state of one traversal: an underlying
//! source, a position, and a sticky exhaustion flag. Once a cursor has
//! signaled exhaustion, every subsequent advance signals exhaustion
//! again, even if the underlying source would produce more values.
//!
//! Exhaustion is `Ok(None)`: a different kind from every protocol error
//! and from the domain value none, which remains a legal element.

use crate::object::type_obj::{AdvanceHandler, ItemHandler};
use tessera_core::{ProtocolError, Value};

// =============================================================================
// CursorObject
// =============================================================================

/// Per-traversal iteration state.
pub struct CursorObject {
    kind: CursorKind,
    exhausted: bool,
}

/// Internal cursor state.
enum CursorKind {
    /// Cursor over nothing.
    Empty,

    /// Cursor over a materialized sequence of values.
    Values { values: Vec<Value>, index: usize },

    /// Index-walking cursor synthesized from indexing + length,
    /// visiting 0 .. len.
    Indexed {
        source: Value,
        item: ItemHandler,
        len: usize,
        index: usize,
    },

    /// Reverse index-walking cursor synthesized from indexing + length,
    /// visiting len−1 down to 0 lazily.
    ReverseIndexed {
        source: Value,
        item: ItemHandler,
        remaining: usize,
    },

    /// Handler-driven cursor; may be infinite.
    Advance {
        cursor: Value,
        advance: AdvanceHandler,
    },
}

impl CursorObject {
    /// An already-exhausted cursor.
    #[inline]
    pub fn empty() -> Self {
        Self {
            kind: CursorKind::Empty,
            exhausted: true,
        }
    }

    /// Cursor over a materialized sequence.
    #[inline]
    pub fn from_values(values: Vec<Value>) -> Self {
        let exhausted = values.is_empty();
        Self {
            kind: CursorKind::Values { values, index: 0 },
            exhausted,
        }
    }

    /// Index-walking cursor over `source`, visiting 0 .. len.
    #[inline]
    pub fn indexed(source: Value, item: ItemHandler, len: usize) -> Self {
        Self {
            kind: CursorKind::Indexed {
                source,
                item,
                len,
                index: 0,
            },
            exhausted: len == 0,
        }
    }

    /// Reverse index-walking cursor over `source`, visiting len−1 .. 0.
    #[inline]
    pub fn reverse_indexed(source: Value, item: ItemHandler, len: usize) -> Self {
        Self {
            kind: CursorKind::ReverseIndexed {
                source,
                item,
                remaining: len,
            },
            exhausted: len == 0,
        }
    }

    /// Handler-driven cursor. `cursor` is the value the advance handler
    /// receives; it keeps its own position state.
    #[inline]
    pub fn from_advance(cursor: Value, advance: AdvanceHandler) -> Self {
        Self {
            kind: CursorKind::Advance { cursor, advance },
            exhausted: false,
        }
    }

    /// Whether the cursor has signaled exhaustion.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Produce the next value, or `Ok(None)` when exhausted.
    ///
    /// Exhaustion is sticky: after the first `Ok(None)`, every further
    /// call returns `Ok(None)` without consulting the source.
    pub fn next(&mut self) -> Result<Option<Value>, ProtocolError> {
        if self.exhausted {
            return Ok(None);
        }

        match &mut self.kind {
            CursorKind::Empty => {
                self.exhausted = true;
                Ok(None)
            }

            CursorKind::Values { values, index } => {
                if *index < values.len() {
                    let value = values[*index].clone();
                    *index += 1;
                    Ok(Some(value))
                } else {
                    self.exhausted = true;
                    Ok(None)
                }
            }

            CursorKind::Indexed {
                source,
                item,
                len,
                index,
            } => {
                if *index < *len {
                    let value = item(source, *index as i64)?;
                    *index += 1;
                    Ok(Some(value))
                } else {
                    self.exhausted = true;
                    Ok(None)
                }
            }

            CursorKind::ReverseIndexed {
                source,
                item,
                remaining,
            } => {
                if *remaining > 0 {
                    let value = item(source, (*remaining - 1) as i64)?;
                    *remaining -= 1;
                    Ok(Some(value))
                } else {
                    self.exhausted = true;
                    Ok(None)
                }
            }

            CursorKind::Advance { cursor, advance } => match advance(cursor)? {
                Some(value) => Ok(Some(value)),
                None => {
                    self.exhausted = true;
                    Ok(None)
                }
            },
        }
    }

    /// Drain the remaining values into a vector.
    ///
    /// Applying this to an infinite cursor is a consumer error, not a
    /// protocol violation; it will not terminate.
    pub fn collect_remaining(&mut self) -> Result<Vec<Value>, ProtocolError> {
        let mut out = Vec::new();
        while let Some(value) = self.next()? {
            out.push(value);
        }
        Ok(out)
    }
}

impl std::fmt::Debug for CursorObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.kind {
            CursorKind::Empty => "empty",
            CursorKind::Values { .. } => "values",
            CursorKind::Indexed { .. } => "indexed",
            CursorKind::ReverseIndexed { .. } => "reverse-indexed",
            CursorKind::Advance { .. } => "advance",
        };
        write!(f, "<{} cursor, exhausted={}>", kind, self.exhausted)
    }
}

// =============================================================================
// Tests
// =============================================================================
