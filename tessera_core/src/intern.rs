//! Global string interning.
//!
//! Attribute and type names are interned once and shared; repeated
//! lookups compare pointers before falling back to content, and clones
//! are reference-count bumps.

use rustc_hash::FxHashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{Arc, OnceLock, RwLock};

// =============================================================================
// InternedString
// =============================================================================

/// A reference to an interned string.
///
/// Two `InternedString`s produced by [`intern`] for equal content share
/// the same allocation, so equality is usually a pointer compare.
#[derive(Clone)]
pub struct InternedString(Arc<str>);

impl InternedString {
    /// String slice view.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for InternedString {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl PartialEq for InternedString {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for InternedString {}

impl PartialEq<str> for InternedString {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl Hash for InternedString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl std::borrow::Borrow<str> for InternedString {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

// =============================================================================
// Global Intern Table
// =============================================================================

static INTERN_TABLE: OnceLock<RwLock<FxHashSet<Arc<str>>>> = OnceLock::new();

fn table() -> &'static RwLock<FxHashSet<Arc<str>>> {
    INTERN_TABLE.get_or_init(|| RwLock::new(FxHashSet::default()))
}

/// Intern a string, returning the shared reference.
pub fn intern(s: &str) -> InternedString {
    // Fast path: already interned.
    if let Some(existing) = table().read().unwrap().get(s) {
        return InternedString(existing.clone());
    }

    let mut set = table().write().unwrap();
    // Re-check under the write lock; another thread may have inserted.
    if let Some(existing) = set.get(s) {
        return InternedString(existing.clone());
    }
    let arc: Arc<str> = Arc::from(s);
    set.insert(arc.clone());
    InternedString(arc)
}

// =============================================================================
// Tests
// =============================================================================
