//! Scoped resource dispatch.
//!
//! Pairs a type's entry and exit handlers around a block of work. Exit
//! runs exactly once on every path out of the scope: normal completion,
//! an early error return, or an unwind abandoning the guard — the
//! guard's `Drop` covers abandonment. The exit handler receives the
//! in-flight failure, when there is one, and its boolean return decides
//! whether that failure is suppressed or continues propagating. The
//! resource is released by the exit handler before it returns,
//! regardless of the suppression decision.

use crate::object::type_obj::ExitHandler;
use crate::ops::dispatch;
use tessera_core::{ProtocolError, Value};

// =============================================================================
// ScopeGuard
// =============================================================================

/// An entered scope holding the acquired resource.
///
/// Consume it with [`ScopeGuard::exit_normal`] or
/// [`ScopeGuard::exit_with`]; dropping an unconsumed guard (an unwind
/// path) still runs the exit handler, once.
pub struct ScopeGuard {
    manager: Value,
    resource: Value,
    exit: ExitHandler,
    finished: bool,
}

impl std::fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("manager", &self.manager)
            .field("resource", &self.resource)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl ScopeGuard {
    /// Enter a scope: acquire the resource via the manager type's entry
    /// handler. Both entry and exit must be declared before entry runs.
    pub fn enter(manager: &Value) -> Result<Self, ProtocolError> {
        let Some(manager_type) = dispatch::type_object_of(manager) else {
            return Err(ProtocolError::unsupported("enter", manager.type_name()));
        };
        let slots = manager_type.slots();

        // Resolve exit before acquiring, so a half-declared type fails
        // without ever holding a resource.
        let exit = match slots.exit() {
            Some(exit) => exit.clone(),
            None => return Err(ProtocolError::unsupported("exit", manager.type_name())),
        };
        let enter = match slots.enter() {
            Some(enter) => enter,
            None => return Err(ProtocolError::unsupported("enter", manager.type_name())),
        };

        let resource = enter(manager)?;
        Ok(Self {
            manager: manager.clone(),
            resource,
            exit,
            finished: false,
        })
    }

    /// The bound resource returned by the entry handler.
    #[inline]
    pub fn resource(&self) -> &Value {
        &self.resource
    }

    /// Exit after normal completion.
    pub fn exit_normal(mut self) -> Result<(), ProtocolError> {
        self.finished = true;
        (self.exit)(&self.manager, None).map(|_suppress| ())
    }

    /// Exit with an in-flight failure. Returns the handler's
    /// suppression decision.
    pub fn exit_with(mut self, error: &ProtocolError) -> Result<bool, ProtocolError> {
        self.finished = true;
        (self.exit)(&self.manager, Some(error))
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if !self.finished {
            // Abandonment path (an unwind out of the scope). The exit
            // handler still runs; its outcome has nowhere to propagate.
            self.finished = true;
            let _ = (self.exit)(&self.manager, None);
        }
    }
}

// =============================================================================
// Scoped Execution
// =============================================================================

/// Run a block of work inside a scope.
///
/// The block receives the bound resource. On success, exit runs with no
/// failure and the block's value is returned. On failure, exit runs
/// with the error; a `true` suppression decision converts the outcome
/// to none, otherwise the original error continues propagating. Exit
/// runs exactly once either way, and an exit-handler error of its own
/// takes precedence.
pub fn run_scoped<F>(manager: &Value, body: F) -> Result<Value, ProtocolError>
where
    F: FnOnce(&Value) -> Result<Value, ProtocolError>,
{
    let guard = ScopeGuard::enter(manager)?;
    match body(guard.resource()) {
        Ok(value) => {
            guard.exit_normal()?;
            Ok(value)
        }
        Err(error) => {
            if guard.exit_with(&error)? {
                Ok(Value::none())
            } else {
                Err(error)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
