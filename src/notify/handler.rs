//! # Upstream handler slot.
//!
//! Producers expose a single settable callback slot; a [`Notifier`](crate::Notifier)
//! wires itself into it via [`HandlerSlot::set_callback`]. [`Handler`] is the
//! stock implementation.
//!
//! ```text
//! producer ── emit(payload) ──► Handler ──► slot callback ──► Notifier pipeline
//!                                  └─ no callback wired ─► Ok(false), payload dropped
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::error::NotifyError;
use crate::notify::payload::Payload;

/// Callback installed into a handler slot.
pub type Callback<M, B> = Arc<dyn Fn(Payload<M, B>) -> Result<(), NotifyError> + Send + Sync>;

/// Source of payloads with one settable callback slot.
pub trait HandlerSlot<M, B>: Send + Sync {
    /// Replaces the current callback.
    fn set_callback(&self, callback: Callback<M, B>);
}

/// Single-slot payload source.
pub struct Handler<M, B> {
    slot: RwLock<Option<Callback<M, B>>>,
}

impl<M, B> Handler<M, B> {
    /// Creates an unbound handler.
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// True if a callback is wired.
    pub fn is_bound(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Removes the current callback; later emits are dropped.
    pub fn unbind(&self) {
        *self.slot.write() = None;
    }

    /// Passes `payload` to the wired callback.
    ///
    /// Returns `Ok(false)` (payload dropped) when nothing is wired, otherwise
    /// `Ok(true)` or the callback's error. The slot lock is not held while the
    /// callback runs.
    pub fn emit(&self, payload: Payload<M, B>) -> Result<bool, NotifyError> {
        let callback = self.slot.read().clone();
        match callback {
            Some(cb) => cb(payload).map(|()| true),
            None => {
                trace!("no callback wired; payload dropped");
                Ok(false)
            }
        }
    }
}

impl<M, B> Default for Handler<M, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, B> HandlerSlot<M, B> for Handler<M, B>
where
    M: Send + Sync,
    B: Send + Sync,
{
    fn set_callback(&self, callback: Callback<M, B>) {
        *self.slot.write() = Some(callback);
    }
}

impl<M, B> fmt::Debug for Handler<M, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("bound", &self.is_bound())
            .finish()
    }
}
