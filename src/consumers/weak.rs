//! # Non-owning consumer proxy.
//!
//! [`WeakConsumer`] lets a registry hold a consumer *loosely*: the registry's
//! reference never keeps the consumer alive.
//!
//! ```text
//! owner ── Arc<C> ──────────────┐
//!                               ▼
//! registry ── WeakConsumer ── Weak<C> ── try_resolve()
//!                                           ├─ Some(c) ─► c.deliver(..)
//!                                           └─ None    ─► no-op, can_remove() = true
//! ```
//!
//! ## Rules
//! - Delivery to a dropped target is a silent no-op (`Ok(())`): there is nobody
//!   to report a failure to.
//! - `can_remove()` is `true` exactly when the target can no longer be resolved,
//!   so a [`PruningSet`](crate::PruningSet) drops the proxy on its next read.
//! - The target's own eligibility check is honored while it is alive; a dropped
//!   target is never eligible.

use std::fmt;
use std::sync::{Arc, Weak};

use tracing::trace;

use crate::collections::{Member, Removable};
use crate::consumers::consume::{Conditional, Consume, ConsumerRef};
use crate::error::{CollectionError, ConsumerError};
use crate::notify::SenderPayload;

/// Consumer proxy holding a `Weak` reference to its target.
pub struct WeakConsumer<S, M, B> {
    target: Weak<dyn Consume<S, M, B>>,
    name: String,
}

impl<S, M, B> WeakConsumer<S, M, B>
where
    S: 'static,
    M: 'static,
    B: 'static,
{
    /// Creates a proxy for `target` without taking ownership of it.
    pub fn new<C>(target: &Arc<C>) -> Self
    where
        C: Consume<S, M, B> + 'static,
    {
        let name = <C as Consume<S, M, B>>::name(target).to_string();
        let weak: Weak<C> = Arc::downgrade(target);
        let target: Weak<dyn Consume<S, M, B>> = weak;
        Self { target, name }
    }

    /// Creates a proxy from an existing weak reference.
    ///
    /// # Errors
    /// [`CollectionError::InvalidArgument`] if `target` is already dead.
    pub fn from_weak(target: Weak<dyn Consume<S, M, B>>) -> Result<Self, CollectionError> {
        let Some(live) = target.upgrade() else {
            return Err(CollectionError::InvalidArgument {
                name: "target",
                reason: "weak reference is already dead",
            });
        };
        let name = live.name().to_string();
        Ok(Self { target, name })
    }

    /// Resolves the target if it is still alive.
    pub fn try_resolve(&self) -> Option<Arc<dyn Consume<S, M, B>>> {
        self.target.upgrade()
    }

    /// True while the target is alive.
    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Wraps the proxy into a registry handle.
    pub fn into_ref(self) -> ConsumerRef<S, M, B> {
        let shared: Arc<dyn Consume<S, M, B>> = Arc::new(self);
        Member::new(shared)
    }
}

impl<S, M, B> Removable for WeakConsumer<S, M, B> {
    fn can_remove(&self) -> bool {
        self.target.strong_count() == 0
    }
}

impl<S, M, B> Conditional<S, M> for WeakConsumer<S, M, B> {
    fn should_notify(&self, sender: &S, meta: &M) -> bool {
        match self.target.upgrade() {
            Some(target) => target
                .as_conditional()
                .is_none_or(|c| c.should_notify(sender, meta)),
            None => false,
        }
    }
}

impl<S, M, B> Consume<S, M, B> for WeakConsumer<S, M, B> {
    fn deliver(&self, payload: &SenderPayload<S, M, B>) -> Result<(), ConsumerError> {
        match self.target.upgrade() {
            Some(target) => target.deliver(payload),
            None => {
                trace!(consumer = %self.name, "target dropped; delivery skipped");
                Ok(())
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn as_removable(&self) -> Option<&dyn Removable> {
        Some(self)
    }

    fn as_conditional(&self) -> Option<&dyn Conditional<S, M>> {
        Some(self)
    }
}

impl<S, M, B> fmt::Debug for WeakConsumer<S, M, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakConsumer")
            .field("name", &self.name)
            .field("alive", &(self.target.strong_count() > 0))
            .finish()
    }
}
