//! # Identity-compared member handle and the removable capability.
//!
//! Registries compare members by **identity**, not by value: two consumers that
//! happen to be equal are still two subscriptions. [`Member`] wraps an `Arc<T>`
//! and implements `Eq`/`Hash` over the pointer address, so it works for
//! unsized trait objects (`Member<dyn Consume<..>>`) as well.
//!
//! Members may expose the [`Removable`] capability through [`MaybeRemovable`].
//! A [`PruningSet`](crate::PruningSet) queries it lazily on every snapshot rebuild:
//! ```text
//! member.removable() ── None            ─► never auto-pruned
//!                    └─ Some(r) ─► r.can_remove() == true ─► evicted
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Capability of a member that can declare itself expired.
///
/// Implementations must be cheap and must not touch the registry that is
/// querying them (the registry lock is held during the call).
pub trait Removable: Send + Sync {
    /// Returns `true` once the member should be dropped from any registry holding it.
    fn can_remove(&self) -> bool;
}

/// Optional access to the [`Removable`] capability.
///
/// The default returns `None`: the member is never pruned automatically.
pub trait MaybeRemovable {
    /// Returns the removable capability if this member has one.
    fn removable(&self) -> Option<&dyn Removable> {
        None
    }
}

impl<T: MaybeRemovable + ?Sized> MaybeRemovable for Arc<T> {
    fn removable(&self) -> Option<&dyn Removable> {
        (**self).removable()
    }
}

/// Shared handle compared by identity.
pub struct Member<T: ?Sized>(Arc<T>);

impl<T: ?Sized> Member<T> {
    /// Wraps a shared reference.
    pub fn new(inner: Arc<T>) -> Self {
        Self(inner)
    }

    /// Borrows the underlying `Arc`.
    pub fn as_arc(&self) -> &Arc<T> {
        &self.0
    }

    /// Unwraps into the underlying `Arc`.
    pub fn into_arc(self) -> Arc<T> {
        self.0
    }

    /// Returns `true` if `other` points at the same allocation.
    pub fn is(&self, other: &Arc<T>) -> bool {
        self.addr() == addr_of(other)
    }

    #[inline]
    fn addr(&self) -> usize {
        addr_of(&self.0)
    }
}

#[inline]
fn addr_of<T: ?Sized>(arc: &Arc<T>) -> usize {
    // Thin the pointer: vtables of the same object may differ across codegen units.
    Arc::as_ptr(arc) as *const () as usize
}

impl<T: ?Sized> Clone for Member<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> PartialEq for Member<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl<T: ?Sized> Eq for Member<T> {}

impl<T: ?Sized> Hash for Member<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T: ?Sized> Deref for Member<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> From<Arc<T>> for Member<T> {
    fn from(inner: Arc<T>) -> Self {
        Self(inner)
    }
}

impl<T: ?Sized> fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Member({:#x})", self.addr())
    }
}

impl<T: MaybeRemovable + ?Sized> MaybeRemovable for Member<T> {
    fn removable(&self) -> Option<&dyn Removable> {
        self.0.removable()
    }
}
