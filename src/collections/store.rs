//! # Thread-safe keyed membership store.
//!
//! [`SyncStore`] is a hash-backed set guarded by a single coarse lock.
//!
//! ## Rules
//! - **Idempotent add**: inserting an existing member is a no-op.
//! - **Copy-out reads**: [`SyncStore::snapshot`] and [`SyncStore::iter`] return a
//!   point-in-time copy; the live table never escapes the lock, so concurrent
//!   mutation during iteration cannot corrupt or panic.
//! - **No reentrancy**: callers must not mutate the same store from inside a
//!   callback triggered by that store.
//! - **Unordered**: snapshot order is unspecified.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;

use crate::collections::collection::{Collection, copy_into};
use crate::error::CollectionError;

/// Hash set behind one `parking_lot::Mutex`.
pub struct SyncStore<T> {
    members: Mutex<HashSet<T>>,
}

impl<T> SyncStore<T>
where
    T: Eq + Hash + Clone,
{
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            members: Mutex::new(HashSet::new()),
        }
    }

    /// Creates an empty store with room for `capacity` members.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Mutex::new(HashSet::with_capacity(capacity)),
        }
    }

    /// Inserts `item` if absent. Returns `true` if it was inserted.
    pub fn add(&self, item: T) -> bool {
        self.members.lock().insert(item)
    }

    /// Inserts every item under one lock acquisition; returns how many were new.
    pub fn extend<I: IntoIterator<Item = T>>(&self, items: I) -> usize {
        let mut members = self.members.lock();
        items.into_iter().filter(|it| members.insert(it.clone())).count()
    }

    /// Removes `item` if present. Returns `true` if it was present.
    pub fn remove(&self, item: &T) -> bool {
        self.members.lock().remove(item)
    }

    /// Keeps only the members for which `keep` returns `true`; returns how many were removed.
    ///
    /// `keep` runs under the store lock.
    pub fn retain<F: FnMut(&T) -> bool>(&self, mut keep: F) -> usize {
        let mut members = self.members.lock();
        let before = members.len();
        members.retain(|it| keep(it));
        before - members.len()
    }

    /// Removes every member.
    pub fn clear(&self) {
        self.members.lock().clear();
    }

    /// Returns `true` if `item` is a member.
    pub fn contains(&self, item: &T) -> bool {
        self.members.lock().contains(item)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    /// True if there are no members.
    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }

    /// Point-in-time copy of the members.
    pub fn snapshot(&self) -> Vec<T> {
        self.members.lock().iter().cloned().collect()
    }

    /// Iterates over a point-in-time copy.
    pub fn iter(&self) -> std::vec::IntoIter<T> {
        self.snapshot().into_iter()
    }

    /// Copies a snapshot into `dest` at `offset`.
    ///
    /// # Errors
    /// [`CollectionError::Capacity`] if `dest[offset..]` is shorter than the store.
    pub fn copy_to(&self, dest: &mut [T], offset: usize) -> Result<usize, CollectionError> {
        let members = self.members.lock();
        let items: Vec<T> = members.iter().cloned().collect();
        drop(members);
        copy_into(&items, dest, offset)
    }
}

impl<T: Eq + Hash + Clone> Default for SyncStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for SyncStore<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            members: Mutex::new(iter.into_iter().collect()),
        }
    }
}

impl<T: Eq + Hash + Clone> Collection<T> for SyncStore<T> {
    fn try_add(&self, item: T) -> Result<bool, CollectionError> {
        Ok(self.add(item))
    }

    fn try_remove(&self, item: &T) -> Result<bool, CollectionError> {
        Ok(self.remove(item))
    }

    fn try_clear(&self) -> Result<(), CollectionError> {
        self.clear();
        Ok(())
    }

    fn contains(&self, item: &T) -> bool {
        SyncStore::contains(self, item)
    }

    fn len(&self) -> usize {
        SyncStore::len(self)
    }

    fn snapshot(&self) -> Vec<T> {
        SyncStore::snapshot(self)
    }

    fn copy_to(&self, dest: &mut [T], offset: usize) -> Result<usize, CollectionError> {
        SyncStore::copy_to(self, dest, offset)
    }
}

impl<T> fmt::Debug for SyncStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncStore")
            .field("len", &self.members.lock().len())
            .finish()
    }
}
