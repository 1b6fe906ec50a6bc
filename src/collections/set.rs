//! # Thread-safe indexed set with set algebra.
//!
//! [`SyncSet`] keeps two structures in step under one lock:
//! ```text
//! index: HashMap<T, usize> ──► position in ──► items: Vec<T>
//! ```
//! Every mutation updates both before the lock is released, so readers never see
//! an index entry without its item (or the other way round).
//!
//! ## Rules
//! - Snapshot order is the backing vector order. Removal uses `swap_remove`, so
//!   order is stable only until the next removal.
//! - Set-algebra arguments are collected **before** the lock is taken; passing an
//!   iterator that reads the same set is safe.
//! - Duplicates inside the argument are ignored (set semantics).

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;

use crate::collections::collection::{Collection, copy_into};
use crate::error::CollectionError;

/// Index plus ordered backing storage.
struct Indexed<T> {
    index: HashMap<T, usize>,
    items: Vec<T>,
}

impl<T: Eq + Hash + Clone> Indexed<T> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            items: Vec::new(),
        }
    }

    fn insert(&mut self, item: T) -> bool {
        if self.index.contains_key(&item) {
            return false;
        }
        self.index.insert(item.clone(), self.items.len());
        self.items.push(item);
        true
    }

    fn remove(&mut self, item: &T) -> bool {
        let Some(pos) = self.index.remove(item) else {
            return false;
        };
        self.items.swap_remove(pos);
        if let Some(moved) = self.items.get(pos) {
            if let Some(slot) = self.index.get_mut(moved) {
                *slot = pos;
            }
        }
        true
    }

    fn contains(&self, item: &T) -> bool {
        self.index.contains_key(item)
    }

    fn clear(&mut self) {
        self.index.clear();
        self.items.clear();
    }

    /// Keeps items matching `keep`, preserving their relative order.
    fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) -> usize {
        let before = self.items.len();
        self.items.retain(|it| keep(it));
        self.index.clear();
        for (pos, it) in self.items.iter().enumerate() {
            self.index.insert(it.clone(), pos);
        }
        before - self.items.len()
    }
}

/// Ordered hash set behind one `parking_lot::Mutex`.
pub struct SyncSet<T> {
    inner: Mutex<Indexed<T>>,
}

impl<T> SyncSet<T>
where
    T: Eq + Hash + Clone,
{
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Indexed::new()),
        }
    }

    /// Inserts `item` if absent. Returns `true` if it was inserted.
    pub fn add(&self, item: T) -> bool {
        self.inner.lock().insert(item)
    }

    /// Removes `item` if present. Returns `true` if it was present.
    pub fn remove(&self, item: &T) -> bool {
        self.inner.lock().remove(item)
    }

    /// Removes every element.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Returns `true` if `item` is a member.
    pub fn contains(&self, item: &T) -> bool {
        self.inner.lock().contains(item)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// True if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Point-in-time copy in backing order.
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.lock().items.clone()
    }

    /// Iterates over a point-in-time copy.
    pub fn iter(&self) -> std::vec::IntoIter<T> {
        self.snapshot().into_iter()
    }

    /// Copies a snapshot into `dest` at `offset`.
    ///
    /// # Errors
    /// [`CollectionError::Capacity`] if `dest[offset..]` is shorter than the set.
    pub fn copy_to(&self, dest: &mut [T], offset: usize) -> Result<usize, CollectionError> {
        let inner = self.inner.lock();
        copy_into(&inner.items, dest, offset)
    }

    // ---------------------------
    // Set algebra (mutating)
    // ---------------------------

    /// Adds every element of `other`; returns how many were new.
    pub fn union_with<I: IntoIterator<Item = T>>(&self, other: I) -> usize {
        let other = collect(other);
        let mut inner = self.inner.lock();
        other.into_iter().filter(|it| inner.insert(it.clone())).count()
    }

    /// Keeps only elements also present in `other`; returns how many were removed.
    pub fn intersect_with<I: IntoIterator<Item = T>>(&self, other: I) -> usize {
        let other = collect(other);
        self.inner.lock().retain(|it| other.contains(it))
    }

    /// Removes every element present in `other`; returns how many were removed.
    pub fn except_with<I: IntoIterator<Item = T>>(&self, other: I) -> usize {
        let other = collect(other);
        let mut inner = self.inner.lock();
        other.iter().filter(|it| inner.remove(it)).count()
    }

    /// Keeps elements present in exactly one of `self` and `other`.
    pub fn symmetric_except_with<I: IntoIterator<Item = T>>(&self, other: I) {
        let other = collect(other);
        let mut inner = self.inner.lock();
        for it in other {
            if !inner.remove(&it) {
                inner.insert(it);
            }
        }
    }

    // ---------------------------
    // Set algebra (queries)
    // ---------------------------

    /// True if every element of `self` is in `other`.
    pub fn is_subset_of<I: IntoIterator<Item = T>>(&self, other: I) -> bool {
        let other = collect(other);
        let inner = self.inner.lock();
        inner.items.iter().all(|it| other.contains(it))
    }

    /// True if `self` is a subset of `other` and `other` has extra elements.
    pub fn is_proper_subset_of<I: IntoIterator<Item = T>>(&self, other: I) -> bool {
        let other = collect(other);
        let inner = self.inner.lock();
        other.len() > inner.items.len() && inner.items.iter().all(|it| other.contains(it))
    }

    /// True if every element of `other` is in `self`.
    pub fn is_superset_of<I: IntoIterator<Item = T>>(&self, other: I) -> bool {
        let other = collect(other);
        let inner = self.inner.lock();
        other.iter().all(|it| inner.contains(it))
    }

    /// True if `self` is a superset of `other` and has extra elements.
    pub fn is_proper_superset_of<I: IntoIterator<Item = T>>(&self, other: I) -> bool {
        let other = collect(other);
        let inner = self.inner.lock();
        inner.items.len() > other.len() && other.iter().all(|it| inner.contains(it))
    }

    /// True if `self` and `other` share at least one element.
    pub fn overlaps<I: IntoIterator<Item = T>>(&self, other: I) -> bool {
        let other = collect(other);
        let inner = self.inner.lock();
        other.iter().any(|it| inner.contains(it))
    }

    /// True if `self` and `other` contain the same elements.
    pub fn set_equals<I: IntoIterator<Item = T>>(&self, other: I) -> bool {
        let other = collect(other);
        let inner = self.inner.lock();
        inner.items.len() == other.len() && other.iter().all(|it| inner.contains(it))
    }
}

fn collect<T: Eq + Hash, I: IntoIterator<Item = T>>(other: I) -> HashSet<T> {
    other.into_iter().collect()
}

impl<T: Eq + Hash + Clone> Default for SyncSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for SyncSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut inner = Indexed::new();
        for it in iter {
            inner.insert(it);
        }
        Self {
            inner: Mutex::new(inner),
        }
    }
}

impl<T: Eq + Hash + Clone> Collection<T> for SyncSet<T> {
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
        SyncSet::contains(self, item)
    }

    fn len(&self) -> usize {
        SyncSet::len(self)
    }

    fn snapshot(&self) -> Vec<T> {
        SyncSet::snapshot(self)
    }

    fn copy_to(&self, dest: &mut [T], offset: usize) -> Result<usize, CollectionError> {
        SyncSet::copy_to(self, dest, offset)
    }
}

impl<T> fmt::Debug for SyncSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSet")
            .field("len", &self.inner.lock().items.len())
            .finish()
    }
}
