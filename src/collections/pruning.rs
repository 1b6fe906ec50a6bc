//! # Self-pruning registry with lazy, invalidate-on-write snapshots.
//!
//! [`PruningSet`] wraps a [`SyncStore`] and evicts members that report
//! themselves removable. There is no background sweeper: eviction happens as a
//! side effect of asking "who is currently registered".
//!
//! ## Architecture
//! ```text
//! add / remove / clear ──► store mutation ──► cached snapshot = None
//!
//! snapshot()
//!     ├─ cached, no member removable now ──────────► Arc<[T]> (shared)
//!     └─ rebuild:
//!          for m in store:
//!              m.removable()?.can_remove() ─ true ─► store.remove(m)  (evicted)
//!                                          └ else ─► keep
//!          cache = Some(kept)                       ──► Arc<[T]>
//! ```
//!
//! ## Rules
//! - One coarse lock (the cache lock) serializes mutation and rebuild; the
//!   store's own lock is only ever taken inside it.
//! - Only one thread performs the prune-and-cache work per invalidation cycle.
//! - A member added after a snapshot was cached is invisible to that snapshot.
//! - A cache hit still checks every cached member (no allocation); if any has
//!   become removable since the cache was built, the snapshot is rebuilt, so no
//!   read ever returns a member that reports `can_remove() == true`.
//! - `len`, `contains`, `iter` and `copy_to` are all answered from the snapshot.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::collections::collection::{Collection, copy_into};
use crate::collections::member::MaybeRemovable;
use crate::collections::store::SyncStore;
use crate::error::CollectionError;

/// Immutable, shareable point-in-time view of a registry.
pub type Snapshot<T> = Arc<[T]>;

/// Registry that drops removable members whenever its snapshot is rebuilt.
pub struct PruningSet<T> {
    cache: Mutex<Option<Snapshot<T>>>,
    store: SyncStore<T>,
}

impl<T> PruningSet<T>
where
    T: MaybeRemovable + Eq + Hash + Clone,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(None),
            store: SyncStore::new(),
        }
    }

    /// Inserts `item` and invalidates the snapshot. Returns `true` if it was new.
    pub fn add(&self, item: T) -> bool {
        let mut cache = self.cache.lock();
        *cache = None;
        self.store.add(item)
    }

    /// Inserts every item and invalidates the snapshot; returns how many were new.
    pub fn add_elements<I: IntoIterator<Item = T>>(&self, items: I) -> usize {
        let mut cache = self.cache.lock();
        *cache = None;
        self.store.extend(items)
    }

    /// Removes `item` and invalidates the snapshot. Returns `true` if it was present.
    pub fn remove(&self, item: &T) -> bool {
        let mut cache = self.cache.lock();
        *cache = None;
        self.store.remove(item)
    }

    /// Removes every listed item and invalidates the snapshot; returns how many were present.
    pub fn remove_elements<'a, I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let mut cache = self.cache.lock();
        *cache = None;
        items
            .into_iter()
            .filter(|it| self.store.remove(it))
            .count()
    }

    /// Removes every member.
    pub fn clear(&self) {
        let mut cache = self.cache.lock();
        *cache = None;
        self.store.clear();
    }

    /// Drops the cached snapshot so the next read rebuilds (and prunes).
    pub fn invalidate_snapshot(&self) {
        *self.cache.lock() = None;
    }

    /// Returns the current members, evicting any that report themselves removable.
    pub fn snapshot(&self) -> Snapshot<T> {
        let mut cache = self.cache.lock();
        if let Some(snap) = cache.as_ref() {
            if !snap.iter().any(is_removable) {
                return Arc::clone(snap);
            }
        }

        let members = self.store.snapshot();
        let total = members.len();
        let mut kept = Vec::with_capacity(total);
        for m in members {
            if is_removable(&m) {
                self.store.remove(&m);
            } else {
                kept.push(m);
            }
        }

        let pruned = total - kept.len();
        if pruned > 0 {
            debug!(pruned, remaining = kept.len(), "pruned removable members");
        }

        let snap: Snapshot<T> = kept.into();
        *cache = Some(Arc::clone(&snap));
        snap
    }

    /// Iterates over the current snapshot.
    pub fn iter(&self) -> SnapshotIter<T> {
        SnapshotIter {
            snap: self.snapshot(),
            pos: 0,
        }
    }

    /// Number of members in the current snapshot.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// True if the current snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Returns `true` if `item` is in the current snapshot.
    pub fn contains(&self, item: &T) -> bool {
        self.snapshot().contains(item)
    }

    /// Copies the current snapshot into `dest` at `offset`.
    ///
    /// # Errors
    /// [`CollectionError::Capacity`] if `dest[offset..]` is shorter than the snapshot.
    pub fn copy_to(&self, dest: &mut [T], offset: usize) -> Result<usize, CollectionError> {
        copy_into(&self.snapshot(), dest, offset)
    }
}

fn is_removable<T: MaybeRemovable>(member: &T) -> bool {
    member.removable().is_some_and(|r| r.can_remove())
}

impl<T: MaybeRemovable + Eq + Hash + Clone> Default for PruningSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: MaybeRemovable + Eq + Hash + Clone> Collection<T> for PruningSet<T> {
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
        PruningSet::contains(self, item)
    }

    fn len(&self) -> usize {
        PruningSet::len(self)
    }

    fn snapshot(&self) -> Vec<T> {
        PruningSet::snapshot(self).to_vec()
    }

    fn copy_to(&self, dest: &mut [T], offset: usize) -> Result<usize, CollectionError> {
        PruningSet::copy_to(self, dest, offset)
    }
}

impl<T> fmt::Debug for PruningSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached = self.cache.lock().as_ref().map(|s| s.len());
        f.debug_struct("PruningSet")
            .field("cached", &cached)
            .finish_non_exhaustive()
    }
}

/// Owning iterator over a [`Snapshot`]; yields clones of the members.
pub struct SnapshotIter<T> {
    snap: Snapshot<T>,
    pos: usize,
}

impl<T: Clone> Iterator for SnapshotIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.snap.get(self.pos)?.clone();
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.snap.len() - self.pos;
        (left, Some(left))
    }
}

impl<T: Clone> ExactSizeIterator for SnapshotIter<T> {}

impl<'a, T> IntoIterator for &'a PruningSet<T>
where
    T: MaybeRemovable + Eq + Hash + Clone,
{
    type Item = T;
    type IntoIter = SnapshotIter<T>;

    fn into_iter(self) -> SnapshotIter<T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::member::{Member, Removable};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;

    /// Member whose expiry is flipped by the test.
    #[derive(Default)]
    struct Lease {
        expired: AtomicBool,
        checks: AtomicUsize,
    }

    impl Lease {
        fn expire(&self) {
            self.expired.store(true, Ordering::SeqCst);
        }

        fn renew(&self) {
            self.expired.store(false, Ordering::SeqCst);
        }
    }

    impl Removable for Lease {
        fn can_remove(&self) -> bool {
            self.checks.fetch_add(1, Ordering::SeqCst);
            self.expired.load(Ordering::SeqCst)
        }
    }

    impl MaybeRemovable for Lease {
        fn removable(&self) -> Option<&dyn Removable> {
            Some(self)
        }
    }

    /// Member without the removable capability.
    struct Pinned;

    impl MaybeRemovable for Pinned {}

    fn lease() -> Member<Lease> {
        Member::new(Arc::new(Lease::default()))
    }

    #[test]
    fn test_add_twice_keeps_count() {
        let set = PruningSet::new();
        let m = lease();
        assert!(set.add(m.clone()));
        assert!(!set.add(m));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_removable_member_is_evicted_on_read() {
        let set = PruningSet::new();
        let keep = lease();
        let gone = lease();
        set.add_elements([keep.clone(), gone.clone()]);
        gone.expire();

        let snap = set.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0], keep);
        assert!(!set.store.contains(&gone), "must be evicted from the store");
        assert!(!set.contains(&gone));
    }

    #[test]
    fn test_readd_after_prune_is_visible() {
        let set = PruningSet::new();
        let m = lease();
        set.add(m.clone());
        m.expire();
        assert!(set.is_empty());

        m.renew();
        assert!(set.add(m.clone()), "pruned member is new again");
        assert_eq!(&*set.snapshot(), &[m]);
    }

    #[test]
    fn test_snapshot_is_cached_until_mutation() {
        let set = PruningSet::new();
        let a = lease();
        set.add(a.clone());

        let first = set.snapshot();
        let checks = a.checks.load(Ordering::SeqCst);
        let second = set.snapshot();
        assert!(Arc::ptr_eq(&first, &second), "cached snapshot must be reused");
        assert_eq!(
            a.checks.load(Ordering::SeqCst),
            checks + 1,
            "a cache hit checks each member once"
        );

        let b = lease();
        set.add(b.clone());
        assert_eq!(first.len(), 1, "old snapshot stays frozen");
        let third = set.snapshot();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.len(), 2);
    }

    #[test]
    fn test_expiry_after_caching_is_pruned_on_next_read() {
        let set = PruningSet::new();
        let keep = lease();
        let m = lease();
        set.add_elements([keep.clone(), m.clone()]);
        let before = set.snapshot();
        assert_eq!(before.len(), 2);

        m.expire();
        let after = set.snapshot();
        assert_eq!(&*after, &[keep.clone()]);
        assert!(!set.store.contains(&m), "must be evicted from the store");
        assert_eq!(before.len(), 2, "old snapshot stays frozen");

        let again = set.snapshot();
        assert!(Arc::ptr_eq(&after, &again), "rebuilt snapshot is cached");
    }

    #[test]
    fn test_expiry_after_caching_empties_len() {
        let set = PruningSet::new();
        let m = lease();
        set.add(m.clone());
        assert_eq!(set.len(), 1);

        m.expire();
        assert_eq!(set.len(), 0);
        assert!(!set.contains(&m));
    }

    #[test]
    fn test_added_then_removable_is_never_seen() {
        let set = PruningSet::new();
        let m = lease();
        set.add(m.clone());
        m.expire();
        assert!(set.iter().next().is_none());
    }

    #[test]
    fn test_members_without_capability_are_kept() {
        let set = PruningSet::new();
        let p = Member::new(Arc::new(Pinned));
        set.add(p.clone());
        set.invalidate_snapshot();
        assert!(set.contains(&p));
    }

    #[test]
    fn test_remove_elements_and_clear() {
        let set = PruningSet::new();
        let (a, b, c) = (lease(), lease(), lease());
        set.add_elements([a.clone(), b.clone(), c.clone()]);
        assert_eq!(set.remove_elements([&a, &b, &a]), 2);
        assert_eq!(&*set.snapshot(), &[c.clone()]);

        set.clear();
        assert!(set.is_empty());
        assert!(!set.remove(&c));
    }

    #[test]
    fn test_copy_to_uses_snapshot() {
        let set = PruningSet::new();
        let a = lease();
        let b = lease();
        set.add_elements([a.clone(), b.clone()]);
        b.expire();

        let mut dest = vec![lease(); 2];
        assert_eq!(set.copy_to(&mut dest, 1), Ok(1));
        assert_eq!(dest[1], a);
        assert!(set.copy_to(&mut dest, 2).is_err());
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let set = PruningSet::new();
        let pool: Vec<Member<Lease>> = (0..64).map(|_| lease()).collect();
        for m in pool.iter().step_by(4) {
            m.expire();
        }

        thread::scope(|s| {
            for w in 0..4 {
                let (set, pool) = (&set, &pool);
                s.spawn(move || {
                    for round in 0..200 {
                        let m = &pool[(w * 16 + round) % pool.len()];
                        set.add(m.clone());
                        if round % 5 == 0 {
                            set.remove(m);
                        }
                    }
                });
            }
            for _ in 0..4 {
                let set = &set;
                s.spawn(move || {
                    for _ in 0..200 {
                        let snap = set.snapshot();
                        let unique: HashSet<_> = snap.iter().collect();
                        assert_eq!(unique.len(), snap.len(), "duplicate in snapshot");
                        assert!(
                            snap.iter().all(|m| !m.expired.load(Ordering::SeqCst)),
                            "expired member leaked into a rebuilt snapshot"
                        );
                    }
                });
            }
        });
    }
}
