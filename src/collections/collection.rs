//! # Common collection contract and read-only views.
//!
//! [`Collection`] is the seam shared by every thread-safe container in this crate.
//! Mutations are fallible so that a [`ReadOnly`] view can reject them with
//! [`CollectionError::ReadOnly`] instead of silently ignoring the call.

use crate::error::CollectionError;

/// Thread-safe collection of `T`.
///
/// Reads always observe a point-in-time copy; mutations are serialized by the
/// implementation's own lock.
pub trait Collection<T: Clone> {
    /// Inserts `item` if absent. Returns `Ok(true)` if it was inserted.
    fn try_add(&self, item: T) -> Result<bool, CollectionError>;

    /// Removes `item` if present. Returns `Ok(true)` if it was present.
    fn try_remove(&self, item: &T) -> Result<bool, CollectionError>;

    /// Removes every element.
    fn try_clear(&self) -> Result<(), CollectionError>;

    /// Returns `true` if `item` is currently a member.
    fn contains(&self, item: &T) -> bool;

    /// Current number of elements.
    fn len(&self) -> usize;

    /// True if there are no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time copy of the elements.
    fn snapshot(&self) -> Vec<T>;

    /// Copies a snapshot into `dest` starting at `offset`; returns the number copied.
    ///
    /// Fails with [`CollectionError::Capacity`] (writing nothing) when the
    /// snapshot does not fit.
    fn copy_to(&self, dest: &mut [T], offset: usize) -> Result<usize, CollectionError> {
        copy_into(&self.snapshot(), dest, offset)
    }

    /// True if mutations are rejected.
    fn is_read_only(&self) -> bool {
        false
    }
}

/// Copies `items` into `dest[offset..]` or fails without touching `dest`.
pub(crate) fn copy_into<T: Clone>(
    items: &[T],
    dest: &mut [T],
    offset: usize,
) -> Result<usize, CollectionError> {
    let needed = items.len();
    let fits = offset
        .checked_add(needed)
        .is_some_and(|end| end <= dest.len());
    if !fits {
        return Err(CollectionError::Capacity {
            needed,
            offset,
            available: dest.len(),
        });
    }
    dest[offset..offset + needed].clone_from_slice(items);
    Ok(needed)
}

/// Read-only view over another collection.
///
/// Reads are delegated; every mutation returns [`CollectionError::ReadOnly`].
#[derive(Debug)]
pub struct ReadOnly<C> {
    inner: C,
}

impl<C> ReadOnly<C> {
    /// Wraps `inner`.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Borrows the wrapped collection.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<T: Clone, C: Collection<T>> Collection<T> for ReadOnly<C> {
    fn try_add(&self, _item: T) -> Result<bool, CollectionError> {
        Err(CollectionError::ReadOnly)
    }

    fn try_remove(&self, _item: &T) -> Result<bool, CollectionError> {
        Err(CollectionError::ReadOnly)
    }

    fn try_clear(&self) -> Result<(), CollectionError> {
        Err(CollectionError::ReadOnly)
    }

    fn contains(&self, item: &T) -> bool {
        self.inner.contains(item)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn snapshot(&self) -> Vec<T> {
        self.inner.snapshot()
    }

    fn copy_to(&self, dest: &mut [T], offset: usize) -> Result<usize, CollectionError> {
        self.inner.copy_to(dest, offset)
    }

    fn is_read_only(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::SyncStore;

    #[test]
    fn test_copy_into_bounds() {
        let mut dest = [0u8; 4];
        assert_eq!(copy_into(&[1, 2], &mut dest, 2), Ok(2));
        assert_eq!(dest, [0, 0, 1, 2]);

        let err = copy_into(&[7, 7], &mut dest, 3).unwrap_err();
        assert_eq!(
            err,
            CollectionError::Capacity {
                needed: 2,
                offset: 3,
                available: 4
            }
        );
        assert_eq!(dest, [0, 0, 1, 2], "failed copy must not write");

        assert!(copy_into(&[1], &mut dest, usize::MAX).is_err());
        assert_eq!(copy_into::<u8>(&[], &mut dest, 4), Ok(0));
    }

    #[test]
    fn test_read_only_rejects_mutation() {
        let store = SyncStore::new();
        store.add(1);
        store.add(2);
        let view = ReadOnly::new(store);

        assert!(view.is_read_only());
        assert_eq!(view.try_add(3), Err(CollectionError::ReadOnly));
        assert_eq!(view.try_remove(&1), Err(CollectionError::ReadOnly));
        assert_eq!(view.try_clear(), Err(CollectionError::ReadOnly));

        assert_eq!(Collection::len(&view), 2);
        assert!(Collection::contains(&view, &1));
        assert!(!view.inner().contains(&3));
    }
}
