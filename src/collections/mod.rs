//! Thread-safe collections used as subscriber registries.
//!
//! ## Contents
//! - [`SyncStore`] hash-backed membership store behind one lock
//! - [`SyncSet`] index + ordered storage with set algebra, mutated transactionally
//! - [`PruningSet`] registry that evicts removable members while rebuilding its cached snapshot
//! - [`Collection`] common contract, [`ReadOnly`] view rejecting mutation
//! - [`Member`] identity-compared `Arc` handle, [`Removable`]/[`MaybeRemovable`] capability
//!
//! ## Layering
//! ```text
//! PruningSet ──wraps──► SyncStore          (same-lock mutation + cached snapshot)
//! SyncSet                                   (standalone, set algebra)
//! ReadOnly<C: Collection>                   (any of the above, mutations rejected)
//! ```

mod collection;
mod member;
mod pruning;
mod set;
mod store;

pub use collection::{Collection, ReadOnly};
pub use member::{MaybeRemovable, Member, Removable};
pub use pruning::{PruningSet, Snapshot, SnapshotIter};
pub use set::SyncSet;
pub use store::SyncStore;
