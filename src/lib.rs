//! # notivisor
//!
//! **Notivisor** is a small, thread-safe multicast notification core for Rust.
//!
//! A [`Notifier`] with a fixed sender identity fans each payload out to a
//! registry of consumers. The registry prunes itself: consumers that report
//! they are done (for example a [`WeakConsumer`] whose target was dropped) are
//! evicted the next time the registry is read.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐          ┌──────────────┐
//!     │   producer   │          │  direct call │
//!     │ Handler::emit│          │   notify()   │
//!     └──────┬───────┘          └──────┬───────┘
//!            ▼ wired callback          │
//! ┌──────────────────────────────────────────────────────────┐
//! │  Notifier (sender identity S)                            │
//! │  - SenderPayload { sender, payload }   built once        │
//! │  - PruningSet<ConsumerRef>             pruned snapshot   │
//! │  - NotifierConfig                      failure / panics  │
//! └──────────────────────────┬───────────────────────────────┘
//!                            ▼ runner.run(sweep)
//!              ┌─────────────┼──────────────┐
//!              ▼             ▼              ▼
//!          Immediate     SpawnRunner     FnRunner
//!          (inline)   (spawn_blocking)   (custom)
//!                            │
//!                            ▼
//!      for each consumer in snapshot:
//!        ├─ as_conditional()?.should_notify(sender, meta) == false ─► skip
//!        └─ deliver(&envelope) ─► Err / panic ─► ConsumerFailure
//!                            │
//!                            ▼
//!      failures? ─► NotifyError::Aggregate { failures }   (raised once)
//! ```
//!
//! ### Registry lifecycle
//! ```text
//! add / remove / clear ─► snapshot invalidated
//!
//! snapshot()
//!   ├─ cached ─► shared Arc<[ConsumerRef]>
//!   └─ rebuild ─► members with can_remove() == true are evicted
//! ```
//!
//! ## Features
//! | Area             | Description                                                      | Key types / traits                                  |
//! |------------------|------------------------------------------------------------------|-----------------------------------------------------|
//! | **Consumers**    | Receive sender-tagged payloads, optionally filter or self-expire.| [`Consume`], [`Conditional`], [`Removable`]         |
//! | **Notifier**     | Fixed-identity fan-out with handler wiring.                      | [`Notifier`], [`HandlerSlot`], [`Handler`]          |
//! | **Runners**      | Decide where a sweep runs.                                       | [`Runner`], [`Immediate`], [`SpawnRunner`]          |
//! | **Collections**  | Thread-safe stores, sets and self-pruning registries.            | [`SyncStore`], [`SyncSet`], [`PruningSet`]          |
//! | **Errors**       | Typed errors for collections, consumers and sweeps.              | [`CollectionError`], [`ConsumerError`], [`NotifyError`] |
//! | **Configuration**| Failure policy and panic isolation per notifier.                 | [`NotifierConfig`], [`FailurePolicy`]               |
//!
//! ## Optional features
//! - `logging`: exports a tracing-backed `LogConsumer` _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use notivisor::{ConsumerError, FnConsumer, Handler, Notifier, Payload, SenderPayload};
//!
//! type Env = SenderPayload<&'static str, &'static str, u32>;
//!
//! let notifier: Notifier<&str, &str, u32> = Notifier::new("sensor-1");
//!
//! // Owned consumer: stays registered until removed.
//! notifier.add_consumer(FnConsumer::arc("stdout", |p: &Env| -> Result<(), ConsumerError> {
//!     println!("{} {} {:?}", p.sender, p.meta(), p.bodies());
//!     Ok(())
//! }));
//!
//! // Weak consumer: pruned once `alarm` is dropped.
//! let alarm = FnConsumer::arc("alarm", |p: &Env| -> Result<(), ConsumerError> {
//!     if p.bodies().iter().any(|t| *t > 80) {
//!         println!("too hot");
//!     }
//!     Ok(())
//! });
//! notifier.add_weak_consumer(&alarm);
//!
//! let handler = Handler::new();
//! notifier.register_handler(&handler);
//! handler.emit(Payload::new("temp").with_body(85)).unwrap();
//!
//! drop(alarm);
//! assert_eq!(notifier.consumers().len(), 1);
//! ```
mod collections;
mod consumers;
mod error;
mod notify;

// ---- Public re-exports ----

pub use collections::{
    Collection, MaybeRemovable, Member, PruningSet, ReadOnly, Removable, Snapshot, SnapshotIter,
    SyncSet, SyncStore,
};
pub use consumers::{Conditional, Consume, ConsumerRef, Filtered, FnConsumer, WeakConsumer};
pub use error::{CollectionError, ConsumerError, ConsumerFailure, NotifyError};
pub use notify::{
    BindState, Callback, FailurePolicy, FnRunner, Handler, HandlerSlot, Immediate, Notifier,
    NotifierConfig, Payload, Runner, SenderPayload, SpawnRunner, Work, try_each,
};

// Optional: expose a simple built-in logging consumer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use consumers::LogConsumer;
