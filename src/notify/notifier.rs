//! # Multicast notifier.
//!
//! [`Notifier`] owns a fixed sender identity and a self-pruning consumer
//! registry. Each payload, whether it arrives through a wired [`HandlerSlot`] or
//! a direct [`Notifier::notify`] call, goes through the same pipeline:
//!
//! ```text
//! payload ──► SenderPayload { sender, payload }   (built once, shared by all)
//!         ──► consumers.snapshot()                (removable members pruned)
//!         ──► runner.run(sweep)                   (Immediate / SpawnRunner / FnRunner)
//!                 └─► eligible consumers ─► deliver()
//! ```
//!
//! ## Wiring states
//! ```text
//! Unbound ──register_handler*──► Bound ──first payload via handler──► Active
//! ```
//! Registering again is allowed: the new slot gets its own callback and the old
//! wiring keeps working.
//!
//! ## Example
//! ```rust
//! use notivisor::{ConsumerError, FnConsumer, Handler, Notifier, Payload, SenderPayload};
//!
//! type Env = SenderPayload<&'static str, &'static str, &'static str>;
//!
//! let notifier: Notifier<&str, &str, &str> = Notifier::new("S1");
//! notifier.add_consumer(FnConsumer::arc("printer", |p: &Env| -> Result<(), ConsumerError> {
//!     println!("{} {} {:?}", p.sender, p.meta(), p.bodies());
//!     Ok(())
//! }));
//!
//! let handler = Handler::new();
//! notifier.register_handler(&handler);
//! assert_eq!(handler.emit(Payload::new("m").with_body("x")), Ok(true));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tracing::{debug, trace};

use crate::collections::{Member, PruningSet};
use crate::consumers::{Consume, ConsumerRef, WeakConsumer};
use crate::error::NotifyError;
use crate::notify::config::NotifierConfig;
use crate::notify::dispatch;
use crate::notify::handler::{Callback, HandlerSlot};
use crate::notify::payload::{Payload, SenderPayload};
use crate::notify::runner::{Immediate, Runner};

/// Wiring state of a [`Notifier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum BindState {
    /// No handler wired yet.
    Unbound = 0,
    /// Wired to at least one handler, no payload received through it yet.
    Bound = 1,
    /// At least one payload arrived through a wired handler.
    Active = 2,
}

impl BindState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => BindState::Unbound,
            1 => BindState::Bound,
            _ => BindState::Active,
        }
    }
}

struct Shared<S, M, B> {
    sender: S,
    consumers: PruningSet<ConsumerRef<S, M, B>>,
    config: NotifierConfig,
    state: AtomicU8,
}

impl<S, M, B> Shared<S, M, B>
where
    S: Clone + Send + Sync + 'static,
    M: Send + Sync + 'static,
    B: Send + Sync + 'static,
{
    fn advance(&self, to: BindState) {
        self.state.fetch_max(to as u8, Ordering::AcqRel);
    }

    fn notify(&self, payload: Payload<M, B>, runner: &dyn Runner) -> Result<(), NotifyError> {
        let envelope = SenderPayload::new(self.sender.clone(), payload);
        let snapshot = self.consumers.snapshot();
        let config = self.config;

        trace!(consumers = snapshot.len(), "notify");
        runner.run(Box::new(move || {
            dispatch::sweep(&snapshot, &envelope, &config)
        }))
    }
}

/// Fan-out point delivering each payload to every eligible registered consumer.
///
/// Cloning is cheap and yields a handle to the same registry and identity.
pub struct Notifier<S, M, B> {
    shared: Arc<Shared<S, M, B>>,
}

impl<S, M, B> Notifier<S, M, B>
where
    S: Clone + Send + Sync + 'static,
    M: Send + Sync + 'static,
    B: Send + Sync + 'static,
{
    /// Creates a notifier with the default [`NotifierConfig`].
    pub fn new(sender: S) -> Self {
        Self::with_config(sender, NotifierConfig::default())
    }

    /// Creates a notifier with an explicit configuration.
    pub fn with_config(sender: S, config: NotifierConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                sender,
                consumers: PruningSet::new(),
                config,
                state: AtomicU8::new(BindState::Unbound as u8),
            }),
        }
    }

    /// Sender identity stamped on every envelope.
    pub fn sender(&self) -> &S {
        &self.shared.sender
    }

    /// Active configuration.
    pub fn config(&self) -> NotifierConfig {
        self.shared.config
    }

    /// Current wiring state.
    pub fn state(&self) -> BindState {
        BindState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Registers `consumer`. Returns `false` if that exact instance is already registered.
    pub fn add_consumer(&self, consumer: Arc<dyn Consume<S, M, B>>) -> bool {
        self.shared.consumers.add(Member::new(consumer))
    }

    /// Registers a registry handle as is.
    pub fn add_consumer_ref(&self, consumer: ConsumerRef<S, M, B>) -> bool {
        self.shared.consumers.add(consumer)
    }

    /// Registers `target` through a [`WeakConsumer`]; the registry never keeps it alive.
    ///
    /// The returned handle can be passed to [`Notifier::remove_consumer_ref`].
    pub fn add_weak_consumer<C>(&self, target: &Arc<C>) -> ConsumerRef<S, M, B>
    where
        C: Consume<S, M, B> + 'static,
    {
        let proxy = WeakConsumer::new(target).into_ref();
        self.shared.consumers.add(proxy.clone());
        proxy
    }

    /// Unregisters `consumer`. Returns `true` if it was registered.
    pub fn remove_consumer(&self, consumer: &Arc<dyn Consume<S, M, B>>) -> bool {
        self.shared
            .consumers
            .remove(&Member::new(Arc::clone(consumer)))
    }

    /// Unregisters a registry handle. Returns `true` if it was registered.
    pub fn remove_consumer_ref(&self, consumer: &ConsumerRef<S, M, B>) -> bool {
        self.shared.consumers.remove(consumer)
    }

    /// The consumer registry.
    pub fn consumers(&self) -> &PruningSet<ConsumerRef<S, M, B>> {
        &self.shared.consumers
    }

    /// Unregisters every consumer.
    pub fn clear_consumers(&self) {
        self.shared.consumers.clear();
    }

    /// Wires this notifier into `handler`, delivering on the calling thread.
    pub fn register_handler<H>(&self, handler: &H)
    where
        H: HandlerSlot<M, B> + ?Sized,
    {
        self.register_handler_with(handler, Arc::new(Immediate));
    }

    /// Wires this notifier into `handler`; every sweep goes through `runner`.
    ///
    /// The handler's previous callback, if any, is replaced.
    pub fn register_handler_with<H>(&self, handler: &H, runner: Arc<dyn Runner>)
    where
        H: HandlerSlot<M, B> + ?Sized,
    {
        let shared = Arc::clone(&self.shared);
        let callback: Callback<M, B> = Arc::new(move |payload: Payload<M, B>| {
            shared.advance(BindState::Active);
            shared.notify(payload, runner.as_ref())
        });
        handler.set_callback(callback);
        self.shared.advance(BindState::Bound);
        debug!(state = ?self.state(), "handler wired");
    }

    /// Runs the notify pipeline for `payload` on the calling thread.
    ///
    /// # Errors
    /// [`NotifyError::Aggregate`] with every consumer failure of the sweep.
    pub fn notify(&self, payload: Payload<M, B>) -> Result<(), NotifyError> {
        self.shared.notify(payload, &Immediate)
    }

    /// Runs the notify pipeline for `payload` through `runner`.
    ///
    /// # Errors
    /// Whatever `runner` reports: the sweep result for inline runners, a
    /// hand-off error for deferring ones.
    pub fn notify_with(
        &self,
        payload: Payload<M, B>,
        runner: &dyn Runner,
    ) -> Result<(), NotifyError> {
        self.shared.notify(payload, runner)
    }
}

impl<S, M, B> Clone for Notifier<S, M, B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: fmt::Debug, M, B> fmt::Debug for Notifier<S, M, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("sender", &self.shared.sender)
            .field("config", &self.shared.config)
            .field(
                "state",
                &BindState::from_u8(self.shared.state.load(Ordering::Acquire)),
            )
            .finish_non_exhaustive()
    }
}
