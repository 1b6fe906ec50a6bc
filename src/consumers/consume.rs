//! # Consumer contract and optional capabilities.
//!
//! [`Consume`] is the extension point for anything that receives payloads from a
//! [`Notifier`](crate::Notifier). Two capabilities are optional and queried at
//! dispatch time:
//!
//! - [`Removable`] via [`Consume::as_removable`]: the registry prunes the consumer
//!   once it reports `can_remove() == true`.
//! - [`Conditional`] via [`Consume::as_conditional`]: the consumer is skipped for
//!   a notify call when `should_notify(sender, meta)` returns `false`.
//!
//! ## Example
//! ```rust
//! use notivisor::{Conditional, Consume, ConsumerError, SenderPayload};
//!
//! struct Audit;
//!
//! impl Consume<String, String, String> for Audit {
//!     fn deliver(&self, p: &SenderPayload<String, String, String>) -> Result<(), ConsumerError> {
//!         println!("audit sender={} event={} bodies={}", p.sender, p.meta(), p.bodies().len());
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str { "audit" }
//!
//!     fn as_conditional(&self) -> Option<&dyn Conditional<String, String>> { Some(self) }
//! }
//!
//! impl Conditional<String, String> for Audit {
//!     fn should_notify(&self, _sender: &String, meta: &String) -> bool {
//!         meta.starts_with("security.")
//!     }
//! }
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::collections::{MaybeRemovable, Member, Removable};
use crate::error::ConsumerError;
use crate::notify::SenderPayload;

/// Eligibility capability: decides per notify call whether a consumer is invoked.
pub trait Conditional<S, M>: Send + Sync {
    /// Returns `false` to skip this consumer for `(sender, meta)`.
    fn should_notify(&self, sender: &S, meta: &M) -> bool;
}

impl<S, M, F> Conditional<S, M> for F
where
    F: Fn(&S, &M) -> bool + Send + Sync,
{
    fn should_notify(&self, sender: &S, meta: &M) -> bool {
        self(sender, meta)
    }
}

/// Receiver of sender-tagged payloads.
///
/// ### Implementation requirements
/// - `deliver` runs on whichever thread the notifier's runner uses.
/// - Report failures through the returned error; panics are caught only when
///   the notifier isolates panics (the default).
/// - Do not add or remove consumers of the same notifier from capability checks.
pub trait Consume<S, M, B>: Send + Sync {
    /// Handles one delivery.
    fn deliver(&self, payload: &SenderPayload<S, M, B>) -> Result<(), ConsumerError>;

    /// Name used in logs and failure reports.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose; override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns the removable capability, if any.
    fn as_removable(&self) -> Option<&dyn Removable> {
        None
    }

    /// Returns the eligibility capability, if any.
    fn as_conditional(&self) -> Option<&dyn Conditional<S, M>> {
        None
    }
}

/// Identity-compared handle to a registered consumer.
pub type ConsumerRef<S, M, B> = Member<dyn Consume<S, M, B>>;

impl<S, M, B> MaybeRemovable for dyn Consume<S, M, B> {
    fn removable(&self) -> Option<&dyn Removable> {
        self.as_removable()
    }
}

/// Closure-backed consumer.
///
/// ## Example
/// ```rust
/// use notivisor::{ConsumerError, FnConsumer, Notifier, Payload};
///
/// type Env = notivisor::SenderPayload<&'static str, &'static str, u32>;
///
/// let notifier: Notifier<&str, &str, u32> = Notifier::new("sensor");
/// let printer = FnConsumer::arc("printer", |p: &Env| -> Result<(), ConsumerError> {
///     println!("{} {} {:?}", p.sender, p.payload.meta, p.payload.bodies);
///     Ok(())
/// });
/// notifier.add_consumer(printer);
/// notifier.notify(Payload::new("temp").with_body(21)).unwrap();
/// ```
pub struct FnConsumer<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> FnConsumer<F> {
    /// Creates a new closure-backed consumer.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the consumer and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<S, M, B, F> Consume<S, M, B> for FnConsumer<F>
where
    F: Fn(&SenderPayload<S, M, B>) -> Result<(), ConsumerError> + Send + Sync,
{
    fn deliver(&self, payload: &SenderPayload<S, M, B>) -> Result<(), ConsumerError> {
        (self.f)(payload)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FnConsumer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnConsumer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Adds an eligibility predicate to an existing consumer.
///
/// Deliveries are forwarded unchanged; only [`Consume::as_conditional`] differs.
pub struct Filtered<C, P> {
    inner: C,
    predicate: P,
}

impl<C, P> Filtered<C, P> {
    /// Wraps `inner`, delivering only when `predicate` allows it.
    pub fn new(inner: C, predicate: P) -> Self {
        Self { inner, predicate }
    }
}

impl<S, M, B, C, P> Consume<S, M, B> for Filtered<C, P>
where
    C: Consume<S, M, B>,
    P: Conditional<S, M>,
{
    fn deliver(&self, payload: &SenderPayload<S, M, B>) -> Result<(), ConsumerError> {
        self.inner.deliver(payload)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn as_removable(&self) -> Option<&dyn Removable> {
        self.inner.as_removable()
    }

    fn as_conditional(&self) -> Option<&dyn Conditional<S, M>> {
        Some(&self.predicate)
    }
}
