//! # Payloads and sender-tagged envelopes.
//!
//! A [`Payload`] is what an upstream producer emits. The notifier wraps it once
//! per notify call into a [`SenderPayload`] carrying its fixed sender identity;
//! that single envelope is then shared read-only by every consumer of the call.
//!
//! ## Example
//! ```rust
//! use notivisor::{Payload, SenderPayload};
//!
//! let payload = Payload::new("build.finished").with_body("ok").with_body("12s");
//! let env = SenderPayload::new("ci", payload);
//!
//! assert_eq!(env.sender, "ci");
//! assert_eq!(*env.meta(), "build.finished");
//! assert_eq!(env.bodies(), &["ok", "12s"]);
//! ```

/// Metadata plus zero or more bodies.
///
/// Bodies are stored materialized, so any consumer may enumerate them repeatedly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Payload<M, B> {
    /// Payload metadata (used by eligibility checks).
    pub meta: M,
    /// Payload bodies in production order.
    pub bodies: Vec<B>,
}

impl<M, B> Payload<M, B> {
    /// Creates a payload with no bodies.
    pub fn new(meta: M) -> Self {
        Self {
            meta,
            bodies: Vec::new(),
        }
    }

    /// Appends one body.
    #[must_use]
    pub fn with_body(mut self, body: B) -> Self {
        self.bodies.push(body);
        self
    }

    /// Appends every body produced by `bodies`.
    #[must_use]
    pub fn with_bodies<I: IntoIterator<Item = B>>(mut self, bodies: I) -> Self {
        self.bodies.extend(bodies);
        self
    }
}

/// A payload tagged with the identity of the notifier that sent it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SenderPayload<S, M, B> {
    /// Sender identity, fixed per notifier.
    pub sender: S,
    /// The payload being delivered.
    pub payload: Payload<M, B>,
}

impl<S, M, B> SenderPayload<S, M, B> {
    /// Wraps `payload` with `sender`.
    pub fn new(sender: S, payload: Payload<M, B>) -> Self {
        Self { sender, payload }
    }

    /// Shorthand for `&self.payload.meta`.
    pub fn meta(&self) -> &M {
        &self.payload.meta
    }

    /// Shorthand for `&self.payload.bodies`.
    pub fn bodies(&self) -> &[B] {
        &self.payload.bodies
    }
}
