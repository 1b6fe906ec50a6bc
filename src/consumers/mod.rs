//! Consumer contract, stock consumers and the weak proxy.
//!
//! ## Contents
//! - [`Consume`] delivery contract; optional [`Conditional`] eligibility
//! - [`ConsumerRef`] identity-compared registry handle
//! - [`FnConsumer`] closure-backed consumer, [`Filtered`] adds a predicate to any consumer
//! - [`WeakConsumer`] non-owning proxy, pruned once its target is dropped
//! - `LogConsumer` tracing-backed consumer (feature `logging`)

mod consume;
mod weak;

#[cfg(feature = "logging")]
mod log;

pub use consume::{Conditional, Consume, ConsumerRef, Filtered, FnConsumer};
pub use weak::WeakConsumer;

#[cfg(feature = "logging")]
pub use log::LogConsumer;
