//! Notification pipeline: payloads, handler slots, runners and the notifier.
//!
//! ## Contents
//! - [`Payload`] / [`SenderPayload`] what producers emit and what consumers receive
//! - [`HandlerSlot`] / [`Handler`] upstream source with one settable callback
//! - [`Runner`] execution strategy ([`Immediate`], [`SpawnRunner`], [`FnRunner`])
//! - [`Notifier`] fixed sender identity + self-pruning consumer registry
//! - [`NotifierConfig`] / [`FailurePolicy`] per-notifier delivery settings
//! - [`try_each`] attempt-all, fail-once helper

mod config;
mod dispatch;
mod handler;
mod notifier;
mod payload;
mod runner;

pub use config::{FailurePolicy, NotifierConfig};
pub use dispatch::try_each;
pub use handler::{Callback, Handler, HandlerSlot};
pub use notifier::{BindState, Notifier};
pub use payload::{Payload, SenderPayload};
pub use runner::{FnRunner, Immediate, Runner, SpawnRunner, Work};
