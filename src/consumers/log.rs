//! # Simple logging consumer for debugging and demos.
//!
//! [`LogConsumer`] writes every delivery as one `tracing` event at `INFO`.
//!
//! ## Output format
//! ```text
//! INFO notivisor: delivery consumer="log" sender="sensor-1" meta="temp" bodies=2
//! ```
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use notivisor::{LogConsumer, Notifier, Payload};
//!
//! let notifier: Notifier<&str, &str, f32> = Notifier::new("sensor-1");
//! notifier.add_consumer(Arc::new(LogConsumer));
//! notifier.notify(Payload::new("temp").with_body(21.5)).unwrap();
//! ```

use std::fmt::Debug;

use tracing::info;

use crate::consumers::consume::Consume;
use crate::error::ConsumerError;
use crate::notify::SenderPayload;

/// Tracing-backed consumer.
///
/// Enabled via the `logging` feature. Not intended for production use; implement
/// a custom [`Consume`] for structured sinks.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogConsumer;

impl<S, M, B> Consume<S, M, B> for LogConsumer
where
    S: Debug,
    M: Debug,
{
    fn deliver(&self, p: &SenderPayload<S, M, B>) -> Result<(), ConsumerError> {
        info!(
            consumer = "log",
            sender = ?p.sender,
            meta = ?p.payload.meta,
            bodies = p.payload.bodies.len(),
            "delivery"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Payload;

    #[test]
    fn test_log_consumer_never_fails() {
        let env = SenderPayload::new("s", Payload::new("m").with_body(1u8));
        let c: &dyn Consume<&str, &str, u8> = &LogConsumer;
        assert_eq!(c.name(), "log");
        assert!(c.deliver(&env).is_ok());
    }
}
