//! # Example: custom_consumer
//!
//! Demonstrates how to build and register custom consumers.
//!
//! Shows how to:
//! - Implement the [`Consume`] trait with a stable `name()`.
//! - Expose the [`Conditional`] capability to receive only some payloads.
//! - Wire a [`Notifier`] into a [`Handler`] and inspect aggregated failures.
//!
//! ## Flow
//! ```text
//! Handler::emit(payload)
//!     └─► Notifier callback
//!           ├─► SenderPayload { sender: "thermo-1", payload }
//!           ├─► consumers.snapshot()
//!           └─► sweep
//!                 ├─► Console.deliver()
//!                 ├─► Alarm.should_notify()? ─► Alarm.deliver()
//!                 └─► Flaky.deliver() ─► Err ─► NotifyError::Aggregate
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example custom_consumer
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use notivisor::{
    Conditional, Consume, ConsumerError, Handler, Notifier, NotifyError, Payload, SenderPayload,
};

type Reading = SenderPayload<&'static str, &'static str, f32>;

/// Prints every reading.
struct Console;

impl Consume<&'static str, &'static str, f32> for Console {
    fn deliver(&self, p: &Reading) -> Result<(), ConsumerError> {
        println!("[console] {} {} {:?}", p.sender, p.meta(), p.bodies());
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// Only cares about temperature readings above a threshold.
struct Alarm {
    threshold: f32,
}

impl Consume<&'static str, &'static str, f32> for Alarm {
    fn deliver(&self, p: &Reading) -> Result<(), ConsumerError> {
        if p.bodies().iter().any(|t| *t > self.threshold) {
            println!("[alarm] {} is too hot: {:?}", p.sender, p.bodies());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "alarm"
    }

    fn as_conditional(&self) -> Option<&dyn Conditional<&'static str, &'static str>> {
        Some(self)
    }
}

impl Conditional<&'static str, &'static str> for Alarm {
    fn should_notify(&self, _sender: &&'static str, meta: &&'static str) -> bool {
        *meta == "temp"
    }
}

/// Fails every other delivery.
struct Flaky {
    calls: AtomicUsize,
}

impl Consume<&'static str, &'static str, f32> for Flaky {
    fn deliver(&self, _p: &Reading) -> Result<(), ConsumerError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 1 {
            return Err(ConsumerError::fail("upstream store unavailable"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1) Create notifier with a fixed sender identity
    let notifier: Notifier<&str, &str, f32> = Notifier::new("thermo-1");

    // 2) Register consumers
    notifier.add_consumer(Arc::new(Console));
    notifier.add_consumer(Arc::new(Alarm { threshold: 30.0 }));
    notifier.add_consumer(Arc::new(Flaky {
        calls: AtomicUsize::new(0),
    }));

    // 3) Wire the producer side
    let handler = Handler::new();
    notifier.register_handler(&handler);

    // 4) Emit a few readings
    let readings = [
        Payload::new("temp").with_body(21.5),
        Payload::new("humidity").with_body(40.0),
        Payload::new("temp").with_bodies([29.0, 31.5]),
    ];
    for reading in readings {
        match handler.emit(reading) {
            Ok(_) => {}
            Err(NotifyError::Aggregate { failures }) => {
                for f in failures {
                    println!("[main] consumer failed: {f}");
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("[main] done; state={:?}", notifier.state());
    Ok(())
}
