//! # Example: dynamic_add_remove
//!
//! Adds and removes consumers while a producer keeps emitting, including a
//! weak consumer that disappears on its own once its owner drops it.
//!
//! Demonstrates how to:
//! - Register owned consumers with `add_consumer` and unregister them with `remove_consumer`.
//! - Register non-owning consumers with `add_weak_consumer`.
//! - Defer sweeps onto the tokio blocking pool with [`SpawnRunner`].
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► register_handler_with(handler, SpawnRunner)
//!   ├─► add "owned" + weak "session"
//!   │
//!   ├─► emit #1 ─► owned, session deliver
//!   ├─► remove "owned"
//!   ├─► emit #2 ─► session delivers
//!   ├─► drop(session)
//!   ├─► emit #3 ─► nobody delivers; proxy pruned on read
//!   └─► runner.join() ─► deferred failures, if any
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example dynamic_add_remove
//! ```

use std::sync::Arc;

use notivisor::{
    Consume, ConsumerError, FnConsumer, Handler, Notifier, Payload, Runner, SenderPayload,
    SpawnRunner,
};

type Tick = SenderPayload<&'static str, &'static str, u32>;
type Sink = dyn Consume<&'static str, &'static str, u32>;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1) Notifier + deferred runner
    let notifier: Notifier<&str, &str, u32> = Notifier::new("clock");
    let runner = Arc::new(SpawnRunner::current()?);
    let handler = Handler::new();
    notifier.register_handler_with(&handler, Arc::clone(&runner) as Arc<dyn Runner>);

    // 2) Owned consumer: stays until removed explicitly
    let owned: Arc<Sink> = FnConsumer::arc("owned", |p: &Tick| -> Result<(), ConsumerError> {
        println!("[owned] tick={:?}", p.bodies());
        Ok(())
    });
    notifier.add_consumer(Arc::clone(&owned));

    // 3) Weak consumer: lives as long as `session` does
    let session = FnConsumer::arc("session", |p: &Tick| -> Result<(), ConsumerError> {
        println!("[session] tick={:?}", p.bodies());
        Ok(())
    });
    notifier.add_weak_consumer(&session);
    println!("[main] registered={}", notifier.consumers().len());

    // 4) Both deliver
    handler.emit(Payload::new("tick").with_body(1))?;
    runner.join().await;

    // 5) Unregister the owned consumer
    notifier.remove_consumer(&owned);
    println!("[main] removed owned; registered={}", notifier.consumers().len());
    handler.emit(Payload::new("tick").with_body(2))?;
    runner.join().await;

    // 6) Drop the weak target; the registry forgets it on its next read
    drop(session);
    println!("[main] dropped session; registered={}", notifier.consumers().len());
    handler.emit(Payload::new("tick").with_body(3))?;

    for failure in runner.join().await {
        println!("[main] deferred failure: {failure}");
    }
    println!("[main] pending={}", runner.pending());
    Ok(())
}
