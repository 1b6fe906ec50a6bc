//! # One notify sweep over a registry snapshot.
//!
//! ```text
//! sweep(snapshot, envelope, config)
//!   for consumer in snapshot:
//!     ├─ as_conditional()?.should_notify(sender, meta) == false ─► skip (trace!)
//!     └─ deliver(envelope)
//!          ├─ Ok                         ─► next
//!          ├─ Err / panic (isolated)     ─► ConsumerFailure (warn!)
//!          │     ├─ Aggregate            ─► record, next
//!          │     └─ FailFast             ─► stop
//!          └─ panic (not isolated)       ─► unwinds out of the sweep
//!   failures.is_empty() ? Ok(()) : Err(NotifyError::Aggregate)
//! ```

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{trace, warn};

use crate::consumers::ConsumerRef;
use crate::error::{ConsumerError, ConsumerFailure, NotifyError};
use crate::notify::config::NotifierConfig;
use crate::notify::payload::SenderPayload;

/// Applies `f` to every item, continuing past failures.
///
/// Returns `Ok(())` if every call succeeded, otherwise all errors in call order.
///
/// ## Example
/// ```rust
/// use notivisor::try_each;
///
/// let res = try_each([1, 2, 3, 4], |n| if n % 2 == 0 { Err(n) } else { Ok(()) });
/// assert_eq!(res, Err(vec![2, 4]));
/// ```
pub fn try_each<T, E, I, F>(items: I, mut f: F) -> Result<(), Vec<E>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Result<(), E>,
{
    let errors: Vec<E> = items.into_iter().filter_map(|it| f(it).err()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Delivers `envelope` to every eligible consumer of `consumers`.
pub(crate) fn sweep<S, M, B>(
    consumers: &[ConsumerRef<S, M, B>],
    envelope: &SenderPayload<S, M, B>,
    config: &NotifierConfig,
) -> Result<(), NotifyError> {
    let eligible = consumers.iter().filter(|c| {
        let ok = c
            .as_conditional()
            .is_none_or(|cond| cond.should_notify(&envelope.sender, envelope.meta()));
        if !ok {
            trace!(consumer = c.name(), "not eligible; skipped");
        }
        ok
    });

    let res = if config.stops_on_first_failure() {
        eligible
            .map(|c| deliver_one(c, envelope, config))
            .collect::<Result<(), _>>()
            .map_err(|f| vec![f])
    } else {
        try_each(eligible, |c| deliver_one(c, envelope, config))
    };

    res.map_err(|failures| NotifyError::Aggregate { failures })
}

fn deliver_one<S, M, B>(
    consumer: &ConsumerRef<S, M, B>,
    envelope: &SenderPayload<S, M, B>,
    config: &NotifierConfig,
) -> Result<(), ConsumerFailure> {
    trace!(consumer = consumer.name(), "delivering");

    let res = if config.isolate_panics {
        catch_unwind(AssertUnwindSafe(|| consumer.deliver(envelope))).unwrap_or_else(|panic| {
            Err(ConsumerError::Panicked {
                info: panic_message(panic.as_ref()),
            })
        })
    } else {
        consumer.deliver(envelope)
    };

    res.map_err(|error| {
        warn!(
            consumer = consumer.name(),
            label = error.as_label(),
            error = %error,
            "consumer failed"
        );
        ConsumerFailure {
            consumer: consumer.name().to_string(),
            error,
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
