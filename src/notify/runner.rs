//! # Execution strategies for notify sweeps.
//!
//! A notify call never delivers by itself: it packages the sweep as a [`Work`]
//! item and hands it to a [`Runner`].
//!
//! ```text
//! notify(payload)
//!   ├─► envelope + snapshot (caller thread)
//!   └─► runner.run(work)
//!          ├─ Immediate    ─► work() inline, result returned to caller
//!          ├─ SpawnRunner  ─► spawn_blocking(work), Ok(()) once handed off
//!          └─ FnRunner     ─► whatever the closure decides
//! ```
//!
//! ## Rules
//! - `run` returns once the work has been executed **or** handed off.
//! - Deferred failures surface in the deferred context, never to the notify caller.
//! - `SpawnRunner` forgets successful sweeps as soon as it sees them finished.

use std::fmt;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinSet};
use tracing::warn;

use crate::error::NotifyError;

/// Unit of work handed to a [`Runner`]: one complete sweep.
pub type Work = Box<dyn FnOnce() -> Result<(), NotifyError> + Send + 'static>;

/// Execution strategy for notify sweeps.
pub trait Runner: Send + Sync {
    /// Executes or schedules `work`.
    ///
    /// Returns the sweep result when run inline, or `Ok(())` once the work was
    /// accepted for deferred execution.
    fn run(&self, work: Work) -> Result<(), NotifyError>;
}

/// Runs the sweep on the calling thread (the default strategy).
#[derive(Clone, Copy, Debug, Default)]
pub struct Immediate;

impl Runner for Immediate {
    fn run(&self, work: Work) -> Result<(), NotifyError> {
        work()
    }
}

/// Closure-backed runner.
///
/// ## Example
/// ```rust
/// use notivisor::{FnRunner, Runner};
///
/// // Runs the work and swallows its result.
/// let quiet = FnRunner::new(|work: notivisor::Work| {
///     let _ = work();
///     Ok(())
/// });
/// assert!(quiet.run(Box::new(|| Ok(()))).is_ok());
/// ```
pub struct FnRunner<F> {
    f: F,
}

impl<F> FnRunner<F>
where
    F: Fn(Work) -> Result<(), NotifyError> + Send + Sync,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Runner for FnRunner<F>
where
    F: Fn(Work) -> Result<(), NotifyError> + Send + Sync,
{
    fn run(&self, work: Work) -> Result<(), NotifyError> {
        (self.f)(work)
    }
}

impl<F> fmt::Debug for FnRunner<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnRunner")
    }
}

/// Defers sweeps onto a tokio runtime's blocking pool.
///
/// Consumers are synchronous, so work goes to `spawn_blocking` rather than the
/// async workers. Finished sweeps are reaped on every [`Runner::run`] and
/// [`SpawnRunner::pending`] call: successes are dropped, failures are logged
/// with `warn!` and kept until [`SpawnRunner::join`] drains them. Retained state
/// grows with failures and in-flight sweeps, not with traffic.
///
/// ### Notes
/// Dropping the runner aborts sweeps that have not started yet.
pub struct SpawnRunner {
    handle: Handle,
    state: Mutex<Deferred>,
}

#[derive(Default)]
struct Deferred {
    in_flight: JoinSet<Result<(), NotifyError>>,
    failed: Vec<NotifyError>,
}

impl Deferred {
    /// Collects every sweep that already finished, keeping only failures.
    fn reap(&mut self) {
        while let Some(res) = self.in_flight.try_join_next() {
            if let Err(e) = flatten(res) {
                self.failed.push(e);
            }
        }
    }
}

fn flatten(res: Result<Result<(), NotifyError>, JoinError>) -> Result<(), NotifyError> {
    res.unwrap_or_else(|je| {
        Err(NotifyError::RunnerRejected {
            reason: format!("deferred sweep aborted: {je}"),
        })
    })
}

impl SpawnRunner {
    /// Creates a runner bound to `handle`.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            state: Mutex::new(Deferred::default()),
        }
    }

    /// Creates a runner bound to the runtime of the current context.
    ///
    /// # Errors
    /// [`NotifyError::RunnerRejected`] when called outside a tokio runtime.
    pub fn current() -> Result<Self, NotifyError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| NotifyError::RunnerRejected {
                reason: e.to_string(),
            })
    }

    /// Sweeps still running plus failed sweeps not yet drained by [`SpawnRunner::join`].
    pub fn pending(&self) -> usize {
        let mut state = self.state.lock();
        state.reap();
        state.in_flight.len() + state.failed.len()
    }

    /// Awaits every in-flight sweep and returns all failures since the last call.
    ///
    /// Retained failures come first, then those of the awaited sweeps in
    /// completion order. A sweep that panicked outside of consumer isolation is
    /// reported as [`NotifyError::RunnerRejected`].
    pub async fn join(&self) -> Vec<NotifyError> {
        let (mut in_flight, mut failed) = {
            let mut state = self.state.lock();
            (
                std::mem::take(&mut state.in_flight),
                std::mem::take(&mut state.failed),
            )
        };
        while let Some(res) = in_flight.join_next().await {
            if let Err(e) = flatten(res) {
                failed.push(e);
            }
        }
        failed
    }
}

impl Runner for SpawnRunner {
    fn run(&self, work: Work) -> Result<(), NotifyError> {
        let mut state = self.state.lock();
        state.reap();
        state.in_flight.spawn_blocking_on(
            move || {
                let res = work();
                if let Err(e) = &res {
                    warn!(label = e.as_label(), error = %e, "deferred notify failed");
                }
                res
            },
            &self.handle,
        );
        Ok(())
    }
}

impl fmt::Debug for SpawnRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnRunner")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_immediate_returns_work_result() {
        assert!(Immediate.run(Box::new(|| Ok(()))).is_ok());
        let err = Immediate
            .run(Box::new(|| {
                Err(NotifyError::RunnerRejected {
                    reason: "x".into(),
                })
            }))
            .unwrap_err();
        assert_eq!(err.as_label(), "notify_runner_rejected");
    }

    #[test]
    fn test_fn_runner_can_defer_by_queueing() {
        let queue: Arc<Mutex<Vec<Work>>> = Arc::new(Mutex::new(Vec::new()));
        let q = Arc::clone(&queue);
        let runner = FnRunner::new(move |work: Work| {
            q.lock().push(work);
            Ok(())
        });

        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        runner
            .run(Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0, "work must not run yet");

        for work in queue.lock().drain(..) {
            work().unwrap();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_current_outside_runtime_is_rejected() {
        let err = SpawnRunner::current().unwrap_err();
        assert!(matches!(err, NotifyError::RunnerRejected { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_spawn_runner_hands_off_and_joins() {
        let runner = SpawnRunner::current().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        for i in 0..3 {
            let h = Arc::clone(&hits);
            runner
                .run(Box::new(move || {
                    h.fetch_add(1, Ordering::SeqCst);
                    if i == 1 {
                        Err(NotifyError::Aggregate { failures: vec![] })
                    } else {
                        Ok(())
                    }
                }))
                .expect("hand-off never fails");
        }

        let failures = runner.join().await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(failures, vec![NotifyError::Aggregate { failures: vec![] }]);
        assert_eq!(runner.pending(), 0);
        assert!(runner.join().await.is_empty(), "failures are drained once");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_spawn_runner_reports_aborted_sweep() {
        let runner = SpawnRunner::current().unwrap();
        runner
            .run(Box::new(|| -> Result<(), NotifyError> {
                panic!("sweep exploded")
            }))
            .expect("hand-off never fails");

        let failures = runner.join().await;
        assert!(matches!(
            failures.as_slice(),
            [NotifyError::RunnerRejected { .. }]
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_spawn_runner_forgets_finished_successes() {
        let runner = SpawnRunner::current().unwrap();
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..1000 {
            let d = Arc::clone(&done);
            runner
                .run(Box::new(move || {
                    d.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }))
                .expect("hand-off never fails");
        }
        let failing: Work = Box::new(|| {
            Err(NotifyError::RunnerRejected {
                reason: "x".into(),
            })
        });
        runner.run(failing).expect("hand-off never fails");

        timeout(Duration::from_secs(10), async {
            while runner.pending() > 1 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("finished sweeps must be reaped");

        assert_eq!(done.load(Ordering::SeqCst), 1000);
        assert_eq!(runner.pending(), 1, "only the failure is retained");
        assert_eq!(runner.join().await.len(), 1);
    }
}
