use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use parking_lot::Mutex;

use notivisor::{
    Conditional, Consume, ConsumerError, Handler, Notifier, NotifyError, Payload, PruningSet,
    Removable, SenderPayload,
};

type Env = SenderPayload<&'static str, &'static str, &'static str>;
type Sink = dyn Consume<&'static str, &'static str, &'static str>;
type TestNotifier = Notifier<&'static str, &'static str, &'static str>;

/// Records every delivery as `(sender, meta, bodies)`.
#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<(&'static str, &'static str, Vec<&'static str>)>>,
}

impl Recorder {
    fn count(&self) -> usize {
        self.seen.lock().len()
    }
}

impl Consume<&'static str, &'static str, &'static str> for Recorder {
    fn deliver(&self, p: &Env) -> Result<(), ConsumerError> {
        self.seen
            .lock()
            .push((p.sender, p.payload.meta, p.payload.bodies.clone()));
        Ok(())
    }

    fn name(&self) -> &str {
        "recorder"
    }
}

/// Counts deliveries, fails when told to.
struct Tally {
    name: &'static str,
    calls: AtomicUsize,
    fail: bool,
}

impl Tally {
    fn new(name: &'static str, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            name,
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Consume<&'static str, &'static str, &'static str> for Tally {
    fn deliver(&self, _: &Env) -> Result<(), ConsumerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(ConsumerError::fail("rejected"))
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Stays registered until told to expire.
#[derive(Default)]
struct Expiring {
    expired: AtomicBool,
    calls: AtomicUsize,
}

impl Consume<&'static str, &'static str, &'static str> for Expiring {
    fn deliver(&self, _: &Env) -> Result<(), ConsumerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn as_removable(&self) -> Option<&dyn Removable> {
        Some(self)
    }
}

impl Removable for Expiring {
    fn can_remove(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }
}

/// Only interested in one meta value.
struct Picky {
    wants: &'static str,
    calls: AtomicUsize,
}

impl Consume<&'static str, &'static str, &'static str> for Picky {
    fn deliver(&self, _: &Env) -> Result<(), ConsumerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn as_conditional(&self) -> Option<&dyn Conditional<&'static str, &'static str>> {
        Some(self)
    }
}

impl Conditional<&'static str, &'static str> for Picky {
    fn should_notify(&self, _sender: &&'static str, meta: &&'static str) -> bool {
        *meta == self.wants
    }
}

#[test]
fn test_every_consumer_sees_sender_meta_and_body_once() {
    let notifier = TestNotifier::new("S1");
    let a = Arc::new(Recorder::default());
    let b = Arc::new(Recorder::default());
    notifier.add_consumer(a.clone());
    notifier.add_consumer(b.clone());

    let handler = Handler::new();
    notifier.register_handler(&handler);
    assert_eq!(handler.emit(Payload::new("m").with_body("x")), Ok(true));

    for r in [&a, &b] {
        assert_eq!(*r.seen.lock(), vec![("S1", "m", vec!["x"])]);
    }
}

#[test]
fn test_removed_consumer_misses_later_notifications() {
    let notifier = TestNotifier::new("S1");
    let kept = Tally::new("kept", false);
    let removed = Tally::new("removed", false);
    let removed_handle: Arc<Sink> = removed.clone();

    notifier.add_consumer(kept.clone());
    notifier.add_consumer(removed_handle.clone());

    notifier.notify(Payload::new("m")).unwrap();
    assert!(notifier.remove_consumer(&removed_handle));
    notifier.notify(Payload::new("m")).unwrap();

    assert_eq!(removed.calls(), 1);
    assert_eq!(kept.calls(), 2);
}

#[test]
fn test_conditional_consumer_only_gets_matching_meta() {
    let notifier = TestNotifier::new("S1");
    let picky = Arc::new(Picky {
        wants: "B",
        calls: AtomicUsize::new(0),
    });
    let all = Tally::new("all", false);
    notifier.add_consumer(picky.clone());
    notifier.add_consumer(all.clone());

    notifier.notify(Payload::new("A")).unwrap();
    assert_eq!(picky.calls.load(Ordering::SeqCst), 0);
    assert_eq!(all.calls(), 1);

    notifier.notify(Payload::new("B")).unwrap();
    assert_eq!(picky.calls.load(Ordering::SeqCst), 1);
    assert_eq!(all.calls(), 2);
}

#[test]
fn test_failure_in_the_middle_is_aggregated() {
    let notifier = TestNotifier::new("S1");
    let tallies = [
        Tally::new("first", false),
        Tally::new("second", true),
        Tally::new("third", false),
    ];
    for p in &tallies {
        notifier.add_consumer(p.clone());
    }

    let handler = Handler::new();
    notifier.register_handler(&handler);
    let err = handler.emit(Payload::new("m")).unwrap_err();

    for p in &tallies {
        assert_eq!(p.calls(), 1, "{} must be attempted exactly once", p.name);
    }
    assert!(matches!(err, NotifyError::Aggregate { .. }), "got {err:?}");
    let failures = err.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].consumer, "second");
    assert_eq!(failures[0].error, ConsumerError::fail("rejected"));
}

#[test]
fn test_weak_consumer_stops_and_disappears_after_drop() {
    let notifier = TestNotifier::new("S1");
    let target = Arc::new(Recorder::default());
    let handle = notifier.add_weak_consumer(&target);

    let removable = handle.as_removable().expect("weak proxy is removable");
    assert!(!removable.can_remove());

    notifier.notify(Payload::new("m")).unwrap();
    assert_eq!(target.count(), 1);

    drop(target);
    assert!(handle.as_removable().is_some_and(|r| r.can_remove()));
    assert_eq!(notifier.notify(Payload::new("m")), Ok(()), "silent no-op");

    assert!(notifier.consumers().is_empty());
}

#[test]
fn test_expired_consumer_gets_no_further_deliveries() {
    let notifier = TestNotifier::new("S1");
    let expiring = Arc::new(Expiring::default());
    let steady = Tally::new("steady", false);
    notifier.add_consumer(expiring.clone());
    notifier.add_consumer(steady.clone());

    notifier.notify(Payload::new("m")).unwrap();
    expiring.expired.store(true, Ordering::SeqCst);

    assert_eq!(notifier.consumers().snapshot().len(), 1);
    notifier.notify(Payload::new("m")).unwrap();
    notifier.notify(Payload::new("m")).unwrap();

    assert_eq!(expiring.calls.load(Ordering::SeqCst), 1);
    assert_eq!(steady.calls(), 3);
}

#[test]
fn test_expiry_is_seen_by_the_very_next_notify() {
    let notifier = TestNotifier::new("S1");
    let expiring = Arc::new(Expiring::default());
    notifier.add_consumer(expiring.clone());

    notifier.notify(Payload::new("m")).unwrap();
    expiring.expired.store(true, Ordering::SeqCst);
    notifier.notify(Payload::new("m")).unwrap();

    assert_eq!(expiring.calls.load(Ordering::SeqCst), 1);
    assert!(notifier.consumers().is_empty());
}

#[test]
fn test_concurrent_registration_and_notify() {
    let notifier = TestNotifier::new("S1");
    let base = Tally::new("base", false);
    notifier.add_consumer(base.clone());

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..50 {
                    let extra: Arc<Sink> = Tally::new("extra", false);
                    notifier.add_consumer(extra.clone());
                    notifier.notify(Payload::new("m")).unwrap();
                    assert!(notifier.remove_consumer(&extra));
                }
            });
        }
    });

    assert_eq!(base.calls(), 200);
    assert_eq!(notifier.consumers().len(), 1);
}

#[test]
fn test_pruning_set_reads_never_duplicate_under_churn() {
    struct Flag {
        done: AtomicUsize,
    }
    impl Removable for Flag {
        fn can_remove(&self) -> bool {
            self.done.load(Ordering::SeqCst) == 1
        }
    }
    impl notivisor::MaybeRemovable for Flag {
        fn removable(&self) -> Option<&dyn Removable> {
            Some(self)
        }
    }

    let set: PruningSet<notivisor::Member<Flag>> = PruningSet::new();
    let members: Vec<_> = (0..16)
        .map(|_| {
            notivisor::Member::new(Arc::new(Flag {
                done: AtomicUsize::new(0),
            }))
        })
        .collect();

    thread::scope(|s| {
        s.spawn(|| {
            for m in &members {
                set.add(m.clone());
            }
            for m in members.iter().step_by(2) {
                m.done.store(1, Ordering::SeqCst);
            }
        });
        s.spawn(|| {
            for _ in 0..100 {
                let snap = set.snapshot();
                let unique: std::collections::HashSet<_> = snap.iter().collect();
                assert_eq!(unique.len(), snap.len());
            }
        });
    });

    assert_eq!(set.len(), 8);
}
