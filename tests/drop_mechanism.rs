//! Destructor and finalizer semantics: a swept object's `finalize` runs exactly once, immediately
//! before its `Drop` impl, and only once it is truly unreachable.

mod common;

use chromagc::{collect, statistics, Finalize, Root, Trace, TraceContext};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Plain {
    #[expect(dead_code)]
    id: usize,
    dropped: Arc<AtomicBool>,
}

impl Drop for Plain {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::Release);
    }
}

impl Trace for Plain {
    fn trace(&self, _ctx: &mut TraceContext<'_>) {}
}

#[derive(Debug)]
struct WithFinalizer {
    #[expect(dead_code)]
    id: usize,
    finalized: Arc<AtomicBool>,
    dropped: Arc<AtomicBool>,
}

impl Finalize for WithFinalizer {
    fn finalize(&self) {
        assert!(!self.dropped.load(Ordering::Acquire), "finalize must run before drop");
        self.finalized.store(true, Ordering::Release);
    }
}

impl Drop for WithFinalizer {
    fn drop(&mut self) {
        assert!(self.finalized.load(Ordering::Acquire), "drop must run after finalize");
        self.dropped.store(true, Ordering::Release);
    }
}

impl Trace for WithFinalizer {
    fn trace(&self, _ctx: &mut TraceContext<'_>) {}
}

#[test_log::test]
fn destructor_runs_once_object_becomes_unreachable() {
    common::with_heap(common::stop_the_world(), || {
        let dropped = Arc::new(AtomicBool::new(false));
        let root = Root::make(Plain { id: 1, dropped: Arc::clone(&dropped) });

        collect();
        assert!(!dropped.load(Ordering::Acquire), "rooted object must not be dropped");

        drop(root);
        collect();
        assert!(dropped.load(Ordering::Acquire), "unrooted object must be swept and dropped");
    });
}

#[test_log::test]
fn finalizer_runs_before_destructor() {
    common::with_heap(common::stop_the_world(), || {
        let finalized = Arc::new(AtomicBool::new(false));
        let dropped = Arc::new(AtomicBool::new(false));
        let root = Root::make_finalizable(WithFinalizer {
            id: 2,
            finalized: Arc::clone(&finalized),
            dropped: Arc::clone(&dropped),
        });

        collect();
        assert!(!finalized.load(Ordering::Acquire));
        assert!(!dropped.load(Ordering::Acquire));

        drop(root);
        collect();
        assert!(finalized.load(Ordering::Acquire));
        assert!(dropped.load(Ordering::Acquire));
    });
}

#[test_log::test]
fn multiple_unrooted_objects_are_all_swept() {
    common::with_heap(common::stop_the_world(), || {
        let mut flags = Vec::new();
        {
            let mut roots = Vec::new();
            for i in 0..5 {
                let dropped = Arc::new(AtomicBool::new(false));
                roots.push(Root::make(Plain { id: i + 10, dropped: Arc::clone(&dropped) }));
                flags.push(dropped);
            }
            // `roots` drops here; every object becomes unreachable at once.
        }

        collect();
        for (i, flag) in flags.iter().enumerate() {
            assert!(flag.load(Ordering::Acquire), "object {i} should have been dropped");
        }
        assert_eq!(statistics().live_objects, 0);
    });
}

#[test_log::test]
fn survivors_keep_their_destructor_unrun_across_repeated_cycles() {
    common::with_heap(common::stop_the_world(), || {
        let dropped = Arc::new(AtomicBool::new(false));
        let root = Root::make(Plain { id: 99, dropped: Arc::clone(&dropped) });
        for _ in 0..5 {
            collect();
        }
        assert!(!dropped.load(Ordering::Acquire), "a live root must never be dropped");
        drop(root);
    });
}
