//! Garbage collector scheduler tests.
//!
//! Tests collection-policy pacing, forced collection at capacity (spec scenario S4), and the
//! statistics surface (§6 "Observability").

mod common;

use chromagc::{collect, statistics, CollectionMode, Configuration, Field, Parent, Root, Trace, TraceContext};
use std::time::Duration;

struct Blob {
    #[expect(dead_code)]
    payload: [u8; 24],
    next: Field<Blob>,
}

impl Blob {
    fn new(parent: Parent) -> Self {
        Self {
            payload: [0u8; 24],
            next: Field::new(parent),
        }
    }
}

impl Trace for Blob {
    fn trace(&self, ctx: &mut TraceContext<'_>) {
        self.next.trace(ctx);
    }
}

#[test_log::test]
fn stop_the_world_collects_synchronously_on_allocation() {
    let config = Configuration {
        mode: CollectionMode::StopTheWorld,
        max_heap_bytes: 4096,
        ..common::stop_the_world()
    };
    common::with_heap(config, || {
        for _ in 0..64 {
            // Roots drop at the end of each iteration: nothing survives a forced cycle.
            let _garbage = Root::make_with(Blob::new);
        }
        collect();
        let stats = statistics();
        assert!(stats.collections_completed >= 1, "allocating past max_heap_bytes forces a cycle");
        assert_eq!(stats.live_objects, 0, "every allocation here was unrooted by the next iteration");
    });
}

#[test_log::test]
fn incremental_ticks_until_idle_and_sweeps_unreachable_garbage() {
    let config = Configuration {
        mode: CollectionMode::Incremental,
        max_heap_bytes: 4096,
        incremental_step_size: 2,
        ..common::incremental()
    };
    common::with_heap(config, || {
        let root = Root::make_with(Blob::new);
        for _ in 0..128 {
            // Unrooted garbage: ticks the incremental state machine without growing the live set.
            let _garbage = Root::make_with(Blob::new);
        }
        collect();
        let stats = statistics();
        assert!(stats.collections_completed >= 1);
        assert_eq!(stats.live_objects, 1, "only the long-lived root survives repeated ticks");
        drop(root);
    });
}

/// S4: forced collection at capacity keeps survivors bounded to the rooted fraction, with no
/// out-of-memory abort.
#[test_log::test]
fn forced_collection_bounds_survivors_to_rooted_fraction() {
    let config = Configuration {
        mode: CollectionMode::StopTheWorld,
        max_heap_bytes: 1024 * 32,
        ..common::stop_the_world()
    };
    common::with_heap(config, || {
        let mut kept = Vec::new();
        for i in 0..400 {
            let node = Root::make_with(Blob::new);
            if i % 10 == 0 {
                kept.push(node);
            }
            // node drops here unless it was pushed into `kept`.
        }
        collect();
        let stats = statistics();
        assert_eq!(stats.live_objects, kept.len());
        assert!(stats.live_objects * 10 <= 400, "at most every tenth allocation should survive");
    });
}

#[test_log::test]
fn concurrent_collector_thread_runs_cycles_in_background() {
    common::with_heap(common::concurrent(), || {
        let root = Root::make_with(Blob::new);
        for _ in 0..256 {
            let _garbage = Root::make_with(Blob::new);
        }
        collect();
        std::thread::sleep(Duration::from_millis(20));
        let stats = statistics();
        assert!(stats.collections_completed >= 1);
        assert_eq!(stats.live_objects, 1);
        drop(root);
    });
}

#[test_log::test]
fn statistics_track_allocation_and_phase_timings() {
    common::with_heap(common::stop_the_world(), || {
        let root = Root::make_with(Blob::new);
        collect();
        let stats = statistics();
        assert!(stats.bytes_allocated > 0);
        assert!(stats.collections_started >= 1);
        assert!(stats.collections_completed >= 1);
        assert!(stats.mark_phase.count() >= 1);
        assert!(stats.sweep_phase.count() >= 1);
        drop(root);
    });
}

#[test_log::test]
fn default_configuration_matches_documented_values() {
    let config = Configuration::default();
    assert_eq!(config.mode, CollectionMode::Incremental);
    assert_eq!(config.max_heap_bytes, 64 * 1024 * 1024);
    assert!((config.gc_threshold - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.incremental_step_size, 10);
    assert_eq!(config.min_concurrent_cycle_gap, Duration::from_secs(1));
}

#[test_log::test]
fn double_init_is_rejected() {
    common::with_heap(common::stop_the_world(), || {
        let result = chromagc::init(Configuration::default());
        assert!(matches!(result, Err(chromagc::Error::LifecycleError(_))));
    });
}
