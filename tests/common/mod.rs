//! Shared harness for integration tests against the process-global heap.
//!
//! Each file under `tests/` compiles to its own binary, but the test functions within one file
//! run as threads inside a single process — and the crate's heap is a singleton slot, so at most
//! one of them can hold it at a time. `with_heap` serializes access and handles `init`/`destroy`.

use chromagc::{destroy, init, CollectionMode, Configuration};
use std::sync::Mutex;

static HEAP_LOCK: Mutex<()> = Mutex::new(());

/// Runs `body` with a freshly initialized heap, tearing it down afterwards.
///
/// # Panics
/// Propagates any panic from `body`, and panics if `init`/`destroy` themselves fail (a prior
/// test in this file leaked a root, or the heap was already initialized).
pub fn with_heap<R>(config: Configuration, body: impl FnOnce() -> R) -> R {
    let guard = HEAP_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    init(config).expect("heap should not already be initialized");
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(body));
    destroy().expect("all roots should have been dropped by the test body");
    drop(guard);
    match result {
        Ok(value) => value,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

/// Runs `body` while holding the heap lock but without installing a heap, for asserting on
/// lifecycle misuse (e.g. `destroy()` with nothing initialized).
pub fn with_no_heap<R>(body: impl FnOnce() -> R) -> R {
    let guard = HEAP_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let result = body();
    drop(guard);
    result
}

pub fn stop_the_world() -> Configuration {
    Configuration {
        mode: CollectionMode::StopTheWorld,
        max_heap_bytes: 16 * 1024 * 1024,
        ..Configuration::default()
    }
}

pub fn incremental() -> Configuration {
    Configuration {
        mode: CollectionMode::Incremental,
        max_heap_bytes: 16 * 1024 * 1024,
        incremental_step_size: 4,
        ..Configuration::default()
    }
}

pub fn concurrent() -> Configuration {
    Configuration {
        mode: CollectionMode::Concurrent,
        max_heap_bytes: 16 * 1024 * 1024,
        ..Configuration::default()
    }
}

/// Stop-the-world, but with `workers` segments and worker threads driving parallel marking and
/// sweeping (§4.2 "Parallel marking", §5 "Parallel" scheduling regime).
pub fn parallel_stop_the_world(workers: usize) -> Configuration {
    Configuration {
        mode: CollectionMode::StopTheWorld,
        max_heap_bytes: 16 * 1024 * 1024,
        collector_threads: Some(workers),
        ..Configuration::default()
    }
}
