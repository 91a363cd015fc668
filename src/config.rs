//! Configuration and statistics for garbage collection.

use std::time::{Duration, Instant};

/// Selects which of the three interchangeable collection policies the collector runs.
///
/// All three share the same tri-color mark-and-sweep engine (§4.2); they differ only in how the
/// [`crate::collector::GarbageCollector`] paces and schedules mark/sweep work relative to mutator
/// allocation (§4.5).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum CollectionMode {
    /// A full cycle runs synchronously on the allocation that crosses `max_heap_bytes`.
    StopTheWorld,
    /// Each allocation is a tick that advances a bounded amount of mark/sweep work.
    #[default]
    Incremental,
    /// A dedicated collector thread marks and sweeps concurrently with mutators.
    Concurrent,
}

/// Configuration for the garbage collector.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Which collection policy to run.
    pub mode: CollectionMode,
    /// Maximum heap size in bytes before a cycle is forced.
    pub max_heap_bytes: usize,
    /// Fraction of `max_heap_bytes`, in `(0, 1]`, at which incremental/concurrent collection is
    /// requested (as opposed to forced).
    pub gc_threshold: f64,
    /// Number of worker threads used to parallelise marking and sweeping. `None` runs
    /// single-threaded; `Some(0)` uses half the available cores, matching the teacher crate's
    /// convention for "let the collector decide"; `Some(n)` with `n > 0` also sizes the
    /// segmented heap to `n` segments.
    pub collector_threads: Option<usize>,
    /// Enables extra invariant assertions and fine-grained tracing at a throughput cost.
    pub full_debug: bool,
    /// Number of work-list entries processed per incremental marking tick (§4.5, "Mark-some").
    pub incremental_step_size: usize,
    /// Minimum wall-clock gap between concurrent collection cycles, to avoid over-collecting a
    /// quiet heap (§5, "Timeouts").
    pub min_concurrent_cycle_gap: Duration,
}

impl Default for Configuration {
    /// - `mode`: `Incremental`
    /// - `max_heap_bytes`: 64 MiB
    /// - `gc_threshold`: 0.5
    /// - `collector_threads`: `None` (single segment, single-threaded mark/sweep)
    /// - `full_debug`: `false`
    /// - `incremental_step_size`: 10, matching §4.5's default Mark-some budget
    /// - `min_concurrent_cycle_gap`: 1 second
    fn default() -> Self {
        Self {
            mode: CollectionMode::Incremental,
            max_heap_bytes: 64 * 1024 * 1024,
            gc_threshold: 0.5,
            collector_threads: None,
            full_debug: false,
            incremental_step_size: 10,
            min_concurrent_cycle_gap: Duration::from_secs(1),
        }
    }
}

impl Configuration {
    pub(crate) fn segment_count(&self) -> usize {
        match self.collector_threads {
            None | Some(0) => 1,
            Some(n) => n,
        }
    }

    pub(crate) fn worker_count(&self) -> usize {
        match self.collector_threads {
            None => 1,
            Some(0) => (std::thread::available_parallelism().map_or(1, std::num::NonZero::get) / 2).max(1),
            Some(n) => n,
        }
    }
}

/// A running mean/min/max/variance accumulator (Welford's algorithm), used to summarize per-phase
/// timings without retaining every sample.
#[derive(Clone, Copy, Debug, Default)]
pub struct DurationStats {
    count: u64,
    mean_nanos: f64,
    m2: f64,
    min: Option<Duration>,
    max: Option<Duration>,
}

impl DurationStats {
    pub(crate) fn record(&mut self, sample: Duration) {
        self.count += 1;
        let x = sample.as_nanos() as f64;
        let delta = x - self.mean_nanos;
        self.mean_nanos += delta / self.count as f64;
        let delta2 = x - self.mean_nanos;
        self.m2 += delta * delta2;
        self.min = Some(self.min.map_or(sample, |m| m.min(sample)));
        self.max = Some(self.max.map_or(sample, |m| m.max(sample)));
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub fn mean(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.mean_nanos.max(0.0) as u64)
        }
    }

    #[must_use]
    pub fn min(&self) -> Duration {
        self.min.unwrap_or(Duration::ZERO)
    }

    #[must_use]
    pub fn max(&self) -> Duration {
        self.max.unwrap_or(Duration::ZERO)
    }

    #[must_use]
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }
}

/// Statistics about garbage collection performance.
#[derive(Clone, Debug, Default)]
pub struct Statistics {
    pub collections_started: usize,
    pub collections_completed: usize,
    pub objects_marked: usize,
    pub objects_swept: usize,
    pub bytes_allocated: usize,
    pub bytes_freed: usize,
    /// Number of managed objects currently reachable from segment object lists, sampled at the
    /// moment the snapshot was taken.
    pub live_objects: usize,
    /// Total bytes currently outstanding across every segment's allocator, sampled at the moment
    /// the snapshot was taken.
    pub live_bytes: usize,
    /// Time spent in stop-the-world / incremental-tick pauses.
    pub mark_phase: DurationStats,
    pub sweep_phase: DurationStats,
    /// Total time mutators spent blocked waiting on the collector (allocation waits, the
    /// concurrent atomic-marking window, sweep-in-progress waits).
    pub mutator_wait: DurationStats,
    pub last_collection_start: Option<Instant>,
    pub last_collection_duration: Option<Duration>,
    pub total_collection_time: Duration,
}
