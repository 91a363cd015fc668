//! The collector: the scheduler and tri-color engine driving the three collection policies over
//! a [`SegmentedHeap`].

use crate::config::{CollectionMode, Configuration, Statistics};
use crate::error::{Error, Result};
use crate::finalizer::Finalize;
use crate::header::{
    descriptor_of, finalizable_descriptor_of, opaque_descriptor_of, Color, Descriptor, GcBox, ObjectHeader,
};
use crate::pointers::HeaderPtr;
use crate::roots::RootSet;
use crate::segment::SegmentedHeap;
use crate::trace::{Trace, TraceContext};
use parking_lot::{Condvar, Mutex};
use std::alloc::Layout;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// The concurrent scheduler's auxiliary state (§4.5). `StopTheWorld` and `Incremental` only ever
/// occupy `Idle`, `Marking`, `Sweeping` among these; `Requested` and `AtomicMarking` exist solely
/// for the concurrent handshake.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Phase {
    Idle,
    Requested,
    Marking,
    AtomicMarking,
    Sweeping,
}

fn fatal(message: &str) -> ! {
    tracing::error!("{message}");
    std::process::abort();
}

/// The garbage collector: owns the segmented heap, the root set, and the scheduling state that
/// drives mark-and-sweep across whichever [`CollectionMode`] it was configured with.
pub struct GarbageCollector {
    heap: SegmentedHeap,
    roots: RootSet,
    config: Configuration,
    stats: Mutex<Statistics>,
    phase: Mutex<Phase>,
    phase_cond: Condvar,
    stop: AtomicBool,
    collector_thread: Mutex<Option<JoinHandle<()>>>,
    last_cycle_end: Mutex<Instant>,
}

impl std::fmt::Debug for GarbageCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GarbageCollector")
            .field("mode", &self.config.mode)
            .field("phase", &*self.phase.lock())
            .field("bytes_allocated", &self.heap.total_bytes_allocated())
            .field("object_count", &self.heap.total_object_count())
            .finish_non_exhaustive()
    }
}

impl GarbageCollector {
    /// Builds a new collector. Does not start the concurrent collector thread; call
    /// [`GarbageCollector::start`] for that.
    #[must_use]
    pub(crate) fn new(config: Configuration) -> Arc<Self> {
        let segment_count = config.segment_count();
        Arc::new(Self {
            heap: SegmentedHeap::new(segment_count),
            roots: RootSet::new(),
            stats: Mutex::new(Statistics::default()),
            phase: Mutex::new(Phase::Idle),
            phase_cond: Condvar::new(),
            stop: AtomicBool::new(false),
            collector_thread: Mutex::new(None),
            last_cycle_end: Mutex::new(Instant::now()),
            config,
        })
    }

    /// Spawns the dedicated collector thread if configured for [`CollectionMode::Concurrent`].
    pub(crate) fn start(self: &Arc<Self>) {
        if self.config.mode != CollectionMode::Concurrent {
            return;
        }
        let collector = Arc::clone(self);
        let handle = std::thread::Builder::new()
            .name("gc-collector".to_owned())
            .spawn(move || collector.run_collector_loop())
            .unwrap_or_else(|error| fatal(&format!("failed to spawn collector thread: {error}")));
        *self.collector_thread.lock() = Some(handle);
    }

    /// Stops the collector thread (if any), runs a final collection, and asserts the heap is
    /// empty. Mirrors the teacher's heap-destructor contract (§6): surviving objects at this
    /// point indicate a caller that leaked roots.
    pub(crate) fn shutdown(&self) {
        self.stop.store(true, Ordering::Release);
        self.phase_cond.notify_all();
        if let Some(handle) = self.collector_thread.lock().take() {
            let _ = handle.join();
        }
        self.collect_cycle();
        assert!(
            self.heap.total_object_count() == 0,
            "memory leak detected: {} objects still alive at heap destruction",
            self.heap.total_object_count()
        );
    }

    /// Forces a complete collection cycle to run to completion before returning, regardless of
    /// the configured policy's own pacing.
    ///
    /// Under `StopTheWorld`/`Incremental`, the cycle runs synchronously on the calling thread, as
    /// if an allocation had crossed `max_heap_bytes`. Under `Concurrent`, this requests a cycle
    /// from the dedicated collector thread (if one is not already in flight) and blocks until the
    /// scheduler returns to `Idle`. Intended for callers that, like the teacher crate's own
    /// `collect()`, want a deterministic synchronization point — e.g. tests and benchmarks —
    /// rather than relying on allocation pressure to eventually trigger one.
    pub(crate) fn collect(&self) {
        match self.config.mode {
            CollectionMode::StopTheWorld | CollectionMode::Incremental => self.collect_cycle(),
            CollectionMode::Concurrent => {
                let mut phase = self.phase.lock();
                if *phase == Phase::Idle {
                    *phase = Phase::Requested;
                    self.phase_cond.notify_all();
                }
                while *phase != Phase::Idle {
                    self.phase_cond.wait(&mut phase);
                }
            }
        }
    }

    /// Returns a snapshot of the collector's running statistics, filled in with the heap's
    /// current live-object/live-byte counts at the moment of the call (§6 "Observability").
    #[must_use]
    pub(crate) fn statistics(&self) -> Statistics {
        let mut stats = self.stats.lock().clone();
        stats.live_objects = self.heap.total_object_count();
        stats.live_bytes = self.heap.total_bytes_allocated();
        stats
    }

    #[must_use]
    pub(crate) fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Whether a write barrier (and shade-at-creation) must run right now. Carried forward from
    /// the original implementation's `need_write_barrier()`: always active under
    /// [`CollectionMode::Concurrent`], active under [`CollectionMode::Incremental`] only while
    /// marking, never active under [`CollectionMode::StopTheWorld`] (its mark phase runs with all
    /// mutators stopped, so no concurrent mutation can violate the tri-color invariant).
    pub(crate) fn barrier_active(&self) -> bool {
        match self.config.mode {
            CollectionMode::StopTheWorld => false,
            CollectionMode::Concurrent => true,
            CollectionMode::Incremental => *self.phase.lock() == Phase::Marking,
        }
    }

    /// Whether a mark phase is actually in flight right now, as opposed to [`barrier_active`]
    /// (which is unconditionally `true` for `Concurrent` so the *write* barrier stays armed
    /// across the whole idle-to-idle cycle). Shading a freshly allocated object only makes sense
    /// while marking is underway: shading it while idle would enqueue it for the *next* cycle's
    /// scan, keeping it alive through that cycle regardless of reachability.
    ///
    /// [`barrier_active`]: Self::barrier_active
    fn marking_in_progress(&self) -> bool {
        match self.config.mode {
            CollectionMode::StopTheWorld => false,
            CollectionMode::Incremental => *self.phase.lock() == Phase::Marking,
            CollectionMode::Concurrent => {
                matches!(*self.phase.lock(), Phase::Marking | Phase::AtomicMarking)
            }
        }
    }

    // ---- allocation -----------------------------------------------------------------------

    pub(crate) fn allocate<T: Trace + Send + Sync + 'static>(
        &self,
        value: T,
        preferred_segment: Option<usize>,
    ) -> *mut ObjectHeader {
        self.allocate_with(descriptor_of::<T>(), preferred_segment, move |_header| value)
    }

    pub(crate) fn allocate_finalizable<T: Trace + Finalize + Send + Sync + 'static>(
        &self,
        value: T,
        preferred_segment: Option<usize>,
    ) -> *mut ObjectHeader {
        self.allocate_with(finalizable_descriptor_of::<T>(), preferred_segment, move |_header| value)
    }

    /// Allocates a non-traceable payload: the header's descriptor reports `traceable = false`, so
    /// `shade` promotes it straight to BLACK without ever enqueuing it on a work list (§4.2). Used
    /// by [`crate::containers::Boxed`] and [`crate::containers::Adapter`].
    pub(crate) fn allocate_opaque<T: Send + Sync + 'static>(
        &self,
        value: T,
        preferred_segment: Option<usize>,
    ) -> *mut ObjectHeader {
        self.allocate_with(opaque_descriptor_of::<T>(), preferred_segment, move |_header| value)
    }

    /// Allocates a managed object whose constructor is given the address its own header will
    /// occupy — needed by self-referential types like [`crate::containers::Array`], whose
    /// `Field<T>` elements must record their parent at construction time but cannot exist before
    /// the allocation they belong to does.
    pub(crate) fn allocate_with<T>(
        &self,
        descriptor: &'static Descriptor,
        preferred_segment: Option<usize>,
        build: impl FnOnce(*const ObjectHeader) -> T,
    ) -> *mut ObjectHeader {
        let segment_idx = preferred_segment.unwrap_or_else(|| self.heap.route());
        self.before_allocate(descriptor.size, segment_idx);

        let segment = self.heap.get(segment_idx);
        let layout = Layout::new::<GcBox<T>>();
        let Some(raw) = segment.allocator().allocate(layout) else {
            fatal(&format!(
                "out of memory: chunk allocator could not satisfy a {}-byte request",
                layout.size()
            ));
        };

        let gcbox_ptr = raw.as_ptr().cast::<GcBox<T>>();
        let header_ptr = gcbox_ptr.cast::<ObjectHeader>();
        // Safety: `header` is `GcBox<T>`'s first field under `repr(C)`; writing it before `data`
        // is initialized is sound because nothing reads `data` until after `build` returns.
        unsafe {
            std::ptr::addr_of_mut!((*gcbox_ptr).header).write(ObjectHeader::new(segment_idx, descriptor));
            (*header_ptr).set_collector(std::ptr::from_ref(self).cast::<()>());
        }
        let value = build(header_ptr.cast_const());
        // Safety: `raw` was allocated with `GcBox<T>`'s own layout; `header` above is already
        // initialized and nothing else has a reference to this allocation yet.
        unsafe {
            std::ptr::addr_of_mut!((*gcbox_ptr).data).write(value);
        }

        // §3 "Created": an object allocated while a mark phase is actually underway is shaded
        // immediately so it can never be observed WHITE at sweep if it turns out reachable
        // (property 5) — the marker may already have passed the point that would have shaded it.
        // Shading it while no mark phase is in flight would be wrong, not harmless: the object
        // would sit GRAY on a work list until the *next* cycle scans it to BLACK, surviving that
        // whole cycle even if it is never rooted or referenced by anything (properties 2, 6).
        if self.marking_in_progress() {
            trace!(segment_idx, "shading newly allocated object");
            self.shade(header_ptr.cast_const());
        }

        segment.insert(header_ptr, descriptor.size);
        self.stats.lock().bytes_allocated += descriptor.size;
        header_ptr
    }

    // ---- mark/sweep primitives (§4.2) ------------------------------------------------------

    /// Promotes `header` from WHITE to GRAY (or straight to BLACK if non-traceable, since it has
    /// no outgoing references to scan). No-op if `header` is null or already non-WHITE. Enqueues
    /// onto the owning segment's work list exactly once per cycle, by construction of the CAS.
    pub(crate) fn shade(&self, header: *const ObjectHeader) {
        if header.is_null() {
            return;
        }
        // Safety: every `*const ObjectHeader` reaching this function points at a live allocation;
        // callers never hold on to a header pointer past the object's lifetime.
        let h = unsafe { &*header };
        if !h.try_shade() {
            return;
        }
        if h.traceable() {
            self.heap.get(h.segment_idx).push_work(HeaderPtr::new(header));
        } else {
            h.set_color(Color::BLACK);
        }
    }

    /// Traces `header`'s outgoing references (shading each) and promotes it to BLACK. No-op if
    /// already BLACK.
    fn scan(&self, header: *const ObjectHeader) {
        // Safety: see `shade`.
        let h = unsafe { &*header };
        if h.color() == Color::BLACK {
            return;
        }
        if self.config.full_debug {
            assert_ne!(
                h.color(),
                Color::WHITE,
                "scanning a WHITE object: it was popped off a work list without ever being shaded"
            );
        }
        let mut ctx = TraceContext::new(self);
        // Safety: `header` is a live `ObjectHeader` whose descriptor was computed for the exact
        // `T` it was allocated with.
        unsafe { (h.descriptor.trace)(header, &mut ctx) };
        h.set_color(Color::BLACK);
        self.stats.lock().objects_marked += 1;
        if self.config.full_debug {
            trace!(?header, "scanned object to BLACK");
        }
    }

    /// Shades every current root. New roots registered concurrently with this call are still
    /// promoted, because root creation itself shades (§4.4).
    fn scan_roots(&self) {
        let snapshot = self.roots.snapshot();
        debug!(count = snapshot.len(), "scanning roots");
        for header in snapshot {
            self.shade(header.as_ptr());
        }
    }

    /// Pops and scans up to `budget` work-list entries across all segments. Returns whether work
    /// remains after the budget was exhausted.
    fn mark_some(&self, budget: usize) -> bool {
        let mut processed = 0;
        while processed < budget {
            let popped = self.heap.iter().find_map(crate::segment::Segment::pop_work);
            match popped {
                Some(header) => {
                    self.scan(header.as_ptr());
                    processed += 1;
                }
                None => return false,
            }
        }
        self.heap.iter().any(|segment| !segment.work_is_empty())
    }

    /// Drains every segment's work list to a fixpoint: single-threaded via repeated
    /// [`mark_some`](Self::mark_some), or across worker threads via [`mark_parallel`].
    fn drain_work(&self) {
        if self.config.worker_count() > 1 {
            self.mark_parallel();
        } else {
            while self.mark_some(self.config.incremental_step_size.max(1)) {}
        }
    }

    /// Dispatches a worker per segment to drain its own work list, discovering newly-gray
    /// targets' owning segments from their header's `segment_idx`. Loops until two consecutive
    /// passes observe every segment's work list empty, so no worker can miss work another
    /// produced for it mid-pass (§4.2 "Parallel marking").
    fn mark_parallel(&self) {
        use rayon::prelude::*;
        loop {
            let progressed = (0..self.heap.len()).into_par_iter().any(|idx| {
                let segment = self.heap.get(idx);
                let mut made_progress = false;
                while let Some(header) = segment.pop_work() {
                    self.scan(header.as_ptr());
                    made_progress = true;
                }
                made_progress
            });
            if !progressed && self.heap.iter().all(|segment| segment.work_is_empty()) {
                break;
            }
        }
    }

    /// Sweeps every segment, in parallel when configured with more than one worker.
    fn sweep(&self) -> (usize, usize) {
        if self.config.worker_count() > 1 {
            use rayon::prelude::*;
            (0..self.heap.len())
                .into_par_iter()
                .map(|idx| self.heap.get(idx).sweep())
                .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1))
        } else {
            self.heap
                .iter()
                .map(crate::segment::Segment::sweep)
                .fold((0, 0), |a, b| (a.0 + b.0, a.1 + b.1))
        }
    }

    /// Runs a full, synchronous cycle: reset colors, scan roots, drain to fixpoint, sweep.
    fn collect_cycle(&self) {
        let cycle_start = Instant::now();
        {
            let mut stats = self.stats.lock();
            stats.collections_started += 1;
            stats.last_collection_start = Some(cycle_start);
        }

        for segment in self.heap.iter() {
            segment.reset_colors_to_white();
            segment.clear_work();
        }

        let mark_start = Instant::now();
        self.scan_roots();
        self.drain_work();
        let mark_elapsed = mark_start.elapsed();

        let sweep_start = Instant::now();
        let (bytes_freed, objects_freed) = self.sweep();
        let sweep_elapsed = sweep_start.elapsed();

        let total_elapsed = cycle_start.elapsed();
        let mut stats = self.stats.lock();
        stats.collections_completed += 1;
        stats.objects_swept += objects_freed;
        stats.bytes_freed += bytes_freed;
        stats.mark_phase.record(mark_elapsed);
        stats.sweep_phase.record(sweep_elapsed);
        stats.last_collection_duration = Some(total_elapsed);
        stats.total_collection_time += total_elapsed;
        debug!(?mark_elapsed, ?sweep_elapsed, objects_freed, bytes_freed, "collection cycle complete");
    }

    // ---- scheduling (§4.5) ------------------------------------------------------------------

    fn before_allocate(&self, size: usize, segment_idx: usize) {
        match self.config.mode {
            CollectionMode::StopTheWorld => self.before_allocate_stw(size),
            CollectionMode::Incremental => self.before_allocate_incremental(size),
            CollectionMode::Concurrent => self.before_allocate_concurrent(size, segment_idx),
        }
    }

    fn before_allocate_stw(&self, size: usize) {
        let used = self.heap.total_bytes_allocated();
        if used + size > self.config.max_heap_bytes {
            self.collect_cycle();
            let used = self.heap.total_bytes_allocated();
            if used + size > self.config.max_heap_bytes {
                fatal("out of memory: heap still over capacity after a forced collection");
            }
        }
    }

    fn before_allocate_incremental(&self, size: usize) {
        let mut phase = self.phase.lock();
        match *phase {
            Phase::Marking => {
                drop(phase);
                if self.mark_some(self.config.incremental_step_size) {
                    let used = self.heap.total_bytes_allocated();
                    if used + size > self.config.max_heap_bytes {
                        self.drain_work();
                        self.sweep_and_go_idle();
                    }
                } else {
                    self.sweep_and_go_idle();
                }
            }
            Phase::Idle => {
                let used = self.heap.total_bytes_allocated();
                let over_threshold =
                    used + size > (self.config.max_heap_bytes as f64 * self.config.gc_threshold) as usize;
                let over_capacity = used + size > self.config.max_heap_bytes;
                if over_capacity || over_threshold {
                    *phase = Phase::Marking;
                    drop(phase);
                    self.scan_roots();
                    if over_capacity {
                        self.drain_work();
                        self.sweep_and_go_idle();
                    }
                }
            }
            Phase::Requested | Phase::AtomicMarking | Phase::Sweeping => {
                fatal("incremental collector observed a concurrent-only phase");
            }
        }
    }

    fn sweep_and_go_idle(&self) {
        let mark_elapsed = Duration::ZERO; // already accounted tick-by-tick via `mark_some`.
        let sweep_start = Instant::now();
        let (bytes_freed, objects_freed) = self.sweep();
        let sweep_elapsed = sweep_start.elapsed();
        *self.phase.lock() = Phase::Idle;

        let mut stats = self.stats.lock();
        stats.collections_completed += 1;
        stats.objects_swept += objects_freed;
        stats.bytes_freed += bytes_freed;
        stats.sweep_phase.record(sweep_elapsed);
        stats.mark_phase.record(mark_elapsed);
    }

    fn before_allocate_concurrent(&self, size: usize, segment_idx: usize) {
        let wait_start = Instant::now();
        let mut phase = self.phase.lock();
        loop {
            match *phase {
                Phase::AtomicMarking => {
                    self.phase_cond.wait(&mut phase);
                    continue;
                }
                Phase::Sweeping if self.heap.get(segment_idx).is_sweeping() => {
                    self.phase_cond.wait(&mut phase);
                    continue;
                }
                _ => {}
            }

            let used = self.heap.total_bytes_allocated();
            if used + size > self.config.max_heap_bytes {
                // Over capacity: a cycle must run regardless of the inter-cycle gap. If nobody
                // has requested one yet, request it ourselves — with a single mutator thread (the
                // common concurrent case) there is no other actor to drive `Idle` to `Requested`,
                // and the dedicated collector thread only ever acts on `Requested`.
                if *phase == Phase::Idle {
                    *phase = Phase::Requested;
                    self.phase_cond.notify_all();
                }
                warn!("mutator blocking: heap over capacity, waiting for a cycle to complete");
                self.phase_cond.wait(&mut phase);
                continue;
            }

            if *phase == Phase::Idle {
                let over_threshold = used + size
                    > (self.config.max_heap_bytes as f64 * self.config.gc_threshold) as usize;
                let gap_elapsed = self.last_cycle_end.lock().elapsed() >= self.config.min_concurrent_cycle_gap;
                if over_threshold && gap_elapsed {
                    *phase = Phase::Requested;
                    self.phase_cond.notify_all();
                }
            }
            break;
        }
        drop(phase);
        self.stats.lock().mutator_wait.record(wait_start.elapsed());
    }

    fn run_collector_loop(self: Arc<Self>) {
        while !self.stop.load(Ordering::Acquire) {
            {
                let mut phase = self.phase.lock();
                while *phase != Phase::Requested {
                    if self.stop.load(Ordering::Acquire) {
                        return;
                    }
                    self.phase_cond.wait_for(&mut phase, Duration::from_millis(50));
                }
                *phase = Phase::Marking;
                self.phase_cond.notify_all();
            }

            let mark_start = Instant::now();
            self.scan_roots();
            // Marking runs without holding the phase lock: mutators may keep allocating, with the
            // write barrier active (`barrier_active()` is unconditionally true in Concurrent mode).
            while self.mark_some(self.config.incremental_step_size) {
                if self.stop.load(Ordering::Acquire) {
                    return;
                }
            }
            let mark_elapsed = mark_start.elapsed();

            {
                let mut phase = self.phase.lock();
                *phase = Phase::AtomicMarking;
                self.phase_cond.notify_all();
            }
            // Drain any work mutators produced while marking was "concurrently" in progress.
            let mut empty_passes = 0;
            while empty_passes < 2 {
                if self.mark_some(self.config.incremental_step_size) {
                    empty_passes = 0;
                } else {
                    empty_passes += 1;
                }
            }

            {
                let mut phase = self.phase.lock();
                *phase = Phase::Sweeping;
                self.phase_cond.notify_all();
            }
            let sweep_start = Instant::now();
            let (bytes_freed, objects_freed) = self.sweep();
            let sweep_elapsed = sweep_start.elapsed();

            {
                let mut phase = self.phase.lock();
                *phase = Phase::Idle;
                *self.last_cycle_end.lock() = Instant::now();
                self.phase_cond.notify_all();
            }

            let mut stats = self.stats.lock();
            stats.collections_completed += 1;
            stats.objects_swept += objects_freed;
            stats.bytes_freed += bytes_freed;
            stats.mark_phase.record(mark_elapsed);
            stats.sweep_phase.record(sweep_elapsed);
            debug!(?mark_elapsed, ?sweep_elapsed, objects_freed, "concurrent cycle complete");
        }
    }

    // ---- root barrier (§4.4) ----------------------------------------------------------------

    /// Increments `header`'s root-reference count. On the 0→1 transition, registers it in the
    /// root set and shades it — promoting a newly-rooted WHITE object before marking concludes.
    pub(crate) fn acquire_root(&self, header: *const ObjectHeader) {
        if header.is_null() {
            return;
        }
        // Safety: see `shade`.
        let h = unsafe { &*header };
        if h.inc_root_refs() == 1 {
            let cursor = self.roots.insert(HeaderPtr::new(header));
            h.set_root_cursor(cursor);
            self.shade(header);
        }
    }

    /// Decrements `header`'s root-reference count. On the transition to zero, removes it from
    /// the root set.
    pub(crate) fn release_root(&self, header: *const ObjectHeader) {
        if header.is_null() {
            return;
        }
        // Safety: see `shade`.
        let h = unsafe { &*header };
        if h.dec_root_refs() == 0 {
            if let Some(cursor) = h.take_root_cursor() {
                self.roots.remove(cursor);
            }
        }
    }
}

static HEAP: Mutex<Option<Arc<GarbageCollector>>> = Mutex::new(None);

/// Installs the process-global heap. Fails if one is already installed (§9 "Global state":
/// double-init is forbidden).
pub fn init(config: Configuration) -> Result<()> {
    let mut slot = HEAP.lock();
    if slot.is_some() {
        return Err(Error::LifecycleError("heap is already initialized".to_owned()));
    }
    let collector = GarbageCollector::new(config);
    collector.start();
    *slot = Some(collector);
    Ok(())
}

/// Tears down the process-global heap: stops the collector thread, runs a final collection, and
/// asserts no objects survived.
///
/// # Panics
///
/// Panics if any object is still alive after the final collection — that indicates the caller
/// leaked a `Root` handle.
pub fn destroy() -> Result<()> {
    let collector = HEAP
        .lock()
        .take()
        .ok_or_else(|| Error::LifecycleError("heap is not initialized".to_owned()))?;
    collector.shutdown();
    Ok(())
}

/// Returns a snapshot of the process-global heap's running statistics (§6 "Observability"):
/// allocation and cycle counters, per-phase timings, mutator-wait time, and the heap's current
/// live-object/live-byte counts.
///
/// # Panics
///
/// Panics if [`init`] has not been called.
#[must_use]
pub fn statistics() -> Statistics {
    current().statistics()
}

/// Forces a complete collection cycle on the process-global heap, blocking until it completes.
///
/// See [`GarbageCollector::collect`] for the per-mode semantics.
///
/// # Panics
///
/// Panics if [`init`] has not been called.
pub fn collect() {
    current().collect();
}

/// Returns the process-global heap.
///
/// # Panics
///
/// Panics if [`init`] has not been called.
pub(crate) fn current() -> Arc<GarbageCollector> {
    HEAP.lock()
        .clone()
        .unwrap_or_else(|| fatal("garbage collector heap is not initialized; call init() first"))
}
