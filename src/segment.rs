//! The segmented heap: independently locked partitions that make parallel marking and sweeping
//! sound.
//!
//! Each [`Segment`] owns a [`ChunkAllocator`], an intrusive singly-linked object list, and a local
//! work list. In single-threaded modes the heap has exactly one segment; in parallel mode it has
//! one per worker, and new allocations/shades are routed to the *target's* owning segment (see
//! §9, "Segment routing").

use crate::chunk::{ChunkAllocator, SystemChunkAllocator};
use crate::header::{Color, ObjectHeader};
use crate::pointers::HeaderPtr;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicPtr, AtomicUsize, Ordering};

/// Intrusive singly-linked list of every live object owned by a segment.
///
/// Guarded by the segment's own lock; insertion is O(1) prepend, sweep is a single linear walk.
struct ObjectList {
    head: *mut ObjectHeader,
}

// Safety: the list is only ever touched while holding `Segment::objects`.
unsafe impl Send for ObjectList {}

impl ObjectList {
    const fn new() -> Self {
        Self {
            head: std::ptr::null_mut(),
        }
    }

    fn push_front(&mut self, header: *mut ObjectHeader) {
        // Safety: `header` was just allocated and is not yet visible to any other thread.
        unsafe {
            (*header).next.store(self.head, Ordering::Release);
        }
        self.head = header;
    }
}

/// One partition of the heap: a chunk allocator, an object list, and a work list.
pub(crate) struct Segment {
    pub(crate) id: usize,
    allocator: Box<dyn ChunkAllocator>,
    objects: Mutex<ObjectList>,
    work: Mutex<VecDeque<HeaderPtr>>,
    bytes_allocated: AtomicUsize,
    object_count: AtomicUsize,
    sweeping: AtomicBool,
}

impl Segment {
    pub(crate) fn new(id: usize) -> Self {
        Self::with_allocator(id, Box::new(SystemChunkAllocator))
    }

    pub(crate) fn with_allocator(id: usize, allocator: Box<dyn ChunkAllocator>) -> Self {
        Self {
            id,
            allocator,
            objects: Mutex::new(ObjectList::new()),
            work: Mutex::new(VecDeque::new()),
            bytes_allocated: AtomicUsize::new(0),
            object_count: AtomicUsize::new(0),
            sweeping: AtomicBool::new(false),
        }
    }

    /// Whether this segment is currently being swept. Concurrent-mode allocation routed to this
    /// segment must wait until sweeping completes (§5, Open Question on sweep/allocation overlap:
    /// this crate blocks rather than double-buffers the object list).
    pub(crate) fn is_sweeping(&self) -> bool {
        self.sweeping.load(Ordering::Acquire)
    }

    pub(crate) fn allocator(&self) -> &dyn ChunkAllocator {
        &*self.allocator
    }

    pub(crate) fn bytes_allocated(&self) -> usize {
        self.bytes_allocated.load(Ordering::Relaxed)
    }

    pub(crate) fn object_count(&self) -> usize {
        self.object_count.load(Ordering::Relaxed)
    }

    /// Links a freshly allocated object into this segment's object list.
    pub(crate) fn insert(&self, header: *mut ObjectHeader, size: usize) {
        self.objects.lock().push_front(header);
        self.bytes_allocated.fetch_add(size, Ordering::Relaxed);
        self.object_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Appends an object to this segment's work list. Called only after the object's color has
    /// already been CAS'd from WHITE to GRAY, so it is queued exactly once per cycle.
    pub(crate) fn push_work(&self, header: HeaderPtr) {
        self.work.lock().push_back(header);
    }

    pub(crate) fn pop_work(&self) -> Option<HeaderPtr> {
        self.work.lock().pop_front()
    }

    pub(crate) fn work_is_empty(&self) -> bool {
        self.work.lock().is_empty()
    }

    pub(crate) fn clear_work(&self) {
        self.work.lock().clear();
    }

    /// Walks the object list: BLACK objects are reset to WHITE and kept, WHITE objects are
    /// unlinked, destroyed and their bytes returned to the allocator. Returns `(bytes_freed,
    /// objects_freed)`.
    ///
    /// # Panics
    ///
    /// Panics if a GRAY object is found, or a root object is found that is not BLACK — both are
    /// invariant violations per §7.
    pub(crate) fn sweep(&self) -> (usize, usize) {
        self.sweeping.store(true, Ordering::Release);
        let result = self.sweep_locked();
        self.sweeping.store(false, Ordering::Release);
        result
    }

    fn sweep_locked(&self) -> (usize, usize) {
        let mut objects = self.objects.lock();
        let mut bytes_freed = 0usize;
        let mut objects_freed = 0usize;

        let mut prev: *mut ObjectHeader = std::ptr::null_mut();
        let mut current = objects.head;

        while !current.is_null() {
            // Safety: every pointer in this list was inserted by `insert` and is only ever mutated
            // under this same lock.
            let header = unsafe { &*current };
            let next = header.next.load(Ordering::Acquire);

            assert!(
                header.color() != Color::GRAY,
                "sweep encountered a GRAY object: marking did not reach fixpoint"
            );
            if header.is_root() {
                assert!(
                    header.color() == Color::BLACK,
                    "sweep encountered a root that is not BLACK"
                );
            }

            if header.color() == Color::BLACK {
                header.set_color(Color::WHITE);
                prev = current;
            } else {
                if prev.is_null() {
                    objects.head = next;
                } else {
                    // Safety: `prev` is a live header in this same list.
                    unsafe { (*prev).next.store(next, Ordering::Release) };
                }

                let size = header.size();
                header.set_alive(false);
                // Safety: the object is WHITE (unreachable) and about to be unlinked; this is the
                // only place a `GcBox<T>` is ever destroyed.
                unsafe {
                    if let Some(finalize) = header.descriptor.finalize {
                        finalize(current);
                    }
                    (header.descriptor.drop_and_free)(current, self.allocator());
                }
                bytes_freed += size;
                objects_freed += 1;
                self.object_count.fetch_sub(1, Ordering::Relaxed);
            }

            current = next;
        }

        self.bytes_allocated.fetch_sub(bytes_freed, Ordering::Relaxed);
        (bytes_freed, objects_freed)
    }

    /// Resets every surviving object's color to WHITE. Called at the start of a collection cycle,
    /// before roots are rescanned.
    pub(crate) fn reset_colors_to_white(&self) {
        let objects = self.objects.lock();
        let mut current = objects.head;
        while !current.is_null() {
            let header = unsafe { &*current };
            header.set_color(Color::WHITE);
            current = header.next.load(Ordering::Acquire);
        }
    }
}

/// The collector's segmented heap: one segment in single-threaded modes, one per worker thread
/// when parallel marking/sweeping is configured.
pub(crate) struct SegmentedHeap {
    segments: Vec<Segment>,
    next_route: AtomicUsize,
}

impl SegmentedHeap {
    pub(crate) fn new(segment_count: usize) -> Self {
        let segment_count = segment_count.max(1);
        let segments = (0..segment_count).map(Segment::new).collect();
        Self {
            segments,
            next_route: AtomicUsize::new(0),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.segments.len()
    }

    pub(crate) fn get(&self, idx: usize) -> &Segment {
        &self.segments[idx]
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Picks a segment to route a new allocation to. Round-robins by default; callers that want
    /// locality may instead pass an explicit `preferred_segment` to the heap's allocation path.
    pub(crate) fn route(&self) -> usize {
        self.next_route.fetch_add(1, Ordering::Relaxed) % self.segments.len()
    }

    pub(crate) fn total_bytes_allocated(&self) -> usize {
        self.segments.iter().map(Segment::bytes_allocated).sum()
    }

    pub(crate) fn total_object_count(&self) -> usize {
        self.segments.iter().map(Segment::object_count).sum()
    }
}
