//! Object headers: the fixed metadata prefix on every managed allocation.

use crate::chunk::ChunkAllocator;
use crate::finalizer::Finalize;
use crate::trace::{Trace, TraceContext};
use bitflags::bitflags;
use std::alloc::Layout;
use std::sync::atomic::{AtomicBool, AtomicPtr, AtomicU8, AtomicUsize, Ordering};
use parking_lot::Mutex;

bitflags! {
    /// The tri-color marking state of an object.
    ///
    /// Exactly one of `WHITE` / `GRAY` / `BLACK` is set at any time; the bitset representation
    /// lets [`ObjectHeader::shade`] perform the WHITE→GRAY transition with a single CAS.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub(crate) struct Color: u8 {
        const WHITE = 0b001;
        const GRAY  = 0b010;
        const BLACK = 0b100;
    }
}

/// Per-type descriptor yielding size, alignment, tracing and destruction for a managed type.
///
/// One `Descriptor` exists per monomorphization of [`descriptor_of`]; it plays the role the spec
/// calls "a small vtable" without requiring trait-object dispatch or inheritance.
pub(crate) struct Descriptor {
    pub(crate) size: usize,
    pub(crate) align: usize,
    pub(crate) traceable: bool,
    pub(crate) trace: unsafe fn(*const ObjectHeader, &mut TraceContext<'_>),
    pub(crate) drop_and_free: unsafe fn(*mut ObjectHeader, &dyn ChunkAllocator),
    /// Set only for types allocated through a `*_finalizable` constructor; invoked by the sweeper
    /// immediately before `drop_and_free`.
    pub(crate) finalize: Option<unsafe fn(*const ObjectHeader)>,
}

unsafe fn trace_impl<T: Trace>(header: *const ObjectHeader, ctx: &mut TraceContext<'_>) {
    // Safety: `header` points at the `ObjectHeader` field of a live `GcBox<T>`; `ObjectHeader` is
    // `GcBox<T>`'s first field under `repr(C)` so the cast recovers the enclosing box.
    let gcbox = header.cast::<GcBox<T>>();
    unsafe { (*gcbox).data.trace(ctx) };
}

unsafe fn drop_and_free_impl<T>(header: *mut ObjectHeader, allocator: &dyn ChunkAllocator) {
    let gcbox = header.cast::<GcBox<T>>();
    let layout = Layout::new::<GcBox<T>>();
    // Safety: the object is unreachable (WHITE at sweep) so no other reference to it survives;
    // this is the only place a `GcBox<T>` is ever dropped or deallocated.
    unsafe {
        std::ptr::drop_in_place(gcbox);
        if let Some(ptr) = std::ptr::NonNull::new(gcbox.cast::<u8>()) {
            allocator.deallocate(ptr, layout);
        }
    }
}

fn noop_trace(_header: *const ObjectHeader, _ctx: &mut TraceContext<'_>) {}

unsafe fn finalize_impl<T: Finalize>(header: *const ObjectHeader) {
    let gcbox = header.cast::<GcBox<T>>();
    // Safety: called exactly once by the sweeper, before `drop_and_free_impl`, while `header`
    // still points at a live (WHITE, unreachable) `GcBox<T>`.
    unsafe { (*gcbox).data.finalize() };
}

/// Returns the stable per-type descriptor for `T`, generating it on first monomorphization.
pub(crate) fn descriptor_of<T: Trace + Send + Sync + 'static>() -> &'static Descriptor {
    struct Holder<T>(std::marker::PhantomData<T>);
    impl<T: Trace + Send + Sync + 'static> Holder<T> {
        const DESCRIPTOR: Descriptor = Descriptor {
            size: size_of::<GcBox<T>>(),
            align: align_of::<GcBox<T>>(),
            traceable: true,
            trace: trace_impl::<T>,
            drop_and_free: drop_and_free_impl::<T>,
            finalize: None,
        };
    }
    &Holder::<T>::DESCRIPTOR
}

/// Returns the stable per-type descriptor for a traceable type that also implements
/// [`Finalize`].
pub(crate) fn finalizable_descriptor_of<T: Trace + Finalize + Send + Sync + 'static>()
-> &'static Descriptor {
    struct Holder<T>(std::marker::PhantomData<T>);
    impl<T: Trace + Finalize + Send + Sync + 'static> Holder<T> {
        const DESCRIPTOR: Descriptor = Descriptor {
            size: size_of::<GcBox<T>>(),
            align: align_of::<GcBox<T>>(),
            traceable: true,
            trace: trace_impl::<T>,
            drop_and_free: drop_and_free_impl::<T>,
            finalize: Some(finalize_impl::<T>),
        };
    }
    &Holder::<T>::DESCRIPTOR
}

/// Returns a descriptor for a non-traceable payload type (see [`crate::containers::Boxed`]).
pub(crate) fn opaque_descriptor_of<T: Send + Sync + 'static>() -> &'static Descriptor {
    struct Holder<T>(std::marker::PhantomData<T>);
    impl<T: Send + Sync + 'static> Holder<T> {
        const DESCRIPTOR: Descriptor = Descriptor {
            size: size_of::<GcBox<T>>(),
            align: align_of::<GcBox<T>>(),
            traceable: false,
            trace: noop_trace,
            drop_and_free: drop_and_free_impl::<T>,
            finalize: None,
        };
    }
    &Holder::<T>::DESCRIPTOR
}

/// Opaque handle to an in-construction object's own header, handed to the builder closure
/// passed to [`crate::root::Root::make_with`] so a custom [`crate::trace::Trace`] type can bind
/// its [`crate::field::Field`] members to their owning parent before the object is reachable
/// from anywhere else (§4.6). Mutator code cannot inspect or dereference this handle directly;
/// it exists only to be threaded straight into `Field::new`.
#[derive(Clone, Copy, Debug)]
pub struct Parent(pub(crate) *const ObjectHeader);

/// Fixed metadata prefixed to every managed allocation.
///
/// See §3 of the design spec for the invariants this type enforces: a live object is WHITE at
/// rest, GRAY iff present in some segment's work list, BLACK iff marked reachable and fully
/// scanned; a root always has `root_refs > 0` and a registered `root_cursor`.
#[repr(C)]
pub(crate) struct ObjectHeader {
    pub(crate) color: AtomicU8,
    pub(crate) alive: AtomicBool,
    pub(crate) segment_idx: usize,
    pub(crate) root_refs: AtomicUsize,
    pub(crate) root_cursor: Mutex<Option<usize>>,
    pub(crate) next: AtomicPtr<ObjectHeader>,
    pub(crate) descriptor: &'static Descriptor,
    /// Type-erased back-reference to the owning `GarbageCollector`, set once by
    /// `GarbageCollector::allocate_with` right after the header is written. Lets the write
    /// barrier (`Field::set`) reach the collector straight off the header it already has to
    /// dereference, instead of taking the process-global heap lock on every assignment. Null
    /// until the collector sets it; always non-null for any header a live mutator can observe.
    pub(crate) collector: AtomicPtr<()>,
}

impl ObjectHeader {
    pub(crate) fn new(segment_idx: usize, descriptor: &'static Descriptor) -> Self {
        Self {
            color: AtomicU8::new(Color::WHITE.bits()),
            alive: AtomicBool::new(true),
            segment_idx,
            root_refs: AtomicUsize::new(0),
            root_cursor: Mutex::new(None),
            next: AtomicPtr::new(std::ptr::null_mut()),
            descriptor,
            collector: AtomicPtr::new(std::ptr::null_mut()),
        }
    }

    /// Records the owning collector so the write barrier can reach it without a global lock.
    pub(crate) fn set_collector(&self, collector: *const ()) {
        self.collector.store(collector.cast_mut(), Ordering::Release);
    }

    /// Returns the owning collector's type-erased pointer, or null if never set (true only for
    /// headers built directly in unit tests, bypassing `GarbageCollector::allocate_with`).
    pub(crate) fn collector_ptr(&self) -> *const () {
        self.collector.load(Ordering::Acquire)
    }

    pub(crate) fn color(&self) -> Color {
        Color::from_bits_truncate(self.color.load(Ordering::Acquire))
    }

    pub(crate) fn set_color(&self, color: Color) {
        self.color.store(color.bits(), Ordering::Release);
    }

    /// Atomically transitions WHITE→GRAY. Returns `true` iff this call performed the transition,
    /// guaranteeing an object is ever enqueued for scanning exactly once per cycle.
    pub(crate) fn try_shade(&self) -> bool {
        self.color
            .compare_exchange(
                Color::WHITE.bits(),
                Color::GRAY.bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub(crate) fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Release);
    }

    pub(crate) fn is_root(&self) -> bool {
        self.root_refs.load(Ordering::Acquire) > 0
    }

    /// Increments the root-reference count and returns the new value.
    pub(crate) fn inc_root_refs(&self) -> usize {
        self.root_refs.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Decrements the root-reference count and returns the new value.
    pub(crate) fn dec_root_refs(&self) -> usize {
        self.root_refs.fetch_sub(1, Ordering::AcqRel) - 1
    }

    pub(crate) fn set_root_cursor(&self, cursor: usize) {
        *self.root_cursor.lock() = Some(cursor);
    }

    /// Clears and returns the stored root-set cursor, if any.
    pub(crate) fn take_root_cursor(&self) -> Option<usize> {
        self.root_cursor.lock().take()
    }

    pub(crate) fn size(&self) -> usize {
        self.descriptor.size
    }

    pub(crate) fn traceable(&self) -> bool {
        self.descriptor.traceable
    }
}

/// A managed allocation: the fixed header followed by the mutator's payload.
///
/// `repr(C)` guarantees `header` is the first field, so a `*const ObjectHeader` obtained from a
/// `*const GcBox<T>` (or vice versa) is a valid reinterpretation of the same address.
#[repr(C)]
pub(crate) struct GcBox<T: ?Sized> {
    pub(crate) header: ObjectHeader,
    pub(crate) data: T,
}

impl<T> GcBox<T> {
    pub(crate) fn new(segment_idx: usize, data: T, descriptor: &'static Descriptor) -> Self {
        Self {
            header: ObjectHeader::new(segment_idx, descriptor),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;
    impl Trace for Noop {
        fn trace(&self, _ctx: &mut TraceContext<'_>) {}
    }

    #[test]
    fn new_object_is_white_and_alive() {
        let descriptor = descriptor_of::<Noop>();
        let header = ObjectHeader::new(0, descriptor);
        assert_eq!(header.color(), Color::WHITE);
        assert!(header.is_alive());
        assert!(!header.is_root());
    }

    #[test]
    fn try_shade_transitions_once() {
        let descriptor = descriptor_of::<Noop>();
        let header = ObjectHeader::new(0, descriptor);
        assert!(header.try_shade());
        assert_eq!(header.color(), Color::GRAY);
        // Second attempt is a no-op: already non-WHITE.
        assert!(!header.try_shade());
    }

    #[test]
    fn color_round_trip() {
        let descriptor = descriptor_of::<Noop>();
        let header = ObjectHeader::new(0, descriptor);
        header.set_color(Color::BLACK);
        assert_eq!(header.color(), Color::BLACK);
    }
}
