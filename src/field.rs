//! `Field<T>`: a heap-interior managed reference equipped with the write barrier.

use crate::collector::GarbageCollector;
use crate::gc::Ref;
use crate::header::{Color, ObjectHeader, Parent};
use crate::trace::{Trace, TraceContext};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicPtr, Ordering};

/// A managed reference embedded inside another managed object.
///
/// `Field<T>` is non-copyable and non-movable: it is bound to its owning parent object at
/// construction (§4.6) and every assignment after that goes through [`Field::set`], which runs
/// the Dijkstra insertion write barrier (§4.3). Reads return a transient [`Ref<T>`].
pub struct Field<T> {
    target: AtomicPtr<ObjectHeader>,
    parent: *const ObjectHeader,
    _marker: PhantomData<*const T>,
}

impl<T> Field<T> {
    /// Creates an empty field bound to `parent`. Called from within a managed type's own
    /// constructor — see [`crate::root::Root::make_with`] — where `parent` is that object's own
    /// header, handed down before the object exists anywhere else.
    #[must_use]
    pub fn new(parent: Parent) -> Self {
        Self {
            target: AtomicPtr::new(std::ptr::null_mut()),
            parent: parent.0,
            _marker: PhantomData,
        }
    }

    /// Returns a transient reference to the current target, or a null `Ref` if empty.
    #[must_use]
    pub fn get(&self) -> Ref<T> {
        Ref::new(self.target.load(Ordering::Acquire).cast_const())
    }

    /// Assigns a new target, running the write barrier.
    ///
    /// On `field ← new_target` (§4.3): identical values are a no-op; otherwise the new value is
    /// stored, and if the barrier is active and this field's parent is BLACK, the new target is
    /// shaded. This is exactly Dijkstra's insertion barrier: it restores the tri-color invariant
    /// that a BLACK object never points at a WHITE one, immediately after the store that could
    /// have broken it.
    ///
    /// The common case — parent not BLACK — returns after a single atomic load and never touches
    /// the collector at all, let alone any global lock (§9 "write-barrier cost": O(1) and
    /// lock-free on the hot path).
    pub fn set(&self, new_target: Ref<T>) {
        let new_ptr = new_target.header().cast_mut();
        let old_ptr = self.target.swap(new_ptr, Ordering::AcqRel);
        if old_ptr == new_ptr {
            return;
        }
        if new_ptr.is_null() {
            return;
        }
        // Safety: `self.parent` is the header of the managed object this field lives inside,
        // which is alive for at least as long as `self` is (it owns `self`).
        let parent = unsafe { &*self.parent };
        if parent.color() != Color::BLACK {
            return;
        }
        let collector_ptr = parent.collector_ptr();
        if collector_ptr.is_null() {
            return;
        }
        // Safety: `collector_ptr` was recorded by `GarbageCollector::allocate_with` at the moment
        // this field's parent was allocated, pointing at the collector that owns it. The
        // collector always outlives every object it allocated — `destroy()` asserts the heap is
        // empty before the collector itself is ever dropped — so it is still live here.
        let collector = unsafe { &*collector_ptr.cast::<GarbageCollector>() };
        if !collector.barrier_active() {
            return;
        }
        collector.shade(new_ptr.cast_const());
    }

    /// Clears the field, as if assigned a null reference. No write barrier runs: removing an
    /// edge can never turn a BLACK object's existing WHITE target invisible — the target was
    /// already reachable through whatever shaded it, if anything did.
    pub fn clear(&self) {
        self.target.store(std::ptr::null_mut(), Ordering::Release);
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.target.load(Ordering::Acquire).is_null()
    }

    #[must_use]
    pub fn parent(&self) -> Parent {
        Parent(self.parent)
    }
}

impl<T> Trace for Field<T> {
    fn trace(&self, ctx: &mut TraceContext<'_>) {
        ctx.shade_header(self.target.load(Ordering::Acquire).cast_const());
    }
}

impl<T> PartialEq for Field<T> {
    fn eq(&self, other: &Self) -> bool {
        self.target.load(Ordering::Acquire) == other.target.load(Ordering::Acquire)
    }
}

impl<T> Eq for Field<T> {}

impl<T> PartialEq<Ref<T>> for Field<T> {
    fn eq(&self, other: &Ref<T>) -> bool {
        self.target.load(Ordering::Acquire).cast_const() == other.header()
    }
}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("target", &self.target.load(Ordering::Acquire))
            .field("parent", &self.parent)
            .finish()
    }
}

// Safety: see `Ref<T>`; `parent` is never dereferenced outside code that already holds a live
// reference to the owning object.
unsafe impl<T: Send + Sync> Send for Field<T> {}
unsafe impl<T: Send + Sync> Sync for Field<T> {}
