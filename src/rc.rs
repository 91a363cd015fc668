//! `Rc<T>`: a reference-counted comparator sharing the GC handles' API shape (§4.8).
//!
//! This module never touches [`crate::collector`]: it exists so benchmarks and external
//! collaborators that don't want tracing have a drop-in with the same shape as `Root`/`Ref`/
//! `Field` — a cyclic graph built from `Rc` alone will simply leak, which is the point of the
//! comparison.

use std::cell::Cell;
use std::fmt;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
use std::sync::Arc;

/// A counting policy for [`Rc`]: non-atomic for single-threaded use, atomic for cross-thread
/// sharing. Mirrors the original's `RefCounter` / `AtomicRefCounter`.
pub trait RcCounter {
    fn new() -> Self;
    fn inc(&self);
    /// Decrements the count and returns the post-decrement value.
    fn dec(&self) -> usize;
    fn get(&self) -> usize;
}

/// Single-threaded, non-atomic counter. The default policy for [`Rc`].
#[derive(Debug, Default)]
pub struct NonAtomicCounter(Cell<usize>);

impl RcCounter for NonAtomicCounter {
    fn new() -> Self {
        Self(Cell::new(1))
    }

    fn inc(&self) {
        self.0.set(self.0.get() + 1);
    }

    fn dec(&self) -> usize {
        let next = self.0.get() - 1;
        self.0.set(next);
        next
    }

    fn get(&self) -> usize {
        self.0.get()
    }
}

/// Cross-thread atomic counter, for sharing an `Rc` across threads without tracing.
#[derive(Debug, Default)]
pub struct AtomicCounter(AtomicUsize);

impl RcCounter for AtomicCounter {
    fn new() -> Self {
        Self(AtomicUsize::new(1))
    }

    fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    fn dec(&self) -> usize {
        self.0.fetch_sub(1, Ordering::Relaxed) - 1
    }

    fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

struct ControlBlock<T, C: RcCounter> {
    value: T,
    count: C,
}

/// A reference-counted handle with the same `new`/Deref/Clone shape as [`crate::root::Root`],
/// but backed by plain counting instead of tracing (§4.8). Dropping the last handle frees the
/// value immediately; a cycle of `Rc`s never does.
pub struct Rc<T, C: RcCounter = NonAtomicCounter> {
    control: NonNull<ControlBlock<T, C>>,
}

impl<T, C: RcCounter> Rc<T, C> {
    #[must_use]
    pub fn new(value: T) -> Self {
        let boxed = Box::new(ControlBlock {
            value,
            count: C::new(),
        });
        Self {
            control: NonNull::from(Box::leak(boxed)),
        }
    }

    /// Constructs a value that can later hand out further handles to itself through an
    /// embedded [`RcFromThis`] (mirrors the original's `RcFromThis` back-pointer). `back_ref`
    /// is wired up to the new control block immediately after `build` returns; `build` itself
    /// may stash a clone of `back_ref` into the value but must not call
    /// [`RcFromThis::rc_from_this`] before construction completes.
    pub fn new_with_back_ref(back_ref: &RcFromThis<T, C>, build: impl FnOnce() -> T) -> Self {
        let value = build();
        let boxed = Box::new(ControlBlock {
            value,
            count: C::new(),
        });
        let control = NonNull::from(Box::leak(boxed));
        back_ref.control.store(control.as_ptr(), Ordering::Release);
        Self { control }
    }

    #[must_use]
    pub fn strong_count(&self) -> usize {
        // Safety: `control` stays valid for the lifetime of every `Rc` sharing it.
        unsafe { self.control.as_ref().count.get() }
    }
}

impl<T, C: RcCounter> Deref for Rc<T, C> {
    type Target = T;

    fn deref(&self) -> &T {
        // Safety: see `strong_count`.
        unsafe { &self.control.as_ref().value }
    }
}

impl<T, C: RcCounter> Clone for Rc<T, C> {
    fn clone(&self) -> Self {
        // Safety: see `strong_count`.
        unsafe { self.control.as_ref().count.inc() };
        Self {
            control: self.control,
        }
    }
}

impl<T, C: RcCounter> Drop for Rc<T, C> {
    fn drop(&mut self) {
        // Safety: `count.dec()` returning 0 means this was the last handle; nothing else can
        // observe `control` afterwards.
        unsafe {
            if self.control.as_ref().count.dec() == 0 {
                drop(Box::from_raw(self.control.as_ptr()));
            }
        }
    }
}

impl<T: fmt::Debug, C: RcCounter> fmt::Debug for Rc<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rc")
            .field("value", &**self)
            .field("strong_count", &self.strong_count())
            .finish()
    }
}

// Safety: a `Rc<T, C>` behaves like a shared owner of `T`; sending or sharing it across threads
// is sound exactly when `T` itself would be (and, for the atomic policy, the counter already is).
unsafe impl<T: Send + Sync, C: RcCounter + Send + Sync> Send for Rc<T, C> {}
unsafe impl<T: Send + Sync, C: RcCounter + Send + Sync> Sync for Rc<T, C> {}

/// A back-reference mixin letting a value embedded inside an [`Rc`]'s control block hand out
/// further strong handles to itself (mirrors the original's `RcFromThis`).
///
/// Embed one as a field, construct the owning value through [`Rc::new_with_back_ref`], and
/// store a clone of the same `RcFromThis` into the field during `build` — all clones share the
/// same back-pointer cell, so [`rc_from_this`](Self::rc_from_this) works from any method on the
/// value once construction has completed.
pub struct RcFromThis<T, C: RcCounter = NonAtomicCounter> {
    control: Arc<AtomicPtr<ControlBlock<T, C>>>,
}

impl<T, C: RcCounter> RcFromThis<T, C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            control: Arc::new(AtomicPtr::new(std::ptr::null_mut())),
        }
    }

    /// Returns a new strong handle sharing this object's control block.
    ///
    /// # Panics
    /// Panics if called before the owning [`Rc`] has finished construction via
    /// [`Rc::new_with_back_ref`] — mirrors the original's `std::abort()` on a null control
    /// block.
    #[must_use]
    pub fn rc_from_this(&self) -> Rc<T, C> {
        let ptr = self.control.load(Ordering::Acquire);
        let control =
            NonNull::new(ptr).expect("RcFromThis used before Rc::new_with_back_ref completed");
        // Safety: a non-null pointer here was stored by `Rc::new_with_back_ref` and the
        // control block it names outlives every handle sharing it.
        unsafe { control.as_ref().count.inc() };
        Rc { control }
    }
}

impl<T, C: RcCounter> Clone for RcFromThis<T, C> {
    fn clone(&self) -> Self {
        Self {
            control: Arc::clone(&self.control),
        }
    }
}

impl<T, C: RcCounter> Default for RcFromThis<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: RcCounter> fmt::Debug for RcFromThis<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RcFromThis").finish_non_exhaustive()
    }
}

// Safety: the shared cell is an `Arc<AtomicPtr<_>>`; the pointee's thread-safety is governed by
// `Rc<T, C>`'s own Send/Sync impls, not by this handle.
unsafe impl<T: Send + Sync, C: RcCounter + Send + Sync> Send for RcFromThis<T, C> {}
unsafe impl<T: Send + Sync, C: RcCounter + Send + Sync> Sync for RcFromThis<T, C> {}

/// A field-of placeholder with the same API shape as [`crate::field::Field`], for use inside
/// types built on [`Rc`] instead of the tracing handles. There is no write barrier to run: the
/// slot just owns an `Rc` directly.
pub struct RcField<T, C: RcCounter = NonAtomicCounter> {
    slot: Cell<Option<Rc<T, C>>>,
}

impl<T, C: RcCounter> RcField<T, C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Cell::new(None),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        let current = self.slot.take();
        let empty = current.is_none();
        self.slot.set(current);
        empty
    }

    pub fn set(&self, value: Rc<T, C>) {
        self.slot.set(Some(value));
    }

    pub fn clear(&self) {
        self.slot.set(None);
    }

    /// Returns a clone of the current handle, if any.
    #[must_use]
    pub fn get(&self) -> Option<Rc<T, C>> {
        let current = self.slot.take();
        let result = current.clone();
        self.slot.set(current);
        result
    }
}

impl<T, C: RcCounter> Default for RcField<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, C: RcCounter> fmt::Debug for RcField<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.slot.take();
        let result = f.debug_struct("RcField").field("slot", &current).finish();
        self.slot.set(current);
        result
    }
}
