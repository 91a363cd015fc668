//! `Root<T>`: a scoped, ref-counted handle that keeps a managed object reachable.

use crate::collector::{self, GarbageCollector};
use crate::finalizer::Finalize;
use crate::gc::Ref;
use crate::header::{descriptor_of, Parent};
use crate::trace::Trace;
use std::sync::Arc;

/// A scoped root handle to a managed object.
///
/// Acquiring a `Root<T>` runs the root barrier (§4.4): the first `Root` referring to a given
/// object inserts it into the root set and shades it; the last one dropped removes it. The set of
/// live `Root`s defines the reachability roots for marking.
pub struct Root<T> {
    collector: Arc<GarbageCollector>,
    inner: Ref<T>,
}

impl<T: Trace + Send + Sync + 'static> Root<T> {
    /// Allocates a new managed object and immediately roots it.
    ///
    /// Equivalent to `new_object<T>` followed by rooting (§4.6); combines both so the object is
    /// never observably unrooted.
    #[must_use]
    pub fn make(value: T) -> Self {
        Self::make_in(value, None)
    }

    /// Like [`Root::make`], but routes the allocation to a specific segment.
    #[must_use]
    pub fn make_in(value: T, preferred_segment: Option<usize>) -> Self {
        let collector = collector::current();
        let header = collector.allocate(value, preferred_segment);
        Self::from_header(collector, header.cast_const())
    }

    pub(crate) fn from_header(collector: Arc<GarbageCollector>, header: *const crate::header::ObjectHeader) -> Self {
        collector.acquire_root(header);
        Self {
            collector,
            inner: Ref::new(header),
        }
    }

    /// Allocates a new managed object built from a [`Parent`] handle and immediately roots it.
    ///
    /// Use this instead of [`Root::make`] whenever `T` owns [`crate::field::Field`] members of
    /// its own: a `Field` must be bound to its parent's header at construction (§4.6), but that
    /// header does not exist until the allocation has been placed — `build` receives the
    /// in-progress object's own `Parent` handle precisely to break that chicken-and-egg ordering,
    /// the same way [`crate::containers::Array`] and [`crate::containers::Vector`] are built
    /// internally.
    #[must_use]
    pub fn make_with(build: impl FnOnce(Parent) -> T) -> Self {
        Self::make_with_in(build, None)
    }

    /// Like [`Root::make_with`], but routes the allocation to a specific segment.
    #[must_use]
    pub fn make_with_in(build: impl FnOnce(Parent) -> T, preferred_segment: Option<usize>) -> Self {
        let collector = collector::current();
        let header =
            collector.allocate_with(descriptor_of::<T>(), preferred_segment, move |parent| build(Parent(parent)));
        Self::from_header(collector, header.cast_const())
    }
}

impl<T: Trace + Finalize + Send + Sync + 'static> Root<T> {
    /// Like [`Root::make`], but for a type that also implements [`Finalize`]: its `finalize`
    /// method runs once, immediately before destruction, during the sweep that reclaims it.
    #[must_use]
    pub fn make_finalizable(value: T) -> Self {
        let collector = collector::current();
        let header = collector.allocate_finalizable(value, None);
        Self::from_header(collector, header.cast_const())
    }
}

impl<T> Root<T> {
    /// Returns a transient, non-owning reference to the rooted object.
    #[must_use]
    pub fn as_ref(&self) -> Ref<T> {
        self.inner
    }
}

impl<T> std::ops::Deref for Root<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> Clone for Root<T> {
    fn clone(&self) -> Self {
        self.collector.acquire_root(self.inner.header());
        Self {
            collector: Arc::clone(&self.collector),
            inner: self.inner,
        }
    }
}

impl<T> Drop for Root<T> {
    fn drop(&mut self) {
        self.collector.release_root(self.inner.header());
    }
}

impl<T> From<Root<T>> for Ref<T> {
    fn from(root: Root<T>) -> Self {
        root.inner
    }
}

impl<T> std::fmt::Debug for Root<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Root").field("ref", &self.inner).finish()
    }
}

// Safety: see `Ref<T>`; a `Root<T>` additionally owns an `Arc<GarbageCollector>`, which is itself
// `Send + Sync`.
unsafe impl<T: Send + Sync> Send for Root<T> {}
unsafe impl<T: Send + Sync> Sync for Root<T> {}
