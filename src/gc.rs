//! `Ref<T>`: the transient, non-owning reference to a managed object.

use crate::header::{GcBox, ObjectHeader};
use std::marker::PhantomData;

/// A bare, trivially-copyable reference to a managed object.
///
/// `Ref<T>` does not participate in the root set and keeps nothing alive on its own — it is only
/// sound to hold while some [`crate::root::Root`] (or an owning [`crate::field::Field`]) keeps the
/// target reachable. Never store a `Ref<T>` inside a managed object directly; use a `Field<T>`.
pub struct Ref<T> {
    header: *const ObjectHeader,
    _marker: PhantomData<*const T>,
}

impl<T> Ref<T> {
    pub(crate) fn new(header: *const ObjectHeader) -> Self {
        Self {
            header,
            _marker: PhantomData,
        }
    }

    pub(crate) fn null() -> Self {
        Self {
            header: std::ptr::null(),
            _marker: PhantomData,
        }
    }

    pub(crate) fn is_null(&self) -> bool {
        self.header.is_null()
    }

    pub(crate) fn header(&self) -> *const ObjectHeader {
        self.header
    }

    fn gcbox(&self) -> *const GcBox<T> {
        self.header.cast::<GcBox<T>>()
    }

    fn assert_alive(&self) {
        if self.header.is_null() {
            return;
        }
        // Safety: a live `Ref<T>` always points at an allocation that has not yet been freed;
        // callers never retain one past the end of the scope that keeps it reachable.
        let alive = unsafe { (*self.header).is_alive() };
        debug_assert!(alive, "dereferenced a dangling Ref<T>");
    }
}

impl<T> std::ops::Deref for Ref<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.assert_alive();
        assert!(!self.header.is_null(), "dereferenced a null Ref<T>");
        // Safety: `assert_alive` checked liveness above (debug builds); the header's layout
        // guarantees `data` follows immediately per `GcBox<T>`'s `repr(C)` definition.
        unsafe { &(*self.gcbox()).data }
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Ref<T> {}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header
    }
}

impl<T> Eq for Ref<T> {}

impl<T> std::fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ref").field("header", &self.header).finish()
    }
}

// Safety: a `Ref<T>` is a bare address; it carries no borrow of thread-local state, and the
// pointee's own `T: Send + Sync` bound (enforced at allocation time) governs safe concurrent
// access to the data it refers to.
unsafe impl<T: Send + Sync> Send for Ref<T> {}
unsafe impl<T: Send + Sync> Sync for Ref<T> {}
