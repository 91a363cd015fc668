//! Thread-safe wrappers around raw object-header pointers.
//!
//! Work lists, root sets and segment object lists all need to move raw `*const ObjectHeader`
//! values between threads. The wrapper carries no more meaning than "an address the collector
//! knows is valid while a cycle is in progress" — all actual dereferencing happens under the
//! collector's own synchronization.

use crate::header::ObjectHeader;

/// A `Send + Sync` handle to an [`ObjectHeader`], used as the currency of work lists and the root
/// set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) struct HeaderPtr(pub(crate) *const ObjectHeader);

// Safety: `HeaderPtr` is never dereferenced outside of the collector's own mark/sweep/root
// routines, all of which hold the relevant per-segment or root-set lock before touching the
// pointee.
unsafe impl Send for HeaderPtr {}
unsafe impl Sync for HeaderPtr {}

impl HeaderPtr {
    pub(crate) fn new(ptr: *const ObjectHeader) -> Self {
        Self(ptr)
    }

    pub(crate) fn as_ptr(self) -> *const ObjectHeader {
        self.0
    }

    pub(crate) fn as_mut_ptr(self) -> *mut ObjectHeader {
        self.0.cast_mut()
    }

    /// # Safety
    ///
    /// The pointee must still be a live allocation.
    pub(crate) unsafe fn header(self) -> &'static ObjectHeader {
        // Safety: forwarded from the caller's contract; objects are never moved once allocated.
        unsafe { &*self.0 }
    }
}
