//! Finalizer support for managed objects.

/// Trait for objects that need custom finalization before being dropped.
///
/// A type implementing this trait alongside [`crate::trace::Trace`] has `finalize` called by the
/// sweeper immediately before its destructor runs. This is the only finalizer ordering the
/// collector provides (§1 Non-goals rule out anything more elaborate); `finalize` fires exactly
/// once per object, in whatever segment-sweep order the object happened to be swept in.
///
/// # Safety
///
/// `finalize` must not:
/// - dereference other managed objects (they may already be finalized or freed this cycle),
/// - allocate a new managed object,
/// - block or run long (it executes inside the sweep, blocking that segment's sweep/mutators),
/// - panic (the sweeper treats a panic here as an invariant violation and aborts).
pub trait Finalize {
    /// Runs cleanup immediately before the object's memory is reclaimed.
    fn finalize(&self);
}
