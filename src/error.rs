//! Error handling for the collector.
//!
//! Per §7, most failure conditions in this crate are fatal by design — a collector is not the
//! place to paper over a broken invariant — and are reported via `panic!`/`assert!` rather than
//! `Result`. This module's [`Error`] enum covers the subset of conditions that are recoverable
//! enough to be worth returning to a caller: lock poisoning, heap lifecycle misuse, and container
//! key-miss.

use std::sync::PoisonError;

/// Collector result type.
///
/// Alias for [`core::result::Result`] defaulting the error type to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors that can occur during heap lifecycle management and container access.
///
/// Conditions more serious than these — a GRAY object surviving to sweep, a root pointing to
/// WHITE, out-of-memory after a forced cycle — are invariant violations and abort the process
/// immediately (§7) rather than appearing here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A lock guarding heap state was poisoned by a panicking thread.
    #[error("failed to acquire lock: {0}")]
    LockError(String),
    /// `init` was called while a heap was already installed, or `destroy` while none was.
    #[error("garbage collector heap lifecycle error: {0}")]
    LifecycleError(String),
    /// The dedicated collector thread for concurrent mode failed to start or join cleanly.
    #[error("collector thread error: {0}")]
    ThreadError(String),
    /// A `HashMap::at`-style lookup found no entry for the given key.
    #[error("key not found")]
    KeyNotFound,
    /// An indexed container access was out of bounds.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The container's length at the time of the access.
        len: usize,
    },
}

impl<T> From<PoisonError<T>> for Error {
    fn from(error: PoisonError<T>) -> Self {
        Error::LockError(format!("poisoned lock: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_poison_error() {
        let poison_error: PoisonError<()> = PoisonError::new(());
        let error: Error = poison_error.into();
        assert!(matches!(error, Error::LockError(_)));
    }

    #[test]
    fn key_not_found_displays() {
        assert_eq!(Error::KeyNotFound.to_string(), "key not found");
    }

    #[test]
    fn index_out_of_bounds_displays() {
        let error = Error::IndexOutOfBounds { index: 5, len: 3 };
        assert_eq!(error.to_string(), "index 5 out of bounds for length 3");
    }
}
