//! # chromagc
//!
//! A tracing garbage collector embedded as a library, built around a single unified
//! mark-and-sweep core offering three interchangeable collection policies — stop-the-world,
//! incremental, and concurrent — over the same tri-color algorithm, optionally parallelised
//! across worker threads.
//!
//! ## Overview
//!
//! The collector manages a heap of dynamically allocated, possibly cyclic object graphs on
//! behalf of mutator code that holds typed handles to managed objects:
//!
//! - [`Root<T>`] — an owning, ref-counted stack handle; the collector's entry points into the
//!   live object graph.
//! - [`Ref<T>`] — a transient, `Copy` reference, valid only while some root keeps its target
//!   alive.
//! - [`Field<T>`] — a heap-interior reference bound to its owning object, whose [`Field::set`]
//!   runs the Dijkstra insertion write barrier.
//!
//! Managed containers ([`containers::Array`], [`containers::Vector`], [`containers::HashMap`])
//! are built from these three handles, and [`containers::Boxed`]/[`containers::Adapter`] adapt
//! non-traceable payloads into the same allocation path without ever enqueuing them for
//! scanning.
//!
//! A separate [`rc`] module provides a plain reference-counted comparator sharing the same
//! handle vocabulary, for benchmarks and callers that want no tracing at all; it never touches
//! the collector and does not handle cycles.
//!
//! ## Tri-color marking
//!
//! Objects are classified into three colors:
//!
//! - **White**: unreachable (so far), candidates for reclamation.
//! - **Gray**: reachable, but not yet fully scanned.
//! - **Black**: reachable and fully scanned.
//!
//! A cycle scans roots gray, drains the resulting work list (graying each object's outgoing
//! references and turning the scanned object black), and then sweeps every object still white.
//! The insertion write barrier on [`Field::set`] — shading a newly-stored reference when its
//! parent is already black — keeps this invariant sound while mutators run concurrently with
//! marking.
//!
//! ## Collection policies
//!
//! [`Configuration::mode`] selects one of [`CollectionMode::StopTheWorld`],
//! [`CollectionMode::Incremental`] (the default — a bounded amount of marking work runs on the
//! allocating thread, paced by [`Configuration::incremental_step_size`]), or
//! [`CollectionMode::Concurrent`] (a dedicated collector thread marks and sweeps alongside
//! mutators, handshaking through an atomic-marking pause before each sweep).
//!
//! ## Getting started
//!
//! ```
//! use chromagc::{init, destroy, Configuration, Root};
//!
//! # fn main() -> chromagc::Result<()> {
//! init(Configuration::default())?;
//! let root = Root::make(42i64);
//! assert_eq!(*root, 42);
//! drop(root);
//! destroy()?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::pedantic)]
#![deny(clippy::unwrap_in_result)]
#![deny(clippy::unwrap_used)]

mod chunk;
mod collector;
mod config;
pub mod containers;
mod error;
mod field;
mod finalizer;
mod gc;
mod header;
mod pointers;
pub mod rc;
mod root;
mod roots;
mod segment;
mod trace;

pub use collector::{collect, destroy, init, statistics};
pub use config::{CollectionMode, Configuration, DurationStats, Statistics};
pub use error::{Error, Result};
pub use field::Field;
pub use finalizer::Finalize;
pub use gc::Ref;
pub use header::Parent;
pub use root::Root;
pub use trace::{Trace, TraceContext};
