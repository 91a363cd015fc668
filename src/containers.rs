//! Managed container primitives built on [`Field`]: fixed arrays, a growable vector, and a
//! chained-bucket hash map (§4.7), plus [`Boxed`] and [`Adapter`], the two wrappers that make a
//! non-traceable payload into a manageable object (§2.1, supplemented from the original's
//! `Boxed<T>` / `Adaptor<T>`).

use crate::collector::{self, GarbageCollector};
use crate::error::{Error, Result};
use crate::field::Field;
use crate::gc::Ref;
use crate::header::{descriptor_of, opaque_descriptor_of, ObjectHeader, Parent};
use crate::root::Root;
use crate::trace::{Trace, TraceContext};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

// ---- Boxed / Adapter ------------------------------------------------------------------------

/// Wraps a non-class payload (a primitive, or any `T` with no managed fields of its own) so it
/// can be allocated on the GC heap without implementing [`Trace`] itself.
///
/// The header's descriptor marks a `Boxed<T>` non-traceable (`opaque_descriptor_of`), so `shade`
/// promotes it straight to BLACK and it is never pushed onto a work list — matching the original
/// `Boxed<T>`'s empty `trace` override, but skipping the no-op scan entirely rather than merely
/// making it cheap.
#[repr(transparent)]
pub struct Boxed<T>(T);

impl<T> Boxed<T> {
    fn new(value: T) -> Self {
        Self(value)
    }
}

impl<T> std::ops::Deref for Boxed<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> std::ops::DerefMut for Boxed<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> Trace for Boxed<T> {
    fn trace(&self, _ctx: &mut TraceContext<'_>) {}
}

impl<T: std::fmt::Debug> std::fmt::Debug for Boxed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Boxed").field(&self.0).finish()
    }
}

impl<T: Send + Sync + 'static> Root<Boxed<T>> {
    /// Allocates `value` as an opaque, non-traceable managed object and roots it.
    #[must_use]
    pub fn make_boxed(value: T) -> Self {
        let collector = collector::current();
        let header = collector.allocate_opaque(Boxed::new(value), None);
        Self::from_header(collector, header.cast_const())
    }
}

/// Makes an arbitrary non-traceable `T` a managed object without `T` itself owning any `Ref`/
/// `Field` edges — the counterpart to the original's `Adaptor<T>`, which achieved the same thing
/// by inheriting from `T` rather than wrapping it. Functionally identical to [`Boxed`] in this
/// port; kept as a distinct type so call sites can express intent ("adapting an existing type"
/// vs. "boxing a value").
#[repr(transparent)]
pub struct Adapter<T>(T);

impl<T> Adapter<T> {
    fn new(value: T) -> Self {
        Self(value)
    }
}

impl<T> std::ops::Deref for Adapter<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> std::ops::DerefMut for Adapter<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> Trace for Adapter<T> {
    fn trace(&self, _ctx: &mut TraceContext<'_>) {}
}

impl<T: std::fmt::Debug> std::fmt::Debug for Adapter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Adapter").field(&self.0).finish()
    }
}

impl<T: Send + Sync + 'static> Root<Adapter<T>> {
    /// Allocates `value` as an adapted, non-traceable managed object and roots it.
    #[must_use]
    pub fn make_adapter(value: T) -> Self {
        let collector = collector::current();
        let header = collector.allocate_opaque(Adapter::new(value), None);
        Self::from_header(collector, header.cast_const())
    }
}

// ---- Array -----------------------------------------------------------------------------------

/// A fixed-length managed array of `Field<T>` slots (§4.7).
///
/// Contributes exactly `n` field slots to tracing, one per element; grounded in the original's
/// `GcArray<T>`, whose elements are likewise `Member<T>` bound to the array itself as parent.
pub struct Array<T> {
    slots: Box<[Field<T>]>,
}

impl<T> Array<T> {
    pub(crate) fn new(parent: *const ObjectHeader, len: usize) -> Self {
        let slots = (0..len).map(|_| Field::new(Parent(parent))).collect::<Vec<_>>().into_boxed_slice();
        Self { slots }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the element at `idx`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<Ref<T>> {
        self.slots.get(idx).map(Field::get)
    }

    /// Returns the element at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len()`.
    #[must_use]
    pub fn index(&self, idx: usize) -> Ref<T> {
        self.get(idx)
            .unwrap_or_else(|| panic!("index {idx} out of bounds for length {}", self.len()))
    }

    /// Assigns the element at `idx`, running the write barrier.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len()`.
    pub fn set(&self, idx: usize, value: Ref<T>) {
        self.slots[idx].set(value);
    }

    /// Clears the element at `idx`, as if assigned a null reference.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len()`.
    pub fn clear(&self, idx: usize) {
        self.slots[idx].clear();
    }
}

impl<T> std::fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Array").field("len", &self.slots.len()).finish()
    }
}

impl<T> Trace for Array<T> {
    fn trace(&self, ctx: &mut TraceContext<'_>) {
        for slot in &self.slots {
            slot.trace(ctx);
        }
    }
}

impl<T: Send + Sync + 'static> Root<Array<T>> {
    /// Allocates a fixed-length array of `len` empty `Field<T>` slots and roots it.
    #[must_use]
    pub fn make_array(len: usize) -> Self {
        let collector = collector::current();
        let header =
            collector.allocate_with(descriptor_of::<Array<T>>(), None, move |parent| Array::new(parent, len));
        Self::from_header(collector, header.cast_const())
    }
}

// ---- Vector ------------------------------------------------------------------------------------

/// A growable managed vector: owns a `Field<Array<T>>` backing store and a size (§4.7).
///
/// Capacity doubles on growth with a floor of 16, matching the original's `GcVector::ensure_size`.
/// `pop_back` clears the vacated slot so the reference is dropped promptly rather than lingering
/// as a phantom root of whatever was last stored there.
pub struct Vector<T> {
    data: Field<Array<T>>,
    size: AtomicUsize,
}

impl<T> Vector<T> {
    pub(crate) fn new(parent: *const ObjectHeader) -> Self {
        Self {
            data: Field::new(Parent(parent)),
            size: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        let data = self.data.get();
        if data.is_null() {
            0
        } else {
            data.len()
        }
    }

    fn grow_to(&self, needed: usize) {
        let capacity = self.capacity();
        if needed <= capacity {
            return;
        }
        let new_capacity = capacity.max(16).max(capacity * 2).max(needed);
        let new_data = Root::<Array<T>>::make_array(new_capacity);
        let old_data = self.data.get();
        if !old_data.is_null() {
            for i in 0..self.len() {
                if let Some(value) = old_data.get(i) {
                    new_data.set(i, value);
                }
            }
        }
        self.data.set(new_data.as_ref());
    }

    /// Appends `value`, growing the backing array first if it is at capacity.
    pub fn push_back(&self, value: Ref<T>) {
        let size = self.len();
        self.grow_to(size + 1);
        self.data.get().set(size, value);
        self.size.store(size + 1, Ordering::Release);
    }

    /// Removes and returns the last element, clearing its slot so the reference does not linger.
    pub fn pop_back(&self) -> Option<Ref<T>> {
        let size = self.len();
        let new_size = size.checked_sub(1)?;
        let data = self.data.get();
        let value = data.get(new_size);
        data.clear(new_size);
        self.size.store(new_size, Ordering::Release);
        value
    }

    /// Returns the element at `idx`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<Ref<T>> {
        if idx >= self.len() {
            return None;
        }
        self.data.get().get(idx)
    }

    /// Returns the element at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len()`.
    #[must_use]
    pub fn index(&self, idx: usize) -> Ref<T> {
        self.get(idx)
            .unwrap_or_else(|| panic!("index {idx} out of bounds for length {}", self.len()))
    }

    /// Returns the element at `idx`, or [`Error::IndexOutOfBounds`] if `idx >= self.len()`.
    ///
    /// For callers that would rather propagate an out-of-bounds access than panic, e.g. when the
    /// index comes from untrusted input rather than a loop bound the caller controls.
    pub fn try_index(&self, idx: usize) -> Result<Ref<T>> {
        self.get(idx).ok_or(Error::IndexOutOfBounds { index: idx, len: self.len() })
    }

    /// Assigns the element at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len()`.
    pub fn set(&self, idx: usize, value: Ref<T>) {
        assert!(idx < self.len(), "index {idx} out of bounds for length {}", self.len());
        self.data.get().set(idx, value);
    }
}

impl<T> std::fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vector")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl<T> Trace for Vector<T> {
    fn trace(&self, ctx: &mut TraceContext<'_>) {
        self.data.trace(ctx);
    }
}

impl<T: Send + Sync + 'static> Root<Vector<T>> {
    /// Allocates an empty vector and roots it.
    #[must_use]
    pub fn make_vector() -> Self {
        let collector = collector::current();
        let header = collector.allocate_with(descriptor_of::<Vector<T>>(), None, Vector::new);
        Self::from_header(collector, header.cast_const())
    }
}

// ---- HashMap -----------------------------------------------------------------------------------

/// One chain link in a [`HashMap`]'s bucket: a key, a value, and the next bucket in the chain.
struct Bucket<K, V> {
    key: Field<K>,
    value: Field<V>,
    next: Field<Bucket<K, V>>,
}

impl<K, V> Bucket<K, V> {
    fn new(parent: *const ObjectHeader) -> Self {
        Self {
            key: Field::new(Parent(parent)),
            value: Field::new(Parent(parent)),
            next: Field::new(Parent(parent)),
        }
    }
}

impl<K, V> Trace for Bucket<K, V> {
    fn trace(&self, ctx: &mut TraceContext<'_>) {
        self.key.trace(ctx);
        self.value.trace(ctx);
        self.next.trace(ctx);
    }
}

impl<K: Send + Sync + 'static, V: Send + Sync + 'static> Root<Bucket<K, V>> {
    fn make_bucket(key: Ref<K>, value: Ref<V>, next: Ref<Bucket<K, V>>) -> Self {
        let collector = collector::current();
        let header = collector.allocate_with(descriptor_of::<Bucket<K, V>>(), None, move |parent| {
            let bucket = Bucket::new(parent);
            bucket.key.set(key);
            bucket.value.set(value);
            bucket.next.set(next);
            bucket
        });
        Self::from_header(collector, header.cast_const())
    }
}

const INITIAL_BUCKET_COUNT: usize = 16;
const MAX_LOAD_FACTOR: f64 = 0.75;

/// A chained-bucket managed hash map (§4.7): owns an array of bucket-chain heads, rehashing when
/// the load factor exceeds 0.75. Iteration visits entries in bucket order, not insertion order.
///
/// Keys and values are themselves managed objects (`Ref<K>` / `Ref<V>`): a `HashMap<K, V>` maps
/// one managed reference to another, the same way `GcHashMap<K, V>` does in the original.
pub struct HashMap<K, V> {
    buckets: Field<Array<Bucket<K, V>>>,
    count: AtomicUsize,
}

impl<K, V> HashMap<K, V> {
    pub(crate) fn new(parent: *const ObjectHeader) -> Self {
        Self {
            buckets: Field::new(Parent(parent)),
            count: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bucket_count(&self) -> usize {
        let buckets = self.buckets.get();
        if buckets.is_null() {
            0
        } else {
            buckets.len()
        }
    }
}

impl<K: Trace + Hash + Eq + Send + Sync + 'static, V: Trace + Send + Sync + 'static> HashMap<K, V> {
    fn hash_index(key: &K, bucket_count: usize) -> usize {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % bucket_count
    }

    fn ensure_initialized(&self) {
        if self.bucket_count() == 0 {
            let initial = Root::<Array<Bucket<K, V>>>::make_array(INITIAL_BUCKET_COUNT);
            self.buckets.set(initial.as_ref());
        }
    }

    fn load_factor_exceeded(&self) -> bool {
        let bucket_count = self.bucket_count();
        bucket_count > 0 && (self.len() + 1) as f64 / bucket_count as f64 > MAX_LOAD_FACTOR
    }

    /// Rebuilds the bucket array at double its current size, relinking every existing bucket into
    /// its new chain rather than reallocating bucket objects.
    fn rehash(&self) {
        let old_count = self.bucket_count();
        let new_count = (old_count.max(INITIAL_BUCKET_COUNT / 2)) * 2;
        let new_buckets = Root::<Array<Bucket<K, V>>>::make_array(new_count);
        let old_buckets = self.buckets.get();
        for idx in 0..old_count {
            let Some(mut current) = old_buckets.get(idx) else {
                continue;
            };
            while !current.is_null() {
                let next = current.next.get();
                let new_idx = Self::hash_index(&current.key.get(), new_count);
                let new_head = new_buckets.get(new_idx).unwrap_or_else(Ref::null);
                current.next.set(new_head);
                new_buckets.set(new_idx, current);
                current = next;
            }
        }
        self.buckets.set(new_buckets.as_ref());
    }

    fn find(&self, key: &K) -> Option<Ref<Bucket<K, V>>> {
        let bucket_count = self.bucket_count();
        if bucket_count == 0 {
            return None;
        }
        let idx = Self::hash_index(key, bucket_count);
        let mut current = self.buckets.get().get(idx).unwrap_or_else(Ref::null);
        while !current.is_null() {
            if &*current.key.get() == key {
                return Some(current);
            }
            current = current.next.get();
        }
        None
    }

    /// Inserts or updates the mapping from `key` to `value`.
    pub fn insert(&self, key: Ref<K>, value: Ref<V>) {
        self.ensure_initialized();
        if let Some(existing) = self.find(&key) {
            existing.value.set(value);
            return;
        }
        if self.load_factor_exceeded() {
            self.rehash();
        }
        let bucket_count = self.bucket_count();
        let idx = Self::hash_index(&key, bucket_count);
        let head = self.buckets.get().get(idx).unwrap_or_else(Ref::null);
        let bucket = Root::<Bucket<K, V>>::make_bucket(key, value, head);
        self.buckets.get().set(idx, bucket.as_ref());
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    /// Looks up `key`, returning its value if present.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<Ref<V>> {
        self.find(key).map(|bucket| bucket.value.get())
    }

    /// Looks up `key`, surfacing a key-miss via the crate's failure idiom (§7) rather than
    /// `Option`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if `key` is not present.
    pub fn at(&self, key: &K) -> Result<Ref<V>> {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns every `(key, value)` pair, visited in bucket order.
    #[must_use]
    pub fn iter(&self) -> Vec<(Ref<K>, Ref<V>)> {
        let mut out = Vec::with_capacity(self.len());
        let bucket_count = self.bucket_count();
        for idx in 0..bucket_count {
            let Some(mut current) = self.buckets.get().get(idx) else {
                continue;
            };
            while !current.is_null() {
                out.push((current.key.get(), current.value.get()));
                current = current.next.get();
            }
        }
        out
    }
}

impl<K, V> std::fmt::Debug for HashMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashMap").field("len", &self.len()).finish()
    }
}

impl<K, V> Trace for HashMap<K, V> {
    fn trace(&self, ctx: &mut TraceContext<'_>) {
        self.buckets.trace(ctx);
    }
}

impl<K: Trace + Hash + Eq + Send + Sync + 'static, V: Trace + Send + Sync + 'static> Root<HashMap<K, V>> {
    /// Allocates an empty hash map and roots it.
    #[must_use]
    pub fn make_hashmap() -> Self {
        let collector = collector::current();
        let header = collector.allocate_with(descriptor_of::<HashMap<K, V>>(), None, HashMap::new);
        Self::from_header(collector, header.cast_const())
    }
}
