//! Segment-parallel marking and sweeping (spec §8 property 7: "parallel determinism of
//! survival" — the set of survivors at sweep time must not depend on worker count or
//! interleaving for the same mutator trace).

mod common;

use chromagc::containers::{Array, HashMap};
use chromagc::{collect, statistics, Field, Parent, Root, Trace, TraceContext};

struct Node {
    id: u32,
    next: Field<Node>,
}

impl Node {
    fn new(parent: Parent, id: u32) -> Self {
        Self { id, next: Field::new(parent) }
    }
}

impl Trace for Node {
    fn trace(&self, ctx: &mut TraceContext<'_>) {
        self.next.trace(ctx);
    }
}

/// Builds a 512-node chain rooted at its head, routed round-robin across whatever segments the
/// heap was configured with, then confirms every node survives a parallel cycle and every node
/// is reclaimed once unrooted — regardless of how many segments/workers did the work.
fn chain_survives_and_is_reclaimed(config: chromagc::Configuration) -> usize {
    common::with_heap(config, || {
        const LENGTH: u32 = 512;
        let head = Root::make_with(move |parent| Node::new(parent, 0));
        let mut tail = Root::clone(&head);
        for id in 1..LENGTH {
            let next = Root::make_with(move |parent| Node::new(parent, id));
            tail.next.set(next.as_ref());
            tail = next;
        }

        collect();
        let survivors = statistics().live_objects;
        assert_eq!(survivors, LENGTH as usize, "every node in the rooted chain must survive");

        drop(head);
        collect();
        assert_eq!(statistics().live_objects, 0, "an unrooted chain is fully reclaimed");
        survivors
    })
}

#[test_log::test]
fn single_segment_chain_survives_and_is_reclaimed() {
    chain_survives_and_is_reclaimed(common::stop_the_world());
}

#[test_log::test]
fn two_worker_chain_survives_and_is_reclaimed() {
    chain_survives_and_is_reclaimed(common::parallel_stop_the_world(2));
}

#[test_log::test]
fn four_worker_chain_survives_and_is_reclaimed() {
    chain_survives_and_is_reclaimed(common::parallel_stop_the_world(4));
}

/// Property 7: the same mutator trace produces the same survivor count whether it ran against
/// one segment or four, since routing and shading only ever affect which segment does the work,
/// never which objects are reachable.
#[test_log::test]
fn survivor_count_is_independent_of_worker_count() {
    let one = chain_survives_and_is_reclaimed(common::stop_the_world());
    let two = chain_survives_and_is_reclaimed(common::parallel_stop_the_world(2));
    let four = chain_survives_and_is_reclaimed(common::parallel_stop_the_world(4));
    assert_eq!(one, two);
    assert_eq!(two, four);
}

/// A hash map and its backing bucket array are themselves allocated round-robin across
/// segments; parallel sweep must still agree on exactly which buckets are reachable.
#[test_log::test]
fn hashmap_across_segments_keeps_every_entry_reachable() {
    common::with_heap(common::parallel_stop_the_world(4), || {
        let map = Root::<HashMap<u32, u32>>::make_hashmap();
        for i in 0..500 {
            let key = Root::make(i);
            let value = Root::make(i * 3);
            map.insert(key.as_ref(), value.as_ref());
        }

        collect();
        assert_eq!(map.len(), 500);
        for i in 0..500 {
            let value = map.get(&i).expect("key should survive a parallel cycle");
            assert_eq!(*value, i * 3);
        }
    });
}

/// A fixed array whose slots are scattered across several segments' worth of elements still
/// traces and sweeps correctly under the parallel driver.
#[test_log::test]
fn array_elements_across_segments_all_survive() {
    common::with_heap(common::parallel_stop_the_world(4), || {
        let array = Root::<Array<u32>>::make_array(256);
        for i in 0..256 {
            let value = Root::make(i * i);
            array.set(i as usize, value.as_ref());
        }
        collect();
        for i in 0..256 {
            assert_eq!(*array.index(i as usize), i * i);
        }
        assert_eq!(statistics().live_objects, 1 + 256);
    });
}
