//! Simple-chain and cyclic graph scenarios (spec §8 scenarios S1 and S2).
//!
//! A reference-counted comparator alone cannot collect these graphs — that's the whole reason a
//! tracing collector exists — so these tests exercise reachability preservation and reclamation
//! on quiescence across all three collection policies.

mod common;

use chromagc::{collect, statistics, Field, Parent, Root, Trace, TraceContext};

struct Node {
    id: u32,
    left: Field<Node>,
    right: Field<Node>,
}

impl Node {
    fn new(parent: Parent, id: u32) -> Self {
        Self {
            id,
            left: Field::new(parent),
            right: Field::new(parent),
        }
    }
}

impl Trace for Node {
    fn trace(&self, ctx: &mut TraceContext<'_>) {
        self.left.trace(ctx);
        self.right.trace(ctx);
    }
}

fn make_node(id: u32) -> Root<Node> {
    Root::make_with(move |parent| Node::new(parent, id))
}

/// S1: A -> B -> C, rooted only at A, survives a cycle; clearing `A.left` then collecting
/// reclaims B and C.
fn simple_chain(config: chromagc::Configuration) {
    common::with_heap(config, || {
        let a = make_node(1);
        let b = make_node(2);
        let c = make_node(3);
        a.left.set(b.as_ref());
        b.left.set(c.as_ref());

        collect();
        let before = statistics();
        assert_eq!(before.live_objects, 3, "A, B and C are all reachable from root A");

        a.left.clear();
        collect();
        let after = statistics();
        assert_eq!(after.live_objects, 1, "only A survives once its link to B is cleared");
    });
}

#[test_log::test]
fn simple_chain_stop_the_world() {
    simple_chain(common::stop_the_world());
}

#[test_log::test]
fn simple_chain_incremental() {
    simple_chain(common::incremental());
}

/// S2: X <-> Y, rooted only at X, survive a cycle despite being mutually cyclic; dropping the
/// root and running another cycle reclaims both.
fn mutual_cycle(config: chromagc::Configuration) {
    common::with_heap(config, || {
        {
            let x = make_node(10);
            let y = make_node(20);
            x.right.set(y.as_ref());
            y.right.set(x.as_ref());

            collect();
            assert_eq!(statistics().live_objects, 2, "a reachable cycle survives collection");
        }

        collect();
        assert_eq!(
            statistics().live_objects,
            0,
            "an unrooted cycle is fully reclaimed, unlike a refcounted equivalent"
        );
    });
}

#[test_log::test]
fn mutual_cycle_stop_the_world() {
    mutual_cycle(common::stop_the_world());
}

#[test_log::test]
fn mutual_cycle_incremental() {
    mutual_cycle(common::incremental());
}

#[test_log::test]
fn self_referencing_node_is_collected_once_unrooted() {
    common::with_heap(common::stop_the_world(), || {
        {
            let node = make_node(99);
            node.left.set(node.as_ref());
            collect();
            assert_eq!(statistics().live_objects, 1);
        }
        collect();
        assert_eq!(statistics().live_objects, 0);
    });
}

#[test_log::test]
fn deep_chain_survives_and_unwinds() {
    common::with_heap(common::incremental(), || {
        const DEPTH: u32 = 256;
        let root = make_node(0);
        {
            let mut tail = Root::clone(&root);
            for id in 1..DEPTH {
                let next = make_node(id);
                tail.left.set(next.as_ref());
                tail = next;
            }
        }
        collect();
        assert_eq!(statistics().live_objects as u32, DEPTH);

        root.left.clear();
        collect();
        assert_eq!(statistics().live_objects, 1, "clearing the head drops the whole remaining tail");
    });
}
