//! The pipeline graph's mutation-time topology model, plus the scheduler that drives a compiled
//! linear chain to completion on one dedicated OS thread.
//!
//! These are deliberately two different things (§4.1's "two-object-split", grounded on
//! `sonido-core::graph::mod.rs`'s `Graph`-vs-compiled-order split): [`Graph`] is a general
//! parent/child topology used for wiring and introspection (and exercised directly by the
//! round-trip test in §8 — `add_linear_chain` then iteration yields nodes in source order), while
//! [`Scheduler`] only ever drives the one topology this receiver actually uses at runtime: a
//! single linear chain with no fan-out. Keeping `Graph`'s API general (parent/child *sets*, not a
//! single `next` pointer) means a future fan-out topology would need a different `Scheduler`, not
//! a different `Graph`.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{CoreError, Result};

/// Identifies a node within a [`Graph`]. Stable for the lifetime of the graph; never reused after
/// `clone_node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A node in the pipeline topology: a payload (in this workspace, almost always a stage name or a
/// boxed stage descriptor) plus its parent and child sets.
#[derive(Debug, Clone)]
pub struct Node<T> {
    id: NodeId,
    payload: T,
    parents: HashSet<NodeId>,
    children: HashSet<NodeId>,
}

impl<T> Node<T> {
    /// This node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The payload this node carries.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// This node's parent set. Empty for a source node.
    pub fn parents(&self) -> &HashSet<NodeId> {
        &self.parents
    }

    /// This node's child set. Empty for a sink/endpoint node.
    pub fn children(&self) -> &HashSet<NodeId> {
        &self.children
    }
}

/// A directed graph of pipeline nodes. The runtime shape this workspace actually schedules is
/// always a linear chain (§4.1), but the model itself admits fan-out/fan-in per §3's "Graph Node"
/// data model entry.
#[derive(Debug, Clone, Default)]
pub struct Graph<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Graph<T> {
    /// An empty graph.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add a node carrying `payload`, with no parents or children yet.
    pub fn add_node(&mut self, payload: T) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            payload,
            parents: HashSet::new(),
            children: HashSet::new(),
        });
        id
    }

    fn index_of(&self, id: NodeId) -> Result<usize> {
        self.nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| CoreError::MalformedGraph(format!("no such node: {id:?}")))
    }

    /// Add an edge `u -> v`: `v` consumes `u`'s output. Registers `v` in `u`'s child set and `u` in
    /// `v`'s parent set.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> Result<()> {
        let ui = self.index_of(u)?;
        let vi = self.index_of(v)?;
        self.nodes[ui].children.insert(v);
        self.nodes[vi].parents.insert(u);
        Ok(())
    }

    /// Create nodes for each payload in order and wire `s1 -> s2 -> ... -> sn`. Returns the node
    /// ids in the same order as `payloads`, so "add a linear chain, then iterate" reproduces the
    /// input order (§8 round-trip property).
    pub fn add_linear_chain(&mut self, payloads: impl IntoIterator<Item = T>) -> Result<Vec<NodeId>> {
        let mut ids = Vec::new();
        for payload in payloads {
            ids.push(self.add_node(payload));
        }
        for pair in ids.windows(2) {
            self.add_edge(pair[0], pair[1])?;
        }
        Ok(ids)
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Iterate nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Node<T>> {
        self.nodes.iter()
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes — a pipeline built empty is a configuration error (§7).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<T: Clone> Graph<T> {
    /// Deep-copy a node's payload into a fresh, unconnected node (§4.1 "`clone_node` (deep copy for
    /// fan-out)"). The clone starts with no parents or children; the caller wires it in with
    /// [`Graph::add_edge`].
    pub fn clone_node(&mut self, id: NodeId) -> Result<NodeId> {
        let payload = self.node(id).ok_or_else(|| CoreError::MalformedGraph(format!("no such node: {id:?}")))?.payload.clone();
        Ok(self.add_node(payload))
    }
}

/// A shared, idempotent stop flag. Set once by the lifecycle layer on the first SIGINT/SIGTERM;
/// every cooperative task in the DSP chain and every UI thread polls it at its suspension points.
///
/// Cheap to clone (an `Arc` around a single `AtomicBool`): every thread that needs to observe or
/// set it gets its own handle.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// A fresh, unset flag.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Whether the flag has been set.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Set the flag. Returns `true` if this call was the one that actually set it (i.e. it was
    /// previously unset) — the lifecycle layer uses this to make SIGINT/SIGTERM handling
    /// idempotent: the first signal drives an ordered shutdown, a second exits immediately.
    pub fn set(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }
}

/// Construct a bounded hand-off queue: the same primitive §4.1's producer outboxes and §5's
/// cross-domain queues (DSP→Audio, DSP→UI, input→UI-control) are built from. A thin, named wrapper
/// around `crossbeam_channel::bounded` so call sites throughout the workspace read in this spec's
/// vocabulary (a "bounded queue" with a producer and consumer side) instead of a generic channel
/// library's.
pub fn bounded_queue<T>(capacity: usize) -> (crossbeam_channel::Sender<T>, crossbeam_channel::Receiver<T>) {
    crossbeam_channel::bounded(capacity)
}

/// Drives a [`crate::stage::Producer`] to completion on the calling thread, feeding each produced
/// item to `on_item` until the producer yields the end-of-stream sentinel, the stop flag is
/// observed, or a stage returns a fatal error.
///
/// Per §4.1's Rust realization: since the only runtime topology this receiver schedules is a
/// single linear chain, there is no per-node task executor here — `on_item` is the rest of the
/// chain (a `Chain`-composed [`crate::stage::Stage`] plus the cross-domain sends to the audio and
/// UI queues), called inline on this one dedicated thread. This *is* correct cooperative
/// scheduling for a single OS thread with nothing else competing for it: blocking `recv`/`send`
/// calls inside `on_item` are the suspension points §4.1 describes.
pub struct Scheduler;

impl Scheduler {
    /// Run `producer` until end-of-stream, a fatal error, or `stop.is_set()`.
    ///
    /// A fatal error from either the producer or `on_item` is propagated to the caller, which
    /// (per §7) is responsible for triggering the ordered lifecycle shutdown — this function does
    /// not retry or swallow it.
    pub fn run<P>(mut producer: P, stop: &StopFlag, mut on_item: impl FnMut(P::Out) -> Result<()>) -> Result<()>
    where
        P: crate::stage::Producer,
    {
        loop {
            if stop.is_set() {
                break;
            }
            match producer.produce() {
                None => break,
                Some(Ok(item)) => on_item(item)?,
                Some(Err(e)) => return Err(e),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_chain_preserves_order() {
        let mut g: Graph<&'static str> = Graph::new();
        let ids = g.add_linear_chain(["source", "db", "squelch", "demod"]).unwrap();

        let payloads: Vec<_> = g.iter().map(|n| *n.payload()).collect();
        assert_eq!(payloads, vec!["source", "db", "squelch", "demod"]);

        // each interior node has exactly one parent and one child; ends have none
        assert!(g.node(ids[0]).unwrap().parents().is_empty());
        assert_eq!(g.node(ids[0]).unwrap().children().len(), 1);
        assert!(g.node(*ids.last().unwrap()).unwrap().children().is_empty());
        assert_eq!(g.node(ids[1]).unwrap().parents().len(), 1);
        assert_eq!(g.node(ids[1]).unwrap().children().len(), 1);
    }

    #[test]
    fn empty_graph_is_empty() {
        let g: Graph<()> = Graph::new();
        assert!(g.is_empty());
    }

    #[test]
    fn clone_node_deep_copies_without_wiring() {
        let mut g: Graph<String> = Graph::new();
        let a = g.add_node("worker".to_string());
        let b = g.clone_node(a).unwrap();
        assert_ne!(a, b);
        assert_eq!(g.node(b).unwrap().payload(), "worker");
        assert!(g.node(b).unwrap().parents().is_empty());
        assert!(g.node(b).unwrap().children().is_empty());
    }

    #[test]
    fn add_edge_on_unknown_node_is_an_error() {
        let mut g: Graph<()> = Graph::new();
        let a = g.add_node(());
        let bogus = NodeId(999);
        assert!(g.add_edge(a, bogus).is_err());
    }

    #[test]
    fn stop_flag_set_is_idempotent_and_reports_first_caller() {
        let flag = StopFlag::new();
        assert!(!flag.is_set());
        assert!(flag.set(), "first set() call should report it was the one that flipped the flag");
        assert!(flag.is_set());
        assert!(!flag.set(), "second set() call is a no-op signal-wise");
    }

    struct Countdown(i32);
    impl crate::stage::Producer for Countdown {
        type Out = i32;
        fn name(&self) -> &'static str {
            "countdown"
        }
        fn produce(&mut self) -> crate::stage::Sentinel<Result<i32>> {
            if self.0 <= 0 {
                None
            } else {
                self.0 -= 1;
                Some(Ok(self.0))
            }
        }
    }

    #[test]
    fn scheduler_runs_until_sentinel() {
        let stop = StopFlag::new();
        let mut seen = Vec::new();
        Scheduler::run(Countdown(3), &stop, |item| {
            seen.push(item);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![2, 1, 0]);
    }

    #[test]
    fn scheduler_stops_early_when_flag_is_set() {
        let stop = StopFlag::new();
        stop.set();
        let mut seen = Vec::new();
        Scheduler::run(Countdown(3), &stop, |item| {
            seen.push(item);
            Ok(())
        })
        .unwrap();
        assert!(seen.is_empty());
    }

    #[test]
    fn scheduler_propagates_fatal_error() {
        use crate::error::CoreError;
        let stop = StopFlag::new();
        let err = Scheduler::run(Countdown(3), &stop, |_| {
            Err(CoreError::StageFailed {
                stage: "test".into(),
                reason: "boom".into(),
            })
        });
        assert!(err.is_err());
    }
}
