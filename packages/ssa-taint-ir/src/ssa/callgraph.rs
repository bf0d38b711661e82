//! Call graph port (§1 ambient stack: "the spec treats the call graph as an
//! input built by an external collaborator"). [`CallGraph`] is the trait the
//! rest of the crate programs against; [`PetgraphCallGraph`] is a concrete,
//! `petgraph`-backed implementation so the crate (and its tests) have
//! something to drive without depending on a real SSA front-end.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rustc_hash::FxHashMap;

use super::types::{FunctionId, InstrId};

/// One call edge: `caller` invokes `callee` at instruction `site`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallEdge {
    pub caller: FunctionId,
    pub callee: FunctionId,
    pub site: InstrId,
}

/// What C4 (contexts, statically-resolved calls) and C5 (`reachable`) need
/// from a call graph.
pub trait CallGraph {
    fn functions(&self) -> Vec<FunctionId>;
    fn callees(&self, caller: FunctionId) -> Vec<CallEdge>;
    fn callers(&self, callee: FunctionId) -> Vec<CallEdge>;
    fn contains(&self, f: FunctionId) -> bool;
}

/// `petgraph::graph::DiGraph`-backed implementation; edges carry the call
/// site so C4 can build call-contexts and C9 can identify varargs sites.
pub struct PetgraphCallGraph {
    graph: DiGraph<FunctionId, InstrId>,
    index_of: FxHashMap<FunctionId, NodeIndex>,
}

impl PetgraphCallGraph {
    pub fn new() -> Self {
        PetgraphCallGraph {
            graph: DiGraph::new(),
            index_of: FxHashMap::default(),
        }
    }

    fn ensure_node(&mut self, f: FunctionId) -> NodeIndex {
        if let Some(&idx) = self.index_of.get(&f) {
            return idx;
        }
        let idx = self.graph.add_node(f);
        self.index_of.insert(f, idx);
        idx
    }

    pub fn add_edge(&mut self, caller: FunctionId, callee: FunctionId, site: InstrId) {
        let c1 = self.ensure_node(caller);
        let c2 = self.ensure_node(callee);
        self.graph.add_edge(c1, c2, site);
    }

    pub fn add_function(&mut self, f: FunctionId) {
        self.ensure_node(f);
    }
}

impl Default for PetgraphCallGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl CallGraph for PetgraphCallGraph {
    fn functions(&self) -> Vec<FunctionId> {
        self.graph.node_weights().copied().collect()
    }

    fn callees(&self, caller: FunctionId) -> Vec<CallEdge> {
        let Some(&idx) = self.index_of.get(&caller) else {
            return vec![];
        };
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| CallEdge {
                caller,
                callee: self.graph[e.target()],
                site: *e.weight(),
            })
            .collect()
    }

    fn callers(&self, callee: FunctionId) -> Vec<CallEdge> {
        let Some(&idx) = self.index_of.get(&callee) else {
            return vec![];
        };
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| CallEdge {
                caller: self.graph[e.source()],
                callee,
                site: *e.weight(),
            })
            .collect()
    }

    fn contains(&self, f: FunctionId) -> bool {
        self.index_of.contains_key(&f)
    }
}
