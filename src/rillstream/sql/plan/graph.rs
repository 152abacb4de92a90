//! Operator graph under construction.
//!
//! A [`FlowGraph`] is an ordered collection of operator descriptors forming a
//! DAG, plus a *frontier*: the current terminal node(s) to which the next
//! attached operator connects. The graph is acyclic by construction, because
//! [`FlowGraph::attach_layer`] only ever adds forward edges from the current
//! frontier, never edges into an already-attached node.

use std::fmt;

use crate::rillstream::sql::plan::node::PlanNode;

/// Index of a node within its graph.
pub type NodeId = usize;

/// An ordered, frontier-tracking DAG of operator descriptors.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    nodes: Vec<PlanNode>,
    /// Directed edges (upstream, downstream)
    edges: Vec<(NodeId, NodeId)>,
    /// Current terminal node(s); the next attached layer connects here
    frontier: Vec<NodeId>,
}

impl FlowGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a node downstream of the entire current frontier.
    ///
    /// Every node currently in the frontier becomes an upstream of the new
    /// node, and the new node becomes the sole frontier. On an empty graph
    /// this adds an unconnected node, which then is the frontier.
    pub fn attach_layer(&mut self, node: PlanNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        for &upstream in &self.frontier {
            self.edges.push((upstream, id));
        }
        self.frontier = vec![id];
        id
    }

    /// Incorporate all of `other`'s nodes and internal wiring as one unit.
    ///
    /// No edges are created between this graph's prior frontier and the
    /// spliced-in subgraph; splicing composes disjoint regions that the
    /// caller wires explicitly via subsequent attachment. The frontier
    /// becomes the spliced subgraph's frontier.
    pub fn splice_subgraph(&mut self, other: FlowGraph) {
        let base = self.nodes.len();
        self.nodes.extend(other.nodes);
        self.edges
            .extend(other.edges.iter().map(|&(u, d)| (u + base, d + base)));
        self.frontier = other.frontier.iter().map(|&id| id + base).collect();
    }

    /// The current frontier.
    pub fn frontier(&self) -> &[NodeId] {
        &self.frontier
    }

    /// Replace the frontier wholesale.
    ///
    /// Used by the join compilation path, which splices two subgraphs and
    /// then needs both terminals as upstreams of the join node.
    pub(crate) fn set_frontier(&mut self, frontier: Vec<NodeId>) {
        self.frontier = frontier;
    }

    /// The node with the given id.
    pub fn node(&self, id: NodeId) -> &PlanNode {
        &self.nodes[id]
    }

    /// All nodes, in attachment order.
    pub fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }

    /// All edges as (upstream, downstream) pairs.
    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    /// Upstream node ids of the given node.
    pub fn upstreams(&self, id: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter(|&&(_, d)| d == id)
            .map(|&(u, _)| u)
            .collect()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl fmt::Display for FlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, node) in self.nodes.iter().enumerate() {
            let upstreams = self.upstreams(id);
            if upstreams.is_empty() {
                writeln!(f, "{}: {}", id, node)?;
            } else {
                writeln!(f, "{}: {} <- {:?}", id, node, upstreams)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(id: &str) -> PlanNode {
        PlanNode::Describe {
            identifier: id.to_string(),
        }
    }

    #[test]
    fn test_attach_layer_tracks_frontier() {
        let mut graph = FlowGraph::new();
        let a = graph.attach_layer(describe("a"));
        assert_eq!(graph.frontier(), &[a]);

        let b = graph.attach_layer(describe("b"));
        assert_eq!(graph.frontier(), &[b]);
        assert_eq!(graph.edges(), &[(a, b)]);
    }

    #[test]
    fn test_splice_remaps_ids_and_adopts_frontier() {
        let mut inner = FlowGraph::new();
        inner.attach_layer(describe("x"));
        inner.attach_layer(describe("y"));

        let mut outer = FlowGraph::new();
        outer.attach_layer(describe("a"));
        outer.splice_subgraph(inner);

        assert_eq!(outer.len(), 3);
        // x is node 1, y is node 2; frontier is y
        assert_eq!(outer.frontier(), &[2]);
        // splice creates no edge from a into the spliced region
        assert_eq!(outer.edges(), &[(1, 2)]);
    }

    #[test]
    fn test_attach_after_splice_wires_to_spliced_terminal() {
        let mut inner = FlowGraph::new();
        inner.attach_layer(describe("x"));

        let mut outer = FlowGraph::new();
        outer.splice_subgraph(inner);
        let sink = outer.attach_layer(describe("sink"));

        assert_eq!(outer.upstreams(sink), vec![0]);
    }

    #[test]
    fn test_attach_to_multi_node_frontier() {
        let mut graph = FlowGraph::new();
        let a = graph.attach_layer(describe("a"));
        // Simulate the join path: a second independent region
        let mut right = FlowGraph::new();
        right.attach_layer(describe("b"));
        graph.splice_subgraph(right);
        let b = graph.frontier()[0];

        graph.set_frontier(vec![a, b]);
        let join = graph.attach_layer(describe("join"));

        let mut ups = graph.upstreams(join);
        ups.sort_unstable();
        assert_eq!(ups, vec![a, b]);
        assert_eq!(graph.frontier(), &[join]);
    }

    #[test]
    fn test_edges_always_point_forward() {
        let mut graph = FlowGraph::new();
        graph.attach_layer(describe("a"));
        graph.attach_layer(describe("b"));
        graph.attach_layer(describe("c"));

        assert!(graph.edges().iter().all(|&(u, d)| u < d));
    }
}
