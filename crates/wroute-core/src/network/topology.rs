use std::net::Ipv4Addr;

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::network::types::{IfIndex, Interface, Link, Node, NodeId, P2pChannel};

#[derive(Debug, Clone)]
pub(crate) struct Topology {
    pub(crate) graph: DiGraph<Node, P2pChannel>,
    /// Per-node interface lists, indexed by `NodeId`. Interface 0 is loopback;
    /// link interfaces are appended in link-declaration order.
    pub(crate) ifaces: Vec<Vec<Interface>>,
    id2idx: FxHashMap<NodeId, NodeIndex>,
}

impl Topology {
    /// Creates a network topology from a list of routers and point-to-point
    /// links, assigning one /24 subnet per link. This function returns an
    /// error if the given specification fails to produce a valid topology.
    ///
    /// Correctness properties:
    ///
    /// - Every node must have a unique ID.
    /// - Node IDs must be dense in `[0, N)` (the relation store flattens all
    ///   pair relations over this space).
    /// - Every link must have distinct endpoints in `nodes`.
    /// - For any two nodes, there must be at most one link between them.
    /// - Every node must be referenced by some link.
    pub(crate) fn new(nodes: &[Node], links: &[Link]) -> Result<Self, TopologyError> {
        let mut g = DiGraph::new();
        let mut id2idx = FxHashMap::default();
        for n @ Node { id } in nodes.iter().cloned() {
            // CORRECTNESS: Node IDs must be dense in `[0, N)`.
            if id.inner() >= nodes.len() {
                return Err(TopologyError::SparseNodeId {
                    id,
                    nr_nodes: nodes.len(),
                });
            }
            let idx = g.add_node(n);
            if id2idx.insert(id, idx).is_some() {
                // CORRECTNESS: Every node must have a unique ID.
                return Err(TopologyError::DuplicateNodeId(id));
            }
        }
        let mut ifaces = (0..nodes.len())
            .map(|_| vec![Interface::loopback()])
            .collect::<Vec<_>>();
        let mut referenced = FxHashSet::default();
        let mut seen_pairs = FxHashSet::default();
        for (k, Link { a, b }) in links.iter().cloned().enumerate() {
            // CORRECTNESS: Every link must have distinct endpoints in `nodes`.
            if a == b {
                return Err(TopologyError::NodeAdjacentSelf(a));
            }
            if !id2idx.contains_key(&a) {
                return Err(TopologyError::UndeclaredNode(a));
            }
            if !id2idx.contains_key(&b) {
                return Err(TopologyError::UndeclaredNode(b));
            }
            // CORRECTNESS: For any two nodes, there must be at most one link
            // between them.
            let pair = (a.min(b), a.max(b));
            if !seen_pairs.insert(pair) {
                return Err(TopologyError::DuplicateLink { n1: a, n2: b });
            }
            referenced.insert(a);
            referenced.insert(b);
            let (addr_a, addr_b) = link_subnet(k);
            let if_a = IfIndex::new(ifaces[a.inner()].len() as u32);
            let if_b = IfIndex::new(ifaces[b.inner()].len() as u32);
            ifaces[a.inner()].push(Interface::new(if_a, addr_a, b));
            ifaces[b.inner()].push(Interface::new(if_b, addr_b, a));
            // Channels are unidirectional
            g.add_edge(id2idx[&a], id2idx[&b], P2pChannel::new(a, b, if_a));
            g.add_edge(id2idx[&b], id2idx[&a], P2pChannel::new(b, a, if_b));
        }
        // CORRECTNESS: Every node must be referenced by some link.
        for &id in id2idx.keys() {
            if !referenced.contains(&id) {
                return Err(TopologyError::IsolatedNode(id));
            }
        }
        Ok(Self {
            graph: g,
            ifaces,
            id2idx,
        })
    }

    pub(crate) fn idx_of(&self, id: &NodeId) -> Option<&NodeIndex> {
        self.id2idx.get(id)
    }

    pub(crate) fn nr_nodes(&self) -> usize {
        self.graph.node_count()
    }
}

/// Addresses for the two endpoints of the `k`-th link: the link owns subnet
/// `10.(k / 255).(k % 255 + 1).0/24`, endpoint `a` takes `.1` and endpoint
/// `b` takes `.2`.
fn link_subnet(k: usize) -> (Ipv4Addr, Ipv4Addr) {
    let hi = (k / 255) as u8;
    let lo = (k % 255 + 1) as u8;
    (
        Ipv4Addr::new(10, hi, lo, 1),
        Ipv4Addr::new(10, hi, lo, 2),
    )
}

#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("Duplicate node ID {0}")]
    DuplicateNodeId(NodeId),

    #[error("Node ID {id} is out of range for {nr_nodes} nodes")]
    SparseNodeId { id: NodeId, nr_nodes: usize },

    #[error("Node {0} is connected to itself")]
    NodeAdjacentSelf(NodeId),

    #[error("Node {0} is not declared")]
    UndeclaredNode(NodeId),

    #[error("Duplicate links between {n1} and {n2}")]
    DuplicateLink { n1: NodeId, n2: NodeId },

    #[error("Node {0} is not connected to any other node")]
    IsolatedNode(NodeId),
}
