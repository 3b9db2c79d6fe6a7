pub(crate) mod topology;
pub mod types;

use std::net::Ipv4Addr;

use petgraph::visit::EdgeRef;

pub use topology::TopologyError;
pub use types::*;

use self::topology::Topology;

/// The physical topology: routers, point-to-point links, and the interfaces
/// and addresses assigned to them. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Network {
    topology: Topology,
}

impl Network {
    pub fn new(nodes: &[Node], links: &[Link]) -> Result<Self, TopologyError> {
        let topology = Topology::new(nodes, links)?;
        Ok(Self { topology })
    }

    pub fn nr_nodes(&self) -> usize {
        self.topology.nr_nodes()
    }

    /// All interfaces of `node`, loopback first.
    pub fn interfaces(&self, node: NodeId) -> &[Interface] {
        &self.topology.ifaces[node.inner()]
    }

    /// All non-loopback addresses owned by `node`, in interface order.
    pub fn addresses(&self, node: NodeId) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.interfaces(node)
            .iter()
            .filter(|ifc| !ifc.is_loopback())
            .flat_map(|ifc| ifc.addrs.iter().copied())
    }

    /// The address a node is known by to its neighbors: the first address of
    /// its first non-loopback interface.
    pub fn primary_address(&self, node: NodeId) -> Option<Ipv4Addr> {
        self.interfaces(node)
            .iter()
            .find(|ifc| !ifc.is_loopback())
            .map(|ifc| ifc.primary())
    }

    /// The interface `src` uses to send directly to `dst`, if the two share a
    /// link.
    pub fn egress_to(&self, src: NodeId, dst: NodeId) -> Option<IfIndex> {
        let i = *self.topology.idx_of(&src)?;
        let j = *self.topology.idx_of(&dst)?;
        self.topology
            .graph
            .edges(i)
            .find(|e| e.target() == j)
            .map(|e| e.weight().src_if)
    }
}
