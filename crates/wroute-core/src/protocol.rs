//! The routing capability the host IP stack depends on, and its weighted
//! probabilistic implementation.

use std::net::Ipv4Addr;

use rand::prelude::*;

use crate::network::{IfIndex, Interface, NodeId, Route};
use crate::table::{Direction, RouteTable};

/// What to do with a packet arriving on an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The destination is one of this node's addresses.
    LocalDeliver,
    /// Forward along the selected route.
    Forward(Route),
    /// No usable route; the caller decides what happens next.
    NoRoute,
}

/// Per-packet routing decisions. `route_output` serves locally originated
/// packets, optionally pinned to an egress interface; `route_input` serves
/// packets arriving on `iif`, which is excluded as an egress.
pub trait RoutingProtocol {
    fn route_output(&mut self, destination: Ipv4Addr, oif: Option<IfIndex>) -> Option<Route>;

    fn route_input(&mut self, destination: Ipv4Addr, iif: IfIndex) -> RouteDecision;
}

/// Weighted probabilistic routing state for one router: its table, its
/// interfaces, and its own seedable random stream.
#[derive(Debug)]
pub struct WeightedRouting {
    node: NodeId,
    ifaces: Vec<Interface>,
    table: RouteTable,
    rng: StdRng,
}

impl WeightedRouting {
    pub(crate) fn new(node: NodeId, ifaces: Vec<Interface>) -> Self {
        Self {
            node,
            ifaces,
            table: RouteTable::new(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Reseeds this router's random stream. Re-running with the same seeds
    /// reproduces identical forwarding decisions.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub(crate) fn table_mut(&mut self) -> &mut RouteTable {
        &mut self.table
    }

    fn owns_address(&self, addr: Ipv4Addr) -> bool {
        addr.is_loopback() || self.ifaces.iter().any(|ifc| ifc.addrs.contains(&addr))
    }

    fn address_of(&self, oif: IfIndex) -> Option<Ipv4Addr> {
        self.ifaces
            .iter()
            .find(|ifc| ifc.index == oif)
            .map(|ifc| ifc.primary())
    }

    fn lookup(
        &mut self,
        destination: Ipv4Addr,
        constraint: Option<IfIndex>,
        direction: Direction,
    ) -> Option<Route> {
        let entry = *self
            .table
            .select(destination, constraint, direction, &mut self.rng)?;
        let source = self.address_of(entry.oif)?;
        Some(Route {
            destination: entry.destination,
            source,
            gateway: entry.gateway,
            oif: entry.oif,
        })
    }
}

impl RoutingProtocol for WeightedRouting {
    fn route_output(&mut self, destination: Ipv4Addr, oif: Option<IfIndex>) -> Option<Route> {
        if destination.is_multicast() {
            // Another protocol may handle multicast; this one does not.
            return None;
        }
        self.lookup(destination, oif, Direction::Output)
    }

    fn route_input(&mut self, destination: Ipv4Addr, iif: IfIndex) -> RouteDecision {
        if self.owns_address(destination) {
            tracing::trace!(node = %self.node, %destination, "local delivery");
            return RouteDecision::LocalDeliver;
        }
        match self.lookup(destination, Some(iif), Direction::Input) {
            Some(route) => RouteDecision::Forward(route),
            None => RouteDecision::NoRoute,
        }
    }
}
