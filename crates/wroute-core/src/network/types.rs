use std::net::Ipv4Addr;

identifier!(NodeId, usize);
identifier!(IfIndex, u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub id: NodeId,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self { id }
    }
}

/// A bidirectional point-to-point link between two routers.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Link {
    pub a: NodeId,
    pub b: NodeId,
}

impl Link {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        Self { a, b }
    }

    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        self.a == x && self.b == y || self.a == y && self.b == x
    }
}

/// One direction of a point-to-point link, annotated with the egress
/// interface on the `src` side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new, serde::Serialize)]
pub(crate) struct P2pChannel {
    pub(crate) src: NodeId,
    pub(crate) dst: NodeId,
    pub(crate) src_if: IfIndex,
}

/// A network interface on a router. Interface 0 is always loopback.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Interface {
    pub index: IfIndex,
    pub addrs: Vec<Ipv4Addr>,
    /// The router on the other end of this interface's link, if any.
    pub peer: Option<NodeId>,
}

impl Interface {
    pub(crate) fn loopback() -> Self {
        Self {
            index: IfIndex::ZERO,
            addrs: vec![Ipv4Addr::LOCALHOST],
            peer: None,
        }
    }

    pub(crate) fn new(index: IfIndex, addr: Ipv4Addr, peer: NodeId) -> Self {
        Self {
            index,
            addrs: vec![addr],
            peer: Some(peer),
        }
    }

    /// The interface's first address.
    pub fn primary(&self) -> Ipv4Addr {
        self.addrs[0]
    }

    pub fn is_loopback(&self) -> bool {
        self.index == IfIndex::ZERO
    }
}

/// A materialized forwarding decision handed back to the IP stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Route {
    pub destination: Ipv4Addr,
    pub source: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub oif: IfIndex,
}
