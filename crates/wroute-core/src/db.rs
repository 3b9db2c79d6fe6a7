//! The route database: flat pair relations (adjacency, reachability,
//! next-node, weight) over a dense node-id space, derived once per topology
//! except for the weight relation, which is replaced wholesale on every
//! update from the learning agent.

use std::net::Ipv4Addr;

use rustc_hash::FxHashMap;

use crate::network::{IfIndex, Network, NodeId};

/// An ordered pair of node IDs, the key for all pair relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_new::new, serde::Serialize)]
pub struct Edge {
    pub src: NodeId,
    pub dst: NodeId,
}

/// Whether a direct link exists from one node to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[repr(i8)]
pub enum Adjacency {
    NotAdjacent = -1,
    SelfLoop = 0,
    Adjacent = 1,
}

/// Whether a multi-hop path exists from one node to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[repr(i8)]
pub enum Reachability {
    Unreachable = -1,
    SelfLoop = 0,
    Reachable = 1,
}

/// Classification of a `(src, next, dst)` triple. Only positive-coded
/// variants yield a usable routing table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[repr(i8)]
pub enum PathValidity {
    /// `next` is not adjacent to `src`.
    NextNotAdjacent = -2,
    /// `next` is adjacent but cannot reach `dst`.
    NextUnreachable = -1,
    /// `next` is `src` itself.
    NextIsSelf = 0,
    /// `next` is the destination; one hop delivers.
    Direct = 1,
    /// Forwarding through `next` eventually delivers to `dst`.
    Transit = 2,
}

impl PathValidity {
    pub fn is_viable(self) -> bool {
        self as i8 > 0
    }
}

/// Resolved forwarding info for an adjacent pair: the neighbor's primary
/// address and the local egress interface towards it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new, serde::Serialize)]
pub struct NextNode {
    pub addr: Ipv4Addr,
    pub oif: IfIndex,
}

#[derive(Debug, Clone)]
pub struct RoutingDb {
    nr_nodes: usize,
    adjacency: FxHashMap<Edge, Adjacency>,
    reachable: FxHashMap<Edge, Reachability>,
    next_nodes: FxHashMap<Edge, NextNode>,
    weights: FxHashMap<Edge, f64>,
}

impl RoutingDb {
    /// Builds the relation store from a flattened row-major `N x N` adjacency
    /// matrix (`1` adjacent, anything else not adjacent; the diagonal is
    /// always self) and the physical topology. Adjacency, reachability, and
    /// next-node relations never change afterwards.
    ///
    /// Adjacent pairs without a physical link are logged and omitted from the
    /// next-node relation; routes through them are skipped at compile time.
    pub fn new(adjacency: &[i32], network: &Network) -> Result<Self, DbError> {
        let n = network.nr_nodes();
        if adjacency.len() != n * n {
            return Err(DbError::DimensionMismatch {
                expected: n * n,
                actual: adjacency.len(),
            });
        }
        let mut db = Self {
            nr_nodes: n,
            adjacency: FxHashMap::default(),
            reachable: FxHashMap::default(),
            next_nodes: FxHashMap::default(),
            weights: FxHashMap::default(),
        };
        db.set_adjacency(adjacency);
        db.calc_reachable();
        db.resolve_next_nodes(network);
        db.init_weights();
        Ok(db)
    }

    /// Replaces the weight relation wholesale from a flattened row-major
    /// `N x N` matrix. Every pair is redefined, adjacent or not.
    pub fn set_weights(&mut self, weights: &[f64]) -> Result<(), DbError> {
        let n = self.nr_nodes;
        if weights.len() != n * n {
            return Err(DbError::DimensionMismatch {
                expected: n * n,
                actual: weights.len(),
            });
        }
        for src in 0..n {
            for next in 0..n {
                let edge = Edge::new(NodeId::new(src), NodeId::new(next));
                self.weights.insert(edge, weights[src * n + next]);
            }
        }
        Ok(())
    }

    pub fn nr_nodes(&self) -> usize {
        self.nr_nodes
    }

    /// The weight of `(src, next)`; 0 if the pair is unknown. Only meaningful
    /// where adjacency holds.
    pub fn weight(&self, src: NodeId, next: NodeId) -> f64 {
        self.weights
            .get(&Edge::new(src, next))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn adjacency(&self, src: NodeId, dst: NodeId) -> Adjacency {
        self.adjacency
            .get(&Edge::new(src, dst))
            .copied()
            .unwrap_or(Adjacency::NotAdjacent)
    }

    pub fn reachability(&self, src: NodeId, dst: NodeId) -> Reachability {
        self.reachable
            .get(&Edge::new(src, dst))
            .copied()
            .unwrap_or(Reachability::Unreachable)
    }

    /// Classifies the `(src, next, dst)` triple by combining adjacency of
    /// `(src, next)` with reachability of `(next, dst)`.
    pub fn path_validity(&self, src: NodeId, next: NodeId, dst: NodeId) -> PathValidity {
        match self.adjacency(src, next) {
            Adjacency::NotAdjacent => PathValidity::NextNotAdjacent,
            Adjacency::SelfLoop => PathValidity::NextIsSelf,
            Adjacency::Adjacent => match self.reachability(next, dst) {
                Reachability::Unreachable => PathValidity::NextUnreachable,
                Reachability::SelfLoop => PathValidity::Direct,
                Reachability::Reachable => PathValidity::Transit,
            },
        }
    }

    pub fn next_node(&self, src: NodeId, next: NodeId) -> Option<&NextNode> {
        self.next_nodes.get(&Edge::new(src, next))
    }

    fn set_adjacency(&mut self, adjacency: &[i32]) {
        let n = self.nr_nodes;
        for src in 0..n {
            for dst in 0..n {
                let value = if src == dst {
                    Adjacency::SelfLoop
                } else if adjacency[src * n + dst] == 1 {
                    Adjacency::Adjacent
                } else {
                    Adjacency::NotAdjacent
                };
                let edge = Edge::new(NodeId::new(src), NodeId::new(dst));
                self.adjacency.insert(edge, value);
            }
        }
    }

    /// All-pairs relaxation of the adjacency codes: an unknown `(src, dst)`
    /// becomes reachable if some intermediate `via` is already reachable from
    /// `src` and reaches `dst`.
    fn calc_reachable(&mut self) {
        let n = self.nr_nodes;
        let mut codes = vec![0i8; n * n];
        for src in 0..n {
            for dst in 0..n {
                codes[src * n + dst] =
                    self.adjacency(NodeId::new(src), NodeId::new(dst)) as i8;
            }
        }
        for via in 0..n {
            for src in 0..n {
                for dst in 0..n {
                    // Only unknown entries are relaxed.
                    if codes[src * n + dst] == -1
                        && codes[src * n + via] == 1
                        && codes[via * n + dst] == 1
                    {
                        codes[src * n + dst] = 1;
                        tracing::trace!(src, dst, via, "reachable through intermediate");
                    }
                }
            }
        }
        for src in 0..n {
            for dst in 0..n {
                let value = match codes[src * n + dst] {
                    1 => Reachability::Reachable,
                    0 => Reachability::SelfLoop,
                    _ => Reachability::Unreachable,
                };
                let edge = Edge::new(NodeId::new(src), NodeId::new(dst));
                self.reachable.insert(edge, value);
            }
        }
    }

    /// Walks the physical topology once, recording for every adjacent pair
    /// the local egress interface and the neighbor's primary address.
    fn resolve_next_nodes(&mut self, network: &Network) {
        let n = self.nr_nodes;
        for src in 0..n {
            for dst in 0..n {
                let (src, dst) = (NodeId::new(src), NodeId::new(dst));
                // Only pairs the adjacency matrix declares count, even if a
                // physical link exists.
                if self.adjacency(src, dst) != Adjacency::Adjacent {
                    continue;
                }
                let Some(oif) = network.egress_to(src, dst) else {
                    tracing::warn!(%src, %dst, "adjacent pair has no physical link, skipping");
                    continue;
                };
                let Some(addr) = network.primary_address(dst) else {
                    tracing::warn!(%dst, "adjacent node has no address, skipping");
                    continue;
                };
                self.next_nodes
                    .insert(Edge::new(src, dst), NextNode::new(addr, oif));
                tracing::debug!(%src, %dst, %oif, %addr, "resolved next node");
            }
        }
    }

    /// Default weights: 1 where adjacent, 0 elsewhere.
    fn init_weights(&mut self) {
        let n = self.nr_nodes;
        for src in 0..n {
            for next in 0..n {
                let edge = Edge::new(NodeId::new(src), NodeId::new(next));
                let weight = match self.adjacency(edge.src, edge.dst) {
                    Adjacency::Adjacent => 1.0,
                    _ => 0.0,
                };
                self.weights.insert(edge, weight);
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("matrix has {actual} entries, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}
