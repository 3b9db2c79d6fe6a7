//! This module defines topology specifications ([`Spec`]): the routers, the
//! physical links, and the adjacency matrix the route database is built from.

use crate::network::{Link, Network, Node, TopologyError};

/// A topology specification.
#[derive(Debug, typed_builder::TypedBuilder)]
pub struct Spec {
    /// Topology routers.
    pub nodes: Vec<Node>,
    /// Point-to-point links.
    pub links: Vec<Link>,
    /// Flattened row-major `N x N` adjacency flags (`1` = adjacent,
    /// conventionally `-1` otherwise and `0` on the diagonal).
    pub adjacency: Vec<i32>,
}

impl Spec {
    /// Validate a specification, producing a `ValidSpec`.
    ///
    /// Correctness properties:
    ///
    /// - The topology must be valid (see `Topology::new()`).
    /// - The adjacency matrix must have exactly `N * N` entries.
    pub(crate) fn validate(self) -> Result<ValidSpec, SpecError> {
        let network = Network::new(&self.nodes, &self.links)?;
        let n = network.nr_nodes();
        // CORRECTNESS: The adjacency matrix must have exactly `N * N` entries.
        if self.adjacency.len() != n * n {
            return Err(SpecError::AdjacencyDimension {
                nodes: n,
                actual: self.adjacency.len(),
            });
        }
        Ok(ValidSpec {
            network,
            adjacency: self.adjacency,
        })
    }
}

/// A `ValidSpec` is a `Spec` that has been validated: the topology satisfies
/// the properties in `Topology::new()`, and the adjacency matrix dimension
/// matches the node count.
#[derive(Debug)]
pub(crate) struct ValidSpec {
    pub(crate) network: Network,
    pub(crate) adjacency: Vec<i32>,
}

/// Topology specification error.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// The physical topology is invalid.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// The adjacency matrix does not match the node count.
    #[error("adjacency matrix has {actual} entries for {nodes} nodes")]
    AdjacencyDimension {
        /// The number of nodes.
        nodes: usize,
        /// The number of matrix entries actually supplied.
        actual: usize,
    },
}
