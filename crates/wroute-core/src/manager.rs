//! The route manager: an explicitly owned coordinator that builds the route
//! database for a topology and recompiles every router's weighted table
//! whenever the weight matrix is replaced.

use crate::db::{DbError, RoutingDb};
use crate::network::{Network, NodeId};
use crate::protocol::WeightedRouting;
use crate::spec::{Spec, SpecError};

/// Owns the network, the route database, and one [`WeightedRouting`] instance
/// per router. Single writer of all routing state; packet forwarding only
/// reads, and the two never interleave within one event-loop tick.
#[derive(Debug)]
pub struct RouteManager {
    network: Network,
    db: RoutingDb,
    routers: Vec<WeightedRouting>,
    nr_weight_updates: u64,
}

impl RouteManager {
    /// Validates the specification and builds the route database (adjacency,
    /// reachability closure, next-node resolution, default weights). Tables
    /// are empty until [`compute_routes`](Self::compute_routes) runs.
    pub fn new(spec: Spec) -> Result<Self, Error> {
        let valid = spec.validate()?;
        let db = RoutingDb::new(&valid.adjacency, &valid.network)?;
        let routers = (0..valid.network.nr_nodes())
            .map(|i| {
                let id = NodeId::new(i);
                WeightedRouting::new(id, valid.network.interfaces(id).to_vec())
            })
            .collect();
        Ok(Self {
            network: valid.network,
            db,
            routers,
            nr_weight_updates: 0,
        })
    }

    /// Removes every route from every router's table.
    pub fn delete_routes(&mut self) {
        for router in &mut self.routers {
            let nr_routes = router.table().nr_routes();
            tracing::debug!(node = %router.node(), nr_routes, "deleting routes");
            router.table_mut().clear();
        }
    }

    /// Replaces the weight relation wholesale. Takes effect on the next
    /// [`compute_routes`](Self::compute_routes).
    pub fn set_weight_matrix(&mut self, weights: &[f64]) -> Result<(), DbError> {
        self.db.set_weights(weights)?;
        self.nr_weight_updates += 1;
        Ok(())
    }

    /// How many weight matrices have been applied so far.
    pub fn nr_weight_updates(&self) -> u64 {
        self.nr_weight_updates
    }

    /// Recompiles every router's table from the route database. Existing
    /// tables are cleared first, so stale entries never coexist with new
    /// ones.
    ///
    /// For every viable `(src, next, dst)` triple, one host route per address
    /// owned by `dst` is installed into `src`'s table, carrying the resolved
    /// gateway and egress interface for `(src, next)` and the current weight
    /// of `(src, next)`.
    pub fn compute_routes(&mut self) {
        self.delete_routes();
        let Self {
            network,
            db,
            routers,
            ..
        } = self;
        let n = network.nr_nodes();
        for src in 0..n {
            let src_id = NodeId::new(src);
            for next in 0..n {
                let next_id = NodeId::new(next);
                for dst in 0..n {
                    let dst_id = NodeId::new(dst);
                    if !db.path_validity(src_id, next_id, dst_id).is_viable() {
                        continue;
                    }
                    let Some(&next_node) = db.next_node(src_id, next_id) else {
                        tracing::warn!(
                            src = %src_id,
                            next = %next_id,
                            dst = %dst_id,
                            "viable path has no resolved next hop, skipping"
                        );
                        continue;
                    };
                    let weight = db.weight(src_id, next_id);
                    for addr in network.addresses(dst_id) {
                        routers[src].table_mut().add_host_route(
                            addr,
                            next_node.addr,
                            next_node.oif,
                            weight,
                        );
                        tracing::trace!(
                            src = %src_id,
                            destination = %addr,
                            gateway = %next_node.addr,
                            oif = %next_node.oif,
                            weight,
                            "added host route"
                        );
                    }
                }
            }
        }
        tracing::info!("finished route computation");
    }

    /// Assigns router `i` the deterministic random stream `base + i`.
    pub fn assign_streams(&mut self, base: u64) {
        for (i, router) in self.routers.iter_mut().enumerate() {
            router.set_seed(base.wrapping_add(i as u64));
        }
    }

    pub fn router(&self, node: NodeId) -> &WeightedRouting {
        &self.routers[node.inner()]
    }

    pub fn router_mut(&mut self, node: NodeId) -> &mut WeightedRouting {
        &mut self.routers[node.inner()]
    }

    pub fn routers(&self) -> impl Iterator<Item = &WeightedRouting> {
        self.routers.iter()
    }

    pub fn db(&self) -> &RoutingDb {
        &self.db
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Human-readable dump of every router's table, for diagnostics.
    pub fn dump_tables(&self) -> String {
        let mut out = String::new();
        for router in &self.routers {
            out.push_str(&format!(
                "Node: {}, weighted routing table\n{}\n",
                router.node(),
                router.table()
            ));
        }
        out
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidSpec(#[from] SpecError),

    #[error(transparent)]
    Db(#[from] DbError),
}
