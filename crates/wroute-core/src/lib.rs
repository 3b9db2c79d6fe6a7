#![warn(unreachable_pub, missing_debug_implementations)]

//! The core weighted-routing library. Given a topology and an adjacency
//! matrix, it builds a [route database](RoutingDb) and compiles one
//! [weighted routing table](RouteTable) per router; forwarding decisions
//! draw a next hop at random with probability proportional to entry weight.
//! An external learning agent may replace the [weight
//! matrix](RouteManager::set_weight_matrix) at any time, after which the
//! [`RouteManager`] recompiles every table from the shared database.

#[macro_use]
mod ident;

mod db;
mod manager;
mod network;
mod protocol;
mod spec;
mod table;

#[cfg(test)]
pub(crate) mod testing;

pub use db::{Adjacency, DbError, Edge, NextNode, PathValidity, Reachability, RoutingDb};
pub use manager::{Error, RouteManager};
pub use network::{
    types::{IfIndex, Interface, Link, Node, NodeId, Route},
    Network, TopologyError,
};
pub use protocol::{RouteDecision, RoutingProtocol, WeightedRouting};
pub use spec::{Spec, SpecError};
pub use table::{Direction, RouteEntry, RouteTable};
