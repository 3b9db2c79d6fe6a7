//! Core wroute data structures, traits, and routines. The most common entry
//! point is [`RouteManager::new()`], which turns a [specification](Spec) into
//! a set of per-router [weighted routing tables](RouteTable).

pub use wroute_core::*;
