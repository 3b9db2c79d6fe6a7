//! `Wroute` is a weighted probabilistic IPv4 routing layer for network
//! simulations. Given a topology of nodes and links, an adjacency matrix, and
//! a weight matrix, it compiles per-router weighted routing tables and makes
//! per-packet forwarding decisions by drawing next hops at random with
//! probability proportional to entry weight, so that an external agent can
//! steer traffic by updating the weights alone.

#![warn(unreachable_pub, missing_docs)]

pub mod core;
