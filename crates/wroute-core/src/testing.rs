use crate::network::types::{Link, Node, NodeId};

/// Linear chain 0 -> 1 -> 2 -> 3 with one-directional adjacency.
pub(crate) fn chain_config() -> (Vec<Node>, Vec<Link>, Vec<i32>) {
    let nodes = (0..4).map(|i| Node::new(NodeId::new(i))).collect::<Vec<_>>();
    let links = vec![
        Link::new(nodes[0].id, nodes[1].id),
        Link::new(nodes[1].id, nodes[2].id),
        Link::new(nodes[2].id, nodes[3].id),
    ];
    #[rustfmt::skip]
    let adjacency = vec![
         0,  1, -1, -1,
        -1,  0,  1, -1,
        -1, -1,  0,  1,
        -1, -1, -1,  0,
    ];
    (nodes, links, adjacency)
}

/// Diamond 0 -> {1, 2} -> 3. Link order assigns node 0 interface 1 towards
/// node 1 and interface 2 towards node 2.
pub(crate) fn diamond_config() -> (Vec<Node>, Vec<Link>, Vec<i32>) {
    let nodes = (0..4).map(|i| Node::new(NodeId::new(i))).collect::<Vec<_>>();
    let links = vec![
        Link::new(nodes[0].id, nodes[1].id),
        Link::new(nodes[0].id, nodes[2].id),
        Link::new(nodes[1].id, nodes[3].id),
        Link::new(nodes[2].id, nodes[3].id),
    ];
    #[rustfmt::skip]
    let adjacency = vec![
         0,  1,  1, -1,
        -1,  0, -1,  1,
        -1, -1,  0,  1,
        -1, -1, -1,  0,
    ];
    (nodes, links, adjacency)
}

/// Weights biasing the diamond's upper path to 0.3 and lower path to 0.7.
pub(crate) fn diamond_weights() -> Vec<f64> {
    #[rustfmt::skip]
    let weights = vec![
        0.0, 0.3, 0.7, 0.0,
        0.0, 0.0, 0.0, 1.0,
        0.0, 0.0, 0.0, 1.0,
        0.0, 0.0, 0.0, 0.0,
    ];
    weights
}
