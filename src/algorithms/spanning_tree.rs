use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rand::rngs::SmallRng;
use rand::Rng;

use crate::graph::{EdgeId, EdgeWeight, Graph, NodeId, UNDEFINED_NODE};

/// Frontier edge of the Jarník–Prim search, ordered by weight only.
#[derive(Debug, Clone, Copy)]
struct FrontierEdge {
    id: EdgeId,
    from: NodeId,
    to: NodeId,
    weight: EdgeWeight,
}

impl PartialEq for FrontierEdge {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEdge {}

impl PartialOrd for FrontierEdge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEdge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight.total_cmp(&other.weight)
    }
}

/// Maximum weight spanning tree of the component of a random root (Jarník–Prim).
///
/// Returns the tree as a directed graph over the same node ids, with an edge from
/// every attached node to each of its children carrying the original edge weight,
/// together with the root. Nodes outside the root's component have no tree edges.
/// For an empty graph the root is [`UNDEFINED_NODE`].
pub fn spanning_tree(graph: &Graph, rng: &mut SmallRng) -> (Graph, NodeId) {
    let size = graph.number_of_nodes();
    if size == 0 {
        let mut tree = Graph::new();
        tree.start_construction(0, 0);
        tree.finish_construction();
        return (tree, UNDEFINED_NODE);
    }

    let mut parent = vec![UNDEFINED_NODE; size];
    let mut parent_edge = vec![0 as EdgeId; size];
    let mut pq: BinaryHeap<FrontierEdge> = BinaryHeap::new();

    let start_id = rng.gen_range(0..size);
    parent[start_id] = start_id;
    for e in graph.out_edges(start_id) {
        pq.push(FrontierEdge {
            id: e,
            from: start_id,
            to: graph.edge_target(e),
            weight: graph.edge_weight(e),
        });
    }

    while let Some(cur_edge) = pq.pop() {
        let cur_node = cur_edge.to;
        // stale entry, attached through a heavier edge meanwhile
        if parent[cur_node] != UNDEFINED_NODE {
            continue;
        }
        parent[cur_node] = cur_edge.from;
        parent_edge[cur_node] = cur_edge.id;

        for e in graph.out_edges(cur_node) {
            let target = graph.edge_target(e);
            if parent[target] != UNDEFINED_NODE {
                continue;
            }
            pq.push(FrontierEdge {
                id: e,
                from: cur_node,
                to: target,
                weight: graph.edge_weight(e),
            });
        }
    }

    let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); size];
    for node in 0..size {
        if node == start_id || parent[node] == UNDEFINED_NODE {
            continue;
        }
        children[parent[node]].push(node);
    }

    let mut tree = Graph::new();
    tree.start_construction(size, size);
    for current_node in 0..size {
        tree.new_node();
        for &child in &children[current_node] {
            let e = tree.new_edge(current_node, child);
            tree.set_edge_weight(e, graph.edge_weight(parent_edge[child]));
        }
    }
    tree.finish_construction();

    (tree, start_id)
}
