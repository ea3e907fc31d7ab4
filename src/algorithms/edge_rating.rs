use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator as _;

use crate::config::EdgeRatingType;
use crate::graph::{EdgeRating, EdgeWeight, Graph, NodeWeight};

fn edge_rating(rating: EdgeRatingType, weight: EdgeWeight, source_weight: NodeWeight, target_weight: NodeWeight) -> EdgeRating {
    let source_weight = source_weight as f64;
    let target_weight = target_weight as f64;
    match rating {
        EdgeRatingType::Weight => weight,
        EdgeRatingType::Expansion => weight / (source_weight + target_weight),
        EdgeRatingType::ExpansionStar => weight / (source_weight * target_weight),
        EdgeRatingType::ExpansionStar2 => weight * weight / (source_weight * target_weight),
    }
}

/// Fills the scratch rating of every edge of `graph`.
pub fn rate(graph: &mut Graph, rating: EdgeRatingType) {
    let ratings: Vec<EdgeRating> = {
        let graph = &*graph;
        (0..graph.number_of_nodes())
            .into_par_iter()
            .flat_map_iter(|node| {
                let source_weight = graph.node_weight(node);
                graph.out_edges(node).map(move |e| {
                    let target_weight = graph.node_weight(graph.edge_target(e));
                    edge_rating(rating, graph.edge_weight(e), source_weight, target_weight)
                })
            })
            .collect()
    };
    graph.set_edge_ratings(ratings);
}
