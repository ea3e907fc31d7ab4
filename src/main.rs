use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use graph_hierarchy::config::{EdgeRatingType, MatchingType, NodeOrderingType, StopRuleType};
use graph_hierarchy::io::{attach_features, read_features, read_matrix_market_as_graph, write_partition_data_to_file};
use graph_hierarchy::uncoarsening::SelectiveUncoarsener;
use graph_hierarchy::{build_hierarchy, CoarseningConfig};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path of the .mtx file holding the graph
    mtx_filepath: PathBuf,

    /// One feature vector per node, whitespace or comma separated
    features_filepath: PathBuf,

    /// Matching or clustering per level: random, gpa, randomgpa, lp_clustering,
    /// simple_clustering, low_diameter
    #[arg(short, long, default_value = "lp_clustering")]
    matching: MatchingType,

    /// Stop rule of the coarsening loop
    #[arg(long, default_value = "simple-fix")]
    stop_rule: StopRuleType,

    /// Edge rating used by the matchings: weight, expansion, expansion_star, expansion_star2
    #[arg(long, default_value = "weight")]
    edge_rating: EdgeRatingType,

    /// Node visiting order: random, degree
    #[arg(long, default_value = "degree")]
    node_ordering: NodeOrderingType,

    /// Stop coarsening below this many nodes
    #[arg(short = 'n', long, default_value_t = 500)]
    fix_num_vert_stop: usize,

    /// Levels coarsened with random matching under randomgpa
    #[arg(long, default_value_t = 3)]
    aggressive_random_levels: u32,

    /// Maximum number of nodes in one cluster
    #[arg(long)]
    cluster_upperbound: Option<usize>,

    /// Label propagation sweeps
    #[arg(short, long, default_value_t = 10)]
    label_iterations: u32,

    /// Merge this many label propagation runs into one clustering
    #[arg(long)]
    ensemble: Option<u32>,

    /// Hop diameter bound of low diameter clusters
    #[arg(long, default_value_t = 20.0)]
    diameter_upperbound: f64,

    /// Exponential shift rate of low diameter clustering
    #[arg(long, default_value_t = 0.4)]
    beta: f64,

    /// Seed of the random generator
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Where to write the partition index of every finest node
    #[arg(short, long)]
    partition_file: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> CoarseningConfig {
        let mut config = CoarseningConfig {
            matching_type: self.matching,
            stop_rule: self.stop_rule,
            edge_rating: self.edge_rating,
            node_ordering: self.node_ordering,
            fix_num_vert_stop: self.fix_num_vert_stop,
            aggressive_random_levels: self.aggressive_random_levels,
            label_iterations: self.label_iterations,
            diameter_upperbound: self.diameter_upperbound,
            beta: self.beta,
            seed: self.seed,
            ..Default::default()
        };
        if let Some(cluster_upperbound) = self.cluster_upperbound {
            config.cluster_upperbound = cluster_upperbound;
        }
        if let Some(number_of_clusterings) = self.ensemble {
            config.ensemble_clusterings = true;
            config.number_of_clusterings = number_of_clusterings;
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut graph = read_matrix_market_as_graph(&args.mtx_filepath)
        .with_context(|| format!("reading graph {}", args.mtx_filepath.display()))?;
    let features = read_features(&args.features_filepath)
        .with_context(|| format!("reading features {}", args.features_filepath.display()))?;
    attach_features(&mut graph, features)?;

    let start = Instant::now();
    let mut hierarchy = build_hierarchy(graph, &args.config())?;
    let elapsed_time = start.elapsed();

    for level in 0..hierarchy.number_of_levels() {
        if let Some(graph) = hierarchy.level(level) {
            println!(
                "level {}: {} nodes, {} edges, total weight {}",
                level,
                graph.number_of_nodes(),
                graph.number_of_edges(),
                graph.total_node_weight()
            );
        }
    }
    println!("Coarsening time {:?}", elapsed_time);

    // walk back down keeping every row as support
    let mut uncoarsener = SelectiveUncoarsener::new(hierarchy.current());
    let mut support: Vec<usize> = (0..hierarchy.current().number_of_nodes()).collect();
    while !hierarchy.is_empty() {
        let (finer, mapping) = hierarchy.pop_finer_and_project()?;
        let rows = uncoarsener.uncoarsen(finer, mapping, &support)?;
        println!("uncoarsened level {}: {} rows", hierarchy.size(), rows.len());
        support = (0..rows.len()).collect();
    }

    if let Some(partition_file) = &args.partition_file {
        write_partition_data_to_file(hierarchy.finest(), partition_file)?;
    }
    Ok(())
}
