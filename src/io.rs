use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use num_traits::{Num, ToPrimitive};
use sprs::io::{read_matrix_market, IoError};
use sprs::TriMat;

use crate::algorithms::Error;
use crate::graph::{make_edges_bidirectional, EdgeWeight, FeatureVec, Graph, NodeId};

/// Read a matrix market file as an undirected graph.
///
/// Entry `(i, j)` becomes an edge between nodes `i` and `j` weighted by the entry's
/// value; missing reverse entries are added, the diagonal is dropped. Both `real` and
/// `integer` files are accepted.
pub fn read_matrix_market_as_graph(file_path: &Path) -> Result<Graph, Error> {
    let real_matrix: Result<TriMat<f64>, IoError> = read_matrix_market(file_path);
    let mut adjacency = match real_matrix {
        Ok(tri_matrix) => adjacency_lists(&tri_matrix),
        Err(IoError::MismatchedMatrixMarketRead(..)) => {
            let tri_matrix: TriMat<i64> = read_matrix_market(file_path)?;
            adjacency_lists(&tri_matrix)
        }
        Err(err) => return Err(err.into()),
    };
    make_edges_bidirectional(&mut adjacency);

    Ok(Graph::from_adjacency(&adjacency))
}

/// Off-diagonal entries of `tri_matrix` as per-row `(column, weight)` lists.
/// Duplicate entries are summed.
fn adjacency_lists<N>(tri_matrix: &TriMat<N>) -> Vec<Vec<(NodeId, EdgeWeight)>>
where
    N: Num + Clone + ToPrimitive,
{
    let csr_matrix = tri_matrix.to_csr::<usize>();
    let n = csr_matrix.rows().max(csr_matrix.cols());

    let mut adjacency: Vec<Vec<(NodeId, EdgeWeight)>> = vec![Vec::new(); n];
    for (row, row_vec) in csr_matrix.outer_iterator().enumerate() {
        adjacency[row].extend(
            row_vec
                .iter()
                .filter(|&(col, _)| col != row)
                .map(|(col, weight)| (col, weight.to_f64().unwrap_or(0.0))),
        );
    }
    adjacency
}

/// Reads one feature vector per line, values separated by whitespace or commas.
/// Empty lines and lines starting with `#` or `%` are skipped.
pub fn read_features(file_path: &Path) -> Result<Vec<FeatureVec>, Error> {
    let reader = BufReader::new(File::open(file_path)?);
    let mut rows = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%') {
            continue;
        }
        let values = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<f64>().map_err(|err| Error::Parse {
                    line: index + 1,
                    message: format!("{:?}: {}", token, err),
                })
            })
            .collect::<Result<Vec<f64>, Error>>()?;
        rows.push(FeatureVec::from_vec(values));
    }
    Ok(rows)
}

/// Gives node `i` of `graph` the feature vector `rows[i]`.
pub fn attach_features(graph: &mut Graph, rows: Vec<FeatureVec>) -> Result<(), Error> {
    if rows.len() != graph.number_of_nodes() {
        return Err(Error::InputLenMismatch {
            expected: graph.number_of_nodes(),
            actual: rows.len(),
        });
    }
    for (node, row) in rows.into_iter().enumerate() {
        graph.set_feature_vec(node, row);
    }
    Ok(())
}

fn write_gdf_nodes(file: &mut impl Write, graph: &Graph, class: i32, offset: usize) -> std::io::Result<()> {
    for node in graph.nodes() {
        write!(
            file,
            "{},{},{},{}",
            node + offset,
            class,
            graph.partition_index(node),
            graph.node_weight(node)
        )?;
        for feature in graph.feature_vec(node).iter() {
            write!(file, ",{}", feature)?;
        }
        writeln!(file)?;
    }
    Ok(())
}

/// Writes a minority (class -1) and a majority (class 1) graph into one GDF file.
/// Majority node ids are shifted behind the minority ones.
pub fn write_graph_gdf(min: &Graph, maj: &Graph, file_path: &Path) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(file_path)?);
    let min_nodes = min.number_of_nodes();

    write!(file, "nodedef>name VARCHAR,class VARCHAR,partition VARCHAR,weight DOUBLE")?;
    for i in 0..min.feature_dimension() {
        write!(file, ",feature{} DOUBLE", i)?;
    }
    writeln!(file)?;

    write_gdf_nodes(&mut file, min, -1, 0)?;
    write_gdf_nodes(&mut file, maj, 1, min_nodes)?;

    writeln!(file, "edgedef>from VARCHAR,to VARCHAR")?;
    for (graph, offset) in [(min, 0), (maj, min_nodes)] {
        for node in graph.nodes() {
            for e in graph.out_edges(node) {
                writeln!(file, "{},{}", node + offset, graph.edge_target(e) + offset)?;
            }
        }
    }
    file.flush()
}

/// Write the partition index of every node to a file.
pub fn write_partition_data_to_file(graph: &Graph, file_path: &Path) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(file_path)?);
    for node in graph.nodes() {
        writeln!(file, "vertex {} => partition {}", node, graph.partition_index(node))?;
    }
    file.flush()
}
