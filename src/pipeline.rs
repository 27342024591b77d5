//! End-to-end graph build
//!
//! dataset -> attribute index -> similarity edges -> sparsified edges,
//! with the node list derived from the dataset alongside. Nothing is written
//! until the whole build has succeeded.

use crate::config::{BuildConfig, ConfigError, GraphMode};
use crate::dataset::{Dataset, DatasetError};
use crate::export::{self, ExportError};
use crate::nodes::{self, NodeList};
use ludograph_similarity::{
    compute_similarity_edges, sparsify, SimilarityError, SparsifyError, WeightedEdge,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;

/// Any failure of a build or filter run
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Similarity error: {0}")]
    Similarity(#[from] SimilarityError),

    #[error("Sparsification error: {0}")]
    Sparsify(#[from] SparsifyError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

pub type BuildResult<T> = Result<T, BuildError>;

/// Counters and timings of a build
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    pub entities: usize,
    pub attributes: usize,
    pub raw_edges: usize,
    pub kept_edges: usize,
    pub similarity_time: Duration,
    pub sparsify_time: Duration,
}

/// Output of a successful build
#[derive(Debug, Clone)]
pub struct GraphBuild {
    pub mode: GraphMode,
    pub nodes: NodeList,
    /// All emitted edges, ascending by (source, target)
    pub raw_edges: Vec<WeightedEdge>,
    /// Sparsified edges, weight descending
    pub edges: Vec<WeightedEdge>,
    pub stats: BuildStats,
}

/// Where a build writes its files
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub nodes: PathBuf,
    pub edges: PathBuf,
    /// Optional dump of the unfiltered edge list
    pub raw_edges: Option<PathBuf>,
}

/// Build the similarity graph for the configured mode
pub fn build_graph(dataset: &Dataset, config: &BuildConfig) -> BuildResult<GraphBuild> {
    config.validate()?;
    dataset.validate()?;

    let index = match config.mode {
        GraphMode::Games => dataset.game_index()?,
        GraphMode::Categories => dataset.category_index()?,
    };
    info!(
        mode = %config.mode,
        entities = index.len(),
        attributes = index.attribute_count(),
        workers = config.worker_count,
        "Computing similarity"
    );

    let started = Instant::now();
    let raw_edges = compute_similarity_edges(&index, &config.similarity_config())?;
    let similarity_time = started.elapsed();

    let started = Instant::now();
    let outcome = sparsify(&raw_edges, config.keep_percentage)?;
    let sparsify_time = started.elapsed();

    let nodes = match config.mode {
        GraphMode::Games => nodes::game_nodes(dataset),
        GraphMode::Categories => nodes::category_nodes(dataset),
    };

    let stats = BuildStats {
        entities: index.len(),
        attributes: index.attribute_count(),
        raw_edges: raw_edges.len(),
        kept_edges: outcome.edges.len(),
        similarity_time,
        sparsify_time,
    };

    Ok(GraphBuild {
        mode: config.mode,
        nodes,
        raw_edges,
        edges: outcome.edges,
        stats,
    })
}

impl GraphBuild {
    pub fn write(&self, outputs: &OutputPaths) -> BuildResult<()> {
        if let Some(path) = &outputs.raw_edges {
            export::write_edge_list_file(path, &self.raw_edges)?;
        }
        export::write_edge_list_file(&outputs.edges, &self.edges)?;
        export::write_node_list_file(&outputs.nodes, &self.nodes)?;
        Ok(())
    }
}

/// Counters of a standalone filter run
#[derive(Debug, Clone, Default)]
pub struct FilterStats {
    pub input_edges: usize,
    pub kept_edges: usize,
    pub elapsed: Duration,
}

/// Re-sparsify a raw edge list file into `output`
pub fn filter_edge_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    keep_percentage: f64,
) -> BuildResult<FilterStats> {
    ludograph_similarity::sparsify::validate_keep_fraction(keep_percentage)?;

    let started = Instant::now();
    let edges = export::read_edge_list_file(input)?;
    let outcome = sparsify(&edges, keep_percentage)?;
    export::write_edge_list_file(output, &outcome.edges)?;

    Ok(FilterStats {
        input_edges: edges.len(),
        kept_edges: outcome.edges.len(),
        elapsed: started.elapsed(),
    })
}
