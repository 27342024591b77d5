//! Ludograph
//!
//! Builds board game similarity graphs for network visualization tools.
//!
//! # Pipeline
//!
//! 1. Load the relational extract ([`dataset::Dataset`])
//! 2. Index each entity's attributes (categories and mechanics per game, or
//!    co-occurring games per category)
//! 3. Score every pair by two-perspective attribute overlap on a fixed-size
//!    worker pool
//! 4. Keep each node's top `keep_percentage` edges, an edge surviving when
//!    either endpoint keeps it
//! 5. Write `;`-separated node and edge lists
//!
//! ## Example Usage
//!
//! ```rust
//! use ludograph::{build_graph, BuildConfig, Dataset};
//!
//! let json = r#"{
//!     "boardgames": [
//!         {"id": 1, "name": "A", "year_published": 2001, "avg_rating": 7.0,
//!          "num_ratings": 10, "avg_weight": 2.0, "num_weights": 3},
//!         {"id": 2, "name": "B", "year_published": 2002, "avg_rating": 6.5,
//!          "num_ratings": 12, "avg_weight": 2.5, "num_weights": 4}
//!     ],
//!     "categories": [{"id": 1, "name": "Card Game"}],
//!     "categories_to_boardgames": [
//!         {"category_id": 1, "boardgame_id": 1},
//!         {"category_id": 1, "boardgame_id": 2}
//!     ]
//! }"#;
//!
//! let dataset = Dataset::from_reader(json.as_bytes()).unwrap();
//! let config = BuildConfig { keep_percentage: 1.0, worker_count: 2, ..Default::default() };
//! let graph = build_graph(&dataset, &config).unwrap();
//!
//! assert_eq!(graph.edges.len(), 1);
//! assert_eq!(graph.edges[0].weight, 200.0);
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod dataset;
pub mod export;
pub mod logging;
pub mod nodes;
pub mod pipeline;

pub use config::{BuildConfig, ConfigError, ConfigResult, GraphMode};
pub use dataset::{Dataset, DatasetError, DatasetResult};
pub use export::{ExportError, ExportResult};
pub use nodes::{Cell, NodeList, NodeRow};
pub use pipeline::{
    build_graph, filter_edge_file, BuildError, BuildResult, BuildStats, FilterStats, GraphBuild,
    OutputPaths,
};

pub use ludograph_similarity as similarity;
pub use ludograph_similarity::{EmissionGate, WeightedEdge};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
