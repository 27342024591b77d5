//! Similarity graph algorithms for Ludograph
//!
//! - [`index`]: immutable entity -> attribute-set index
//! - [`similarity`]: two-perspective overlap weights on a fixed worker pool
//! - [`sparsify`]: per-entity top-K% edge retention with union merging

pub mod common;
pub mod error;
pub mod index;
pub mod similarity;
pub mod sparsify;

pub use common::{AttributeFamily, AttributeKey, EntityId, WeightedEdge};
pub use error::{
    IndexError, IndexResult, SimilarityError, SimilarityResult, SparsifyError, SparsifyResult,
};
pub use index::{AttributeId, AttributeIndex, AttributeIndexBuilder};
pub use similarity::{
    compute_shard, compute_similarity_edges, pair_weight, partition_round_robin, EmissionGate,
    SimilarityConfig, MAX_WEIGHT,
};
pub use sparsify::{retention_decisions, sparsify, RetentionDecision, SparsifyOutcome};
