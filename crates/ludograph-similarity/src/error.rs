//! Error types for index construction, similarity computation and sparsification

use crate::common::EntityId;
use thiserror::Error;

/// Errors raised while building an attribute index
#[derive(Error, Debug, PartialEq)]
pub enum IndexError {
    #[error("Entity {0} declared more than once")]
    DuplicateEntity(EntityId),
}

pub type IndexResult<T> = Result<T, IndexError>;

/// Errors raised by the similarity calculator
#[derive(Error, Debug)]
pub enum SimilarityError {
    /// The attribute slice of an owned entity is not strictly ascending
    #[error("Malformed attribute set for entity {entity} in shard {shard}")]
    MalformedAttributeSet { entity: EntityId, shard: usize },

    #[error("Worker count must be positive")]
    NoWorkers,

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type SimilarityResult<T> = Result<T, SimilarityError>;

/// Errors raised by the edge sparsifier
#[derive(Error, Debug, PartialEq)]
pub enum SparsifyError {
    #[error("Keep fraction must be in (0, 1], got {0}")]
    InvalidKeepFraction(f64),
}

pub type SparsifyResult<T> = Result<T, SparsifyError>;
