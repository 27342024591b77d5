//! Pairwise attribute-overlap similarity
//!
//! Every unordered pair (i, j), i < j, is scored from both sides:
//!
//! ```text
//! perspective(i, j) = |attrs(i) ∩ attrs(j)| / |attrs(i)| * 100
//! weight(i, j)      = perspective(i, j) + perspective(j, i)
//! ```
//!
//! The universe is split round-robin into one shard per worker. A worker
//! owns the smaller endpoint of each pair it scores, so every pair is
//! produced exactly once and shard results only need concatenating.

use crate::common::WeightedEdge;
use crate::error::{SimilarityError, SimilarityResult};
use crate::index::{AttributeId, AttributeIndex};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Highest weight a pair can reach (both perspectives at 100%)
pub const MAX_WEIGHT: f64 = 200.0;

/// Decides which scored pairs become edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmissionGate {
    /// Emit every pair with a positive weight
    NonZero,
    /// Emit pairs whose weight is positive and at least the threshold
    Threshold(f64),
}

impl EmissionGate {
    pub fn admits(&self, weight: f64) -> bool {
        match *self {
            EmissionGate::NonZero => weight > 0.0,
            EmissionGate::Threshold(min) => weight > 0.0 && weight >= min,
        }
    }
}

/// Similarity calculator configuration
#[derive(Debug, Clone)]
pub struct SimilarityConfig {
    pub gate: EmissionGate,
    /// Size of the worker pool and number of shards
    pub worker_count: usize,
    /// Log progress every N owned entities (0 disables)
    pub progress_interval: usize,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            gate: EmissionGate::Threshold(75.0),
            worker_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            progress_interval: 100,
        }
    }
}

/// Size of the intersection of two strictly ascending slices
pub fn intersection_size(a: &[AttributeId], b: &[AttributeId]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

/// Overlap as a percentage of one side's set size. Empty sets score 0.
pub fn perspective(overlap: usize, own_size: usize) -> f64 {
    if own_size == 0 {
        0.0
    } else {
        overlap as f64 / own_size as f64 * 100.0
    }
}

/// Two-perspective weight of a pair of attribute sets
pub fn pair_weight(a: &[AttributeId], b: &[AttributeId]) -> f64 {
    let overlap = intersection_size(a, b);
    perspective(overlap, a.len()) + perspective(overlap, b.len())
}

/// Static round-robin assignment of dense indices `0..n` to `workers` shards
pub fn partition_round_robin(n: usize, workers: usize) -> Vec<Vec<usize>> {
    let workers = workers.max(1);
    let mut shards: Vec<Vec<usize>> = (0..workers)
        .map(|_| Vec::with_capacity(n / workers + 1))
        .collect();
    for idx in 0..n {
        shards[idx % workers].push(idx);
    }
    shards
}

/// Score every pair whose smaller endpoint belongs to `shard`.
///
/// Fails the whole shard if an owned entity has a malformed attribute set.
pub fn compute_shard(
    index: &AttributeIndex,
    shard_idx: usize,
    shard: &[usize],
    gate: EmissionGate,
    progress_interval: usize,
) -> SimilarityResult<Vec<WeightedEdge>> {
    let n = index.len();
    let mut edges = Vec::new();
    let mut window_start = Instant::now();

    for (processed, &i) in shard.iter().enumerate() {
        if !index.is_well_formed(i) {
            return Err(SimilarityError::MalformedAttributeSet {
                entity: index.entity_at(i),
                shard: shard_idx,
            });
        }

        let own = index.attributes_at(i);
        if !own.is_empty() {
            let source = index.entity_at(i);
            for j in (i + 1)..n {
                let weight = pair_weight(own, index.attributes_at(j));
                if gate.admits(weight) {
                    edges.push(WeightedEdge::new(source, index.entity_at(j), weight));
                }
            }
        }

        let done = processed + 1;
        if progress_interval > 0 && done % progress_interval == 0 {
            debug!(
                shard = shard_idx,
                processed = done,
                total = shard.len(),
                elapsed_ms = window_start.elapsed().as_millis() as u64,
                "Similarity progress"
            );
            window_start = Instant::now();
        }
    }

    Ok(edges)
}

/// Compute all qualifying edges of the universe on a fixed-size worker pool.
///
/// Blocks until every shard has finished. Any failing shard fails the call
/// and no edges are returned. The result is ordered by `(source, target)`
/// regardless of the worker count.
pub fn compute_similarity_edges(
    index: &AttributeIndex,
    config: &SimilarityConfig,
) -> SimilarityResult<Vec<WeightedEdge>> {
    if config.worker_count == 0 {
        return Err(SimilarityError::NoWorkers);
    }

    let started = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_count)
        .thread_name(|i| format!("similarity-{}", i))
        .build()?;

    let shards = partition_round_robin(index.len(), config.worker_count);
    let gate = config.gate;
    let progress_interval = config.progress_interval;

    let per_shard: Vec<Vec<WeightedEdge>> = pool.install(|| {
        shards
            .par_iter()
            .enumerate()
            .map(|(shard_idx, shard)| {
                compute_shard(index, shard_idx, shard, gate, progress_interval)
            })
            .collect::<SimilarityResult<Vec<_>>>()
    })?;

    let mut edges: Vec<WeightedEdge> = per_shard.into_iter().flatten().collect();
    edges.sort_unstable_by_key(|e| (e.source, e.target));

    info!(
        entities = index.len(),
        workers = config.worker_count,
        edges = edges.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Computed similarity edges"
    );

    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::AttributeKey;
    use approx::assert_relative_eq;

    fn cats(ids: &[u64]) -> Vec<AttributeKey> {
        ids.iter().map(|&id| AttributeKey::category(id)).collect()
    }

    fn config(gate: EmissionGate, workers: usize) -> SimilarityConfig {
        SimilarityConfig {
            gate,
            worker_count: workers,
            progress_interval: 0,
        }
    }

    #[test]
    fn test_three_entity_scenario() {
        // A {1,2,3}, B {2,3,4}, C {9}
        let index = AttributeIndex::from_sets(vec![
            (1, cats(&[1, 2, 3])),
            (2, cats(&[2, 3, 4])),
            (3, cats(&[9])),
        ])
        .unwrap();

        let ab = pair_weight(index.attributes(1), index.attributes(2));
        assert_relative_eq!(ab, 400.0 / 3.0, epsilon = 1e-9);
        assert_eq!(pair_weight(index.attributes(1), index.attributes(3)), 0.0);
        assert_eq!(pair_weight(index.attributes(2), index.attributes(3)), 0.0);

        let edges =
            compute_similarity_edges(&index, &config(EmissionGate::Threshold(75.0), 2)).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].source, edges[0].target), (1, 2));
        assert_relative_eq!(edges[0].weight, 133.333, epsilon = 1e-3);
    }

    #[test]
    fn test_perspectives_differ_but_weight_is_symmetric() {
        let small = [1u32, 2];
        let large = [1u32, 2, 3, 4, 5];
        assert_relative_eq!(perspective(intersection_size(&small, &large), small.len()), 100.0);
        assert_relative_eq!(perspective(intersection_size(&large, &small), large.len()), 40.0);
        assert_eq!(pair_weight(&small, &large), pair_weight(&large, &small));
        assert_relative_eq!(pair_weight(&small, &large), 140.0);
    }

    #[test]
    fn test_empty_set_contributes_zero() {
        assert_eq!(perspective(0, 0), 0.0);
        assert_eq!(pair_weight(&[], &[1, 2]), 0.0);
        assert_eq!(pair_weight(&[], &[]), 0.0);
    }

    #[test]
    fn test_identical_sets_reach_max_weight() {
        assert_relative_eq!(pair_weight(&[3, 8], &[3, 8]), MAX_WEIGHT);
    }

    #[test]
    fn test_gates() {
        assert!(EmissionGate::NonZero.admits(0.5));
        assert!(!EmissionGate::NonZero.admits(0.0));
        assert!(EmissionGate::Threshold(75.0).admits(75.0));
        assert!(!EmissionGate::Threshold(75.0).admits(74.99));
        // A zero threshold still drops disjoint pairs
        assert!(!EmissionGate::Threshold(0.0).admits(0.0));
    }

    #[test]
    fn test_non_zero_gate_emits_weak_pairs() {
        let index = AttributeIndex::from_sets(vec![
            (1, cats(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10])),
            (2, cats(&[10, 11, 12, 13, 14, 15, 16, 17, 18, 19])),
        ])
        .unwrap();

        let strict =
            compute_similarity_edges(&index, &config(EmissionGate::Threshold(75.0), 1)).unwrap();
        assert!(strict.is_empty());

        let loose = compute_similarity_edges(&index, &config(EmissionGate::NonZero, 1)).unwrap();
        assert_eq!(loose.len(), 1);
        assert_relative_eq!(loose[0].weight, 20.0);
    }

    #[test]
    fn test_round_robin_partition() {
        let shards = partition_round_robin(7, 3);
        assert_eq!(shards, vec![vec![0, 3, 6], vec![1, 4], vec![2, 5]]);

        // More workers than entities leaves some shards empty
        let shards = partition_round_robin(2, 4);
        assert_eq!(shards.iter().filter(|s| s.is_empty()).count(), 2);
    }

    #[test]
    fn test_worker_count_does_not_change_result() {
        let sets: Vec<(u64, Vec<AttributeKey>)> = (0..40u64)
            .map(|id| (id * 3 + 1, cats(&[id % 4, id % 7 + 10, id % 3 + 20])))
            .collect();
        let index = AttributeIndex::from_sets(sets).unwrap();

        let single = compute_similarity_edges(&index, &config(EmissionGate::NonZero, 1)).unwrap();
        for workers in [2, 3, 8, 64] {
            let multi =
                compute_similarity_edges(&index, &config(EmissionGate::NonZero, workers)).unwrap();
            assert_eq!(single, multi, "worker count {} diverged", workers);
        }
        assert!(single.iter().all(|e| e.source < e.target));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let index = AttributeIndex::from_sets(vec![(1, cats(&[1]))]).unwrap();
        let err = compute_similarity_edges(&index, &config(EmissionGate::NonZero, 0)).unwrap_err();
        assert!(matches!(err, SimilarityError::NoWorkers));
    }

    #[test]
    fn test_malformed_set_fails_owning_shard() {
        // Entity 20 has an unsorted slice
        let index = AttributeIndex::from_raw_parts(
            vec![10, 20, 30],
            vec![0, 2, 4, 5],
            vec![0, 1, 3, 2, 1],
        );

        let shards = partition_round_robin(index.len(), 2);
        assert!(compute_shard(&index, 0, &shards[0], EmissionGate::NonZero, 0).is_ok());
        let err = compute_shard(&index, 1, &shards[1], EmissionGate::NonZero, 0).unwrap_err();
        match err {
            SimilarityError::MalformedAttributeSet { entity, shard } => {
                assert_eq!(entity, 20);
                assert_eq!(shard, 1);
            }
            other => panic!("unexpected error: {}", other),
        }

        // The whole build fails, nothing is returned
        assert!(compute_similarity_edges(&index, &config(EmissionGate::NonZero, 2)).is_err());
    }
}
