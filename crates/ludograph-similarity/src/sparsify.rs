//! Top-K% edge retention
//!
//! Every entity ranks its incident edges by weight and keeps the top
//! `floor(count * K)`. An edge survives when either endpoint keeps it:
//! a keep decision is permanent and overrides any removal proposed by the
//! other endpoint, whatever the processing order.

use crate::common::{EntityId, WeightedEdge};
use crate::error::{SparsifyError, SparsifyResult};
use std::collections::BTreeMap;
use tracing::info;

/// Per-edge retention state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionDecision {
    /// No endpoint has ranked the edge yet
    Unseen,
    /// Outside some endpoint's top-K and not kept by anyone so far
    Removable,
    /// Inside at least one endpoint's top-K
    Kept,
}

/// Result of a sparsification pass
#[derive(Debug, Clone)]
pub struct SparsifyOutcome {
    /// Surviving edges, weight descending (ties keep input order)
    pub edges: Vec<WeightedEdge>,
    /// Final decision per input edge, aligned with the input slice
    pub decisions: Vec<RetentionDecision>,
}

impl SparsifyOutcome {
    pub fn removed(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| **d == RetentionDecision::Removable)
            .count()
    }
}

/// Reject keep fractions outside (0, 1]
pub fn validate_keep_fraction(keep: f64) -> SparsifyResult<()> {
    if keep > 0.0 && keep <= 1.0 {
        Ok(())
    } else {
        Err(SparsifyError::InvalidKeepFraction(keep))
    }
}

/// Number of edges an entity keeps on its own: `floor(count * keep)`
pub fn local_keep_count(count: usize, keep: f64) -> usize {
    ((count as f64 * keep).floor() as usize).min(count)
}

/// Incident edge positions per entity, entities ascending, positions in input order
fn incident_edges(edges: &[WeightedEdge]) -> BTreeMap<EntityId, Vec<usize>> {
    let mut incident: BTreeMap<EntityId, Vec<usize>> = BTreeMap::new();
    for (pos, edge) in edges.iter().enumerate() {
        incident.entry(edge.source).or_default().push(pos);
        if edge.target != edge.source {
            incident.entry(edge.target).or_default().push(pos);
        }
    }
    incident
}

/// Run the per-entity ranking passes and merge them with the union rule
pub fn retention_decisions(
    edges: &[WeightedEdge],
    keep: f64,
) -> SparsifyResult<Vec<RetentionDecision>> {
    validate_keep_fraction(keep)?;

    let mut decisions = vec![RetentionDecision::Unseen; edges.len()];

    for (_entity, mut ranked) in incident_edges(edges) {
        // Stable: equal weights stay in input order
        ranked.sort_by(|&a, &b| edges[b].weight.total_cmp(&edges[a].weight));

        let end_index = local_keep_count(ranked.len(), keep);
        for &pos in &ranked[..end_index] {
            decisions[pos] = RetentionDecision::Kept;
        }
        for &pos in &ranked[end_index..] {
            if decisions[pos] == RetentionDecision::Unseen {
                decisions[pos] = RetentionDecision::Removable;
            }
        }
    }

    Ok(decisions)
}

/// Keep each entity's top `keep` fraction of incident edges.
///
/// The output holds every edge not marked removable, sorted by weight
/// descending.
pub fn sparsify(edges: &[WeightedEdge], keep: f64) -> SparsifyResult<SparsifyOutcome> {
    let decisions = retention_decisions(edges, keep)?;

    let mut survivors: Vec<WeightedEdge> = edges
        .iter()
        .zip(&decisions)
        .filter(|(_, d)| **d != RetentionDecision::Removable)
        .map(|(e, _)| *e)
        .collect();
    survivors.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    info!(
        input = edges.len(),
        kept = survivors.len(),
        keep_fraction = keep,
        "Sparsified edge list"
    );

    Ok(SparsifyOutcome {
        edges: survivors,
        decisions,
    })
}
