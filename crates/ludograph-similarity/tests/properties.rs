use ludograph_similarity::*;
use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn build_index(sets: &[BTreeSet<u64>]) -> AttributeIndex {
    AttributeIndex::from_sets(sets.iter().enumerate().map(|(id, attrs)| {
        (
            id as EntityId,
            attrs.iter().map(|&a| AttributeKey::mechanic(a)).collect::<Vec<_>>(),
        )
    }))
    .unwrap()
}

fn config(workers: usize) -> SimilarityConfig {
    SimilarityConfig {
        gate: EmissionGate::NonZero,
        worker_count: workers,
        progress_interval: 0,
    }
}

fn attribute_sets() -> impl Strategy<Value = Vec<BTreeSet<u64>>> {
    vec(btree_set(0u64..12, 0..6), 1..24)
}

proptest! {
    #[test]
    fn weight_is_symmetric(sets in attribute_sets()) {
        let index = build_index(&sets);
        for i in index.entity_ids() {
            for j in index.entity_ids() {
                let a = index.attributes(*i);
                let b = index.attributes(*j);
                prop_assert_eq!(pair_weight(a, b), pair_weight(b, a));
            }
        }
    }

    #[test]
    fn disjoint_sets_never_connect(sets in attribute_sets()) {
        let index = build_index(&sets);
        let edges = compute_similarity_edges(&index, &config(2)).unwrap();
        for e in &edges {
            let a = &sets[e.source as usize];
            let b = &sets[e.target as usize];
            prop_assert!(!a.is_disjoint(b));
            prop_assert!(e.weight > 0.0 && e.weight <= MAX_WEIGHT);
            prop_assert!(e.source < e.target);
        }
    }

    #[test]
    fn sharding_matches_single_worker(sets in attribute_sets(), workers in 1usize..9) {
        let index = build_index(&sets);
        let single = compute_similarity_edges(&index, &config(1)).unwrap();

        // Concatenate raw shard output, ignoring order
        let mut sharded = Vec::new();
        for (shard_idx, shard) in partition_round_robin(index.len(), workers).iter().enumerate() {
            sharded.extend(compute_shard(&index, shard_idx, shard, EmissionGate::NonZero, 0).unwrap());
        }
        sharded.sort_by_key(|e| (e.source, e.target));
        prop_assert_eq!(single, sharded);
    }

    #[test]
    fn every_entity_keeps_its_local_share(sets in attribute_sets(), keep in 0.05f64..=1.0) {
        let index = build_index(&sets);
        let edges = compute_similarity_edges(&index, &config(3)).unwrap();
        let outcome = sparsify(&edges, keep).unwrap();

        for &entity in index.entity_ids() {
            let before = edges.iter().filter(|e| e.touches(entity)).count();
            let after = outcome.edges.iter().filter(|e| e.touches(entity)).count();
            let floor = (before as f64 * keep).floor() as usize;
            prop_assert!(after >= floor, "entity {} kept {} < {}", entity, after, floor);
        }
    }

    #[test]
    fn full_retention_changes_nothing(sets in attribute_sets()) {
        let index = build_index(&sets);
        let edges = compute_similarity_edges(&index, &config(2)).unwrap();
        let once = sparsify(&edges, 1.0).unwrap();
        prop_assert_eq!(once.edges.len(), edges.len());
        let twice = sparsify(&once.edges, 1.0).unwrap();
        prop_assert_eq!(once.edges, twice.edges);
    }
}
