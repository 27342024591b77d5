//! Attribute index
//!
//! Maps every entity of the universe to its set of attributes. The index is
//! built once, then shared read-only by all similarity workers.
//!
//! Layout follows the CSR idea: entities live in a dense arena sorted by id
//! (dense index == rank of the id), and each entity owns a slice of one
//! contiguous buffer of interned attribute ids. Every slice is sorted and
//! de-duplicated, so set intersection is a linear merge.

use crate::common::{AttributeKey, EntityId};
use crate::error::{IndexError, IndexResult};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Dense attribute identifier assigned during interning
pub type AttributeId = u32;

/// Immutable entity -> attribute-set index
#[derive(Debug, Clone, Default)]
pub struct AttributeIndex {
    /// Mapping from dense index (0..N) back to EntityId, ascending
    index_to_entity: Vec<EntityId>,
    /// Mapping from EntityId to dense index
    entity_to_index: FxHashMap<EntityId, usize>,
    /// Offsets into `attributes`. Size = entity_count + 1
    offsets: Vec<usize>,
    /// Contiguous buffer of interned attribute ids
    attributes: Vec<AttributeId>,
    /// Number of distinct attributes seen
    attribute_count: usize,
}

impl AttributeIndex {
    /// Shorthand for building from `(entity, attributes)` pairs
    pub fn from_sets<I, A>(sets: I) -> IndexResult<Self>
    where
        I: IntoIterator<Item = (EntityId, A)>,
        A: IntoIterator<Item = AttributeKey>,
    {
        let mut builder = AttributeIndexBuilder::new();
        for (entity, attrs) in sets {
            builder.add_entity(entity)?;
            for key in attrs {
                builder.add_incidence(entity, key);
            }
        }
        Ok(builder.build())
    }

    /// Number of entities in the universe
    pub fn len(&self) -> usize {
        self.index_to_entity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_entity.is_empty()
    }

    /// Number of distinct attributes across all entities
    pub fn attribute_count(&self) -> usize {
        self.attribute_count
    }

    /// Total number of (entity, attribute) pairs after de-duplication
    pub fn incidence_count(&self) -> usize {
        self.attributes.len()
    }

    /// All entity ids, ascending
    pub fn entity_ids(&self) -> &[EntityId] {
        &self.index_to_entity
    }

    /// Entity id stored at a dense index
    pub fn entity_at(&self, idx: usize) -> EntityId {
        self.index_to_entity[idx]
    }

    /// Dense index of an entity, if it belongs to the universe
    pub fn index_of(&self, entity: EntityId) -> Option<usize> {
        self.entity_to_index.get(&entity).copied()
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entity_to_index.contains_key(&entity)
    }

    /// Attribute slice of the entity at a dense index
    pub fn attributes_at(&self, idx: usize) -> &[AttributeId] {
        &self.attributes[self.offsets[idx]..self.offsets[idx + 1]]
    }

    /// Attribute set of an entity.
    ///
    /// Entities without attributes, and ids outside the universe, yield the
    /// empty slice.
    pub fn attributes(&self, entity: EntityId) -> &[AttributeId] {
        match self.index_of(entity) {
            Some(idx) => self.attributes_at(idx),
            None => &[],
        }
    }

    /// Size of an entity's attribute set
    pub fn set_size(&self, entity: EntityId) -> usize {
        self.attributes(entity).len()
    }

    /// Whether the slice at `idx` is strictly ascending (sorted, no duplicates)
    pub(crate) fn is_well_formed(&self, idx: usize) -> bool {
        self.attributes_at(idx).windows(2).all(|w| w[0] < w[1])
    }

    /// Assemble an index from already-flattened parts without any checks
    #[cfg(test)]
    pub(crate) fn from_raw_parts(
        index_to_entity: Vec<EntityId>,
        offsets: Vec<usize>,
        attributes: Vec<AttributeId>,
    ) -> Self {
        let entity_to_index = index_to_entity
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();
        let attribute_count = attributes.iter().collect::<FxHashSet<_>>().len();
        Self {
            index_to_entity,
            entity_to_index,
            offsets,
            attributes,
            attribute_count,
        }
    }
}

/// Incremental builder for [`AttributeIndex`]
#[derive(Debug, Default)]
pub struct AttributeIndexBuilder {
    universe: FxHashSet<EntityId>,
    declared: FxHashSet<EntityId>,
    incidences: Vec<(EntityId, AttributeKey)>,
}

impl AttributeIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an entity. Declaring the same id twice is an error.
    pub fn add_entity(&mut self, entity: EntityId) -> IndexResult<()> {
        if !self.declared.insert(entity) {
            return Err(IndexError::DuplicateEntity(entity));
        }
        self.universe.insert(entity);
        Ok(())
    }

    /// Record that `entity` carries `key`. Undeclared entities join the universe.
    pub fn add_incidence(&mut self, entity: EntityId, key: AttributeKey) {
        self.universe.insert(entity);
        self.incidences.push((entity, key));
    }

    /// Freeze into an immutable index
    pub fn build(self) -> AttributeIndex {
        let mut index_to_entity: Vec<EntityId> = self.universe.into_iter().collect();
        index_to_entity.sort_unstable();

        let entity_to_index: FxHashMap<EntityId, usize> = index_to_entity
            .iter()
            .enumerate()
            .map(|(idx, &id)| (id, idx))
            .collect();

        // Intern keys in sorted order so dense ids are reproducible
        let mut keys: Vec<AttributeKey> = self.incidences.iter().map(|(_, k)| *k).collect();
        keys.sort_unstable();
        keys.dedup();
        let interned: FxHashMap<AttributeKey, AttributeId> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (*k, i as AttributeId))
            .collect();

        let mut per_entity: Vec<Vec<AttributeId>> = vec![Vec::new(); index_to_entity.len()];
        for (entity, key) in &self.incidences {
            per_entity[entity_to_index[entity]].push(interned[key]);
        }

        let mut offsets = Vec::with_capacity(index_to_entity.len() + 1);
        let mut attributes = Vec::with_capacity(self.incidences.len());
        offsets.push(0);
        for mut set in per_entity {
            set.sort_unstable();
            set.dedup();
            attributes.extend(set);
            offsets.push(attributes.len());
        }

        debug!(
            entities = index_to_entity.len(),
            attributes = keys.len(),
            incidences = attributes.len(),
            "Built attribute index"
        );

        AttributeIndex {
            index_to_entity,
            entity_to_index,
            offsets,
            attributes,
            attribute_count: keys.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_empty_sets() {
        let index = AttributeIndex::from_sets(vec![
            (10, vec![AttributeKey::category(1), AttributeKey::category(2)]),
            (3, vec![]),
            (7, vec![AttributeKey::mechanic(1)]),
        ])
        .unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.entity_ids(), &[3, 7, 10]);
        assert_eq!(index.set_size(10), 2);
        assert_eq!(index.set_size(7), 1);
        assert!(index.attributes(3).is_empty());
        // Unknown ids behave like empty sets
        assert!(index.attributes(999).is_empty());
        assert!(!index.contains(999));
    }

    #[test]
    fn test_families_do_not_collide() {
        let index = AttributeIndex::from_sets(vec![
            (1, vec![AttributeKey::category(5)]),
            (2, vec![AttributeKey::mechanic(5)]),
        ])
        .unwrap();

        assert_eq!(index.attribute_count(), 2);
        assert_ne!(index.attributes(1), index.attributes(2));
    }

    #[test]
    fn test_duplicate_incidences_collapse() {
        let mut builder = AttributeIndexBuilder::new();
        builder.add_entity(1).unwrap();
        builder.add_incidence(1, AttributeKey::category(4));
        builder.add_incidence(1, AttributeKey::category(4));
        builder.add_incidence(1, AttributeKey::category(2));
        let index = builder.build();

        assert_eq!(index.set_size(1), 2);
        assert_eq!(index.incidence_count(), 2);
        assert!(index.is_well_formed(0));
    }

    #[test]
    fn test_duplicate_entity_rejected() {
        let mut builder = AttributeIndexBuilder::new();
        builder.add_entity(4).unwrap();
        assert_eq!(builder.add_entity(4), Err(IndexError::DuplicateEntity(4)));
    }

    #[test]
    fn test_incidence_registers_entity() {
        let mut builder = AttributeIndexBuilder::new();
        builder.add_incidence(42, AttributeKey::game(1));
        // A later explicit declaration is still accepted once
        builder.add_entity(42).unwrap();
        let index = builder.build();

        assert_eq!(index.entity_ids(), &[42]);
        assert_eq!(index.set_size(42), 1);
    }
}
