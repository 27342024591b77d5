//! Shared types for the similarity algorithms
//!
//! Entity and attribute identifiers plus the weighted edge record that flows
//! from the similarity calculator into the sparsifier.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity Identifier type (u64)
pub type EntityId = u64;

/// Tag namespace an attribute belongs to.
///
/// Ids are only unique inside one family: category 3 and mechanic 3 are
/// different attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AttributeFamily {
    Category,
    Mechanic,
    /// Used when categories are the entities and games are their tags
    Game,
}

/// A single attribute, qualified by its family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AttributeKey {
    pub family: AttributeFamily,
    pub id: u64,
}

impl AttributeKey {
    pub fn new(family: AttributeFamily, id: u64) -> Self {
        Self { family, id }
    }

    pub fn category(id: u64) -> Self {
        Self::new(AttributeFamily::Category, id)
    }

    pub fn mechanic(id: u64) -> Self {
        Self::new(AttributeFamily::Mechanic, id)
    }

    pub fn game(id: u64) -> Self {
        Self::new(AttributeFamily::Game, id)
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.family, self.id)
    }
}

/// Undirected weighted edge, stored once with a fixed source/target order.
///
/// The similarity calculator always emits `source < target`; the
/// sparsifier accepts any order.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeightedEdge {
    pub source: EntityId,
    pub target: EntityId,
    pub weight: f64,
}

impl WeightedEdge {
    pub fn new(source: EntityId, target: EntityId, weight: f64) -> Self {
        Self { source, target, weight }
    }

    /// True when `entity` is one of the two endpoints
    pub fn touches(&self, entity: EntityId) -> bool {
        self.source == entity || self.target == entity
    }
}
