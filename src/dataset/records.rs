//! Row types of the relational extract

use serde::{Deserialize, Serialize};

/// A row of the `boardgames` table.
///
/// Only `id` takes part in similarity; the rest is carried to the node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardGameRecord {
    pub id: u64,
    #[serde(default)]
    pub bgg_id: Option<u64>,
    pub name: String,
    pub year_published: i32,
    pub avg_rating: f64,
    pub num_ratings: u64,
    pub avg_weight: f64,
    pub num_weights: u64,
}

/// A row of the `categories` or `mechanics` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLink {
    pub category_id: u64,
    pub boardgame_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MechanicLink {
    pub mechanic_id: u64,
    pub boardgame_id: u64,
}
