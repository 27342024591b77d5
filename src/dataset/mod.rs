//! Relational extract of the board game database
//!
//! The extract is a JSON snapshot holding the flat tables the graph builder
//! needs: board games, categories, mechanics, and the two link tables. It is
//! loaded and validated in full before any similarity work starts.

pub mod records;

pub use records::{BoardGameRecord, CategoryLink, MechanicLink, TagRecord};

use ludograph_similarity::{AttributeIndex, AttributeIndexBuilder, AttributeKey, IndexError};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while loading or validating a dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate id {id} in table {table}")]
    DuplicateId { table: &'static str, id: u64 },

    #[error("Duplicate link ({tag_id}, {boardgame_id}) in table {table}")]
    DuplicateLink {
        table: &'static str,
        tag_id: u64,
        boardgame_id: u64,
    },

    #[error("Table {table} references unknown {column} {id}")]
    DanglingReference {
        table: &'static str,
        column: &'static str,
        id: u64,
    },

    #[error("Index error: {0}")]
    Index(#[from] IndexError),
}

pub type DatasetResult<T> = Result<T, DatasetError>;

/// Fully materialized relational extract
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub boardgames: Vec<BoardGameRecord>,
    pub categories: Vec<TagRecord>,
    #[serde(default)]
    pub mechanics: Vec<TagRecord>,
    pub categories_to_boardgames: Vec<CategoryLink>,
    #[serde(default)]
    pub mechanics_to_boardgames: Vec<MechanicLink>,
}

impl Dataset {
    /// Load and validate a JSON snapshot
    pub fn from_json_file(path: impl AsRef<Path>) -> DatasetResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            boardgames = dataset.boardgames.len(),
            categories = dataset.categories.len(),
            mechanics = dataset.mechanics.len(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    /// Decode and validate a JSON snapshot from any reader
    pub fn from_reader<R: Read>(reader: R) -> DatasetResult<Self> {
        let dataset: Dataset = serde_json::from_reader(reader)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Check id and link uniqueness, and that every link points at a known row
    pub fn validate(&self) -> DatasetResult<()> {
        let games = unique_ids("boardgames", self.boardgames.iter().map(|g| g.id))?;
        let categories = unique_ids("categories", self.categories.iter().map(|c| c.id))?;
        let mechanics = unique_ids("mechanics", self.mechanics.iter().map(|m| m.id))?;

        for link in &self.categories_to_boardgames {
            check_reference("categories_to_boardgames", "category_id", link.category_id, &categories)?;
            check_reference("categories_to_boardgames", "boardgame_id", link.boardgame_id, &games)?;
        }
        for link in &self.mechanics_to_boardgames {
            check_reference("mechanics_to_boardgames", "mechanic_id", link.mechanic_id, &mechanics)?;
            check_reference("mechanics_to_boardgames", "boardgame_id", link.boardgame_id, &games)?;
        }

        unique_links(
            "categories_to_boardgames",
            self.categories_to_boardgames
                .iter()
                .map(|l| (l.category_id, l.boardgame_id)),
        )?;
        unique_links(
            "mechanics_to_boardgames",
            self.mechanics_to_boardgames
                .iter()
                .map(|l| (l.mechanic_id, l.boardgame_id)),
        )?;
        Ok(())
    }

    /// Games as entities, tagged with their categories and mechanics
    pub fn game_index(&self) -> DatasetResult<AttributeIndex> {
        let mut builder = AttributeIndexBuilder::new();
        for game in &self.boardgames {
            builder.add_entity(game.id)?;
        }
        for link in &self.categories_to_boardgames {
            builder.add_incidence(link.boardgame_id, AttributeKey::category(link.category_id));
        }
        for link in &self.mechanics_to_boardgames {
            builder.add_incidence(link.boardgame_id, AttributeKey::mechanic(link.mechanic_id));
        }
        let index = builder.build();

        let untagged = index
            .entity_ids()
            .iter()
            .filter(|&&id| index.set_size(id) == 0)
            .count();
        if untagged > 0 {
            warn!(untagged, "Games without categories or mechanics cannot connect");
        }
        Ok(index)
    }

    /// Categories as entities, tagged with the games they co-occur in.
    ///
    /// A game only counts when it carries at least two categories; a lone
    /// category on a game says nothing about its relation to others.
    pub fn category_index(&self) -> DatasetResult<AttributeIndex> {
        let mut per_game: FxHashMap<u64, FxHashSet<u64>> = FxHashMap::default();
        for link in &self.categories_to_boardgames {
            per_game
                .entry(link.boardgame_id)
                .or_default()
                .insert(link.category_id);
        }

        let mut builder = AttributeIndexBuilder::new();
        for category in &self.categories {
            builder.add_entity(category.id)?;
        }
        for (game, categories) in &per_game {
            if categories.len() < 2 {
                continue;
            }
            for &category in categories {
                builder.add_incidence(category, AttributeKey::game(*game));
            }
        }
        Ok(builder.build())
    }

    /// Distinct games of each category, grouped by category id
    pub fn games_by_category(&self) -> FxHashMap<u64, Vec<u64>> {
        let mut grouped: FxHashMap<u64, Vec<u64>> = FxHashMap::default();
        let mut seen = FxHashSet::default();
        for link in &self.categories_to_boardgames {
            if seen.insert((link.category_id, link.boardgame_id)) {
                grouped
                    .entry(link.category_id)
                    .or_default()
                    .push(link.boardgame_id);
            }
        }
        grouped
    }
}

fn unique_ids(
    table: &'static str,
    ids: impl Iterator<Item = u64>,
) -> DatasetResult<FxHashSet<u64>> {
    let mut seen = FxHashSet::default();
    for id in ids {
        if !seen.insert(id) {
            return Err(DatasetError::DuplicateId { table, id });
        }
    }
    Ok(seen)
}

fn unique_links(
    table: &'static str,
    links: impl Iterator<Item = (u64, u64)>,
) -> DatasetResult<()> {
    let mut seen = FxHashSet::default();
    for (tag_id, boardgame_id) in links {
        if !seen.insert((tag_id, boardgame_id)) {
            return Err(DatasetError::DuplicateLink {
                table,
                tag_id,
                boardgame_id,
            });
        }
    }
    Ok(())
}

fn check_reference(
    table: &'static str,
    column: &'static str,
    id: u64,
    known: &FxHashSet<u64>,
) -> DatasetResult<()> {
    if known.contains(&id) {
        Ok(())
    } else {
        Err(DatasetError::DanglingReference { table, column, id })
    }
}
