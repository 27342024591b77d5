//! Node lists
//!
//! Node lists are derived straight from entity records and never pass
//! through similarity or sparsification. Games carry their descriptive
//! columns unchanged; categories get rating and weight aggregates over the
//! games that carry them, plus z-score normalized variants.

use crate::dataset::{BoardGameRecord, Dataset};
use rustc_hash::FxHashMap;

/// A single value in a node list row
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Undefined value, written as an empty field
    Empty,
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::Float).unwrap_or(Cell::Empty)
    }
}

/// One node: id, label and passthrough columns
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow {
    pub id: u64,
    pub label: String,
    pub fields: Vec<Cell>,
}

/// Node table with the header of its passthrough columns
#[derive(Debug, Clone, PartialEq)]
pub struct NodeList {
    /// Names of the columns following `id` and `label`
    pub columns: Vec<&'static str>,
    pub rows: Vec<NodeRow>,
}

impl NodeList {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub const GAME_COLUMNS: [&str; 6] = [
    "bgg_id",
    "year_published",
    "avg_rating",
    "num_ratings",
    "avg_weight",
    "num_weights",
];

pub const CATEGORY_COLUMNS: [&str; 9] = [
    "count",
    "avg_rating",
    "norm_avg_rating",
    "avg_weight",
    "norm_avg_weight",
    "weighted_avg_rating",
    "norm_weighted_avg_rating",
    "weighted_avg_weight",
    "norm_weighted_avg_weight",
];

/// One row per board game, in table order
pub fn game_nodes(dataset: &Dataset) -> NodeList {
    let rows = dataset
        .boardgames
        .iter()
        .map(|game| NodeRow {
            id: game.id,
            label: game.name.clone(),
            fields: vec![
                game.bgg_id.map(Cell::UInt).unwrap_or(Cell::Empty),
                Cell::Int(i64::from(game.year_published)),
                Cell::Float(game.avg_rating),
                Cell::UInt(game.num_ratings),
                Cell::Float(game.avg_weight),
                Cell::UInt(game.num_weights),
            ],
        })
        .collect();

    NodeList {
        columns: GAME_COLUMNS.to_vec(),
        rows,
    }
}

/// Aggregates of one category over its games
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryStats {
    pub count: usize,
    pub avg_rating: Option<f64>,
    pub avg_weight: Option<f64>,
    pub weighted_avg_rating: Option<f64>,
    pub weighted_avg_weight: Option<f64>,
}

impl CategoryStats {
    fn from_games(games: &[&BoardGameRecord]) -> Self {
        let n = games.len();
        if n == 0 {
            return Self::default();
        }

        let mean = |f: fn(&BoardGameRecord) -> f64| {
            Some(games.iter().map(|g| f(g)).sum::<f64>() / n as f64)
        };
        let weighted = |value: fn(&BoardGameRecord) -> f64, count: fn(&BoardGameRecord) -> u64| {
            let total: u64 = games.iter().map(|g| count(g)).sum();
            if total == 0 {
                None
            } else {
                let sum: f64 = games.iter().map(|g| value(g) * count(g) as f64).sum();
                Some(sum / total as f64)
            }
        };

        Self {
            count: n,
            avg_rating: mean(|g| g.avg_rating),
            avg_weight: mean(|g| g.avg_weight),
            weighted_avg_rating: weighted(|g| g.avg_rating, |g| g.num_ratings),
            weighted_avg_weight: weighted(|g| g.avg_weight, |g| g.num_weights),
        }
    }
}

/// Standard scores against the defined values (sample standard deviation).
///
/// Undefined inputs stay undefined; fewer than two defined values, or zero
/// spread, leaves everything undefined.
pub fn z_scores(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let defined: Vec<f64> = values.iter().flatten().copied().collect();
    if defined.len() < 2 {
        return vec![None; values.len()];
    }

    let n = defined.len() as f64;
    let mean = defined.iter().sum::<f64>() / n;
    let variance = defined.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();
    if std_dev == 0.0 || !std_dev.is_finite() {
        return vec![None; values.len()];
    }

    values
        .iter()
        .map(|v| v.map(|v| (v - mean) / std_dev))
        .collect()
}

/// One row per category, ascending by id, with aggregate columns.
///
/// A category without games has every aggregate undefined, `count`
/// included, so its row is all empty fields after the label.
pub fn category_nodes(dataset: &Dataset) -> NodeList {
    let games: FxHashMap<u64, &BoardGameRecord> =
        dataset.boardgames.iter().map(|g| (g.id, g)).collect();
    let by_category = dataset.games_by_category();

    let mut categories: Vec<_> = dataset.categories.iter().collect();
    categories.sort_by_key(|c| c.id);

    let stats: Vec<CategoryStats> = categories
        .iter()
        .map(|category| {
            let members: Vec<&BoardGameRecord> = by_category
                .get(&category.id)
                .map(|ids| ids.iter().filter_map(|id| games.get(id).copied()).collect())
                .unwrap_or_default();
            CategoryStats::from_games(&members)
        })
        .collect();

    let column = |f: fn(&CategoryStats) -> Option<f64>| stats.iter().map(f).collect::<Vec<_>>();
    let norm_rating = z_scores(&column(|s| s.avg_rating));
    let norm_weight = z_scores(&column(|s| s.avg_weight));
    let norm_weighted_rating = z_scores(&column(|s| s.weighted_avg_rating));
    let norm_weighted_weight = z_scores(&column(|s| s.weighted_avg_weight));

    let rows = categories
        .iter()
        .zip(&stats)
        .enumerate()
        .map(|(i, (category, s))| NodeRow {
            id: category.id,
            label: category.name.clone(),
            fields: vec![
                if s.count == 0 {
                    Cell::Empty
                } else {
                    Cell::UInt(s.count as u64)
                },
                s.avg_rating.into(),
                norm_rating[i].into(),
                s.avg_weight.into(),
                norm_weight[i].into(),
                s.weighted_avg_rating.into(),
                norm_weighted_rating[i].into(),
                s.weighted_avg_weight.into(),
                norm_weighted_weight[i].into(),
            ],
        })
        .collect();

    NodeList {
        columns: CATEGORY_COLUMNS.to_vec(),
        rows,
    }
}
