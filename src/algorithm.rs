mod astar;

pub use astar::a_star_search;

use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::common::Cell;
use crate::grid::Grid;

// See http://theory.stanford.edu/~amitp/GameProgramming/Heuristics.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heuristic {
    #[default]
    Manhattan,
    /// Octile distance, admissible when diagonal steps cost sqrt(2).
    Diagonal,
}

impl Heuristic {
    pub fn estimate(&self, from: Cell, to: Cell) -> f64 {
        let d1 = from.0.abs_diff(to.0) as f64;
        let d2 = from.1.abs_diff(to.1) as f64;
        match self {
            Heuristic::Manhattan => d1 + d2,
            Heuristic::Diagonal => {
                const D: f64 = 1.0;
                let d_diag = std::f64::consts::SQRT_2;
                D * (d1 + d2) + (d_diag - 2.0 * D) * d1.min(d2)
            }
        }
    }
}

impl FromStr for Heuristic {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manhattan" => Ok(Heuristic::Manhattan),
            "diagonal" | "octile" => Ok(Heuristic::Diagonal),
            _ => Err(anyhow!("Unknown heuristic: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SearchOptions {
    pub heuristic: Heuristic,
    /// Fall back to the path toward the closest visited node when the goal is unreachable.
    pub closest: bool,
    /// Stop after this many node expansions.
    pub max_expansions: Option<usize>,
}

impl SearchOptions {
    /// Defaults matched to the grid's movement mode.
    pub fn for_grid(grid: &Grid) -> Self {
        SearchOptions {
            heuristic: if grid.diagonal() {
                Heuristic::Diagonal
            } else {
                Heuristic::Manhattan
            },
            ..Default::default()
        }
    }

    pub fn closest(mut self, closest: bool) -> Self {
        self.closest = closest;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Reached,
    /// Goal unreachable; the path leads to this closest visited cell.
    Closest(Cell),
    Unreachable,
    BudgetExhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Cells after the start up to and including the last one.
    pub path: Vec<Cell>,
    pub outcome: SearchOutcome,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn last(&self) -> Option<Cell> {
        self.path.last().copied()
    }
}

/// Follows parent indices back from `idx`, excluding the root, in start-to-end order.
fn construct_path(grid: &Grid, mut idx: usize) -> Vec<Cell> {
    let mut path = Vec::new();
    while let Some(parent) = grid.node_at(idx).state().parent {
        path.push(grid.node_at(idx).cell());
        idx = parent;
    }
    path.reverse();
    path
}
