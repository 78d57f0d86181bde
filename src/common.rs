use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid cell as `(column, row)`.
pub type Cell = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f64,
    pub y: f64,
}

impl WorldPos {
    pub fn new(x: f64, y: f64) -> Self {
        WorldPos { x, y }
    }

    pub fn distance(&self, other: &WorldPos) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("occupancy grid has no cells")]
    EmptyOccupancy,
    #[error("occupancy column {column} has {found} rows, expected {expected}")]
    RaggedOccupancy {
        column: usize,
        expected: usize,
        found: usize,
    },
    #[error("cell ({x}, {y}) has invalid weight {weight}")]
    InvalidWeight { x: usize, y: usize, weight: f64 },
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}
