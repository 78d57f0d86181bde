use serde::{Deserialize, Serialize};

use crate::common::{Cell, WorldPos};

/// Maps continuous battlefield positions onto occupancy cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMapping {
    pub cell_size: f64,
    pub world_width: f64,
    pub world_height: f64,
}

impl Default for CoordinateMapping {
    fn default() -> Self {
        CoordinateMapping {
            cell_size: 20.0,
            world_width: 900.0,
            world_height: 600.0,
        }
    }
}

impl CoordinateMapping {
    pub fn new(cell_size: f64, world_width: f64, world_height: f64) -> Self {
        CoordinateMapping {
            cell_size,
            world_width,
            world_height,
        }
    }

    pub fn columns(&self) -> usize {
        (self.world_width / self.cell_size).ceil() as usize
    }

    pub fn rows(&self) -> usize {
        (self.world_height / self.cell_size).ceil() as usize
    }

    /// Keeps both axes within `[1, extent - 1]` so the cell lookup never lands
    /// on or past the far edge.
    pub fn clamp_to_world(&self, pos: WorldPos) -> WorldPos {
        WorldPos {
            x: pos.x.min(self.world_width - 1.0).max(1.0),
            y: pos.y.min(self.world_height - 1.0).max(1.0),
        }
    }

    pub fn world_to_cell(&self, pos: WorldPos) -> Cell {
        let clamped = self.clamp_to_world(pos);
        (
            (clamped.x / self.cell_size).floor() as usize,
            (clamped.y / self.cell_size).floor() as usize,
        )
    }

    /// Center of `cell` in world space.
    pub fn cell_to_world(&self, (x, y): Cell) -> WorldPos {
        let half = self.cell_size / 2.0;
        WorldPos {
            x: x as f64 * self.cell_size + half,
            y: y as f64 * self.cell_size + half,
        }
    }

    pub fn snap_to_cell_center(&self, pos: WorldPos) -> WorldPos {
        self.cell_to_world(self.world_to_cell(pos))
    }
}
