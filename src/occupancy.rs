use std::collections::BTreeMap;

use tracing::debug;

use crate::common::{Cell, PathError, WorldPos};
use crate::coords::CoordinateMapping;
use crate::grid::{Grid, GridOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObstacleId(u64);

/// Tracks obstacle positions and owns the grid derived from them.
///
/// Every registration change re-derives the weights and swaps in a new `Grid`
/// instance, so the revision token moves forward and a grid borrowed earlier
/// stays a consistent snapshot.
#[derive(Debug)]
pub struct OccupancyMap {
    mapping: CoordinateMapping,
    options: GridOptions,
    obstacles: BTreeMap<ObstacleId, WorldPos>,
    next_id: u64,
    weights: Vec<Vec<f64>>,
    grid: Grid,
}

impl OccupancyMap {
    pub fn new(mapping: CoordinateMapping, options: GridOptions) -> Result<Self, PathError> {
        let weights = vec![vec![1.0; mapping.rows()]; mapping.columns()];
        let grid = Grid::new(&weights, options)?;
        Ok(OccupancyMap {
            mapping,
            options,
            obstacles: BTreeMap::new(),
            next_id: 0,
            weights,
            grid,
        })
    }

    pub fn mapping(&self) -> &CoordinateMapping {
        &self.mapping
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    pub fn revision(&self) -> u64 {
        self.grid.last_updated()
    }

    pub fn obstacle(&self, id: ObstacleId) -> Option<WorldPos> {
        self.obstacles.get(&id).copied()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    pub fn register(&mut self, pos: WorldPos) -> Result<ObstacleId, PathError> {
        let id = ObstacleId(self.next_id);
        self.next_id += 1;
        self.obstacles.insert(id, pos);
        self.refresh()?;
        Ok(id)
    }

    /// Registers several obstacles with a single rebuild.
    pub fn register_all(&mut self, positions: &[WorldPos]) -> Result<Vec<ObstacleId>, PathError> {
        let ids = positions
            .iter()
            .map(|&pos| {
                let id = ObstacleId(self.next_id);
                self.next_id += 1;
                self.obstacles.insert(id, pos);
                id
            })
            .collect();
        self.refresh()?;
        Ok(ids)
    }

    pub fn unregister(&mut self, id: ObstacleId) -> Result<bool, PathError> {
        if self.obstacles.remove(&id).is_none() {
            return Ok(false);
        }
        self.refresh()?;
        Ok(true)
    }

    /// Whether the cell under `pos` holds an obstacle. Positions off the map count
    /// as blocked.
    pub fn is_blocked(&self, pos: WorldPos) -> bool {
        if pos.x < 0.0 || pos.y < 0.0 {
            return true;
        }
        let cell = (
            (pos.x / self.mapping.cell_size).floor() as usize,
            (pos.y / self.mapping.cell_size).floor() as usize,
        );
        self.is_cell_blocked(cell)
    }

    pub fn is_cell_blocked(&self, (x, y): Cell) -> bool {
        self.weights
            .get(x)
            .and_then(|column| column.get(y))
            .map_or(true, |weight| *weight == 0.0)
    }

    /// Grid with `extra_blocked` cells zeroed on top of the current occupancy,
    /// for trying a placement before committing it.
    pub fn speculative_grid(&self, extra_blocked: &[Cell]) -> Result<Grid, PathError> {
        let mut weights = self.weights.clone();
        for &(x, y) in extra_blocked {
            if let Some(weight) = weights.get_mut(x).and_then(|column| column.get_mut(y)) {
                *weight = 0.0;
            }
        }
        Grid::new(&weights, self.options)
    }

    fn refresh(&mut self) -> Result<(), PathError> {
        let mut weights = vec![vec![1.0; self.mapping.rows()]; self.mapping.columns()];
        for pos in self.obstacles.values() {
            if pos.x < 0.0 || pos.y < 0.0 {
                continue;
            }
            let x = (pos.x / self.mapping.cell_size).floor() as usize;
            let y = (pos.y / self.mapping.cell_size).floor() as usize;
            if let Some(weight) = weights.get_mut(x).and_then(|column| column.get_mut(y)) {
                *weight = 0.0;
            }
        }
        self.grid = Grid::new(&weights, self.options)?;
        self.weights = weights;
        debug!(
            "occupancy refreshed: {} obstacles, revision {}",
            self.obstacles.len(),
            self.grid.last_updated()
        );
        Ok(())
    }
}
