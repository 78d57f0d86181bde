use std::collections::VecDeque;

use tracing::debug;

use crate::algorithm::{a_star_search, SearchOptions};
use crate::common::{Cell, PathError, WorldPos};
use crate::coords::CoordinateMapping;
use crate::grid::{Grid, GridOptions};
use crate::stat::Stats;

pub use crate::raster::cells_between;

pub fn build_grid(occupancy: &[Vec<f64>], diagonal: bool) -> Result<Grid, PathError> {
    Grid::new(occupancy, GridOptions::diagonal(diagonal))
}

/// World-space route between two positions as a list of cell-center waypoints.
///
/// Both endpoints are clamped into the world first. The start cell itself is not
/// part of the route; an empty route means the goal is unreachable (unless
/// `options.closest` asked for the closest reachable cell instead).
pub fn find_path(
    grid: &mut Grid,
    mapping: &CoordinateMapping,
    start: WorldPos,
    end: WorldPos,
    options: &SearchOptions,
    stats: &mut Stats,
) -> Result<Vec<WorldPos>, PathError> {
    let start_cell = mapping.world_to_cell(start);
    let end_cell = mapping.world_to_cell(end);
    let result = a_star_search(grid, start_cell, end_cell, options, stats)?;
    Ok(result
        .path
        .into_iter()
        .map(|cell| mapping.cell_to_world(cell))
        .collect())
}

/// A unit's cached route toward its target.
///
/// The plan remembers the grid revision and target cell it was computed for and
/// must be recomputed once either changes.
#[derive(Debug, Clone, Default)]
pub struct PathPlan {
    waypoints: VecDeque<WorldPos>,
    revision: Option<u64>,
    target_cell: Option<Cell>,
}

impl PathPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stale(&self, revision: u64, target_cell: Cell) -> bool {
        self.revision != Some(revision) || self.target_cell != Some(target_cell)
    }

    /// Recomputes the route when the plan is stale. Returns whether it re-planned.
    pub fn refresh(
        &mut self,
        grid: &mut Grid,
        mapping: &CoordinateMapping,
        position: WorldPos,
        target: WorldPos,
        options: &SearchOptions,
        stats: &mut Stats,
    ) -> Result<bool, PathError> {
        let target_cell = mapping.world_to_cell(target);
        if !self.is_stale(grid.last_updated(), target_cell) {
            return Ok(false);
        }
        self.replan(grid, mapping, position, target, options, stats)?;
        Ok(true)
    }

    pub fn replan(
        &mut self,
        grid: &mut Grid,
        mapping: &CoordinateMapping,
        position: WorldPos,
        target: WorldPos,
        options: &SearchOptions,
        stats: &mut Stats,
    ) -> Result<(), PathError> {
        let waypoints = find_path(grid, mapping, position, target, options, stats)?;
        debug!(
            "replanned toward {:?}: {} waypoints at revision {}",
            target,
            waypoints.len(),
            grid.last_updated()
        );
        self.waypoints = waypoints.into();
        self.revision = Some(grid.last_updated());
        self.target_cell = Some(mapping.world_to_cell(target));
        Ok(())
    }

    pub fn next_waypoint(&self) -> Option<WorldPos> {
        self.waypoints.front().copied()
    }

    /// Drops the head waypoint once `position` is within `reach` of it.
    pub fn advance(&mut self, position: WorldPos, reach: f64) -> Option<WorldPos> {
        if let Some(next) = self.waypoints.front() {
            if position.distance(next) <= reach {
                self.waypoints.pop_front();
            }
        }
        self.next_waypoint()
    }

    pub fn remaining(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_finished(&self) -> bool {
        self.waypoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Heuristic;

    fn open_field(mapping: &CoordinateMapping, diagonal: bool) -> Grid {
        build_grid(&vec![vec![1.0; mapping.rows()]; mapping.columns()], diagonal).unwrap()
    }

    #[test]
    fn test_find_path_returns_cell_centers() {
        let mapping = CoordinateMapping::new(20.0, 100.0, 100.0);
        let mut grid = open_field(&mapping, false);
        let waypoints = find_path(
            &mut grid,
            &mapping,
            WorldPos::new(5.0, 5.0),
            WorldPos::new(65.0, 5.0),
            &SearchOptions::default(),
            &mut Stats::default(),
        )
        .unwrap();
        assert_eq!(
            waypoints,
            vec![
                WorldPos::new(30.0, 10.0),
                WorldPos::new(50.0, 10.0),
                WorldPos::new(70.0, 10.0)
            ]
        );
    }

    #[test]
    fn test_find_path_clamps_out_of_world_positions() {
        let mapping = CoordinateMapping::new(20.0, 100.0, 100.0);
        let mut grid = open_field(&mapping, true);
        let options = SearchOptions::for_grid(&grid);
        assert_eq!(options.heuristic, Heuristic::Diagonal);
        let waypoints = find_path(
            &mut grid,
            &mapping,
            WorldPos::new(-300.0, -1.0),
            WorldPos::new(1000.0, 1000.0),
            &options,
            &mut Stats::default(),
        )
        .unwrap();
        assert_eq!(waypoints.len(), 4);
        assert_eq!(waypoints.last(), Some(&WorldPos::new(90.0, 90.0)));
    }

    #[test]
    fn test_find_path_on_speculative_grid() {
        let mapping = CoordinateMapping::new(20.0, 100.0, 100.0);
        let mut occupancy = vec![vec![1.0; 5]; 5];
        occupancy[2] = vec![0.0; 5];
        let mut sealed = build_grid(&occupancy, true).unwrap();
        let options = SearchOptions::for_grid(&sealed);
        let waypoints = find_path(
            &mut sealed,
            &mapping,
            WorldPos::new(10.0, 50.0),
            WorldPos::new(90.0, 50.0),
            &options,
            &mut Stats::default(),
        )
        .unwrap();
        assert!(waypoints.is_empty());
    }

    #[test]
    fn test_plan_goes_stale() {
        let mapping = CoordinateMapping::new(20.0, 200.0, 200.0);
        let mut grid = open_field(&mapping, true);
        let options = SearchOptions::for_grid(&grid);
        let mut stats = Stats::default();
        let mut plan = PathPlan::new();
        let start = WorldPos::new(10.0, 10.0);
        let target = WorldPos::new(190.0, 10.0);

        assert!(plan.refresh(&mut grid, &mapping, start, target, &options, &mut stats).unwrap());
        assert!(!plan.refresh(&mut grid, &mapping, start, target, &options, &mut stats).unwrap());
        assert_eq!(plan.remaining(), 9);

        // Target moved within the same cell: still fresh.
        let nudged = WorldPos::new(185.0, 15.0);
        assert!(!plan.is_stale(grid.last_updated(), mapping.world_to_cell(nudged)));

        // Target moved to another cell.
        let moved = WorldPos::new(190.0, 190.0);
        assert!(plan.refresh(&mut grid, &mapping, start, moved, &options, &mut stats).unwrap());

        // Occupancy rebuilt.
        let occupancy = grid.occupancy();
        grid.rebuild(&occupancy).unwrap();
        assert!(plan.is_stale(grid.last_updated(), mapping.world_to_cell(moved)));
        assert!(plan.refresh(&mut grid, &mapping, start, moved, &options, &mut stats).unwrap());
        assert_eq!(stats.searches, 3);
    }

    #[test]
    fn test_plan_advance() {
        let mapping = CoordinateMapping::new(20.0, 100.0, 20.0);
        let mut grid = open_field(&mapping, false);
        let mut plan = PathPlan::new();
        plan.replan(
            &mut grid,
            &mapping,
            WorldPos::new(10.0, 10.0),
            WorldPos::new(90.0, 10.0),
            &SearchOptions::default(),
            &mut Stats::default(),
        )
        .unwrap();
        assert_eq!(plan.next_waypoint(), Some(WorldPos::new(30.0, 10.0)));

        // Too far away to count as arrived.
        assert_eq!(
            plan.advance(WorldPos::new(10.0, 10.0), 5.0),
            Some(WorldPos::new(30.0, 10.0))
        );
        assert_eq!(
            plan.advance(WorldPos::new(27.0, 10.0), 5.0),
            Some(WorldPos::new(50.0, 10.0))
        );
        plan.advance(WorldPos::new(50.0, 10.0), 5.0);
        plan.advance(WorldPos::new(70.0, 10.0), 5.0);
        assert_eq!(plan.advance(WorldPos::new(90.0, 10.0), 5.0), None);
        assert!(plan.is_finished());
    }
}
