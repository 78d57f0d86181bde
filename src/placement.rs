use tracing::debug;

use crate::algorithm::{a_star_search, SearchOptions, SearchOutcome};
use crate::common::{Cell, PathError, WorldPos};
use crate::occupancy::{ObstacleId, OccupancyMap};
use crate::raster::cells_between;
use crate::stat::Stats;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRules {
    /// Rows at the top and bottom edge that must stay free.
    pub reserved_margin_rows: usize,
    /// Chebyshev distance in cells that must separate a wall from any hostile unit.
    pub hostile_clearance: usize,
    pub max_walls: Option<usize>,
}

impl Default for PlacementRules {
    fn default() -> Self {
        PlacementRules {
            reserved_margin_rows: 3,
            hostile_clearance: 1,
            max_walls: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Reserved,
    HostileNearby,
    Occupied,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementPlan {
    pub accepted: Vec<Cell>,
    pub rejected: Vec<(Cell, RejectReason)>,
    /// First cell whose wall would have cut the anchors apart; the drag stops there.
    pub sealed_at: Option<Cell>,
}

impl PlacementRules {
    fn check(
        &self,
        map: &OccupancyMap,
        cell: Cell,
        hostiles: &[WorldPos],
    ) -> Option<RejectReason> {
        let rows = map.grid().height();
        if cell.1 < self.reserved_margin_rows || cell.1 + self.reserved_margin_rows >= rows {
            return Some(RejectReason::Reserved);
        }
        let mapping = map.mapping();
        let near_hostile = hostiles.iter().any(|hostile| {
            let (hx, hy) = mapping.world_to_cell(*hostile);
            hx.abs_diff(cell.0) <= self.hostile_clearance
                && hy.abs_diff(cell.1) <= self.hostile_clearance
        });
        near_hostile.then_some(RejectReason::HostileNearby)
    }
}

/// Legality of every cell along a wall drag, for highlighting while the drag is
/// in progress. Stops once `max_walls` legal cells have been listed.
pub fn preview_drag(
    map: &OccupancyMap,
    rules: &PlacementRules,
    from: WorldPos,
    to: WorldPos,
    hostiles: &[WorldPos],
) -> Vec<(Cell, bool)> {
    let mapping = map.mapping();
    let mut legal_count = 0;
    let mut preview = Vec::new();
    for cell in cells_between(mapping.world_to_cell(from), mapping.world_to_cell(to)) {
        if rules.max_walls.is_some_and(|max| legal_count >= max) {
            break;
        }
        let legal = rules.check(map, cell, hostiles).is_none() && !map.is_cell_blocked(cell);
        if legal {
            legal_count += 1;
        }
        preview.push((cell, legal));
    }
    preview
}

/// Decides which cells of a wall drag can be built.
///
/// Cells are tried in drag order against a speculative copy of the occupancy; the
/// first wall that would leave no path between the two anchors ends the drag.
pub fn plan_drag(
    map: &OccupancyMap,
    rules: &PlacementRules,
    from: WorldPos,
    to: WorldPos,
    hostiles: &[WorldPos],
    anchors: (WorldPos, WorldPos),
    stats: &mut Stats,
) -> Result<PlacementPlan, PathError> {
    let mapping = map.mapping();
    let anchor_cells = (mapping.world_to_cell(anchors.0), mapping.world_to_cell(anchors.1));
    let mut plan = PlacementPlan::default();

    for cell in cells_between(mapping.world_to_cell(from), mapping.world_to_cell(to)) {
        if let Some(reason) = rules.check(map, cell, hostiles) {
            plan.rejected.push((cell, reason));
            continue;
        }
        if rules.max_walls.is_some_and(|max| plan.accepted.len() >= max) {
            break;
        }
        if map.is_cell_blocked(cell) || plan.accepted.contains(&cell) {
            plan.rejected.push((cell, RejectReason::Occupied));
            continue;
        }

        let mut blocked = plan.accepted.clone();
        blocked.push(cell);
        let mut speculative = map.speculative_grid(&blocked)?;
        let options = SearchOptions::for_grid(&speculative);
        let result = a_star_search(
            &mut speculative,
            anchor_cells.0,
            anchor_cells.1,
            &options,
            stats,
        )?;
        if result.outcome != SearchOutcome::Reached {
            debug!("wall at {cell:?} would seal {anchor_cells:?}, stopping drag");
            plan.sealed_at = Some(cell);
            break;
        }
        plan.accepted.push(cell);
    }

    debug!(
        "drag plan: {} accepted, {} rejected, sealed at {:?}",
        plan.accepted.len(),
        plan.rejected.len(),
        plan.sealed_at
    );
    Ok(plan)
}

/// Registers a wall at the center of every accepted cell.
pub fn commit(map: &mut OccupancyMap, plan: &PlacementPlan) -> Result<Vec<ObstacleId>, PathError> {
    let centers: Vec<WorldPos> = plan
        .accepted
        .iter()
        .map(|&cell| map.mapping().cell_to_world(cell))
        .collect();
    map.register_all(&centers)
}
