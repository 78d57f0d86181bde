use super::{construct_path, SearchOptions, SearchOutcome, SearchResult};
use crate::common::{Cell, PathError};
use crate::grid::{Adjacency, Grid};
use crate::heap::PriorityQueue;
use crate::stat::Stats;

use std::time::Instant;
use tracing::{debug, instrument, trace};

/// Open list entry. Equality is by node so a rescored entry finds its slot.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    idx: usize,
    f: f64,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
    }
}

enum Stop {
    Goal,
    Exhausted,
    Budget,
}

#[instrument(
    skip_all,
    name = "a_star",
    fields(start = format!("{:?}", start), goal = format!("{:?}", end)),
    level = "debug"
)]
pub fn a_star_search(
    grid: &mut Grid,
    start: Cell,
    end: Cell,
    options: &SearchOptions,
    stats: &mut Stats,
) -> Result<SearchResult, PathError> {
    let start_idx = grid.checked_index(start)?;
    let end_idx = grid.checked_index(end)?;
    let search_start_time = Instant::now();

    stats.searches += 1;
    stats.dirty_reset_nodes += grid.clean_dirty();

    let heuristic = options.heuristic;
    let mut open_list = PriorityQueue::new(|node: &OpenNode| node.f);
    let mut closest_idx = start_idx;

    let start_h = heuristic.estimate(start, end);
    {
        let state = grid.state_mut(start_idx);
        state.h = start_h;
        state.f = start_h;
    }
    open_list.push(OpenNode {
        idx: start_idx,
        f: start_h,
    });
    stats.pushed_nodes += 1;

    let adjacency = Adjacency::default_for(grid);
    let mut expansions = 0;

    let stop = loop {
        let Some(current) = open_list.pop() else {
            break Stop::Exhausted;
        };
        let current_cell = grid.node_at(current.idx).cell();
        let current_g = grid.node_at(current.idx).state().g;

        if current.idx == end_idx {
            break Stop::Goal;
        }
        if options.max_expansions.is_some_and(|budget| expansions >= budget) {
            break Stop::Budget;
        }
        expansions += 1;
        trace!("expand node: {current_cell:?} f {:?}", current.f);
        stats.record_expansion(current_cell, current.f);

        grid.state_mut(current.idx).closed = true;

        for neighbor in grid.neighbors(current_cell, adjacency) {
            let Some(neighbor_idx) = grid.index(neighbor) else {
                continue;
            };
            if grid.node_at(neighbor_idx).state().closed || grid.is_wall(neighbor) {
                continue;
            }

            let tentative_g_cost = current_g + grid.cost(neighbor, current_cell);
            let been_visited = grid.node_at(neighbor_idx).state().visited;
            if been_visited && tentative_g_cost >= grid.node_at(neighbor_idx).state().g {
                continue;
            }

            let (g, h, f) = {
                let state = grid.state_mut(neighbor_idx);
                state.visited = true;
                state.parent = Some(current.idx);
                if state.h == 0.0 {
                    state.h = heuristic.estimate(neighbor, end);
                }
                state.g = tentative_g_cost;
                state.f = state.g + state.h;
                (state.g, state.h, state.f)
            };

            if options.closest {
                let closest = grid.node_at(closest_idx).state();
                if h < closest.h || (h == closest.h && g < closest.g) {
                    closest_idx = neighbor_idx;
                }
            }

            let entry = OpenNode {
                idx: neighbor_idx,
                f,
            };
            if !been_visited {
                open_list.push(entry);
                stats.pushed_nodes += 1;
            } else {
                open_list.rescore_element(entry);
                stats.rescored_nodes += 1;
            }
        }
    };

    let result = match stop {
        Stop::Goal => {
            stats.reached += 1;
            SearchResult {
                path: construct_path(grid, end_idx),
                outcome: SearchOutcome::Reached,
            }
        }
        Stop::Exhausted | Stop::Budget if options.closest => {
            let closest_cell = grid.node_at(closest_idx).cell();
            debug!("goal unreachable, falling back to closest node {closest_cell:?}");
            stats.fallbacks += 1;
            SearchResult {
                path: construct_path(grid, closest_idx),
                outcome: SearchOutcome::Closest(closest_cell),
            }
        }
        Stop::Exhausted => {
            debug!("cannot find path");
            stats.unreachable += 1;
            SearchResult {
                path: Vec::new(),
                outcome: SearchOutcome::Unreachable,
            }
        }
        Stop::Budget => {
            debug!("expansion budget exhausted after {expansions} nodes");
            stats.unreachable += 1;
            SearchResult {
                path: Vec::new(),
                outcome: SearchOutcome::BudgetExhausted,
            }
        }
    };

    stats.time_us += search_start_time.elapsed().as_micros();
    Ok(result)
}
