pub mod algorithm;
pub mod common;
pub mod config;
pub mod coords;
pub mod grid;
pub mod heap;
pub mod map;
pub mod navigation;
pub mod occupancy;
pub mod placement;
pub mod raster;
pub mod scenario;
pub mod stat;

pub use algorithm::{a_star_search, Heuristic, SearchOptions, SearchOutcome, SearchResult};
pub use common::{Cell, PathError, WorldPos};
pub use coords::CoordinateMapping;
pub use grid::{Adjacency, Grid, GridNode, GridOptions};
pub use heap::PriorityQueue;
pub use navigation::{build_grid, cells_between, find_path, PathPlan};
