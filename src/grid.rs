use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::common::{Cell, PathError};

/// Edge cost multiplier for a diagonal step.
pub const DIAGONAL_COST: f64 = 1.41421;

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridOptions {
    pub diagonal: bool,
    /// Treat every node touching a weight-0 neighbour as a wall.
    pub corner_buffer: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        GridOptions {
            diagonal: false,
            corner_buffer: true,
        }
    }
}

impl GridOptions {
    pub fn diagonal(diagonal: bool) -> Self {
        GridOptions {
            diagonal,
            ..Default::default()
        }
    }
}

/// Which of the eight surrounding cells count as neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjacency {
    pub orthogonal: bool,
    pub diagonal: bool,
}

impl Adjacency {
    pub fn default_for(grid: &Grid) -> Self {
        Adjacency {
            orthogonal: true,
            diagonal: grid.diagonal,
        }
    }
}

/// Per-search bookkeeping carried by every node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SearchState {
    pub g: f64,
    pub h: f64,
    pub f: f64,
    pub visited: bool,
    pub closed: bool,
    /// Index of the predecessor in the grid's node arena.
    pub parent: Option<usize>,
    dirty: bool,
}

#[derive(Debug, Clone)]
pub struct GridNode {
    pub x: usize,
    pub y: usize,
    pub weight: f64,
    state: SearchState,
}

impl GridNode {
    fn new(x: usize, y: usize, weight: f64) -> Self {
        GridNode {
            x,
            y,
            weight,
            state: SearchState::default(),
        }
    }

    pub fn cell(&self) -> Cell {
        (self.x, self.y)
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn is_clean(&self) -> bool {
        self.state == SearchState::default()
    }
}

/// Occupancy graph built from a column-major weight array.
///
/// Nodes live in one flat arena indexed by `x * height + y`; search back-references
/// are arena indices, so they stay valid until the next `clean_dirty` or rebuild.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    diagonal: bool,
    corner_buffer: bool,
    nodes: Vec<GridNode>,
    dirty: Vec<usize>,
    last_updated: u64,
}

impl Grid {
    pub fn new(occupancy: &[Vec<f64>], options: GridOptions) -> Result<Self, PathError> {
        let mut grid = Grid {
            width: 0,
            height: 0,
            diagonal: options.diagonal,
            corner_buffer: options.corner_buffer,
            nodes: Vec::new(),
            dirty: Vec::new(),
            last_updated: 0,
        };
        grid.rebuild(occupancy)?;
        Ok(grid)
    }

    /// Reinitialises every node from `occupancy` and draws a fresh revision token.
    pub fn rebuild(&mut self, occupancy: &[Vec<f64>]) -> Result<(), PathError> {
        let width = occupancy.len();
        let height = occupancy.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(PathError::EmptyOccupancy);
        }

        let mut nodes = Vec::with_capacity(width * height);
        for (x, column) in occupancy.iter().enumerate() {
            if column.len() != height {
                return Err(PathError::RaggedOccupancy {
                    column: x,
                    expected: height,
                    found: column.len(),
                });
            }
            for (y, &weight) in column.iter().enumerate() {
                if !weight.is_finite() || weight < 0.0 {
                    return Err(PathError::InvalidWeight { x, y, weight });
                }
                nodes.push(GridNode::new(x, y, weight));
            }
        }

        self.width = width;
        self.height = height;
        self.nodes = nodes;
        self.dirty.clear();
        self.last_updated = next_revision();
        debug!(
            "grid rebuilt: {}x{}, diagonal {}, revision {}",
            width, height, self.diagonal, self.last_updated
        );
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn diagonal(&self) -> bool {
        self.diagonal
    }

    pub fn last_updated(&self) -> u64 {
        self.last_updated
    }

    pub fn contains(&self, (x, y): Cell) -> bool {
        x < self.width && y < self.height
    }

    pub(crate) fn index(&self, cell: Cell) -> Option<usize> {
        self.contains(cell).then(|| cell.0 * self.height + cell.1)
    }

    pub(crate) fn checked_index(&self, cell: Cell) -> Result<usize, PathError> {
        self.index(cell).ok_or(PathError::OutOfBounds {
            x: cell.0,
            y: cell.1,
            width: self.width,
            height: self.height,
        })
    }

    pub fn node(&self, cell: Cell) -> Option<&GridNode> {
        self.index(cell).map(|idx| &self.nodes[idx])
    }

    pub(crate) fn node_at(&self, idx: usize) -> &GridNode {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[GridNode] {
        &self.nodes
    }

    pub fn weight(&self, cell: Cell) -> Option<f64> {
        self.node(cell).map(|node| node.weight)
    }

    /// Copy of the weights in the same column-major layout `new` accepts.
    pub fn occupancy(&self) -> Vec<Vec<f64>> {
        self.nodes
            .chunks(self.height)
            .map(|column| column.iter().map(|node| node.weight).collect())
            .collect()
    }

    /// Neighbours in fixed order: west, east, south, north, then southwest,
    /// southeast, northwest, northeast. Cells off the grid are skipped.
    pub fn neighbors(&self, (x, y): Cell, adjacency: Adjacency) -> Vec<Cell> {
        const ORTHOGONAL: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        const DIAGONAL: [(isize, isize); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

        let mut neighbors = Vec::with_capacity(8);
        let mut collect = |offsets: &[(isize, isize)]| {
            for &(dx, dy) in offsets {
                let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy))
                else {
                    continue;
                };
                if self.contains((nx, ny)) {
                    neighbors.push((nx, ny));
                }
            }
        };
        if adjacency.orthogonal {
            collect(&ORTHOGONAL);
        }
        if adjacency.diagonal {
            collect(&DIAGONAL);
        }
        neighbors
    }

    /// A cell is a wall if its own weight is zero or, with the corner buffer on,
    /// if any neighbour's weight is zero. Looked up live on every call.
    pub fn is_wall(&self, cell: Cell) -> bool {
        let Some(weight) = self.weight(cell) else {
            return true;
        };
        if weight == 0.0 {
            return true;
        }
        self.corner_buffer
            && self
                .neighbors(cell, Adjacency::default_for(self))
                .into_iter()
                .any(|n| self.weight(n) == Some(0.0))
    }

    /// Edge cost of stepping onto `cell` from `from`.
    pub fn cost(&self, cell: Cell, from: Cell) -> f64 {
        let weight = self.weight(cell).unwrap_or(0.0);
        if from.0 != cell.0 && from.1 != cell.1 {
            weight * DIAGONAL_COST
        } else {
            weight
        }
    }

    /// Mutable search state of node `idx`; the node is recorded as dirty on first touch.
    pub(crate) fn state_mut(&mut self, idx: usize) -> &mut SearchState {
        let state = &mut self.nodes[idx].state;
        if !state.dirty {
            state.dirty = true;
            self.dirty.push(idx);
        }
        state
    }

    pub fn dirty_len(&self) -> usize {
        self.dirty.len()
    }

    /// Resets every node touched since the last clean and empties the dirty set.
    pub fn clean_dirty(&mut self) -> usize {
        let count = self.dirty.len();
        for idx in self.dirty.drain(..) {
            self.nodes[idx].state = SearchState::default();
        }
        count
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (x, column) in self.nodes.chunks(self.height).enumerate() {
            if x > 0 {
                writeln!(f)?;
            }
            let row: Vec<String> = column.iter().map(|node| node.weight.to_string()).collect();
            write!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}
