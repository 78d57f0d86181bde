use std::collections::HashSet;

use crate::common::Cell;

/// Every cell a straight segment from `from` to `to` crosses, both ends included,
/// in traversal order (integer Bresenham).
pub fn cells_between(from: Cell, to: Cell) -> Vec<Cell> {
    let (mut x, mut y) = (from.0 as i64, from.1 as i64);
    let (x1, y1) = (to.0 as i64, to.1 as i64);
    let dx = (x1 - x).abs();
    let dy = (y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut seen = HashSet::new();
    let mut cells = Vec::with_capacity((dx.max(dy) + 1) as usize);
    loop {
        let cell = (x as usize, y as usize);
        if seen.insert(cell) {
            cells.push(cell);
        }
        if x == x1 && y == y1 {
            return cells;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}
