use std::fs;

use anyhow::{anyhow, Context, Result};

use crate::common::PathError;
use crate::grid::{Grid, GridOptions};

/// Occupancy weights read from a MovingAI-style `.map` file.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    pub height: usize,
    pub width: usize,
    /// Column-major weights: `occupancy[x][y]`.
    pub occupancy: Vec<Vec<f64>>,
}

fn tile_weight(ch: char) -> Option<f64> {
    match ch {
        '.' | 'G' | 'S' => Some(1.0),
        '@' | 'O' | 'T' | 'W' => Some(0.0),
        '1'..='9' => ch.to_digit(10).map(f64::from),
        _ => None,
    }
}

fn header_value(line: Option<&str>, key: &str) -> Result<usize> {
    let line = line.ok_or_else(|| anyhow!("Missing `{key}` header"))?;
    let mut parts = line.split_whitespace();
    if parts.next() != Some(key) {
        return Err(anyhow!("Expected `{key}` header, got: {line}"));
    }
    parts
        .next()
        .ok_or_else(|| anyhow!("Missing value for `{key}`"))?
        .parse::<usize>()
        .with_context(|| format!("Invalid `{key}` value in: {line}"))
}

impl Map {
    pub fn from_file(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read map file {path}"))?;
        Self::from_str(&content).with_context(|| format!("error with map file: {path}"))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let mut lines = content.lines();

        let _type = lines.next().ok_or_else(|| anyhow!("Empty map"))?;
        let height = header_value(lines.next(), "height")?;
        let width = header_value(lines.next(), "width")?;
        match lines.next() {
            Some(line) if line.trim() == "map" => {}
            other => return Err(anyhow!("Expected `map` line, got: {other:?}")),
        }

        let mut occupancy = vec![vec![0.0; height]; width];
        let mut rows = 0;
        for (y, line) in lines.take(height).enumerate() {
            let tiles: Vec<char> = line.trim_end().chars().collect();
            if tiles.len() != width {
                return Err(anyhow!(
                    "Row {y} has {} tiles, expected {width}",
                    tiles.len()
                ));
            }
            for (x, ch) in tiles.into_iter().enumerate() {
                occupancy[x][y] =
                    tile_weight(ch).ok_or_else(|| anyhow!("Unknown tile {ch:?} at ({x}, {y})"))?;
            }
            rows += 1;
        }
        if rows != height {
            return Err(anyhow!("Map has {rows} rows, expected {height}"));
        }

        Ok(Map {
            height,
            width,
            occupancy,
        })
    }

    pub fn is_passable(&self, x: usize, y: usize) -> bool {
        self.occupancy[x][y] > 0.0
    }

    pub fn to_grid(&self, diagonal: bool) -> Result<Grid, PathError> {
        Grid::new(&self.occupancy, GridOptions::diagonal(diagonal))
    }
}
