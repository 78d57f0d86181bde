use anyhow::{anyhow, Context, Result};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use tracing::info;

use crate::common::Cell;
use crate::grid::Grid;
use crate::map::Map;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Query {
    pub start: Cell,
    pub goal: Cell,
}

impl Query {
    /// Both endpoints lie on the grid and neither is a wall.
    pub fn verify(&self, grid: &Grid) -> bool {
        [self.start, self.goal]
            .into_iter()
            .all(|cell| grid.contains(cell) && !grid.is_wall(cell))
    }
}

type Bucket = Vec<Query>;

/// Start/goal pairs from a MovingAI `.scen` file, grouped by bucket.
#[derive(Debug)]
pub struct Scenario {
    pub map: String,
    pub map_width: usize,
    pub map_height: usize,
    pub buckets: BTreeMap<usize, Bucket>,
}

fn field<'a>(parts: &[&'a str], index: usize, line_number: usize) -> Result<&'a str> {
    parts
        .get(index)
        .copied()
        .ok_or_else(|| anyhow!("Line {line_number}: missing field {index}"))
}

fn number(parts: &[&str], index: usize, line_number: usize) -> Result<usize> {
    field(parts, index, line_number)?
        .parse()
        .with_context(|| format!("Line {line_number}: field {index} is not a number"))
}

impl Scenario {
    pub fn load_from_scen(path: &str) -> Result<Scenario> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file {path}"))?;
        Self::parse_scen(&content).with_context(|| format!("error with scenario file: {path}"))
    }

    pub fn parse_scen(content: &str) -> Result<Scenario> {
        let mut lines = content.lines().enumerate();

        // First line is "version x.x" which we can skip
        let _version = lines.next().ok_or_else(|| anyhow!("Empty scenario"))?;

        let mut scenario = Scenario {
            map: String::new(),
            map_width: 0,
            map_height: 0,
            buckets: BTreeMap::new(),
        };

        for (line_number, line) in lines {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }
            let bucket_index = number(&parts, 0, line_number)?;
            let query = Query {
                start: (number(&parts, 4, line_number)?, number(&parts, 5, line_number)?),
                goal: (number(&parts, 6, line_number)?, number(&parts, 7, line_number)?),
            };

            if scenario.map.is_empty() {
                scenario.map = field(&parts, 1, line_number)?.to_string();
                scenario.map_width = number(&parts, 2, line_number)?;
                scenario.map_height = number(&parts, 3, line_number)?;
            }

            scenario.buckets.entry(bucket_index).or_default().push(query);
        }

        Ok(scenario)
    }

    /// Fails when the scenario was written for a map of other dimensions.
    pub fn verify(&self, map: &Map) -> Result<()> {
        if self.map_width != map.width || self.map_height != map.height {
            return Err(anyhow!(
                "Scenario expects a {}x{} map, got {}x{}",
                self.map_width,
                self.map_height,
                map.width,
                map.height
            ));
        }
        Ok(())
    }

    pub fn query_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Picks one unused query from each listed bucket.
    pub fn queries_by_buckets<R: Rng + ?Sized>(
        &self,
        buckets: &[usize],
        rng: &mut R,
    ) -> Result<Vec<Query>> {
        let mut queries = Vec::with_capacity(buckets.len());
        let mut used: HashMap<usize, HashSet<usize>> = HashMap::new();

        for &bucket_index in buckets {
            let bucket = self
                .buckets
                .get(&bucket_index)
                .ok_or_else(|| anyhow!("Bucket {} not found", bucket_index))?;

            let available: Vec<usize> = (0..bucket.len())
                .filter(|idx| {
                    used.get(&bucket_index)
                        .map_or(true, |taken| !taken.contains(idx))
                })
                .collect();

            let &query_index = available
                .choose(rng)
                .ok_or_else(|| anyhow!("No available queries left in bucket {}", bucket_index))?;

            queries.push(bucket[query_index]);
            used.entry(bucket_index).or_default().insert(query_index);
        }

        info!("Selected queries: {queries:?}");
        Ok(queries)
    }

    /// Samples `count` distinct queries across all buckets.
    pub fn queries_randomly<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<Query>> {
        let mut available: Vec<Query> = self.buckets.values().flatten().copied().collect();
        available.sort();
        available.dedup();

        if available.len() < count {
            return Err(anyhow!(
                "Not enough unique queries available: wanted {count}, have {}",
                available.len()
            ));
        }

        available.shuffle(rng);
        available.truncate(count);

        info!("Selected queries: {available:?}");
        Ok(available)
    }

    pub fn load_queries_from_yaml(path: &str) -> Result<Vec<Query>> {
        let file = File::open(path).with_context(|| format!("Failed to open {path}"))?;
        let reader = BufReader::new(file);
        let queries = serde_yaml::from_reader(reader)?;
        Ok(queries)
    }

    pub fn write_queries_to_yaml(path: &str, queries: &[Query]) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Failed to create {path}"))?;
        let mut writer = io::BufWriter::new(file);
        let yaml_data = serde_yaml::to_string(&queries)?;
        writer.write_all(yaml_data.as_bytes())?;

        Ok(())
    }
}
