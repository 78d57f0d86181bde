use anyhow::anyhow;
use clap::Parser;
use serde::Deserialize;

use crate::algorithm::{Heuristic, SearchOptions};
use crate::coords::CoordinateMapping;

#[derive(Parser, Debug, Default)]
#[command(
    name = "warpath",
    about = "Dynamic grid pathfinding for battlefield units.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the map file")]
    pub map_path: Option<String>,

    #[arg(long, help = "Path to the scenario file")]
    pub scen_path: Option<String>,

    #[arg(long, help = "Path to the JSON report")]
    pub output_path: Option<String>,

    #[arg(long, help = "Number of queries to run")]
    pub num_queries: Option<usize>,

    #[arg(long, help = "Scenario bucket for each query", value_delimiter = ',')]
    pub buckets: Vec<usize>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, help = "World units per grid cell")]
    pub cell_size: Option<f64>,

    #[arg(long, help = "Allow diagonal moves")]
    pub diagonal: Option<bool>,

    #[arg(long, help = "Return the path to the closest node when the goal is unreachable")]
    pub closest: Option<bool>,

    #[arg(long, help = "Heuristic: manhattan or diagonal")]
    pub heuristic: Option<String>,

    #[arg(long, help = "Stop a search after this many node expansions")]
    pub max_expansions: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub map_path: String,
    pub scen_path: String,
    pub output_path: String,
    pub num_queries: usize,
    pub buckets: Vec<usize>,
    pub seed: u64,
    pub cell_size: f64,
    pub diagonal: bool,
    pub closest: bool,
    pub heuristic: Option<String>,
    pub max_expansions: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_path: "map_file/test/test.map".to_string(),
            scen_path: "map_file/test/test.scen".to_string(),
            output_path: "result/result.json".to_string(),
            num_queries: 4,
            buckets: Vec::new(),
            seed: 0,
            cell_size: 20.0,
            diagonal: true,
            closest: false,
            heuristic: None,
            max_expansions: None,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Command-line values take precedence over the file.
    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(map_path) = &cli.map_path {
            self.map_path = map_path.clone();
        }
        if let Some(scen_path) = &cli.scen_path {
            self.scen_path = scen_path.clone();
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = output_path.clone();
        }
        if let Some(num_queries) = cli.num_queries {
            self.num_queries = num_queries;
        }
        if !cli.buckets.is_empty() {
            self.buckets = cli.buckets.clone();
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(cell_size) = cli.cell_size {
            self.cell_size = cell_size;
        }
        if let Some(diagonal) = cli.diagonal {
            self.diagonal = diagonal;
        }
        if let Some(closest) = cli.closest {
            self.closest = closest;
        }
        if let Some(heuristic) = &cli.heuristic {
            self.heuristic = Some(heuristic.clone());
        }
        if cli.max_expansions.is_some() {
            self.max_expansions = cli.max_expansions;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(anyhow!(
                "Cell size must be a positive number, got {}",
                self.cell_size
            ));
        }
        if let Some(heuristic) = &self.heuristic {
            heuristic.parse::<Heuristic>()?;
        }
        if !self.buckets.is_empty() && self.buckets.len() != self.num_queries {
            return Err(anyhow!(
                "Got {} buckets for {} queries",
                self.buckets.len(),
                self.num_queries
            ));
        }
        if self.max_expansions == Some(0) {
            return Err(anyhow!("Max expansions must be at least 1"));
        }
        Ok(())
    }

    /// Explicit heuristic if configured, otherwise the one matching the movement mode.
    pub fn search_options(&self) -> anyhow::Result<SearchOptions> {
        let heuristic = match &self.heuristic {
            Some(name) => name.parse()?,
            None if self.diagonal => Heuristic::Diagonal,
            None => Heuristic::Manhattan,
        };
        Ok(SearchOptions {
            heuristic,
            closest: self.closest,
            max_expansions: self.max_expansions,
        })
    }

    /// World extent covering a `width` x `height` cell map.
    pub fn mapping(&self, width: usize, height: usize) -> CoordinateMapping {
        CoordinateMapping::new(
            self.cell_size,
            width as f64 * self.cell_size,
            height as f64 * self.cell_size,
        )
    }
}
