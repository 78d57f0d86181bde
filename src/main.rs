use warpath::config::{Cli, Config};
use warpath::map::Map;
use warpath::navigation::find_path;
use warpath::scenario::Scenario;
use warpath::stat::Stats;
use warpath::WorldPos;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct QueryReport {
    start: WorldPos,
    goal: WorldPos,
    waypoints: Vec<WorldPos>,
}

#[derive(Debug, Serialize)]
struct Report {
    map: String,
    revision: u64,
    queries: Vec<QueryReport>,
    stats: Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = fs::read_to_string(config_file)
            .with_context(|| format!("cannot read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let map = Map::from_file(&config.map_path)?;
    let mut grid = map.to_grid(config.diagonal)?;
    let mapping = config.mapping(map.width, map.height);
    let options = config.search_options()?;
    info!(
        "Loaded {}x{} map {}, revision {}",
        map.width,
        map.height,
        config.map_path,
        grid.last_updated()
    );

    let scenario = Scenario::load_from_scen(&config.scen_path)?;
    scenario
        .verify(&map)
        .with_context(|| format!("scenario {} does not fit its map", config.scen_path))?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let queries = if config.buckets.is_empty() {
        scenario.queries_randomly(config.num_queries.min(scenario.query_count()), &mut rng)?
    } else {
        scenario.queries_by_buckets(&config.buckets, &mut rng)?
    };

    let mut stats = Stats::default();
    let mut reports = Vec::with_capacity(queries.len());
    for query in &queries {
        if !query.verify(&grid) {
            warn!(
                "Skipping query {:?} -> {:?}: endpoint off the map or on a wall",
                query.start, query.goal
            );
            continue;
        }
        let start = mapping.cell_to_world(query.start);
        let goal = mapping.cell_to_world(query.goal);
        let waypoints = find_path(&mut grid, &mapping, start, goal, &options, &mut stats)?;
        if waypoints.is_empty() && query.start != query.goal {
            warn!("No path from {:?} to {:?}", query.start, query.goal);
        }
        reports.push(QueryReport {
            start,
            goal,
            waypoints,
        });
    }
    stats.print();

    let report = Report {
        map: config.map_path.clone(),
        revision: grid.last_updated(),
        queries: reports,
        stats,
    };
    if let Some(parent) = Path::new(&config.output_path).parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create output directory for {}", config.output_path))?;
    }
    fs::write(&config.output_path, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("cannot write report to {}", config.output_path))?;
    info!("Report written to {}", config.output_path);

    Ok(())
}
