#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Atron mining expedition.

mod config;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use atron_mining_core::WELCOME_BANNER;
use atron_mining_system_expedition::{Expedition, ExpeditionConfig};
use atron_mining_world::{query, GenerationConfig, MapData};
use clap::Parser;
use rand::seq::SliceRandom;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::FileConfig;

/// Runs an Atron mining expedition and reports the minerals refined.
#[derive(Debug, Parser)]
#[command(name = "atron-mining", version, about)]
struct Args {
    /// Map file to load instead of generating one.
    #[arg(long, conflicts_with = "map_dir")]
    map: Option<PathBuf>,

    /// Directory to pick a random map file from.
    #[arg(long)]
    map_dir: Option<PathBuf>,

    /// Width of a generated map.
    #[arg(long)]
    width: Option<u32>,

    /// Height of a generated map.
    #[arg(long)]
    height: Option<u32>,

    /// Mineral density of a generated map.
    #[arg(long)]
    density: Option<f64>,

    /// Seed for map generation and map selection.
    #[arg(long)]
    seed: Option<u64>,

    /// Tick budget.
    #[arg(long)]
    ticks: Option<u32>,

    /// Refined minerals that end the expedition early.
    #[arg(long)]
    quota: Option<u32>,

    /// Player moves, one per tick, before the player is retrieved.
    #[arg(long, value_delimiter = ',')]
    moves: Vec<String>,

    /// TOML settings file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log every tick and draw the revealed map to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    info!(seed, "{}", WELCOME_BANNER);

    let map = load_map(&args, &file, &mut rng)?;
    let mut config = file.expedition();
    if let Some(ticks) = args.ticks {
        config.tick_budget = ticks;
    }
    if let Some(quota) = args.quota {
        config.refined_quota = quota;
    }

    let refined = run(map, config, &args.moves, args.verbose)?;
    println!("Total mined: {refined}");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_map(args: &Args, file: &FileConfig, rng: &mut ChaCha8Rng) -> Result<MapData> {
    if let Some(path) = &args.map {
        return MapData::from_file(path).with_context(|| format!("loading {}", path.display()));
    }
    if let Some(directory) = &args.map_dir {
        let path = pick_map_file(directory, rng)?;
        info!(path = %path.display(), "picked map");
        return MapData::from_file(&path).with_context(|| format!("loading {}", path.display()));
    }

    let mut generation = file.generation(GenerationConfig::random(rng));
    if let Some(width) = args.width {
        generation.width = width;
    }
    if let Some(height) = args.height {
        generation.height = height;
    }
    if let Some(density) = args.density {
        generation.mineral_density = density;
    }
    MapData::from_scratch(&generation, rng).context("generating map")
}

fn pick_map_file(directory: &Path, rng: &mut ChaCha8Rng) -> Result<PathBuf> {
    let entries = fs::read_dir(directory)
        .with_context(|| format!("reading map directory {}", directory.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("reading map directory {}", directory.display()))?
            .path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    match files.choose(rng) {
        Some(path) => Ok(path.clone()),
        None => bail!("no map files in {}", directory.display()),
    }
}

fn run(map: MapData, config: ExpeditionConfig, moves: &[String], verbose: bool) -> Result<i64> {
    let mut expedition = Expedition::new(map, config).context("preparing expedition")?;
    if !moves.is_empty() {
        let _ = expedition.start().context("landing the player")?;
    }
    let mut moves = moves.iter();

    while !expedition.is_finished() {
        let report = match moves.next() {
            Some(token) => expedition.submit_input_token(token),
            None => {
                retrieve_player(&mut expedition);
                expedition.advance()
            }
        };
        debug!(
            tick = report.tick,
            command = %report.command,
            events = report.events.len(),
            ticks_left = expedition.ticks().get(),
            refined = expedition.refined().get(),
            "tick resolved"
        );
        if verbose {
            eprintln!("{}\n", query::render_discovered(expedition.map()));
        }
    }
    retrieve_player(&mut expedition);

    println!("{}", expedition.map());
    Ok(expedition.refined().get())
}

fn retrieve_player(expedition: &mut Expedition) {
    if !expedition.player().is_deployed() {
        return;
    }
    let retrieved = if expedition.player().coordinate() == Some(expedition.map().landing_zone()) {
        expedition.extract_player()
    } else {
        expedition.withdraw_player()
    };
    match retrieved {
        Ok(payload) => info!(payload, "player retrieved"),
        Err(error) => warn!(%error, "could not retrieve player"),
    }
}
