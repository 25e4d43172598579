#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that streams Scroll Runner segments without a window.

mod headless;

use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use glam::IVec2;
use scroll_runner_core::{Command, EntityKind, Event, SegmentId};
use scroll_runner_rendering::{TerrainRenderer, Viewport};
use scroll_runner_system_spawning::SpawnRegistry;
use scroll_runner_world::{self as world, query, Config, DirectorySource, World};

use crate::headless::{FileImages, Spawner};

#[derive(Debug, Parser)]
#[command(name = "scroll-runner")]
#[command(about = "Scrolls through tile-map segments and reports what happened")]
struct CliArgs {
    /// Directory holding the segment files.
    #[arg(long, default_value = "maps")]
    maps: PathBuf,
    /// Segment shown when the world starts.
    #[arg(long, default_value = "start.dat")]
    initial: String,
    /// Number of scroll steps to run.
    #[arg(long, default_value_t = 120)]
    ticks: u64,
    /// TOML file with world configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Random seed, overriding the one in the configuration file.
    #[arg(long)]
    seed: Option<u64>,
    /// Image directory. When set, every referenced image must exist in it.
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Frame width in pixels for the final terrain frame.
    #[arg(long, default_value_t = 640)]
    width: i32,
    /// Frame height in pixels for the final terrain frame.
    #[arg(long, default_value_t = 480)]
    height: i32,
}

/// Tallies of the events observed while scrolling.
#[derive(Debug, Default)]
struct Summary {
    spawned: usize,
    evicted: usize,
    staged: Vec<SegmentId>,
}

impl Summary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::Scrolled { tick } => log::trace!("tick {tick}"),
                Event::EntitySpawned { kind, tile, asset } => {
                    log::debug!("spawned {kind} at {tile} ({asset})");
                    self.spawned += 1;
                }
                Event::EntitiesEvicted { count } => self.evicted += count,
                Event::SegmentStaged { segment } => {
                    log::info!("staged segment `{segment}`");
                    self.staged.push(segment.clone());
                }
                Event::TileCleared { tile } => log::debug!("cleared tile {tile}"),
            }
        }
    }
}

/// Entry point for the Scroll Runner command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();
    run(&args)
}

fn run(args: &CliArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut summary = Summary::default();
    let mut events = Vec::new();
    let mut world = World::load(
        config,
        SpawnRegistry::standard(),
        DirectorySource::new(&args.maps),
        Spawner::new(FileImages::new(args.assets.clone())),
        &SegmentId::new(args.initial.as_str()),
        &mut events,
    )
    .with_context(|| {
        format!(
            "failed to build world from `{}` in `{}`",
            args.initial,
            args.maps.display()
        )
    })?;
    log::info!("running with {:?}", query::config(&world));
    summary.record(&events);

    for step in 1..=args.ticks {
        events.clear();
        world::apply(&mut world, Command::Scroll, &mut events)
            .with_context(|| format!("scroll step {step} failed"))?;
        summary.record(&events);
    }

    let mut images = FileImages::new(args.assets.clone());
    let renderer = TerrainRenderer::new(&mut images)?;
    let viewport = Viewport::new(IVec2::ZERO, IVec2::new(args.width, args.height));
    let draws = renderer.draw_calls(query::active_tiles(&world), viewport);

    let mut tracked: BTreeMap<&EntityKind, usize> = BTreeMap::new();
    for sprite in query::entities(&world) {
        *tracked.entry(sprite.kind()).or_default() += 1;
        log::debug!("tracking {} drawn from `{}`", sprite.kind(), sprite.image().display());
    }

    println!("ticks: {}", query::tick_index(&world));
    let spawned = tally(
        world
            .constructor()
            .spawned()
            .iter()
            .map(|(kind, count)| (kind, *count)),
    );
    println!("spawned: {spawned}");
    println!("spawn events: {}", summary.spawned);
    println!("tracked: {}", tally(tracked));
    println!("evicted: {}", summary.evicted);
    println!("images loaded: {}", world.constructor().images_loaded());
    println!(
        "segments staged: {}",
        summary
            .staged
            .iter()
            .map(SegmentId::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("staged now: {}", query::staged_segment(&world));
    println!("terrain draw calls: {}", draws.len());
    println!("{}", query::active_grid(&world));

    Ok(())
}

fn load_config(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration `{}`", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("failed to parse configuration `{}`", path.display()))
}

fn tally<K>(counts: impl IntoIterator<Item = (K, usize)>) -> String
where
    K: fmt::Display,
{
    let parts: Vec<String> = counts
        .into_iter()
        .map(|(kind, count)| format!("{kind}={count}"))
        .collect();
    if parts.is_empty() {
        "none".to_owned()
    } else {
        parts.join(" ")
    }
}
