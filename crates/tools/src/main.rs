use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use delve_core::{GenEvent, GenerationConfig, LevelData, LevelGenerator, Pos, TileKind};
use serde::Serialize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate one level and print it as ASCII
    Render {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        /// Path to a TOML generation config; missing fields use defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Generate many levels, verify invariants, and report JSON stats
    Sweep {
        /// Number of consecutive seeds to generate
        #[arg(long, default_value_t = 32)]
        seeds: u64,
        /// First seed of the sweep
        #[arg(long, default_value_t = 0)]
        start: u64,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Render { seed, config } => {
            let config = load_config(config.as_deref())?;
            render(seed, &config)
        }
        Command::Sweep { seeds, start, config } => {
            let config = load_config(config.as_deref())?;
            sweep(start, seeds, &config)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<GenerationConfig> {
    let Some(path) = path else {
        return Ok(GenerationConfig::default());
    };
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&data)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn render(seed: u64, config: &GenerationConfig) -> Result<()> {
    let mut generator = LevelGenerator::new(seed, config.clone());
    let level = generator
        .generate()
        .with_context(|| format!("Generation failed for seed {seed}"))?;

    print!("{}", render_ascii(&level));
    println!(
        "seed {seed}: {} rooms, {} connections, fingerprint {:016x}",
        level.rooms.len(),
        level.connections.len(),
        level.fingerprint()
    );
    for event in generator.events() {
        println!("  {event:?}");
    }

    Ok(())
}

fn render_ascii(level: &LevelData) -> String {
    let mut out = String::with_capacity((level.grid.width() + 1) * level.grid.height());
    for y in 0..level.grid.height() as i32 {
        for x in 0..level.grid.width() as i32 {
            out.push(match level.tile_at(Pos::new(x, y)) {
                None => ' ',
                Some(TileKind::Wall) => '#',
                Some(TileKind::Floor) => '.',
                Some(TileKind::Door) => '+',
            });
        }
        out.push('\n');
    }
    out
}

#[derive(Debug, Default, Serialize)]
struct EventCounts {
    rooms_discarded: u64,
    corridors_skipped: u64,
    doors_demoted: u64,
}

#[derive(Debug, Serialize)]
struct SweepReport {
    start: u64,
    seeds: u64,
    generated: u64,
    budget_exhausted: u64,
    invariant_violations: Vec<String>,
    min_rooms: usize,
    max_rooms: usize,
    mean_rooms: f64,
    mean_connections: f64,
    events: EventCounts,
}

fn sweep(start: u64, seeds: u64, config: &GenerationConfig) -> Result<()> {
    let mut generated = 0u64;
    let mut budget_exhausted = 0u64;
    let mut violations = Vec::new();
    let mut min_rooms = usize::MAX;
    let mut max_rooms = 0usize;
    let mut total_rooms = 0usize;
    let mut total_connections = 0usize;
    let mut events = EventCounts::default();

    for seed in start..start.saturating_add(seeds) {
        let mut generator = LevelGenerator::new(seed, config.clone());
        let level = match generator.generate() {
            Ok(level) => level,
            Err(error) => {
                budget_exhausted += 1;
                violations_note(&mut violations, seed, &format!("generation failed: {error}"));
                continue;
            }
        };
        generated += 1;

        for problem in verify_level(&level) {
            violations_note(&mut violations, seed, &problem);
        }

        min_rooms = min_rooms.min(level.rooms.len());
        max_rooms = max_rooms.max(level.rooms.len());
        total_rooms += level.rooms.len();
        total_connections += level.connections.len();
        for event in generator.events() {
            match event {
                GenEvent::RoomDiscarded { .. } => events.rooms_discarded += 1,
                GenEvent::CorridorSkippedSingleWall { .. } => events.corridors_skipped += 1,
                GenEvent::DoorDemoted { .. } => events.doors_demoted += 1,
            }
        }
    }

    let report = SweepReport {
        start,
        seeds,
        generated,
        budget_exhausted,
        invariant_violations: violations,
        min_rooms: if generated == 0 { 0 } else { min_rooms },
        max_rooms,
        mean_rooms: mean(total_rooms, generated),
        mean_connections: mean(total_connections, generated),
        events,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn mean(total: usize, count: u64) -> f64 {
    if count == 0 { 0.0 } else { total as f64 / count as f64 }
}

fn violations_note(violations: &mut Vec<String>, seed: u64, problem: &str) {
    violations.push(format!("seed {seed}: {problem}"));
}

/// Checks the structural invariants a finished level must satisfy:
/// walkable cells sealed away from the void, one walkable component, and
/// a door tile behind every connection.
fn verify_level(level: &LevelData) -> Vec<String> {
    let mut problems = Vec::new();

    let mut walkable = BTreeSet::new();
    for y in 0..level.grid.height() as i32 {
        for x in 0..level.grid.width() as i32 {
            let pos = Pos::new(x, y);
            if matches!(level.tile_at(pos), Some(TileKind::Floor | TileKind::Door)) {
                walkable.insert(pos);
            }
        }
    }
    if walkable.is_empty() {
        problems.push("level has no walkable cells".to_string());
        return problems;
    }

    for &pos in &walkable {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let neighbour = Pos::new(pos.x + dx, pos.y + dy);
                if !level.grid.in_bounds(neighbour) || level.tile_at(neighbour).is_none() {
                    problems.push(format!("walkable cell {pos:?} exposed to the void"));
                }
            }
        }
    }

    let start = *walkable.iter().next().unwrap();
    let mut reached = BTreeSet::new();
    let mut stack = vec![start];
    while let Some(pos) = stack.pop() {
        if !reached.insert(pos) {
            continue;
        }
        for dy in -1..=1 {
            for dx in -1..=1 {
                let neighbour = Pos::new(pos.x + dx, pos.y + dy);
                if walkable.contains(&neighbour) {
                    stack.push(neighbour);
                }
            }
        }
    }
    if reached.len() != walkable.len() {
        problems.push(format!(
            "{} walkable cells unreachable from {start:?}",
            walkable.len() - reached.len()
        ));
    }

    for connection in &level.connections {
        if level.tile_at(connection.door) != Some(TileKind::Door) {
            problems.push(format!("connection door {:?} is not a door tile", connection.door));
        }
    }

    problems
}
