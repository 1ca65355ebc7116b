use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use glam::Vec2;
use isocity_common::{GameConfig, GridCoord};
use isocity_game::GameContext;
use isocity_kernel::City;
use isocity_render::{DebugTextRenderer, Renderer, Viewport};
use isocity_tools::{CityInspector, Tool};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "isocity-cli", about = "Headless isocity tools: simulate, pick, inspect")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the grid size
    #[arg(long, global = true)]
    size: Option<u32>,

    /// Override the growth seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective configuration
    Info,
    /// Place buildings, run ticks and report the resulting city
    Simulate {
        /// Number of ticks to run
        #[arg(short, long, default_value = "10")]
        ticks: u64,
        /// Placements as TOOL@X,Y, e.g. residential@3,4
        #[arg(short, long)]
        place: Vec<Placement>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        /// Print a top-down map of the final scene
        #[arg(long)]
        map: bool,
    },
    /// Report which tile lies under a screen position from the starting camera
    Pick {
        x: f32,
        y: f32,
        #[arg(long, default_value = "1280")]
        width: f32,
        #[arg(long, default_value = "720")]
        height: f32,
    },
}

/// One `TOOL@X,Y` placement from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    tool: Tool,
    coord: GridCoord,
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tool, at) = s
            .split_once('@')
            .ok_or_else(|| format!("expected TOOL@X,Y, got {s:?}"))?;
        let tool = tool.parse::<Tool>().map_err(|e| e.to_string())?;
        let (x, y) = at
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y after '@', got {at:?}"))?;
        let x = x.trim().parse::<u32>().map_err(|e| format!("bad x {x:?}: {e}"))?;
        let y = y.trim().parse::<u32>().map_err(|e| format!("bad y {y:?}: {e}"))?;
        Ok(Self {
            tool,
            coord: GridCoord::new(x, y),
        })
    }
}

fn game_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(size) = cli.size {
        config.grid_size = size;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn simulate(config: GameConfig, ticks: u64, placements: &[Placement], json: bool, map: bool) -> Result<()> {
    let mut game = GameContext::new(config, Viewport::default());

    for placement in placements {
        if !game.city().contains(placement.coord) {
            bail!(
                "placement {} at {} is outside the {}x{} grid",
                placement.tool,
                placement.coord,
                game.city().size(),
                game.city().size()
            );
        }
        game.select_tool(placement.tool);
        let applied = game.apply_tool_to(placement.coord);
        tracing::info!(tool = %applied.tool, coord = %applied.coord, outcome = ?applied.outcome, "placed");
    }

    for _ in 0..ticks {
        game.tick();
    }

    let city = game.city();
    let replayed = City::replay(city.size(), city.seed(), city.events());
    if replayed.state_hash() != city.state_hash() {
        bail!(
            "replay mismatch: {:#x} != {:#x}",
            replayed.state_hash(),
            city.state_hash()
        );
    }

    let summary = CityInspector::summary(city);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
        println!("state hash: {:#018x} (replay OK)", summary.state_hash);
    }
    if map {
        print!("{}", DebugTextRenderer::new().render(game.scene(), game.camera()));
    }
    Ok(())
}

fn pick(config: GameConfig, pointer: Vec2, viewport: Viewport) -> Result<()> {
    if viewport.is_empty() {
        bail!("viewport must be non-empty, got {}x{}", viewport.width, viewport.height);
    }
    let game = GameContext::new(config, viewport);
    match game.tile_at(pointer) {
        Some(coord) => match CityInspector::inspect_tile(game.city(), coord) {
            Some(info) => println!("{info}"),
            None => println!("Tile {coord}"),
        },
        None => println!("no tile under ({}, {})", pointer.x, pointer.y),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = game_config(&cli)?;

    match cli.command {
        Commands::Info => {
            println!("isocity-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("tools: {}", Tool::ALL.map(|t| t.id()).join(", "));
            println!("config:");
            print!("{}", config.to_yaml_string()?);
        }
        Commands::Simulate {
            ticks,
            place,
            json,
            map,
        } => simulate(config, ticks, &place, json, map)?,
        Commands::Pick {
            x,
            y,
            width,
            height,
        } => pick(config, Vec2::new(x, y), Viewport::new(width, height))?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_parses() {
        let p: Placement = "residential@3,4".parse().unwrap();
        assert_eq!(p.tool, Tool::Residential);
        assert_eq!(p.coord, GridCoord::new(3, 4));

        let p: Placement = "bulldoze@0, 7".parse().unwrap();
        assert_eq!(p.coord, GridCoord::new(0, 7));
    }

    #[test]
    fn placement_rejects_bad_input() {
        assert!("residential".parse::<Placement>().is_err());
        assert!("tower@1,1".parse::<Placement>().is_err());
        assert!("road@1".parse::<Placement>().is_err());
        assert!("road@-1,2".parse::<Placement>().is_err());
    }

    #[test]
    fn cli_parses_simulate() {
        let cli = Cli::try_parse_from([
            "isocity-cli",
            "--size",
            "8",
            "simulate",
            "--ticks",
            "3",
            "--place",
            "road@1,1",
            "--place",
            "industrial@2,2",
        ])
        .unwrap();
        assert_eq!(game_config(&cli).unwrap().grid_size, 8);
        match cli.command {
            Commands::Simulate { ticks, place, .. } => {
                assert_eq!(ticks, 3);
                assert_eq!(place.len(), 2);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn zero_size_is_rejected() {
        let cli = Cli::try_parse_from(["isocity-cli", "--size", "0", "info"]).unwrap();
        assert!(game_config(&cli).is_err());
    }
}
