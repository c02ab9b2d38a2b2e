use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use wallconfig::{parse_viewport, ParticleLayout, ViewportSize};

#[derive(Parser, Debug)]
#[command(
    name = "livewall",
    author,
    version,
    about = "Headless driver for the fall and galaxy live wallpapers"
)]
pub struct Cli {
    /// Configuration file; defaults to `livewall.toml` in the config directory.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long, global = true, value_name = "N")]
    pub frames: Option<u64>,

    /// Seed for star placement, leaves and sky drift.
    #[arg(long, global = true, value_name = "N")]
    pub seed: Option<u64>,

    /// Surface size in pixels (e.g. `1080x1920`).
    #[arg(long, global = true, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<ViewportSize>,

    /// Time between frames (e.g. `16ms`, `0.02`).
    #[arg(long, global = true, value_name = "DURATION", value_parser = parse_interval)]
    pub frame_interval: Option<Duration>,

    /// Frame clock: `fixed` steps by the interval, `system` paces frames in real time.
    #[arg(long, global = true, value_enum, default_value_t = Clock::Fixed)]
    pub clock: Clock,

    /// Print the run summary as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Clock {
    Fixed,
    System,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the falling-leaves water ripple effect.
    Fall(FallArgs),
    /// Run the rotating starfield effect.
    Galaxy(GalaxyArgs),
    /// Inspect or validate configuration.
    Config(ConfigCommand),
}

#[derive(Parser, Debug, Default)]
pub struct FallArgs {
    /// Drop into the water at grid cell X,Y, optionally at FRAME (default 0). Repeatable.
    #[arg(long = "drop", value_name = "X,Y[@FRAME]", value_parser = parse_drop)]
    pub drops: Vec<DropSpec>,

    /// Draw a debug line along every vertex normal.
    #[arg(long)]
    pub normals: bool,

    /// Number of leaves on the water.
    #[arg(long, value_name = "N")]
    pub leaves: Option<u32>,
}

#[derive(Parser, Debug, Default)]
pub struct GalaxyArgs {
    /// Play the fly-in camera sweep shown in the wallpaper picker.
    #[arg(long)]
    pub preview: bool,

    /// Launcher scroll position in `[0, 1]`; out of range values clamp.
    #[arg(long, value_name = "F", value_parser = parse_offset, allow_negative_numbers = true)]
    pub x_offset: Option<f32>,

    /// Particle expansion: `points` or `triangles`.
    #[arg(long, value_name = "LAYOUT", value_parser = ParticleLayout::parse)]
    pub layout: Option<ParticleLayout>,

    /// Number of stars.
    #[arg(long, value_name = "N")]
    pub particles: Option<u32>,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the config directory and the file that would be loaded.
    Where,
    /// Parse and validate a config file.
    Check {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML.
    Dump,
}

/// A scheduled drop from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropSpec {
    pub x: i32,
    pub y: i32,
    pub frame: u64,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_drop(value: &str) -> Result<DropSpec, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("drop must not be empty".into());
    }

    let (position, frame) = match trimmed.split_once('@') {
        Some((position, frame)) => {
            let frame = frame
                .trim()
                .parse::<u64>()
                .map_err(|_| format!("invalid drop frame '{}'", frame.trim()))?;
            (position, frame)
        }
        None => (trimmed, 0),
    };

    let (x, y) = position
        .split_once(',')
        .ok_or_else(|| "expected X,Y[@FRAME]".to_string())?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("invalid drop x '{}'", x.trim()))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("invalid drop y '{}'", y.trim()))?;
    Ok(DropSpec { x, y, frame })
}

pub fn parse_size(value: &str) -> Result<ViewportSize, String> {
    parse_viewport(value)
}

pub fn parse_interval(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("frame interval must not be empty".into());
    }
    let interval = match trimmed.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Duration::from_secs_f64(seconds),
        Ok(_) => return Err(format!("invalid frame interval '{trimmed}'")),
        Err(_) => humantime::parse_duration(trimmed)
            .map_err(|err| format!("invalid frame interval '{trimmed}': {err}"))?,
    };
    if interval.is_zero() {
        return Err("frame interval must be greater than zero".into());
    }
    Ok(interval)
}

pub fn parse_offset(value: &str) -> Result<f32, String> {
    let offset = value
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("invalid x offset '{}'", value.trim()))?;
    if !offset.is_finite() {
        return Err("x offset must be finite".into());
    }
    Ok(offset)
}
