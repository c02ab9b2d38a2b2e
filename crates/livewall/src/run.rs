use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{bail, Context, Result};
use effect::{
    BoxedTimeSource, Effect, FixedStepTimeSource, SystemTimeSource, TimeSource, Viewport,
};
use galaxy::GalaxyScene;
use ripple::FallScene;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wallconfig::{RunSettings, WallConfig};

use crate::cli::{Cli, Clock, DropSpec, FallArgs, GalaxyArgs};
use crate::paths::AppPaths;
use crate::summary::{EffectDetails, RunSummary};

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Defaults => "built-in defaults".to_string(),
        }
    }
}

pub fn read_config(path: &Path) -> Result<WallConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    WallConfig::from_toml_str(&text)
        .with_context(|| format!("failed to load config file {}", path.display()))
}

/// Loads `--config`, else the user config file when present, else defaults.
pub fn load_config(explicit: Option<&Path>, paths: &AppPaths) -> Result<(WallConfig, ConfigSource)> {
    if let Some(path) = explicit {
        return Ok((read_config(path)?, ConfigSource::File(path.to_path_buf())));
    }
    let user_file = paths.config_file();
    if user_file.is_file() {
        return Ok((read_config(&user_file)?, ConfigSource::File(user_file)));
    }
    Ok((WallConfig::default(), ConfigSource::Defaults))
}

/// Resolves the configuration and applies the global command line overrides.
pub fn effective_config(cli: &Cli) -> Result<(WallConfig, ConfigSource)> {
    let paths = AppPaths::discover()?;
    let (mut config, source) = load_config(cli.config.as_deref(), &paths)?;
    debug!(
        config_dir = %paths.config_dir().display(),
        source = %source.describe(),
        "resolved livewall configuration"
    );

    if let Some(frames) = cli.frames {
        config.run.frames = frames;
    }
    if let Some(seed) = cli.seed {
        config.run.seed = seed;
    }
    if let Some(size) = cli.size {
        config.run.viewport = size;
    }
    if let Some(interval) = cli.frame_interval {
        config.run.frame_interval = interval;
    }
    Ok((config, source))
}

pub fn run_fall(cli: &Cli, args: &FallArgs) -> Result<()> {
    let (mut config, source) = effective_config(cli)?;
    if args.normals {
        config.fall.show_normals = true;
    }
    if let Some(leaves) = args.leaves {
        config.fall.leaves = leaves;
        config.fall.falling_leaves = config.fall.falling_leaves.min(leaves);
    }
    config
        .validate()
        .context("invalid fall configuration after applying command line overrides")?;

    let schedule = drop_schedule(&args.drops, config.run.frames)?;
    let viewport = viewport(&config.run);
    info!(source = %source.describe(), frames = config.run.frames, "running fall");

    let mut scene = FallScene::from_config(&config.fall, viewport, config.run.seed);
    let totals = drive(&mut scene, &config.run, cli.clock, |scene, frame| {
        if let Some(drop) = schedule.get(&frame) {
            scene.queue_drop(drop.x, drop.y);
        }
    });

    let stats = scene.stats();
    let surface = *scene.surface();
    let summary = RunSummary {
        effect: scene.name(),
        frames: totals.frames,
        viewport: viewport.to_string(),
        seed: config.run.seed,
        simulated_seconds: totals.seconds,
        commands: totals.commands,
        draw_calls: totals.draw_calls,
        details: EffectDetails::Fall {
            mesh_width: surface.mesh_width,
            mesh_height: surface.mesh_height,
            leaves: scene.leaves().len(),
            drops: stats.drops,
            landings: stats.landings,
            ripple_energy: scene.ripple_map().energy(),
        },
    };
    report(&summary, cli.json)
}

pub fn run_galaxy(cli: &Cli, args: &GalaxyArgs) -> Result<()> {
    let (mut config, source) = effective_config(cli)?;
    if args.preview {
        config.galaxy.preview = true;
    }
    if let Some(layout) = args.layout {
        config.galaxy.layout = layout;
    }
    if let Some(particles) = args.particles {
        config.galaxy.particles = particles;
    }
    config
        .validate()
        .context("invalid galaxy configuration after applying command line overrides")?;

    let viewport = viewport(&config.run);
    info!(source = %source.describe(), frames = config.run.frames, "running galaxy");

    let mut scene = GalaxyScene::from_config(&config.galaxy, viewport, config.run.seed);
    if let Some(offset) = args.x_offset {
        scene.set_x_offset(offset);
    }
    let totals = drive(&mut scene, &config.run, cli.clock, |_, _| {});

    let summary = RunSummary {
        effect: scene.name(),
        frames: totals.frames,
        viewport: viewport.to_string(),
        seed: config.run.seed,
        simulated_seconds: totals.seconds,
        commands: totals.commands,
        draw_calls: totals.draw_calls,
        details: EffectDetails::Galaxy {
            stars: scene.stars().len(),
            layout: format!("{:?}", scene.layout()).to_ascii_lowercase(),
            vertices: scene.particle_buffer().vertex_count(),
            x_offset: scene.x_offset(),
            preview: scene.is_preview(),
            mean_angle_advance: scene.mean_angle_advance(),
        },
    };
    report(&summary, cli.json)
}

/// Indexes drops by frame; only one drop can be pending per frame.
fn drop_schedule(drops: &[DropSpec], frames: u64) -> Result<BTreeMap<u64, DropSpec>> {
    let mut schedule = BTreeMap::new();
    for drop in drops {
        if drop.frame >= frames {
            bail!(
                "drop at {},{} is scheduled for frame {} but the run has {frames} frames",
                drop.x,
                drop.y,
                drop.frame
            );
        }
        if schedule.insert(drop.frame, *drop).is_some() {
            bail!(
                "more than one drop scheduled for frame {}; schedule them on different frames",
                drop.frame
            );
        }
    }
    Ok(schedule)
}

fn viewport(run: &RunSettings) -> Viewport {
    Viewport::new(run.viewport.width, run.viewport.height)
}

#[derive(Debug, Default, Clone, Copy)]
struct FrameTotals {
    frames: u64,
    commands: usize,
    draw_calls: usize,
    seconds: f32,
}

fn time_source(clock: Clock, run: &RunSettings) -> BoxedTimeSource {
    match clock {
        Clock::Fixed => Box::new(FixedStepTimeSource::new(run.frame_interval)),
        Clock::System => Box::new(SystemTimeSource::new()),
    }
}

/// Steps `effect` for the configured number of frames. `before_step` runs
/// ahead of every step with the frame index so hosts can inject input.
fn drive<E, F>(effect: &mut E, run: &RunSettings, clock: Clock, mut before_step: F) -> FrameTotals
where
    E: Effect,
    F: FnMut(&mut E, u64),
{
    let mut time = time_source(clock, run);
    time.reset();
    let mut totals = FrameTotals::default();

    for frame in 0..run.frames {
        before_step(effect, frame);
        let sample = time.sample();
        let commands = effect.step(sample);

        totals.frames += 1;
        totals.commands += commands.len();
        totals.draw_calls += commands.draw_calls();
        totals.seconds = sample.seconds;

        if !commands.keep_running {
            info!(frame, effect = effect.name(), "effect requested stop");
            break;
        }
        if clock == Clock::System {
            thread::sleep(run.frame_interval);
        }
    }

    info!(
        effect = effect.name(),
        frames = totals.frames,
        commands = totals.commands,
        "run finished"
    );
    totals
}

fn report(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        let text = summary.to_json().context("failed to encode run summary")?;
        println!("{text}");
    } else {
        println!("{summary}");
    }
    Ok(())
}
