mod cli;
mod paths;
mod run;
mod summary;

use anyhow::{bail, Context, Result};
use cli::{Cli, Command, ConfigAction};
use paths::{AppPaths, ENV_CONFIG_DIR};

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match &cli.command {
        Command::Fall(args) => run::run_fall(&cli, args),
        Command::Galaxy(args) => run::run_galaxy(&cli, args),
        Command::Config(config_cmd) => handle_config_command(&cli, &config_cmd.action),
    }
}

fn handle_config_command(cli: &Cli, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Where => run_config_where(),
        ConfigAction::Check { file } => run_config_check(cli, file.as_deref()),
        ConfigAction::Dump => run_config_dump(cli),
    }
}

fn run_config_where() -> Result<()> {
    let paths = AppPaths::discover()?;
    let file = paths.config_file();
    println!("Configuration:");
    println!("  dir:    {}", paths.config_dir().display());
    println!(
        "  file:   {} ({})",
        file.display(),
        if file.is_file() { "present" } else { "missing" }
    );
    println!("  env:    {ENV_CONFIG_DIR}");
    Ok(())
}

fn run_config_check(cli: &Cli, file: Option<&std::path::Path>) -> Result<()> {
    let path = match file.or(cli.config.as_deref()) {
        Some(path) => path.to_path_buf(),
        None => AppPaths::discover()?.config_file(),
    };
    if !path.is_file() {
        bail!("no configuration file at {}", path.display());
    }
    let config = run::read_config(&path)?;
    println!(
        "{}: ok (version {}, {} frames at {}x{})",
        path.display(),
        config.version,
        config.run.frames,
        config.run.viewport.width,
        config.run.viewport.height
    );
    Ok(())
}

fn run_config_dump(cli: &Cli) -> Result<()> {
    let (config, source) = run::effective_config(cli)?;
    config
        .validate()
        .context("effective configuration is invalid")?;
    let text = config
        .to_toml_string()
        .context("failed to encode configuration")?;
    println!("# source: {}", source.describe());
    print!("{text}");
    Ok(())
}
