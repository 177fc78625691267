//! `pinch-track` CLI: replay scripted gesture input, inspect configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pinch_track_cli::{replay, ReplayScript};
use pinch_track_config::{SourceMode, TrackingConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pinch-track", version, about = "Hand and touch gesture tracking")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a JSON replay script through a gesture source and print the events.
    Replay {
        /// Path to the replay script
        script: PathBuf,
        /// Config file (defaults to the platform config location)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the configured source mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default config file location
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Touch,
    Device,
    Kit,
}

impl From<ModeArg> for SourceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Touch => SourceMode::Touch,
            ModeArg::Device => SourceMode::Device,
            ModeArg::Kit => SourceMode::Kit,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Replay {
            script,
            config,
            mode,
            json,
        } => run_replay(&script, config, mode, json),
        Commands::Config { action } => match action {
            ConfigAction::Show { config } => {
                let config = TrackingConfig::load_or_default(config.as_deref())?;
                print!("{}", config.to_toml_string()?);
                Ok(())
            }
            ConfigAction::Path => {
                let path = TrackingConfig::default_path()
                    .context("No home directory to place the config in")?;
                println!("{}", path.display());
                Ok(())
            }
        },
    }
}

fn run_replay(
    script_path: &std::path::Path,
    config_path: Option<PathBuf>,
    mode: Option<ModeArg>,
    json: bool,
) -> Result<()> {
    let mut config = TrackingConfig::load_or_default(config_path.as_deref())?;
    if let Some(mode) = mode {
        config.mode = mode.into();
    }
    let script = ReplayScript::load(script_path)?;

    let report = replay(&config, &script)?;

    for event in &report.events {
        if json {
            println!("{}", serde_json::to_string(event)?);
        } else {
            println!("{}", event);
        }
    }

    if json {
        println!("{}", serde_json::to_string(&report.summary)?);
    } else {
        println!();
        println!("{}", report.summary);
    }
    Ok(())
}
