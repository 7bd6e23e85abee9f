use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use mgs2cc_core::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod requests;

#[derive(Parser)]
#[command(name = "mgs2cc")]
#[command(about = "Crowd-control effects for METAL GEAR SOLID 2")]
#[command(version)]
struct Args {
    #[arg(short, long, default_value = "mgs2cc.toml", env = "MGS2CC_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Attach to the game and run effects read from stdin (default)
    Run,
    /// Print the current game state once
    Status,
    /// List available effects
    Catalog {
        /// Print as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Resolve an address chain against the running game
    Resolve {
        /// Chain expression, e.g. '"METAL GEAR SOLID2.exe"+949340=>+2C'
        expr: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mgs2cc=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command.unwrap_or(Command::Run) {
        Command::Run => commands::run::run(&load_config(&args.config)),
        Command::Status => commands::status::run(&load_config(&args.config)),
        Command::Catalog { json } => commands::catalog::run(json),
        Command::Resolve { expr } => commands::resolve::run(&load_config(&args.config), &expr),
    }
}

fn load_config(path: &Path) -> Config {
    match Config::load(path) {
        Ok(config) => {
            info!("Loaded config from {:?}", path);
            config
        }
        Err(e) if e.is_not_found() => {
            info!("No config at {:?}, using defaults", path);
            Config::default()
        }
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        }
    }
}
