//! wfcalc - Command-line driver for the damage calculation engine

mod commands;
mod report;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "wfcalc")]
#[command(about = "Weapon damage calculator: resolve builds, inspect rivens, share loadouts")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Load the catalog from this directory instead of the built-in data
    #[arg(long, value_name = "DIR", global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List weapon names
    Weapons {
        /// Case-insensitive substring filter
        #[arg(long)]
        filter: Option<String>,
    },
    /// Resolve a share string, or a build assembled from arguments
    Resolve {
        /// Share string to decode
        #[arg(long, value_name = "SHARE", conflicts_with = "weapon")]
        state: Option<String>,
        /// Print the results as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Expected riven roll values for up to four slots
    Riven {
        #[arg(long)]
        weapon: String,
        /// Affix tags: three buffs then the curse
        #[arg(long = "slot", value_name = "TAG", num_args = 1..=4, required = true)]
        slots: Vec<String>,
    },
    /// Print the share string of a build assembled from arguments
    Encode {
        #[command(flatten)]
        build: BuildArgs,
    },
}

/// A build and its target given on the command line
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    #[arg(long)]
    pub weapon: Option<String>,
    /// Mod in the next slot, at max rank unless given
    #[arg(long = "mod", value_name = "NAME[:RANK]")]
    pub mods: Vec<String>,
    /// Enemy preset, by unique or display name
    #[arg(long)]
    pub enemy: Option<String>,
    #[arg(long)]
    pub level: Option<u32>,
    #[arg(long)]
    pub headshot: bool,
}

/// Initialize logging: `RUST_LOG` wins, otherwise INFO or DEBUG with `--verbose`
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = commands::load_catalog(cli.config_dir.as_deref()).and_then(|catalog| {
        match cli.command {
            Commands::Weapons { filter } => commands::run_weapons(&catalog, filter.as_deref()),
            Commands::Resolve { state, json, build } => match state {
                Some(share) => commands::run_resolve_state(&catalog, &share, json),
                None => commands::run_resolve_args(&catalog, &build, json),
            },
            Commands::Riven { weapon, slots } => commands::run_riven(&catalog, &weapon, &slots),
            Commands::Encode { build } => commands::run_encode(&catalog, &build),
        }
    });

    match result {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
