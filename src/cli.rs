use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(subcommand_value_name = "SUBCOMMAND")]
#[command(subcommand_help_heading = "Subcommands")]
pub struct Cli {
    /// Path to config file (default: `$XDG_CONFIG_HOME/scrim/config.kdl`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: Sub,
}

#[derive(Subcommand)]
pub enum Sub {
    /// Validate the config file and print the resolved options.
    Check,
    /// Replay a scripted session against a headless host, printing one JSON line per frame.
    Replay {
        /// Path to a JSON array of steps.
        script: PathBuf,
        /// Width of the view the modal covers.
        #[arg(long, default_value_t = 1280.)]
        width: f64,
        /// Height of the view the modal covers.
        #[arg(long, default_value_t = 720.)]
        height: f64,
    },
}
