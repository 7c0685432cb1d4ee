use std::env;
use std::fs;
use std::io::{self, Write as _};
use std::path::PathBuf;

use anyhow::{anyhow, Context as _};
use clap::Parser;
use directories::ProjectDirs;
use scrim::cli::{Cli, Sub};
use scrim::geometry::Size;
use scrim::options::Options;
use scrim::replay::{parse_script, Replay};
use scrim_config::Config;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "scrim=info";

fn main() -> anyhow::Result<()> {
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.subcommand {
        Sub::Check => {
            let options = Options::from_config(&config);
            info!("config is valid");
            println!("{options:#?}");
        }
        Sub::Replay {
            script,
            width,
            height,
        } => {
            let text = fs::read_to_string(&script)
                .with_context(|| format!("error reading {script:?}"))?;
            let steps = parse_script(&text).with_context(|| format!("error parsing {script:?}"))?;
            debug!("replaying {} steps", steps.len());

            let mut stdout = io::stdout().lock();
            let mut result = Ok(());
            let mut replay = Replay::new(&config, Size::new(width, height));
            replay.run(&steps, |record| {
                if result.is_err() {
                    return;
                }
                result = serde_json::to_string(&record)
                    .map_err(anyhow::Error::from)
                    .and_then(|line| writeln!(stdout, "{line}").map_err(anyhow::Error::from));
            });
            result.context("error writing frame")?;
        }
    }

    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "scrim")?;
    Some(dirs.config_dir().join("config.kdl"))
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    // An explicitly requested config must exist.
    let config = if let Some(path) = path {
        Config::load(&path)
    } else if let Some(path) = default_config_path() {
        Config::load_or_default(&path)
    } else {
        debug!("no config directory, using defaults");
        Ok(Config::default())
    };

    config.map_err(|err| anyhow!("{err:?}"))
}
