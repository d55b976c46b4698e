use clap::Parser;
use log::{error, info};
use objviewer::app::{AppError, run_cli, run_gui};
use objviewer::io::config::Config;
use std::path::PathBuf;
use std::process::ExitCode;

/// Material-grouped OBJ viewer
#[derive(Parser, Debug)]
#[command(name = "objviewer")]
#[command(about = "Views an OBJ model colored by its MTL materials; drag to rotate")]
struct Cli {
    /// Scene configuration (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Render one frame to `render.output` instead of opening a window
    #[arg(long)]
    headless: bool,
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = match &cli.config {
        Some(path) => {
            info!("Loading config: {}", path.display());
            Config::load(path)?
        }
        None => {
            info!("No config given, using defaults");
            Config::default()
        }
    };

    if cli.headless {
        run_cli(config)
    } else {
        run_gui(config)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
