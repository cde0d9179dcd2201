mod cli;
mod db;
mod error;
mod flags;
mod fmt;
mod importer;
mod model;
mod models;
mod settings;
mod worklist;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;
use settings::{load_settings, shellexpand_path, Settings};

const LOG_ENV: &str = "OREGANO_LOG";

fn init_tracing(verbose: u8, settings: &Settings) {
    let fallback = match verbose {
        0 => settings.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let settings = load_settings();
    init_tracing(cli.verbose, &settings);

    let data_dir = match &cli.data_dir {
        Some(dir) => PathBuf::from(shellexpand_path(dir)),
        None => settings.resolved_data_dir(),
    };
    tracing::debug!(dir = %data_dir.display(), "using data dir");

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let mut session = cli::session::Session::open(settings, &data_dir)?;
            cli::shell::run(&mut session)
        }
        Commands::Init => cli::init::run(settings, &data_dir),
        Commands::Status => cli::status::run(&settings, &data_dir),
        Commands::Backup { output } => cli::backup::run(&data_dir, output).map(|_| ()),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
