mod app;
mod cli;
mod config;
mod consts;
mod core;
mod error;
mod logging;
mod utils;

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, warn};

use cli::Cli;
use config::Config;
use logging::init_logging;

fn main() -> ExitCode {
    // Usage errors exit 1 (clap would use 2); --help and --version exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let loaded = Config::load(cli.config.as_deref());
    let cli = cli.with_config(&loaded.config);

    init_logging(cli.debug, cli.quiet);
    for warning in &loaded.warnings {
        warn!("{warning}");
    }
    if let Some(source) = &loaded.source {
        debug!("Loaded config from {}", source.display());
    }

    app::execute(&cli, std::io::stdin().lock())
}
