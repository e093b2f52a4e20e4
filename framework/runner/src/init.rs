use crate::cli::LoadgenCli;
use clap::Parser;

/// Initialise the CLI and logging for the load generation runner.
pub fn init() -> LoadgenCli {
    env_logger::init();

    LoadgenCli::parse()
}
