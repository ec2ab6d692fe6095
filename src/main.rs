use std::process::ExitCode;

use clap::Parser;
use shrinkwrap_resolver::cli::{self, args::CliArgs};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = cli::run(CliArgs::parse()) {
        log::error!("{:#}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
