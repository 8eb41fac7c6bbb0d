pub mod cli;
pub mod config;
pub mod domain;
pub mod ranking;
pub mod services;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

use crate::cli::{Algorithm, Command};
use crate::config::settings::AppConfig;
use crate::services::ranking::RankingService;
use crate::services::winrates::WinrateService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_rank(
    input: &Path,
    algorithm: Algorithm,
    bootstrap: bool,
    output: Option<&Path>,
) -> Result<()> {
    let config = AppConfig::new();
    let service = RankingService::new(config);
    service.run(input, algorithm, bootstrap, output)
}

pub fn handle_winrates(input: &Path, output: Option<&Path>) -> Result<()> {
    let service = WinrateService::new();
    service.run(input, output)
}
