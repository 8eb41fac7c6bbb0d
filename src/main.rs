use anyhow::Result;

use arena_ranking::cli::Command;
use arena_ranking::{handle_rank, handle_winrates, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Rank {
            input,
            algorithm,
            bootstrap,
            output,
        } => handle_rank(input, *algorithm, *bootstrap, output.as_deref()),
        Command::Winrates { input, output } => handle_winrates(input, output.as_deref()),
    }
}
