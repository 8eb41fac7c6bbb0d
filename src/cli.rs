use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about = "chatbot-arena model ranking engine")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Rank models from a JSON list of pairwise matches
    Rank {
        /// Path to the match list
        #[arg(short, long)]
        input: PathBuf,
        /// Ranking algorithm
        #[arg(short, long, value_enum, default_value_t = Algorithm::Elo)]
        algorithm: Algorithm,
        /// Compute bootstrap confidence intervals instead of point estimates
        #[arg(short, long)]
        bootstrap: bool,
        /// Write the result table as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compute reaction-based win rates from a JSON reaction table
    Winrates {
        /// Path to the reaction table
        #[arg(short, long)]
        input: PathBuf,
        /// Write the win-rate table as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
pub enum Algorithm {
    /// Online Elo updates over the match history
    Elo,
    /// Bradley-Terry maximum likelihood over aggregated counts
    Mle,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Elo => write!(f, "elo"),
            Algorithm::Mle => write!(f, "mle"),
        }
    }
}
