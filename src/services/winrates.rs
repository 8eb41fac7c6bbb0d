use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;

use crate::domain::models::ReactionRecord;
use crate::domain::reactions::{WinRate, get_matches_with_score, get_winners, get_winrates};
use crate::services::write_json;

/// Turns raw reaction rows into the cheap reaction-based win-rate table.
pub struct WinrateService;

impl WinrateService {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self, input: &Path, output: Option<&Path>) -> Result<()> {
        let records = load_reactions(input)?;
        info!(
            "Loaded {} reaction rows from {}",
            records.len(),
            input.display()
        );

        let pairs = get_matches_with_score(&records);
        info!("Aggregated into {} conversation pairs", pairs.len());

        let winners = get_winners(&pairs);
        info!("{} pairs produced a winner", winners.len());

        let winrates = get_winrates(&pairs);
        print_winrate_table(&winrates);
        if let Some(path) = output {
            write_json(path, &winrates)?;
            info!("Wrote win-rate table to {}", path.display());
        }

        Ok(())
    }
}

impl Default for WinrateService {
    fn default() -> Self {
        Self::new()
    }
}

fn load_reactions(path: &Path) -> Result<Vec<ReactionRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open reaction table: {}", path.display()))?;
    let records: Vec<ReactionRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse reaction table: {}", path.display()))?;
    Ok(records)
}

fn print_winrate_table(winrates: &[WinRate]) {
    println!(
        "{}",
        format!(
            "{:>4}  {:<40} {:>6} {:>8} {:>9}",
            "#", "model", "wins", "matches", "win rate"
        )
        .bold()
    );
    for (rank, row) in winrates.iter().enumerate() {
        println!(
            "{:>4}  {:<40} {:>6} {:>8} {:>8.1}%",
            rank + 1,
            row.model,
            row.wins,
            row.matches_played,
            row.win_rate
        );
    }
}
