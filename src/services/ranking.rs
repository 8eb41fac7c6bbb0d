use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;

use crate::cli::Algorithm;
use crate::config::settings::AppConfig;
use crate::ranking::{BootstrapScore, EloRanker, Match, MleRanker, RankedScore, Ranker};
use crate::services::write_json;

/// Runs one full ranking pass: load matches, fit the selected algorithm,
/// report the table.
pub struct RankingService {
    config: AppConfig,
}

impl RankingService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(
        &self,
        input: &Path,
        algorithm: Algorithm,
        bootstrap: bool,
        output: Option<&Path>,
    ) -> Result<()> {
        let matches = load_matches(input)?;
        info!("Loaded {} matches from {}", matches.len(), input.display());

        let mut ranker = self.build_ranker(algorithm);

        if bootstrap {
            let table = ranker.compute_bootstrap_scores(&matches)?;
            print_bootstrap_table(&table);
            if let Some(path) = output {
                write_json(path, &table)?;
                info!("Wrote bootstrap table to {}", path.display());
            }
        } else {
            ranker.compute_scores(&matches)?;
            let scores = ranker.get_scores();
            print_score_table(&scores);
            if let Some(path) = output {
                write_json(path, &scores)?;
                info!("Wrote score table to {}", path.display());
            }
        }

        Ok(())
    }

    fn build_ranker(&self, algorithm: Algorithm) -> Box<dyn Ranker> {
        match algorithm {
            Algorithm::Elo => Box::new(EloRanker::new(
                self.config.ranker.clone(),
                self.config.elo.clone(),
            )),
            Algorithm::Mle => Box::new(MleRanker::new(
                self.config.ranker.clone(),
                self.config.mle.clone(),
            )),
        }
    }
}

fn load_matches(path: &Path) -> Result<Vec<Match>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open match list: {}", path.display()))?;
    let matches: Vec<Match> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse match list: {}", path.display()))?;
    Ok(matches)
}

fn print_score_table(scores: &[RankedScore]) {
    println!("{}", format!("{:>4}  {:<40} {:>10}", "#", "model", "score").bold());
    for (rank, row) in scores.iter().enumerate() {
        println!("{:>4}  {:<40} {:>10.1}", rank + 1, row.model, row.score);
    }
}

fn print_bootstrap_table(table: &[BootstrapScore]) {
    println!(
        "{}",
        format!(
            "{:>4}  {:<40} {:>10} {:>10} {:>10}",
            "#", "model", "median", "p2.5", "p97.5"
        )
        .bold()
    );
    for (rank, row) in table.iter().enumerate() {
        println!(
            "{:>4}  {:<40} {:>10.1} {:>10.1} {:>10.1}",
            rank + 1,
            row.model,
            row.median,
            row.p2_5,
            row.p97_5
        );
    }
}
