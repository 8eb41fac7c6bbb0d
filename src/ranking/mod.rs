mod bootstrap;
pub mod bradley_terry;
pub mod elo;
pub mod types;

pub use bradley_terry::MleRanker;
pub use elo::EloRanker;
pub use types::{BootstrapScore, Match, ModelId, Outcome, RankedScore, ScoreMap};

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use anyhow::{Result, bail};
use log::info;

use self::bootstrap::{percentile, resample};

/// Common contract for pairwise ranking algorithms.
pub trait Ranker {
    /// Full recompute from scratch; resets any internal state first.
    /// Fails fast on an empty match list.
    fn compute_scores(&mut self, matches: &[Match]) -> Result<ScoreMap>;

    /// Last computed scores, sorted by descending score, without recomputation.
    fn get_scores(&self) -> Vec<RankedScore>;

    /// Neutral score assigned to models absent from a bootstrap round.
    fn default_score(&self) -> f64;

    fn bootstrap_samples(&self) -> usize;

    /// Empirical 95% confidence intervals via resampling with replacement.
    ///
    /// Identical across algorithms; only the inner `compute_scores` differs.
    fn compute_bootstrap_scores(&mut self, matches: &[Match]) -> Result<Vec<BootstrapScore>> {
        if matches.is_empty() {
            bail!("Cannot bootstrap an empty match list");
        }

        let rounds = self.bootstrap_samples();
        let models = unique_models(matches);
        let mut samples: HashMap<ModelId, Vec<f64>> = models
            .iter()
            .map(|model| (model.clone(), Vec::with_capacity(rounds)))
            .collect();

        info!(
            "Bootstrapping {} rounds over {} matches ({} models)",
            rounds,
            matches.len(),
            models.len()
        );

        let mut rng = rand::thread_rng();
        for _ in 0..rounds {
            let resampled = resample(matches, &mut rng);
            let scores = self.compute_scores(&resampled)?;

            for model in &models {
                // A model whose matches were all left out of this round keeps
                // the neutral default instead of shrinking its sample.
                let score = scores
                    .get(model)
                    .copied()
                    .unwrap_or_else(|| self.default_score());
                if let Some(values) = samples.get_mut(model) {
                    values.push(score);
                }
            }
        }

        let mut table: Vec<BootstrapScore> = models
            .iter()
            .map(|model| summarize_rounds(model, &samples[model]))
            .collect();
        table.sort_by(|a, b| {
            b.median
                .partial_cmp(&a.median)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.model.cmp(&b.model))
        });

        Ok(table)
    }
}

/// Distinct models in first-appearance order.
pub(crate) fn unique_models(matches: &[Match]) -> Vec<ModelId> {
    let mut models = Vec::new();
    let mut seen = HashSet::new();

    for game in matches {
        for model in [&game.model_a, &game.model_b] {
            if seen.insert(model.as_str()) {
                models.push(model.clone());
            }
        }
    }

    models
}

pub(crate) fn sort_by_score_descending(scores: &mut [RankedScore]) {
    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.model.cmp(&b.model))
    });
}

fn summarize_rounds(model: &str, values: &[f64]) -> BootstrapScore {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    BootstrapScore {
        model: model.to_string(),
        median: percentile(&sorted, 50.0),
        p2_5: percentile(&sorted, 2.5),
        p97_5: percentile(&sorted, 97.5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{EloSettings, RankerSettings};

    fn m(model_a: &str, model_b: &str, outcome: Outcome) -> Match {
        Match::new(model_a.to_string(), model_b.to_string(), outcome)
    }

    fn bootstrap_ranker(samples: usize) -> EloRanker {
        let settings = RankerSettings {
            bootstrap_samples: samples,
            ..RankerSettings::default()
        };
        EloRanker::new(settings, EloSettings::default())
    }

    #[test]
    fn unique_models_keeps_first_appearance_order() {
        let matches = vec![
            m("beta", "alpha", Outcome::ModelAWins),
            m("alpha", "gamma", Outcome::Draw),
            m("beta", "gamma", Outcome::ModelBWins),
        ];
        assert_eq!(unique_models(&matches), vec!["beta", "alpha", "gamma"]);
    }

    #[test]
    fn bootstrap_covers_every_model_with_ordered_intervals() {
        let matches = vec![
            m("alice", "bob", Outcome::ModelAWins),
            m("alice", "bob", Outcome::ModelAWins),
            m("bob", "alice", Outcome::Draw),
            // Played once only, so many rounds will miss this pair entirely.
            m("charlie", "dave", Outcome::ModelBWins),
        ];
        let mut ranker = bootstrap_ranker(50);

        let table = ranker.compute_bootstrap_scores(&matches).unwrap();

        let mut listed: Vec<&str> = table.iter().map(|row| row.model.as_str()).collect();
        listed.sort_unstable();
        assert_eq!(listed, vec!["alice", "bob", "charlie", "dave"]);

        for row in &table {
            assert!(row.p2_5 <= row.median, "lower bound above median: {row:?}");
            assert!(row.median <= row.p97_5, "median above upper bound: {row:?}");
        }

        for pair in table.windows(2) {
            assert!(pair[0].median >= pair[1].median);
        }
    }

    #[test]
    fn bootstrap_fails_fast_on_empty_input() {
        let mut ranker = bootstrap_ranker(10);
        assert!(ranker.compute_bootstrap_scores(&[]).is_err());
    }
}
