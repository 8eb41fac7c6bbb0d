use std::collections::HashMap;

use anyhow::{Result, bail};
use log::{info, warn};
use nalgebra::{DMatrix, DVector};
use ndarray::Array2;

use super::types::{Match, ModelId, Outcome, RankedScore, ScoreMap};
use super::{Ranker, sort_by_score_descending, unique_models};
use crate::config::settings::{MleSettings, RankerSettings};

const CONVERGENCE_TOLERANCE: f64 = 1e-6;
/// Keeps the gauge-degenerate Hessian solvable; this is a numeric floor for
/// the linear solve, not a statistical penalty on the coefficients.
const HESSIAN_JITTER: f64 = 1e-9;
/// Base-10 logistic features keep coefficients on the familiar 400-point
/// rating scale shared with the Elo updater.
const LN_BASE: f64 = std::f64::consts::LN_10;

/// Bradley-Terry strength estimation, formulated as an unregularized
/// logistic regression over aggregated win/loss/draw counts and fit by
/// Newton-Raphson.
pub struct MleRanker {
    settings: RankerSettings,
    max_iterations: usize,
    scores: ScoreMap,
}

/// Pairwise count table over dense model indices. Both orientations are
/// populated (row (a, b) and row (b, a) carry swapped win counts), so the
/// regression sees every pairing without directional bias.
struct PairCountTable {
    wins: Array2<f64>,
    draws: Array2<f64>,
}

impl MleRanker {
    pub fn new(settings: RankerSettings, mle: MleSettings) -> Self {
        Self {
            settings,
            max_iterations: mle.max_iterations,
            scores: ScoreMap::new(),
        }
    }
}

impl Ranker for MleRanker {
    fn compute_scores(&mut self, matches: &[Match]) -> Result<ScoreMap> {
        if matches.is_empty() {
            bail!("Cannot rank an empty match list");
        }

        self.scores.clear();

        let models = unique_models(matches);
        let model_to_idx: HashMap<ModelId, usize> = models
            .iter()
            .enumerate()
            .map(|(idx, model)| (model.clone(), idx))
            .collect();

        info!(
            "Fitting maximum-likelihood ratings for {} models over {} matches",
            models.len(),
            matches.len()
        );

        let counts = aggregate_pair_counts(matches, &model_to_idx, models.len());
        let (design, labels, weights) = build_design(&counts, models.len());
        let coefficients = fit_logistic_regression(&design, &labels, &weights, self.max_iterations);

        for (idx, model) in models.iter().enumerate() {
            let score = self.settings.default_score + self.settings.scale * coefficients[idx];
            self.scores.insert(model.clone(), score);
        }

        Ok(self.scores.clone())
    }

    fn get_scores(&self) -> Vec<RankedScore> {
        let mut scores: Vec<RankedScore> = self
            .scores
            .iter()
            .map(|(model, &score)| RankedScore {
                model: model.clone(),
                score,
            })
            .collect();
        sort_by_score_descending(&mut scores);
        scores
    }

    fn default_score(&self) -> f64 {
        self.settings.default_score
    }

    fn bootstrap_samples(&self) -> usize {
        self.settings.bootstrap_samples
    }
}

fn aggregate_pair_counts(
    matches: &[Match],
    model_to_idx: &HashMap<ModelId, usize>,
    n_models: usize,
) -> PairCountTable {
    let mut wins = Array2::<f64>::zeros((n_models, n_models));
    let mut draws = Array2::<f64>::zeros((n_models, n_models));
    let mut self_paired = 0usize;

    for game in matches {
        if game.is_self_paired() {
            self_paired += 1;
            continue;
        }

        let i = model_to_idx[&game.model_a];
        let j = model_to_idx[&game.model_b];

        match game.outcome {
            Outcome::ModelAWins => wins[[i, j]] += 1.0,
            Outcome::ModelBWins => wins[[j, i]] += 1.0,
            Outcome::Draw => {
                draws[[i, j]] += 1.0;
                draws[[j, i]] += 1.0;
            }
        }
    }

    if self_paired > 0 {
        warn!("Excluded {} self-paired matches from aggregation", self_paired);
    }

    PairCountTable { wins, draws }
}

/// One non-mirrored row per distinct pair that ever played, expanded into two
/// opposite-direction weighted observations: "A beat B" with weight
/// 2·a_wins + draws, and "B beat A" with weight 2·b_wins + draws. The
/// feature vector carries +ln(10) in A's column and −ln(10) in B's.
fn build_design(
    counts: &PairCountTable,
    n_models: usize,
) -> (DMatrix<f64>, DVector<f64>, DVector<f64>) {
    let mut rows: Vec<(usize, usize, f64, f64)> = Vec::new();

    for i in 0..n_models {
        for j in (i + 1)..n_models {
            let a_wins = counts.wins[[i, j]];
            let b_wins = counts.wins[[j, i]];
            let draws = counts.draws[[i, j]];
            if a_wins + b_wins + draws == 0.0 {
                continue;
            }

            rows.push((i, j, 1.0, 2.0 * a_wins + draws));
            rows.push((i, j, 0.0, 2.0 * b_wins + draws));
        }
    }

    let mut design = DMatrix::<f64>::zeros(rows.len(), n_models);
    let mut labels = DVector::<f64>::zeros(rows.len());
    let mut weights = DVector::<f64>::zeros(rows.len());

    for (row, &(i, j, label, weight)) in rows.iter().enumerate() {
        design[(row, i)] = LN_BASE;
        design[(row, j)] = -LN_BASE;
        labels[row] = label;
        weights[row] = weight;
    }

    (design, labels, weights)
}

/// Weighted logistic regression without intercept or penalty, via
/// Newton-Raphson. Stops early once the largest coefficient step falls
/// under the tolerance; otherwise keeps the final iterate.
fn fit_logistic_regression(
    design: &DMatrix<f64>,
    labels: &DVector<f64>,
    weights: &DVector<f64>,
    max_iterations: usize,
) -> DVector<f64> {
    let n_observations = design.nrows();
    let n_models = design.ncols();
    let mut coefficients = DVector::<f64>::zeros(n_models);
    let mut converged = false;

    for iteration in 0..max_iterations {
        let linear = design * &coefficients;
        let predicted = linear.map(sigmoid);

        let residuals = DVector::<f64>::from_fn(n_observations, |row, _| {
            weights[row] * (labels[row] - predicted[row])
        });
        let gradient = design.transpose() * &residuals;

        let curvature = DVector::<f64>::from_fn(n_observations, |row, _| {
            weights[row] * predicted[row] * (1.0 - predicted[row])
        });
        let hessian = weighted_normal_matrix(design, &curvature)
            + DMatrix::<f64>::identity(n_models, n_models) * HESSIAN_JITTER;

        let step = match hessian.lu().solve(&gradient) {
            Some(step) => step,
            None => {
                warn!("Newton step failed to solve at iteration {}", iteration + 1);
                break;
            }
        };

        let max_change = step.amax();
        coefficients += &step;

        if max_change < CONVERGENCE_TOLERANCE {
            info!("Logistic fit converged in {} iterations", iteration + 1);
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            "Logistic fit did not converge within {} iterations; keeping best iterate",
            max_iterations
        );
    }

    coefficients
}

/// Xᵀ·diag(c)·X without materializing the observation-sized diagonal.
fn weighted_normal_matrix(design: &DMatrix<f64>, curvature: &DVector<f64>) -> DMatrix<f64> {
    let mut scaled = design.clone();
    for row in 0..scaled.nrows() {
        for col in 0..scaled.ncols() {
            scaled[(row, col)] *= curvature[row];
        }
    }
    design.transpose() * scaled
}

fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let ex = x.exp();
        ex / (1.0 + ex)
    }
}
