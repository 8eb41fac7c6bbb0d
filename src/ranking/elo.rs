use std::collections::HashMap;

use anyhow::{Result, bail};
use log::{info, warn};

use super::types::{Match, ModelId, RankedScore, ScoreMap};
use super::{Ranker, sort_by_score_descending};
use crate::config::settings::{EloSettings, RankerSettings};

/// Rating difference is clamped before computing the expected score, so a
/// single blowout between mismatched models cannot produce a runaway update.
const RATING_DIFF_CLAMP: f64 = 400.0;
/// Above this rating, either participant damps the K-factor to a quarter.
const HIGH_RATING_CUTOFF: f64 = 2400.0;
/// Beyond this many matches, both participants damp the K-factor to a half.
const ESTABLISHED_MATCHES: i32 = 30;

#[derive(Debug, Clone, Copy)]
struct PlayerState {
    rating: f64,
    matches_played: i32,
}

/// Online pairwise rating updater with an adaptive K-factor.
///
/// Stateful by design: `update_scores` folds additional history into the
/// current ratings, while `compute_scores` rebuilds them from scratch.
/// Results depend on match order, so callers pass matches chronologically.
pub struct EloRanker {
    settings: RankerSettings,
    k_factor: f64,
    players: HashMap<ModelId, PlayerState>,
}

impl EloRanker {
    pub fn new(settings: RankerSettings, elo: EloSettings) -> Self {
        Self {
            settings,
            k_factor: elo.k_factor,
            players: HashMap::new(),
        }
    }

    /// Apply additional matches on top of the existing ratings.
    pub fn update_scores(&mut self, matches: &[Match]) {
        for game in matches {
            self.apply_match(game);
        }
    }

    fn apply_match(&mut self, game: &Match) {
        if game.is_self_paired() {
            warn!("Skipping self-paired match for model {}", game.model_a);
            return;
        }

        self.register(&game.model_a);
        self.register(&game.model_b);

        let state_a = self.players[&game.model_a];
        let state_b = self.players[&game.model_b];

        let k = self.adaptive_k(state_a, state_b);
        let actual = game.outcome.win_fraction();
        let expected = expected_score(state_a.rating, state_b.rating, self.settings.scale);
        let delta = k * (actual - expected);

        if let Some(player_a) = self.players.get_mut(&game.model_a) {
            player_a.rating += delta;
            player_a.matches_played += 1;
        }
        if let Some(player_b) = self.players.get_mut(&game.model_b) {
            player_b.rating -= delta;
            player_b.matches_played += 1;
        }
    }

    fn register(&mut self, model: &str) {
        if !self.players.contains_key(model) {
            self.players.insert(
                model.to_string(),
                PlayerState {
                    rating: self.settings.default_score,
                    matches_played: 0,
                },
            );
        }
    }

    /// K-factor for one match, chosen from the participants' current state
    /// before the update is applied.
    fn adaptive_k(&self, state_a: PlayerState, state_b: PlayerState) -> f64 {
        if state_a.rating > HIGH_RATING_CUTOFF || state_b.rating > HIGH_RATING_CUTOFF {
            self.k_factor / 4.0
        } else if state_a.matches_played > ESTABLISHED_MATCHES
            && state_b.matches_played > ESTABLISHED_MATCHES
        {
            self.k_factor / 2.0
        } else {
            self.k_factor
        }
    }

    fn score_map(&self) -> ScoreMap {
        self.players
            .iter()
            .map(|(model, state)| (model.clone(), state.rating))
            .collect()
    }
}

fn expected_score(rating_a: f64, rating_b: f64, scale: f64) -> f64 {
    let diff = (rating_a - rating_b).clamp(-RATING_DIFF_CLAMP, RATING_DIFF_CLAMP);
    1.0 / (1.0 + 10f64.powf(-diff / scale))
}

impl Ranker for EloRanker {
    fn compute_scores(&mut self, matches: &[Match]) -> Result<ScoreMap> {
        if matches.is_empty() {
            bail!("Cannot rank an empty match list");
        }

        self.players.clear();
        for game in matches {
            self.register(&game.model_a);
            self.register(&game.model_b);
        }
        info!(
            "Replaying {} matches for {} models",
            matches.len(),
            self.players.len()
        );

        self.update_scores(matches);
        Ok(self.score_map())
    }

    fn get_scores(&self) -> Vec<RankedScore> {
        let mut scores: Vec<RankedScore> = self
            .players
            .iter()
            .map(|(model, state)| RankedScore {
                model: model.clone(),
                score: state.rating,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::types::Outcome;

    fn m(model_a: &str, model_b: &str, outcome: Outcome) -> Match {
        Match::new(model_a.to_string(), model_b.to_string(), outcome)
    }

    fn default_ranker() -> EloRanker {
        EloRanker::new(RankerSettings::default(), EloSettings::default())
    }

    fn rating(ranker: &EloRanker, model: &str) -> f64 {
        ranker.players[model].rating
    }

    #[test]
    fn single_win_is_zero_sum_around_the_default() {
        let mut ranker = default_ranker();
        ranker
            .compute_scores(&[m("alpha", "beta", Outcome::ModelAWins)])
            .unwrap();

        let alpha = rating(&ranker, "alpha");
        let beta = rating(&ranker, "beta");
        assert!(alpha > 1000.0);
        assert!(beta < 1000.0);
        assert!((alpha - 1000.0 - (1000.0 - beta)).abs() < 1e-9);
    }

    #[test]
    fn draw_between_equals_changes_nothing() {
        let mut ranker = default_ranker();
        ranker
            .compute_scores(&[m("alpha", "beta", Outcome::Draw)])
            .unwrap();

        assert_eq!(rating(&ranker, "alpha"), 1000.0);
        assert_eq!(rating(&ranker, "beta"), 1000.0);
    }

    #[test]
    fn replayed_history_orders_alice_above_bob_above_eve() {
        let mut ranker = default_ranker();
        let scores = ranker
            .compute_scores(&[
                m("alice", "bob", Outcome::ModelAWins),
                m("alice", "bob", Outcome::ModelAWins),
                m("eve", "bob", Outcome::ModelBWins),
            ])
            .unwrap();

        assert!(scores["alice"] > scores["bob"]);
        assert!(scores["bob"] > scores["eve"]);
    }

    #[test]
    fn high_rating_triggers_quarter_k_damping() {
        let elo = EloSettings { k_factor: 1000.0 };
        let mut ranker = EloRanker::new(RankerSettings::default(), elo);

        // Spread decisive wins across three opponents so none of them tanks
        // far enough to matter; 20 rounds push the winner past 2400.
        let opponents = ["opp_one", "opp_two", "opp_three"];
        for round in 0..20 {
            let opponent = opponents[round % opponents.len()];
            ranker.update_scores(&[m("champion", opponent, Outcome::ModelAWins)]);
        }
        let before = rating(&ranker, "champion");
        assert!(before > HIGH_RATING_CUTOFF);

        ranker.update_scores(&[m("champion", "fresh", Outcome::ModelAWins)]);
        let increment = rating(&ranker, "champion") - before;

        // Damped K (1000 / 4) against a clamped 400-point gap:
        // 250 * (1 - 10/11) = 22.7272...
        assert!((increment - 250.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn experienced_pair_triggers_half_k_damping() {
        let mut ranker = default_ranker();

        // Draws between equals leave both ratings at 1000 while the match
        // counts climb past the experience threshold.
        for _ in 0..=ESTABLISHED_MATCHES {
            ranker.update_scores(&[m("old_a", "old_b", Outcome::Draw)]);
        }

        ranker.update_scores(&[m("old_a", "old_b", Outcome::ModelAWins)]);
        // Half of K=40 at even expectations: 20 * 0.5 = 10.
        assert!((rating(&ranker, "old_a") - 1010.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_wins_stay_bounded_by_the_clamp() {
        let elo = EloSettings { k_factor: 1.0 };
        let mut ranker = EloRanker::new(RankerSettings::default(), elo);

        let mut previous = 1000.0;
        for round in 0..50 {
            let opponent = ["o1", "o2", "o3"][round % 3];
            ranker.update_scores(&[m("grinder", opponent, Outcome::ModelAWins)]);
            let current = rating(&ranker, "grinder");
            assert!(current > previous);
            previous = current;
        }

        // With K=1, fifty wins cannot move a rating more than 50 points.
        assert!(previous < 1050.0);
    }

    #[test]
    fn update_scores_accumulates_on_top_of_computed_state() {
        let mut ranker = default_ranker();
        ranker
            .compute_scores(&[m("alpha", "beta", Outcome::ModelAWins)])
            .unwrap();
        let after_compute = rating(&ranker, "alpha");

        ranker.update_scores(&[m("alpha", "beta", Outcome::ModelAWins)]);
        assert!(rating(&ranker, "alpha") > after_compute);
        assert_eq!(ranker.players["alpha"].matches_played, 2);
    }

    #[test]
    fn compute_scores_resets_previous_state() {
        let mut ranker = default_ranker();
        ranker
            .compute_scores(&[m("alpha", "beta", Outcome::ModelAWins)])
            .unwrap();
        let scores = ranker
            .compute_scores(&[m("gamma", "delta", Outcome::Draw)])
            .unwrap();

        assert!(!scores.contains_key("alpha"));
        assert_eq!(scores.len(), 2);
    }

    #[test]
    fn self_paired_matches_are_skipped_but_participants_registered() {
        let mut ranker = default_ranker();
        let scores = ranker
            .compute_scores(&[
                m("alpha", "alpha", Outcome::ModelAWins),
                m("alpha", "beta", Outcome::ModelAWins),
                m("loner", "loner", Outcome::Draw),
            ])
            .unwrap();

        // The self-match must not double-credit alpha's single rating entry.
        assert!((scores["alpha"] - 1020.0).abs() < 1e-9);
        assert_eq!(scores["loner"], 1000.0);
        assert_eq!(ranker.players["loner"].matches_played, 0);
    }

    #[test]
    fn get_scores_lists_every_participant_in_descending_order() {
        let mut ranker = default_ranker();
        ranker
            .compute_scores(&[
                m("alpha", "beta", Outcome::ModelAWins),
                m("beta", "gamma", Outcome::ModelAWins),
            ])
            .unwrap();

        let scores = ranker.get_scores();
        assert_eq!(scores.len(), 3);
        for pair in scores.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn empty_match_list_fails_fast() {
        let mut ranker = default_ranker();
        assert!(ranker.compute_scores(&[]).is_err());
    }
}
