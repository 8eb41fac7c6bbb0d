use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::domain::models::{ReactionRecord, ReactionSide};
use crate::ranking::types::ModelId;

/// Net per-side reaction scores for one conversation pair.
#[derive(Debug, Clone, Serialize)]
pub struct PairScore {
    pub model_a: ModelId,
    pub model_b: ModelId,
    pub conversation_pair_id: String,
    pub score_a: i64,
    pub score_b: i64,
}

/// Declared winner of one aggregated conversation pair.
#[derive(Debug, Clone, Serialize)]
pub struct PairWinner {
    pub model_a: ModelId,
    pub model_b: ModelId,
    pub conversation_pair_id: String,
    pub winner: ModelId,
}

/// Win percentage of one model across all aggregated pairs it appears in.
#[derive(Debug, Clone, Serialize)]
pub struct WinRate {
    pub model: ModelId,
    pub wins: usize,
    pub matches_played: usize,
    pub win_rate: f64,
}

/// Aggregate raw reaction rows into per-pair net scores.
///
/// Rows are processed in timestamp order; the sums are order-independent,
/// but a stable order keeps the output reproducible for downstream
/// tie-breaks. Each row's likability lands on the score column of the side
/// the reaction was recorded against; the other side gets nothing.
pub fn get_matches_with_score(records: &[ReactionRecord]) -> Vec<PairScore> {
    let mut ordered: Vec<&ReactionRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.timestamp);

    let mut pairs: Vec<PairScore> = Vec::new();
    let mut slot_by_key: HashMap<(ModelId, ModelId, String), usize> = HashMap::new();

    for record in ordered {
        let key = (
            record.model_a_name.clone(),
            record.model_b_name.clone(),
            record.conversation_pair_id.clone(),
        );
        let slot = *slot_by_key.entry(key).or_insert_with(|| {
            pairs.push(PairScore {
                model_a: record.model_a_name.clone(),
                model_b: record.model_b_name.clone(),
                conversation_pair_id: record.conversation_pair_id.clone(),
                score_a: 0,
                score_b: 0,
            });
            pairs.len() - 1
        });

        let likability = record.likability();
        match record.position {
            ReactionSide::A => pairs[slot].score_a += likability,
            ReactionSide::B => pairs[slot].score_b += likability,
        }
    }

    pairs
}

/// Declare a winner per aggregated pair. A tied pair carries no net signal
/// and is dropped rather than recorded as a draw.
pub fn get_winners(pairs: &[PairScore]) -> Vec<PairWinner> {
    pairs
        .iter()
        .filter_map(|pair| {
            let winner = match pair.score_a.cmp(&pair.score_b) {
                Ordering::Greater => pair.model_a.clone(),
                Ordering::Less => pair.model_b.clone(),
                Ordering::Equal => return None,
            };
            Some(PairWinner {
                model_a: pair.model_a.clone(),
                model_b: pair.model_b.clone(),
                conversation_pair_id: pair.conversation_pair_id.clone(),
                winner,
            })
        })
        .collect()
}

/// Win percentage per model, sorted descending. The denominator counts
/// every aggregated pair the model appears in, including pairs that
/// produced no winner.
pub fn get_winrates(pairs: &[PairScore]) -> Vec<WinRate> {
    let mut appearance_order: Vec<ModelId> = Vec::new();
    let mut played: HashMap<ModelId, usize> = HashMap::new();

    for pair in pairs {
        for model in [&pair.model_a, &pair.model_b] {
            let count = played.entry(model.clone()).or_insert_with(|| {
                appearance_order.push(model.clone());
                0
            });
            *count += 1;
        }
    }

    let mut wins: HashMap<ModelId, usize> = HashMap::new();
    for declared in get_winners(pairs) {
        *wins.entry(declared.winner).or_insert(0) += 1;
    }

    let mut rates: Vec<WinRate> = appearance_order
        .into_iter()
        .map(|model| {
            let matches_played = played[&model];
            let won = wins.get(&model).copied().unwrap_or(0);
            WinRate {
                win_rate: won as f64 / matches_played as f64 * 100.0,
                model,
                wins: won,
                matches_played,
            }
        })
        .collect();

    rates.sort_by(|a, b| {
        b.win_rate
            .partial_cmp(&a.win_rate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.model.cmp(&b.model))
    });

    rates
}
