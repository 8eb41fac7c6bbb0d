use std::collections::HashMap;

use anyhow::{Error, anyhow};
use serde::{Deserialize, Serialize};

pub type ModelId = String;
pub type ScoreValue = f64;
pub type ScoreMap = HashMap<ModelId, ScoreValue>;

/// Outcome of a single pairwise comparison.
///
/// The numeric encoding (2 / 1 / 0) lets a draw average symmetrically
/// between the two win cases in every update formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Outcome {
    ModelAWins,
    Draw,
    ModelBWins,
}

impl Outcome {
    pub fn value(&self) -> u8 {
        match self {
            Outcome::ModelAWins => 2,
            Outcome::Draw => 1,
            Outcome::ModelBWins => 0,
        }
    }

    /// Win fraction for side A: 1.0 win, 0.5 draw, 0.0 loss.
    pub fn win_fraction(&self) -> f64 {
        f64::from(self.value()) / 2.0
    }
}

impl TryFrom<u8> for Outcome {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Outcome::ModelAWins),
            1 => Ok(Outcome::Draw),
            0 => Ok(Outcome::ModelBWins),
            other => Err(anyhow!("Invalid match outcome value: {}", other)),
        }
    }
}

impl From<Outcome> for u8 {
    fn from(outcome: Outcome) -> Self {
        outcome.value()
    }
}

/// One resolved comparison between two models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub model_a: ModelId,
    pub model_b: ModelId,
    #[serde(rename = "score")]
    pub outcome: Outcome,
    /// Traceability back to the source record; unused in scoring.
    #[serde(default)]
    pub id: Option<String>,
}

impl Match {
    pub fn new(model_a: ModelId, model_b: ModelId, outcome: Outcome) -> Self {
        Self {
            model_a,
            model_b,
            outcome,
            id: None,
        }
    }

    pub fn is_self_paired(&self) -> bool {
        self.model_a == self.model_b
    }
}

/// One row of a ranked score table.
#[derive(Debug, Clone, Serialize)]
pub struct RankedScore {
    pub model: ModelId,
    pub score: ScoreValue,
}

/// Per-model summary over all bootstrap rounds.
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapScore {
    pub model: ModelId,
    pub median: ScoreValue,
    #[serde(rename = "p2.5")]
    pub p2_5: ScoreValue,
    #[serde(rename = "p97.5")]
    pub p97_5: ScoreValue,
}
