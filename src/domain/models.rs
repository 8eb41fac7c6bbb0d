use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ranking::types::ModelId;

/// Side of the conversation pair a reaction row refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionSide {
    A,
    B,
}

/// One rated conversation, as exported by the arena application.
///
/// Reaction flags arrive nullable in the raw schema; a missing flag counts
/// as not given, never as a dropped row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub model_a_name: ModelId,
    pub model_b_name: ModelId,
    pub conversation_pair_id: String,
    pub timestamp: DateTime<Utc>,
    /// Which side the reactions below were recorded against.
    pub position: ReactionSide,
    #[serde(default)]
    pub liked: Option<bool>,
    #[serde(default)]
    pub useful: Option<bool>,
    #[serde(default)]
    pub creative: Option<bool>,
    #[serde(default)]
    pub clear_formatting: Option<bool>,
    #[serde(default)]
    pub disliked: Option<bool>,
    #[serde(default)]
    pub incorrect: Option<bool>,
    #[serde(default)]
    pub superficial: Option<bool>,
    #[serde(default)]
    pub instructions_not_followed: Option<bool>,
}

impl ReactionRecord {
    /// Net likability of the reacted side: positive reactions minus
    /// negative ones, with missing flags filled as false before counting.
    pub fn likability(&self) -> i64 {
        let positives = count_set_flags(&[
            self.liked,
            self.useful,
            self.creative,
            self.clear_formatting,
        ]);
        let negatives = count_set_flags(&[
            self.disliked,
            self.incorrect,
            self.superficial,
            self.instructions_not_followed,
        ]);
        positives - negatives
    }
}

fn count_set_flags(flags: &[Option<bool>]) -> i64 {
    flags.iter().filter(|flag| flag.unwrap_or(false)).count() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_json(flags: &str) -> String {
        format!(
            r#"{{
                "model_a_name": "alpha",
                "model_b_name": "beta",
                "conversation_pair_id": "pair-1",
                "timestamp": "2024-05-01T12:00:00Z",
                "position": "a"{flags}
            }}"#
        )
    }

    #[test]
    fn missing_reaction_columns_deserialize_as_unset() {
        let record: ReactionRecord = serde_json::from_str(&record_json("")).unwrap();
        assert_eq!(record.liked, None);
        assert_eq!(record.likability(), 0);
    }

    #[test]
    fn likability_is_positives_minus_negatives() {
        let flags = r#", "liked": true, "useful": true, "creative": true,
            "disliked": true"#;
        let record: ReactionRecord = serde_json::from_str(&record_json(flags)).unwrap();
        assert_eq!(record.likability(), 2);
    }

    #[test]
    fn explicit_nulls_count_as_false() {
        let flags = r#", "liked": null, "disliked": true"#;
        let record: ReactionRecord = serde_json::from_str(&record_json(flags)).unwrap();
        assert_eq!(record.likability(), -1);
    }

    #[test]
    fn position_parses_both_sides() {
        let record: ReactionRecord = serde_json::from_str(&record_json("")).unwrap();
        assert_eq!(record.position, ReactionSide::A);
    }
}
