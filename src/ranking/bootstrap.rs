use rand::Rng;

use super::types::Match;

/// Draw `matches.len()` matches uniformly with replacement.
pub fn resample<R: Rng>(matches: &[Match], rng: &mut R) -> Vec<Match> {
    (0..matches.len())
        .map(|_| matches[rng.gen_range(0..matches.len())].clone())
        .collect()
}

/// Nearest-rank percentile over an ascending-sorted, non-empty slice.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    let index = rank.max(1) - 1;
    sorted[index.min(sorted.len() - 1)]
}
