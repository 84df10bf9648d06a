//! Score Combiner: merges detector output into one aggregate

use std::collections::BTreeMap;

use crate::types::{CombinedResult, PatternMatch};
use crate::SCORE_MAX;

/// overall = mean, weighted = Σ(score·weight)/Σ(weight), confidence = mean match confidence
pub fn combine(matches: Vec<PatternMatch>) -> CombinedResult {
    if matches.is_empty() {
        return CombinedResult::empty();
    }

    let n = matches.len() as f64;
    let overall = matches.iter().map(|m| m.score).sum::<f64>() / n;

    let weight_sum: f64 = matches.iter().map(|m| m.weight).sum();
    let weighted = if weight_sum > 0.0 {
        matches.iter().map(|m| m.score * m.weight).sum::<f64>() / weight_sum
    } else {
        overall
    };

    let confidence = matches.iter().map(|m| m.confidence).sum::<f64>() / n;

    let breakdown: BTreeMap<_, _> = matches.iter().map(|m| (m.category, m.score)).collect();

    CombinedResult {
        overall_score: clamp_score(overall),
        weighted_score: clamp_score(weighted),
        confidence: confidence.clamp(0.0, 1.0),
        breakdown,
        matches,
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, SCORE_MAX)
    } else {
        0.0
    }
}
