//! Statistical Validator: CI, coarse p-value, effect size, four-fifths ratio
//!
//! Heuristics over one call's per-category scores. The p-value is a step
//! function of |t|, not an exact distribution tail.

use crate::types::{
    CombinedResult, ConfidenceInterval, DisparateImpact, EffectMagnitude, StatisticalSummary,
};
use crate::{FOUR_FIFTHS_RATIO, FOUR_FIFTHS_SELECTION_SCORE, SCORE_MAX, T_CRITICAL_ASYMPTOTIC};

/// Two-tailed 95% critical values for df = 1..=30
const T_CRITICAL_95: [f64; 30] = [
    12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228, 2.201, 2.179, 2.160,
    2.145, 2.131, 2.120, 2.110, 2.101, 2.093, 2.086, 2.080, 2.074, 2.069, 2.064, 2.060, 2.056,
    2.052, 2.048, 2.045, 2.042,
];

/// Critical t for the given degrees of freedom (asymptotic beyond 30)
pub fn t_critical(df: usize) -> f64 {
    match df {
        0 => 0.0,
        1..=30 => T_CRITICAL_95[df - 1],
        _ => T_CRITICAL_ASYMPTOTIC,
    }
}

/// Step p-value for |t|
pub fn p_value_for(t_abs: f64) -> f64 {
    if t_abs < 1.0 {
        0.5
    } else if t_abs < 1.5 {
        0.2
    } else if t_abs < 2.0 {
        0.1
    } else if t_abs < 2.5 {
        0.05
    } else if t_abs < 3.0 {
        0.01
    } else {
        0.001
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StatisticalValidator {
    significance_level: f64,
}

impl Default for StatisticalValidator {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl StatisticalValidator {
    pub fn new(significance_level: f64) -> Self {
        Self { significance_level }
    }

    pub fn validate(&self, combined: &CombinedResult) -> StatisticalSummary {
        let scores: Vec<f64> = combined.matches.iter().map(|m| m.score).collect();
        self.summarize(&scores)
    }

    /// Summary of a raw score sample (one score per category group)
    pub fn summarize(&self, scores: &[f64]) -> StatisticalSummary {
        let n = scores.len();
        if n == 0 {
            return StatisticalSummary {
                sample_size: 0,
                mean: 0.0,
                variance: 0.0,
                std_dev: 0.0,
                standard_error: 0.0,
                t_statistic: None,
                confidence_interval: ConfidenceInterval {
                    lower: 0.0,
                    mean: 0.0,
                    upper: 0.0,
                    level: 0.95,
                },
                p_value: 1.0,
                significant: false,
                effect_size: 0.0,
                effect_magnitude: EffectMagnitude::Negligible,
                disparate_impact: None,
            };
        }

        let mean = scores.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let standard_error = std_dev / (n as f64).sqrt();

        let margin = t_critical(n - 1) * standard_error;
        let confidence_interval = ConfidenceInterval {
            lower: (mean - margin).clamp(0.0, SCORE_MAX),
            mean,
            upper: (mean + margin).clamp(0.0, SCORE_MAX),
            level: 0.95,
        };

        let t_statistic = (standard_error > 0.0).then(|| mean / standard_error);
        let t_abs = match t_statistic {
            Some(t) => t.abs(),
            None if mean > 0.0 => f64::INFINITY,
            None => 0.0,
        };
        let p_value = p_value_for(t_abs);

        let effect_size = if std_dev > 0.0 { mean / std_dev } else { 0.0 };

        StatisticalSummary {
            sample_size: n,
            mean,
            variance,
            std_dev,
            standard_error,
            t_statistic,
            confidence_interval,
            p_value,
            significant: p_value < self.significance_level,
            effect_size,
            effect_magnitude: EffectMagnitude::from_effect_size(effect_size),
            disparate_impact: four_fifths(scores),
        }
    }
}

/// Selection-rate ratio across groups; None with fewer than two groups
pub fn four_fifths(group_scores: &[f64]) -> Option<DisparateImpact> {
    if group_scores.len() < 2 {
        return None;
    }
    let rates: Vec<f64> = group_scores
        .iter()
        .map(|s| if *s >= FOUR_FIFTHS_SELECTION_SCORE { 1.0 } else { 0.0 })
        .collect();
    let max = rates.iter().cloned().fold(0.0, f64::max);
    let min = rates.iter().cloned().fold(1.0, f64::min);
    let ratio = if max > 0.0 { (min / max).clamp(0.0, 1.0) } else { 1.0 };

    Some(DisparateImpact {
        ratio,
        flagged: ratio < FOUR_FIFTHS_RATIO,
        group_count: group_scores.len(),
        selected_groups: rates.iter().filter(|r| **r > 0.0).count(),
    })
}

// =============================================================================
// TESTS
// =============================================================================
