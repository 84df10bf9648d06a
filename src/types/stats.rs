//! Statistical summary over one call's category scores

use serde::{Deserialize, Serialize};

/// Cohen's-d style effect bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectMagnitude {
    /// Bucket |d| at 0.2 / 0.5 / 0.8
    pub fn from_effect_size(d: f64) -> Self {
        let d = d.abs();
        if d >= 0.8 {
            Self::Large
        } else if d >= 0.5 {
            Self::Medium
        } else if d >= 0.2 {
            Self::Small
        } else {
            Self::Negligible
        }
    }
}

/// 95% interval; lower ≤ mean ≤ upper
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub mean: f64,
    pub upper: f64,
    pub level: f64,
}

impl ConfidenceInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Four-fifths rule outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisparateImpact {
    /// min(rate) / max(rate), in [0, 1]
    pub ratio: f64,
    /// ratio < 0.8
    pub flagged: bool,
    pub group_count: usize,
    pub selected_groups: usize,
}

/// Heuristic validation of the score set; p-values are coarse steps, not exact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalSummary {
    pub sample_size: usize,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub standard_error: f64,
    /// None when the standard error is zero
    pub t_statistic: Option<f64>,
    pub confidence_interval: ConfidenceInterval,
    /// In [0, 1]
    pub p_value: f64,
    pub significant: bool,
    pub effect_size: f64,
    pub effect_magnitude: EffectMagnitude,
    /// None when fewer than two groups exist
    pub disparate_impact: Option<DisparateImpact>,
}

impl StatisticalSummary {
    pub fn impact_ratio(&self) -> Option<f64> {
        self.disparate_impact.as_ref().map(|d| d.ratio)
    }

    pub fn disparate_impact_flagged(&self) -> bool {
        self.disparate_impact.as_ref().map(|d| d.flagged).unwrap_or(false)
    }
}
