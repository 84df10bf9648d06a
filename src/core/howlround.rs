//! Howlround Guard: detects self-reinforcing score drift and damps it
//!
//! Window: last ≤ 7 stored entries + the current candidate, at least 3.
//!
//! Patterns:
//! - Escalation:  share of adjacent pairs rising by > 5
//! - Oscillation: share of triplets flipping direction, |Δ| > 10 both ways
//! - Lock-in:     mean > 70 and SD < 5
//! - Recursive:   repeated (score, pattern count, severity) signatures
//!
//! Attenuation is applied on every guarded call, scaled by confidence.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use crate::config::AnalyzerConfig;
use crate::types::{
    HistoryBuffer, HistoryEntry, HowlroundAction, HowlroundReport, PatternConfidences,
};
use crate::{
    ATTN_COEFF_EXP, ATTN_COEFF_LOG, ATTN_COEFF_PHI, ATTN_CONFIDENCE_FLOOR, ATTN_EXP_RATE,
    ATTN_GLOBAL_GAIN, ATTN_STEEPNESS_EXP, ATTN_STEEPNESS_LOG, ATTN_STEEPNESS_PHI,
    ATTN_THRESHOLD_EXP, ATTN_THRESHOLD_LOG, ATTN_THRESHOLD_PHI, ATTN_WMAX_CEILING,
    ESCALATION_MIN_RISE, HOWLROUND_MAX_WEIGHT, HOWLROUND_MEAN_WEIGHT, LOCKIN_MAX_SD,
    LOCKIN_MIN_MEAN, OSCILLATION_MIN_DELTA, SCORE_MAX,
};

// =============================================================================
// ATTENUATION CURVE
// =============================================================================

/// phi(x) = ln(1/x + √(1/x²) − 2) on (0, 1]; 0 outside or when non-finite
pub fn phi(x: f64) -> f64 {
    if !(x > 0.0 && x <= 1.0) {
        return 0.0;
    }
    let inv = 1.0 / x;
    let value = (inv + (inv * inv).sqrt() - 2.0).ln();
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn sigmoid_gate(x: f64, threshold: f64, steepness: f64) -> f64 {
    1.0 / (1.0 + (-steepness * (x - threshold)).exp())
}

/// Σ of the three gated damping components at Wmax
pub fn damping_sum(wmax: f64) -> f64 {
    let x = wmax.clamp(0.0, ATTN_WMAX_CEILING);
    let exponential = 1.0 - (-ATTN_EXP_RATE * x).exp();
    let phi_damping = (-phi(x)).max(0.0);
    let logarithmic = (1.0 + x).ln() / std::f64::consts::LN_2;

    ATTN_COEFF_EXP * sigmoid_gate(x, ATTN_THRESHOLD_EXP, ATTN_STEEPNESS_EXP) * exponential
        + ATTN_COEFF_PHI * sigmoid_gate(x, ATTN_THRESHOLD_PHI, ATTN_STEEPNESS_PHI) * phi_damping
        + ATTN_COEFF_LOG * sigmoid_gate(x, ATTN_THRESHOLD_LOG, ATTN_STEEPNESS_LOG) * logarithmic
}

/// β_dynamic in [0, 1]
pub fn attenuation_factor(wmax: f64, confidence: f64) -> f64 {
    let scale = ATTN_CONFIDENCE_FLOOR + (1.0 - ATTN_CONFIDENCE_FLOOR) * confidence.clamp(0.0, 1.0);
    let beta = ATTN_GLOBAL_GAIN * damping_sum(wmax) * scale;
    if beta.is_finite() {
        beta.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// (β, round(100 · Wmax · (1 − β)))
pub fn attenuate(score: f64, confidence: f64) -> (f64, f64) {
    let wmax = (score / SCORE_MAX).clamp(0.0, 1.0);
    let beta = attenuation_factor(wmax, confidence);
    (beta, (SCORE_MAX * wmax * (1.0 - beta)).round())
}

// =============================================================================
// PATTERN DETECTORS
// =============================================================================

pub fn escalation(scores: &[f64]) -> f64 {
    if scores.len() < 2 {
        return 0.0;
    }
    let rising = scores
        .windows(2)
        .filter(|w| w[1] - w[0] > ESCALATION_MIN_RISE)
        .count();
    rising as f64 / (scores.len() - 1) as f64
}

pub fn oscillation(scores: &[f64]) -> f64 {
    if scores.len() < 3 {
        return 0.0;
    }
    let flips = scores
        .windows(3)
        .filter(|w| {
            let d1 = w[1] - w[0];
            let d2 = w[2] - w[1];
            d1 * d2 < 0.0 && d1.abs() > OSCILLATION_MIN_DELTA && d2.abs() > OSCILLATION_MIN_DELTA
        })
        .count();
    flips as f64 / (scores.len() - 2) as f64
}

pub fn lock_in(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let sd = (scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n).sqrt();
    if mean > LOCKIN_MIN_MEAN && sd < LOCKIN_MAX_SD {
        let level = 0.25 * (mean - LOCKIN_MIN_MEAN) / (SCORE_MAX - LOCKIN_MIN_MEAN);
        let flatness = 0.25 * (LOCKIN_MAX_SD - sd) / LOCKIN_MAX_SD;
        (0.5 + level + flatness).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn recursive(window: &[HistoryEntry]) -> f64 {
    let n = window.len();
    if n < 2 {
        return 0.0;
    }
    let mut distinct: Vec<_> = window.iter().map(|e| e.signature()).collect();
    distinct.sort_unstable();
    distinct.dedup();
    (n - distinct.len()) as f64 / (n - 1) as f64
}

/// All four confidences over one window (oldest first)
pub fn detect_patterns(window: &[HistoryEntry]) -> PatternConfidences {
    let scores: Vec<f64> = window.iter().map(|e| e.score).collect();
    PatternConfidences {
        escalation: escalation(&scores),
        oscillation: oscillation(&scores),
        lock_in: lock_in(&scores),
        recursive: recursive(window),
    }
}

/// 0.6 · max + 0.4 · mean
pub fn overall_confidence(patterns: &PatternConfidences) -> f64 {
    (HOWLROUND_MAX_WEIGHT * patterns.max() + HOWLROUND_MEAN_WEIGHT * patterns.mean()).clamp(0.0, 1.0)
}

// =============================================================================
// GUARD
// =============================================================================

/// Rolling history plus the evaluate-and-append step
#[derive(Debug)]
pub struct HowlroundGuard {
    history: Mutex<HistoryBuffer>,
    window_min: usize,
    window_max: usize,
    threshold: f64,
}

impl Default for HowlroundGuard {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}

impl HowlroundGuard {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            history: Mutex::new(HistoryBuffer::with_capacity(config.history_capacity)),
            window_min: config.window_min,
            window_max: config.window_max,
            threshold: config.howlround_threshold,
        }
    }

    /// Score the candidate against recent history, attenuate, and record it.
    /// The lock is held for the whole step so concurrent calls serialize.
    pub fn evaluate(
        &self,
        score: f64,
        pattern_count: usize,
        input_digest: impl Into<String>,
    ) -> HowlroundReport {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);

        let mut entry = HistoryEntry::new(score, pattern_count, input_digest);
        let mut window = history.recent(self.window_max.saturating_sub(1));
        window.push(entry.clone());

        let patterns = if window.len() >= self.window_min {
            detect_patterns(&window)
        } else {
            PatternConfidences::default()
        };
        let confidence = overall_confidence(&patterns);
        let detected = confidence >= self.threshold;
        let action = HowlroundAction::from_confidence(confidence);
        let (beta, score_after) = attenuate(score, confidence);

        entry.final_score = score_after;
        // Rounding alone does not count as attenuation
        entry.attenuation_applied = beta > 0.0 && score_after < score.round();
        history.push(entry);

        if detected {
            info!(
                confidence,
                action = action.code(),
                patterns = ?patterns.active(),
                score_before = score,
                score_after,
                "howlround detected"
            );
        } else {
            debug!(confidence, beta, score_before = score, score_after, "howlround guard");
        }

        HowlroundReport {
            window_size: window.len(),
            patterns,
            confidence,
            detected,
            action,
            attenuation_factor: beta,
            score_before: score,
            score_after,
        }
    }

    /// Copy of the stored history, oldest first
    pub fn history(&self) -> Vec<HistoryEntry> {
        let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history.entries().cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn total_recorded(&self) -> u64 {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .total_recorded()
    }

    pub fn clear(&self) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================
