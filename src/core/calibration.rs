//! Baseline Calibrator: measures the pipeline's own bias on reference text
//!
//! toolBias = neutralBias + 0.5 · contextualBias
//!
//! The state is stale-while-revalidate: a caller that finds it stale uses
//! the value it read and refreshes it once; concurrent callers never
//! recompute twice.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, TryLockError};

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::{combine, DetectorSet, Preprocessor};
use crate::error::{BiasError, BiasResult};
use crate::types::{
    CalibrationQuality, CalibrationReport, CalibrationState, CalibrationStatus, CategoryId,
    CombinedResult,
};
use crate::{
    CALIBRATION_FACTOR_DEFAULT, CALIBRATION_FACTOR_DEMOGRAPHIC, CALIBRATION_FACTOR_REDUCED,
    CONTEXTUAL_BIAS_WEIGHT, SCORE_MAX,
};

/// Scores one reference sentence (0-100)
pub trait ReferenceScorer: Send + Sync {
    fn score_reference(&self, text: &str) -> BiasResult<f64>;
}

/// Scores reference text with the same preprocessor and detectors as `analyze`
#[derive(Debug, Clone)]
pub struct PipelineScorer {
    preprocessor: Preprocessor,
    detectors: DetectorSet,
}

impl PipelineScorer {
    pub fn new(detectors: DetectorSet) -> Self {
        Self {
            preprocessor: Preprocessor::new(),
            detectors,
        }
    }
}

impl ReferenceScorer for PipelineScorer {
    fn score_reference(&self, text: &str) -> BiasResult<f64> {
        let pre = self.preprocessor.process(text, None);
        let score = combine(self.detectors.detect_all(&pre)).overall_score;
        if score.is_finite() {
            Ok(score)
        } else {
            Err(BiasError::Numerical(format!("reference score {} for '{}'", score, text)))
        }
    }
}

/// Reference sentences; framed sets are parallel (same subject, different framing)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCorpus {
    pub neutral: Vec<String>,
    pub framed_neutral: Vec<String>,
    pub framed_positive: Vec<String>,
    pub framed_negative: Vec<String>,
}

const NEUTRAL: &[&str] = &[
    "The meeting is scheduled for Tuesday afternoon.",
    "Please send the quarterly report to the finance team.",
    "The library opens at nine in the morning.",
    "Rain is expected later this week.",
    "The recipe calls for two cups of flour.",
    "The train arrived at the station on time.",
    "She planted tomatoes in the garden.",
    "The software update fixed several bugs.",
];

const FRAMED_NEUTRAL: &[&str] = &[
    "The new employees finished the project.",
    "The neighbors organized a street festival.",
    "The students presented their research.",
    "The volunteers cleaned the park.",
    "The team reviewed the budget.",
];

const FRAMED_POSITIVE: &[&str] = &[
    "The talented new employees brilliantly finished the project.",
    "The generous neighbors organized a wonderful street festival.",
    "The bright students presented their impressive research.",
    "The dedicated volunteers cleaned the park beautifully.",
    "The careful team reviewed the budget thoroughly.",
];

const FRAMED_NEGATIVE: &[&str] = &[
    "The careless new employees barely finished the project.",
    "The noisy neighbors organized a chaotic street festival.",
    "The unprepared students presented their weak research.",
    "The reluctant volunteers cleaned the park poorly.",
    "The sloppy team reviewed the budget hastily.",
];

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for ReferenceCorpus {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReferenceCorpus {
    pub fn builtin() -> Self {
        Self {
            neutral: owned(NEUTRAL),
            framed_neutral: owned(FRAMED_NEUTRAL),
            framed_positive: owned(FRAMED_POSITIVE),
            framed_negative: owned(FRAMED_NEGATIVE),
        }
    }

    pub fn validate(&self) -> BiasResult<()> {
        if self.neutral.is_empty() {
            return Err(BiasError::Config("reference corpus has no neutral sentences".into()));
        }
        let n = self.framed_neutral.len();
        if n == 0 || self.framed_positive.len() != n || self.framed_negative.len() != n {
            return Err(BiasError::Config(format!(
                "framed sets must be non-empty and parallel (neutral {}, positive {}, negative {})",
                n,
                self.framed_positive.len(),
                self.framed_negative.len()
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.neutral.len()
            + self.framed_neutral.len()
            + self.framed_positive.len()
            + self.framed_negative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Share of the tool-bias offset subtracted from a category's score
pub fn category_factor(category: CategoryId) -> f64 {
    match category {
        CategoryId::Demographic => CALIBRATION_FACTOR_DEMOGRAPHIC,
        CategoryId::Socioeconomic | CategoryId::Algorithmic => CALIBRATION_FACTOR_REDUCED,
        _ => CALIBRATION_FACTOR_DEFAULT,
    }
}

/// Owner of the process-wide calibration state
pub struct BaselineCalibrator {
    scorer: Arc<dyn ReferenceScorer>,
    corpus: ReferenceCorpus,
    ttl: Duration,
    state: RwLock<CalibrationState>,
    refresh_guard: Mutex<()>,
    refresh_count: AtomicU64,
}

impl std::fmt::Debug for BaselineCalibrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaselineCalibrator")
            .field("ttl", &self.ttl)
            .field("corpus_size", &self.corpus.len())
            .field("refresh_count", &self.refresh_count())
            .finish()
    }
}

impl BaselineCalibrator {
    pub fn new(scorer: Arc<dyn ReferenceScorer>, corpus: ReferenceCorpus, ttl: Duration) -> Self {
        Self {
            scorer,
            corpus,
            ttl,
            state: RwLock::new(CalibrationState::empty()),
            refresh_guard: Mutex::new(()),
            refresh_count: AtomicU64::new(0),
        }
    }

    /// Copy of the cached state
    pub fn state(&self) -> CalibrationState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recomputations attempted so far (successful or failed)
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count.load(Ordering::SeqCst)
    }

    /// State to use for this call. If stale, it is refreshed afterwards
    /// unless another caller is already doing so.
    pub fn current(&self) -> CalibrationState {
        let snapshot = self.state();
        if snapshot.is_stale(self.ttl, Utc::now()) {
            self.refresh_if_stale();
        }
        snapshot
    }

    /// Recompute unconditionally (waits for a refresh in progress)
    pub fn refresh(&self) -> CalibrationState {
        let _guard = self
            .refresh_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.recompute_locked()
    }

    fn refresh_if_stale(&self) {
        let _guard = match self.refresh_guard.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                debug!("calibration refresh already in progress, using cached state");
                return;
            }
        };
        // Someone may have finished a refresh between our read and the lock
        if !self.state().is_stale(self.ttl, Utc::now()) {
            return;
        }
        self.recompute_locked();
    }

    fn recompute_locked(&self) -> CalibrationState {
        self.refresh_count.fetch_add(1, Ordering::SeqCst);
        let next = match self.measure() {
            Ok(state) => {
                info!(
                    tool_bias = state.tool_bias,
                    quality = %state.quality,
                    samples = state.sample_count,
                    "calibration refreshed"
                );
                state
            }
            Err(e) => {
                warn!(error = %e, "calibration failed, using zero offset");
                CalibrationState::failed(e.to_string(), Utc::now())
            }
        };
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next.clone();
        next
    }

    /// Score the reference corpus and derive the offsets
    pub fn measure(&self) -> BiasResult<CalibrationState> {
        self.corpus.validate()?;
        let score_all = |texts: &[String]| -> BiasResult<Vec<f64>> {
            texts
                .iter()
                .map(|t| {
                    self.scorer
                        .score_reference(t)
                        .map_err(|e| BiasError::Calibration(e.to_string()))
                })
                .collect()
        };

        let neutral = score_all(&self.corpus.neutral)?;
        let framed_neutral = score_all(&self.corpus.framed_neutral)?;
        let framed_positive = score_all(&self.corpus.framed_positive)?;
        let framed_negative = score_all(&self.corpus.framed_negative)?;

        let neutral_bias = mean(&neutral);
        let baseline = mean(&framed_neutral);
        let contextual_bias =
            (mean(&framed_positive) - baseline).abs() + (mean(&framed_negative) - baseline).abs();
        let tool_bias = neutral_bias + CONTEXTUAL_BIAS_WEIGHT * contextual_bias;

        let all: Vec<f64> = neutral
            .iter()
            .chain(&framed_neutral)
            .chain(&framed_positive)
            .chain(&framed_negative)
            .cloned()
            .collect();
        let reference_variance = population_variance(&all);

        if !tool_bias.is_finite() || !reference_variance.is_finite() {
            return Err(BiasError::Numerical("non-finite calibration offset".into()));
        }

        Ok(CalibrationState {
            status: CalibrationStatus::Calibrated,
            neutral_bias,
            contextual_bias,
            tool_bias,
            reference_variance,
            quality: CalibrationQuality::from_variance(reference_variance),
            sample_count: all.len(),
            computed_at: Some(Utc::now()),
            error: None,
        })
    }

    /// Subtract the offset per match and recombine
    pub fn apply(raw: &CombinedResult, state: &CalibrationState) -> (CombinedResult, CalibrationReport) {
        let bias = state.effective_bias();
        let calibrated = if bias == 0.0 || raw.is_empty() {
            raw.clone()
        } else {
            // Matches offset down to zero stay in the mean but go inactive
            let matches = raw
                .matches
                .iter()
                .map(|m| {
                    let adjusted = m.score - bias * category_factor(m.category);
                    m.with_score(adjusted.clamp(0.0, SCORE_MAX))
                })
                .collect();
            combine(matches)
        };

        let report = CalibrationReport {
            applied: true,
            status: state.status,
            quality: state.quality,
            tool_bias: state.tool_bias,
            offset_applied: raw.overall_score - calibrated.overall_score,
            computed_at: state.computed_at,
        };
        (calibrated, report)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

// =============================================================================
// TESTS
// =============================================================================
