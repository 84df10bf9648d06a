//! Analyzer session: owns calibration state and scoring history
//!
//! text → preprocess → detectors → combine → statistics ∥ counterfactual
//!      → calibration offset → howlround attenuation → result

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::AnalyzerConfig;
use crate::core::calibration::{BaselineCalibrator, PipelineScorer, ReferenceCorpus, ReferenceScorer};
use crate::core::counterfactual::CounterfactualAnalyzer;
use crate::core::detectors::{detect_category, DetectorSet};
use crate::core::howlround::HowlroundGuard;
use crate::core::{combine, recommend, PatternLibrary, Preprocessor, StatisticalValidator};
use crate::error::{BiasError, BiasResult};
use crate::types::{
    AnalysisOptions, AnalysisRequest, AnalysisResult, CalibrationReport, CalibrationState,
    CategoryId, CounterfactualReport, HistoryEntry, PatternMatch, PreprocessedText, RiskLevel,
    Severity,
};

/// Hex digest prefix length stored with each history entry
const DIGEST_HEX_LEN: usize = 16;

/// One analysis session. Share it behind an `Arc` for concurrent use.
pub struct BiasAnalyzer {
    config: AnalyzerConfig,
    library: Arc<PatternLibrary>,
    preprocessor: Preprocessor,
    detectors: DetectorSet,
    validator: StatisticalValidator,
    calibrator: BaselineCalibrator,
    counterfactual: CounterfactualAnalyzer,
    guard: HowlroundGuard,
}

impl std::fmt::Debug for BiasAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiasAnalyzer")
            .field("library_version", &self.library.version())
            .field("calibrator", &self.calibrator)
            .field("history_len", &self.guard.history_len())
            .finish()
    }
}

impl BiasAnalyzer {
    /// Session with the configured (or built-in) library and the pipeline as reference scorer
    pub fn new(config: AnalyzerConfig) -> BiasResult<Self> {
        let library = match &config.pattern_library {
            Some(path) => PatternLibrary::from_json_file(path)?,
            None => PatternLibrary::builtin()?,
        };
        Self::with_library(config, Arc::new(library))
    }

    pub fn with_library(config: AnalyzerConfig, library: Arc<PatternLibrary>) -> BiasResult<Self> {
        let scorer = Arc::new(PipelineScorer::new(DetectorSet::new(Arc::clone(&library))));
        Self::build(config, library, scorer)
    }

    /// Session with a custom reference scorer (built-in library)
    pub fn with_scorer(config: AnalyzerConfig, scorer: Arc<dyn ReferenceScorer>) -> BiasResult<Self> {
        let library = Arc::new(PatternLibrary::builtin()?);
        Self::build(config, library, scorer)
    }

    fn build(
        config: AnalyzerConfig,
        library: Arc<PatternLibrary>,
        scorer: Arc<dyn ReferenceScorer>,
    ) -> BiasResult<Self> {
        config.validate()?;
        let corpus = config.reference_corpus.clone().unwrap_or_else(ReferenceCorpus::builtin);
        let calibrator = BaselineCalibrator::new(scorer, corpus, config.calibration_ttl());

        info!(
            library = library.version(),
            categories = library.len(),
            "analyzer ready"
        );

        Ok(Self {
            detectors: DetectorSet::new(Arc::clone(&library)),
            counterfactual: CounterfactualAnalyzer::new(&library),
            validator: StatisticalValidator::new(config.significance_level),
            guard: HowlroundGuard::new(&config),
            preprocessor: Preprocessor::new(),
            calibrator,
            library,
            config,
        })
    }

    // =========================================================================
    // ANALYSIS
    // =========================================================================

    /// Run the full pipeline on one text
    pub fn analyze(&self, text: &str, options: &AnalysisOptions) -> BiasResult<AnalysisResult> {
        let pre = self.preprocessor.process(text, options.language);
        let matches = self.detectors.detect_all(&pre);
        self.finish(text, &pre, matches, options)
    }

    /// Same pipeline with one tokio task per category detector
    pub async fn analyze_async(
        &self,
        text: String,
        options: AnalysisOptions,
    ) -> BiasResult<AnalysisResult> {
        let pre = Arc::new(self.preprocessor.process(&text, options.language));

        let tasks = self.library.categories().iter().cloned().map(|def| {
            let pre = Arc::clone(&pre);
            tokio::spawn(async move { detect_category(&pre, &def) })
        });

        let mut matches = Vec::new();
        for joined in join_all(tasks).await {
            if let Some(m) = joined.map_err(|e| BiasError::in_stage("detection", e))? {
                matches.push(m);
            }
        }

        self.finish(&text, &pre, matches, &options)
    }

    /// Analyze many requests concurrently; results keep request order
    pub async fn analyze_batch(
        self: &Arc<Self>,
        requests: Vec<AnalysisRequest>,
    ) -> Vec<BiasResult<AnalysisResult>> {
        let total = requests.len();
        let tasks = requests.into_iter().map(|request| {
            let analyzer = Arc::clone(self);
            tokio::spawn(async move {
                let text = request.text.unwrap_or_default();
                analyzer.analyze_async(text, request.options).await
            })
        });

        let results: Vec<BiasResult<AnalysisResult>> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.map_err(|e| BiasError::in_stage("batch", e)).and_then(|r| r))
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(total, failed, "batch complete");
        results
    }

    fn finish(
        &self,
        text: &str,
        pre: &PreprocessedText,
        matches: Vec<PatternMatch>,
        options: &AnalysisOptions,
    ) -> BiasResult<AnalysisResult> {
        let raw = combine(matches);
        ensure_finite("combine", &[raw.overall_score, raw.weighted_score, raw.confidence])?;

        let statistics = self.validator.validate(&raw);

        let counterfactual = if options.skip_counterfactual || !self.config.counterfactual_enabled {
            CounterfactualReport::skipped("disabled")
        } else {
            self.counterfactual
                .analyze(text, pre.language, raw.get(CategoryId::Demographic))
        };

        let (calibrated, calibration) = if options.skip_calibration {
            (raw.clone(), CalibrationReport::bypassed())
        } else {
            let state = self.calibrator.current();
            BaselineCalibrator::apply(&raw, &state)
        };
        ensure_finite("calibration", &[calibrated.overall_score])?;

        let howlround = if options.skip_history {
            None
        } else {
            Some(self.guard.evaluate(
                calibrated.overall_score,
                calibrated.pattern_count(),
                input_digest(&pre.normalized),
            ))
        };
        let final_score = howlround
            .as_ref()
            .map(|h| h.score_after)
            .unwrap_or(calibrated.overall_score);
        ensure_finite("attenuation", &[final_score])?;

        let mut risk_level = RiskLevel::from_score(final_score);
        if counterfactual.is_systematic() || statistics.disparate_impact_flagged() {
            risk_level = risk_level.elevated();
        }

        let recommendations = recommend::generate(
            &calibrated,
            &statistics,
            &counterfactual,
            howlround.as_ref(),
            calibration.applied.then_some(calibration.quality),
        );

        debug!(
            words = pre.word_count,
            language = %pre.language,
            patterns = raw.pattern_count(),
            raw = raw.overall_score,
            calibrated = calibrated.overall_score,
            final_score,
            "analysis complete"
        );

        Ok(AnalysisResult {
            timestamp: Utc::now(),
            language: pre.language,
            word_count: pre.word_count,
            raw,
            calibrated,
            statistics,
            calibration,
            counterfactual,
            howlround,
            final_score,
            severity: Severity::from_score(final_score),
            risk_level,
            recommendations,
        })
    }

    // =========================================================================
    // SESSION STATE
    // =========================================================================

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn library(&self) -> &Arc<PatternLibrary> {
        &self.library
    }

    pub fn calibration_state(&self) -> CalibrationState {
        self.calibrator.state()
    }

    /// Number of calibration recomputations so far
    pub fn calibration_refresh_count(&self) -> u64 {
        self.calibrator.refresh_count()
    }

    /// Force a recompute now (blocks on a refresh in progress)
    pub fn refresh_calibration(&self) -> CalibrationState {
        let state = self.calibrator.refresh();
        if state.error.is_some() {
            warn!("forced calibration refresh failed");
        }
        state
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.guard.history()
    }

    /// Guarded calls recorded since creation, including evicted entries
    pub fn total_recorded(&self) -> u64 {
        self.guard.total_recorded()
    }

    pub fn clear_history(&self) {
        self.guard.clear();
    }
}

fn ensure_finite(stage: &'static str, values: &[f64]) -> BiasResult<()> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(v) => Err(BiasError::in_stage(stage, BiasError::Numerical(format!("got {}", v)))),
        None => Ok(()),
    }
}

/// SHA-256 prefix of the normalized input
pub fn input_digest(normalized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let hash = hasher.finalize();
    hash.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
        .chars()
        .take(DIGEST_HEX_LEN)
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
