//! Integration tests for baseline calibration through the analyzer session

use std::sync::Arc;

use biaslens::core::{BiasAnalyzer, ReferenceCorpus, ReferenceScorer};
use biaslens::types::{AnalysisOptions, CalibrationQuality, CalibrationStatus, CategoryId};
use biaslens::{AnalyzerConfig, BiasError, BiasResult};
use pretty_assertions::assert_eq;

const BIASED: &str = "White people suck at basketball";

fn guarded_off() -> AnalysisOptions {
    AnalysisOptions {
        skip_history: true,
        ..AnalysisOptions::default()
    }
}

/// One neutral sentence that trips the algorithmic detector (11.25),
/// framed sets that hit nothing
fn skewed_corpus() -> ReferenceCorpus {
    let quiet = vec!["The team met.".to_string()];
    ReferenceCorpus {
        neutral: vec!["The algorithm ranks applicants.".to_string()],
        framed_neutral: quiet.clone(),
        framed_positive: quiet.clone(),
        framed_negative: quiet,
    }
}

struct OfflineScorer;

impl ReferenceScorer for OfflineScorer {
    fn score_reference(&self, _text: &str) -> BiasResult<f64> {
        Err(BiasError::Calibration("reference service unreachable".into()))
    }
}

/// First call sees the zero startup offset; later calls reuse one measurement
#[test]
fn test_first_call_zero_offset_then_cached() {
    let analyzer = BiasAnalyzer::new(AnalyzerConfig::default()).unwrap();

    let first = analyzer.analyze(BIASED, &guarded_off()).unwrap();
    assert!(first.calibration.applied);
    assert_eq!(first.calibration.status, CalibrationStatus::Uncalibrated);
    assert_eq!(first.calibration.offset_applied, 0.0);
    assert_eq!(analyzer.calibration_refresh_count(), 1);

    for _ in 0..5 {
        let later = analyzer.analyze(BIASED, &guarded_off()).unwrap();
        assert_eq!(later.calibration.status, CalibrationStatus::Calibrated);
        // Built-in reference sentences hit no keywords
        assert_eq!(later.calibration.tool_bias, 0.0);
        assert_eq!(later.calibrated.overall_score, 95.0);
    }
    assert_eq!(analyzer.calibration_refresh_count(), 1);
}

/// Measured tool bias is subtracted from later analyses
#[test]
fn test_skewed_corpus_offset_applied() {
    let config = AnalyzerConfig {
        reference_corpus: Some(skewed_corpus()),
        ..AnalyzerConfig::default()
    };
    let analyzer = BiasAnalyzer::new(config).unwrap();

    analyzer.analyze(BIASED, &guarded_off()).unwrap();
    let state = analyzer.calibration_state();
    assert_eq!(state.status, CalibrationStatus::Calibrated);
    assert!((state.neutral_bias - 11.25).abs() < 1e-9);
    assert_eq!(state.contextual_bias, 0.0);
    assert!((state.tool_bias - 11.25).abs() < 1e-9);
    assert_eq!(state.sample_count, 4);
    assert_eq!(state.quality, CalibrationQuality::Excellent);

    let result = analyzer.analyze(BIASED, &guarded_off()).unwrap();
    assert_eq!(result.raw.overall_score, 95.0);
    let demo = result.calibrated.get(CategoryId::Demographic).unwrap();
    assert!((demo.score - 83.75).abs() < 1e-9);
    assert!((result.calibration.offset_applied - 11.25).abs() < 1e-9);
    assert!((result.final_score - 83.75).abs() < 1e-9);
    // Raw scores are never modified
    assert_eq!(result.raw.get(CategoryId::Demographic).unwrap().score, 95.0);
}

/// A failing reference scorer leaves a zero offset and a recommendation
#[test]
fn test_failed_calibration_reported() {
    let analyzer =
        BiasAnalyzer::with_scorer(AnalyzerConfig::default(), Arc::new(OfflineScorer)).unwrap();

    analyzer.analyze(BIASED, &guarded_off()).unwrap();
    let result = analyzer.analyze(BIASED, &guarded_off()).unwrap();

    assert_eq!(result.calibration.status, CalibrationStatus::Failed);
    assert_eq!(result.calibration.quality, CalibrationQuality::Failed);
    assert_eq!(result.calibration.offset_applied, 0.0);
    assert_eq!(result.calibrated.overall_score, 95.0);
    assert!(result
        .recommendations
        .iter()
        .any(|r| r.contains("Calibration failed")));
    assert!(analyzer.calibration_state().error.is_some());
    assert_eq!(analyzer.calibration_refresh_count(), 1);
}

/// Forced refresh recomputes even within the TTL
#[test]
fn test_forced_refresh() {
    let analyzer = BiasAnalyzer::new(AnalyzerConfig::default()).unwrap();
    let state = analyzer.refresh_calibration();
    assert_eq!(state.status, CalibrationStatus::Calibrated);
    analyzer.refresh_calibration();
    assert_eq!(analyzer.calibration_refresh_count(), 2);
}

/// Bypassing calibration leaves scores untouched and skips measurement
#[test]
fn test_bypass() {
    let config = AnalyzerConfig {
        reference_corpus: Some(skewed_corpus()),
        ..AnalyzerConfig::default()
    };
    let analyzer = BiasAnalyzer::new(config).unwrap();
    let options = AnalysisOptions {
        skip_calibration: true,
        skip_history: true,
        ..AnalysisOptions::default()
    };
    let result = analyzer.analyze(BIASED, &options).unwrap();
    assert!(!result.calibration.applied);
    assert_eq!(result.calibrated, result.raw);
    assert_eq!(analyzer.calibration_refresh_count(), 0);
}

/// Corpus with unequal framed sets is rejected at construction
#[test]
fn test_unparallel_corpus_rejected() {
    let mut corpus = skewed_corpus();
    corpus.framed_negative.push("The team left.".to_string());
    let config = AnalyzerConfig {
        reference_corpus: Some(corpus),
        ..AnalyzerConfig::default()
    };
    assert!(matches!(BiasAnalyzer::new(config), Err(BiasError::Config(_))));
}

/// Categories calibrated down to zero lose their pattern count and advice
#[test]
fn test_fully_offset_categories_go_inactive() {
    let quiet = vec!["The team met.".to_string()];
    let corpus = ReferenceCorpus {
        neutral: vec![BIASED.to_string()],
        framed_neutral: quiet.clone(),
        framed_positive: quiet.clone(),
        framed_negative: quiet,
    };
    let config = AnalyzerConfig {
        reference_corpus: Some(corpus),
        ..AnalyzerConfig::default()
    };
    let analyzer = BiasAnalyzer::new(config).unwrap();
    let text = "The algorithm flags poor people on welfare";

    analyzer.analyze(text, &guarded_off()).unwrap();
    assert_eq!(analyzer.calibration_state().tool_bias, 95.0);

    let result = analyzer.analyze(text, &guarded_off()).unwrap();
    assert!(result.raw.has_category(CategoryId::Algorithmic));
    assert!(result.raw.has_category(CategoryId::Socioeconomic));
    assert_eq!(result.calibrated.get(CategoryId::Algorithmic).unwrap().score, 0.0);
    assert!(result.calibrated.is_empty());
    assert_eq!(result.calibrated.pattern_count(), 0);
    assert_eq!(result.final_score, 0.0);
    assert!(!result.recommendations.iter().any(|r| r.starts_with('[')));
}
