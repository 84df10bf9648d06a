//! Integration tests for counterfactual group substitution

use biaslens::core::BiasAnalyzer;
use biaslens::types::{AnalysisOptions, Consistency, CounterfactualVerdict, RiskLevel};
use biaslens::AnalyzerConfig;
use pretty_assertions::assert_eq;

fn unguarded() -> AnalysisOptions {
    AnalysisOptions {
        skip_history: true,
        ..AnalysisOptions::default()
    }
}

fn analyze(text: &str) -> biaslens::types::AnalysisResult {
    BiasAnalyzer::new(AnalyzerConfig::default())
        .unwrap()
        .analyze(text, &unguarded())
        .unwrap()
}

/// Same framing for every nationality is systematic
#[test]
fn test_nationality_stereotype_systematic() {
    let result = analyze("Mexicans are lazy");
    let report = &result.counterfactual;
    assert!(report.performed);
    assert_eq!(report.original_score, 95.0);
    assert_eq!(report.cases.len(), 5);
    assert!(report.cases.iter().all(|c| c.dimension == "nationality"));
    assert!(report.cases.iter().any(|c| c.text == "russians are lazy"));
    assert_eq!(report.detection_rate, 1.0);
    assert_eq!(report.consistency, Some(Consistency::High));
    assert_eq!(report.verdict, CounterfactualVerdict::Systematic);
    assert!(result.recommendations.iter().any(|r| r.contains("swapped")));
}

/// A systematic verdict raises the risk one level
#[test]
fn test_systematic_verdict_elevates_risk() {
    // specific 40 + two amplifiers 30
    let result = analyze("All muslims always pray.");
    assert_eq!(result.final_score, 70.0);
    assert_eq!(RiskLevel::from_score(result.final_score), RiskLevel::High);
    assert!(result.counterfactual.is_systematic());
    assert_eq!(result.counterfactual.cases.len(), 4);
    assert_eq!(result.risk_level, RiskLevel::Severe);
}

/// No demographic match means nothing to substitute
#[test]
fn test_skipped_without_demographic_match() {
    let result = analyze("The algorithm ranks applicants.");
    assert!(!result.counterfactual.performed);
    assert_eq!(
        result.counterfactual.reason.as_deref(),
        Some("no demographic match")
    );
    assert_eq!(result.risk_level, RiskLevel::Minimal);
}

/// Abstract-only demographic text has no group term to swap
#[test]
fn test_skipped_for_abstract_only() {
    let result = analyze("Religion is a private matter");
    assert_eq!(result.raw.overall_score, 20.0);
    assert!(!result.counterfactual.performed);
    assert_eq!(
        result.counterfactual.reason.as_deref(),
        Some("no substitutable group terms")
    );
}

/// Disabled in config or per call
#[test]
fn test_disabled() {
    let config = AnalyzerConfig {
        counterfactual_enabled: false,
        ..AnalyzerConfig::default()
    };
    let analyzer = BiasAnalyzer::new(config).unwrap();
    let result = analyzer.analyze("Mexicans are lazy", &unguarded()).unwrap();
    assert!(!result.counterfactual.performed);
    assert_eq!(result.counterfactual.reason.as_deref(), Some("disabled"));

    let options = AnalysisOptions {
        skip_counterfactual: true,
        ..unguarded()
    };
    let result = BiasAnalyzer::new(AnalyzerConfig::default())
        .unwrap()
        .analyze("Mexicans are lazy", &options)
        .unwrap();
    assert_eq!(result.counterfactual.reason.as_deref(), Some("disabled"));
}

/// Swapped texts are rescored in the original's language
#[test]
fn test_variants_keep_language_and_case() {
    let result = analyze("WHITE PEOPLE suck at basketball");
    let report = &result.counterfactual;
    assert_eq!(report.cases.len(), 4);
    assert!(report
        .cases
        .iter()
        .any(|c| c.text == "black people suck at basketball"));
    assert!(report.cases.iter().all(|c| c.original_term == "white people"));
}
