//! Integration tests for the analysis pipeline
//!
//! Tests the full path: text → preprocess → detectors → combiner → statistics → result

use std::io::Write;

use biaslens::core::{BiasAnalyzer, PatternLibrary};
use biaslens::types::{
    AnalysisOptions, AnalysisResult, CategoryId, Language, RiskLevel, Severity,
};
use biaslens::AnalyzerConfig;
use pretty_assertions::assert_eq;

fn analyzer() -> BiasAnalyzer {
    BiasAnalyzer::new(AnalyzerConfig::default()).unwrap()
}

fn raw(text: &str) -> AnalysisResult {
    analyzer().analyze(text, &AnalysisOptions::raw()).unwrap()
}

/// Neutral sentence produces nothing
#[test]
fn test_neutral_sentence() {
    let result = raw("The weather is pleasant today.");
    assert!(result.raw.is_empty());
    assert_eq!(result.raw.overall_score, 0.0);
    assert_eq!(result.final_score, 0.0);
    assert_eq!(result.risk_level, RiskLevel::Minimal);
    assert_eq!(result.recommendations.len(), 1);
}

/// Specific group + negative sentiment gets the combo bonus
#[test]
fn test_specific_plus_sentiment() {
    let result = raw("White people suck at basketball");
    let demo = result.raw.get(CategoryId::Demographic).expect("demographic match");
    assert!(demo.score >= 70.0, "got {}", demo.score);
    let breakdown = demo.demographic.as_ref().unwrap();
    assert!(!breakdown.specific_hits.is_empty());
    assert!(!breakdown.sentiment_hits.is_empty());
    assert_eq!(breakdown.combo_bonus, 25.0);
    assert_eq!(result.severity, Severity::Critical);
}

/// Empty and whitespace input are analyzed as empty, never rejected
#[test]
fn test_empty_and_whitespace() {
    let a = analyzer();
    for text in ["", "   ", "\n\n\t"] {
        let result = a.analyze(text, &AnalysisOptions::default()).unwrap();
        assert_eq!(result.pattern_count(), 0);
        assert_eq!(result.raw.overall_score, 0.0);
        assert_eq!(result.raw.confidence, 1.0);
        assert!(result.statistics.impact_ratio().is_none());
        assert_eq!(result.word_count, 0);
    }
}

/// overall and weighted stay within [0, 100]
#[test]
fn test_scores_in_range_for_varied_inputs() {
    let a = analyzer();
    let texts = [
        "All white people, black people and asian people are always lazy, stupid and violent",
        "The algorithm uses training data, risk scores and facial recognition for predictive policing",
        "Criminals, thugs, felons and gangs: the police arrested more offenders after every crime",
        "Millennials and boomers from the third world ghetto speak broken english with a thick accent",
        "Los inmigrantes son flojos, sucios y peligrosos",
        "Les immigrés sont paresseux et dangereux dans la banlieue",
        "a",
        "!!!",
    ];
    for text in texts {
        let result = a.analyze(text, &AnalysisOptions::default()).unwrap();
        for score in [
            result.raw.overall_score,
            result.raw.weighted_score,
            result.calibrated.overall_score,
            result.calibrated.weighted_score,
            result.final_score,
        ] {
            assert!((0.0..=100.0).contains(&score), "{} out of range for '{}'", score, text);
        }
        let ci = result.statistics.confidence_interval;
        assert!(ci.lower <= ci.mean && ci.mean <= ci.upper);
        assert!((0.0..=1.0).contains(&result.statistics.p_value));
    }
}

/// Several categories in one text
#[test]
fn test_multi_category_combination() {
    let result = raw("The algorithm flags poor people on welfare as criminals");
    assert!(result.raw.has_category(CategoryId::Algorithmic));
    assert!(result.raw.has_category(CategoryId::Socioeconomic));
    assert!(result.raw.has_category(CategoryId::CriminalJustice));
    // "criminals" alone is sentiment, not a demographic signal
    assert!(!result.raw.has_category(CategoryId::Demographic));

    let scores: Vec<f64> = result.raw.matches.iter().map(|m| m.score).collect();
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    assert!((result.raw.overall_score - mean).abs() < 1e-9);
    assert_eq!(result.statistics.sample_size, 3);
    assert!(result.statistics.impact_ratio().is_some());
}

/// Spanish text is detected and scored with Spanish lists
#[test]
fn test_spanish_detection() {
    let result = raw("Los inmigrantes son flojos y sucios");
    assert_eq!(result.language, Language::Spanish);
    let demo = result.raw.get(CategoryId::Demographic).unwrap();
    assert_eq!(demo.language, Language::Spanish);
    assert_eq!(demo.demographic.as_ref().unwrap().multilingual_bonus, 15.0);
}

/// French text with a language hint
#[test]
fn test_french_with_hint() {
    let options = AnalysisOptions::raw().with_language(Language::French);
    let result = analyzer()
        .analyze("Les immigrés sont paresseux", &options)
        .unwrap();
    assert_eq!(result.language, Language::French);
    let demo = result.raw.get(CategoryId::Demographic).unwrap();
    // specific 40 + sentiment 30 + combo 25 + multilingual 15 → 100
    assert_eq!(demo.score, 100.0);
}

/// Results serialize to JSON and back
#[test]
fn test_result_json_roundtrip() {
    let result = analyzer()
        .analyze("White people suck at basketball", &AnalysisOptions::default())
        .unwrap();
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"risk_level\""));
    assert!(json.contains("\"language\":\"en\""));
    let back: AnalysisResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.final_score, result.final_score);
    assert_eq!(back.raw.overall_score, result.raw.overall_score);
    assert_eq!(back.raw.scores(), result.raw.scores());
    assert_eq!(back.risk_level, result.risk_level);
}

/// Parseable line carries score, risk and categories
#[test]
fn test_parseable_output() {
    let line = raw("White people suck at basketball").to_parseable_string();
    assert!(line.starts_with("score=95"));
    assert!(line.contains("categories=[demographic]"));
    assert!(line.contains("howlround=OFF"));
}

/// One recommendation per matched category
#[test]
fn test_recommendations_cover_categories() {
    let result = raw("The algorithm flags poor people on welfare");
    assert!(result.recommendations.iter().any(|r| r.starts_with("[algorithmic]")));
    assert!(result.recommendations.iter().any(|r| r.starts_with("[socioeconomic]")));
}

/// Custom library from JSON replaces the built-in catalogue
#[test]
fn test_custom_library_from_config() {
    let mut library_json = serde_json::to_value(PatternLibrary::builtin().unwrap()).unwrap();
    library_json["version"] = serde_json::json!("custom-1");
    let mut lib_file = tempfile::NamedTempFile::new().unwrap();
    write!(lib_file, "{}", library_json).unwrap();

    let config = AnalyzerConfig {
        pattern_library: Some(lib_file.path().to_path_buf()),
        ..AnalyzerConfig::default()
    };
    let a = BiasAnalyzer::new(config).unwrap();
    assert_eq!(a.library().version(), "custom-1");
    let result = a
        .analyze("White people suck at basketball", &AnalysisOptions::raw())
        .unwrap();
    assert_eq!(result.final_score, 95.0);
}

/// Invalid library is rejected at load time
#[test]
fn test_invalid_library_rejected() {
    let mut lib_file = tempfile::NamedTempFile::new().unwrap();
    write!(
        lib_file,
        r#"{{"version": "bad", "categories": [{{"id": "temporal", "name": "Temporal",
            "description": "", "weight": 1.5, "severity": "low", "keywords": ["old"]}}]}}"#
    )
    .unwrap();
    let config = AnalyzerConfig {
        pattern_library: Some(lib_file.path().to_path_buf()),
        ..AnalyzerConfig::default()
    };
    assert!(BiasAnalyzer::new(config).is_err());
}

/// Possessives and French elisions still expose the keyword
#[test]
fn test_possessive_and_elided_keywords() {
    let result = raw("White people's kids are lazy");
    let demo = result.raw.get(CategoryId::Demographic).expect("demographic match");
    assert_eq!(demo.score, 95.0);
    assert!(demo.matched_terms.contains(&"white people".to_string()));

    let options = AnalysisOptions::raw().with_language(Language::French);
    let result = analyzer()
        .analyze("L'algorithme décide tout pour les gens", &options)
        .unwrap();
    let algo = result.raw.get(CategoryId::Algorithmic).expect("algorithmic match");
    assert_eq!(algo.matched_terms, vec!["algorithme".to_string()]);
}
