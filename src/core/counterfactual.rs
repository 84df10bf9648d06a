//! Counterfactual Analyzer: swap named groups and re-score
//!
//! Same bias after every swap → systematic pattern.
//! Bias that disappears or swings → artifact of one term.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::core::detectors::detect_demographic;
use crate::core::{PatternLibrary, Preprocessor};
use crate::error::{BiasError, BiasResult};
use crate::types::{
    CategoryDefinition, CategoryId, Consistency, CounterfactualCase, CounterfactualReport,
    CounterfactualVerdict, Language, PatternMatch,
};
use crate::{SYSTEMATIC_MIN_AVERAGE_SCORE, SYSTEMATIC_MIN_DETECTION_RATE};

/// Interchangeable group identifiers; every term is also a demographic specific identifier
const GROUP_TABLE: &[(&str, &[&str])] = &[
    (
        "race",
        &["white people", "black people", "asian people", "hispanic people", "latino people"],
    ),
    ("gender", &["women", "men"]),
    ("gender", &["girls", "boys"]),
    ("religion", &["muslims", "christians", "jews", "hindus", "buddhists"]),
    (
        "nationality",
        &["americans", "mexicans", "chinese people", "indians", "russians", "nigerians"],
    ),
];

struct GroupTerm {
    set: usize,
    term: &'static str,
    pattern: Regex,
}

lazy_static! {
    /// Case-insensitive, word-bounded pattern per table term
    static ref GROUP_PATTERNS: Vec<GroupTerm> = GROUP_TABLE
        .iter()
        .enumerate()
        .flat_map(|(set, (_, terms))| {
            terms.iter().map(move |term| GroupTerm {
                set,
                term,
                pattern: Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term))).unwrap(),
            })
        })
        .collect();
}

/// Dimension and terms of every table group
pub fn group_table() -> impl Iterator<Item = (&'static str, &'static [&'static str])> {
    GROUP_TABLE.iter().map(|(dimension, terms)| (*dimension, *terms))
}

/// Strictly conjunctive systematic-bias rule
pub fn verdict(consistency: Consistency, detection_rate: f64, average_score: f64) -> CounterfactualVerdict {
    if consistency.is_consistent()
        && detection_rate >= SYSTEMATIC_MIN_DETECTION_RATE
        && average_score >= SYSTEMATIC_MIN_AVERAGE_SCORE
    {
        CounterfactualVerdict::Systematic
    } else if !consistency.is_consistent() {
        CounterfactualVerdict::Inconsistent
    } else {
        CounterfactualVerdict::NoSystematicBias
    }
}

#[derive(Debug, Clone)]
pub struct CounterfactualAnalyzer {
    demographic: Option<CategoryDefinition>,
    preprocessor: Preprocessor,
}

impl CounterfactualAnalyzer {
    pub fn new(library: &Arc<PatternLibrary>) -> Self {
        Self {
            demographic: library.get(CategoryId::Demographic).cloned(),
            preprocessor: Preprocessor::new(),
        }
    }

    /// Never fails: errors become `{performed: false, reason}`
    pub fn analyze(
        &self,
        text: &str,
        language: Language,
        original: Option<&PatternMatch>,
    ) -> CounterfactualReport {
        let original = match original {
            Some(m) if m.category == CategoryId::Demographic => m,
            _ => return CounterfactualReport::skipped("no demographic match"),
        };
        match self.try_analyze(text, language, original) {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "counterfactual check failed");
                CounterfactualReport::skipped(e.to_string())
            }
        }
    }

    fn try_analyze(
        &self,
        text: &str,
        language: Language,
        original: &PatternMatch,
    ) -> BiasResult<CounterfactualReport> {
        let def = self.demographic.as_ref().ok_or_else(|| {
            BiasError::Counterfactual("library has no demographic category".into())
        })?;

        let mut cases = Vec::new();
        for group in GROUP_PATTERNS.iter() {
            if !group.pattern.is_match(text) {
                continue;
            }
            let (dimension, alternatives) = GROUP_TABLE[group.set];
            for alternative in alternatives.iter().filter(|a| **a != group.term) {
                let variant = group.pattern.replace_all(text, *alternative).into_owned();
                let pre = self.preprocessor.process(&variant, Some(language));
                let rescored = detect_demographic(&pre, def);
                let score = rescored.as_ref().map(|m| m.score).unwrap_or(0.0);
                if !score.is_finite() {
                    return Err(BiasError::Counterfactual(format!(
                        "non-finite score for variant '{}'",
                        variant
                    )));
                }
                cases.push(CounterfactualCase {
                    dimension: dimension.to_string(),
                    original_term: group.term.to_string(),
                    substituted_term: alternative.to_string(),
                    text: variant,
                    bias_detected: rescored.is_some(),
                    score,
                });
            }
        }

        if cases.is_empty() {
            return Ok(CounterfactualReport::skipped("no substitutable group terms"));
        }

        let scores: Vec<f64> = std::iter::once(original.score)
            .chain(cases.iter().map(|c| c.score))
            .collect();
        let mean_score = scores.iter().sum::<f64>() / scores.len() as f64;
        let std_dev = (scores.iter().map(|s| (s - mean_score).powi(2)).sum::<f64>()
            / scores.len() as f64)
            .sqrt();
        let detection_rate =
            cases.iter().filter(|c| c.bias_detected).count() as f64 / cases.len() as f64;
        let consistency = Consistency::from_std_dev(std_dev);
        let verdict = verdict(consistency, detection_rate, mean_score);

        debug!(
            variants = cases.len(),
            std_dev,
            detection_rate,
            verdict = %verdict,
            "counterfactual check complete"
        );

        Ok(CounterfactualReport {
            performed: true,
            reason: None,
            original_score: original.score,
            cases,
            mean_score,
            std_dev,
            detection_rate,
            consistency: Some(consistency),
            verdict,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
