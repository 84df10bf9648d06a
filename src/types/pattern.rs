//! Detector output and the combined per-call result

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Language, Severity};

/// Layer-by-layer account of a demographic score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicBreakdown {
    pub abstract_hits: Vec<String>,
    pub specific_hits: Vec<String>,
    pub sentiment_hits: Vec<String>,
    pub amplifier_hits: Vec<String>,
    /// Hits that came from the detected non-default language lists
    pub multilingual_hits: Vec<String>,
    pub cultural_hits: Vec<String>,
    pub abstract_score: f64,
    pub specific_score: f64,
    pub sentiment_score: f64,
    pub amplifier_bonus: f64,
    pub combo_bonus: f64,
    pub multilingual_bonus: f64,
    pub cultural_bonus: f64,
}

/// One category's signal for one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub category: CategoryId,
    /// Distinct keywords found in the text
    pub matched_terms: Vec<String>,
    /// Raw score 0-100
    pub score: f64,
    /// Category weight (0, 1]
    pub weight: f64,
    pub severity: Severity,
    /// Language the text was matched in
    pub language: Language,
    /// min(1, 0.4 + 0.15 per matched term)
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demographic: Option<DemographicBreakdown>,
}

impl PatternMatch {
    pub fn match_count(&self) -> usize {
        self.matched_terms.len()
    }

    /// Same match with a lowered score (calibration). The severity is
    /// re-banded from the new score and never exceeds the current one,
    /// which already carries the category ceiling.
    pub fn with_score(&self, score: f64) -> Self {
        let score = score.clamp(0.0, crate::SCORE_MAX);
        Self {
            score,
            severity: Severity::from_score(score).min(self.severity),
            ..self.clone()
        }
    }
}

/// Aggregate of all matches in one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    /// Mean of match scores, 0-100
    pub overall_score: f64,
    /// Weight-mean of match scores, 0-100
    pub weighted_score: f64,
    /// 1.0 when nothing matched
    pub confidence: f64,
    /// Score per matched category
    pub breakdown: BTreeMap<CategoryId, f64>,
    pub matches: Vec<PatternMatch>,
}

impl CombinedResult {
    /// No bias signal at all
    pub fn empty() -> Self {
        Self {
            overall_score: 0.0,
            weighted_score: 0.0,
            confidence: 1.0,
            breakdown: BTreeMap::new(),
            matches: Vec::new(),
        }
    }

    /// Matches still carrying signal. Calibration can offset a match down
    /// to 0; it then stays in the means but no longer counts as a pattern.
    pub fn active(&self) -> impl Iterator<Item = &PatternMatch> {
        self.matches.iter().filter(|m| m.score > 0.0)
    }

    pub fn pattern_count(&self) -> usize {
        self.active().count()
    }

    /// No active match
    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }

    pub fn get(&self, category: CategoryId) -> Option<&PatternMatch> {
        self.matches.iter().find(|m| m.category == category)
    }

    pub fn has_category(&self, category: CategoryId) -> bool {
        self.get(category).is_some()
    }

    /// Highest severity among matches
    pub fn max_severity(&self) -> Option<Severity> {
        self.matches.iter().map(|m| m.severity).max()
    }

    /// (category, score) pairs in match order
    pub fn scores(&self) -> Vec<(CategoryId, f64)> {
        self.matches.iter().map(|m| (m.category, m.score)).collect()
    }
}
