//! Category Detectors: one pure function per scoring family
//!
//! Simple:           matchCount · 15 · weight
//! Criminal justice: matchCount · 25 · context · weight
//! Demographic:      max(abstract, specific + sentiment) + bonuses
//!
//! All scores are clamped to [0, 100]. `None` means "no signal", never an error.

use std::sync::Arc;

use crate::core::PatternLibrary;
use crate::types::{
    CategoryDefinition, CategoryFamily, DemographicBreakdown, PatternMatch, PreprocessedText,
    Severity,
};
use crate::{
    CJ_LONG_TEXT_BONUS, CJ_LONG_TEXT_WORDS, CJ_MANY_SENTENCES, CJ_MANY_SENTENCES_BONUS,
    CJ_MULTIPLIER_MAX, CJ_MULTIPLIER_MIN, CJ_SHORT_TEXT_PENALTY, CJ_SHORT_TEXT_WORDS,
    CRIMINAL_JUSTICE_POINTS_PER_MATCH, DEMO_ABSTRACT_CAP, DEMO_ABSTRACT_POINTS,
    DEMO_AMPLIFIER_CAP, DEMO_AMPLIFIER_POINTS, DEMO_COMBO_BONUS, DEMO_CULTURAL_BONUS,
    DEMO_MULTILINGUAL_BONUS, DEMO_SENTIMENT_CAP, DEMO_SENTIMENT_POINTS, DEMO_SPECIFIC_CAP,
    DEMO_SPECIFIC_POINTS, SCORE_MAX, SIMPLE_POINTS_PER_MATCH,
};

/// Every detector bound to one pattern library
#[derive(Debug, Clone)]
pub struct DetectorSet {
    library: Arc<PatternLibrary>,
}

impl DetectorSet {
    pub fn new(library: Arc<PatternLibrary>) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &Arc<PatternLibrary> {
        &self.library
    }

    /// Run every category over one text, in library order
    pub fn detect_all(&self, text: &PreprocessedText) -> Vec<PatternMatch> {
        if text.is_empty() {
            return Vec::new();
        }
        self.library
            .categories()
            .iter()
            .filter_map(|def| detect_category(text, def))
            .collect()
    }
}

/// Dispatch on the category's scoring family
pub fn detect_category(text: &PreprocessedText, def: &CategoryDefinition) -> Option<PatternMatch> {
    if text.is_empty() {
        return None;
    }
    match def.id.family() {
        CategoryFamily::Simple => detect_simple(text, def),
        CategoryFamily::CriminalJustice => detect_criminal_justice(text, def),
        CategoryFamily::Demographic => detect_demographic(text, def),
    }
}

/// Per-match confidence: min(1, 0.4 + 0.15 per term)
pub fn match_confidence(term_count: usize) -> f64 {
    (0.4 + 0.15 * term_count as f64).min(1.0)
}

fn detect_simple(text: &PreprocessedText, def: &CategoryDefinition) -> Option<PatternMatch> {
    let terms = keyword_hits(text, def);
    if terms.is_empty() {
        return None;
    }
    let score = (terms.len() as f64 * SIMPLE_POINTS_PER_MATCH * def.weight).min(SCORE_MAX);
    Some(build_match(text, def, terms, score, None))
}

fn detect_criminal_justice(
    text: &PreprocessedText,
    def: &CategoryDefinition,
) -> Option<PatternMatch> {
    let terms = keyword_hits(text, def);
    if terms.is_empty() {
        return None;
    }
    let multiplier = criminal_justice_context(text);
    let score = (terms.len() as f64 * CRIMINAL_JUSTICE_POINTS_PER_MATCH * multiplier * def.weight)
        .min(SCORE_MAX);
    Some(build_match(text, def, terms, score, None))
}

/// Context multiplier: long texts and many sentences raise it, very short texts lower it
pub fn criminal_justice_context(text: &PreprocessedText) -> f64 {
    let mut multiplier = 1.0;
    if text.word_count > CJ_LONG_TEXT_WORDS {
        multiplier += CJ_LONG_TEXT_BONUS;
    }
    if text.sentence_count() > CJ_MANY_SENTENCES {
        multiplier += CJ_MANY_SENTENCES_BONUS;
    }
    if text.word_count < CJ_SHORT_TEXT_WORDS {
        multiplier -= CJ_SHORT_TEXT_PENALTY;
    }
    multiplier.clamp(CJ_MULTIPLIER_MIN, CJ_MULTIPLIER_MAX)
}

/// Multi-layer demographic detector
pub fn detect_demographic(text: &PreprocessedText, def: &CategoryDefinition) -> Option<PatternMatch> {
    let base = def.demographic.as_ref()?;
    let variant = def.variant(text.language);
    let extra = variant.and_then(|v| v.demographic.as_ref());

    let mut breakdown = DemographicBreakdown::default();
    let mut multilingual = Vec::new();

    breakdown.abstract_hits = layer_hits(
        text,
        &base.abstract_terms,
        extra.map(|l| &l.abstract_terms),
        &mut multilingual,
    );
    breakdown.specific_hits = layer_hits(
        text,
        &base.specific_groups,
        extra.map(|l| &l.specific_groups),
        &mut multilingual,
    );
    breakdown.sentiment_hits = layer_hits(
        text,
        &base.negative_terms,
        extra.map(|l| &l.negative_terms),
        &mut multilingual,
    );
    breakdown.amplifier_hits = layer_hits(
        text,
        &base.amplifiers,
        extra.map(|l| &l.amplifiers),
        &mut multilingual,
    );
    breakdown.cultural_hits = variant
        .map(|v| hits(text, &v.cultural_context))
        .unwrap_or_default();
    breakdown.multilingual_hits = multilingual;

    // Sentiment or amplifiers alone are not a demographic signal
    if breakdown.abstract_hits.is_empty() && breakdown.specific_hits.is_empty() {
        return None;
    }

    score_layers(&mut breakdown);
    let score = breakdown_total(&breakdown);

    let mut terms: Vec<String> = Vec::new();
    for term in breakdown
        .abstract_hits
        .iter()
        .chain(&breakdown.specific_hits)
        .chain(&breakdown.sentiment_hits)
        .chain(&breakdown.amplifier_hits)
        .chain(&breakdown.cultural_hits)
    {
        if !terms.contains(term) {
            terms.push(term.clone());
        }
    }

    Some(build_match(text, def, terms, score, Some(breakdown)))
}

/// Fill in the per-layer points from the hit lists
fn score_layers(b: &mut DemographicBreakdown) {
    b.abstract_score = capped(b.abstract_hits.len(), DEMO_ABSTRACT_POINTS, DEMO_ABSTRACT_CAP);
    b.specific_score = capped(b.specific_hits.len(), DEMO_SPECIFIC_POINTS, DEMO_SPECIFIC_CAP);
    b.sentiment_score = capped(b.sentiment_hits.len(), DEMO_SENTIMENT_POINTS, DEMO_SENTIMENT_CAP);
    b.amplifier_bonus = capped(b.amplifier_hits.len(), DEMO_AMPLIFIER_POINTS, DEMO_AMPLIFIER_CAP);
    b.combo_bonus = if !b.specific_hits.is_empty() && !b.sentiment_hits.is_empty() {
        DEMO_COMBO_BONUS
    } else {
        0.0
    };
    b.multilingual_bonus = if b.multilingual_hits.is_empty() { 0.0 } else { DEMO_MULTILINGUAL_BONUS };
    b.cultural_bonus = if b.cultural_hits.is_empty() { 0.0 } else { DEMO_CULTURAL_BONUS };
}

fn breakdown_total(b: &DemographicBreakdown) -> f64 {
    let core = b.abstract_score.max(b.specific_score + b.sentiment_score);
    (core + b.amplifier_bonus + b.combo_bonus + b.multilingual_bonus + b.cultural_bonus)
        .clamp(0.0, SCORE_MAX)
}

fn capped(count: usize, points: f64, cap: f64) -> f64 {
    (count as f64 * points).min(cap)
}

/// Distinct hits of a default list plus the detected language's list.
/// Hits found only through the language list are also pushed to `multilingual`.
fn layer_hits(
    text: &PreprocessedText,
    default_terms: &[String],
    language_terms: Option<&Vec<String>>,
    multilingual: &mut Vec<String>,
) -> Vec<String> {
    let mut found = hits(text, default_terms);
    if let Some(extra) = language_terms {
        for term in hits(text, extra) {
            if !found.contains(&term) {
                if !multilingual.contains(&term) {
                    multilingual.push(term.clone());
                }
                found.push(term);
            }
        }
    }
    found
}

/// Distinct terms of `list` present in the text, in list order
fn hits(text: &PreprocessedText, list: &[String]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for term in list {
        if text.contains(term) && !found.contains(term) {
            found.push(term.clone());
        }
    }
    found
}

/// Default keywords plus the detected language's keywords
fn keyword_hits(text: &PreprocessedText, def: &CategoryDefinition) -> Vec<String> {
    let mut found = hits(text, &def.keywords);
    if let Some(variant) = def.variant(text.language) {
        for term in hits(text, &variant.keywords) {
            if !found.contains(&term) {
                found.push(term);
            }
        }
    }
    found
}

fn build_match(
    text: &PreprocessedText,
    def: &CategoryDefinition,
    terms: Vec<String>,
    score: f64,
    demographic: Option<DemographicBreakdown>,
) -> PatternMatch {
    let score = score.clamp(0.0, SCORE_MAX);
    PatternMatch {
        category: def.id,
        confidence: match_confidence(terms.len()),
        matched_terms: terms,
        score,
        weight: def.weight,
        // Category severity is a ceiling for its matches
        severity: Severity::from_score(score).min(def.severity),
        language: text.language,
        demographic,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Preprocessor;
    use crate::types::{CategoryId, Language};

    fn detectors() -> DetectorSet {
        DetectorSet::new(Arc::new(PatternLibrary::builtin().unwrap()))
    }

    fn run(text: &str) -> Vec<PatternMatch> {
        let pre = Preprocessor::new().process(text, None);
        detectors().detect_all(&pre)
    }

    fn find(matches: &[PatternMatch], id: CategoryId) -> Option<&PatternMatch> {
        matches.iter().find(|m| m.category == id)
    }

    #[test]
    fn test_neutral_text_has_no_matches() {
        assert!(run("The weather is pleasant today.").is_empty());
        assert!(run("").is_empty());
    }

    #[test]
    fn test_specific_plus_sentiment_gets_combo() {
        let matches = run("White people suck at basketball");
        let demo = find(&matches, CategoryId::Demographic).unwrap();
        let b = demo.demographic.as_ref().unwrap();
        assert_eq!(b.specific_hits, vec!["white people"]);
        assert_eq!(b.sentiment_hits, vec!["suck"]);
        assert_eq!(b.combo_bonus, 25.0);
        assert_eq!(demo.score, 95.0);
        assert_eq!(demo.severity, Severity::Critical);
    }

    #[test]
    fn test_sentiment_alone_is_not_demographic() {
        let matches = run("They are lazy and always late");
        assert!(find(&matches, CategoryId::Demographic).is_none());
    }

    #[test]
    fn test_abstract_layer() {
        let matches = run("Race and religion shape politics");
        let demo = find(&matches, CategoryId::Demographic).unwrap();
        assert_eq!(demo.score, 40.0);
        assert_eq!(demo.match_count(), 2);
    }

    #[test]
    fn test_demographic_monotone_in_amplifiers() {
        let base = run("Muslims are dangerous");
        let amplified = run("All muslims are always dangerous");
        let a = find(&base, CategoryId::Demographic).unwrap().score;
        let b = find(&amplified, CategoryId::Demographic).unwrap().score;
        assert!(b >= a);
    }

    fn grid_total(counts: [usize; 6]) -> f64 {
        let hits = |layer: &str, n: usize| -> Vec<String> {
            (0..n).map(|i| format!("{}{}", layer, i)).collect()
        };
        let mut b = DemographicBreakdown {
            abstract_hits: hits("a", counts[0]),
            specific_hits: hits("s", counts[1]),
            sentiment_hits: hits("n", counts[2]),
            amplifier_hits: hits("x", counts[3]),
            multilingual_hits: hits("m", counts[4]),
            cultural_hits: hits("c", counts[5]),
            ..DemographicBreakdown::default()
        };
        score_layers(&mut b);
        breakdown_total(&b)
    }

    #[test]
    fn test_demographic_monotone_in_every_layer() {
        // 0..=4 crosses every layer cap and the abstract vs specific+sentiment switch
        let mut checked = 0;
        for a in 0..=4 {
            for s in 0..=4 {
                for n in 0..=4 {
                    for x in 0..=3 {
                        for m in 0..=1 {
                            for c in 0..=1 {
                                let counts = [a, s, n, x, m, c];
                                let total = grid_total(counts);
                                assert!((0.0..=SCORE_MAX).contains(&total));
                                for layer in 0..counts.len() {
                                    let mut more = counts;
                                    more[layer] += 1;
                                    let next = grid_total(more);
                                    assert!(
                                        next >= total,
                                        "layer {} {:?}: {} -> {}",
                                        layer,
                                        counts,
                                        total,
                                        next
                                    );
                                    checked += 1;
                                }
                            }
                        }
                    }
                }
            }
        }
        assert_eq!(checked, 5 * 5 * 5 * 4 * 2 * 2 * 6);
    }

    #[test]
    fn test_demographic_core_takes_larger_branch() {
        // three abstract hits (60) beat one specific hit (40)
        assert_eq!(grid_total([3, 1, 0, 0, 0, 0]), 60.0);
        // specific + sentiment (70) plus combo beats the abstract cap
        assert_eq!(grid_total([3, 1, 1, 0, 0, 0]), 95.0);
        assert_eq!(grid_total([0, 0, 0, 3, 1, 1]), 55.0);
    }

    #[test]
    fn test_simple_category_score() {
        let matches = run("The algorithm was built on training data");
        let algo = find(&matches, CategoryId::Algorithmic).unwrap();
        assert_eq!(algo.match_count(), 2);
        assert!((algo.score - 22.5).abs() < 1e-9);
        assert!((algo.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_criminal_justice_short_text_penalty() {
        let matches = run("The police arrested the suspect");
        let cj = find(&matches, CategoryId::CriminalJustice).unwrap();
        // 2 · 25 · 0.7 · 0.85
        assert!((cj.score - 29.75).abs() < 1e-9);
    }

    #[test]
    fn test_context_multiplier_bounds() {
        let long = "word ".repeat(150) + ". a. b. c. d. e. f.";
        let pre = Preprocessor::new().process(&long, None);
        assert!((criminal_justice_context(&pre) - 1.3).abs() < 1e-9);

        let short = Preprocessor::new().process("police", None);
        assert!((criminal_justice_context(&short) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_spanish_multilingual_bonus() {
        let matches = run("Los inmigrantes son flojos y sucios");
        let demo = find(&matches, CategoryId::Demographic).unwrap();
        assert_eq!(demo.language, Language::Spanish);
        let b = demo.demographic.as_ref().unwrap();
        assert_eq!(b.multilingual_bonus, 15.0);
        assert!(b.multilingual_hits.contains(&"los inmigrantes".to_string()));
        assert_eq!(demo.score, 100.0);
    }

    #[test]
    fn test_cultural_context_bonus() {
        let matches = run("Los indígenas de la colonia");
        let demo = find(&matches, CategoryId::Demographic).unwrap();
        let b = demo.demographic.as_ref().unwrap();
        assert_eq!(b.cultural_hits, vec!["colonia"]);
        assert_eq!(b.cultural_bonus, 10.0);
        // specific 40 + multilingual 15 + cultural 10
        assert_eq!(demo.score, 65.0);
    }

    #[test]
    fn test_default_language_ignores_variant_lists() {
        let pre = Preprocessor::new().process("pobres", Some(Language::English));
        assert!(detectors().detect_all(&pre).is_empty());
        let pre = Preprocessor::new().process("pobres", Some(Language::Spanish));
        assert_eq!(detectors().detect_all(&pre).len(), 1);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let matches = run(
            "All white people, black people and asian people are always lazy, stupid, dirty \
             and violent criminals, thugs and felons in the ghetto of the third world",
        );
        assert!(!matches.is_empty());
        for m in &matches {
            assert!((0.0..=100.0).contains(&m.score), "{} out of range", m.category);
        }
    }
}
