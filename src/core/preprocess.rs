//! Preprocessor: lowercasing, tokenizing, sentence splitting and
//! language detection

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{Language, LanguageHits, PreprocessedText};
use crate::LANGUAGE_MIN_INDICATORS;

lazy_static! {
    /// Letters/digits, with inner apostrophes and hyphens kept ("can't", "low-income")
    static ref RE_TOKEN: Regex = Regex::new(r"[\p{L}\p{N}]+(?:['\-][\p{L}\p{N}]+)*").unwrap();

    static ref RE_SENTENCE_END: Regex = Regex::new(r"[.!?]+").unwrap();
}

// Articles, conjunctions and common verbs per language
const INDICATORS_EN: &[&str] = &[
    "the", "and", "is", "are", "of", "to", "in", "that", "it", "was", "with", "for", "they",
    "this", "have",
];
const INDICATORS_ES: &[&str] = &[
    "el", "la", "los", "las", "es", "son", "y", "de", "que", "en", "un", "una", "por", "con",
    "del", "está", "muy",
];
const INDICATORS_FR: &[&str] = &[
    "le", "la", "les", "est", "sont", "et", "de", "des", "un", "une", "que", "dans", "pour",
    "avec", "du", "très", "ce",
];

fn indicators(language: Language) -> &'static [&'static str] {
    match language {
        Language::English => INDICATORS_EN,
        Language::Spanish => INDICATORS_ES,
        Language::French => INDICATORS_FR,
    }
}

fn fold(text: &str) -> String {
    text.trim().replace(['\u{2019}', '\u{2018}'], "'").to_lowercase()
}

/// A keyword the way `contains` can see it: folded tokens joined by one space
pub fn normalize_keyword(term: &str) -> String {
    let folded = fold(term);
    let tokens: Vec<&str> = RE_TOKEN.find_iter(&folded).map(|m| m.as_str()).collect();
    tokens.join(" ")
}

/// Text normalizer shared by the analyzer and the calibrator
#[derive(Debug, Default, Clone, Copy)]
pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Normalize `text`; a language hint skips detection
    pub fn process(&self, text: &str, hint: Option<Language>) -> PreprocessedText {
        let lowered = fold(text);
        if lowered.is_empty() {
            return PreprocessedText {
                language: hint.unwrap_or(Language::DEFAULT),
                ..PreprocessedText::empty()
            };
        }

        let tokens: Vec<String> = RE_TOKEN
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect();
        let sentences: Vec<String> = RE_SENTENCE_END
            .split(&lowered)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();

        let (language, language_hits) = match hint {
            Some(language) => (language, LanguageHits::default()),
            None => detect_language(&tokens),
        };

        PreprocessedText {
            normalized: tokens.join(" "),
            word_count: tokens.len(),
            char_count: text.trim().chars().count(),
            tokens,
            sentences,
            language,
            language_hits,
        }
    }
}

/// Most indicator hits wins; needs LANGUAGE_MIN_INDICATORS, default wins ties
pub fn detect_language(tokens: &[String]) -> (Language, LanguageHits) {
    let count = |language: Language| {
        let words = indicators(language);
        tokens.iter().filter(|t| words.contains(&t.as_str())).count()
    };
    let hits = LanguageHits {
        english: count(Language::English),
        spanish: count(Language::Spanish),
        french: count(Language::French),
    };

    let mut best = Language::DEFAULT;
    for language in Language::ALL {
        if hits.get(language) > hits.get(best) {
            best = language;
        }
    }
    if hits.get(best) < LANGUAGE_MIN_INDICATORS {
        best = Language::DEFAULT;
    }
    (best, hits)
}

// =============================================================================
// TESTS
// =============================================================================
