//! Preprocessed text shared by every detector in one call

use serde::{Deserialize, Serialize};

use crate::types::Language;

/// Indicator-word counts behind language detection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageHits {
    pub english: usize,
    pub spanish: usize,
    pub french: usize,
}

impl LanguageHits {
    pub fn get(&self, language: Language) -> usize {
        match language {
            Language::English => self.english,
            Language::Spanish => self.spanish,
            Language::French => self.french,
        }
    }
}

/// Normalized view of one input text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessedText {
    /// Lowercased tokens joined by single spaces
    pub normalized: String,
    /// Word tokens (lowercase)
    pub tokens: Vec<String>,
    /// Trimmed sentences (lowercase)
    pub sentences: Vec<String>,
    pub word_count: usize,
    pub char_count: usize,
    /// Detected or caller-supplied language
    pub language: Language,
    /// Detection evidence (zeroed when a language hint was used)
    pub language_hits: LanguageHits,
}

impl PreprocessedText {
    /// Text with nothing to analyze
    pub fn empty() -> Self {
        Self {
            normalized: String::new(),
            tokens: Vec::new(),
            sentences: Vec::new(),
            word_count: 0,
            char_count: 0,
            language: Language::DEFAULT,
            language_hits: LanguageHits::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Substring containment against the normalized text, anchored on
    /// token boundaries so "race" does not fire inside "grace". An
    /// apostrophe also bounds a term when it starts a possessive `'s`
    /// ("women's") or ends an elided article ("l'algorithme").
    pub fn contains(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }
        let haystack = self.normalized.as_str();
        haystack.match_indices(term).any(|(start, _)| {
            starts_term(&haystack[..start]) && ends_term(&haystack[start + term.len()..])
        })
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }
}

/// Elided words that attach to the next token with an apostrophe
const ELISIONS: &[&str] = &[
    "c", "d", "j", "l", "m", "n", "s", "t", "qu", "jusqu", "lorsqu", "puisqu",
];

fn starts_term(head: &str) -> bool {
    match head.strip_suffix('\'') {
        Some(elided) => {
            let word = elided.rsplit(' ').next().unwrap_or(elided);
            ELISIONS.contains(&word)
        }
        None => head.is_empty() || head.ends_with(' '),
    }
}

fn ends_term(tail: &str) -> bool {
    match tail.strip_prefix('\'') {
        Some(rest) => {
            let suffix = rest.split(' ').next().unwrap_or(rest);
            suffix.is_empty() || suffix == "s"
        }
        None => tail.is_empty() || tail.starts_with(' '),
    }
}
