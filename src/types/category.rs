//! Category catalogue records
//!
//! One record per bias category, with an optional per-language override
//! map. Records are validated once when the library loads.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BiasError, BiasResult};

/// Bias dimensions scanned by the detectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    Demographic,
    Socioeconomic,
    Geographic,
    Algorithmic,
    Linguistic,
    Temporal,
    CriminalJustice,
}

/// Scoring family a category belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFamily {
    /// matchCount · 15 · weight
    Simple,
    /// matchCount · 25 · context · weight
    CriminalJustice,
    /// Multi-layer lexicon scoring
    Demographic,
}

impl CategoryId {
    pub const ALL: [CategoryId; 7] = [
        CategoryId::Demographic,
        CategoryId::Socioeconomic,
        CategoryId::Geographic,
        CategoryId::Algorithmic,
        CategoryId::Linguistic,
        CategoryId::Temporal,
        CategoryId::CriminalJustice,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Demographic => "demographic",
            Self::Socioeconomic => "socioeconomic",
            Self::Geographic => "geographic",
            Self::Algorithmic => "algorithmic",
            Self::Linguistic => "linguistic",
            Self::Temporal => "temporal",
            Self::CriminalJustice => "criminal_justice",
        }
    }

    pub fn family(&self) -> CategoryFamily {
        match self {
            Self::Demographic => CategoryFamily::Demographic,
            Self::CriminalJustice => CategoryFamily::CriminalJustice,
            _ => CategoryFamily::Simple,
        }
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Supported languages (English is the default)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en", alias = "english")]
    English,
    #[serde(rename = "es", alias = "spanish")]
    Spanish,
    #[serde(rename = "fr", alias = "french")]
    French,
}

impl Language {
    pub const DEFAULT: Language = Language::English;

    pub const ALL: [Language; 3] = [Language::English, Language::Spanish, Language::French];

    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
            Self::French => "fr",
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "es" | "spanish" | "español" => Ok(Self::Spanish),
            "fr" | "french" | "français" => Ok(Self::French),
            other => Err(format!("unsupported language '{}' (expected en, es or fr)", other)),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Severity label, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Severity band for a 0-100 score
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            Severity::Critical
        } else if score >= 50.0 {
            Severity::High
        } else if score >= 25.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Term lists behind the multi-layer demographic score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicLexicon {
    /// race, gender, religion...
    pub abstract_terms: Vec<String>,
    /// Named groups ("white people", "muslims")
    pub specific_groups: Vec<String>,
    /// Negative-sentiment terms
    pub negative_terms: Vec<String>,
    /// all / every / always / never
    pub amplifiers: Vec<String>,
}

impl DemographicLexicon {
    fn is_empty(&self) -> bool {
        self.abstract_terms.is_empty() && self.specific_groups.is_empty()
    }
}

/// Per-language additions to a category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageVariant {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demographic: Option<DemographicLexicon>,
    /// Colonial, regional and class terms (demographic only)
    #[serde(default)]
    pub cultural_context: Vec<String>,
}

/// Immutable definition of one bias category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    /// Weight in (0, 1]
    pub weight: f64,
    pub severity: Severity,
    /// Default-language keywords
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Default-language demographic lexicon (demographic category only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demographic: Option<DemographicLexicon>,
    /// Non-default language overrides
    #[serde(default)]
    pub languages: BTreeMap<Language, LanguageVariant>,
}

impl CategoryDefinition {
    /// Override for a language, if any. The default language never has one.
    pub fn variant(&self, language: Language) -> Option<&LanguageVariant> {
        if language.is_default() {
            None
        } else {
            self.languages.get(&language)
        }
    }

    /// Load-time validation
    pub fn validate(&self) -> BiasResult<()> {
        let id = self.id;
        if !(self.weight > 0.0 && self.weight <= 1.0) {
            return Err(BiasError::Library(format!(
                "{}: weight {} outside (0, 1]",
                id, self.weight
            )));
        }
        if self.name.trim().is_empty() {
            return Err(BiasError::Library(format!("{}: empty display name", id)));
        }
        if self.languages.contains_key(&Language::DEFAULT) {
            return Err(BiasError::Library(format!(
                "{}: default language cannot carry an override",
                id
            )));
        }

        match id.family() {
            CategoryFamily::Demographic => {
                let lexicon = self.demographic.as_ref().ok_or_else(|| {
                    BiasError::Library(format!("{}: missing demographic lexicon", id))
                })?;
                if lexicon.is_empty() {
                    return Err(BiasError::Library(format!(
                        "{}: lexicon has no abstract or specific terms",
                        id
                    )));
                }
            }
            _ => {
                if self.keywords.is_empty() {
                    return Err(BiasError::Library(format!("{}: no keywords", id)));
                }
                if self.demographic.is_some() {
                    return Err(BiasError::Library(format!(
                        "{}: only the demographic category takes a lexicon",
                        id
                    )));
                }
            }
        }

        for term in self.terms() {
            if term.trim().is_empty() || term != &term.to_lowercase() {
                return Err(BiasError::Library(format!(
                    "{}: keyword '{}' must be non-empty lowercase",
                    id, term
                )));
            }
        }

        Ok(())
    }
}

impl CategoryDefinition {
    /// Every keyword of every list, default and per-language
    pub fn terms(&self) -> impl Iterator<Item = &String> {
        self.keywords
            .iter()
            .chain(self.demographic.iter().flat_map(lexicon_terms))
            .chain(self.languages.values().flat_map(|v| {
                v.keywords
                    .iter()
                    .chain(v.cultural_context.iter())
                    .chain(v.demographic.iter().flat_map(lexicon_terms))
            }))
    }
}

fn lexicon_terms(lexicon: &DemographicLexicon) -> impl Iterator<Item = &String> {
    lexicon
        .abstract_terms
        .iter()
        .chain(lexicon.specific_groups.iter())
        .chain(lexicon.negative_terms.iter())
        .chain(lexicon.amplifiers.iter())
}
