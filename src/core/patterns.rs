//! Pattern Library: versioned catalogue of bias categories
//!
//! English is the default language; Spanish and French ride along as
//! per-language overrides. Every library, built-in or loaded from JSON,
//! passes `PatternLibrary::new` validation before a detector sees it.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::preprocess::normalize_keyword;
use crate::error::{BiasError, BiasResult};
use crate::types::{
    CategoryDefinition, CategoryId, DemographicLexicon, Language, LanguageVariant, Severity,
};
use crate::PATTERN_LIBRARY_VERSION;

// =========================================================================
// Demographic (weight 1.0, critical)
// =========================================================================

const DEMO_ABSTRACT_EN: &[&str] = &[
    "race", "races", "racial", "ethnicity", "ethnic", "gender", "genders", "religion",
    "religious", "nationality", "minority", "minorities", "sexual orientation", "disability",
    "disabled", "skin color", "heritage",
];

const DEMO_SPECIFIC_EN: &[&str] = &[
    "white people", "black people", "asian people", "hispanic people", "latino people",
    "whites", "blacks", "asians", "arabs", "women", "men", "girls", "boys", "muslims",
    "christians", "jews", "hindus", "buddhists", "atheists", "immigrants", "foreigners",
    "americans", "mexicans", "chinese people", "indians", "russians", "nigerians",
    "gay people", "old people",
];

const DEMO_NEGATIVE_EN: &[&str] = &[
    "suck", "sucks", "lazy", "stupid", "dumb", "inferior", "dangerous", "dirty", "violent",
    "primitive", "greedy", "untrustworthy", "can't be trusted", "criminals", "terrorists",
    "bad at", "worse at", "useless", "ugly", "hate", "disgusting", "savages", "backward",
    "incompetent",
];

const DEMO_AMPLIFIERS_EN: &[&str] = &[
    "all", "every", "always", "never", "everyone", "none of them", "nothing but", "typical",
];

const DEMO_ABSTRACT_ES: &[&str] = &[
    "raza", "racial", "etnia", "étnico", "género", "religión", "nacionalidad", "minoría",
    "minorías",
];

const DEMO_SPECIFIC_ES: &[&str] = &[
    "los blancos", "los negros", "los asiáticos", "los indígenas", "los inmigrantes",
    "las mujeres", "los hombres", "los musulmanes", "los judíos", "los gitanos",
    "los extranjeros", "los mexicanos",
];

const DEMO_NEGATIVE_ES: &[&str] = &[
    "flojos", "perezosos", "estúpidos", "inferiores", "peligrosos", "sucios", "violentos",
    "ladrones", "malos", "tontos", "inútiles",
];

const DEMO_AMPLIFIERS_ES: &[&str] = &["todos", "todas", "siempre", "nunca", "cada"];

const DEMO_CULTURAL_ES: &[&str] = &[
    "indio", "colonia", "conquista", "mestizo", "criollo", "cholo", "naco", "sudaca",
    "gente de pueblo", "clase baja",
];

const DEMO_ABSTRACT_FR: &[&str] = &[
    "race", "raciale", "ethnie", "ethnique", "genre", "religion", "nationalité", "minorité",
    "minorités",
];

const DEMO_SPECIFIC_FR: &[&str] = &[
    "les blancs", "les noirs", "les arabes", "les asiatiques", "les immigrés", "les femmes",
    "les hommes", "les musulmans", "les juifs", "les étrangers", "les roms",
];

const DEMO_NEGATIVE_FR: &[&str] = &[
    "paresseux", "stupides", "inférieurs", "dangereux", "sales", "violents", "voleurs",
    "nuls", "incapables", "idiots",
];

const DEMO_AMPLIFIERS_FR: &[&str] = &["tous", "toutes", "toujours", "jamais", "chaque"];

const DEMO_CULTURAL_FR: &[&str] = &[
    "colonies", "indigène", "banlieue", "beur", "métropole", "province", "racaille",
    "bourgeois", "paysans",
];

// =========================================================================
// Simple categories
// =========================================================================

const SOCIOECONOMIC_EN: &[&str] = &[
    "poor people", "welfare", "welfare queens", "low-income", "lower class", "trailer park",
    "trailer trash", "uneducated", "ghetto", "handouts", "freeloaders", "working class",
    "upper class", "elite", "elites", "privileged", "homeless", "rich people", "food stamps",
];
const SOCIOECONOMIC_ES: &[&str] = &[
    "pobres", "clase baja", "los ricos", "mantenidos", "asistencia social", "chabolas",
];
const SOCIOECONOMIC_FR: &[&str] = &[
    "pauvres", "assistés", "classe ouvrière", "les riches", "cas sociaux", "sdf",
];

const GEOGRAPHIC_EN: &[&str] = &[
    "third world", "third-world", "developing countries", "inner city", "inner-city",
    "backwater", "shithole countries", "rural folk", "hillbillies", "rednecks", "urban youth",
    "those countries", "flyover country", "banana republic",
];
const GEOGRAPHIC_ES: &[&str] = &[
    "tercer mundo", "países subdesarrollados", "pueblerinos", "provincianos",
];
const GEOGRAPHIC_FR: &[&str] = &[
    "tiers monde", "pays sous-développés", "provinciaux", "banlieusards",
];

const ALGORITHMIC_EN: &[&str] = &[
    "algorithm", "algorithms", "algorithmic", "machine learning", "model predicts",
    "automated decision", "automated decisions", "risk score", "risk scores", "training data",
    "ai system", "predictive policing", "credit score", "facial recognition", "data-driven",
];
const ALGORITHMIC_ES: &[&str] = &[
    "algoritmo", "algoritmos", "aprendizaje automático", "datos de entrenamiento",
    "reconocimiento facial",
];
const ALGORITHMIC_FR: &[&str] = &[
    "algorithme", "algorithmes", "apprentissage automatique", "données d'entraînement",
    "reconnaissance faciale",
];

const LINGUISTIC_EN: &[&str] = &[
    "broken english", "accent", "accents", "thick accent", "articulate", "non-native",
    "dialect", "proper english", "speaks well", "slang", "can't speak english",
    "foreign-sounding",
];
const LINGUISTIC_ES: &[&str] = &["acento", "dialecto", "mal hablado", "no habla bien"];
const LINGUISTIC_FR: &[&str] = &["accent", "patois", "parle mal", "charabia"];

const TEMPORAL_EN: &[&str] = &[
    "outdated", "old-fashioned", "back in my day", "millennials", "boomers", "kids these days",
    "elderly", "too old", "too young", "generation", "gen z", "over the hill", "senile",
];
const TEMPORAL_ES: &[&str] = &["anticuado", "viejos", "los jóvenes de hoy", "generación"];
const TEMPORAL_FR: &[&str] = &["dépassé", "vieux jeu", "les jeunes d'aujourd'hui", "génération"];

// =========================================================================
// Criminal justice (context-sensitive)
// =========================================================================

const CRIMINAL_JUSTICE_EN: &[&str] = &[
    "criminal", "criminals", "thug", "thugs", "felon", "felons", "inmate", "inmates", "arrest",
    "arrested", "recidivism", "crime", "crimes", "offender", "offenders", "gang", "gangs",
    "convict", "convicts", "police", "incarceration", "mugshot", "illegal aliens",
    "superpredators",
];
const CRIMINAL_JUSTICE_ES: &[&str] = &[
    "criminal", "criminales", "delincuentes", "pandilla", "cárcel", "policía", "crimen",
];
const CRIMINAL_JUSTICE_FR: &[&str] = &[
    "criminel", "criminels", "délinquants", "voyous", "prison", "police", "crime",
];

/// The catalogue handed to detectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternLibrary {
    version: String,
    categories: Vec<CategoryDefinition>,
}

impl PatternLibrary {
    /// Validate and wrap a set of definitions
    pub fn new(version: impl Into<String>, categories: Vec<CategoryDefinition>) -> BiasResult<Self> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(BiasError::Library("library version is empty".into()));
        }
        if categories.is_empty() {
            return Err(BiasError::Library("library has no categories".into()));
        }

        let mut seen = HashSet::new();
        for def in &categories {
            def.validate()?;
            // Keywords the tokenizer cannot reproduce would never match
            if let Some(term) = def.terms().find(|t| normalize_keyword(t) != **t) {
                return Err(BiasError::Library(format!(
                    "{}: keyword '{}' normalizes to '{}'",
                    def.id,
                    term,
                    normalize_keyword(term)
                )));
            }
            if !seen.insert(def.id) {
                return Err(BiasError::Library(format!("duplicate category {}", def.id)));
            }
        }

        Ok(Self { version, categories })
    }

    /// Built-in English/Spanish/French catalogue
    pub fn builtin() -> BiasResult<Self> {
        Self::new(PATTERN_LIBRARY_VERSION, builtin_categories())
    }

    pub fn from_json_str(json: &str) -> BiasResult<Self> {
        let raw: PatternLibrary = serde_json::from_str(json)?;
        Self::new(raw.version, raw.categories)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> BiasResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    pub fn get(&self, id: CategoryId) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn lexicon(
    abstract_terms: &[&str],
    specific: &[&str],
    negative: &[&str],
    amplifiers: &[&str],
) -> DemographicLexicon {
    DemographicLexicon {
        abstract_terms: words(abstract_terms),
        specific_groups: words(specific),
        negative_terms: words(negative),
        amplifiers: words(amplifiers),
    }
}

fn keyword_variants(es: &[&str], fr: &[&str]) -> BTreeMap<Language, LanguageVariant> {
    let mut map = BTreeMap::new();
    map.insert(
        Language::Spanish,
        LanguageVariant {
            keywords: words(es),
            ..Default::default()
        },
    );
    map.insert(
        Language::French,
        LanguageVariant {
            keywords: words(fr),
            ..Default::default()
        },
    );
    map
}

fn simple(
    id: CategoryId,
    name: &str,
    description: &str,
    weight: f64,
    severity: Severity,
    en: &[&str],
    es: &[&str],
    fr: &[&str],
) -> CategoryDefinition {
    CategoryDefinition {
        id,
        name: name.to_string(),
        description: description.to_string(),
        weight,
        severity,
        keywords: words(en),
        demographic: None,
        languages: keyword_variants(es, fr),
    }
}

fn demographic() -> CategoryDefinition {
    let mut languages = BTreeMap::new();
    languages.insert(
        Language::Spanish,
        LanguageVariant {
            keywords: Vec::new(),
            demographic: Some(lexicon(
                DEMO_ABSTRACT_ES,
                DEMO_SPECIFIC_ES,
                DEMO_NEGATIVE_ES,
                DEMO_AMPLIFIERS_ES,
            )),
            cultural_context: words(DEMO_CULTURAL_ES),
        },
    );
    languages.insert(
        Language::French,
        LanguageVariant {
            keywords: Vec::new(),
            demographic: Some(lexicon(
                DEMO_ABSTRACT_FR,
                DEMO_SPECIFIC_FR,
                DEMO_NEGATIVE_FR,
                DEMO_AMPLIFIERS_FR,
            )),
            cultural_context: words(DEMO_CULTURAL_FR),
        },
    );

    CategoryDefinition {
        id: CategoryId::Demographic,
        name: "Demographic".to_string(),
        description: "Generalizations about race, gender, religion or nationality".to_string(),
        weight: 1.0,
        severity: Severity::Critical,
        keywords: Vec::new(),
        demographic: Some(lexicon(
            DEMO_ABSTRACT_EN,
            DEMO_SPECIFIC_EN,
            DEMO_NEGATIVE_EN,
            DEMO_AMPLIFIERS_EN,
        )),
        languages,
    }
}

fn builtin_categories() -> Vec<CategoryDefinition> {
    vec![
        demographic(),
        simple(
            CategoryId::Socioeconomic,
            "Socioeconomic",
            "Class and income stereotypes",
            0.8,
            Severity::High,
            SOCIOECONOMIC_EN,
            SOCIOECONOMIC_ES,
            SOCIOECONOMIC_FR,
        ),
        simple(
            CategoryId::Geographic,
            "Geographic",
            "Regional and national-development stereotypes",
            0.7,
            Severity::Medium,
            GEOGRAPHIC_EN,
            GEOGRAPHIC_ES,
            GEOGRAPHIC_FR,
        ),
        simple(
            CategoryId::Algorithmic,
            "Algorithmic",
            "Uncritical reliance on automated or data-driven judgments",
            0.75,
            Severity::Medium,
            ALGORITHMIC_EN,
            ALGORITHMIC_ES,
            ALGORITHMIC_FR,
        ),
        simple(
            CategoryId::Linguistic,
            "Linguistic",
            "Accent, dialect and language-proficiency judgments",
            0.65,
            Severity::Medium,
            LINGUISTIC_EN,
            LINGUISTIC_ES,
            LINGUISTIC_FR,
        ),
        simple(
            CategoryId::Temporal,
            "Temporal",
            "Age and generational stereotypes",
            0.6,
            Severity::Low,
            TEMPORAL_EN,
            TEMPORAL_ES,
            TEMPORAL_FR,
        ),
        simple(
            CategoryId::CriminalJustice,
            "Criminal justice",
            "Criminality framing of people or groups",
            0.85,
            Severity::High,
            CRIMINAL_JUSTICE_EN,
            CRIMINAL_JUSTICE_ES,
            CRIMINAL_JUSTICE_FR,
        ),
    ]
}

// =============================================================================
// TESTS
// =============================================================================
