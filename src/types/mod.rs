//! Core types for BiasLens

mod category;
mod text;
mod pattern;
mod stats;
mod calibration;
mod counterfactual;
mod history;
mod howlround;
mod output;

pub use category::{
    CategoryDefinition, CategoryFamily, CategoryId, DemographicLexicon, Language, LanguageVariant,
    Severity,
};
pub use text::{LanguageHits, PreprocessedText};
pub use pattern::{CombinedResult, DemographicBreakdown, PatternMatch};
pub use stats::{ConfidenceInterval, DisparateImpact, EffectMagnitude, StatisticalSummary};
pub use calibration::{CalibrationQuality, CalibrationReport, CalibrationState, CalibrationStatus};
pub use counterfactual::{Consistency, CounterfactualCase, CounterfactualReport, CounterfactualVerdict};
pub use history::{HistoryBuffer, HistoryEntry, HISTORY_CAPACITY};
pub use howlround::{HowlroundAction, HowlroundReport, PatternConfidences};
pub use output::{AnalysisOptions, AnalysisRequest, AnalysisResult, RiskLevel};
