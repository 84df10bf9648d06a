//! BiasLens: bias scoring pipeline with howlround protection
//!
//! text → preprocess → category detectors → combiner → statistics ∥ counterfactual
//!      → baseline calibration → howlround attenuation → result + recommendations

pub mod config;
pub mod core;
pub mod error;
pub mod types;

pub use config::AnalyzerConfig;
pub use error::{BiasError, BiasResult};

// =============================================================================
// SCORE RANGE
// =============================================================================

/// Upper bound for every category, combined and final score
pub const SCORE_MAX: f64 = 100.0;

// =============================================================================
// DETECTOR SCORING [C]
// =============================================================================

/// Points per keyword for simple categories (before weight)
pub const SIMPLE_POINTS_PER_MATCH: f64 = 15.0;

/// Points per keyword for the criminal-justice category (before context + weight)
pub const CRIMINAL_JUSTICE_POINTS_PER_MATCH: f64 = 25.0;

/// Criminal-justice context multiplier adjustments
pub const CJ_LONG_TEXT_WORDS: usize = 100;
pub const CJ_LONG_TEXT_BONUS: f64 = 0.2;
pub const CJ_MANY_SENTENCES: usize = 5;
pub const CJ_MANY_SENTENCES_BONUS: f64 = 0.1;
pub const CJ_SHORT_TEXT_WORDS: usize = 10;
pub const CJ_SHORT_TEXT_PENALTY: f64 = 0.3;
pub const CJ_MULTIPLIER_MIN: f64 = 0.5;
pub const CJ_MULTIPLIER_MAX: f64 = 2.0;

/// Demographic layer points and caps
pub const DEMO_ABSTRACT_POINTS: f64 = 20.0;
pub const DEMO_ABSTRACT_CAP: f64 = 60.0;
pub const DEMO_SPECIFIC_POINTS: f64 = 40.0;
pub const DEMO_SPECIFIC_CAP: f64 = 60.0;
pub const DEMO_SENTIMENT_POINTS: f64 = 30.0;
pub const DEMO_SENTIMENT_CAP: f64 = 60.0;
pub const DEMO_AMPLIFIER_POINTS: f64 = 15.0;
pub const DEMO_AMPLIFIER_CAP: f64 = 30.0;
pub const DEMO_COMBO_BONUS: f64 = 25.0;
pub const DEMO_MULTILINGUAL_BONUS: f64 = 15.0;
pub const DEMO_CULTURAL_BONUS: f64 = 10.0;

/// Minimum indicator hits before a non-default language is detected
pub const LANGUAGE_MIN_INDICATORS: usize = 2;

// =============================================================================
// STATISTICS [C]
// =============================================================================

/// Per-group "selected" threshold for the four-fifths rule
pub const FOUR_FIFTHS_SELECTION_SCORE: f64 = 60.0;

/// Ratio below which disparate impact is flagged
pub const FOUR_FIFTHS_RATIO: f64 = 0.8;

/// Asymptotic 95% critical value (df > 30)
pub const T_CRITICAL_ASYMPTOTIC: f64 = 1.960;

// =============================================================================
// CALIBRATION [C]
// =============================================================================

/// Weight of the contextual-framing offset in the composite tool bias
pub const CONTEXTUAL_BIAS_WEIGHT: f64 = 0.5;

/// Per-category share of the tool-bias offset
pub const CALIBRATION_FACTOR_DEMOGRAPHIC: f64 = 1.0;
pub const CALIBRATION_FACTOR_REDUCED: f64 = 0.7;
pub const CALIBRATION_FACTOR_DEFAULT: f64 = 0.5;

/// Reference-score variance bounds for calibration quality grades
pub const CALIBRATION_VARIANCE_EXCELLENT: f64 = 25.0;
pub const CALIBRATION_VARIANCE_GOOD: f64 = 100.0;
pub const CALIBRATION_VARIANCE_FAIR: f64 = 225.0;

// =============================================================================
// COUNTERFACTUAL [C]
// =============================================================================

/// Standard-deviation bounds for consistency grades
pub const CONSISTENCY_SD_HIGH: f64 = 10.0;
pub const CONSISTENCY_SD_MODERATE: f64 = 25.0;
pub const CONSISTENCY_SD_LOW: f64 = 50.0;

/// Systematic-bias conjunction thresholds
pub const SYSTEMATIC_MIN_DETECTION_RATE: f64 = 0.7;
pub const SYSTEMATIC_MIN_AVERAGE_SCORE: f64 = 60.0;

// =============================================================================
// HOWLROUND DETECTION [C]
// =============================================================================

/// Rise between adjacent scores that counts as escalation
pub const ESCALATION_MIN_RISE: f64 = 5.0;

/// Minimum |delta| on both sides of an oscillation flip
pub const OSCILLATION_MIN_DELTA: f64 = 10.0;

/// Lock-in requires mean above this and SD below LOCKIN_MAX_SD
pub const LOCKIN_MIN_MEAN: f64 = 70.0;
pub const LOCKIN_MAX_SD: f64 = 5.0;

/// Overall confidence = MAX_WEIGHT·max + MEAN_WEIGHT·mean
pub const HOWLROUND_MAX_WEIGHT: f64 = 0.6;
pub const HOWLROUND_MEAN_WEIGHT: f64 = 0.4;

/// Action thresholds (monitoring / moderate / strong / immediate)
pub const ACTION_MONITORING: f64 = 0.25;
pub const ACTION_MODERATE: f64 = 0.5;
pub const ACTION_STRONG: f64 = 0.75;
pub const ACTION_IMMEDIATE: f64 = 0.9;

// =============================================================================
// ATTENUATION [C] - gated three-component damping curve
// =============================================================================

/// Activation thresholds (exponential, phi, logarithmic)
pub const ATTN_THRESHOLD_EXP: f64 = 0.625;
pub const ATTN_THRESHOLD_PHI: f64 = 0.775;
pub const ATTN_THRESHOLD_LOG: f64 = 0.875;

/// Sigmoid steepness per component
pub const ATTN_STEEPNESS_EXP: f64 = 5.0;
pub const ATTN_STEEPNESS_PHI: f64 = 3.0;
pub const ATTN_STEEPNESS_LOG: f64 = 2.0;

/// Component coefficients
pub const ATTN_COEFF_EXP: f64 = 0.8;
pub const ATTN_COEFF_PHI: f64 = 0.6;
pub const ATTN_COEFF_LOG: f64 = 0.4;

/// Exponential-decay rate inside 1 − e^(−rate·x)
pub const ATTN_EXP_RATE: f64 = 2.0;

/// Global gain on the summed components
pub const ATTN_GLOBAL_GAIN: f64 = 0.4;

/// Share of the damping applied with zero howlround confidence
pub const ATTN_CONFIDENCE_FLOOR: f64 = 0.25;

/// Components are evaluated on Wmax capped here; phi diverges at 1.0
pub const ATTN_WMAX_CEILING: f64 = 0.99;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";

/// Version tag of the built-in pattern library
pub const PATTERN_LIBRARY_VERSION: &str = "2024.1";
