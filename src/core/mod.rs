//! Core pipeline stages for BiasLens

pub mod patterns;
pub mod preprocess;
pub mod detectors;
pub mod combiner;
pub mod statistics;
pub mod calibration;
pub mod counterfactual;
pub mod howlround;
pub mod recommend;
pub mod analyzer;

pub use patterns::PatternLibrary;
pub use preprocess::{detect_language, normalize_keyword, Preprocessor};
pub use detectors::{detect_category, DetectorSet};
pub use combiner::combine;
pub use statistics::{four_fifths, StatisticalValidator};
pub use calibration::{category_factor, BaselineCalibrator, PipelineScorer, ReferenceCorpus, ReferenceScorer};
pub use counterfactual::{verdict, CounterfactualAnalyzer};
pub use howlround::{attenuate, attenuation_factor, phi, HowlroundGuard};
pub use analyzer::{input_digest, BiasAnalyzer};
