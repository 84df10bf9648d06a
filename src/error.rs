//! Error hierarchy for the analysis pipeline
//!
//! Only failures without a safe degraded result surface here. Calibration
//! and counterfactual failures are absorbed into their result types.

use thiserror::Error;

/// Root error type for all BiasLens failures.
#[derive(Error, Debug)]
pub enum BiasError {
    /// Invalid analyzer configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Pattern library failed validation at load time.
    #[error("pattern library error: {0}")]
    Library(String),

    /// Reference-text scoring failed during calibration.
    #[error("calibration error: {0}")]
    Calibration(String),

    /// Group substitution or re-scoring failed.
    #[error("counterfactual error: {0}")]
    Counterfactual(String),

    /// NaN/Inf reached a score.
    #[error("numerical error: {0}")]
    Numerical(String),

    /// A pipeline stage failed with no fallback.
    #[error("analysis failed during {stage}: {message}")]
    Pipeline { stage: &'static str, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BiasError {
    /// Wrap an error with the pipeline stage it escaped from
    pub fn in_stage(stage: &'static str, err: impl std::fmt::Display) -> Self {
        BiasError::Pipeline {
            stage,
            message: err.to_string(),
        }
    }
}

pub type BiasResult<T> = Result<T, BiasError>;
