//! Runtime configuration for one analyzer session

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::ReferenceCorpus;
use crate::error::{BiasError, BiasResult};
use crate::types::HISTORY_CAPACITY;

/// Tunables that vary per deployment. Fixed scoring constants live at
/// the crate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Ring-buffer size for howlround history.
    /// Default: 20.
    pub history_capacity: usize,

    /// Entries (including the current call) needed before patterns are scored.
    /// Default: 3.
    pub window_min: usize,

    /// Largest detection window, current call included.
    /// Default: 8.
    pub window_max: usize,

    /// Overall confidence at which a howlround counts as detected.
    /// Default: 0.75.
    pub howlround_threshold: f64,

    /// Calibration cache lifetime in seconds.
    /// Default: 86400 (24 h).
    pub calibration_ttl_secs: u64,

    /// p-value below which a score set is significant.
    /// Default: 0.05.
    pub significance_level: f64,

    /// Run the group-substitution check when a demographic match exists.
    /// Default: true.
    pub counterfactual_enabled: bool,

    /// Reference sentences for calibration; None uses the built-in corpus.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_corpus: Option<ReferenceCorpus>,

    /// JSON pattern library replacing the built-in catalogue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_library: Option<PathBuf>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            history_capacity: HISTORY_CAPACITY,
            window_min: 3,
            window_max: 8,
            howlround_threshold: 0.75,
            calibration_ttl_secs: 24 * 60 * 60,
            significance_level: 0.05,
            counterfactual_enabled: true,
            reference_corpus: None,
            pattern_library: None,
        }
    }
}

impl AnalyzerConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> BiasResult<()> {
        if self.history_capacity < 1 {
            return Err(BiasError::Config(format!(
                "history_capacity must be >= 1, got {}",
                self.history_capacity
            )));
        }
        if self.window_min < 3 {
            return Err(BiasError::Config(format!(
                "window_min must be >= 3, got {}",
                self.window_min
            )));
        }
        if self.window_max < self.window_min {
            return Err(BiasError::Config(format!(
                "window_max ({}) must be >= window_min ({})",
                self.window_max, self.window_min
            )));
        }
        if self.window_max > self.history_capacity + 1 {
            return Err(BiasError::Config(format!(
                "window_max ({}) exceeds history_capacity + 1 ({})",
                self.window_max,
                self.history_capacity + 1
            )));
        }
        if !(self.howlround_threshold > 0.0 && self.howlround_threshold <= 1.0) {
            return Err(BiasError::Config(format!(
                "howlround_threshold must be in (0, 1], got {}",
                self.howlround_threshold
            )));
        }
        if self.calibration_ttl_secs == 0 {
            return Err(BiasError::Config(
                "calibration_ttl_secs must be > 0".to_string(),
            ));
        }
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(BiasError::Config(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            )));
        }
        if let Some(corpus) = &self.reference_corpus {
            corpus.validate()?;
        }
        Ok(())
    }

    /// Calibration TTL as a chrono duration.
    pub fn calibration_ttl(&self) -> chrono::Duration {
        let secs = i64::try_from(self.calibration_ttl_secs).unwrap_or(i64::MAX / 1000);
        chrono::Duration::seconds(secs)
    }

    /// Load from JSON string; missing fields take their defaults.
    pub fn from_json(json: &str) -> BiasResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BiasError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> BiasResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history_capacity, 20);
        assert_eq!(config.calibration_ttl(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_window_bounds_checked() {
        let config = AnalyzerConfig {
            window_min: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalyzerConfig {
            window_min: 5,
            window_max: 4,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_range() {
        let config = AnalyzerConfig {
            howlround_threshold: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = AnalyzerConfig::from_json(r#"{"history_capacity": 10}"#).unwrap();
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.window_max, 8);
        assert!(config.counterfactual_enabled);
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(AnalyzerConfig::from_json(r#"{"history_capacity": 0}"#).is_err());
        assert!(AnalyzerConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"calibration_ttl_secs": 60, "counterfactual_enabled": false}}"#).unwrap();
        let config = AnalyzerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.calibration_ttl_secs, 60);
        assert!(!config.counterfactual_enabled);
    }
}
