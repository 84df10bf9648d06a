//! Counterfactual (group-substitution) cases and verdicts

use serde::{Deserialize, Serialize};

use crate::{CONSISTENCY_SD_HIGH, CONSISTENCY_SD_LOW, CONSISTENCY_SD_MODERATE};

/// One group-substituted variant of the input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualCase {
    /// race / gender / religion / nationality
    pub dimension: String,
    pub original_term: String,
    pub substituted_term: String,
    pub text: String,
    pub bias_detected: bool,
    pub score: f64,
}

/// Spread of scores across original + variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    High,
    Moderate,
    Low,
    VeryLow,
}

impl Consistency {
    /// Grade a standard deviation at 10 / 25 / 50
    pub fn from_std_dev(sd: f64) -> Self {
        if sd < CONSISTENCY_SD_HIGH {
            Self::High
        } else if sd < CONSISTENCY_SD_MODERATE {
            Self::Moderate
        } else if sd < CONSISTENCY_SD_LOW {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    pub fn is_consistent(&self) -> bool {
        matches!(self, Self::High | Self::Moderate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterfactualVerdict {
    /// Bias holds regardless of which group is named
    Systematic,
    /// Bias tracks one specific term
    Inconsistent,
    NoSystematicBias,
}

impl std::fmt::Display for CounterfactualVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Systematic => "systematic",
            Self::Inconsistent => "inconsistent",
            Self::NoSystematicBias => "no_systematic_bias",
        };
        write!(f, "{}", s)
    }
}

/// Counterfactual outcome for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualReport {
    pub performed: bool,
    /// Why the check did not run (or failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub original_score: f64,
    pub cases: Vec<CounterfactualCase>,
    /// Mean over original + variant scores
    pub mean_score: f64,
    pub std_dev: f64,
    /// Share of variants still flagged
    pub detection_rate: f64,
    pub consistency: Option<Consistency>,
    pub verdict: CounterfactualVerdict,
}

impl CounterfactualReport {
    /// Check not run; carries the reason
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            performed: false,
            reason: Some(reason.into()),
            original_score: 0.0,
            cases: Vec::new(),
            mean_score: 0.0,
            std_dev: 0.0,
            detection_rate: 0.0,
            consistency: None,
            verdict: CounterfactualVerdict::NoSystematicBias,
        }
    }

    pub fn is_systematic(&self) -> bool {
        self.verdict == CounterfactualVerdict::Systematic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistency_bands() {
        assert_eq!(Consistency::from_std_dev(0.0), Consistency::High);
        assert_eq!(Consistency::from_std_dev(10.0), Consistency::Moderate);
        assert_eq!(Consistency::from_std_dev(30.0), Consistency::Low);
        assert_eq!(Consistency::from_std_dev(50.0), Consistency::VeryLow);
        assert!(Consistency::Moderate.is_consistent());
        assert!(!Consistency::Low.is_consistent());
    }

    #[test]
    fn test_skipped_report_is_not_systematic() {
        let report = CounterfactualReport::skipped("no demographic match");
        assert!(!report.performed);
        assert!(!report.is_systematic());
        assert_eq!(report.reason.as_deref(), Some("no demographic match"));
    }
}
