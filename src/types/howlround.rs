//! Howlround pattern confidences, actions and per-call report

use serde::{Deserialize, Serialize};

use crate::{ACTION_IMMEDIATE, ACTION_MODERATE, ACTION_MONITORING, ACTION_STRONG};

/// Confidence (0-1) of each drift pattern over the detection window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternConfidences {
    /// Share of adjacent pairs rising by more than 5
    pub escalation: f64,
    /// Share of triplets flipping direction with |delta| > 10 both ways
    pub oscillation: f64,
    /// Persistent high, flat scores
    pub lock_in: f64,
    /// Repeated (score, pattern count, severity) signatures
    pub recursive: f64,
}

impl PatternConfidences {
    pub fn as_array(&self) -> [f64; 4] {
        [self.escalation, self.oscillation, self.lock_in, self.recursive]
    }

    pub fn max(&self) -> f64 {
        self.as_array().iter().cloned().fold(0.0, f64::max)
    }

    pub fn mean(&self) -> f64 {
        self.as_array().iter().sum::<f64>() / 4.0
    }

    /// Names of patterns with non-zero confidence
    pub fn active(&self) -> Vec<&'static str> {
        let names = ["escalation", "oscillation", "lock_in", "recursive"];
        names
            .iter()
            .zip(self.as_array())
            .filter(|(_, c)| *c > 0.0)
            .map(|(n, _)| *n)
            .collect()
    }
}

/// Recommended response to the current confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HowlroundAction {
    None,
    Monitoring,
    ModerateAttenuation,
    StrongAttenuation,
    ImmediateAttenuation,
}

impl HowlroundAction {
    /// Monotone mapping at 0.25 / 0.5 / 0.75 / 0.9
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= ACTION_IMMEDIATE {
            Self::ImmediateAttenuation
        } else if confidence >= ACTION_STRONG {
            Self::StrongAttenuation
        } else if confidence >= ACTION_MODERATE {
            Self::ModerateAttenuation
        } else if confidence >= ACTION_MONITORING {
            Self::Monitoring
        } else {
            Self::None
        }
    }

    /// Code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::None => "H000_NONE",
            Self::Monitoring => "H001_MONITORING",
            Self::ModerateAttenuation => "H002_MODERATE_ATTENUATION",
            Self::StrongAttenuation => "H003_STRONG_ATTENUATION",
            Self::ImmediateAttenuation => "H004_IMMEDIATE_ATTENUATION",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "No drift pattern",
            Self::Monitoring => "Drift pattern forming",
            Self::ModerateAttenuation => "Moderate drift, damping scores",
            Self::StrongAttenuation => "Howlround detected",
            Self::ImmediateAttenuation => "Runaway howlround",
        }
    }
}

impl std::fmt::Display for HowlroundAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

/// Guard outcome for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HowlroundReport {
    /// Entries in the detection window (including this call)
    pub window_size: usize,
    pub patterns: PatternConfidences,
    /// 0.6 · max + 0.4 · mean
    pub confidence: f64,
    pub detected: bool,
    pub action: HowlroundAction,
    /// β_dynamic in [0, 1]
    pub attenuation_factor: f64,
    pub score_before: f64,
    pub score_after: f64,
}

impl HowlroundReport {
    /// True when β lowered the score below its plain rounding
    pub fn attenuation_applied(&self) -> bool {
        self.attenuation_factor > 0.0 && self.score_after < self.score_before.round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_thresholds_are_monotone() {
        let steps = [0.0, 0.24, 0.25, 0.5, 0.75, 0.9, 1.0];
        let actions: Vec<_> = steps.iter().map(|c| HowlroundAction::from_confidence(*c)).collect();
        assert!(actions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(actions[0], HowlroundAction::None);
        assert_eq!(actions[2], HowlroundAction::Monitoring);
        assert_eq!(actions[3], HowlroundAction::ModerateAttenuation);
        assert_eq!(actions[4], HowlroundAction::StrongAttenuation);
        assert_eq!(actions[5], HowlroundAction::ImmediateAttenuation);
    }

    #[test]
    fn test_pattern_aggregates() {
        let p = PatternConfidences {
            escalation: 0.0,
            oscillation: 0.0,
            lock_in: 0.8,
            recursive: 0.4,
        };
        assert!((p.max() - 0.8).abs() < 1e-12);
        assert!((p.mean() - 0.3).abs() < 1e-12);
        assert_eq!(p.active(), vec!["lock_in", "recursive"]);
    }
}
