//! Calibration state and the metadata reported with each analysis

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{CALIBRATION_VARIANCE_EXCELLENT, CALIBRATION_VARIANCE_FAIR, CALIBRATION_VARIANCE_GOOD};

/// Lifecycle of the cached calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationStatus {
    /// Never computed; offset is zero
    Uncalibrated,
    Calibrated,
    /// Last recompute failed; offset is zero
    Failed,
}

/// Grade derived from reference-score variance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    Failed,
    Pending,
}

impl CalibrationQuality {
    pub fn from_variance(variance: f64) -> Self {
        if !variance.is_finite() {
            Self::Poor
        } else if variance < CALIBRATION_VARIANCE_EXCELLENT {
            Self::Excellent
        } else if variance < CALIBRATION_VARIANCE_GOOD {
            Self::Good
        } else if variance < CALIBRATION_VARIANCE_FAIR {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Failed => "failed",
            Self::Pending => "pending",
        }
    }
}

impl std::fmt::Display for CalibrationQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Process-wide measured tool bias (owned by the calibrator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    pub status: CalibrationStatus,
    /// Mean score of the neutral reference sentences
    pub neutral_bias: f64,
    /// Spread between positively/negatively framed and neutral framing
    pub contextual_bias: f64,
    /// neutral + 0.5 · contextual
    pub tool_bias: f64,
    pub reference_variance: f64,
    pub quality: CalibrationQuality,
    pub sample_count: usize,
    pub computed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self::empty()
    }
}

impl CalibrationState {
    /// Startup state: zero offset, never computed
    pub fn empty() -> Self {
        Self {
            status: CalibrationStatus::Uncalibrated,
            neutral_bias: 0.0,
            contextual_bias: 0.0,
            tool_bias: 0.0,
            reference_variance: 0.0,
            quality: CalibrationQuality::Pending,
            sample_count: 0,
            computed_at: None,
            error: None,
        }
    }

    /// Zero-offset state recorded after a failed recompute
    pub fn failed(reason: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            status: CalibrationStatus::Failed,
            quality: CalibrationQuality::Failed,
            computed_at: Some(at),
            error: Some(reason.into()),
            ..Self::empty()
        }
    }

    /// Never computed, or older than ttl
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match self.computed_at {
            None => true,
            Some(at) => now - at > ttl,
        }
    }

    /// Offset actually subtracted (zero unless calibrated)
    pub fn effective_bias(&self) -> f64 {
        match self.status {
            CalibrationStatus::Calibrated => self.tool_bias,
            _ => 0.0,
        }
    }
}

/// What calibration did to one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// False when bypassed by the caller
    pub applied: bool,
    pub status: CalibrationStatus,
    pub quality: CalibrationQuality,
    pub tool_bias: f64,
    /// Overall score before minus after calibration
    pub offset_applied: f64,
    pub computed_at: Option<DateTime<Utc>>,
}

impl CalibrationReport {
    pub fn bypassed() -> Self {
        Self {
            applied: false,
            status: CalibrationStatus::Uncalibrated,
            quality: CalibrationQuality::Pending,
            tool_bias: 0.0,
            offset_applied: 0.0,
            computed_at: None,
        }
    }
}
