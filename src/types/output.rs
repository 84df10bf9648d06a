//! Analysis options, result and terminal rendering

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    CalibrationReport, CombinedResult, CounterfactualReport, HowlroundReport, Language, Severity,
    StatisticalSummary,
};

/// Per-call switches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Overrides language detection
    #[serde(default)]
    pub language: Option<Language>,
    /// Skip the baseline calibrator
    #[serde(default)]
    pub skip_calibration: bool,
    /// Skip the howlround guard (no attenuation, no history entry)
    #[serde(default)]
    pub skip_history: bool,
    /// Skip the counterfactual check
    #[serde(default)]
    pub skip_counterfactual: bool,
}

impl AnalysisOptions {
    /// Only detection, combination and statistics
    pub fn raw() -> Self {
        Self {
            language: None,
            skip_calibration: true,
            skip_history: true,
            skip_counterfactual: true,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }
}

/// One line of batch input; a null or missing text is analyzed as empty
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(flatten)]
    pub options: AnalysisOptions,
}

/// Risk label for the final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Moderate,
    High,
    Severe,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Severe
        } else if score >= 60.0 {
            Self::High
        } else if score >= 40.0 {
            Self::Moderate
        } else if score >= 20.0 {
            Self::Low
        } else {
            Self::Minimal
        }
    }

    /// One level up, saturating at SEVERE
    pub fn elevated(self) -> Self {
        match self {
            Self::Minimal => Self::Low,
            Self::Low => Self::Moderate,
            Self::Moderate => Self::High,
            Self::High | Self::Severe => Self::Severe,
        }
    }

    /// ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            Self::Minimal => "\x1b[32m",  // Green
            Self::Low => "\x1b[36m",      // Cyan
            Self::Moderate => "\x1b[33m", // Yellow
            Self::High => "\x1b[35m",     // Magenta
            Self::Severe => "\x1b[31m",   // Red
        }
    }

    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Minimal => "MINIMAL",
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
            Self::Severe => "SEVERE",
        };
        write!(f, "{}", name)
    }
}

/// Everything one `analyze` call produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub timestamp: DateTime<Utc>,
    pub language: Language,
    pub word_count: usize,
    /// Detector output before calibration
    pub raw: CombinedResult,
    /// After subtracting the tool-bias offset
    pub calibrated: CombinedResult,
    pub statistics: StatisticalSummary,
    pub calibration: CalibrationReport,
    pub counterfactual: CounterfactualReport,
    /// None when the guard was bypassed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub howlround: Option<HowlroundReport>,
    /// Score returned to the caller, 0-100
    pub final_score: f64,
    pub severity: Severity,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    pub fn pattern_count(&self) -> usize {
        self.raw.pattern_count()
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.risk_level.color_code();
        let reset = RiskLevel::color_reset();
        format!("{}{}{}", color, self.summary_line(), reset)
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        self.summary_line()
    }

    fn summary_line(&self) -> String {
        let categories: Vec<&str> = self.raw.matches.iter().map(|m| m.category.code()).collect();
        let howlround = self
            .howlround
            .as_ref()
            .map(|h| h.action.code())
            .unwrap_or("OFF");
        format!(
            "score={:.0} | raw={:.1} | risk={} | severity={} | categories=[{}] | howlround={}",
            self.final_score,
            self.raw.overall_score,
            self.risk_level,
            self.severity,
            categories.join(","),
            howlround
        )
    }
}
