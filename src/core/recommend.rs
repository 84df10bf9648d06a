//! Recommendation Generator: final scores and patterns → guidance strings

use crate::types::{
    CalibrationQuality, CategoryId, CombinedResult, CounterfactualReport, HowlroundAction,
    HowlroundReport, StatisticalSummary,
};

pub const NO_BIAS_MESSAGE: &str = "No significant bias patterns detected.";

fn category_advice(category: CategoryId) -> &'static str {
    match category {
        CategoryId::Demographic => {
            "Replace generalizations about demographic groups with claims about specific individuals or sourced data."
        }
        CategoryId::Socioeconomic => {
            "Avoid tying character or ability to income or class; describe circumstances instead."
        }
        CategoryId::Geographic => {
            "Name specific places and conditions rather than ranking regions or countries."
        }
        CategoryId::Algorithmic => {
            "State how automated decisions are audited and who is accountable for their errors."
        }
        CategoryId::Linguistic => {
            "Judge content, not accent, dialect or fluency."
        }
        CategoryId::Temporal => {
            "Drop age and generation stereotypes; describe the behaviour that matters."
        }
        CategoryId::CriminalJustice => {
            "Use person-first language and avoid presenting people as inherently criminal."
        }
    }
}

/// Guidance lines in a stable order: categories, statistics, counterfactual,
/// howlround, calibration
pub fn generate(
    combined: &CombinedResult,
    statistics: &StatisticalSummary,
    counterfactual: &CounterfactualReport,
    howlround: Option<&HowlroundReport>,
    calibration_quality: Option<CalibrationQuality>,
) -> Vec<String> {
    if combined.is_empty() {
        return vec![NO_BIAS_MESSAGE.to_string()];
    }

    let mut out: Vec<String> = combined
        .active()
        .map(|m| format!("[{}] {}", m.category, category_advice(m.category)))
        .collect();

    if statistics.significant {
        out.push(format!(
            "Bias signal is statistically significant (p = {:.3}); review before publishing.",
            statistics.p_value
        ));
    }

    if let Some(impact) = &statistics.disparate_impact {
        if impact.flagged {
            out.push(format!(
                "Four-fifths rule violated (ratio {:.2}); bias concentrates in {} of {} categories.",
                impact.ratio, impact.selected_groups, impact.group_count
            ));
        }
    }

    if counterfactual.is_systematic() {
        out.push(
            "Bias persists when the named group is swapped: the framing itself is biased, not one term."
                .to_string(),
        );
    }

    if let Some(report) = howlround {
        if report.action >= HowlroundAction::ModerateAttenuation {
            out.push(format!(
                "{} (confidence {:.2}); scores were damped from {:.0} to {:.0}.",
                report.action.description(),
                report.confidence,
                report.score_before,
                report.score_after
            ));
        }
    }

    match calibration_quality {
        Some(CalibrationQuality::Failed) => {
            out.push("Calibration failed; scores are uncorrected for tool bias.".to_string())
        }
        Some(CalibrationQuality::Poor) => out.push(
            "Calibration quality is poor; treat tool-bias correction as approximate.".to_string(),
        ),
        _ => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{combine, StatisticalValidator};
    use crate::types::{Language, PatternMatch, Severity};

    fn m(category: CategoryId, score: f64) -> PatternMatch {
        PatternMatch {
            category,
            matched_terms: vec!["x".into()],
            score,
            weight: 1.0,
            severity: Severity::from_score(score),
            language: Language::English,
            confidence: 0.55,
            demographic: None,
        }
    }

    #[test]
    fn test_nothing_matched_gives_single_line() {
        let combined = CombinedResult::empty();
        let stats = StatisticalValidator::default().validate(&combined);
        let out = generate(
            &combined,
            &stats,
            &CounterfactualReport::skipped("none"),
            None,
            Some(CalibrationQuality::Failed),
        );
        assert_eq!(out, vec![NO_BIAS_MESSAGE.to_string()]);
    }

    #[test]
    fn test_one_line_per_category_plus_flags() {
        let combined = combine(vec![m(CategoryId::Demographic, 95.0), m(CategoryId::Temporal, 9.0)]);
        let stats = StatisticalValidator::default().validate(&combined);
        let out = generate(
            &combined,
            &stats,
            &CounterfactualReport::skipped("none"),
            None,
            Some(CalibrationQuality::Poor),
        );
        assert!(out[0].starts_with("[demographic]"));
        assert!(out[1].starts_with("[temporal]"));
        assert!(out.iter().any(|l| l.contains("Four-fifths")));
        assert!(out.last().unwrap().contains("poor"));
    }
}
