//! Final weighted score: blends rule-based category proxies with an optional,
//! untrusted AI assessment and applies the hard overrides.

use serde::{Deserialize, Serialize};

use crate::analysis::config::ValidatorConfig;
use crate::analysis::models::{clamp_score, Confidence};
use crate::analysis::parseability::{FindingKind, ParseabilityResult};

pub const AI_UNAVAILABLE_MESSAGE: &str =
    "AI review was unavailable, so this score is based on rule checks only.";

/// Scores as returned by the language model. Nothing here is trusted: every field
/// may be missing and every number is clamped before use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiResult {
    pub overall_score: Option<f64>,
    #[serde(alias = "format")]
    pub format_score: Option<f64>,
    #[serde(alias = "keywords", alias = "keyword")]
    pub keyword_score: Option<f64>,
    #[serde(alias = "contact")]
    pub contact_score: Option<f64>,
    #[serde(alias = "content")]
    pub content_score: Option<f64>,
    pub suggestions: Vec<String>,
    pub critical_issues: Vec<String>,
    pub warnings: Vec<String>,
}

fn clamp_ai(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite()).map(|v| v.clamp(0.0, 100.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub parseability: u8,
    pub format: u8,
    pub keyword: u8,
    pub contact: u8,
    pub content: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOverride {
    /// Nothing could be parsed, so nothing else matters.
    Unparseable,
    ScannedCeiling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalAnalysis {
    pub overall_score: u8,
    pub confidence: Confidence,
    pub category_scores: CategoryScores,
    pub critical_issues: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub ai_unavailable: bool,
    pub override_applied: Option<ScoreOverride>,
}

/// Rule-only estimates for the categories the AI also scores.
fn rule_proxies(p: &ParseabilityResult) -> CategoryScores {
    let d = &p.details;

    let mut format: i64 = 100;
    if d.format.is_scanned_image {
        format -= 60;
    }
    if d.format.has_tables {
        format -= 20;
    }
    format -= match d.format.multi_column_confidence {
        Confidence::High => 20,
        Confidence::Medium => 10,
        Confidence::Low => 0,
    };

    let mut contact: i64 = 0;
    if d.contact.has_email {
        contact += 45;
    }
    if d.contact.has_phone {
        contact += 35;
    }
    if d.contact.contact_at_top() && !d.contact.may_be_in_pdf_header {
        contact += 20;
    }

    let mut content: i64 = 40;
    if d.bullets.is_optimal {
        content += 20;
    }
    if d.metrics.has_metrics {
        content += 20;
    }
    if d.summary.has_summary {
        content += 10;
    }
    if d.dates.has_valid_dates {
        content += 10;
    }

    let mut keyword: i64 = 50;
    if d.experience.is_experienced {
        keyword += 20;
    }
    if d.metrics.has_metrics {
        keyword += 15;
    }
    if d.bullets.is_optimal {
        keyword += 15;
    }

    CategoryScores {
        parseability: p.score,
        format: clamp_score(format),
        keyword: clamp_score(keyword),
        contact: clamp_score(contact),
        content: clamp_score(content),
    }
}

fn blend(rule: u8, ai: Option<f64>, ai_share: f64) -> u8 {
    match ai {
        Some(ai) => {
            let share = ai_share.clamp(0.0, 1.0);
            clamp_score((share * ai + (1.0 - share) * f64::from(rule)).round() as i64)
        }
        None => rule,
    }
}

/// Appends `items` to `out`, skipping blanks and case-insensitive duplicates.
fn extend_unique<'a>(out: &mut Vec<String>, items: impl IntoIterator<Item = &'a str>) {
    for item in items {
        let item = item.trim();
        if item.is_empty() || out.iter().any(|o| o.eq_ignore_ascii_case(item)) {
            continue;
        }
        out.push(item.to_string());
    }
}

pub fn validate(
    parseability: &ParseabilityResult,
    ai: Option<&AiResult>,
    config: &ValidatorConfig,
) -> FinalAnalysis {
    let rules = rule_proxies(parseability);

    // A missing AI sub-score falls back to the AI overall, then to the rule proxy.
    let ai_overall = ai.and_then(|a| clamp_ai(a.overall_score));
    let ai_score = |pick: fn(&AiResult) -> Option<f64>| {
        ai.and_then(|a| clamp_ai(pick(a)).or(ai_overall))
    };

    let scores = CategoryScores {
        parseability: rules.parseability,
        format: blend(rules.format, ai_score(|a| a.format_score), config.ai_blend),
        keyword: blend(rules.keyword, ai_score(|a| a.keyword_score), config.ai_blend),
        contact: blend(rules.contact, ai_score(|a| a.contact_score), config.ai_blend),
        content: blend(rules.content, ai_score(|a| a.content_score), config.ai_blend),
    };

    let w = &config.weights;
    let weighted = w.parseability * f64::from(scores.parseability)
        + w.format * f64::from(scores.format)
        + w.keyword * f64::from(scores.keyword)
        + w.contact * f64::from(scores.contact)
        + w.content * f64::from(scores.content);
    let mut overall = clamp_score(weighted.round() as i64);

    let mut override_applied = None;
    if parseability.score == 0 {
        overall = 0;
        override_applied = Some(ScoreOverride::Unparseable);
    } else if parseability.has_finding(FindingKind::ScannedImage) && overall > config.scanned_ceiling
    {
        overall = config.scanned_ceiling.min(100);
        override_applied = Some(ScoreOverride::ScannedCeiling);
    }

    let ai_unavailable = ai.is_none();
    let confidence = if ai_unavailable {
        parseability.confidence.downgrade()
    } else {
        parseability.confidence
    };

    let mut critical_issues = Vec::new();
    extend_unique(
        &mut critical_issues,
        parseability.critical_issues.iter().map(String::as_str),
    );
    let mut warnings = Vec::new();
    extend_unique(&mut warnings, parseability.warnings.iter().map(String::as_str));
    let mut suggestions = Vec::new();
    extend_unique(
        &mut suggestions,
        parseability.findings.iter().map(|f| f.kind.suggestion()),
    );

    match ai {
        Some(ai) => {
            extend_unique(&mut critical_issues, ai.critical_issues.iter().map(String::as_str));
            extend_unique(&mut warnings, ai.warnings.iter().map(String::as_str));
            extend_unique(&mut suggestions, ai.suggestions.iter().map(String::as_str));
        }
        None => extend_unique(&mut warnings, [AI_UNAVAILABLE_MESSAGE]),
    }

    FinalAnalysis {
        overall_score: overall,
        confidence,
        category_scores: scores,
        critical_issues,
        warnings,
        suggestions,
        ai_unavailable,
        override_applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::config::AnalysisConfig;
    use crate::analysis::parseability::{analyze_document, fixtures};
    use crate::extraction::{KnownPageCount, NoPageCount, MIME_PDF};
    use pretty_assertions::assert_eq;

    fn strong() -> ParseabilityResult {
        analyze_document(
            &fixtures::strong_resume(),
            MIME_PDF,
            &KnownPageCount(2),
            &AnalysisConfig::default(),
        )
    }

    fn ai(score: f64) -> AiResult {
        AiResult {
            overall_score: Some(score),
            format_score: Some(score),
            keyword_score: Some(score),
            contact_score: Some(score),
            content_score: Some(score),
            ..Default::default()
        }
    }

    #[test]
    fn test_unparseable_overrides_ai() {
        let empty = analyze_document("", MIME_PDF, &NoPageCount, &AnalysisConfig::default());
        assert_eq!(empty.score, 0);
        let result = validate(&empty, Some(&ai(95.0)), &ValidatorConfig::default());
        assert_eq!(result.overall_score, 0);
        assert_eq!(result.override_applied, Some(ScoreOverride::Unparseable));
        assert!(!result.ai_unavailable);
    }

    #[test]
    fn test_rules_only_when_ai_missing() {
        let p = strong();
        let result = validate(&p, None, &ValidatorConfig::default());
        assert!(result.ai_unavailable);
        assert!(result.warnings.iter().any(|w| w == AI_UNAVAILABLE_MESSAGE));
        assert_eq!(result.confidence, p.confidence.downgrade());
        assert_eq!(result.category_scores.format, 100);
        assert_eq!(result.category_scores.contact, 100);
        // bullets, metrics and dates, no summary
        assert_eq!(result.category_scores.content, 90);
        assert_eq!(result.override_applied, None);
    }

    #[test]
    fn test_blend_uses_ai_share() {
        let p = strong();
        let result = validate(&p, Some(&ai(50.0)), &ValidatorConfig::default());
        // 0.6 * 50 + 0.4 * 100
        assert_eq!(result.category_scores.format, 70);
        assert_eq!(result.category_scores.parseability, p.score);
        assert_eq!(result.confidence, p.confidence);
    }

    #[test]
    fn test_ai_overall_fills_missing_subscores() {
        let p = strong();
        let partial = AiResult {
            overall_score: Some(0.0),
            ..Default::default()
        };
        let result = validate(&p, Some(&partial), &ValidatorConfig::default());
        assert_eq!(result.category_scores.format, 40);
    }

    #[test]
    fn test_ai_values_are_clamped() {
        let p = strong();
        let wild = AiResult {
            format_score: Some(400.0),
            contact_score: Some(-30.0),
            content_score: Some(f64::NAN),
            ..Default::default()
        };
        let result = validate(&p, Some(&wild), &ValidatorConfig::default());
        assert_eq!(result.category_scores.format, 100);
        assert_eq!(result.category_scores.contact, 40);
        assert_eq!(result.category_scores.content, 90);
        assert!(result.overall_score <= 100);
    }

    #[test]
    fn test_scanned_documents_are_capped() {
        let mut config = AnalysisConfig::default();
        config.format.multi_page_min_chars = 100_000;
        let p = analyze_document(
            &fixtures::strong_resume(),
            MIME_PDF,
            &KnownPageCount(2),
            &config,
        );
        assert!(p.has_finding(FindingKind::ScannedImage));
        assert!(p.score > 0);
        let result = validate(&p, Some(&ai(100.0)), &config.validator);
        assert_eq!(result.overall_score, 35);
        assert_eq!(result.override_applied, Some(ScoreOverride::ScannedCeiling));
    }

    #[test]
    fn test_suggestions_follow_findings_then_ai() {
        let p = strong();
        let mut assessment = ai(80.0);
        assessment.suggestions = vec![
            "Add a short professional summary under a 'Summary' heading.".into(),
            "Tailor keywords to the job description.".into(),
            "   ".into(),
        ];
        let result = validate(&p, Some(&assessment), &ValidatorConfig::default());
        assert_eq!(
            result.suggestions,
            vec![
                FindingKind::MissingSummary.suggestion().to_string(),
                "Tailor keywords to the job description.".to_string(),
            ]
        );
    }

    #[test]
    fn test_ai_result_accepts_short_field_names() {
        let parsed: AiResult =
            serde_json::from_str(r#"{"overall_score": 72, "keywords": 60, "format": 80}"#).unwrap();
        assert_eq!(parsed.keyword_score, Some(60.0));
        assert_eq!(parsed.format_score, Some(80.0));
        assert!(parsed.suggestions.is_empty());
    }
}
