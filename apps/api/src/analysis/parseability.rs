//! Runs every detector once over a document and turns what they found into a
//! 0–100 parseability score with critical issues and warnings.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::bullets::{detect_bullets, BulletReport};
use crate::analysis::config::{AnalysisConfig, PenaltyConfig};
use crate::analysis::content::{
    detect_contact, detect_dates, detect_name, detect_summary, ContactReport, DateReport,
    DateStatus, NameReport, SummaryReport,
};
use crate::analysis::experience::{analyze_experience, ExperienceReport};
use crate::analysis::format::{detect_format, FormatReport, ScanStatus};
use crate::analysis::length::{analyze_length, LengthReport, LengthVerdict};
use crate::analysis::metrics::{detect_metrics, MetricsReport};
use crate::analysis::models::{clamp_score, Confidence, Section, Severity};
use crate::extraction::{PageCountSource, MIME_PDF};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    NoReadableText,
    ScannedImage,
    Tables,
    MultiColumnHigh,
    MultiColumnMedium,
    PlaceholderDates,
    MissingDates,
    MissingContact,
    ContactNotAtTop,
    ContactInPdfHeader,
    MissingName,
    MissingSummary,
    TooShort,
    TooLong,
    TooManyPages,
    InsufficientBullets,
    InsufficientMetrics,
}

impl FindingKind {
    pub fn severity(self) -> Severity {
        match self {
            FindingKind::NoReadableText
            | FindingKind::ScannedImage
            | FindingKind::Tables
            | FindingKind::MultiColumnHigh
            | FindingKind::PlaceholderDates
            | FindingKind::MissingDates
            | FindingKind::MissingContact
            | FindingKind::MissingName
            | FindingKind::TooShort => Severity::Critical,
            FindingKind::MultiColumnMedium
            | FindingKind::ContactNotAtTop
            | FindingKind::ContactInPdfHeader
            | FindingKind::MissingSummary
            | FindingKind::TooLong
            | FindingKind::TooManyPages
            | FindingKind::InsufficientBullets
            | FindingKind::InsufficientMetrics => Severity::Warning,
        }
    }

    fn penalty(self, p: &PenaltyConfig) -> i32 {
        match self {
            FindingKind::NoReadableText => p.baseline,
            FindingKind::ScannedImage => p.scanned_image,
            FindingKind::Tables => p.tables,
            FindingKind::MultiColumnHigh => p.multi_column_high,
            FindingKind::MultiColumnMedium => p.multi_column_medium,
            FindingKind::PlaceholderDates => p.placeholder_dates,
            FindingKind::MissingDates => p.missing_dates,
            FindingKind::MissingContact => p.missing_contact,
            FindingKind::ContactNotAtTop => p.contact_not_at_top,
            FindingKind::ContactInPdfHeader => p.contact_in_header,
            FindingKind::MissingName => p.missing_name,
            FindingKind::MissingSummary => p.missing_summary,
            FindingKind::TooShort => p.too_short,
            FindingKind::TooLong => p.too_long,
            FindingKind::TooManyPages => p.too_many_pages,
            FindingKind::InsufficientBullets => p.insufficient_bullets,
            FindingKind::InsufficientMetrics => p.insufficient_metrics,
        }
    }

    /// What the candidate should change to clear this finding.
    pub fn suggestion(self) -> &'static str {
        match self {
            FindingKind::NoReadableText => {
                "Export the résumé as a text-based PDF so its contents can be read."
            }
            FindingKind::ScannedImage => {
                "Replace the scanned image with a text-based PDF exported from your editor."
            }
            FindingKind::Tables => "Replace tables with plain section headings and bullet lists.",
            FindingKind::MultiColumnHigh | FindingKind::MultiColumnMedium => {
                "Use a single-column layout so sections are read in order."
            }
            FindingKind::PlaceholderDates => "Replace template dates like '20XX' with real dates.",
            FindingKind::MissingDates => "Add start and end dates to every role and degree.",
            FindingKind::MissingContact => "Add an email address and phone number.",
            FindingKind::ContactNotAtTop | FindingKind::ContactInPdfHeader => {
                "Move contact details into the body at the top of the page, not the page header."
            }
            FindingKind::MissingName => "Put your full name on the first line.",
            FindingKind::MissingSummary => {
                "Add a short professional summary under a 'Summary' heading."
            }
            FindingKind::TooShort => "Expand your experience with more detail on each role.",
            FindingKind::TooLong => "Trim older or less relevant roles to tighten the résumé.",
            FindingKind::TooManyPages => "Cut the résumé down to two pages at most.",
            FindingKind::InsufficientBullets => {
                "List achievements as bullet points under each role."
            }
            FindingKind::InsufficientMetrics => {
                "Quantify achievements with numbers, percentages or dollar amounts."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub penalty: i32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseabilityDetails {
    pub bullets: BulletReport,
    pub contact: ContactReport,
    pub dates: DateReport,
    pub name: NameReport,
    pub summary: SummaryReport,
    pub metrics: MetricsReport,
    pub format: FormatReport,
    pub experience: ExperienceReport,
    pub length: LengthReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseabilityResult {
    pub score: u8,
    pub confidence: Confidence,
    pub critical_issues: Vec<String>,
    pub warnings: Vec<String>,
    pub findings: Vec<Finding>,
    pub details: ParseabilityDetails,
}

impl ParseabilityResult {
    pub fn has_finding(&self, kind: FindingKind) -> bool {
        self.findings.iter().any(|f| f.kind == kind)
    }
}

/// Scores one document. Never fails: a page-count error only lowers confidence.
pub fn analyze_document(
    text: &str,
    mime_type: &str,
    page_source: &dyn PageCountSource,
    config: &AnalysisConfig,
) -> ParseabilityResult {
    let pages = match page_source.page_count() {
        Ok(0) => None,
        Ok(p) => Some(p),
        Err(e) if mime_type == MIME_PDF => {
            warn!("Page count unavailable, continuing without it: {e}");
            None
        }
        Err(_) => None,
    };

    let details = ParseabilityDetails {
        bullets: detect_bullets(text, &config.bullets),
        contact: detect_contact(text, &config.contact),
        dates: detect_dates(text, &config.dates),
        name: detect_name(text, &config.name),
        summary: detect_summary(text, &config.summary),
        metrics: detect_metrics(text, &config.metrics),
        format: detect_format(text, mime_type, pages, &config.format),
        experience: analyze_experience(text, &config.experience),
        length: analyze_length(text, pages, &config.length),
    };
    debug!(
        "Detectors: {} bullets, {} dates, {} metrics, {} words, {:?} columns",
        details.bullets.count,
        details.dates.date_count,
        details.metrics.metric_count,
        details.length.word_count,
        details.format.multi_column_confidence,
    );

    let findings = collect_findings(&details, &config.penalties);

    let score = if details.length.word_count == 0 {
        0
    } else {
        let penalties: i64 = findings.iter().map(|f| i64::from(f.penalty)).sum();
        clamp_score(i64::from(config.penalties.baseline) - penalties)
    };

    let (critical_issues, warnings) = findings.iter().fold(
        (Vec::new(), Vec::new()),
        |(mut critical, mut warnings), f| {
            match f.severity {
                Severity::Critical => critical.push(f.message.clone()),
                Severity::Warning => warnings.push(f.message.clone()),
            }
            (critical, warnings)
        },
    );

    ParseabilityResult {
        score,
        confidence: confidence(&details),
        critical_issues,
        warnings,
        findings,
        details,
    }
}

fn collect_findings(d: &ParseabilityDetails, penalties: &PenaltyConfig) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut fire = |kind: FindingKind, message: String| {
        findings.push(Finding {
            kind,
            severity: kind.severity(),
            penalty: kind.penalty(penalties),
            message,
        });
    };

    if d.length.word_count == 0 {
        fire(
            FindingKind::NoReadableText,
            "No readable text could be extracted from the document.".to_string(),
        );
    }

    if d.format.is_scanned_image {
        fire(
            FindingKind::ScannedImage,
            format!(
                "Document appears to be a scanned image ({} characters of text). ATS software cannot read it.",
                d.format.char_count
            ),
        );
    }
    if d.format.has_tables {
        fire(
            FindingKind::Tables,
            format!(
                "Table layout detected on {} lines. ATS parsers often scramble table cells.",
                d.format.table_line_count
            ),
        );
    }
    match d.format.multi_column_confidence {
        Confidence::High => fire(
            FindingKind::MultiColumnHigh,
            "Multi-column layout detected. Columns are often read across, mixing sections."
                .to_string(),
        ),
        Confidence::Medium => fire(
            FindingKind::MultiColumnMedium,
            "Possible multi-column layout. Check that sections read in order.".to_string(),
        ),
        Confidence::Low => {}
    }

    match d.dates.status {
        DateStatus::Placeholder => fire(FindingKind::PlaceholderDates, d.dates.message.clone()),
        DateStatus::Missing => fire(FindingKind::MissingDates, d.dates.message.clone()),
        DateStatus::Valid => {}
    }

    if !d.contact.has_contact() {
        fire(
            FindingKind::MissingContact,
            "No email address or phone number found.".to_string(),
        );
    } else if d.contact.may_be_in_pdf_header {
        fire(
            FindingKind::ContactInPdfHeader,
            "Contact details may sit in the page header, which many ATS parsers skip."
                .to_string(),
        );
    } else if !d.contact.contact_at_top() {
        fire(
            FindingKind::ContactNotAtTop,
            "Contact details are not near the top of the résumé.".to_string(),
        );
    }

    if !d.name.has_name {
        fire(
            FindingKind::MissingName,
            "Could not find your name at the top of the résumé.".to_string(),
        );
    }
    if !d.summary.has_summary {
        fire(
            FindingKind::MissingSummary,
            "No professional summary section found.".to_string(),
        );
    }

    match d.length.verdict {
        LengthVerdict::TooShort => fire(FindingKind::TooShort, d.length.message.clone()),
        LengthVerdict::TooManyWords => fire(FindingKind::TooLong, d.length.message.clone()),
        LengthVerdict::TooManyPages => fire(FindingKind::TooManyPages, d.length.message.clone()),
        LengthVerdict::Optimal => {}
    }

    if !d.bullets.is_optimal {
        let experience = d
            .bullets
            .by_section
            .get(&Section::Experience)
            .copied()
            .unwrap_or(0);
        fire(
            FindingKind::InsufficientBullets,
            format!(
                "Only {} bullet points found ({experience} under experience). Use bullets to list achievements.",
                d.bullets.count
            ),
        );
    }
    if !d.metrics.has_metrics {
        fire(
            FindingKind::InsufficientMetrics,
            format!(
                "Only {} quantified achievements found. Add numbers to show impact.",
                d.metrics.metric_count
            ),
        );
    }

    findings
}

/// Confidence drops as independent red flags accumulate.
fn confidence(d: &ParseabilityDetails) -> Confidence {
    let red_flags = [
        !d.name.has_name,
        !d.contact.has_contact(),
        d.format.is_scanned_image,
        d.format.has_tables,
        d.format.multi_column_confidence == Confidence::High,
    ]
    .into_iter()
    .filter(|&flag| flag)
    .count();

    let level = match red_flags {
        0 => Confidence::High,
        1 | 2 => Confidence::Medium,
        _ => Confidence::Low,
    };

    if d.format.scan_status == ScanStatus::CouldNotVerify {
        level.min(Confidence::Medium)
    } else {
        level
    }
}



#[cfg(test)]
mod proptests {
    use super::*;
    use crate::extraction::NoPageCount;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn score_always_in_range(text in "\\PC{0,400}") {
            let result = analyze_document(&text, MIME_PDF, &NoPageCount, &AnalysisConfig::default());
            prop_assert!(result.score <= 100);
        }

        #[test]
        fn line_oriented_text_never_panics(
            lines in prop::collection::vec("[ \\t•\\-*a-zA-Z0-9.%$@]{0,60}", 0..40)
        ) {
            let text = lines.join("\n");
            let config = AnalysisConfig::default();
            let a = analyze_document(&text, "text/plain", &NoPageCount, &config);
            let b = analyze_document(&text, "text/plain", &NoPageCount, &config);
            prop_assert_eq!(a, b);
        }
    }
}
