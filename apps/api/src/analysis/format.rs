//! Layout defects that break ATS extraction: image-only PDFs, tables and
//! multi-column layouts. Everything here works on extracted text alone.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::config::FormatConfig;
use crate::analysis::models::Confidence;
use crate::extraction::MIME_PDF;

lazy_static! {
    static ref COLUMN_SPLIT: Regex = Regex::new(r"\t+| {3,}").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    LikelyScanned,
    NotScanned,
    /// Text is long enough for one page but the page count was unavailable.
    CouldNotVerify,
    /// Only PDFs can be image-only.
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatReport {
    pub is_scanned_image: bool,
    pub scan_status: ScanStatus,
    pub char_count: usize,
    pub page_count: Option<usize>,
    pub has_tables: bool,
    pub table_line_count: usize,
    pub has_multi_column: bool,
    pub multi_column_confidence: Confidence,
    pub suspicious_lines: usize,
    pub examined_lines: usize,
}

/// Runs the three layout checks. `pages` is the already-resolved page count, if any.
pub fn detect_format(
    text: &str,
    mime_type: &str,
    pages: Option<usize>,
    config: &FormatConfig,
) -> FormatReport {
    let char_count = text.trim().chars().count();
    let scan_status = scan_status(char_count, mime_type, pages, config);
    let table_line_count = count_table_lines(text, config);
    let columns = ColumnScan::run(text, config);

    FormatReport {
        is_scanned_image: scan_status == ScanStatus::LikelyScanned,
        scan_status,
        char_count,
        page_count: pages,
        has_tables: table_line_count >= config.table_min_lines,
        table_line_count,
        has_multi_column: columns.confidence >= Confidence::Medium,
        multi_column_confidence: columns.confidence,
        suspicious_lines: columns.suspicious,
        examined_lines: columns.examined,
    }
}

fn scan_status(
    char_count: usize,
    mime_type: &str,
    pages: Option<usize>,
    config: &FormatConfig,
) -> ScanStatus {
    if mime_type != MIME_PDF {
        return ScanStatus::NotApplicable;
    }
    if char_count < config.single_page_min_chars {
        return ScanStatus::LikelyScanned;
    }
    match pages {
        None => ScanStatus::CouldNotVerify,
        Some(p) if p > 1 && char_count < config.multi_page_min_chars => ScanStatus::LikelyScanned,
        Some(_) => ScanStatus::NotScanned,
    }
}

/// Lines that split into enough columns on tabs or 3+ space runs.
fn count_table_lines(text: &str, config: &FormatConfig) -> usize {
    text.lines()
        .filter(|line| line.contains('\t') || line.contains("   "))
        .filter(|line| {
            COLUMN_SPLIT
                .split(line.trim())
                .filter(|cell| !cell.trim().is_empty())
                .count()
                >= config.table_min_columns
        })
        .count()
}

struct ColumnScan {
    suspicious: usize,
    examined: usize,
    confidence: Confidence,
}

impl ColumnScan {
    fn run(text: &str, config: &FormatConfig) -> Self {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
            .take(config.column_window)
            .collect();
        let lens: Vec<usize> = lines.iter().map(|l| l.trim().chars().count()).collect();

        let mut flagged = BTreeSet::new();

        for i in 0..lens.len().saturating_sub(1) {
            if lens[i] < config.short_line_max && lens[i + 1] > config.long_line_min {
                flagged.insert(i + 1);
            }
        }

        let gap = " ".repeat(config.inner_gap_min);
        for (i, line) in lines.iter().enumerate() {
            if line.trim().contains(&gap) {
                flagged.insert(i);
            }
        }

        for i in 1..lens.len().saturating_sub(1) {
            let (a, b, c) = (lens[i - 1], lens[i], lens[i + 1]);
            let zig = b.abs_diff(a) > config.zigzag_delta && b.abs_diff(c) > config.zigzag_delta;
            let alternates = (b > a) == (b > c);
            if zig && alternates {
                flagged.insert(i);
            }
        }

        let suspicious = flagged.len();
        let examined = lines.len();
        let ratio = if examined == 0 {
            0.0
        } else {
            suspicious as f64 / examined as f64
        };

        let confidence =
            if suspicious >= config.column_high_lines && ratio >= config.column_high_ratio {
                Confidence::High
            } else if suspicious >= config.column_medium_lines && ratio >= config.column_medium_ratio
            {
                Confidence::Medium
            } else {
                Confidence::Low
            };

        Self {
            suspicious,
            examined,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(words: usize) -> String {
        vec!["word"; words].join(" ")
    }

    #[test]
    fn test_short_pdf_is_scanned() {
        let report = detect_format("J", MIME_PDF, Some(1), &FormatConfig::default());
        assert!(report.is_scanned_image);
    }

    #[test]
    fn test_multi_page_threshold() {
        let text = filler(60); // ~300 chars
        let config = FormatConfig::default();
        assert!(detect_format(&text, MIME_PDF, Some(2), &config).is_scanned_image);
        assert_eq!(
            detect_format(&text, MIME_PDF, Some(1), &config).scan_status,
            ScanStatus::NotScanned
        );
    }

    #[test]
    fn test_page_count_failure_degrades() {
        let text = filler(60);
        let report = detect_format(&text, MIME_PDF, None, &FormatConfig::default());
        assert_eq!(report.scan_status, ScanStatus::CouldNotVerify);
        assert!(!report.is_scanned_image);
    }

    #[test]
    fn test_scan_check_only_for_pdf() {
        let report = detect_format("", "text/plain", None, &FormatConfig::default());
        assert_eq!(report.scan_status, ScanStatus::NotApplicable);
        assert!(!report.is_scanned_image);
    }

    #[test]
    fn test_tables_detected() {
        let text = "Skill   Level   Years\nRust   Expert   5\nGo\tAdvanced\t3\nSQL   Good   7\n";
        let report = detect_format(text, "text/plain", None, &FormatConfig::default());
        assert_eq!(report.table_line_count, 4);
        assert!(report.has_tables);
    }

    #[test]
    fn test_two_column_gaps_not_enough_for_table() {
        let text = "Name   Value\nRole   Engineer\nCity   Berlin\n";
        let report = detect_format(text, "text/plain", None, &FormatConfig::default());
        assert_eq!(report.table_line_count, 0);
        assert!(!report.has_tables);
    }

    #[test]
    fn test_multi_column_layout_high() {
        let mut text = String::new();
        for i in 0..20 {
            text.push_str(&format!("Skill {i}        Designed and shipped services\n"));
        }
        let report = detect_format(&text, "text/plain", None, &FormatConfig::default());
        assert_eq!(report.suspicious_lines, 20);
        assert_eq!(report.multi_column_confidence, Confidence::High);
        assert!(report.has_multi_column);
    }

    #[test]
    fn test_single_column_prose_is_low() {
        let line = "Built and operated the payments platform serving European merchants.";
        let text = vec![line; 30].join("\n");
        let report = detect_format(&text, "text/plain", None, &FormatConfig::default());
        assert_eq!(report.suspicious_lines, 0);
        assert_eq!(report.multi_column_confidence, Confidence::Low);
        assert!(!report.has_multi_column);
    }

    #[test]
    fn test_zigzag_lengths_flagged() {
        let long = "x".repeat(80);
        let text = format!("ab\n{long}\ncd\n{long}\nef\n");
        let report = detect_format(&text, "text/plain", None, &FormatConfig::default());
        assert_eq!(report.suspicious_lines, 3);
    }

    #[test]
    fn test_empty_text() {
        let report = detect_format("", MIME_PDF, None, &FormatConfig::default());
        assert!(report.is_scanned_image);
        assert!(!report.has_tables);
        assert_eq!(report.examined_lines, 0);
    }
}
