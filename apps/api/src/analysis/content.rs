//! Content checks: contact placement, date validity, candidate name and summary section.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::config::{ContactConfig, DateConfig, NameConfig, SummaryConfig};
use crate::analysis::patterns::{char_offset, char_prefix, is_section_header};

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").unwrap();

    /// North American / Canadian formats first, then one international format.
    static ref PHONE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?:\+?1[\s.\-]?)?\(\d{3}\)\s*\d{3}[\s.\-]?\d{4}\b").unwrap(),
        Regex::new(r"\b(?:\+?1[\s.\-])?\d{3}[\s.\-]\d{3}[\s.\-]\d{4}\b").unwrap(),
        Regex::new(r"\+\d{1,3}[\s.\-]?\(?\d{1,4}\)?(?:[\s.\-]?\d{2,4}){2,4}\b").unwrap(),
    ];

    /// Ordered most specific first; later patterns skip spans earlier ones claimed.
    static ref DATE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"\b(?:19|20)\d{2}-(?:0[1-9]|1[0-2])(?:-(?:0[1-9]|[12]\d|3[01]))?\b").unwrap(),
        Regex::new(r"\b(?:0?[1-9]|1[0-2])/(?:19|20)\d{2}\b").unwrap(),
        Regex::new(
            r"(?i)\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+(?:19|20)\d{2}\b"
        )
        .unwrap(),
        Regex::new(r"\b(?:19|20)\d{2}\b").unwrap(),
    ];

    /// Literal `20XX`-style years left over from a template.
    static ref TEMPLATE_YEARS: Vec<Regex> = vec![
        Regex::new(r"(?i)\b(?:19|20)xx\b").unwrap(),
        Regex::new(r"\bXXXX\b").unwrap(),
        Regex::new(r"(?i)['’]xx\b").unwrap(),
    ];

    /// Template years first, then a bare `XX` standing in for a year.
    static ref UNFILLED_YEARS: Vec<Regex> = TEMPLATE_YEARS
        .iter()
        .cloned()
        .chain(std::iter::once(Regex::new(r"\bXX\b").unwrap()))
        .collect();

    static ref ONGOING: Regex = Regex::new(r"(?i)\b(?:present|current)\b").unwrap();

    static ref TITLE_CASE_NAME: Regex =
        Regex::new(r"^\p{Lu}[\p{L}'’\-]*\.?(?:\s+\p{Lu}[\p{L}'’\-]*\.?){1,3}$").unwrap();

    static ref UPPER_CASE_NAME: Regex =
        Regex::new(r"^\p{Lu}[\p{Lu}'’\-\.]*(?:\s+\p{Lu}[\p{Lu}'’\-\.]*){1,3}$").unwrap();

    static ref FALLBACK_NAMES: Vec<Regex> = vec![
        Regex::new(r"\b\p{Lu}\p{Ll}+\s+\p{Lu}\p{Ll}+\b").unwrap(),
        Regex::new(r"\b\p{Lu}{2,}\s+\p{Lu}{2,}\b").unwrap(),
    ];

    static ref SUMMARY_HEADER: Regex = Regex::new(
        r"(?im)^[ \t]*(?:(?:professional|career|executive)\s+)?(?:summary|profile|objective|about\s+me)\b[ \t]*:?"
    )
    .unwrap();
}

/// Words that open a résumé but are never part of a person's name.
const NON_NAME_WORDS: &[&str] = &[
    "resume", "résumé", "curriculum", "vitae", "cv", "summary", "profile", "objective",
    "experience", "education", "skills", "contact", "projects", "references", "professional",
    "work", "history", "employment", "certifications", "about", "information", "details",
];

// ────────────────────────────────────────────────────────────────────────────
// Reports
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactReport {
    pub has_email: bool,
    pub has_phone: bool,
    pub email_in_first_300: bool,
    pub phone_in_first_300: bool,
    pub email_in_first_10_lines: bool,
    pub phone_in_first_10_lines: bool,
    /// Character offset of the first email address.
    pub email_position: Option<usize>,
    /// Character offset of the first phone number.
    pub phone_position: Option<usize>,
    /// Contact sits near the top by lines but not by characters, which usually means the
    /// extractor moved a PDF page header after body text.
    pub may_be_in_pdf_header: bool,
}

impl ContactReport {
    pub fn has_contact(&self) -> bool {
        self.has_email || self.has_phone
    }

    pub fn contact_at_top(&self) -> bool {
        self.email_in_first_300 || self.phone_in_first_300
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStatus {
    Valid,
    Placeholder,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateReport {
    pub has_valid_dates: bool,
    pub has_placeholders: bool,
    pub date_count: usize,
    /// Unfilled years plus open range ends ("Present", "Current").
    pub placeholder_count: usize,
    pub ongoing_count: usize,
    pub status: DateStatus,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameReport {
    pub has_name: bool,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub has_summary: bool,
    pub header_found: bool,
    /// Words following the best summary header.
    pub word_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Contact
// ────────────────────────────────────────────────────────────────────────────

pub fn detect_contact(text: &str, config: &ContactConfig) -> ContactReport {
    let email_byte = EMAIL.find(text).map(|m| m.start());
    let phone_byte = PHONE_PATTERNS
        .iter()
        .filter_map(|re| re.find(text).map(|m| m.start()))
        .min();

    let lines_end = match config.line_window {
        0 => 0,
        n => text
            .match_indices('\n')
            .nth(n - 1)
            .map(|(i, _)| i)
            .unwrap_or(text.len()),
    };

    let email_position = email_byte.map(|b| char_offset(text, b));
    let phone_position = phone_byte.map(|b| char_offset(text, b));

    let email_in_first_300 = email_position.is_some_and(|p| p < config.char_window);
    let phone_in_first_300 = phone_position.is_some_and(|p| p < config.char_window);
    let email_in_first_10_lines = email_byte.is_some_and(|b| b < lines_end);
    let phone_in_first_10_lines = phone_byte.is_some_and(|b| b < lines_end);

    let may_be_in_pdf_header = (email_in_first_10_lines || phone_in_first_10_lines)
        && !(email_in_first_300 || phone_in_first_300);

    ContactReport {
        has_email: email_byte.is_some(),
        has_phone: phone_byte.is_some(),
        email_in_first_300,
        phone_in_first_300,
        email_in_first_10_lines,
        phone_in_first_10_lines,
        email_position,
        phone_position,
        may_be_in_pdf_header,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dates
// ────────────────────────────────────────────────────────────────────────────

/// Counts matches of `patterns` in order, skipping spans an earlier pattern claimed.
fn count_non_overlapping(patterns: &[Regex], text: &str) -> usize {
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    for re in patterns {
        for m in re.find_iter(text) {
            let overlaps = claimed
                .iter()
                .any(|&(start, end)| m.start() < end && start < m.end());
            if !overlaps {
                claimed.push((m.start(), m.end()));
            }
        }
    }
    claimed.len()
}

pub fn detect_dates(text: &str, config: &DateConfig) -> DateReport {
    let date_count = count_non_overlapping(&DATE_PATTERNS, text);
    let template_years = count_non_overlapping(&TEMPLATE_YEARS, text);
    let ongoing_count = ONGOING.find_iter(text).count();
    let placeholder_count = count_non_overlapping(&UNFILLED_YEARS, text) + ongoing_count;

    // Template years outrank everything else, including plenty of real dates.
    let (status, message) = if template_years > 0 {
        (
            DateStatus::Placeholder,
            format!(
                "Found {template_years} placeholder date(s) such as '20XX'. No placeholder dates allowed; replace them with real dates."
            ),
        )
    } else if date_count < config.min_dates {
        (
            DateStatus::Missing,
            "No dates found. Add start and end dates (e.g. 'Jan 2020 - Present') to each role."
                .to_string(),
        )
    } else {
        (
            DateStatus::Valid,
            format!("Found {date_count} valid dates."),
        )
    };

    DateReport {
        has_valid_dates: status == DateStatus::Valid,
        has_placeholders: template_years > 0,
        date_count,
        placeholder_count,
        ongoing_count,
        status,
        message,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Name
// ────────────────────────────────────────────────────────────────────────────

fn contains_non_name_word(candidate: &str) -> bool {
    candidate.split_whitespace().any(|w| {
        let w = w
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        NON_NAME_WORDS.contains(&w.as_str())
    })
}

pub fn detect_name(text: &str, config: &NameConfig) -> NameReport {
    let window = char_prefix(text, config.char_window);

    let from_lines = window
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(config.max_lines)
        .find(|line| {
            let words = line.split_whitespace().count();
            line.chars().count() <= config.max_len
                && (config.min_words..=config.max_words).contains(&words)
                && !contains_non_name_word(line)
                && (UPPER_CASE_NAME.is_match(line) || TITLE_CASE_NAME.is_match(line))
        });

    let name = from_lines.map(str::to_string).or_else(|| {
        let head = char_prefix(text, config.fallback_window);
        FALLBACK_NAMES
            .iter()
            .flat_map(|re| re.find_iter(head))
            .map(|m| m.as_str())
            .find(|candidate| !contains_non_name_word(candidate))
            .map(str::to_string)
    });

    NameReport {
        has_name: name.is_some(),
        name,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Summary
// ────────────────────────────────────────────────────────────────────────────

/// Words between a summary header and the next section header.
fn words_after_header(after: &str, lookahead_chars: usize) -> usize {
    let window = char_prefix(after, lookahead_chars);
    let mut words = 0;
    for (i, line) in window.lines().enumerate() {
        if i > 0 && is_section_header(line) {
            break;
        }
        words += line.split_whitespace().count();
    }
    words
}

pub fn detect_summary(text: &str, config: &SummaryConfig) -> SummaryReport {
    let word_count = SUMMARY_HEADER
        .find_iter(text)
        .map(|m| words_after_header(&text[m.end()..], config.lookahead_chars))
        .max();

    SummaryReport {
        has_summary: word_count.is_some_and(|w| w >= config.min_words),
        header_found: word_count.is_some(),
        word_count: word_count.unwrap_or(0),
    }
}
