//! Bullet point detection. Counts list items and attributes them to résumé sections.
//!
//! Detection is an ordered list of passes sharing one `BulletTally`. Each pass only
//! looks at lines no earlier pass claimed, so the order below decides which pass gets
//! credit for a line and must not be rearranged:
//!
//! 1. separate-line   glyph on its own line, content on the next line
//! 2. inline          glyph / number / arrow / dash prefix with content on the same line
//! 3. fallback        glyph in the first few characters (only below the minimum)
//! 4. numbered        `N.` / `N)` / `N-` prefixes (only below the minimum)
//! 5. implicit        title-case and action-verb lines, diagnostic only
//! 6. experience      unmarked action-verb lines inside a thin experience section
//! 7. non-standard    stray short lines before content, diagnostic only

use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::config::BulletConfig;
use crate::analysis::models::Section;
use crate::analysis::patterns::{
    advance_section, classify_header, is_date_line, is_header_candidate, is_header_or_date,
    starts_with_action_verb,
};

/// Glyphs accepted by the fallback pass.
const STANDARD_GLYPHS: &[char] = &[
    '•', '●', '○', '◦', '▪', '▫', '■', '□', '►', '▸', '▹', '➢', '➤', '❖', '♦', '◆', '◇', '·',
    '✓', '✔', '→', '-', '*', '–', '—',
];

/// Private-use glyph that PDF extraction emits for Symbol-font bullets.
const PDF_ARTIFACT_GLYPH: char = '\u{F0B7}';

lazy_static! {
    /// Every glyph the separate-line pass accepts, artifact included.
    static ref ALL_GLYPHS: Vec<char> = STANDARD_GLYPHS
        .iter()
        .copied()
        .chain(std::iter::once(PDF_ARTIFACT_GLYPH))
        .collect();

    static ref INLINE_BULLETS: Vec<Regex> = vec![
        Regex::new(r"^\s*[•●○◦▪▫■□►▸▹➢➤❖♦◆◇·\x{F0B7}]\s*(?P<content>\S.*)$").unwrap(),
        Regex::new(r"^\s*[✓✔✗✘☐☑☒]\s*(?P<content>\S.*)$").unwrap(),
        Regex::new(r"^\s*(?:→|⇒|➔|->|=>|>)\s*(?P<content>\S.*)$").unwrap(),
        Regex::new(r"^\s*[-*–—+]\s+(?P<content>\S.*)$").unwrap(),
        Regex::new(r"^\s*(?:\d{1,2}|[a-zA-Z])[.)]\s+(?P<content>\S.*)$").unwrap(),
        Regex::new(r"^\s*\[[ xX✓]?\]\s*(?P<content>\S.*)$").unwrap(),
    ];

    static ref NUMBERED_ITEM: Regex =
        Regex::new(r"^\s*\d{1,3}\s*[.)\-]\s*(?P<content>\S.*)$").unwrap();

    /// Dates, pipes and company suffixes mark a job heading rather than an achievement.
    static ref JOB_HEADING: Regex = Regex::new(
        r"(?i)\b(?:19|20)\d{2}\b|\bpresent\b|\||\b(?:inc|llc|ltd|corp|corporation|gmbh|company)\b"
    )
    .unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletPass {
    SeparateLine,
    Inline,
    Fallback,
    Numbered,
    Implicit,
    ExperienceImplicit,
    NonStandard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassContribution {
    pub pass: BulletPass,
    pub counted: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletReport {
    pub count: usize,
    pub is_optimal: bool,
    pub by_section: BTreeMap<Section, usize>,
    pub sections_found: BTreeSet<Section>,
    pub non_standard_count: usize,
    pub non_standard_by_section: BTreeMap<Section, usize>,
    /// Lines that look like unmarked list items. Never part of `count`.
    pub implicit_signals: usize,
    /// Passes that ran, in order, with the bullets each one added.
    pub passes: Vec<PassContribution>,
}

/// Accumulator threaded through every pass.
#[derive(Debug, Default)]
struct BulletTally {
    counted: BTreeSet<usize>,
    markers: BTreeSet<usize>,
    by_section: BTreeMap<Section, usize>,
    sections_found: BTreeSet<Section>,
    non_standard: BTreeMap<Section, usize>,
    implicit_signals: usize,
}

impl BulletTally {
    fn total(&self) -> usize {
        self.counted.len()
    }

    fn is_taken(&self, line: usize) -> bool {
        self.counted.contains(&line) || self.markers.contains(&line)
    }

    fn section_count(&self, section: Section) -> usize {
        self.by_section.get(&section).copied().unwrap_or(0)
    }

    /// Records a bullet on `line`. Returns false if the line was already counted.
    fn credit(&mut self, line: usize, section: Section) -> bool {
        if !self.counted.insert(line) {
            return false;
        }
        *self.by_section.entry(section).or_default() += 1;
        true
    }
}

#[derive(Debug, Clone, Copy)]
enum Gate {
    Always,
    BelowMinimum,
    ExperienceShort,
}

impl Gate {
    fn is_open(self, tally: &BulletTally, config: &BulletConfig) -> bool {
        match self {
            Gate::Always => true,
            Gate::BelowMinimum => tally.total() < config.min_total,
            Gate::ExperienceShort => {
                tally.sections_found.contains(&Section::Experience)
                    && tally.section_count(Section::Experience) < config.min_experience
            }
        }
    }
}

type PassFn = fn(&[&str], &BulletConfig, &mut BulletTally) -> usize;

const PASSES: &[(BulletPass, Gate, PassFn)] = &[
    (BulletPass::SeparateLine, Gate::Always, separate_line_pass),
    (BulletPass::Inline, Gate::Always, inline_pass),
    (BulletPass::Fallback, Gate::BelowMinimum, fallback_pass),
    (BulletPass::Numbered, Gate::BelowMinimum, numbered_pass),
    (BulletPass::Implicit, Gate::BelowMinimum, implicit_pass),
    (BulletPass::ExperienceImplicit, Gate::ExperienceShort, experience_pass),
    (BulletPass::NonStandard, Gate::Always, non_standard_pass),
];

/// Runs every pass over `text` and summarizes the tally.
pub fn detect_bullets(text: &str, config: &BulletConfig) -> BulletReport {
    let lines: Vec<&str> = text.lines().collect();

    let mut tally = BulletTally {
        sections_found: lines
            .iter()
            .filter_map(|line| classify_header(line))
            .filter(|section| *section != Section::Other)
            .collect(),
        ..BulletTally::default()
    };

    let mut passes = Vec::new();
    for &(pass, gate, run) in PASSES {
        if !gate.is_open(&tally, config) {
            continue;
        }
        let counted = run(&lines, config, &mut tally);
        debug!("Bullet pass {pass:?}: +{counted} (total {})", tally.total());
        passes.push(PassContribution { pass, counted });
    }

    let count = tally.total();
    let is_optimal = count >= config.min_total
        && tally.section_count(Section::Experience) >= config.min_experience;

    BulletReport {
        count,
        is_optimal,
        non_standard_count: tally.non_standard.values().sum(),
        by_section: tally.by_section,
        sections_found: tally.sections_found,
        non_standard_by_section: tally.non_standard,
        implicit_signals: tally.implicit_signals,
        passes,
    }
}

/// Pairs every line with its index and the section in force at that line.
fn with_sections<'a>(lines: &'a [&'a str]) -> impl Iterator<Item = (usize, &'a str, Section)> + 'a {
    lines
        .iter()
        .enumerate()
        .scan(Section::Other, |section, (i, line)| {
            *section = advance_section(line, *section);
            Some((i, *line, *section))
        })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Marker {
    Exact,
    Padded,
    Short,
}

/// Recognizes a line that holds a bullet glyph and nothing (or almost nothing) else.
fn marker_line(line: &str, glyphs: &[char], max_len: usize) -> Option<Marker> {
    let trimmed = line.trim();
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    if !glyphs.contains(&first) {
        return None;
    }
    if chars.as_str().is_empty() {
        return Some(if trimmed.len() == line.len() {
            Marker::Exact
        } else {
            Marker::Padded
        });
    }
    (trimmed.chars().count() <= max_len).then_some(Marker::Short)
}

/// First non-empty line after `marker` inside the look-ahead window, if it can carry
/// the marker's content.
fn find_content(
    lines: &[&str],
    marker: usize,
    min_len: usize,
    config: &BulletConfig,
    tally: &BulletTally,
) -> Option<usize> {
    let last = (marker + config.lookahead).min(lines.len().saturating_sub(1));
    for j in (marker + 1)..=last {
        let candidate = lines[j].trim();
        if candidate.is_empty() {
            continue;
        }
        let usable = !tally.is_taken(j)
            && marker_line(candidate, &ALL_GLYPHS, config.marker_max_len).is_none()
            && !is_header_or_date(candidate)
            && candidate.chars().count() >= min_len;
        return usable.then_some(j);
    }
    None
}

fn separate_line_pass(lines: &[&str], config: &BulletConfig, tally: &mut BulletTally) -> usize {
    let mut added = 0;
    for (i, line, section) in with_sections(lines) {
        if tally.is_taken(i) {
            continue;
        }
        let min_len = match marker_line(line, &ALL_GLYPHS, config.marker_max_len) {
            Some(Marker::Exact | Marker::Padded) => config.content_min_len,
            Some(Marker::Short) => config.substantial_min_len,
            None => continue,
        };
        if let Some(content) = find_content(lines, i, min_len, config, tally) {
            tally.markers.insert(i);
            if tally.credit(content, section) {
                added += 1;
            }
        }
    }
    added
}

/// Content after a recognized inline bullet prefix.
fn strip_inline_marker(line: &str) -> Option<&str> {
    INLINE_BULLETS
        .iter()
        .find_map(|re| re.captures(line))
        .and_then(|caps| caps.name("content"))
        .map(|m| m.as_str().trim())
}

fn inline_pass(lines: &[&str], config: &BulletConfig, tally: &mut BulletTally) -> usize {
    let mut added = 0;
    for (i, line, section) in with_sections(lines) {
        if tally.is_taken(i) {
            continue;
        }
        let Some(content) = strip_inline_marker(line) else {
            continue;
        };
        if content.chars().count() < config.content_min_len || is_header_or_date(content) {
            continue;
        }
        if tally.credit(i, section) {
            added += 1;
        }
    }
    added
}

fn fallback_pass(lines: &[&str], config: &BulletConfig, tally: &mut BulletTally) -> usize {
    let mut added = 0;
    for (i, line, section) in with_sections(lines) {
        if tally.is_taken(i) {
            continue;
        }
        let trimmed = line.trim_start();
        let Some((at, glyph)) = trimmed
            .char_indices()
            .take(config.fallback_window)
            .find(|(_, c)| STANDARD_GLYPHS.contains(c))
        else {
            continue;
        };
        let rest = trimmed[at + glyph.len_utf8()..].trim();
        if rest.is_empty() {
            if let Some(content) =
                find_content(lines, i, config.substantial_min_len, config, tally)
            {
                tally.markers.insert(i);
                if tally.credit(content, section) {
                    added += 1;
                }
            }
        } else if rest.chars().count() >= config.content_min_len
            && !is_header_or_date(rest)
            && tally.credit(i, section)
        {
            added += 1;
        }
    }
    added
}

fn numbered_pass(lines: &[&str], config: &BulletConfig, tally: &mut BulletTally) -> usize {
    let mut added = 0;
    for (i, line, section) in with_sections(lines) {
        if tally.is_taken(i) || is_date_line(line) {
            continue;
        }
        let Some(content) = NUMBERED_ITEM
            .captures(line)
            .and_then(|caps| caps.name("content"))
        else {
            continue;
        };
        if content.as_str().trim().chars().count() >= config.content_min_len
            && tally.credit(i, section)
        {
            added += 1;
        }
    }
    added
}

fn looks_like_title_item(line: &str, config: &BulletConfig) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.len() < config.implicit_min_words
        || words.len() > config.implicit_max_words
        || line.chars().count() > config.implicit_max_len
    {
        return false;
    }
    let capitalized = words
        .iter()
        .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
        .count();
    capitalized * 10 >= words.len() * 7
}

/// Counts unmarked list-item signals. The result is diagnostic and never credited.
fn implicit_pass(lines: &[&str], config: &BulletConfig, tally: &mut BulletTally) -> usize {
    let signals = with_sections(lines)
        .filter(|(i, _, _)| !tally.is_taken(*i))
        .map(|(_, line, _)| line.trim())
        .filter(|line| !line.is_empty() && !is_header_or_date(line))
        .filter(|line| {
            looks_like_title_item(line, config)
                || (line.chars().count() >= config.implicit_verb_min_len
                    && starts_with_action_verb(line, false))
        })
        .count();

    tally.implicit_signals = if signals >= config.implicit_min_signals {
        signals
    } else {
        0
    };
    0
}

fn experience_pass(lines: &[&str], config: &BulletConfig, tally: &mut BulletTally) -> usize {
    let mut added = 0;
    for (i, line, section) in with_sections(lines) {
        if section != Section::Experience || tally.is_taken(i) {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.chars().count() < config.experience_verb_min_len
            || is_header_or_date(trimmed)
            || is_header_candidate(trimmed)
            || JOB_HEADING.is_match(trimmed)
        {
            continue;
        }
        if starts_with_action_verb(trimmed, true) && tally.credit(i, Section::Experience) {
            added += 1;
        }
    }
    added
}

fn non_standard_pass(lines: &[&str], config: &BulletConfig, tally: &mut BulletTally) -> usize {
    let mut flagged = Vec::new();
    for (i, line, section) in with_sections(lines) {
        let trimmed = line.trim();
        if tally.is_taken(i)
            || trimmed.is_empty()
            || trimmed.chars().count() > config.nonstandard_max_len
        {
            continue;
        }
        let Some(next) = lines.get(i + 1).map(|l| l.trim()) else {
            continue;
        };
        if next.chars().count() >= config.substantial_min_len && !is_header_or_date(next) {
            flagged.push(section);
        }
    }
    for section in flagged {
        *tally.non_standard.entry(section).or_default() += 1;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detect(text: &str) -> BulletReport {
        detect_bullets(text, &BulletConfig::default())
    }

    fn pass_count(report: &BulletReport, pass: BulletPass) -> Option<usize> {
        report
            .passes
            .iter()
            .find(|p| p.pass == pass)
            .map(|p| p.counted)
    }

    #[test]
    fn test_five_inline_bullets_count_five() {
        let text = "• Led the platform team\n\
                    • Built a billing service\n\
                    • Reduced page load time\n\
                    • Mentored three junior engineers\n\
                    • Designed the event pipeline";
        let report = detect(text);
        assert_eq!(report.count, 5);
        assert_eq!(pass_count(&report, BulletPass::Inline), Some(5));
    }

    #[test]
    fn test_title_case_bullet_content_is_counted() {
        let text = "• Shipped Client Projects\n\
                    • Built Portfolio Website\n\
                    • Led Platform Team\n\
                    • Wrote Billing Service\n\
                    • Improved Search Ranking";
        let report = detect(text);
        assert_eq!(report.count, 5);
        assert_eq!(pass_count(&report, BulletPass::Inline), Some(5));
    }

    #[test]
    fn test_title_case_content_under_glyph_marker_is_counted() {
        let text = "o • Shipped Client Projects\no • Built Portfolio Website";
        let report = detect(text);
        assert_eq!(pass_count(&report, BulletPass::Fallback), Some(2));
    }

    #[test]
    fn test_title_line_with_keyword_keeps_section() {
        let text = "PROJECTS\n\
                    User Experience Research\n\
                    • Built a budgeting app in Rust\n\
                    • Wrote a ray tracer for fun\n\
                    • Published a CLI for notes";
        let report = detect(text);
        assert_eq!(report.by_section.get(&Section::Projects), Some(&3));
        assert_eq!(report.by_section.get(&Section::Experience), None);
        assert!(!report.sections_found.contains(&Section::Experience));
    }

    #[test]
    fn test_job_title_under_experience_does_not_switch_to_projects() {
        let text = "EXPERIENCE\n\
                    Client Projects Lead, Acme\n\
                    • Led delivery for twelve client launches\n\
                    • Built the estimation playbook";
        let report = detect(text);
        assert_eq!(report.by_section.get(&Section::Experience), Some(&2));
    }

    #[test]
    fn test_separate_line_markers_credit_next_line() {
        let text = "•\nLed migration of the billing system\n  •  \nBuilt CI pipelines for four teams";
        let report = detect(text);
        assert_eq!(report.count, 2);
        assert_eq!(pass_count(&report, BulletPass::SeparateLine), Some(2));
        assert_eq!(pass_count(&report, BulletPass::Inline), Some(0));
    }

    #[test]
    fn test_short_marker_needs_substantial_content() {
        // "•-" is a short marker; "Ok" is too short to be its content.
        let report = detect("•-\nOk\n");
        assert_eq!(pass_count(&report, BulletPass::SeparateLine), Some(0));
    }

    #[test]
    fn test_marker_followed_by_header_is_ignored() {
        let report = detect("•\nEXPERIENCE\n");
        assert_eq!(report.count, 0);
    }

    #[test]
    fn test_bulleted_header_is_not_counted() {
        let report = detect("• EXPERIENCE\n• Jan 2020 - Present");
        assert_eq!(report.count, 0);
    }

    #[test]
    fn test_section_attribution_and_optimal() {
        let text = "EXPERIENCE\n\
                    - Led the payments team through a replatform\n\
                    - Built fraud detection rules\n\
                    - Reduced incident volume\n\
                    PROJECTS\n\
                    - Wrote a Rust ray tracer\n\
                    - Published a CLI for budgeting";
        let report = detect(text);
        assert_eq!(report.count, 5);
        assert_eq!(report.by_section.get(&Section::Experience), Some(&3));
        assert_eq!(report.by_section.get(&Section::Projects), Some(&2));
        assert!(report.sections_found.contains(&Section::Experience));
        assert!(report.sections_found.contains(&Section::Projects));
        assert!(report.is_optimal);
    }

    #[test]
    fn test_combined_header_counts_as_experience() {
        let text = "Projects & Work Experience\n\
                    * Shipped the mobile onboarding flow\n\
                    * Automated release notes";
        let report = detect(text);
        assert_eq!(report.by_section.get(&Section::Experience), Some(&2));
        assert_eq!(report.by_section.get(&Section::Projects), None);
    }

    #[test]
    fn test_not_optimal_without_experience_bullets() {
        let text = "PROJECTS\n• One thing built\n• Two things built\n• Three things built\n\
                    • Four things built\n• Five things built";
        let report = detect(text);
        assert_eq!(report.count, 5);
        assert!(!report.is_optimal);
    }

    #[test]
    fn test_dash_numbers_are_claimed_by_fallback_first() {
        let text = "1- Shipped feature one for users\n2- Shipped feature two for users";
        let report = detect(text);
        assert_eq!(pass_count(&report, BulletPass::Fallback), Some(2));
        assert_eq!(pass_count(&report, BulletPass::Numbered), Some(0));
    }

    #[test]
    fn test_fallback_skips_pdf_artifact_glyph() {
        let text = "o • Designed the reporting warehouse\n\
                    o • Designed the alerting service\n\
                    o \u{F0B7} Designed the on-call rotation\n\
                    o \u{F0B7} Designed the audit trail";
        let report = detect(text);
        assert_eq!(pass_count(&report, BulletPass::Fallback), Some(2));
        assert_eq!(report.count, 2);
    }

    #[test]
    fn test_fallback_does_not_run_at_minimum() {
        let text = "• a1 task\n• a2 task\n• a3 task\n• a4 task\n• a5 task\no • extra item here";
        let report = detect(text);
        assert_eq!(report.count, 5);
        assert_eq!(pass_count(&report, BulletPass::Fallback), None);
    }

    #[test]
    fn test_numbered_pass_catches_unspaced_numbers() {
        let text = "1.Shipped feature one for users\n\
                    2.Shipped feature two for users\n\
                    3.Shipped feature three for users";
        let report = detect(text);
        assert_eq!(pass_count(&report, BulletPass::Numbered), Some(3));
        assert_eq!(report.count, 3);
    }

    #[test]
    fn test_implicit_signals_never_counted() {
        let text = "Developed a reconciliation job for ledgers\n\
                    Managed the vendor onboarding program\n\
                    Designed a caching layer for search traffic\n\
                    Improved test coverage across services";
        let report = detect(text);
        assert_eq!(report.count, 0);
        assert_eq!(report.implicit_signals, 4);
        assert_eq!(pass_count(&report, BulletPass::Implicit), Some(0));
    }

    #[test]
    fn test_implicit_signals_below_minimum_report_zero() {
        let report = detect("Developed a reconciliation job for ledgers\nplain text line here");
        assert_eq!(report.implicit_signals, 0);
    }

    #[test]
    fn test_experience_pass_credits_unmarked_verbs() {
        let text = "EXPERIENCE\n\
                    Senior Engineer, Acme Inc\n\
                    Jan 2020 - Present\n\
                    Develops internal tooling for payment teams\n\
                    Manages a backlog of customer escalations\n\
                    Led the migration to event sourcing";
        let report = detect(text);
        assert_eq!(pass_count(&report, BulletPass::ExperienceImplicit), Some(3));
        assert_eq!(report.by_section.get(&Section::Experience), Some(&3));
        assert_eq!(report.count, 3);
    }

    #[test]
    fn test_experience_pass_skipped_without_header() {
        let report = detect("Develops internal tooling for payment teams");
        assert_eq!(pass_count(&report, BulletPass::ExperienceImplicit), None);
        assert_eq!(report.count, 0);
    }

    #[test]
    fn test_non_standard_bullets_are_flagged_not_counted() {
        let text = "o\nManaged vendor relationships across regions\no\nRan quarterly planning for the group";
        let report = detect(text);
        assert_eq!(report.count, 0);
        assert_eq!(report.non_standard_count, 2);
        assert_eq!(report.non_standard_by_section.get(&Section::Other), Some(&2));
    }

    #[test]
    fn test_counted_lines_are_never_double_counted() {
        let text = "•\n• Led a team of five engineers";
        let report = detect(text);
        assert_eq!(report.count, 1);
    }

    #[test]
    fn test_empty_text() {
        let report = detect("");
        assert_eq!(report.count, 0);
        assert!(!report.is_optimal);
        assert!(report.sections_found.is_empty());
    }

    #[test]
    fn test_detection_is_idempotent() {
        let text = "EXPERIENCE\n• Led things well\n•\nBuilt more things for people\n1) Numbered thing";
        assert_eq!(detect(text), detect(text));
    }
}
