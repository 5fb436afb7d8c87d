//! Process-wide lexical tables shared by the detectors: section headers,
//! date-only lines and résumé action verbs.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::models::Section;

const MONTH: &str = r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?";

lazy_static! {
    // Each header segment must be the whole segment, so body lines that merely
    // mention "projects" or "experience" never switch sections.
    static ref EXPERIENCE_HEADER: Regex = Regex::new(
        r"(?i)^(?:(?:professional|work|relevant|industry|related|technical|internship|employment)\s+)?(?:experience|employment(?:\s+history)?|work\s+history|career\s+history)$"
    )
    .unwrap();

    static ref PROJECTS_HEADER: Regex = Regex::new(
        r"(?i)^(?:(?:personal|academic|selected|side|key|relevant|technical|notable|professional|open\s+source)\s+)?(?:projects|portfolio)$"
    )
    .unwrap();

    static ref OTHER_HEADER: Regex = Regex::new(
        r"(?i)^(?:(?:technical|core|key|professional|relevant|additional|personal|selected|academic|career|executive|language|computer|other)\s+){0,2}(?:education|skills|summary|profile|objective|certifications?|awards|honors|publications|languages|interests|hobbies|references|volunteer(?:ing)?(?:\s+experience)?|achievements|accomplishments|leadership|activities|courses|coursework|contact(?:\s+(?:information|details))?|qualifications|training|competencies|tools|technologies)$"
    )
    .unwrap();

    /// Joins in combined headers such as "Projects & Work Experience".
    static ref HEADER_JOINER: Regex = Regex::new(r"(?i)\s*(?:&|/|\||,|\band\b)\s*").unwrap();

    /// A line made only of a date or a date range.
    static ref DATE_LINE: Regex = {
        let point = format!(r"(?:{MONTH}\s+)?(?:\d{{1,2}}/)?(?:19|20)\d{{2}}(?:-\d{{2}})?");
        Regex::new(&format!(
            r"(?i)^[\s(]*{point}\s*(?:(?:[-–—]|to)\s*(?:{point}|present|current|now))?[\s).,]*$"
        ))
        .unwrap()
    };

    /// Past-tense verbs that typically open an achievement line.
    pub static ref ACTION_VERBS: HashSet<&'static str> = [
        "accelerated", "achieved", "administered", "analyzed", "analysed", "architected",
        "authored", "automated", "boosted", "built", "collaborated", "conducted",
        "configured", "consolidated", "coordinated", "created", "cut", "decreased",
        "delivered", "deployed", "designed", "developed", "directed", "drove",
        "eliminated", "engineered", "enhanced", "established", "executed", "expanded",
        "facilitated", "founded", "generated", "grew", "guided", "handled", "headed",
        "identified", "implemented", "improved", "increased", "initiated", "integrated",
        "launched", "led", "maintained", "managed", "mentored", "migrated", "modernized",
        "negotiated", "optimized", "orchestrated", "organized", "oversaw", "owned",
        "partnered", "performed", "pioneered", "planned", "presented", "produced",
        "programmed", "published", "reduced", "refactored", "researched", "resolved",
        "restructured", "revamped", "saved", "scaled", "secured", "shipped", "simplified",
        "spearheaded", "streamlined", "strengthened", "supervised", "supported", "taught",
        "tested", "trained", "transformed", "troubleshot", "wrote",
    ]
    .into_iter()
    .collect();

    /// Base forms of the same verbs, for present-tense résumé styles.
    pub static ref BASE_ACTION_VERBS: HashSet<&'static str> = [
        "accelerate", "achieve", "administer", "analyze", "architect", "author",
        "automate", "boost", "build", "coach", "collaborate", "conduct", "configure",
        "consolidate", "coordinate", "create", "cut", "decrease", "deliver", "deploy",
        "design", "develop", "direct", "drive", "eliminate", "engineer", "enhance",
        "establish", "execute", "expand", "facilitate", "fix", "found", "generate", "grow",
        "guide", "handle", "head", "identify", "implement", "improve", "increase",
        "initiate", "integrate", "launch", "lead", "maintain", "manage", "mentor",
        "migrate", "modernize", "negotiate", "optimize", "orchestrate", "organize",
        "oversee", "own", "partner", "perform", "pioneer", "plan", "present", "produce",
        "program", "publish", "reduce", "refactor", "research", "resolve", "restructure",
        "revamp", "save", "scale", "secure", "ship", "simplify", "spearhead", "streamline",
        "strengthen", "supervise", "support", "teach", "test", "train", "transform",
        "troubleshoot", "write",
    ]
    .into_iter()
    .collect();
}

/// Short, title-cased or upper-cased lines without digits are header candidates.
pub fn is_header_candidate(line: &str) -> bool {
    let trimmed = line.trim().trim_end_matches(':').trim_end();
    if trimmed.is_empty() || trimmed.chars().count() > 60 {
        return false;
    }
    if !trimmed.chars().next().is_some_and(char::is_alphabetic) {
        return false;
    }
    if trimmed.ends_with('.') || trimmed.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() > 6 {
        return false;
    }
    let all_upper = trimmed
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(char::is_uppercase);
    all_upper || words.iter().all(|w| is_title_word(w))
}

fn is_title_word(word: &str) -> bool {
    const MINOR: &[&str] = &["and", "of", "the", "in", "for", "to", "&", "/", "|"];
    if MINOR.contains(&word.to_lowercase().as_str()) {
        return true;
    }
    match word.chars().next() {
        Some(c) if c.is_alphabetic() => c.is_uppercase(),
        _ => true,
    }
}

fn classify_segment(segment: &str) -> Option<Section> {
    if EXPERIENCE_HEADER.is_match(segment) {
        Some(Section::Experience)
    } else if PROJECTS_HEADER.is_match(segment) {
        Some(Section::Projects)
    } else if OTHER_HEADER.is_match(segment) {
        Some(Section::Other)
    } else {
        None
    }
}

/// Classifies a header line. Every joined segment must be a known heading;
/// experience wins over projects when both appear.
pub fn classify_header(line: &str) -> Option<Section> {
    if !is_header_candidate(line) {
        return None;
    }
    let trimmed = line.trim().trim_end_matches(':').trim_end();
    let mut found = None;
    for segment in HEADER_JOINER.split(trimmed).filter(|s| !s.is_empty()) {
        let section = classify_segment(&segment.split_whitespace().collect::<Vec<_>>().join(" "))?;
        found = Some(match (found, section) {
            (Some(Section::Experience), _) | (_, Section::Experience) => Section::Experience,
            (Some(Section::Projects), _) | (_, Section::Projects) => Section::Projects,
            _ => Section::Other,
        });
    }
    found
}

/// Section state after reading `line`: a header switches it, anything else keeps it.
pub fn advance_section(line: &str, current: Section) -> Section {
    classify_header(line).unwrap_or(current)
}

pub fn is_section_header(line: &str) -> bool {
    classify_header(line).is_some()
}

pub fn is_date_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && DATE_LINE.is_match(trimmed)
}

pub fn is_header_or_date(line: &str) -> bool {
    is_section_header(line) || is_date_line(line)
}

/// The first `chars` characters of `text`, cut on a char boundary.
pub fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Character (not byte) offset of `byte` within `text`.
pub fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

/// Lowercased leading word with surrounding punctuation removed.
pub fn first_word(line: &str) -> Option<String> {
    line.split_whitespace()
        .next()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
}

/// Whether the line opens with an action verb. With `inflections`, present-tense
/// forms (`lead`, `leads`, `fixes`) are accepted alongside the past tense.
pub fn starts_with_action_verb(line: &str, inflections: bool) -> bool {
    let Some(word) = first_word(line) else {
        return false;
    };
    if ACTION_VERBS.contains(word.as_str()) {
        return true;
    }
    if !inflections {
        return BASE_ACTION_VERBS.contains(word.as_str());
    }
    BASE_ACTION_VERBS.contains(word.as_str())
        || word
            .strip_suffix("es")
            .is_some_and(|base| BASE_ACTION_VERBS.contains(base))
        || word
            .strip_suffix('s')
            .is_some_and(|base| BASE_ACTION_VERBS.contains(base))
}
