use serde::{Deserialize, Serialize};

use crate::analysis::config::LengthConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCountOrigin {
    Document,
    Estimated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthVerdict {
    TooShort,
    TooManyWords,
    TooManyPages,
    Optimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthReport {
    pub word_count: usize,
    pub page_count: usize,
    pub page_count_source: PageCountOrigin,
    pub is_optimal: bool,
    pub verdict: LengthVerdict,
    pub message: String,
}

/// Whitespace-separated tokens that still carry a letter, digit, or one of `- . @ /`
/// once control characters are dropped. Lone punctuation like `|` or `•` is not a word.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace()
        .filter(|token| {
            token
                .chars()
                .filter(|c| !c.is_control())
                .any(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '@' | '/'))
        })
        .count()
}

pub fn analyze_length(text: &str, pages: Option<usize>, config: &LengthConfig) -> LengthReport {
    let word_count = count_words(text);

    let (page_count, page_count_source) = match pages {
        Some(p) => (p, PageCountOrigin::Document),
        None => (
            word_count
                .div_ceil(config.words_per_page.max(1))
                .max(1),
            PageCountOrigin::Estimated,
        ),
    };

    let verdict = if word_count < config.min_words {
        LengthVerdict::TooShort
    } else if word_count > config.max_words {
        LengthVerdict::TooManyWords
    } else if page_count > config.max_pages {
        LengthVerdict::TooManyPages
    } else {
        LengthVerdict::Optimal
    };

    let message = match verdict {
        LengthVerdict::TooShort => format!(
            "Résumé is too short ({word_count} words). Aim for at least {} words.",
            config.min_words
        ),
        LengthVerdict::TooManyWords => format!(
            "Résumé is too long ({word_count} words). Keep it under {} words.",
            config.max_words
        ),
        LengthVerdict::TooManyPages => format!(
            "Résumé runs to {page_count} pages. Keep it to {} pages or fewer.",
            config.max_pages
        ),
        LengthVerdict::Optimal => {
            format!("Length is good ({word_count} words, {page_count} page(s)).")
        }
    };

    LengthReport {
        word_count,
        page_count,
        page_count_source,
        is_optimal: verdict == LengthVerdict::Optimal,
        verdict,
        message,
    }
}
