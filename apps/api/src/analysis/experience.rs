use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::config::ExperienceConfig;

lazy_static! {
    static ref EXPLICIT_YEARS: Vec<Regex> = vec![
        Regex::new(r"(?i)\b(\d{1,2})\+?\s*(?:years?|yrs?)\.?\s+(?:of\s+)?(?:professional\s+|industry\s+|hands-on\s+)?(?:experience|exp\b)").unwrap(),
        Regex::new(r"(?i)\b(\d{1,2})\+?\s*(?:years?|yrs?)\s+in\s+(?:the\s+)?(?:industry|software|engineering|tech)").unwrap(),
        Regex::new(r"(?i)\bexperience\s*(?:of|:)\s*(\d{1,2})\+?\s*(?:years?|yrs?)\b").unwrap(),
    ];

    static ref SENIORITY: Regex = Regex::new(
        r"(?i)\b(senior|sr|lead|principal|staff|architect|manager|director|head\s+of|vp|vice\s+president|chief|cto|ceo|engineer|developer|analyst|consultant|designer|scientist)\b"
    )
    .unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearsSource {
    /// Stated in the text ("8 years of experience").
    Explicit,
    /// Inferred from seniority keywords.
    Estimated,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceReport {
    pub years: u32,
    pub is_experienced: bool,
    pub source: YearsSource,
    pub seniority_keywords: Vec<String>,
}

pub fn analyze_experience(text: &str, config: &ExperienceConfig) -> ExperienceReport {
    let explicit = EXPLICIT_YEARS
        .iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .max();

    let keywords: BTreeSet<String> = SENIORITY
        .find_iter(text)
        .map(|m| {
            m.as_str()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase()
        })
        .collect();

    let (years, source) = match explicit {
        Some(n) => (n.min(config.max_years), YearsSource::Explicit),
        None if keywords.len() >= config.keyword_high_threshold => {
            (config.keyword_high_years, YearsSource::Estimated)
        }
        None if keywords.len() >= config.keyword_low_threshold => {
            (config.keyword_low_years, YearsSource::Estimated)
        }
        None => (0, YearsSource::None),
    };

    ExperienceReport {
        years,
        is_experienced: years >= config.experienced_min_years,
        source,
        seniority_keywords: keywords.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_years_take_max() {
        let text = "Engineer with 5 years of experience in Rust and 12+ years of professional experience overall.";
        let report = analyze_experience(text, &ExperienceConfig::default());
        assert_eq!(report.years, 12);
        assert_eq!(report.source, YearsSource::Explicit);
        assert!(report.is_experienced);
    }

    #[test]
    fn test_explicit_years_capped() {
        let report = analyze_experience("99 years of experience", &ExperienceConfig::default());
        assert_eq!(report.years, 50);
    }

    #[test]
    fn test_keyword_estimate_bands() {
        let config = ExperienceConfig::default();

        let two = analyze_experience("Senior Engineer, later Lead Engineer", &config);
        assert_eq!((two.years, two.source), (3, YearsSource::Estimated));
        assert!(two.is_experienced);

        let four = analyze_experience("Senior, Lead, Principal, then Director", &config);
        assert_eq!(four.years, 7);
    }

    #[test]
    fn test_repeated_keyword_counts_once() {
        let report = analyze_experience("Senior role, then another senior role.", &ExperienceConfig::default());
        assert_eq!(report.seniority_keywords, vec!["senior".to_string()]);
        assert_eq!(report.source, YearsSource::None);
        assert!(!report.is_experienced);
    }

    #[test]
    fn test_role_nouns_feed_the_estimate() {
        let report = analyze_experience(
            "Staff Engineer, Acme Payments\nSoftware Engineer, Globex",
            &ExperienceConfig::default(),
        );
        assert_eq!(
            report.seniority_keywords,
            vec!["engineer".to_string(), "staff".to_string()]
        );
        assert_eq!((report.years, report.source), (3, YearsSource::Estimated));
    }

    #[test]
    fn test_junior_profile() {
        let report = analyze_experience("Graduate with 1 year of experience", &ExperienceConfig::default());
        assert_eq!(report.years, 1);
        assert!(!report.is_experienced);
    }
}
