//! Tunable thresholds for every detector, the aggregator and the validator.
//!
//! Defaults are the production constants. A JSON file with any subset of these
//! fields can override them at startup (see `Config::analysis_config_path`).

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub bullets: BulletConfig,
    pub contact: ContactConfig,
    pub dates: DateConfig,
    pub name: NameConfig,
    pub summary: SummaryConfig,
    pub metrics: MetricsConfig,
    pub format: FormatConfig,
    pub experience: ExperienceConfig,
    pub length: LengthConfig,
    pub penalties: PenaltyConfig,
    pub validator: ValidatorConfig,
}

impl AnalysisConfig {
    /// Loads overrides from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read analysis config '{}'", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid analysis config '{}'", path.display()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    /// Minimum total bullets for an optimal résumé. Also gates the fallback passes.
    pub min_total: usize,
    /// Minimum bullets attributed to the experience section.
    pub min_experience: usize,
    /// A marker-only line may carry at most this many characters.
    pub marker_max_len: usize,
    /// How many lines after a marker are searched for its content.
    pub lookahead: usize,
    /// Content following a short marker line must be at least this long.
    pub substantial_min_len: usize,
    /// Content following an exact glyph line must be at least this long.
    pub content_min_len: usize,
    /// Fallback pass looks for a glyph within this many leading characters.
    pub fallback_window: usize,
    pub implicit_min_words: usize,
    pub implicit_max_words: usize,
    pub implicit_max_len: usize,
    pub implicit_verb_min_len: usize,
    /// Implicit signals below this count are reported as zero.
    pub implicit_min_signals: usize,
    pub experience_verb_min_len: usize,
    pub nonstandard_max_len: usize,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            min_total: 5,
            min_experience: 3,
            marker_max_len: 3,
            lookahead: 3,
            substantial_min_len: 15,
            content_min_len: 3,
            fallback_window: 4,
            implicit_min_words: 2,
            implicit_max_words: 6,
            implicit_max_len: 60,
            implicit_verb_min_len: 30,
            implicit_min_signals: 3,
            experience_verb_min_len: 20,
            nonstandard_max_len: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub char_window: usize,
    pub line_window: usize,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            char_window: 300,
            line_window: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DateConfig {
    pub min_dates: usize,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self { min_dates: 2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NameConfig {
    pub char_window: usize,
    pub max_lines: usize,
    pub max_len: usize,
    pub min_words: usize,
    pub max_words: usize,
    pub fallback_window: usize,
}

impl Default for NameConfig {
    fn default() -> Self {
        Self {
            char_window: 200,
            max_lines: 3,
            max_len: 50,
            min_words: 2,
            max_words: 4,
            fallback_window: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub min_words: usize,
    /// Characters after the header that are inspected for summary content.
    pub lookahead_chars: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            min_words: 10,
            lookahead_chars: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub min_metrics: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { min_metrics: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Total characters below which a multi-page PDF is treated as scanned.
    pub multi_page_min_chars: usize,
    /// Total characters below which any PDF is treated as scanned.
    pub single_page_min_chars: usize,
    pub table_min_columns: usize,
    pub table_min_lines: usize,
    pub column_window: usize,
    pub short_line_max: usize,
    pub long_line_min: usize,
    pub inner_gap_min: usize,
    pub zigzag_delta: usize,
    pub column_high_lines: usize,
    pub column_high_ratio: f64,
    pub column_medium_lines: usize,
    pub column_medium_ratio: f64,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            multi_page_min_chars: 500,
            single_page_min_chars: 100,
            table_min_columns: 3,
            table_min_lines: 3,
            column_window: 100,
            short_line_max: 25,
            long_line_min: 90,
            inner_gap_min: 4,
            zigzag_delta: 45,
            column_high_lines: 12,
            column_high_ratio: 0.35,
            column_medium_lines: 6,
            column_medium_ratio: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceConfig {
    pub experienced_min_years: u32,
    pub keyword_low_threshold: usize,
    pub keyword_high_threshold: usize,
    pub keyword_low_years: u32,
    pub keyword_high_years: u32,
    pub max_years: u32,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            experienced_min_years: 3,
            keyword_low_threshold: 2,
            keyword_high_threshold: 4,
            keyword_low_years: 3,
            keyword_high_years: 7,
            max_years: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthConfig {
    pub min_words: usize,
    pub max_words: usize,
    pub max_pages: usize,
    pub words_per_page: usize,
}

impl Default for LengthConfig {
    fn default() -> Self {
        Self {
            min_words: 200,
            max_words: 1000,
            max_pages: 2,
            words_per_page: 500,
        }
    }
}

/// Points subtracted from the parseability baseline when a finding fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyConfig {
    pub baseline: i32,
    pub scanned_image: i32,
    pub tables: i32,
    pub multi_column_high: i32,
    pub multi_column_medium: i32,
    pub placeholder_dates: i32,
    pub missing_dates: i32,
    pub missing_contact: i32,
    pub contact_not_at_top: i32,
    pub contact_in_header: i32,
    pub missing_name: i32,
    pub missing_summary: i32,
    pub too_short: i32,
    pub too_long: i32,
    pub too_many_pages: i32,
    pub insufficient_bullets: i32,
    pub insufficient_metrics: i32,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            baseline: 90,
            scanned_image: 50,
            tables: 15,
            multi_column_high: 15,
            multi_column_medium: 7,
            placeholder_dates: 20,
            missing_dates: 15,
            missing_contact: 20,
            contact_not_at_top: 5,
            contact_in_header: 5,
            missing_name: 15,
            missing_summary: 5,
            too_short: 10,
            too_long: 5,
            too_many_pages: 5,
            insufficient_bullets: 10,
            insufficient_metrics: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub parseability: f64,
    pub format: f64,
    pub keyword: f64,
    pub contact: f64,
    pub content: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            parseability: 0.25,
            format: 0.25,
            keyword: 0.25,
            contact: 0.10,
            content: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub weights: CategoryWeights,
    /// Share of a category score taken from the AI sub-score when one is present.
    pub ai_blend: f64,
    /// Overall score ceiling for documents that look like scanned images.
    pub scanned_ceiling: u8,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            weights: CategoryWeights::default(),
            ai_blend: 0.6,
            scanned_ceiling: 35,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_weights_sum_to_one() {
        let w = CategoryWeights::default();
        let sum = w.parseability + w.format + w.keyword + w.contact + w.content;
        assert!((sum - 1.0).abs() < 1e-9, "weights sum to {sum}");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{"bullets": {"min_total": 8}, "penalties": {"baseline": 95}}"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.bullets.min_total, 8);
        assert_eq!(config.bullets.min_experience, 3);
        assert_eq!(config.penalties.baseline, 95);
        assert_eq!(config.penalties.scanned_image, 50);
        assert_eq!(config.contact.char_window, 300);
    }

    #[test]
    fn test_from_json_file_missing_path_errors() {
        let err = AnalysisConfig::from_json_file(Path::new("/nonexistent/analysis.json"));
        assert!(err.is_err());
    }
}
