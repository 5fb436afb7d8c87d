use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::config::MetricsConfig;

lazy_static! {
    static ref PERCENT: Regex = Regex::new(r"\b\d+(?:\.\d+)?\s?%").unwrap();

    static ref DOLLAR: Regex =
        Regex::new(r"(?i)\$\s?\d[\d,]*(?:\.\d+)?\s?(?:[kmb]\b|million\b|billion\b|thousand\b)?").unwrap();

    static ref NUMBER_WITH_UNIT: Regex = Regex::new(
        r"(?i)\b\d[\d,]*(?:\.\d+)?\+?\s?(?:users|customers|clients|people|engineers|members|employees|projects|requests|transactions|servers|hours|days|weeks|ms\b|seconds|downloads|sales|leads|accounts|tickets|deployments|services|applications|countries|markets|stores|sites|students|partners|reports)"
    )
    .unwrap();

    static ref RANGE_CHANGE: Regex = Regex::new(
        r"(?i)\b(?:from\s+)?\$?(?P<from>\d+(?:\.\d+)?)\s?(?:%|[kmb]|ms|s)?\s+(?:to|by)\s+\$?(?P<to>\d+(?:\.\d+)?)"
    )
    .unwrap();

    static ref MULTIPLIER: Regex = Regex::new(r"(?i)\b\d+(?:\.\d+)?x\b").unwrap();
}

/// Matches per pattern. The patterns are independent, so one phrase may count twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricBreakdown {
    pub percentages: usize,
    pub dollar_amounts: usize,
    pub numbers_with_units: usize,
    pub ranges: usize,
    pub multipliers: usize,
}

impl MetricBreakdown {
    pub fn total(&self) -> usize {
        self.percentages
            + self.dollar_amounts
            + self.numbers_with_units
            + self.ranges
            + self.multipliers
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub has_metrics: bool,
    pub metric_count: usize,
    pub breakdown: MetricBreakdown,
}

fn is_year(number: &str) -> bool {
    number.len() == 4 && (number.starts_with("19") || number.starts_with("20"))
}

/// "from 900 to 200" counts; "2021-03 to 2024-06" and "2019 to 2022" are dates.
fn count_ranges(text: &str) -> usize {
    RANGE_CHANGE
        .captures_iter(text)
        .filter(|caps| {
            let Some(whole) = caps.get(0) else {
                return false;
            };
            let inside_date = text[..whole.start()].ends_with(['-', '/']);
            let has_year = [caps.name("from"), caps.name("to")]
                .into_iter()
                .flatten()
                .any(|m| is_year(m.as_str()));
            !inside_date && !has_year
        })
        .count()
}

/// Counts quantified achievements ("cut latency 40%", "$2M revenue", "3x throughput").
pub fn detect_metrics(text: &str, config: &MetricsConfig) -> MetricsReport {
    let breakdown = MetricBreakdown {
        percentages: PERCENT.find_iter(text).count(),
        dollar_amounts: DOLLAR.find_iter(text).count(),
        numbers_with_units: NUMBER_WITH_UNIT.find_iter(text).count(),
        ranges: count_ranges(text),
        multipliers: MULTIPLIER.find_iter(text).count(),
    };
    let metric_count = breakdown.total();

    MetricsReport {
        has_metrics: metric_count >= config.min_metrics,
        metric_count,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_pattern_family() {
        let text = "Cut churn 12%. Saved $1.5M. Onboarded 3,000 users. \
                    Dropped p99 from 900 to 200. Delivered 4x throughput.";
        let report = detect_metrics(text, &MetricsConfig::default());
        assert_eq!(report.breakdown.percentages, 1);
        assert_eq!(report.breakdown.dollar_amounts, 1);
        assert_eq!(report.breakdown.numbers_with_units, 1);
        assert_eq!(report.breakdown.ranges, 1);
        assert_eq!(report.breakdown.multipliers, 1);
        assert!(report.has_metrics);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let config = MetricsConfig::default();
        assert!(!detect_metrics("Grew revenue 10% and margin 5%", &config).has_metrics);
        assert!(detect_metrics("Grew revenue 10%, margin 5% and NPS 20%", &config).has_metrics);
    }

    #[test]
    fn test_years_are_not_metrics() {
        let report = detect_metrics("Acme Corp 2019 - 2022", &MetricsConfig::default());
        assert_eq!(report.metric_count, 0);
    }

    #[test]
    fn test_date_ranges_are_not_metrics() {
        let text = "Staff Engineer\n2021-03 to 2024-06\n03/2019 to 06/2020\n2016 to 2018";
        let report = detect_metrics(text, &MetricsConfig::default());
        assert_eq!(report.breakdown.ranges, 0);
        assert_eq!(report.metric_count, 0);
    }

    #[test]
    fn test_empty_text() {
        let report = detect_metrics("", &MetricsConfig::default());
        assert_eq!(report.metric_count, 0);
        assert!(!report.has_metrics);
    }
}
