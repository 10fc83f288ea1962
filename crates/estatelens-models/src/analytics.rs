use serde::{Deserialize, Serialize};

/// Price statistics for one calendar month of transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyAggregate {
    /// Zero-padded `YYYY-MM`.
    pub key: String,
    pub average_price: f64,
    pub max_price: u64,
    pub min_price: u64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    #[default]
    Stable,
}

/// Headline indicators over a batch of transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TrendSummary {
    pub overall_average: f64,
    /// Recent-window average relative to the prior window, in percent.
    pub change_rate_percent: f64,
    pub trend_direction: TrendDirection,
    /// Number of records with a positive amount.
    pub total_count: usize,
}

/// Header statistics for the page of records currently displayed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PageSummary {
    pub count: usize,
    pub average_price: f64,
    pub average_area: f64,
    pub average_price_per_pyeong: f64,
    /// Records carrying any building metric.
    pub with_building_info: usize,
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_direction_serialization() {
        assert_eq!(serde_json::to_string(&TrendDirection::Up).unwrap(), "\"up\"");
        assert_eq!(
            serde_json::to_string(&TrendDirection::Stable).unwrap(),
            "\"stable\""
        );
    }

    #[test]
    fn default_summary_is_zero_and_stable() {
        let summary = TrendSummary::default();
        assert_eq!(summary.overall_average, 0.0);
        assert_eq!(summary.change_rate_percent, 0.0);
        assert_eq!(summary.trend_direction, TrendDirection::Stable);
        assert_eq!(summary.total_count, 0);
    }
}
