use serde::{Serialize, Serializer};
use std::fmt;

use crate::models::equity::DailyRecord;

/// 买卖信号，空字符串表示没有数据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recommendation {
    #[default]
    None,
    Buy,
    Sell,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::None => "",
            Recommendation::Buy => "Buy",
            Recommendation::Sell => "Sell",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for Recommendation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Derived statistics for one symbol over a window of daily records.
///
/// The three series are aligned index for index with the input records.
/// `high_price`, `low_price` and `recommendation` are only filled in by
/// [`crate::analysis::recommendation::summarize_with_recommendation`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SymbolSummary {
    pub symbol: String,
    pub latest_record: Option<DailyRecord>,
    pub date_series: Vec<String>,
    pub high_series: Vec<f32>,
    pub volume_series_in_millions: Vec<u64>,
    pub average_price: f64,
    pub average_volume_in_millions: f64,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub recommendation: Recommendation,
}

impl SymbolSummary {
    /// Summary of an empty window
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.latest_record.is_none()
    }

    // 图表使用的逗号分隔序列
    pub fn dates_csv(&self) -> String {
        self.date_series.join(",")
    }

    pub fn prices_csv(&self) -> String {
        join(&self.high_series)
    }

    pub fn volumes_csv(&self) -> String {
        join(&self.volume_series_in_millions)
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::summarize;

    #[test]
    fn test_recommendation_labels() {
        assert_eq!(Recommendation::None.to_string(), "");
        assert_eq!(Recommendation::Buy.to_string(), "Buy");
        assert_eq!(Recommendation::Sell.to_string(), "Sell");
        assert_eq!(serde_json::to_string(&Recommendation::Buy).unwrap(), "\"Buy\"");
    }

    #[test]
    fn test_chart_series_csv() {
        let records = vec![
            DailyRecord {
                symbol: "MSFT".to_string(),
                date: "2020-01-01".to_string(),
                open: 9.0,
                high: 10.5,
                low: 8.0,
                close: 10.0,
                volume: 2_500_000,
            },
            DailyRecord {
                symbol: "MSFT".to_string(),
                date: "2020-01-02".to_string(),
                open: 10.0,
                high: 12.0,
                low: 9.5,
                close: 11.0,
                volume: 999_999,
            },
        ];
        let summary = summarize(&records);
        assert_eq!(summary.dates_csv(), "2020-01-01,2020-01-02");
        assert_eq!(summary.prices_csv(), "10.5,12");
        assert_eq!(summary.volumes_csv(), "2,0");
    }

    #[test]
    fn test_empty_summary_serializes_blank_recommendation() {
        let json = serde_json::to_value(SymbolSummary::empty()).unwrap();
        assert_eq!(json["recommendation"], "");
        assert!(json["latest_record"].is_null());
        assert_eq!(json["average_price"], 0.0);
    }
}
