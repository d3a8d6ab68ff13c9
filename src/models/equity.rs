use serde::Serialize;

use crate::models::summary::SymbolSummary;

/// 上市公司（IEX 代码表中的一项）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Company {
    pub symbol: String,
    pub name: String,
    pub date: String,
    pub is_enabled: bool,
    /// IEX security type code, e.g. `cs` for common stock
    pub kind: String,
    pub iex_id: String,
}

/// 日线数据结构
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    pub symbol: String,
    /// ISO calendar day, `YYYY-MM-DD`
    pub date: String,
    pub open: f32,
    pub high: f32,
    pub low: f32,
    pub close: f32,
    pub volume: u64,
}

/// Persisted form of a ranked summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRecord {
    pub symbol: String,
    pub last_date: String,
    pub last_open: f32,
    pub last_high: f32,
    pub last_low: f32,
    pub last_close: f32,
    pub last_volume: u64,
    pub average_volume: f64,
    pub average_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub recommendation: String,
}

impl RecommendationRecord {
    /// Returns `None` for a summary built from an empty window.
    pub fn from_summary(summary: &SymbolSummary) -> Option<Self> {
        let current = summary.latest_record.as_ref()?;
        Some(Self {
            symbol: current.symbol.clone(),
            last_date: current.date.clone(),
            last_open: current.open,
            last_high: current.high,
            last_low: current.low,
            last_close: current.close,
            last_volume: current.volume,
            average_volume: summary.average_volume_in_millions,
            average_price: summary.average_price,
            high_price: summary.high_price.unwrap_or_default(),
            low_price: summary.low_price.unwrap_or_default(),
            recommendation: summary.recommendation.to_string(),
        })
    }
}

/// 按日期升序排序，保证最后一条为最新数据
pub fn sort_by_date(records: &mut [DailyRecord]) {
    records.sort_by(|a, b| a.date.cmp(&b.date));
}
