use crate::models::equity::{Company, DailyRecord};
use crate::errors::Result;
use async_trait::async_trait;

/// 图表数据的时间范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartRange {
    OneMonth,
    OneYear,
}

impl ChartRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartRange::OneMonth => "1m",
            ChartRange::OneYear => "1y",
        }
    }
}

/// Base trait for market data sources
#[async_trait]
pub trait MarketDataSource {
    /// Name of the upstream service, used in logs
    fn source_name(&self) -> &'static str;

    /// Fetch the list of tradable symbols
    async fn fetch_symbols(&self) -> Result<Vec<Company>>;

    /// Fetch daily records for `symbol` over `range`, sorted ascending by date
    async fn fetch_chart(&self, symbol: &str, range: ChartRange) -> Result<Vec<DailyRecord>>;
}
