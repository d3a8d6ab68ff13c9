use crate::analysis::VOLUME_SCALE;
use crate::models::equity::DailyRecord;
use crate::models::summary::SymbolSummary;

/// 将按日期升序排列的日线数据汇总为统计信息
///
/// The last record is taken as the current one; the input is not re-sorted.
/// An empty window yields [`SymbolSummary::empty`].
pub fn summarize(records: &[DailyRecord]) -> SymbolSummary {
    let Some(current) = records.last() else {
        return SymbolSummary::empty();
    };

    let count = records.len() as f64;
    let average_price = records.iter().map(|r| r.high as f64).sum::<f64>() / count;
    let average_volume = records.iter().map(|r| r.volume as f64).sum::<f64>() / count;

    SymbolSummary {
        symbol: current.symbol.clone(),
        latest_record: Some(current.clone()),
        date_series: records.iter().map(|r| r.date.clone()).collect(),
        high_series: records.iter().map(|r| r.high).collect(),
        volume_series_in_millions: records.iter().map(|r| r.volume / VOLUME_SCALE).collect(),
        average_price,
        average_volume_in_millions: average_volume / VOLUME_SCALE as f64,
        ..SymbolSummary::empty()
    }
}
