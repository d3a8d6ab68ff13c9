use crate::analysis::aggregator::summarize;
use crate::errors::{DataHubError, Result};
use crate::models::equity::DailyRecord;
use crate::models::summary::{Recommendation, SymbolSummary};

/// 汇总并给出买卖建议
///
/// `high_price` is the highest high in the window. `low_price` is the lowest
/// high among records with a positive high; zero or negative highs are
/// placeholders and only excluded from the floor. A window whose highs are
/// all non-positive returns [`DataHubError::NoValidPriceData`].
pub fn summarize_with_recommendation(records: &[DailyRecord]) -> Result<SymbolSummary> {
    let mut summary = summarize(records);
    if records.is_empty() {
        summary.high_price = Some(0.0);
        summary.low_price = Some(0.0);
        return Ok(summary);
    }

    let high_price = records
        .iter()
        .map(|r| r.high as f64)
        .fold(f64::NEG_INFINITY, f64::max);
    let low_price = records
        .iter()
        .map(|r| r.high as f64)
        .filter(|high| *high > 0.0)
        .reduce(f64::min)
        .ok_or_else(|| DataHubError::NoValidPriceData(summary.symbol.clone()))?;

    summary.recommendation = recommend(high_price, summary.average_price, low_price);
    summary.high_price = Some(high_price);
    summary.low_price = Some(low_price);
    Ok(summary)
}

/// Buy when the average sits closer to the ceiling than to the floor; a tie is Sell.
pub fn recommend(high_price: f64, average_price: f64, low_price: f64) -> Recommendation {
    if (high_price - average_price) < (average_price - low_price) {
        Recommendation::Buy
    } else {
        Recommendation::Sell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, high: f32, volume: u64) -> DailyRecord {
        DailyRecord {
            symbol: "TSLA".to_string(),
            date: date.to_string(),
            open: high,
            high,
            low: high,
            close: high,
            volume,
        }
    }

    #[test]
    fn test_recommend_boundaries() {
        assert_eq!(recommend(110.0, 100.0, 95.0), Recommendation::Sell);
        assert_eq!(recommend(105.0, 100.0, 80.0), Recommendation::Buy);
        assert_eq!(recommend(110.0, 100.0, 90.0), Recommendation::Sell);
    }

    #[test]
    fn test_two_day_window_is_sell() {
        let records = vec![
            record("2020-01-01", 10.0, 2_000_000),
            record("2020-01-02", 20.0, 4_000_000),
        ];
        let summary = summarize_with_recommendation(&records).unwrap();

        assert_eq!(summary.average_price, 15.0);
        assert_eq!(summary.average_volume_in_millions, 3.0);
        assert_eq!(summary.volume_series_in_millions, vec![2, 4]);
        assert_eq!(summary.high_price, Some(20.0));
        assert_eq!(summary.low_price, Some(10.0));
        assert_eq!(summary.recommendation, Recommendation::Sell);
    }

    #[test]
    fn test_buy_when_average_near_ceiling() {
        // high 110, low 80, avg (80 + 105 + 105 + 110) / 4 = 100
        let records = vec![
            record("2020-01-01", 80.0, 1),
            record("2020-01-02", 105.0, 1),
            record("2020-01-03", 105.0, 1),
            record("2020-01-06", 110.0, 1),
        ];
        let summary = summarize_with_recommendation(&records).unwrap();
        assert_eq!(summary.average_price, 100.0);
        assert_eq!(summary.high_price, Some(110.0));
        assert_eq!(summary.low_price, Some(80.0));
        assert_eq!(summary.recommendation, Recommendation::Buy);
    }

    #[test]
    fn test_non_positive_highs_excluded_from_floor_only() {
        let records = vec![
            record("2020-01-01", 0.0, 1_000_000),
            record("2020-01-02", 12.0, 1_000_000),
            record("2020-01-03", 18.0, 1_000_000),
        ];
        let summary = summarize_with_recommendation(&records).unwrap();
        assert_eq!(summary.low_price, Some(12.0));
        assert_eq!(summary.high_price, Some(18.0));
        // the zero still counts toward the average
        assert_eq!(summary.average_price, 10.0);
        // (18 - 10) < (10 - 12) is false
        assert_eq!(summary.recommendation, Recommendation::Sell);
    }

    #[test]
    fn test_all_zero_highs_is_no_valid_price_data() {
        let records = vec![record("2020-01-01", 0.0, 1), record("2020-01-02", 0.0, 1)];
        match summarize_with_recommendation(&records) {
            Err(DataHubError::NoValidPriceData(symbol)) => assert_eq!(symbol, "TSLA"),
            other => panic!("expected NoValidPriceData, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_window() {
        let summary = summarize_with_recommendation(&[]).unwrap();
        assert_eq!(summary.high_price, Some(0.0));
        assert_eq!(summary.low_price, Some(0.0));
        assert_eq!(summary.recommendation, Recommendation::None);
        assert!(summary.latest_record.is_none());
    }
}
