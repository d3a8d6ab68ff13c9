use std::cmp::Ordering;

use crate::models::summary::SymbolSummary;

/// 按平均价格降序排列并截取前 `limit` 个
///
/// The sort is stable, so summaries with equal average prices keep their
/// input order.
pub fn rank_top<I>(summaries: I, limit: usize) -> Vec<SymbolSummary>
where
    I: IntoIterator<Item = SymbolSummary>,
{
    let mut ranked: Vec<SymbolSummary> = summaries.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.average_price
            .partial_cmp(&a.average_price)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(symbol: &str, average_price: f64) -> SymbolSummary {
        SymbolSummary {
            symbol: symbol.to_string(),
            average_price,
            ..SymbolSummary::empty()
        }
    }

    fn symbols(ranked: &[SymbolSummary]) -> Vec<&str> {
        ranked.iter().map(|s| s.symbol.as_str()).collect()
    }

    #[test]
    fn test_truncates_to_limit() {
        let input = vec![
            summary("A", 10.0),
            summary("B", 70.0),
            summary("C", 30.0),
            summary("D", 50.0),
            summary("E", 20.0),
            summary("F", 60.0),
            summary("G", 40.0),
        ];
        let ranked = rank_top(input, 5);
        assert_eq!(symbols(&ranked), vec!["B", "F", "D", "G", "C"]);
        for pair in ranked.windows(2) {
            assert!(pair[0].average_price >= pair[1].average_price);
        }
    }

    #[test]
    fn test_returns_all_when_under_limit() {
        let ranked = rank_top(vec![summary("A", 1.0), summary("B", 2.0)], 5);
        assert_eq!(symbols(&ranked), vec!["B", "A"]);
        assert!(rank_top(Vec::new(), 5).is_empty());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let input = vec![summary("X", 5.0), summary("Y", 9.0), summary("Z", 5.0)];
        let ranked = rank_top(input, 3);
        assert_eq!(symbols(&ranked), vec!["Y", "X", "Z"]);
    }

    #[test]
    fn test_zero_limit() {
        assert!(rank_top(vec![summary("A", 1.0)], 0).is_empty());
    }
}
