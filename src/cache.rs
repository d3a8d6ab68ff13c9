use std::collections::HashMap;

use crate::models::summary::SymbolSummary;

/// 已计算的推荐汇总缓存，按股票代码索引
///
/// Owned by the caller and passed into the recommendation workflow, so the
/// caller decides when entries are dropped. Iteration follows insertion
/// order, which keeps ranking ties deterministic.
#[derive(Debug, Default)]
pub struct SummaryCache {
    entries: Vec<SymbolSummary>,
    keys: Vec<String>,
    symbol_index: HashMap<String, usize>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbol_index.contains_key(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<&SymbolSummary> {
        self.symbol_index.get(symbol).map(|&idx| &self.entries[idx])
    }

    /// Stores `summary` under `symbol`, replacing any earlier entry in place.
    pub fn insert(&mut self, symbol: &str, summary: SymbolSummary) {
        if let Some(&idx) = self.symbol_index.get(symbol) {
            self.entries[idx] = summary;
        } else {
            self.symbol_index.insert(symbol.to_string(), self.entries.len());
            self.keys.push(symbol.to_string());
            self.entries.push(summary);
        }
    }

    pub fn invalidate(&mut self, symbol: &str) -> Option<SymbolSummary> {
        let idx = self.symbol_index.remove(symbol)?;
        self.keys.remove(idx);
        let removed = self.entries.remove(idx);
        self.rebuild_index();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
        self.symbol_index.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summaries(&self) -> &[SymbolSummary] {
        &self.entries
    }

    fn rebuild_index(&mut self) {
        self.symbol_index.clear();
        for (i, symbol) in self.keys.iter().enumerate() {
            self.symbol_index.insert(symbol.clone(), i);
        }
    }
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

    #[test]
    fn test_insert_and_get() {
        let mut cache = SummaryCache::new();
        cache.insert("AAPL", summary("AAPL", 1.0));
        cache.insert("MSFT", summary("MSFT", 2.0));
        assert!(cache.contains("AAPL"));
        assert!(!cache.contains("IBM"));
        assert_eq!(cache.get("MSFT").unwrap().average_price, 2.0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut cache = SummaryCache::new();
        cache.insert("AAPL", summary("AAPL", 1.0));
        cache.insert("MSFT", summary("MSFT", 2.0));
        cache.insert("AAPL", summary("AAPL", 3.0));
        let order: Vec<&str> = cache.summaries().iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "MSFT"]);
        assert_eq!(cache.get("AAPL").unwrap().average_price, 3.0);
    }

    #[test]
    fn test_invalidate_keeps_index_consistent() {
        let mut cache = SummaryCache::new();
        cache.insert("A", summary("A", 1.0));
        cache.insert("B", summary("B", 2.0));
        cache.insert("C", summary("C", 3.0));

        assert_eq!(cache.invalidate("A").unwrap().symbol, "A");
        assert!(cache.invalidate("A").is_none());
        assert_eq!(cache.get("C").unwrap().average_price, 3.0);
        assert_eq!(cache.get("B").unwrap().average_price, 2.0);

        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.contains("B"));
    }
}
