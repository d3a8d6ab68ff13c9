use log::info;

use crate::errors::{Result, DataHubError};
use crate::models::equity::{sort_by_date, Company, DailyRecord, RecommendationRecord};
use crate::util::arrow_utils;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const COMPANIES_FILE: &str = "companies.arrow";
pub const EQUITIES_FILE: &str = "equities.arrow";
pub const RECOMMENDATIONS_FILE: &str = "recommendations.arrow";

/// 需要清空的数据表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTarget {
    All,
    /// Only companies with no stored records and no saved recommendation
    Companies,
    Charts,
    Recommendation,
}

impl FromStr for ClearTarget {
    type Err = DataHubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(ClearTarget::All),
            "companies" => Ok(ClearTarget::Companies),
            "charts" => Ok(ClearTarget::Charts),
            "recommendation" => Ok(ClearTarget::Recommendation),
            other => Err(DataHubError::DataError(format!("Unknown table: {}", other))),
        }
    }
}

/// Row counts reported after a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableCounts {
    pub companies: usize,
    pub charts: usize,
    pub recommendation: usize,
}

impl fmt::Display for TableCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Companies: {}, Charts: {}, Recommendation: {}",
            self.companies, self.charts, self.recommendation
        )
    }
}

/// 股票数据存储：公司、日线数据和推荐结果
pub struct EquityStore {
    companies: Vec<Company>,
    records: Vec<DailyRecord>,
    recommendations: Vec<RecommendationRecord>,
    // 索引用于快速查找
    company_index: HashMap<String, usize>,
    record_keys: HashSet<(String, String)>,
}

impl EquityStore {
    pub fn new() -> Self {
        Self::new_with_data(Vec::new(), Vec::new(), Vec::new())
    }

    pub fn new_with_data(
        companies: Vec<Company>,
        records: Vec<DailyRecord>,
        recommendations: Vec<RecommendationRecord>,
    ) -> Self {
        let mut store = Self {
            companies,
            records,
            recommendations,
            company_index: HashMap::new(),
            record_keys: HashSet::new(),
        };

        store.rebuild_indices();
        store
    }

    /// 从目录加载数据，缺失的文件视为空表
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let store = Self::new_with_data(
            arrow_utils::read_companies(&dir.join(COMPANIES_FILE))?,
            arrow_utils::read_records(&dir.join(EQUITIES_FILE))?,
            arrow_utils::read_recommendations(&dir.join(RECOMMENDATIONS_FILE))?,
        );
        info!("Loaded store from {}: {}", dir.display(), store.table_counts());
        Ok(store)
    }

    /// 保存数据到目录
    pub fn save_to_dir(&self, dir: &Path) -> Result<()> {
        arrow_utils::write_batch(
            &dir.join(COMPANIES_FILE),
            &arrow_utils::companies_to_record_batch(&self.companies)?,
        )?;
        arrow_utils::write_batch(
            &dir.join(EQUITIES_FILE),
            &arrow_utils::records_to_record_batch(&self.records)?,
        )?;
        arrow_utils::write_batch(
            &dir.join(RECOMMENDATIONS_FILE),
            &arrow_utils::recommendations_to_record_batch(&self.recommendations)?,
        )?;
        info!("Saved store to {}: {}", dir.display(), self.table_counts());
        Ok(())
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn get_company(&self, symbol: &str) -> Option<&Company> {
        self.company_index.get(symbol).map(|&idx| &self.companies[idx])
    }

    /// Inserts companies whose symbol is not stored yet; returns how many were added.
    pub fn add_companies(&mut self, companies: impl IntoIterator<Item = Company>) -> usize {
        let mut added = 0;
        for company in companies {
            if self.company_index.contains_key(&company.symbol) {
                continue;
            }
            self.company_index.insert(company.symbol.clone(), self.companies.len());
            self.companies.push(company);
            added += 1;
        }
        added
    }

    /// 获取指定股票的日线数据（按日期升序）
    pub fn records_for(&self, symbol: &str) -> Vec<DailyRecord> {
        let mut records: Vec<DailyRecord> = self
            .records
            .iter()
            .filter(|r| r.symbol == symbol)
            .cloned()
            .collect();
        sort_by_date(&mut records);
        records
    }

    /// Inserts records whose (symbol, date) pair is not stored yet; returns how many were added.
    pub fn add_records(&mut self, records: impl IntoIterator<Item = DailyRecord>) -> usize {
        let mut added = 0;
        for record in records {
            if self.record_keys.insert((record.symbol.clone(), record.date.clone())) {
                self.records.push(record);
                added += 1;
            }
        }
        added
    }

    pub fn recommendations(&self) -> &[RecommendationRecord] {
        &self.recommendations
    }

    /// Replaces every saved recommendation, keeping the first row per symbol.
    pub fn replace_recommendations(&mut self, rows: impl IntoIterator<Item = RecommendationRecord>) -> usize {
        self.recommendations.clear();
        let mut seen = HashSet::new();
        for row in rows {
            if seen.insert(row.symbol.clone()) {
                self.recommendations.push(row);
            }
        }
        self.recommendations.len()
    }

    pub fn clear(&mut self, target: ClearTarget) {
        match target {
            ClearTarget::All => {
                self.records.clear();
                self.recommendations.clear();
                self.companies.clear();
            }
            ClearTarget::Companies => {
                let referenced: HashSet<&str> = self
                    .records
                    .iter()
                    .map(|r| r.symbol.as_str())
                    .chain(self.recommendations.iter().map(|r| r.symbol.as_str()))
                    .collect();
                let kept: Vec<Company> = self
                    .companies
                    .iter()
                    .filter(|c| referenced.contains(c.symbol.as_str()))
                    .cloned()
                    .collect();
                self.companies = kept;
            }
            ClearTarget::Charts => self.records.clear(),
            ClearTarget::Recommendation => self.recommendations.clear(),
        }
        self.rebuild_indices();
    }

    pub fn table_counts(&self) -> TableCounts {
        TableCounts {
            companies: self.companies.len(),
            charts: self.records.len(),
            recommendation: self.recommendations.len(),
        }
    }

    /// 获取最新交易日期
    pub fn latest_trading_date(&self) -> Option<&str> {
        self.records.iter().map(|r| r.date.as_str()).max()
    }

    /// 重建索引
    fn rebuild_indices(&mut self) {
        self.company_index.clear();
        self.record_keys.clear();

        for (i, company) in self.companies.iter().enumerate() {
            self.company_index.entry(company.symbol.clone()).or_insert(i);
        }
        for record in &self.records {
            self.record_keys.insert((record.symbol.clone(), record.date.clone()));
        }
    }
}

impl Default for EquityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn company(symbol: &str) -> Company {
        Company {
            symbol: symbol.to_string(),
            name: format!("{} Inc.", symbol),
            date: "2018-04-19".to_string(),
            is_enabled: true,
            kind: "cs".to_string(),
            iex_id: String::new(),
        }
    }

    fn record(symbol: &str, date: &str, high: f32) -> DailyRecord {
        DailyRecord {
            symbol: symbol.to_string(),
            date: date.to_string(),
            open: high,
            high,
            low: high,
            close: high,
            volume: 1_000_000,
        }
    }

    fn saved(symbol: &str) -> RecommendationRecord {
        RecommendationRecord {
            symbol: symbol.to_string(),
            last_date: "2018-04-20".to_string(),
            last_open: 1.0,
            last_high: 1.0,
            last_low: 1.0,
            last_close: 1.0,
            last_volume: 1,
            average_volume: 1.0,
            average_price: 1.0,
            high_price: 1.0,
            low_price: 1.0,
            recommendation: "Sell".to_string(),
        }
    }

    #[test]
    fn test_add_companies_skips_existing_symbols() {
        let mut store = EquityStore::new();
        assert_eq!(store.add_companies(vec![company("A"), company("B")]), 2);
        assert_eq!(store.add_companies(vec![company("B"), company("C")]), 1);
        assert_eq!(store.companies().len(), 3);
        assert_eq!(store.get_company("C").unwrap().name, "C Inc.");
    }

    #[test]
    fn test_add_records_dedupes_by_symbol_and_date() {
        let mut store = EquityStore::new();
        store.add_records(vec![record("A", "2018-04-20", 2.0), record("A", "2018-04-19", 1.0)]);
        let added = store.add_records(vec![
            record("A", "2018-04-20", 9.0),
            record("B", "2018-04-20", 3.0),
        ]);
        assert_eq!(added, 1);

        let a = store.records_for("A");
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].date, "2018-04-19");
        assert_eq!(a[1].high, 2.0);
        assert_eq!(store.latest_trading_date(), Some("2018-04-20"));
    }

    #[test]
    fn test_replace_recommendations() {
        let mut store = EquityStore::new();
        store.replace_recommendations(vec![saved("A"), saved("B")]);
        assert_eq!(store.replace_recommendations(vec![saved("C"), saved("C")]), 1);
        assert_eq!(store.recommendations()[0].symbol, "C");
    }

    #[test]
    fn test_clear_companies_keeps_referenced() {
        let mut store = EquityStore::new();
        store.add_companies(vec![company("A"), company("B"), company("C")]);
        store.add_records(vec![record("A", "2018-04-20", 1.0)]);
        store.replace_recommendations(vec![saved("C")]);

        store.clear(ClearTarget::Companies);
        let symbols: Vec<&str> = store.companies().iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["A", "C"]);
        assert!(store.get_company("B").is_none());
        assert!(store.get_company("C").is_some());
    }

    #[test]
    fn test_clear_targets() {
        let mut store = EquityStore::new();
        store.add_companies(vec![company("A")]);
        store.add_records(vec![record("A", "2018-04-20", 1.0)]);
        store.replace_recommendations(vec![saved("A")]);

        store.clear(ClearTarget::Recommendation);
        assert_eq!(store.table_counts(), TableCounts { companies: 1, charts: 1, recommendation: 0 });
        store.clear(ClearTarget::Charts);
        assert_eq!(store.table_counts(), TableCounts { companies: 1, charts: 0, recommendation: 0 });
        // records can be added again once cleared
        assert_eq!(store.add_records(vec![record("A", "2018-04-20", 1.0)]), 1);
        store.clear(ClearTarget::All);
        assert_eq!(store.table_counts(), TableCounts::default());
    }

    #[test]
    fn test_parse_clear_target() {
        assert_eq!("all".parse::<ClearTarget>().unwrap(), ClearTarget::All);
        assert_eq!("Companies".parse::<ClearTarget>().unwrap(), ClearTarget::Companies);
        assert_eq!("CHARTS".parse::<ClearTarget>().unwrap(), ClearTarget::Charts);
        assert_eq!("Recommendation".parse::<ClearTarget>().unwrap(), ClearTarget::Recommendation);
        assert!("equities".parse::<ClearTarget>().is_err());
    }

    #[test]
    fn test_save_and_load_dir() {
        let dir = tempdir().unwrap();

        let mut store = EquityStore::new();
        store.add_companies(vec![company("A")]);
        store.add_records(vec![record("A", "2018-04-19", 1.5), record("A", "2018-04-20", 2.5)]);
        store.replace_recommendations(vec![saved("A")]);
        store.save_to_dir(dir.path()).unwrap();

        let loaded = EquityStore::load_from_dir(dir.path()).unwrap();
        assert_eq!(loaded.table_counts(), store.table_counts());
        assert_eq!(loaded.records_for("A"), store.records_for("A"));
        assert_eq!(loaded.companies(), store.companies());
        assert_eq!(loaded.recommendations(), store.recommendations());
    }

    #[test]
    fn test_load_empty_dir() {
        let dir = tempdir().unwrap();
        let store = EquityStore::load_from_dir(dir.path()).unwrap();
        assert_eq!(store.table_counts(), TableCounts::default());
    }
}
