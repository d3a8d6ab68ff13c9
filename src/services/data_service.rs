use crate::analysis::{rank_top, summarize, summarize_with_recommendation};
use crate::cache::SummaryCache;
use crate::config::Config;
use crate::data_provider::{ClearTarget, EquityStore, TableCounts};
use crate::errors::{Result, DataHubError};
use crate::models::equity::{sort_by_date, Company, RecommendationRecord};
use crate::models::summary::SymbolSummary;
use crate::scrapers::base::{ChartRange, MarketDataSource};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 数据服务，处理数据的获取、汇总和存储
pub struct DataService {
    config: Config,
    source: Arc<dyn MarketDataSource + Send + Sync>,
    data_path: PathBuf,
}

impl DataService {
    pub fn new(config: Config, source: Arc<dyn MarketDataSource + Send + Sync>) -> Self {
        let data_path = PathBuf::from(&config.data_dir);
        Self {
            config,
            source,
            data_path,
        }
    }

    /// 获取数据目录
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn load_store(&self) -> Result<EquityStore> {
        EquityStore::load_from_dir(&self.data_path)
    }

    /// 获取全部股票代码
    pub async fn symbols(&self) -> Result<Vec<Company>> {
        let mut companies = self.source.fetch_symbols().await?;

        // 调试模式：只处理前N个股票
        if self.config.debug_mode {
            let original_count = companies.len();
            companies.truncate(self.config.debug_symbol_limit);
            info!("DEBUG MODE: Keeping only {} out of {} symbols from {}",
                  companies.len(), original_count, self.source.source_name());
        }

        Ok(companies)
    }

    /// Stores companies not saved yet and returns how many were added.
    pub async fn populate_symbols(&self, companies: Vec<Company>) -> Result<usize> {
        let mut store = self.load_store()?;
        let added = store.add_companies(companies);
        store.save_to_dir(&self.data_path)?;

        info!("Added {} new companies", added);
        Ok(added)
    }

    /// 获取一年的日线数据并汇总
    pub async fn chart(&self, symbol: &str) -> Result<SymbolSummary> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Ok(SymbolSummary::empty());
        }

        let mut records = self.source.fetch_chart(symbol, ChartRange::OneYear).await?;
        sort_by_date(&mut records);
        Ok(summarize(&records))
    }

    /// Fetches one year for `symbol`, stores the records not saved yet and
    /// returns the chart summary.
    pub async fn save_chart(&self, symbol: &str) -> Result<SymbolSummary> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(DataHubError::DataError("A symbol is required to save a chart".to_string()));
        }

        let mut records = self.source.fetch_chart(symbol, ChartRange::OneYear).await?;
        sort_by_date(&mut records);

        let mut store = self.load_store()?;
        let added = store.add_records(records.iter().cloned());
        store.save_to_dir(&self.data_path)?;
        info!("Stored {} new daily records for {}", added, symbol);

        Ok(summarize(&records))
    }

    /// 计算已保存公司的推荐结果并返回排名前 `top_n` 的汇总
    ///
    /// Symbols already in `cache` are not fetched again. Symbols whose fetch
    /// fails, returns no records or has no positive high are logged and skipped.
    pub async fn recommendation(&self, cache: &mut SummaryCache) -> Result<Vec<SymbolSummary>> {
        let store = self.load_store()?;
        let companies = store.companies();
        if companies.is_empty() {
            info!("No stored companies, nothing to recommend");
            return Ok(Vec::new());
        }

        for company in companies {
            let symbol = company.symbol.as_str();
            if cache.contains(symbol) {
                debug!("Using cached summary for {}", symbol);
                continue;
            }

            let mut records = match self.source.fetch_chart(symbol, ChartRange::OneMonth).await {
                Ok(records) => records,
                Err(e) => {
                    warn!("Failed to fetch one month of data for {}: {}", symbol, e);
                    continue;
                }
            };
            sort_by_date(&mut records);
            if records.is_empty() {
                warn!("No daily records for {}, skipping", symbol);
                continue;
            }

            match summarize_with_recommendation(&records) {
                Ok(summary) => cache.insert(symbol, summary),
                Err(DataHubError::NoValidPriceData(_)) => {
                    warn!("No valid price data for {}, skipping", symbol);
                }
                Err(e) => return Err(e),
            }
        }

        let ranked = rank_top(cache.summaries().iter().cloned(), self.config.top_n);
        info!("Ranked {} of {} summarized symbols", ranked.len(), cache.len());
        Ok(ranked)
    }

    /// Replaces the saved recommendations with the current ranking from `cache`.
    pub async fn save_recommendation(&self, cache: &SummaryCache) -> Result<usize> {
        let ranked = rank_top(cache.summaries().iter().cloned(), self.config.top_n);
        let rows: Vec<RecommendationRecord> = ranked
            .iter()
            .filter_map(RecommendationRecord::from_summary)
            .collect();

        let mut store = self.load_store()?;
        let saved = store.replace_recommendations(rows);
        store.save_to_dir(&self.data_path)?;

        info!("Saved {} recommendations", saved);
        Ok(saved)
    }

    /// 清空数据表并返回各表的记录数
    pub async fn refresh(&self, target: ClearTarget, cache: &mut SummaryCache) -> Result<TableCounts> {
        let mut store = self.load_store()?;
        store.clear(target);
        store.save_to_dir(&self.data_path)?;

        // 推荐结果需要重新计算
        cache.clear();

        let counts = store.table_counts();
        info!("Cleared {:?}: {}", target, counts);
        Ok(counts)
    }
}
