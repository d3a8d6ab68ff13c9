// 公开导出的模块，供外部使用
pub mod analysis;
pub mod cache;
pub mod models;
pub mod data_provider;
pub mod errors;

// 为了支持主程序，暂时保持这些模块公开
#[doc(hidden)]
pub mod scrapers;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod services;
#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use analysis::{rank_top, summarize, summarize_with_recommendation};
pub use cache::SummaryCache;
pub use models::equity::{Company, DailyRecord, RecommendationRecord};
pub use models::summary::{Recommendation, SymbolSummary};
pub use data_provider::EquityStore;
pub use errors::{Result, DataHubError};
