use std::env;

/// 默认的 IEX 接口地址
pub const DEFAULT_API_BASE_URL: &str = "https://api.iextrading.com/1.0";

/// Environment variable that overrides the API base url
pub const API_BASE_URL_ENV: &str = "IEX_API_BASE_URL";

pub struct Config {
    pub debug_mode: bool,
    pub debug_symbol_limit: usize,
    pub data_dir: String,
    pub api_base_url: String,
    pub top_n: usize,
    pub request_interval_ms: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            debug_mode: false,
            debug_symbol_limit: 10,
            data_dir: "data".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            top_n: 5,
            request_interval_ms: 500,
        }
    }

    /// 读取环境变量覆盖默认值
    pub fn from_env() -> Self {
        let config = Self::new();
        match env::var(API_BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => config.with_api_base_url(url.trim()),
            _ => config,
        }
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn with_debug_symbol_limit(mut self, limit: usize) -> Self {
        self.debug_symbol_limit = limit;
        self
    }

    pub fn with_data_dir(mut self, dir: &str) -> Self {
        self.data_dir = dir.to_string();
        self
    }

    pub fn with_api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
