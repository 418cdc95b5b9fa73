use crate::analytics::sentiment::MissingViewPolicy;

/// 数据源、刷新周期与分析参数
#[derive(Debug, Clone)]
pub struct Config {
    pub source: String,
    pub refresh_interval_secs: u64,
    pub rolling_window: usize,
    pub volatility_window: usize,
    pub missing_view_policy: MissingViewPolicy,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            source: "data/fii_dii.json".to_string(),
            refresh_interval_secs: 300,
            rolling_window: 5,
            volatility_window: 5,
            missing_view_policy: MissingViewPolicy::Neutral,
            request_timeout_secs: 30,
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    pub fn with_refresh_interval_secs(mut self, secs: u64) -> Self {
        // 刷新周期为 0 时无法划分 epoch
        self.refresh_interval_secs = secs.max(1);
        self
    }

    pub fn with_rolling_window(mut self, window: usize) -> Self {
        self.rolling_window = window;
        self
    }

    pub fn with_volatility_window(mut self, window: usize) -> Self {
        self.volatility_window = window;
        self
    }

    pub fn with_missing_view_policy(mut self, policy: MissingViewPolicy) -> Self {
        self.missing_view_policy = policy;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// 数据源是否为 HTTP 地址
    pub fn is_remote_source(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }
}
