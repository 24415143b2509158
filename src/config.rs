use serde::Deserialize;

use crate::models::TimeRangeKind;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub search: SearchConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Remote farm API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_auto_refresh_secs")]
    pub auto_refresh_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub default_time_range: TimeRangeKind,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            auto_refresh_secs: default_auto_refresh_secs(),
            page_size: default_page_size(),
            default_time_range: TimeRangeKind::default(),
        }
    }
}

fn default_auto_refresh_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    crate::models::DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a search is applied.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub path: String,
    #[serde(default = "default_max_recent_searches")]
    pub max_recent_searches: usize,
    #[serde(default = "default_max_drafts")]
    pub max_drafts: usize,
}

fn default_max_recent_searches() -> usize {
    crate::prefs_repo::DEFAULT_RECENT_LIMIT
}

fn default_max_drafts() -> usize {
    crate::prefs_repo::DEFAULT_MAX_DRAFTS
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"),
            "api.base_url must be an http(s) URL, got {:?}",
            self.api.base_url
        );
        anyhow::ensure!(
            self.api.timeout_ms > 0,
            "api.timeout_ms must be > 0, got {}",
            self.api.timeout_ms
        );
        anyhow::ensure!(
            self.dashboard.auto_refresh_secs > 0,
            "dashboard.auto_refresh_secs must be > 0, got {}",
            self.dashboard.auto_refresh_secs
        );
        anyhow::ensure!(
            self.dashboard.page_size > 0,
            "dashboard.page_size must be > 0, got {}",
            self.dashboard.page_size
        );
        anyhow::ensure!(
            !self.storage.path.is_empty(),
            "storage.path must be non-empty"
        );
        anyhow::ensure!(
            self.storage.max_recent_searches > 0,
            "storage.max_recent_searches must be > 0, got {}",
            self.storage.max_recent_searches
        );
        anyhow::ensure!(
            self.storage.max_drafts > 0,
            "storage.max_drafts must be > 0, got {}",
            self.storage.max_drafts
        );
        Ok(())
    }
}
