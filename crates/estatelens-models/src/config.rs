use serde::{Deserialize, Serialize};

/// Top-level configuration for estatelens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EstateConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub paging: PagingConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// Where the transaction API lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds. A timed-out request is reported as a generic failure.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PagingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourcesConfig {
    #[serde(default = "SourceConfig::auto")]
    pub trade_history: SourceConfig,
    #[serde(default = "SourceConfig::manual")]
    pub current_listings: SourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            trade_history: SourceConfig::auto(),
            current_listings: SourceConfig::manual(),
        }
    }
}

/// Per data source settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Refetch automatically whenever the applied filter changes.
    #[serde(default = "default_true")]
    pub auto_fetch: bool,
}

impl SourceConfig {
    pub fn auto() -> Self {
        Self { auto_fetch: true }
    }

    /// Fetched only on explicit calls, e.g. when its tab becomes active.
    pub fn manual() -> Self {
        Self { auto_fetch: false }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> u32 {
    50
}
fn default_true() -> bool {
    true
}
