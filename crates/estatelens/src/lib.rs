//! estatelens - real-estate transaction analytics client
//!
//! Composes multi-select filters into API queries, drives the fetch lifecycle
//! of each data source, and turns fetched transactions into monthly trend
//! statistics and summary indicators.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use estatelens::models::{EstateConfig, RangeSelection};
//! use estatelens::client::{FilterPanel, Resource, TradeHistory};
//! use estatelens::analytics::{aggregate_monthly, classify_trend};
//! ```

pub use estatelens_analytics as analytics;
pub use estatelens_client as client;
pub use estatelens_models as models;

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use estatelens_analytics::{aggregate_monthly, classify_trend, summarize_page};
use estatelens_client::{
    fetch_record, CurrentListings, FetchError, FetchOutcome, FetchStatus, FilterPanel,
    HttpTransport, Resource, TradeHistory, Transport, TransportError,
};
use estatelens_models::{
    EstateConfig, MonthlyAggregate, PageSummary, Pagination, TransactionRecord, TrendSummary,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Load and validate a TOML configuration file.
pub fn load_config(path: &Path) -> Result<EstateConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: EstateConfig = toml::from_str(&raw)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &EstateConfig) -> Result<(), ConfigError> {
    let base_url = config.api.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Invalid(format!(
            "api.base_url must start with http:// or https://, got: '{base_url}'"
        )));
    }
    if config.paging.page_size == 0 {
        return Err(ConfigError::Invalid(
            "paging.page_size must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Build a dashboard talking HTTP to the configured API.
pub fn build_dashboard(config: &EstateConfig) -> Result<Dashboard, TransportError> {
    let transport = HttpTransport::from_config(&config.api)?;
    Ok(Dashboard::new(config, Arc::new(transport)))
}

/// Filter panel plus the two data sources it drives.
pub struct Dashboard {
    panel: FilterPanel,
    trades: Arc<Resource<TradeHistory>>,
    listings: Arc<Resource<CurrentListings>>,
    transport: Arc<dyn Transport>,
}

impl Dashboard {
    pub fn new(config: &EstateConfig, transport: Arc<dyn Transport>) -> Self {
        let page_size = config.paging.page_size;
        Self {
            panel: FilterPanel::new(),
            trades: Arc::new(Resource::new(
                TradeHistory,
                transport.clone(),
                page_size,
                config.sources.trade_history.auto_fetch,
            )),
            listings: Arc::new(Resource::new(
                CurrentListings,
                transport.clone(),
                page_size,
                config.sources.current_listings.auto_fetch,
            )),
            transport,
        }
    }

    pub fn filters(&self) -> &FilterPanel {
        &self.panel
    }

    pub fn filters_mut(&mut self) -> &mut FilterPanel {
        &mut self.panel
    }

    pub fn trades(&self) -> &Arc<Resource<TradeHistory>> {
        &self.trades
    }

    pub fn listings(&self) -> &Arc<Resource<CurrentListings>> {
        &self.listings
    }

    /// Initial load: auto-fetching sources request the applied filters.
    pub async fn start(&self) -> (FetchOutcome, FetchOutcome) {
        let filters = self.panel.applied().clone();
        tokio::join!(
            self.trades.on_filters_applied(&filters),
            self.listings.on_filters_applied(&filters)
        )
    }

    /// Apply pending filters and notify both sources.
    pub async fn apply(&mut self) -> (FetchOutcome, FetchOutcome) {
        let filters = self.panel.apply();
        tokio::join!(
            self.trades.on_filters_applied(&filters),
            self.listings.on_filters_applied(&filters)
        )
    }

    /// Reset filters to defaults and notify both sources.
    pub async fn reset(&mut self) -> (FetchOutcome, FetchOutcome) {
        let filters = self.panel.reset();
        tokio::join!(
            self.trades.on_filters_reset(&filters),
            self.listings.on_filters_reset(&filters)
        )
    }

    /// Explicit fetch of current listings, as when their view is opened.
    pub async fn activate_listings(&self) -> FetchOutcome {
        self.listings.fetch().await
    }

    pub async fn record(&self, id: &str) -> Result<TransactionRecord, FetchError> {
        fetch_record(self.transport.as_ref(), id).await
    }

    /// Analytics over the trade history currently held.
    pub fn trade_report(&self, now: NaiveDate) -> SourceReport {
        let state = self.trades.snapshot();
        SourceReport::build(
            state.status,
            state.error_message(),
            &state.items,
            &state.pagination,
            now,
        )
    }

    /// Analytics over the current listings held.
    pub fn listings_report(&self, now: NaiveDate) -> SourceReport {
        let state = self.listings.snapshot();
        SourceReport::build(
            state.status,
            state.error_message(),
            &state.items,
            &state.pagination,
            now,
        )
    }
}

/// Fetch state of one source together with the statistics derived from it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SourceReport {
    pub status: FetchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub pagination: Pagination,
    pub monthly: Vec<MonthlyAggregate>,
    pub trend: TrendSummary,
    pub page: PageSummary,
}

impl SourceReport {
    fn build(
        status: FetchStatus,
        error: Option<String>,
        items: &[TransactionRecord],
        pagination: &Pagination,
        now: NaiveDate,
    ) -> Self {
        Self {
            status,
            error,
            pagination: *pagination,
            monthly: aggregate_monthly(items),
            trend: classify_trend(items, now),
            page: summarize_page(items, pagination),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_page_size_is_invalid() {
        let mut config = EstateConfig::default();
        config.paging.page_size = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn base_url_needs_http_scheme() {
        let mut config = EstateConfig::default();
        config.api.base_url = "localhost:8000/api".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::Invalid(_))));
        config.api.base_url = String::new();
        assert!(matches!(validate(&config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&EstateConfig::default()).is_ok());
    }

    #[test]
    fn report_of_empty_source() {
        let report = SourceReport::build(
            FetchStatus::Idle,
            None,
            &[],
            &Pagination::default(),
            NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
        );
        assert!(report.monthly.is_empty());
        assert_eq!(report.trend, TrendSummary::default());
        assert_eq!(report.page.total_pages, 0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "idle");
        assert!(json.get("error").is_none());
    }
}
