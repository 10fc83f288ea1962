use estatelens_models::{ComposedQuery, ListResponse, TransactionRecord};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{FetchError, TransportError};
use crate::transport::Transport;

/// One independently fetched, paginated collection.
///
/// A data source fixes the item type, the endpoint, and how a composed query
/// becomes request parameters.
pub trait DataSource: Send + Sync + 'static {
    type Item: DeserializeOwned + Clone + Send + Sync + 'static;

    fn name(&self) -> &'static str;
    fn path(&self) -> &str;
    fn params(&self, query: &ComposedQuery) -> Vec<(String, String)>;
    /// Message shown when a failure carries no server-provided detail.
    fn fallback_message(&self) -> &str;
}

/// Registered trade history (실거래가), used for price analysis.
#[derive(Debug, Clone, Copy, Default)]
pub struct TradeHistory;

impl DataSource for TradeHistory {
    type Item = TransactionRecord;

    fn name(&self) -> &'static str {
        "trade_history"
    }

    fn path(&self) -> &str {
        "/properties/trades"
    }

    fn params(&self, query: &ComposedQuery) -> Vec<(String, String)> {
        query.to_params()
    }

    fn fallback_message(&self) -> &str {
        "실거래가 조회 중 오류가 발생했습니다."
    }
}

/// Listings currently on the market. Not limited to a months window.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentListings;

impl DataSource for CurrentListings {
    type Item = TransactionRecord;

    fn name(&self) -> &'static str {
        "current_listings"
    }

    fn path(&self) -> &str {
        "/properties/listings"
    }

    fn params(&self, query: &ComposedQuery) -> Vec<(String, String)> {
        query
            .to_params()
            .into_iter()
            .filter(|(name, _)| name != "months")
            .collect()
    }

    fn fallback_message(&self) -> &str {
        "현재 매물 조회 중 오류가 발생했습니다."
    }
}

const RECORD_FALLBACK: &str = "매물 조회 중 오류가 발생했습니다.";

/// Decode a list body into a typed page. Undecodable bodies are generic failures.
pub(crate) fn decode_page<T: DeserializeOwned>(
    value: serde_json::Value,
    fallback: &str,
) -> Result<ListResponse<T>, FetchError> {
    serde_json::from_value(value).map_err(|e| {
        warn!(error = %e, "Failed to decode list response");
        FetchError::from_transport(TransportError::Decode(e.to_string()), fallback)
    })
}

/// Fetch a single record from the detail endpoint.
pub async fn fetch_record(
    transport: &dyn Transport,
    id: &str,
) -> Result<TransactionRecord, FetchError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(FetchError::Unhandled(RECORD_FALLBACK.to_string()));
    }

    let value = transport
        .get(&format!("/properties/{id}"), &[])
        .await
        .map_err(|e| {
            warn!(id, error = %e, "Record request failed");
            FetchError::from_transport(e, RECORD_FALLBACK)
        })?;

    serde_json::from_value(value).map_err(|e| {
        warn!(id, error = %e, "Failed to decode record");
        FetchError::Unhandled(RECORD_FALLBACK.to_string())
    })
}
