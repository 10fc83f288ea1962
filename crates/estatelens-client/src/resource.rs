use std::sync::{Arc, Mutex, MutexGuard};

use estatelens_models::{ComposedQuery, FilterState, ListResponse};
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::fetch::{Completion, FetchLifecycle, FetchState, FetchStatus, RequestTicket};
use crate::source::{decode_page, DataSource};
use crate::transport::Transport;

/// Overrides applied to the current query by an explicit fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOverride {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Result of asking a [`Resource`] to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A request was already outstanding; nothing was sent.
    Dropped,
    /// The applied filters did not change, or the source does not auto-fetch.
    Skipped,
    /// The outstanding request was marked stale; the newer query runs after it returns.
    Superseded,
    /// The request (and any superseding refetch) finished with this status.
    Completed(FetchStatus),
}

/// Drives the fetch lifecycle of one data source against a transport.
///
/// The lifecycle lock guards synchronous transitions only and is never held
/// across the request itself.
pub struct Resource<S: DataSource> {
    source: S,
    transport: Arc<dyn Transport>,
    lifecycle: Mutex<FetchLifecycle<S::Item>>,
    applied: Mutex<Applied>,
    auto_fetch: bool,
    page_size: u32,
}

#[derive(Default)]
struct Applied {
    filters: FilterState,
    /// Serialized query of the last applied filters seen by `on_filters_applied`.
    key: Option<String>,
}

impl<S: DataSource> Resource<S> {
    pub fn new(source: S, transport: Arc<dyn Transport>, page_size: u32, auto_fetch: bool) -> Self {
        Self {
            source,
            transport,
            lifecycle: Mutex::new(FetchLifecycle::new(page_size)),
            applied: Mutex::new(Applied::default()),
            auto_fetch,
            page_size,
        }
    }

    pub fn name(&self) -> &'static str {
        self.source.name()
    }

    pub fn auto_fetch(&self) -> bool {
        self.auto_fetch
    }

    pub fn snapshot(&self) -> FetchState<S::Item> {
        self.lock_lifecycle().state().clone()
    }

    pub fn status(&self) -> FetchStatus {
        self.lock_lifecycle().state().status
    }

    /// Fetch the current applied filters at the current page.
    pub async fn fetch(&self) -> FetchOutcome {
        self.fetch_with(QueryOverride::default()).await
    }

    /// Fetch the current applied filters with `overrides` on top.
    pub async fn fetch_with(&self, overrides: QueryOverride) -> FetchOutcome {
        let query = self.current_query(overrides);
        self.run(query).await
    }

    /// Fetch page `page` of the last applied filters.
    pub async fn change_page(&self, page: u32) -> FetchOutcome {
        let query = self.current_query(QueryOverride {
            page: Some(page),
            page_size: None,
        });
        self.run(query).await
    }

    /// Re-issue the last query, or the current filters when nothing was requested yet.
    pub async fn retry(&self) -> FetchOutcome {
        let last = self.lock_lifecycle().last_query().cloned();
        let query = last.unwrap_or_else(|| self.current_query(QueryOverride::default()));
        self.run(query).await
    }

    /// React to newly applied filters. Fetches page 1 when the filters differ
    /// from the last ones seen and the source auto-fetches.
    pub async fn on_filters_applied(&self, filters: &FilterState) -> FetchOutcome {
        let query = filters.compose(1, self.page_size);
        let key = serde_json::to_string(&query).ok();
        {
            let mut applied = self.lock_applied();
            applied.filters = filters.clone();
            if key.is_some() && applied.key == key {
                debug!(source = %self.name(), "Applied filters unchanged");
                return FetchOutcome::Skipped;
            }
            applied.key = key;
        }
        if !self.auto_fetch {
            return FetchOutcome::Skipped;
        }
        self.refetch(query).await
    }

    /// React to a filter reset. Auto-fetching sources always refetch the default query.
    pub async fn on_filters_reset(&self, filters: &FilterState) -> FetchOutcome {
        let query = filters.compose(1, self.page_size);
        {
            let mut applied = self.lock_applied();
            applied.filters = filters.clone();
            applied.key = serde_json::to_string(&query).ok();
        }
        if !self.auto_fetch {
            return FetchOutcome::Skipped;
        }
        self.refetch(query).await
    }

    /// Start `query`, superseding an outstanding request instead of dropping it.
    async fn refetch(&self, query: ComposedQuery) -> FetchOutcome {
        {
            let mut lifecycle = self.lock_lifecycle();
            if lifecycle.supersede(query.clone()) {
                info!(
                    source = %self.name(),
                    seq = lifecycle.latest_seq(),
                    "Filters changed while loading; refetch queued"
                );
                return FetchOutcome::Superseded;
            }
        }
        self.run(query).await
    }

    async fn run(&self, query: ComposedQuery) -> FetchOutcome {
        let mut ticket = {
            let mut lifecycle = self.lock_lifecycle();
            match lifecycle.begin(query) {
                Some(ticket) => ticket,
                None => {
                    debug!(source = %self.name(), "Request already outstanding; dropped");
                    return FetchOutcome::Dropped;
                }
            }
        };
        let mut in_flight = InFlight {
            lifecycle: &self.lifecycle,
            source: self.name(),
            seq: Some(ticket.seq),
        };

        loop {
            info!(
                source = %self.name(),
                seq = ticket.seq,
                page = ticket.query.page,
                "Fetching"
            );
            let result = self.request(&ticket).await;

            let next = {
                let mut lifecycle = self.lock_lifecycle();
                let completion = lifecycle.complete(&ticket, result);
                in_flight.seq = None;
                match completion {
                    Completion::Applied => {
                        let state = lifecycle.state();
                        match state.status {
                            FetchStatus::Error => warn!(
                                source = %self.name(),
                                seq = ticket.seq,
                                error = %state.error_message().unwrap_or_default(),
                                "Fetch failed"
                            ),
                            _ => info!(
                                source = %self.name(),
                                seq = ticket.seq,
                                items = state.items.len(),
                                total = state.pagination.total,
                                "Fetch complete"
                            ),
                        }
                        return FetchOutcome::Completed(state.status);
                    }
                    Completion::Superseded => {
                        warn!(source = %self.name(), seq = ticket.seq, "Discarded stale response");
                        let resumed = lifecycle.resume_superseded();
                        in_flight.seq = resumed.as_ref().map(|t| t.seq);
                        resumed
                    }
                    Completion::Ignored => None,
                }
            };

            match next {
                Some(resumed) => ticket = resumed,
                None => return FetchOutcome::Completed(self.status()),
            }
        }
    }

    async fn request(
        &self,
        ticket: &RequestTicket,
    ) -> Result<ListResponse<S::Item>, FetchError> {
        let fallback = self.source.fallback_message();
        let params = self.source.params(&ticket.query);
        let value = self
            .transport
            .get(self.source.path(), &params)
            .await
            .map_err(|e| FetchError::from_transport(e, fallback))?;
        decode_page(value, fallback)
    }

    fn current_query(&self, overrides: QueryOverride) -> ComposedQuery {
        let page = overrides
            .page
            .unwrap_or_else(|| self.lock_lifecycle().state().pagination.page.max(1));
        let page_size = overrides.page_size.unwrap_or(self.page_size);
        self.lock_applied().filters.compose(page, page_size)
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, FetchLifecycle<S::Item>> {
        self.lifecycle.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_applied(&self) -> MutexGuard<'_, Applied> {
        self.applied.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Releases the lifecycle when a request future is dropped before its
/// response is recorded (task abort, timeout, losing `select!` branch).
struct InFlight<'a, T: Clone> {
    lifecycle: &'a Mutex<FetchLifecycle<T>>,
    source: &'static str,
    seq: Option<u64>,
}

impl<T: Clone> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        let Some(seq) = self.seq.take() else {
            return;
        };
        let mut lifecycle = self.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
        if lifecycle.abandon(seq) {
            warn!(source = %self.source, seq, "Request dropped before completion");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::source::TradeHistory;
    use crate::test_support::{page_json, record_json, MockTransport};
    use estatelens_models::RangeSelection;

    fn resource(mock: &Arc<MockTransport>, auto_fetch: bool) -> Resource<TradeHistory> {
        Resource::new(TradeHistory, mock.clone(), 50, auto_fetch)
    }

    fn one_page(total: u64) -> serde_json::Value {
        page_json(vec![record_json("r1", 2024, 9, 1, 100_000)], 1, 50, total)
    }

    #[tokio::test]
    async fn fetch_success_stores_page() {
        let mock = Arc::new(MockTransport::new());
        mock.push_ok(one_page(1));
        let resource = resource(&mock, true);

        let outcome = resource.fetch().await;
        assert_eq!(outcome, FetchOutcome::Completed(FetchStatus::Success));

        let state = resource.snapshot();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.pagination.total, 1);
        let call = &mock.calls()[0];
        assert_eq!(call.path, "/properties/trades");
        assert_eq!(call.param("page"), Some("1"));
        assert_eq!(call.param("months"), Some("12"));
    }

    #[tokio::test]
    async fn failure_is_stored_not_returned() {
        let mock = Arc::new(MockTransport::new());
        mock.push_err(TransportError::Network("refused".to_string()));
        let resource = resource(&mock, true);

        assert_eq!(
            resource.fetch().await,
            FetchOutcome::Completed(FetchStatus::Error)
        );
        let state = resource.snapshot();
        assert_eq!(state.error, Some(FetchError::NetworkUnavailable));
        assert!(state.items.is_empty());
    }

    #[tokio::test]
    async fn manual_source_skips_applied_filters() {
        let mock = Arc::new(MockTransport::new());
        let resource = resource(&mock, false);

        let mut filters = FilterState::default();
        filters.toggle_dong("역삼동");
        assert_eq!(resource.on_filters_applied(&filters).await, FetchOutcome::Skipped);
        assert!(mock.calls().is_empty());

        // Explicit fetch still uses the applied filters.
        mock.push_ok(one_page(1));
        resource.fetch().await;
        assert_eq!(mock.calls()[0].param("dongs"), Some("역삼동"));
    }

    #[tokio::test]
    async fn unchanged_filters_fetch_once() {
        let mock = Arc::new(MockTransport::new());
        mock.push_ok(one_page(1));
        let resource = resource(&mock, true);

        let mut filters = FilterState::default();
        filters.toggle_area_range(RangeSelection::new(33.0, 66.0, "33-66㎡"));

        assert_eq!(
            resource.on_filters_applied(&filters).await,
            FetchOutcome::Completed(FetchStatus::Success)
        );
        assert_eq!(resource.on_filters_applied(&filters).await, FetchOutcome::Skipped);
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn change_page_keeps_filters() {
        let mock = Arc::new(MockTransport::new());
        mock.push_ok(one_page(120));
        mock.push_ok(page_json(vec![], 3, 50, 120));
        let resource = resource(&mock, true);

        let mut filters = FilterState::default();
        filters.toggle_dong("삼성동");
        resource.on_filters_applied(&filters).await;
        resource.change_page(3).await;

        let calls = mock.calls();
        assert_eq!(calls[1].param("page"), Some("3"));
        assert_eq!(calls[1].param("dongs"), Some("삼성동"));
        assert_eq!(resource.snapshot().pagination.page, 3);
    }

    #[tokio::test]
    async fn retry_reissues_last_query() {
        let mock = Arc::new(MockTransport::new());
        mock.push_err(TransportError::Status {
            status: 503,
            body: None,
        });
        mock.push_ok(page_json(vec![], 2, 50, 60));
        let resource = resource(&mock, true);

        resource.change_page(2).await;
        assert_eq!(resource.status(), FetchStatus::Error);

        assert_eq!(
            resource.retry().await,
            FetchOutcome::Completed(FetchStatus::Success)
        );
        let calls = mock.calls();
        assert_eq!(calls[0].params, calls[1].params);
    }
}
