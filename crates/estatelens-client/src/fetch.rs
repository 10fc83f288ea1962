use estatelens_models::{ComposedQuery, ListResponse, Pagination};
use serde::Serialize;

use crate::error::FetchError;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// What a data source currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub status: FetchStatus,
    pub items: Vec<T>,
    pub pagination: Pagination,
    pub error: Option<FetchError>,
}

impl<T> FetchState<T> {
    fn new(page_size: u32) -> Self {
        Self {
            status: FetchStatus::Idle,
            items: Vec::new(),
            pagination: Pagination {
                page_size,
                ..Pagination::default()
            },
            error: None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }
}

/// An accepted request. Its response is applied only while `seq` is the latest.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTicket {
    pub seq: u64,
    pub query: ComposedQuery,
}

/// What happened to a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response was stored.
    Applied,
    /// The request was superseded while outstanding; its response was discarded.
    Superseded,
    /// The ticket does not belong to the outstanding request.
    Ignored,
}

/// Fetch state machine for one data source.
///
/// At most one request is outstanding at a time: [`begin`](Self::begin) refuses
/// while loading. A request can be superseded while outstanding (the applied
/// filter changed); its response is then discarded on arrival and the newest
/// query becomes available through [`resume_superseded`](Self::resume_superseded).
#[derive(Debug)]
pub struct FetchLifecycle<T> {
    state: FetchState<T>,
    latest_seq: u64,
    outstanding: Option<u64>,
    last_query: Option<ComposedQuery>,
    refetch_pending: bool,
}

impl<T: Clone> FetchLifecycle<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            state: FetchState::new(page_size),
            latest_seq: 0,
            outstanding: None,
            last_query: None,
            refetch_pending: false,
        }
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// The most recently requested query, used for retries and page changes.
    pub fn last_query(&self) -> Option<&ComposedQuery> {
        self.last_query.as_ref()
    }

    /// Accept a new request unless one is already outstanding.
    pub fn begin(&mut self, query: ComposedQuery) -> Option<RequestTicket> {
        if self.state.is_loading() {
            return None;
        }
        self.latest_seq += 1;
        self.outstanding = Some(self.latest_seq);
        self.state.status = FetchStatus::Loading;
        self.state.error = None;
        self.last_query = Some(query.clone());
        Some(RequestTicket {
            seq: self.latest_seq,
            query,
        })
    }

    /// Mark the outstanding request as out of date; `query` replaces it once it returns.
    ///
    /// Returns false when nothing is outstanding, in which case the caller can
    /// simply begin a new request.
    pub fn supersede(&mut self, query: ComposedQuery) -> bool {
        if self.outstanding.is_none() {
            return false;
        }
        self.latest_seq += 1;
        self.last_query = Some(query);
        self.refetch_pending = true;
        true
    }

    /// Record the result of a request.
    pub fn complete(
        &mut self,
        ticket: &RequestTicket,
        result: Result<ListResponse<T>, FetchError>,
    ) -> Completion {
        if self.outstanding != Some(ticket.seq) {
            return Completion::Ignored;
        }
        self.outstanding = None;

        if ticket.seq != self.latest_seq {
            self.state.status = FetchStatus::Idle;
            return Completion::Superseded;
        }

        match result {
            Ok(response) => {
                self.state.pagination = response.pagination();
                self.state.items = response.items;
                self.state.status = FetchStatus::Success;
            }
            Err(e) => {
                self.state.error = Some(e);
                self.state.status = FetchStatus::Error;
            }
        }
        Completion::Applied
    }

    /// Give up on request `seq` without a response, e.g. because its future was dropped.
    ///
    /// Clears the outstanding request and any queued refetch and returns to
    /// idle, keeping the items already shown. Returns false when `seq` is not
    /// the outstanding request.
    pub fn abandon(&mut self, seq: u64) -> bool {
        if self.outstanding != Some(seq) {
            return false;
        }
        self.outstanding = None;
        self.refetch_pending = false;
        self.state.status = FetchStatus::Idle;
        true
    }

    /// Begin the request queued by [`supersede`](Self::supersede), if any.
    pub fn resume_superseded(&mut self) -> Option<RequestTicket> {
        if !self.refetch_pending {
            return None;
        }
        self.refetch_pending = false;
        let query = self.last_query.clone()?;
        self.begin(query)
    }
}
