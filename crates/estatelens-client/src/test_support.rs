//! Test support: a scripted [`Transport`] and JSON fixtures.
//!
//! `MockTransport` answers requests from a queue of canned results and records
//! every call. A gated mock holds each request until the test releases it,
//! which makes in-flight behaviour observable.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use estatelens_models::TransactionRecord;
use tokio::sync::Semaphore;

use crate::error::TransportError;
use crate::transport::Transport;

/// One request seen by a [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<serde_json::Value, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Semaphore>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests block until [`release`](Self::release) lets them through.
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn release(&self, requests: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(requests);
        }
    }

    pub fn push_ok(&self, value: serde_json::Value) {
        self.lock_responses().push_back(Ok(value));
    }

    pub fn push_err(&self, err: TransportError) {
        self.lock_responses().push_back(Err(err));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Wait until at least `count` requests have been made. Panics after two seconds.
    pub async fn wait_for_calls(&self, count: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while self.calls().len() < count {
            if tokio::time::Instant::now() > deadline {
                panic!(
                    "expected {count} requests, saw {}",
                    self.calls().len()
                );
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn lock_responses(
        &self,
    ) -> std::sync::MutexGuard<'_, VecDeque<Result<serde_json::Value, TransportError>>> {
        self.responses.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<serde_json::Value, TransportError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                path: path.to_string(),
                params: params.to_vec(),
            });

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        self.lock_responses()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted response".to_string())))
    }
}

/// Wire form of a minimal apartment transaction in 역삼동, 84.9㎡.
pub fn record_json(id: &str, year: i32, month: u32, day: u32, amount: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "property_type": "아파트",
        "dong": "역삼동",
        "apartment_name": "래미안",
        "exclusive_area": 84.9,
        "deal_year": year,
        "deal_month": month,
        "deal_day": day,
        "deal_amount": amount,
    })
}

pub fn sample_record(id: &str, year: i32, month: u32, day: u32, amount: u64) -> TransactionRecord {
    TransactionRecord {
        id: id.to_string(),
        property_type: estatelens_models::PropertyType::Apartment,
        dong: "역삼동".to_string(),
        apartment_name: "래미안".to_string(),
        exclusive_area: 84.9,
        deal_year: year,
        deal_month: month,
        deal_day: day,
        deal_amount: amount,
        floor: None,
        build_year: None,
        jibun: None,
        road_name: None,
        deal_date: None,
        floor_area_ratio: None,
        building_coverage_ratio: None,
        land_share: None,
        total_households: None,
        total_parking: None,
    }
}

/// List body with the given items and pagination block.
pub fn page_json(items: Vec<serde_json::Value>, page: u32, page_size: u32, total: u64) -> serde_json::Value {
    serde_json::json!({
        "items": items,
        "page": page,
        "page_size": page_size,
        "total": total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_json_matches_sample_record() {
        let decoded: TransactionRecord =
            serde_json::from_value(record_json("a", 2024, 3, 9, 120_000)).unwrap();
        assert_eq!(decoded, sample_record("a", 2024, 3, 9, 120_000));
    }

    #[tokio::test]
    async fn empty_script_is_a_network_error() {
        let mock = MockTransport::new();
        let err = mock.get("/x", &[]).await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
        assert_eq!(mock.calls().len(), 1);
    }
}
