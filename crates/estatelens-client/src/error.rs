use thiserror::Error;

/// Failure reported by a [`Transport`](crate::transport::Transport).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The server answered with a non-success status. `body` is the decoded
    /// JSON error body, when there was one.
    #[error("HTTP {status}")]
    Status {
        status: u16,
        body: Option<serde_json::Value>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Response decode error: {0}")]
    Decode(String),
}

/// Message shown when no response was received at all.
pub const NETWORK_UNAVAILABLE_MESSAGE: &str =
    "서버에 연결할 수 없습니다. 네트워크 상태를 확인해주세요.";

/// Error surfaced in a data source's fetch state. Display is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Server error carrying a human-readable message, shown verbatim.
    #[error("{0}")]
    RequestFailed(String),

    #[error("서버에 연결할 수 없습니다. 네트워크 상태를 확인해주세요.")]
    NetworkUnavailable,

    /// Anything else, shown with the data source's generic message.
    #[error("{0}")]
    Unhandled(String),
}

impl FetchError {
    /// Classify a transport failure. `fallback` is the data source's generic message.
    ///
    /// Timeouts and undecodable responses are generic failures.
    pub fn from_transport(err: TransportError, fallback: &str) -> Self {
        match err {
            TransportError::Status { body, .. } => match body.as_ref().and_then(error_detail) {
                Some(detail) => FetchError::RequestFailed(detail),
                None => FetchError::Unhandled(fallback.to_string()),
            },
            TransportError::Network(_) => FetchError::NetworkUnavailable,
            TransportError::Timeout(_) | TransportError::Decode(_) => {
                FetchError::Unhandled(fallback.to_string())
            }
        }
    }
}

/// Extract the human-readable message from an error body (`detail`, else `message`).
fn error_detail(body: &serde_json::Value) -> Option<String> {
    ["detail", "message"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = "실거래가 조회 중 오류가 발생했습니다.";

    #[test]
    fn status_with_detail_is_verbatim() {
        let err = TransportError::Status {
            status: 502,
            body: Some(serde_json::json!({"detail": "국토교통부 API 응답 지연"})),
        };
        let fetch = FetchError::from_transport(err, FALLBACK);
        assert_eq!(fetch, FetchError::RequestFailed("국토교통부 API 응답 지연".to_string()));
        assert_eq!(fetch.to_string(), "국토교통부 API 응답 지연");
    }

    #[test]
    fn message_field_is_accepted() {
        let err = TransportError::Status {
            status: 400,
            body: Some(serde_json::json!({"message": "bad months"})),
        };
        assert_eq!(
            FetchError::from_transport(err, FALLBACK),
            FetchError::RequestFailed("bad months".to_string())
        );
    }

    #[test]
    fn status_without_message_uses_fallback() {
        // FastAPI validation errors carry a list, not a string.
        let err = TransportError::Status {
            status: 422,
            body: Some(serde_json::json!({"detail": [{"loc": ["query", "months"]}]})),
        };
        assert_eq!(
            FetchError::from_transport(err, FALLBACK).to_string(),
            FALLBACK
        );

        let err = TransportError::Status {
            status: 500,
            body: None,
        };
        assert_eq!(
            FetchError::from_transport(err, FALLBACK),
            FetchError::Unhandled(FALLBACK.to_string())
        );
    }

    #[test]
    fn network_and_timeout() {
        let network = FetchError::from_transport(
            TransportError::Network("connection refused".to_string()),
            FALLBACK,
        );
        assert_eq!(network, FetchError::NetworkUnavailable);
        assert_eq!(network.to_string(), NETWORK_UNAVAILABLE_MESSAGE);

        let timeout = FetchError::from_transport(TransportError::Timeout(30), FALLBACK);
        assert_eq!(timeout, FetchError::Unhandled(FALLBACK.to_string()));
    }
}
