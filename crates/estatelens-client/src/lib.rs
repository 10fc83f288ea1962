pub mod error;
pub mod fetch;
pub mod filter_panel;
pub mod resource;
pub mod source;
pub mod transport;

pub mod test_support;

pub use error::{FetchError, TransportError};
pub use fetch::{Completion, FetchLifecycle, FetchState, FetchStatus, RequestTicket};
pub use filter_panel::FilterPanel;
pub use resource::{FetchOutcome, QueryOverride, Resource};
pub use source::{fetch_record, CurrentListings, DataSource, TradeHistory};
pub use transport::{HttpTransport, Transport};
