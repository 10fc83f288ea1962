pub mod analytics;
pub mod config;
pub mod filter;
pub mod record;

pub use analytics::{MonthlyAggregate, PageSummary, TrendDirection, TrendSummary};
pub use config::{ApiConfig, EstateConfig, PagingConfig, SourceConfig, SourcesConfig};
pub use filter::{ComposedQuery, FilterState, MonthsWindow, RangeSelection};
pub use record::{ListResponse, Pagination, PropertyType, TransactionRecord};
