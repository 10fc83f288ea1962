pub mod derive;
pub mod monthly;
pub mod summary;
pub mod trend;

#[cfg(test)]
pub(crate) mod fixtures;

pub use monthly::aggregate_monthly;
pub use summary::summarize_page;
pub use trend::{classify_trend, TREND_THRESHOLD_PERCENT};
