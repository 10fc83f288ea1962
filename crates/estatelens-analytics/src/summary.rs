use estatelens_models::{PageSummary, Pagination, TransactionRecord};

use crate::derive::price_per_pyeong;

/// Header statistics for the page of records on screen.
///
/// Averages are over the page, not the whole result set; the page count comes
/// from the server's pagination block.
pub fn summarize_page(items: &[TransactionRecord], pagination: &Pagination) -> PageSummary {
    let total_pages = pagination.total_pages();
    if items.is_empty() {
        return PageSummary {
            total_pages,
            ..PageSummary::default()
        };
    }

    let count = items.len();
    let average_price = items.iter().map(|r| r.deal_amount as f64).sum::<f64>() / count as f64;
    let average_area = items.iter().map(|r| r.exclusive_area).sum::<f64>() / count as f64;

    PageSummary {
        count,
        average_price,
        average_area,
        average_price_per_pyeong: price_per_pyeong(average_price, average_area),
        with_building_info: items.iter().filter(|r| r.has_building_info()).count(),
        total_pages,
    }
}
