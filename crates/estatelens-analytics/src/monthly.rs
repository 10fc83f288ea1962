use std::collections::HashMap;

use estatelens_models::{MonthlyAggregate, TransactionRecord};

struct Bucket {
    sum: u128,
    max: u64,
    min: u64,
    count: usize,
}

/// Group a batch of records by deal month and compute price statistics per month.
///
/// Output is sorted ascending by `YYYY-MM` key, which for zero-padded keys is
/// chronological order. Every record lands in exactly one group.
pub fn aggregate_monthly(records: &[TransactionRecord]) -> Vec<MonthlyAggregate> {
    let mut buckets: HashMap<String, Bucket> = HashMap::new();

    for record in records {
        let amount = record.deal_amount;
        buckets
            .entry(record.month_key())
            .and_modify(|b| {
                b.sum += amount as u128;
                b.max = b.max.max(amount);
                b.min = b.min.min(amount);
                b.count += 1;
            })
            .or_insert(Bucket {
                sum: amount as u128,
                max: amount,
                min: amount,
                count: 1,
            });
    }

    let mut monthly: Vec<MonthlyAggregate> = buckets
        .into_iter()
        .map(|(key, b)| MonthlyAggregate {
            key,
            average_price: b.sum as f64 / b.count as f64,
            max_price: b.max,
            min_price: b.min,
            count: b.count,
        })
        .collect();

    monthly.sort_by(|a, b| a.key.cmp(&b.key));
    monthly
}
