//! Aggregate reporting over the transaction log (admin surface).

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use corebank_core::DomainResult;

use crate::log::TransactionLog;

/// One day of transaction volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBucket {
    pub day: NaiveDate,
    pub count: u64,
    pub amount: Decimal,
}

/// One month of transaction volume, keyed `"YYYY-MM"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    pub month: String,
    pub count: u64,
    pub amount: Decimal,
}

/// Per-day volume of rows stamped at or after `since`, newest day first.
pub fn daily_volume(
    log: &TransactionLog,
    since: DateTime<Utc>,
) -> DomainResult<Vec<DailyBucket>> {
    let mut buckets: BTreeMap<NaiveDate, (u64, Decimal)> = BTreeMap::new();
    for t in log.snapshot()? {
        if t.timestamp < since {
            continue;
        }
        let entry = buckets
            .entry(t.timestamp.date_naive())
            .or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += t.amount;
    }

    Ok(buckets
        .into_iter()
        .rev()
        .map(|(day, (count, amount))| DailyBucket { day, count, amount })
        .collect())
}

/// Per-month volume of rows stamped at or after `since`, newest month first.
pub fn monthly_volume(
    log: &TransactionLog,
    since: DateTime<Utc>,
) -> DomainResult<Vec<MonthlyBucket>> {
    let mut buckets: BTreeMap<String, (u64, Decimal)> = BTreeMap::new();
    for t in log.snapshot()? {
        if t.timestamp < since {
            continue;
        }
        let key = format!("{:04}-{:02}", t.timestamp.year(), t.timestamp.month());
        let entry = buckets.entry(key).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += t.amount;
    }

    Ok(buckets
        .into_iter()
        .rev()
        .map(|(month, (count, amount))| MonthlyBucket {
            month,
            count,
            amount,
        })
        .collect())
}
