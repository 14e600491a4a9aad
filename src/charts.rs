use std::collections::BTreeMap;

use polars::prelude::*;

use crate::error::RdkError;
use crate::schema::{activity, chart, reset};

/// Group the filtered activity set by Store and count rows per group.
/// Groups keep first-seen order; null stores are excluded.
pub fn maintenance_by_store(filtered: &DataFrame) -> Result<DataFrame, RdkError> {
    if !has_column(filtered, activity::STORE) {
        return empty_series(activity::STORE, chart::MAINTENANCE_COUNT);
    }

    Ok(filtered
        .clone()
        .lazy()
        .filter(col(activity::STORE).is_not_null())
        .group_by_stable([col(activity::STORE)])
        .agg([len().alias(chart::MAINTENANCE_COUNT)])
        .collect()?)
}

/// Bucket the filtered activity set by calendar month of FinishTime
/// (format YYYY-MM), dropping rows whose timestamp is missing. Buckets
/// come out in chronological order.
pub fn maintenance_by_month(filtered: &DataFrame) -> Result<DataFrame, RdkError> {
    let Ok(column) = filtered.column(activity::FINISH_TIME) else {
        return empty_series(chart::MONTH, chart::MAINTENANCE_COUNT);
    };
    if !matches!(column.dtype(), DataType::Datetime(_, _)) {
        return empty_series(chart::MONTH, chart::MAINTENANCE_COUNT);
    }

    let series = column.as_materialized_series();
    let mut buckets: BTreeMap<String, u32> = BTreeMap::new();
    for i in 0..filtered.height() {
        let Ok(AnyValue::Datetime(value, unit, _)) = series.get(i) else {
            continue;
        };
        let micros = match unit {
            TimeUnit::Nanoseconds => value / 1_000,
            TimeUnit::Microseconds => value,
            TimeUnit::Milliseconds => value * 1_000,
        };
        if let Some(ts) = chrono::DateTime::from_timestamp_micros(micros) {
            *buckets.entry(ts.format("%Y-%m").to_string()).or_insert(0) += 1;
        }
    }

    let (months, counts): (Vec<String>, Vec<u32>) = buckets.into_iter().unzip();
    Ok(df!(chart::MONTH => months, chart::MAINTENANCE_COUNT => counts)?)
}

/// Reset/update events for the selected vendor, grouped by Program and
/// sorted ascending by count (stable ties). The horizontal bar chart reads
/// smallest-to-largest top-to-bottom.
pub fn resets_by_program(resets: &DataFrame, vendor: &str) -> Result<DataFrame, RdkError> {
    let Some(scoped) = scoped_resets(resets, vendor)? else {
        return empty_series(reset::PROGRAM, chart::RESET_COUNT);
    };
    if !has_column(&scoped, reset::PROGRAM) {
        return empty_series(reset::PROGRAM, chart::RESET_COUNT);
    }

    Ok(scoped
        .lazy()
        .filter(col(reset::PROGRAM).is_not_null())
        .group_by_stable([col(reset::PROGRAM)])
        .agg([len().alias(chart::RESET_COUNT)])
        .sort(
            [chart::RESET_COUNT],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?)
}

/// Reset/update events for the selected vendor, grouped by Store in
/// first-seen order.
pub fn resets_by_store(resets: &DataFrame, vendor: &str) -> Result<DataFrame, RdkError> {
    let Some(scoped) = scoped_resets(resets, vendor)? else {
        return empty_series(reset::STORE, chart::RESET_COUNT);
    };
    if !has_column(&scoped, reset::STORE) {
        return empty_series(reset::STORE, chart::RESET_COUNT);
    }

    Ok(scoped
        .lazy()
        .filter(col(reset::STORE).is_not_null())
        .group_by_stable([col(reset::STORE)])
        .agg([len().alias(chart::RESET_COUNT)])
        .collect()?)
}

fn scoped_resets(resets: &DataFrame, vendor: &str) -> Result<Option<DataFrame>, RdkError> {
    if resets.height() == 0 || !has_column(resets, reset::VENDOR) {
        return Ok(None);
    }
    let scoped = resets
        .clone()
        .lazy()
        .filter(col(reset::VENDOR).eq(lit(vendor.to_string())))
        .collect()?;
    Ok(Some(scoped))
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.schema().contains(name)
}

fn empty_series(category: &str, count: &str) -> Result<DataFrame, RdkError> {
    Ok(df!(
        category => Vec::<String>::new(),
        count => Vec::<u32>::new()
    )?)
}
