use std::collections::HashSet;

use polars::prelude::*;

use crate::error::RdkError;
use crate::filter::{filter_records, FilterSelection};
use crate::schema::activity;

/// The KPI set shown as metric cards, recomputed on every filter change.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub store_count: usize,
    pub bay_count: usize,
    pub record_count: usize,
    pub avg_per_bay: f64,
    pub reset_count: usize,
}

/// Derive the snapshot from a filtered activity set plus the full reset log.
///
/// Pure in (filtered, resets, selection); every missing-data case degrades
/// to a zero rather than an error.
pub fn compute_metrics(
    filtered: &DataFrame,
    resets: &DataFrame,
    selection: &FilterSelection,
) -> Result<MetricsSnapshot, RdkError> {
    let store_count = distinct_non_null(filtered, activity::STORE)?;

    // Bay is authoritative only when it carries at least one value;
    // otherwise the alternate location column stands in.
    let bay_count = {
        let primary = distinct_non_null(filtered, activity::BAY)?;
        if primary > 0 {
            primary
        } else {
            distinct_non_null(filtered, activity::LOCATION)?
        }
    };

    let record_count = filtered.height();
    let avg_per_bay = if bay_count == 0 {
        0.0
    } else {
        round2(record_count as f64 / bay_count as f64)
    };

    let reset_count = if resets.height() == 0 {
        0
    } else {
        filter_records(resets, selection)?.height()
    };

    Ok(MetricsSnapshot {
        store_count,
        bay_count,
        record_count,
        avg_per_bay,
        reset_count,
    })
}

fn distinct_non_null(df: &DataFrame, name: &str) -> Result<usize, RdkError> {
    let Ok(column) = df.column(name) else {
        return Ok(0);
    };
    let set: HashSet<&str> = column.str()?.into_iter().flatten().collect();
    Ok(set.len())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> FilterSelection {
        FilterSelection::new("ACME", "P1")
    }

    #[test]
    fn counts_distinct_stores_and_rows() {
        let filtered = df!(
            activity::STORE => ["S1", "S2", "S1"],
            activity::BAY => ["B1", "B2", "B1"]
        )
        .unwrap();

        let m = compute_metrics(&filtered, &DataFrame::empty(), &selection()).unwrap();
        assert_eq!(m.store_count, 2);
        assert_eq!(m.record_count, 3);
        assert_eq!(m.bay_count, 2);
        assert_eq!(m.avg_per_bay, 1.5);
    }

    #[test]
    fn bay_falls_back_to_location_when_entirely_null() {
        let filtered = df!(
            activity::STORE => ["S1", "S2", "S3"],
            activity::BAY => [None::<&str>, None, None],
            activity::LOCATION => ["L1", "L2", "L3"]
        )
        .unwrap();

        let m = compute_metrics(&filtered, &DataFrame::empty(), &selection()).unwrap();
        assert_eq!(m.bay_count, 3);
    }

    #[test]
    fn bay_wins_over_location_when_it_has_any_value() {
        let filtered = df!(
            activity::BAY => [Some("B1"), None, None],
            activity::LOCATION => ["L1", "L2", "L3"]
        )
        .unwrap();

        let m = compute_metrics(&filtered, &DataFrame::empty(), &selection()).unwrap();
        assert_eq!(m.bay_count, 1);
    }

    #[test]
    fn missing_columns_degrade_to_zero() {
        let filtered = df!("Other" => ["x", "y"]).unwrap();

        let m = compute_metrics(&filtered, &DataFrame::empty(), &selection()).unwrap();
        assert_eq!(m.store_count, 0);
        assert_eq!(m.bay_count, 0);
        assert_eq!(m.record_count, 2);
    }

    #[test]
    fn avg_per_bay_never_divides_by_zero() {
        let filtered = df!(activity::STORE => ["S1", "S2"]).unwrap();

        let m = compute_metrics(&filtered, &DataFrame::empty(), &selection()).unwrap();
        assert_eq!(m.bay_count, 0);
        assert_eq!(m.avg_per_bay, 0.0);
    }

    #[test]
    fn avg_per_bay_rounds_to_two_decimals() {
        let filtered = df!(
            activity::STORE => ["S1"; 7],
            activity::BAY => ["B1", "B2", "B3", "B1", "B2", "B3", "B1"]
        )
        .unwrap();

        let m = compute_metrics(&filtered, &DataFrame::empty(), &selection()).unwrap();
        assert_eq!(m.avg_per_bay, 2.33);
    }

    #[test]
    fn reset_count_scopes_to_vendor_and_program() {
        let filtered = df!(activity::STORE => ["S1"]).unwrap();
        let resets = df!(
            "Vendor" => ["ACME", "ACME", "ZEN"],
            "Program" => ["P1", "P2", "P1"]
        )
        .unwrap();

        let m = compute_metrics(&filtered, &resets, &selection()).unwrap();
        assert_eq!(m.reset_count, 1);
    }

    #[test]
    fn empty_reset_log_counts_zero() {
        let filtered = df!(activity::STORE => ["S1"]).unwrap();
        let m = compute_metrics(&filtered, &DataFrame::empty(), &selection()).unwrap();
        assert_eq!(m.reset_count, 0);
    }
}
