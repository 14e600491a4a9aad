use std::collections::BTreeSet;

use polars::prelude::*;

use crate::error::RdkError;
use crate::schema::activity;

/// One vendor+program selection.
///
/// Created per user interaction and passed explicitly into every filter,
/// metric, and chart call - never read from ambient session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub vendor: String,
    pub program: String,
}

impl FilterSelection {
    pub fn new(vendor: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            program: program.into(),
        }
    }
}

/// Sorted distinct non-null Vendor values. Empty when the column is absent
/// or the table has no rows.
pub fn distinct_vendors(df: &DataFrame) -> Result<Vec<String>, RdkError> {
    let Ok(column) = df.column(activity::VENDOR) else {
        return Ok(Vec::new());
    };
    let set: BTreeSet<String> = column
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    Ok(set.into_iter().collect())
}

/// Sorted distinct non-null Program values among rows whose Vendor equals
/// `vendor`. A vendor absent from the table yields an empty list.
pub fn distinct_programs(df: &DataFrame, vendor: &str) -> Result<Vec<String>, RdkError> {
    let (Ok(vendors), Ok(programs)) = (
        df.column(activity::VENDOR),
        df.column(activity::PROGRAM),
    ) else {
        return Ok(Vec::new());
    };

    let mut set = BTreeSet::new();
    for (v, p) in vendors.str()?.into_iter().zip(programs.str()?.into_iter()) {
        if v == Some(vendor) {
            if let Some(p) = p {
                set.insert(p.to_string());
            }
        }
    }
    Ok(set.into_iter().collect())
}

/// Rows where Vendor and Program both equal the selection - exact
/// post-normalization equality, no partial matching. Missing key columns
/// degrade to an empty result.
pub fn filter_records(df: &DataFrame, selection: &FilterSelection) -> Result<DataFrame, RdkError> {
    let has_keys = {
        let schema = df.schema();
        schema.contains(activity::VENDOR) && schema.contains(activity::PROGRAM)
    };
    if !has_keys {
        return Ok(df.clear());
    }

    Ok(df
        .clone()
        .lazy()
        .filter(
            col(activity::VENDOR)
                .eq(lit(selection.vendor.clone()))
                .and(col(activity::PROGRAM).eq(lit(selection.program.clone()))),
        )
        .collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_activity;

    fn sample() -> DataFrame {
        df!(
            activity::VENDOR => [Some("ZEN"), Some("ACME"), Some("ACME"), None],
            activity::PROGRAM => [Some("P2"), Some("P1"), Some("P3"), Some("P9")],
            activity::STORE => [Some("S9"), Some("S1"), Some("S2"), Some("S3")]
        )
        .unwrap()
    }

    #[test]
    fn vendors_are_sorted_and_null_free() {
        assert_eq!(distinct_vendors(&sample()).unwrap(), vec!["ACME", "ZEN"]);
    }

    #[test]
    fn programs_scope_to_the_chosen_vendor() {
        assert_eq!(
            distinct_programs(&sample(), "ACME").unwrap(),
            vec!["P1", "P3"]
        );
    }

    #[test]
    fn absent_vendor_yields_no_programs() {
        assert!(distinct_programs(&sample(), "NOBODY").unwrap().is_empty());
    }

    #[test]
    fn empty_table_yields_no_choices() {
        let empty = sample().clear();
        assert!(distinct_vendors(&empty).unwrap().is_empty());
        assert!(distinct_programs(&empty, "ACME").unwrap().is_empty());
    }

    #[test]
    fn missing_key_columns_degrade_to_empty() {
        let df = df!("Other" => ["x"]).unwrap();
        assert!(distinct_vendors(&df).unwrap().is_empty());
        let sel = FilterSelection::new("ACME", "P1");
        assert_eq!(filter_records(&df, &sel).unwrap().height(), 0);
    }

    #[test]
    fn filter_matches_both_keys_exactly() {
        let sel = FilterSelection::new("ACME", "P1");
        let out = filter_records(&sample(), &sel).unwrap();
        assert_eq!(out.height(), 1);
        let stores = out.column(activity::STORE).unwrap();
        assert_eq!(stores.str().unwrap().get(0), Some("S1"));
    }

    #[test]
    fn filter_is_idempotent() {
        let sel = FilterSelection::new("ACME", "P1");
        let once = filter_records(&sample(), &sel).unwrap();
        let twice = filter_records(&once, &sel).unwrap();
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn casing_divergence_is_resolved_by_normalization() {
        let raw = df!(
            activity::VENDOR => ["acme ", "ACME"],
            activity::PROGRAM => ["P1", "P1"],
            activity::STORE => ["S1", "S2"]
        )
        .unwrap();
        let normalized = normalize_activity(raw).unwrap();

        let sel = FilterSelection::new("ACME", "P1");
        let out = filter_records(&normalized, &sel).unwrap();
        assert_eq!(out.height(), 2);
    }
}
