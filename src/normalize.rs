use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::datatypes::TimeUnit;
use polars::prelude::*;

use crate::error::RdkError;
use crate::schema::{activity, aliases, reset};

// Day-first formats take precedence; ISO forms follow so already-clean
// exports still parse.
const DATETIME_FORMATS: [&str; 6] = [
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];

/// Canonicalize a raw activity table:
/// localized aliases are renamed onto the canonical schema (only when the
/// canonical column is absent), dimension columns are trimmed and
/// uppercased with blanks becoming null, and FinishTime is parsed to a
/// datetime where unparseable values become null rather than errors.
///
/// Idempotent: re-applying to an already-normalized table is a no-op.
pub fn normalize_activity(df: DataFrame) -> Result<DataFrame, RdkError> {
    let df = apply_aliases(df, &aliases::ACTIVITY)?;
    let df = canonicalize_dimensions(df, &activity::DIMENSIONS)?;
    parse_finish_time_column(df)
}

/// Canonicalize the reset/update log so its Vendor/Program/Store values
/// compare exactly against normalized activity records.
pub fn normalize_resets(df: DataFrame) -> Result<DataFrame, RdkError> {
    let df = apply_aliases(df, &aliases::RESET)?;
    canonicalize_dimensions(df, &reset::DIMENSIONS)
}

fn apply_aliases(df: DataFrame, table: &[(&str, &str)]) -> Result<DataFrame, RdkError> {
    let (old, new): (Vec<String>, Vec<String>) = {
        let schema = df.schema();
        table
            .iter()
            .filter(|(alias, canonical)| schema.contains(alias) && !schema.contains(canonical))
            .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
            .unzip()
    };

    if old.is_empty() {
        return Ok(df);
    }
    Ok(df.lazy().rename(old, new, true).collect()?)
}

fn canonicalize_dimensions(df: DataFrame, columns: &[&str]) -> Result<DataFrame, RdkError> {
    let present: Vec<&str> = {
        let schema = df.schema();
        columns
            .iter()
            .copied()
            .filter(|c| schema.contains(c))
            .collect()
    };
    if present.is_empty() {
        return Ok(df);
    }

    let exprs: Vec<Expr> = present
        .iter()
        .map(|c| {
            let cleaned = col(*c)
                .cast(DataType::String)
                .str()
                .strip_chars(lit(" \t\r\n"))
                .str()
                .to_uppercase();
            // Blank cells count as missing, not as an empty-string value.
            when(cleaned.clone().eq(lit("")))
                .then(lit(NULL).cast(DataType::String))
                .otherwise(cleaned)
                .alias(*c)
        })
        .collect();

    Ok(df.lazy().with_columns(exprs).collect()?)
}

fn parse_finish_time_column(mut df: DataFrame) -> Result<DataFrame, RdkError> {
    let Ok(column) = df.column(activity::FINISH_TIME) else {
        return Ok(df);
    };
    if matches!(column.dtype(), DataType::Datetime(_, _)) {
        return Ok(df); // already parsed
    }

    let strings = column.cast(&DataType::String)?;
    let micros: Vec<Option<i64>> = strings
        .str()?
        .into_iter()
        .map(|v| {
            v.and_then(parse_finish_time)
                .map(|dt| dt.and_utc().timestamp_micros())
        })
        .collect();

    let parsed = Series::new(activity::FINISH_TIME.into(), micros)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
    df.with_column(parsed)?;
    Ok(df)
}

/// Lenient day-first timestamp parsing. Returns None for anything that
/// matches no known format; the row stays in the table for non-temporal
/// metrics.
pub(crate) fn parse_finish_time(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}
