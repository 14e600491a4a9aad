use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use polars::prelude::*;
use tracing::debug;

use crate::error::RdkError;
use crate::schema::sheet;

/// The up-to-three related tables produced from one uploaded file.
///
/// `summary` is pass-through: loaded when present, never consumed by the
/// aggregation pipeline. Absent sheets come back as empty frames.
#[derive(Debug, Clone)]
pub struct DatasetBundle {
    pub activity: DataFrame,
    pub summary: DataFrame,
    pub resets: DataFrame,
}

/// Parse an uploaded file into its tables, dispatching on the extension.
///
/// - `.csv`: one flat activity table; summary and reset log are empty.
/// - `.xls` / `.xlsx`: the "Data" sheet (case-insensitive, falling back to
///   the first sheet) plus optional "Summary" and "Reset_Update" sheets.
///
/// Any other extension is an `UnsupportedFormat` error; the caller halts
/// processing for that upload.
pub fn load_dataset(path: &Path) -> Result<DatasetBundle, RdkError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => {
            let activity = read_csv_as_strings(path)?;
            debug!(rows = activity.height(), "loaded csv activity table");
            Ok(DatasetBundle {
                activity,
                summary: DataFrame::empty(),
                resets: DataFrame::empty(),
            })
        }
        "xls" | "xlsx" => load_workbook(path),
        _ => Err(RdkError::UnsupportedFormat(ext)),
    }
}

/// Read a CSV file with all columns as String dtype.
/// Trims whitespace from column names.
fn read_csv_as_strings(path: &Path) -> Result<DataFrame, RdkError> {
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;

    Ok(df)
}

fn load_workbook(path: &Path) -> Result<DatasetBundle, RdkError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    // "Data" located case-insensitively; first sheet as fallback.
    let data_sheet = sheet_names
        .iter()
        .find(|n| n.eq_ignore_ascii_case(sheet::DATA))
        .or_else(|| sheet_names.first())
        .cloned();

    let activity = match data_sheet {
        Some(name) => range_to_dataframe(&workbook.worksheet_range(&name)?)?,
        None => DataFrame::empty(),
    };

    // Optional sheets substitute an empty table rather than failing.
    let summary = load_optional_sheet(&mut workbook, &sheet_names, sheet::SUMMARY)?;
    let resets = load_optional_sheet(&mut workbook, &sheet_names, sheet::RESET_UPDATE)?;

    debug!(
        rows = activity.height(),
        reset_rows = resets.height(),
        "loaded workbook tables"
    );

    Ok(DatasetBundle {
        activity,
        summary,
        resets,
    })
}

fn load_optional_sheet(
    workbook: &mut calamine::Sheets<std::io::BufReader<std::fs::File>>,
    sheet_names: &[String],
    name: &str,
) -> Result<DataFrame, RdkError> {
    if sheet_names.iter().any(|n| n == name) {
        range_to_dataframe(&workbook.worksheet_range(name)?)
    } else {
        Ok(DataFrame::empty())
    }
}

/// Convert a calamine cell range into an all-strings DataFrame.
/// The first row supplies trimmed, de-duplicated column names.
fn range_to_dataframe(range: &Range<Data>) -> Result<DataFrame, RdkError> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(DataFrame::empty());
    };

    let mut seen: HashMap<String, usize> = HashMap::new();
    let names: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(j, cell)| {
            let base = cell_to_string(cell).unwrap_or_else(|| format!("Column{}", j + 1));
            let base = base.trim().to_string();
            let n = seen.entry(base.clone()).or_insert(0);
            *n += 1;
            if *n == 1 {
                base
            } else {
                format!("{}_{}", base, n)
            }
        })
        .collect();

    let width = names.len();
    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
    for row in rows {
        for j in 0..width {
            values[j].push(row.get(j).and_then(cell_to_string));
        }
    }

    let columns: Vec<Column> = names
        .into_iter()
        .zip(values)
        .map(|(name, vals)| Series::new(name.into(), vals).into())
        .collect();

    Ok(DataFrame::new(columns)?)
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        // Excel stores integers as floats; render whole values without ".0"
        // so key columns round-trip as clean text.
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                Some(format!("{}", *f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(_) => None,
    }
}
