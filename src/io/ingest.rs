//! CSV ingest and schema validation.
//!
//! This module turns an uploaded sales table into a validated [`Dataset`].
//!
//! Design goals:
//! - **Strict schema**: all required columns must be present (every missing one is reported)
//! - **All-or-nothing**: one bad date or sales value rejects the whole upload
//! - **Separation of concerns**: no filtering or aggregation here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{DATE_FORMAT, Dataset, REQUIRED_COLUMNS, Record};
use crate::error::{PipelineError, Result};

/// An unvalidated table: header names plus rows of string cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<StringRecord>,
}

impl RawTable {
    /// Build a table from a mapping of column name to column values.
    ///
    /// Shorter columns are padded with empty cells.
    pub fn from_columns<N, V>(columns: Vec<(N, Vec<V>)>) -> Self
    where
        N: Into<String>,
        V: AsRef<str>,
    {
        let n_rows = columns.iter().map(|(_, values)| values.len()).max().unwrap_or(0);
        let mut rows = vec![StringRecord::new(); n_rows];
        let mut headers = Vec::with_capacity(columns.len());

        for (name, values) in columns {
            headers.push(name.into());
            for (idx, row) in rows.iter_mut().enumerate() {
                row.push_field(values.get(idx).map(AsRef::as_ref).unwrap_or(""));
            }
        }

        Self { headers, rows }
    }

    pub fn n_columns(&self) -> usize {
        self.headers.len()
    }
}

/// Validation output: the dataset plus its shape for the confirmation message.
#[derive(Debug, Clone)]
pub struct ValidatedDataset {
    pub dataset: Dataset,
    pub rows: usize,
    pub columns: usize,
}

/// Read and validate a sales CSV from disk.
pub fn load_sales_csv(path: &Path) -> Result<ValidatedDataset> {
    let table = read_csv_path(path)?;
    let validated = validate(&table)?;
    info!(
        path = %path.display(),
        rows = validated.rows,
        columns = validated.columns,
        "loaded sales CSV"
    );
    Ok(validated)
}

pub fn read_csv_path(path: &Path) -> Result<RawTable> {
    let file = File::open(path)
        .map_err(|e| PipelineError::Read(format!("cannot open '{}': {e}", path.display())))?;
    read_csv(file)
}

/// Read comma-separated text into a [`RawTable`].
///
/// Cells are kept verbatim; only header names are normalized later, during validation.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::Read(format!("headers: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| PipelineError::Read(e.to_string()))?;

    Ok(RawTable { headers, rows })
}

/// Validate `table` against [`REQUIRED_COLUMNS`] and parse every row.
pub fn validate(table: &RawTable) -> Result<ValidatedDataset> {
    let header_map = ensure_required_columns(&table.headers, &REQUIRED_COLUMNS)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (idx, row) in table.rows.iter().enumerate() {
        // +2: header is line 1, and lines are 1-based.
        let line = idx + 2;
        records.push(parse_row(row, &header_map, line)?);
    }

    debug!(rows = records.len(), "validated sales rows");

    Ok(ValidatedDataset {
        rows: records.len(),
        columns: table.n_columns(),
        dataset: Dataset::new(records),
    })
}

/// Map each normalized header name to its column index, failing with every
/// `required` column that is absent.
pub fn ensure_required_columns(
    headers: &[String],
    required: &[&str],
) -> Result<HashMap<String, usize>> {
    let header_map = build_header_map(headers);

    let missing: Vec<String> = required
        .iter()
        .filter(|name| !header_map.contains_key(**name))
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(PipelineError::Schema { missing });
    }
    Ok(header_map)
}

fn build_header_map(headers: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim_start_matches('\u{feff}').trim().to_string()
}

fn parse_row(
    row: &StringRecord,
    header_map: &HashMap<String, usize>,
    line: usize,
) -> Result<Record> {
    let date_cell = get_cell(row, header_map, "Date", line)?;
    let date =
        parse_date(date_cell).map_err(|reason| format_error(line, "Date", date_cell, reason))?;

    let region = get_cell(row, header_map, "Region", line)?.to_string();
    let product = get_cell(row, header_map, "Product", line)?.to_string();

    let sales_cell = get_cell(row, header_map, "Sales", line)?;
    let sales = parse_sales(sales_cell)
        .map_err(|reason| format_error(line, "Sales", sales_cell, reason))?;

    Ok(Record {
        date,
        region,
        product,
        sales,
    })
}

fn get_cell<'a>(
    row: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
    line: usize,
) -> Result<&'a str> {
    let idx = header_map.get(name).ok_or_else(|| PipelineError::Schema {
        missing: vec![name.to_string()],
    })?;
    row.get(*idx)
        .ok_or_else(|| format_error(line, name, "", "row has fewer cells than the header"))
}

/// Parse a strict `YYYY-MM-DD` date.
///
/// `NaiveDate::parse_from_str` alone also accepts unpadded months/days, so
/// the layout is checked first.
pub fn parse_date(s: &str) -> std::result::Result<NaiveDate, &'static str> {
    let bytes = s.as_bytes();
    let layout_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !layout_ok {
        return Err("expected YYYY-MM-DD");
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| "not a valid calendar date")
}

fn parse_sales(s: &str) -> std::result::Result<f64, &'static str> {
    let v = s.trim().parse::<f64>().map_err(|_| "expected a number")?;
    if v.is_finite() { Ok(v) } else { Err("expected a finite number") }
}

fn format_error(line: usize, column: &str, value: &str, reason: &str) -> PipelineError {
    PipelineError::Format {
        line,
        column: column.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::NamedTempFile;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn accepts_any_column_order_with_extras_and_padded_headers() {
        let csv = " Sales ,Notes,Product, Region,Date\n\
                   12.5,x,Widget,North,2024-01-02\n\
                   -3,,Gadget,South,2024-01-01\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        let validated = validate(&table).unwrap();

        assert_eq!(validated.rows, 2);
        assert_eq!(validated.columns, 5);
        let records = validated.dataset.records();
        assert_eq!(records[0].date, d(2024, 1, 2));
        assert_eq!(records[0].region, "North");
        assert_eq!(records[0].product, "Widget");
        assert_eq!(records[0].sales, 12.5);
        assert_eq!(records[1].sales, -3.0);
    }

    #[test]
    fn reports_all_missing_columns() {
        let table = read_csv("Date,Product\n2024-01-01,Widget\n".as_bytes()).unwrap();
        let err = validate(&table).unwrap_err();
        assert_eq!(
            err,
            PipelineError::Schema {
                missing: vec!["Region".to_string(), "Sales".to_string()]
            }
        );
    }

    #[test]
    fn header_matching_is_case_sensitive() {
        let table = read_csv("date,Region,Product,Sales\n".as_bytes()).unwrap();
        let err = validate(&table).unwrap_err();
        assert_eq!(err, PipelineError::Schema { missing: vec!["Date".to_string()] });
    }

    #[test]
    fn strips_bom_from_first_header() {
        let text = "\u{feff}Date,Region,Product,Sales\n2024-01-01,N,W,1\n";
        let table = read_csv(text.as_bytes()).unwrap();
        assert_eq!(validate(&table).unwrap().rows, 1);
    }

    #[test]
    fn one_bad_date_rejects_the_whole_table() {
        let csv = "Date,Region,Product,Sales\n\
                   2024-01-01,N,W,1\n\
                   2024-1-02,N,W,1\n";
        let table = read_csv(csv.as_bytes()).unwrap();
        match validate(&table).unwrap_err() {
            PipelineError::Format { line, column, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "Date");
                assert_eq!(value, "2024-1-02");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn strict_date_layout() {
        assert!(parse_date("2024-02-29").is_ok());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("2024/01/01").is_err());
        assert!(parse_date(" 2024-01-01").is_err());
        assert!(parse_date("2024-01-01T00:00").is_err());
    }

    #[test]
    fn non_numeric_sales_is_a_format_error() {
        let table = read_csv("Date,Region,Product,Sales\n2024-01-01,N,W,abc\n".as_bytes()).unwrap();
        assert!(matches!(
            validate(&table),
            Err(PipelineError::Format { column, .. }) if column == "Sales"
        ));
    }

    #[test]
    fn short_row_is_a_format_error() {
        let table = read_csv("Date,Region,Product,Sales\n2024-01-01,N\n".as_bytes()).unwrap();
        assert!(matches!(validate(&table), Err(PipelineError::Format { line: 2, .. })));
    }

    #[test]
    fn header_only_file_is_an_empty_dataset() {
        let table = read_csv("Date,Region,Product,Sales\n".as_bytes()).unwrap();
        let validated = validate(&table).unwrap();
        assert_eq!(validated.rows, 0);
        assert!(validated.dataset.is_empty());
    }

    #[test]
    fn builds_from_column_mapping() {
        let table = RawTable::from_columns(vec![
            ("Date", vec!["2024-01-01", "2024-01-02"]),
            ("Region", vec!["N", "S"]),
            ("Product", vec!["W", "W"]),
            ("Sales", vec!["1", "2"]),
        ]);
        let validated = validate(&table).unwrap();
        assert_eq!(validated.dataset.total_sales(), 3.0);
    }

    #[test]
    fn loads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Date,Region,Product,Sales").unwrap();
        writeln!(file, "2024-01-01,North,Widget,100").unwrap();
        let validated = load_sales_csv(file.path()).unwrap();
        assert_eq!(validated.rows, 1);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_sales_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Read(_)));
    }
}
