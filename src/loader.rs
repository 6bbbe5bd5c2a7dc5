//! Importing tabular data from CSV, TSV, JSON, and clipboard text.
//!
//! Imports arrive as all-text cells; [`infer`](fn@infer) then promotes each
//! column to timestamps or numbers when at least 80% of its present cells
//! parse, matching the loose typing users expect from spreadsheet pastes.

use crate::error::{Result, ResultExt};
use crate::model::{DataSource, SourceType};
use crate::table::{Column, Table};
use chrono::{DateTime, Days, Months, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

/// Loads comma-separated content.
pub fn from_csv(content: &str, name: &str) -> Result<DataSource> {
    let table = read_delimited(content, b',')?;
    Ok(DataSource::new(name, table, SourceType::Csv))
}

/// Loads tab-separated content.
pub fn from_tsv(content: &str, name: &str) -> Result<DataSource> {
    let table = read_delimited(content, b'\t')?;
    Ok(DataSource::new(name, table, SourceType::Csv))
}

/// Loads clipboard text, sniffing the delimiter: a tab anywhere in the first
/// line wins, otherwise comma.
pub fn from_clipboard(content: &str, name: &str) -> Result<DataSource> {
    let content = content.trim();
    if content.is_empty() {
        return Err(crate::error::GraphsmithError::Data(
            "empty clipboard content".to_owned(),
        ));
    }
    let delimiter = if content.lines().next().is_some_and(|l| l.contains('\t')) {
        b'\t'
    } else {
        b','
    };
    let table = read_delimited(content, delimiter)?;
    Ok(DataSource::new(name, table, SourceType::Clipboard))
}

/// Loads JSON content: either a record array `[{"col": val, ...}, ...]` or a
/// column map `{"col": [...], ...}`.
pub fn from_json(content: &str, name: &str) -> Result<DataSource> {
    let value: Value = serde_json::from_str(content).context("invalid JSON")?;
    let table = match &value {
        Value::Array(records) => table_from_records(records)?,
        Value::Object(map) => table_from_column_map(map)?,
        _ => {
            return Err(crate::error::GraphsmithError::Data(
                "JSON must be a record array or a column map".to_owned(),
            ));
        }
    };
    Ok(DataSource::new(name, table, SourceType::Json))
}

fn read_delimited(content: &str, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(str::to_owned)
        .collect();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.context("reading data row")?;
        for (idx, column) in cells.iter_mut().enumerate() {
            let raw = record.get(idx).unwrap_or("").trim();
            column.push((!raw.is_empty()).then(|| raw.to_owned()));
        }
    }
    debug!(
        columns = headers.len(),
        rows = cells.first().map_or(0, Vec::len),
        "parsed delimited input"
    );

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| infer(Column::text(name, cells)))
        .collect();
    Ok(Table::from_columns(columns)?)
}

fn table_from_records(records: &[Value]) -> Result<Table> {
    // Column order follows first appearance across records.
    let mut names: Vec<String> = Vec::new();
    for record in records {
        let Value::Object(map) = record else {
            return Err(crate::error::GraphsmithError::Data(
                "record array must contain objects".to_owned(),
            ));
        };
        for key in map.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let cells = records
                .iter()
                .map(|record| record.get(&name).map_or(Ok(None), json_cell))
                .collect::<Result<Vec<_>>>()?;
            Ok(infer(Column::text(name, cells)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Table::from_columns(columns)?)
}

fn table_from_column_map(map: &serde_json::Map<String, Value>) -> Result<Table> {
    let columns = map
        .iter()
        .map(|(name, value)| {
            let Value::Array(items) = value else {
                return Err(crate::error::GraphsmithError::Data(format!(
                    "column '{name}' must be an array"
                )));
            };
            let cells = items.iter().map(json_cell).collect::<Result<Vec<_>>>()?;
            Ok(infer(Column::text(name.clone(), cells)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Table::from_columns(columns)?)
}

/// Flattens a JSON scalar to the loader's all-text intermediate form.
fn json_cell(value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(crate::error::GraphsmithError::Data(format!(
            "unsupported nested JSON value: {other}"
        ))),
    }
}

/// Promotes a text column to timestamps or numbers when at least 80% of its
/// present cells parse. Timestamps win over numbers, so `2023-01-02` stays a
/// date rather than becoming arithmetic on dashes.
fn infer(column: Column) -> Column {
    let (present, timestamps, numbers) = {
        let Some(cells) = column.as_text() else {
            return column;
        };
        let present = cells.iter().flatten().count();
        if present == 0 {
            return column;
        }
        let timestamps: Vec<Option<i64>> = cells
            .iter()
            .map(|cell| cell.as_deref().and_then(parse_timestamp))
            .collect();
        let numbers: Vec<Option<f64>> = cells
            .iter()
            .map(|cell| cell.as_deref().and_then(|s| s.parse().ok()))
            .collect();
        (present, timestamps, numbers)
    };

    // Missing cells do not vote: a sparse numeric column is still numeric.
    let threshold = (present as f64) * 0.8;
    if timestamps.iter().flatten().count() as f64 >= threshold {
        Column::timestamp(column.name, timestamps)
    } else if numbers.iter().flatten().count() as f64 >= threshold {
        Column::number(column.name, numbers)
    } else {
        column
    }
}

/// Parses a date or datetime string to epoch milliseconds (UTC), trying
/// RFC 3339 first and then the common spreadsheet formats.
pub(crate) fn parse_timestamp(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc().timestamp_millis());
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis());
        }
    }
    None
}

fn day_ms(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis()
}

fn sampled(n: usize, f: impl Fn(f64) -> f64) -> Vec<f64> {
    (0..n).map(|i| f(i as f64)).collect()
}

/// Three smooth overlapping daily series, 100 points from 2023-01-01.
pub fn example_overlapping_trends() -> DataSource {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid date");
    let dates: Vec<Option<i64>> = (0..100)
        .map(|i| Some(day_ms(start) + i * 86_400_000))
        .collect();

    let table = Table::from_columns(vec![
        Column::timestamp("Date", dates),
        Column::number_dense(
            "Metric A",
            sampled(100, |x| 100.0 + x * 0.5 + 10.0 * (x / 10.0).sin()),
        ),
        Column::number_dense(
            "Metric B",
            sampled(100, |x| 80.0 + x * 0.3 + 8.0 * (x / 15.0).cos()),
        ),
        Column::number_dense(
            "Metric C",
            sampled(100, |x| 120.0 + x * 0.2 + 5.0 * (x / 8.0).sin()),
        ),
    ])
    .expect("uniform example columns");
    DataSource::new("Overlapping Trends Example", table, SourceType::Manual)
}

/// Synthetic economic indicators, 48 month-end points from 2020-01-31, with
/// scales suited to a dual-axis chart.
pub fn example_economic() -> DataSource {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
    let dates: Vec<Option<i64>> = (0..48)
        .map(|i| {
            start
                .checked_add_months(Months::new(i + 1))
                .and_then(|d| d.checked_sub_days(Days::new(1)))
                .map(day_ms)
        })
        .collect();

    let table = Table::from_columns(vec![
        Column::timestamp("Date", dates),
        Column::number_dense(
            "GDP (Billions)",
            sampled(48, |x| 20_000.0 + x * 100.0 + 500.0 * (x / 6.0).sin()),
        ),
        Column::number_dense(
            "Unemployment (%)",
            sampled(48, |x| 5.0 + 2.0 * (x / 8.0 + 1.0).sin()),
        ),
        Column::number_dense(
            "Interest Rate (%)",
            sampled(48, |x| 2.0 + 1.5 * (x / 10.0).cos()),
        ),
    ])
    .expect("uniform example columns");
    DataSource::new("Economic Indicators Example", table, SourceType::Manual)
}

/// Thirty hand-picked samples showing two inversely related measurements.
pub fn example_contamination() -> DataSource {
    let contamination = [
        2.0, 3.0, 2.5, 4.0, 5.0, 3.0, 2.0, 1.0, 1.5, 2.0, 3.5, 5.0, 6.0, 7.0, 5.0, 4.0, 3.0,
        2.5, 2.0, 1.5, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 5.5, 4.5, 3.5, 2.5,
    ];
    let rawness = [
        95.0, 93.0, 94.0, 90.0, 85.0, 92.0, 96.0, 98.0, 97.0, 95.0, 91.0, 86.0, 80.0, 75.0,
        84.0, 88.0, 92.0, 93.0, 95.0, 96.0, 98.0, 96.0, 93.0, 89.0, 86.0, 82.0, 84.0, 87.0,
        91.0, 94.0,
    ];
    let table = Table::from_columns(vec![
        Column::number_dense("Sample", (1..=30).map(f64::from)),
        Column::number_dense("Contamination (ppm)", contamination),
        Column::number_dense("Rawness Index", rawness),
    ])
    .expect("uniform example columns");
    DataSource::new("Contamination vs Rawness Example", table, SourceType::Manual)
}

/// The minimal single-point dataset a new project starts from.
pub fn blank_data() -> DataSource {
    let table = Table::from_columns(vec![
        Column::number_dense("X", [0.0]),
        Column::number_dense("Y", [0.0]),
    ])
    .expect("uniform example columns");
    DataSource::new("Blank", table, SourceType::Manual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnKind;

    #[test]
    fn test_csv_infers_types() {
        let source = from_csv("date,value,tag\n2023-01-01,1.5,a\n2023-01-02,2.5,b\n", "t")
            .expect("valid csv");
        let t = &source.table;
        assert_eq!(t.n_rows(), 2);
        assert_eq!(t.column("date").map(Column::kind), Some(ColumnKind::Timestamp));
        assert_eq!(t.column("value").map(Column::kind), Some(ColumnKind::Number));
        assert_eq!(t.column("tag").map(Column::kind), Some(ColumnKind::Text));
    }

    #[test]
    fn test_inference_needs_eighty_percent() {
        // 3 of 5 numeric (60%) stays text; 5 of 5 becomes numeric.
        let source = from_csv("a,b\n1,1\n2,2\nx,3\ny,4\n5,5\n", "t").expect("valid csv");
        assert_eq!(
            source.table.column("a").map(Column::kind),
            Some(ColumnKind::Text)
        );
        assert_eq!(
            source.table.column("b").map(Column::kind),
            Some(ColumnKind::Number)
        );
    }

    #[test]
    fn test_empty_cells_become_missing() {
        let source = from_csv("a,b\n1,x\n,y\n3,z\n", "t").expect("valid csv");
        assert_eq!(
            source.table.column("a").and_then(Column::as_number),
            Some([Some(1.0), None, Some(3.0)].as_slice())
        );
    }

    #[test]
    fn test_clipboard_sniffs_tabs() {
        let source = from_clipboard("a\tb\n1\t2\n", "t").expect("valid paste");
        assert_eq!(source.table.n_columns(), 2);
        assert_eq!(source.source_type, SourceType::Clipboard);
    }

    #[test]
    fn test_empty_clipboard_is_an_error() {
        assert!(from_clipboard("  \n ", "t").is_err());
    }

    #[test]
    fn test_json_record_array() {
        let source = from_json(r#"[{"a": 1, "b": "x"}, {"a": 2}]"#, "t").expect("valid json");
        assert_eq!(
            source.table.column("a").and_then(Column::as_number),
            Some([Some(1.0), Some(2.0)].as_slice())
        );
        assert_eq!(
            source.table.column("b").and_then(Column::as_text),
            Some([Some("x".to_owned()), None].as_slice())
        );
    }

    #[test]
    fn test_json_column_map() {
        let source = from_json(r#"{"a": [1, 2, 3]}"#, "t").expect("valid json");
        assert_eq!(source.table.n_rows(), 3);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("1970-01-01"), Some(0));
        assert_eq!(parse_timestamp("1970-01-01 00:00:01"), Some(1_000));
        assert_eq!(parse_timestamp("01/02/1970"), Some(86_400_000));
        assert_eq!(parse_timestamp("1970/01/02"), Some(86_400_000));
        assert_eq!(parse_timestamp("not a date"), None);
    }

    #[test]
    fn test_example_datasets_are_well_formed() {
        assert_eq!(example_overlapping_trends().table.n_rows(), 100);
        assert_eq!(example_economic().table.n_rows(), 48);
        assert_eq!(example_contamination().table.n_rows(), 30);
        assert_eq!(blank_data().table.n_rows(), 1);
    }

    #[test]
    fn test_economic_dates_are_month_ends() {
        let source = example_economic();
        let dates = source
            .table
            .column("Date")
            .and_then(Column::as_timestamp)
            .expect("timestamp column");
        assert_eq!(
            dates[0].map(crate::table::format_timestamp).as_deref(),
            Some("2020-01-31T00:00:00+00:00")
        );
        assert_eq!(
            dates[1].map(crate::table::format_timestamp).as_deref(),
            Some("2020-02-29T00:00:00+00:00")
        );
    }
}
