//! Imported datasets and their provenance.

use crate::table::{Column, Table, Values, format_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Csv,
    Json,
    Clipboard,
    #[default]
    Manual,
}

/// A named dataset plus import metadata.
///
/// The table persists in split orientation (`{"columns": [...], "data":
/// [row, ...]}`) with timestamps as RFC 3339 strings; column kinds are
/// re-inferred on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub name: String,
    #[serde(rename = "data", with = "split")]
    pub table: Table,
    #[serde(default)]
    pub source_type: SourceType,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: u32,
}

impl DataSource {
    /// Wraps a freshly imported table.
    pub fn new(name: impl Into<String>, table: Table, source_type: SourceType) -> Self {
        Self {
            name: name.into(),
            table,
            source_type,
            created_at: Utc::now(),
            version: 1,
        }
    }
}

fn default_version() -> u32 {
    1
}

/// Split-orientation table glue: column names once, then one JSON array per
/// row of plain scalars.
mod split {
    use super::*;
    use serde::de::Error as _;
    use serde_json::Value;

    #[derive(Serialize)]
    struct Frame<'a> {
        columns: Vec<&'a str>,
        data: Vec<Vec<Value>>,
    }

    #[derive(Deserialize)]
    struct OwnedFrame {
        columns: Vec<String>,
        data: Vec<Vec<Value>>,
    }

    pub fn serialize<S: serde::Serializer>(table: &Table, ser: S) -> Result<S::Ok, S::Error> {
        let columns = table.column_names().collect();
        let data = (0..table.n_rows())
            .map(|row| table.columns().iter().map(|c| cell_json(c, row)).collect())
            .collect();
        Frame { columns, data }.serialize(ser)
    }

    fn cell_json(column: &Column, row: usize) -> Value {
        match &column.values {
            // Non-finite numbers have no JSON representation and become null.
            Values::Number(v) => v[row]
                .and_then(serde_json::Number::from_f64)
                .map_or(Value::Null, Value::Number),
            Values::Text(v) => v[row].clone().map_or(Value::Null, Value::String),
            Values::Timestamp(v) => {
                v[row].map_or(Value::Null, |ms| Value::String(format_timestamp(ms)))
            }
        }
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(de: D) -> Result<Table, D::Error> {
        let frame = OwnedFrame::deserialize(de)?;
        let n_rows = frame.data.len();
        let mut columns = Vec::with_capacity(frame.columns.len());
        for (idx, name) in frame.columns.into_iter().enumerate() {
            let mut cells = Vec::with_capacity(n_rows);
            for (row_no, row) in frame.data.iter().enumerate() {
                let cell = row.get(idx).ok_or_else(|| {
                    D::Error::custom(format!("row {row_no} is shorter than the column list"))
                })?;
                cells.push(cell.clone());
            }
            columns.push(infer_column(name, &cells).map_err(D::Error::custom)?);
        }
        Table::from_columns(columns).map_err(D::Error::custom)
    }

    /// Rebuilds a typed column from loose JSON scalars: all numbers make a
    /// number column, all RFC 3339 strings a timestamp column, any other mix
    /// of scalars a text column.
    fn infer_column(name: String, cells: &[Value]) -> Result<Column, String> {
        let present: Vec<&Value> = cells.iter().filter(|v| !v.is_null()).collect();

        if present.iter().all(|v| v.is_number()) {
            let cells = cells.iter().map(Value::as_f64).collect();
            return Ok(Column::number(name, cells));
        }

        let all_timestamps = !present.is_empty()
            && present.iter().all(|v| {
                v.as_str()
                    .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok())
            });
        if all_timestamps {
            let cells = cells
                .iter()
                .map(|v| {
                    v.as_str()
                        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                        .map(|dt| dt.timestamp_millis())
                })
                .collect();
            return Ok(Column::timestamp(name, cells));
        }

        let cells = cells
            .iter()
            .map(|v| match v {
                Value::Null => Ok(None),
                Value::String(s) => Ok(Some(s.clone())),
                Value::Bool(b) => Ok(Some(b.to_string())),
                Value::Number(n) => Ok(Some(n.to_string())),
                other => Err(format!("column '{name}' holds a non-scalar cell: {other}")),
            })
            .collect::<Result<_, _>>()?;
        Ok(Column::text(name, cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataSource {
        let table = Table::from_columns(vec![
            Column::timestamp("date", vec![Some(0), Some(86_400_000), None]),
            Column::number("value", vec![Some(1.5), None, Some(3.0)]),
            Column::text(
                "label",
                vec![Some("a".to_owned()), Some("b".to_owned()), None],
            ),
        ])
        .expect("uniform columns");
        DataSource::new("demo", table, SourceType::Csv)
    }

    #[test]
    fn test_round_trip_preserves_table_and_kinds() {
        let source = sample();
        let json = serde_json::to_string(&source).expect("serializable");
        let back: DataSource = serde_json::from_str(&json).expect("round trip");
        assert_eq!(back, source);
    }

    #[test]
    fn test_serialized_shape_is_split_orientation() {
        let json = serde_json::to_value(sample()).expect("serializable");
        assert_eq!(json["data"]["columns"][0], "date");
        assert_eq!(json["data"]["data"][0][0], "1970-01-01T00:00:00+00:00");
        assert_eq!(json["data"]["data"][0][1], 1.5);
        assert!(json["data"]["data"][2][2].is_null());
    }

    #[test]
    fn test_numeric_strings_stay_text() {
        let json = serde_json::json!({
            "name": "x",
            "data": {"columns": ["id"], "data": [["007"], ["008"]]},
            "source_type": "manual",
            "created_at": "2024-01-01T00:00:00Z",
            "version": 1,
        });
        let source: DataSource = serde_json::from_value(json).expect("parses");
        assert!(source.table.column("id").and_then(Column::as_text).is_some());
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let json = serde_json::json!({
            "name": "x",
            "data": {"columns": ["a", "b"], "data": [[1, 2], [3]]},
            "created_at": "2024-01-01T00:00:00Z",
        });
        assert!(serde_json::from_value::<DataSource>(json).is_err());
    }
}
