//! Project file I/O: saving and restoring `.graphproj` files, plus exporting
//! transformed tables.
//!
//! A project file is pretty-printed JSON so it diffs cleanly under version
//! control.

use crate::error::{Result, ResultExt};
use crate::model::ProjectState;
use crate::table::{Table, Values, format_timestamp};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

/// The project file extension, without the leading dot.
pub const PROJECT_EXTENSION: &str = "graphproj";

/// Writes the project as pretty JSON.
pub fn save_project(project: &ProjectState, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(project).context("serializing project")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "saved project");
    Ok(())
}

/// Reads a project back from disk.
pub fn load_project(path: &Path) -> Result<ProjectState> {
    let json =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let project =
        serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;
    info!(path = %path.display(), "loaded project");
    Ok(project)
}

/// Exports a table as CSV, one header row then one line per record. Missing
/// cells become empty fields; timestamps are RFC 3339.
pub fn export_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer
        .write_record(table.column_names())
        .context("writing CSV header")?;
    for row in 0..table.n_rows() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|column| match &column.values {
                Values::Number(v) => v[row].map(|x| x.to_string()).unwrap_or_default(),
                Values::Text(v) => v[row].clone().unwrap_or_default(),
                Values::Timestamp(v) => v[row].map(format_timestamp).unwrap_or_default(),
            })
            .collect();
        writer.write_record(&record).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

/// Exports a table as a pretty JSON record array, one object per row.
pub fn export_json(table: &Table, path: &Path) -> Result<()> {
    let records: Vec<Value> = (0..table.n_rows())
        .map(|row| {
            let fields = table
                .columns()
                .iter()
                .map(|column| {
                    let value = match &column.values {
                        Values::Number(v) => v[row]
                            .and_then(serde_json::Number::from_f64)
                            .map_or(Value::Null, Value::Number),
                        Values::Text(v) => v[row].clone().map_or(Value::Null, Value::String),
                        Values::Timestamp(v) => v[row]
                            .map_or(Value::Null, |ms| Value::String(format_timestamp(ms))),
                    };
                    (column.name.clone(), value)
                })
                .collect();
            Value::Object(fields)
        })
        .collect();
    let json =
        serde_json::to_string_pretty(&records).context("serializing exported records")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
