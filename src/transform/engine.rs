//! Sequential pipeline execution.
//!
//! [`apply_pipeline`] applies an ordered step list to a table, each enabled
//! step consuming the previous step's output. The engine is stateless and
//! never mutates the caller's table; every step produces a new table value.

use super::group;
use super::op::{Op, ResampleAgg, SmoothMethod, TransformError};
use super::series;
use super::step::TransformStep;
use super::window;
use crate::expr::{self, Series};
use crate::loader;
use crate::table::{Column, Table, TableError};
use tracing::warn;

/// The outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    /// The transformed table.
    pub table: Table,
    /// Human-readable recoverable issues, one per degraded step or skipped
    /// column, each prefixed with the offending step's 1-based index.
    pub warnings: Vec<String>,
    /// Number of enabled steps that were executed.
    pub steps_applied: usize,
}

/// Applies `steps` to `table` left to right, skipping disabled steps.
///
/// Recoverable issues (missing columns, degenerate statistics, bad queries)
/// degrade to warnings on the returned [`PipelineRun`]; each step's output is
/// either fully valid or identical to its input, and progress before a
/// degraded step is kept.
///
/// # Errors
///
/// [`TransformError::UnknownKind`] when any enabled step's `transform_type`
/// is not in the catalog. The whole step list is resolved before anything is
/// applied, so an unknown kind never yields a partially transformed table.
pub fn apply_pipeline(
    table: &Table,
    steps: &[TransformStep],
) -> Result<PipelineRun, TransformError> {
    // Resolve every enabled step upfront: a corrupted step list fails before
    // any work is done.
    let ops: Vec<(usize, Op)> = steps
        .iter()
        .enumerate()
        .filter(|(_, step)| step.enabled)
        .map(|(idx, step)| Op::from_step(step).map(|op| (idx + 1, op)))
        .collect::<Result<_, _>>()?;

    let mut run = Run {
        table: table.clone(),
        warnings: Vec::new(),
    };
    let steps_applied = ops.len();
    for (step_no, op) in ops {
        run.apply(step_no, &op);
    }
    Ok(PipelineRun {
        table: run.table,
        warnings: run.warnings,
        steps_applied,
    })
}

/// Mutable state threaded through one pipeline run.
struct Run {
    table: Table,
    warnings: Vec<String>,
}

impl Run {
    fn warn(&mut self, step_no: usize, op: &Op, msg: impl AsRef<str>) {
        let msg = msg.as_ref();
        let kind = op.kind_name();
        warn!(step = step_no, kind, "{msg}");
        self.warnings.push(format!("step {step_no} ({kind}): {msg}"));
    }

    /// Resolves target names to numeric columns, warning about names that do
    /// not exist or are not numeric.
    fn numeric_targets(&mut self, step_no: usize, op: &Op, names: &[String]) -> Vec<String> {
        let mut valid = Vec::with_capacity(names.len());
        for name in names {
            match self.table.column(name) {
                None => self.warn(step_no, op, format!("column '{name}' not found, skipped")),
                Some(col) if col.as_number().is_none() => self.warn(
                    step_no,
                    op,
                    format!("column '{name}' is {}, not numeric, skipped", col.kind()),
                ),
                Some(_) => valid.push(name.clone()),
            }
        }
        valid
    }

    fn numeric_cells(&self, name: &str) -> Vec<Option<f64>> {
        self.table
            .column(name)
            .and_then(Column::as_number)
            .map(<[Option<f64>]>::to_vec)
            .unwrap_or_default()
    }

    /// Replaces or appends a column; a length mismatch is an internal
    /// invariant break and degrades to a warning.
    fn set_column(&mut self, step_no: usize, op: &Op, column: Column) {
        match self.table.with_column(column) {
            Ok(table) => self.table = table,
            Err(err) => self.warn(step_no, op, err.to_string()),
        }
    }

    fn set_table(&mut self, step_no: usize, op: &Op, result: Result<Table, TableError>) {
        match result {
            Ok(table) => self.table = table,
            Err(err) => self.warn(step_no, op, err.to_string()),
        }
    }

    fn apply(&mut self, step_no: usize, op: &Op) {
        match op {
            Op::ColumnMath {
                operation,
                columns,
                new_column,
            } => {
                let valid = self.numeric_targets(step_no, op, columns);
                if valid.len() < 2 {
                    self.warn(step_no, op, "needs at least two numeric columns, skipped");
                    return;
                }
                let cells: Vec<Vec<Option<f64>>> =
                    valid.iter().map(|name| self.numeric_cells(name)).collect();
                let operands: Vec<&[Option<f64>]> =
                    cells.iter().map(Vec::as_slice).collect();
                let out = series::combine_values(*operation, &operands);
                self.set_column(step_no, op, Column::number(new_column.clone(), out));
            }

            Op::Normalize { method, columns } => {
                for name in self.numeric_targets(step_no, op, columns) {
                    let cells = self.numeric_cells(&name);
                    match series::normalize_values(*method, &cells) {
                        Some(out) => self.set_column(step_no, op, Column::number(name, out)),
                        None => self.warn(
                            step_no,
                            op,
                            format!("column '{name}' has no spread, left unchanged"),
                        ),
                    }
                }
            }

            Op::Smooth {
                method,
                window,
                columns,
            } => {
                for name in self.numeric_targets(step_no, op, columns) {
                    let cells = self.numeric_cells(&name);
                    let out = match method {
                        SmoothMethod::RollingMean => window::rolling(
                            &cells,
                            *window,
                            super::op::RollingStat::Mean,
                            true,
                        ),
                        SmoothMethod::RollingMedian => window::rolling(
                            &cells,
                            *window,
                            super::op::RollingStat::Median,
                            true,
                        ),
                        SmoothMethod::Ewm => window::ewm_mean(&cells, *window),
                    };
                    self.set_column(step_no, op, Column::number(name, out));
                }
            }

            Op::Resample {
                freq,
                agg,
                date_column,
            } => self.resample(step_no, op, freq, *agg, date_column.as_deref()),

            Op::Interpolate { method, columns } => {
                for name in self.numeric_targets(step_no, op, columns) {
                    let cells = self.numeric_cells(&name);
                    let out = series::interpolate_values(*method, &cells);
                    self.set_column(step_no, op, Column::number(name, out));
                }
            }

            Op::Filter { query } => {
                if query.trim().is_empty() {
                    return;
                }
                let expr = match expr::parse(query) {
                    Ok(expr) => expr,
                    Err(err) => {
                        self.warn(step_no, op, format!("invalid query: {err}"));
                        return;
                    }
                };
                match expr::evaluate(&expr, &self.table).and_then(Series::into_mask) {
                    Ok(mask) => self.table = self.table.filter_rows(&mask),
                    Err(err) => self.warn(step_no, op, format!("query failed: {err}")),
                }
            }

            Op::Group { group_by, agg_func } => {
                let (keys, missing): (Vec<String>, Vec<String>) = group_by
                    .iter()
                    .cloned()
                    .partition(|name| self.table.has_column(name));
                for name in missing {
                    self.warn(
                        step_no,
                        op,
                        format!("group column '{name}' not found, skipped"),
                    );
                }
                if keys.is_empty() {
                    self.warn(step_no, op, "no valid group columns, skipped");
                    return;
                }
                let has_values = self
                    .table
                    .columns()
                    .iter()
                    .any(|c| !keys.contains(&c.name) && c.as_number().is_some());
                if !has_values {
                    self.warn(step_no, op, "no numeric columns to aggregate, skipped");
                    return;
                }
                let result = group::grouped(&self.table, &keys, *agg_func);
                self.set_table(step_no, op, result);
            }

            Op::ComputedSeries {
                expression,
                new_column,
            } => {
                if expression.trim().is_empty() {
                    self.warn(step_no, op, "empty expression, skipped");
                    return;
                }
                let expr = match expr::parse(expression) {
                    Ok(expr) => expr,
                    Err(err) => {
                        self.warn(step_no, op, format!("invalid expression: {err}"));
                        return;
                    }
                };
                match expr::evaluate(&expr, &self.table) {
                    Ok(Series::Number(cells)) => {
                        self.set_column(step_no, op, Column::number(new_column.clone(), cells));
                    }
                    Ok(Series::Bool(cells)) => {
                        // Boolean results materialize as 0/1 so they can be
                        // charted directly.
                        let cells = cells
                            .iter()
                            .map(|c| c.map(|b| if b { 1.0 } else { 0.0 }))
                            .collect();
                        self.set_column(step_no, op, Column::number(new_column.clone(), cells));
                    }
                    Ok(Series::Text(cells)) => {
                        self.set_column(step_no, op, Column::text(new_column.clone(), cells));
                    }
                    Err(err) => self.warn(step_no, op, format!("expression failed: {err}")),
                }
            }

            Op::Rolling {
                window,
                operation,
                columns,
            } => {
                for name in self.numeric_targets(step_no, op, columns) {
                    let cells = self.numeric_cells(&name);
                    let out = window::rolling(&cells, *window, *operation, false);
                    self.set_column(step_no, op, Column::number(name, out));
                }
            }

            Op::Diff { periods, columns } => {
                for name in self.numeric_targets(step_no, op, columns) {
                    let cells = self.numeric_cells(&name);
                    let out = series::diff_values(&cells, *periods);
                    self.set_column(step_no, op, Column::number(name, out));
                }
            }

            Op::PctChange { periods, columns } => {
                for name in self.numeric_targets(step_no, op, columns) {
                    let cells = self.numeric_cells(&name);
                    let out = series::pct_change_values(&cells, *periods);
                    self.set_column(step_no, op, Column::number(name, out));
                }
            }
        }
    }

    fn resample(
        &mut self,
        step_no: usize,
        op: &Op,
        freq: &str,
        agg: ResampleAgg,
        date_column: Option<&str>,
    ) {
        let Some(bucket_ms) = group::parse_freq(freq) else {
            self.warn(step_no, op, format!("unknown frequency '{freq}', skipped"));
            return;
        };

        // An explicit date column wins; otherwise the first timestamp column.
        let date_name = match date_column {
            Some(name) => {
                if !self.table.has_column(name) {
                    self.warn(
                        step_no,
                        op,
                        format!("date column '{name}' not found, skipped"),
                    );
                    return;
                }
                name.to_owned()
            }
            None => {
                let Some(name) = self
                    .table
                    .columns()
                    .iter()
                    .find(|c| c.as_timestamp().is_some())
                    .map(|c| c.name.clone())
                else {
                    self.warn(step_no, op, "no timestamp column, skipped");
                    return;
                };
                name
            }
        };

        let column = match self.table.column(&date_name) {
            Some(column) => column,
            None => return,
        };
        let millis: Vec<Option<i64>> = if let Some(cells) = column.as_timestamp() {
            cells.to_vec()
        } else if let Some(cells) = column.as_text() {
            // Text date columns get a best-effort parse with the loader's
            // recognized formats.
            cells
                .iter()
                .map(|cell| cell.as_deref().and_then(loader::parse_timestamp))
                .collect()
        } else {
            self.warn(
                step_no,
                op,
                format!("date column '{date_name}' is not temporal, skipped"),
            );
            return;
        };

        if millis.iter().all(Option::is_none) {
            self.warn(
                step_no,
                op,
                format!("no usable dates in column '{date_name}', skipped"),
            );
            return;
        }

        let result = group::resample(&self.table, &date_name, &millis, bucket_ms, agg);
        self.set_table(step_no, op, result);
    }
}
