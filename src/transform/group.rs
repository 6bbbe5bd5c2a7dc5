//! Row grouping and time-bucket resampling.

use super::op::{GroupAgg, ResampleAgg};
use crate::table::{Column, Table, TableError, Values};
use std::collections::{BTreeMap, HashMap};

/// A group-key cell that can be hashed and compared exactly.
///
/// Numbers are keyed by their bit pattern, so `-0.0` and `0.0` form distinct
/// groups and NaN keys group with themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyCell {
    N(u64),
    T(String),
    Ts(i64),
}

fn key_at(column: &Column, row: usize) -> Option<KeyCell> {
    match &column.values {
        Values::Number(v) => v[row].map(|x| KeyCell::N(x.to_bits())),
        Values::Text(v) => v[row].clone().map(KeyCell::T),
        Values::Timestamp(v) => v[row].map(KeyCell::Ts),
    }
}

/// Running aggregate over one group's cells in one column.
#[derive(Debug, Clone, Copy, Default)]
struct Acc {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl Acc {
    fn push(&mut self, x: f64) {
        if self.count == 0 {
            self.min = x;
            self.max = x;
        } else {
            self.min = self.min.min(x);
            self.max = self.max.max(x);
        }
        self.sum += x;
        self.count += 1;
    }

    fn finish(self, agg: GroupAgg) -> Option<f64> {
        if agg == GroupAgg::Count {
            return Some(self.count as f64);
        }
        if self.count == 0 {
            return None;
        }
        Some(match agg {
            GroupAgg::Mean => self.sum / self.count as f64,
            GroupAgg::Sum => self.sum,
            GroupAgg::Min => self.min,
            GroupAgg::Max => self.max,
            GroupAgg::Count => unreachable!(),
        })
    }
}

/// Groups rows by the named key columns and aggregates every other numeric
/// column. Groups appear in first-seen row order; rows with a missing key
/// cell are dropped, as are non-numeric non-key columns.
///
/// Callers guarantee every name in `key_names` exists in `table` and that at
/// least one non-key numeric column remains to aggregate.
pub(super) fn grouped(
    table: &Table,
    key_names: &[String],
    agg: GroupAgg,
) -> Result<Table, TableError> {
    let key_columns: Vec<&Column> = key_names
        .iter()
        .filter_map(|name| table.column(name))
        .collect();
    let value_columns: Vec<&Column> = table
        .columns()
        .iter()
        .filter(|c| !key_names.contains(&c.name) && c.as_number().is_some())
        .collect();

    // Group index and the first row each group was seen at.
    let mut index: HashMap<Vec<KeyCell>, usize> = HashMap::new();
    let mut first_rows: Vec<usize> = Vec::new();
    let mut accs: Vec<Vec<Acc>> = vec![Vec::new(); value_columns.len()];

    for row in 0..table.n_rows() {
        let key: Option<Vec<KeyCell>> = key_columns.iter().map(|c| key_at(c, row)).collect();
        let Some(key) = key else { continue };
        let group = *index.entry(key).or_insert_with(|| {
            first_rows.push(row);
            for acc in &mut accs {
                acc.push(Acc::default());
            }
            first_rows.len() - 1
        });
        for (col_idx, column) in value_columns.iter().enumerate() {
            if let Some(Some(x)) = column.as_number().map(|cells| cells[row]) {
                accs[col_idx][group].push(x);
            }
        }
    }

    let mut columns = Vec::with_capacity(key_columns.len() + value_columns.len());
    for key_col in &key_columns {
        let values = match &key_col.values {
            Values::Number(v) => Values::Number(first_rows.iter().map(|&r| v[r]).collect()),
            Values::Text(v) => Values::Text(first_rows.iter().map(|&r| v[r].clone()).collect()),
            Values::Timestamp(v) => {
                Values::Timestamp(first_rows.iter().map(|&r| v[r]).collect())
            }
        };
        columns.push(Column {
            name: key_col.name.clone(),
            values,
        });
    }
    for (column, accs) in value_columns.iter().zip(accs) {
        columns.push(Column::number(
            column.name.clone(),
            accs.into_iter().map(|acc| acc.finish(agg)).collect(),
        ));
    }
    Table::from_columns(columns)
}

/// Parses a frequency string like `"d"`, `"15min"`, or `"2h"` into a bucket
/// width in milliseconds. Returns `None` for unrecognized units.
pub(super) fn parse_freq(freq: &str) -> Option<i64> {
    let freq = freq.trim().to_ascii_lowercase();
    let split = freq.find(|c: char| !c.is_ascii_digit()).unwrap_or(freq.len());
    let (digits, unit) = freq.split_at(split);
    let multiple: i64 = if digits.is_empty() {
        1
    } else {
        digits.parse().ok()?
    };
    if multiple < 1 {
        return None;
    }
    let unit_ms: i64 = match unit {
        "s" | "sec" => 1_000,
        "min" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        "w" => 604_800_000,
        _ => return None,
    };
    Some(multiple * unit_ms)
}

/// Re-buckets rows into fixed-width intervals aligned to the Unix epoch.
///
/// `millis` holds each row's timestamp; rows with a missing timestamp are
/// dropped. Only occupied buckets are emitted, in ascending order, with the
/// date column first. `mean`/`sum` keep numeric columns only; `first`/`last`
/// keep every non-date column.
pub(super) fn resample(
    table: &Table,
    date_name: &str,
    millis: &[Option<i64>],
    bucket_ms: i64,
    agg: ResampleAgg,
) -> Result<Table, TableError> {
    let mut buckets: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (row, ts) in millis.iter().enumerate() {
        if let Some(ts) = ts {
            let start = ts.div_euclid(bucket_ms) * bucket_ms;
            buckets.entry(start).or_default().push(row);
        }
    }

    let mut columns = vec![Column::timestamp(
        date_name,
        buckets.keys().map(|&start| Some(start)).collect(),
    )];

    for column in table.columns().iter().filter(|c| c.name != date_name) {
        match agg {
            ResampleAgg::Mean | ResampleAgg::Sum => {
                let Some(cells) = column.as_number() else {
                    continue;
                };
                let out = buckets
                    .values()
                    .map(|rows| {
                        let present: Vec<f64> =
                            rows.iter().filter_map(|&r| cells[r]).collect();
                        if present.is_empty() {
                            None
                        } else if agg == ResampleAgg::Mean {
                            Some(present.iter().sum::<f64>() / present.len() as f64)
                        } else {
                            Some(present.iter().sum())
                        }
                    })
                    .collect();
                columns.push(Column::number(column.name.clone(), out));
            }
            ResampleAgg::First | ResampleAgg::Last => {
                let pick = |rows: &Vec<usize>, present: &dyn Fn(usize) -> bool| {
                    if agg == ResampleAgg::First {
                        rows.iter().copied().find(|&r| present(r))
                    } else {
                        rows.iter().rev().copied().find(|&r| present(r))
                    }
                };
                let values = match &column.values {
                    Values::Number(v) => Values::Number(
                        buckets
                            .values()
                            .map(|rows| pick(rows, &|r| v[r].is_some()).and_then(|r| v[r]))
                            .collect(),
                    ),
                    Values::Text(v) => Values::Text(
                        buckets
                            .values()
                            .map(|rows| {
                                pick(rows, &|r| v[r].is_some()).and_then(|r| v[r].clone())
                            })
                            .collect(),
                    ),
                    Values::Timestamp(v) => Values::Timestamp(
                        buckets
                            .values()
                            .map(|rows| pick(rows, &|r| v[r].is_some()).and_then(|r| v[r]))
                            .collect(),
                    ),
                };
                columns.push(Column {
                    name: column.name.clone(),
                    values,
                });
            }
        }
    }
    Table::from_columns(columns)
}
