//! Typed operation catalog.
//!
//! [`Op::from_step`] turns a loose [`TransformStep`] record into a closed,
//! exhaustively matched enum. An unrecognized `transform_type` is the one
//! fatal condition in the pipeline ([`TransformError::UnknownKind`]); inside
//! a recognized step, missing or malformed parameters fall back to that
//! operation's defaults.

use super::step::TransformStep;
use std::fmt;

/// Fatal pipeline errors.
///
/// Everything else the pipeline can run into (missing columns, bad queries,
/// degenerate statistics) degrades to a warning; an unknown step kind means
/// the step list is corrupted or foreign, and aborts the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// `transform_type` is not in the recognized catalog.
    UnknownKind {
        /// The unrecognized value.
        kind: String,
    },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind { kind } => write!(f, "unknown transform type '{kind}'"),
        }
    }
}

impl std::error::Error for TransformError {}

/// Elementwise combination for `column_math`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MathOp {
    /// Sum the columns.
    #[default]
    Add,
    /// First column minus the rest.
    Subtract,
    /// Product of the columns.
    Multiply,
    /// First column divided by the rest.
    Divide,
}

impl MathOp {
    fn parse(s: Option<&str>) -> Self {
        match s {
            Some("subtract") => Self::Subtract,
            Some("multiply") => Self::Multiply,
            Some("divide") => Self::Divide,
            _ => Self::Add,
        }
    }
}

/// Rescaling method for `normalize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizeMethod {
    /// `(x - min) / (max - min)`.
    #[default]
    MinMax,
    /// `(x - mean) / population_std`.
    ZScore,
    /// `(x - median) / IQR`.
    Robust,
}

impl NormalizeMethod {
    fn parse(s: Option<&str>) -> Self {
        match s {
            Some("z-score") => Self::ZScore,
            Some("robust") => Self::Robust,
            _ => Self::MinMax,
        }
    }
}

/// Smoothing method for `smooth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothMethod {
    /// Centered rolling mean.
    #[default]
    RollingMean,
    /// Centered rolling median.
    RollingMedian,
    /// Exponentially weighted mean with span = `window`.
    Ewm,
}

impl SmoothMethod {
    fn parse(s: Option<&str>) -> Self {
        match s {
            Some("rolling_median") => Self::RollingMedian,
            Some("ewm") => Self::Ewm,
            _ => Self::RollingMean,
        }
    }
}

/// Bucket aggregation for `resample`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleAgg {
    /// Mean of present values.
    #[default]
    Mean,
    /// Sum of present values.
    Sum,
    /// First present value.
    First,
    /// Last present value.
    Last,
}

impl ResampleAgg {
    fn parse(s: Option<&str>) -> Self {
        match s {
            Some("sum") => Self::Sum,
            Some("first") => Self::First,
            Some("last") => Self::Last,
            _ => Self::Mean,
        }
    }
}

/// Interpolation method for `interpolate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolateMethod {
    /// Straight line between the nearest present neighbours.
    #[default]
    Linear,
    /// Copy the closer present neighbour (ties take the earlier row).
    Nearest,
}

impl InterpolateMethod {
    fn parse(s: Option<&str>) -> Self {
        match s {
            Some("nearest") => Self::Nearest,
            _ => Self::Linear,
        }
    }
}

/// Group aggregation for `group`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupAgg {
    /// Mean of present values.
    #[default]
    Mean,
    /// Sum of present values.
    Sum,
    /// Count of present values.
    Count,
    /// Minimum present value.
    Min,
    /// Maximum present value.
    Max,
}

impl GroupAgg {
    fn parse(s: Option<&str>) -> Self {
        match s {
            Some("sum") => Self::Sum,
            Some("count") => Self::Count,
            Some("min") => Self::Min,
            Some("max") => Self::Max,
            _ => Self::Mean,
        }
    }
}

/// Statistic for trailing `rolling` windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollingStat {
    /// Window mean.
    #[default]
    Mean,
    /// Window median.
    Median,
    /// Window sum.
    Sum,
    /// Sample standard deviation (ddof = 1).
    Std,
    /// Window minimum.
    Min,
    /// Window maximum.
    Max,
}

impl RollingStat {
    fn parse(s: Option<&str>) -> Self {
        match s {
            Some("median") => Self::Median,
            Some("sum") => Self::Sum,
            Some("std") => Self::Std,
            Some("min") => Self::Min,
            Some("max") => Self::Max,
            _ => Self::Mean,
        }
    }
}

/// A fully resolved pipeline operation.
///
/// The engine matches this exhaustively, so extending the catalog is a
/// compile-time-checked change rather than a runtime dictionary miss.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Combine named columns elementwise into a new column.
    ColumnMath {
        /// How to combine.
        operation: MathOp,
        /// Columns combined left to right.
        columns: Vec<String>,
        /// Name of the resulting column.
        new_column: String,
    },
    /// Rescale columns in place.
    Normalize {
        /// Rescaling method.
        method: NormalizeMethod,
        /// Target columns.
        columns: Vec<String>,
    },
    /// Smooth columns with a centered window or exponential weighting.
    Smooth {
        /// Smoothing method.
        method: SmoothMethod,
        /// Window size (span for `ewm`).
        window: usize,
        /// Target columns.
        columns: Vec<String>,
    },
    /// Re-bucket rows into fixed-width time intervals.
    Resample {
        /// Frequency string, e.g. `"d"`, `"15min"`.
        freq: String,
        /// How other columns are aggregated per bucket.
        agg: ResampleAgg,
        /// The temporal column defining each row's bucket.
        date_column: Option<String>,
    },
    /// Fill missing numeric values from their neighbours.
    Interpolate {
        /// Interpolation method.
        method: InterpolateMethod,
        /// Target columns.
        columns: Vec<String>,
    },
    /// Keep rows matching a boolean expression.
    Filter {
        /// Expression over column names; empty means no-op.
        query: String,
    },
    /// Group rows and aggregate numeric columns.
    Group {
        /// Key columns (nonexistent names are dropped at run time).
        group_by: Vec<String>,
        /// Aggregation applied to remaining numeric columns.
        agg_func: GroupAgg,
    },
    /// Evaluate an arithmetic expression into a new column.
    ComputedSeries {
        /// Expression over column names; empty means no-op.
        expression: String,
        /// Name of the resulting column.
        new_column: String,
    },
    /// Trailing rolling-window statistic, in place.
    Rolling {
        /// Window size.
        window: usize,
        /// Statistic over the window.
        operation: RollingStat,
        /// Target columns.
        columns: Vec<String>,
    },
    /// `value[i] - value[i - periods]`, in place.
    Diff {
        /// Row offset.
        periods: usize,
        /// Target columns.
        columns: Vec<String>,
    },
    /// Percentage change over `periods` rows, in place.
    PctChange {
        /// Row offset.
        periods: usize,
        /// Target columns.
        columns: Vec<String>,
    },
}

impl Op {
    /// Resolves a step record into a typed operation.
    ///
    /// # Errors
    ///
    /// [`TransformError::UnknownKind`] when `transform_type` is not in the
    /// catalog. Parameter problems never error here; they fall back to the
    /// operation's defaults.
    pub fn from_step(step: &TransformStep) -> Result<Self, TransformError> {
        let op = match step.transform_type.as_str() {
            "column_math" => Self::ColumnMath {
                operation: MathOp::parse(step.param_str("operation")),
                columns: step.param_str_list("columns"),
                new_column: step
                    .param_str("new_column")
                    .unwrap_or("result")
                    .to_owned(),
            },
            "normalize" => Self::Normalize {
                method: NormalizeMethod::parse(step.param_str("method")),
                columns: step.param_str_list("columns"),
            },
            "smooth" => Self::Smooth {
                method: SmoothMethod::parse(step.param_str("method")),
                window: step.param_usize("window").unwrap_or(3).max(1),
                columns: step.param_str_list("columns"),
            },
            "resample" => Self::Resample {
                freq: step.param_str("freq").unwrap_or("d").to_owned(),
                agg: ResampleAgg::parse(step.param_str("agg")),
                date_column: step.param_str("date_column").map(str::to_owned),
            },
            "interpolate" => Self::Interpolate {
                method: InterpolateMethod::parse(step.param_str("method")),
                columns: step.param_str_list("columns"),
            },
            "filter" => Self::Filter {
                query: step.param_str("query").unwrap_or_default().to_owned(),
            },
            "group" => Self::Group {
                group_by: step.param_str_list("group_by"),
                agg_func: GroupAgg::parse(step.param_str("agg_func")),
            },
            "computed_series" => Self::ComputedSeries {
                expression: step.param_str("expression").unwrap_or_default().to_owned(),
                new_column: step
                    .param_str("new_column")
                    .unwrap_or("computed")
                    .to_owned(),
            },
            "rolling" => Self::Rolling {
                window: step.param_usize("window").unwrap_or(3).max(1),
                operation: RollingStat::parse(step.param_str("operation")),
                columns: step.param_str_list("columns"),
            },
            "diff" => Self::Diff {
                periods: step.param_usize("periods").unwrap_or(1),
                columns: step.param_str_list("columns"),
            },
            "pct_change" => Self::PctChange {
                periods: step.param_usize("periods").unwrap_or(1),
                columns: step.param_str_list("columns"),
            },
            other => {
                return Err(TransformError::UnknownKind {
                    kind: other.to_owned(),
                });
            }
        };
        Ok(op)
    }

    /// The catalog name of this operation, as used in `transform_type`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::ColumnMath { .. } => "column_math",
            Self::Normalize { .. } => "normalize",
            Self::Smooth { .. } => "smooth",
            Self::Resample { .. } => "resample",
            Self::Interpolate { .. } => "interpolate",
            Self::Filter { .. } => "filter",
            Self::Group { .. } => "group",
            Self::ComputedSeries { .. } => "computed_series",
            Self::Rolling { .. } => "rolling",
            Self::Diff { .. } => "diff",
            Self::PctChange { .. } => "pct_change",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kind_is_fatal() {
        let step = TransformStep::new("transpose");
        assert_eq!(
            Op::from_step(&step),
            Err(TransformError::UnknownKind {
                kind: "transpose".to_owned()
            })
        );
    }

    #[test]
    fn test_defaults_fill_missing_params() {
        let step = TransformStep::new("column_math");
        assert_eq!(
            Op::from_step(&step).expect("recognized kind"),
            Op::ColumnMath {
                operation: MathOp::Add,
                columns: vec![],
                new_column: "result".to_owned(),
            }
        );
    }

    #[test]
    fn test_unrecognized_method_falls_back_to_default() {
        let step = TransformStep::new("normalize").with_param("method", "quantile-rank");
        assert_eq!(
            Op::from_step(&step).expect("recognized kind"),
            Op::Normalize {
                method: NormalizeMethod::MinMax,
                columns: vec![],
            }
        );
    }

    #[test]
    fn test_window_is_clamped_to_one() {
        let step = TransformStep::new("rolling").with_param("window", 0);
        match Op::from_step(&step).expect("recognized kind") {
            Op::Rolling { window, .. } => assert_eq!(window, 1),
            other => panic!("expected rolling, got {other:?}"),
        }
    }

    #[test]
    fn test_full_parameter_parse() {
        let step = TransformStep::new("smooth")
            .with_param("method", "ewm")
            .with_param("window", 7)
            .with_param("columns", vec!["A".to_owned(), "B".to_owned()]);
        assert_eq!(
            Op::from_step(&step).expect("recognized kind"),
            Op::Smooth {
                method: SmoothMethod::Ewm,
                window: 7,
                columns: vec!["A".to_owned(), "B".to_owned()],
            }
        );
    }

    #[test]
    fn test_kind_name_round_trips() {
        for kind in [
            "column_math",
            "normalize",
            "smooth",
            "resample",
            "interpolate",
            "filter",
            "group",
            "computed_series",
            "rolling",
            "diff",
            "pct_change",
        ] {
            let op = Op::from_step(&TransformStep::new(kind)).expect("catalog kind");
            assert_eq!(op.kind_name(), kind);
        }
    }
}
