//! Elementwise and whole-column numeric primitives.
//!
//! These operate on plain `&[Option<f64>]` slices so they stay independent of
//! table bookkeeping; the engine wires them to named columns.

use super::op::{InterpolateMethod, MathOp, NormalizeMethod};

/// Combines columns left to right with `op`, propagating missing cells.
///
/// Callers guarantee at least one operand; all operands share one length.
pub(super) fn combine_values(op: MathOp, operands: &[&[Option<f64>]]) -> Vec<Option<f64>> {
    let mut acc: Vec<Option<f64>> = operands.first().map(|v| v.to_vec()).unwrap_or_default();
    for next in operands.iter().skip(1) {
        for (cell, rhs) in acc.iter_mut().zip(next.iter()) {
            *cell = match (*cell, rhs) {
                (Some(a), Some(b)) => Some(match op {
                    MathOp::Add => a + b,
                    MathOp::Subtract => a - b,
                    MathOp::Multiply => a * b,
                    MathOp::Divide => a / b,
                }),
                _ => None,
            };
        }
    }
    acc
}

/// Rescales a column, or returns `None` when the statistics are degenerate
/// (zero range, zero spread, or no present values).
pub(super) fn normalize_values(
    method: NormalizeMethod,
    cells: &[Option<f64>],
) -> Option<Vec<Option<f64>>> {
    let present: Vec<f64> = cells.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }

    let map = |offset: f64, scale: f64| -> Vec<Option<f64>> {
        cells
            .iter()
            .map(|cell| cell.map(|x| (x - offset) / scale))
            .collect()
    };

    match method {
        NormalizeMethod::MinMax => {
            let min = present.iter().copied().fold(f64::INFINITY, f64::min);
            let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (max > min).then(|| map(min, max - min))
        }
        NormalizeMethod::ZScore => {
            let std = population_std(&present);
            (std > 0.0).then(|| map(mean(&present), std))
        }
        NormalizeMethod::Robust => {
            let mut sorted = present.clone();
            sorted.sort_by(f64::total_cmp);
            let iqr = quantile(&sorted, 0.75) - quantile(&sorted, 0.25);
            (iqr > 0.0).then(|| map(quantile(&sorted, 0.5), iqr))
        }
    }
}

/// `out[i] = value[i] - value[i - periods]`; the first `periods` rows are
/// missing.
pub(super) fn diff_values(cells: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    (0..cells.len())
        .map(|i| {
            let prev = i.checked_sub(periods)?;
            match (cells[i], cells[prev]) {
                (Some(a), Some(b)) => Some(a - b),
                _ => None,
            }
        })
        .collect()
}

/// Percentage change over `periods` rows. A zero base yields a missing value
/// rather than a division error.
pub(super) fn pct_change_values(cells: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    (0..cells.len())
        .map(|i| {
            let prev = i.checked_sub(periods)?;
            match (cells[i], cells[prev]) {
                (Some(a), Some(b)) if b != 0.0 => Some((a - b) / b * 100.0),
                _ => None,
            }
        })
        .collect()
}

/// Fills missing cells from their present neighbours.
///
/// Leading gaps stay missing; trailing gaps take the last present value;
/// interior gaps are filled per `method`.
pub(super) fn interpolate_values(
    method: InterpolateMethod,
    cells: &[Option<f64>],
) -> Vec<Option<f64>> {
    let present: Vec<(usize, f64)> = cells
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| cell.map(|v| (i, v)))
        .collect();
    if present.is_empty() {
        return cells.to_vec();
    }

    let mut out = cells.to_vec();
    for window in present.windows(2) {
        let (lo, lo_v) = window[0];
        let (hi, hi_v) = window[1];
        for i in (lo + 1)..hi {
            out[i] = Some(match method {
                InterpolateMethod::Linear => {
                    lo_v + (hi_v - lo_v) * ((i - lo) as f64) / ((hi - lo) as f64)
                }
                InterpolateMethod::Nearest => {
                    if i - lo <= hi - i { lo_v } else { hi_v }
                }
            });
        }
    }

    // Trailing gap: carry the last present value forward.
    if let Some(&(last, last_v)) = present.last() {
        for cell in out.iter_mut().skip(last + 1) {
            *cell = Some(last_v);
        }
    }

    out
}

/// Arithmetic mean of a non-empty slice.
pub(super) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0) of a non-empty slice.
pub(super) fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Linearly interpolated quantile of an already sorted, non-empty slice.
pub(super) fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_combine_add() {
        let a = dense(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = dense(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        assert_eq!(
            combine_values(MathOp::Add, &[&a, &b]),
            dense(&[11.0, 22.0, 33.0, 44.0, 55.0])
        );
    }

    #[test]
    fn test_combine_subtract_left_to_right() {
        let a = dense(&[10.0, 10.0]);
        let b = dense(&[3.0, 4.0]);
        let c = dense(&[1.0, 2.0]);
        assert_eq!(
            combine_values(MathOp::Subtract, &[&a, &b, &c]),
            dense(&[6.0, 4.0])
        );
    }

    #[test]
    fn test_combine_propagates_missing() {
        let a = vec![Some(1.0), None];
        let b = vec![Some(2.0), Some(3.0)];
        assert_eq!(
            combine_values(MathOp::Multiply, &[&a, &b]),
            vec![Some(2.0), None]
        );
    }

    #[test]
    fn test_normalize_min_max_spans_unit_interval() {
        let cells = dense(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = normalize_values(NormalizeMethod::MinMax, &cells).expect("distinct values");
        assert_eq!(out.first().copied().flatten(), Some(0.0));
        assert_eq!(out.last().copied().flatten(), Some(1.0));
    }

    #[test]
    fn test_normalize_min_max_degenerate_is_none() {
        let cells = dense(&[7.0, 7.0, 7.0]);
        assert!(normalize_values(NormalizeMethod::MinMax, &cells).is_none());
    }

    #[test]
    fn test_normalize_z_score_centers_on_zero() {
        let cells = dense(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = normalize_values(NormalizeMethod::ZScore, &cells).expect("nonzero spread");
        let values: Vec<f64> = out.iter().flatten().copied().collect();
        assert!(mean(&values).abs() < 1e-12);
        // Population std of the input is sqrt(2); the extremes map to ±2/sqrt(2).
        assert!((values[0] + 2.0 / 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_robust_uses_iqr() {
        let cells = dense(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = normalize_values(NormalizeMethod::Robust, &cells).expect("nonzero IQR");
        // median 3, IQR 2: values map to [-1, -0.5, 0, 0.5, 1]
        assert_eq!(out, dense(&[-1.0, -0.5, 0.0, 0.5, 1.0]));
    }

    #[test]
    fn test_diff_first_rows_missing() {
        let cells = dense(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(
            diff_values(&cells, 1),
            vec![None, Some(1.0), Some(1.0), Some(1.0), Some(1.0)]
        );
    }

    #[test]
    fn test_pct_change() {
        let cells = dense(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let out = pct_change_values(&cells, 1);
        assert_eq!(out[0], None);
        assert_eq!(out[1], Some(100.0));
        assert_eq!(out[2], Some(50.0));
        assert!((out[3].expect("present") - 33.333_333_333_333_336).abs() < 1e-9);
        assert_eq!(out[4], Some(25.0));
    }

    #[test]
    fn test_pct_change_zero_base_is_missing() {
        let cells = dense(&[0.0, 5.0]);
        assert_eq!(pct_change_values(&cells, 1), vec![None, None]);
    }

    #[test]
    fn test_interpolate_linear() {
        let cells = vec![Some(1.0), None, Some(3.0), None, Some(5.0)];
        assert_eq!(
            interpolate_values(InterpolateMethod::Linear, &cells),
            dense(&[1.0, 2.0, 3.0, 4.0, 5.0])
        );
    }

    #[test]
    fn test_interpolate_edges() {
        let cells = vec![None, Some(2.0), None, None];
        assert_eq!(
            interpolate_values(InterpolateMethod::Linear, &cells),
            vec![None, Some(2.0), Some(2.0), Some(2.0)]
        );
    }

    #[test]
    fn test_interpolate_nearest_ties_to_earlier() {
        let cells = vec![Some(0.0), None, Some(10.0)];
        assert_eq!(
            interpolate_values(InterpolateMethod::Nearest, &cells),
            dense(&[0.0, 0.0, 10.0])
        );
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.5), 2.5);
        assert_eq!(quantile(&sorted, 0.25), 1.75);
        assert_eq!(quantile(&sorted, 1.0), 4.0);
    }
}
