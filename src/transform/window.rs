//! Rolling-window and exponential-decay statistics.

use super::op::RollingStat;
use super::series;

/// Computes a rolling statistic over `cells`.
///
/// A trailing window at row `i` covers `[i - window + 1, i]`; a centered one
/// covers `window` rows starting at `i - window / 2`, so even windows lean
/// one row to the left. Windows that fall outside the column, or that
/// contain any missing value, produce a missing output. Standard deviation is
/// the sample flavour (ddof = 1) and needs at least two rows.
pub(super) fn rolling(
    cells: &[Option<f64>],
    window: usize,
    stat: RollingStat,
    centered: bool,
) -> Vec<Option<f64>> {
    let n = cells.len();
    (0..n)
        .map(|i| {
            let start = if centered {
                i.checked_sub(window / 2)?
            } else {
                i.checked_sub(window - 1)?
            };
            if start + window > n {
                return None;
            }
            let mut values = Vec::with_capacity(window);
            for cell in &cells[start..start + window] {
                values.push((*cell)?);
            }
            match stat {
                RollingStat::Mean => Some(series::mean(&values)),
                RollingStat::Sum => Some(values.iter().sum()),
                RollingStat::Min => values.iter().copied().reduce(f64::min),
                RollingStat::Max => values.iter().copied().reduce(f64::max),
                RollingStat::Std => sample_std(&values),
                RollingStat::Median => {
                    values.sort_by(f64::total_cmp);
                    Some(series::quantile(&values, 0.5))
                }
            }
        })
        .collect()
}

/// Exponentially weighted mean with `alpha = 2 / (span + 1)` and adjusted
/// weights. Missing cells contribute nothing but the decay still advances
/// across them, so a value's weight depends on row distance, not on how many
/// present values intervene.
pub(super) fn ewm_mean(cells: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;
    let mut num = 0.0;
    let mut den = 0.0;
    cells
        .iter()
        .map(|cell| {
            num *= decay;
            den *= decay;
            if let Some(x) = cell {
                num += x;
                den += 1.0;
            }
            (den > 0.0).then(|| num / den)
        })
        .collect()
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = series::mean(values);
    let var =
        values.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}
