//! Columnwise evaluation of parsed expressions.

use super::{BinaryOp, Expr, ExprError, UnaryOp};
use crate::table::{Table, Values};

/// The result of evaluating an expression: one value per table row.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    /// Numeric result (arithmetic expressions).
    Number(Vec<Option<f64>>),
    /// Boolean result (comparisons and logic).
    Bool(Vec<Option<bool>>),
    /// Text result (string literals and text columns).
    Text(Vec<Option<String>>),
}

impl Series {
    /// Number of rows covered.
    pub fn len(&self) -> usize {
        match self {
            Self::Number(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    /// True if no rows are covered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts a boolean result into a row mask; missing entries drop the row.
    pub fn into_mask(self) -> Result<Vec<bool>, ExprError> {
        match self {
            Self::Bool(v) => Ok(v.into_iter().map(|b| b.unwrap_or(false)).collect()),
            Self::Number(_) => Err(ExprError::Type(
                "filter expression must be boolean, got numbers".into(),
            )),
            Self::Text(_) => Err(ExprError::Type(
                "filter expression must be boolean, got text".into(),
            )),
        }
    }
}

/// Evaluates an expression against a table, producing one value per row.
///
/// Literals broadcast to the table's row count. Missing operands make an
/// arithmetic result missing and a comparison false. Timestamp columns take
/// part as their epoch-millisecond values.
pub fn evaluate(expr: &Expr, table: &Table) -> Result<Series, ExprError> {
    let n = table.n_rows();
    match expr {
        Expr::Number(v) => Ok(Series::Number(vec![Some(*v); n])),
        Expr::Str(s) => Ok(Series::Text(vec![Some(s.clone()); n])),
        Expr::Column(name) => {
            let col = table
                .column(name)
                .ok_or_else(|| ExprError::UnknownColumn(name.clone()))?;
            Ok(match &col.values {
                Values::Number(v) => Series::Number(v.clone()),
                Values::Text(v) => Series::Text(v.clone()),
                Values::Timestamp(v) => {
                    Series::Number(v.iter().map(|t| t.map(|ms| ms as f64)).collect())
                }
            })
        }
        Expr::Unary { op, operand } => {
            let inner = evaluate(operand, table)?;
            apply_unary(*op, inner)
        }
        Expr::Binary { op, lhs, rhs } => {
            let left = evaluate(lhs, table)?;
            let right = evaluate(rhs, table)?;
            apply_binary(*op, left, right)
        }
    }
}

fn apply_unary(op: UnaryOp, operand: Series) -> Result<Series, ExprError> {
    match (op, operand) {
        (UnaryOp::Neg, Series::Number(v)) => Ok(Series::Number(
            v.into_iter().map(|x| x.map(|x| -x)).collect(),
        )),
        (UnaryOp::Not, Series::Bool(v)) => Ok(Series::Bool(
            v.into_iter().map(|b| Some(!b.unwrap_or(false))).collect(),
        )),
        (UnaryOp::Neg, other) => Err(ExprError::Type(format!(
            "cannot negate {} values",
            series_kind(&other)
        ))),
        (UnaryOp::Not, other) => Err(ExprError::Type(format!(
            "'not' needs a boolean operand, got {}",
            series_kind(&other)
        ))),
    }
}

fn apply_binary(op: BinaryOp, lhs: Series, rhs: Series) -> Result<Series, ExprError> {
    match op {
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::Mod
        | BinaryOp::Pow => {
            let (a, b) = numeric_pair(op, lhs, rhs)?;
            let cells = a
                .into_iter()
                .zip(b)
                .map(|(x, y)| match (x, y) {
                    (Some(x), Some(y)) => Some(arith(op, x, y)),
                    _ => None,
                })
                .collect();
            Ok(Series::Number(cells))
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let (a, b) = numeric_pair(op, lhs, rhs)?;
            let cells = a
                .into_iter()
                .zip(b)
                .map(|(x, y)| match (x, y) {
                    (Some(x), Some(y)) => Some(compare(op, x, y)),
                    // Pandas-style: comparisons against missing are false.
                    _ => Some(false),
                })
                .collect();
            Ok(Series::Bool(cells))
        }
        BinaryOp::Eq | BinaryOp::Ne => equality(op, lhs, rhs),
        BinaryOp::And | BinaryOp::Or => {
            let (a, b) = match (lhs, rhs) {
                (Series::Bool(a), Series::Bool(b)) => (a, b),
                (l, r) => {
                    return Err(ExprError::Type(format!(
                        "logical operator needs boolean operands, got {} and {}",
                        series_kind(&l),
                        series_kind(&r)
                    )));
                }
            };
            let cells = a
                .into_iter()
                .zip(b)
                .map(|(x, y)| {
                    let (x, y) = (x.unwrap_or(false), y.unwrap_or(false));
                    Some(if op == BinaryOp::And { x && y } else { x || y })
                })
                .collect();
            Ok(Series::Bool(cells))
        }
    }
}

fn equality(op: BinaryOp, lhs: Series, rhs: Series) -> Result<Series, ExprError> {
    let negate = op == BinaryOp::Ne;
    match (lhs, rhs) {
        (Series::Number(a), Series::Number(b)) => Ok(Series::Bool(
            a.into_iter()
                .zip(b)
                .map(|(x, y)| match (x, y) {
                    (Some(x), Some(y)) => Some((x == y) != negate),
                    _ => Some(negate),
                })
                .collect(),
        )),
        (Series::Text(a), Series::Text(b)) => Ok(Series::Bool(
            a.into_iter()
                .zip(b)
                .map(|(x, y)| match (x, y) {
                    (Some(x), Some(y)) => Some((x == y) != negate),
                    _ => Some(negate),
                })
                .collect(),
        )),
        (l, r) => Err(ExprError::Type(format!(
            "cannot compare {} with {}",
            series_kind(&l),
            series_kind(&r)
        ))),
    }
}

type NumberCells = Vec<Option<f64>>;

fn numeric_pair(
    op: BinaryOp,
    lhs: Series,
    rhs: Series,
) -> Result<(NumberCells, NumberCells), ExprError> {
    match (lhs, rhs) {
        (Series::Number(a), Series::Number(b)) => Ok((a, b)),
        (l, r) => Err(ExprError::Type(format!(
            "{op:?} needs numeric operands, got {} and {}",
            series_kind(&l),
            series_kind(&r)
        ))),
    }
}

fn arith(op: BinaryOp, x: f64, y: f64) -> f64 {
    match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div => x / y,
        BinaryOp::Mod => x % y,
        BinaryOp::Pow => x.powf(y),
        _ => unreachable!("non-arithmetic operator"),
    }
}

fn compare(op: BinaryOp, x: f64, y: f64) -> bool {
    match op {
        BinaryOp::Lt => x < y,
        BinaryOp::Le => x <= y,
        BinaryOp::Gt => x > y,
        BinaryOp::Ge => x >= y,
        _ => unreachable!("non-ordering operator"),
    }
}

fn series_kind(series: &Series) -> &'static str {
    match series {
        Series::Number(_) => "number",
        Series::Bool(_) => "boolean",
        Series::Text(_) => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse;
    use crate::table::Column;

    fn sample() -> Table {
        Table::from_columns(vec![
            Column::number_dense("A", [1.0, 2.0, 3.0, 4.0, 5.0]),
            Column::number_dense("B", [10.0, 20.0, 30.0, 40.0, 50.0]),
            Column::text(
                "tag",
                vec![
                    Some("x".to_owned()),
                    Some("y".to_owned()),
                    Some("x".to_owned()),
                    None,
                    Some("y".to_owned()),
                ],
            ),
        ])
        .expect("uniform columns")
    }

    fn eval(text: &str) -> Series {
        let expr = parse(text).expect("valid expression");
        evaluate(&expr, &sample()).expect("evaluates")
    }

    #[test]
    fn test_arithmetic_over_columns() {
        assert_eq!(
            eval("A * 2 + B"),
            Series::Number(vec![
                Some(12.0),
                Some(24.0),
                Some(36.0),
                Some(48.0),
                Some(60.0)
            ])
        );
    }

    #[test]
    fn test_comparison_mask() {
        let mask = eval("A > 2").into_mask().expect("boolean result");
        assert_eq!(mask, vec![false, false, true, true, true]);
    }

    #[test]
    fn test_text_equality() {
        let mask = eval("tag == 'x'").into_mask().expect("boolean result");
        assert_eq!(mask, vec![true, false, true, false, false]);
    }

    #[test]
    fn test_missing_text_is_not_equal() {
        let mask = eval("tag != 'x'").into_mask().expect("boolean result");
        // Row 3 has a missing tag: != reports true there, matching == being false.
        assert_eq!(mask, vec![false, true, false, true, true]);
    }

    #[test]
    fn test_logic_and_not() {
        let mask = eval("A > 1 and not (B >= 40)")
            .into_mask()
            .expect("boolean result");
        assert_eq!(mask, vec![false, true, true, false, false]);
    }

    #[test]
    fn test_power_and_modulo() {
        assert_eq!(
            eval("A ** 2 % 3"),
            Series::Number(vec![
                Some(1.0),
                Some(1.0),
                Some(0.0),
                Some(1.0),
                Some(1.0)
            ])
        );
    }

    #[test]
    fn test_missing_operand_propagates() {
        let table = Table::from_columns(vec![Column::number(
            "A",
            vec![Some(1.0), None, Some(3.0)],
        )])
        .expect("uniform columns");
        let expr = parse("A + 1").expect("valid expression");
        assert_eq!(
            evaluate(&expr, &table).expect("evaluates"),
            Series::Number(vec![Some(2.0), None, Some(4.0)])
        );
    }

    #[test]
    fn test_unknown_column_errors() {
        let expr = parse("missing + 1").expect("valid expression");
        assert_eq!(
            evaluate(&expr, &sample()),
            Err(ExprError::UnknownColumn("missing".to_owned()))
        );
    }

    #[test]
    fn test_type_mismatch_errors() {
        let expr = parse("tag + 1").expect("valid expression");
        assert!(matches!(
            evaluate(&expr, &sample()),
            Err(ExprError::Type(_))
        ));
    }
}
