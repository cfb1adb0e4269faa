use std::cmp::Ordering;
use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;

use super::model::{Table, format_cell};

// ---------------------------------------------------------------------------
// Correlation summary of a parameter sweep
// ---------------------------------------------------------------------------

/// Square Pearson correlation matrix over a table's columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `values[i][j]` = corr(column i, column j).
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

impl fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.columns.iter().map(String::len).max().unwrap_or(0);
        let width = self
            .columns
            .iter()
            .map(String::len)
            .chain(std::iter::once(9))
            .max()
            .unwrap_or(9);

        write!(f, "{:label_width$}", "")?;
        for name in &self.columns {
            write!(f, "  {name:>width$}")?;
        }
        writeln!(f)?;
        for (name, row) in self.columns.iter().zip(&self.values) {
            write!(f, "{name:<label_width$}")?;
            for v in row {
                write!(f, "  {:>width$}", format_cell(*v))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The sorted view and correlation matrix of one table.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub sorted: Table,
    pub correlation: CorrelationMatrix,
}

/// Sort rows by `sort_by` ascending and correlate every column pair.
pub fn summarize(table: &Table, sort_by: &str) -> Result<Summary> {
    let sorted = sort_by_column(table, sort_by)?;
    let correlation = correlation_matrix(table);
    Ok(Summary {
        sorted,
        correlation,
    })
}

/// Stable ascending sort on one column; NaN rows go last.
pub fn sort_by_column(table: &Table, column: &str) -> Result<Table> {
    let key = table
        .column(column)
        .with_context(|| format!("no column named '{column}' to sort by"))?;

    let mut order: Vec<usize> = (0..table.n_rows()).collect();
    order.sort_by(|&a, &b| match (key[a].is_nan(), key[b].is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => key[a].total_cmp(&key[b]),
    });
    Ok(table.reordered(&order))
}

/// Pairwise Pearson correlation of all columns.
pub fn correlation_matrix(table: &Table) -> CorrelationMatrix {
    let n = table.n_cols();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&table.data[i], &table.data[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix {
        columns: table.columns.clone(),
        values,
    }
}

/// Pearson's r over rows where both values are present.
///
/// NaN when fewer than two complete rows remain or either side is constant.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }
    (cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(cols: &[(&str, Vec<f64>)]) -> Table {
        Table::new(
            cols.iter().map(|(n, _)| n.to_string()).collect(),
            cols.iter().map(|(_, v)| v.clone()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn linear_columns_correlate_perfectly() {
        let t = table(&[
            ("a", vec![1.0, 2.0, 3.0, 4.0]),
            ("b", vec![2.0, 4.0, 6.0, 8.0]),
            ("c", vec![4.0, 3.0, 2.0, 1.0]),
        ]);
        let m = correlation_matrix(&t);
        assert!((m.get("a", "b").unwrap() - 1.0).abs() < 1e-12);
        assert!((m.get("a", "c").unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(m.get("b", "a"), m.get("a", "b"));
        assert!((m.get("c", "c").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_column_is_nan() {
        let t = table(&[("a", vec![1.0, 2.0, 3.0]), ("dist", vec![35.0, 35.0, 35.0])]);
        let m = correlation_matrix(&t);
        assert!(m.get("a", "dist").unwrap().is_nan());
        assert!(m.get("dist", "dist").unwrap().is_nan());
    }

    #[test]
    fn missing_values_use_complete_pairs() {
        let r = pearson(&[1.0, 2.0, f64::NAN, 3.0], &[1.0, 2.0, 100.0, 3.0]);
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sort_is_ascending_stable_nan_last() {
        let t = table(&[
            ("id", vec![0.0, 1.0, 2.0, 3.0, 4.0]),
            ("ploss", vec![0.5, f64::NAN, 0.1, 0.5, 0.0]),
        ]);
        let s = summarize(&t, "ploss").unwrap();
        assert_eq!(s.sorted.column("id").unwrap(), &[4.0, 2.0, 0.0, 3.0, 1.0]);
    }

    #[test]
    fn unknown_sort_column_fails() {
        let t = table(&[("a", vec![1.0])]);
        let err = summarize(&t, "ploss").unwrap_err();
        assert!(err.to_string().contains("'ploss'"));
    }
}
