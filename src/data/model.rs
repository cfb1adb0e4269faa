use std::fmt;

use serde::Serialize;

use crate::error::{RenderError, RenderResult};

// ---------------------------------------------------------------------------
// Sample – one position of one entity at one time step
// ---------------------------------------------------------------------------

/// A single spatial sample. `z` is absent for 2D-only series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Sample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Sample { x, y, z: Some(z) }
    }

    pub fn planar(x: f64, y: f64) -> Self {
        Sample { x, y, z: None }
    }
}

// ---------------------------------------------------------------------------
// EntitySeries – the full trajectory of one node
// ---------------------------------------------------------------------------

/// Time-ordered samples of a single entity, indexed by time step.
#[derive(Debug, Clone)]
pub struct EntitySeries {
    pub id: usize,
    pub samples: Vec<Sample>,
}

impl EntitySeries {
    pub fn new(id: usize, samples: Vec<Sample>) -> Self {
        EntitySeries { id, samples }
    }

    /// The sample at time step `t`, or `OutOfRange` past the end.
    pub fn sample(&self, t: usize) -> RenderResult<&Sample> {
        self.samples.get(t).ok_or(RenderError::OutOfRange {
            entity: self.id,
            index: t,
            available: self.samples.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Scalar series – (time, value) lines for the static charts
// ---------------------------------------------------------------------------

/// A named pair of entities plus the scalar measured between them over time.
#[derive(Debug, Clone)]
pub struct PairSeries {
    pub pair: (usize, usize),
    pub points: Vec<(f64, f64)>,
}

impl PairSeries {
    /// Legend label, e.g. `"2-7"`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.pair.0, self.pair.1)
    }
}

/// An optionally labelled `(time, value)` line.
#[derive(Debug, Clone)]
pub struct ScalarSeries {
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
}

impl From<&PairSeries> for ScalarSeries {
    fn from(pair: &PairSeries) -> Self {
        ScalarSeries {
            label: Some(pair.label()),
            points: pair.points.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the column-major result of every file load
// ---------------------------------------------------------------------------

/// Named numeric columns of equal length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    /// Column-major values: `data[col][row]`.
    pub data: Vec<Vec<f64>>,
}

impl Table {
    /// Build a table; every column must hold the same number of rows.
    pub fn new(columns: Vec<String>, data: Vec<Vec<f64>>) -> anyhow::Result<Self> {
        if columns.len() != data.len() {
            anyhow::bail!(
                "{} column names given for {} columns",
                columns.len(),
                data.len()
            );
        }
        if let Some(first) = data.first() {
            for (name, col) in columns.iter().zip(&data) {
                if col.len() != first.len() {
                    anyhow::bail!(
                        "column '{name}' has {} rows, expected {}",
                        col.len(),
                        first.len()
                    );
                }
            }
        }
        Ok(Table { columns, data })
    }

    pub fn n_rows(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.index_of(name).map(|i| self.data[i].as_slice())
    }

    /// Rows reordered by `order` (a permutation of row indices).
    pub fn reordered(&self, order: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            data: self
                .data
                .iter()
                .map(|col| order.iter().map(|&r| col[r]).collect())
                .collect(),
        }
    }
}

/// Pandas-like text rendering: a row index followed by right-aligned columns.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index_width = self.n_rows().saturating_sub(1).to_string().len();
        let cells: Vec<Vec<String>> = self
            .data
            .iter()
            .map(|col| col.iter().map(|v| format_cell(*v)).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&cells)
            .map(|(name, col)| {
                col.iter()
                    .map(String::len)
                    .chain(std::iter::once(name.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:index_width$}", "")?;
        for (name, w) in self.columns.iter().zip(widths.iter().copied()) {
            write!(f, "  {name:>w$}")?;
        }
        writeln!(f)?;
        for row in 0..self.n_rows() {
            write!(f, "{row:>index_width$}")?;
            for (col, w) in cells.iter().zip(widths.iter().copied()) {
                write!(f, "  {:>w$}", col[row])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub(crate) fn format_cell(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.6}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_past_end_is_out_of_range() {
        let e = EntitySeries::new(3, vec![Sample::new(0.0, 0.0, 0.0); 2]);
        assert!(e.sample(1).is_ok());
        match e.sample(2) {
            Err(RenderError::OutOfRange {
                entity,
                index,
                available,
            }) => {
                assert_eq!((entity, index, available), (3, 2, 2));
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn table_rejects_ragged_columns() {
        let err = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 2.0], vec![1.0]],
        )
        .unwrap_err();
        assert!(err.to_string().contains("column 'b'"));
    }

    #[test]
    fn pair_label_joins_ids() {
        let p = PairSeries {
            pair: (2, 7),
            points: vec![],
        };
        assert_eq!(p.label(), "2-7");
        assert_eq!(ScalarSeries::from(&p).label.as_deref(), Some("2-7"));
    }
}
