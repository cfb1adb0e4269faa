use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{EntitySeries, PairSeries, Sample, ScalarSeries, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// How column names are obtained for a table.
#[derive(Debug, Clone)]
pub enum Header {
    /// First row holds the column names.
    Present,
    /// Every row is data; use these names in order.
    Names(Vec<String>),
}

/// Load a numeric table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat numeric columns
/// * anything else – delimited text (comma separated, as written by the simulator)
pub fn load_table(path: &Path, header: &Header) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, header),
        _ => load_csv(path, header),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::debug!(
        "Loaded {} rows x {:?} from {}",
        table.n_rows(),
        table.columns,
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Reshapers: Table → domain series
// ---------------------------------------------------------------------------

/// Load the position trajectory of entity `id` (`x`, `y`, optional `z` columns).
pub fn load_entity(path: &Path, id: usize) -> Result<EntitySeries> {
    let table = load_table(path, &Header::Present)?;
    let x = required(&table, path, "x")?;
    let y = required(&table, path, "y")?;
    let z = table.column("z");

    let samples = (0..table.n_rows())
        .map(|row| Sample {
            x: x[row],
            y: y[row],
            z: z.map(|z| z[row]),
        })
        .collect();
    Ok(EntitySeries::new(id, samples))
}

/// Load the `(time, value_column)` series measured between entities `u` and `v`.
pub fn load_pair(path: &Path, u: usize, v: usize, value_column: &str) -> Result<PairSeries> {
    let table = load_table(path, &Header::Present)?;
    Ok(PairSeries {
        pair: (u, v),
        points: time_points(&table, path, value_column)?,
    })
}

/// Load a `(time, value_column)` series with an optional legend label.
pub fn load_scalar(path: &Path, value_column: &str, label: Option<String>) -> Result<ScalarSeries> {
    let table = load_table(path, &Header::Present)?;
    Ok(ScalarSeries {
        label,
        points: time_points(&table, path, value_column)?,
    })
}

fn time_points(table: &Table, path: &Path, value_column: &str) -> Result<Vec<(f64, f64)>> {
    let time = required(table, path, "time")?;
    let value = required(table, path, value_column)?;
    Ok(time.iter().copied().zip(value.iter().copied()).collect())
}

fn required<'a>(table: &'a Table, path: &Path, column: &str) -> Result<&'a [f64]> {
    table
        .column(column)
        .with_context(|| format!("{}: missing required column '{column}'", path.display()))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: optional header row, then one numeric value per cell.
/// Empty cells load as NaN.
fn load_csv(path: &Path, header: &Header) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(matches!(header, Header::Present))
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    let columns: Vec<String> = match header {
        Header::Present => reader
            .headers()
            .context("reading CSV headers")?
            .iter()
            .map(|h| h.to_string())
            .collect(),
        Header::Names(names) => names.clone(),
    };

    let mut data: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != columns.len() {
            bail!(
                "CSV row {row_no}: {} fields, expected {}",
                record.len(),
                columns.len()
            );
        }
        for (col_idx, cell) in record.iter().enumerate() {
            data[col_idx].push(parse_cell(cell, row_no, &columns[col_idx])?);
        }
    }

    Table::new(columns, data)
}

fn parse_cell(s: &str, row: usize, col: &str) -> Result<f64> {
    if s.is_empty() {
        return Ok(f64::NAN);
    }
    s.parse::<f64>()
        .with_context(|| format!("Row {row}, column '{col}': '{s}' is not a number"))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat numeric columns.
///
/// Float64, Float32, Int64 and Int32 columns are widened to `f64`; nulls load
/// as NaN. With [`Header::Names`] the schema's names are replaced positionally.
fn load_parquet(path: &Path, header: &Header) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let schema_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let columns = match header {
        Header::Present => schema_names,
        Header::Names(names) => {
            if names.len() != schema_names.len() {
                bail!(
                    "{} column names given but parquet file has {} columns",
                    names.len(),
                    schema_names.len()
                );
            }
            names.clone()
        }
    };

    let mut data: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, values) in data.iter_mut().enumerate() {
            extend_f64(values, batch.column(col_idx))
                .with_context(|| format!("column '{}'", columns[col_idx]))?;
        }
    }

    Table::new(columns, data)
}

// -- Parquet / Arrow helpers --

/// Append a numeric Arrow column to `out` as `f64`.
fn extend_f64(out: &mut Vec<f64>, col: &Arc<dyn Array>) -> Result<()> {
    match col.data_type() {
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            out.extend(arr.iter().map(|v| v.unwrap_or(f64::NAN)));
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            out.extend(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)));
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            out.extend(arr.iter().map(|v| v.map_or(f64::NAN, |i| i as f64)));
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            out.extend(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)));
        }
        other => bail!("Expected a numeric column, got {other:?}"),
    }
    Ok(())
}
