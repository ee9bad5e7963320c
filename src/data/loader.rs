use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Channel, DEFAULT_TIME_LABEL, Series};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a DAD series from a file.  Dispatch by extension.
///
/// Supported formats (all wide tables, time in minutes first):
/// * `.tsv` / `.txt` – tab-separated, as written by [`super::export::export_all`]
/// * `.csv`          – comma-separated
/// * `.parquet`      – one numeric column per wavelength
pub fn load_file(path: &Path) -> Result<Series> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let series = match ext.as_str() {
        "tsv" | "txt" => load_delimited(path, b'\t'),
        "csv" => load_delimited(path, b','),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    if series.is_empty() {
        bail!("{} contains no time points", path.display());
    }
    if series.channels.is_empty() {
        bail!("{} contains no wavelength columns", path.display());
    }
    Ok(series)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Layout: header row with column labels, column 0 is time.
/// Empty cells are read as NaN.
fn load_delimited(path: &Path, delimiter: u8) -> Result<Series> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    read_delimited(&mut reader)
}

/// Parse an already opened delimited reader into a [`Series`].
pub fn read_delimited<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Series> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.len() < 2 {
        bail!("expected a time column and at least one wavelength column, got {} columns", headers.len());
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "row {row_no}: {} fields but the header has {}",
                record.len(),
                headers.len()
            );
        }
        for (col_idx, cell) in record.iter().enumerate() {
            let value = parse_cell(cell).with_context(|| {
                format!("row {row_no}, column '{}': '{cell}' is not a number", headers[col_idx])
            })?;
            columns[col_idx].push(value);
        }
    }

    from_columns(headers, columns)
}

fn parse_cell(cell: &str) -> Result<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    Ok(cell.parse::<f64>()?)
}

/// Split parsed columns into the time axis and wavelength channels.
fn from_columns(labels: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Series> {
    let mut labels = labels.into_iter();
    let mut columns = columns.into_iter();

    let time_label = labels
        .next()
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_TIME_LABEL.to_string());
    let time = columns.next().context("missing time column")?;

    if time.iter().any(|t| t.is_nan()) {
        bail!("time column '{time_label}' contains empty or NaN values");
    }
    if time.windows(2).any(|w| w[1] < w[0]) {
        bail!("time column '{time_label}' is not ascending");
    }

    let channels = labels
        .zip(columns)
        .map(|(label, values)| Channel::new(label, values))
        .collect();

    Ok(Series::new(time_label, time, channels)?)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding a wide DAD table.
///
/// Expected schema:
/// - first column: retention time in minutes
/// - every further column: one wavelength (Float64, Float32, Int32 or Int64)
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Series> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let labels: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    if labels.len() < 2 {
        bail!("expected a time column and at least one wavelength column, got {} columns", labels.len());
    }

    let reader = builder.build().context("building parquet reader")?;
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); labels.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, column) in batch.columns().iter().enumerate() {
            let values = extract_f64_column(column)
                .with_context(|| format!("column '{}'", labels[col_idx]))?;
            columns[col_idx].extend(values);
        }
    }

    from_columns(labels, columns)
}

// -- Parquet / Arrow helpers --

/// Extract a numeric column as `f64`; nulls become NaN.
fn extract_f64_column(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    let values = match col.data_type() {
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect()
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect()
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            arr.iter().map(|v| v.map_or(f64::NAN, |i| i as f64)).collect()
        }
        other => bail!("expected a numeric column, got {other:?}"),
    };
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Result<Series> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_reader(text.as_bytes());
        read_delimited(&mut reader)
    }

    #[test]
    fn reads_wide_tsv() {
        let series = read("RT.min\t210\t254\n0.0\t1.5\t2.5\n0.1\t\t3.0\n").unwrap();
        assert_eq!(series.time, vec![0.0, 0.1]);
        assert_eq!(series.channels.len(), 2);
        assert_eq!(series.channels[1].wavelength_nm, Some(254.0));
        assert!(series.channels[0].absorbance[1].is_nan());
    }

    #[test]
    fn rejects_non_numeric_cells() {
        let err = read("RT.min\t254\n0.0\tabc\n").unwrap_err();
        assert!(format!("{err:#}").contains("'abc' is not a number"));
    }

    #[test]
    fn rejects_descending_time() {
        assert!(read("RT.min\t254\n0.2\t1\n0.1\t2\n").is_err());
    }

    #[test]
    fn rejects_time_only_table() {
        assert!(read("RT.min\n0.0\n").is_err());
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let err = load_file(Path::new("run.uv")).unwrap_err();
        assert!(err.to_string().contains(".uv"));
    }
}
