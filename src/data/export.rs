use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::Series;

/// Header of the time column in a per-wavelength export.
pub const TIME_HEADER: &str = "RT";
/// Header of the absorbance column in a per-wavelength export.
pub const DETECTOR_LABEL: &str = "DAD";

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(b'\t').from_writer(writer)
}

/// Write one wavelength as two tab-separated columns `RT`, `DAD`, one row per
/// time sample.
pub fn write_wavelength<W: Write>(writer: W, series: &Series, label: &str) -> Result<()> {
    let channel = series
        .channel(label)
        .with_context(|| format!("no wavelength '{label}' in the loaded data"))?;

    let mut wtr = tsv_writer(writer);
    wtr.write_record([TIME_HEADER, DETECTOR_LABEL])?;
    for (t, a) in series.time.iter().zip(&channel.absorbance) {
        wtr.write_record([t.to_string(), a.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the complete series, header = original column labels.
pub fn write_series<W: Write>(writer: W, series: &Series) -> Result<()> {
    let mut wtr = tsv_writer(writer);
    wtr.write_record(series.column_labels())?;

    let mut row: Vec<String> = Vec::with_capacity(series.channels.len() + 1);
    for (i, t) in series.time.iter().enumerate() {
        row.clear();
        row.push(t.to_string());
        row.extend(series.channels.iter().map(|c| c.absorbance[i].to_string()));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Export a single wavelength to `path`.
pub fn export_wavelength(series: &Series, label: &str, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_wavelength(std::io::BufWriter::new(file), series, label)?;
    log::info!("Exported {label} nm to {}", path.display());
    Ok(())
}

/// Export the full series to `path`.
pub fn export_all(series: &Series, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_series(std::io::BufWriter::new(file), series)?;
    log::info!("Exported {series} to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Channel, Series};

    fn series() -> Series {
        Series::new(
            "RT.min",
            vec![0.0, 0.5, 1.0],
            vec![
                Channel::new("210", vec![1.0, 2.0, 3.0]),
                Channel::new("254", vec![0.25, f64::NAN, -1.5]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn wavelength_export_has_rt_dad_header() {
        let mut buf = Vec::new();
        write_wavelength(&mut buf, &series(), "254").unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["RT\tDAD", "0\t0.25", "0.5\tNaN", "1\t-1.5"]);
    }

    #[test]
    fn wavelength_export_unknown_label() {
        let mut buf = Vec::new();
        assert!(write_wavelength(&mut buf, &series(), "999").is_err());
    }

    #[test]
    fn full_export_keeps_labels() {
        let mut buf = Vec::new();
        write_series(&mut buf, &series()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("RT.min\t210\t254"));
        assert_eq!(lines.next(), Some("0\t1\t0.25"));
        assert_eq!(text.lines().count(), 4);
    }
}
