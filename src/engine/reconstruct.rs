use crate::data::model::Series;
use crate::error::{EngineError, Result};

use super::params::ensure_positive;
use super::{Matrix, round_decimals};

/// Shape of a reconstructed matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Number of complete modulation cycles (first dimension).
    pub dim_x: usize,
    /// Samples per modulation cycle (second dimension).
    pub dim_y: usize,
}

impl Dimensions {
    /// `dim_x = floor(run_time / modulation_time)` with the run time rounded
    /// to one decimal, `dim_y = floor(modulation_time * samples_per_minute)`.
    pub fn compute(last_time: f64, modulation_time: f64, samples_per_minute: f64) -> Result<Self> {
        ensure_positive("modulation_time", modulation_time)?;
        ensure_positive("samples_per_minute", samples_per_minute)?;

        let run_time = round_decimals(last_time, 1);
        let cycles = (run_time / modulation_time).floor();
        let per_cycle = (modulation_time * samples_per_minute).floor();
        if !cycles.is_finite() || !per_cycle.is_finite() {
            return Err(EngineError::InvalidParameter {
                name: "modulation_time",
                value: modulation_time,
            });
        }

        let dims = Self {
            // Negative run times saturate to zero cycles.
            dim_x: cycles.max(0.0) as usize,
            dim_y: per_cycle as usize,
        };
        // The matrix must be addressable as one f64 buffer.
        let limit = isize::MAX as usize / std::mem::size_of::<f64>();
        match dims.dim_x.checked_mul(dims.dim_y) {
            Some(cells) if cells <= limit => Ok(dims),
            _ => Err(EngineError::InvalidParameter {
                name: "samples_per_minute",
                value: samples_per_minute,
            }),
        }
    }

    /// Samples needed to fill the matrix.
    pub fn required_samples(&self) -> usize {
        self.dim_x.saturating_mul(self.dim_y)
    }
}

/// Fold `samples` into `dim_x` rows of `dim_y`, zero-padding a short tail
/// and dropping samples that do not complete a cycle.
pub fn reconstruct_samples(
    samples: &[f64],
    last_time: f64,
    modulation_time: f64,
    samples_per_minute: f64,
) -> Result<(Matrix, Dimensions)> {
    let dims = Dimensions::compute(last_time, modulation_time, samples_per_minute)?;
    let required = dims.required_samples();

    let mut data: Vec<f64> = samples.iter().copied().take(required).collect();
    if data.len() < required {
        log::debug!(
            "padding {} missing samples with zeros ({} of {required} present)",
            required - data.len(),
            data.len()
        );
        data.resize(required, 0.0);
    }

    let matrix = Matrix::from_shape_vec((dims.dim_x, dims.dim_y), data)
        .map_err(|e| EngineError::Internal(format!("reshape failed: {e}")))?;
    Ok((matrix, dims))
}

/// Reconstruct the matrix of one wavelength of `series`.
pub fn reconstruct(
    series: &Series,
    label: &str,
    modulation_time: f64,
    samples_per_minute: f64,
) -> Result<(Matrix, Dimensions)> {
    let channel = series
        .channel(label)
        .ok_or_else(|| EngineError::UnknownWavelength(label.to_string()))?;

    if channel.is_blank() {
        return Err(EngineError::InsufficientData {
            label: label.to_string(),
            reason: "no finite absorbance values".into(),
        });
    }
    let last_time = series.last_time().ok_or_else(|| EngineError::InsufficientData {
        label: label.to_string(),
        reason: "empty time column".into(),
    })?;

    let (matrix, dims) =
        reconstruct_samples(&channel.absorbance, last_time, modulation_time, samples_per_minute)?;
    if dims.required_samples() == 0 {
        return Err(EngineError::InsufficientData {
            label: label.to_string(),
            reason: format!(
                "run time {last_time} min holds no complete {modulation_time} min modulation cycle"
            ),
        });
    }
    Ok((matrix, dims))
}
