use std::borrow::Cow;

use crate::error::{EngineError, Result};

use super::Matrix;
use super::params::ensure_positive;

/// Number of samples a shift of `shift_seconds` corresponds to at
/// `sample_rate_hz`, rounded half-to-even.
pub fn shift_index(shift_seconds: f64, sample_rate_hz: f64) -> i64 {
    (sample_rate_hz * shift_seconds).round_ties_even() as i64
}

/// Realign the second dimension by rotating every row by the sample count
/// matching `shift_seconds`. A zero shift borrows the input unchanged.
pub fn shift(matrix: &Matrix, shift_seconds: f64, sample_rate_hz: f64) -> Result<Cow<'_, Matrix>> {
    ensure_positive("sample_rate", sample_rate_hz)?;
    if shift_seconds == 0.0 {
        return Ok(Cow::Borrowed(matrix));
    }
    if !shift_seconds.is_finite() {
        return Err(EngineError::InvalidParameter {
            name: "shift_time",
            value: shift_seconds,
        });
    }
    Ok(roll_rows(matrix, shift_index(shift_seconds, sample_rate_hz)))
}

/// Rotate each row independently by `index` positions; positive values move
/// samples towards higher column indices and wrap the overflow to the start.
pub fn roll_rows(matrix: &Matrix, index: i64) -> Cow<'_, Matrix> {
    let dim_y = matrix.ncols();
    if dim_y == 0 {
        return Cow::Borrowed(matrix);
    }
    let k = index.rem_euclid(dim_y as i64) as usize;
    if k == 0 {
        return Cow::Borrowed(matrix);
    }

    let mut out = Matrix::zeros(matrix.raw_dim());
    for (src, mut dst) in matrix.rows().into_iter().zip(out.rows_mut()) {
        for (j, &v) in src.iter().enumerate() {
            dst[(j + k) % dim_y] = v;
        }
    }
    Cow::Owned(out)
}
