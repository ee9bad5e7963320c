use std::borrow::Cow;

use super::params::{ColorbarBounds, ColorbarLimits, IntensityScale};
use super::{Matrix, round_decimals};

/// Result of intensity normalization.
#[derive(Debug, Clone)]
pub struct Normalized<'a> {
    pub matrix: Cow<'a, Matrix>,
    /// Relative scaling met a flat signal and emitted zeros instead.
    pub degenerate: bool,
}

/// Smallest and largest non-NaN value, `None` if there is none.
pub fn value_range(matrix: &Matrix) -> Option<(f64, f64)> {
    let min = matrix.iter().copied().fold(f64::INFINITY, f64::min);
    let max = matrix.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min <= max).then_some((min, max))
}

/// Scale `matrix` for display.
///
/// * `Absolute` – borrowed unchanged.
/// * `Relative` – `(v - min) * 100 / (max - min)` rounded to two decimals.
///   A matrix without dynamic range becomes all zeros and is flagged
///   `degenerate`.
pub fn normalize(matrix: &Matrix, scale: IntensityScale) -> Normalized<'_> {
    match scale {
        IntensityScale::Absolute => Normalized {
            matrix: Cow::Borrowed(matrix),
            degenerate: false,
        },
        IntensityScale::Relative => {
            let Some((min, max)) = value_range(matrix) else {
                return flat(matrix);
            };
            let range = max - min;
            if range == 0.0 || !range.is_finite() {
                return flat(matrix);
            }
            Normalized {
                matrix: Cow::Owned(matrix.mapv(|v| round_decimals((v - min) * 100.0 / range, 2))),
                degenerate: false,
            }
        }
    }
}

fn flat(matrix: &Matrix) -> Normalized<'static> {
    Normalized {
        matrix: Cow::Owned(Matrix::zeros(matrix.raw_dim())),
        degenerate: true,
    }
}

/// Colour-bar bounds: explicit limits are kept verbatim, missing ones come
/// from the (already normalized) matrix.
pub fn resolve_bounds(limits: ColorbarLimits, matrix: &Matrix) -> ColorbarBounds {
    let (data_min, data_max) = value_range(matrix).unwrap_or((0.0, 0.0));
    ColorbarBounds {
        min: limits.min.unwrap_or(data_min),
        max: limits.max.unwrap_or(data_max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn absolute_is_identity() {
        let m = array![[0.5, -1.0], [2.0, 3.0]];
        let out = normalize(&m, IntensityScale::Absolute);
        assert!(matches!(out.matrix, Cow::Borrowed(_)));
        assert!(!out.degenerate);
    }

    #[test]
    fn relative_spans_zero_to_hundred() {
        let m = array![[2.0, 4.0], [3.0, 6.0]];
        let out = normalize(&m, IntensityScale::Relative);
        assert_eq!(*out.matrix, array![[0.0, 50.0], [25.0, 100.0]]);
        assert_eq!(value_range(&out.matrix), Some((0.0, 100.0)));
    }

    #[test]
    fn relative_rounds_to_two_decimals() {
        let m = array![[0.0, 1.0, 3.0]];
        let out = normalize(&m, IntensityScale::Relative);
        assert_eq!(out.matrix[[0, 1]], 33.33);
    }

    #[test]
    fn constant_signal_becomes_zeros() {
        let m = Matrix::from_elem((3, 4), 7.25);
        let out = normalize(&m, IntensityScale::Relative);
        assert!(out.degenerate);
        assert!(out.matrix.iter().all(|&v| v == 0.0));
        assert_eq!(out.matrix.dim(), (3, 4));
    }

    #[test]
    fn tiny_range_still_spans_zero_to_hundred() {
        let m = array![[0.0, 1e-17], [5e-18, 1e-17]];
        let out = normalize(&m, IntensityScale::Relative);
        assert!(!out.degenerate);
        assert_eq!(*out.matrix, array![[0.0, 100.0], [50.0, 100.0]]);
    }

    #[test]
    fn nan_cells_do_not_poison_the_range() {
        let m = array![[f64::NAN, 1.0], [3.0, 5.0]];
        assert_eq!(value_range(&m), Some((1.0, 5.0)));
        let out = normalize(&m, IntensityScale::Relative);
        assert_eq!(out.matrix[[1, 1]], 100.0);
        assert!(out.matrix[[0, 0]].is_nan());
    }

    #[test]
    fn relative_is_idempotent() {
        let m = Matrix::from_shape_fn((5, 9), |(i, j)| ((i * 9 + j) as f64 * 0.731).sin() * 40.0);
        let once = normalize(&m, IntensityScale::Relative).matrix.into_owned();
        let twice = normalize(&once, IntensityScale::Relative).matrix.into_owned();
        for (a, b) in once.iter().zip(twice.iter()) {
            approx::assert_abs_diff_eq!(*a, *b, epsilon = 0.01);
        }
    }

    #[test]
    fn bounds_resolution() {
        let m = array![[0.0, 12.5], [100.0, 40.0]];
        assert_eq!(
            resolve_bounds(ColorbarLimits::default(), &m),
            ColorbarBounds { min: 0.0, max: 100.0 }
        );
        let limits = ColorbarLimits {
            min: Some(10.0),
            max: None,
        };
        assert_eq!(
            resolve_bounds(limits, &m),
            ColorbarBounds { min: 10.0, max: 100.0 }
        );
        assert_eq!(
            resolve_bounds(ColorbarLimits::fixed(-1.0, 1.0), &m),
            ColorbarBounds { min: -1.0, max: 1.0 }
        );
    }
}
