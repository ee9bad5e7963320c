use crate::error::{EngineError, Result};

use super::{Matrix, round_decimals};

/// Whether axis points sit on cell centres or on cell boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisMode {
    /// One point per matrix cell (filled-contour style).
    #[default]
    Centers,
    /// One point per cell boundary (cell-mesh style), `dim + 1` per axis.
    Edges,
}

/// Physical coordinates of a reconstructed matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisGrid {
    /// First-dimension time, minutes.
    pub first_dimension: Vec<f64>,
    /// Second-dimension time, seconds.
    pub second_dimension: Vec<f64>,
    /// `x[[i, j]] == first_dimension[i]`
    pub x: Matrix,
    /// `y[[i, j]] == second_dimension[j]`
    pub y: Matrix,
}

impl AxisGrid {
    /// `(min, max)` of the first-dimension axis.
    pub fn x_extent(&self) -> (f64, f64) {
        extent(&self.first_dimension)
    }

    /// `(min, max)` of the second-dimension axis.
    pub fn y_extent(&self) -> (f64, f64) {
        extent(&self.second_dimension)
    }
}

fn extent(axis: &[f64]) -> (f64, f64) {
    let min = axis.iter().copied().fold(f64::INFINITY, f64::min);
    let max = axis.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min <= max { (min, max) } else { (0.0, 0.0) }
}

/// `num` evenly spaced points from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut points: Vec<f64> = (0..num).map(|i| start + i as f64 * step).collect();
            points[num - 1] = stop;
            points
        }
    }
}

/// Coordinate grids for a `dim_x × dim_y` matrix.
///
/// The first dimension runs from 0 to the run time (last time value rounded
/// to whole minutes); the second dimension is the leading time values
/// converted to seconds.
pub fn axes(time: &[f64], dim_x: usize, dim_y: usize, mode: AxisMode) -> Result<AxisGrid> {
    let (nx, ny) = match mode {
        AxisMode::Centers => (dim_x, dim_y),
        AxisMode::Edges => (dim_x + 1, dim_y + 1),
    };

    let last = *time.last().ok_or_else(|| EngineError::InsufficientData {
        label: "time".into(),
        reason: "empty time column".into(),
    })?;
    if time.len() < ny {
        return Err(EngineError::InsufficientData {
            label: "time".into(),
            reason: format!("{ny} second-dimension points requested, {} time values", time.len()),
        });
    }

    let run_time = round_decimals(last, 0);
    let first_dimension = linspace(0.0, run_time, nx);
    let second_dimension: Vec<f64> = time[..ny].iter().map(|t| t * 60.0).collect();

    let x = Matrix::from_shape_fn((nx, ny), |(i, _)| first_dimension[i]);
    let y = Matrix::from_shape_fn((nx, ny), |(_, j)| second_dimension[j]);

    Ok(AxisGrid {
        first_dimension,
        second_dimension,
        x,
        y,
    })
}
