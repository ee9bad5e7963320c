/// Reconstruction engine: one absorbance channel → 2D LCxLC matrix.
///
/// ```text
///   Series ──► reconstruct ──► shift ──► normalize ──► Reconstruction
///      │                                                   ▲
///      └──────────────► axis ──────────────────────────────┘
/// ```
///
/// `batch` repeats the pipeline for every wavelength of a series.
///
/// All rounding in this module is half-to-even; dimensions use `floor`.

pub mod axis;
pub mod batch;
pub mod normalize;
pub mod params;
pub mod reconstruct;
pub mod shift;

pub use axis::{AxisGrid, AxisMode, axes};
pub use batch::{
    BatchEvent, BatchListener, BatchSummary, CancelToken, NoOpListener, PointAccounting,
    Reconstruction, ReconstructionStream, RenderSink, reconstruct_all, reconstruct_one, run_batch,
};
pub use normalize::{Normalized, normalize, resolve_bounds};
pub use params::{AcquisitionParameters, ColorbarBounds, ColorbarLimits, IntensityScale};
pub use reconstruct::{Dimensions, reconstruct, reconstruct_samples};
pub use shift::{roll_rows, shift, shift_index};

/// A reconstructed intensity matrix: `dim_x` modulation cycles × `dim_y`
/// samples per cycle.
pub type Matrix = ndarray::Array2<f64>;

/// Round to `decimals` places, ties to even.
pub(crate) fn round_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
