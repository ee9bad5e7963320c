//! LCxLC diode-array data: fold a one-dimensional absorbance trace into a
//! two-dimensional first-dimension × second-dimension image.
//!
//! ```text
//!  .tsv / .csv / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │   data    │  load → Series, export TSV
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  engine   │  reconstruct → shift → normalize, axes, batch
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  render   │  PNG per wavelength, GIF of a plot directory
//!   └──────────┘
//! ```

pub mod animation;
pub mod color;
pub mod data;
pub mod engine;
pub mod error;
pub mod render;

pub use error::{EngineError, Result};
