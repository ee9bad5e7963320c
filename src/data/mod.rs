/// Data layer: the DAD series, loading and tabular export.
///
/// Architecture:
/// ```text
///  .tsv / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Series
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Series   │  time column + one Channel per wavelength
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  RT/DAD slice or the full table as TSV
///   └──────────┘
/// ```

pub mod export;
pub mod loader;
pub mod model;
