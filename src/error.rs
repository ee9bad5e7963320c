use thiserror::Error;

/// Error type for the reconstruction engine and the render hand-off.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A modulation time, sample rate or shift that cannot drive a reconstruction.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Zero dynamic range under relative scaling. The normalizer recovers by
    /// emitting zeros; batch summaries still report it.
    #[error("{label}: signal has no dynamic range")]
    DegenerateSignal { label: String },

    /// Empty or all-NaN channel, or too few time points for the requested axes.
    #[error("{label}: insufficient data ({reason})")]
    InsufficientData { label: String, reason: String },

    /// The series has no channel with this label.
    #[error("unknown wavelength: {0}")]
    UnknownWavelength(String),

    /// A channel whose length differs from the time column.
    #[error("channel {label} has {actual} samples, time column has {expected}")]
    RaggedSeries {
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by a rendering collaborator.
    #[error("render error: {0}")]
    Render(String),

    /// Internal invariant violation (e.g. a shape mismatch while reshaping).
    #[error("internal error: {0}")]
    Internal(String),

    /// The operation was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,
}

/// Convenience alias so callers can write `Result<T>` instead of `Result<T, EngineError>`.
pub type Result<T> = std::result::Result<T, EngineError>;
