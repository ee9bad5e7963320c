use std::fmt;

use crate::error::{EngineError, Result};

/// Label used for the time column when the source file does not name it.
pub const DEFAULT_TIME_LABEL: &str = "RT.min";

// ---------------------------------------------------------------------------
// Channel – one wavelength column
// ---------------------------------------------------------------------------

/// Absorbance samples recorded at one detector wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Column label as it appears in the source table (e.g. `"254"`).
    pub label: String,
    /// Wavelength in nm parsed from the label, if it is numeric.
    pub wavelength_nm: Option<f64>,
    /// One sample per time point.
    pub absorbance: Vec<f64>,
}

impl Channel {
    pub fn new(label: impl Into<String>, absorbance: Vec<f64>) -> Self {
        let label = label.into();
        let wavelength_nm = parse_wavelength(&label);
        Self {
            label,
            wavelength_nm,
            absorbance,
        }
    }

    /// Whether the channel has no usable sample (empty or NaN throughout).
    pub fn is_blank(&self) -> bool {
        self.absorbance.iter().all(|v| v.is_nan())
    }
}

/// Parse `"254"`, `"254.0"` or `"254 nm"` into a wavelength.
pub fn parse_wavelength(label: &str) -> Option<f64> {
    label
        .trim()
        .trim_end_matches("nm")
        .trim()
        .parse::<f64>()
        .ok()
}

// ---------------------------------------------------------------------------
// Series – the complete DAD run
// ---------------------------------------------------------------------------

/// A full detector run: ascending retention times (minutes) and one
/// absorbance channel per wavelength, all of the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub time_label: String,
    pub time: Vec<f64>,
    pub channels: Vec<Channel>,
}

impl Series {
    /// Build a series, rejecting channels whose length differs from `time`.
    pub fn new(time_label: impl Into<String>, time: Vec<f64>, channels: Vec<Channel>) -> Result<Self> {
        if let Some(bad) = channels.iter().find(|c| c.absorbance.len() != time.len()) {
            return Err(EngineError::RaggedSeries {
                label: bad.label.clone(),
                expected: time.len(),
                actual: bad.absorbance.len(),
            });
        }
        Ok(Self {
            time_label: time_label.into(),
            time,
            channels,
        })
    }

    /// Number of time points.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Last retention time in minutes.
    pub fn last_time(&self) -> Option<f64> {
        self.time.last().copied()
    }

    pub fn channel(&self, label: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.label == label)
    }

    /// Wavelength labels in column order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.label.as_str())
    }

    /// All column labels, time first.
    pub fn column_labels(&self) -> Vec<String> {
        std::iter::once(self.time_label.clone())
            .chain(self.channels.iter().map(|c| c.label.clone()))
            .collect()
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} time points × {} wavelengths",
            self.len(),
            self.channels.len()
        )?;
        if let Some(last) = self.last_time() {
            write!(f, ", run time {last:.2} min")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wavelength_labels_parse() {
        assert_eq!(parse_wavelength("254"), Some(254.0));
        assert_eq!(parse_wavelength(" 280.5 nm"), Some(280.5));
        assert_eq!(parse_wavelength("DAD1 A"), None);
    }

    #[test]
    fn ragged_channels_are_rejected() {
        let err = Series::new(
            DEFAULT_TIME_LABEL,
            vec![0.0, 0.1, 0.2],
            vec![Channel::new("254", vec![1.0, 2.0])],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::RaggedSeries { expected: 3, actual: 2, .. }
        ));
    }

    #[test]
    fn column_labels_start_with_time() {
        let series = Series::new(
            DEFAULT_TIME_LABEL,
            vec![0.0, 0.1],
            vec![Channel::new("210", vec![0.0; 2]), Channel::new("254", vec![0.0; 2])],
        )
        .unwrap();
        assert_eq!(series.column_labels(), vec!["RT.min", "210", "254"]);
        assert_eq!(series.labels().collect::<Vec<_>>(), vec!["210", "254"]);
        assert!(series.channel("254").is_some());
        assert!(series.channel("300").is_none());
    }

    #[test]
    fn blank_channel_detection() {
        assert!(Channel::new("254", vec![]).is_blank());
        assert!(Channel::new("254", vec![f64::NAN, f64::NAN]).is_blank());
        assert!(!Channel::new("254", vec![f64::NAN, 0.0]).is_blank());
    }
}
