use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

// ---------------------------------------------------------------------------
// Intensity scale
// ---------------------------------------------------------------------------

/// How reconstructed absorbance values are scaled for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityScale {
    /// Raw detector units.
    #[default]
    Absolute,
    /// Min–max rescaled to 0–100.
    Relative,
}

static RELATIVE_TICKS: [f64; 9] = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0];

impl IntensityScale {
    pub const ALL: [IntensityScale; 2] = [IntensityScale::Absolute, IntensityScale::Relative];

    /// Fixed colour-bar ticks implied by the scale, if any.
    pub fn ticks(self) -> Option<&'static [f64]> {
        match self {
            IntensityScale::Absolute => None,
            IntensityScale::Relative => Some(&RELATIVE_TICKS[..]),
        }
    }
}

impl fmt::Display for IntensityScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntensityScale::Absolute => write!(f, "absolute"),
            IntensityScale::Relative => write!(f, "relative"),
        }
    }
}

// ---------------------------------------------------------------------------
// Colour bar
// ---------------------------------------------------------------------------

/// User-supplied colour-bar limits. A `None` side is computed from the data.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorbarLimits {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ColorbarLimits {
    pub fn fixed(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

/// Colour-bar bounds actually used for one rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorbarBounds {
    pub min: f64,
    pub max: f64,
}

impl ColorbarBounds {
    /// Position of `value` inside the bounds, clamped to `0..=1`.
    pub fn fraction(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if !range.is_finite() || range <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / range).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Acquisition parameters
// ---------------------------------------------------------------------------

/// Everything needed to turn one channel into a displayable matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionParameters {
    /// Duration of one second-dimension cycle, minutes.
    pub modulation_time: f64,
    /// Detector acquisition frequency, Hz.
    pub sample_rate: f64,
    /// Second-dimension phase correction, seconds.
    pub shift_time: f64,
    pub intensity_scale: IntensityScale,
    #[serde(default)]
    pub colorbar: ColorbarLimits,
}

impl Default for AcquisitionParameters {
    fn default() -> Self {
        Self {
            modulation_time: 0.5,
            sample_rate: 40.0,
            shift_time: 0.0,
            intensity_scale: IntensityScale::Absolute,
            colorbar: ColorbarLimits::default(),
        }
    }
}

impl AcquisitionParameters {
    /// Sample rate expressed per minute, the unit the reconstructor works in.
    pub fn samples_per_minute(&self) -> f64 {
        self.sample_rate * 60.0
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("modulation_time", self.modulation_time)?;
        ensure_positive("sample_rate", self.sample_rate)?;
        if !self.shift_time.is_finite() {
            return Err(EngineError::InvalidParameter {
                name: "shift_time",
                value: self.shift_time,
            });
        }
        Ok(())
    }
}

pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_instrument_setup() {
        let p = AcquisitionParameters::default();
        assert_eq!(p.samples_per_minute(), 2400.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn non_positive_values_are_rejected() {
        let p = AcquisitionParameters {
            modulation_time: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            p.validate(),
            Err(EngineError::InvalidParameter { name: "modulation_time", .. })
        ));

        let p = AcquisitionParameters {
            sample_rate: -40.0,
            ..Default::default()
        };
        assert!(matches!(
            p.validate(),
            Err(EngineError::InvalidParameter { name: "sample_rate", .. })
        ));

        let p = AcquisitionParameters {
            shift_time: f64::NAN,
            ..Default::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn relative_scale_has_fixed_ticks() {
        assert_eq!(IntensityScale::Absolute.ticks(), None);
        let ticks = IntensityScale::Relative.ticks().unwrap();
        assert_eq!(ticks.len(), 9);
        assert_eq!(ticks[0], 10.0);
        assert_eq!(ticks[8], 90.0);
    }

    #[test]
    fn parameters_round_trip_through_json() {
        let p = AcquisitionParameters {
            shift_time: -1.5,
            intensity_scale: IntensityScale::Relative,
            colorbar: ColorbarLimits::fixed(0.0, 50.0),
            ..Default::default()
        };
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"relative\""));
        let back: AcquisitionParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn bounds_fraction_clamps() {
        let b = ColorbarBounds { min: 0.0, max: 10.0 };
        assert_eq!(b.fraction(5.0), 0.5);
        assert_eq!(b.fraction(-3.0), 0.0);
        assert_eq!(b.fraction(30.0), 1.0);
        assert_eq!(ColorbarBounds { min: 1.0, max: 1.0 }.fraction(1.0), 0.0);
    }
}
